//! Engine error types.

use fleetscale_core::CoreError;
use thiserror::Error;

use crate::lifecycle::LifecycleState;

/// One discovered service that could not be scheduled.
#[derive(Debug)]
pub struct Rejection {
    pub service_id: String,
    pub reason: CoreError,
}

/// Returned by `Reconciler::update_services` when individual services in a
/// batch were invalid. Every valid service in the same batch has already
/// been applied — this error only reports the skipped ones.
#[derive(Debug, Error)]
#[error("rejected {} discovered service(s)", rejected.len())]
pub struct PartialUpdateError {
    pub rejected: Vec<Rejection>,
}

/// Errors from the control-plane lifecycle.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("control plane is {0}, expected stopped")]
    NotStopped(LifecycleState),

    #[error(transparent)]
    Core(#[from] CoreError),
}
