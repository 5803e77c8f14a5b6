//! Collaborator contracts consumed by the engine.
//!
//! All traits are object-safe so the binary can hand the engine
//! `Arc<dyn ...>` collaborators chosen at startup.

use async_trait::async_trait;
use tokio::sync::watch;

use crate::error::CoreResult;
use crate::types::{Recommendation, ServiceRecord, ServiceSet};

/// A component that can report whether it is currently able to do its job.
///
/// Discovery, the scaling capability, and every analyser factory expose
/// this; an external health surface polls them through the control plane.
#[async_trait]
pub trait HealthReporter: Send + Sync {
    /// Returns `Ok(())` when the component is healthy. The error carries a
    /// human-readable reason.
    async fn health_check(&self) -> anyhow::Result<()>;
}

/// Service discovery: produces the set of services this control-plane
/// instance is responsible for.
///
/// Failure is transient — the caller keeps the previously discovered set
/// and retries on the next refresh cycle.
#[async_trait]
pub trait ServiceSource: HealthReporter {
    async fn get_services(&self) -> CoreResult<ServiceSet>;
}

/// The real scaling capability (orchestrator integration).
///
/// Only ever invoked through the leadership gate, so implementations never
/// need to worry about duplicate commands from standby instances.
#[async_trait]
pub trait ServiceScaler: HealthReporter {
    async fn scale(&self, service_id: &str, target: u32) -> CoreResult<()>;
}

/// A bound workload analyser for exactly one service.
///
/// Each monitor task exclusively owns its analyser, which is free to keep
/// per-service history between ticks (`&mut self`). Replacing or removing
/// the service discards the instance along with that history.
#[async_trait]
pub trait WorkloadAnalyser: Send {
    async fn analyse(&mut self, record: &ServiceRecord) -> CoreResult<Recommendation>;
}

/// Produces analyser instances for one analyser type name.
#[async_trait]
pub trait WorkloadAnalyserFactory: HealthReporter {
    /// The analyser type name service records refer to.
    fn analyser_name(&self) -> &str;

    /// Create an analyser bound to the given service record.
    fn create(&self, record: &ServiceRecord) -> CoreResult<Box<dyn WorkloadAnalyser>>;
}

/// Leader election membership.
///
/// `enter` joins the election and returns a watch channel carrying the
/// leadership status of this instance; the election backend flips it from
/// its own execution context. Entering is fatal on failure — without
/// election membership an instance cannot safely determine scaling
/// authority.
#[async_trait]
pub trait Election: Send + Sync {
    async fn enter(&self) -> CoreResult<watch::Receiver<bool>>;

    /// Leave the election. Called during shutdown; failures are logged by
    /// the caller and never block the rest of the shutdown sequence.
    async fn resign(&self) -> CoreResult<()>;
}
