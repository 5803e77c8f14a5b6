//! Error types shared across the control plane.

use thiserror::Error;

/// Errors produced by collaborators or by validation of discovered services.
///
/// Severity is decided by the caller, not the type: a `Discovery` error on a
/// refresh cycle is recoverable (keep the previous task set), while an
/// `Election` error during startup is fatal.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("service discovery failed: {0}")]
    Discovery(anyhow::Error),

    #[error("scaling operation failed: {0}")]
    Scaling(anyhow::Error),

    #[error("workload analysis failed: {0}")]
    Analysis(anyhow::Error),

    #[error("leader election failed: {0}")]
    Election(anyhow::Error),

    #[error("service {service_id} references unregistered analyser {analyser:?}")]
    UnknownAnalyser { service_id: String, analyser: String },

    #[error("service {service_id} has inverted scaling bounds: min {min} > max {max}")]
    InvalidBounds { service_id: String, min: u32, max: u32 },

    #[error("service {service_id} has a zero monitor interval")]
    InvalidInterval { service_id: String },

    #[error("analyser factory {analyser:?} could not create an instance: {reason}")]
    AnalyserCreate { analyser: String, reason: anyhow::Error },

    #[error("no workload analyser factories registered")]
    NoAnalysers,

    #[error("duplicate workload analyser factory: {0:?}")]
    DuplicateAnalyser(String),
}

pub type CoreResult<T> = Result<T, CoreError>;
