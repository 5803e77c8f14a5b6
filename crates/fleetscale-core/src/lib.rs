//! fleetscale-core — shared data model and collaborator contracts.
//!
//! Defines the types that flow through the control plane (`ServiceRecord`,
//! `ServiceSet`, `Recommendation`) and the traits the engine consumes but
//! does not implement: service discovery, the scaling capability, workload
//! analysers, leader election, and health reporting.
//!
//! The engine never talks to an orchestrator, a metrics backend, or an
//! election backend directly — it only sees these traits. Concrete
//! implementations live with the binary that assembles the control plane.

pub mod error;
pub mod traits;
pub mod types;

pub use error::{CoreError, CoreResult};
pub use traits::{
    Election, HealthReporter, ServiceScaler, ServiceSource, WorkloadAnalyser,
    WorkloadAnalyserFactory,
};
pub use types::{Recommendation, ServiceRecord, ServiceSet};
