//! fleetscale-engine — the reconciliation and scheduling engine.
//!
//! Turns a changing list of discovered services into a live set of
//! per-service monitor tasks, gates scale actions on leadership status,
//! and isolates per-service failures from the rest of the fleet.
//!
//! # Architecture
//!
//! ```text
//! discovery ──▶ validation ──▶ reconciliation ──▶ monitor tasks
//!                                                      │
//!                               leadership ──▶ gate ◀──┘ analyse + scale
//! ```
//!
//! - [`reconciler::Reconciler`] owns the service-id → task map and applies
//!   the added/removed/changed diff on every refresh.
//! - [`monitor`] runs one periodic analysis-and-maybe-scale loop per
//!   service; a failed tick never unmonitors the service.
//! - [`gate::LeadershipGate`] forwards scale commands only while this
//!   instance is the elected master, so every instance keeps warm workload
//!   history but only one mutates external state.
//! - [`lifecycle::ControlPlane`] ties it together: election, initial
//!   reconciliation, periodic refresh, graceful shutdown.

pub mod election;
pub mod error;
pub mod gate;
pub mod lifecycle;
pub mod monitor;
pub mod reconciler;
pub mod registry;
pub mod validator;

pub use election::NullElection;
pub use error::{EngineError, PartialUpdateError, Rejection};
pub use gate::LeadershipGate;
pub use lifecycle::{ComponentHealth, ControlPlane, HealthReport, LifecycleState};
pub use reconciler::{ReconcileSummary, Reconciler};
pub use registry::AnalyserRegistry;
pub use validator::ServiceValidator;
