//! Control-plane lifecycle — election entry, periodic refresh, shutdown.
//!
//! The `ControlPlane` is constructed, started, and stopped by its caller;
//! there is no implicit process-level hook. Startup enters the leader
//! election (fatal on failure), performs one reconciliation pass (discovery
//! failure is logged and left for the periodic refresh to recover), and
//! schedules the refresh loop. Shutdown is best-effort throughout: every
//! step logs its own failure and the sequence always runs to completion.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::{Mutex, watch};
use tracing::{debug, info, warn};

use fleetscale_core::{Election, HealthReporter, ServiceScaler, ServiceSource};

use crate::error::EngineError;
use crate::gate::LeadershipGate;
use crate::reconciler::Reconciler;
use crate::registry::AnalyserRegistry;

/// Where the control plane is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Stopped,
    Starting,
    Running,
    ShuttingDown,
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LifecycleState::Stopped => "stopped",
            LifecycleState::Starting => "starting",
            LifecycleState::Running => "running",
            LifecycleState::ShuttingDown => "shutting down",
        };
        f.write_str(s)
    }
}

/// Health of one collaborator, as polled through [`ControlPlane::check_health`].
#[derive(Debug, Clone, Serialize)]
pub struct ComponentHealth {
    pub name: String,
    pub healthy: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Per-collaborator health report for an external health-check surface.
#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub components: Vec<ComponentHealth>,
}

impl HealthReport {
    pub fn healthy(&self) -> bool {
        self.components.iter().all(|c| c.healthy)
    }
}

/// The top-level orchestrator of the autoscaling control plane.
pub struct ControlPlane {
    source: Arc<dyn ServiceSource>,
    election: Arc<dyn Election>,
    gate: Arc<LeadershipGate>,
    registry: Arc<AnalyserRegistry>,
    reconciler: Arc<Reconciler>,
    state: Mutex<LifecycleState>,
    /// Stops the refresh loop and the leadership forwarder.
    shutdown_tx: Mutex<Option<watch::Sender<bool>>>,
}

impl ControlPlane {
    pub fn new(
        source: Arc<dyn ServiceSource>,
        scaler: Arc<dyn ServiceScaler>,
        election: Arc<dyn Election>,
        registry: AnalyserRegistry,
    ) -> Self {
        let gate = Arc::new(LeadershipGate::new(scaler));
        let registry = Arc::new(registry);
        let reconciler = Arc::new(Reconciler::new(Arc::clone(&registry), Arc::clone(&gate)));
        Self {
            source,
            election,
            gate,
            registry,
            reconciler,
            state: Mutex::new(LifecycleState::Stopped),
            shutdown_tx: Mutex::new(None),
        }
    }

    /// Start the control plane.
    ///
    /// Entering the election is fatal on failure — without membership this
    /// instance cannot determine scaling authority. A failed initial
    /// discovery is not: the service list is assumed to become available
    /// over time and the periodic refresh takes over.
    pub async fn start(&self, refresh_interval: Duration) -> Result<(), EngineError> {
        {
            let mut state = self.state.lock().await;
            if *state != LifecycleState::Stopped {
                return Err(EngineError::NotStopped(*state));
            }
            *state = LifecycleState::Starting;
        }

        let leadership = match self.election.enter().await {
            Ok(rx) => rx,
            Err(e) => {
                *self.state.lock().await = LifecycleState::Stopped;
                return Err(EngineError::Core(e));
            }
        };
        info!("entered leader election");

        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        // Leadership forwarder: applies election signals to the gate. The
        // election backend runs on its own execution context; nothing here
        // ever blocks waiting for a leadership change.
        {
            let gate = Arc::clone(&self.gate);
            let mut leadership = leadership;
            let mut shutdown = shutdown_rx.clone();
            tokio::spawn(async move {
                gate.set_leader(*leadership.borrow_and_update());
                loop {
                    tokio::select! {
                        changed = leadership.changed() => match changed {
                            Ok(()) => gate.set_leader(*leadership.borrow_and_update()),
                            Err(_) => {
                                debug!("election channel closed, leadership frozen");
                                break;
                            }
                        },
                        _ = shutdown.changed() => break,
                    }
                }
            });
        }

        refresh_once(self.source.as_ref(), &self.reconciler).await;

        {
            let source = Arc::clone(&self.source);
            let reconciler = Arc::clone(&self.reconciler);
            let mut shutdown = shutdown_rx;
            tokio::spawn(async move {
                loop {
                    tokio::select! {
                        _ = tokio::time::sleep(refresh_interval) => {
                            refresh_once(source.as_ref(), &reconciler).await;
                        }
                        _ = shutdown.changed() => {
                            debug!("refresh loop stopped");
                            break;
                        }
                    }
                }
            });
        }

        *self.shutdown_tx.lock().await = Some(shutdown_tx);
        *self.state.lock().await = LifecycleState::Running;
        info!(
            refresh_secs = refresh_interval.as_secs(),
            "control plane running"
        );
        Ok(())
    }

    /// Stop the control plane: resign leadership, stop the refresh loop,
    /// cancel every monitor task. Never fails; a partial shutdown must not
    /// leave the process hung.
    pub async fn shutdown(&self) {
        {
            let mut state = self.state.lock().await;
            match *state {
                LifecycleState::Starting | LifecycleState::Running => {
                    *state = LifecycleState::ShuttingDown;
                }
                other => {
                    debug!(state = %other, "shutdown requested, nothing to do");
                    return;
                }
            }
        }
        info!("control plane shutting down");

        if let Err(e) = self.election.resign().await {
            warn!(error = %e, "failed to resign from election");
        }
        if let Some(tx) = self.shutdown_tx.lock().await.take() {
            let _ = tx.send(true);
        }
        self.reconciler.shutdown_all().await;

        *self.state.lock().await = LifecycleState::Stopped;
        info!("control plane stopped");
    }

    /// Poll every collaborator's health predicate: discovery, the scaling
    /// capability, and each registered analyser factory.
    pub async fn check_health(&self) -> HealthReport {
        let mut components = Vec::with_capacity(2 + self.registry.len());
        components.push(probe("source", self.source.as_ref()).await);
        components.push(probe("scaler", &*self.gate).await);
        for (name, factory) in self.registry.iter() {
            components.push(probe(&format!("workload.{name}"), factory.as_ref()).await);
        }
        HealthReport { components }
    }

    pub async fn state(&self) -> LifecycleState {
        *self.state.lock().await
    }

    pub fn reconciler(&self) -> &Reconciler {
        &self.reconciler
    }

    pub fn gate(&self) -> &LeadershipGate {
        &self.gate
    }
}

/// One discovery + reconciliation cycle. Discovery failure keeps the
/// previously scheduled tasks untouched; partial failures have already been
/// applied for the valid services and are only logged here.
async fn refresh_once(source: &dyn ServiceSource, reconciler: &Reconciler) {
    match source.get_services().await {
        Ok(set) => match reconciler.update_services(set).await {
            Ok(summary) => {
                if summary.is_noop() {
                    debug!("service set unchanged");
                } else {
                    info!(
                        created = summary.created.len(),
                        replaced = summary.replaced.len(),
                        removed = summary.removed.len(),
                        "service set reconciled"
                    );
                }
            }
            Err(e) => {
                warn!(error = %e, "some discovered services were rejected this cycle");
            }
        },
        Err(e) => {
            warn!(error = %e, "failed to retrieve services this cycle, keeping previous set");
        }
    }
}

async fn probe(name: &str, reporter: &dyn HealthReporter) -> ComponentHealth {
    match reporter.health_check().await {
        Ok(()) => ComponentHealth {
            name: name.to_string(),
            healthy: true,
            detail: None,
        },
        Err(e) => ComponentHealth {
            name: name.to_string(),
            healthy: false,
            detail: Some(e.to_string()),
        },
    }
}
