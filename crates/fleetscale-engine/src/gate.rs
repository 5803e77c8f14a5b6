//! Leadership gate — master-gated access to the scaling capability.
//!
//! Every control-plane instance analyses workloads continuously so a
//! failover starts with warm history, but only the elected master may
//! mutate external state. The gate wraps the real `ServiceScaler` and
//! turns scale commands into no-ops while this instance is not the master.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tracing::{debug, info};

use fleetscale_core::{CoreResult, HealthReporter, ServiceScaler};

/// Decorator around the real scaling capability.
///
/// The leadership flag is a lock-free atomic: election callbacks store it,
/// every in-flight scale call loads it, and neither ever blocks a monitor
/// tick.
pub struct LeadershipGate {
    inner: Arc<dyn ServiceScaler>,
    is_leader: AtomicBool,
}

impl LeadershipGate {
    /// Wrap a scaler. A new gate starts as non-leader.
    pub fn new(inner: Arc<dyn ServiceScaler>) -> Self {
        Self {
            inner,
            is_leader: AtomicBool::new(false),
        }
    }

    /// Update leadership status from an election signal.
    ///
    /// Safe to call concurrently with any number of in-flight `scale` calls.
    pub fn set_leader(&self, leader: bool) {
        let was = self.is_leader.swap(leader, Ordering::SeqCst);
        if was != leader {
            if leader {
                info!("this instance has been elected master, scale commands enabled");
            } else {
                info!("this instance is no longer the master, scale commands suppressed");
            }
        }
    }

    /// Whether this instance currently holds leadership.
    pub fn is_leader(&self) -> bool {
        self.is_leader.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ServiceScaler for LeadershipGate {
    async fn scale(&self, service_id: &str, target: u32) -> CoreResult<()> {
        if self.is_leader() {
            self.inner.scale(service_id, target).await
        } else {
            debug!(%service_id, target, "not master, suppressing scale command");
            Ok(())
        }
    }
}

#[async_trait]
impl HealthReporter for LeadershipGate {
    async fn health_check(&self) -> anyhow::Result<()> {
        self.inner.health_check().await
    }
}
