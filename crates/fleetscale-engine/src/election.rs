//! Election backends.
//!
//! The engine only consumes leadership signals; how consensus is reached
//! lives behind the [`Election`] trait. This module ships the null backend
//! for single-instance deployments, where contesting an election would be
//! pointless: the sole instance is always the master.

use async_trait::async_trait;
use tokio::sync::watch;
use tracing::info;

use fleetscale_core::{CoreResult, Election};

/// Election backend that grants leadership immediately and unconditionally.
pub struct NullElection {
    leader_tx: watch::Sender<bool>,
}

impl NullElection {
    pub fn new() -> Self {
        let (leader_tx, _) = watch::channel(false);
        Self { leader_tx }
    }
}

impl Default for NullElection {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Election for NullElection {
    async fn enter(&self) -> CoreResult<watch::Receiver<bool>> {
        let rx = self.leader_tx.subscribe();
        let _ = self.leader_tx.send(true);
        info!("no election backend configured, assuming leadership");
        Ok(rx)
    }

    async fn resign(&self) -> CoreResult<()> {
        let _ = self.leader_tx.send(false);
        Ok(())
    }
}
