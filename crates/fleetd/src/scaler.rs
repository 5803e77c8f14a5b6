//! Dry-run scaling backend.
//!
//! fleetd ships without an orchestrator integration; the `ServiceScaler`
//! trait is the point where one plugs in. This backend logs every command
//! it would have issued, which is also exactly what a standby instance
//! observes in a real deployment.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tracing::info;

use fleetscale_core::{CoreResult, HealthReporter, ServiceScaler};

pub struct DryRunScaler {
    commands: AtomicUsize,
}

impl DryRunScaler {
    pub fn new() -> Self {
        Self {
            commands: AtomicUsize::new(0),
        }
    }

    /// Number of scale commands received so far.
    pub fn commands_issued(&self) -> usize {
        self.commands.load(Ordering::SeqCst)
    }
}

impl Default for DryRunScaler {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ServiceScaler for DryRunScaler {
    async fn scale(&self, service_id: &str, target: u32) -> CoreResult<()> {
        self.commands.fetch_add(1, Ordering::SeqCst);
        info!(%service_id, target, "scale command (dry run)");
        Ok(())
    }
}

#[async_trait]
impl HealthReporter for DryRunScaler {
    async fn health_check(&self) -> anyhow::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn counts_commands() {
        let scaler = DryRunScaler::new();
        scaler.scale("svc-a", 3).await.unwrap();
        scaler.scale("svc-b", 1).await.unwrap();
        assert_eq!(scaler.commands_issued(), 2);
    }
}
