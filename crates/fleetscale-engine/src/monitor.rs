//! Monitor task — the periodic analysis-and-maybe-scale loop for one service.
//!
//! Each tracked service gets exactly one spawned loop. A tick invokes the
//! service's bound analyser, clamps any recommendation to the record's
//! bounds, and submits it through the leadership gate. Errors from the
//! analyser or the scale call mark the tick as failed and nothing else —
//! the next tick still fires.

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use fleetscale_core::{Recommendation, ServiceRecord, ServiceScaler, WorkloadAnalyser};

use crate::gate::LeadershipGate;

/// A live monitor task: the record it was created from plus its
/// cancellation handle. The analyser instance is owned by the spawned loop.
pub struct TaskSlot {
    pub(crate) record: ServiceRecord,
    shutdown_tx: watch::Sender<bool>,
    #[allow(dead_code)]
    handle: JoinHandle<()>,
}

impl TaskSlot {
    /// Stop future ticks. Cancellation is cooperative: a tick already in
    /// progress is allowed to complete, the loop exits right after.
    pub fn cancel(self) {
        let _ = self.shutdown_tx.send(true);
    }
}

/// Spawn the monitor loop for one service.
///
/// Ticks run at a fixed delay of `record.interval()`; a service's ticks
/// never overlap because the loop awaits each tick before sleeping again.
pub fn spawn_monitor(
    record: ServiceRecord,
    analyser: Box<dyn WorkloadAnalyser>,
    gate: Arc<LeadershipGate>,
) -> TaskSlot {
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let loop_record = record.clone();
    let handle = tokio::spawn(run_monitor_loop(loop_record, analyser, gate, shutdown_rx));
    TaskSlot {
        record,
        shutdown_tx,
        handle,
    }
}

async fn run_monitor_loop(
    record: ServiceRecord,
    mut analyser: Box<dyn WorkloadAnalyser>,
    gate: Arc<LeadershipGate>,
    mut shutdown: watch::Receiver<bool>,
) {
    debug!(service_id = %record.id, interval_secs = record.interval_secs, "monitor starting");
    loop {
        tokio::select! {
            _ = tokio::time::sleep(record.interval()) => {
                run_tick(&record, analyser.as_mut(), &gate).await;
            }
            _ = shutdown.changed() => {
                debug!(service_id = %record.id, "monitor cancelled");
                break;
            }
        }
    }
}

/// One analysis-and-maybe-scale cycle.
///
/// Never returns an error: per-tick failures are logged and absorbed here
/// so the loop above stays alive no matter what the collaborators do.
pub async fn run_tick(
    record: &ServiceRecord,
    analyser: &mut dyn WorkloadAnalyser,
    gate: &LeadershipGate,
) {
    match analyser.analyse(record).await {
        Ok(Recommendation::Target(target)) => {
            let clamped = record.clamp(target);
            if clamped != target {
                debug!(
                    service_id = %record.id,
                    recommended = target,
                    clamped,
                    "recommendation clamped to scaling bounds"
                );
            }
            if let Err(e) = gate.scale(&record.id, clamped).await {
                warn!(
                    service_id = %record.id,
                    target = clamped,
                    error = %e,
                    "scale command failed, retrying on next tick"
                );
            }
        }
        Ok(Recommendation::NoAction) => {
            debug!(service_id = %record.id, "no scaling action recommended");
        }
        Err(e) => {
            warn!(service_id = %record.id, error = %e, "workload analysis failed this tick");
        }
    }
}
