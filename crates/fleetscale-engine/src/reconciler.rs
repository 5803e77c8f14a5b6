//! Reconciliation engine — diffs discovered services against running
//! monitor tasks.
//!
//! Owns the service-id → task map. On each refresh it computes added,
//! removed, changed, and unchanged sets and corrects the difference:
//! removed services are cancelled, added services are validated and
//! scheduled, changed services are cancelled first and then rescheduled
//! exactly like additions. Unchanged services are untouched, which makes
//! two consecutive identical refreshes free of task churn.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{info, warn};

use fleetscale_core::{CoreResult, ServiceRecord, ServiceSet, WorkloadAnalyser};

use crate::error::{PartialUpdateError, Rejection};
use crate::gate::LeadershipGate;
use crate::monitor::{TaskSlot, spawn_monitor};
use crate::registry::AnalyserRegistry;
use crate::validator::ServiceValidator;

/// What one reconciliation pass did, by service id.
#[derive(Debug, Default, Clone)]
pub struct ReconcileSummary {
    pub created: Vec<String>,
    pub replaced: Vec<String>,
    pub removed: Vec<String>,
    pub unchanged: Vec<String>,
}

impl ReconcileSummary {
    /// True when the pass neither created, replaced, nor removed a task.
    pub fn is_noop(&self) -> bool {
        self.created.is_empty() && self.replaced.is_empty() && self.removed.is_empty()
    }
}

/// The reconciliation engine. At most one monitor task exists per service
/// id at any time; that invariant is enforced here and nowhere else.
pub struct Reconciler {
    registry: Arc<AnalyserRegistry>,
    validator: ServiceValidator,
    gate: Arc<LeadershipGate>,
    /// Tracked tasks, keyed by service id. The write lock is held for the
    /// whole of `update_services`, making passes mutually exclusive without
    /// ever blocking an in-flight monitor tick.
    tracked: RwLock<HashMap<String, TaskSlot>>,
}

impl Reconciler {
    pub fn new(registry: Arc<AnalyserRegistry>, gate: Arc<LeadershipGate>) -> Self {
        let validator = ServiceValidator::new(registry.names().map(str::to_string));
        Self {
            registry,
            validator,
            gate,
            tracked: RwLock::new(HashMap::new()),
        }
    }

    /// Apply one discovered service set.
    ///
    /// Individually invalid services are skipped with a logged reason and
    /// reported through [`PartialUpdateError`]; every valid service in the
    /// batch is applied regardless.
    pub async fn update_services(
        &self,
        new_set: ServiceSet,
    ) -> Result<ReconcileSummary, PartialUpdateError> {
        let mut tracked = self.tracked.write().await;
        let mut summary = ReconcileSummary::default();
        let mut rejected = Vec::new();

        let removed_ids: Vec<String> = tracked
            .keys()
            .filter(|id| !new_set.contains_key(*id))
            .cloned()
            .collect();
        for id in removed_ids {
            if let Some(slot) = tracked.remove(&id) {
                slot.cancel();
                info!(service_id = %id, "service no longer discovered, monitor cancelled");
                summary.removed.push(id);
            }
        }

        for (id, record) in new_set {
            let replacing = match tracked.get(&id) {
                Some(slot) if slot.record == record => {
                    summary.unchanged.push(id);
                    continue;
                }
                Some(_) => {
                    // Changed: cancel the old task before anything else so a
                    // stale configuration never keeps driving scale commands.
                    if let Some(old) = tracked.remove(&id) {
                        old.cancel();
                    }
                    true
                }
                None => false,
            };

            match self.prepare_analyser(&record) {
                Ok(analyser) => {
                    let slot = spawn_monitor(record, analyser, Arc::clone(&self.gate));
                    tracked.insert(id.clone(), slot);
                    if replacing {
                        info!(service_id = %id, "service configuration changed, monitor replaced");
                        summary.replaced.push(id);
                    } else {
                        info!(service_id = %id, "service discovered, monitor scheduled");
                        summary.created.push(id);
                    }
                }
                Err(reason) => {
                    warn!(service_id = %id, error = %reason, "service rejected, skipping");
                    rejected.push(Rejection {
                        service_id: id,
                        reason,
                    });
                }
            }
        }

        if rejected.is_empty() {
            Ok(summary)
        } else {
            Err(PartialUpdateError { rejected })
        }
    }

    /// Cancel every tracked monitor task. Best-effort, used during shutdown.
    pub async fn shutdown_all(&self) {
        let mut tracked = self.tracked.write().await;
        let count = tracked.len();
        for (_, slot) in tracked.drain() {
            slot.cancel();
        }
        info!(count, "all monitors cancelled");
    }

    /// The ids of currently tracked services, sorted.
    pub async fn tracked_services(&self) -> Vec<String> {
        let tracked = self.tracked.read().await;
        let mut ids: Vec<String> = tracked.keys().cloned().collect();
        ids.sort();
        ids
    }

    pub async fn is_tracked(&self, service_id: &str) -> bool {
        self.tracked.read().await.contains_key(service_id)
    }

    fn prepare_analyser(&self, record: &ServiceRecord) -> CoreResult<Box<dyn WorkloadAnalyser>> {
        self.validator.validate(record)?;
        self.registry.create(record)
    }
}
