//! Core domain types.

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Immutable snapshot of one service's scaling configuration.
///
/// Discovery produces fresh `ServiceRecord` values on every cycle; a record
/// is never mutated in place. The reconciler compares records by equality to
/// decide whether a service's monitor task must be replaced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceRecord {
    /// Unique service identifier.
    pub id: String,
    /// The group this service belongs to. A control-plane instance only
    /// monitors services of its own group.
    pub group: String,
    /// Lower bound on the instance count.
    pub min_instances: u32,
    /// Upper bound on the instance count.
    pub max_instances: u32,
    /// Name of the workload analyser type that monitors this service.
    pub analyser: String,
    /// Analyser-specific parameters, opaque to the engine.
    #[serde(default)]
    pub params: BTreeMap<String, String>,
    /// Delay between workload analysis ticks, in seconds.
    pub interval_secs: u64,
}

impl ServiceRecord {
    /// The monitor tick delay as a [`Duration`].
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    /// Clamp a recommended instance count into `[min_instances, max_instances]`.
    pub fn clamp(&self, target: u32) -> u32 {
        target.min(self.max_instances).max(self.min_instances)
    }
}

/// The set of services produced by one discovery cycle, keyed by service id.
///
/// Consumed by a single reconciliation pass; the engine retains only the
/// records it spawned tasks from, not the set itself.
pub type ServiceSet = HashMap<String, ServiceRecord>;

/// A workload analyser's verdict for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recommendation {
    /// Scale the service to this many instances. The engine clamps the
    /// value to the record's bounds before submitting it.
    Target(u32),
    /// The workload does not warrant a scaling action right now.
    NoAction,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(min: u32, max: u32) -> ServiceRecord {
        ServiceRecord {
            id: "svc-a".to_string(),
            group: "default".to_string(),
            min_instances: min,
            max_instances: max,
            analyser: "queue".to_string(),
            params: BTreeMap::new(),
            interval_secs: 30,
        }
    }

    #[test]
    fn clamp_respects_bounds() {
        let rec = record(2, 5);
        assert_eq!(rec.clamp(0), 2);
        assert_eq!(rec.clamp(2), 2);
        assert_eq!(rec.clamp(4), 4);
        assert_eq!(rec.clamp(5), 5);
        assert_eq!(rec.clamp(100), 5);
    }

    #[test]
    fn clamp_allows_scale_to_zero() {
        let rec = record(0, 3);
        assert_eq!(rec.clamp(0), 0);
    }

    #[test]
    fn records_compare_by_value() {
        let a = record(1, 5);
        let mut b = record(1, 5);
        assert_eq!(a, b);

        b.interval_secs = 60;
        assert_ne!(a, b);

        let mut c = record(1, 5);
        c.params.insert("backlog_goal".to_string(), "100".to_string());
        assert_ne!(a, c);
    }

    #[test]
    fn record_parses_from_manifest_toml() {
        let rec: ServiceRecord = toml::from_str(
            r#"
id = "ingest-worker"
group = "workers"
min_instances = 1
max_instances = 8
analyser = "backlog"
interval_secs = 30

[params]
backlog_file = "/var/run/ingest.backlog"
"#,
        )
        .unwrap();
        assert_eq!(rec.id, "ingest-worker");
        assert_eq!(rec.interval(), Duration::from_secs(30));
        assert_eq!(rec.params["backlog_file"], "/var/run/ingest.backlog");
    }

    #[test]
    fn params_default_to_empty() {
        let rec: ServiceRecord = toml::from_str(
            r#"
id = "billing-api"
group = "frontends"
min_instances = 2
max_instances = 4
analyser = "backlog"
interval_secs = 60
"#,
        )
        .unwrap();
        assert!(rec.params.is_empty());
    }
}
