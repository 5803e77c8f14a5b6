//! Service validator — filters discovered records before scheduling.

use std::collections::HashSet;

use fleetscale_core::{CoreError, CoreResult, ServiceRecord};

/// Validates discovered service records against the set of registered
/// analyser names plus basic structural sanity.
///
/// A rejection only ever affects the record it names; the reconciler keeps
/// processing the rest of the batch.
pub struct ServiceValidator {
    known_analysers: HashSet<String>,
}

impl ServiceValidator {
    pub fn new(known_analysers: impl IntoIterator<Item = String>) -> Self {
        Self {
            known_analysers: known_analysers.into_iter().collect(),
        }
    }

    /// Check a single record. `Ok(())` means the record can be scheduled.
    pub fn validate(&self, record: &ServiceRecord) -> CoreResult<()> {
        if !self.known_analysers.contains(&record.analyser) {
            return Err(CoreError::UnknownAnalyser {
                service_id: record.id.clone(),
                analyser: record.analyser.clone(),
            });
        }
        if record.min_instances > record.max_instances {
            return Err(CoreError::InvalidBounds {
                service_id: record.id.clone(),
                min: record.min_instances,
                max: record.max_instances,
            });
        }
        if record.interval_secs == 0 {
            return Err(CoreError::InvalidInterval {
                service_id: record.id.clone(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn validator() -> ServiceValidator {
        ServiceValidator::new(["queue".to_string(), "backlog".to_string()])
    }

    fn record(analyser: &str) -> ServiceRecord {
        ServiceRecord {
            id: "svc-a".to_string(),
            group: "default".to_string(),
            min_instances: 1,
            max_instances: 5,
            analyser: analyser.to_string(),
            params: BTreeMap::new(),
            interval_secs: 30,
        }
    }

    #[test]
    fn accepts_registered_analyser() {
        validator().validate(&record("queue")).unwrap();
    }

    #[test]
    fn rejects_unregistered_analyser() {
        let err = validator().validate(&record("cpu")).unwrap_err();
        assert!(matches!(err, CoreError::UnknownAnalyser { analyser, .. } if analyser == "cpu"));
    }

    #[test]
    fn rejects_inverted_bounds() {
        let mut rec = record("queue");
        rec.min_instances = 6;
        let err = validator().validate(&rec).unwrap_err();
        assert!(matches!(err, CoreError::InvalidBounds { min: 6, max: 5, .. }));
    }

    #[test]
    fn rejects_zero_interval() {
        let mut rec = record("queue");
        rec.interval_secs = 0;
        let err = validator().validate(&rec).unwrap_err();
        assert!(matches!(err, CoreError::InvalidInterval { .. }));
    }
}
