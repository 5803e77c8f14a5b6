//! Analyser factory registry.
//!
//! Built once at startup from an explicit list of factories (no runtime
//! plugin discovery) and read-only thereafter.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use fleetscale_core::{
    CoreError, CoreResult, ServiceRecord, WorkloadAnalyser, WorkloadAnalyserFactory,
};

/// Mapping from analyser type name to the factory producing its instances.
pub struct AnalyserRegistry {
    factories: HashMap<String, Arc<dyn WorkloadAnalyserFactory>>,
}

impl AnalyserRegistry {
    /// Build the registry. Fails when no factories are supplied — a control
    /// plane without a single analyser cannot monitor anything — or when
    /// two factories claim the same name.
    pub fn new(factories: Vec<Arc<dyn WorkloadAnalyserFactory>>) -> CoreResult<Self> {
        if factories.is_empty() {
            return Err(CoreError::NoAnalysers);
        }
        let mut map: HashMap<String, Arc<dyn WorkloadAnalyserFactory>> = HashMap::new();
        for factory in factories {
            let name = factory.analyser_name().to_string();
            debug!(analyser = %name, "registering workload analyser");
            if map.insert(name.clone(), factory).is_some() {
                return Err(CoreError::DuplicateAnalyser(name));
            }
        }
        Ok(Self { factories: map })
    }

    /// The registered analyser type names.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    /// Create an analyser instance bound to the given record.
    pub fn create(&self, record: &ServiceRecord) -> CoreResult<Box<dyn WorkloadAnalyser>> {
        let factory = self
            .factories
            .get(&record.analyser)
            .ok_or_else(|| CoreError::UnknownAnalyser {
                service_id: record.id.clone(),
                analyser: record.analyser.clone(),
            })?;
        factory.create(record)
    }

    /// Iterate factories by name, for per-factory health checks.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Arc<dyn WorkloadAnalyserFactory>)> {
        self.factories.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}
