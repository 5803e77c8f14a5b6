//! Backlog analyser — the reference workload analyser.
//!
//! Reads a numeric backlog (for example a queue depth exported by another
//! process) from a file named in the service's params and recommends
//! `ceil(backlog / backlog_per_instance)` instances. Clamping to the
//! service's bounds is the monitor task's job, not ours.
//!
//! Params:
//! - `backlog_file` (required): path to a file containing a single integer.
//! - `backlog_per_instance` (optional, default 100): how much backlog one
//!   instance is expected to absorb.

use std::path::PathBuf;

use anyhow::{Context, anyhow};
use async_trait::async_trait;
use fleetscale_core::{
    CoreError, CoreResult, HealthReporter, Recommendation, ServiceRecord, WorkloadAnalyser,
    WorkloadAnalyserFactory,
};

const ANALYSER_NAME: &str = "backlog";
const DEFAULT_BACKLOG_PER_INSTANCE: u64 = 100;

pub struct FileMetricAnalyserFactory;

#[async_trait]
impl WorkloadAnalyserFactory for FileMetricAnalyserFactory {
    fn analyser_name(&self) -> &str {
        ANALYSER_NAME
    }

    fn create(&self, record: &ServiceRecord) -> CoreResult<Box<dyn WorkloadAnalyser>> {
        let backlog_file = record.params.get("backlog_file").ok_or_else(|| {
            CoreError::AnalyserCreate {
                analyser: ANALYSER_NAME.to_string(),
                reason: anyhow!("service {}: missing required param \"backlog_file\"", record.id),
            }
        })?;

        let per_instance = match record.params.get("backlog_per_instance") {
            Some(value) => value
                .parse::<u64>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| CoreError::AnalyserCreate {
                    analyser: ANALYSER_NAME.to_string(),
                    reason: anyhow!(
                        "service {}: backlog_per_instance must be a positive integer, got {value:?}",
                        record.id
                    ),
                })?,
            None => DEFAULT_BACKLOG_PER_INSTANCE,
        };

        Ok(Box::new(FileMetricAnalyser {
            path: PathBuf::from(backlog_file),
            per_instance,
        }))
    }
}

#[async_trait]
impl HealthReporter for FileMetricAnalyserFactory {
    async fn health_check(&self) -> anyhow::Result<()> {
        Ok(())
    }
}

struct FileMetricAnalyser {
    path: PathBuf,
    per_instance: u64,
}

#[async_trait]
impl WorkloadAnalyser for FileMetricAnalyser {
    async fn analyse(&mut self, _record: &ServiceRecord) -> CoreResult<Recommendation> {
        let backlog = self.read_backlog().await.map_err(CoreError::Analysis)?;
        let target = backlog.div_ceil(self.per_instance);
        Ok(Recommendation::Target(
            u32::try_from(target).unwrap_or(u32::MAX),
        ))
    }
}

impl FileMetricAnalyser {
    async fn read_backlog(&self) -> anyhow::Result<u64> {
        let text = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("reading backlog file {}", self.path.display()))?;
        text.trim()
            .parse::<u64>()
            .with_context(|| format!("backlog file {} is not an integer", self.path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use std::io::Write;

    fn record_with(params: &[(&str, &str)]) -> ServiceRecord {
        ServiceRecord {
            id: "ingest-worker".to_string(),
            group: "workers".to_string(),
            min_instances: 1,
            max_instances: 10,
            analyser: "backlog".to_string(),
            params: params
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            interval_secs: 30,
        }
    }

    fn backlog_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[tokio::test]
    async fn recommends_ceil_of_backlog_over_per_instance() {
        let file = backlog_file("250\n");
        let path = file.path().to_str().unwrap();
        let record = record_with(&[("backlog_file", path)]);

        let mut analyser = FileMetricAnalyserFactory.create(&record).unwrap();
        let rec = analyser.analyse(&record).await.unwrap();
        assert_eq!(rec, Recommendation::Target(3));
    }

    #[tokio::test]
    async fn zero_backlog_recommends_zero() {
        let file = backlog_file("0");
        let path = file.path().to_str().unwrap();
        let record = record_with(&[("backlog_file", path)]);

        let mut analyser = FileMetricAnalyserFactory.create(&record).unwrap();
        let rec = analyser.analyse(&record).await.unwrap();
        assert_eq!(rec, Recommendation::Target(0));
    }

    #[tokio::test]
    async fn honours_per_instance_override() {
        let file = backlog_file("90");
        let path = file.path().to_str().unwrap();
        let record = record_with(&[("backlog_file", path), ("backlog_per_instance", "30")]);

        let mut analyser = FileMetricAnalyserFactory.create(&record).unwrap();
        let rec = analyser.analyse(&record).await.unwrap();
        assert_eq!(rec, Recommendation::Target(3));
    }

    #[tokio::test]
    async fn missing_backlog_file_param_fails_creation() {
        let record = record_with(&[]);
        let err = FileMetricAnalyserFactory.create(&record).err().unwrap();
        assert!(matches!(err, CoreError::AnalyserCreate { .. }));
    }

    #[tokio::test]
    async fn non_numeric_per_instance_fails_creation() {
        let record = record_with(&[("backlog_file", "/tmp/x"), ("backlog_per_instance", "many")]);
        let err = FileMetricAnalyserFactory.create(&record).err().unwrap();
        assert!(matches!(err, CoreError::AnalyserCreate { .. }));
    }

    #[tokio::test]
    async fn unreadable_backlog_is_an_analysis_error() {
        let record = record_with(&[("backlog_file", "/nonexistent/backlog")]);
        let mut analyser = FileMetricAnalyserFactory.create(&record).unwrap();
        let err = analyser.analyse(&record).await.unwrap_err();
        assert!(matches!(err, CoreError::Analysis(_)));
    }

    #[tokio::test]
    async fn garbage_backlog_is_an_analysis_error() {
        let file = backlog_file("lots");
        let path = file.path().to_str().unwrap().to_string();
        let mut params = BTreeMap::new();
        params.insert("backlog_file".to_string(), path);
        let mut record = record_with(&[]);
        record.params = params;

        let mut analyser = FileMetricAnalyserFactory.create(&record).unwrap();
        assert!(analyser.analyse(&record).await.is_err());
    }
}
