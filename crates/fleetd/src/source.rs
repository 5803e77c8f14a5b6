//! File-backed service discovery.
//!
//! Rereads a TOML manifest of service records on every discovery cycle and
//! keeps only the records of this instance's group. Editing the manifest is
//! how services are added, changed, or removed at runtime.

use std::path::PathBuf;

use anyhow::Context;
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use fleetscale_core::{CoreError, CoreResult, HealthReporter, ServiceRecord, ServiceSet, ServiceSource};

#[derive(Debug, Deserialize)]
struct ServiceManifest {
    #[serde(default)]
    services: Vec<ServiceRecord>,
}

/// Discovery source reading service records from a TOML manifest.
pub struct FileServiceSource {
    path: PathBuf,
    group: String,
}

impl FileServiceSource {
    pub fn new(path: PathBuf, group: String) -> Self {
        Self { path, group }
    }

    async fn read_manifest(&self) -> anyhow::Result<ServiceManifest> {
        let text = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("reading service manifest {}", self.path.display()))?;
        toml::from_str(&text)
            .with_context(|| format!("parsing service manifest {}", self.path.display()))
    }
}

#[async_trait]
impl ServiceSource for FileServiceSource {
    async fn get_services(&self) -> CoreResult<ServiceSet> {
        let manifest = self.read_manifest().await.map_err(CoreError::Discovery)?;

        let mut set = ServiceSet::new();
        for record in manifest.services {
            if record.group != self.group {
                debug!(
                    service_id = %record.id,
                    group = %record.group,
                    "skipping service outside our group"
                );
                continue;
            }
            let id = record.id.clone();
            if set.insert(id.clone(), record).is_some() {
                warn!(service_id = %id, "duplicate service id in manifest, keeping the last entry");
            }
        }
        Ok(set)
    }
}

#[async_trait]
impl HealthReporter for FileServiceSource {
    async fn health_check(&self) -> anyhow::Result<()> {
        self.read_manifest().await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn manifest(text: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(text.as_bytes()).unwrap();
        file
    }

    const TWO_GROUPS: &str = r#"
[[services]]
id = "ingest-worker"
group = "workers"
min_instances = 1
max_instances = 8
analyser = "backlog"
interval_secs = 30
params = { backlog_file = "/var/run/ingest.backlog" }

[[services]]
id = "billing-api"
group = "frontends"
min_instances = 2
max_instances = 4
analyser = "backlog"
interval_secs = 60
"#;

    #[tokio::test]
    async fn filters_to_own_group() {
        let file = manifest(TWO_GROUPS);
        let source = FileServiceSource::new(file.path().to_path_buf(), "workers".to_string());

        let set = source.get_services().await.unwrap();
        assert_eq!(set.len(), 1);
        let rec = &set["ingest-worker"];
        assert_eq!(rec.max_instances, 8);
        assert_eq!(rec.params["backlog_file"], "/var/run/ingest.backlog");
    }

    #[tokio::test]
    async fn empty_manifest_yields_empty_set() {
        let file = manifest("");
        let source = FileServiceSource::new(file.path().to_path_buf(), "workers".to_string());
        assert!(source.get_services().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_manifest_is_a_discovery_error() {
        let source =
            FileServiceSource::new(PathBuf::from("/nonexistent/services.toml"), "workers".into());
        let err = source.get_services().await.unwrap_err();
        assert!(matches!(err, CoreError::Discovery(_)));
        assert!(source.health_check().await.is_err());
    }

    #[tokio::test]
    async fn malformed_manifest_is_a_discovery_error() {
        let file = manifest("[[services]]\nid = 42\n");
        let source = FileServiceSource::new(file.path().to_path_buf(), "workers".to_string());
        assert!(matches!(
            source.get_services().await.unwrap_err(),
            CoreError::Discovery(_)
        ));
    }

    #[tokio::test]
    async fn healthy_when_manifest_parses() {
        let file = manifest(TWO_GROUPS);
        let source = FileServiceSource::new(file.path().to_path_buf(), "workers".to_string());
        source.health_check().await.unwrap();
    }
}
