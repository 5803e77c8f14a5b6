//! Daemon configuration.

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;

fn default_refresh_interval() -> u64 {
    60
}

fn default_health_port() -> u16 {
    8600
}

/// Top-level fleetd configuration, loaded from a TOML file.
#[derive(Debug, Clone, Deserialize)]
pub struct FleetConfig {
    /// The service group this instance is responsible for.
    pub group: String,
    /// Path to the TOML manifest of services to monitor.
    pub services_file: PathBuf,
    /// Delay between discovery refreshes, in seconds.
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_secs: u64,
    /// Port for the `/healthz` endpoint.
    #[serde(default = "default_health_port")]
    pub health_port: u16,
}

impl FleetConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        let config: FleetConfig = toml::from_str(&text)
            .with_context(|| format!("parsing config file {}", path.display()))?;
        if config.refresh_interval_secs == 0 {
            anyhow::bail!("refresh_interval_secs must be nonzero");
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(text: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(text.as_bytes()).unwrap();
        file
    }

    #[test]
    fn loads_minimal_config_with_defaults() {
        let file = write_config(
            r#"
group = "workers"
services_file = "/etc/fleetscale/services.toml"
"#,
        );
        let config = FleetConfig::load(file.path()).unwrap();
        assert_eq!(config.group, "workers");
        assert_eq!(config.refresh_interval_secs, 60);
        assert_eq!(config.health_port, 8600);
    }

    #[test]
    fn rejects_zero_refresh_interval() {
        let file = write_config(
            r#"
group = "workers"
services_file = "/tmp/services.toml"
refresh_interval_secs = 0
"#,
        );
        let err = FleetConfig::load(file.path()).unwrap_err();
        assert!(err.to_string().contains("nonzero"));
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = FleetConfig::load(Path::new("/nonexistent/fleetd.toml")).unwrap_err();
        assert!(err.to_string().contains("reading config file"));
    }
}
