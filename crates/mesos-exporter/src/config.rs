//! mesos-exporter.toml configuration.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use mesos_client::{ClientConfig, ServiceAccountSecret, StrictAuth};

pub const DEFAULT_LISTEN: &str = "0.0.0.0:9105";

#[derive(Debug, Clone, Deserialize)]
pub struct ExporterConfig {
    #[serde(default = "default_listen")]
    pub listen: SocketAddr,
    pub master: ClientConfig,
    /// Ordered allowlist of agent attributes exported as labels.
    #[serde(default)]
    pub slave_attribute_labels: Vec<String>,
    /// DC/OS service account secret; enables strict mode.
    #[serde(default)]
    pub service_account_secret: Option<PathBuf>,
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LogConfig {
    #[serde(default)]
    pub json: bool,
}

fn default_listen() -> SocketAddr {
    DEFAULT_LISTEN.parse().unwrap_or_else(|_| SocketAddr::from(([0, 0, 0, 0], 9105)))
}

impl ExporterConfig {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: ExporterConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Minimal config for a master URL given on the command line.
    pub fn for_master(url: &str) -> Self {
        Self {
            listen: default_listen(),
            master: ClientConfig::new(url),
            slave_attribute_labels: Vec::new(),
            service_account_secret: None,
            log: LogConfig::default(),
        }
    }

    /// Load the service account secret, if configured, into strict mode.
    pub fn resolve_secret(&mut self) -> anyhow::Result<()> {
        if let Some(path) = &self.service_account_secret {
            let secret = ServiceAccountSecret::from_file(path)?;
            self.master.strict = Some(StrictAuth::from(secret));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn parse_minimal() {
        let config: ExporterConfig = toml::from_str(
            r#"
[master]
url = "http://leader.mesos:5050"
"#,
        )
        .unwrap();
        assert_eq!(config.listen, default_listen());
        assert_eq!(config.master.url, "http://leader.mesos:5050");
        assert!(config.slave_attribute_labels.is_empty());
        assert!(!config.log.json);
    }

    #[test]
    fn parse_full() {
        let config: ExporterConfig = toml::from_str(
            r#"
listen = "127.0.0.1:9200"
slave_attribute_labels = ["rack", "zone"]

[master]
url = "https://leader.mesos:5050"
skip_ssl_verify = true

[master.basic_auth]
username = "ops"
password = "secret"

[log]
json = true
"#,
        )
        .unwrap();
        assert_eq!(config.listen.port(), 9200);
        assert_eq!(config.slave_attribute_labels, ["rack", "zone"]);
        assert!(config.master.skip_ssl_verify);
        assert_eq!(config.master.basic_auth.unwrap().username, "ops");
        assert!(config.log.json);
    }

    #[test]
    fn resolve_secret_enables_strict_mode() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"login_endpoint": "https://leader.mesos/acs/api/v1/auth/login",
                "private_key": "pem", "scheme": "RS256", "uid": "exporter"}}"#
        )
        .unwrap();

        let mut config = ExporterConfig::for_master("http://leader.mesos:5050");
        config.service_account_secret = Some(file.path().to_path_buf());
        config.resolve_secret().unwrap();

        let strict = config.master.strict.unwrap();
        assert_eq!(strict.uid, "exporter");
        assert_eq!(strict.login_url, "https://leader.mesos/acs/api/v1/auth/login");
    }
}
