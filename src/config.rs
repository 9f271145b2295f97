use crate::catalog::DEFAULT_CATALOG_URL;
use crate::error::{GoverError, Result};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;

/// Runtime configuration: the two managed directories plus the catalog
/// endpoint settings. Directories come from the environment, the rest from
/// an optional TOML file.
#[derive(Debug, Clone)]
pub struct Config {
    /// Where the versioned `go<version>` binaries and the active `go`
    /// symlink live. `$GOBIN`, or `~/go/bin` when unset.
    pub gobin_dir: PathBuf,

    /// Where `go<version> download` unpacks SDK payloads (`~/sdk`, fixed
    /// by golang.org/dl).
    pub sdk_dir: PathBuf,

    pub config_file: PathBuf,

    /// Endpoint listing all published versions, newest first.
    pub catalog_url: String,

    /// Timeout for the one catalog request.
    pub fetch_timeout_secs: u64,
}

/// The subset of [`Config`] that may be overridden from the config file.
#[derive(Debug, Deserialize)]
struct FileConfig {
    catalog_url: Option<String>,
    fetch_timeout_secs: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        let home = dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from(shellexpand::tilde("~").to_string()));

        let gobin_dir = match std::env::var("GOBIN") {
            Ok(dir) if !dir.is_empty() => PathBuf::from(shellexpand::tilde(&dir).to_string()),
            _ => home.join("go").join("bin"),
        };

        Self {
            gobin_dir,
            sdk_dir: home.join("sdk"),
            config_file: home.join(".config").join("gover").join("config.toml"),
            catalog_url: DEFAULT_CATALOG_URL.to_string(),
            fetch_timeout_secs: 60,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let mut config = Self::default();

        if config.config_file.exists() {
            debug!("loading {}", config.config_file.display());
            let contents = std::fs::read_to_string(&config.config_file)?;
            let file_config: FileConfig = toml::from_str(&contents)?;

            if let Some(url) = file_config.catalog_url {
                config.catalog_url = url;
            }
            if let Some(secs) = file_config.fetch_timeout_secs {
                if secs == 0 {
                    return Err(GoverError::Config(
                        "fetch_timeout_secs must be positive".to_string(),
                    ));
                }
                config.fetch_timeout_secs = secs;
            }
        }

        Ok(config)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.catalog_url, DEFAULT_CATALOG_URL);
        assert_eq!(config.fetch_timeout(), Duration::from_secs(60));
        assert!(config.sdk_dir.ends_with("sdk"));
    }

    #[test]
    fn test_file_overlay() {
        let file_config: FileConfig =
            toml::from_str("catalog_url = \"http://localhost:1/dl\"\n").unwrap();
        assert_eq!(file_config.catalog_url.as_deref(), Some("http://localhost:1/dl"));
        assert_eq!(file_config.fetch_timeout_secs, None);
    }
}
