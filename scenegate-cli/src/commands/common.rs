//! Shared setup for commands that talk to the provider.

use std::path::{Path, PathBuf};

use scenegate::config::{config_file_path, ConfigFile};
use scenegate::logging::{self, LogGuard};
use scenegate::provider::{PlanetClient, ReqwestClient};
use tracing::info;

use crate::error::CliError;

/// Resolves the config file location: `--config` if given, else the default.
pub fn resolve_config_path(cli_path: Option<&Path>) -> Result<PathBuf, CliError> {
    match cli_path {
        Some(path) => Ok(path.to_path_buf()),
        None => Ok(config_file_path()?),
    }
}

/// Loads the config file and applies environment overrides.
pub fn load_config(path: &Path) -> Result<ConfigFile, CliError> {
    Ok(ConfigFile::load(path)?.with_env()?)
}

/// Loaded configuration plus initialized logging.
pub struct CliRunner {
    config: ConfigFile,
    config_path: PathBuf,
    _log_guard: LogGuard,
}

impl CliRunner {
    /// Loads configuration and installs the log subscriber.
    pub fn new(cli_config_path: Option<&Path>) -> Result<Self, CliError> {
        let config_path = resolve_config_path(cli_config_path)?;
        let config = load_config(&config_path)?;
        let log_guard = logging::init(config.logging.level, config.logging.file.as_deref())?;

        Ok(Self {
            config,
            config_path,
            _log_guard: log_guard,
        })
    }

    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut ConfigFile {
        &mut self.config
    }

    /// Logs the command being run and where its settings came from.
    pub fn log_startup(&self, command: &str) {
        info!(
            command,
            version = env!("CARGO_PKG_VERSION"),
            config = %self.config_path.display(),
            item_type = %self.config.planet.item_type,
            "SceneGate starting"
        );
    }

    /// Builds a Planet client from the loaded configuration.
    ///
    /// Fails when no API key is configured.
    pub fn create_client(&self) -> Result<PlanetClient<ReqwestClient>, CliError> {
        build_client(&self.config)
    }
}

/// Builds a Planet client for `config`.
pub fn build_client(config: &ConfigFile) -> Result<PlanetClient<ReqwestClient>, CliError> {
    let api_key = config.require_api_key()?;
    let http_client = ReqwestClient::new()?;
    Ok(PlanetClient::with_endpoints(
        http_client,
        api_key,
        config.endpoints(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use scenegate::config::ConfigError;
    use tempfile::TempDir;

    #[test]
    fn test_explicit_config_path_wins() {
        let path = resolve_config_path(Some(Path::new("/tmp/custom.ini"))).unwrap();
        assert_eq!(path, PathBuf::from("/tmp/custom.ini"));
    }

    #[test]
    fn test_load_config_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.ini");
        std::fs::write(&path, "[planet]\nitem_type = PSScene\n").unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.planet.item_type, "PSScene");
    }

    #[test]
    fn test_build_client_requires_api_key() {
        let result = build_client(&ConfigFile::default());
        assert!(matches!(
            result,
            Err(CliError::Config(ConfigError::MissingApiKey))
        ));
    }

    #[test]
    fn test_build_client_uses_configured_endpoints() {
        let mut config = ConfigFile::default();
        config.planet.api_key = Some("key".to_string());
        config.planet.item_type = "PSScene".to_string();

        let client = build_client(&config).unwrap();
        assert_eq!(client.endpoints().item_type, "PSScene");
    }
}
