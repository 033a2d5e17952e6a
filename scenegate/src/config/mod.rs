//! Configuration file handling.
//!
//! Settings live in an INI file, by default `~/.scenegate/config.ini`.
//! A missing file is not an error: every setting has a built-in default
//! except the Planet API key, which is only required by commands that talk
//! to the provider.
//!
//! # Precedence
//!
//! CLI flags > environment variables > config file > built-in defaults.
//! The CLI applies its own overrides on top of [`ConfigFile`].
//!
//! # Example
//!
//! ```ini
//! [planet]
//! api_key = PLAK...
//! item_type = Landsat8L1G
//!
//! [server]
//! bind = 127.0.0.1:8000
//!
//! [logging]
//! level = info
//! ```

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use ini::Ini;
use thiserror::Error;
use tracing::Level;

use crate::provider::{PlanetEndpoints, DEFAULT_API_URL, DEFAULT_TILES_URL};
use crate::search::DEFAULT_ITEM_TYPE;

/// Directory under the home directory holding SceneGate files.
pub const CONFIG_DIR_NAME: &str = ".scenegate";

/// Name of the configuration file.
pub const CONFIG_FILE_NAME: &str = "config.ini";

/// Environment variable overriding `planet.api_key`.
pub const ENV_API_KEY: &str = "PLANET_API_KEY";

/// Environment variable overriding `server.bind`.
pub const ENV_BIND: &str = "SCENEGATE_BIND";

/// Default listen address of the gateway.
pub const DEFAULT_BIND: &str = "127.0.0.1:8000";

/// Accepted values for `logging.level`.
const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {message}")]
    Read { path: PathBuf, message: String },

    #[error("Failed to write config file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid value for {key}: '{value}' ({reason})")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },

    #[error("No Planet API key configured. Set PLANET_API_KEY or api_key in the [planet] section")]
    MissingApiKey,

    #[error("Config file already exists: {0}")]
    AlreadyExists(PathBuf),

    #[error("Could not determine home directory")]
    NoHomeDirectory,
}

/// Provider settings (`[planet]`).
#[derive(Debug, Clone, PartialEq)]
pub struct PlanetSettings {
    pub api_key: Option<String>,
    pub item_type: String,
    pub api_url: String,
    pub tiles_url: String,
}

impl Default for PlanetSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            item_type: DEFAULT_ITEM_TYPE.to_string(),
            api_url: DEFAULT_API_URL.to_string(),
            tiles_url: DEFAULT_TILES_URL.to_string(),
        }
    }
}

/// Gateway settings (`[server]`).
#[derive(Debug, Clone, PartialEq)]
pub struct ServerSettings {
    pub bind: SocketAddr,
    /// PNG served on tile failure instead of the generated placeholder.
    pub tile_error_image: Option<PathBuf>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            tile_error_image: None,
        }
    }
}

fn default_bind() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 8000))
}

/// Logging settings (`[logging]`).
#[derive(Debug, Clone, PartialEq)]
pub struct LoggingSettings {
    pub level: Level,
    /// Log file; logs go to stderr when unset.
    pub file: Option<PathBuf>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            file: None,
        }
    }
}

/// Parsed configuration file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigFile {
    pub planet: PlanetSettings,
    pub server: ServerSettings,
    pub logging: LoggingSettings,
}

impl ConfigFile {
    /// Loads the file at `path`, falling back to defaults if it does not exist.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let ini = Ini::load_from_file(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        Self::from_ini(&ini)
    }

    /// Parses configuration from INI text.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let ini = Ini::load_from_str(content).map_err(|e| ConfigError::Read {
            path: PathBuf::from("<string>"),
            message: e.to_string(),
        })?;

        Self::from_ini(&ini)
    }

    fn from_ini(ini: &Ini) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(section) = ini.section(Some("planet")) {
            if let Some(v) = non_empty(section.get("api_key")) {
                config.planet.api_key = Some(v.to_string());
            }
            if let Some(v) = non_empty(section.get("item_type")) {
                config.planet.item_type = v.to_string();
            }
            if let Some(v) = non_empty(section.get("api_url")) {
                config.planet.api_url = v.trim_end_matches('/').to_string();
            }
            if let Some(v) = non_empty(section.get("tiles_url")) {
                config.planet.tiles_url = v.trim_end_matches('/').to_string();
            }
        }

        if let Some(section) = ini.section(Some("server")) {
            if let Some(v) = non_empty(section.get("bind")) {
                config.server.bind = parse_bind("server.bind", v)?;
            }
            if let Some(v) = non_empty(section.get("tile_error_image")) {
                config.server.tile_error_image = Some(PathBuf::from(v));
            }
        }

        if let Some(section) = ini.section(Some("logging")) {
            if let Some(v) = non_empty(section.get("level")) {
                config.logging.level = parse_level("logging.level", v)?;
            }
            if let Some(v) = non_empty(section.get("file")) {
                config.logging.file = Some(PathBuf::from(v));
            }
        }

        Ok(config)
    }

    /// Applies environment overrides from the process environment.
    pub fn with_env(self) -> Result<Self, ConfigError> {
        self.with_env_from(|key| std::env::var(key).ok())
    }

    /// Applies environment overrides from an arbitrary lookup.
    pub fn with_env_from<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup(ENV_API_KEY).filter(|v| !v.trim().is_empty()) {
            self.planet.api_key = Some(key.trim().to_string());
        }
        if let Some(bind) = lookup(ENV_BIND).filter(|v| !v.trim().is_empty()) {
            self.server.bind = parse_bind(ENV_BIND, &bind)?;
        }
        Ok(self)
    }

    /// Returns the API key, or an error if none is configured.
    pub fn require_api_key(&self) -> Result<&str, ConfigError> {
        self.planet
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or(ConfigError::MissingApiKey)
    }

    /// Provider endpoints described by the `[planet]` section.
    pub fn endpoints(&self) -> PlanetEndpoints {
        PlanetEndpoints {
            api_url: self.planet.api_url.clone(),
            tiles_url: self.planet.tiles_url.clone(),
            item_type: self.planet.item_type.clone(),
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Parses a listen address.
pub fn parse_bind(key: &str, value: &str) -> Result<SocketAddr, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|e: std::net::AddrParseError| ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
            reason: e.to_string(),
        })
}

/// Parses a log level name.
pub fn parse_level(key: &str, value: &str) -> Result<Level, ConfigError> {
    let normalized = value.trim().to_lowercase();
    if !LOG_LEVELS.contains(&normalized.as_str()) {
        return Err(ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
            reason: format!("expected one of {}", LOG_LEVELS.join(", ")),
        });
    }

    normalized.parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
        reason: "unrecognized level".to_string(),
    })
}

/// Default config file location, `~/.scenegate/config.ini`.
pub fn config_file_path() -> Result<PathBuf, ConfigError> {
    dirs::home_dir()
        .map(|home| home.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
        .ok_or(ConfigError::NoHomeDirectory)
}

/// Writes a config file populated with defaults.
///
/// Refuses to overwrite an existing file.
pub fn write_default_config(path: &Path) -> Result<(), ConfigError> {
    if path.exists() {
        return Err(ConfigError::AlreadyExists(path.to_path_buf()));
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })?;
    }

    let mut ini = Ini::new();
    ini.with_section(Some("planet"))
        .set("api_key", "")
        .set("item_type", DEFAULT_ITEM_TYPE)
        .set("api_url", DEFAULT_API_URL)
        .set("tiles_url", DEFAULT_TILES_URL);
    ini.with_section(Some("server"))
        .set("bind", DEFAULT_BIND)
        .set("tile_error_image", "");
    ini.with_section(Some("logging"))
        .set("level", "info")
        .set("file", "");

    ini.write_to_file(path)
        .map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })
}
