//! Configuration loading and credential resolution
//!
//! Settings resolve in priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::{Error, Result};

/// Environment variable holding the USDA FoodData Central API key
pub const USDA_API_KEY_ENV: &str = "USDA_API_KEY";

/// Default listen host
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default listen port
pub const DEFAULT_PORT: u16 = 5000;

/// Contents of `config.toml`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub usda_api_key: Option<String>,
    pub logging: LoggingConfig,
    pub providers: ProvidersConfig,
}

/// `[logging]` table
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Fallback `EnvFilter` directive when `RUST_LOG` is unset
    pub level: Option<String>,
}

/// `[providers]` table
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvidersConfig {
    pub openfoodfacts: EndpointConfig,
    pub upcitemdb: EndpointConfig,
    pub usda: EndpointConfig,
    pub translate: EndpointConfig,
}

/// Overrides for one external provider
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointConfig {
    pub base_url: Option<String>,
    pub timeout_secs: Option<u64>,
}

impl EndpointConfig {
    pub fn base_url_or(&self, default: &str) -> String {
        self.base_url
            .as_deref()
            .map(|url| url.trim_end_matches('/'))
            .filter(|url| !url.is_empty())
            .unwrap_or(default)
            .to_string()
    }

    pub fn timeout_or(&self, default: Duration) -> Duration {
        self.timeout_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .unwrap_or(default)
    }
}

/// Caller-supplied provider credentials
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub usda_api_key: Option<String>,
}

impl Credentials {
    /// USDA key, if configured and non-blank
    pub fn usda_api_key(&self) -> Option<&str> {
        self.usda_api_key.as_deref().filter(|key| is_valid_key(key))
    }
}

/// Validate API key (non-empty, non-whitespace)
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}

/// Per-user config file location (`~/.config/fooderator/config.toml` on Linux)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("fooderator").join("config.toml"))
}

/// Load the TOML config.
///
/// An explicit path must exist. Without one, the per-user default location is
/// tried and a missing file yields the defaults.
pub fn load_toml_config(explicit: Option<&Path>) -> Result<TomlConfig> {
    let path = match explicit {
        Some(path) => {
            if !path.exists() {
                return Err(Error::Config(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            path.to_path_buf()
        }
        None => match default_config_path() {
            Some(path) if path.exists() => path,
            _ => {
                debug!("No config file found, using defaults");
                return Ok(TomlConfig::default());
            }
        },
    };

    let content = std::fs::read_to_string(&path)?;
    let config: TomlConfig = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))?;

    info!("Loaded configuration from {}", path.display());
    Ok(config)
}

/// Resolve the USDA API key from CLI → ENV → TOML.
///
/// Returns `None` when no tier holds a valid key; the USDA source is then
/// skipped during resolution.
pub fn resolve_usda_api_key(cli_key: Option<&str>, toml_config: &TomlConfig) -> Option<String> {
    let env_key = std::env::var(USDA_API_KEY_ENV).ok();
    let tiers = [
        ("command line", cli_key),
        ("environment", env_key.as_deref()),
        ("TOML", toml_config.usda_api_key.as_deref()),
    ];

    let valid: Vec<(&str, &str)> = tiers
        .iter()
        .filter_map(|(source, key)| key.filter(|k| is_valid_key(k)).map(|k| (*source, k)))
        .collect();

    if valid.len() > 1 {
        let sources: Vec<&str> = valid.iter().map(|(source, _)| *source).collect();
        warn!(
            "USDA API key found in multiple sources: {}. Using {} (highest priority).",
            sources.join(", "),
            sources[0]
        );
    }

    match valid.first() {
        Some((source, key)) => {
            info!("USDA API key loaded from {}", source);
            Some(key.trim().to_string())
        }
        None => {
            warn!(
                "USDA API key not configured; USDA FoodData Central lookups are disabled. \
                 Set {} or usda_api_key in config.toml",
                USDA_API_KEY_ENV
            );
            None
        }
    }
}

/// Resolve the listen address from CLI → TOML → default
pub fn resolve_bind_addr(
    cli_host: Option<&str>,
    cli_port: Option<u16>,
    toml_config: &TomlConfig,
) -> String {
    let host = cli_host
        .or(toml_config.host.as_deref())
        .unwrap_or(DEFAULT_HOST);
    let port = cli_port.or(toml_config.port).unwrap_or(DEFAULT_PORT);
    format!("{}:{}", host, port)
}
