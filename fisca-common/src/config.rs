//! Configuration loading for the fisca services
//!
//! Resolution priority, per setting: environment variable → TOML config
//! file → compiled default. A warning is logged when a setting is supplied
//! by more than one source.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tracing::warn;

/// Default base URL of the variable metadata authority
pub const DEFAULT_METADATA_BASE_URL: &str = "https://api.fr.openfisca.org/latest/variables";

/// Default URL of the calculation service
pub const DEFAULT_CALCULATION_URL: &str = "https://api.fr.openfisca.org/latest/calculate";

/// Default metadata cache TTL in seconds (10 minutes)
pub const DEFAULT_CACHE_TTL_SECS: u64 = 600;

/// Raw TOML configuration file contents
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    pub metadata_base_url: Option<String>,
    pub calculation_url: Option<String>,
    pub cache_ttl_secs: Option<u64>,
    pub debug_mode: Option<bool>,
}

impl TomlConfig {
    /// Parse a TOML configuration file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("invalid TOML in {}: {}", path.display(), e)))
    }
}

/// Fully resolved service configuration
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Base URL of the variable metadata authority
    pub metadata_base_url: String,
    /// URL of the calculation service
    pub calculation_url: String,
    /// Metadata cache TTL
    pub cache_ttl: Duration,
    /// Strict mode: fail on unresolved placements or metadata fetch errors
    pub debug_mode: bool,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            metadata_base_url: DEFAULT_METADATA_BASE_URL.to_string(),
            calculation_url: DEFAULT_CALCULATION_URL.to_string(),
            cache_ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
            debug_mode: false,
        }
    }
}

impl ServiceConfig {
    /// Load configuration from an optional TOML file, then apply
    /// environment-variable overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let toml_config = match path {
            Some(path) => TomlConfig::from_file(path)?,
            None => TomlConfig::default(),
        };
        Self::resolve(&toml_config)
    }

    /// Resolve configuration with ENV → TOML → default priority
    pub fn resolve(toml_config: &TomlConfig) -> Result<Self> {
        let metadata_base_url = resolve_string(
            "FISCA_METADATA_BASE_URL",
            toml_config.metadata_base_url.as_deref(),
            DEFAULT_METADATA_BASE_URL,
        );
        let calculation_url = resolve_string(
            "FISCA_CALCULATION_URL",
            toml_config.calculation_url.as_deref(),
            DEFAULT_CALCULATION_URL,
        );

        let cache_ttl_secs = match std::env::var("FISCA_CACHE_TTL_SECS") {
            Ok(raw) => raw.parse::<u64>().map_err(|_| {
                Error::Config(format!("FISCA_CACHE_TTL_SECS is not a valid integer: {raw}"))
            })?,
            Err(_) => toml_config.cache_ttl_secs.unwrap_or(DEFAULT_CACHE_TTL_SECS),
        };

        let debug_mode = match std::env::var("FISCA_DEBUG") {
            Ok(raw) => matches!(raw.as_str(), "1" | "true" | "TRUE" | "yes"),
            Err(_) => toml_config.debug_mode.unwrap_or(false),
        };

        Ok(Self {
            metadata_base_url,
            calculation_url,
            cache_ttl: Duration::from_secs(cache_ttl_secs),
            debug_mode,
        })
    }
}

fn resolve_string(env_var: &str, toml_value: Option<&str>, default: &str) -> String {
    let env_value = std::env::var(env_var).ok();
    if env_value.is_some() && toml_value.is_some() {
        warn!(
            "{} set in both environment and TOML config. Using environment (highest priority).",
            env_var
        );
    }
    env_value
        .or_else(|| toml_value.map(str::to_string))
        .unwrap_or_else(|| default.to_string())
}
