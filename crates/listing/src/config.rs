use crate::ConfigError;
use dirlens_scanner::DEFAULT_EXCLUDED_PREFIXES;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_PATH_ENV: &str = "DIRLENS_CONFIG";
pub const LOCK_TIMEOUT_ENV: &str = "DIRLENS_LOCK_TIMEOUT_MS";

const DEFAULT_SIZE_CACHE_CAPACITY: i64 = 4096 * 8;
const DEFAULT_LISTING_CACHE_CAPACITY: i64 = 512;
const DEFAULT_LOCK_TIMEOUT_MS: u64 = 10_000;
const DEFAULT_PROGRESS_INTERVAL_MS: u64 = 1_000;

/// Settings read from `dirlens.toml`. Every key is optional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DirlensConfig {
    /// Case-insensitive path prefixes never descended into
    pub exclude: Vec<String>,

    /// Entries kept by the folder size cache
    pub size_cache_capacity: i64,

    /// Entries kept by the listing cache
    pub listing_cache_capacity: i64,

    /// How long a listing waits for the listing lock
    pub lock_timeout_ms: u64,

    /// Minimum spacing of "Examining ..." progress messages
    pub progress_interval_ms: u64,
}

impl Default for DirlensConfig {
    fn default() -> Self {
        Self {
            exclude: DEFAULT_EXCLUDED_PREFIXES
                .iter()
                .map(|prefix| prefix.to_string())
                .collect(),
            size_cache_capacity: DEFAULT_SIZE_CACHE_CAPACITY,
            listing_cache_capacity: DEFAULT_LISTING_CACHE_CAPACITY,
            lock_timeout_ms: DEFAULT_LOCK_TIMEOUT_MS,
            progress_interval_ms: DEFAULT_PROGRESS_INTERVAL_MS,
        }
    }
}

impl DirlensConfig {
    /// Resolve configuration: explicit path, then `DIRLENS_CONFIG`, then defaults.
    /// Environment overrides are applied last and capacities are validated.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let from_env = std::env::var_os(CONFIG_PATH_ENV)
            .filter(|raw| !raw.is_empty())
            .map(PathBuf::from);
        let mut config = match explicit.map(Path::to_path_buf).or(from_env) {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };

        let raw_timeout = std::env::var(LOCK_TIMEOUT_ENV).ok();
        config.lock_timeout_ms = parse_timeout_ms(raw_timeout.as_deref(), config.lock_timeout_ms);

        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        non_negative("size_cache_capacity", self.size_cache_capacity)?;
        non_negative("listing_cache_capacity", self.listing_cache_capacity)?;
        Ok(())
    }

    pub fn lock_timeout(&self) -> Duration {
        Duration::from_millis(self.lock_timeout_ms)
    }

    pub fn progress_interval(&self) -> Duration {
        Duration::from_millis(self.progress_interval_ms)
    }
}

fn non_negative(field: &'static str, value: i64) -> Result<(), ConfigError> {
    if value < 0 {
        return Err(ConfigError::InvalidCapacity { field, value });
    }
    Ok(())
}

fn parse_timeout_ms(raw: Option<&str>, default_value: u64) -> u64 {
    let parsed = raw
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(|v| v.parse::<u64>());
    match parsed {
        Some(Ok(value)) => value,
        Some(Err(err)) => {
            log::warn!("Ignoring {LOCK_TIMEOUT_ENV}: {err}");
            default_value
        }
        None => default_value,
    }
}
