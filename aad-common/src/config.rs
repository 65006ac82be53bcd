//! Configuration loading and config file resolution
//!
//! Resolution priority for the config file path:
//! 1. Command-line argument (highest priority)
//! 2. `AAD_CONFIG` environment variable
//! 3. OS-dependent config directory (`<config_dir>/aad/aad.toml`)
//!
//! A missing or partial config file never aborts startup: missing keys take
//! their compiled defaults and a missing file is reported with a warning.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "AAD_CONFIG";

/// Default MusicBrainz web service root
pub const DEFAULT_MUSICBRAINZ_URL: &str = "https://musicbrainz.org/ws/2";

/// MusicBrainz allows one request per second per client
pub const DEFAULT_RATE_LIMIT_MS: u64 = 1000;

/// Default User-Agent (MusicBrainz rejects anonymous clients)
pub const DEFAULT_USER_AGENT: &str = "AAD/0.1.0 (additional-artist-details)";

/// Top-level TOML configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub logging: LoggingConfig,
    pub details: DetailsConfig,
    pub musicbrainz: MusicBrainzConfig,
}

/// Logging section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default tracing filter when `RUST_LOG` is unset
    pub level: String,
    /// Optional log file (stderr when unset)
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

/// Artist details options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetailsConfig {
    /// Resolve details for track artists, not only album artists
    pub process_track_artists: bool,
    /// Keep county names in composed location strings
    pub include_county: bool,
    /// Keep municipality names in composed location strings
    pub include_municipality: bool,
    /// Keep subdivision names in composed location strings
    pub include_subdivision: bool,
    /// Per-fetch timeout in seconds
    pub fetch_timeout_secs: u64,
    /// Allow a failed lookup to be fetched again on a later reference
    pub retry_failed_lookups: bool,
}

impl Default for DetailsConfig {
    fn default() -> Self {
        Self {
            process_track_artists: false,
            include_county: true,
            include_municipality: true,
            include_subdivision: true,
            fetch_timeout_secs: 10,
            retry_failed_lookups: false,
        }
    }
}

/// Knowledge-service section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MusicBrainzConfig {
    pub base_url: String,
    pub user_agent: String,
    /// Minimum spacing between requests in milliseconds (0 disables)
    pub rate_limit_ms: u64,
}

impl Default for MusicBrainzConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_MUSICBRAINZ_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            rate_limit_ms: DEFAULT_RATE_LIMIT_MS,
        }
    }
}

/// Resolve which config file to use
///
/// Returns `None` only when no candidate path can be determined at all
/// (no CLI argument, no environment variable, no platform config dir).
pub fn resolve_config_path(cli_arg: Option<&Path>) -> Option<PathBuf> {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    // Priority 3: Platform config directory
    default_config_path()
}

/// Platform default config file location
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("aad").join("aad.toml"))
}

/// Parse a TOML config file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read TOML failed ({}): {}", path.display(), e)))?;
    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse TOML failed ({}): {}", path.display(), e)))
}

/// Load config with graceful degradation
///
/// A missing file yields defaults with a warning. A file that exists but does
/// not parse is an error, since silently ignoring it would hide user mistakes.
pub fn load_or_default(cli_arg: Option<&Path>) -> Result<TomlConfig> {
    let Some(path) = resolve_config_path(cli_arg) else {
        warn!("No config directory available; using default configuration");
        return Ok(TomlConfig::default());
    };

    if !path.exists() {
        warn!(
            "Config file {} not found; using default configuration",
            path.display()
        );
        return Ok(TomlConfig::default());
    }

    let config = load_toml_config(&path)?;
    info!("Configuration loaded from {}", path.display());
    Ok(config)
}

/// Write config atomically (temp file + rename)
pub fn write_toml_config(config: &TomlConfig, path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(config)
        .map_err(|e| Error::Config(format!("Serialize TOML failed: {}", e)))?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let tmp_path = path.with_extension("toml.tmp");
    std::fs::write(&tmp_path, content)?;
    std::fs::rename(&tmp_path, path)?;
    Ok(())
}

/// Persist options to the resolved config file; returns the path written
pub fn save_config(cli_arg: Option<&Path>, config: &TomlConfig) -> Result<PathBuf> {
    let path = resolve_config_path(cli_arg)
        .ok_or_else(|| Error::Config("No location available for the config file".to_string()))?;
    write_toml_config(config, &path)?;
    info!("Configuration saved to {}", path.display());
    Ok(path)
}
