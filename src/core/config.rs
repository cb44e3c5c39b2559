//! # Configuration
//!
//! Centralizes all settings with a clear override hierarchy:
//! defaults → config file → env vars → CLI flags.
//!
//! Config lives at `~/.dynojax/config.toml`. If missing on first run, a
//! commented-out default is generated so users can discover all options.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::core::navigator::DEFAULT_MARKER_ATTRIBUTE;
use crate::core::options::{ResolvedOptions, Speed};

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct DynojaxConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub navigation: NavigationConfig,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct GeneralConfig {
    pub base_url: Option<String>,
    pub marker_attribute: Option<String>,
    pub timeout_secs: Option<u64>,
}

/// Default navigation options. Per-call overrides still win.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct NavigationConfig {
    pub reset_scroll: Option<bool>,
    pub reload_on_error: Option<bool>,
    pub animations: Option<bool>,
    pub fade_in: Option<Speed>,
    pub fade_out: Option<Speed>,
}

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

// ============================================================================
// Resolved Config (concrete values, no Options)
// ============================================================================

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub base_url: String,
    pub marker_attribute: String,
    pub timeout: Duration,
    pub defaults: ResolvedOptions,
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "config I/O error: {e}"),
            ConfigError::Parse(e) => write!(f, "config parse error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Loading
// ============================================================================

/// Returns the path to `~/.dynojax/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".dynojax").join("config.toml"))
}

/// Load config from `~/.dynojax/config.toml`.
pub fn load_config() -> Result<DynojaxConfig, ConfigError> {
    match config_path() {
        Some(path) => load_config_from(&path),
        None => {
            warn!("Could not determine home directory, using default config");
            Ok(DynojaxConfig::default())
        }
    }
}

/// Load config from an explicit path.
///
/// If the file doesn't exist, generates a commented-out default and
/// returns `DynojaxConfig::default()`. If it exists but is malformed,
/// returns `ConfigError::Parse`.
pub fn load_config_from(path: &Path) -> Result<DynojaxConfig, ConfigError> {
    if !path.exists() {
        info!("No config file found, generating default at {}", path.display());
        generate_default_config(path);
        return Ok(DynojaxConfig::default());
    }

    let contents = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let config: DynojaxConfig = toml::from_str(&contents).map_err(ConfigError::Parse)?;
    info!("Loaded config from {}", path.display());
    debug!("Config: {:?}", config);
    Ok(config)
}

/// Generates a commented-out default config file at the given path.
fn generate_default_config(path: &Path) {
    let default_content = r#"# Dynojax Configuration
# All settings are optional. Defaults are used for anything not specified.
# Override hierarchy: defaults → this file → env vars → CLI flags.

# [general]
# base_url = "http://localhost:3000"   # Or set DYNOJAX_BASE_URL env var
# marker_attribute = "data-dynojax"    # Links carrying this attribute are intercepted
# timeout_secs = 30                    # Or set DYNOJAX_TIMEOUT_SECS env var

# [navigation]
# reset_scroll = true
# reload_on_error = true
# animations = true
# fade_in = "fast"                     # "fast" (200ms), "normal" (400ms), "slow" (600ms) or millis
# fade_out = 200
"#;

    if let Some(parent) = path.parent() {
        if let Err(e) = fs::create_dir_all(parent) {
            warn!("Failed to create config directory: {}", e);
            return;
        }
    }
    if let Err(e) = fs::write(path, default_content) {
        warn!("Failed to write default config: {}", e);
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolve the final config by collapsing: defaults → config file → env vars → CLI.
///
/// `cli_base_url` is from the CLI flag (None = not specified).
pub fn resolve(config: &DynojaxConfig, cli_base_url: Option<&str>) -> ResolvedConfig {
    // Base URL: CLI → env → config → default
    let base_url = cli_base_url
        .map(|s| s.to_string())
        .or_else(|| std::env::var("DYNOJAX_BASE_URL").ok())
        .or_else(|| config.general.base_url.clone())
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

    // Timeout: env → config → default
    let timeout_secs = std::env::var("DYNOJAX_TIMEOUT_SECS")
        .ok()
        .and_then(|s| match s.parse::<u64>() {
            Ok(secs) => Some(secs),
            Err(e) => {
                warn!("Ignoring DYNOJAX_TIMEOUT_SECS={:?}: {}", s, e);
                None
            }
        })
        .or(config.general.timeout_secs)
        .unwrap_or(DEFAULT_TIMEOUT_SECS);

    let marker_attribute = config
        .general
        .marker_attribute
        .clone()
        .unwrap_or_else(|| DEFAULT_MARKER_ATTRIBUTE.to_string());

    ResolvedConfig {
        base_url,
        marker_attribute,
        timeout: Duration::from_secs(timeout_secs),
        defaults: resolve_navigation(&config.navigation),
    }
}

fn resolve_navigation(nav: &NavigationConfig) -> ResolvedOptions {
    let base = ResolvedOptions::default();
    ResolvedOptions {
        reset_scroll: nav.reset_scroll.unwrap_or(base.reset_scroll),
        reload_on_error: nav.reload_on_error.unwrap_or(base.reload_on_error),
        animations: nav.animations.unwrap_or(base.animations),
        fade_in_ms: nav.fade_in.map_or(base.fade_in_ms, Speed::as_millis),
        fade_out_ms: nav.fade_out.map_or(base.fade_out_ms, Speed::as_millis),
        title: None,
    }
}
