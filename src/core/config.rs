//! # Configuration
//!
//! Centralizes all settings with a clear override hierarchy:
//! defaults → config file → env vars → CLI flags.
//!
//! Config lives at `~/.farmabot/config.toml`. If missing on first run, a
//! commented-out default is generated so users can discover all options.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct FarmabotConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub map: MapConfig,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct GeneralConfig {
    pub log_level: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct BackendConfig {
    pub base_url: Option<String>,
    pub chat_path: Option<String>,
    pub health_path: Option<String>,
    pub health_interval_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct MapConfig {
    pub default_center: Option<[f64; 2]>,
    pub close_zoom: Option<u8>,
    pub wide_zoom: Option<u8>,
    pub fit_padding: Option<u16>,
    pub hint_secs: Option<u64>,
}

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_CHAT_PATH: &str = "/chat";
pub const DEFAULT_HEALTH_PATH: &str = "/health";
pub const DEFAULT_HEALTH_INTERVAL_SECS: u64 = 30;
pub const DEFAULT_LOG_LEVEL: &str = "debug";

/// Regional center used when a map result carries neither markers nor a center.
pub const DEFAULT_MAP_CENTER: (f64, f64) = (-29.684, -53.806);
pub const DEFAULT_CLOSE_ZOOM: u8 = 15;
pub const DEFAULT_WIDE_ZOOM: u8 = 13;
pub const DEFAULT_FIT_PADDING: u16 = 30;
pub const DEFAULT_HINT_SECS: u64 = 4;

// ============================================================================
// Resolved Config (concrete values, no Options)
// ============================================================================

/// Map presentation constants, passed down to the visualizer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapSettings {
    pub default_center: (f64, f64),
    pub close_zoom: u8,
    pub wide_zoom: u8,
    /// Margin around fitted bounds, in the same pixel units the web map used.
    pub fit_padding: u16,
    pub hint_duration: Duration,
}

impl Default for MapSettings {
    fn default() -> Self {
        Self {
            default_center: DEFAULT_MAP_CENTER,
            close_zoom: DEFAULT_CLOSE_ZOOM,
            wide_zoom: DEFAULT_WIDE_ZOOM,
            fit_padding: DEFAULT_FIT_PADDING,
            hint_duration: Duration::from_secs(DEFAULT_HINT_SECS),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub base_url: String,
    pub chat_path: String,
    pub health_path: String,
    /// `None` disables the liveness probe.
    pub health_interval: Option<Duration>,
    pub log_level: log::LevelFilter,
    pub map: MapSettings,
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),
}

// ============================================================================
// Loading
// ============================================================================

/// Returns the path to `~/.farmabot/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".farmabot").join("config.toml"))
}

/// Load config from `~/.farmabot/config.toml`.
pub fn load_config() -> Result<FarmabotConfig, ConfigError> {
    match config_path() {
        Some(path) => load_config_from(&path),
        None => {
            warn!("Could not determine home directory, using default config");
            Ok(FarmabotConfig::default())
        }
    }
}

/// Load config from `path`.
///
/// If the file doesn't exist, generates a commented-out default and
/// returns `FarmabotConfig::default()`. If it exists but is malformed,
/// returns `ConfigError::Parse`.
pub fn load_config_from(path: &Path) -> Result<FarmabotConfig, ConfigError> {
    if !path.exists() {
        info!("No config file found, generating default at {}", path.display());
        generate_default_config(path);
        return Ok(FarmabotConfig::default());
    }

    let contents = fs::read_to_string(path)?;
    let config: FarmabotConfig = toml::from_str(&contents)?;
    info!("Loaded config from {}", path.display());
    debug!("Config: {:?}", config);
    Ok(config)
}

/// Falls back to defaults when loading failed, logging the reason.
pub fn config_or_default(loaded: Result<FarmabotConfig, ConfigError>) -> FarmabotConfig {
    loaded.unwrap_or_else(|e| {
        warn!("{}. Using defaults.", e);
        FarmabotConfig::default()
    })
}

fn generate_default_config(path: &Path) {
    let default_content = r#"# farmabot configuration
# All settings are optional; defaults are used for anything not specified.
# Override hierarchy: defaults → this file → env vars → CLI flags.

# [general]
# log_level = "debug"                # "error", "warn", "info", "debug", "trace", "off"

# [backend]
# base_url = "http://localhost:8000" # Or set FARMABOT_BASE_URL
# chat_path = "/chat"
# health_path = "/health"
# health_interval_secs = 30          # 0 disables the liveness probe

# [map]
# default_center = [-29.684, -53.806]
# close_zoom = 15                    # single marker
# wide_zoom = 13                     # no markers
# fit_padding = 30                   # margin around several markers
# hint_secs = 4                      # how long "Toque em um marcador" stays up
"#;

    if let Some(parent) = path.parent()
        && let Err(e) = fs::create_dir_all(parent)
    {
        warn!("Failed to create config directory: {}", e);
        return;
    }
    if let Err(e) = fs::write(path, default_content) {
        warn!("Failed to write default config: {}", e);
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// CLI overrides, `None` = flag not given.
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    pub base_url: Option<String>,
    pub no_health: bool,
}

/// Resolve the final config by collapsing: defaults → config file → env vars → CLI.
pub fn resolve(config: &FarmabotConfig, cli: &CliOverrides) -> ResolvedConfig {
    resolve_with_env(config, cli, std::env::var("FARMABOT_BASE_URL").ok())
}

fn resolve_with_env(
    config: &FarmabotConfig,
    cli: &CliOverrides,
    env_base_url: Option<String>,
) -> ResolvedConfig {
    // Base URL: CLI → env → config → default
    let base_url = cli
        .base_url
        .clone()
        .or(env_base_url)
        .or_else(|| config.backend.base_url.clone())
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

    let interval_secs = config
        .backend
        .health_interval_secs
        .unwrap_or(DEFAULT_HEALTH_INTERVAL_SECS);
    let health_interval =
        (!cli.no_health && interval_secs > 0).then(|| Duration::from_secs(interval_secs));

    let log_level = config
        .general
        .log_level
        .as_deref()
        .unwrap_or(DEFAULT_LOG_LEVEL)
        .parse()
        .unwrap_or_else(|_| {
            warn!("Unknown log_level, falling back to {}", DEFAULT_LOG_LEVEL);
            log::LevelFilter::Debug
        });

    let map = MapSettings {
        default_center: config
            .map
            .default_center
            .map(|[lat, lng]| (lat, lng))
            .unwrap_or(DEFAULT_MAP_CENTER),
        close_zoom: config.map.close_zoom.unwrap_or(DEFAULT_CLOSE_ZOOM),
        wide_zoom: config.map.wide_zoom.unwrap_or(DEFAULT_WIDE_ZOOM),
        fit_padding: config.map.fit_padding.unwrap_or(DEFAULT_FIT_PADDING),
        hint_duration: Duration::from_secs(config.map.hint_secs.unwrap_or(DEFAULT_HINT_SECS)),
    };

    ResolvedConfig {
        base_url,
        chat_path: config
            .backend
            .chat_path
            .clone()
            .unwrap_or_else(|| DEFAULT_CHAT_PATH.to_string()),
        health_path: config
            .backend
            .health_path
            .clone()
            .unwrap_or_else(|| DEFAULT_HEALTH_PATH.to_string()),
        health_interval,
        log_level,
        map,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_uses_defaults_when_empty() {
        let resolved = resolve_with_env(&FarmabotConfig::default(), &CliOverrides::default(), None);
        assert_eq!(resolved.base_url, DEFAULT_BASE_URL);
        assert_eq!(resolved.chat_path, "/chat");
        assert_eq!(resolved.health_path, "/health");
        assert_eq!(
            resolved.health_interval,
            Some(Duration::from_secs(DEFAULT_HEALTH_INTERVAL_SECS))
        );
        assert_eq!(resolved.log_level, log::LevelFilter::Debug);
        assert_eq!(resolved.map, MapSettings::default());
    }

    #[test]
    fn test_env_overrides_config_and_cli_overrides_env() {
        let config = FarmabotConfig {
            backend: BackendConfig {
                base_url: Some("http://from-file".to_string()),
                ..Default::default()
            },
            ..Default::default()
        };

        let resolved = resolve_with_env(
            &config,
            &CliOverrides::default(),
            Some("http://from-env".to_string()),
        );
        assert_eq!(resolved.base_url, "http://from-env");

        let cli = CliOverrides {
            base_url: Some("http://from-cli".to_string()),
            no_health: false,
        };
        let resolved = resolve_with_env(&config, &cli, Some("http://from-env".to_string()));
        assert_eq!(resolved.base_url, "http://from-cli");
    }

    #[test]
    fn test_health_probe_can_be_disabled() {
        let cli = CliOverrides {
            base_url: None,
            no_health: true,
        };
        let resolved = resolve_with_env(&FarmabotConfig::default(), &cli, None);
        assert_eq!(resolved.health_interval, None);

        let config = FarmabotConfig {
            backend: BackendConfig {
                health_interval_secs: Some(0),
                ..Default::default()
            },
            ..Default::default()
        };
        let resolved = resolve_with_env(&config, &CliOverrides::default(), None);
        assert_eq!(resolved.health_interval, None);
    }

    #[test]
    fn test_toml_parses_all_sections() {
        let toml_str = r#"
[general]
log_level = "info"

[backend]
base_url = "http://192.168.0.10:8000"
health_interval_secs = 10

[map]
default_center = [-30.0, -51.2]
close_zoom = 16
hint_secs = 2
"#;
        let config: FarmabotConfig = toml::from_str(toml_str).unwrap();
        let resolved = resolve_with_env(&config, &CliOverrides::default(), None);
        assert_eq!(resolved.base_url, "http://192.168.0.10:8000");
        assert_eq!(resolved.health_interval, Some(Duration::from_secs(10)));
        assert_eq!(resolved.log_level, log::LevelFilter::Info);
        assert_eq!(resolved.map.default_center, (-30.0, -51.2));
        assert_eq!(resolved.map.close_zoom, 16);
        assert_eq!(resolved.map.wide_zoom, DEFAULT_WIDE_ZOOM);
        assert_eq!(resolved.map.hint_duration, Duration::from_secs(2));
    }

    #[test]
    fn test_sparse_toml_parses() {
        let config: FarmabotConfig = toml::from_str("[map]\nwide_zoom = 12\n").unwrap();
        assert_eq!(config.map.wide_zoom, Some(12));
        assert!(config.backend.base_url.is_none());
        assert!(config.general.log_level.is_none());
    }

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("farmabot-{}-{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_missing_file_generates_commented_default() {
        let path = scratch_dir("missing").join("nested").join("config.toml");
        let config = load_config_from(&path).unwrap();
        assert!(config.backend.base_url.is_none());

        let generated = fs::read_to_string(&path).unwrap();
        assert!(generated.contains("# base_url"));
        // Everything is commented out, so it parses back to defaults.
        let reparsed = load_config_from(&path).unwrap();
        assert!(reparsed.general.log_level.is_none());
    }

    #[test]
    fn test_malformed_file_is_parse_error_and_falls_back() {
        let path = scratch_dir("malformed").join("config.toml");
        fs::write(&path, "[backend\nbase_url = 3").unwrap();

        let loaded = load_config_from(&path);
        assert!(matches!(loaded, Err(ConfigError::Parse(_))));

        let config = config_or_default(loaded);
        assert!(config.backend.base_url.is_none());
    }

    #[test]
    fn test_bad_log_level_falls_back_to_debug() {
        let config = FarmabotConfig {
            general: GeneralConfig {
                log_level: Some("chatty".to_string()),
            },
            ..Default::default()
        };
        let resolved = resolve_with_env(&config, &CliOverrides::default(), None);
        assert_eq!(resolved.log_level, log::LevelFilter::Debug);
    }
}
