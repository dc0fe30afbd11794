//! Panel Configuration
//!
//! Configuration is layered, highest priority first:
//! 1. CLI arguments (passed in as [`ConfigOverrides`])
//! 2. Environment variables
//! 3. TOML configuration file
//! 4. Default values
//!
//! The configuration file follows the XDG Base Directory specification:
//! `$XDG_CONFIG_HOME/presence-panel/panel.toml`.
//!
//! # Example Configuration
//!
//! ```toml
//! [connection]
//! origin = "https://panel.example.org"
//! reconnect_delay_ms = 3000
//!
//! [display]
//! char_delay_ms = 30
//! asset_dir = "/usr/share/presence-panel/avatar"
//! connected_text = "Listening..."
//! ```
//!
//! # Endpoint derivation
//!
//! The WebSocket endpoint is derived from the origin the way a page derives
//! it from its own location: `http` becomes `ws`, `https` becomes `wss`, the
//! host and port are kept and the path is replaced by `/ws`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::connection::DEFAULT_RECONNECT_DELAY;
use crate::typewriter::DEFAULT_CHAR_DELAY;

/// Origin used when none is configured (the event source's default port)
pub const DEFAULT_ORIGIN: &str = "http://127.0.0.1:5000";

/// Path of the event stream on the origin
pub const ENDPOINT_PATH: &str = "/ws";

/// Directory holding one sprite file per state
pub const DEFAULT_ASSET_DIR: &str = "assets/avatar";

/// Placeholder line revealed whenever a connection opens
pub const DEFAULT_CONNECTED_TEXT: &str = "Connected. Waiting for something to say...";

/// Environment variable names
pub mod env {
    /// Origin URL
    pub const ORIGIN: &str = "PANEL_ORIGIN";
    /// Reconnect delay in milliseconds
    pub const RECONNECT_DELAY_MS: &str = "PANEL_RECONNECT_DELAY_MS";
    /// Typewriter pacing in milliseconds per character
    pub const CHAR_DELAY_MS: &str = "PANEL_CHAR_DELAY_MS";
    /// Sprite asset directory
    pub const ASSET_DIR: &str = "PANEL_ASSET_DIR";
    /// Placeholder line shown on connect
    pub const CONNECTED_TEXT: &str = "PANEL_CONNECTED_TEXT";
}

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur when loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file at {path}: {source}")]
    ReadError {
        /// The path that was attempted
        path: PathBuf,
        /// The underlying IO error
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[error("Failed to parse TOML config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Origin cannot be turned into a WebSocket endpoint
    #[error("Invalid origin {origin:?}: {reason}")]
    InvalidOrigin {
        /// The configured origin
        origin: String,
        /// Why it was rejected
        reason: String,
    },

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

// =============================================================================
// TOML Configuration Structures
// =============================================================================

/// `[connection]` section
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionToml {
    /// Origin the endpoint is derived from
    pub origin: Option<String>,
    /// Delay before reconnecting, in milliseconds
    pub reconnect_delay_ms: Option<u64>,
}

/// `[display]` section
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayToml {
    /// Typewriter pacing in milliseconds per character
    pub char_delay_ms: Option<u64>,
    /// Sprite asset directory
    pub asset_dir: Option<PathBuf>,
    /// Placeholder line shown on connect
    pub connected_text: Option<String>,
}

/// Root of the TOML configuration file
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelToml {
    /// Connection settings
    pub connection: ConnectionToml,
    /// Display settings
    pub display: DisplayToml,
}

// =============================================================================
// Overrides
// =============================================================================

/// One layer of optional settings
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    /// Origin URL
    pub origin: Option<String>,
    /// Reconnect delay in milliseconds
    pub reconnect_delay_ms: Option<u64>,
    /// Typewriter pacing in milliseconds
    pub char_delay_ms: Option<u64>,
    /// Sprite asset directory
    pub asset_dir: Option<PathBuf>,
    /// Placeholder line shown on connect
    pub connected_text: Option<String>,
}

impl ConfigOverrides {
    /// Read overrides from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read overrides through `lookup` (an environment stand-in)
    ///
    /// Unparseable numbers are logged and skipped.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let millis = |key: &str| -> Option<u64> {
            let raw = lookup(key)?;
            match raw.trim().parse() {
                Ok(ms) => Some(ms),
                Err(_) => {
                    tracing::warn!(var = key, value = %raw, "Ignoring non-numeric value");
                    None
                }
            }
        };

        Self {
            origin: lookup(env::ORIGIN),
            reconnect_delay_ms: millis(env::RECONNECT_DELAY_MS),
            char_delay_ms: millis(env::CHAR_DELAY_MS),
            asset_dir: lookup(env::ASSET_DIR).map(PathBuf::from),
            connected_text: lookup(env::CONNECTED_TEXT),
        }
    }

    /// Fill every unset field from `lower`
    #[must_use]
    pub fn or(self, lower: ConfigOverrides) -> Self {
        Self {
            origin: self.origin.or(lower.origin),
            reconnect_delay_ms: self.reconnect_delay_ms.or(lower.reconnect_delay_ms),
            char_delay_ms: self.char_delay_ms.or(lower.char_delay_ms),
            asset_dir: self.asset_dir.or(lower.asset_dir),
            connected_text: self.connected_text.or(lower.connected_text),
        }
    }
}

impl From<PanelToml> for ConfigOverrides {
    fn from(toml: PanelToml) -> Self {
        Self {
            origin: toml.connection.origin,
            reconnect_delay_ms: toml.connection.reconnect_delay_ms,
            char_delay_ms: toml.display.char_delay_ms,
            asset_dir: toml.display.asset_dir,
            connected_text: toml.display.connected_text,
        }
    }
}

// =============================================================================
// Resolved Configuration
// =============================================================================

/// Fully resolved panel configuration
#[derive(Clone, Debug, PartialEq)]
pub struct PanelConfig {
    /// Origin the endpoint was derived from
    pub origin: Url,
    /// WebSocket endpoint
    pub endpoint: Url,
    /// Delay before reconnecting after a loss
    pub reconnect_delay: Duration,
    /// Typewriter pacing per character
    pub char_delay: Duration,
    /// Sprite asset directory
    pub asset_dir: PathBuf,
    /// Placeholder line shown on connect (empty = none)
    pub connected_text: String,
    /// Config file the values were loaded from, if any
    pub config_file_path: Option<PathBuf>,
}

impl PanelConfig {
    /// Resolve a configuration from one layer of overrides plus defaults
    ///
    /// # Errors
    ///
    /// Fails on an unusable origin or a zero delay. Secure origins are
    /// unusable unless the `tls` feature is enabled.
    pub fn from_overrides(overrides: ConfigOverrides) -> Result<Self, ConfigError> {
        let origin_str = overrides.origin.as_deref().unwrap_or(DEFAULT_ORIGIN);
        let endpoint = endpoint_from_origin(origin_str)?;
        if endpoint.scheme() == "wss" && !cfg!(feature = "tls") {
            return Err(ConfigError::InvalidOrigin {
                origin: origin_str.to_string(),
                reason: "secure origins need the `tls` feature".into(),
            });
        }
        let origin = Url::parse(origin_str).map_err(|e| ConfigError::InvalidOrigin {
            origin: origin_str.to_string(),
            reason: e.to_string(),
        })?;

        let reconnect_delay = overrides
            .reconnect_delay_ms
            .map_or(DEFAULT_RECONNECT_DELAY, Duration::from_millis);
        if reconnect_delay.is_zero() {
            return Err(ConfigError::ValidationError(
                "reconnect_delay_ms must be greater than zero".into(),
            ));
        }

        let char_delay = overrides
            .char_delay_ms
            .map_or(DEFAULT_CHAR_DELAY, Duration::from_millis);
        if char_delay.is_zero() {
            return Err(ConfigError::ValidationError(
                "char_delay_ms must be greater than zero".into(),
            ));
        }

        Ok(Self {
            origin,
            endpoint,
            reconnect_delay,
            char_delay,
            asset_dir: overrides
                .asset_dir
                .unwrap_or_else(|| PathBuf::from(DEFAULT_ASSET_DIR)),
            connected_text: overrides
                .connected_text
                .unwrap_or_else(|| DEFAULT_CONNECTED_TEXT.to_string()),
            config_file_path: None,
        })
    }
}

/// Derive the WebSocket endpoint from an origin URL
///
/// # Errors
///
/// Fails when the origin does not parse, has no host, or uses a scheme other
/// than `http`, `https`, `ws` or `wss`.
pub fn endpoint_from_origin(origin: &str) -> Result<Url, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidOrigin {
        origin: origin.to_string(),
        reason,
    };

    let mut url = Url::parse(origin).map_err(|e| invalid(e.to_string()))?;
    if url.host_str().is_none() {
        return Err(invalid("missing host".into()));
    }

    let scheme = match url.scheme() {
        "http" | "ws" => "ws",
        "https" | "wss" => "wss",
        other => return Err(invalid(format!("unsupported scheme {other:?}"))),
    };
    url.set_scheme(scheme)
        .map_err(|()| invalid(format!("cannot switch scheme to {scheme}")))?;
    url.set_path(ENDPOINT_PATH);
    url.set_query(None);
    url.set_fragment(None);

    Ok(url)
}

// =============================================================================
// Loading
// =============================================================================

/// Default config file location
///
/// Returns `$XDG_CONFIG_HOME/presence-panel/panel.toml` or platform equivalent.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("presence-panel").join("panel.toml"))
}

/// Read and parse a config file; `Ok(None)` if it does not exist
///
/// # Errors
///
/// Fails when the file exists but cannot be read or parsed.
pub fn load_config_file(path: &Path) -> Result<Option<PanelToml>, ConfigError> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "Config file not found, using defaults");
        return Ok(None);
    }

    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })?;
    let toml_config: PanelToml = toml::from_str(&content)?;

    tracing::info!(path = %path.display(), "Loaded configuration from file");
    Ok(Some(toml_config))
}

/// Load the full configuration: `cli` over `env` over the file over defaults
///
/// # Errors
///
/// Fails on unreadable/unparseable files and invalid values.
pub fn load_config(
    path: Option<&Path>,
    env: ConfigOverrides,
    cli: ConfigOverrides,
) -> Result<PanelConfig, ConfigError> {
    let file = match path {
        Some(path) => load_config_file(path)?,
        None => None,
    };
    let loaded_from = file.as_ref().and(path).map(Path::to_path_buf);

    let file_layer = file.map(ConfigOverrides::from).unwrap_or_default();
    let mut config = PanelConfig::from_overrides(cli.or(env).or(file_layer))?;
    config.config_file_path = loaded_from;
    Ok(config)
}
