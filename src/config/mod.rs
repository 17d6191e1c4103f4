//! Runtime settings for Nines
//!
//! One explicit `Settings` value is built at startup from defaults plus
//! `NINES_*` environment variable overrides and handed to every constructor
//! that needs it. Nothing here is global and nothing here is written back to
//! disk; the only persisted configuration is the encrypted store inside the
//! workspace.

use std::path::PathBuf;

/// Logging output settings.
#[derive(Debug, Clone)]
pub struct LogSettings {
    /// Default filter directive when `RUST_LOG` is unset (e.g. "info")
    pub level: String,
    /// Emit JSON lines instead of the compact human-readable format
    pub json: bool,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// Assistant runtime settings.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Workspace root the assistant bootstraps and operates in
    pub workspace: PathBuf,
    /// Base URL for self-update fetches; `None` skips the startup update
    pub update_url: Option<String>,
    /// Chat completion API base URL
    pub api_base: String,
    /// Chat completion model name
    pub model: String,
    /// Hex-encoded 256-bit key for the encrypted config store; never persisted
    pub config_key: Option<String>,
    /// Logging configuration
    pub logging: LogSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            workspace: dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("nines"),
            update_url: None,
            api_base: "https://api.deepseek.com/v1".to_string(),
            model: "deepseek-chat".to_string(),
            config_key: None,
            logging: LogSettings::default(),
        }
    }
}

impl Settings {
    /// Build settings from defaults with environment overrides applied.
    ///
    /// Recognized variables: `NINES_WORKSPACE`, `NINES_UPDATE_URL`,
    /// `NINES_API_BASE`, `NINES_MODEL`, `NINES_CONFIG_KEY`, `NINES_LOG`,
    /// `NINES_LOG_FORMAT` (set to `json` for JSON output).
    pub fn load() -> Self {
        let mut settings = Settings::default();
        settings.apply_env_overrides();
        settings
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("NINES_WORKSPACE") {
            self.workspace = PathBuf::from(val);
        }
        // Empty string means unset so a blank .env line doesn't enable updates
        if let Ok(val) = std::env::var("NINES_UPDATE_URL") {
            if !val.is_empty() {
                self.update_url = Some(val);
            }
        }
        if let Ok(val) = std::env::var("NINES_API_BASE") {
            self.api_base = val;
        }
        if let Ok(val) = std::env::var("NINES_MODEL") {
            self.model = val;
        }
        if let Ok(val) = std::env::var("NINES_CONFIG_KEY") {
            if !val.is_empty() {
                self.config_key = Some(val);
            }
        }
        if let Ok(val) = std::env::var("NINES_LOG") {
            self.logging.level = val;
        }
        if let Ok(val) = std::env::var("NINES_LOG_FORMAT") {
            self.logging.json = val.eq_ignore_ascii_case("json");
        }
    }
}
