//! Optional TOML configuration.
//!
//! Lookup order for the config file:
//! 1. `--config` flag
//! 2. WOLFIES_WHATSAPP_CONFIG env var
//! 3. `<config dir>/wolfies-whatsapp/config.toml`
//!
//! A missing file at an implicit location means defaults. A missing
//! `--config` file, or a file that does not parse, is an error.
//!
//! CHANGELOG:
//! - 02/20/2026 - Missing --config file is an error
//! - 02/19/2026 - Browser timing section
//! - 02/15/2026 - Initial implementation

use crate::compose::link::DEFAULT_LINK_BASE;
use crate::compose::MessageTemplate;
use crate::contacts::EXPORT_FILE_NAME;
use crate::transport::BrowserSettings;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Env var that points at a config file.
pub const CONFIG_ENV_VAR: &str = "WOLFIES_WHATSAPP_CONFIG";

/// Tool settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Message template with `{name}` / `{id}`
    pub template: MessageTemplate,
    /// Click-to-chat link base
    pub link_base: String,
    /// Default path for CSV export
    pub export_file: String,
    /// Live sending through the browser
    pub browser: BrowserSettings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            template: MessageTemplate::default(),
            link_base: DEFAULT_LINK_BASE.to_string(),
            export_file: EXPORT_FILE_NAME.to_string(),
            browser: BrowserSettings::default(),
        }
    }
}

impl Config {
    /// Parse config from TOML text.
    pub fn from_toml(raw: &str) -> Result<Self> {
        toml::from_str(raw).context("Failed to parse config TOML")
    }

    /// Load from a file; missing file -> defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        let config = Self::from_toml(&raw).with_context(|| format!("Invalid config file: {:?}", path))?;
        tracing::debug!(path = %path.display(), "config loaded");
        Ok(config)
    }

    /// Load using the lookup order, with an optional explicit path.
    pub fn load_default(explicit: Option<&str>) -> Result<Self> {
        let path = resolve_config_path(explicit);
        if explicit.is_some() && !path.exists() {
            bail!("Config file not found: {:?}", path);
        }
        Self::load(path)
    }

    /// Export path with `~` expanded.
    pub fn export_path(&self) -> PathBuf {
        expand_path(&self.export_file)
    }
}

/// Resolve which config file to read.
pub fn resolve_config_path(explicit: Option<&str>) -> PathBuf {
    if let Some(path) = explicit {
        return expand_path(path);
    }

    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        return expand_path(&path);
    }

    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("wolfies-whatsapp")
        .join("config.toml")
}

/// Expand `~` and env vars in a user-supplied path.
pub fn expand_path(path: &str) -> PathBuf {
    match shellexpand::full(path) {
        Ok(expanded) => PathBuf::from(expanded.into_owned()),
        Err(_) => PathBuf::from(shellexpand::tilde(path).into_owned()),
    }
}
