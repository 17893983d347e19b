//! Configuration - `~/.config/truth-lens/config.json`
//!
//! Every field is optional; a missing file means defaults.

use crate::notification::dispatcher::{default_allowed_packages, DEFAULT_NOTIFICATION_TIMEOUT};
use crate::overlay::DEFAULT_AUTO_HIDE;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LensConfig {
    /// Package ids accepted by the dispatcher
    pub allowed_packages: Vec<String>,
    /// Seconds a verdict overlay stays on screen
    pub auto_hide_secs: u64,
    /// OS-side coalescing window for notification events
    pub notification_timeout_ms: u64,
}

impl Default for LensConfig {
    fn default() -> Self {
        Self {
            allowed_packages: default_allowed_packages(),
            auto_hide_secs: DEFAULT_AUTO_HIDE.as_secs(),
            notification_timeout_ms: DEFAULT_NOTIFICATION_TIMEOUT.as_millis() as u64,
        }
    }
}

impl LensConfig {
    /// `~/.config/truth-lens/config.json`
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".config/truth-lens/config.json"))
    }

    /// Load from the default path, falling back to defaults if it does not exist
    pub fn load() -> Result<Self> {
        match Self::default_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => {
                debug!("No config file, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Load from an explicit path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: LensConfig = serde_json::from_str(&content)
            .with_context(|| format!("Invalid config {}", path.display()))?;
        debug!(path = %path.display(), "Loaded config");
        Ok(config)
    }

    /// Auto-hide delay as a `Duration`
    pub fn auto_hide(&self) -> Duration {
        Duration::from_secs(self.auto_hide_secs)
    }

    /// Coalescing window as a `Duration`
    pub fn notification_timeout(&self) -> Duration {
        Duration::from_millis(self.notification_timeout_ms)
    }
}
