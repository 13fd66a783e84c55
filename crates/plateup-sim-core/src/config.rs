//! Persistent configuration for plateup-sim.
//!
//! Stores the target simulator, the two deep links, and the pause between
//! them in `~/.plateup-sim/config.json`. Every field is optional; anything
//! left out falls back to the values the helper has always used.
//!
//! # Example
//!
//! ```no_run
//! use plateup_sim_core::config::SequenceConfig;
//!
//! // Load (returns defaults if file doesn't exist)
//! let config = SequenceConfig::load();
//! let plan = config.validate().expect("configured links are invalid");
//! println!("{} -> {}", plan.launch_link, plan.target_link);
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::deeplink::{self, DeepLink, DeepLinkError};

const CONFIG_DIRNAME: &str = ".plateup-sim";
const CONFIG_FILENAME: &str = "config.json";

/// Simulator targeted when nothing else is configured.
pub const DEFAULT_DEVICE: &str = "iPhone 16 Pro";

/// Pause between the two invocations, in milliseconds.
pub const DEFAULT_DELAY_MS: u64 = 2000;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{field}: {source}")]
    InvalidLink {
        field: &'static str,
        #[source]
        source: DeepLinkError,
    },

    #[error("device name must not be empty")]
    EmptyDevice,
}

/// Returns the directory holding plateup-sim state (`~/.plateup-sim`).
///
/// Falls back to the current directory when no home directory is known.
pub fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CONFIG_DIRNAME)
}

/// Path of the default config file.
pub fn config_path() -> PathBuf {
    config_dir().join(CONFIG_FILENAME)
}

/// User-editable sequence settings, as stored on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SequenceConfig {
    /// Simulator name or UDID, passed straight to simctl.
    pub device: String,
    /// Link opened first with `spawn <device> uiopen`.
    pub launch_link: String,
    /// Link opened second with `openurl`.
    pub target_link: String,
    /// Wait after the first invocation returns.
    pub delay_ms: u64,
}

impl Default for SequenceConfig {
    fn default() -> Self {
        Self {
            device: DEFAULT_DEVICE.to_string(),
            launch_link: deeplink::FOCUS.to_string(),
            target_link: deeplink::CHECKIN_MORNING.to_string(),
            delay_ms: DEFAULT_DELAY_MS,
        }
    }
}

/// A checked configuration, ready to hand to the sequencer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequencePlan {
    pub device: String,
    pub launch_link: DeepLink,
    pub target_link: DeepLink,
    pub delay: Duration,
}

impl Default for SequencePlan {
    fn default() -> Self {
        Self {
            device: DEFAULT_DEVICE.to_string(),
            launch_link: DeepLink::focus(),
            target_link: DeepLink::checkin_morning(),
            delay: Duration::from_millis(DEFAULT_DELAY_MS),
        }
    }
}

impl SequenceConfig {
    /// Load config from `~/.plateup-sim/config.json`.
    ///
    /// Returns [`Default`] if the file does not exist or cannot be parsed.
    pub fn load() -> Self {
        let path = config_path();
        match Self::load_from(&path) {
            Ok(config) => config,
            Err(ConfigError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => Self::default(),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable config");
                Self::default()
            }
        }
    }

    /// Load config from an explicit path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Check both links and the device name.
    pub fn validate(&self) -> Result<SequencePlan, ConfigError> {
        if self.device.trim().is_empty() {
            return Err(ConfigError::EmptyDevice);
        }
        let launch_link = DeepLink::parse(&self.launch_link)
            .map_err(|source| ConfigError::InvalidLink { field: "launch_link", source })?;
        let target_link = DeepLink::parse(&self.target_link)
            .map_err(|source| ConfigError::InvalidLink { field: "target_link", source })?;

        Ok(SequencePlan {
            device: self.device.clone(),
            launch_link,
            target_link,
            delay: Duration::from_millis(self.delay_ms),
        })
    }
}
