//! Configuration file handling.
//!
//! Reads from `~/.config/bwtui/config.toml` (XDG-compliant) unless a path is
//! given on the command line.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// The vault CLI program to invoke.
    pub bw_path: PathBuf,
    /// How long transient status messages stay visible, in milliseconds.
    pub status_lifetime_ms: u64,
    /// Seconds after which a copied secret is wiped from the clipboard.
    /// Zero disables clearing.
    pub clipboard_clear_secs: u64,
    pub theme: ThemeConfig,
}

/// Optional color overrides. Values use ratatui's color syntax
/// (`"yellow"`, `"#dc9617"`, `"116"`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeConfig {
    pub accent: Option<String>,
    pub accent_dim: Option<String>,
    pub label: Option<String>,
    pub masked: Option<String>,
    pub error: Option<String>,
    pub status: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bw_path: PathBuf::from("bw"),
            status_lifetime_ms: 3000,
            clipboard_clear_secs: 30,
            theme: ThemeConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration.
    ///
    /// An explicit `custom_path` must exist. The default location is optional:
    /// when it is missing the built-in defaults are used.
    pub fn load(custom_path: Option<&Path>) -> Result<Self> {
        match custom_path {
            Some(path) => {
                if !path.exists() {
                    anyhow::bail!("Config file not found: {}", path.display());
                }
                Self::load_from(path)
            }
            None => match default_config_path() {
                Some(path) if path.exists() => Self::load_from(&path),
                _ => {
                    tracing::debug!("No config file, using defaults");
                    Ok(Self::default())
                }
            },
        }
    }

    /// Parse the config file at `path`.
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        tracing::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn status_lifetime(&self) -> Duration {
        Duration::from_millis(self.status_lifetime_ms)
    }

    /// `None` when clipboard clearing is disabled.
    pub fn clipboard_clear_after(&self) -> Option<Duration> {
        (self.clipboard_clear_secs > 0).then(|| Duration::from_secs(self.clipboard_clear_secs))
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "bwtui")
}

/// `~/.config/bwtui/config.toml` on Linux.
pub fn default_config_path() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().join("config.toml"))
}

/// Directory for log files: `~/.local/share/bwtui` on Linux.
pub fn data_dir() -> Result<PathBuf> {
    let dirs = project_dirs().context("Could not determine data directory")?;
    let data_dir = dirs.data_dir();
    std::fs::create_dir_all(data_dir)
        .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;
    Ok(data_dir.to_path_buf())
}
