//! Configuration management for tubequiz

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::claude::ClaudeModel;
use crate::quiz::DEFAULT_DURATION_MINUTES;
use crate::theme::Theme;

const APP_NAME: &str = "tubequiz";

/// Which player drives playback
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum PlayerBackend {
    /// External mpv process over JSON IPC
    #[default]
    Mpv,
    /// In-process clock, no video output
    Simulated,
}

/// Application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Selected theme name
    pub theme: String,

    /// Model used for question generation
    pub model: ClaudeModel,

    pub player: PlayerBackend,

    /// Video length assumed when spacing questions
    pub estimated_minutes: f64,

    /// mpv executable, looked up on PATH unless absolute
    pub mpv_path: String,

    /// Length of the simulated video
    pub simulated_minutes: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: "Tokyo Night".to_string(),
            model: ClaudeModel::default(),
            player: PlayerBackend::default(),
            estimated_minutes: DEFAULT_DURATION_MINUTES,
            mpv_path: "mpv".to_string(),
            simulated_minutes: DEFAULT_DURATION_MINUTES,
        }
    }
}

impl Config {
    /// Load configuration from disk, or create default if not exists
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {:?}", path))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse {:?}", path))
        } else {
            let config = Self::default();
            config.save_to(path)?;
            Ok(config)
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory {:?}", parent))?;
        }

        let contents =
            serde_json::to_string_pretty(self).with_context(|| "Failed to serialize config")?;

        std::fs::write(path, contents)
            .with_context(|| format!("Failed to write config to {:?}", path))?;

        Ok(())
    }

    fn project_dirs() -> Result<ProjectDirs> {
        ProjectDirs::from("", "", APP_NAME).context("Failed to determine project directories")
    }

    /// Get the path to the config file
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::project_dirs()?.config_dir().join("config.json"))
    }

    /// Get the data directory path
    pub fn data_dir() -> Result<PathBuf> {
        Ok(Self::project_dirs()?.data_dir().to_path_buf())
    }

    /// Log file written while the TUI owns the terminal
    pub fn log_path() -> Result<PathBuf> {
        Ok(Self::data_dir()?.join("tubequiz.log"))
    }

    /// Simulated video length in seconds
    pub fn simulated_secs(&self) -> f64 {
        self.simulated_minutes.max(0.1) * 60.0
    }

    /// Theme named in the config, falling back to the default
    pub fn active_theme(&self) -> Theme {
        Theme::by_name(&self.theme).unwrap_or_else(|| {
            tracing::warn!("Unknown theme {:?}, using {}", self.theme, Theme::default().name);
            Theme::default()
        })
    }
}
