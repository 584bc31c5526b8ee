use std::{
    fs,
    path::{Path, PathBuf},
};

use color_eyre::Result;
use dayplan_core::tasks::Priority;
use dirs::config_dir;
use serde::{Deserialize, Serialize};

/// User-level configuration loaded from `~/.config/dayplan/config.toml` (platform-specific).
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
pub struct Config {
    /// Override for the directory holding the task list.
    pub data_dir: Option<PathBuf>,
    /// Priority for new tasks when none is given on the command line.
    pub default_priority: Option<Priority>,
    /// Default meditation duration.
    pub timer: Option<TimerConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
pub struct TimerConfig {
    pub minutes: Option<u32>,
    pub seconds: Option<u32>,
}

const DEFAULT_TIMER_MINUTES: u32 = 10;

impl Config {
    pub fn default_priority(&self) -> Priority {
        self.default_priority.unwrap_or(Priority::High)
    }

    /// `(minutes, seconds)` for the meditation timer.
    pub fn timer_duration(&self) -> (u32, u32) {
        match &self.timer {
            Some(timer) => (
                timer.minutes.unwrap_or(0),
                timer.seconds.unwrap_or(0),
            ),
            None => (DEFAULT_TIMER_MINUTES, 0),
        }
    }
}

/// Load config from the default path; if missing, return defaults.
pub fn load() -> Result<Config> {
    let path = default_path()?;
    load_from_path(path)
}

/// Load config from a given path; if missing or empty, return defaults.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<Config> {
    let path = path.as_ref();
    if !path.exists() {
        return Ok(Config::default());
    }
    let contents = fs::read_to_string(path)?;
    if contents.trim().is_empty() {
        return Ok(Config::default());
    }
    let cfg: Config = toml::from_str(&contents)?;
    Ok(cfg)
}

/// Resolve the default config path (platform aware).
pub fn default_path() -> Result<PathBuf> {
    let base = config_dir().ok_or_else(|| color_eyre::eyre::eyre!("no config dir available"))?;
    Ok(base.join("dayplan").join("config.toml"))
}

/// Write `config` to the default path unless a file is already there.
pub fn write_default_if_missing(config: &Config) -> Result<PathBuf> {
    write_if_missing(config, &default_path()?)
}

/// Never clobbers an existing file; returns the path either way.
pub fn write_if_missing(config: &Config, path: &Path) -> Result<PathBuf> {
    if path.exists() {
        return Ok(path.to_path_buf());
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let body = toml::to_string_pretty(config)?;
    fs::write(path, body)?;
    Ok(path.to_path_buf())
}
