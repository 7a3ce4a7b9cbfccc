use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

pub const SETTINGS_FILE: &str = "config.json";
pub const DEFAULT_TARGET_HOURS: f64 = 8.0;
pub const DEFAULT_LISTEN: &str = "127.0.0.1:8787";

/// User settings stored in config.json
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Daily goal used for progress percentages
    #[serde(default = "default_target_hours")]
    pub target_hours: f64,
    /// Socket address for `timecard serve`
    #[serde(default = "default_listen")]
    pub listen: String,
}

fn default_target_hours() -> f64 {
    DEFAULT_TARGET_HOURS
}

fn default_listen() -> String {
    DEFAULT_LISTEN.to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            target_hours: DEFAULT_TARGET_HOURS,
            listen: DEFAULT_LISTEN.to_string(),
        }
    }
}

impl Settings {
    pub fn validate(&self) -> Result<()> {
        if !(self.target_hours.is_finite() && self.target_hours > 0.0) {
            anyhow::bail!("target_hours must be a positive number, got {}", self.target_hours);
        }
        Ok(())
    }
}

pub fn settings_file(data_dir: &Path) -> PathBuf {
    data_dir.join(SETTINGS_FILE)
}

/// Load settings from config.json, falling back to defaults when absent
pub fn load_settings<P: AsRef<Path>>(path: P) -> Result<Settings> {
    let path = path.as_ref();

    let settings = match super::files::read_optional(path)? {
        None => Settings::default(),
        Some(content) => serde_json::from_str(&content)
            .with_context(|| format!("Invalid settings file: {}", path.display()))?,
    };
    settings.validate()?;
    Ok(settings)
}

/// Load settings for `timecard config` without validating them
///
/// A file that is not valid JSON is replaced by defaults, so a broken
/// config.json can always be repaired from the command line.
pub fn load_settings_unchecked<P: AsRef<Path>>(path: P) -> Result<Settings> {
    let path = path.as_ref();

    match super::files::read_optional(path)? {
        None => Ok(Settings::default()),
        Some(content) => Ok(serde_json::from_str(&content).unwrap_or_else(|e| {
            warn!(path = %path.display(), error = %e, "unreadable settings, using defaults");
            Settings::default()
        })),
    }
}

/// Apply the given changes on top of the stored settings and save them
pub fn update_settings<P: AsRef<Path>>(
    path: P,
    target_hours: Option<f64>,
    listen: Option<String>,
) -> Result<Settings> {
    let mut settings = load_settings_unchecked(&path)?;
    if let Some(target_hours) = target_hours {
        settings.target_hours = target_hours;
    }
    if let Some(listen) = listen {
        settings.listen = listen;
    }
    save_settings(&path, &settings)?;
    Ok(settings)
}

/// Save settings to config.json
pub fn save_settings<P: AsRef<Path>>(path: P, settings: &Settings) -> Result<()> {
    settings.validate()?;
    let json = serde_json::to_string_pretty(settings)?;
    super::files::atomic_write(path, &json)?;
    Ok(())
}
