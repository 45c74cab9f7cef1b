//! Configuration loader/writer plus strongly typed settings structures.
//!
//! User settings live in `~/.slidedeck/config.toml` (or `$SLIDEDECK_DIR`).
//! Deck-specific settings (slides, timer attributes) live in the deck file
//! itself; see `data::deck`.

use crate::core::progress::ThresholdConfig;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable overriding the base directory
pub const DIR_ENV: &str = "SLIDEDECK_DIR";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub ui: UiConfig,
    /// Band offsets used when a deck's timer leaves them out
    #[serde(default)]
    pub timer_defaults: ThresholdConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UiConfig {
    #[serde(default = "default_frame_interval_ms")]
    pub frame_interval_ms: u64, // Frame period in milliseconds (lower = smoother meter, higher CPU)
    #[serde(default = "default_border_style")]
    pub border_style: String, // "single", "double", "rounded", "thick", "none"
    #[serde(default = "default_true")]
    pub show_caption: bool,
    #[serde(default)]
    pub show_notes: bool, // Show speaker notes under the slide in list view
    #[serde(default = "default_progress_color")]
    pub progress_color: String,
    #[serde(default = "default_text_color")]
    pub text_color: String,
    #[serde(default)]
    pub meter_colors: MeterColors,
}

/// Meter fill colors per gauge level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeterColors {
    #[serde(default = "default_optimum_color")]
    pub optimum: String,
    #[serde(default = "default_suboptimum_color")]
    pub suboptimum: String,
    #[serde(default = "default_critical_color")]
    pub critical: String,
    #[serde(default = "default_marker_color")]
    pub marker: String,
}

fn default_frame_interval_ms() -> u64 {
    16 // ~60 FPS
}

fn default_border_style() -> String {
    "rounded".to_string()
}

fn default_true() -> bool {
    true
}

fn default_progress_color() -> String {
    "#5f87ff".to_string()
}

fn default_text_color() -> String {
    "#ffffff".to_string()
}

fn default_optimum_color() -> String {
    "#00c853".to_string()
}

fn default_suboptimum_color() -> String {
    "#ffd600".to_string()
}

fn default_critical_color() -> String {
    "#d50000".to_string()
}

fn default_marker_color() -> String {
    "#bdbdbd".to_string()
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            frame_interval_ms: default_frame_interval_ms(),
            border_style: default_border_style(),
            show_caption: true,
            show_notes: false,
            progress_color: default_progress_color(),
            text_color: default_text_color(),
            meter_colors: MeterColors::default(),
        }
    }
}

impl Default for MeterColors {
    fn default() -> Self {
        Self {
            optimum: default_optimum_color(),
            suboptimum: default_suboptimum_color(),
            critical: default_critical_color(),
            marker: default_marker_color(),
        }
    }
}

impl Config {
    /// Load from the base directory, writing defaults on first run
    pub fn load() -> Result<Self> {
        Self::load_in(&Self::config_dir()?)
    }

    /// Load `config.toml` from `dir`, creating it with defaults if missing
    pub fn load_in(dir: &Path) -> Result<Self> {
        let path = dir.join("config.toml");
        if !path.exists() {
            let config = Config::default();
            config.save_to(&path)?;
            tracing::info!("Wrote default config to {:?}", path);
            return Ok(config);
        }
        Self::load_from_path(&path)
    }

    /// Load an explicit config file; it must exist
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .context(format!("Failed to read config file: {:?}", path))?;
        let config: Config = toml::from_str(&contents)
            .context(format!("Failed to parse config file: {:?}", path))?;
        tracing::debug!("Loaded config from {:?}", path);
        Ok(config.sanitized())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, contents).context("Failed to write config file")?;
        Ok(())
    }

    fn sanitized(mut self) -> Self {
        self.timer_defaults = self.timer_defaults.sanitized();
        if self.ui.frame_interval_ms == 0 {
            tracing::warn!("ui.frame_interval_ms = 0 is not allowed, using default");
            self.ui.frame_interval_ms = default_frame_interval_ms();
        }
        self
    }

    /// Base directory (~/.slidedeck), overridable with SLIDEDECK_DIR
    pub fn config_dir() -> Result<PathBuf> {
        if let Ok(custom_dir) = std::env::var(DIR_ENV) {
            return Ok(PathBuf::from(custom_dir));
        }

        let home = dirs::home_dir().context("Could not find home directory")?;
        Ok(home.join(".slidedeck"))
    }

    /// Returns: ~/.slidedeck/slidedeck.log
    pub fn log_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("slidedeck.log"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_load_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_in(dir.path()).unwrap();
        assert_eq!(config, Config::default());
        assert!(dir.path().join("config.toml").exists());

        // second load reads the file back
        let again = Config::load_in(dir.path()).unwrap();
        assert_eq!(again, config);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        fs::write(
            &path,
            "[ui]\nframe_interval_ms = 0\n\n[timer_defaults]\nrush_for = 20\nlate_for = -5\n",
        )
        .unwrap();

        let config = Config::load_from_path(&path).unwrap();
        assert_eq!(config.ui.frame_interval_ms, 16);
        assert_eq!(config.ui.border_style, "rounded");
        assert_eq!(config.timer_defaults.rush_for, 20.0);
        assert_eq!(config.timer_defaults.rush_for_critical, 50.0);
        assert_eq!(config.timer_defaults.late_for, 0.0);
        assert_eq!(config.ui.meter_colors, MeterColors::default());
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load_from_path(&dir.path().join("absent.toml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn test_bad_toml_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[ui\n").unwrap();
        assert!(Config::load_in(dir.path()).is_err());
    }
}
