//! Chart layout/behaviour settings and the persisted user settings file.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Layout and interaction parameters of a schedule chart.
///
/// All fields carry defaults so a partial settings file is valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    /// Width of the resource label column, in pixels.
    pub left_margin: f32,
    /// Height of the time axis header, in pixels.
    pub top_margin: f32,
    pub row_height: f32,
    /// Vertical gap between a bar and its row edges.
    pub bar_padding: f32,
    /// When false, pressing a job only selects it.
    pub editing: bool,
    /// Pointer travel (px) below which a press/release on a job is a click.
    pub click_slop: f32,
    /// Minimum interval between handled pointer moves.
    pub move_throttle_ms: u64,
    /// Zoom factor applied per wheel notch.
    pub wheel_zoom_step: f64,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            left_margin: 120.0,
            top_margin: 60.0,
            row_height: 40.0,
            bar_padding: 6.0,
            editing: true,
            click_slop: 3.0,
            move_throttle_ms: 16,
            wheel_zoom_step: 1.1,
        }
    }
}

impl ChartConfig {
    pub fn bar_height(&self) -> f32 {
        (self.row_height - self.bar_padding * 2.0).max(1.0)
    }
}

/// Persisted user settings (lives in the OS config directory).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    pub chart: ChartConfig,
    /// Last schedule file opened, reopened on start when no path is given.
    pub last_file: Option<PathBuf>,
}

impl AppSettings {
    /// Load settings from `path`, falling back to defaults on any problem.
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(json) => serde_json::from_str(&json).unwrap_or_else(|e| {
                log::warn!("Ignoring unreadable settings {:?}: {}", path, e);
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    pub fn save(&self, path: &Path) -> crate::error::Result<()> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

/// Directory holding `settings.json`.
pub fn config_dir() -> PathBuf {
    directories::ProjectDirs::from("", "", "gantt-scheduler")
        .map(|dirs| dirs.config_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}

pub fn settings_path() -> PathBuf {
    config_dir().join("settings.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_settings_fill_defaults() {
        let settings: AppSettings =
            serde_json::from_str(r#"{ "chart": { "row_height": 52.0 } }"#).unwrap();
        assert_eq!(settings.chart.row_height, 52.0);
        assert_eq!(settings.chart.left_margin, 120.0);
        assert!(settings.chart.editing);
        assert!(settings.last_file.is_none());
    }

    #[test]
    fn test_missing_settings_file_gives_defaults() {
        let settings = AppSettings::load(Path::new("/nonexistent/gantt/settings.json"));
        assert_eq!(settings.chart, ChartConfig::default());
    }

    #[test]
    fn test_bar_height_never_collapses() {
        let config = ChartConfig {
            row_height: 10.0,
            bar_padding: 8.0,
            ..Default::default()
        };
        assert_eq!(config.bar_height(), 1.0);
    }
}
