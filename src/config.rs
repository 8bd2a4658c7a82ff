/// Dashboard settings, persisted as JSON next to the working directory

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::data::reference::MaximaSource;
use crate::error::{DashboardError, Result};
use crate::gui::theme::AppTheme;

pub const CONFIG_FILE: &str = "tensile_dashboard.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Measurement CSV
    pub data_file: PathBuf,
    /// Directory scanned for microscopy images
    pub image_dir: PathBuf,
    pub theme: AppTheme,
    pub maxima_source: MaximaSource,
    /// Largest |computed - reference| accepted by the cross-check
    pub reference_tolerance: f64,
    pub project_url: String,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_file: PathBuf::from("Combined_Sample_Data_Sigfigs.csv"),
            image_dir: PathBuf::from("ResearchPics"),
            theme: AppTheme::Light,
            maxima_source: MaximaSource::LoadedData,
            reference_tolerance: 1e-6,
            project_url: "https://github.com/lifeissad21/GHPHairProject".to_string(),
        }
    }
}

impl DashboardConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| DashboardError::io(path, e))?;
        let config: DashboardConfig = serde_json::from_str(&text)?;
        Ok(config)
    }

    /// Settings from `path` if it exists and parses, defaults otherwise
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        match Self::load(path) {
            Ok(config) => {
                log::info!("Loaded settings from {}", path.display());
                config
            }
            Err(e) => {
                log::warn!("Ignoring settings file: {}", e);
                Self::default()
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).map_err(|e| DashboardError::io(path, e))?;
        log::info!("Saved settings to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_missing() {
        let dir = tempfile::tempdir().unwrap();
        let config = DashboardConfig::load_or_default(&dir.path().join(CONFIG_FILE));
        assert_eq!(config, DashboardConfig::default());
        assert_eq!(config.image_dir, PathBuf::from("ResearchPics"));
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        let config = DashboardConfig {
            data_file: PathBuf::from("other.csv"),
            theme: AppTheme::Dark,
            maxima_source: MaximaSource::Reference,
            ..Default::default()
        };
        config.save(&path).unwrap();
        assert_eq!(DashboardConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, r#"{ "image_dir": "pics" }"#).unwrap();
        let config = DashboardConfig::load(&path).unwrap();
        assert_eq!(config.image_dir, PathBuf::from("pics"));
        assert_eq!(config.data_file, DashboardConfig::default().data_file);
    }

    #[test]
    fn test_malformed_file_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(DashboardConfig::load(&path), Err(DashboardError::Config(_))));
        assert_eq!(DashboardConfig::load_or_default(&path), DashboardConfig::default());
    }
}
