//! Board configuration.

use crate::camera::{MAX_ZOOM, MIN_ZOOM};
use crate::element::ElementStyle;
use crate::element::rough::DEFAULT_ROUGHNESS;
use crate::geometry::HitTolerances;
use kurbo::Size;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Tunables for a [`crate::Board`]. Missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    pub min_zoom: f64,
    pub max_zoom: f64,
    /// Scale step for zoom-in/zoom-out commands.
    pub zoom_step: f64,
    /// Wheel delta to scale delta factor when zooming with the wheel.
    pub wheel_zoom_factor: f64,
    pub handle_tolerance: f64,
    pub line_tolerance: f64,
    pub freehand_tolerance: f64,
    pub viewport: Size,
    pub default_style: ElementStyle,
    /// Sketch roughness; 0 draws clean geometry.
    pub roughness: f64,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            min_zoom: MIN_ZOOM,
            max_zoom: MAX_ZOOM,
            zoom_step: 0.1,
            wheel_zoom_factor: 0.01,
            handle_tolerance: 5.0,
            line_tolerance: 1.0,
            freehand_tolerance: 5.0,
            viewport: Size::new(800.0, 600.0),
            default_style: ElementStyle::default(),
            roughness: DEFAULT_ROUGHNESS,
        }
    }
}

impl BoardConfig {
    /// Load a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let config = Self::from_json(&contents)?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !(self.min_zoom > 0.0 && self.min_zoom <= self.max_zoom) {
            return Err(ConfigError::Invalid(format!(
                "zoom range {}..{} is empty or not positive",
                self.min_zoom, self.max_zoom
            )));
        }
        if self.viewport.width <= 0.0 || self.viewport.height <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "viewport {}x{} has no area",
                self.viewport.width, self.viewport.height
            )));
        }
        Ok(())
    }

    pub fn tolerances(&self) -> HitTolerances {
        HitTolerances {
            handle: self.handle_tolerance,
            line: self.line_tolerance,
            freehand: self.freehand_tolerance,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = BoardConfig::default();
        assert!((config.min_zoom - 0.1).abs() < f64::EPSILON);
        assert!((config.max_zoom - 20.0).abs() < f64::EPSILON);
        assert_eq!(config.tolerances(), HitTolerances::default());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = BoardConfig::from_json(r#"{"max_zoom": 8.0, "roughness": 0.0}"#).unwrap();
        assert!((config.max_zoom - 8.0).abs() < f64::EPSILON);
        assert!((config.min_zoom - 0.1).abs() < f64::EPSILON);
        assert!(config.roughness.abs() < f64::EPSILON);
    }

    #[test]
    fn test_rejects_inverted_zoom_range() {
        let result = BoardConfig::from_json(r#"{"min_zoom": 5.0, "max_zoom": 1.0}"#);
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"handle_tolerance": 8.0}}"#).unwrap();
        let config = BoardConfig::load(file.path()).unwrap();
        assert!((config.handle_tolerance - 8.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = BoardConfig::load(dir.path().join("missing.json"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }
}
