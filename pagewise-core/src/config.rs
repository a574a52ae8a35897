use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Process-wide tunables for the viewer core.
///
/// Every component receives this at construction, so tests can shrink page
/// heights or widen buffers without touching constants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Render resolution at zoom factor 1.0.
    pub base_dpi: u32,
    /// Heuristic page height used to estimate the visible range before pages are measured.
    pub average_page_height: u32,
    /// Vertical gap between consecutive pages, in pixels.
    pub page_spacing: u32,
    /// Outer margin around the page column, in pixels.
    pub page_margin: u32,
    /// Extra pages rendered on each side of the visible range.
    pub prerender_buffer: usize,
    /// Pages rendered unconditionally when a document is loaded.
    pub initial_prerender: usize,
    pub min_zoom: f64,
    pub max_zoom: f64,
    pub default_zoom: f64,
    /// Multiplier applied by zoom in / divisor applied by zoom out.
    pub zoom_step: f64,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            base_dpi: 200,
            average_page_height: 600,
            page_spacing: 20,
            page_margin: 50,
            prerender_buffer: 2,
            initial_prerender: 5,
            min_zoom: 0.5,
            max_zoom: 10.0,
            default_zoom: 1.0,
            zoom_step: 1.2,
        }
    }
}

impl ViewerConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&json)?;
        tracing::debug!("Loaded viewer config from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_dpi == 0 {
            return Err(invalid("base_dpi", "must be positive"));
        }
        if self.average_page_height == 0 {
            return Err(invalid("average_page_height", "must be positive"));
        }
        if !(self.min_zoom.is_finite() && self.min_zoom > 0.0) {
            return Err(invalid("min_zoom", "must be a positive number"));
        }
        if !self.max_zoom.is_finite() || self.min_zoom > self.max_zoom {
            return Err(invalid(
                "max_zoom",
                format!("must be at least min_zoom ({})", self.min_zoom),
            ));
        }
        if !(self.min_zoom..=self.max_zoom).contains(&self.default_zoom) {
            return Err(invalid(
                "default_zoom",
                format!("must lie within [{}, {}]", self.min_zoom, self.max_zoom),
            ));
        }
        if !(self.zoom_step.is_finite() && self.zoom_step > 1.0) {
            return Err(invalid("zoom_step", "must be greater than 1.0"));
        }
        Ok(())
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}
