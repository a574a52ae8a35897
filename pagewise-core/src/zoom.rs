//! Zoom factor and auto-fit state.
//!
//! Holds the current factor and mode, derives fit-to-width / fit-to-page
//! factors and keeps the factor inside the configured bounds. Every mutating
//! operation returns `Some(ZoomChange)` only when the clamped factor or the
//! mode actually moved, so callers can skip redundant re-renders.

use crate::config::ViewerConfig;
use crate::error::ZoomError;
use crate::geometry::{PageInfo, ViewportInfo};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ZoomMode {
    /// Factor only changes on explicit request.
    #[default]
    Free,
    /// Page width tracks the viewport width.
    FitWidth,
    /// Whole page stays inside the viewport.
    FitPage,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomChange {
    pub factor: f64,
    pub mode: ZoomMode,
}

#[derive(Debug, Clone)]
pub struct ZoomController {
    factor: f64,
    mode: ZoomMode,
    min_zoom: f64,
    max_zoom: f64,
    default_zoom: f64,
    step: f64,
}

impl ZoomController {
    /// Settings that would break clamping or stepping fall back to the
    /// built-in defaults instead.
    pub fn new(config: &ViewerConfig) -> Self {
        let fallback = ViewerConfig::default();

        let (min_zoom, max_zoom) = if valid_limits(config.min_zoom, config.max_zoom) {
            (config.min_zoom, config.max_zoom)
        } else {
            tracing::warn!(
                "Invalid zoom limits [{}, {}], using [{}, {}]",
                config.min_zoom,
                config.max_zoom,
                fallback.min_zoom,
                fallback.max_zoom
            );
            (fallback.min_zoom, fallback.max_zoom)
        };
        let default_zoom = if config.default_zoom.is_finite() {
            config.default_zoom.clamp(min_zoom, max_zoom)
        } else {
            tracing::warn!("Invalid default zoom {}", config.default_zoom);
            fallback.default_zoom.clamp(min_zoom, max_zoom)
        };
        let step = if config.zoom_step.is_finite() && config.zoom_step > 1.0 {
            config.zoom_step
        } else {
            tracing::warn!("Invalid zoom step {}", config.zoom_step);
            fallback.zoom_step
        };

        Self {
            factor: default_zoom,
            mode: ZoomMode::Free,
            min_zoom,
            max_zoom,
            default_zoom,
            step,
        }
    }

    pub fn factor(&self) -> f64 {
        self.factor
    }

    pub fn mode(&self) -> ZoomMode {
        self.mode
    }

    pub fn is_fit_width(&self) -> bool {
        self.mode == ZoomMode::FitWidth
    }

    pub fn is_fit_page(&self) -> bool {
        self.mode == ZoomMode::FitPage
    }

    pub fn limits(&self) -> (f64, f64) {
        (self.min_zoom, self.max_zoom)
    }

    /// Replace the bounds and re-clamp the current factor into them.
    ///
    /// Inverted or non-positive bounds are ignored.
    pub fn set_limits(&mut self, min_zoom: f64, max_zoom: f64) -> Option<ZoomChange> {
        if !valid_limits(min_zoom, max_zoom) {
            tracing::warn!("Ignoring invalid zoom limits [{}, {}]", min_zoom, max_zoom);
            return None;
        }
        self.min_zoom = min_zoom;
        self.max_zoom = max_zoom;
        self.apply(self.factor, self.mode)
    }

    /// Set an explicit factor. Always leaves auto-fit mode.
    pub fn set_zoom(&mut self, factor: f64) -> Option<ZoomChange> {
        if !factor.is_finite() {
            tracing::debug!("Ignoring non-finite zoom factor {}", factor);
            return None;
        }
        self.apply(factor, ZoomMode::Free)
    }

    pub fn zoom_in(&mut self) -> Option<ZoomChange> {
        self.set_zoom(self.factor * self.step)
    }

    pub fn zoom_out(&mut self) -> Option<ZoomChange> {
        self.set_zoom(self.factor / self.step)
    }

    pub fn reset_zoom(&mut self) -> Option<ZoomChange> {
        self.set_zoom(self.default_zoom)
    }

    /// Switch to fit-width mode. Degenerate input keeps the current factor.
    pub fn fit_to_width(&mut self, viewport: &ViewportInfo, page: &PageInfo) -> Option<ZoomChange> {
        let factor = self.compute_fit_width(viewport, page).unwrap_or_else(|err| {
            tracing::debug!("Fit to width keeps zoom {}: {}", self.factor, err);
            self.factor
        });
        self.apply(factor, ZoomMode::FitWidth)
    }

    /// Switch to fit-page mode. Degenerate input keeps the current factor.
    pub fn fit_to_page(&mut self, viewport: &ViewportInfo, page: &PageInfo) -> Option<ZoomChange> {
        let factor = self.compute_fit_page(viewport, page).unwrap_or_else(|err| {
            tracing::debug!("Fit to page keeps zoom {}: {}", self.factor, err);
            self.factor
        });
        self.apply(factor, ZoomMode::FitPage)
    }

    /// Re-run the active auto-fit against the new viewport. Free mode is untouched.
    pub fn on_viewport_resize(
        &mut self,
        viewport: &ViewportInfo,
        page: &PageInfo,
    ) -> Option<ZoomChange> {
        match self.mode {
            ZoomMode::FitWidth => self.fit_to_width(viewport, page),
            ZoomMode::FitPage => self.fit_to_page(viewport, page),
            ZoomMode::Free => None,
        }
    }

    /// Unclamped factor that makes `page` span the available viewport width.
    pub fn compute_fit_width(
        &self,
        viewport: &ViewportInfo,
        page: &PageInfo,
    ) -> Result<f64, ZoomError> {
        if page.width == 0 {
            return Err(ZoomError::DegeneratePage {
                width: page.width,
                height: page.height,
            });
        }
        let available_width = viewport.available_width();
        if available_width <= 0 {
            return Err(ZoomError::DegenerateViewport {
                available_width,
                available_height: viewport.available_height(),
            });
        }
        Ok(available_width as f64 / f64::from(page.width))
    }

    /// Unclamped factor that fits all of `page` inside the available viewport.
    pub fn compute_fit_page(
        &self,
        viewport: &ViewportInfo,
        page: &PageInfo,
    ) -> Result<f64, ZoomError> {
        if page.width == 0 || page.height == 0 {
            return Err(ZoomError::DegeneratePage {
                width: page.width,
                height: page.height,
            });
        }
        let available_width = viewport.available_width();
        let available_height = viewport.available_height();
        if available_width <= 0 || available_height <= 0 {
            return Err(ZoomError::DegenerateViewport {
                available_width,
                available_height,
            });
        }
        let width_ratio = available_width as f64 / f64::from(page.width);
        let height_ratio = available_height as f64 / f64::from(page.height);
        Ok(width_ratio.min(height_ratio))
    }

    fn apply(&mut self, factor: f64, mode: ZoomMode) -> Option<ZoomChange> {
        let clamped = factor.clamp(self.min_zoom, self.max_zoom);
        if clamped == self.factor && mode == self.mode {
            return None;
        }
        self.factor = clamped;
        self.mode = mode;
        tracing::debug!("Zoom changed to {:.3} ({:?})", clamped, mode);
        Some(ZoomChange {
            factor: clamped,
            mode,
        })
    }
}

fn valid_limits(min_zoom: f64, max_zoom: f64) -> bool {
    min_zoom.is_finite() && max_zoom.is_finite() && min_zoom > 0.0 && min_zoom <= max_zoom
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const EPSILON: f64 = 1e-9;

    fn controller() -> ZoomController {
        ZoomController::new(&ViewerConfig::default())
    }

    fn viewport() -> ViewportInfo {
        ViewportInfo {
            width: 800,
            height: 600,
            margins_h: 40,
            margins_v: 40,
        }
    }

    fn page() -> PageInfo {
        PageInfo {
            width: 400,
            height: 800,
        }
    }

    #[test]
    fn starts_at_default_zoom_in_free_mode() {
        let zoom = controller();
        assert_eq!(zoom.factor(), 1.0);
        assert_eq!(zoom.mode(), ZoomMode::Free);
    }

    #[test]
    fn fit_to_width_uses_available_width() {
        let mut zoom = controller();
        let change = zoom.fit_to_width(&viewport(), &page()).unwrap();
        assert!((change.factor - 1.9).abs() < EPSILON);
        assert_eq!(change.mode, ZoomMode::FitWidth);
        assert!(zoom.is_fit_width());
    }

    #[test]
    fn fit_to_page_uses_most_restrictive_ratio() {
        let mut zoom = controller();
        let change = zoom.fit_to_page(&viewport(), &page()).unwrap();
        assert!((change.factor - 0.7).abs() < EPSILON);
        assert_eq!(change.mode, ZoomMode::FitPage);
    }

    #[test]
    fn set_zoom_clamps_and_leaves_auto_fit() {
        let mut zoom = controller();
        zoom.fit_to_width(&viewport(), &page());

        let change = zoom.set_zoom(50.0).unwrap();
        assert_eq!(
            change,
            ZoomChange {
                factor: 10.0,
                mode: ZoomMode::Free
            }
        );

        let change = zoom.set_zoom(0.01).unwrap();
        assert_eq!(change.factor, 0.5);
    }

    #[test]
    fn repeating_the_same_zoom_is_silent() {
        let mut zoom = controller();
        assert!(zoom.set_zoom(2.5).is_some());
        assert!(zoom.set_zoom(zoom.factor()).is_none());
        // Already clamped to the ceiling.
        zoom.set_zoom(99.0);
        assert!(zoom.set_zoom(120.0).is_none());
    }

    #[test]
    fn zoom_steps_switch_to_free_mode() {
        let mut zoom = controller();
        zoom.fit_to_page(&viewport(), &page());

        let change = zoom.zoom_in().unwrap();
        assert!((change.factor - 0.7 * 1.2).abs() < EPSILON);
        assert_eq!(change.mode, ZoomMode::Free);

        let change = zoom.zoom_out().unwrap();
        assert!((change.factor - 0.7).abs() < EPSILON);
    }

    #[test]
    fn reset_returns_to_default() {
        let mut zoom = controller();
        zoom.set_zoom(3.0);
        assert_eq!(zoom.reset_zoom().unwrap().factor, 1.0);
    }

    #[test]
    fn degenerate_page_keeps_factor_but_takes_mode() {
        let mut zoom = controller();
        zoom.set_zoom(2.0);

        let change = zoom.fit_to_width(&viewport(), &PageInfo::default()).unwrap();
        assert_eq!(
            change,
            ZoomChange {
                factor: 2.0,
                mode: ZoomMode::FitWidth
            }
        );
        // Same degenerate request again: nothing moved.
        assert!(zoom.fit_to_width(&viewport(), &PageInfo::default()).is_none());
    }

    #[test]
    fn calculators_report_degenerate_input() {
        let zoom = controller();
        let cramped = ViewportInfo {
            width: 30,
            height: 600,
            margins_h: 40,
            margins_v: 40,
        };

        assert_eq!(
            zoom.compute_fit_width(&viewport(), &PageInfo::default()),
            Err(ZoomError::DegeneratePage {
                width: 0,
                height: 0
            })
        );
        assert!(matches!(
            zoom.compute_fit_page(&cramped, &page()),
            Err(ZoomError::DegenerateViewport {
                available_width: -10,
                ..
            })
        ));
        assert!(zoom.compute_fit_width(&viewport(), &page()).is_ok());
    }

    #[test]
    fn resize_tracks_viewport_only_in_auto_fit() {
        let mut zoom = controller();
        let wider = ViewportInfo {
            width: 1240,
            ..viewport()
        };

        assert!(zoom.on_viewport_resize(&wider, &page()).is_none());

        zoom.fit_to_width(&viewport(), &page());
        let change = zoom.on_viewport_resize(&wider, &page()).unwrap();
        assert!((change.factor - 3.0).abs() < EPSILON);
        assert_eq!(change.mode, ZoomMode::FitWidth);

        assert!(zoom.on_viewport_resize(&wider, &page()).is_none());
    }

    #[test]
    fn tightening_limits_reclamps_current_factor() {
        let mut zoom = controller();
        zoom.set_zoom(8.0);

        let change = zoom.set_limits(0.5, 4.0).unwrap();
        assert_eq!(change.factor, 4.0);
        assert!(zoom.set_limits(0.5, 6.0).is_none());
        assert_eq!(zoom.factor(), 4.0);
    }

    #[test]
    fn invalid_limits_are_ignored() {
        let mut zoom = controller();
        assert!(zoom.set_limits(3.0, 1.0).is_none());
        assert!(zoom.set_limits(0.0, 1.0).is_none());
        assert_eq!(zoom.limits(), (0.5, 10.0));
    }

    #[test]
    fn unusable_settings_fall_back_to_defaults() {
        let inverted = ViewerConfig {
            min_zoom: 4.0,
            max_zoom: 2.0,
            zoom_step: 0.5,
            ..ViewerConfig::default()
        };
        let mut zoom = ZoomController::new(&inverted);
        assert_eq!(zoom.limits(), (0.5, 10.0));
        assert_eq!(zoom.factor(), 1.0);
        assert!((zoom.zoom_in().unwrap().factor - 1.2).abs() < EPSILON);

        let undefined = ViewerConfig {
            min_zoom: f64::NAN,
            default_zoom: f64::INFINITY,
            ..ViewerConfig::default()
        };
        let zoom = ZoomController::new(&undefined);
        assert_eq!(zoom.limits(), (0.5, 10.0));
        assert_eq!(zoom.factor(), 1.0);
    }

    #[test]
    fn default_zoom_outside_limits_is_clamped() {
        let config = ViewerConfig {
            default_zoom: 20.0,
            ..ViewerConfig::default()
        };
        let mut zoom = ZoomController::new(&config);
        assert_eq!(zoom.factor(), 10.0);
        zoom.set_zoom(2.0);
        assert_eq!(zoom.reset_zoom().map(|change| change.factor), Some(10.0));
    }

    #[test]
    fn non_finite_zoom_is_ignored() {
        let mut zoom = controller();
        assert!(zoom.set_zoom(f64::NAN).is_none());
        assert!(zoom.set_zoom(f64::INFINITY).is_none());
        assert_eq!(zoom.factor(), 1.0);
    }
}
