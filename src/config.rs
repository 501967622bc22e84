// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Rendering configuration.
//!
//! This module defines [`RenderConfig`], which controls how keypoints are
//! drawn: the confidence threshold, whether the source image is used as the
//! background, and the marker and line sizes.

use crate::error::{OverlayError, Result};

/// Default minimum confidence for a keypoint to be drawn.
pub const DEFAULT_CONF_THRESHOLD: f32 = 0.1;

/// Default opacity of markers and limbs.
pub const DEFAULT_ALPHA: f32 = 0.3;

/// Figure edge length in pixels the default sizes are calibrated for (10in at 100dpi).
const FIGURE_PX: f32 = 1000.0;

/// Marker diameter in points.
const MARKER_SIZE_PT: f32 = 10.0;

/// Limb width in points.
const LINE_WIDTH_PT: f32 = 5.0;

const POINTS_TO_PX: f32 = 100.0 / 72.0;

/// Sizes and opacity of drawn primitives, in canvas pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderStyle {
    /// Radius of keypoint markers.
    pub marker_radius: f32,
    /// Width of limb segments.
    pub line_width: f32,
    /// Opacity in `[0, 1]`.
    pub alpha: f32,
}

impl RenderStyle {
    /// Default style scaled to a `width x height` canvas.
    ///
    /// Sizes are proportional to the longer edge so a figure looks the same
    /// regardless of the source resolution.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn for_canvas(width: u32, height: u32) -> Self {
        let scale = width.max(height) as f32 / FIGURE_PX;
        Self {
            marker_radius: (MARKER_SIZE_PT * POINTS_TO_PX * 0.5 * scale).max(1.0),
            line_width: (LINE_WIDTH_PT * POINTS_TO_PX * scale).max(1.0),
            alpha: DEFAULT_ALPHA,
        }
    }

    /// Check sizes are positive and alpha is within `[0, 1]`.
    ///
    /// # Errors
    ///
    /// Returns [`OverlayError::ConfigError`] describing the first invalid field.
    pub fn validate(&self) -> Result<()> {
        if !(self.marker_radius.is_finite() && self.marker_radius > 0.0) {
            return Err(OverlayError::ConfigError(format!(
                "marker radius must be positive, got {}",
                self.marker_radius
            )));
        }
        if !(self.line_width.is_finite() && self.line_width > 0.0) {
            return Err(OverlayError::ConfigError(format!(
                "line width must be positive, got {}",
                self.line_width
            )));
        }
        if !(0.0..=1.0).contains(&self.alpha) {
            return Err(OverlayError::ConfigError(format!(
                "alpha must be within [0, 1], got {}",
                self.alpha
            )));
        }
        Ok(())
    }
}

/// Configuration for rendering a keypoint figure.
///
/// # Example
///
/// ```rust
/// use openpose_overlay::RenderConfig;
///
/// let config = RenderConfig::new()
///     .with_confidence(0.2)
///     .with_overlay(false);
/// ```
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Keypoints below this confidence are not drawn, nor are limbs touching them.
    pub conf_threshold: f32,
    /// Draw over the source image. When `false`, a blank canvas of the same size is used.
    pub overlay: bool,
    /// Explicit style. If `None`, [`RenderStyle::for_canvas`] is used.
    pub style: Option<RenderStyle>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            conf_threshold: DEFAULT_CONF_THRESHOLD,
            overlay: true,
            style: None,
        }
    }
}

impl RenderConfig {
    /// Create a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the confidence threshold.
    #[must_use]
    pub const fn with_confidence(mut self, threshold: f32) -> Self {
        self.conf_threshold = threshold;
        self
    }

    /// Choose between drawing over the image and drawing on a blank canvas.
    #[must_use]
    pub const fn with_overlay(mut self, overlay: bool) -> Self {
        self.overlay = overlay;
        self
    }

    /// Override the canvas-derived style.
    #[must_use]
    pub const fn with_style(mut self, style: RenderStyle) -> Self {
        self.style = Some(style);
        self
    }

    /// Check the threshold is within `[0, 1]` and an explicit style is usable.
    ///
    /// # Errors
    ///
    /// Returns [`OverlayError::ConfigError`] describing the first invalid field.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.conf_threshold) {
            return Err(OverlayError::ConfigError(format!(
                "confidence threshold must be within [0, 1], got {}",
                self.conf_threshold
            )));
        }
        self.style.as_ref().map_or(Ok(()), RenderStyle::validate)
    }

    /// Style to use on a `width x height` canvas.
    #[must_use]
    pub fn style_for(&self, width: u32, height: u32) -> RenderStyle {
        self.style
            .unwrap_or_else(|| RenderStyle::for_canvas(width, height))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RenderConfig::default();
        assert!((config.conf_threshold - 0.1).abs() < f32::EPSILON);
        assert!(config.overlay);
        assert!(config.style.is_none());
    }

    #[test]
    fn test_builder() {
        let style = RenderStyle {
            marker_radius: 3.0,
            line_width: 2.0,
            alpha: 1.0,
        };
        let config = RenderConfig::new()
            .with_confidence(0.5)
            .with_overlay(false)
            .with_style(style);
        assert!((config.conf_threshold - 0.5).abs() < f32::EPSILON);
        assert!(!config.overlay);
        assert_eq!(config.style_for(10, 10), style);
    }

    #[test]
    fn test_style_scales_with_canvas() {
        let small = RenderStyle::for_canvas(500, 300);
        let large = RenderStyle::for_canvas(2000, 1000);
        assert!(large.marker_radius > small.marker_radius);
        assert!(large.line_width > small.line_width);

        let figure = RenderStyle::for_canvas(1000, 1000);
        assert!((figure.marker_radius - 6.944).abs() < 0.01);
        assert!((figure.alpha - DEFAULT_ALPHA).abs() < f32::EPSILON);
    }

    #[test]
    fn test_style_minimum_size() {
        let tiny = RenderStyle::for_canvas(4, 4);
        assert!((tiny.marker_radius - 1.0).abs() < f32::EPSILON);
        assert!((tiny.line_width - 1.0).abs() < f32::EPSILON);
        assert!(tiny.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        assert!(RenderConfig::new().validate().is_ok());
        assert!(RenderConfig::new().with_confidence(-0.1).validate().is_err());
        assert!(RenderConfig::new().with_confidence(f32::NAN).validate().is_err());

        let bad = RenderStyle {
            marker_radius: -5.0,
            line_width: f32::NAN,
            alpha: 2.0,
        };
        assert!(matches!(
            RenderConfig::new().with_style(bad).validate(),
            Err(OverlayError::ConfigError(_))
        ));
    }

    #[test]
    fn test_style_validation() {
        let mut style = RenderStyle::for_canvas(100, 100);
        style.alpha = 1.5;
        assert!(style.validate().is_err());
        style.alpha = 0.5;
        style.line_width = 0.0;
        assert!(style.validate().is_err());
    }
}
