// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Drawing keypoint markers and skeleton limbs.
//!
//! Every primitive is rasterized into a small coverage mask clipped to the
//! canvas and then alpha-blended, so overlapping translucent primitives
//! accumulate the way stacked plot artists do.

use image::{DynamicImage, GrayImage, Luma, RgbImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_polygon_mut};
use imageproc::point::Point;

use crate::body25::LIMB_SEQ;
use crate::config::{RenderConfig, RenderStyle};
use crate::error::Result;
use crate::keypoints::{AreaKeypoints, KeypointArea, PoseKeypoints};
use crate::visualizer::{Color, ColorCycle};
use crate::{info, verbose, warn};

/// Background of figures rendered without the source image.
const BLANK_BACKGROUND: Color = Color::WHITE;

const COVERED: Luma<u8> = Luma([255]);

/// Pixel window of the canvas touched by a primitive.
#[derive(Debug, Clone, Copy)]
struct Window {
    x0: i32,
    y0: i32,
    width: u32,
    height: u32,
}

impl Window {
    /// Intersect the float bounding box with the canvas; `None` if nothing is visible.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn clip(canvas: &RgbImage, min: (f32, f32), max: (f32, f32)) -> Option<Self> {
        let (cw, ch) = canvas.dimensions();
        if cw == 0 || ch == 0 {
            return None;
        }
        let x0 = (min.0.floor() as i32).max(0);
        let y0 = (min.1.floor() as i32).max(0);
        let x1 = (max.0.ceil() as i32).min(cw as i32 - 1);
        let y1 = (max.1.ceil() as i32).min(ch as i32 - 1);
        if x0 > x1 || y0 > y1 {
            return None;
        }
        Some(Self {
            x0,
            y0,
            width: (x1 - x0 + 1) as u32,
            height: (y1 - y0 + 1) as u32,
        })
    }

    /// Convert canvas coordinates to mask-local integer coordinates.
    #[allow(clippy::cast_possible_truncation)]
    fn local(&self, x: f32, y: f32) -> (i32, i32) {
        (
            (x - self.x0 as f32).round() as i32,
            (y - self.y0 as f32).round() as i32,
        )
    }

    fn mask(&self) -> GrayImage {
        GrayImage::new(self.width, self.height)
    }
}

/// Blend `color` into `canvas` wherever `mask` is covered.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn blend_mask(canvas: &mut RgbImage, mask: &GrayImage, window: Window, color: Color, alpha: f32) {
    let src = color.to_rgb();
    let alpha = alpha.clamp(0.0, 1.0);
    for (mx, my, coverage) in mask.enumerate_pixels() {
        if coverage[0] == 0 {
            continue;
        }
        let px = canvas.get_pixel_mut(window.x0 as u32 + mx, window.y0 as u32 + my);
        for c in 0..3 {
            let dst = f32::from(px[c]);
            px[c] = alpha.mul_add(f32::from(src[c]) - dst, dst).round() as u8;
        }
    }
}

/// Clip a segment to the canvas grown by `pad` on every side (Liang-Barsky).
///
/// Keeps the polygon corners within a few pixels of the canvas so mask-local
/// coordinates stay small. `None` if the segment misses the padded canvas.
#[allow(clippy::cast_possible_truncation)]
fn clip_segment(
    canvas: &RgbImage,
    start: (f32, f32),
    end: (f32, f32),
    pad: f32,
) -> Option<((f32, f32), (f32, f32))> {
    let (w, h) = canvas.dimensions();
    if w == 0 || h == 0 {
        return None;
    }
    let pad = f64::from(pad);
    let (x_min, y_min) = (-pad, -pad);
    let (x_max, y_max) = (f64::from(w - 1) + pad, f64::from(h - 1) + pad);
    let (x0, y0) = (f64::from(start.0), f64::from(start.1));
    let (dx, dy) = (f64::from(end.0) - x0, f64::from(end.1) - y0);

    let (mut t0, mut t1) = (0.0_f64, 1.0_f64);
    for (p, q) in [
        (-dx, x0 - x_min),
        (dx, x_max - x0),
        (-dy, y0 - y_min),
        (dy, y_max - y0),
    ] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let t = q / p;
        if p < 0.0 {
            t0 = t0.max(t);
        } else {
            t1 = t1.min(t);
        }
        if t0 > t1 {
            return None;
        }
    }
    let at = |t: f64| ((x0 + t * dx) as f32, (y0 + t * dy) as f32);
    Some((at(t0), at(t1)))
}

/// Draw a filled translucent circle.
pub fn draw_marker(canvas: &mut RgbImage, center: (f32, f32), color: Color, style: &RenderStyle) {
    let (x, y) = center;
    if !x.is_finite() || !y.is_finite() {
        return;
    }
    let r = style.marker_radius;
    if !(r.is_finite() && r > 0.0) {
        return;
    }
    let Some(window) = Window::clip(canvas, (x - r, y - r), (x + r, y + r)) else {
        return;
    };
    let mut mask = window.mask();
    #[allow(clippy::cast_possible_truncation)]
    draw_filled_circle_mut(&mut mask, window.local(x, y), r.round() as i32, COVERED);
    blend_mask(canvas, &mask, window, color, style.alpha);
}

/// Draw a thick translucent segment.
pub fn draw_limb(
    canvas: &mut RgbImage,
    start: (f32, f32),
    end: (f32, f32),
    color: Color,
    style: &RenderStyle,
) {
    if ![start.0, start.1, end.0, end.1].iter().all(|v| v.is_finite()) {
        return;
    }
    if !(style.line_width.is_finite() && style.line_width > 0.0) {
        return;
    }
    let half = (style.line_width * 0.5).max(1.0);
    let Some((start, end)) = clip_segment(canvas, start, end, half + 2.0) else {
        return;
    };
    let (dx, dy) = (end.0 - start.0, end.1 - start.1);
    let length = dx.hypot(dy);
    if length <= f32::EPSILON {
        // A zero-length limb still shows up as a dot of the line width.
        let dot = RenderStyle {
            marker_radius: half,
            ..*style
        };
        draw_marker(canvas, start, color, &dot);
        return;
    }

    let (nx, ny) = (-dy / length * half, dx / length * half);
    let corners = [
        (start.0 + nx, start.1 + ny),
        (end.0 + nx, end.1 + ny),
        (end.0 - nx, end.1 - ny),
        (start.0 - nx, start.1 - ny),
    ];
    let min = corners
        .iter()
        .fold((f32::INFINITY, f32::INFINITY), |acc, c| (acc.0.min(c.0), acc.1.min(c.1)));
    let max = corners.iter().fold((f32::NEG_INFINITY, f32::NEG_INFINITY), |acc, c| {
        (acc.0.max(c.0), acc.1.max(c.1))
    });
    let Some(window) = Window::clip(canvas, min, max) else {
        return;
    };

    let poly: Vec<Point<i32>> = corners
        .iter()
        .map(|&(x, y)| {
            let (lx, ly) = window.local(x, y);
            Point::new(lx, ly)
        })
        .collect();
    let mut mask = window.mask();
    if poly[0] != poly[poly.len() - 1] {
        draw_polygon_mut(&mut mask, &poly, COVERED);
    }
    blend_mask(canvas, &mask, window, color, style.alpha);
}

/// Draw a marker for every keypoint at or above `conf_thresh`.
///
/// Each drawn marker takes the next color from `colors`.
pub fn plot_kpt_markers(
    canvas: &mut RgbImage,
    keypoints: &AreaKeypoints,
    conf_thresh: f32,
    colors: &mut ColorCycle,
    style: &RenderStyle,
) -> usize {
    let mut drawn = 0;
    for kpt in keypoints.iter().filter(|k| k.is_visible(conf_thresh)) {
        let color = colors.next().unwrap_or(Color::RED);
        draw_marker(canvas, (kpt.x, kpt.y), color, style);
        drawn += 1;
    }
    drawn
}

/// Draw every limb whose two endpoints are at or above `conf_thresh`.
///
/// Limbs referencing keypoints past the end of `keypoints` are skipped.
/// Each drawn limb takes the next color from `colors`.
pub fn plot_limbs(
    canvas: &mut RgbImage,
    keypoints: &AreaKeypoints,
    limbs: &[[usize; 2]],
    conf_thresh: f32,
    colors: &mut ColorCycle,
    style: &RenderStyle,
) -> usize {
    let mut drawn = 0;
    for &[start_i, end_i] in limbs {
        let (Some(start), Some(end)) = (keypoints.get(start_i), keypoints.get(end_i)) else {
            continue;
        };
        if start.is_visible(conf_thresh) && end.is_visible(conf_thresh) {
            let color = colors.next().unwrap_or(Color::RED);
            draw_limb(canvas, (start.x, start.y), (end.x, end.y), color, style);
            drawn += 1;
        }
    }
    drawn
}

/// Draw markers for every keypoint area and limbs for the body.
///
/// A single color cycle is shared by all areas of one call.
pub fn plot_skeleton(
    canvas: &mut RgbImage,
    keypoints: &PoseKeypoints,
    conf_thresh: f32,
    style: &RenderStyle,
) {
    let mut colors = ColorCycle::new();
    for area in KeypointArea::ALL {
        let Some(area_kpts) = keypoints.get(area) else {
            warn!("Area `{area}` not in keypoint data -> skipping");
            continue;
        };

        info!("- {area}");
        let markers = plot_kpt_markers(canvas, area_kpts, conf_thresh, &mut colors, style);

        // Connections are only defined for the body.
        let limbs = if area == KeypointArea::Pose {
            plot_limbs(canvas, area_kpts, &LIMB_SEQ, conf_thresh, &mut colors, style)
        } else {
            0
        };
        verbose!("  {markers} markers, {limbs} limbs");
    }
}

/// Render keypoints over `img`, or on a blank canvas of the same size.
///
/// # Errors
///
/// Returns [`crate::OverlayError::ConfigError`] if `config` fails [`RenderConfig::validate`].
pub fn plot_openpose_overlay_img(
    img: &DynamicImage,
    keypoints: &PoseKeypoints,
    config: &RenderConfig,
) -> Result<RgbImage> {
    config.validate()?;
    verbose!("Plotting OpenPose results");
    let mut canvas = if config.overlay {
        img.to_rgb8()
    } else {
        RgbImage::from_pixel(img.width(), img.height(), BLANK_BACKGROUND.to_rgb())
    };
    let style = config.style_for(canvas.width(), canvas.height());
    plot_skeleton(&mut canvas, keypoints, config.conf_threshold, &style);
    Ok(canvas)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keypoints::Keypoint;
    use image::Rgb;

    const OPAQUE: RenderStyle = RenderStyle {
        marker_radius: 2.0,
        line_width: 3.0,
        alpha: 1.0,
    };

    fn white(w: u32, h: u32) -> RgbImage {
        RgbImage::from_pixel(w, h, Rgb([255, 255, 255]))
    }

    #[test]
    fn test_marker_blends_alpha() {
        let mut canvas = white(20, 20);
        let style = RenderStyle {
            alpha: 0.5,
            ..OPAQUE
        };
        draw_marker(&mut canvas, (10.0, 10.0), Color(0, 0, 0), &style);
        assert_eq!(canvas.get_pixel(10, 10), &Rgb([128, 128, 128]));
        assert_eq!(canvas.get_pixel(0, 0), &Rgb([255, 255, 255]));
    }

    #[test]
    fn test_marker_outside_canvas_is_clipped() {
        let mut canvas = white(10, 10);
        draw_marker(&mut canvas, (-50.0, 500.0), Color::BLACK, &OPAQUE);
        draw_marker(&mut canvas, (f32::NAN, 1.0), Color::BLACK, &OPAQUE);
        assert!(canvas.pixels().all(|p| *p == Rgb([255, 255, 255])));

        // Partially visible at the corner.
        draw_marker(&mut canvas, (0.0, 0.0), Color::BLACK, &OPAQUE);
        assert_eq!(canvas.get_pixel(0, 0), &Rgb([0, 0, 0]));
    }

    #[test]
    fn test_empty_canvas() {
        let mut canvas = RgbImage::new(0, 0);
        draw_marker(&mut canvas, (0.0, 0.0), Color::BLACK, &OPAQUE);
        draw_limb(&mut canvas, (0.0, 0.0), (5.0, 5.0), Color::BLACK, &OPAQUE);
    }

    #[test]
    fn test_limb_with_far_endpoint_is_clipped() {
        let mut canvas = white(100, 100);
        let style = RenderStyle::for_canvas(100, 100);
        draw_limb(&mut canvas, (50.0, 50.0), (3.0e9, 50.0), Color::RED, &style);
        assert_ne!(canvas.get_pixel(75, 50), &Rgb([255, 255, 255]));
        assert_ne!(canvas.get_pixel(99, 50), &Rgb([255, 255, 255]));
        assert_eq!(canvas.get_pixel(25, 50), &Rgb([255, 255, 255]));

        // Both endpoints far away on opposite sides still cross the canvas.
        let mut canvas = white(100, 100);
        draw_limb(&mut canvas, (-1.0e12, -1.0e12), (1.0e12, 1.0e12), Color::RED, &OPAQUE);
        assert_eq!(canvas.get_pixel(50, 50), &Rgb([255, 0, 0]));

        // Entirely off canvas.
        let mut canvas = white(100, 100);
        draw_limb(&mut canvas, (-5.0e9, -10.0), (5.0e9, -10.0), Color::RED, &OPAQUE);
        assert!(canvas.pixels().all(|p| *p == Rgb([255, 255, 255])));
    }

    #[test]
    fn test_overlay_with_far_keypoint() {
        let mut kpts = PoseKeypoints::new();
        kpts.insert(
            KeypointArea::Pose,
            AreaKeypoints::from_keypoints(&[
                Keypoint::new(50.0, 50.0, 0.9),
                Keypoint::new(-1.0e12, 1.0e12, 0.9),
            ]),
        );
        let img = DynamicImage::ImageRgb8(white(100, 100));
        let figure = plot_openpose_overlay_img(&img, &kpts, &RenderConfig::new()).unwrap();
        assert_eq!(figure.dimensions(), (100, 100));
        assert_ne!(figure.get_pixel(50, 50), &Rgb([255, 255, 255]));
    }

    #[test]
    fn test_invalid_style_draws_nothing() {
        let bad = RenderStyle {
            marker_radius: -5.0,
            line_width: f32::NAN,
            alpha: 1.0,
        };
        let mut canvas = white(20, 20);
        draw_marker(&mut canvas, (10.0, 10.0), Color::BLACK, &bad);
        draw_limb(&mut canvas, (0.0, 10.0), (19.0, 10.0), Color::BLACK, &bad);
        assert!(canvas.pixels().all(|p| *p == Rgb([255, 255, 255])));
    }

    #[test]
    fn test_limb_covers_segment() {
        let mut canvas = white(30, 30);
        draw_limb(&mut canvas, (5.0, 15.0), (25.0, 15.0), Color::RED, &OPAQUE);
        assert_eq!(canvas.get_pixel(15, 15), &Rgb([255, 0, 0]));
        assert_eq!(canvas.get_pixel(15, 5), &Rgb([255, 255, 255]));
    }

    #[test]
    fn test_markers_respect_threshold() {
        let mut canvas = white(50, 50);
        let area = AreaKeypoints::from_keypoints(&[
            Keypoint::new(10.0, 10.0, 0.9),
            Keypoint::new(40.0, 40.0, 0.05),
            Keypoint::new(25.0, 25.0, 0.1),
        ]);
        let mut colors = ColorCycle::new();
        let drawn = plot_kpt_markers(&mut canvas, &area, 0.1, &mut colors, &OPAQUE);
        assert_eq!(drawn, 2);
        assert_eq!(canvas.get_pixel(10, 10), &Rgb([255, 0, 0]));
        assert_eq!(canvas.get_pixel(25, 25), &Rgb([255, 85, 0]));
        assert_eq!(canvas.get_pixel(40, 40), &Rgb([255, 255, 255]));
    }

    #[test]
    fn test_limbs_need_both_endpoints() {
        let mut canvas = white(50, 50);
        let area = AreaKeypoints::from_keypoints(&[
            Keypoint::new(5.0, 5.0, 0.9),
            Keypoint::new(45.0, 5.0, 0.9),
            Keypoint::new(45.0, 45.0, 0.0),
        ]);
        let mut colors = ColorCycle::new();
        let drawn = plot_limbs(
            &mut canvas,
            &area,
            &[[0, 1], [1, 2], [0, 7]],
            0.1,
            &mut colors,
            &OPAQUE,
        );
        assert_eq!(drawn, 1);
        assert_eq!(canvas.get_pixel(25, 5), &Rgb([255, 0, 0]));
    }

    #[test]
    fn test_skeleton_shares_color_cycle() {
        let mut kpts = PoseKeypoints::new();
        kpts.insert(
            KeypointArea::Pose,
            AreaKeypoints::from_keypoints(&[
                Keypoint::new(10.0, 10.0, 0.9),
                Keypoint::new(10.0, 40.0, 0.9),
            ]),
        );
        kpts.insert(
            KeypointArea::Face,
            AreaKeypoints::from_keypoints(&[Keypoint::new(40.0, 10.0, 0.9)]),
        );
        let style = RenderStyle {
            marker_radius: 1.0,
            line_width: 2.0,
            alpha: 1.0,
        };
        let mut canvas = white(60, 60);
        plot_skeleton(&mut canvas, &kpts, 0.1, &style);

        // Two pose markers, then the nose-neck limb, then the face marker.
        assert_eq!(canvas.get_pixel(10, 25), &Rgb([255, 170, 0]));
        assert_eq!(canvas.get_pixel(40, 10), &Rgb([255, 255, 0]));
    }

    #[test]
    fn test_overlay_and_blank_canvas() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(40, 30, Rgb([0, 0, 0])));
        let kpts = PoseKeypoints::new();

        let overlay = plot_openpose_overlay_img(&img, &kpts, &RenderConfig::new()).unwrap();
        assert_eq!(overlay.dimensions(), (40, 30));
        assert_eq!(overlay.get_pixel(0, 0), &Rgb([0, 0, 0]));

        let blank =
            plot_openpose_overlay_img(&img, &kpts, &RenderConfig::new().with_overlay(false))
                .unwrap();
        assert_eq!(blank.dimensions(), (40, 30));
        assert_eq!(blank.get_pixel(0, 0), &Rgb([255, 255, 255]));
    }

    #[test]
    fn test_overlay_rejects_invalid_style() {
        let img = DynamicImage::ImageRgb8(white(10, 10));
        let style = RenderStyle {
            marker_radius: -5.0,
            line_width: f32::NAN,
            alpha: 2.0,
        };
        let config = RenderConfig::new().with_style(style);
        assert!(matches!(
            plot_openpose_overlay_img(&img, &PoseKeypoints::new(), &config),
            Err(crate::error::OverlayError::ConfigError(_))
        ));
    }
}
