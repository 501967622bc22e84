// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

use std::path::Path;
use std::time::Instant;

use crate::annotate::plot_openpose_overlay_img;
use crate::body25::joint_angles;
use crate::cli::args::RenderArgs;
use crate::cli::logging::set_verbose;
use crate::error::Result;
use crate::io::{load_img, save_figure};
use crate::keypoints::read_openpose_json;
use crate::{RenderConfig, VERSION, field, info, section, success, verbose, warn};

/// Default format when `--out` has no extension.
const DEFAULT_FIGURE_FORMAT: &str = "png";

/// Render keypoints for one image.
///
/// # Errors
///
/// Returns an error if an input cannot be read, the person is missing,
/// or the figure cannot be saved or shown.
pub fn run_render(args: &RenderArgs) -> Result<()> {
    set_verbose(args.verbose);
    let start = Instant::now();
    section!("OpenPose overlay {VERSION}");

    let config = RenderConfig::new()
        .with_confidence(args.conf)
        .with_overlay(args.overlay);
    config.validate()?;

    let img = load_img(&args.image)?;
    verbose!("Image: {} ({}x{})", args.image, img.width(), img.height());

    let keypoints = read_openpose_json(&args.openpose, args.person)?;
    verbose!(
        "Keypoints: {} ({} in total)",
        args.openpose,
        keypoints.total_keypoints()
    );

    let figure = plot_openpose_overlay_img(&img, &keypoints, &config)?;

    if let Some(out) = &args.out {
        let format = Path::new(out)
            .extension()
            .and_then(|e| e.to_str())
            .map_or_else(|| DEFAULT_FIGURE_FORMAT.to_string(), str::to_lowercase);
        let saved = save_figure(&figure, out, &format)?;
        success!("{}", saved.display());
    }

    if args.angles {
        match keypoints.pose() {
            Some(pose) => {
                info!("Joint angles:");
                for angle in joint_angles(pose, args.conf) {
                    if let Some(deg) = angle.degrees {
                        field!(angle.joint, "{deg:6.1}°");
                    } else {
                        field!(angle.joint, "     -");
                    }
                }
            }
            None => warn!("No pose keypoints in {}, cannot compute joint angles", args.openpose),
        }
    }

    if args.show {
        show(&figure)?;
    }

    verbose!("Rendered in {:.1}ms", start.elapsed().as_secs_f64() * 1000.0);
    info!("Done");
    Ok(())
}

#[cfg(feature = "visualize")]
fn show(figure: &image::RgbImage) -> Result<()> {
    let mut viewer = crate::visualizer::Viewer::new("OpenPose overlay", figure)?;
    viewer.show()
}

#[cfg(not(feature = "visualize"))]
#[allow(clippy::unnecessary_wraps)]
fn show(_figure: &image::RgbImage) -> Result<()> {
    warn!("Built without the `visualize` feature; --show is ignored");
    Ok(())
}
