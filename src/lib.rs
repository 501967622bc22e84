// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

#![allow(clippy::multiple_crate_versions)]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! # OpenPose Overlay
//!
//! Draw [OpenPose](https://github.com/CMU-Perceptual-Computing-Lab/openpose)
//! BODY_25 keypoints and skeletons over the images they were detected in.
//!
//! OpenPose writes one JSON file per image with flat `(x, y, confidence)`
//! lists for the body, face and both hands of every detected person. This
//! crate parses those files, draws a translucent marker for every keypoint
//! above a confidence threshold and connects the body keypoints with the
//! BODY_25 limbs.
//!
//! ## Quick Start (Library)
//!
//! ```no_run
//! use openpose_overlay::{RenderConfig, io, keypoints, plot_openpose_overlay_img};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let img = io::load_img("frame.jpg")?;
//!     let kpts = keypoints::read_openpose_json("frame_keypoints.json", 0)?;
//!
//!     let figure = plot_openpose_overlay_img(&img, &kpts, &RenderConfig::new())?;
//!     io::save_figure(&figure, "frame_overlay", "png")?;
//!     Ok(())
//! }
//! ```
//!
//! ## CLI Usage
//!
//! ```bash
//! # Overlay the skeleton on the source image and save it
//! openpose-overlay render --image frame.jpg --openpose frame_keypoints.json --overlay --out overlay.png
//!
//! # Skeleton only, second person, with joint angles
//! openpose-overlay render -i frame.jpg -k frame_keypoints.json --person 1 --angles
//!
//! # How many people, and how many keypoints each
//! openpose-overlay inspect --openpose frame_keypoints.json
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`keypoints`] | OpenPose JSON parsing ([`PoseKeypoints`], [`KeypointArea`]) |
//! | [`body25`] | BODY_25 part names, limbs and joint angles |
//! | [`annotate`] | Marker and limb drawing |
//! | [`config`] | [`RenderConfig`] and [`RenderStyle`] |
//! | [`io`] | Loading and saving by file extension |
//! | [`visualizer`] | Color cycle and optional window |
//! | [`error`] | Error types ([`OverlayError`], [`Result`]) |
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `visualize` | Display the figure in a window (`--show`) |

// Modules
pub mod annotate;
pub mod body25;
pub mod cli;
pub mod config;
pub mod error;
pub mod io;
pub mod keypoints;
pub mod utils;
pub mod visualizer;

// Re-export main types for convenience
pub use annotate::{plot_kpt_markers, plot_limbs, plot_openpose_overlay_img, plot_skeleton};
pub use body25::{BODY_PARTS, JOINTS, JointAngle, LIMB_SEQ, joint_angles};
pub use config::{RenderConfig, RenderStyle};
pub use error::{OverlayError, Result};
pub use keypoints::{
    AreaKeypoints, Keypoint, KeypointArea, PoseKeypoints, chunk_triples, read_openpose_json,
};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
