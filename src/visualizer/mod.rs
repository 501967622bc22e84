// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Visualization tools for rendered figures.

/// Color definitions and the OpenPose color cycle.
pub mod color;

#[cfg(feature = "visualize")]
pub mod viewer;

pub use color::{Color, ColorCycle};

#[cfg(feature = "visualize")]
pub use viewer::Viewer;
