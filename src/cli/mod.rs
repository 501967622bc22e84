// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! CLI module for rendering keypoint figures.
//!
//! This module contains the command-line interface logic, including argument parsing,
//! console logging, and the `render` and `inspect` commands.

// Modules
/// CLI arguments.
pub mod args;

/// Keypoint file summary.
pub mod inspect;

/// Console logging macros and verbosity.
pub mod logging;

/// Rendering logic.
pub mod render;
