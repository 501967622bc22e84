// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

use clap::{Args, Parser, Subcommand};

use crate::config::DEFAULT_CONF_THRESHOLD;

/// CLI arguments parser.
#[derive(Parser, Debug)]
#[command(author, version, about = "Visualizing OpenPose predictions", long_about = None)]
#[command(propagate_version = true)]
#[command(after_help = r#"Examples:
    openpose-overlay render --image frame.jpg --openpose frame_keypoints.json --overlay
    openpose-overlay render --image frame.jpg --openpose frame_keypoints.json --out skeleton.png
    openpose-overlay render -i frame.jpg -k frame_keypoints.json --person 1 --conf 0.3 --angles
    openpose-overlay inspect --openpose frame_keypoints.json"#)]
pub struct Cli {
    #[command(subcommand)]
    /// Subcommand to execute.
    pub command: Commands,
}

/// Commands for the CLI.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Draw OpenPose keypoints and skeleton for an image
    Render(RenderArgs),
    /// Summarize the contents of an OpenPose keypoint file
    Inspect(InspectArgs),
}

/// Arguments for the render command.
#[derive(Args, Debug)]
#[allow(clippy::struct_excessive_bools)]
pub struct RenderArgs {
    /// Path to the image
    #[arg(short, long)]
    pub image: String,

    /// Path to the OpenPose keypoint JSON file
    #[arg(short = 'k', long)]
    pub openpose: String,

    /// Path to save the output
    #[arg(short, long)]
    pub out: Option<String>,

    /// Show keypoints as overlay with the source image
    #[arg(long, default_value_t = false)]
    pub overlay: bool,

    /// Minimum keypoint confidence
    #[arg(long, default_value_t = DEFAULT_CONF_THRESHOLD)]
    pub conf: f32,

    /// Index of the person to draw
    #[arg(long, default_value_t = 0)]
    pub person: usize,

    /// Print BODY_25 joint angles
    #[arg(long, default_value_t = false)]
    pub angles: bool,

    /// Display the figure in a window
    #[arg(long, default_value_t = false)]
    pub show: bool,

    /// Show verbose output
    #[arg(long, default_value_t = false)]
    pub verbose: bool,
}

/// Arguments for the inspect command.
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Path to the OpenPose keypoint JSON file
    #[arg(short = 'k', long)]
    pub openpose: String,

    /// Minimum keypoint confidence counted as visible
    #[arg(long, default_value_t = DEFAULT_CONF_THRESHOLD)]
    pub conf: f32,
}
