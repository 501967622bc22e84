// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

use std::process;

use clap::Parser;

use openpose_overlay::cli::args::{Cli, Commands};
use openpose_overlay::cli::inspect::run_inspect;
use openpose_overlay::cli::render::run_render;
use openpose_overlay::error;

fn main() {
    let cli = Cli::parse();

    let outcome = match &cli.command {
        Commands::Render(args) => run_render(args),
        Commands::Inspect(args) => run_inspect(args),
    };

    if let Err(e) = outcome {
        error!("{e}");
        process::exit(1);
    }
}
