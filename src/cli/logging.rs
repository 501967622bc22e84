// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Console output for the `openpose-overlay` binary.
//!
//! Results go to stdout, problems to stderr. Progress detail such as input
//! sizes and timings is only printed with `--verbose`.

use std::sync::atomic::{AtomicBool, Ordering};

/// Whether `verbose!` and `section!` print. Off until `--verbose` is passed.
static VERBOSE: AtomicBool = AtomicBool::new(false);

/// Column width of the labels printed by `field!`.
pub const FIELD_WIDTH: usize = 24;

/// Turn rendering detail on or off.
pub fn set_verbose(verbose: bool) {
    VERBOSE.store(verbose, Ordering::Relaxed);
}

/// Whether rendering detail is printed.
pub fn is_verbose() -> bool {
    VERBOSE.load(Ordering::Relaxed)
}

/// Plain result line on stdout.
#[macro_export]
macro_rules! info {
    ($($arg:tt)*) => {
        println!("{}", format!($($arg)*));
    }
}

/// Indented `label value` line, labels padded to
/// [`FIELD_WIDTH`](crate::cli::logging::FIELD_WIDTH) so areas
/// and joints line up in `inspect` and `--angles` output.
#[macro_export]
macro_rules! field {
    ($label:expr, $($arg:tt)*) => {{
        use colored::Colorize;
        let label = format!("{:<width$}", $label, width = $crate::cli::logging::FIELD_WIDTH);
        println!("  {} {}", label.dimmed(), format!($($arg)*));
    }}
}

/// Recoverable problem, e.g. a keypoint area missing from the document.
#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => {{
        use colored::Colorize;
        eprintln!("{} {}", "WARNING ⚠️".yellow().bold(), format!($($arg)*));
    }}
}

/// Failure that ends the command.
#[macro_export]
macro_rules! error {
    ($($arg:tt)*) => {{
        use colored::Colorize;
        eprintln!("{} {}", "Error:".red().bold(), format!($($arg)*));
    }}
}

/// A figure or file was written.
#[macro_export]
macro_rules! success {
    ($($arg:tt)*) => {{
        use colored::Colorize;
        println!("{} {}", "saved".green().bold(), format!($($arg)*));
    }}
}

/// Rendering detail, printed with `--verbose` only.
#[macro_export]
macro_rules! verbose {
    ($($arg:tt)*) => {
        if $crate::cli::logging::is_verbose() {
            println!("{}", format!($($arg)*));
        }
    }
}

/// Header before a block of verbose output.
#[macro_export]
macro_rules! section {
    ($($arg:tt)*) => {{
        use colored::Colorize;
        if $crate::cli::logging::is_verbose() {
            println!();
            println!("{}", format!($($arg)*).cyan().bold());
        }
    }}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quiet_until_requested() {
        set_verbose(true);
        assert!(is_verbose());
        set_verbose(false);
        assert!(!is_verbose());
    }

    #[test]
    fn test_field_label_fits_area_keys() {
        let longest = crate::keypoints::KeypointArea::ALL
            .iter()
            .map(|area| area.json_key().len())
            .max()
            .unwrap_or(0);
        assert!(longest <= FIELD_WIDTH);
        field!("pose_keypoints_2d", "{} keypoints", 25);
    }
}
