// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

use crate::cli::args::InspectArgs;
use crate::error::Result;
use crate::{field, info};
use crate::keypoints::{KeypointArea, OpenPoseDocument};
use crate::utils::pluralize;

/// Print people and per-area keypoint counts of an OpenPose file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or a person record is malformed.
pub fn run_inspect(args: &InspectArgs) -> Result<()> {
    let doc = OpenPoseDocument::from_path(&args.openpose)?;
    let count = doc.people.len();
    let noun = if count == 1 {
        "person".to_string()
    } else {
        pluralize("person")
    };
    info!("{}: {count} {noun}", args.openpose);

    for index in 0..count {
        let keypoints = doc.person(index)?;
        info!("person {index}:");
        for area in KeypointArea::ALL {
            match keypoints.get(area) {
                Some(kpts) => field!(
                    area.json_key(),
                    "{:>3} keypoints, {:>3} visible",
                    kpts.len(),
                    kpts.visible_count(args.conf)
                ),
                None => field!(area.json_key(), "missing"),
            }
        }
    }
    Ok(())
}
