// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! OpenPose BODY_25 skeleton model.

use crate::keypoints::AreaKeypoints;

/// Number of body keypoints in the BODY_25 model.
pub const NUM_BODY_PARTS: usize = 25;

/// BODY_25 part names, in keypoint index order.
pub const BODY_PARTS: [&str; NUM_BODY_PARTS] = [
    "Nose",      // 0
    "Neck",      // 1
    "RShoulder", // 2
    "RElbow",    // 3
    "RWrist",    // 4
    "LShoulder", // 5
    "LElbow",    // 6
    "LWrist",    // 7
    "MidHip",    // 8
    "RHip",      // 9
    "RKnee",     // 10
    "RAnkle",    // 11
    "LHip",      // 12
    "LKnee",     // 13
    "LAnkle",    // 14
    "REye",      // 15
    "LEye",      // 16
    "REar",      // 17
    "LEar",      // 18
    "LBigToe",   // 19
    "LSmallToe", // 20
    "LHeel",     // 21
    "RBigToe",   // 22
    "RSmallToe", // 23
    "RHeel",     // 24
];

/// BODY_25 skeleton structure (pairs of keypoint indices).
/// Drawing order matters: each limb consumes one color from the cycle.
pub const LIMB_SEQ: [[usize; 2]; 24] = [
    [0, 15],  // nose to right eye
    [15, 17], // right eye to right ear
    [0, 16],  // nose to left eye
    [16, 18], // left eye to left ear
    [0, 1],   // nose to neck
    [1, 2],   // neck to right shoulder
    [2, 3],   // right shoulder to right elbow
    [3, 4],   // right elbow to right wrist
    [1, 5],   // neck to left shoulder
    [5, 6],   // left shoulder to left elbow
    [6, 7],   // left elbow to left wrist
    [1, 8],   // neck to mid hip
    [8, 9],   // mid hip to right hip
    [9, 10],  // right hip to right knee
    [10, 11], // right knee to right ankle
    [11, 22], // right ankle to right big toe
    [22, 23], // right big toe to right small toe
    [11, 24], // right ankle to right heel
    [8, 12],  // mid hip to left hip
    [12, 13], // left hip to left knee
    [13, 14], // left knee to left ankle
    [14, 21], // left ankle to left heel
    [14, 19], // left ankle to left big toe
    [19, 20], // left big toe to left small toe
];

/// Joint triplets `[vertex, a, b]`; the joint angle is measured at `vertex`.
pub const JOINTS: [[&str; 3]; 8] = [
    ["RShoulder", "Neck", "RElbow"],
    ["RElbow", "RShoulder", "RWrist"],
    ["RHip", "LHip", "RKnee"],
    ["RKnee", "RHip", "RAnkle"],
    ["LShoulder", "Neck", "LElbow"],
    ["LElbow", "LShoulder", "LWrist"],
    ["LHip", "RHip", "LKnee"],
    ["LKnee", "LHip", "LAnkle"],
];

/// Name of the body part at `index`.
#[must_use]
pub fn part_name(index: usize) -> Option<&'static str> {
    BODY_PARTS.get(index).copied()
}

/// Index of the body part called `name`.
#[must_use]
pub fn part_index(name: &str) -> Option<usize> {
    BODY_PARTS.iter().position(|&part| part == name)
}

/// Angle at one joint of a pose.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JointAngle {
    /// Name of the vertex body part.
    pub joint: &'static str,
    /// Angle in degrees, `None` if any of the three keypoints is unusable.
    pub degrees: Option<f32>,
}

/// Compute the angle at every joint in [`JOINTS`].
#[must_use]
pub fn joint_angles(pose: &AreaKeypoints, conf_thresh: f32) -> Vec<JointAngle> {
    JOINTS
        .iter()
        .map(|&[vertex, a, b]| JointAngle {
            joint: vertex,
            degrees: angle_at(pose, [vertex, a, b], conf_thresh),
        })
        .collect()
}

fn angle_at(pose: &AreaKeypoints, names: [&str; 3], conf_thresh: f32) -> Option<f32> {
    let mut points = [(0.0_f32, 0.0_f32); 3];
    for (slot, name) in points.iter_mut().zip(names) {
        let kpt = pose.get(part_index(name)?)?;
        if !kpt.is_visible(conf_thresh) {
            return None;
        }
        *slot = (kpt.x, kpt.y);
    }
    let [(vx, vy), (ax, ay), (bx, by)] = points;
    let (ux, uy) = (ax - vx, ay - vy);
    let (wx, wy) = (bx - vx, by - vy);
    let norm = ux.hypot(uy) * wx.hypot(wy);
    if norm <= f32::EPSILON {
        return None;
    }
    let cos = (ux.mul_add(wx, uy * wy) / norm).clamp(-1.0, 1.0);
    Some(cos.acos().to_degrees())
}
