// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! OpenPose keypoint files.
//!
//! OpenPose writes one JSON document per image. Every detected person carries
//! flat `[x0, y0, c0, x1, y1, c1, ...]` lists for the body, face and both
//! hands. This module splits those lists into `(x, y, confidence)` triples.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use ndarray::{Array2, ArrayView1, Axis};
use serde::Deserialize;

use crate::error::{OverlayError, Result};
use crate::verbose;

/// A single detected landmark.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Keypoint {
    /// X coordinate in image pixels.
    pub x: f32,
    /// Y coordinate in image pixels (pointing down).
    pub y: f32,
    /// Detection confidence, `0.0` for undetected parts.
    pub confidence: f32,
}

impl Keypoint {
    #[must_use]
    pub const fn new(x: f32, y: f32, confidence: f32) -> Self {
        Self { x, y, confidence }
    }

    /// Whether the keypoint passes a confidence threshold (inclusive).
    #[must_use]
    pub fn is_visible(&self, threshold: f32) -> bool {
        self.confidence >= threshold
    }
}

/// Keypoint groups written by OpenPose for each person.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum KeypointArea {
    /// BODY_25 skeleton.
    Pose,
    /// 70 facial landmarks.
    Face,
    /// 21 left hand landmarks.
    HandLeft,
    /// 21 right hand landmarks.
    HandRight,
}

impl KeypointArea {
    /// All areas, in drawing order.
    pub const ALL: [Self; 4] = [Self::Pose, Self::Face, Self::HandLeft, Self::HandRight];

    /// Key of this area in the OpenPose JSON document.
    #[must_use]
    pub const fn json_key(self) -> &'static str {
        match self {
            Self::Pose => "pose_keypoints_2d",
            Self::Face => "face_keypoints_2d",
            Self::HandLeft => "hand_left_keypoints_2d",
            Self::HandRight => "hand_right_keypoints_2d",
        }
    }
}

impl std::fmt::Display for KeypointArea {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.json_key())
    }
}

/// Keypoints of one area stored as an `N x 3` matrix of `(x, y, conf)` rows.
#[derive(Debug, Clone, PartialEq)]
pub struct AreaKeypoints {
    data: Array2<f32>,
}

impl AreaKeypoints {
    /// Split a flat OpenPose list into `(x, y, conf)` triples.
    ///
    /// # Errors
    ///
    /// Returns [`OverlayError::KeypointError`] if the length is not a multiple of three.
    pub fn from_flat(flat: &[f32]) -> Result<Self> {
        if flat.len() % 3 != 0 {
            return Err(OverlayError::KeypointError(format!(
                "expected (x, y, confidence) triples, got {} values",
                flat.len()
            )));
        }
        let data = Array2::from_shape_vec((flat.len() / 3, 3), flat.to_vec())
            .map_err(|e| OverlayError::KeypointError(e.to_string()))?;
        Ok(Self { data })
    }

    /// Build from individual keypoints.
    #[must_use]
    pub fn from_keypoints(points: &[Keypoint]) -> Self {
        let mut data = Array2::zeros((points.len(), 3));
        for (mut row, kpt) in data.axis_iter_mut(Axis(0)).zip(points) {
            row[0] = kpt.x;
            row[1] = kpt.y;
            row[2] = kpt.confidence;
        }
        Self { data }
    }

    /// Number of keypoints.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.nrows()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.nrows() == 0
    }

    /// X coordinates.
    #[must_use]
    pub fn xs(&self) -> ArrayView1<'_, f32> {
        self.data.column(0)
    }

    /// Y coordinates.
    #[must_use]
    pub fn ys(&self) -> ArrayView1<'_, f32> {
        self.data.column(1)
    }

    /// Confidence values.
    #[must_use]
    pub fn conf(&self) -> ArrayView1<'_, f32> {
        self.data.column(2)
    }

    /// Keypoint at `index`, if present.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<Keypoint> {
        (index < self.len()).then(|| {
            let row = self.data.row(index);
            Keypoint::new(row[0], row[1], row[2])
        })
    }

    /// Iterate over all keypoints in index order.
    pub fn iter(&self) -> impl Iterator<Item = Keypoint> + '_ {
        self.data
            .axis_iter(Axis(0))
            .map(|row| Keypoint::new(row[0], row[1], row[2]))
    }

    /// Number of keypoints passing `threshold`.
    #[must_use]
    pub fn visible_count(&self, threshold: f32) -> usize {
        self.conf().iter().filter(|&&c| c >= threshold).count()
    }
}

/// All keypoint areas of one person. Areas absent from the file are absent here.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PoseKeypoints {
    areas: BTreeMap<KeypointArea, AreaKeypoints>,
}

impl PoseKeypoints {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, area: KeypointArea, keypoints: AreaKeypoints) {
        self.areas.insert(area, keypoints);
    }

    #[must_use]
    pub fn get(&self, area: KeypointArea) -> Option<&AreaKeypoints> {
        self.areas.get(&area)
    }

    /// Body keypoints, if the file carried them.
    #[must_use]
    pub fn pose(&self) -> Option<&AreaKeypoints> {
        self.get(KeypointArea::Pose)
    }

    #[must_use]
    pub fn contains(&self, area: KeypointArea) -> bool {
        self.areas.contains_key(&area)
    }

    /// Iterate present areas in drawing order.
    pub fn iter(&self) -> impl Iterator<Item = (KeypointArea, &AreaKeypoints)> {
        self.areas.iter().map(|(area, kpts)| (*area, kpts))
    }

    /// Total number of keypoints over every present area.
    #[must_use]
    pub fn total_keypoints(&self) -> usize {
        self.areas.values().map(AreaKeypoints::len).sum()
    }
}

/// One person entry of an OpenPose document.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PersonRecord {
    #[serde(default)]
    pub pose_keypoints_2d: Option<Vec<f32>>,
    #[serde(default)]
    pub face_keypoints_2d: Option<Vec<f32>>,
    #[serde(default)]
    pub hand_left_keypoints_2d: Option<Vec<f32>>,
    #[serde(default)]
    pub hand_right_keypoints_2d: Option<Vec<f32>>,
}

impl PersonRecord {
    fn area(&self, area: KeypointArea) -> Option<&[f32]> {
        match area {
            KeypointArea::Pose => self.pose_keypoints_2d.as_deref(),
            KeypointArea::Face => self.face_keypoints_2d.as_deref(),
            KeypointArea::HandLeft => self.hand_left_keypoints_2d.as_deref(),
            KeypointArea::HandRight => self.hand_right_keypoints_2d.as_deref(),
        }
    }

    /// Chunk every present area into triples.
    ///
    /// # Errors
    ///
    /// Returns an error if any area has a length that is not a multiple of three.
    pub fn to_keypoints(&self) -> Result<PoseKeypoints> {
        let mut keypoints = PoseKeypoints::new();
        for area in KeypointArea::ALL {
            if let Some(flat) = self.area(area) {
                let chunked = chunk_triples(flat).map_err(|e| {
                    OverlayError::KeypointError(format!("{}: {e}", area.json_key()))
                })?;
                keypoints.insert(area, chunked);
            }
        }
        Ok(keypoints)
    }
}

/// A full OpenPose keypoint document.
#[derive(Debug, Clone, Deserialize)]
pub struct OpenPoseDocument {
    #[serde(default)]
    pub version: Option<serde_json::Value>,
    pub people: Vec<PersonRecord>,
}

impl OpenPoseDocument {
    /// Read a document from disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or is not an OpenPose document.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        verbose!("Loading JSON data from: {}", path.display());
        let file = File::open(path).map_err(|e| {
            OverlayError::IoError(format!("Failed to open {}: {e}", path.display()))
        })?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }

    /// Keypoints of the person at `index`.
    ///
    /// # Errors
    ///
    /// Returns an error if nobody was detected or `index` is out of range.
    pub fn person(&self, index: usize) -> Result<PoseKeypoints> {
        if self.people.is_empty() {
            return Err(OverlayError::KeypointError(
                "no people detected in keypoint file".to_string(),
            ));
        }
        let record = self.people.get(index).ok_or_else(|| {
            OverlayError::KeypointError(format!(
                "person {index} requested but only {} detected",
                self.people.len()
            ))
        })?;
        record.to_keypoints()
    }
}

/// Split a flat `[x0, y0, c0, x1, y1, c1, ...]` list into an `N x 3` keypoint matrix.
///
/// ```
/// let area = openpose_overlay::chunk_triples(&[10.0, 20.0, 0.9, 30.0, 40.0, 0.5]).unwrap();
/// assert_eq!(area.len(), 2);
/// ```
///
/// # Errors
///
/// Returns [`OverlayError::KeypointError`] if the length is not a multiple of three.
pub fn chunk_triples(flat: &[f32]) -> Result<AreaKeypoints> {
    AreaKeypoints::from_flat(flat)
}

/// Parse the keypoints of one person from an in-memory JSON value.
///
/// # Errors
///
/// Returns an error if the value is not an OpenPose document or the person is missing.
pub fn parse_openpose(value: serde_json::Value, person: usize) -> Result<PoseKeypoints> {
    let doc: OpenPoseDocument = serde_json::from_value(value)?;
    doc.person(person)
}

/// Read the keypoints of one person from an OpenPose JSON file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, or the person is missing.
pub fn read_openpose_json<P: AsRef<Path>>(path: P, person: usize) -> Result<PoseKeypoints> {
    OpenPoseDocument::from_path(path)?.person(person)
}

/// Number of people detected in an OpenPose JSON file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn people_count<P: AsRef<Path>>(path: P) -> Result<usize> {
    Ok(OpenPoseDocument::from_path(path)?.people.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_chunk_triples() {
        let area = AreaKeypoints::from_flat(&[1.0, 2.0, 0.9, 3.0, 4.0, 0.0]).unwrap();
        assert_eq!(area.len(), 2);
        assert_eq!(area.xs().to_vec(), vec![1.0, 3.0]);
        assert_eq!(area.ys().to_vec(), vec![2.0, 4.0]);
        assert_eq!(area.conf().to_vec(), vec![0.9, 0.0]);
        assert_eq!(area.get(1), Some(Keypoint::new(3.0, 4.0, 0.0)));
        assert_eq!(area.get(2), None);
    }

    #[test]
    fn test_chunk_rejects_partial_triple() {
        let err = AreaKeypoints::from_flat(&[1.0, 2.0, 0.9, 3.0]).unwrap_err();
        assert!(matches!(err, OverlayError::KeypointError(_)));
        assert!(chunk_triples(&[1.0, 2.0]).is_err());
    }

    #[test]
    fn test_chunk_triples_free_function() {
        let area = chunk_triples(&[10.0, 20.0, 0.9, 30.0, 40.0, 0.5]).unwrap();
        assert_eq!(area, AreaKeypoints::from_flat(&[10.0, 20.0, 0.9, 30.0, 40.0, 0.5]).unwrap());
        assert_eq!(area.get(0), Some(Keypoint::new(10.0, 20.0, 0.9)));
        assert!(chunk_triples(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_empty_area() {
        let area = AreaKeypoints::from_flat(&[]).unwrap();
        assert!(area.is_empty());
        assert_eq!(area.visible_count(0.1), 0);
    }

    #[test]
    fn test_visibility_threshold_is_inclusive() {
        let kpt = Keypoint::new(0.0, 0.0, 0.1);
        assert!(kpt.is_visible(0.1));
        assert!(!kpt.is_visible(0.11));
    }

    #[test]
    fn test_parse_first_person() {
        let doc = json!({
            "version": 1.3,
            "people": [
                {
                    "person_id": [-1],
                    "pose_keypoints_2d": [10.0, 20.0, 0.8, 30.0, 40.0, 0.05],
                    "face_keypoints_2d": [],
                    "hand_left_keypoints_2d": [1.0, 1.0, 1.0],
                    "hand_right_keypoints_2d": []
                },
                {
                    "pose_keypoints_2d": [0.0, 0.0, 0.0]
                }
            ]
        });
        let kpts = parse_openpose(doc.clone(), 0).unwrap();
        assert_eq!(kpts.pose().unwrap().len(), 2);
        assert!(kpts.get(KeypointArea::Face).unwrap().is_empty());
        assert_eq!(kpts.total_keypoints(), 3);

        let second = parse_openpose(doc, 1).unwrap();
        assert!(second.contains(KeypointArea::Pose));
        assert!(!second.contains(KeypointArea::Face));
    }

    #[test]
    fn test_parse_missing_person() {
        let doc = json!({ "people": [] });
        assert!(parse_openpose(doc, 0).is_err());

        let doc = json!({ "people": [{ "pose_keypoints_2d": [] }] });
        assert!(parse_openpose(doc, 3).is_err());
    }

    #[test]
    fn test_parse_not_openpose() {
        assert!(parse_openpose(json!({ "frames": [] }), 0).is_err());
    }

    #[test]
    fn test_area_keys() {
        let keys: Vec<_> = KeypointArea::ALL.iter().map(|a| a.json_key()).collect();
        assert_eq!(
            keys,
            vec![
                "pose_keypoints_2d",
                "face_keypoints_2d",
                "hand_left_keypoints_2d",
                "hand_right_keypoints_2d"
            ]
        );
    }

    #[test]
    fn test_from_keypoints() {
        let area = AreaKeypoints::from_keypoints(&[Keypoint::new(5.0, 6.0, 0.7)]);
        assert_eq!(area.iter().next(), Some(Keypoint::new(5.0, 6.0, 0.7)));
    }
}
