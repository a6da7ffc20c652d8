//! Pose landmarks as produced by the landmark provider

use serde::{Deserialize, Serialize};

use crate::{Error, Result, LANDMARK_COUNT, LEFT_EAR, LEFT_SHOULDER, RIGHT_SHOULDER};

/// A single body joint, x/y normalized to [0,1] of the frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub z: f64,
    #[serde(default = "full_visibility")]
    pub visibility: f64,
}

fn full_visibility() -> f64 {
    1.0
}

impl Landmark {
    /// Landmark at (x, y) with z = 0 and full visibility
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            z: 0.0,
            visibility: 1.0,
        }
    }

    /// Project onto a frame of the given size
    pub fn to_pixel(&self, width: u32, height: u32) -> Point {
        Point::new(self.x * width as f64, self.y * height as f64)
    }
}

/// A full landmark set for one frame. Always exactly [`LANDMARK_COUNT`] long.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Landmark>", into = "Vec<Landmark>")]
pub struct LandmarkSet {
    landmarks: Vec<Landmark>,
}

impl LandmarkSet {
    pub fn new(landmarks: Vec<Landmark>) -> Result<Self> {
        if landmarks.len() != LANDMARK_COUNT {
            return Err(Error::LandmarkCount {
                expected: LANDMARK_COUNT,
                got: landmarks.len(),
            });
        }
        Ok(Self { landmarks })
    }

    pub fn get(&self, index: usize) -> Option<&Landmark> {
        self.landmarks.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Landmark> {
        self.landmarks.iter()
    }

    /// Pull the three joints the classifier needs, in pixel space
    pub fn keypoints(&self, width: u32, height: u32) -> Result<PostureKeypoints> {
        let pixel = |index: usize| -> Result<Point> {
            let point = self.landmarks[index].to_pixel(width, height);
            if point.x.is_finite() && point.y.is_finite() {
                Ok(point)
            } else {
                Err(Error::InvalidLandmark { index })
            }
        };

        Ok(PostureKeypoints {
            left_ear: pixel(LEFT_EAR)?,
            left_shoulder: pixel(LEFT_SHOULDER)?,
            right_shoulder: pixel(RIGHT_SHOULDER)?,
        })
    }
}

impl TryFrom<Vec<Landmark>> for LandmarkSet {
    type Error = Error;

    fn try_from(landmarks: Vec<Landmark>) -> Result<Self> {
        Self::new(landmarks)
    }
}

impl From<LandmarkSet> for Vec<Landmark> {
    fn from(set: LandmarkSet) -> Self {
        set.landmarks
    }
}

/// 2D point in pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// The joints posture classification is based on, in pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PostureKeypoints {
    pub left_ear: Point,
    pub left_shoulder: Point,
    pub right_shoulder: Point,
}
