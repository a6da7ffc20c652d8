//! Classifier output for a single frame

use serde::{Deserialize, Serialize};

/// Why a frame was judged as bad posture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PostureReason {
    /// Shoulder-to-ear angle below the lower bound
    LookingUp,
    /// Shoulder-to-ear angle above the upper bound
    Slouching,
    /// Shoulders tilted beyond the lean bound
    Leaning,
}

impl PostureReason {
    pub fn label(&self) -> &'static str {
        match self {
            PostureReason::LookingUp => "LOOKING UP",
            PostureReason::Slouching => "SLOUCHING",
            PostureReason::Leaning => "LEANING",
        }
    }
}

impl std::fmt::Display for PostureReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// How a verdict is turned into a status line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerdictStyle {
    /// SLOUCH DETECTED! / GOOD POSTURE
    Binary,
    /// WARNING: <reasons> / PERFECT FORM
    Detailed,
}

/// Metrics and verdict derived from one set of keypoints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assessment {
    /// Shoulder-to-ear angle in degrees, [0, 180]
    pub angle: f64,
    /// Horizontal shoulder distance in pixels
    pub shoulder_width: f64,
    /// Vertical shoulder offset in pixels
    pub shoulder_tilt: f64,
    /// Every rule that fired, in evaluation order
    pub reasons: Vec<PostureReason>,
    pub is_bad: bool,
}

impl Assessment {
    pub fn status_text(&self, style: VerdictStyle) -> String {
        match (style, self.is_bad) {
            (VerdictStyle::Binary, true) => "SLOUCH DETECTED!".to_string(),
            (VerdictStyle::Binary, false) => "GOOD POSTURE".to_string(),
            (VerdictStyle::Detailed, true) => {
                let labels: Vec<&str> = self.reasons.iter().map(|r| r.label()).collect();
                format!("WARNING: {}", labels.join(", "))
            }
            (VerdictStyle::Detailed, false) => "PERFECT FORM".to_string(),
        }
    }

    /// Secondary overlay line, e.g. `Angle: 97 | Lean: 4`
    pub fn metrics_text(&self, style: VerdictStyle) -> String {
        match style {
            VerdictStyle::Binary => format!("Angle: {}", self.angle as i64),
            VerdictStyle::Detailed => format!(
                "Angle: {} | Lean: {}",
                self.angle as i64, self.shoulder_tilt as i64
            ),
        }
    }
}
