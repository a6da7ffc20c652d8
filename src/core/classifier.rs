//! Posture classifier: keypoints + policy → verdict with reasons
//!
//! Rules (each one adds a reason, all are reported):
//! - angle < angle_low          → LOOKING UP
//! - angle > angle_high         → SLOUCHING
//! - tilt > lean_ratio × width  → LEANING (only if the policy has a lean ratio)

use crate::core::geometry::{shoulder_tilt, shoulder_width, vertical_angle};
use crate::types::{Assessment, PostureKeypoints, PosturePolicy, PostureReason};

/// Stateless classifier bound to one policy
#[derive(Debug, Clone, Copy)]
pub struct PostureClassifier {
    policy: PosturePolicy,
}

impl PostureClassifier {
    pub fn new(policy: PosturePolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &PosturePolicy {
        &self.policy
    }

    /// Classify from raw keypoints
    pub fn classify(&self, keypoints: &PostureKeypoints) -> Assessment {
        let angle = vertical_angle(keypoints.left_shoulder, keypoints.left_ear);
        let width = shoulder_width(keypoints.left_shoulder, keypoints.right_shoulder);
        let tilt = shoulder_tilt(keypoints.left_shoulder, keypoints.right_shoulder);
        self.classify_metrics(angle, width, tilt)
    }

    /// Classify from already computed metrics
    pub fn classify_metrics(&self, angle: f64, shoulder_width: f64, shoulder_tilt: f64) -> Assessment {
        let mut reasons = Vec::new();

        if angle < self.policy.angle_low {
            reasons.push(PostureReason::LookingUp);
        }
        if angle > self.policy.angle_high {
            reasons.push(PostureReason::Slouching);
        }
        if let Some(ratio) = self.policy.lean_ratio {
            if shoulder_tilt > ratio * shoulder_width {
                reasons.push(PostureReason::Leaning);
            }
        }

        Assessment {
            angle,
            shoulder_width,
            shoulder_tilt,
            is_bad: !reasons.is_empty(),
            reasons,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Point, VerdictStyle};
    use pretty_assertions::assert_eq;

    fn web() -> PostureClassifier {
        PostureClassifier::new(PosturePolicy::web())
    }

    fn desktop() -> PostureClassifier {
        PostureClassifier::new(PosturePolicy::desktop())
    }

    #[test]
    fn test_slouching_and_leaning_together() {
        let a = web().classify_metrics(150.0, 100.0, 20.0);
        assert_eq!(a.reasons, vec![PostureReason::Slouching, PostureReason::Leaning]);
        assert!(a.is_bad);
    }

    #[test]
    fn test_good_posture() {
        let a = web().classify_metrics(100.0, 100.0, 5.0);
        assert!(a.reasons.is_empty());
        assert!(!a.is_bad);
        assert_eq!(a.status_text(VerdictStyle::Detailed), "PERFECT FORM");
    }

    #[test]
    fn test_looking_up() {
        let a = web().classify_metrics(60.0, 100.0, 0.0);
        assert_eq!(a.reasons, vec![PostureReason::LookingUp]);
    }

    #[test]
    fn test_bounds_are_exclusive() {
        assert!(!web().classify_metrics(75.0, 100.0, 8.0).is_bad);
        assert!(!web().classify_metrics(135.0, 100.0, 8.0).is_bad);
        assert!(web().classify_metrics(135.01, 100.0, 0.0).is_bad);
    }

    #[test]
    fn test_desktop_ignores_lean() {
        let a = desktop().classify_metrics(100.0, 100.0, 60.0);
        assert!(!a.is_bad);

        // 72° is fine on desktop but looking up on web
        assert!(!desktop().classify_metrics(72.0, 100.0, 0.0).is_bad);
        assert!(web().classify_metrics(72.0, 100.0, 0.0).is_bad);
    }

    #[test]
    fn test_zero_width_shoulders_flag_any_tilt() {
        let a = web().classify_metrics(100.0, 0.0, 1.0);
        assert_eq!(a.reasons, vec![PostureReason::Leaning]);
    }

    #[test]
    fn test_classify_from_keypoints() {
        // ear straight above the shoulder, level shoulders
        let kp = PostureKeypoints {
            left_ear: Point::new(300.0, 100.0),
            left_shoulder: Point::new(300.0, 250.0),
            right_shoulder: Point::new(180.0, 252.0),
        };
        let a = web().classify(&kp);
        assert!((a.angle - 90.0).abs() < 1e-9);
        assert_eq!(a.shoulder_width, 120.0);
        assert_eq!(a.shoulder_tilt, 2.0);
        assert!(!a.is_bad);
    }
}
