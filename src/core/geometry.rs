//! Angle and distance helpers over pixel-space keypoints

use crate::types::Point;

/// Angle of the vector `a → b` against the horizontal axis, in degrees.
///
/// Always in [0, 180]. Coincident points give 0 (`atan2(0, 0)`).
pub fn vertical_angle(a: Point, b: Point) -> f64 {
    let radians = (b.y - a.y).atan2(b.x - a.x);
    let angle = (radians.to_degrees()).abs();
    if angle > 180.0 {
        360.0 - angle
    } else {
        angle
    }
}

/// Horizontal distance between the shoulders
pub fn shoulder_width(left: Point, right: Point) -> f64 {
    (left.x - right.x).abs()
}

/// Vertical offset between the shoulders
pub fn shoulder_tilt(left: Point, right: Point) -> f64 {
    (left.y - right.y).abs()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_coincident_points_give_zero() {
        let p = Point::new(12.5, 40.0);
        assert_eq!(vertical_angle(p, p), 0.0);
    }

    #[test]
    fn test_ear_straight_above_shoulder_is_ninety() {
        // image y grows downward: ear above shoulder has smaller y
        let shoulder = Point::new(100.0, 200.0);
        let ear = Point::new(100.0, 100.0);
        assert!(approx(vertical_angle(shoulder, ear), 90.0));
    }

    #[test]
    fn test_forward_head_is_above_ninety() {
        let shoulder = Point::new(100.0, 200.0);
        let ear = Point::new(0.0, 100.0);
        assert!(approx(vertical_angle(shoulder, ear), 135.0));
    }

    #[test]
    fn test_horizontal_vectors() {
        let origin = Point::new(0.0, 0.0);
        assert!(approx(vertical_angle(origin, Point::new(10.0, 0.0)), 0.0));
        assert!(approx(vertical_angle(origin, Point::new(-10.0, 0.0)), 180.0));
    }

    #[test]
    fn test_angle_always_in_range() {
        let origin = Point::new(320.0, 240.0);
        for i in 0..360 {
            let theta = (i as f64).to_radians();
            let target = Point::new(320.0 + 50.0 * theta.cos(), 240.0 + 50.0 * theta.sin());
            let angle = vertical_angle(origin, target);
            assert!((0.0..=180.0).contains(&angle), "angle {} out of range", angle);
        }
    }

    #[test]
    fn test_shoulder_metrics() {
        let left = Point::new(300.0, 210.0);
        let right = Point::new(200.0, 230.0);
        assert_eq!(shoulder_width(left, right), 100.0);
        assert_eq!(shoulder_tilt(left, right), 20.0);
    }
}
