//! Spine health score: saturating walk in [0, 100]

use crate::{SCORE_MAX, SCORE_PENALTY, SCORE_RECOVERY};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HealthScore {
    value: u8,
}

impl Default for HealthScore {
    fn default() -> Self {
        Self::new()
    }
}

impl HealthScore {
    /// Starts full
    pub fn new() -> Self {
        Self { value: SCORE_MAX }
    }

    pub fn value(&self) -> u8 {
        self.value
    }

    /// Bad frame: -2 floored at 0. Good frame: +1 capped at 100.
    pub fn record(&mut self, is_bad: bool) -> u8 {
        self.value = if is_bad {
            self.value.saturating_sub(SCORE_PENALTY)
        } else {
            self.value.saturating_add(SCORE_RECOVERY).min(SCORE_MAX)
        };
        self.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_at_hundred() {
        assert_eq!(HealthScore::new().value(), 100);
    }

    #[test]
    fn test_good_frame_is_capped() {
        let mut s = HealthScore::new();
        assert_eq!(s.record(false), 100);
    }

    #[test]
    fn test_bad_then_recover() {
        let mut s = HealthScore::new();
        assert_eq!(s.record(true), 98);
        assert_eq!(s.record(true), 96);
        assert_eq!(s.record(false), 97);
    }

    #[test]
    fn test_never_leaves_range() {
        let mut s = HealthScore::new();
        for _ in 0..10_000 {
            s.record(true);
        }
        assert_eq!(s.value(), 0);
        s.record(true);
        assert_eq!(s.value(), 0);

        for _ in 0..10_000 {
            s.record(false);
        }
        assert_eq!(s.value(), 100);
    }

    #[test]
    fn test_odd_floor() {
        let mut s = HealthScore::new();
        for _ in 0..49 {
            s.record(true);
        }
        assert_eq!(s.value(), 2);
        s.record(false);
        assert_eq!(s.record(true), 1);
        assert_eq!(s.record(true), 0);
    }
}
