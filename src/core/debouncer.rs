//! Alert debouncer: at most one beep per cooldown window
//!
//! Invariant: after a beep at t1, no beep is let through at any t in
//! (t1, t1 + cooldown). A beep exactly at t1 + cooldown is allowed.

use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct AlertDebouncer {
    cooldown: Duration,
    /// When the last beep was let through
    last_beep: Option<Instant>,
}

impl AlertDebouncer {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            last_beep: None,
        }
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    pub fn last_beep(&self) -> Option<Instant> {
        self.last_beep
    }

    /// Decide whether to beep now. Records `now` as the last beep when it does.
    pub fn poll(&mut self, is_bad: bool, now: Instant) -> bool {
        if !is_bad {
            return false;
        }

        let ready = match self.last_beep {
            None => true,
            Some(last) => now.saturating_duration_since(last) >= self.cooldown,
        };

        if ready {
            self.last_beep = Some(now);
        }
        ready
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const COOLDOWN: Duration = Duration::from_secs(2);

    #[test]
    fn test_first_bad_frame_beeps() {
        let mut d = AlertDebouncer::new(COOLDOWN);
        assert!(d.poll(true, Instant::now()));
    }

    #[test]
    fn test_good_posture_never_beeps() {
        let mut d = AlertDebouncer::new(COOLDOWN);
        let t0 = Instant::now();
        for i in 0..100 {
            assert!(!d.poll(false, t0 + Duration::from_millis(i * 100)));
        }
        assert!(d.last_beep().is_none());
    }

    #[test]
    fn test_suppressed_inside_cooldown() {
        let mut d = AlertDebouncer::new(COOLDOWN);
        let t0 = Instant::now();
        assert!(d.poll(true, t0));
        assert!(!d.poll(true, t0 + Duration::from_millis(1)));
        assert!(!d.poll(true, t0 + Duration::from_millis(1999)));
        assert!(d.poll(true, t0 + COOLDOWN));
    }

    #[test]
    fn test_continuous_bad_posture_beeps_on_schedule() {
        // 30 fps for 10 seconds
        let mut d = AlertDebouncer::new(COOLDOWN);
        let t0 = Instant::now();
        let frame = Duration::from_micros(33_333);

        let beeps: Vec<Duration> = (0..300u32)
            .map(|i| frame * i)
            .filter(|&offset| d.poll(true, t0 + offset))
            .collect();

        assert_eq!(beeps.len(), 5);
        assert_eq!(beeps[0], Duration::ZERO);
        for pair in beeps.windows(2) {
            let gap = pair[1] - pair[0];
            assert!(gap >= COOLDOWN, "beeps {:?} apart", gap);
            assert!(gap < COOLDOWN + frame, "beeps {:?} apart", gap);
        }
    }

    #[test]
    fn test_good_frames_do_not_reset_cooldown() {
        let mut d = AlertDebouncer::new(COOLDOWN);
        let t0 = Instant::now();
        assert!(d.poll(true, t0));
        assert!(!d.poll(false, t0 + Duration::from_millis(500)));
        assert!(!d.poll(true, t0 + Duration::from_millis(1000)));
        assert!(d.poll(true, t0 + Duration::from_millis(2500)));
    }
}
