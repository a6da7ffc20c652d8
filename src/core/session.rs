//! Posture session: owns the score, debouncer and current stats
//!
//! One session per monitored stream. The pipeline passes it `FrameOutcome`s in
//! order and publishes the resulting `Stats`; nothing else mutates it.

use std::time::Instant;

use tracing::debug;

use crate::core::{AlertDebouncer, HealthScore, PostureClassifier};
use crate::types::{FrameOutcome, Profile, Quality, Stats};

/// Result of feeding one frame outcome to the session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Observation {
    pub stats: Stats,
    /// The debouncer let an alert through
    pub beep: bool,
}

#[derive(Debug)]
pub struct PostureSession {
    profile: Profile,
    classifier: PostureClassifier,
    score: HealthScore,
    debouncer: AlertDebouncer,
    stats: Stats,
    frames: u64,
}

impl PostureSession {
    pub fn new(profile: Profile) -> Self {
        Self {
            classifier: PostureClassifier::new(profile.policy),
            debouncer: AlertDebouncer::new(profile.cooldown),
            score: HealthScore::new(),
            stats: Stats::default(),
            frames: 0,
            profile,
        }
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    pub fn classifier(&self) -> &PostureClassifier {
        &self.classifier
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    /// Frames observed so far
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Fold one frame into the session.
    ///
    /// Only assessed frames move the score, quality and debouncer; "no person"
    /// and failures just update the status line.
    pub fn observe(&mut self, outcome: &FrameOutcome, now: Instant) -> Observation {
        self.frames += 1;
        self.stats.status = outcome.status_text(self.profile.style);

        let mut beep = false;
        if let Some(assessment) = outcome.assessment() {
            if self.profile.track_score {
                self.stats.score = self.score.record(assessment.is_bad);
            }
            self.stats.quality = Quality::from_bad(assessment.is_bad);
            beep = self.debouncer.poll(assessment.is_bad, now);
        }

        debug!(
            frame = self.frames,
            status = %self.stats.status,
            score = self.stats.score,
            beep,
            "observed frame"
        );

        Observation {
            stats: self.stats.clone(),
            beep,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn bad() -> FrameOutcome {
        let classifier = PostureClassifier::new(Profile::web().policy);
        FrameOutcome::Assessed(classifier.classify_metrics(150.0, 100.0, 20.0))
    }

    fn good() -> FrameOutcome {
        let classifier = PostureClassifier::new(Profile::web().policy);
        FrameOutcome::Assessed(classifier.classify_metrics(100.0, 100.0, 5.0))
    }

    #[test]
    fn test_good_frame_web() {
        let mut session = PostureSession::new(Profile::web());
        let obs = session.observe(&good(), Instant::now());
        assert_eq!(obs.stats.status, "PERFECT FORM");
        assert_eq!(obs.stats.score, 100);
        assert_eq!(obs.stats.quality, Quality::Good);
        assert!(!obs.beep);
    }

    #[test]
    fn test_bad_frame_web() {
        let mut session = PostureSession::new(Profile::web());
        let obs = session.observe(&bad(), Instant::now());
        assert_eq!(obs.stats.status, "WARNING: SLOUCHING, LEANING");
        assert_eq!(obs.stats.score, 98);
        assert_eq!(obs.stats.quality, Quality::Poor);
        assert!(obs.beep);
    }

    #[test]
    fn test_desktop_keeps_score() {
        let mut session = PostureSession::new(Profile::desktop());
        let obs = session.observe(&bad(), Instant::now());
        assert_eq!(obs.stats.status, "SLOUCH DETECTED!");
        assert_eq!(obs.stats.score, 100);
    }

    #[test]
    fn test_no_person_keeps_score_and_quality() {
        let mut session = PostureSession::new(Profile::web());
        let t0 = Instant::now();
        session.observe(&bad(), t0);

        let obs = session.observe(&FrameOutcome::NoPerson, t0 + Duration::from_secs(5));
        assert_eq!(obs.stats.status, "NO PERSON DETECTED");
        assert_eq!(obs.stats.score, 98);
        assert_eq!(obs.stats.quality, Quality::Poor);
        assert!(!obs.beep);
    }

    #[test]
    fn test_failure_is_visible() {
        let mut session = PostureSession::new(Profile::web());
        let obs = session.observe(&FrameOutcome::failed("boom"), Instant::now());
        assert_eq!(obs.stats.status, "ERROR: boom");
        assert_eq!(obs.stats.score, 100);
        assert_eq!(session.frames(), 1);
    }

    #[test]
    fn test_beeps_are_debounced() {
        let mut session = PostureSession::new(Profile::web());
        let t0 = Instant::now();
        assert!(session.observe(&bad(), t0).beep);
        assert!(!session.observe(&bad(), t0 + Duration::from_millis(500)).beep);
        assert!(session.observe(&bad(), t0 + Duration::from_secs(2)).beep);
    }
}
