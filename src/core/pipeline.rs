//! Monitor pipeline: read → detect → classify → alert → annotate
//!
//! Synchronous and single-owner: the monitor holds the frame source, the
//! landmark provider, the beeper and the session. Servers run it on a
//! blocking thread and fan its output out through channels.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use image::imageops;
use image::RgbImage;
use tracing::{debug, info, warn};

use crate::core::annotate::Annotator;
use crate::core::{Beeper, FrameSource, LandmarkProvider, PostureSession};
use crate::types::{FrameOutcome, FrameReport, LandmarkSet, Profile};
use crate::{Error, Result, MAX_READ_FAILURES, READ_RETRY_DELAY_MS};

/// An annotated frame and what was decided about it.
///
/// `image` is `None` when the source failed to deliver a frame.
#[derive(Debug, Clone)]
pub struct ProcessedFrame {
    pub image: Option<RgbImage>,
    pub report: FrameReport,
}

pub struct Monitor<S, P, B> {
    source: S,
    provider: P,
    beeper: B,
    annotator: Annotator,
    session: PostureSession,
    frame_index: u64,
    max_read_failures: u32,
    read_retry_delay: Duration,
}

impl<S, P, B> Monitor<S, P, B>
where
    S: FrameSource,
    P: LandmarkProvider,
    B: Beeper,
{
    pub fn new(source: S, provider: P, beeper: B, profile: Profile) -> Self {
        Self {
            source,
            provider,
            beeper,
            annotator: Annotator::without_text(),
            session: PostureSession::new(profile),
            frame_index: 0,
            max_read_failures: MAX_READ_FAILURES,
            read_retry_delay: Duration::from_millis(READ_RETRY_DELAY_MS),
        }
    }

    pub fn with_annotator(mut self, annotator: Annotator) -> Self {
        self.annotator = annotator;
        self
    }

    /// How many failed reads in a row `run` rides out, and the pause after each
    pub fn with_read_retries(mut self, max_failures: u32, delay: Duration) -> Self {
        self.max_read_failures = max_failures;
        self.read_retry_delay = delay;
        self
    }

    pub fn session(&self) -> &PostureSession {
        &self.session
    }

    /// Read one frame from the source and process it
    pub fn step(&mut self) -> Result<ProcessedFrame> {
        let frame = self.source.read_frame()?;
        Ok(self.process(frame, Instant::now()))
    }

    /// Process an already captured frame observed at `now`
    pub fn process(&mut self, mut frame: RgbImage, now: Instant) -> ProcessedFrame {
        if self.session.profile().mirror {
            imageops::flip_horizontal_in_place(&mut frame);
        }

        let (landmarks, outcome) = self.detect(&frame);
        let observation = self.session.observe(&outcome, now);

        if observation.beep {
            if let Err(e) = self.beeper.beep(self.session.profile().tone) {
                warn!(error = %e, "alert tone failed");
            }
        }

        self.annotator.annotate(
            &mut frame,
            landmarks.as_ref(),
            &outcome,
            &observation.stats,
            self.session.profile(),
        );

        let report = FrameReport::new(self.frame_index, outcome, observation.stats, observation.beep);
        self.frame_index += 1;
        ProcessedFrame {
            image: Some(frame),
            report,
        }
    }

    /// Record a frame the source failed to deliver
    pub fn read_failed(&mut self, error: &Error, now: Instant) -> ProcessedFrame {
        let outcome = FrameOutcome::failed(error.to_string());
        let observation = self.session.observe(&outcome, now);
        let report = FrameReport::new(self.frame_index, outcome, observation.stats, false);
        self.frame_index += 1;
        ProcessedFrame { image: None, report }
    }

    fn detect(&mut self, frame: &RgbImage) -> (Option<LandmarkSet>, FrameOutcome) {
        let set = match self.provider.detect(frame) {
            Ok(Some(set)) => set,
            Ok(None) => return (None, FrameOutcome::NoPerson),
            Err(e) => {
                warn!(frame = self.frame_index, error = %e, "landmark detection failed");
                return (None, FrameOutcome::failed(e.to_string()));
            }
        };

        let outcome = match set.keypoints(frame.width(), frame.height()) {
            Ok(keypoints) => FrameOutcome::Assessed(self.session.classifier().classify(&keypoints)),
            Err(e) => {
                warn!(frame = self.frame_index, error = %e, "unusable landmarks");
                FrameOutcome::failed(e.to_string())
            }
        };
        (Some(set), outcome)
    }

    /// Process frames until `stop` is set, `max_frames` is reached or the
    /// source runs dry. Returns the number of frames processed.
    ///
    /// A failed read is reported as a failed frame; the run only ends with an
    /// error once more than `max_read_failures` reads in a row have failed.
    pub fn run<F>(&mut self, stop: &AtomicBool, max_frames: Option<u64>, mut on_frame: F) -> Result<u64>
    where
        F: FnMut(ProcessedFrame) -> Result<()>,
    {
        let mut processed = 0u64;
        let mut failures = 0u32;
        info!(profile = self.session.profile().name, "monitor started");

        while !stop.load(Ordering::SeqCst) {
            if max_frames.is_some_and(|max| processed >= max) {
                debug!(processed, "frame limit reached");
                break;
            }
            let frame = match self.source.read_frame() {
                Ok(image) => {
                    failures = 0;
                    self.process(image, Instant::now())
                }
                Err(Error::EndOfStream) => {
                    info!(processed, "frame source exhausted");
                    break;
                }
                Err(e @ Error::FrameRead(_)) if failures < self.max_read_failures => {
                    failures += 1;
                    warn!(failures, error = %e, "frame read failed");
                    let frame = self.read_failed(&e, Instant::now());
                    std::thread::sleep(self.read_retry_delay);
                    frame
                }
                Err(e) => return Err(e),
            };
            processed += 1;
            on_frame(frame)?;
        }

        info!(processed, score = self.session.stats().score, "monitor stopped");
        Ok(processed)
    }
}
