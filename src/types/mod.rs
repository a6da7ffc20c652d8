//! Core types for PostureGuard

mod assessment;
mod landmark;
mod outcome;
mod output;
mod profile;
mod stats;

pub use assessment::{Assessment, PostureReason, VerdictStyle};
pub use landmark::{Landmark, LandmarkSet, Point, PostureKeypoints};
pub use outcome::FrameOutcome;
pub use output::FrameReport;
pub use profile::{cooldown_from_secs, PosturePolicy, Profile, Tone};
pub use stats::{Quality, Stats};
