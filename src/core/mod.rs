//! Core modules for PostureGuard

pub mod annotate;
pub mod api;
pub mod audio;
#[cfg(feature = "camera")]
pub mod camera;
pub mod classifier;
pub mod debouncer;
pub mod geometry;
pub mod mjpeg;
pub mod pipeline;
pub mod provider;
pub mod score;
pub mod session;
pub mod source;
#[cfg(feature = "audio")]
pub mod tone;

pub use annotate::Annotator;
pub use api::{channels, create_router, run_server, serve, AppState, Feeds};
pub use audio::{Beeper, SilentBeeper, TerminalBell};
pub use classifier::PostureClassifier;
pub use debouncer::AlertDebouncer;
pub use geometry::vertical_angle;
pub use pipeline::{Monitor, ProcessedFrame};
pub use provider::{LandmarkProvider, NullProvider, ReplayProvider};
pub use score::HealthScore;
pub use session::{Observation, PostureSession};
pub use source::{open_source, open_with_fallback, FrameSource, ImageSequenceSource, Pacer, SourceSpec, SyntheticSource};
#[cfg(feature = "audio")]
pub use tone::ToneBeeper;
