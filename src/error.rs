//! Error type shared by the pipeline, sources and providers

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("expected {expected} landmarks, got {got}")]
    LandmarkCount { expected: usize, got: usize },

    #[error("landmark {index} has non-finite coordinates")]
    InvalidLandmark { index: usize },

    #[error("invalid source spec {0:?} (expected camera:<index>, synthetic[:WxH] or dir:<path>)")]
    InvalidSourceSpec(String),

    #[error("camera {index} unavailable: {reason}")]
    CameraUnavailable { index: i32, reason: String },

    #[error("no frame source could be opened (tried {primary} and {fallback})")]
    SourceUnavailable { primary: String, fallback: String },

    #[error("failed to read frame: {0}")]
    FrameRead(String),

    #[error("frame source has no more frames")]
    EndOfStream,

    #[error("landmark trace line {line}: {source}")]
    Trace {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("audio output failed")]
    Audio(#[source] std::io::Error),

    #[error("audio device unavailable: {0}")]
    AudioDevice(String),

    #[error("unusable font {path}: {reason}")]
    Font { path: String, reason: String },

    #[error("invalid posture policy: {0}")]
    InvalidPolicy(String),

    #[error(transparent)]
    Image(#[from] image::ImageError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
