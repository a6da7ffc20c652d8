//! PostureGuard: real-time posture monitor
//!
//! Frame source → landmark provider → posture classifier → alert debouncer,
//! with an optional health score and a browser dashboard fed by MJPEG.

pub mod core;
pub mod error;
pub mod types;

pub use error::{Error, Result};

// =============================================================================
// LANDMARK TOPOLOGY - BlazePose, 33 points
// =============================================================================

/// Number of landmarks in a pose landmark set
pub const LANDMARK_COUNT: usize = 33;

/// Landmark index of the left ear
pub const LEFT_EAR: usize = 7;

/// Landmark index of the left shoulder
pub const LEFT_SHOULDER: usize = 11;

/// Landmark index of the right shoulder
pub const RIGHT_SHOULDER: usize = 12;

// =============================================================================
// POSTURE THRESHOLDS (degrees)
// =============================================================================

/// Desktop profile: below this shoulder-to-ear angle the head is tipped back
pub const DESKTOP_ANGLE_LOW: f64 = 70.0;

/// Desktop profile: above this angle the user is slouching
pub const DESKTOP_ANGLE_HIGH: f64 = 140.0;

/// Web profile lower angle bound
pub const WEB_ANGLE_LOW: f64 = 75.0;

/// Web profile upper angle bound
pub const WEB_ANGLE_HIGH: f64 = 135.0;

/// Web profile: max shoulder tilt as a fraction of shoulder width
pub const WEB_LEAN_RATIO: f64 = 0.08;

// =============================================================================
// ALERTS
// =============================================================================

/// Minimum gap between two beeps (seconds), both profiles
pub const BEEP_COOLDOWN_SECS: f64 = 2.0;

/// Beep pitch (Hz), both profiles
pub const BEEP_FREQUENCY_HZ: u32 = 1000;

/// Desktop beep length (milliseconds)
pub const DESKTOP_BEEP_MS: u64 = 500;

/// Web beep length (milliseconds)
pub const WEB_BEEP_MS: u64 = 200;

// =============================================================================
// HEALTH SCORE
// =============================================================================

/// Score ceiling and starting value
pub const SCORE_MAX: u8 = 100;

/// Points lost per bad frame
pub const SCORE_PENALTY: u8 = 2;

/// Points regained per good frame
pub const SCORE_RECOVERY: u8 = 1;

// =============================================================================
// FRAME SOURCE
// =============================================================================

/// Consecutive failed frame reads tolerated before the monitor gives up
pub const MAX_READ_FAILURES: u32 = 30;

/// Pause after a failed frame read (milliseconds)
pub const READ_RETRY_DELAY_MS: u64 = 30;

// =============================================================================
// SERVER
// =============================================================================

/// Default bind address of the dashboard server
pub const DEFAULT_ADDR: &str = "0.0.0.0:5000";

/// Status published once the monitor has stopped cleanly
pub const STATUS_STOPPED: &str = "STOPPED";

/// Multipart boundary used by the MJPEG stream
pub const MJPEG_BOUNDARY: &str = "frame";

// =============================================================================
// VERSION
// =============================================================================

pub const VERSION: &str = "1.0.0";
