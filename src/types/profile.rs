//! Monitoring profiles: thresholds, alert tone and presentation knobs
//!
//! The desktop and web variants disagree on their thresholds; each is kept as
//! its own policy rather than reconciled.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::types::VerdictStyle;
use crate::{Error, Result};
use crate::{
    BEEP_COOLDOWN_SECS, BEEP_FREQUENCY_HZ, DESKTOP_ANGLE_HIGH, DESKTOP_ANGLE_LOW, DESKTOP_BEEP_MS,
    WEB_ANGLE_HIGH, WEB_ANGLE_LOW, WEB_BEEP_MS, WEB_LEAN_RATIO,
};

/// Thresholds applied by the posture classifier
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PosturePolicy {
    /// Below this angle: LOOKING UP
    pub angle_low: f64,
    /// Above this angle: SLOUCHING
    pub angle_high: f64,
    /// Max shoulder tilt as a fraction of shoulder width; None disables the lean check
    pub lean_ratio: Option<f64>,
}

impl PosturePolicy {
    pub fn desktop() -> Self {
        Self {
            angle_low: DESKTOP_ANGLE_LOW,
            angle_high: DESKTOP_ANGLE_HIGH,
            lean_ratio: None,
        }
    }

    pub fn web() -> Self {
        Self {
            angle_low: WEB_ANGLE_LOW,
            angle_high: WEB_ANGLE_HIGH,
            lean_ratio: Some(WEB_LEAN_RATIO),
        }
    }

    /// Angles finite within 0..=180 with low below high; lean ratio finite and non-negative
    pub fn validate(&self) -> Result<()> {
        for (name, angle) in [("angle_low", self.angle_low), ("angle_high", self.angle_high)] {
            if !angle.is_finite() || !(0.0..=180.0).contains(&angle) {
                return Err(Error::InvalidPolicy(format!(
                    "{name} {angle} is outside 0-180 degrees"
                )));
            }
        }
        if self.angle_low >= self.angle_high {
            return Err(Error::InvalidPolicy(format!(
                "angle_low {} must be below angle_high {}",
                self.angle_low, self.angle_high
            )));
        }
        if let Some(ratio) = self.lean_ratio {
            if !ratio.is_finite() || ratio < 0.0 {
                return Err(Error::InvalidPolicy(format!(
                    "lean_ratio {ratio} must be a non-negative number"
                )));
            }
        }
        Ok(())
    }
}

/// Beep cooldown from seconds; rejects negative, non-finite and overflowing values
pub fn cooldown_from_secs(secs: f64) -> Result<Duration> {
    if secs < 0.0 {
        return Err(Error::InvalidPolicy(format!("cooldown {secs}s is negative")));
    }
    Duration::try_from_secs_f64(secs)
        .map_err(|e| Error::InvalidPolicy(format!("cooldown {secs}s: {e}")))
}

/// A beep: pitch and length
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tone {
    pub frequency_hz: u32,
    pub duration: Duration,
}

impl Tone {
    pub fn new(frequency_hz: u32, duration: Duration) -> Self {
        Self {
            frequency_hz,
            duration,
        }
    }
}

/// Everything that differs between the desktop monitor and the web dashboard
#[derive(Debug, Clone, PartialEq)]
pub struct Profile {
    pub name: &'static str,
    pub policy: PosturePolicy,
    pub cooldown: Duration,
    pub tone: Tone,
    /// Whether the health score moves
    pub track_score: bool,
    /// Flip frames horizontally before detection
    pub mirror: bool,
    pub style: VerdictStyle,
}

impl Profile {
    pub fn desktop() -> Self {
        Self {
            name: "desktop",
            policy: PosturePolicy::desktop(),
            cooldown: Duration::from_secs_f64(BEEP_COOLDOWN_SECS),
            tone: Tone::new(BEEP_FREQUENCY_HZ, Duration::from_millis(DESKTOP_BEEP_MS)),
            track_score: false,
            mirror: false,
            style: VerdictStyle::Binary,
        }
    }

    pub fn web() -> Self {
        Self {
            name: "web",
            policy: PosturePolicy::web(),
            cooldown: Duration::from_secs_f64(BEEP_COOLDOWN_SECS),
            tone: Tone::new(BEEP_FREQUENCY_HZ, Duration::from_millis(WEB_BEEP_MS)),
            track_score: true,
            mirror: true,
            style: VerdictStyle::Detailed,
        }
    }

    pub fn with_policy(mut self, policy: PosturePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_cooldown(mut self, cooldown: Duration) -> Self {
        self.cooldown = cooldown;
        self
    }
}
