//! Per-frame report for terminal and JSON-lines output

use chrono::{DateTime, Utc};
use colored::Colorize;
use serde::{Deserialize, Serialize};

use crate::types::{FrameOutcome, Stats, VerdictStyle};

/// What happened on one processed frame
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameReport {
    /// Wall-clock time the frame was processed
    pub timestamp: DateTime<Utc>,
    /// 0-based frame counter
    pub frame: u64,
    pub outcome: FrameOutcome,
    /// Stats after this frame
    pub stats: Stats,
    /// Whether an alert tone was emitted
    pub beeped: bool,
}

impl FrameReport {
    pub fn new(frame: u64, outcome: FrameOutcome, stats: Stats, beeped: bool) -> Self {
        Self {
            timestamp: Utc::now(),
            frame,
            outcome,
            stats,
            beeped,
        }
    }

    /// Colored status line: red when bad, green when good, yellow otherwise
    pub fn to_terminal_string(&self, style: VerdictStyle) -> String {
        let line = self.to_parseable_string(style);
        match &self.outcome {
            FrameOutcome::Assessed(a) if a.is_bad => line.red().bold().to_string(),
            FrameOutcome::Assessed(_) => line.green().bold().to_string(),
            _ => line.yellow().to_string(),
        }
    }

    /// Plain status line, e.g. `GOOD POSTURE | Angle: 97`
    pub fn to_parseable_string(&self, style: VerdictStyle) -> String {
        let status = self.outcome.status_text(style);
        let mut line = match self.outcome.assessment() {
            Some(a) => format!("{} | {}", status, a.metrics_text(style)),
            None => status,
        };
        if style == VerdictStyle::Detailed {
            line.push_str(&format!(" | score={}", self.stats.score));
        }
        line
    }
}
