//! What the pipeline learned from one frame

use serde::{Deserialize, Serialize};

use crate::types::{Assessment, VerdictStyle};

/// Result of running detection + classification on a frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FrameOutcome {
    /// Landmarks found and classified
    Assessed(Assessment),
    /// Provider ran fine but saw nobody
    NoPerson,
    /// Provider or keypoint extraction failed
    Failed { message: String },
}

impl FrameOutcome {
    pub fn failed(message: impl Into<String>) -> Self {
        FrameOutcome::Failed {
            message: message.into(),
        }
    }

    pub fn assessment(&self) -> Option<&Assessment> {
        match self {
            FrameOutcome::Assessed(a) => Some(a),
            _ => None,
        }
    }

    pub fn is_bad(&self) -> bool {
        self.assessment().map(|a| a.is_bad).unwrap_or(false)
    }

    pub fn status_text(&self, style: VerdictStyle) -> String {
        match self {
            FrameOutcome::Assessed(a) => a.status_text(style),
            FrameOutcome::NoPerson => "NO PERSON DETECTED".to_string(),
            FrameOutcome::Failed { message } => format!("ERROR: {}", message),
        }
    }
}
