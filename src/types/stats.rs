//! Snapshot served by `GET /stats`

use serde::{Deserialize, Serialize};

use crate::SCORE_MAX;

/// Coarse posture quality shown on the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Quality {
    Good,
    Poor,
}

impl Quality {
    pub fn from_bad(is_bad: bool) -> Self {
        if is_bad {
            Quality::Poor
        } else {
            Quality::Good
        }
    }
}

impl std::fmt::Display for Quality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Quality::Good => write!(f, "Good"),
            Quality::Poor => write!(f, "Poor"),
        }
    }
}

/// `{score, quality, status}` - the dashboard's polling payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    /// Health score, 0-100
    pub score: u8,
    pub quality: Quality,
    /// Human-readable status line, never empty
    pub status: String,
}

impl Default for Stats {
    fn default() -> Self {
        Self {
            score: SCORE_MAX,
            quality: Quality::Good,
            status: "WAITING".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_json_shape() {
        let stats = Stats {
            score: 42,
            quality: Quality::Poor,
            status: "WARNING: LEANING".to_string(),
        };
        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"score": 42, "quality": "Poor", "status": "WARNING: LEANING"})
        );
    }

    #[test]
    fn test_default_is_waiting() {
        let stats = Stats::default();
        assert_eq!(stats.score, 100);
        assert_eq!(stats.quality, Quality::Good);
        assert_eq!(stats.status, "WAITING");
    }
}
