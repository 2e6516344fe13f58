use crate::error::TrackError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Stage of an artifact; each stage owns one directory under the project root
#[derive(
    Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord,
)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    /// Draft document, not yet converted
    #[default]
    Drafted,
    /// Final document produced, waiting to be submitted
    Ready,
    /// Submitted to the employer
    Applied,
    /// Deliberately not submitted
    Skipped,
}

impl Stage {
    pub const ALL: [Stage; 4] = [Stage::Drafted, Stage::Ready, Stage::Applied, Stage::Skipped];

    /// Canonical status text written to the ledger
    pub fn name(&self) -> &'static str {
        match self {
            Stage::Drafted => "Drafted",
            Stage::Ready => "Ready",
            Stage::Applied => "Applied",
            Stage::Skipped => "Skipped",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            Stage::Drafted => "📝",
            Stage::Ready => "📄",
            Stage::Applied => "📤",
            Stage::Skipped => "⏭️",
        }
    }

    /// Parse a ledger status cell, accepting the aliases older tooling wrote
    /// (`READY`, `PDF Created`, `To_Apply`, ...)
    pub fn from_status(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "drafted" | "draft" | "drafts" => Some(Stage::Drafted),
            "ready" | "to_apply" | "to apply" | "pdf created" => Some(Stage::Ready),
            "applied" => Some(Stage::Applied),
            "skipped" | "skip" => Some(Stage::Skipped),
            _ => None,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Stage {
    type Err = TrackError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Stage::from_status(s).ok_or_else(|| TrackError::InvalidStage(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status_aliases() {
        assert_eq!(Stage::from_status("READY"), Some(Stage::Ready));
        assert_eq!(Stage::from_status("PDF Created"), Some(Stage::Ready));
        assert_eq!(Stage::from_status(" applied "), Some(Stage::Applied));
        assert_eq!(Stage::from_status("Skip"), Some(Stage::Skipped));
        assert_eq!(Stage::from_status("draft"), Some(Stage::Drafted));
        assert_eq!(Stage::from_status("Interview"), None);
    }

    #[test]
    fn test_from_str_error() {
        let err = "archived".parse::<Stage>().unwrap_err();
        assert!(matches!(err, TrackError::InvalidStage(s) if s == "archived"));
    }

    #[test]
    fn test_name_round_trip() {
        for stage in Stage::ALL {
            assert_eq!(stage.name().parse::<Stage>().unwrap(), stage);
        }
    }
}
