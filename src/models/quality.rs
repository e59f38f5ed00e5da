use serde::{Deserialize, Serialize};

/// Per-variable, per-record QC verdict.
///
/// A verdict other than `Good` is terminal: once a stage rejects a value,
/// later stages never see it again and cannot change its flag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QualityFlag {
    #[default]
    Good = 0,
    PhysicallyInvalid = 1,
    StatisticalOutlier = 2,
}

impl QualityFlag {
    pub fn as_u8(&self) -> u8 {
        *self as u8
    }

    pub fn is_good(&self) -> bool {
        matches!(self, QualityFlag::Good)
    }

    pub fn label(&self) -> &'static str {
        match self {
            QualityFlag::Good => "good",
            QualityFlag::PhysicallyInvalid => "physically invalid",
            QualityFlag::StatisticalOutlier => "statistical outlier",
        }
    }

    /// Apply a new verdict. Only a `Good` flag can change.
    pub fn escalate(self, verdict: QualityFlag) -> QualityFlag {
        if self.is_good() {
            verdict
        } else {
            self
        }
    }
}
