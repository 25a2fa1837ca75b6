//! Confidence presentation
//!
//! The percentage is always `score * 100`. A score already on a 0-100 scale
//! (the synthetic fallback) therefore renders as e.g. 8500%; that mismatch is
//! left visible rather than normalised here.

use crate::models::AnalysisResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfidenceLevel {
    High,
    Medium,
    Low,
}

impl ConfidenceLevel {
    pub fn label(&self) -> &'static str {
        match self {
            ConfidenceLevel::High => "High Confidence",
            ConfidenceLevel::Medium => "Medium Confidence",
            ConfidenceLevel::Low => "Low Confidence",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConfidenceDisplay {
    pub percent: f64,
    pub level: ConfidenceLevel,
}

impl ConfidenceDisplay {
    pub fn from_score(score: f64) -> Self {
        let percent = score * 100.0;
        let level = if percent >= 80.0 {
            ConfidenceLevel::High
        } else if percent >= 60.0 {
            ConfidenceLevel::Medium
        } else {
            ConfidenceLevel::Low
        };
        Self { percent, level }
    }

    pub fn label(&self) -> &'static str {
        self.level.label()
    }
}

impl AnalysisResult {
    pub fn confidence_display(&self) -> ConfidenceDisplay {
        ConfidenceDisplay::from_score(self.confidence_score)
    }
}
