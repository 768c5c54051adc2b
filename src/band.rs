//! Severity bands for the overall risk score.

use serde::{Deserialize, Serialize};

use crate::HP;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskBand {
    Low,
    Medium,
    High,
}

impl RiskBand {
    /// `< 25` is low, `< 60` medium, anything else high.
    pub fn from_score(score: f64) -> Self {
        if score < HP.band_medium_min {
            RiskBand::Low
        } else if score < HP.band_high_min {
            RiskBand::Medium
        } else {
            RiskBand::High
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RiskBand::Low => "Low",
            RiskBand::Medium => "Medium",
            RiskBand::High => "High",
        }
    }
}

impl std::fmt::Display for RiskBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Pointer position on the risk meter, as a percentage.
pub fn meter_position(score: f64) -> f64 {
    score.clamp(0.0, HP.score_max)
}

/// Badge text such as `Medium • 57`.
pub fn badge(score: f64) -> String {
    format!("{} \u{2022} {}", RiskBand::from_score(score), score.round())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn band_boundaries() {
        assert_eq!(RiskBand::from_score(0.0), RiskBand::Low);
        assert_eq!(RiskBand::from_score(24.9), RiskBand::Low);
        assert_eq!(RiskBand::from_score(25.0), RiskBand::Medium);
        assert_eq!(RiskBand::from_score(59.99), RiskBand::Medium);
        assert_eq!(RiskBand::from_score(60.0), RiskBand::High);
        assert_eq!(RiskBand::from_score(100.0), RiskBand::High);
    }

    #[test]
    fn badge_rounds_score() {
        assert_eq!(badge(57.0), "Medium \u{2022} 57");
        assert_eq!(badge(72.6), "High \u{2022} 73");
        assert_eq!(badge(0.0), "Low \u{2022} 0");
    }

    #[test]
    fn meter_is_clamped() {
        assert_eq!(meter_position(-5.0), 0.0);
        assert_eq!(meter_position(42.5), 42.5);
        assert_eq!(meter_position(180.0), 100.0);
    }
}
