//! Risk score aggregation

use crate::privacy::types::Violation;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Upper bound of the risk score
pub const MAX_RISK_SCORE: u8 = 100;

/// Sum of severity weights over all violations, capped at 100.
pub fn score(violations: &[Violation]) -> u8 {
    let total: u32 = violations.iter().map(|v| v.severity.weight()).sum();
    total.min(MAX_RISK_SCORE as u32) as u8
}

/// Coarse risk band used in reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskTier {
    Minimal,
    LowModerate,
    High,
}

impl RiskTier {
    pub fn from_score(score: u8) -> Self {
        match score {
            0..=24 => Self::Minimal,
            25..=49 => Self::LowModerate,
            _ => Self::High,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Minimal => "MINIMAL RISK",
            Self::LowModerate => "LOW/MODERATE RISK",
            Self::High => "HIGH RISK",
        }
    }
}

impl fmt::Display for RiskTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::privacy::types::ViolationField;

    fn v(field: ViolationField) -> Violation {
        Violation::for_field(field)
    }

    #[test]
    fn test_empty_scores_zero() {
        assert_eq!(score(&[]), 0);
    }

    #[test]
    fn test_weights() {
        assert_eq!(score(&[v(ViolationField::Email)]), 25);
        assert_eq!(score(&[v(ViolationField::Name)]), 10);
        assert_eq!(
            score(&[v(ViolationField::Ssn), v(ViolationField::TimePatterns)]),
            35
        );
    }

    #[test]
    fn test_score_is_capped() {
        let many = vec![v(ViolationField::Email); 5];
        assert_eq!(score(&many), 100);
    }

    #[test]
    fn test_tiers() {
        assert_eq!(RiskTier::from_score(0), RiskTier::Minimal);
        assert_eq!(RiskTier::from_score(24), RiskTier::Minimal);
        assert_eq!(RiskTier::from_score(25), RiskTier::LowModerate);
        assert_eq!(RiskTier::from_score(49), RiskTier::LowModerate);
        assert_eq!(RiskTier::from_score(50), RiskTier::High);
        assert_eq!(RiskTier::from_score(100).label(), "HIGH RISK");
    }
}
