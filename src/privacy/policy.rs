//! Classification and handling policy

use crate::config::{ValidatorConfig, DEFAULT_ENCRYPT_THRESHOLD};
use crate::privacy::types::{
    DataClassification, ProcessingRecommendation, Violation, ViolationField, ViolationKind,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// More violations than this always restricts the payload.
const RESTRICTED_VIOLATION_COUNT: usize = 3;

/// Scores at or above this always restrict the payload.
const RESTRICTED_SCORE: u8 = 75;

/// Classification and recommendation for one violation set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyDecision {
    pub classification: DataClassification,
    pub recommendation: ProcessingRecommendation,
}

/// Sensitivity tier for a violation set and its score.
///
/// Restricted when there are more than three violations, the score reaches
/// 75, PII of two or more different types was found, or an SSN appears
/// together with any other finding.
pub fn classify(violations: &[Violation], score: u8) -> DataClassification {
    if violations.is_empty() {
        return DataClassification::Public;
    }

    let pii_types: HashSet<ViolationField> = violations
        .iter()
        .filter(|v| v.kind == ViolationKind::PiiDetected)
        .map(|v| v.field)
        .collect();
    let has_ssn = pii_types.contains(&ViolationField::Ssn);

    if violations.len() > RESTRICTED_VIOLATION_COUNT
        || score >= RESTRICTED_SCORE
        || pii_types.len() >= 2
        || (has_ssn && violations.len() >= 2)
    {
        DataClassification::Restricted
    } else {
        DataClassification::Confidential
    }
}

/// Policy engine turning violation sets into handling decisions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PolicyEngine {
    encrypt_threshold: u8,
    require_encryption: bool,
}

impl PolicyEngine {
    /// Create a policy engine with default thresholds
    pub fn new() -> Self {
        Self {
            encrypt_threshold: DEFAULT_ENCRYPT_THRESHOLD,
            require_encryption: false,
        }
    }

    /// Policy derived from a configuration snapshot
    pub fn from_config(config: &ValidatorConfig) -> Self {
        Self {
            encrypt_threshold: config.encrypt_threshold,
            require_encryption: config.require_encryption,
        }
    }

    /// Set the ENCRYPT/ALLOW boundary
    pub fn encrypt_threshold(mut self, threshold: u8) -> Self {
        self.encrypt_threshold = threshold;
        self
    }

    /// Escalate any non-empty finding to at least ENCRYPT
    pub fn require_encryption(mut self, required: bool) -> Self {
        self.require_encryption = required;
        self
    }

    /// Evaluate classification and recommendation
    pub fn evaluate(&self, violations: &[Violation], score: u8) -> PolicyDecision {
        let classification = classify(violations, score);
        PolicyDecision {
            classification,
            recommendation: self.recommend(violations, score, classification),
        }
    }

    fn recommend(
        &self,
        violations: &[Violation],
        score: u8,
        classification: DataClassification,
    ) -> ProcessingRecommendation {
        if classification == DataClassification::Restricted {
            return ProcessingRecommendation::Reject;
        }

        let anonymizable = violations.iter().any(|v| {
            matches!(
                v.kind,
                ViolationKind::PiiDetected | ViolationKind::SensitiveContent
            )
        });
        if anonymizable && classification == DataClassification::Confidential {
            return ProcessingRecommendation::Anonymize;
        }

        if score >= self.encrypt_threshold && score > 0 {
            return ProcessingRecommendation::Encrypt;
        }
        if self.require_encryption && !violations.is_empty() {
            return ProcessingRecommendation::Encrypt;
        }

        ProcessingRecommendation::Allow
    }
}

impl Default for PolicyEngine {
    fn default() -> Self {
        Self::new()
    }
}
