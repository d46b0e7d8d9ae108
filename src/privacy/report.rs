//! Human-readable compliance reports
//!
//! A report is derived purely from a [`ValidationResult`]; generating one
//! twice from the same result yields the same report.

use crate::privacy::risk::RiskTier;
use crate::privacy::types::{ProcessingRecommendation, ValidationResult, ViolationKind};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Summary of a validation result for operators and clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplianceReport {
    pub summary: String,
    pub recommendations: Vec<String>,
    pub risk_assessment: String,
    pub next_steps: Vec<String>,
}

/// Build the report for a validation result
pub fn report(result: &ValidationResult) -> ComplianceReport {
    ComplianceReport {
        summary: summary(result),
        recommendations: recommendations(result),
        risk_assessment: format!(
            "{}: risk score {}/100",
            RiskTier::from_score(result.risk_score),
            result.risk_score
        ),
        next_steps: next_steps(result),
    }
}

fn summary(result: &ValidationResult) -> String {
    if result.is_fail_closed() {
        return format!(
            "Data classified as {}: the payload could not be inspected and is treated as maximally sensitive",
            result.data_classification
        );
    }
    if result.is_compliant {
        return format!(
            "Data classified as {}: no privacy violations detected",
            result.data_classification
        );
    }
    format!(
        "Data classified as {}: {} violation(s) detected",
        result.data_classification,
        result.violations.len()
    )
}

fn recommendations(result: &ValidationResult) -> Vec<String> {
    let mut kinds: Vec<ViolationKind> = Vec::new();
    for violation in &result.violations {
        if !kinds.contains(&violation.kind) {
            kinds.push(violation.kind);
        }
    }

    let mut out: Vec<String> = kinds
        .into_iter()
        .map(|kind| match kind {
            ViolationKind::PiiDetected => {
                let mut fields: Vec<&str> = Vec::new();
                for v in result.violations.iter().filter(|v| v.kind == kind) {
                    if !fields.contains(&v.field.as_str()) {
                        fields.push(v.field.as_str());
                    }
                }
                format!(
                    "Remove or mask personally identifiable information ({})",
                    fields.join(", ")
                )
            }
            ViolationKind::SensitiveContent => {
                "Review sensitive content before storing or sharing it".to_string()
            }
            ViolationKind::SizeExceeded => {
                "Reduce the payload below the configured size limit".to_string()
            }
        })
        .collect();

    if result.is_fail_closed() {
        out.push("Submit a payload without cyclic or excessively nested structures".to_string());
    }

    match result.processing_recommendation {
        ProcessingRecommendation::Allow => {}
        ProcessingRecommendation::Encrypt => {
            out.push("Encrypt this data at rest and in transit".to_string())
        }
        ProcessingRecommendation::Anonymize => {
            out.push("Anonymize identified fields before further processing".to_string())
        }
        ProcessingRecommendation::Reject => {
            out.push("Do not process or persist this data".to_string())
        }
    }

    out
}

fn next_steps(result: &ValidationResult) -> Vec<String> {
    let steps: &[&str] = match result.processing_recommendation {
        ProcessingRecommendation::Allow if result.violations.is_empty() => &[],
        ProcessingRecommendation::Allow => &["Review flagged fields before processing"],
        ProcessingRecommendation::Encrypt => &[
            "Encrypt the payload before storage",
            "Restrict access to authorized services",
        ],
        ProcessingRecommendation::Anonymize => &[
            "Replace identified values with anonymized placeholders",
            "Re-validate the anonymized payload",
        ],
        ProcessingRecommendation::Reject => &[
            "Reject the payload",
            "Notify the submitting client",
            "Record the rejection for audit",
        ],
    };
    steps.iter().map(|s| s.to_string()).collect()
}

impl fmt::Display for ComplianceReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.summary)?;
        writeln!(f, "{}", self.risk_assessment)?;
        if !self.recommendations.is_empty() {
            writeln!(f, "Recommendations:")?;
            for rec in &self.recommendations {
                writeln!(f, "  - {}", rec)?;
            }
        }
        if !self.next_steps.is_empty() {
            writeln!(f, "Next steps:")?;
            for (i, step) in self.next_steps.iter().enumerate() {
                writeln!(f, "  {}. {}", i + 1, step)?;
            }
        }
        Ok(())
    }
}
