//! Violation and validation result types

use serde::{Deserialize, Serialize};
use std::fmt;

/// Category of a detected issue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ViolationKind {
    /// Personally identifying information
    PiiDetected,
    /// Domain-sensitive disclosure (explicit content, relapse, routines)
    SensitiveContent,
    /// Serialized payload is larger than the configured ceiling
    SizeExceeded,
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PiiDetected => write!(f, "PII_DETECTED"),
            Self::SensitiveContent => write!(f, "SENSITIVE_CONTENT"),
            Self::SizeExceeded => write!(f, "SIZE_EXCEEDED"),
        }
    }
}

/// Violation severity, ordered from least to most severe
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    /// Contribution of one violation of this severity to the risk score
    pub fn weight(self) -> u32 {
        match self {
            Self::High => 25,
            Self::Medium => 10,
            Self::Low => 5,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Low => write!(f, "LOW"),
            Self::Medium => write!(f, "MEDIUM"),
            Self::High => write!(f, "HIGH"),
        }
    }
}

/// Label of the matcher that produced a violation.
///
/// Identifies what was matched, not where in the payload it was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ViolationField {
    Email,
    Phone,
    Ssn,
    Name,
    ExplicitContent,
    RelapseTerms,
    TimePatterns,
    RoutinePatterns,
    Size,
}

impl ViolationField {
    /// The violation kind this field belongs to
    pub fn kind(self) -> ViolationKind {
        match self {
            Self::Email | Self::Phone | Self::Ssn | Self::Name => ViolationKind::PiiDetected,
            Self::ExplicitContent
            | Self::RelapseTerms
            | Self::TimePatterns
            | Self::RoutinePatterns => ViolationKind::SensitiveContent,
            Self::Size => ViolationKind::SizeExceeded,
        }
    }

    /// Fixed severity for this field
    pub fn severity(self) -> Severity {
        match self {
            Self::Email | Self::Phone | Self::Ssn => Severity::High,
            Self::ExplicitContent | Self::RelapseTerms => Severity::High,
            Self::Name | Self::TimePatterns | Self::RoutinePatterns | Self::Size => {
                Severity::Medium
            }
        }
    }

    /// Wire label, e.g. `explicitContent`
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Phone => "phone",
            Self::Ssn => "ssn",
            Self::Name => "name",
            Self::ExplicitContent => "explicitContent",
            Self::RelapseTerms => "relapseTerms",
            Self::TimePatterns => "timePatterns",
            Self::RoutinePatterns => "routinePatterns",
            Self::Size => "size",
        }
    }
}

impl fmt::Display for ViolationField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single detected issue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Violation {
    #[serde(rename = "type")]
    pub kind: ViolationKind,
    pub field: ViolationField,
    pub severity: Severity,
}

impl Violation {
    /// Build the violation for a matcher, with kind and severity taken
    /// from the severity table.
    pub fn for_field(field: ViolationField) -> Self {
        Self {
            kind: field.kind(),
            field,
            severity: field.severity(),
        }
    }
}

/// Sensitivity tier assigned to a payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DataClassification {
    Public,
    Confidential,
    Restricted,
}

impl fmt::Display for DataClassification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Public => write!(f, "PUBLIC"),
            Self::Confidential => write!(f, "CONFIDENTIAL"),
            Self::Restricted => write!(f, "RESTRICTED"),
        }
    }
}

/// Suggested downstream handling action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProcessingRecommendation {
    Allow,
    Encrypt,
    Anonymize,
    Reject,
}

impl fmt::Display for ProcessingRecommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Allow => write!(f, "ALLOW"),
            Self::Encrypt => write!(f, "ENCRYPT"),
            Self::Anonymize => write!(f, "ANONYMIZE"),
            Self::Reject => write!(f, "REJECT"),
        }
    }
}

/// Output of one validation call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub is_compliant: bool,
    pub violations: Vec<Violation>,
    pub risk_score: u8,
    pub data_classification: DataClassification,
    pub processing_recommendation: ProcessingRecommendation,
    /// Set only when the payload could not be inspected
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ValidationResult {
    /// Result for a payload that could not be inspected.
    ///
    /// Uninspectable data is treated as maximally sensitive.
    pub fn fail_closed(reason: impl Into<String>) -> Self {
        Self {
            is_compliant: false,
            violations: Vec::new(),
            risk_score: 100,
            data_classification: DataClassification::Restricted,
            processing_recommendation: ProcessingRecommendation::Reject,
            error: Some(reason.into()),
        }
    }

    /// Whether this result came from the fail-closed path
    pub fn is_fail_closed(&self) -> bool {
        self.error.is_some()
    }
}
