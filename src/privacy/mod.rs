//! Privacy and risk classification
//!
//! Detects personally identifying and domain-sensitive content anywhere in
//! a payload, scores the findings, assigns a sensitivity tier and
//! recommends a handling action. Includes:
//! - Tagged-union payload model with cycle-safe traversal
//! - Regex and lexicon-driven detection
//! - Severity-weighted risk scoring and tier/recommendation policy
//! - Compliance reports and a violation audit trail
//! - Hot-swappable configuration

pub mod audit;
pub mod detector;
pub mod handler;
pub mod lexicon;
pub mod payload;
pub mod policy;
pub mod report;
pub mod risk;
pub mod store;
pub mod types;
pub mod validator;

pub use audit::{
    AuditLog, AuditRecord, AuditSink, AuditStats, FanoutSink, SeverityCounts, TracingAuditSink,
};
pub use detector::Detector;
pub use handler::{privacy_router, PrivacyState};
pub use lexicon::Lexicon;
pub use payload::{Leaf, Payload, PayloadVisitor, SharedPayload};
pub use policy::{classify, PolicyDecision, PolicyEngine};
pub use report::{report, ComplianceReport};
pub use risk::{score, RiskTier};
pub use store::ConfigStore;
pub use types::{
    DataClassification, ProcessingRecommendation, Severity, ValidationResult, Violation,
    ViolationField, ViolationKind,
};
pub use validator::PrivacyValidator;
