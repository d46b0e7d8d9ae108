//! Validation facade
//!
//! ```text
//! payload ─→ Detector ─→ violations ─→ risk::score ─→ PolicyEngine ─→ ValidationResult
//!               │                                                        │
//!               └─ structural error ─→ fail-closed result                └─→ AuditSink
//! ```

use crate::config::{ConfigUpdate, ValidatorConfig};
use crate::error::{Error, Result};
use crate::privacy::audit::{AuditRecord, AuditSink, TracingAuditSink};
use crate::privacy::detector::Detector;
use crate::privacy::lexicon::Lexicon;
use crate::privacy::payload::Payload;
use crate::privacy::policy::PolicyEngine;
use crate::privacy::report::{self, ComplianceReport};
use crate::privacy::risk;
use crate::privacy::store::ConfigStore;
use crate::privacy::types::{ValidationResult, Violation};
use arc_swap::ArcSwap;
use chrono::Utc;
use std::sync::Arc;

/// Privacy validator: detection, scoring, classification and auditing
/// against a hot-swappable configuration.
pub struct PrivacyValidator {
    config: ConfigStore,
    detector: ArcSwap<Detector>,
    audit: Arc<dyn AuditSink>,
}

impl PrivacyValidator {
    /// Create a validator with the given policy and lexicon.
    ///
    /// Audit records go to [`TracingAuditSink`] until another sink is set.
    pub fn new(config: ValidatorConfig, lexicon: Lexicon) -> Result<Self> {
        Ok(Self {
            config: ConfigStore::new(config)?,
            detector: ArcSwap::from_pointee(Detector::new(lexicon)?),
            audit: Arc::new(TracingAuditSink),
        })
    }

    /// Validator with default policy and the built-in lexicon
    pub fn with_defaults() -> Result<Self> {
        Self::new(ValidatorConfig::default(), Lexicon::default())
    }

    /// Send audit records to `sink`
    pub fn with_audit_sink(mut self, sink: Arc<dyn AuditSink>) -> Self {
        self.audit = sink;
        self
    }

    /// Validate a payload against the current configuration.
    ///
    /// Never fails: payloads that cannot be inspected produce the
    /// fail-closed result.
    pub fn validate(&self, payload: &Payload) -> ValidationResult {
        let config = self.config.snapshot();
        self.validate_with(payload, &config)
    }

    /// Validate a JSON value against the current configuration
    pub fn validate_json(&self, value: serde_json::Value) -> ValidationResult {
        self.validate(&Payload::from(value))
    }

    /// Parse and validate a JSON document.
    ///
    /// A blank document is treated as an absent payload. Documents nested
    /// too deeply to inspect produce the fail-closed result; only malformed
    /// JSON is returned as an error.
    pub fn validate_slice(&self, bytes: &[u8]) -> Result<ValidationResult> {
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(self.validate(&Payload::Null));
        }
        match Payload::from_json_slice(bytes) {
            Ok(payload) => Ok(self.validate(&payload)),
            Err(e @ Error::DepthLimitExceeded(_)) => {
                tracing::warn!(error = %e, "Payload could not be inspected, failing closed");
                Ok(ValidationResult::fail_closed(e.to_string()))
            }
            Err(e) => Err(e),
        }
    }

    /// Validate against an explicit configuration snapshot
    pub fn validate_with(&self, payload: &Payload, config: &ValidatorConfig) -> ValidationResult {
        let detector = self.detector.load();

        let violations = match detector.detect(payload, config) {
            Ok(violations) => violations,
            Err(e) => {
                tracing::warn!(error = %e, "Payload could not be inspected, failing closed");
                return ValidationResult::fail_closed(e.to_string());
            }
        };

        let score = risk::score(&violations);
        let decision = PolicyEngine::from_config(config).evaluate(&violations, score);

        tracing::debug!(
            violations = violations.len(),
            risk_score = score,
            classification = %decision.classification,
            recommendation = %decision.recommendation,
            "Payload validated"
        );

        if config.log_violations {
            self.audit_violations(&violations);
        }

        ValidationResult {
            is_compliant: violations.is_empty(),
            violations,
            risk_score: score,
            data_classification: decision.classification,
            processing_recommendation: decision.recommendation,
            error: None,
        }
    }

    fn audit_violations(&self, violations: &[Violation]) {
        let timestamp = Utc::now();
        for violation in violations {
            let record = AuditRecord::new(violation, timestamp);
            if let Err(e) = self.audit.record(&record) {
                tracing::warn!(
                    error = %e,
                    field = %violation.field,
                    "Failed to record privacy violation"
                );
            }
        }
    }

    /// Build the compliance report for a result
    pub fn report(&self, result: &ValidationResult) -> ComplianceReport {
        report::report(result)
    }

    /// Current configuration snapshot
    pub fn get_config(&self) -> Arc<ValidatorConfig> {
        self.config.snapshot()
    }

    /// Merge supplied fields into the configuration
    pub fn update_config(&self, update: &ConfigUpdate) -> Result<Arc<ValidatorConfig>> {
        self.config.update(update)
    }

    /// Restore the default configuration
    pub fn reset_config(&self) -> Arc<ValidatorConfig> {
        self.config.reset()
    }

    /// Lexicon of the active detector
    pub fn lexicon(&self) -> Lexicon {
        self.detector.load().lexicon().clone()
    }

    /// Compile `lexicon` and swap it in for subsequent validations.
    ///
    /// The previous lexicon stays active if compilation fails.
    pub fn set_lexicon(&self, lexicon: Lexicon) -> Result<()> {
        let detector = Detector::new(lexicon)?;
        self.detector.store(Arc::new(detector));
        tracing::info!("Detection lexicon replaced");
        Ok(())
    }
}
