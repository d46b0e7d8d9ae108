//! Privacy Guard - Privacy & Risk Classification Engine
//!
//! Privacy Guard inspects arbitrary, possibly deeply nested payloads of
//! user-authored data before they are persisted or transmitted. It detects
//! personally identifying and domain-sensitive content, aggregates the
//! findings into a bounded risk score, assigns a sensitivity tier and
//! recommends how the data should be handled.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                        PrivacyValidator                           │
//! │                                                                   │
//! │   ConfigStore (ArcSwap<ValidatorConfig>)    Lexicon → Detector    │
//! │            │                                        │             │
//! │            ▼                                        ▼             │
//! │   ┌───────────────┐   ┌────────────┐   ┌──────────────────────┐  │
//! │   │ Payload walk  │──▶│ risk score │──▶│ PolicyEngine         │  │
//! │   │ + size check  │   │ (0..=100)  │   │ tier + recommendation│  │
//! │   └───────┬───────┘   └────────────┘   └──────────┬───────────┘  │
//! │           │ cycle / depth error                    │              │
//! │           ▼                                        ▼              │
//! │   fail-closed result                       ValidationResult ──▶ AuditSink
//! └──────────────────────────────────────────────────────────────────┘
//!                                                     │
//!                                                     ▼
//!                                             ComplianceReport
//! ```
//!
//! ## Modules
//!
//! - [`privacy`]: detection, scoring, policy, reports, audit and HTTP API
//! - [`config`]: configuration management
//! - [`error`]: error types

pub mod config;
pub mod error;
pub mod privacy;

pub use config::{AppConfig, ConfigUpdate, ValidatorConfig};
pub use error::{Error, Result};
pub use privacy::{ComplianceReport, Payload, PrivacyValidator, ValidationResult};
