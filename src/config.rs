//! Privacy guard configuration management

use crate::error::{Error, Result};
use crate::privacy::lexicon::Lexicon;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;

/// Primitive type names accepted in `allowed_data_types`
pub const PRIMITIVE_TYPES: &[&str] = &["string", "number", "boolean", "null"];

/// Default payload size ceiling (1 MiB)
pub const DEFAULT_MAX_DATA_SIZE: u64 = 1024 * 1024;

/// Default score at which a payload without anonymizable findings is
/// recommended for encryption.
pub const DEFAULT_ENCRYPT_THRESHOLD: u8 = 25;

/// Main configuration file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Validation policy
    pub validator: ValidatorConfig,

    /// Keyword lexicon overrides
    pub lexicon: LexiconConfig,

    /// HTTP API configuration
    pub gateway: GatewayConfig,

    /// Audit log configuration
    pub audit: AuditConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&content)?;
        config.validator.validate()?;
        Ok(config)
    }

    /// Render as pretty TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::Config(e.to_string()))
    }
}

/// Active validation policy.
///
/// Snapshots are immutable once published; see
/// [`ConfigStore`](crate::privacy::ConfigStore) for updates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ValidatorConfig {
    /// Strict validation mode
    pub strict_mode: bool,

    /// Primitive type names payloads may carry
    pub allowed_data_types: BTreeSet<String>,

    /// Size ceiling for the canonical payload encoding, in bytes
    pub max_data_size: u64,

    /// Escalate findings that would otherwise be allowed to encryption
    pub require_encryption: bool,

    /// Emit an audit record for every violation
    pub log_violations: bool,

    /// Minimum risk score recommended for encryption when no finding
    /// calls for anonymization
    pub encrypt_threshold: u8,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            strict_mode: true,
            allowed_data_types: ["string", "number", "boolean"]
                .iter()
                .map(|t| t.to_string())
                .collect(),
            max_data_size: DEFAULT_MAX_DATA_SIZE,
            require_encryption: false,
            log_violations: true,
            encrypt_threshold: DEFAULT_ENCRYPT_THRESHOLD,
        }
    }
}

impl ValidatorConfig {
    /// Check invariants of a complete configuration
    pub fn validate(&self) -> Result<()> {
        if self.max_data_size == 0 {
            return Err(Error::Config("maxDataSize must be positive".to_string()));
        }
        if self.encrypt_threshold > 100 {
            return Err(Error::Config(format!(
                "encryptThreshold must be within 0..=100, got {}",
                self.encrypt_threshold
            )));
        }
        check_type_names(&self.allowed_data_types)
    }
}

fn check_type_names<'a, I>(names: I) -> Result<()>
where
    I: IntoIterator<Item = &'a String>,
{
    for name in names {
        if !PRIMITIVE_TYPES.contains(&name.as_str()) {
            return Err(Error::Config(format!(
                "Unknown data type '{}'. Valid: {}",
                name,
                PRIMITIVE_TYPES.join(", ")
            )));
        }
    }
    Ok(())
}

/// Partial configuration update; absent fields keep their current value
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigUpdate {
    pub strict_mode: Option<bool>,
    pub allowed_data_types: Option<BTreeSet<String>>,
    pub max_data_size: Option<i64>,
    pub require_encryption: Option<bool>,
    pub log_violations: Option<bool>,
    pub encrypt_threshold: Option<i64>,
}

impl ConfigUpdate {
    /// Check the supplied fields without touching any configuration
    pub fn validate(&self) -> Result<()> {
        if let Some(size) = self.max_data_size {
            if size <= 0 {
                return Err(Error::Config(format!(
                    "maxDataSize must be positive, got {}",
                    size
                )));
            }
        }
        if let Some(threshold) = self.encrypt_threshold {
            if !(0..=100).contains(&threshold) {
                return Err(Error::Config(format!(
                    "encryptThreshold must be within 0..=100, got {}",
                    threshold
                )));
            }
        }
        if let Some(types) = &self.allowed_data_types {
            check_type_names(types)?;
        }
        Ok(())
    }

    /// Produce the merged configuration.
    ///
    /// Callers must run [`validate`](Self::validate) first; out-of-range
    /// numbers are clamped here.
    pub fn apply(&self, current: &ValidatorConfig) -> ValidatorConfig {
        let mut next = current.clone();
        if let Some(strict) = self.strict_mode {
            next.strict_mode = strict;
        }
        if let Some(types) = &self.allowed_data_types {
            next.allowed_data_types = types.clone();
        }
        if let Some(size) = self.max_data_size {
            next.max_data_size = size.max(1) as u64;
        }
        if let Some(required) = self.require_encryption {
            next.require_encryption = required;
        }
        if let Some(log) = self.log_violations {
            next.log_violations = log;
        }
        if let Some(threshold) = self.encrypt_threshold {
            next.encrypt_threshold = threshold.clamp(0, 100) as u8;
        }
        next
    }

    /// Whether the update carries no fields
    pub fn is_empty(&self) -> bool {
        self.strict_mode.is_none()
            && self.allowed_data_types.is_none()
            && self.max_data_size.is_none()
            && self.require_encryption.is_none()
            && self.log_violations.is_none()
            && self.encrypt_threshold.is_none()
    }
}

/// Keyword lexicon configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LexiconConfig {
    /// Use only the terms listed here instead of extending the built-ins
    pub replace_defaults: bool,

    /// Additional explicit-content terms
    pub explicit_terms: Vec<String>,

    /// Additional relapse terms
    pub relapse_terms: Vec<String>,
}

impl LexiconConfig {
    /// Build the effective lexicon
    pub fn to_lexicon(&self) -> Lexicon {
        let base = if self.replace_defaults {
            Lexicon::empty()
        } else {
            Lexicon::default()
        };
        base.extend(
            self.explicit_terms.iter().cloned(),
            self.relapse_terms.iter().cloned(),
        )
    }
}

/// HTTP API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Host to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 18791,
        }
    }
}

/// Audit log configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    /// Number of records kept in memory
    pub capacity: usize,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self { capacity: 1000 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.validator.max_data_size, 1024 * 1024);
        assert_eq!(config.validator.encrypt_threshold, 25);
        assert!(config.validator.log_violations);
        assert!(!config.validator.require_encryption);
        assert!(config.validator.allowed_data_types.contains("string"));
        assert_eq!(config.gateway.port, 18791);
        assert!(config.validator.validate().is_ok());
    }

    #[test]
    fn test_update_merges_only_supplied_fields() {
        let current = ValidatorConfig::default();
        let update = ConfigUpdate {
            max_data_size: Some(2048),
            ..Default::default()
        };
        update.validate().unwrap();
        let next = update.apply(&current);
        assert_eq!(next.max_data_size, 2048);
        assert_eq!(next.strict_mode, current.strict_mode);
        assert_eq!(next.allowed_data_types, current.allowed_data_types);
        assert_eq!(next.require_encryption, current.require_encryption);
        assert_eq!(next.log_violations, current.log_violations);
        assert_eq!(next.encrypt_threshold, current.encrypt_threshold);
    }

    #[test]
    fn test_update_rejects_negative_size() {
        let update = ConfigUpdate {
            max_data_size: Some(-1),
            ..Default::default()
        };
        assert!(matches!(update.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_update_rejects_bad_threshold_and_types() {
        let update = ConfigUpdate {
            encrypt_threshold: Some(101),
            ..Default::default()
        };
        assert!(update.validate().is_err());

        let update = ConfigUpdate {
            allowed_data_types: Some(["blob".to_string()].into_iter().collect()),
            ..Default::default()
        };
        assert!(update.validate().is_err());
    }

    #[test]
    fn test_update_request_json() {
        let json = r#"{"maxDataSize":512,"logViolations":false}"#;
        let update: ConfigUpdate = serde_json::from_str(json).unwrap();
        assert_eq!(update.max_data_size, Some(512));
        assert_eq!(update.log_violations, Some(false));
        assert!(update.strict_mode.is_none());
        assert!(!update.is_empty());
        assert!(ConfigUpdate::default().is_empty());
    }

    #[test]
    fn test_validator_config_wire_names() {
        let json = serde_json::to_string(&ValidatorConfig::default()).unwrap();
        assert!(json.contains("\"maxDataSize\":1048576"));
        assert!(json.contains("\"allowedDataTypes\":[\"boolean\",\"number\",\"string\"]"));
    }

    #[test]
    fn test_lexicon_config() {
        let config = LexiconConfig {
            replace_defaults: true,
            explicit_terms: vec!["lewd".to_string()],
            relapse_terms: vec![],
        };
        let lexicon = config.to_lexicon();
        assert_eq!(lexicon.explicit_terms, vec!["lewd".to_string()]);
        assert!(lexicon.relapse_terms.is_empty());

        let extended = LexiconConfig {
            relapse_terms: vec!["doomscroll".to_string()],
            ..Default::default()
        }
        .to_lexicon();
        assert!(extended.relapse_terms.len() > 1);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[validator]
maxDataSize = 4096
logViolations = false

[gateway]
port = 9000

[lexicon]
replaceDefaults = true
relapseTerms = ["doomscroll"]
"#
        )
        .unwrap();

        let config = AppConfig::load(file.path()).unwrap();
        assert_eq!(config.validator.max_data_size, 4096);
        assert!(!config.validator.log_violations);
        assert!(config.validator.strict_mode);
        assert_eq!(config.gateway.port, 9000);
        assert_eq!(config.gateway.host, "127.0.0.1");
        assert_eq!(config.audit.capacity, 1000);
        assert!(config.lexicon.replace_defaults);
        assert_eq!(config.lexicon.relapse_terms, vec!["doomscroll".to_string()]);
    }

    #[test]
    fn test_config_keys_are_camel_case() {
        let toml = AppConfig::default().to_toml().unwrap();
        assert!(toml.contains("replaceDefaults"));
        assert!(toml.contains("relapseTerms"));
        assert!(!toml.contains("relapse_terms"));
        assert!(toml.contains("requireEncryption = false"));
    }

    #[test]
    fn test_load_rejects_zero_size() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[validator]\nmaxDataSize = 0").unwrap();
        assert!(matches!(
            AppConfig::load(file.path()),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_toml_round_trip_of_defaults() {
        let toml = AppConfig::default().to_toml().unwrap();
        assert!(toml.contains("[validator]"));
        assert!(toml.contains("maxDataSize"));
    }
}
