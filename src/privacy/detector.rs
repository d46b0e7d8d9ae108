//! Pattern detection over payload trees
//!
//! Every string leaf is scanned by a fixed, ordered set of matchers. Each
//! matcher fires at most once per leaf, so a leaf produces between zero and
//! eight violations. After traversal the canonical encoding of the whole
//! payload is measured against the configured size ceiling.

use crate::config::ValidatorConfig;
use crate::error::{Error, Result};
use crate::privacy::lexicon::Lexicon;
use crate::privacy::payload::{Leaf, Payload, PayloadVisitor};
use crate::privacy::types::{Violation, ViolationField};
use regex::Regex;

const EMAIL_PATTERN: &str = r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}";

const PHONE_PATTERN: &str = r"(?:\(\d{3}\)\s?|\b\d{3}[-.\s]?)\d{3}[-.\s]?\d{4}\b";

const SSN_PATTERN: &str = r"\b\d{3}-\d{2}-\d{4}\b";

const NAME_PATTERN: &str = r"\b[A-Z][a-z]+\s+[A-Z][a-z]+\b";

const TIME_PATTERN: &str = concat!(
    r"(?i)\b(?:",
    r"(?:[01]?\d|2[0-3]):[0-5]\d(?:\s?[ap]m)?",
    r"|(?:1[0-2]|0?[1-9])\s?[ap]m",
    r"|(?:every|each|last|late)\s+(?:night|morning|evening|afternoon|weekend)",
    r"|at\s+night|midnight|bedtime",
    r")\b"
);

const ROUTINE_PATTERN: &str = concat!(
    r"(?i)\b(?:",
    r"at\s+home",
    r"|in\s+my\s+(?:bed|bedroom|room|car|office|bathroom|dorm)",
    r"|usually|always|every\s+day|daily|on\s+weekends",
    r"|when\s+i(?:'m|\s+am)\s+alone|by\s+myself",
    r")\b"
);

struct CompiledMatcher {
    field: ViolationField,
    pattern: Regex,
}

/// Compiled matcher set used to scan payloads
pub struct Detector {
    matchers: Vec<CompiledMatcher>,
    lexicon: Lexicon,
}

impl Detector {
    /// Compile the built-in patterns together with the lexicon's term lists.
    pub fn new(lexicon: Lexicon) -> Result<Self> {
        let mut matchers = Vec::with_capacity(8);

        let fixed = [
            (ViolationField::Email, EMAIL_PATTERN),
            (ViolationField::Phone, PHONE_PATTERN),
            (ViolationField::Ssn, SSN_PATTERN),
            (ViolationField::Name, NAME_PATTERN),
        ];
        for (field, pattern) in fixed {
            matchers.push(compile(field, pattern)?);
        }

        if let Some(pattern) = lexicon.explicit_matcher()? {
            matchers.push(CompiledMatcher {
                field: ViolationField::ExplicitContent,
                pattern,
            });
        }
        if let Some(pattern) = lexicon.relapse_matcher()? {
            matchers.push(CompiledMatcher {
                field: ViolationField::RelapseTerms,
                pattern,
            });
        }

        matchers.push(compile(ViolationField::TimePatterns, TIME_PATTERN)?);
        matchers.push(compile(ViolationField::RoutinePatterns, ROUTINE_PATTERN)?);

        Ok(Self { matchers, lexicon })
    }

    /// The lexicon this detector was compiled from
    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }

    /// Run every matcher against one string, in matcher order.
    pub fn scan_text(&self, text: &str) -> Vec<Violation> {
        let mut violations = Vec::new();
        self.scan_into(text, &mut violations);
        violations
    }

    fn scan_into(&self, text: &str, out: &mut Vec<Violation>) {
        if text.is_empty() {
            return;
        }
        for matcher in &self.matchers {
            if matcher.pattern.is_match(text) {
                out.push(Violation::for_field(matcher.field));
            }
        }
    }

    /// Detect violations anywhere in the payload.
    ///
    /// Structural failures (cycles, excessive nesting) are returned as
    /// errors rather than violations.
    pub fn detect(&self, payload: &Payload, config: &ValidatorConfig) -> Result<Vec<Violation>> {
        let mut scanner = LeafScanner {
            detector: self,
            violations: Vec::new(),
        };
        payload.walk(&mut scanner)?;

        // Absent and empty payloads are always clean, whatever the ceiling.
        if !payload.is_vacuous() {
            let size = payload.canonical_size()?;
            if size as u64 > config.max_data_size {
                scanner
                    .violations
                    .push(Violation::for_field(ViolationField::Size));
            }
        }

        Ok(scanner.violations)
    }
}

impl std::fmt::Debug for Detector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Detector")
            .field(
                "matchers",
                &self.matchers.iter().map(|m| m.field).collect::<Vec<_>>(),
            )
            .finish()
    }
}

fn compile(field: ViolationField, pattern: &str) -> Result<CompiledMatcher> {
    let pattern = Regex::new(pattern).map_err(|e| {
        Error::Lexicon(format!("Invalid regex pattern for matcher '{}': {}", field, e))
    })?;
    Ok(CompiledMatcher { field, pattern })
}

struct LeafScanner<'a> {
    detector: &'a Detector,
    violations: Vec<Violation>,
}

impl PayloadVisitor for LeafScanner<'_> {
    fn visit_leaf(&mut self, leaf: Leaf<'_>) -> Result<()> {
        if let Leaf::String(text) = leaf {
            self.detector.scan_into(text, &mut self.violations);
        }
        Ok(())
    }
}
