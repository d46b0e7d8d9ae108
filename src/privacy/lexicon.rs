//! Keyword lexicon for the sensitive-content matchers
//!
//! The explicit-content and relapse matchers are driven by term lists rather
//! than inline literals, so the vocabulary can be replaced or extended from
//! configuration without touching the detection code.

use crate::error::{Error, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Built-in explicit/adult-content terms
const EXPLICIT_TERMS: &[&str] = &[
    "porn",
    "porno",
    "pornography",
    "xxx",
    "nsfw",
    "nude",
    "nudes",
    "naked",
    "sexting",
    "hentai",
    "onlyfans",
    "adult content",
    "explicit content",
    "adult site",
    "adult video",
];

/// Built-in setback/relapse vocabulary
const RELAPSE_TERMS: &[&str] = &[
    "relapse",
    "relapsed",
    "relapsing",
    "slipped up",
    "slip up",
    "slip-up",
    "gave in",
    "give in",
    "binge",
    "binged",
    "fell off the wagon",
    "broke my streak",
    "lost my streak",
    "streak reset",
    "urge",
    "urges",
    "craving",
    "cravings",
    "triggered",
];

/// Term lists for the keyword matchers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Lexicon {
    /// Explicit/adult-content terms
    pub explicit_terms: Vec<String>,
    /// Setback/relapse terms
    pub relapse_terms: Vec<String>,
}

impl Default for Lexicon {
    fn default() -> Self {
        Self {
            explicit_terms: EXPLICIT_TERMS.iter().map(|t| t.to_string()).collect(),
            relapse_terms: RELAPSE_TERMS.iter().map(|t| t.to_string()).collect(),
        }
    }
}

impl Lexicon {
    /// A lexicon with no terms; both keyword matchers are disabled.
    pub fn empty() -> Self {
        Self {
            explicit_terms: Vec::new(),
            relapse_terms: Vec::new(),
        }
    }

    /// Add terms to both lists, skipping duplicates (case-insensitive).
    pub fn extend<E, R>(mut self, explicit: E, relapse: R) -> Self
    where
        E: IntoIterator,
        E::Item: Into<String>,
        R: IntoIterator,
        R::Item: Into<String>,
    {
        merge_terms(&mut self.explicit_terms, explicit);
        merge_terms(&mut self.relapse_terms, relapse);
        self
    }

    /// Compile the explicit-content list, `None` when the list is empty
    pub(crate) fn explicit_matcher(&self) -> Result<Option<Regex>> {
        compile_terms("explicit", &self.explicit_terms)
    }

    /// Compile the relapse list, `None` when the list is empty
    pub(crate) fn relapse_matcher(&self) -> Result<Option<Regex>> {
        compile_terms("relapse", &self.relapse_terms)
    }
}

fn merge_terms<I>(terms: &mut Vec<String>, extra: I)
where
    I: IntoIterator,
    I::Item: Into<String>,
{
    for term in extra {
        let term = term.into();
        let exists = terms.iter().any(|t| t.eq_ignore_ascii_case(&term));
        if !exists && !term.trim().is_empty() {
            terms.push(term);
        }
    }
}

/// Build a case-insensitive alternation over the terms.
///
/// A term edge that is a word character is anchored with `\b`; symbol edges
/// such as the `+` in `18+` are matched as written.
fn compile_terms(list: &str, terms: &[String]) -> Result<Option<Regex>> {
    let alternatives: Vec<String> = terms
        .iter()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .map(bounded_term)
        .collect();

    if alternatives.is_empty() {
        return Ok(None);
    }

    let pattern = format!(r"(?i)(?:{})", alternatives.join("|"));
    Regex::new(&pattern)
        .map(Some)
        .map_err(|e| Error::Lexicon(format!("Invalid {} term list: {}", list, e)))
}

fn bounded_term(term: &str) -> String {
    let is_word = |c: char| c.is_alphanumeric() || c == '_';
    let escaped = regex::escape(term).replace(' ', r"\s+");

    let start = if term.starts_with(is_word) { r"\b" } else { "" };
    let end = if term.ends_with(is_word) { r"\b" } else { "" };
    format!("{}{}{}", start, escaped, end)
}
