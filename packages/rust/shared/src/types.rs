//! Core domain types for the PEP summary pipeline.

use serde_json::Value;

use crate::error::{PepsumError, Result};

// ---------------------------------------------------------------------------
// OperatorList
// ---------------------------------------------------------------------------

/// An ordered list of Python operator/function names, parsed from a
/// comma-separated input line. Entries are trimmed; empty entries are
/// dropped. Immutable after parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperatorList(Vec<String>);

impl OperatorList {
    /// Parse a raw comma-separated line into an operator list.
    ///
    /// Fails if no non-empty entries remain after trimming.
    pub fn parse(input: &str) -> Result<Self> {
        let names: Vec<String> = input
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect();

        if names.is_empty() {
            return Err(PepsumError::config(
                "no operators given: expected a comma-separated list like 'map, filter'",
            ));
        }

        Ok(Self(names))
    }

    /// The operator names, in input order.
    pub fn names(&self) -> &[String] {
        &self.0
    }

    /// The comma-joined form embedded in LLM prompts.
    pub fn joined(&self) -> String {
        self.0.join(", ")
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for OperatorList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.joined())
    }
}

// ---------------------------------------------------------------------------
// PepNumber
// ---------------------------------------------------------------------------

/// A positive integer identifying a Python Enhancement Proposal.
///
/// Produced only by the resolver's parsed output; not validated against any
/// known PEP range beyond being positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PepNumber(u32);

impl PepNumber {
    /// Build from a raw integer, rejecting zero and out-of-range values.
    pub fn new(raw: u64) -> Option<Self> {
        if raw == 0 {
            return None;
        }
        u32::try_from(raw).ok().map(Self)
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for PepNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// SummaryMap
// ---------------------------------------------------------------------------

/// The summarizer's output: operator name → summary.
///
/// Only the top-level shape (a JSON object) is validated at the parse
/// boundary. Each value is expected to be a nested object mapping section
/// title → section text, but the model's nested shape is not enforced;
/// [`SummaryMap::sections`] renders whatever came back best-effort.
///
/// Keys are not validated against the input operator list either — callers
/// iterate their own operator order and look names up here.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SummaryMap(serde_json::Map<String, Value>);

impl SummaryMap {
    pub fn from_object(map: serde_json::Map<String, Value>) -> Self {
        Self(map)
    }

    /// The raw summary value for one operator, if the model produced one.
    pub fn get(&self, operator: &str) -> Option<&Value> {
        self.0.get(operator)
    }

    /// Keys present in the model's output but absent from `known`, so the
    /// caller can still surface summaries for names it did not ask about.
    pub fn extra_keys<'a>(&'a self, known: &'a [String]) -> impl Iterator<Item = &'a str> {
        self.0
            .keys()
            .filter(|k| !known.iter().any(|n| n == *k))
            .map(String::as_str)
    }

    /// Render one operator's summary as `(section title, section text)`
    /// pairs. A nested object yields one pair per entry; a bare string
    /// yields a single untitled section; anything else is serialized as-is.
    pub fn sections(&self, operator: &str) -> Option<Vec<(String, String)>> {
        let value = self.0.get(operator)?;
        Some(match value {
            Value::Object(sections) => sections
                .iter()
                .map(|(title, text)| (title.clone(), render_section_text(text)))
                .collect(),
            Value::String(text) => vec![(String::new(), text.clone())],
            other => vec![(String::new(), other.to_string())],
        })
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Section bodies are usually strings, but the model occasionally nests
/// arrays (e.g. a list of code examples). Flatten those readably.
fn render_section_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(render_section_text)
            .collect::<Vec<_>>()
            .join("\n"),
        other => other.to_string(),
    }
}
