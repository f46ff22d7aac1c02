//! Summary generation: ask the model for per-operator summaries grounded in
//! fetched PEP text.

use serde_json::Value;
use tracing::{debug, instrument};

use pepsum_shared::{OperatorList, PepsumError, Result, SummaryMap};

use crate::client::ChatClient;
use crate::resolver::shape_name;

/// Marker appended when the PEP context exceeds the character budget.
const TRUNCATION_MARKER: &str = "\n\n[... PEP context truncated ...]";

/// Generate a structured summary per operator, using the fetched PEP texts
/// as grounding context.
///
/// The response must decode to a JSON object keyed by operator name; the
/// nested shape is not validated. Keys are not checked against `operators`.
#[instrument(skip_all, fields(operators = %operators, peps = pep_contents.len()))]
pub async fn generate_summaries(
    client: &ChatClient,
    operators: &OperatorList,
    pep_contents: &[String],
    max_context_chars: usize,
) -> Result<SummaryMap> {
    let context = build_context(pep_contents, max_context_chars);
    let prompt = summarizer_prompt(operators, &context);

    let raw = client.complete(&prompt).await?;
    let summaries = parse_summary_map(&raw)?;

    debug!(entries = summaries.len(), "summaries generated");
    Ok(summaries)
}

/// Join PEP texts with blank-line separators, capped at `max_chars`.
///
/// Empty contents (soft-failed fetches) contribute nothing but preserve the
/// separator spacing. The cap guards the otherwise unbounded prompt growth
/// from long PEPs.
pub fn build_context(pep_contents: &[String], max_chars: usize) -> String {
    let joined = pep_contents.join("\n\n");
    if joined.len() <= max_chars {
        return joined;
    }

    // Cut on a char boundary at or below the budget.
    let mut cut = max_chars;
    while !joined.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}{TRUNCATION_MARKER}", &joined[..cut])
}

/// System prompt for the summarization call.
fn summarizer_prompt(operators: &OperatorList, pep_context: &str) -> String {
    format!(
        "You are an AI coding assistant that generates detailed summaries of Python \
         operators and functions, using related Python Enhancement Proposals (PEPs) \
         as context.\n\
         For each operator/function in the following comma-separated list, generate a \
         human-readable summary covering:\n\
         1. General description\n\
         2. Code examples\n\
         3. Best practices and anti-patterns\n\
         4. Summary of additions/changes in the provided PEPs\n\n\
         Format the output as a single JSON object whose keys are the \
         operator/function names and whose values are objects mapping each section \
         title above to its text. Respond with the JSON object only, no prose.\n\n\
         Operators/functions: {}\n\n\
         PEP Context:\n{}",
        operators.joined(),
        pep_context
    )
}

/// Parse the model's response as a JSON object of per-operator summaries.
pub fn parse_summary_map(raw: &str) -> Result<SummaryMap> {
    let value: Value = serde_json::from_str(raw.trim())
        .map_err(|e| PepsumError::parse(format!("summarizer response is not valid JSON: {e}")))?;

    match value {
        Value::Object(map) => Ok(SummaryMap::from_object(map)),
        other => Err(PepsumError::parse(format!(
            "summarizer response must be a JSON object, got: {}",
            shape_name(&other)
        ))),
    }
}
