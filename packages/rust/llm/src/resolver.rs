//! PEP resolution: ask the model which PEPs relate to the given operators.

use serde_json::Value;
use tracing::{debug, instrument};

use pepsum_shared::{OperatorList, PepNumber, PepsumError, Result};

use crate::client::ChatClient;

/// Ask the model for PEP numbers related to `operators`.
///
/// The raw response must decode to a JSON array of positive integers;
/// anything else is a [`PepsumError::Parse`]. Order and duplicates are
/// preserved exactly as the model returned them. An empty array is a valid
/// answer meaning "no related PEPs".
#[instrument(skip_all, fields(operators = %operators))]
pub async fn resolve_related_peps(
    client: &ChatClient,
    operators: &OperatorList,
) -> Result<Vec<PepNumber>> {
    let prompt = resolver_prompt(operators);
    let raw = client.complete(&prompt).await?;
    let numbers = parse_pep_array(&raw)?;

    debug!(count = numbers.len(), "resolved related PEPs");
    Ok(numbers)
}

/// System prompt for the resolution call.
fn resolver_prompt(operators: &OperatorList) -> String {
    format!(
        "You are an AI assistant that specializes in looking up Python Enhancement \
         Proposals (PEPs) related to specific Python operators and functions.\n\
         Given the following comma-separated list of operators/functions, return the \
         PEP numbers most closely related to each one as a JSON array of integers. \
         If no closely related PEPs are found, return an empty array. Respond with \
         the JSON array only, no prose.\n\n\
         Operators/functions: {}",
        operators.joined()
    )
}

/// Parse the model's response as a JSON array of PEP numbers.
pub fn parse_pep_array(raw: &str) -> Result<Vec<PepNumber>> {
    let value: Value = serde_json::from_str(raw.trim())
        .map_err(|e| PepsumError::parse(format!("resolver response is not valid JSON: {e}")))?;

    match value {
        Value::Array(items) => items
            .iter()
            .map(|item| {
                item.as_u64().and_then(PepNumber::new).ok_or_else(|| {
                    PepsumError::parse(format!(
                        "resolver array element is not a positive integer: {item}"
                    ))
                })
            })
            .collect(),
        other => Err(PepsumError::parse(format!(
            "resolver response must be a JSON array, got: {}",
            shape_name(&other)
        ))),
    }
}

/// Human-readable name for a JSON value's shape, used in parse diagnostics.
pub(crate) fn shape_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
