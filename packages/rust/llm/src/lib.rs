//! LLM-backed resolution and summarization for pepsum.
//!
//! Two single-turn chat completions against the same model: one resolving
//! operators to related PEP numbers, one producing per-operator summaries
//! grounded in fetched PEP text. Model output is decoded as generic JSON and
//! only the top-level shape is validated at the boundary.

mod client;
mod resolver;
mod summarizer;

pub use client::ChatClient;
pub use resolver::{parse_pep_array, resolve_related_peps};
pub use summarizer::{build_context, generate_summaries, parse_summary_map};
