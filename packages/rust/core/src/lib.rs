//! Pipeline orchestration for pepsum.
//!
//! Glues the resolver, fetcher, and summarizer into the strict
//! resolve → fetch × N → summarize sequence.

pub mod pipeline;

pub use pipeline::{PipelineResult, ProgressReporter, SilentProgress, run};
