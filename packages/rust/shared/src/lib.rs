//! Shared types, error model, and configuration for pepsum.
//!
//! This crate is the foundation depended on by all other pepsum crates.
//! It provides:
//! - [`PepsumError`] — the unified error type
//! - Domain types ([`OperatorList`], [`PepNumber`], [`SummaryMap`])
//! - Configuration ([`AppConfig`], config loading, API-key validation)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, FetchConfig, OpenAiConfig, SummarizeConfig, config_dir, config_file_path,
    init_config, load_config, load_config_from, require_api_key,
};
pub use error::{PepsumError, Result};
pub use types::{OperatorList, PepNumber, SummaryMap};
