//! Application configuration for pepsum.
//!
//! User config lives at `~/.pepsum/pepsum.toml`.
//! Missing file means defaults; CLI flags override nothing here because the
//! tool is deliberately flag-light.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{PepsumError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "pepsum.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".pepsum";

// ---------------------------------------------------------------------------
// Config structs (matching pepsum.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// OpenAI settings.
    #[serde(default)]
    pub openai: OpenAiConfig,

    /// PEP page fetch settings.
    #[serde(default)]
    pub fetch: FetchConfig,

    /// Summarization settings.
    #[serde(default)]
    pub summarize: SummarizeConfig,
}

/// `[openai]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiConfig {
    /// Name of the env var holding the API key (never store the key itself).
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Chat model used for both resolution and summarization.
    #[serde(default = "default_model")]
    pub model: String,

    /// API base URL (overridable for proxies and tests).
    #[serde(default = "default_openai_base_url")]
    pub base_url: String,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_api_key_env(),
            model: default_model(),
            base_url: default_openai_base_url(),
        }
    }
}

fn default_api_key_env() -> String {
    "OPENAI_API_KEY".into()
}
fn default_model() -> String {
    "gpt-3.5-turbo".into()
}
fn default_openai_base_url() -> String {
    "https://api.openai.com/v1".into()
}

/// `[fetch]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Base URL of the PEP index site.
    #[serde(default = "default_pep_base_url")]
    pub base_url: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            base_url: default_pep_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_pep_base_url() -> String {
    "https://peps.python.org".into()
}
fn default_timeout_secs() -> u64 {
    30
}

/// `[summarize]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummarizeConfig {
    /// Character budget for the concatenated PEP context in the
    /// summarization prompt. PEP text past this is truncated with a marker.
    #[serde(default = "default_max_context_chars")]
    pub max_context_chars: usize,
}

impl Default for SummarizeConfig {
    fn default() -> Self {
        Self {
            max_context_chars: default_max_context_chars(),
        }
    }
}

fn default_max_context_chars() -> usize {
    48_000
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.pepsum/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| PepsumError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.pepsum/pepsum.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| PepsumError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| PepsumError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| PepsumError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| PepsumError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| PepsumError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

/// Read the OpenAI API key from the configured env var.
///
/// Called before any network activity so a missing key fails fast with a
/// distinct diagnostic instead of surfacing as an HTTP 401 later.
pub fn require_api_key(config: &AppConfig) -> Result<String> {
    let var_name = &config.openai.api_key_env;
    match std::env::var(var_name) {
        Ok(val) if !val.is_empty() => Ok(val),
        _ => Err(PepsumError::credential(var_name)),
    }
}
