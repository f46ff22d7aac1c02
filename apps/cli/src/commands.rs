//! CLI command definitions, routing, tracing setup, and output rendering.

use std::io::Write as _;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use pepsum_core::{PipelineResult, ProgressReporter};
use pepsum_shared::{
    AppConfig, OperatorList, PepNumber, SummaryMap, init_config, load_config, require_api_key,
};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// pepsum — PEP-grounded summaries of Python operators and functions.
#[derive(Parser)]
#[command(
    name = "pepsum",
    version,
    about = "Summarize Python operators/functions using related PEPs as grounding context.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Resolve related PEPs and print per-operator summaries.
    Run {
        /// Comma-separated operator/function names. Read from stdin when omitted.
        operators: Option<String>,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "pepsum=info",
        1 => "pepsum=debug",
        _ => "pepsum=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt().json().with_env_filter(env_filter).init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Run { operators } => cmd_run(operators.as_deref()).await,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init().await,
            ConfigAction::Show => cmd_config_show().await,
        },
    }
}

// ---------------------------------------------------------------------------
// run
// ---------------------------------------------------------------------------

async fn cmd_run(operators: Option<&str>) -> Result<()> {
    // Validate the API key before doing anything else
    let config = load_config()?;
    let api_key = require_api_key(&config)?;

    let raw = match operators {
        Some(s) => s.to_string(),
        None => read_operators_from_stdin()?,
    };

    let operators = OperatorList::parse(&raw)?;
    println!("Looking up related PEPs for: {operators}");

    info!(operators = %operators, model = %config.openai.model, "starting run");

    let reporter = CliProgress::new();
    let result = pepsum_core::run(&config, &api_key, operators, &reporter).await?;

    render_result(&result);
    Ok(())
}

/// Prompt for and read a single input line from stdin.
fn read_operators_from_stdin() -> Result<String> {
    print!("Enter a comma-separated list of Python operators/functions: ");
    std::io::stdout().flush()?;

    let mut line = String::new();
    std::io::stdin()
        .read_line(&mut line)
        .map_err(|e| eyre!("failed to read stdin: {e}"))?;
    Ok(line)
}

/// Print the run outcome as human-readable text.
fn render_result(result: &PipelineResult) {
    let Some(summaries) = &result.summaries else {
        println!("No related PEPs found.");
        return;
    };

    let numbers: Vec<String> = result.pep_numbers.iter().map(PepNumber::to_string).collect();
    println!("Found related PEPs: [{}]", numbers.join(", "));

    println!();
    println!("Summaries:");

    // Input order first, then anything the model volunteered on top.
    for name in result.operators.names() {
        render_operator(summaries, name);
    }
    let extras: Vec<String> = summaries
        .extra_keys(result.operators.names())
        .map(String::from)
        .collect();
    for name in &extras {
        render_operator(summaries, name);
    }
}

/// Print one operator's summary sections.
fn render_operator(summaries: &SummaryMap, name: &str) {
    let Some(sections) = summaries.sections(name) else {
        println!("{name}: (no summary returned)");
        println!();
        return;
    };

    println!("{name}:");
    for (title, text) in sections {
        if !title.is_empty() {
            println!("{title}:");
            println!();
        }
        println!("{text}");
        println!();
    }
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap()
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn pep_fetched(&self, number: PepNumber, current: usize, total: usize) {
        self.spinner
            .set_message(format!("Fetching [{current}/{total}] PEP {number}"));
    }

    fn done(&self, _result: &PipelineResult) {
        self.spinner.finish_and_clear();
    }
}

// ---------------------------------------------------------------------------
// config
// ---------------------------------------------------------------------------

async fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

async fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}
