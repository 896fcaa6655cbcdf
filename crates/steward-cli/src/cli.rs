//! CLI argument definitions using clap.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

use crate::logging::LogFormat;

/// Steward: data-quality and privacy profiling for tabular data
#[derive(Parser)]
#[command(name = "steward")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// TOML configuration file
    #[arg(long, global = true, value_name = "TOML")]
    pub config: Option<PathBuf>,

    /// Log output format
    #[arg(long, global = true, default_value = "compact")]
    pub log_format: LogFormat,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Score data quality and show the profiling breakdown
    Quality {
        /// Path to the data file (CSV/TSV)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Print the full report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Propose one handling action per column
    Recommend {
        /// Path to the data file (CSV/TSV)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Judge to arbitrate between candidates
        #[arg(long, default_value = "none")]
        judge: JudgeChoice,

        /// Model to use (provider-specific, e.g. "gpt-4o-mini", "llama3.2")
        #[arg(long)]
        model: Option<String>,

        /// Send every column to the judge in one request
        #[arg(long)]
        batch: bool,

        /// Write the recommendations as JSON to this file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print the recommendations as JSON
        #[arg(long)]
        json: bool,
    },

    /// Merge feedback and write the transformed data
    Apply {
        /// Path to the data file (CSV/TSV)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Per-column feedback JSON (manual choices and/or judge plans)
        #[arg(long, value_name = "JSON")]
        feedback: PathBuf,

        /// Output path for the transformed data (default: <file>.steward.<format>)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format
        #[arg(short, long, default_value = "csv")]
        format: OutputFormatChoice,

        /// Write the application report as JSON to this file
        #[arg(long)]
        report: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, Debug, Default)]
pub enum OutputFormatChoice {
    #[default]
    Csv,
    Tsv,
    Json,
}

impl std::str::FromStr for OutputFormatChoice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(OutputFormatChoice::Csv),
            "tsv" => Ok(OutputFormatChoice::Tsv),
            "json" => Ok(OutputFormatChoice::Json),
            _ => Err(format!("Unknown format: {}. Use csv, tsv, or json.", s)),
        }
    }
}

impl std::fmt::Display for OutputFormatChoice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormatChoice::Csv => write!(f, "csv"),
            OutputFormatChoice::Tsv => write!(f, "tsv"),
            OutputFormatChoice::Json => write!(f, "json"),
        }
    }
}

impl From<OutputFormatChoice> for steward::OutputFormat {
    fn from(choice: OutputFormatChoice) -> Self {
        match choice {
            OutputFormatChoice::Csv => steward::OutputFormat::Csv,
            OutputFormatChoice::Tsv => steward::OutputFormat::Tsv,
            OutputFormatChoice::Json => steward::OutputFormat::Json,
        }
    }
}

/// Judge provider choice for recommendations
#[derive(Clone, Debug, Default)]
pub enum JudgeChoice {
    /// No judge - candidates only
    #[default]
    None,
    /// OpenAI-compatible API (requires OPENAI_API_KEY)
    OpenAI,
    /// Ollama local models (requires Ollama running)
    Ollama,
    /// Mock judge that accepts the first candidate
    Mock,
}

impl std::str::FromStr for JudgeChoice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" => Ok(JudgeChoice::None),
            "openai" | "gpt" => Ok(JudgeChoice::OpenAI),
            "ollama" | "local" => Ok(JudgeChoice::Ollama),
            "mock" | "test" => Ok(JudgeChoice::Mock),
            _ => Err(format!(
                "Unknown judge: {}. Use: none, openai, ollama, or mock.",
                s
            )),
        }
    }
}

impl std::fmt::Display for JudgeChoice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JudgeChoice::None => write!(f, "none"),
            JudgeChoice::OpenAI => write!(f, "openai"),
            JudgeChoice::Ollama => write!(f, "ollama"),
            JudgeChoice::Mock => write!(f, "mock"),
        }
    }
}
