//! CLI argument definitions

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(name = "ddlint")]
#[command(author, version, about = "SQL DDL convention linter")]
#[command(propagate_version = true)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Lint DDL scripts
    Check {
        /// SQL files to check (supports glob patterns)
        files: Vec<PathBuf>,

        /// Directory searched recursively for *.sql files
        #[arg(long, value_name = "DIR")]
        dir: Option<PathBuf>,

        /// Path to config file (default: search for ddlint.toml)
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// SQL dialect (mysql, postgresql)
        #[arg(short, long)]
        dialect: Option<String>,

        /// Output format
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,

        /// Only run these rules (comma-separated)
        #[arg(long, value_delimiter = ',', value_name = "RULE")]
        rules: Vec<String>,

        /// Skip these rules (comma-separated)
        #[arg(long, value_delimiter = ',', value_name = "RULE")]
        disable: Vec<String>,

        /// Report every offending node instead of the first per rule and statement
        #[arg(long)]
        all_violations: bool,
    },

    /// List available rules
    Rules,

    /// Parse SQL and display AST (for debugging)
    Parse {
        /// SQL file to parse
        file: PathBuf,

        /// SQL dialect (mysql, postgresql)
        #[arg(short, long, default_value = "mysql")]
        dialect: String,
    },
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable output with source excerpts
    #[default]
    Human,
    /// JSON output
    Json,
    /// SARIF output (for GitHub Code Scanning)
    Sarif,
}
