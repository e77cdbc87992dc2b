//! Command-line interface definitions for the report generator.
//!
//! This module defines the CLI arguments and options using the `clap` crate.
//! The binary is invoked once per scheduled occasion:
//!
//! ```sh
//! generate_report daily
//! generate_report weekly
//! generate_report verify daily
//! ```

use clap::{Parser, Subcommand};

use crate::models::ReportType;

/// Command-line arguments for the report generator.
///
/// API credentials and behavior flags come from the environment (see
/// [`crate::config::Config`]); the CLI only selects the run kind and the
/// output locations.
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Output directory for the published static pages
    #[arg(long, default_value = "docs", global = true)]
    pub docs_dir: String,

    /// Output directory for debug artifacts (raw HTTP, payloads, verify reports)
    #[arg(long, default_value = "debug", global = true)]
    pub debug_dir: String,

    /// Optional path to a model capability policy YAML file
    #[arg(long, global = true)]
    pub model_policy: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate and publish the daily brief
    Daily,
    /// Generate and publish the weekly deep dive
    Weekly,
    /// Check a previously published run and write a verification report
    Verify {
        /// Which run to verify
        #[arg(value_enum)]
        report_type: ReportType,
    },
}

impl Command {
    /// The report cadence this command operates on.
    pub fn report_type(&self) -> ReportType {
        match self {
            Command::Daily => ReportType::Daily,
            Command::Weekly => ReportType::Weekly,
            Command::Verify { report_type } => *report_type,
        }
    }
}
