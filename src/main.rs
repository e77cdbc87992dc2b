//! # Research Brief Generator
//!
//! Generates periodic (daily/weekly) topical research briefs by calling a
//! hosted LLM API, publishing the result as a static HTML page, and emailing
//! the same content. Invoked once per scheduled occasion; terminates when the
//! run is done.
//!
//! ## Usage
//!
//! ```sh
//! generate_report daily
//! generate_report weekly
//! generate_report verify daily
//! ```
//!
//! ## Architecture
//!
//! One run is a single sequential pipeline:
//! 1. **Select**: resolve the ordered model candidate list (override first)
//! 2. **Orchestrate**: try (endpoint style × model) combinations in order;
//!    first success wins, exhaustion falls back to a deterministic stub
//!    (or fails the run when `OPENAI_REQUIRE_LIVE=1`)
//! 3. **Normalize**: validate the payload, fill absent fields from the
//!    request, absolutize hyperlinks
//! 4. **Publish**: write debug artifacts, the static page, and the email

use chrono::Utc;
use clap::Parser;
use std::error::Error;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;
mod config;
mod endpoints;
mod mailer;
mod models;
mod normalize;
mod orchestrator;
mod outputs;
mod policy;
mod prompts;
mod selector;
mod stub;
mod utils;
mod verify;

use cli::{Cli, Command};
use config::Config;
use endpoints::OpenAiEndpoint;
use models::ReportRequest;
use orchestrator::OrchestrateError;
use outputs::{debug, page};
use policy::ModelPolicy;
use selector::{DEFAULT_FALLBACK_MODELS, candidate_models};
use utils::ensure_writable_dir;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    let args = Cli::parse();
    let config = Config::from_env();
    info!(command = ?args.command, "generate_report starting up");

    let result = match &args.command {
        Command::Verify { report_type } => run_verify(&args, &config, *report_type).await,
        Command::Daily | Command::Weekly => run_generate(&args, &config).await,
    };

    let elapsed = start_time.elapsed();
    match &result {
        Ok(()) => info!(?elapsed, "Execution complete"),
        Err(e) => error!(?elapsed, error = %e, "Run failed"),
    }
    result
}

async fn run_generate(args: &Cli, config: &Config) -> Result<(), Box<dyn Error>> {
    let report_type = args.command.report_type();
    let run_date = Utc::now().date_naive();
    let request = ReportRequest::new(report_type, run_date, prompts::prompt_text(report_type));
    info!(%report_type, %run_date, "ReportRequest constructed");

    // Early check: fail on unwritable output paths before any network work.
    ensure_writable_dir(&args.docs_dir).await?;
    ensure_writable_dir(&args.debug_dir).await?;

    let policy = load_policy(args)?;
    let candidates = candidate_models(config.model_override.as_deref(), DEFAULT_FALLBACK_MODELS);
    info!(?candidates, "Model candidate list resolved");

    let endpoint = match &config.api_key {
        Some(key) => Some(OpenAiEndpoint::new(key.clone(), policy)?),
        None => None,
    };

    let result = match orchestrator::orchestrate(
        endpoint.as_ref(),
        &candidates,
        &request,
        config.require_live,
    )
    .await
    {
        Ok(result) => result,
        Err(OrchestrateError::LiveRequired { attempts }) => {
            // Persist the attempt log even though nothing gets published.
            debug::write_attempts(&args.debug_dir, &request, &attempts).await?;
            return Err("live result required but no endpoint attempt succeeded".into());
        }
    };

    let payload = normalize::normalize(
        result.payload,
        &request,
        &result.provenance,
        config.preserve_model_html,
    )?;
    info!(
        is_live = payload.is_live,
        title = %payload.title,
        items = payload.items.len(),
        "Payload normalized"
    );

    debug::write_run_artifacts(&args.debug_dir, &request, &result.attempts, &payload).await?;

    let html = page::render_page(&payload, &result.provenance, &request.prompt_text);
    let page_path = page::write_page(&args.docs_dir, &payload, &html).await?;
    info!(%page_path, "Published page");

    mailer::send_report_email(config, &payload).await?;

    Ok(())
}

async fn run_verify(
    args: &Cli,
    config: &Config,
    report_type: models::ReportType,
) -> Result<(), Box<dyn Error>> {
    let run_date = Utc::now().date_naive().to_string();
    let report = verify::run_verify(
        &args.docs_dir,
        &args.debug_dir,
        report_type,
        &run_date,
        config.preserve_model_html,
    )
    .await?;

    if report.ok {
        Ok(())
    } else {
        Err(format!(
            "verification failed: {} of {} checks did not pass",
            report.checks.iter().filter(|c| !c.passed).count(),
            report.checks.len()
        )
        .into())
    }
}

fn load_policy(args: &Cli) -> Result<ModelPolicy, Box<dyn Error>> {
    match &args.model_policy {
        Some(path) => {
            let policy = ModelPolicy::from_yaml_file(path)?;
            info!(%path, "Loaded model capability policy");
            Ok(policy)
        }
        None => {
            warn!("No model policy file given; using built-in capability defaults");
            Ok(ModelPolicy::default())
        }
    }
}
