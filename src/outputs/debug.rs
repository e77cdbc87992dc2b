//! Debug artifact persistence.
//!
//! Every run leaves an auditable trail under the debug directory: per-style
//! raw HTTP attempt logs, the parsed payload that was published, and (for
//! `verify` runs) the verification report. Artifacts are written once per
//! run whether or not the run succeeded, so a failed chain can be diagnosed
//! after the fact.

use serde_json::Value;
use std::error::Error;
use tokio::fs;
use tracing::{info, instrument};

use crate::models::{
    EndpointAttempt, EndpointStyle, NormalizedPayload, ReportRequest, VerifyReport,
};

/// `<type>-<date>-<suffix>.json`
pub fn artifact_name(report_type: &str, run_date: &str, suffix: &str) -> String {
    format!("{report_type}-{run_date}-{suffix}.json")
}

/// The raw-http artifact suffix for a style.
pub fn raw_http_suffix(style: EndpointStyle) -> &'static str {
    match style {
        EndpointStyle::Structured => "raw-http",
        EndpointStyle::Chat => "chat-raw-http",
    }
}

/// The payload artifact suffix for the style that produced the content.
/// Stub payloads share the structured file since there is no chat response.
pub fn payload_suffix(style: Option<EndpointStyle>) -> &'static str {
    match style {
        Some(EndpointStyle::Chat) => "chat-payload",
        _ => "payload",
    }
}

/// Write the per-style attempt logs. Styles with no attempts get no file.
#[instrument(level = "info", skip_all, fields(debug_dir = %debug_dir))]
pub async fn write_attempts(
    debug_dir: &str,
    request: &ReportRequest,
    attempts: &[EndpointAttempt],
) -> Result<(), Box<dyn Error>> {
    fs::create_dir_all(debug_dir).await?;
    let run_date = request.run_date.to_string();

    for style in [EndpointStyle::Structured, EndpointStyle::Chat] {
        let style_attempts: Vec<&EndpointAttempt> = attempts
            .iter()
            .filter(|a| a.endpoint_style == style)
            .collect();
        if style_attempts.is_empty() {
            continue;
        }

        let path = format!(
            "{}/{}",
            debug_dir.trim_end_matches('/'),
            artifact_name(
                request.report_type.as_str(),
                &run_date,
                raw_http_suffix(style)
            )
        );
        let json = serde_json::to_string_pretty(&style_attempts)?;
        fs::write(&path, json).await?;
        info!(%path, attempts = style_attempts.len(), "Wrote attempt log artifact");
    }

    Ok(())
}

/// Write the parsed payload artifact for the run.
#[instrument(level = "info", skip_all, fields(debug_dir = %debug_dir))]
pub async fn write_payload(
    debug_dir: &str,
    payload: &NormalizedPayload,
) -> Result<String, Box<dyn Error>> {
    fs::create_dir_all(debug_dir).await?;
    let path = format!(
        "{}/{}",
        debug_dir.trim_end_matches('/'),
        artifact_name(
            payload.report_type.as_str(),
            &payload.run_date,
            payload_suffix(payload.source_endpoint_style)
        )
    );
    let json = serde_json::to_string_pretty(payload)?;
    fs::write(&path, json).await?;
    info!(%path, "Wrote payload artifact");
    Ok(path)
}

/// Write everything a completed run leaves behind.
pub async fn write_run_artifacts(
    debug_dir: &str,
    request: &ReportRequest,
    attempts: &[EndpointAttempt],
    payload: &NormalizedPayload,
) -> Result<(), Box<dyn Error>> {
    write_attempts(debug_dir, request, attempts).await?;
    write_payload(debug_dir, payload).await?;
    Ok(())
}

/// Write the verification report for a `verify` run.
#[instrument(level = "info", skip_all, fields(debug_dir = %debug_dir))]
pub async fn write_verify(
    debug_dir: &str,
    report: &VerifyReport,
) -> Result<String, Box<dyn Error>> {
    fs::create_dir_all(debug_dir).await?;
    let path = format!(
        "{}/{}",
        debug_dir.trim_end_matches('/'),
        artifact_name(report.report_type.as_str(), &report.run_date, "verify")
    );
    let json = serde_json::to_string_pretty(report)?;
    fs::write(&path, json).await?;
    info!(%path, ok = report.ok, "Wrote verification report");
    Ok(path)
}

/// Load a previously written payload artifact, trying the structured name
/// first and the chat name second.
pub async fn read_payload(
    debug_dir: &str,
    report_type: &str,
    run_date: &str,
) -> Result<NormalizedPayload, Box<dyn Error>> {
    let dir = debug_dir.trim_end_matches('/');
    for suffix in ["payload", "chat-payload"] {
        let path = format!("{dir}/{}", artifact_name(report_type, run_date, suffix));
        if let Ok(contents) = fs::read_to_string(&path).await {
            let value: Value = serde_json::from_str(&contents)?;
            return Ok(serde_json::from_value(value)?);
        }
    }
    Err(format!("no payload artifact found for {report_type} {run_date} in {dir}").into())
}
