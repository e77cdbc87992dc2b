//! Data models for report runs, endpoint attempts, and normalized payloads.
//!
//! This module defines the core data structures used throughout the application:
//! - [`ReportRequest`]: Immutable description of one scheduled run
//! - [`EndpointAttempt`]: Record of a single (style, model) call, kept for audit
//! - [`NormalizedPayload`]: The validated report that gets published and mailed
//! - [`Provenance`]: Which endpoint/model produced the content, live or stub
//!
//! The payload field names match the JSON schema the LLM is instructed to
//! return, so serialization round-trips the model's own output without drift.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// The cadence of a report run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ReportType {
    Daily,
    Weekly,
}

impl ReportType {
    /// The lowercase name used in prompts, filenames, and email subjects.
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportType::Daily => "daily",
            ReportType::Weekly => "weekly",
        }
    }

    /// The published page filename for this cadence.
    ///
    /// Daily briefs land on the site index; weekly deep dives get their own page.
    pub fn page_file_name(&self) -> &'static str {
        match self {
            ReportType::Daily => "index.html",
            ReportType::Weekly => "weekly.html",
        }
    }
}

impl fmt::Display for ReportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One scheduled invocation of the generator.
///
/// Constructed once at process start from the CLI arguments and the current
/// UTC date; immutable for the rest of the run.
#[derive(Debug, Clone)]
pub struct ReportRequest {
    /// Whether this run produces the daily or the weekly brief.
    pub report_type: ReportType,
    /// The UTC date of the run, used for artifact names and payload defaults.
    pub run_date: NaiveDate,
    /// The full prompt sent to the model, reproduced verbatim in the page footer.
    pub prompt_text: String,
}

impl ReportRequest {
    pub fn new(report_type: ReportType, run_date: NaiveDate, prompt_text: String) -> Self {
        Self {
            report_type,
            run_date,
            prompt_text,
        }
    }
}

/// The two supported API styles, in preference order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EndpointStyle {
    /// The modern "responses" interface: accepts a target output schema.
    Structured,
    /// The legacy chat-completion interface: free-form assistant text parsed as JSON.
    Chat,
}

impl fmt::Display for EndpointStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EndpointStyle::Structured => f.write_str("structured"),
            EndpointStyle::Chat => f.write_str("chat"),
        }
    }
}

/// How a single (style, model) call ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptOutcome {
    Success,
    RetryableError,
    FatalError,
}

/// Record of one endpoint call, immutable once recorded.
///
/// Attempts accumulate in order during orchestration and are persisted as
/// debug artifacts so the published content can be traced back to the exact
/// endpoint/model combination that produced it.
#[derive(Debug, Clone, Serialize)]
pub struct EndpointAttempt {
    pub endpoint_style: EndpointStyle,
    pub model_id: String,
    pub outcome: AttemptOutcome,
    /// The raw HTTP response body, when one was received.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_response: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_detail: Option<String>,
}

/// Where the published content came from.
#[derive(Debug, Clone)]
pub struct Provenance {
    /// `true` when a real API call produced the content, `false` for the stub.
    pub is_live: bool,
    pub endpoint_style: Option<EndpointStyle>,
    pub model_id: Option<String>,
    /// The raw success response, kept for the page's debug footer. Live only.
    pub raw_response: Option<Value>,
}

impl Provenance {
    pub fn stub() -> Self {
        Self {
            is_live: false,
            endpoint_style: None,
            model_id: None,
            raw_response: None,
        }
    }

    pub fn live(style: EndpointStyle, model_id: String, raw_response: Value) -> Self {
        Self {
            is_live: true,
            endpoint_style: Some(style),
            model_id: Some(model_id),
            raw_response: Some(raw_response),
        }
    }
}

/// One linked item in the brief.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ReportItem {
    pub headline: String,
    pub url: String,
    pub summary: String,
}

/// The validated report payload, the sole output of the core pipeline.
///
/// Field names mirror the JSON schema the model is asked to produce. Fields
/// the model declares are never overwritten during normalization; request
/// defaults apply only to absent keys. Unknown fields the model supplies are
/// carried through `extra` so nothing it returns is dropped.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NormalizedPayload {
    #[serde(rename = "type")]
    pub report_type: ReportType,
    /// `YYYY-MM-DD`, as declared by the model or filled from the request.
    pub run_date: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority_focus: Option<String>,
    pub html_body: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plain_text_body: Option<String>,
    #[serde(default)]
    pub items: Vec<ReportItem>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_endpoint_style: Option<EndpointStyle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_model_id: Option<String>,
    #[serde(default)]
    pub is_live: bool,
}

/// One check performed by the `verify` subcommand.
#[derive(Debug, Clone, Serialize)]
pub struct VerifyCheck {
    pub name: String,
    pub passed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl VerifyCheck {
    pub fn pass(name: &str) -> Self {
        Self {
            name: name.to_string(),
            passed: true,
            detail: None,
        }
    }

    pub fn fail(name: &str, detail: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            passed: false,
            detail: Some(detail.into()),
        }
    }
}

/// The verification report written as `<type>-<date>-verify.json`.
#[derive(Debug, Clone, Serialize)]
pub struct VerifyReport {
    #[serde(rename = "type")]
    pub report_type: ReportType,
    pub run_date: String,
    pub page_path: String,
    pub ok: bool,
    pub checks: Vec<VerifyCheck>,
}
