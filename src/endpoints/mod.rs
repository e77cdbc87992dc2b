//! Endpoint adapters for the hosted model API.
//!
//! Two independent request/response translators share this module: the
//! structured "responses" style ([`structured`]) and the legacy
//! chat-completion style ([`chat`]). Each knows how to build a request body,
//! parse a success response into a report payload, and classify failures as
//! retryable or fatal so the orchestrator can walk its fallback chain.
//!
//! The seam is the [`BriefEndpoint`] trait: the orchestrator is generic over
//! it, the live [`OpenAiEndpoint`] implements it over reqwest, and tests
//! drive the orchestrator with scripted outcomes instead.

pub mod chat;
pub mod structured;

use reqwest::StatusCode;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

use crate::models::{EndpointStyle, ReportRequest};
use crate::policy::ModelPolicy;

pub const API_BASE_URL: &str = "https://api.openai.com/v1";
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
/// Applied only to models whose family accepts a non-default temperature.
pub const SAMPLING_TEMPERATURE: f64 = 0.2;

/// A failed endpoint call, classified for the fallback policy.
///
/// Retryable means "the next candidate may succeed" (rate limit, timeout,
/// transient server error, unknown model, malformed output). Fatal means
/// "this specific call can never succeed" (bad credentials, malformed
/// request); the orchestrator still advances, but logs it prominently.
#[derive(Debug, Error)]
pub enum EndpointError {
    #[error("retryable endpoint error: {detail}")]
    Retryable {
        detail: String,
        raw: Option<Value>,
    },
    #[error("fatal endpoint error: {detail}")]
    Fatal {
        detail: String,
        raw: Option<Value>,
    },
}

impl EndpointError {
    pub fn is_fatal(&self) -> bool {
        matches!(self, EndpointError::Fatal { .. })
    }

    pub fn detail(&self) -> &str {
        match self {
            EndpointError::Retryable { detail, .. } | EndpointError::Fatal { detail, .. } => detail,
        }
    }

    /// The raw HTTP body attached for debugging, when one was received.
    pub fn raw(&self) -> Option<&Value> {
        match self {
            EndpointError::Retryable { raw, .. } | EndpointError::Fatal { raw, .. } => raw.as_ref(),
        }
    }
}

/// A successful endpoint call: the raw HTTP body plus the extracted report payload.
#[derive(Debug, Clone)]
pub struct EndpointSuccess {
    pub raw_http: Value,
    pub payload: Value,
}

/// The adapter seam the orchestrator calls through.
pub trait BriefEndpoint {
    /// Invoke one (style, model) combination for the given request.
    async fn call(
        &self,
        style: EndpointStyle,
        model: &str,
        request: &ReportRequest,
    ) -> Result<EndpointSuccess, EndpointError>;
}

/// Live adapter speaking to the hosted API over HTTPS.
#[derive(Debug)]
pub struct OpenAiEndpoint {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    pub(crate) policy: ModelPolicy,
}

impl OpenAiEndpoint {
    pub fn new(api_key: String, policy: ModelPolicy) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            api_key,
            base_url: API_BASE_URL.to_string(),
            policy,
        })
    }

    /// POST a JSON body and return the parsed response body on 2xx.
    ///
    /// Transport failures (timeout, connect) and non-2xx statuses are
    /// classified here; the adapters only deal with body shapes.
    pub(crate) async fn post_json(&self, path: &str, body: &Value) -> Result<Value, EndpointError> {
        let url = format!("{}/{}", self.base_url, path);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| EndpointError::Retryable {
                detail: if e.is_timeout() {
                    format!("request to {url} timed out")
                } else {
                    format!("request to {url} failed: {e}")
                },
                raw: None,
            })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| EndpointError::Retryable {
                detail: format!("failed reading response body: {e}"),
                raw: None,
            })?;
        let raw: Value = serde_json::from_str(&text).unwrap_or_else(|_| {
            warn!(
                %status,
                body_preview = %crate::utils::truncate_for_log(&text, 300),
                "Response body was not JSON"
            );
            Value::String(text.clone())
        });

        classify_response(status, raw)
    }
}

impl BriefEndpoint for OpenAiEndpoint {
    async fn call(
        &self,
        style: EndpointStyle,
        model: &str,
        request: &ReportRequest,
    ) -> Result<EndpointSuccess, EndpointError> {
        match style {
            EndpointStyle::Structured => structured::call(self, model, request).await,
            EndpointStyle::Chat => chat::call(self, model, request).await,
        }
    }
}

/// Map an HTTP status onto the error taxonomy, attaching the body for debugging.
///
/// Rate limits, timeouts, server errors, and unknown models are retryable;
/// authentication failures and malformed requests are fatal.
pub(crate) fn classify_response(status: StatusCode, raw: Value) -> Result<Value, EndpointError> {
    if status.is_success() {
        return Ok(raw);
    }

    let api_error_code = raw
        .pointer("/error/code")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    let detail = format!("{status}: {}", api_error_summary(&raw));

    let fatal = match status.as_u16() {
        401 | 403 => true,
        404 => false,
        429 | 408 => false,
        400 => api_error_code != "model_not_found",
        s if s >= 500 => false,
        _ => true,
    };

    if fatal {
        Err(EndpointError::Fatal {
            detail,
            raw: Some(raw),
        })
    } else {
        Err(EndpointError::Retryable {
            detail,
            raw: Some(raw),
        })
    }
}

fn api_error_summary(raw: &Value) -> String {
    raw.pointer("/error/message")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| "no error message in body".to_string())
}

/// Parse assistant content as a JSON object, tolerating Markdown code fences.
///
/// Models occasionally wrap their JSON in fenced code blocks despite
/// instructions; strip the fences before giving up. A non-object top level
/// counts as malformed.
pub(crate) fn parse_model_json(content: &str) -> Result<Value, String> {
    let parsed = serde_json::from_str::<Value>(content).or_else(|first_err| {
        let stripped = strip_code_fences(content);
        if stripped == content.trim() {
            Err(first_err)
        } else {
            serde_json::from_str::<Value>(stripped)
        }
    });

    match parsed {
        Ok(value) if value.is_object() => Ok(value),
        Ok(other) => {
            warn!(got = %json_type_name(&other), "Model returned JSON but not an object");
            Err(format!("expected a JSON object, got {}", json_type_name(&other)))
        }
        Err(e) if crate::utils::looks_truncated(&e) => {
            Err(format!("model output appears truncated: {e}"))
        }
        Err(e) => Err(format!("content is not valid JSON: {e}")),
    }
}

fn strip_code_fences(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let inner = inner.strip_suffix("```").unwrap_or(inner);
    // Drop the language tag line, e.g. ```json
    match inner.split_once('\n') {
        Some((_, rest)) => rest.trim(),
        None => inner.trim(),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
