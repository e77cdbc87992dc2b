//! Legacy chat-completion endpoint adapter.
//!
//! Same contract as the structured adapter, against `chat/completions`. The
//! JSON-object response-format constraint is only sent to models the policy
//! marks as supporting it; everyone else gets the constraint via the prompt
//! text alone. The assistant message is free-form text parsed as JSON, and a
//! parse failure is retryable, not fatal: the next model may comply.

use serde_json::{Value, json};

use super::{EndpointError, EndpointSuccess, OpenAiEndpoint, SAMPLING_TEMPERATURE, parse_model_json};
use crate::models::ReportRequest;
use crate::policy::ModelPolicy;
use crate::prompts::{USER_PROMPT_SCHEMA, system_prompt};

pub(crate) async fn call(
    endpoint: &OpenAiEndpoint,
    model: &str,
    request: &ReportRequest,
) -> Result<EndpointSuccess, EndpointError> {
    let body = build_request(model, &endpoint.policy, request);
    let raw_http = endpoint.post_json("chat/completions", &body).await?;
    let payload = parse_success(&raw_http)?;
    Ok(EndpointSuccess { raw_http, payload })
}

/// Build the chat-completions request body.
pub(crate) fn build_request(model: &str, policy: &ModelPolicy, request: &ReportRequest) -> Value {
    let mut body = json!({
        "model": model,
        "messages": [
            {"role": "system", "content": system_prompt(request.report_type)},
            {"role": "user", "content": USER_PROMPT_SCHEMA},
        ],
    });
    if policy.supports_json_mode(model) {
        body["response_format"] = json!({"type": "json_object"});
    }
    if policy.allows_temperature(model) {
        body["temperature"] = json!(SAMPLING_TEMPERATURE);
    }
    body
}

/// Extract the report payload from a 2xx chat-completion body.
pub(crate) fn parse_success(raw: &Value) -> Result<Value, EndpointError> {
    let content = raw
        .pointer("/choices/0/message/content")
        .and_then(Value::as_str)
        .ok_or_else(|| EndpointError::Retryable {
            detail: "response had no assistant message content".to_string(),
            raw: Some(raw.clone()),
        })?;

    parse_model_json(content).map_err(|detail| EndpointError::Retryable {
        detail,
        raw: Some(raw.clone()),
    })
}
