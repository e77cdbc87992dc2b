//! Structured "responses"-style endpoint adapter.
//!
//! The preferred modern interface: the request declares that output must be a
//! JSON object, and the response carries the structured content under
//! `output`. Deployed API versions have returned that field as a plain
//! string, a list of strings, or a list of message objects, so the parser
//! accepts all three, with the chat-style `choices` path as a final fallback.

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
    let raw_http = endpoint.post_json("responses", &body).await?;
    let payload = parse_success(&raw_http)?;
    Ok(EndpointSuccess { raw_http, payload })
}

/// Build the responses-style request body.
///
/// Temperature is omitted entirely for model families that reject it.
pub(crate) fn build_request(model: &str, policy: &ModelPolicy, request: &ReportRequest) -> Value {
    let mut body = json!({
        "model": model,
        "response_format": {"type": "json_object"},
        "input": [
            {"role": "system", "content": system_prompt(request.report_type)},
            {"role": "user", "content": USER_PROMPT_SCHEMA},
        ],
    });
    if policy.allows_temperature(model) {
        body["temperature"] = json!(SAMPLING_TEMPERATURE);
    }
    body
}

/// Extract the report payload from a 2xx response body.
///
/// A body with no recognizable content, or content that is not a JSON
/// object, is a retryable error: the next candidate may well behave.
pub(crate) fn parse_success(raw: &Value) -> Result<Value, EndpointError> {
    let content = output_content(raw)
        .or_else(|| choices_content(raw))
        .ok_or_else(|| EndpointError::Retryable {
            detail: "response did not include content in an expected shape".to_string(),
            raw: Some(raw.clone()),
        })?;

    parse_model_json(&content).map_err(|detail| EndpointError::Retryable {
        detail,
        raw: Some(raw.clone()),
    })
}

fn output_content(raw: &Value) -> Option<String> {
    match raw.get("output")? {
        Value::String(s) => Some(s.clone()),
        Value::Array(items) => items.iter().find_map(item_content),
        _ => None,
    }
}

fn item_content(item: &Value) -> Option<String> {
    match item {
        Value::String(s) => Some(s.clone()),
        Value::Object(_) => match item.get("content")? {
            Value::String(s) => Some(s.clone()),
            // Message objects nest text parts one level deeper.
            Value::Array(parts) => {
                let text: String = parts
                    .iter()
                    .filter_map(|part| part.get("text").and_then(Value::as_str))
                    .collect();
                (!text.is_empty()).then_some(text)
            }
            _ => None,
        },
        _ => None,
    }
}

fn choices_content(raw: &Value) -> Option<String> {
    raw.pointer("/choices/0/message/content")
        .and_then(Value::as_str)
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ReportType;
    use chrono::NaiveDate;

    fn request() -> ReportRequest {
        ReportRequest::new(
            ReportType::Daily,
            NaiveDate::from_ymd_opt(2026, 8, 30).unwrap(),
            "prompt".to_string(),
        )
    }

    #[test]
    fn test_build_request_shape() {
        let body = build_request("gpt-4.1", &ModelPolicy::default(), &request());
        assert_eq!(body["model"], "gpt-4.1");
        assert_eq!(body["response_format"]["type"], "json_object");
        assert_eq!(body["input"][0]["role"], "system");
        assert_eq!(body["input"][1]["role"], "user");
        assert_eq!(body["temperature"], SAMPLING_TEMPERATURE);
    }

    #[test]
    fn test_build_request_omits_temperature_for_fixed_families() {
        let body = build_request("gpt-5.1", &ModelPolicy::default(), &request());
        assert!(body.get("temperature").is_none());
    }

    #[test]
    fn test_parse_output_as_string() {
        let raw = json!({"output": "{\"title\": \"Brief\"}"});
        let payload = parse_success(&raw).unwrap();
        assert_eq!(payload["title"], "Brief");
    }

    #[test]
    fn test_parse_output_as_list_of_strings() {
        let raw = json!({"output": ["{\"title\": \"Brief\"}"]});
        let payload = parse_success(&raw).unwrap();
        assert_eq!(payload["title"], "Brief");
    }

    #[test]
    fn test_parse_output_as_message_objects() {
        let raw = json!({"output": [{"content": "{\"title\": \"Brief\"}"}]});
        assert_eq!(parse_success(&raw).unwrap()["title"], "Brief");

        let raw = json!({"output": [{"content": [
            {"type": "output_text", "text": "{\"title\": "},
            {"type": "output_text", "text": "\"Brief\"}"}
        ]}]});
        assert_eq!(parse_success(&raw).unwrap()["title"], "Brief");
    }

    #[test]
    fn test_parse_falls_back_to_choices() {
        let raw = json!({"choices": [{"message": {"content": "{\"title\": \"Brief\"}"}}]});
        assert_eq!(parse_success(&raw).unwrap()["title"], "Brief");
    }

    #[test]
    fn test_parse_unrecognized_shape_is_retryable() {
        let err = parse_success(&json!({"unexpected": true})).unwrap_err();
        assert!(!err.is_fatal());
        assert!(err.raw().is_some());
    }

    #[test]
    fn test_parse_malformed_content_is_retryable() {
        let err = parse_success(&json!({"output": "definitely not json"})).unwrap_err();
        assert!(!err.is_fatal());
    }
}
