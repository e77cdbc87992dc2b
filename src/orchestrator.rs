//! Call orchestration: the nested fallback loop over (endpoint style × model).
//!
//! Styles are walked in fixed preference order, structured first, and each
//! style is exhausted across every model candidate before the next style is
//! tried. The first success wins and nothing further is invoked. There is no
//! backoff between attempts; the fallback chain across distinct models and
//! styles is itself the retry policy.
//!
//! Every attempt is recorded, success or not, so the published content can be
//! audited back to the exact call that produced it.

use serde_json::Value;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::endpoints::BriefEndpoint;
use crate::models::{
    AttemptOutcome, EndpointAttempt, EndpointStyle, Provenance, ReportRequest,
};
use crate::stub;

/// Fixed style preference order: the structured interface is the modern one.
pub const STYLE_ORDER: [EndpointStyle; 2] = [EndpointStyle::Structured, EndpointStyle::Chat];

/// The orchestrator's output: a payload (live or stub), where it came from,
/// and the ordered log of every attempt made along the way.
#[derive(Debug)]
pub struct OrchestrationResult {
    /// The chosen raw payload, not yet normalized.
    pub payload: Value,
    pub provenance: Provenance,
    pub attempts: Vec<EndpointAttempt>,
}

/// Terminal failure when a live result is mandatorily required.
#[derive(Debug, Error)]
pub enum OrchestrateError {
    #[error("live result required but no endpoint attempt succeeded ({} attempts)", .attempts.len())]
    LiveRequired { attempts: Vec<EndpointAttempt> },
}

/// Run the fallback chain and decide between a live payload and the stub.
///
/// `endpoint` is `None` when no API key is configured; with `require_live`
/// unset that skips straight to the stub, otherwise it is an immediate
/// failure since no authenticated call could ever succeed.
pub async fn orchestrate<T: BriefEndpoint>(
    endpoint: Option<&T>,
    candidates: &[String],
    request: &ReportRequest,
    require_live: bool,
) -> Result<OrchestrationResult, OrchestrateError> {
    let Some(endpoint) = endpoint else {
        if require_live {
            error!("No API key configured and a live result is required");
            return Err(OrchestrateError::LiveRequired { attempts: vec![] });
        }
        info!("No API key configured; using stub payload");
        return Ok(stub_result(request, vec![]));
    };

    let mut attempts: Vec<EndpointAttempt> = Vec::new();

    for style in STYLE_ORDER {
        for model in candidates {
            info!(%style, %model, attempt = attempts.len() + 1, "Calling endpoint");
            match endpoint.call(style, model, request).await {
                Ok(success) => {
                    info!(%style, %model, "Endpoint call succeeded");
                    attempts.push(EndpointAttempt {
                        endpoint_style: style,
                        model_id: model.clone(),
                        outcome: AttemptOutcome::Success,
                        raw_response: Some(success.raw_http.clone()),
                        error_detail: None,
                    });
                    return Ok(OrchestrationResult {
                        payload: success.payload,
                        provenance: Provenance::live(style, model.clone(), success.raw_http),
                        attempts,
                    });
                }
                Err(e) => {
                    let outcome = if e.is_fatal() {
                        // Fatal for this call only; the next candidate may differ.
                        error!(%style, %model, error = %e, "Endpoint call failed fatally; trying next candidate");
                        AttemptOutcome::FatalError
                    } else {
                        warn!(%style, %model, error = %e, "Endpoint call failed; trying next candidate");
                        AttemptOutcome::RetryableError
                    };
                    attempts.push(EndpointAttempt {
                        endpoint_style: style,
                        model_id: model.clone(),
                        outcome,
                        raw_response: e.raw().cloned(),
                        error_detail: Some(e.detail().to_string()),
                    });
                }
            }
        }
    }

    if require_live {
        error!(
            attempts = attempts.len(),
            "All endpoint candidates exhausted and a live result is required"
        );
        return Err(OrchestrateError::LiveRequired { attempts });
    }

    warn!(
        attempts = attempts.len(),
        "All endpoint candidates exhausted; falling back to stub payload"
    );
    Ok(stub_result(request, attempts))
}

fn stub_result(request: &ReportRequest, attempts: Vec<EndpointAttempt>) -> OrchestrationResult {
    OrchestrationResult {
        payload: stub::stub_payload(request),
        provenance: Provenance::stub(),
        attempts,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoints::{EndpointError, EndpointSuccess};
    use crate::models::ReportType;
    use chrono::NaiveDate;
    use serde_json::json;
    use std::cell::RefCell;
    use std::collections::VecDeque;

    /// Scripted adapter: pops one pre-baked outcome per call and records the
    /// (style, model) order the orchestrator invoked.
    struct ScriptedEndpoint {
        outcomes: RefCell<VecDeque<Result<EndpointSuccess, EndpointError>>>,
        calls: RefCell<Vec<(EndpointStyle, String)>>,
    }

    impl ScriptedEndpoint {
        fn new(outcomes: Vec<Result<EndpointSuccess, EndpointError>>) -> Self {
            Self {
                outcomes: RefCell::new(outcomes.into()),
                calls: RefCell::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<(EndpointStyle, String)> {
            self.calls.borrow().clone()
        }
    }

    impl BriefEndpoint for ScriptedEndpoint {
        async fn call(
            &self,
            style: EndpointStyle,
            model: &str,
            _request: &ReportRequest,
        ) -> Result<EndpointSuccess, EndpointError> {
            self.calls.borrow_mut().push((style, model.to_string()));
            self.outcomes
                .borrow_mut()
                .pop_front()
                .expect("endpoint called after the scripted outcomes ran out")
        }
    }

    fn request() -> ReportRequest {
        ReportRequest::new(
            ReportType::Daily,
            NaiveDate::from_ymd_opt(2026, 8, 30).unwrap(),
            "prompt".to_string(),
        )
    }

    fn success(title: &str) -> Result<EndpointSuccess, EndpointError> {
        Ok(EndpointSuccess {
            raw_http: json!({"output": "raw"}),
            payload: json!({"title": title}),
        })
    }

    fn retryable() -> Result<EndpointSuccess, EndpointError> {
        Err(EndpointError::Retryable {
            detail: "429".to_string(),
            raw: Some(json!({"error": "rate limit"})),
        })
    }

    fn fatal() -> Result<EndpointSuccess, EndpointError> {
        Err(EndpointError::Fatal {
            detail: "401".to_string(),
            raw: None,
        })
    }

    fn models(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_first_success_wins_and_stops() {
        // Three candidates, but only one outcome scripted: any further call
        // would panic in the scripted adapter.
        let endpoint = ScriptedEndpoint::new(vec![success("Brief")]);
        let result = orchestrate(
            Some(&endpoint),
            &models(&["m1", "m2", "m3"]),
            &request(),
            false,
        )
        .await
        .unwrap();

        assert!(result.provenance.is_live);
        assert_eq!(result.provenance.model_id.as_deref(), Some("m1"));
        assert_eq!(endpoint.calls().len(), 1);
        assert_eq!(result.attempts.len(), 1);
        assert_eq!(result.attempts[0].outcome, AttemptOutcome::Success);
    }

    #[tokio::test]
    async fn test_structured_exhausted_before_chat() {
        let endpoint =
            ScriptedEndpoint::new(vec![retryable(), retryable(), retryable(), success("late")]);
        let result = orchestrate(Some(&endpoint), &models(&["m1", "m2"]), &request(), false)
            .await
            .unwrap();

        assert_eq!(
            endpoint.calls(),
            vec![
                (EndpointStyle::Structured, "m1".to_string()),
                (EndpointStyle::Structured, "m2".to_string()),
                (EndpointStyle::Chat, "m1".to_string()),
                (EndpointStyle::Chat, "m2".to_string()),
            ]
        );
        assert_eq!(result.provenance.endpoint_style, Some(EndpointStyle::Chat));
        assert_eq!(result.provenance.model_id.as_deref(), Some("m2"));
    }

    #[tokio::test]
    async fn test_fatal_error_advances_to_next_model() {
        let endpoint = ScriptedEndpoint::new(vec![fatal(), success("ok")]);
        let result = orchestrate(Some(&endpoint), &models(&["m1", "m2"]), &request(), false)
            .await
            .unwrap();

        assert_eq!(result.attempts[0].outcome, AttemptOutcome::FatalError);
        assert_eq!(result.provenance.model_id.as_deref(), Some("m2"));
    }

    #[tokio::test]
    async fn test_exhaustion_falls_back_to_stub() {
        let endpoint = ScriptedEndpoint::new(vec![retryable(), fatal(), retryable(), retryable()]);
        let result = orchestrate(Some(&endpoint), &models(&["m1", "m2"]), &request(), false)
            .await
            .unwrap();

        assert!(!result.provenance.is_live);
        assert!(result.provenance.model_id.is_none());
        assert_eq!(result.attempts.len(), 4);
        // Stub still satisfies the report schema.
        assert!(result.payload["title"].as_str().is_some_and(|t| !t.is_empty()));
        assert!(!result.payload["items"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_exhaustion_with_require_live_fails() {
        let endpoint = ScriptedEndpoint::new(vec![retryable(), retryable(), retryable(), retryable()]);
        let err = orchestrate(Some(&endpoint), &models(&["m1", "m2"]), &request(), true)
            .await
            .unwrap_err();

        let OrchestrateError::LiveRequired { attempts } = err;
        assert_eq!(attempts.len(), 4);
    }

    #[tokio::test]
    async fn test_no_api_key_goes_straight_to_stub() {
        let result = orchestrate::<ScriptedEndpoint>(None, &models(&["m1"]), &request(), false)
            .await
            .unwrap();
        assert!(!result.provenance.is_live);
        assert!(result.attempts.is_empty());
    }

    #[tokio::test]
    async fn test_no_api_key_with_require_live_fails() {
        let err = orchestrate::<ScriptedEndpoint>(None, &models(&["m1"]), &request(), true)
            .await
            .unwrap_err();
        let OrchestrateError::LiveRequired { attempts } = err;
        assert!(attempts.is_empty());
    }

    #[tokio::test]
    async fn test_attempts_capture_raw_responses_and_details() {
        let endpoint = ScriptedEndpoint::new(vec![retryable(), success("ok")]);
        let result = orchestrate(Some(&endpoint), &models(&["m1", "m2"]), &request(), false)
            .await
            .unwrap();

        assert_eq!(result.attempts[0].error_detail.as_deref(), Some("429"));
        assert_eq!(
            result.attempts[0].raw_response,
            Some(json!({"error": "rate limit"}))
        );
        assert!(result.attempts[1].raw_response.is_some());
        assert!(result.attempts[1].error_detail.is_none());
    }

    /// The worked scenario: override "gpt-x" ahead of the fallback chain,
    /// structured style retryable on it, success on the first fallback.
    #[tokio::test]
    async fn test_override_then_fallback_success() {
        let candidates =
            crate::selector::candidate_models(Some("gpt-x"), &["gpt-4.1", "gpt-4.1-mini"]);
        assert_eq!(candidates, vec!["gpt-x", "gpt-4.1", "gpt-4.1-mini"]);

        let endpoint = ScriptedEndpoint::new(vec![retryable(), success("live brief")]);
        let result = orchestrate(Some(&endpoint), &candidates, &request(), false)
            .await
            .unwrap();

        assert!(result.provenance.is_live);
        assert_eq!(
            result.provenance.endpoint_style,
            Some(EndpointStyle::Structured)
        );
        assert_eq!(result.provenance.model_id.as_deref(), Some("gpt-4.1"));
    }
}
