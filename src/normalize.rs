//! Payload normalization: schema validation, fill-missing-only merging, and
//! hyperlink absolutization.
//!
//! The model's payload is the base; request-derived defaults apply only to
//! keys the model left absent (or null). A model-declared `run_date` or
//! `type` is never overwritten, even when it disagrees with the request.
//!
//! Link rewriting is a pure transformation over the `html_body` string: every
//! anchor's `href` becomes a syntactically valid absolute URL and anchors
//! gain `target="_blank"` unless they already carry one. The whole pass is
//! idempotent, and it is skipped entirely when the operator asks to preserve
//! the model's HTML byte-for-byte.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde_json::{Value, json};
use thiserror::Error;
use url::Url;

use crate::models::{NormalizedPayload, Provenance, ReportRequest};

/// Title used when the model supplies none.
const DEFAULT_TITLE: &str = "Workday HCM + AI Brief";
/// Body used when the model supplies none, matching the page writer's floor.
const DEFAULT_HTML_BODY: &str = "<h2>No content</h2>";

static ANCHOR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)<a\b[^>]*>").unwrap());
static HREF_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?is)href\s*=\s*(?:"([^"]*)"|'([^']*)')"#).unwrap());

#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("payload is not a JSON object")]
    NotAnObject,
    #[error("payload does not match the report schema: {0}")]
    Shape(#[from] serde_json::Error),
}

/// Validate and normalize a raw payload from an adapter or the stub.
///
/// Pure except for the returned value; applying it twice with the same
/// request and provenance yields an identical payload.
pub fn normalize(
    raw: Value,
    request: &ReportRequest,
    provenance: &Provenance,
    preserve_model_html: bool,
) -> Result<NormalizedPayload, NormalizeError> {
    let mut raw = raw;
    let obj = raw.as_object_mut().ok_or(NormalizeError::NotAnObject)?;

    fill_if_absent(obj, "type", json!(request.report_type.as_str()));
    fill_if_absent(obj, "run_date", json!(request.run_date.to_string()));
    fill_if_absent(obj, "title", json!(DEFAULT_TITLE));
    fill_if_absent(obj, "html_body", json!(DEFAULT_HTML_BODY));

    let mut payload: NormalizedPayload = serde_json::from_value(raw)?;

    if !preserve_model_html {
        payload.html_body = rewrite_links_in_html(&payload.html_body);
    }

    payload.is_live = provenance.is_live;
    payload.source_endpoint_style = provenance.endpoint_style;
    payload.source_model_id = provenance.model_id.clone();

    Ok(payload)
}

fn fill_if_absent(obj: &mut serde_json::Map<String, Value>, key: &str, default: Value) {
    let declared = obj.get(key).is_some_and(|v| !v.is_null());
    if !declared {
        obj.insert(key.to_string(), default);
    }
}

/// Rewrite every anchor so its `href` is an absolute URL, adding
/// `target="_blank"` where missing. Tolerates whitespace around `=` and
/// either quote style; the output always uses double quotes.
pub fn rewrite_links_in_html(html: &str) -> String {
    ANCHOR_RE
        .replace_all(html, |anchor: &Captures| {
            let tag = &anchor[0];
            let mut rewritten = HREF_RE
                .replace(tag, |href: &Captures| {
                    let value = href.get(1).or_else(|| href.get(2)).map_or("", |m| m.as_str());
                    format!(r#"href="{}""#, absolutize_url(value))
                })
                .into_owned();
            if !rewritten.to_ascii_lowercase().contains("target=") {
                // Insert before the closing '>'.
                rewritten.insert_str(rewritten.len() - 1, r#" target="_blank""#);
            }
            rewritten
        })
        .into_owned()
}

/// Make a single href value absolute, defaulting to the https scheme.
///
/// Already-absolute URLs (including mailto:) and pure fragments pass through
/// unchanged, which is what makes the rewrite idempotent.
fn absolutize_url(href: &str) -> String {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') {
        return href.to_string();
    }
    if Url::parse(href).is_ok() {
        return href.to_string();
    }
    if let Some(rest) = href.strip_prefix("//") {
        return format!("https://{rest}");
    }
    format!("https://{}", href.trim_start_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EndpointStyle, ReportType};
    use chrono::NaiveDate;

    fn request() -> ReportRequest {
        ReportRequest::new(
            ReportType::Daily,
            NaiveDate::from_ymd_opt(2026, 8, 30).unwrap(),
            "prompt".to_string(),
        )
    }

    fn live_provenance() -> Provenance {
        Provenance::live(
            EndpointStyle::Structured,
            "gpt-4.1".to_string(),
            json!({"raw": true}),
        )
    }

    #[test]
    fn test_fills_missing_fields_from_request() {
        let raw = json!({"html_body": "<h2>Hi</h2>"});
        let payload = normalize(raw, &request(), &Provenance::stub(), true).unwrap();

        assert_eq!(payload.report_type, ReportType::Daily);
        assert_eq!(payload.run_date, "2026-08-30");
        assert_eq!(payload.title, DEFAULT_TITLE);
        assert!(!payload.is_live);
    }

    #[test]
    fn test_model_declared_values_win() {
        // The model disagrees with the request on both date and type.
        let raw = json!({
            "type": "weekly",
            "run_date": "2026-01-01",
            "title": "Model Title",
            "html_body": "<h2>Hi</h2>"
        });
        let payload = normalize(raw, &request(), &live_provenance(), true).unwrap();

        assert_eq!(payload.report_type, ReportType::Weekly);
        assert_eq!(payload.run_date, "2026-01-01");
        assert_eq!(payload.title, "Model Title");
    }

    #[test]
    fn test_null_counts_as_absent() {
        let raw = json!({"run_date": null, "html_body": "<h2>Hi</h2>"});
        let payload = normalize(raw, &request(), &Provenance::stub(), true).unwrap();
        assert_eq!(payload.run_date, "2026-08-30");
    }

    #[test]
    fn test_provenance_attached() {
        let raw = json!({"html_body": "<h2>Hi</h2>"});
        let payload = normalize(raw, &request(), &live_provenance(), true).unwrap();
        assert!(payload.is_live);
        assert_eq!(payload.source_endpoint_style, Some(EndpointStyle::Structured));
        assert_eq!(payload.source_model_id.as_deref(), Some("gpt-4.1"));
    }

    #[test]
    fn test_rejects_non_object_payloads() {
        assert!(matches!(
            normalize(json!([1, 2]), &request(), &Provenance::stub(), true),
            Err(NormalizeError::NotAnObject)
        ));
    }

    #[test]
    fn test_rejects_malformed_items() {
        let raw = json!({
            "html_body": "<h2>Hi</h2>",
            "items": [{"headline": "H"}]
        });
        assert!(matches!(
            normalize(raw, &request(), &Provenance::stub(), true),
            Err(NormalizeError::Shape(_))
        ));
    }

    #[test]
    fn test_normalization_is_idempotent() {
        let raw = json!({
            "title": "Brief",
            "html_body": "<p><a href = \"workday.com/resources\">Resource</a></p>",
            "items": [{"headline": "H", "url": "https://example.com", "summary": "S"}],
            "sources": [{"title": "T", "url": "https://example.com"}]
        });
        let provenance = live_provenance();

        let once = normalize(raw, &request(), &provenance, false).unwrap();
        let twice = normalize(
            serde_json::to_value(&once).unwrap(),
            &request(),
            &provenance,
            false,
        )
        .unwrap();

        assert_eq!(
            serde_json::to_value(&once).unwrap(),
            serde_json::to_value(&twice).unwrap()
        );
    }

    #[test]
    fn test_rewrite_handles_whitespace_around_equals() {
        let html = r#"<p><a href = "workday.com/resources">Resource</a></p>"#;
        let rewritten = rewrite_links_in_html(html);
        assert!(rewritten.contains(r#"href="https://workday.com/resources""#));
        assert!(rewritten.contains(r#"target="_blank""#));
    }

    #[test]
    fn test_rewrite_handles_single_quoted_hrefs() {
        let html = r#"<p><a href='workday.com'>Workday</a></p>"#;
        let rewritten = rewrite_links_in_html(html);
        assert!(rewritten.contains(r#"href="https://workday.com""#));
        // Re-quoted output is stable on a second pass.
        assert_eq!(rewrite_links_in_html(&rewritten), rewritten);
    }

    #[test]
    fn test_rewrite_leaves_absolute_urls_alone() {
        let html = r#"<a href="https://example.com/a" target="_blank">x</a>"#;
        assert_eq!(rewrite_links_in_html(html), html);
    }

    #[test]
    fn test_rewrite_protocol_relative_and_mailto() {
        let rewritten = rewrite_links_in_html(r#"<a href="//example.com/a">x</a>"#);
        assert!(rewritten.contains(r#"href="https://example.com/a""#));

        let mailto = r#"<a href="mailto:dan@example.com" target="_blank">mail</a>"#;
        assert_eq!(rewrite_links_in_html(mailto), mailto);
    }

    #[test]
    fn test_every_href_is_absolute_after_rewrite() {
        let html = concat!(
            r#"<a href="workday.com/one">1</a>"#,
            r#"<a href="/two">2</a>"#,
            r#"<a href="https://example.com/three">3</a>"#,
        );
        let rewritten = rewrite_links_in_html(html);
        for caps in HREF_RE.captures_iter(&rewritten) {
            let url = Url::parse(&caps[1]).expect("href should be absolute");
            assert!(!url.scheme().is_empty());
        }
    }

    #[test]
    fn test_preserve_flag_keeps_html_byte_identical() {
        let original = r#"<p><a href = "workday.com">x</a></p>"#;
        let raw = json!({"html_body": original});
        let payload = normalize(raw, &request(), &Provenance::stub(), true).unwrap();
        assert_eq!(payload.html_body, original);
    }

    #[test]
    fn test_extra_sections_survive_normalization() {
        let raw = json!({
            "html_body": "<h2>Hi</h2>",
            "risks": [{"risk": "R", "mitigation": "M"}]
        });
        let payload = normalize(raw, &request(), &Provenance::stub(), true).unwrap();
        assert!(payload.extra.contains_key("risks"));
    }
}
