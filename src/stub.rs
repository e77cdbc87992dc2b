//! Deterministic stand-in payload for runs without a live model response.
//!
//! Used only as a fallback when no live call is permitted or every attempt
//! failed (and a live result is not mandatorily required). The stub satisfies
//! the full report schema so the page and mail pipeline downstream never has
//! to special-case it; the content makes its placeholder nature obvious.

use serde_json::{Value, json};

use crate::models::{ReportRequest, ReportType};

/// Synthesize a schema-valid payload from the request alone.
///
/// Deterministic: the same request always produces the same payload.
pub fn stub_payload(request: &ReportRequest) -> Value {
    let run_date = request.run_date.to_string();
    let cadence_note = match request.report_type {
        ReportType::Daily => "Daily brief placeholder. No live model response was available for this run.",
        ReportType::Weekly => "Weekly deep-dive placeholder. No live model response was available for this run.",
    };

    json!({
        "type": request.report_type.as_str(),
        "run_date": run_date,
        "title": format!("Workday HCM + AI Brief ({run_date})"),
        "priority_focus": cadence_note,
        "items": [
            {
                "headline": "Live research unavailable for this run",
                "url": "https://www.workday.com/",
                "summary": "This edition was generated locally. Check the debug artifacts for the attempt log."
            }
        ],
        "html_body": format!(
            "<h2>Workday HCM + AI Brief</h2>\
             <p>{cadence_note}</p>\
             <p>Run date: {run_date}. See \
             <a href=\"https://www.workday.com/\">workday.com</a> for primary sources.</p>"
        ),
        "plain_text_body": format!(
            "Workday HCM + AI Brief\n{cadence_note}\nRun date: {run_date}.\nhttps://www.workday.com/"
        ),
    })
}
