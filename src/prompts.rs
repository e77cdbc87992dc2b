//! Prompt text sent to the model for each report cadence.
//!
//! The system prompt sets the research persona and scope; the user prompt
//! pins the exact JSON shape the rest of the pipeline expects. Both are
//! reproduced verbatim in the published page's debug footer.

use crate::models::ReportType;

pub const SYSTEM_PROMPT_DAILY: &str = "You are Dan – Workday AI Research Agent. Produce a JSON object exactly matching the schema below. \
Do credible web research (Workday, Workday HCM [Human Capital Management], Workday AI, agentic AI for Workday, \
broader AI for HR technology, consultant upskilling, and SI/GSI competitive moves). Include working URLs for every claim. \
Keep daily to ~250 words. Explain why each item matters to Deloitte's Workday practice. Today's date (ET) is now.";

pub const SYSTEM_PROMPT_WEEKLY: &str = "You are Dan – Workday AI Research Agent. Produce a JSON object exactly matching the schema below. \
Do credible web research (Workday, Workday HCM [Human Capital Management], Workday AI, agentic AI for Workday, \
broader AI for HR technology, consultant upskilling, and SI/GSI competitive moves). Include working URLs for every claim. \
For the weekly deep dive, write 600–900 words and include a short section titled 'What changed this week'. \
Explain why each item matters to Deloitte's Workday practice. Today's date (ET) is now.";

pub const USER_PROMPT_SCHEMA: &str = r#"Return JSON ONLY in this shape:
{
  "type": "daily or weekly",
  "run_date": "YYYY-MM-DD",
  "title": "Short headline",
  "priority_focus": "1–2 sentences on what matters most now",
  "items": [ { "headline": "…", "url": "https://…", "summary": "why it matters" } ],
  "competitive_watch": [ { "competitor": "Name", "move": "…", "implication": "…" } ],
  "enablement": [ { "skill": "Topic", "resource_url": "https://…", "90_day_outcome": "…" } ],
  "actions_next_week": ["…"],
  "risks": [ { "risk": "…", "mitigation": "…" } ],
  "sources": [ { "title": "…", "url": "https://…" } ],
  "html_body": "<h2>…</h2> (well-formatted HTML with <a href> links)",
  "plain_text_body": "Text-only with visible URLs"
}

Parameters:
- For DAILY: set "type":"daily"; target ~250 words.
- For WEEKLY: set "type":"weekly"; target 600–900 words and include 'What changed this week'.
- Always include URLs and explain why it matters to Deloitte's Workday practice.
- Use run_date in YYYY-MM-DD (ET).
"#;

/// System prompt for the given cadence.
pub fn system_prompt(report_type: ReportType) -> &'static str {
    match report_type {
        ReportType::Daily => SYSTEM_PROMPT_DAILY,
        ReportType::Weekly => SYSTEM_PROMPT_WEEKLY,
    }
}

/// The combined prompt text recorded on the request and shown in the debug footer.
pub fn prompt_text(report_type: ReportType) -> String {
    format!("{}\n\n{}", system_prompt(report_type), USER_PROMPT_SCHEMA)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_selects_cadence() {
        assert!(system_prompt(ReportType::Daily).contains("~250 words"));
        assert!(system_prompt(ReportType::Weekly).contains("What changed this week"));
    }

    #[test]
    fn test_prompt_text_includes_schema() {
        let text = prompt_text(ReportType::Daily);
        assert!(text.contains("Return JSON ONLY"));
        assert!(text.contains("\"html_body\""));
    }
}
