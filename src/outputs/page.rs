//! Static page rendering and writing.
//!
//! Wraps the normalized payload's `html_body` in a minimal standalone HTML
//! document and appends the debug footer the published page must carry: the
//! exact prompt sent, the endpoint style and model used, a live/stub
//! indicator, and, only for live runs, the raw response JSON verbatim.

use std::error::Error;
use tokio::fs;
use tracing::{info, instrument};

use crate::models::{NormalizedPayload, Provenance};

const PAGE_STYLE: &str = "body{font-family:Arial,Helvetica,sans-serif;max-width:760px;\
margin:32px auto;padding:0 16px;line-height:1.5}\
.debug-footer{margin-top:48px;border-top:1px solid #ccc;padding-top:16px;\
color:#555;font-size:0.85em}\
.debug-footer pre{white-space:pre-wrap;background:#f6f6f6;padding:8px;overflow-x:auto}";

/// Render the full HTML document for a payload.
pub fn render_page(payload: &NormalizedPayload, provenance: &Provenance, prompt_text: &str) -> String {
    format!(
        "<!DOCTYPE html><html><head><meta charset='utf-8'>\
         <meta name='viewport' content='width=device-width,initial-scale=1'>\
         <title>{title}</title>\
         <style>{PAGE_STYLE}</style>\
         </head><body>{body}{footer}</body></html>",
        title = escape_html(&payload.title),
        body = payload.html_body,
        footer = render_debug_footer(payload, provenance, prompt_text),
    )
}

/// The audit footer embedded in every published page.
fn render_debug_footer(
    payload: &NormalizedPayload,
    provenance: &Provenance,
    prompt_text: &str,
) -> String {
    let source = match (&payload.source_endpoint_style, &payload.source_model_id) {
        (Some(style), Some(model)) => format!("{style} / {}", escape_html(model)),
        _ => "none (locally generated)".to_string(),
    };
    let indicator = if payload.is_live { "LIVE" } else { "STUB" };

    let mut footer = format!(
        "<footer class='debug-footer'>\
         <p>Run: {run_type} {run_date} — <strong>{indicator}</strong> — endpoint: {source}</p>\
         <details><summary>Prompt</summary><pre>{prompt}</pre></details>",
        run_type = payload.report_type,
        run_date = escape_html(&payload.run_date),
        prompt = escape_html(prompt_text),
    );

    // Raw response only for live runs; the stub has nothing to audit.
    if payload.is_live {
        if let Some(raw) = &provenance.raw_response {
            let raw_json =
                serde_json::to_string_pretty(raw).unwrap_or_else(|_| raw.to_string());
            footer.push_str(&format!(
                "<details><summary>Raw response</summary><pre>{}</pre></details>",
                escape_html(&raw_json)
            ));
        }
    }

    footer.push_str("</footer>");
    footer
}

/// Write the rendered page to `{docs_dir}/{index|weekly}.html`.
#[instrument(level = "info", skip_all, fields(docs_dir = %docs_dir))]
pub async fn write_page(
    docs_dir: &str,
    payload: &NormalizedPayload,
    html: &str,
) -> Result<String, Box<dyn Error>> {
    fs::create_dir_all(docs_dir).await?;
    let path = format!(
        "{}/{}",
        docs_dir.trim_end_matches('/'),
        payload.report_type.page_file_name()
    );
    fs::write(&path, html).await?;
    info!(%path, bytes = html.len(), "Wrote published page");
    Ok(path)
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
