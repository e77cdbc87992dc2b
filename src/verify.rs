//! The `verify` subcommand: audit a previously published run.
//!
//! Re-reads the published page and the payload artifact for the given
//! cadence and date, re-checks the invariants the generate path promises
//! (well-formed page, schema-valid payload, absolute links), and writes the
//! result as `<type>-<date>-verify.json`. Any failed check makes the run
//! exit non-zero.

use std::error::Error;
use tokio::fs;
use tracing::{info, instrument, warn};
use url::Url;

use crate::models::{NormalizedPayload, ReportType, VerifyCheck, VerifyReport};
use crate::normalize::rewrite_links_in_html;
use crate::outputs::debug;

/// Run all checks for one published run and persist the report.
#[instrument(level = "info", skip_all, fields(report_type = %report_type, run_date = %run_date))]
pub async fn run_verify(
    docs_dir: &str,
    debug_dir: &str,
    report_type: ReportType,
    run_date: &str,
    preserve_model_html: bool,
) -> Result<VerifyReport, Box<dyn Error>> {
    let page_path = format!(
        "{}/{}",
        docs_dir.trim_end_matches('/'),
        report_type.page_file_name()
    );

    let mut checks = Vec::new();

    match fs::read_to_string(&page_path).await {
        Ok(html) => checks.extend(check_page_source(&html)),
        Err(e) => checks.push(VerifyCheck::fail(
            "page_exists",
            format!("{page_path}: {e}"),
        )),
    }

    match debug::read_payload(debug_dir, report_type.as_str(), run_date).await {
        Ok(payload) => checks.extend(check_payload(&payload, preserve_model_html)),
        Err(e) => checks.push(VerifyCheck::fail("payload_artifact", e.to_string())),
    }

    let ok = checks.iter().all(|c| c.passed);
    let report = VerifyReport {
        report_type,
        run_date: run_date.to_string(),
        page_path,
        ok,
        checks,
    };

    debug::write_verify(debug_dir, &report).await?;
    if ok {
        info!("Verification passed");
    } else {
        for check in report.checks.iter().filter(|c| !c.passed) {
            warn!(check = %check.name, detail = ?check.detail, "Verification check failed");
        }
    }
    Ok(report)
}

/// Page-level checks: the document must be a complete standalone page.
fn check_page_source(html: &str) -> Vec<VerifyCheck> {
    let mut checks = vec![VerifyCheck::pass("page_exists")];

    checks.push(if html.contains("<!DOCTYPE html>") {
        VerifyCheck::pass("page_has_doctype")
    } else {
        VerifyCheck::fail("page_has_doctype", "missing <!DOCTYPE html>")
    });
    // Prefix match so a `<body>` with attributes still counts.
    checks.push(if html.contains("<body") {
        VerifyCheck::pass("page_has_body")
    } else {
        VerifyCheck::fail("page_has_body", "missing <body>")
    });
    checks
}

/// Payload-level checks: the artifact must still satisfy the report schema,
/// and (when link rewriting was active) every href must be absolute.
fn check_payload(payload: &NormalizedPayload, preserve_model_html: bool) -> Vec<VerifyCheck> {
    let mut checks = vec![VerifyCheck::pass("payload_artifact")];

    checks.push(if payload.title.trim().is_empty() {
        VerifyCheck::fail("payload_title", "title is empty")
    } else {
        VerifyCheck::pass("payload_title")
    });
    checks.push(if payload.html_body.trim().is_empty() {
        VerifyCheck::fail("payload_html_body", "html_body is empty")
    } else {
        VerifyCheck::pass("payload_html_body")
    });

    let bad_item_urls: Vec<&str> = payload
        .items
        .iter()
        .map(|item| item.url.as_str())
        .filter(|u| Url::parse(u).is_err())
        .collect();
    checks.push(if bad_item_urls.is_empty() {
        VerifyCheck::pass("item_urls_absolute")
    } else {
        VerifyCheck::fail(
            "item_urls_absolute",
            format!("non-absolute item urls: {}", bad_item_urls.join(", ")),
        )
    });

    if !preserve_model_html {
        // Rewriting is idempotent, so a properly normalized body is a fixed point.
        checks.push(if rewrite_links_in_html(&payload.html_body) == payload.html_body {
            VerifyCheck::pass("links_normalized")
        } else {
            VerifyCheck::fail("links_normalized", "html_body contains non-normalized links")
        });
    }

    checks
}
