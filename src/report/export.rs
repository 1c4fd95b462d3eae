//! Report export: the JSON response envelope and report files on disk

use crate::crawler::CrawlOutcome;
use crate::report::types::CrawlReport;
use crate::CrawlError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Envelope returned to callers of a crawl
///
/// Success: `{"success": true, "report": {...}, "domain": "..."}`.
/// Failure: `{"success": false, "error": "..."}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrawlResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report: Option<CrawlReport>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CrawlResponse {
    pub fn success(report: CrawlReport, domain: impl Into<String>) -> Self {
        Self {
            success: true,
            report: Some(report),
            domain: Some(domain.into()),
            error: None,
        }
    }

    pub fn failure(error: impl ToString) -> Self {
        Self {
            success: false,
            report: None,
            domain: None,
            error: Some(error.to_string()),
        }
    }
}

impl From<Result<CrawlOutcome, CrawlError>> for CrawlResponse {
    fn from(result: Result<CrawlOutcome, CrawlError>) -> Self {
        match result {
            Ok(outcome) => Self::success(outcome.report, outcome.domain),
            Err(e) => Self::failure(e),
        }
    }
}

/// File name for a domain's report: `crawl_report_<domain>.json`
///
/// Characters outside `[A-Za-z0-9.-]` are replaced with `_` so the name is
/// safe on every platform.
pub fn report_filename(domain: &str) -> String {
    let safe: String = domain
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("crawl_report_{}.json", safe)
}

/// Serializes a report to JSON
pub fn serialize_report(report: &CrawlReport, pretty: bool) -> Result<String, CrawlError> {
    let json = if pretty {
        serde_json::to_string_pretty(report)?
    } else {
        serde_json::to_string(report)?
    };
    Ok(json)
}

/// Writes `report` into `dir` under its domain's file name
///
/// Creates `dir` if missing and overwrites an existing report for the same
/// domain.
///
/// # Returns
///
/// * `Ok(PathBuf)` - Path of the written file
/// * `Err(CrawlError)` - Directory creation, serialization or write failed
pub fn write_report(
    report: &CrawlReport,
    domain: &str,
    dir: &Path,
    pretty: bool,
) -> Result<PathBuf, CrawlError> {
    fs::create_dir_all(dir)?;
    let path = dir.join(report_filename(domain));
    fs::write(&path, serialize_report(report, pretty)?)?;
    tracing::info!("Report written to {}", path.display());
    Ok(path)
}
