//! Sample payloads and identifiers.

use chrono::NaiveDate;
use scanvault_core::ScanId;
use serde_json::{Value, json};

/// Fixed run date used by suites that do not care about the calendar.
#[must_use]
pub fn run_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, 14).unwrap_or_default()
}

/// `count` sequential identifiers starting at `first`.
#[must_use]
pub fn scan_ids(first: u64, count: u64) -> Vec<ScanId> {
    (first..first + count).map(ScanId::from).collect()
}

/// Report document shaped like a WAS scan download.
#[must_use]
pub fn report_document(scan_id: &ScanId) -> Value {
    json!({
        "ServiceResponse": {
            "responseCode": "SUCCESS",
            "data": [{
                "WasScan": {
                    "id": scan_id.as_str(),
                    "status": "FINISHED",
                    "vulns": {"count": 2}
                }
            }]
        }
    })
}
