//! Request and response bodies of the Qualys REST 3.0 search API.
//!
//! # Design
//! - Responses are decoded leniently: a missing `ServiceResponse` or `data`
//!   field means "no matches", not a failure.
//! - Listing entries are keyed by record type (`WasScan`, ...). The record whose
//!   key matches the scan type (ASCII case-insensitive) is read first; otherwise
//!   the first record with an `id` in key order is used.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

use scanvault_core::{Criterion, RemoteError, ScanId, ScanListingQuery};

/// Response code the service reports for a successful call.
pub const SUCCESS_CODE: &str = "SUCCESS";

/// Body of a `POST /search/...` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchRequest {
    #[serde(rename = "ServiceRequest")]
    service_request: ServiceRequest,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
struct ServiceRequest {
    preferences: Preferences,
    filters: Filters,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
struct Preferences {
    limit_results: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
struct Filters {
    #[serde(rename = "Criteria")]
    criteria: Vec<Criterion>,
}

impl From<&ScanListingQuery> for SearchRequest {
    fn from(query: &ScanListingQuery) -> Self {
        Self {
            service_request: ServiceRequest {
                preferences: Preferences {
                    limit_results: query.limit_results(),
                },
                filters: Filters {
                    criteria: query.criteria(),
                },
            },
        }
    }
}

/// Decoded body of a search response.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SearchResponse {
    #[serde(rename = "ServiceResponse", default)]
    service_response: Option<ServiceResponse>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ServiceResponse {
    #[serde(default)]
    response_code: Option<String>,
    #[serde(default)]
    data: Option<Vec<Value>>,
}

impl SearchResponse {
    /// Identifiers listed in the response, in service order.
    ///
    /// `record_type` names the preferred record in each entry (`wasscan` matches
    /// `WasScan`). Entries without an identifier are skipped with a warning.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError::Rejected`] when the service reports a response code
    /// other than `SUCCESS`.
    pub fn into_scan_ids(
        self,
        operation: &'static str,
        record_type: &str,
    ) -> Result<Vec<ScanId>, RemoteError> {
        let Some(response) = self.service_response else {
            return Ok(Vec::new());
        };
        if let Some(code) = response.response_code
            && code != SUCCESS_CODE
        {
            return Err(RemoteError::Rejected { operation, code });
        }

        let entries = response.data.unwrap_or_default();
        let mut scan_ids = Vec::with_capacity(entries.len());
        for (position, entry) in entries.iter().enumerate() {
            match entry
                .as_object()
                .and_then(|entry| record_id(entry, record_type))
            {
                Some(scan_id) => scan_ids.push(scan_id),
                None => warn!(position, "listing entry without a scan id skipped"),
            }
        }
        Ok(scan_ids)
    }
}

fn record_id(entry: &Map<String, Value>, record_type: &str) -> Option<ScanId> {
    let preferred = entry
        .iter()
        .filter(|(key, _)| key.eq_ignore_ascii_case(record_type))
        .map(|(_, record)| record);
    let others = entry
        .iter()
        .filter(|(key, _)| !key.eq_ignore_ascii_case(record_type))
        .map(|(_, record)| record);
    preferred
        .chain(others)
        .filter_map(Value::as_object)
        .find_map(|record| record.get("id").and_then(id_value))
}

fn id_value(value: &Value) -> Option<ScanId> {
    match value {
        Value::Number(number) => Some(ScanId::new(number.to_string())),
        Value::String(text) if !text.trim().is_empty() => Some(ScanId::new(text.trim())),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scanvault_test_support::fixtures::run_date;
    use serde_json::json;

    fn decode(body: Value) -> Result<Vec<ScanId>, RemoteError> {
        let response: SearchResponse =
            serde_json::from_value(body).expect("response shape decodes");
        response.into_scan_ids("scan listing", "wasscan")
    }

    fn rendered(ids: &[ScanId]) -> Vec<&str> {
        ids.iter().map(ScanId::as_str).collect()
    }

    #[test]
    fn search_request_matches_service_shape() {
        let query = ScanListingQuery::finished_on(run_date(), 1_000);
        let body = serde_json::to_value(SearchRequest::from(&query)).expect("request serializes");
        assert_eq!(
            body,
            json!({
                "ServiceRequest": {
                    "preferences": {"limitResults": 1000},
                    "filters": {"Criteria": [
                        {"field": "launchedDate", "operator": "EQUALS", "value": "2024-05-14"},
                        {"field": "status", "operator": "EQUALS", "value": "FINISHED"}
                    ]}
                }
            })
        );
    }

    #[test]
    fn numeric_and_string_ids_are_rendered_as_text() {
        let ids = decode(json!({
            "ServiceResponse": {
                "responseCode": "SUCCESS",
                "data": [
                    {"WasScan": {"id": 123}},
                    {"WasScan": {"id": "456"}}
                ]
            }
        }))
        .expect("listing decodes");
        assert_eq!(rendered(&ids), ["123", "456"]);
    }

    #[test]
    fn missing_sections_mean_no_matches() {
        assert!(decode(json!({})).expect("empty object").is_empty());
        assert!(
            decode(json!({"ServiceResponse": {"responseCode": "SUCCESS"}}))
                .expect("no data")
                .is_empty()
        );
        assert!(
            decode(json!({"ServiceResponse": {"responseCode": "SUCCESS", "data": []}}))
                .expect("empty data")
                .is_empty()
        );
    }

    #[test]
    fn entries_without_ids_are_skipped() {
        let ids = decode(json!({
            "ServiceResponse": {
                "data": [
                    {"WasScan": {"name": "nightly"}},
                    {"WasScan": {"id": 7}},
                    "garbage"
                ]
            }
        }))
        .expect("listing decodes");
        assert_eq!(rendered(&ids), ["7"]);
    }

    #[test]
    fn matching_record_type_wins_over_key_order() {
        let ids = decode(json!({
            "ServiceResponse": {
                "data": [
                    {"Aux": {"id": 1}, "WasScan": {"id": 2}},
                    {"Aux": {"id": 3}, "WasScan": {"name": "no id"}}
                ]
            }
        }))
        .expect("listing decodes");
        assert_eq!(rendered(&ids), ["2", "3"]);
    }

    #[test]
    fn failed_response_code_is_rejected() {
        let err = decode(json!({
            "ServiceResponse": {"responseCode": "INVALID_CREDENTIALS", "data": []}
        }))
        .expect_err("non-success code");
        assert_eq!(
            err,
            RemoteError::Rejected {
                operation: "scan listing",
                code: "INVALID_CREDENTIALS".to_string(),
            }
        );
        assert!(!err.is_retryable());
    }
}
