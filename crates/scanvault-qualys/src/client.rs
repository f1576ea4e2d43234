//! reqwest-backed client for the listing and download endpoints.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, RequestBuilder, Response};
use tracing::debug;
use url::Url;

use scanvault_config::{ArchiverConfig, Credentials};
use scanvault_core::{
    JSON_CONTENT_TYPE, RemoteError, ReportSource, ScanId, ScanListing, ScanListingQuery,
    ScanReport,
};

use crate::error::{QualysError, QualysResult};
use crate::wire::{SearchRequest, SearchResponse};

const HEADER_REQUESTED_WITH: &str = "x-requested-with";
const REQUESTED_WITH: &str = "scanvault";
const OP_SEARCH: &str = "scan listing";
const OP_DOWNLOAD: &str = "download";

/// Client for one scan type on one Qualys platform.
///
/// Cloning is cheap; clones share the connection pool.
#[derive(Clone)]
pub struct QualysClient {
    http: Client,
    credentials: Credentials,
    search_url: Url,
    download_url: Url,
    record_type: String,
}

impl QualysClient {
    /// Build a client from the validated archiver configuration.
    ///
    /// # Errors
    ///
    /// Fails when the HTTP client cannot be built or the endpoints cannot be
    /// derived from the base URL.
    pub fn from_config(config: &ArchiverConfig) -> QualysResult<Self> {
        Self::new(
            &config.base_url,
            &config.scan_type,
            config.credentials.clone(),
            config.request_timeout,
        )
    }

    /// Build a client for `scan_type` (for example `was/wasscan`) under `base_url`.
    ///
    /// # Errors
    ///
    /// Fails when the HTTP client cannot be built or the endpoints cannot be
    /// derived from the base URL.
    pub fn new(
        base_url: &Url,
        scan_type: &str,
        credentials: Credentials,
        timeout: Duration,
    ) -> QualysResult<Self> {
        let scan_type: Vec<&str> = scan_type
            .split('/')
            .filter(|segment| !segment.is_empty())
            .collect();
        let Some(record_type) = scan_type.last().map(|segment| (*segment).to_string()) else {
            return Err(QualysError::EmptyScanType);
        };

        let search_url = endpoint(base_url, "search", &scan_type)
            .ok_or_else(|| QualysError::invalid_endpoint(base_url))?;
        let download_url = endpoint(base_url, "download", &scan_type)
            .ok_or_else(|| QualysError::invalid_endpoint(base_url))?;

        let mut default_headers = HeaderMap::new();
        default_headers.insert(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE));
        default_headers.insert(ACCEPT, HeaderValue::from_static(JSON_CONTENT_TYPE));
        default_headers.insert(
            HeaderName::from_static(HEADER_REQUESTED_WITH),
            HeaderValue::from_static(REQUESTED_WITH),
        );

        let http = Client::builder()
            .timeout(timeout)
            .default_headers(default_headers)
            .build()
            .map_err(|source| QualysError::Build { source })?;

        Ok(Self {
            http,
            credentials,
            search_url,
            download_url,
            record_type,
        })
    }

    /// Endpoint the listing query is posted to.
    #[must_use]
    pub const fn search_url(&self) -> &Url {
        &self.search_url
    }

    /// Endpoint the report for `scan_id` is downloaded from.
    #[must_use]
    pub fn report_url(&self, scan_id: &ScanId) -> Option<Url> {
        let mut url = self.download_url.clone();
        url.path_segments_mut().ok()?.push(scan_id.as_str());
        Some(url)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request.basic_auth(
            &self.credentials.username,
            Some(&self.credentials.password),
        )
    }
}

#[async_trait]
impl ScanListing for QualysClient {
    async fn search(&self, query: &ScanListingQuery) -> Result<Vec<ScanId>, RemoteError> {
        debug!(url = %self.search_url, date = %query.launched_on(), "posting scan search");
        let response = self
            .authorized(self.http.post(self.search_url.clone()))
            .json(&SearchRequest::from(query))
            .send()
            .await
            .map_err(|err| remote_error(OP_SEARCH, &err))?;
        let body: SearchResponse = success(OP_SEARCH, response)?
            .json()
            .await
            .map_err(|err| remote_error(OP_SEARCH, &err))?;
        body.into_scan_ids(OP_SEARCH, &self.record_type)
    }
}

#[async_trait]
impl ReportSource for QualysClient {
    async fn download(&self, scan_id: &ScanId) -> Result<ScanReport, RemoteError> {
        let url = self
            .report_url(scan_id)
            .ok_or_else(|| RemoteError::Payload {
                operation: OP_DOWNLOAD,
                detail: format!("no report url for scan {scan_id}"),
            })?;
        debug!(%url, scan_id = %scan_id, "requesting report");
        let response = self
            .authorized(self.http.get(url))
            .send()
            .await
            .map_err(|err| remote_error(OP_DOWNLOAD, &err))?;
        let document = success(OP_DOWNLOAD, response)?
            .json()
            .await
            .map_err(|err| remote_error(OP_DOWNLOAD, &err))?;
        Ok(ScanReport::new(document))
    }
}

fn endpoint(base: &Url, action: &str, scan_type: &[&str]) -> Option<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .ok()?
        .pop_if_empty()
        .push(action)
        .extend(scan_type);
    Some(url)
}

fn success(operation: &'static str, response: Response) -> Result<Response, RemoteError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        debug!(operation, status = status.as_u16(), "remote returned failure status");
        Err(RemoteError::Status {
            operation,
            status: status.as_u16(),
        })
    }
}

fn remote_error(operation: &'static str, err: &reqwest::Error) -> RemoteError {
    if err.is_timeout() {
        RemoteError::Timeout {
            operation,
            detail: err.to_string(),
        }
    } else if err.is_decode() || err.is_builder() {
        RemoteError::Payload {
            operation,
            detail: err.to_string(),
        }
    } else if let Some(status) = err.status() {
        RemoteError::Status {
            operation,
            status: status.as_u16(),
        }
    } else {
        RemoteError::Transport {
            operation,
            detail: err.to_string(),
        }
    }
}
