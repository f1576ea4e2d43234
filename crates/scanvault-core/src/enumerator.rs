//! Work set discovery: one listing query per run.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{info, warn};

use crate::error::{CoreError, CoreResult};
use crate::model::{ScanId, ScanListingQuery};
use crate::service::ScanListing;

/// Produces the identifiers of scans finished on a given day.
#[derive(Clone)]
pub struct WorkEnumerator {
    listing: Arc<dyn ScanListing>,
    limit_results: u32,
}

impl WorkEnumerator {
    /// Construct an enumerator over `listing`, capping results at `limit_results`.
    #[must_use]
    pub fn new(listing: Arc<dyn ScanListing>, limit_results: u32) -> Self {
        Self {
            listing,
            limit_results,
        }
    }

    /// Query once for scans launched on `date` with status `FINISHED`.
    ///
    /// An empty result is a valid "nothing to do" answer. Duplicate identifiers are
    /// dropped so no two workers ever write the same key.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::ListingUnavailable`] when the listing call fails; no
    /// partial listing is returned.
    pub async fn list_finished_scans(&self, date: NaiveDate) -> CoreResult<Vec<ScanId>> {
        let query = ScanListingQuery::finished_on(date, self.limit_results);
        let listed = self
            .listing
            .search(&query)
            .await
            .map_err(|source| CoreError::ListingUnavailable { source })?;

        let listed_count = listed.len();
        let mut seen = HashSet::with_capacity(listed_count);
        let scan_ids: Vec<ScanId> = listed
            .into_iter()
            .filter(|scan_id| seen.insert(scan_id.clone()))
            .collect();
        if scan_ids.len() != listed_count {
            warn!(
                listed = listed_count,
                unique = scan_ids.len(),
                "listing returned duplicate scan identifiers"
            );
        }

        if scan_ids.is_empty() {
            info!(%date, "no finished scans found");
        } else {
            info!(%date, count = scan_ids.len(), "listing fetched");
        }
        if u32::try_from(scan_ids.len()).is_ok_and(|count| count >= self.limit_results) {
            warn!(
                limit_results = self.limit_results,
                "listing hit its result cap; later scans were not returned"
            );
        }
        Ok(scan_ids)
    }
}
