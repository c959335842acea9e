//! Donor directory: the records fetched for one page view and the filter
//! that derives the visible subset from them.

use serde::Deserialize;

use crate::backend::Backend;
use crate::error::Error;

pub mod models;

pub use models::{BloodGroup, DonorRecord};

/// Raw `?q=&blood_group=` query input as the browser sends it.
#[derive(Deserialize, Debug, Default, Clone)]
pub struct FilterParams {
    pub q: Option<String>,
    pub blood_group: Option<String>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FilterCriteria {
    pub search: String,
    pub blood_group: Option<BloodGroup>,
}

impl FilterCriteria {
    pub fn new(search: impl Into<String>, blood_group: Option<BloodGroup>) -> Self {
        Self {
            search: search.into(),
            blood_group,
        }
    }

    pub fn from_params(params: &FilterParams) -> Self {
        Self {
            search: params.q.clone().unwrap_or_default(),
            blood_group: BloodGroup::from_selection(params.blood_group.as_deref()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.search.is_empty() && self.blood_group.is_none()
    }

    pub fn matches(&self, donor: &DonorRecord) -> bool {
        let matches_search = if self.search.is_empty() {
            true
        } else {
            let needle = self.search.to_lowercase();
            donor.name.to_lowercase().contains(&needle)
                || donor.address.to_lowercase().contains(&needle)
        };

        let matches_group = match self.blood_group {
            Some(group) => donor.blood_group == group,
            None => true,
        };

        matches_search && matches_group
    }
}

/// Returns the records matching `criteria`, in their original order.
pub fn filter<'a>(records: &'a [DonorRecord], criteria: &FilterCriteria) -> Vec<&'a DonorRecord> {
    records.iter().filter(|donor| criteria.matches(donor)).collect()
}

/// Owned variant of [`filter`] for callers that keep the result.
pub fn apply(records: &[DonorRecord], criteria: &FilterCriteria) -> Vec<DonorRecord> {
    filter(records, criteria).into_iter().cloned().collect()
}

#[derive(Debug, Clone, PartialEq)]
pub enum DirectoryStatus {
    Loading,
    Ready(Vec<DonorRecord>),
    Failed(String),
}

/// Directory contents for a single view activation. Fetches once and is
/// dropped with the view.
#[derive(Debug)]
pub struct DirectoryStore {
    status: DirectoryStatus,
}

impl Default for DirectoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DirectoryStore {
    pub fn new() -> Self {
        Self {
            status: DirectoryStatus::Loading,
        }
    }

    /// Fetches available donors, newest first. On failure the store keeps
    /// the message and the error is returned as `DataUnavailable`.
    pub async fn load(&mut self, backend: &dyn Backend) -> Result<(), Error> {
        match backend.list_available_donors().await {
            Ok(mut donors) => {
                // The query already filters on availability; rows that slip
                // through an outdated policy are dropped here.
                donors.retain(|d| d.is_available);
                tracing::debug!(count = donors.len(), "directory loaded");
                self.status = DirectoryStatus::Ready(donors);
                Ok(())
            }
            Err(e) => {
                tracing::error!("Directory fetch failed: {}", e);
                self.status = DirectoryStatus::Failed(e.user_message());
                Err(Error::from_fetch(e))
            }
        }
    }

    pub fn status(&self) -> &DirectoryStatus {
        &self.status
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.status, DirectoryStatus::Loading)
    }

    /// Loaded records; empty while loading or after a failure.
    pub fn records(&self) -> &[DonorRecord] {
        match &self.status {
            DirectoryStatus::Ready(donors) => donors,
            DirectoryStatus::Loading | DirectoryStatus::Failed(_) => &[],
        }
    }

    pub fn total(&self) -> usize {
        self.records().len()
    }

    pub fn error(&self) -> Option<&str> {
        match &self.status {
            DirectoryStatus::Failed(message) => Some(message),
            _ => None,
        }
    }

    pub fn filtered(&self, criteria: &FilterCriteria) -> Vec<&DonorRecord> {
        filter(self.records(), criteria)
    }
}
