// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]

pub const CRATE_NAME: &str = "fieldbook-query";

use chrono::NaiveDate;
use fieldbook_model::{Record, RecordId, RegionRegistry};
use fieldbook_store::{RecordStore, StoreError};
use tracing::debug;

/// Sentinel filter value meaning "no region restriction".
const ALL_REGIONS: &str = "all";

#[derive(Debug)]
pub enum QueryError {
    /// The supplied identifier is not a well-formed record id.
    InvalidId(String),
    /// No record has the (well-formed) identifier.
    NotFound(RecordId),
    Store(StoreError),
}

impl std::fmt::Display for QueryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidId(raw) => write!(f, "invalid record id: {raw}"),
            Self::NotFound(id) => write!(f, "no record with id {id}"),
            Self::Store(err) => write!(f, "store failure: {err}"),
        }
    }
}

impl std::error::Error for QueryError {}

impl From<StoreError> for QueryError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// The region a record is filtered under.
///
/// The stored `region` field wins when non-empty. Older records were
/// persisted with an empty region even when their data carries a
/// region-labeled column, so the getter falls back to the same header
/// detection ingestion uses. The value-scan step is deliberately absent
/// here: whenever it could have produced a region, ingestion already stored
/// one, so the stored field covers that case.
#[must_use]
pub fn effective_region(registry: &RegionRegistry, record: &Record) -> String {
    let stored = record.region.trim();
    if !stored.is_empty() {
        return stored.to_string();
    }
    registry.region_from_headers(&record.data).unwrap_or_default()
}

fn region_filter(raw: Option<&str>) -> Option<String> {
    let trimmed = raw.unwrap_or_default().trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case(ALL_REGIONS) {
        return None;
    }
    Some(trimmed.to_string())
}

/// List records, newest first, optionally restricted to one region.
///
/// An absent, empty, or `"all"` filter returns everything. Otherwise a
/// record is kept when its effective region equals the filter after
/// trimming and case folding.
pub fn list_records<S: RecordStore>(
    store: &S,
    registry: &RegionRegistry,
    filter_region: Option<&str>,
) -> Result<Vec<Record>, QueryError> {
    let records = store.list_all()?;
    let Some(wanted) = region_filter(filter_region) else {
        return Ok(records);
    };
    let total = records.len();
    let filtered: Vec<Record> = records
        .into_iter()
        .filter(|record| {
            effective_region(registry, record).eq_ignore_ascii_case(&wanted)
        })
        .collect();
    debug!(
        region = %wanted,
        kept = filtered.len(),
        total,
        "filtered record listing"
    );
    Ok(filtered)
}

/// Fetch one record by its raw (client-supplied) identifier.
pub fn get_record<S: RecordStore>(store: &S, raw_id: &str) -> Result<Record, QueryError> {
    let id = RecordId::parse(raw_id).map_err(|_| QueryError::InvalidId(raw_id.to_string()))?;
    store.find_by_id(id)?.ok_or(QueryError::NotFound(id))
}

/// Set or clear a record's last visit date.
pub fn update_last_visit<S: RecordStore>(
    store: &S,
    raw_id: &str,
    date: Option<NaiveDate>,
) -> Result<Record, QueryError> {
    let id = RecordId::parse(raw_id).map_err(|_| QueryError::InvalidId(raw_id.to_string()))?;
    store
        .set_last_visit_date(id, date)?
        .ok_or(QueryError::NotFound(id))
}
