// SPDX-License-Identifier: Apache-2.0

use crate::StoreError;
use chrono::NaiveDate;
use fieldbook_model::{NewRecord, Record, RecordId};

/// Persistent record store consumed by the ingestion pipeline and the query
/// service. Schema-less on `data`: every batch may carry a different column
/// set and the store must accept all of them.
pub trait RecordStore {
    /// Persist one upload batch in a single atomic write: either every
    /// record lands or none do. Returns the assigned ids in input order.
    fn insert_many(&self, records: &[NewRecord]) -> Result<Vec<RecordId>, StoreError>;

    /// All records, newest first by creation time.
    fn list_all(&self) -> Result<Vec<Record>, StoreError>;

    fn find_by_id(&self, id: RecordId) -> Result<Option<Record>, StoreError>;

    /// Set or clear a record's last visit date. Returns the updated record,
    /// or `None` when no record has that id.
    fn set_last_visit_date(
        &self,
        id: RecordId,
        date: Option<NaiveDate>,
    ) -> Result<Option<Record>, StoreError>;
}
