use crate::IngestError;
use fieldbook_core::canonical;
use fieldbook_model::{NewRecord, RegionRegistry, RowData};
use fieldbook_store::RecordStore;
use std::collections::HashSet;
use tracing::{debug, info};

/// Ingest one upload batch: normalize each row's data mapping, drop empty
/// and duplicate rows, resolve a region per surviving row, and persist the
/// whole batch in a single bulk insert. Returns the number of records
/// created.
///
/// Duplicate detection is scoped to this call: the signature set is local
/// and dies with it, so re-uploading a file creates a fresh, independent
/// batch. Skipped rows are silent; they only reduce the created count.
pub fn run_ingest<S: RecordStore>(
    store: &S,
    registry: &RegionRegistry,
    rows: &[RowData],
    uploaded_by: &str,
    source_file: &str,
) -> Result<usize, IngestError> {
    if rows.is_empty() {
        return Err(IngestError::EmptyInput);
    }

    let mut seen: HashSet<String> = HashSet::new();
    let mut staged: Vec<NewRecord> = Vec::new();
    let mut skipped_empty = 0_usize;
    let mut skipped_duplicate = 0_usize;

    for (position, row) in rows.iter().enumerate() {
        let data: RowData = row
            .iter()
            .filter(|(header, _)| !header.trim().is_empty())
            .map(|(header, value)| (header.trim().to_string(), value.clone()))
            .collect();
        if data.is_empty() {
            skipped_empty += 1;
            debug!(row = position + 1, "skipping row with no usable columns");
            continue;
        }

        let signature = canonical::stable_json_hash_hex(&data)
            .map_err(|e| IngestError::Internal(format!("row signature failed: {e}")))?;
        if !seen.insert(signature) {
            skipped_duplicate += 1;
            debug!(row = position + 1, "skipping in-batch duplicate row");
            continue;
        }

        let region = registry.resolve_row(&data);
        staged.push(NewRecord {
            data,
            uploaded_by: uploaded_by.to_string(),
            source_file: source_file.to_string(),
            row_index: (position + 1) as u32,
            region,
        });
    }

    if staged.is_empty() {
        return Err(IngestError::NoValidRows);
    }

    let created = store.insert_many(&staged)?.len();
    info!(
        created,
        skipped_empty, skipped_duplicate, source_file, "ingested upload batch"
    );
    Ok(created)
}
