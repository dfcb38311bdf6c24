use crate::{RecordStore, StoreError};
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use fieldbook_model::{NewRecord, Record, RecordId, RowData};
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::Mutex;
use tracing::debug;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// SQLite-backed record store. One connection behind a mutex; each request
/// takes the lock for the duration of its statement or transaction, which
/// keeps the bulk insert atomic without any cross-request coordination.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(
            "
            PRAGMA journal_mode=WAL;
            PRAGMA synchronous=NORMAL;
            PRAGMA temp_store=MEMORY;
            CREATE TABLE IF NOT EXISTS records (
              id INTEGER PRIMARY KEY AUTOINCREMENT,
              data TEXT NOT NULL,
              uploaded_by TEXT NOT NULL,
              source_file TEXT NOT NULL DEFAULT '',
              row_index INTEGER NOT NULL DEFAULT 0,
              region TEXT NOT NULL DEFAULT '',
              last_visit_date TEXT,
              created_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_records_created_at ON records(created_at);
            CREATE INDEX IF NOT EXISTS idx_records_region ON records(region);
            ",
        )?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>, StoreError> {
        self.conn
            .lock()
            .map_err(|_| StoreError("store connection mutex poisoned".to_string()))
    }
}

struct RawRow {
    id: i64,
    data: String,
    uploaded_by: String,
    source_file: String,
    row_index: i64,
    region: String,
    last_visit_date: Option<String>,
    created_at: String,
}

const SELECT_COLUMNS: &str =
    "id, data, uploaded_by, source_file, row_index, region, last_visit_date, created_at";

fn raw_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawRow> {
    Ok(RawRow {
        id: row.get(0)?,
        data: row.get(1)?,
        uploaded_by: row.get(2)?,
        source_file: row.get(3)?,
        row_index: row.get(4)?,
        region: row.get(5)?,
        last_visit_date: row.get(6)?,
        created_at: row.get(7)?,
    })
}

fn record_from_raw(raw: RawRow) -> Result<Record, StoreError> {
    let data: RowData = serde_json::from_str(&raw.data)
        .map_err(|e| StoreError(format!("record {} has invalid data payload: {e}", raw.id)))?;
    let created_at: DateTime<Utc> = DateTime::parse_from_rfc3339(&raw.created_at)
        .map_err(|e| StoreError(format!("record {} has invalid created_at: {e}", raw.id)))?
        .with_timezone(&Utc);
    let last_visit_date = match raw.last_visit_date {
        Some(s) => Some(
            NaiveDate::parse_from_str(&s, DATE_FORMAT)
                .map_err(|e| StoreError(format!("record {} has invalid visit date: {e}", raw.id)))?,
        ),
        None => None,
    };
    Ok(Record {
        id: RecordId::from_row_id(raw.id),
        data,
        uploaded_by: raw.uploaded_by,
        source_file: raw.source_file,
        row_index: raw.row_index as u32,
        region: raw.region,
        last_visit_date,
        created_at,
    })
}

impl RecordStore for SqliteStore {
    fn insert_many(&self, records: &[NewRecord]) -> Result<Vec<RecordId>, StoreError> {
        if records.is_empty() {
            return Ok(Vec::new());
        }
        let mut conn = self.lock()?;
        let created_at = Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true);
        let tx = conn.transaction()?;
        let mut ids = Vec::with_capacity(records.len());
        {
            let mut stmt = tx.prepare(
                "INSERT INTO records (data, uploaded_by, source_file, row_index, region, last_visit_date, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, NULL, ?6)",
            )?;
            for record in records {
                let data = serde_json::to_string(&record.data)
                    .map_err(|e| StoreError(format!("serialize record data: {e}")))?;
                stmt.execute(params![
                    data,
                    record.uploaded_by,
                    record.source_file,
                    record.row_index as i64,
                    record.region,
                    created_at,
                ])?;
                ids.push(RecordId::from_row_id(tx.last_insert_rowid()));
            }
        }
        tx.commit()?;
        debug!(count = ids.len(), "persisted record batch");
        Ok(ids)
    }

    fn list_all(&self) -> Result<Vec<Record>, StoreError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {SELECT_COLUMNS} FROM records ORDER BY created_at DESC, id DESC"
        ))?;
        let raws = stmt
            .query_map([], raw_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        raws.into_iter().map(record_from_raw).collect()
    }

    fn find_by_id(&self, id: RecordId) -> Result<Option<Record>, StoreError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {SELECT_COLUMNS} FROM records WHERE id = ?1"
        ))?;
        let mut rows = stmt.query_map(params![id.as_i64()], raw_from_row)?;
        match rows.next() {
            Some(raw) => Ok(Some(record_from_raw(raw?)?)),
            None => Ok(None),
        }
    }

    fn set_last_visit_date(
        &self,
        id: RecordId,
        date: Option<NaiveDate>,
    ) -> Result<Option<Record>, StoreError> {
        let changed = {
            let conn = self.lock()?;
            let formatted = date.map(|d| d.format(DATE_FORMAT).to_string());
            conn.execute(
                "UPDATE records SET last_visit_date = ?1 WHERE id = ?2",
                params![formatted, id.as_i64()],
            )?
        };
        if changed == 0 {
            return Ok(None);
        }
        self.find_by_id(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fieldbook_model::FieldValue;

    fn new_record(name: &str, region: &str, row_index: u32) -> NewRecord {
        let mut data = RowData::new();
        data.insert("Name".to_string(), FieldValue::from(name));
        NewRecord {
            data,
            uploaded_by: "u1".to_string(),
            source_file: "book.xlsx".to_string(),
            row_index,
            region: region.to_string(),
        }
    }

    #[test]
    fn insert_many_assigns_sequential_ids() {
        let store = SqliteStore::open_in_memory().expect("open");
        let ids = store
            .insert_many(&[new_record("A", "East", 1), new_record("B", "", 2)])
            .expect("insert");
        assert_eq!(ids.len(), 2);
        assert!(ids[0].as_i64() < ids[1].as_i64());
    }

    #[test]
    fn find_by_id_round_trips_data_and_region() {
        let store = SqliteStore::open_in_memory().expect("open");
        let ids = store
            .insert_many(&[new_record("A", "East", 1)])
            .expect("insert");
        let record = store
            .find_by_id(ids[0])
            .expect("find")
            .expect("record present");
        assert_eq!(record.region, "East");
        assert_eq!(record.row_index, 1);
        assert_eq!(record.source_file, "book.xlsx");
        assert_eq!(
            record.data.get("Name"),
            Some(&FieldValue::from("A"))
        );
        assert_eq!(record.last_visit_date, None);
    }

    #[test]
    fn find_by_id_returns_none_for_absent_record() {
        let store = SqliteStore::open_in_memory().expect("open");
        let found = store
            .find_by_id(RecordId::from_row_id(999))
            .expect("query");
        assert!(found.is_none());
    }

    #[test]
    fn list_all_is_newest_first() {
        let store = SqliteStore::open_in_memory().expect("open");
        store
            .insert_many(&[new_record("old", "", 1)])
            .expect("insert first");
        store
            .insert_many(&[new_record("new", "", 1)])
            .expect("insert second");
        let records = store.list_all().expect("list");
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].data.get("Name"), Some(&FieldValue::from("new")));
        assert_eq!(records[1].data.get("Name"), Some(&FieldValue::from("old")));
    }

    #[test]
    fn set_last_visit_date_updates_and_clears() {
        let store = SqliteStore::open_in_memory().expect("open");
        let ids = store
            .insert_many(&[new_record("A", "", 1)])
            .expect("insert");
        let date = NaiveDate::from_ymd_opt(2025, 6, 1).expect("date");

        let updated = store
            .set_last_visit_date(ids[0], Some(date))
            .expect("update")
            .expect("record present");
        assert_eq!(updated.last_visit_date, Some(date));

        let cleared = store
            .set_last_visit_date(ids[0], None)
            .expect("clear")
            .expect("record present");
        assert_eq!(cleared.last_visit_date, None);
    }

    #[test]
    fn set_last_visit_date_on_absent_record_is_none() {
        let store = SqliteStore::open_in_memory().expect("open");
        let result = store
            .set_last_visit_date(RecordId::from_row_id(42), None)
            .expect("update");
        assert!(result.is_none());
    }

    #[test]
    fn open_persists_to_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("records.sqlite");
        {
            let store = SqliteStore::open(&path).expect("open");
            store
                .insert_many(&[new_record("A", "East", 1)])
                .expect("insert");
        }
        let store = SqliteStore::open(&path).expect("reopen");
        assert_eq!(store.list_all().expect("list").len(), 1);
    }
}
