#![forbid(unsafe_code)]

pub const CRATE_NAME: &str = "fieldbook-store";

mod contracts;
mod sqlite;

pub use contracts::RecordStore;
pub use sqlite::SqliteStore;

/// Underlying persistence failure, not further classified. Callers treat it
/// as fatal for the current request; there are no automatic retries.
#[derive(Debug)]
pub struct StoreError(pub String);

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for StoreError {}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self(value.to_string())
    }
}
