#![forbid(unsafe_code)]

pub const CRATE_NAME: &str = "fieldbook-ingest";

mod pipeline;
mod workbook;

pub use pipeline::run_ingest;
pub use workbook::{rows_from_range, rows_from_workbook_bytes};

use fieldbook_store::StoreError;

/// The uploaded file could not be turned into rows: unreadable archive, no
/// sheet, or a sheet the reader rejects.
#[derive(Debug)]
pub struct ExtractError(pub String);

impl std::fmt::Display for ExtractError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for ExtractError {}

#[derive(Debug)]
pub enum IngestError {
    /// The extracted row sequence had zero rows.
    EmptyInput,
    /// Every row was empty or an in-batch duplicate; nothing was persisted.
    NoValidRows,
    Internal(String),
    Store(StoreError),
}

impl std::fmt::Display for IngestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyInput => write!(f, "upload contains no data rows"),
            Self::NoValidRows => write!(f, "every row was empty or a duplicate"),
            Self::Internal(msg) => write!(f, "ingestion failed: {msg}"),
            Self::Store(err) => write!(f, "store rejected the batch: {err}"),
        }
    }
}

impl std::error::Error for IngestError {}

impl From<StoreError> for IngestError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}
