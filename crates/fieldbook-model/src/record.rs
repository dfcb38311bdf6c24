// SPDX-License-Identifier: Apache-2.0

use crate::value::FieldValue;
use chrono::{DateTime, NaiveDate, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// One extracted sheet row: trimmed, non-empty column header to cell value,
/// in original column order.
pub type RowData = IndexMap<String, FieldValue>;

#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum IdParseError {
    Empty,
    NotNumeric(String),
    NotPositive(i64),
}

impl Display for IdParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "record id must not be empty"),
            Self::NotNumeric(raw) => write!(f, "record id is not a number: {raw}"),
            Self::NotPositive(n) => write!(f, "record id must be positive, got {n}"),
        }
    }
}

impl std::error::Error for IdParseError {}

/// Storage-assigned record identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(i64);

impl RecordId {
    pub fn parse(input: &str) -> Result<Self, IdParseError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(IdParseError::Empty);
        }
        let n = trimmed
            .parse::<i64>()
            .map_err(|_| IdParseError::NotNumeric(trimmed.to_string()))?;
        if n <= 0 {
            return Err(IdParseError::NotPositive(n));
        }
        Ok(Self(n))
    }

    #[must_use]
    pub const fn from_row_id(n: i64) -> Self {
        Self(n)
    }

    #[must_use]
    pub const fn as_i64(self) -> i64 {
        self.0
    }
}

impl Display for RecordId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A record staged for insertion. `region` is resolved once here and never
/// recomputed for stored rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewRecord {
    pub data: RowData,
    pub uploaded_by: String,
    pub source_file: String,
    pub row_index: u32,
    pub region: String,
}

/// A persisted record. `data` keeps the original column keys and values of
/// the source row; the column set varies per upload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: RecordId,
    pub data: RowData,
    pub uploaded_by: String,
    pub source_file: String,
    pub row_index: u32,
    pub region: String,
    pub last_visit_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}
