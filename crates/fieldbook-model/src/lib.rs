// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]

pub const CRATE_NAME: &str = "fieldbook-model";

mod record;
mod region;
mod value;

pub use record::{IdParseError, NewRecord, Record, RecordId, RowData};
pub use region::{RegionRegistry, DEFAULT_REGIONS};
pub use value::FieldValue;
