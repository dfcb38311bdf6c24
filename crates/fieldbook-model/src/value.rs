// SPDX-License-Identifier: Apache-2.0

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single cell value from an uploaded sheet.
///
/// Records are schema-less: every upload may carry a different column set, so
/// values stay tagged rather than being forced into a fixed shape. The
/// untagged serde form keeps the persisted JSON close to what the sheet
/// contained: `null`, a JSON number, an ISO `YYYY-MM-DD` string, or a plain
/// string. Variant order matters for deserialization: date-shaped strings
/// must be tried before the `Text` catch-all.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Null,
    Number(f64),
    Date(NaiveDate),
    Text(String),
}

impl FieldValue {
    /// Blank means "no usable content": null, or text that trims to nothing.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Null => true,
            Self::Text(s) => s.trim().is_empty(),
            Self::Number(_) | Self::Date(_) => false,
        }
    }

    /// Text form used when matching a cell against the region registry.
    #[must_use]
    pub fn display_text(&self) -> String {
        match self {
            Self::Null => String::new(),
            Self::Text(s) => s.clone(),
            Self::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    format!("{}", *n as i64)
                } else {
                    format!("{n}")
                }
            }
            Self::Date(d) => d.format("%Y-%m-%d").to_string(),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}
