// SPDX-License-Identifier: Apache-2.0

use crate::record::RowData;
use serde::{Deserialize, Serialize};

pub const DEFAULT_REGIONS: &[&str] = &["North", "South", "East", "West", "Central", "North East"];

const REGION_HEADER: &str = "region";

/// The fixed, ordered set of canonical region names. Built once at startup
/// and injected wherever resolution happens; never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegionRegistry {
    names: Vec<String>,
}

impl Default for RegionRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_REGIONS.iter().map(|s| (*s).to_string()))
    }
}

impl RegionRegistry {
    /// Entries are trimmed; blanks are dropped. Order is preserved.
    pub fn new<I: IntoIterator<Item = String>>(names: I) -> Self {
        let names = names
            .into_iter()
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .collect();
        Self { names }
    }

    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Case-insensitive, whitespace-trimmed lookup. Returns the registry's
    /// own casing, not the candidate's.
    #[must_use]
    pub fn match_canonical(&self, candidate: &str) -> Option<&str> {
        let wanted = candidate.trim();
        if wanted.is_empty() {
            return None;
        }
        self.names
            .iter()
            .find(|name| name.eq_ignore_ascii_case(wanted))
            .map(String::as_str)
    }

    /// Resolve the region for one row. First-match-wins, in strict order:
    ///
    /// 1. a header named exactly `region` (trimmed, case-insensitive) with a
    ///    non-empty value — canonicalized through the registry when it
    ///    matches, kept verbatim when it does not (registry membership is
    ///    advisory for explicit region columns);
    /// 2. any header merely *containing* `region`, same value handling;
    /// 3. the first cell value, in column order, that exactly matches a
    ///    canonical region;
    /// 4. empty string.
    ///
    /// An explicit region column always outranks incidental cell values, and
    /// exact header naming outranks fuzzy header naming.
    #[must_use]
    pub fn resolve_row(&self, row: &RowData) -> String {
        if let Some(region) = self.region_from_headers(row) {
            return region;
        }
        for value in row.values() {
            let text = value.display_text();
            if let Some(canonical) = self.match_canonical(&text) {
                return canonical.to_string();
            }
        }
        String::new()
    }

    /// Steps 1 and 2 of `resolve_row`: region-named headers only, no value
    /// scan. The query side uses this directly for records whose stored
    /// region is empty — older rows were persisted before the value-scan
    /// step existed, so header detection alone must reproduce what
    /// ingestion would have stored for them.
    #[must_use]
    pub fn region_from_headers(&self, row: &RowData) -> Option<String> {
        let exact = row
            .iter()
            .find(|(header, _)| header.trim().to_lowercase() == REGION_HEADER)
            .and_then(|(_, value)| self.usable_region_value(value));
        if exact.is_some() {
            return exact;
        }
        row.iter()
            .find(|(header, _)| header.trim().to_lowercase().contains(REGION_HEADER))
            .and_then(|(_, value)| self.usable_region_value(value))
    }

    fn usable_region_value(&self, value: &crate::FieldValue) -> Option<String> {
        let text = value.display_text();
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(
            self.match_canonical(trimmed)
                .map_or_else(|| trimmed.to_string(), ToString::to_string),
        )
    }
}
