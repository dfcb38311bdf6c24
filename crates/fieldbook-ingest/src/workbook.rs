use crate::ExtractError;
use calamine::{Data, Range, Reader, Xlsx};
use chrono::NaiveDate;
use fieldbook_model::{FieldValue, RowData};
use std::io::Cursor;

/// Read an uploaded `.xlsx` payload into an ordered row sequence.
///
/// Only the first sheet is consulted. The first row is the header row;
/// every following row becomes one `RowData` in original order. Rows whose
/// every cell is blank are dropped and do not consume a row index.
pub fn rows_from_workbook_bytes(bytes: &[u8]) -> Result<Vec<RowData>, ExtractError> {
    let mut workbook = Xlsx::new(Cursor::new(bytes))
        .map_err(|e| ExtractError(format!("unreadable workbook: {e}")))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| ExtractError("workbook has no sheets".to_string()))?
        .map_err(|e| ExtractError(format!("failed to read first sheet: {e}")))?;
    Ok(rows_from_range(&range))
}

/// Turn a cell range into row mappings. Headers are trimmed; columns whose
/// header trims to nothing contribute no entry. Blank cells under a kept
/// header become empty text so downstream code sees every column.
pub fn rows_from_range(range: &Range<Data>) -> Vec<RowData> {
    let mut rows_iter = range.rows();
    let Some(header_row) = rows_iter.next() else {
        return Vec::new();
    };
    let headers: Vec<String> = header_row
        .iter()
        .map(|cell| cell_to_value(cell).display_text().trim().to_string())
        .collect();

    let mut out = Vec::new();
    for row in rows_iter {
        let values: Vec<FieldValue> = row.iter().map(cell_to_value).collect();
        if values.iter().all(FieldValue::is_blank) {
            continue;
        }
        let mut data = RowData::new();
        for (header, value) in headers.iter().zip(values) {
            if header.is_empty() {
                continue;
            }
            data.insert(header.clone(), value);
        }
        out.push(data);
    }
    out
}

fn cell_to_value(cell: &Data) -> FieldValue {
    match cell {
        Data::Empty | Data::Error(_) => FieldValue::Text(String::new()),
        Data::String(s) => FieldValue::Text(s.clone()),
        Data::Float(f) => FieldValue::Number(*f),
        Data::Int(i) => FieldValue::Number(*i as f64),
        Data::Bool(b) => FieldValue::Text(if *b { "TRUE" } else { "FALSE" }.to_string()),
        Data::DateTime(dt) => dt
            .as_datetime()
            .map(|ndt| FieldValue::Date(ndt.date()))
            .unwrap_or_else(|| FieldValue::Number(dt.as_f64())),
        Data::DateTimeIso(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(FieldValue::Date)
            .unwrap_or_else(|_| FieldValue::Text(s.clone())),
        Data::DurationIso(s) => FieldValue::Text(s.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sheet(cells: &[(&str, u32, u32)]) -> Range<Data> {
        let max_row = cells.iter().map(|(_, r, _)| *r).max().unwrap_or(0);
        let max_col = cells.iter().map(|(_, _, c)| *c).max().unwrap_or(0);
        let mut range = Range::new((0, 0), (max_row, max_col));
        for (text, row, col) in cells {
            range.set_value((*row, *col), Data::String((*text).to_string()));
        }
        range
    }

    #[test]
    fn rows_keep_header_order_and_blank_cells() {
        let range = sheet(&[
            ("Name", 0, 0),
            ("Region", 0, 1),
            ("Phone", 0, 2),
            ("A", 1, 0),
            ("East", 1, 1),
        ]);
        let rows = rows_from_range(&range);
        assert_eq!(rows.len(), 1);
        let keys: Vec<&String> = rows[0].keys().collect();
        assert_eq!(keys, ["Name", "Region", "Phone"]);
        assert_eq!(rows[0].get("Phone"), Some(&FieldValue::Text(String::new())));
    }

    #[test]
    fn fully_blank_rows_are_dropped() {
        let range = sheet(&[("Name", 0, 0), ("A", 1, 0), ("B", 3, 0)]);
        let rows = rows_from_range(&range);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("Name"), Some(&FieldValue::from("A")));
        assert_eq!(rows[1].get("Name"), Some(&FieldValue::from("B")));
    }

    #[test]
    fn empty_headers_contribute_no_entries() {
        let range = sheet(&[("  ", 0, 0), ("Name", 0, 1), ("stray", 1, 0), ("A", 1, 1)]);
        let rows = rows_from_range(&range);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].len(), 1);
        assert_eq!(rows[0].get("Name"), Some(&FieldValue::from("A")));
    }

    #[test]
    fn headers_are_trimmed() {
        let range = sheet(&[(" Region ", 0, 0), ("East", 1, 0)]);
        let rows = rows_from_range(&range);
        assert_eq!(rows[0].get("Region"), Some(&FieldValue::from("East")));
    }

    #[test]
    fn numeric_cells_become_numbers() {
        let mut range = Range::new((0, 0), (1, 1));
        range.set_value((0, 0), Data::String("Name".to_string()));
        range.set_value((0, 1), Data::String("Count".to_string()));
        range.set_value((1, 0), Data::String("A".to_string()));
        range.set_value((1, 1), Data::Float(12.0));
        let rows = rows_from_range(&range);
        assert_eq!(rows[0].get("Count"), Some(&FieldValue::Number(12.0)));
    }

    #[test]
    fn header_only_sheet_yields_no_rows() {
        let range = sheet(&[("Name", 0, 0), ("Region", 0, 1)]);
        assert!(rows_from_range(&range).is_empty());
    }

    #[test]
    fn garbage_bytes_fail_extraction() {
        let err = rows_from_workbook_bytes(b"definitely not a zip").expect_err("must fail");
        assert!(err.0.contains("unreadable workbook"), "got: {}", err.0);
    }
}
