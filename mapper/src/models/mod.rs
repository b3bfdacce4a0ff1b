//! Plain value records handed to the validation engine.
//!
//! The codec (see [`crate::parser`]) flattens whatever it decodes into this
//! acyclic tree before any validator sees it:
//!
//! - [`Sheet`] - Ordered rows, addressed by 1-based row index
//! - [`Row`] - Ordered cells, addressed by 1-based column index
//! - [`Cell`] - Optional text value with its coordinates
//! - [`SheetMeta`] - Where the field header and the data rows are
//! - [`HeaderFields`] - Column index to field name lookup
//! - [`ErrorMessage`] - A validation failure for the annotator

mod message;

pub use message::{ErrorMessage, WriteStrategy};

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{SheetError, SheetResult};

// =============================================================================
// Cell
// =============================================================================

/// A single cell. `value` is `None` when the cell is absent or blank.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Cell {
    pub row_index: usize,
    pub column_index: usize,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub value: Option<String>,
}

impl Cell {
    pub fn new(row_index: usize, column_index: usize, value: Option<String>) -> Self {
        Self {
            row_index,
            column_index,
            value,
        }
    }

    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// True when the cell has no value or only whitespace.
    pub fn is_blank(&self) -> bool {
        self.value.as_deref().map_or(true, |v| v.trim().is_empty())
    }
}

// =============================================================================
// Row
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Row {
    pub index: usize,
    pub cells: Vec<Cell>,
}

impl Row {
    pub fn new(index: usize) -> Self {
        Self {
            index,
            cells: Vec::new(),
        }
    }

    /// Build a row from text values; columns start at 1, empty strings become absent.
    pub fn from_values<I, S>(index: usize, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let cells = values
            .into_iter()
            .enumerate()
            .map(|(i, v)| {
                let v: String = v.into();
                Cell::new(index, i + 1, if v.is_empty() { None } else { Some(v) })
            })
            .collect();
        Self { index, cells }
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn cell(&self, column_index: usize) -> Option<&Cell> {
        self.cells.iter().find(|c| c.column_index == column_index)
    }
}

// =============================================================================
// Sheet
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Sheet {
    pub index: usize,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub name: Option<String>,
    pub rows: Vec<Row>,
}

impl Sheet {
    pub fn new(index: usize) -> Self {
        Self {
            index,
            name: None,
            rows: Vec::new(),
        }
    }

    /// Append a row, keeping rows ordered by index.
    pub fn push_row(&mut self, row: Row) {
        match self.rows.binary_search_by_key(&row.index, |r| r.index) {
            Ok(pos) => self.rows[pos] = row,
            Err(pos) => self.rows.insert(pos, row),
        }
    }

    /// Index of the last row present, 0 for an empty sheet.
    pub fn row_count(&self) -> usize {
        self.rows.last().map_or(0, |r| r.index)
    }

    pub fn row(&self, index: usize) -> Option<&Row> {
        self.rows
            .binary_search_by_key(&index, |r| r.index)
            .ok()
            .map(|pos| &self.rows[pos])
    }

    /// Rows from `meta.data_start_row_index` through the last row.
    pub fn data_rows<'a>(&'a self, meta: &SheetMeta) -> impl Iterator<Item = &'a Row> + 'a {
        let start = meta.data_start_row_index;
        self.rows.iter().filter(move |r| r.index >= start)
    }
}

// =============================================================================
// Sheet Meta
// =============================================================================

/// Positions of the field header row and the first data row (both 1-based).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SheetMeta {
    pub field_header_row_index: usize,
    pub data_start_row_index: usize,
}

impl SheetMeta {
    pub fn new(field_header_row_index: usize, data_start_row_index: usize) -> SheetResult<Self> {
        if field_header_row_index == 0 {
            return Err(SheetError::InvalidMeta("row indices start at 1".into()));
        }
        if data_start_row_index <= field_header_row_index {
            return Err(SheetError::InvalidMeta(format!(
                "data start row {} must come after header row {}",
                data_start_row_index, field_header_row_index
            )));
        }
        Ok(Self {
            field_header_row_index,
            data_start_row_index,
        })
    }
}

impl Default for SheetMeta {
    fn default() -> Self {
        Self {
            field_header_row_index: 1,
            data_start_row_index: 2,
        }
    }
}

// =============================================================================
// Header Fields
// =============================================================================

/// Field names read from the header row, keyed by column.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderFields {
    by_column: HashMap<usize, String>,
    ordered: Vec<String>,
}

impl HeaderFields {
    pub fn from_sheet(sheet: &Sheet, meta: &SheetMeta) -> Self {
        let mut fields = Self::default();
        if let Some(row) = sheet.row(meta.field_header_row_index) {
            for cell in &row.cells {
                if let Some(name) = cell.value().map(str::trim).filter(|n| !n.is_empty()) {
                    fields.by_column.insert(cell.column_index, name.to_string());
                    fields.ordered.push(name.to_string());
                }
            }
        }
        fields
    }

    pub fn field(&self, column_index: usize) -> Option<&str> {
        self.by_column.get(&column_index).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.ordered.iter().any(|f| f == field)
    }

    /// Field names in column order.
    pub fn names(&self) -> &[String] {
        &self.ordered
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_sheet() -> Sheet {
        let mut sheet = Sheet::new(0);
        sheet.push_row(Row::from_values(1, ["code", "name", "age"]));
        sheet.push_row(Row::from_values(3, ["2", "", "19"]));
        sheet.push_row(Row::from_values(2, ["1", "std1", "18"]));
        sheet
    }

    #[test]
    fn test_rows_kept_in_index_order() {
        let sheet = sample_sheet();
        let indices: Vec<usize> = sheet.rows.iter().map(|r| r.index).collect();
        assert_eq!(indices, vec![1, 2, 3]);
        assert_eq!(sheet.row_count(), 3);
        assert!(sheet.row(4).is_none());
    }

    #[test]
    fn test_empty_string_becomes_absent() {
        let sheet = sample_sheet();
        let cell = sheet.row(3).unwrap().cell(2).unwrap();
        assert_eq!(cell.value(), None);
        assert!(cell.is_blank());
    }

    #[test]
    fn test_header_fields() {
        let sheet = sample_sheet();
        let fields = HeaderFields::from_sheet(&sheet, &SheetMeta::default());
        assert_eq!(fields.field(3), Some("age"));
        assert!(fields.contains("name"));
        assert_eq!(fields.names(), ["code", "name", "age"]);
    }

    #[test]
    fn test_data_rows_start_at_meta() {
        let sheet = sample_sheet();
        let rows: Vec<usize> = sheet.data_rows(&SheetMeta::default()).map(|r| r.index).collect();
        assert_eq!(rows, vec![2, 3]);
    }

    #[test]
    fn test_sheet_meta_rejects_overlap() {
        assert!(SheetMeta::new(2, 2).is_err());
        assert!(SheetMeta::new(0, 1).is_err());
        assert_eq!(SheetMeta::new(1, 2).unwrap(), SheetMeta::default());
    }
}
