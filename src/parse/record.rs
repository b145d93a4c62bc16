use crate::config::field::FieldId;
use crate::spreadsheet::cell::Cell;
use crate::spreadsheet::cell::CellValue;
use std::collections::BTreeMap;

/// One data cell of a record, tagged with the leaf field it belongs to.
#[derive(Clone, Debug, PartialEq)]
pub struct RecordEntry {
    pub field: FieldId,
    /// Dot separated path of the field
    pub path: String,
    pub cell: Cell,
}

/// One assembled row: the i-th data cell of every leaf header of a table.
#[derive(Clone, Debug, PartialEq)]
pub struct Record {
    pub(crate) index: usize,
    pub(crate) entries: Vec<RecordEntry>,
}

impl Record {
    /// Position of the record in the data runs.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn entries(&self) -> &[RecordEntry] {
        &self.entries
    }

    pub fn cell(&self, field: FieldId) -> Option<&Cell> {
        self.entries.iter().find(|entry| entry.field == field).map(|entry| &entry.cell)
    }

    /// The value of a field, None when absent.
    pub fn get(&self, field: FieldId) -> Option<&CellValue> {
        self.cell(field).map(|cell| &cell.value).filter(|value| !value.is_empty())
    }

    /// The value of the field with the given path, None when absent.
    pub fn value(&self, path: &str) -> Option<&CellValue> {
        self.entries
            .iter()
            .find(|entry| entry.path == path)
            .map(|entry| &entry.cell.value)
            .filter(|value| !value.is_empty())
    }

    /// Field path to value, absent values included as [`CellValue::Empty`].
    pub fn to_map(&self) -> BTreeMap<String, CellValue> {
        self.entries.iter().map(|entry| (entry.path.clone(), entry.cell.value.clone())).collect()
    }

    /// Returns true if every value is absent.
    pub fn is_empty(&self) -> bool {
        self.entries.iter().all(|entry| entry.cell.is_empty())
    }
}
