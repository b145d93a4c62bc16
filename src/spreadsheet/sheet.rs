use crate::geometry::Range;
use crate::spreadsheet::cell::CellValue;
use crate::spreadsheet::GridSource;
use crate::spreadsheet::Workbook;
use std::collections::HashMap;

/// An in-memory sheet: values indexed by position plus merged regions.
#[derive(Clone, Debug, Default)]
pub struct Sheet {
    /// Sheet name
    pub(crate) name: String,
    /// Values indexed by (row, col)
    values: HashMap<(usize, usize), CellValue>,
    /// Merged regions, non-overlapping
    merged: Vec<Range>,
    /// Actual data range (determined from pushed cells and merged regions)
    pub(crate) row_lower_bound: Option<usize>,
    pub(crate) row_upper_bound: Option<usize>,
    pub(crate) col_lower_bound: Option<usize>,
    pub(crate) col_upper_bound: Option<usize>,
}

impl Sheet {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            ..Default::default()
        }
    }

    /// Builds a sheet from rows of values starting at A1. Empty values are skipped.
    pub fn from_rows<V, R>(name: &str, rows: R) -> Self
    where
        V: Into<CellValue>,
        R: IntoIterator,
        R::Item: IntoIterator<Item = V>,
    {
        let mut sheet = Self::new(name);
        for (row, values) in rows.into_iter().enumerate() {
            for (col, value) in values.into_iter().enumerate() {
                sheet.push(row, col, value);
            }
        }
        sheet
    }

    /// Returns true if the sheet contains no cells.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty() && self.merged.is_empty()
    }

    /// Stores a value, updating the data range. Empty values only clear the position.
    pub fn push<V: Into<CellValue>>(&mut self, row: usize, col: usize, value: V) {
        let value = value.into();
        if value.is_empty() {
            self.values.remove(&(row, col));
        } else {
            self.update_bound(row, col);
            self.values.insert((row, col), value);
        }
    }

    /// Registers a merged region. The top-left value becomes the value of the whole region.
    pub fn merge(&mut self, range: Range) {
        self.merged.retain(|merged| !merged.intersects(&range));
        self.update_bound(range.row_lower_bound, range.col_lower_bound);
        self.update_bound(range.row_upper_bound, range.col_upper_bound);
        self.merged.push(range);
    }

    /// Updates the actual data range boundaries based on cell positions.
    fn update_bound(&mut self, row: usize, col: usize) {
        if self.row_lower_bound.map(|row_lower_bound| row < row_lower_bound).unwrap_or(true) {
            self.row_lower_bound = Some(row);
        }
        if self.row_upper_bound.map(|row_upper_bound| row_upper_bound < row).unwrap_or(true) {
            self.row_upper_bound = Some(row);
        }
        if self.col_lower_bound.map(|col_lower_bound| col < col_lower_bound).unwrap_or(true) {
            self.col_lower_bound = Some(col);
        }
        if self.col_upper_bound.map(|col_upper_bound| col_upper_bound < col).unwrap_or(true) {
            self.col_upper_bound = Some(col);
        }
    }
}

impl GridSource for Sheet {
    fn name(&self) -> &str {
        &self.name
    }

    fn extent(&self) -> Option<Range> {
        Some(Range {
            row_lower_bound: self.row_lower_bound?,
            row_upper_bound: self.row_upper_bound?,
            col_lower_bound: self.col_lower_bound?,
            col_upper_bound: self.col_upper_bound?,
        })
    }

    fn merged_range_of(&self, row: usize, col: usize) -> Option<Range> {
        self.merged.iter().find(|range| range.contains(row, col)).copied()
    }

    fn value_at(&self, row: usize, col: usize) -> CellValue {
        self.values.get(&(row, col)).cloned().unwrap_or_default()
    }
}

/// An in-memory document made of named sheets.
#[derive(Clone, Debug, Default)]
pub struct MemoryWorkbook {
    pub(crate) name: String,
    pub(crate) sheets: Vec<Sheet>,
}

impl MemoryWorkbook {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            sheets: Vec::new(),
        }
    }

    pub fn with_sheet(mut self, sheet: Sheet) -> Self {
        self.sheets.push(sheet);
        self
    }
}

impl Workbook for MemoryWorkbook {
    fn name(&self) -> &str {
        &self.name
    }

    fn sheets(&self) -> Vec<&dyn GridSource> {
        self.sheets.iter().map(|sheet| sheet as &dyn GridSource).collect()
    }
}
