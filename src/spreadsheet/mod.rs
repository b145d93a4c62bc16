//! # Grid Access
//!
//! The capability interfaces through which the recognizer reads a sheet, and the
//! merge-aware probe that walks from one located cell to another.
//!
//! Opening workbooks is the host's business: anything that can answer "what is at
//! (row, col)" and "which merged region covers (row, col)" implements [`GridSource`].
//! [`sheet::Sheet`] is an in-memory implementation for already materialized data.
use crate::geometry::Direction;
use crate::geometry::Range;
use crate::spreadsheet::cell::Cell;
use crate::spreadsheet::cell::CellValue;
use std::collections::HashSet;
use thiserror::Error;

pub mod cell;
pub mod sheet;

/// Probe failures. Both mean the configured geometry does not fit the sheet.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProbeError {
    #[error("no cell {distance} step(s) {direction} of {origin}")]
    NoCell { origin: String, direction: Direction, distance: usize },

    #[error("{count} cells found {distance} step(s) {direction} of {origin}, expected exactly one")]
    Ambiguous { origin: String, direction: Direction, distance: usize, count: usize },
}

/// Read access to one materialized sheet.
pub trait GridSource {
    /// Sheet identity, used in cell identity and error prefixes.
    fn name(&self) -> &str;

    /// Used area of the sheet, None when the sheet holds no cell.
    fn extent(&self) -> Option<Range>;

    /// Merged region covering (row, col), if any.
    fn merged_range_of(&self, row: usize, col: usize) -> Option<Range>;

    /// Raw value stored at (row, col). Positions without a value are Empty.
    fn value_at(&self, row: usize, col: usize) -> CellValue;

    /// Returns the logical cell at (row, col): the covering merged region if any, valued by
    /// its top-left anchor. Repeated queries inside one region return equal cells.
    fn cell_at(&self, row: usize, col: usize) -> Cell {
        let range = self.merged_range_of(row, col).unwrap_or(Range::cell(row, col));
        Cell {
            sheet: self.name().to_owned(),
            row,
            col,
            range,
            value: self.value_at(range.row_lower_bound, range.col_lower_bound),
        }
    }
}

/// Read access to a whole document.
pub trait Workbook {
    fn name(&self) -> &str;

    fn sheets(&self) -> Vec<&dyn GridSource>;
}

/// Returns the distinct cells covering every position of `range`, in row-major order.
pub fn cells_in(grid: &dyn GridSource, range: &Range) -> Vec<Cell> {
    let mut seen: HashSet<Range> = HashSet::new();
    let mut cells: Vec<Cell> = Vec::new();
    for (row, col) in range.positions() {
        let cell = grid.cell_at(row, col);
        if seen.insert(cell.range) {
            cells.push(cell);
        }
    }
    cells
}

/// Returns every distinct cell reached `distance` steps from `cell` towards `direction`.
///
/// Steps are taken one at a time: a merged region can span several raw rows or columns,
/// so one logical step moves by a variable amount. Cells reached twice within a step are
/// kept once.
pub fn probe_all(grid: &dyn GridSource, cell: &Cell, direction: Direction, distance: usize) -> Vec<Cell> {
    let mut cells = vec![cell.clone()];
    for _ in 0..distance {
        let mut next: Vec<Cell> = Vec::new();
        for current in &cells {
            let Some(strip) = direction.shift(&current.range, 1) else {
                continue;
            };
            for candidate in cells_in(grid, &strip) {
                if !next.contains(&candidate) {
                    next.push(candidate);
                }
            }
        }
        cells = next;
    }
    cells
}

/// Returns the single cell `distance` steps from `cell` towards `direction`.
///
/// Finding no cell or several cells means the configured geometry is inconsistent with
/// the sheet, which is reported as an error rather than resolved by picking one.
pub fn probe(grid: &dyn GridSource, cell: &Cell, direction: Direction, distance: usize) -> Result<Cell, ProbeError> {
    let mut cells = probe_all(grid, cell, direction, distance);
    match cells.len() {
        1 => Ok(cells.remove(0)),
        0 => Err(ProbeError::NoCell {
            origin: cell.reference(),
            direction,
            distance,
        }),
        count => Err(ProbeError::Ambiguous {
            origin: cell.reference(),
            direction,
            distance,
            count,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spreadsheet::sheet::Sheet;
    use pretty_assertions::assert_eq;

    fn merged_sheet() -> Sheet {
        // A1:B1 merged "Person", A2 "Name", B2 "Age", A3:A4 merged "Ann", B3 "30", B4 "31"
        let mut sheet = Sheet::new("Sheet1");
        sheet.push(0, 0, "Person");
        sheet.push(1, 0, "Name");
        sheet.push(1, 1, "Age");
        sheet.push(2, 0, "Ann");
        sheet.push(2, 1, "30");
        sheet.push(3, 1, "31");
        sheet.merge(Range::new(0, 0, 0, 1));
        sheet.merge(Range::new(2, 0, 3, 0));
        sheet
    }

    #[test]
    fn cell_at_resolves_merged_regions() {
        let sheet = merged_sheet();
        let cell = sheet.cell_at(0, 1);
        assert_eq!(cell.range, Range::new(0, 0, 0, 1));
        assert_eq!(cell.value, CellValue::from("Person"));
        assert_eq!(cell, sheet.cell_at(0, 0));
    }

    #[test]
    fn probe_single_cell() {
        let sheet = merged_sheet();
        let name = sheet.cell_at(1, 0);
        let ann = probe(&sheet, &name, Direction::Down, 1).unwrap();
        assert_eq!(ann.value, CellValue::from("Ann"));
        // Ann spans two rows, so one more step lands on row 4.
        let below = probe(&sheet, &ann, Direction::Down, 1).unwrap();
        assert_eq!(below.range, Range::cell(4, 0));
        assert_eq!(probe(&sheet, &name, Direction::Down, 2).unwrap(), below);
    }

    #[test]
    fn probe_deduplicates_merged_targets() {
        let sheet = merged_sheet();
        let name = sheet.cell_at(1, 0);
        let age = sheet.cell_at(1, 1);
        let person = probe(&sheet, &age, Direction::Up, 1).unwrap();
        assert_eq!(person, probe(&sheet, &name, Direction::Up, 1).unwrap());
    }

    #[test]
    fn probe_fails_on_ambiguity() {
        let sheet = merged_sheet();
        let person = sheet.cell_at(0, 0);
        let error = probe(&sheet, &person, Direction::Down, 1).unwrap_err();
        assert!(matches!(error, ProbeError::Ambiguous { count: 2, .. }));
        assert_eq!(probe_all(&sheet, &person, Direction::Down, 1).len(), 2);
    }

    #[test]
    fn probe_fails_before_origin() {
        let sheet = merged_sheet();
        let person = sheet.cell_at(0, 0);
        let error = probe(&sheet, &person, Direction::Up, 1).unwrap_err();
        assert!(matches!(error, ProbeError::NoCell { .. }));
    }

    #[test]
    fn probe_beyond_extent_yields_empty_cell() {
        let sheet = merged_sheet();
        let cell = probe(&sheet, &sheet.cell_at(3, 1), Direction::Down, 5).unwrap();
        assert_eq!(cell.range, Range::cell(8, 1));
        assert!(cell.is_empty());
    }
}
