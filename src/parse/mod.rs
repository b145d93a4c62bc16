//! # Table Recognizer
//!
//! Binds a [`TableConfig`] to a sheet. The anchor field (the first root) is searched
//! row-major across the sheet and every occurrence opens a table. Other root headers may
//! sit anywhere on the sheet; each belongs to the occurrence with the closest anchor.
//! Inside a table, headers are located by their matchers and the configured geometry leads
//! from each header to its children or its data:
//!
//! ```text
//!        A         B        C
//!   1 | Person (A1:B1)  | Note |   group "Person", direction down, distance 1
//!   2 | Name   | Age    |      |   leaves found among the cells one step below A1:B1
//!   3 | Ann    | 30     | x    |   data runs start one step below each leaf
//!   4 | Bob    | 25     |      |
//! ```
//!
//! Errors never stop the walk: a missing header or an inconsistent probe is recorded on
//! the affected header and its subtree is skipped, everything else carries on.
use crate::config::criteria::Criteria;
use crate::config::field::DataLayout;
use crate::config::field::FieldConfig;
use crate::config::table::TableConfig;
use crate::config::Role;
use crate::geometry::Direction;
use crate::geometry::Range;
use crate::matcher::Matcher;
use crate::parse::error::ParseError;
use crate::parse::header::Header;
use crate::parse::table::Table;
use crate::spreadsheet::cell::Cell;
use crate::spreadsheet::cell::CellValue;
use crate::spreadsheet::cells_in;
use crate::spreadsheet::probe;
use crate::spreadsheet::probe_all;
use crate::spreadsheet::GridSource;
use crate::spreadsheet::ProbeError;
use tracing::debug;
use tracing::warn;

pub mod error;
pub mod header;
pub mod record;
pub mod result;
pub mod table;

/// Reads null literals as absent values.
struct NullAware<'g> {
    grid: &'g dyn GridSource,
    criteria: &'g Criteria,
}

impl GridSource for NullAware<'_> {
    fn name(&self) -> &str {
        self.grid.name()
    }

    fn extent(&self) -> Option<Range> {
        self.grid.extent()
    }

    fn merged_range_of(&self, row: usize, col: usize) -> Option<Range> {
        self.grid.merged_range_of(row, col)
    }

    fn value_at(&self, row: usize, col: usize) -> CellValue {
        self.criteria.normalize(self.grid.value_at(row, col))
    }
}

struct Recognizer<'g, 'c> {
    grid: NullAware<'g>,
    config: &'c TableConfig,
    criteria: &'g Criteria,
    /// Sheet extent, narrowed by the criteria range
    area: Range,
}

/// Finds every occurrence of `config` on the sheet.
///
/// Errors returned next to the tables belong to the configuration as a whole (a required
/// anchor that never shows up); errors of one occurrence are kept by its [`Table`].
pub(crate) fn recognize<'c>(config: &'c TableConfig, grid: &dyn GridSource, criteria: &Criteria) -> (Vec<Table<'c>>, Vec<ParseError>) {
    let Some(extent) = grid.extent() else {
        return (Vec::new(), Vec::new());
    };
    let area = match criteria.range {
        Some(range) => range.intersection(&extent),
        None => Some(extent),
    };
    let recognizer = Recognizer {
        grid: NullAware { grid, criteria },
        config,
        criteria,
        area: area.unwrap_or(extent),
    };
    match area {
        Some(_) => recognizer.tables(),
        None => recognizer.missing_anchor(),
    }
}

impl<'g, 'c> Recognizer<'g, 'c> {
    fn tables(&self) -> (Vec<Table<'c>>, Vec<ParseError>) {
        let candidates = cells_in(&self.grid, &self.area);
        let anchor = self.config.anchor();
        let anchors: Vec<&Cell> = candidates.iter().filter(|cell| anchor.matcher.test(cell)).collect();
        if anchors.is_empty() {
            return self.missing_anchor();
        }

        let tables = (0..anchors.len()).map(|occurrence| self.table(&candidates, &anchors, occurrence)).collect();
        (tables, Vec::new())
    }

    fn missing_anchor(&self) -> (Vec<Table<'c>>, Vec<ParseError>) {
        let anchor = self.config.anchor();
        debug!("Anchor '{}' of table '{}' not found in {}", anchor.path, self.config.name, self.area);
        if anchor.necessity.is_required() && self.config.necessity.is_required() {
            (Vec::new(), vec![ParseError::HeaderNotFound { field: anchor.path.clone() }])
        } else {
            (Vec::new(), Vec::new())
        }
    }

    /// Binds the root fields of one anchor occurrence.
    ///
    /// A header of another root belongs to the occurrence whose anchor is closest to it, so
    /// roots may sit anywhere around the anchor and stacked tables keep their own headers.
    fn table(&self, candidates: &[Cell], anchors: &[&Cell], occurrence: usize) -> Table<'c> {
        let anchor = anchors[occurrence];
        debug!("Table '{}' anchored at {}", self.config.name, anchor.reference());
        let mut headers = Vec::new();
        let mut errors = Vec::new();
        for (position, id) in self.config.roots.iter().enumerate() {
            let field = self.config.field(*id);
            let found = if position == 0 {
                Some(anchor)
            } else {
                candidates
                    .iter()
                    .filter(|cell| field.matcher.test(cell))
                    .filter(|cell| nearest(anchors, cell) == Some(occurrence))
                    .min_by_key(|cell| distance(anchor, cell))
            };
            match found {
                Some(cell) => headers.push(self.bind(field, cell.clone())),
                None if field.necessity.is_required() => {
                    errors.push(ParseError::HeaderNotFound { field: field.path.clone() });
                }
                None => debug!("Optional header '{}' not found", field.path),
            }
        }
        Table::new(self.config, headers, errors)
    }

    /// Binds a located header cell and everything hanging off it.
    fn bind(&self, field: &'c FieldConfig, cell: Cell) -> Header<'c> {
        debug!("Header '{}' located at {}", field.path, cell.reference());
        let mut header = Header::new(field, cell);
        match field.role {
            Role::Leaf => match probe(&self.grid, &header.cell, field.direction, field.distance) {
                Ok(origin) => self.expand(&mut header, origin),
                Err(error) => header.errors.push(self.geometry_error(&header.cell, error)),
            },
            Role::Group => {
                let region = probe_all(&self.grid, &header.cell, field.direction, field.distance);
                if region.is_empty() {
                    let error = ProbeError::NoCell {
                        origin: header.cell.reference(),
                        direction: field.direction,
                        distance: field.distance,
                    };
                    header.errors.push(self.geometry_error(&header.cell, error));
                    return header;
                }
                for id in &field.children {
                    let child = self.config.field(*id);
                    match region.iter().find(|cell| child.matcher.test(cell)) {
                        Some(cell) => header.children.push(self.bind(child, cell.clone())),
                        None if child.necessity.is_required() => {
                            header.errors.push(ParseError::HeaderNotFound { field: child.path.clone() });
                        }
                        None => debug!("Optional header '{}' not found", child.path),
                    }
                }
            }
        }
        header
    }

    /// Collects the data run of a leaf starting at `origin` and checks every value.
    fn expand(&self, header: &mut Header<'c>, origin: Cell) {
        let field = header.config;
        let Some(data) = field.data() else {
            return;
        };
        header.data = match data.layout {
            DataLayout::Fixed(count) => self.fixed_run(origin, field.direction, count, &mut header.errors),
            DataLayout::Unfixed => self.unfixed_run(origin, field.direction, None, &mut header.errors),
            DataLayout::Mixed => self.unfixed_run(origin, field.direction, data.boundary_matcher(), &mut header.errors),
        };
        debug!("Data of '{}': {} cell(s) from {}", field.path, header.data.len(), header.cell.reference());

        if let Some(matcher) = data.value_matcher() {
            for (index, cell) in header.data.iter().enumerate() {
                if let Err(mismatch) = matcher.check(&cell.value) {
                    let error = ParseError::InvalidValue {
                        cell: cell.reference(),
                        value: cell.value.to_string(),
                        message: mismatch.to_string(),
                    };
                    header.mismatches.insert(index, error);
                }
            }
        }
    }

    /// Exactly `count` cells; cells past the used area are read as absent.
    fn fixed_run(&self, origin: Cell, direction: Direction, count: usize, errors: &mut Vec<ParseError>) -> Vec<Cell> {
        let mut cells = vec![origin];
        while cells.len() < count {
            let last = &cells[cells.len() - 1];
            match probe(&self.grid, last, direction, 1) {
                Ok(next) => cells.push(next),
                Err(error) => {
                    errors.push(self.geometry_error(last, error));
                    break;
                }
            }
        }
        cells
    }

    /// Consumes cells until the area border, a header of the table, the boundary (if any),
    /// or one of the limits set by the criteria.
    fn unfixed_run(&self, origin: Cell, direction: Direction, boundary: Option<&Matcher<Cell>>, errors: &mut Vec<ParseError>) -> Vec<Cell> {
        let mut cells = Vec::new();
        let mut cell = origin;
        loop {
            if self.criteria.max_run.map(|max_run| cells.len() >= max_run).unwrap_or(false) {
                break;
            }
            if !self.area.intersects(&cell.range) || self.is_header(&cell) {
                break;
            }
            if boundary.map(|boundary| boundary.test(&cell)).unwrap_or(false) {
                break;
            }
            if self.criteria.end_at_empty_cell && cell.is_empty() {
                break;
            }
            if direction.is_border(&cell.range, &self.area) {
                cells.push(cell);
                break;
            }
            match probe(&self.grid, &cell, direction, 1) {
                Ok(next) => {
                    cells.push(cell);
                    cell = next;
                }
                Err(error) => {
                    errors.push(self.geometry_error(&cell, error));
                    cells.push(cell);
                    break;
                }
            }
        }
        cells
    }

    /// Returns true if any field of the table recognizes the cell as its header.
    fn is_header(&self, cell: &Cell) -> bool {
        self.config.fields.iter().any(|field| field.matcher.test(cell))
    }

    fn geometry_error(&self, cell: &Cell, error: ProbeError) -> ParseError {
        warn!("Probe from {} on sheet '{}' failed: {}", cell.reference(), self.grid.name(), error);
        ParseError::InconsistentGeometry {
            cell: cell.reference(),
            source: error,
        }
    }
}

/// Manhattan distance between the top-left corners of two cells.
fn distance(a: &Cell, b: &Cell) -> usize {
    a.range.row_lower_bound.abs_diff(b.range.row_lower_bound) + a.range.col_lower_bound.abs_diff(b.range.col_lower_bound)
}

/// Index of the anchor closest to `cell`; ties go to the earlier occurrence.
fn nearest(anchors: &[&Cell], cell: &Cell) -> Option<usize> {
    anchors
        .iter()
        .enumerate()
        .min_by_key(|(_, anchor)| distance(anchor, cell))
        .map(|(index, _)| index)
}
