use crate::error::RustyTableError;
use crate::geometry::reference::col_to_index;
use crate::geometry::reference::index_to_reference;
use crate::geometry::reference::row_to_index;
use regex::Regex;
use std::fmt::Display;
use thiserror::Error;

/// Errors related to Excel-style range parsing.
#[derive(Error, Debug)]
pub enum RangeError {
    #[error("Invalid range format '{0}'")]
    FormatError(String),
}

/// An inclusive rectangle of cells. Bounds are 0-based.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Range {
    pub row_lower_bound: usize,
    pub row_upper_bound: usize,
    pub col_lower_bound: usize,
    pub col_upper_bound: usize,
}

impl Range {
    /// Creates a range from two corners, normalizing their order.
    pub fn new(row_a: usize, col_a: usize, row_b: usize, col_b: usize) -> Self {
        Range {
            row_lower_bound: row_a.min(row_b),
            row_upper_bound: row_a.max(row_b),
            col_lower_bound: col_a.min(col_b),
            col_upper_bound: col_a.max(col_b),
        }
    }

    /// A range covering exactly one cell.
    pub fn cell(row: usize, col: usize) -> Self {
        Self::new(row, col, row, col)
    }

    pub fn contains(&self, row: usize, col: usize) -> bool {
        self.row_lower_bound <= row
            && row <= self.row_upper_bound
            && self.col_lower_bound <= col
            && col <= self.col_upper_bound
    }

    /// Returns true if both ranges share at least one cell.
    pub fn intersects(&self, other: &Range) -> bool {
        self.row_lower_bound <= other.row_upper_bound
            && other.row_lower_bound <= self.row_upper_bound
            && self.col_lower_bound <= other.col_upper_bound
            && other.col_lower_bound <= self.col_upper_bound
    }

    /// Returns the overlapping part of both ranges.
    pub fn intersection(&self, other: &Range) -> Option<Range> {
        self.intersects(other).then(|| Range {
            row_lower_bound: self.row_lower_bound.max(other.row_lower_bound),
            row_upper_bound: self.row_upper_bound.min(other.row_upper_bound),
            col_lower_bound: self.col_lower_bound.max(other.col_lower_bound),
            col_upper_bound: self.col_upper_bound.min(other.col_upper_bound),
        })
    }

    pub fn is_single_cell(&self) -> bool {
        self.row_lower_bound == self.row_upper_bound && self.col_lower_bound == self.col_upper_bound
    }

    /// Iterates over every (row, col) position, row by row.
    pub fn positions(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        (self.row_lower_bound..=self.row_upper_bound)
            .flat_map(move |row| (self.col_lower_bound..=self.col_upper_bound).map(move |col| (row, col)))
    }
}

impl TryFrom<&str> for Range {
    type Error = RustyTableError;

    /// Parses an Excel-style range string (e.g., "A1", "B2:C5").
    /// A single reference yields a one-cell range.
    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let pattern = Regex::new(r"^([A-Z]+)(\d+)(:([A-Z]+)(\d+))?$").expect("Hardcode regex pattern");
        let value = value.trim().to_ascii_uppercase();
        let captures = pattern
            .captures(value.as_str())
            .ok_or(RangeError::FormatError(value.to_owned()))?;
        let position = |col: usize, row: usize| {
            captures
                .get(col)
                .map(|matcher| matcher.as_str())
                .and_then(col_to_index)
                .zip(captures.get(row).map(|matcher| matcher.as_str()).and_then(row_to_index))
        };
        let (col_a, row_a) = position(1, 2).ok_or(RangeError::FormatError(value.to_owned()))?;
        let (col_b, row_b) = if captures.get(3).is_some() {
            position(4, 5).ok_or(RangeError::FormatError(value.to_owned()))?
        } else {
            (col_a, row_a)
        };
        Ok(Range::new(row_a, col_a, row_b, col_b))
    }
}

impl Display for Range {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let start = index_to_reference(self.row_lower_bound, self.col_lower_bound);
        if self.is_single_cell() {
            write!(f, "{}", start)
        } else {
            let end = index_to_reference(self.row_upper_bound, self.col_upper_bound);
            write!(f, "{}:{}", start, end)
        }
    }
}
