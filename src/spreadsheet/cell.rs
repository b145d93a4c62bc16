use crate::geometry::reference::index_to_col;
use crate::geometry::reference::index_to_reference;
use crate::geometry::Range;
use chrono::NaiveDate;
use chrono::NaiveDateTime;
use std::cmp::Ordering;
use std::fmt::Display;
use std::hash::Hash;
use std::hash::Hasher;

/// A raw cell value as yielded by a grid source.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum CellValue {
    /// No value (absent)
    #[default]
    Empty,
    /// Text values
    Text(String),
    /// Numeric values
    Number(f64),
    /// Boolean values (true/false)
    Boolean(bool),
    /// Date/time values
    DateTime(NaiveDateTime),
}

impl CellValue {
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// Returns the textual form of any present value.
    pub fn as_text(&self) -> Option<String> {
        match self {
            CellValue::Empty => None,
            CellValue::Text(value) => Some(value.to_owned()),
            _ => Some(self.to_string()),
        }
    }

    /// Returns numbers as is, and parses text holding a number.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(value) => Some(*value),
            CellValue::Text(value) => value.trim().parse::<f64>().ok(),
            _ => None,
        }
    }

    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            CellValue::Boolean(value) => Some(*value),
            CellValue::Text(value) => match value.trim().to_ascii_uppercase().as_str() {
                "TRUE" => Some(true),
                "FALSE" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }

    /// Returns date/time values as is, and parses ISO 8601 text ("2024-01-31",
    /// "2024-01-31T08:00:00", "2024-01-31 08:00:00").
    pub fn as_datetime(&self) -> Option<NaiveDateTime> {
        match self {
            CellValue::DateTime(value) => Some(*value),
            CellValue::Text(value) => {
                let value = value.trim();
                NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
                    .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f"))
                    .ok()
                    .or_else(|| {
                        NaiveDate::parse_from_str(value, "%Y-%m-%d")
                            .ok()
                            .and_then(|date| date.and_hms_opt(0, 0, 0))
                    })
            }
            _ => None,
        }
    }

    /// Orders two values of the same kind; numbers also compare with numeric text.
    pub fn compare(&self, other: &CellValue) -> Option<Ordering> {
        match (self, other) {
            (CellValue::Text(a), CellValue::Text(b)) => Some(a.cmp(b)),
            (CellValue::Boolean(a), CellValue::Boolean(b)) => Some(a.cmp(b)),
            (CellValue::DateTime(a), CellValue::DateTime(b)) => Some(a.cmp(b)),
            (CellValue::Number(_), _) | (_, CellValue::Number(_)) => {
                self.as_number()?.partial_cmp(&other.as_number()?)
            }
            _ => None,
        }
    }
}

impl PartialOrd for CellValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.compare(other)
    }
}

impl Display for CellValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Text(value) => write!(f, "{}", value),
            CellValue::Number(value) if value.fract() == 0.0 && value.abs() < 1e15 => {
                write!(f, "{}", *value as i64)
            }
            CellValue::Number(value) => write!(f, "{}", value),
            CellValue::Boolean(value) => write!(f, "{}", if *value { "true" } else { "false" }),
            CellValue::DateTime(value) => write!(f, "{}", value.format("%Y-%m-%d %H:%M:%S")),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_owned())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Number(value as f64)
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        CellValue::Boolean(value)
    }
}

impl From<NaiveDateTime> for CellValue {
    fn from(value: NaiveDateTime) -> Self {
        CellValue::DateTime(value)
    }
}

/// One logical cell of a sheet.
///
/// A probe landing anywhere inside a merged region yields the same cell: equality and
/// hashing use the sheet and the covering range only, never the probe coordinate.
#[derive(Clone, Debug)]
pub struct Cell {
    /// Name of the owning sheet
    pub sheet: String,
    /// Probe row index (0-based)
    pub row: usize,
    /// Probe column index (0-based)
    pub col: usize,
    /// Covering range: the merged region, or the cell itself
    pub range: Range,
    /// Value of the cell (the anchor's value for merged regions)
    pub value: CellValue,
}

impl Cell {
    /// Returns the Excel-style reference of the covering range (e.g. "B2" or "A1:C1").
    pub fn reference(&self) -> String {
        self.range.to_string()
    }

    /// Returns the reference of the top-left (anchor) position.
    pub fn anchor_reference(&self) -> String {
        index_to_reference(self.range.row_lower_bound, self.range.col_lower_bound)
    }

    /// Column letters of the anchor position.
    pub fn col_name(&self) -> String {
        index_to_col(self.range.col_lower_bound)
    }

    pub fn is_merged(&self) -> bool {
        !self.range.is_single_cell()
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    /// Row-major position of the anchor, used to order cells.
    pub fn position(&self) -> (usize, usize) {
        (self.range.row_lower_bound, self.range.col_lower_bound)
    }
}

impl PartialEq for Cell {
    fn eq(&self, other: &Self) -> bool {
        self.sheet == other.sheet && self.range == other.range
    }
}

impl Eq for Cell {}

impl Hash for Cell {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.sheet.hash(state);
        self.range.hash(state);
    }
}

impl Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.value)
    }
}
