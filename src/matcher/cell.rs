//! Cell-specific matcher helpers: text content, row index, column index and column letters.
use crate::matcher::operator::ComparableOperator;
use crate::matcher::operator::StringOperator;
use crate::matcher::Matcher;
use crate::matcher::MatcherBuilder;
use crate::matcher::MatcherError;
use crate::spreadsheet::cell::Cell;
use crate::spreadsheet::cell::CellValue;

impl MatcherBuilder<Cell> {
    /// Tests the textual form of the cell value. Empty cells have no text.
    pub fn cell_text(self, operator: StringOperator, expected: &str) -> Self {
        self.text(operator, expected, |cell: &Cell| cell.value.as_text())
    }

    /// Compares the 0-based row of the cell anchor.
    pub fn row_index(self, operator: ComparableOperator, expected: usize) -> Self {
        self.compare(operator, expected, |cell: &Cell| Some(cell.range.row_lower_bound))
    }

    /// Compares the 0-based column of the cell anchor.
    pub fn col_index(self, operator: ComparableOperator, expected: usize) -> Self {
        self.compare(operator, expected, |cell: &Cell| Some(cell.range.col_lower_bound))
    }

    /// Tests the column letters of the cell anchor, e.g. "B".
    pub fn col_name(self, operator: StringOperator, expected: &str) -> Self {
        self.text(operator, expected, |cell: &Cell| Some(cell.col_name()))
    }
}

impl MatcherBuilder<CellValue> {
    /// Compares the numeric form of the value. Values without one never match.
    pub fn number(self, operator: ComparableOperator, expected: f64) -> Self {
        self.compare(operator, expected, CellValue::as_number)
    }

    /// Tests the textual form of the value.
    pub fn value_text(self, operator: StringOperator, expected: &str) -> Self {
        self.text(operator, expected, CellValue::as_text)
    }
}

impl Matcher<Cell> {
    /// Header matcher on the cell text alone, the most common case.
    pub fn text(operator: StringOperator, expected: &str) -> Result<Self, MatcherError> {
        Matcher::<Cell>::builder().cell_text(operator, expected).build()
    }

    /// Header matcher on exact cell text.
    pub fn equals(expected: &str) -> Result<Self, MatcherError> {
        Matcher::<Cell>::text(StringOperator::Equals, expected)
    }
}
