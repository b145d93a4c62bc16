use crate::geometry::Range;
use crate::spreadsheet::cell::CellValue;
use std::collections::HashSet;

/// Options tuning how sheets are scanned and data runs are expanded.
#[derive(Clone, Debug)]
pub struct Criteria {
    /// Area searched for headers and data (default: the whole sheet).
    pub(crate) range: Option<Range>,

    /// null literals (default: empty string)
    pub(crate) nulls: HashSet<String>,

    /// Stop unfixed and mixed runs at the first absent cell.
    pub(crate) end_at_empty_cell: bool,

    /// Maximum number of cells consumed by one unfixed or mixed run.
    pub(crate) max_run: Option<usize>,
}

impl Default for Criteria {
    fn default() -> Self {
        Self {
            range: None,
            nulls: HashSet::from(["".to_string()]),
            end_at_empty_cell: false,
            max_run: None,
        }
    }
}

impl Criteria {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_range(mut self, range: Range) -> Self {
        self.range = Some(range);
        self
    }

    /// Replaces the null literals. Text equal to any of them is read as an absent value.
    pub fn with_nulls<I, S>(mut self, nulls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.nulls = nulls.into_iter().map(Into::into).collect();
        self
    }

    pub fn end_at_empty_cell(mut self, end_at_empty_cell: bool) -> Self {
        self.end_at_empty_cell = end_at_empty_cell;
        self
    }

    pub fn with_max_run(mut self, max_run: usize) -> Self {
        self.max_run = Some(max_run);
        self
    }

    pub fn range(&self) -> Option<Range> {
        self.range
    }

    /// Returns true if the value is absent or a null literal.
    pub fn is_null(&self, value: &CellValue) -> bool {
        match value {
            CellValue::Empty => true,
            CellValue::Text(text) => self.nulls.contains(text),
            _ => false,
        }
    }

    /// Reads null literals as absent values.
    pub(crate) fn normalize(&self, value: CellValue) -> CellValue {
        if self.is_null(&value) {
            CellValue::Empty
        } else {
            value
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn default_nulls() {
        let criteria = Criteria::default();
        assert!(criteria.is_null(&CellValue::Empty));
        assert!(criteria.is_null(&CellValue::from("")));
        assert!(!criteria.is_null(&CellValue::from("N/A")));
        assert_eq!(criteria.range(), None);
    }

    #[test]
    fn custom_nulls() {
        let criteria = Criteria::new().with_nulls(["N/A", "-"]);
        assert_eq!(criteria.normalize(CellValue::from("N/A")), CellValue::Empty);
        assert_eq!(criteria.normalize(CellValue::from("")), CellValue::from(""));
        assert_eq!(criteria.normalize(CellValue::Number(0.0)), CellValue::Number(0.0));
    }
}
