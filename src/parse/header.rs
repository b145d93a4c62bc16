use crate::config::field::FieldConfig;
use crate::config::field::FieldId;
use crate::parse::error::ParseError;
use crate::spreadsheet::cell::Cell;
use std::collections::BTreeMap;

/// A field bound to the sheet: the located header cell with its data run (leaf) or its
/// child headers (group).
#[derive(Debug)]
pub struct Header<'c> {
    pub(crate) config: &'c FieldConfig,
    pub(crate) cell: Cell,
    pub(crate) data: Vec<Cell>,
    pub(crate) children: Vec<Header<'c>>,
    /// Structural and geometry errors of this header
    pub(crate) errors: Vec<ParseError>,
    /// Value matcher failures, keyed by data index
    pub(crate) mismatches: BTreeMap<usize, ParseError>,
}

impl<'c> Header<'c> {
    pub(crate) fn new(config: &'c FieldConfig, cell: Cell) -> Self {
        Self {
            config,
            cell,
            data: Vec::new(),
            children: Vec::new(),
            errors: Vec::new(),
            mismatches: BTreeMap::new(),
        }
    }

    pub fn config(&self) -> &'c FieldConfig {
        self.config
    }

    pub fn field(&self) -> FieldId {
        self.config.id
    }

    pub fn path(&self) -> &'c str {
        &self.config.path
    }

    pub fn cell(&self) -> &Cell {
        &self.cell
    }

    pub fn data(&self) -> &[Cell] {
        &self.data
    }

    pub fn children(&self) -> &[Header<'c>] {
        &self.children
    }

    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    /// The value matcher failure of the data cell at `index`, if any.
    pub fn mismatch(&self, index: usize) -> Option<&ParseError> {
        self.mismatches.get(&index)
    }

    /// This header and all its descendants, in pre-order.
    pub fn descendants(&self) -> Vec<&Header<'c>> {
        let mut headers = vec![self];
        for child in &self.children {
            headers.extend(child.descendants());
        }
        headers
    }

    /// Finds the header of the field with the given path in this subtree.
    pub fn find(&self, path: &str) -> Option<&Header<'c>> {
        self.descendants().into_iter().find(|header| header.path() == path)
    }
}
