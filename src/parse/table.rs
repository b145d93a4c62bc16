use crate::config::table::TableConfig;
use crate::parse::error::prefixed;
use crate::parse::error::ParseError;
use crate::parse::header::Header;
use crate::parse::record::Record;
use crate::parse::record::RecordEntry;
use tracing::debug;

/// One occurrence of a table configuration on a sheet.
#[derive(Debug)]
pub struct Table<'c> {
    pub(crate) config: &'c TableConfig,
    pub(crate) headers: Vec<Header<'c>>,
    pub(crate) records: Vec<Record>,
    pub(crate) errors: Vec<ParseError>,
}

impl<'c> Table<'c> {
    /// Assembles the records of the bound headers and gathers every error of the table.
    /// `errors` holds the table level errors found while binding the root headers.
    pub(crate) fn new(config: &'c TableConfig, headers: Vec<Header<'c>>, mut errors: Vec<ParseError>) -> Self {
        for header in headers.iter().flat_map(|header| header.descendants()) {
            errors.extend(prefixed(header.errors.iter().cloned(), header.path()));
        }
        let records = assemble(config, &headers, &mut errors);
        Self {
            config,
            headers,
            records,
            errors,
        }
    }

    pub fn name(&self) -> &'c str {
        &self.config.name
    }

    pub fn config(&self) -> &'c TableConfig {
        self.config
    }

    pub fn headers(&self) -> &[Header<'c>] {
        &self.headers
    }

    /// The bound header of the field with the given path.
    pub fn header(&self, path: &str) -> Option<&Header<'c>> {
        self.headers.iter().find_map(|header| header.find(path))
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn into_records(self) -> Vec<Record> {
        self.records
    }

    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }
}

/// Joins the i-th data cell of every leaf header into record i, dropping records whose
/// values are all absent, then validates what is left.
fn assemble(config: &TableConfig, headers: &[Header<'_>], errors: &mut Vec<ParseError>) -> Vec<Record> {
    let leaves: Vec<&Header<'_>> = headers
        .iter()
        .flat_map(|header| header.descendants())
        .filter(|header| header.config.is_leaf())
        .collect();
    let length = leaves.iter().map(|leaf| leaf.data.len()).max().unwrap_or(0);

    let mut records = Vec::new();
    for index in 0..length {
        let record = Record {
            index,
            entries: leaves
                .iter()
                .filter_map(|leaf| {
                    leaf.data.get(index).map(|cell| RecordEntry {
                        field: leaf.field(),
                        path: leaf.path().to_owned(),
                        cell: cell.clone(),
                    })
                })
                .collect(),
        };
        if record.is_empty() {
            debug!("Record {} of table '{}' is empty, dropped", index, config.name);
            continue;
        }

        for leaf in &leaves {
            if let Some(mismatch) = leaf.mismatch(index) {
                errors.push(mismatch.clone().with_prefix(leaf.path()));
            }
        }
        for leaf in &leaves {
            let (Some(cell), Some(data)) = (leaf.data.get(index), leaf.config.data()) else {
                continue;
            };
            for validator in data.validators() {
                if !validator.needs_validate(cell) {
                    continue;
                }
                for message in validator.validate(cell) {
                    let error = ParseError::InvalidValue {
                        cell: cell.reference(),
                        value: cell.value.to_string(),
                        message,
                    };
                    errors.push(error.with_prefix(leaf.path()));
                }
            }
        }
        for validator in config.validators() {
            if !validator.needs_validate(&record) {
                continue;
            }
            for message in validator.validate(&record) {
                errors.push(ParseError::InvalidRecord { index, message });
            }
        }
        records.push(record);
    }
    records
}
