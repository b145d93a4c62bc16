use crate::config::criteria::Criteria;
use crate::config::table::SheetConfig;
use crate::config::table::WorkbookConfig;
use crate::parse::error::prefixed;
use crate::parse::error::ParseError;
use crate::parse::recognize;
use crate::parse::record::Record;
use crate::parse::table::Table;
use crate::spreadsheet::GridSource;
use crate::spreadsheet::Workbook;
use tracing::debug;
use tracing::info;

/// Tables found on one sheet, with every error of the sheet prefixed by the owning table.
#[derive(Debug)]
pub struct SheetParseResult<'c> {
    pub(crate) config: &'c SheetConfig,
    pub(crate) sheet_name: String,
    pub(crate) tables: Vec<Table<'c>>,
    pub(crate) errors: Vec<ParseError>,
}

impl<'c> SheetParseResult<'c> {
    pub fn config(&self) -> &'c SheetConfig {
        self.config
    }

    pub fn sheet_name(&self) -> &str {
        &self.sheet_name
    }

    pub fn tables(&self) -> &[Table<'c>] {
        &self.tables
    }

    /// The first table of the named table config.
    pub fn table(&self, name: &str) -> Option<&Table<'c>> {
        self.tables_named(name).next()
    }

    /// Every table of the named table config, in sheet order.
    pub fn tables_named<'a>(&'a self, name: &str) -> impl Iterator<Item = &'a Table<'c>> + 'a {
        let name = name.to_owned();
        self.tables.iter().filter(move |table| table.name() == name)
    }

    /// Records of every table of the named table config.
    pub fn records(&self, name: &str) -> Vec<&Record> {
        self.tables_named(name).flat_map(|table| table.records()).collect()
    }

    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Sheets parsed from a whole document, with every error prefixed by the sheet name.
#[derive(Debug)]
pub struct WorkbookParseResult<'c> {
    pub(crate) name: String,
    pub(crate) sheets: Vec<SheetParseResult<'c>>,
    pub(crate) errors: Vec<ParseError>,
}

impl<'c> WorkbookParseResult<'c> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sheets(&self) -> &[SheetParseResult<'c>] {
        &self.sheets
    }

    /// The parse result of the named sheet, if it was read.
    pub fn sheet(&self, sheet_name: &str) -> Option<&SheetParseResult<'c>> {
        self.sheets.iter().find(|sheet| sheet.sheet_name == sheet_name)
    }

    /// Every table of the named table config across all sheets.
    pub fn tables_named<'a>(&'a self, name: &str) -> impl Iterator<Item = &'a Table<'c>> + 'a {
        let name = name.to_owned();
        self.sheets.iter().flat_map(move |sheet| sheet.tables_named(&name))
    }

    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Looks for every table of `config` on one sheet.
pub fn parse_sheet<'c>(config: &'c SheetConfig, grid: &dyn GridSource, criteria: &Criteria) -> SheetParseResult<'c> {
    let mut result = SheetParseResult {
        config,
        sheet_name: grid.name().to_owned(),
        tables: Vec::new(),
        errors: Vec::new(),
    };
    if grid.extent().is_none() {
        debug!("Sheet '{}' is empty", grid.name());
        if config.necessity.is_required() {
            result.errors.push(ParseError::EmptySheet);
        }
        return result;
    }

    for table_config in &config.tables {
        let (tables, errors) = recognize(table_config, grid, criteria);
        if tables.is_empty() && errors.is_empty() && table_config.necessity.is_required() {
            result.errors.push(ParseError::TableNotFound {
                table: table_config.name.clone(),
            });
        }
        result.errors.extend(prefixed(errors, &table_config.name));
        for table in &tables {
            result.errors.extend(prefixed(table.errors.iter().cloned(), &table_config.name));
        }
        result.tables.extend(tables);
    }

    info!(
        "Sheet '{}' parsed with config '{}': {} table(s), {} record(s), {} error(s)",
        result.sheet_name,
        config.name,
        result.tables.len(),
        result.tables.iter().map(|table| table.records.len()).sum::<usize>(),
        result.errors.len()
    );
    result
}

/// Applies every sheet config of `config` to the sheets whose name it accepts.
pub fn parse_workbook<'c>(config: &'c WorkbookConfig, workbook: &dyn Workbook, criteria: &Criteria) -> WorkbookParseResult<'c> {
    let mut result = WorkbookParseResult {
        name: workbook.name().to_owned(),
        sheets: Vec::new(),
        errors: Vec::new(),
    };
    let grids = workbook.sheets();
    for sheet_config in &config.sheets {
        let mut matched = false;
        for grid in grids.iter().filter(|grid| sheet_config.accept(grid.name())) {
            matched = true;
            let sheet = parse_sheet(sheet_config, *grid, criteria);
            result.errors.extend(prefixed(sheet.errors.iter().cloned(), &sheet.sheet_name));
            result.sheets.push(sheet);
        }
        if !matched && sheet_config.necessity.is_required() {
            result.errors.push(ParseError::SheetNotFound {
                config: sheet_config.name.clone(),
            });
        }
    }
    info!("Workbook '{}' parsed: {} sheet(s), {} error(s)", result.name, result.sheets.len(), result.errors.len());
    result
}
