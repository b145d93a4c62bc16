//! End-to-end extraction scenarios: sheets in, records and errors out.

use anyhow::anyhow;
use pretty_assertions::assert_eq;
use std::collections::BTreeMap;

use rusty_table::config::field::DataConfig;
use rusty_table::config::field::FieldBuilder;
use rusty_table::config::table::SheetConfig;
use rusty_table::config::table::TableConfig;
use rusty_table::config::table::WorkbookConfig;
use rusty_table::geometry::Direction;
use rusty_table::geometry::Range;
use rusty_table::matcher::operator::ComparableOperator;
use rusty_table::matcher::operator::StringOperator;
use rusty_table::matcher::script::Bindings;
use rusty_table::matcher::script::CompiledScript;
use rusty_table::matcher::script::ScriptEvaluator;
use rusty_table::matcher::script::SCRIPT_VALUE_KEY;
use rusty_table::matcher::Matcher;
use rusty_table::parse::record::Record;
use rusty_table::spreadsheet::cell::Cell;
use rusty_table::spreadsheet::cell::CellValue;
use rusty_table::spreadsheet::sheet::MemoryWorkbook;
use rusty_table::spreadsheet::sheet::Sheet;
use rusty_table::validator::FnValidator;
use rusty_table::validator::MatcherValidator;
use rusty_table::Criteria;
use rusty_table::ErrorKind;
use rusty_table::ParseError;
use rusty_table::parse_sheet;
use rusty_table::parse_workbook;

fn header(text: &str) -> Matcher<Cell> {
    Matcher::<Cell>::equals(text).unwrap()
}

fn column(name: &str) -> FieldBuilder {
    FieldBuilder::leaf(name, header(name)).direction(Direction::Down).data(DataConfig::unfixed())
}

fn sheet_config(table: TableConfig) -> SheetConfig {
    SheetConfig::builder("config").table(table).build().unwrap()
}

fn people() -> Sheet {
    let mut sheet = Sheet::new("People");
    sheet.push(0, 0, "Name");
    sheet.push(0, 1, "Age");
    sheet.push(1, 0, "Ann");
    sheet.push(1, 1, "30");
    sheet.push(2, 0, "Bob");
    sheet.push(2, 1, "25");
    // Row 3 exists but holds nothing.
    sheet.push(3, 0, "");
    sheet.push(3, 1, "");
    sheet
}

fn map(pairs: &[(&str, &str)]) -> BTreeMap<String, CellValue> {
    pairs.iter().map(|(key, value)| (key.to_string(), CellValue::from(*value))).collect()
}

#[test]
fn name_and_age_records() {
    let config = sheet_config(TableConfig::builder("people").field(column("Name")).field(column("Age")).build().unwrap());
    let result = parse_sheet(&config, &people(), &Criteria::default());

    assert!(result.is_ok());
    let table = result.table("people").unwrap();
    let records: Vec<BTreeMap<String, CellValue>> = table.records().iter().map(Record::to_map).collect();
    assert_eq!(records, vec![map(&[("Name", "Ann"), ("Age", "30")]), map(&[("Name", "Bob"), ("Age", "25")])]);

    let age = table.config().find("Age").unwrap().id();
    assert_eq!(table.records()[1].get(age), Some(&CellValue::from("25")));
    assert_eq!(table.records()[1].index(), 1);
}

#[test]
fn root_order_does_not_matter() {
    let config = sheet_config(TableConfig::builder("people").field(column("Age")).field(column("Name")).build().unwrap());
    let result = parse_sheet(&config, &people(), &Criteria::default());

    assert!(result.errors().is_empty());
    let records: Vec<BTreeMap<String, CellValue>> = result.records("people").into_iter().map(Record::to_map).collect();
    assert_eq!(records, vec![map(&[("Name", "Ann"), ("Age", "30")]), map(&[("Name", "Bob"), ("Age", "25")])]);
}

#[test]
fn lookups_take_short_lived_names() {
    let config = sheet_config(TableConfig::builder("people").field(column("Name")).build().unwrap());
    let result = parse_sheet(&config, &people(), &Criteria::default());

    let tables = result.tables_named(&String::from("people"));
    assert_eq!(tables.count(), 1);
    assert!(result.table(&"people".to_string()).is_some());
    assert_eq!(result.records(&"people".to_owned()).len(), 2);
}

#[test]
fn missing_required_total() {
    let config = sheet_config(
        TableConfig::builder("totals")
            .field(FieldBuilder::leaf("Total", header("Total")).direction(Direction::Right).data(DataConfig::fixed(1)))
            .build()
            .unwrap(),
    );
    let result = parse_sheet(&config, &people(), &Criteria::default());

    assert!(result.tables().is_empty());
    assert_eq!(result.errors().len(), 1);
    let error = &result.errors()[0];
    assert_eq!(error.kind(), ErrorKind::Structural);
    assert_eq!(error.to_string(), "totals: required header 'Total' not found");
    assert!(result.errors().iter().all(|error| error.kind() != ErrorKind::Validation));
}

#[test]
fn failing_value_predicate_keeps_the_value() {
    let mut sheet = people();
    sheet.push(1, 1, "-5");
    let non_negative = Matcher::<CellValue>::builder()
        .number(ComparableOperator::Ge, 0.0)
        .message("must not be negative")
        .build()
        .unwrap();
    let config = sheet_config(
        TableConfig::builder("people")
            .field(column("Name"))
            .field(FieldBuilder::leaf("Age", header("Age")).direction(Direction::Down).data(DataConfig::unfixed().matcher(non_negative)))
            .build()
            .unwrap(),
    );
    let result = parse_sheet(&config, &sheet, &Criteria::default());

    let table = result.table("people").unwrap();
    assert_eq!(table.records().len(), 2);
    assert_eq!(table.records()[0].value("Age"), Some(&CellValue::from("-5")));
    assert_eq!(
        table.errors().iter().map(ToString::to_string).collect::<Vec<_>>(),
        vec!["Age: invalid value '-5' at B2: must not be negative".to_owned()]
    );
    assert_eq!(table.errors()[0].kind(), ErrorKind::Validation);
    assert_eq!(result.errors()[0].to_string(), "people: Age: invalid value '-5' at B2: must not be negative");
}

#[test]
fn partially_present_records_are_kept() {
    let sheet = Sheet::from_rows(
        "People",
        vec![vec!["Name", "Age"], vec!["Ann", ""], vec!["", ""], vec!["", "40"]],
    );
    let config = sheet_config(TableConfig::builder("people").field(column("Name")).field(column("Age")).build().unwrap());
    let result = parse_sheet(&config, &sheet, &Criteria::default());

    let records = result.records("people");
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].value("Name"), Some(&CellValue::from("Ann")));
    assert_eq!(records[0].value("Age"), None);
    assert_eq!(records[1].index(), 2);
    assert_eq!(records[1].value("Age"), Some(&CellValue::from("40")));
}

#[test]
fn mismatches_of_dropped_records_are_dropped() {
    let sheet = Sheet::from_rows("People", vec![vec!["Name"], vec!["Ann"], vec![""], vec!["Bob"]]);
    let present = Matcher::<CellValue>::builder().non_null().message("missing").build().unwrap();
    let config = sheet_config(
        TableConfig::builder("people")
            .field(FieldBuilder::leaf("Name", header("Name")).direction(Direction::Down).data(DataConfig::unfixed().matcher(present)))
            .build()
            .unwrap(),
    );
    let result = parse_sheet(&config, &sheet, &Criteria::default());

    assert_eq!(result.records("people").len(), 2);
    assert!(result.is_ok());
}

#[test]
fn fixed_layout_ignores_the_sheet_size() {
    let sheet = Sheet::from_rows("Report", vec![vec!["Quarter", "Q1", "Q2"]]);
    let config = sheet_config(
        TableConfig::builder("quarters")
            .field(FieldBuilder::leaf("Quarter", header("Quarter")).direction(Direction::Right).data(DataConfig::fixed(4)))
            .build()
            .unwrap(),
    );
    let result = parse_sheet(&config, &sheet, &Criteria::default());

    let table = result.table("quarters").unwrap();
    assert_eq!(table.header("Quarter").unwrap().data().len(), 4);
    // The two trailing cells lie past the sheet and form all-absent records.
    assert_eq!(table.records().len(), 2);
}

#[test]
fn unfixed_run_stops_at_the_next_header() {
    // Two stacked tables sharing the same layout.
    let sheet = Sheet::from_rows(
        "People",
        vec![vec!["Name"], vec!["Ann"], vec!["Bob"], vec!["Name"], vec!["Cid"]],
    );
    let config = sheet_config(TableConfig::builder("people").field(column("Name")).build().unwrap());
    let result = parse_sheet(&config, &sheet, &Criteria::default());

    let tables: Vec<usize> = result.tables_named("people").map(|table| table.records().len()).collect();
    assert_eq!(tables, vec![2, 1]);
}

#[test]
fn unfixed_run_stops_at_another_root_header() {
    let sheet = Sheet::from_rows("Invoice", vec![vec!["Name"], vec!["Ann"], vec!["Bob"], vec!["Total"], vec!["100"]]);
    let config = sheet_config(
        TableConfig::builder("invoice")
            .field(column("Name"))
            .field(FieldBuilder::leaf("Total", header("Total")).direction(Direction::Down).data(DataConfig::fixed(1)))
            .build()
            .unwrap(),
    );
    let result = parse_sheet(&config, &sheet, &Criteria::default());

    assert!(result.is_ok());
    let table = result.table("invoice").unwrap();
    let name = table.header("Name").unwrap();
    assert_eq!(name.data().len(), 2);
    assert_eq!(name.data()[1].reference(), "A3");
    let total = table.header("Total").unwrap();
    assert_eq!(total.cell().reference(), "A4");
    assert_eq!(total.data()[0].value, CellValue::from("100"));
    assert_eq!(table.records().len(), 2);
}

#[test]
fn group_headers_over_merged_cells() {
    let mut sheet = Sheet::from_rows(
        "People",
        vec![
            vec!["Id", "Person", ""],
            vec!["", "Name", "Age"],
            vec!["1", "Ann", "30"],
            vec!["2", "Bob", "25"],
        ],
    );
    sheet.merge(Range::try_from("A1:A2").unwrap());
    sheet.merge(Range::try_from("B1:C1").unwrap());
    let config = sheet_config(
        TableConfig::builder("people")
            .field(FieldBuilder::leaf("Id", header("Id")).direction(Direction::Down).data(DataConfig::unfixed()))
            .field(
                FieldBuilder::group("Person", header("Person"))
                    .direction(Direction::Down)
                    .child(column("Name"))
                    .child(column("Age")),
            )
            .build()
            .unwrap(),
    );
    let result = parse_sheet(&config, &sheet, &Criteria::default());

    assert!(result.is_ok(), "{:?}", result.errors());
    let records: Vec<BTreeMap<String, CellValue>> = result.records("people").into_iter().map(Record::to_map).collect();
    assert_eq!(
        records,
        vec![
            map(&[("Id", "1"), ("Person.Name", "Ann"), ("Person.Age", "30")]),
            map(&[("Id", "2"), ("Person.Name", "Bob"), ("Person.Age", "25")]),
        ]
    );
}

#[test]
fn field_and_record_validators() {
    let sheet = Sheet::from_rows(
        "People",
        vec![vec!["Name", "Age"], vec!["Ann", "30"], vec!["bob", "200"]],
    );
    let capitalized = Matcher::<Cell>::builder()
        .cell_text(StringOperator::Matches, "[A-Z].*")
        .message("must be capitalized")
        .build()
        .unwrap();
    let config = sheet_config(
        TableConfig::builder("people")
            .field(
                FieldBuilder::leaf("Name", header("Name"))
                    .direction(Direction::Down)
                    .data(DataConfig::unfixed().validator(MatcherValidator::new(capitalized))),
            )
            .field(column("Age"))
            .validator(FnValidator::rule(
                |record: &Record| record.value("Age").and_then(CellValue::as_number).map(|age| age < 150.0).unwrap_or(true),
                "age out of range",
            ))
            .build()
            .unwrap(),
    );
    let result = parse_sheet(&config, &sheet, &Criteria::default());

    assert_eq!(
        result.errors().iter().map(ToString::to_string).collect::<Vec<_>>(),
        vec![
            "people: Name: invalid value 'bob' at A3: must be capitalized".to_owned(),
            "people: invalid record 1: age out of range".to_owned(),
        ]
    );
    assert_eq!(result.records("people").len(), 2);
}

/// Understands "value <op> <number>" only.
struct Comparisons;

struct Comparison(ComparableOperator, f64);

impl ScriptEvaluator for Comparisons {
    fn compile(&self, source: &str) -> anyhow::Result<Box<dyn CompiledScript>> {
        let mut tokens = source.split_whitespace();
        if tokens.next() != Some(SCRIPT_VALUE_KEY) {
            return Err(anyhow!("expected '{}'", SCRIPT_VALUE_KEY));
        }
        let operator: ComparableOperator = tokens.next().ok_or_else(|| anyhow!("missing operator"))?.parse()?;
        let operand: f64 = tokens.next().ok_or_else(|| anyhow!("missing operand"))?.parse()?;
        Ok(Box::new(Comparison(operator, operand)))
    }
}

impl CompiledScript for Comparison {
    fn evaluate(&self, bindings: &Bindings) -> anyhow::Result<bool> {
        let value = bindings
            .get(SCRIPT_VALUE_KEY)
            .and_then(CellValue::as_number)
            .ok_or_else(|| anyhow!("not a number"))?;
        Ok(self.0.apply(&value, &self.1))
    }
}

#[test]
fn scripted_value_matcher() {
    let matcher = Matcher::<CellValue>::builder()
        .script(&Comparisons, "value >= 18")
        .message("must be an adult")
        .build()
        .unwrap();
    let config = sheet_config(
        TableConfig::builder("people")
            .field(column("Name"))
            .field(FieldBuilder::leaf("Age", header("Age")).direction(Direction::Down).data(DataConfig::unfixed().matcher(matcher)))
            .build()
            .unwrap(),
    );
    let sheet = Sheet::from_rows("People", vec![vec!["Name", "Age"], vec!["Ann", "30"], vec!["Bob", "12"], vec!["Cid", "n/a"]]);
    let result = parse_sheet(&config, &sheet, &Criteria::default());

    assert_eq!(
        result.errors().iter().map(ToString::to_string).collect::<Vec<_>>(),
        vec![
            "people: Age: invalid value '12' at B3: must be an adult".to_owned(),
            "people: Age: invalid value 'n/a' at B4: must be an adult".to_owned(),
        ]
    );
    assert!(Matcher::<CellValue>::builder().script(&Comparisons, "age >= 18").build().is_err());
}

#[test]
fn workbook_aggregation() {
    let people_table = || TableConfig::builder("people").field(column("Name")).build().unwrap();
    let config = WorkbookConfig::new()
        .sheet(SheetConfig::builder("people").sheet_name("People*").table(people_table()).build().unwrap())
        .sheet(SheetConfig::builder("archive").sheet_name("Archive").table(people_table()).build().unwrap())
        .sheet(SheetConfig::builder("notes").sheet_name("Notes").optional().table(people_table()).build().unwrap());
    let workbook = MemoryWorkbook::new("book.xlsx")
        .with_sheet(Sheet::from_rows("People 2023", vec![vec!["Name"], vec!["Ann"]]))
        .with_sheet(Sheet::from_rows("People 2024", vec![vec!["Nom"], vec!["Bob"]]))
        .with_sheet(Sheet::new("Summary"));

    let result = parse_workbook(&config, &workbook, &Criteria::default());

    assert_eq!(result.sheets().len(), 2);
    assert_eq!(result.tables_named("people").count(), 1);
    assert_eq!(result.sheet("People 2023").unwrap().records("people").len(), 1);
    assert_eq!(
        result.errors().iter().map(ToString::to_string).collect::<Vec<_>>(),
        vec![
            "People 2024: people: required header 'Name' not found".to_owned(),
            "no sheet matches config 'archive'".to_owned(),
        ]
    );
    assert!(matches!(result.errors()[1], ParseError::SheetNotFound { .. }));
}

#[test]
fn empty_and_missing_tables() {
    let config = sheet_config(TableConfig::builder("people").field(column("Name").optional()).build().unwrap());

    let result = parse_sheet(&config, &Sheet::new("Blank"), &Criteria::default());
    assert_eq!(result.errors(), &[ParseError::EmptySheet]);

    let result = parse_sheet(&config, &people(), &Criteria::new().with_range(Range::try_from("A5:B9").unwrap()));
    assert_eq!(result.errors(), &[ParseError::TableNotFound { table: "people".to_owned() }]);
}
