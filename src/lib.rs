//! # Rusty Table
//!
//! Declarative table extraction for loosely formatted spreadsheets. Instead of fixed
//! coordinates, a table is described by how its headers look and where their data lies
//! relative to them; the recognizer finds every occurrence on a sheet and assembles the
//! rows into validated records.
//!
//! ## Features
//!
//! - **Matchers**: composable AND/OR predicate trees over cells and values, with inherited
//!   failure messages, typed comparisons, string operators, regular expressions and
//!   scripted conditions through a pluggable [`matcher::script::ScriptEvaluator`]
//! - **Header trees**: group headers spanning child headers, merged-cell aware
//! - **Data layouts**: fixed-length, open-ended (up to the next header) and bounded runs
//! - **Validation**: value matchers, field validators and cross-field record validators
//! - **Partial results**: errors are collected with the path of what they belong to,
//!   never thrown
//!
//! ## Example
//!
//! ```
//! use rusty_table::config::field::DataConfig;
//! use rusty_table::config::field::FieldBuilder;
//! use rusty_table::config::table::SheetConfig;
//! use rusty_table::config::table::TableConfig;
//! use rusty_table::geometry::Direction;
//! use rusty_table::matcher::Matcher;
//! use rusty_table::parse::result::parse_sheet;
//! use rusty_table::spreadsheet::cell::Cell;
//! use rusty_table::spreadsheet::sheet::Sheet;
//! use rusty_table::Criteria;
//!
//! let sheet = Sheet::from_rows("People", vec![vec!["Name", "Age"], vec!["Ann", "30"], vec!["Bob", "25"]]);
//! let table = TableConfig::builder("people")
//!     .field(FieldBuilder::leaf("Name", Matcher::<Cell>::equals("Name")?).direction(Direction::Down).data(DataConfig::unfixed()))
//!     .field(FieldBuilder::leaf("Age", Matcher::<Cell>::equals("Age")?).direction(Direction::Down).data(DataConfig::unfixed()))
//!     .build()?;
//! let config = SheetConfig::builder("people").table(table).build()?;
//!
//! let result = parse_sheet(&config, &sheet, &Criteria::default());
//! let records = result.records("people");
//! assert_eq!(records.len(), 2);
//! assert_eq!(records[1].value("Name").map(ToString::to_string), Some("Bob".to_owned()));
//! # Ok::<(), rusty_table::RustyTableError>(())
//! ```
pub mod config;
pub mod error;
pub mod geometry;
pub mod matcher;
pub mod parse;
pub mod spreadsheet;
pub mod validator;

pub use config::criteria::Criteria;
pub use error::RustyTableError;
pub use parse::error::ErrorKind;
pub use parse::error::ParseError;
pub use parse::result::parse_sheet;
pub use parse::result::parse_workbook;
