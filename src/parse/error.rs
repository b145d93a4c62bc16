use crate::spreadsheet::ProbeError;
use thiserror::Error;

/// Broad class of a parse error.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// An expected header, table or sheet is absent
    Structural,
    /// The configured geometry does not fit the sheet
    Geometry,
    /// A located value breaks a content rule
    Validation,
}

/// An error collected while parsing. Parsing never stops on these: they are returned next
/// to whatever was extracted, prefixed with the path of the entity they belong to.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("required header '{field}' not found")]
    HeaderNotFound { field: String },

    #[error("inconsistent geometry at {cell}: {source}")]
    InconsistentGeometry { cell: String, source: ProbeError },

    #[error("invalid value '{value}' at {cell}: {message}")]
    InvalidValue { cell: String, value: String, message: String },

    #[error("invalid record {index}: {message}")]
    InvalidRecord { index: usize, message: String },

    #[error("sheet is empty")]
    EmptySheet,

    #[error("no sheet matches config '{config}'")]
    SheetNotFound { config: String },

    #[error("required table '{table}' not found")]
    TableNotFound { table: String },

    #[error("{context}: {source}")]
    WithContext { context: String, source: Box<ParseError> },
}

impl ParseError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ParseError::HeaderNotFound { .. }
            | ParseError::EmptySheet
            | ParseError::SheetNotFound { .. }
            | ParseError::TableNotFound { .. } => ErrorKind::Structural,
            ParseError::InconsistentGeometry { .. } => ErrorKind::Geometry,
            ParseError::InvalidValue { .. } | ParseError::InvalidRecord { .. } => ErrorKind::Validation,
            ParseError::WithContext { source, .. } => source.kind(),
        }
    }

    /// Wraps the error with the identity of the enclosing entity.
    pub fn with_prefix(self, context: &str) -> Self {
        ParseError::WithContext {
            context: context.to_owned(),
            source: Box::new(self),
        }
    }

    /// The error without any prefix.
    pub fn root(&self) -> &ParseError {
        match self {
            ParseError::WithContext { source, .. } => source.root(),
            _ => self,
        }
    }
}

/// Prefixes every error of a level before handing them to the enclosing level.
pub(crate) fn prefixed<'a, I>(errors: I, context: &'a str) -> impl Iterator<Item = ParseError> + 'a
where
    I: IntoIterator<Item = ParseError>,
    I::IntoIter: 'a,
{
    errors.into_iter().map(move |error| error.with_prefix(context))
}
