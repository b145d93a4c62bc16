use thiserror::Error;

/// Main error type for building table configurations.
/// Aggregates errors from dependencies and internal modules.
#[derive(Error, Debug)]
pub enum RustyTableError {
    #[error("{0}")]
    WithContextError(String),

    // Third-party library errors
    #[error("{0}")]
    PatternError(#[from] glob::PatternError),

    // Geometry module errors
    #[error("{0}")]
    RangeError(#[from] crate::geometry::range::RangeError),

    #[error("{0}")]
    DirectionError(#[from] crate::geometry::direction::DirectionError),

    // Matcher module errors
    #[error("{0}")]
    OperatorError(#[from] crate::matcher::operator::OperatorError),

    #[error("{0}")]
    MatcherError(#[from] crate::matcher::MatcherError),

    // Config module errors
    #[error("{0}")]
    ConfigError(#[from] crate::config::ConfigError),
}

pub(crate) trait ResultMessage {
    fn with_prefix(self, message: &str) -> Self;
}

impl<T> ResultMessage for Result<T, RustyTableError> {
    fn with_prefix(self, message: &str) -> Self {
        self.map_err(|e| RustyTableError::WithContextError(format!("{}: {}", message, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigError;
    use pretty_assertions::assert_eq;

    #[test]
    fn prefixes_nest() {
        let result: Result<(), RustyTableError> = Err(ConfigError::EmptyTable.into());
        let error = result.with_prefix("People").with_prefix("Sheet1").unwrap_err();
        assert_eq!(error.to_string(), "Sheet1: People: Table must have at least one field");
    }
}
