use crate::error::RustyTableError;
use crate::matcher::MatcherError;
use regex::Regex;
use std::cmp::Ordering;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OperatorError {
    #[error("Invalid comparison operator '{0}'")]
    UnknownComparableOperator(String),

    #[error("Invalid string operator '{0}'")]
    UnknownStringOperator(String),
}

/// Comparison operators for ordered subjects.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ComparableOperator {
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
}

impl ComparableOperator {
    /// Applies the operator. Values without an ordering only satisfy `Ne`.
    pub fn apply<R: PartialOrd + ?Sized>(self, value: &R, expected: &R) -> bool {
        let ordering = value.partial_cmp(expected);
        match self {
            ComparableOperator::Lt => ordering == Some(Ordering::Less),
            ComparableOperator::Le => matches!(ordering, Some(Ordering::Less | Ordering::Equal)),
            ComparableOperator::Gt => ordering == Some(Ordering::Greater),
            ComparableOperator::Ge => matches!(ordering, Some(Ordering::Greater | Ordering::Equal)),
            ComparableOperator::Eq => ordering == Some(Ordering::Equal),
            ComparableOperator::Ne => ordering != Some(Ordering::Equal),
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            ComparableOperator::Lt => "<",
            ComparableOperator::Le => "<=",
            ComparableOperator::Gt => ">",
            ComparableOperator::Ge => ">=",
            ComparableOperator::Eq => "==",
            ComparableOperator::Ne => "!=",
        }
    }
}

impl FromStr for ComparableOperator {
    type Err = RustyTableError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name.trim().to_ascii_uppercase().as_str() {
            "<" | "LT" => Ok(ComparableOperator::Lt),
            "<=" | "LE" => Ok(ComparableOperator::Le),
            ">" | "GT" => Ok(ComparableOperator::Gt),
            ">=" | "GE" => Ok(ComparableOperator::Ge),
            "==" | "=" | "EQ" => Ok(ComparableOperator::Eq),
            "!=" | "<>" | "NE" => Ok(ComparableOperator::Ne),
            _ => Err(OperatorError::UnknownComparableOperator(name.to_string()))?,
        }
    }
}

/// Text operators. A missing string never matches any of them.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum StringOperator {
    Equals,
    EqualsIgnoreCase,
    Contains,
    /// The whole string must match the regular expression
    Matches,
    StartsWith,
    EndsWith,
}

impl StringOperator {
    /// Prepares the operator against its expected operand, compiling patterns up front.
    pub fn condition(self, expected: &str) -> Result<StringCondition, MatcherError> {
        let pattern = match self {
            StringOperator::Matches => Some(Regex::new(&format!("^(?:{})$", expected)).map_err(|source| {
                MatcherError::InvalidPattern {
                    pattern: expected.to_owned(),
                    source,
                }
            })?),
            _ => None,
        };
        Ok(StringCondition {
            operator: self,
            expected: expected.to_owned(),
            pattern,
        })
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            StringOperator::Equals => "equals",
            StringOperator::EqualsIgnoreCase => "equals_ignore_case",
            StringOperator::Contains => "contains",
            StringOperator::Matches => "matches",
            StringOperator::StartsWith => "starts_with",
            StringOperator::EndsWith => "ends_with",
        }
    }
}

impl FromStr for StringOperator {
    type Err = RustyTableError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name.trim().to_ascii_uppercase().replace('-', "_").as_str() {
            "EQUALS" => Ok(StringOperator::Equals),
            "EQUALS_IGNORE_CASE" => Ok(StringOperator::EqualsIgnoreCase),
            "CONTAINS" => Ok(StringOperator::Contains),
            "MATCHES" | "REGEX" => Ok(StringOperator::Matches),
            "STARTS_WITH" => Ok(StringOperator::StartsWith),
            "ENDS_WITH" => Ok(StringOperator::EndsWith),
            _ => Err(OperatorError::UnknownStringOperator(name.to_string()))?,
        }
    }
}

/// A string operator bound to its operand.
#[derive(Clone, Debug)]
pub struct StringCondition {
    operator: StringOperator,
    expected: String,
    pattern: Option<Regex>,
}

impl StringCondition {
    pub fn test(&self, value: Option<&str>) -> bool {
        let Some(value) = value else {
            return false;
        };
        match self.operator {
            StringOperator::Equals => value == self.expected,
            StringOperator::EqualsIgnoreCase => value.to_lowercase() == self.expected.to_lowercase(),
            StringOperator::Contains => value.contains(self.expected.as_str()),
            StringOperator::Matches => self.pattern.as_ref().map(|pattern| pattern.is_match(value)).unwrap_or(false),
            StringOperator::StartsWith => value.starts_with(self.expected.as_str()),
            StringOperator::EndsWith => value.ends_with(self.expected.as_str()),
        }
    }
}
