//! # Configuration Model
//!
//! Declarative descriptions of what to extract. Field trees are assembled with
//! [`field::FieldBuilder`] and frozen into a [`table::TableConfig`], whose arena owns every
//! [`field::FieldConfig`]. Configuration is immutable once built and shared by reference
//! with every parse.
use crate::error::RustyTableError;
use std::fmt::Display;
use std::str::FromStr;
use thiserror::Error;

pub mod criteria;
pub mod field;
pub mod table;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Root field must declare a direction")]
    MissingDirection,

    #[error("Distance must be at least 1")]
    ZeroDistance,

    #[error("Group field must have at least one child")]
    EmptyGroup,

    #[error("Leaf field cannot have children")]
    ChildrenOnLeaf,

    #[error("Leaf field must declare its data")]
    MissingData,

    #[error("Group field cannot declare data")]
    DataOnGroup,

    #[error("Fixed data layout must cover at least one cell")]
    EmptyFixedLayout,

    #[error("Boundary matcher requires a mixed data layout")]
    BoundaryWithoutMixed,

    #[error("Duplicate field '{0}'")]
    DuplicateField(String),

    #[error("Table must have at least one field")]
    EmptyTable,

    #[error("Sheet must have at least one table")]
    EmptySheet,

    #[error("Invalid necessity '{0}'")]
    UnknownNecessity(String),
}

/// Whether a missing header (or table, or sheet) is an error.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Necessity {
    #[default]
    Required,
    Optional,
}

impl Necessity {
    pub fn is_required(self) -> bool {
        self == Necessity::Required
    }
}

impl FromStr for Necessity {
    type Err = RustyTableError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name.trim().to_ascii_uppercase().as_str() {
            "REQUIRED" => Ok(Necessity::Required),
            "OPTIONAL" => Ok(Necessity::Optional),
            _ => Err(ConfigError::UnknownNecessity(name.to_string()))?,
        }
    }
}

impl Display for Necessity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Necessity::Required => write!(f, "required"),
            Necessity::Optional => write!(f, "optional"),
        }
    }
}

/// A group header owns child headers; a leaf header owns a run of data cells.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Role {
    Group,
    Leaf,
}
