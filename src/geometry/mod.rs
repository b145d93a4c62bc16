//! # Geometry
//!
//! Coordinate arithmetic over a grid: directions of travel, inclusive cell rectangles and
//! Excel-style references.
pub mod direction;
pub mod range;
pub mod reference;

pub use direction::Direction;
pub use range::Range;
