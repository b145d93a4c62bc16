use crate::error::RustyTableError;
use crate::geometry::range::Range;
use std::fmt::Display;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DirectionError {
    #[error("Invalid direction '{0}'")]
    UnknownDirection(String),
}

/// Direction of travel on a grid, relative to a located cell.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [Direction::Up, Direction::Down, Direction::Left, Direction::Right];

    pub const fn opposite(self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    /// Returns true when travel happens along rows.
    pub const fn is_vertical(self) -> bool {
        matches!(self, Direction::Up | Direction::Down)
    }

    /// Returns true if `range` touches the edge of `extent` on this side.
    pub fn is_border(self, range: &Range, extent: &Range) -> bool {
        match self {
            Direction::Up => range.row_lower_bound <= extent.row_lower_bound,
            Direction::Down => range.row_upper_bound >= extent.row_upper_bound,
            Direction::Left => range.col_lower_bound <= extent.col_lower_bound,
            Direction::Right => range.col_upper_bound >= extent.col_upper_bound,
        }
    }

    /// Returns the one-cell-thick strip lying `distance` steps past the leading edge of `range`.
    ///
    /// The perpendicular extent is kept as is. Returns None when the strip would fall before
    /// row or column 0. A distance of 0 yields the leading edge itself.
    pub fn shift(self, range: &Range, distance: usize) -> Option<Range> {
        match self {
            Direction::Up => range.row_lower_bound.checked_sub(distance).map(|row| Range {
                row_lower_bound: row,
                row_upper_bound: row,
                ..*range
            }),
            Direction::Down => range.row_upper_bound.checked_add(distance).map(|row| Range {
                row_lower_bound: row,
                row_upper_bound: row,
                ..*range
            }),
            Direction::Left => range.col_lower_bound.checked_sub(distance).map(|col| Range {
                col_lower_bound: col,
                col_upper_bound: col,
                ..*range
            }),
            Direction::Right => range.col_upper_bound.checked_add(distance).map(|col| Range {
                col_lower_bound: col,
                col_upper_bound: col,
                ..*range
            }),
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        }
    }
}

impl FromStr for Direction {
    type Err = RustyTableError;

    /// Accepts the direction names case-insensitively; "top" and "bottom" are aliases.
    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name.to_ascii_uppercase().as_str() {
            "UP" | "TOP" => Ok(Direction::Up),
            "DOWN" | "BOTTOM" => Ok(Direction::Down),
            "LEFT" => Ok(Direction::Left),
            "RIGHT" => Ok(Direction::Right),
            _ => Err(DirectionError::UnknownDirection(name.to_string()))?,
        }
    }
}

impl Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
