use std::str::FromStr;

use crate::Position;

/// A 9×9 matrix of cell values 0-9 where 0 denotes an empty cell.
///
/// This is plain storage: it carries no notion of givens or rule checks.
/// Puzzle semantics live in the engine crate.
///
/// # Example
///
/// ```
/// use bulmaca_core::{Grid, Position};
///
/// let mut grid = Grid::new();
/// assert_eq!(grid.filled_count(), 0);
///
/// grid.set(Position::new(0, 0), 5);
/// assert_eq!(grid.get(Position::new(0, 0)), 5);
/// assert_eq!(grid.filled_count(), 1);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Grid([[u8; 9]; 9]);

impl Grid {
    /// Creates an empty grid (all cells 0).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a grid from row-major rows.
    ///
    /// # Panics
    ///
    /// Panics if any value is greater than 9.
    #[must_use]
    pub fn from_rows(rows: [[u8; 9]; 9]) -> Self {
        for row in &rows {
            for &value in row {
                assert!(value <= 9, "cell value out of range: {value}");
            }
        }
        Self(rows)
    }

    /// Returns the row-major rows of this grid.
    #[must_use]
    pub fn to_rows(self) -> [[u8; 9]; 9] {
        self.0
    }

    /// Returns the value at the given position (0 = empty).
    #[must_use]
    #[inline]
    pub fn get(&self, pos: Position) -> u8 {
        self.0[usize::from(pos.row())][usize::from(pos.col())]
    }

    /// Sets the value at the given position.
    ///
    /// # Panics
    ///
    /// Panics if `value` is greater than 9.
    #[inline]
    pub fn set(&mut self, pos: Position, value: u8) {
        assert!(value <= 9, "cell value out of range: {value}");
        self.0[usize::from(pos.row())][usize::from(pos.col())] = value;
    }

    /// Returns the number of nonzero cells.
    #[must_use]
    pub fn filled_count(&self) -> usize {
        Position::ALL
            .iter()
            .filter(|&&pos| self.get(pos) != 0)
            .count()
    }

    /// Returns whether every cell is nonzero.
    #[must_use]
    pub fn is_full(&self) -> bool {
        Position::ALL.iter().all(|&pos| self.get(pos) != 0)
    }
}

/// An error which can be returned when parsing a [`Grid`].
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum ParseGridError {
    /// The input did not contain exactly 81 cells.
    #[display("expected 81 cells, found {_0}")]
    BadLength(#[error(not(source))] usize),
    /// The input contained a character that is not a digit or `.`.
    #[display("invalid cell character: {_0:?}")]
    BadChar(#[error(not(source))] char),
}

impl FromStr for Grid {
    type Err = ParseGridError;

    /// Parses 81 cell characters in row-major order; `.` and `0` denote
    /// empty cells. Whitespace is ignored.
    ///
    /// # Example
    ///
    /// ```
    /// use bulmaca_core::{Grid, Position};
    ///
    /// let grid: Grid = format!("53{}", ".".repeat(79)).parse().unwrap();
    /// assert_eq!(grid.get(Position::new(0, 0)), 5);
    /// assert_eq!(grid.get(Position::new(0, 1)), 3);
    /// assert_eq!(grid.get(Position::new(0, 2)), 0);
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut grid = Self::new();
        let mut count = 0;
        for ch in s.chars().filter(|ch| !ch.is_whitespace()) {
            let value = match ch {
                '.' | '0' => 0,
                '1'..='9' => ch as u8 - b'0',
                _ => return Err(ParseGridError::BadChar(ch)),
            };
            if count < 81 {
                grid.set(Position::ALL[count], value);
            }
            count += 1;
        }
        if count != 81 {
            return Err(ParseGridError::BadLength(count));
        }
        Ok(grid)
    }
}

impl std::fmt::Display for Grid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for pos in Position::ALL {
            match self.get(pos) {
                0 => f.write_str(".")?,
                value => write!(f, "{value}")?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn test_parse_rejects_bad_input() {
        assert_eq!(
            "123".parse::<Grid>(),
            Err(ParseGridError::BadLength(3))
        );
        assert_eq!(
            format!("x{}", ".".repeat(80)).parse::<Grid>(),
            Err(ParseGridError::BadChar('x'))
        );
        assert_eq!(
            format!("1{}", ".".repeat(81)).parse::<Grid>(),
            Err(ParseGridError::BadLength(82))
        );
    }

    #[test]
    fn test_is_full_with_single_hole() {
        let mut grid: Grid = "1".repeat(81).parse().unwrap();
        assert!(grid.is_full());

        grid.set(Position::new(4, 7), 0);
        assert!(!grid.is_full());
        assert_eq!(grid.filled_count(), 80);
    }

    proptest! {
        #[test]
        fn prop_display_parse_round_trip(cells in prop::collection::vec(0u8..=9, 81)) {
            let mut grid = Grid::new();
            for (i, &value) in cells.iter().enumerate() {
                grid.set(Position::ALL[i], value);
            }
            let parsed: Grid = grid.to_string().parse().unwrap();
            prop_assert_eq!(parsed, grid);
        }
    }
}
