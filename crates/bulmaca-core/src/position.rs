/// A cell coordinate on the 9×9 grid.
///
/// Rows and columns are 0-8, top-left origin. Positions are cheap to copy
/// and are the only way to address grid cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    row: u8,
    col: u8,
}

impl Position {
    /// Array containing all 81 positions in row-major order.
    pub const ALL: [Self; 81] = {
        let mut all = [Self { row: 0, col: 0 }; 81];
        let mut i = 0;
        #[expect(clippy::cast_possible_truncation)]
        while i < 81 {
            all[i] = Self {
                row: (i / 9) as u8,
                col: (i % 9) as u8,
            };
            i += 1;
        }
        all
    };

    /// Creates a position from row and column indices.
    ///
    /// # Panics
    ///
    /// Panics if `row` or `col` is not in the range 0-8.
    #[must_use]
    #[inline]
    pub fn new(row: u8, col: u8) -> Self {
        assert!(row < 9 && col < 9);
        Self { row, col }
    }

    /// Returns the row index (0-8).
    #[must_use]
    #[inline]
    pub fn row(self) -> u8 {
        self.row
    }

    /// Returns the column index (0-8).
    #[must_use]
    #[inline]
    pub fn col(self) -> u8 {
        self.col
    }

    /// Returns the index of the 3×3 box containing this position
    /// (0-8, left to right, top to bottom).
    #[must_use]
    #[inline]
    pub fn box_index(self) -> u8 {
        (self.row / 3) * 3 + self.col / 3
    }

    /// Returns the top-left position of the 3×3 box containing this position.
    #[must_use]
    #[inline]
    pub fn box_origin(self) -> Self {
        Self {
            row: (self.row / 3) * 3,
            col: (self.col / 3) * 3,
        }
    }

    /// Returns whether `other` shares a row, column, or 3×3 box with this
    /// position. A position is not its own peer.
    #[must_use]
    pub fn is_peer(self, other: Self) -> bool {
        if self == other {
            return false;
        }
        self.row == other.row || self.col == other.col || self.box_index() == other.box_index()
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "R{}C{}", self.row + 1, self.col + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_covers_grid_in_row_major_order() {
        assert_eq!(Position::ALL.len(), 81);
        assert_eq!(Position::ALL[0], Position::new(0, 0));
        assert_eq!(Position::ALL[8], Position::new(0, 8));
        assert_eq!(Position::ALL[9], Position::new(1, 0));
        assert_eq!(Position::ALL[80], Position::new(8, 8));
    }

    #[test]
    fn test_box_index() {
        assert_eq!(Position::new(0, 0).box_index(), 0);
        assert_eq!(Position::new(2, 8).box_index(), 2);
        assert_eq!(Position::new(4, 4).box_index(), 4);
        assert_eq!(Position::new(8, 0).box_index(), 6);
        assert_eq!(Position::new(8, 8).box_index(), 8);
    }

    #[test]
    fn test_peers() {
        let pos = Position::new(4, 4);
        assert!(pos.is_peer(Position::new(4, 0)));
        assert!(pos.is_peer(Position::new(0, 4)));
        assert!(pos.is_peer(Position::new(3, 3)));
        assert!(!pos.is_peer(Position::new(0, 0)));
        assert!(!pos.is_peer(pos));
    }

    #[test]
    fn test_display_is_one_based() {
        assert_eq!(Position::new(0, 0).to_string(), "R1C1");
        assert_eq!(Position::new(8, 8).to_string(), "R9C9");
    }
}
