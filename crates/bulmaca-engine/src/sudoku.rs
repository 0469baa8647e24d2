use bulmaca_core::{Grid, Position};
use rand::{Rng, seq::IndexedRandom as _};

use crate::{HintOutcome, MoveError, PuzzleBoard};

/// The number-placement board: a 9×9 grid of givens plus the player's answer.
///
/// Given cells carry their value in both grids and are permanently
/// non-editable; empty cells start at 0.
///
/// # Example
///
/// ```
/// use bulmaca_core::{Grid, Position};
/// use bulmaca_engine::{CellEdit, PuzzleBoard as _, SudokuBoard};
///
/// let givens: Grid = format!("5{}", ".".repeat(80)).parse().unwrap();
/// let mut board = SudokuBoard::new(givens);
///
/// // Givens are rejected, empty cells are editable.
/// assert!(board.apply_move(CellEdit::new(Position::new(0, 0), 1)).is_err());
/// assert!(board.apply_move(CellEdit::new(Position::new(0, 1), 3)).is_ok());
/// assert_eq!(board.value(Position::new(0, 1)), 3);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SudokuBoard {
    givens: Grid,
    answer: Grid,
}

/// A single cell edit; value 0 clears the cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellEdit {
    /// The targeted cell.
    pub pos: Position,
    /// The new value (0 = clear, 1-9 = place).
    pub value: u8,
}

impl CellEdit {
    /// Creates a cell edit.
    #[must_use]
    pub fn new(pos: Position, value: u8) -> Self {
        Self { pos, value }
    }
}

/// Counts reported by the advisory board check ("Kontrol Et").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckReport {
    /// Player-filled cells that violate row/column/box uniqueness.
    pub incorrect: usize,
    /// Editable cells still empty.
    pub empty: usize,
}

impl SudokuBoard {
    /// Creates a board from the given puzzle grid.
    ///
    /// The answer starts as a copy of the givens.
    #[must_use]
    pub fn new(givens: Grid) -> Self {
        Self {
            givens,
            answer: givens,
        }
    }

    /// Returns whether the cell is a fixed given.
    #[must_use]
    pub fn is_given(&self, pos: Position) -> bool {
        self.givens.get(pos) != 0
    }

    /// Returns the current answer value at the cell (0 = empty).
    #[must_use]
    pub fn value(&self, pos: Position) -> u8 {
        self.answer.get(pos)
    }

    /// Returns the current answer grid.
    #[must_use]
    pub fn answer(&self) -> &Grid {
        &self.answer
    }

    /// Returns whether `value` may occupy `pos` without duplicating an
    /// existing value in the same row, column, or 3×3 box.
    ///
    /// The cell at `pos` itself is excluded from the scan. This is a local
    /// pairwise-uniqueness check only; it does not prove the grid is
    /// solvable or matches the unique solution.
    #[must_use]
    pub fn is_valid_placement(&self, pos: Position, value: u8) -> bool {
        Position::ALL
            .iter()
            .filter(|&&peer| pos.is_peer(peer))
            .all(|&peer| self.answer.get(peer) != value)
    }

    /// Scans all player-filled cells and reports how many are locally
    /// inconsistent and how many editable cells remain empty.
    ///
    /// Advisory only: nothing is blocked or mutated.
    #[must_use]
    pub fn check_report(&self) -> CheckReport {
        let mut report = CheckReport {
            incorrect: 0,
            empty: 0,
        };
        for pos in Position::ALL {
            if self.is_given(pos) {
                continue;
            }
            match self.answer.get(pos) {
                0 => report.empty += 1,
                value if !self.is_valid_placement(pos, value) => report.incorrect += 1,
                _ => {}
            }
        }
        report
    }

    fn hint_targets(&self) -> Vec<Position> {
        Position::ALL
            .into_iter()
            .filter(|&pos| self.answer.get(pos) == 0 && !self.is_given(pos))
            .collect()
    }
}

impl PuzzleBoard for SudokuBoard {
    type Move = CellEdit;
    type HintPayload = Grid;

    const HINT_BUDGET: u8 = 3;
    const AUTO_DETECT_COMPLETION: bool = true;

    fn apply_move(&mut self, mov: Self::Move) -> Result<(), MoveError> {
        if mov.value > 9 {
            return Err(MoveError::ValueOutOfRange(mov.value));
        }
        if self.is_given(mov.pos) {
            return Err(MoveError::GivenCell);
        }
        self.answer.set(mov.pos, mov.value);
        Ok(())
    }

    fn apply_hint(&mut self, payload: &Grid, rng: &mut dyn Rng) -> HintOutcome {
        let targets = self.hint_targets();
        let Some(&pos) = targets.choose(rng) else {
            return HintOutcome::NoTarget;
        };
        let value = payload.get(pos);
        if value == 0 {
            return HintOutcome::NoTarget;
        }
        self.answer.set(pos, value);
        HintOutcome::Placed { pos, value }
    }

    fn is_full(&self) -> bool {
        self.answer.is_full()
    }

    #[expect(clippy::cast_possible_truncation)]
    fn completion_percentage(&self) -> u8 {
        (self.answer.filled_count() * 100 / 81) as u8
    }

    fn check_ready(&self) -> bool {
        // The advisory check is always permitted for the grid puzzle.
        true
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use rand::SeedableRng as _;
    use rand_pcg::Pcg64Mcg;

    use super::*;

    const SOLVED: &str =
        "185362947793148526246795183564239871931874265827516394318427659672951438459683712";

    fn solution() -> Grid {
        SOLVED.parse().expect("valid solution grid")
    }

    /// The solved grid with the first row blanked out.
    fn puzzle() -> Grid {
        format!("{}{}", ".".repeat(9), &SOLVED[9..])
            .parse()
            .expect("valid puzzle grid")
    }

    #[test]
    fn test_givens_are_invariant_under_moves() {
        let mut board = SudokuBoard::new(puzzle());
        let given_pos = Position::new(1, 0);
        assert!(board.is_given(given_pos));

        for value in 0..=9 {
            assert_eq!(
                board.apply_move(CellEdit::new(given_pos, value)),
                Err(MoveError::GivenCell)
            );
        }
        assert_eq!(board.value(given_pos), 7);
    }

    #[test]
    fn test_clear_and_overwrite() {
        let mut board = SudokuBoard::new(puzzle());
        let pos = Position::new(0, 0);

        board.apply_move(CellEdit::new(pos, 4)).unwrap();
        assert_eq!(board.value(pos), 4);
        board.apply_move(CellEdit::new(pos, 9)).unwrap();
        assert_eq!(board.value(pos), 9);
        board.apply_move(CellEdit::new(pos, 0)).unwrap();
        assert_eq!(board.value(pos), 0);

        assert_eq!(
            board.apply_move(CellEdit::new(pos, 12)),
            Err(MoveError::ValueOutOfRange(12))
        );
    }

    #[test]
    fn test_valid_placement_row_column_box() {
        let mut board = SudokuBoard::new(Grid::new());
        board.apply_move(CellEdit::new(Position::new(0, 0), 5)).unwrap();

        // Same row, same column, same box.
        assert!(!board.is_valid_placement(Position::new(0, 8), 5));
        assert!(!board.is_valid_placement(Position::new(8, 0), 5));
        assert!(!board.is_valid_placement(Position::new(2, 2), 5));
        // Unrelated cell, or different value.
        assert!(board.is_valid_placement(Position::new(4, 4), 5));
        assert!(board.is_valid_placement(Position::new(0, 8), 6));
        // The occupied cell itself is excluded from its own scan.
        assert!(board.is_valid_placement(Position::new(0, 0), 5));
    }

    #[test]
    fn test_check_report_counts() {
        let mut board = SudokuBoard::new(puzzle());
        let report = board.check_report();
        assert_eq!(report, CheckReport { incorrect: 0, empty: 9 });

        // Two 1s in the same row.
        board.apply_move(CellEdit::new(Position::new(0, 0), 1)).unwrap();
        board.apply_move(CellEdit::new(Position::new(0, 1), 1)).unwrap();
        let report = board.check_report();
        // Both 1s see each other in the row.
        assert_eq!(report.incorrect, 2);
        assert_eq!(report.empty, 7);
    }

    #[test]
    fn test_hint_fills_random_empty_cell_from_solution() {
        let mut board = SudokuBoard::new(puzzle());
        let mut rng = Pcg64Mcg::seed_from_u64(7);
        let solution = solution();

        for used in 1..=9 {
            let outcome = board.apply_hint(&solution, &mut rng);
            let HintOutcome::Placed { pos, value } = outcome else {
                panic!("expected placement, got {outcome:?}");
            };
            assert_eq!(pos.row(), 0, "only row 0 is editable");
            assert_eq!(value, solution.get(pos));
            assert_eq!(board.answer().filled_count(), 72 + used);
        }

        // All empty cells consumed.
        assert!(board.is_full());
        assert_eq!(board.apply_hint(&solution, &mut rng), HintOutcome::NoTarget);
    }

    #[test]
    fn test_completion_percentage_bounds() {
        let board = SudokuBoard::new(puzzle());
        // 72 of 81 cells filled.
        assert_eq!(board.completion_percentage(), 88);

        let full = SudokuBoard::new(solution());
        assert_eq!(full.completion_percentage(), 100);
        assert!(full.is_full());
    }

    proptest! {
        /// `is_valid_placement` is false iff the value occurs in a peer cell.
        #[test]
        fn prop_valid_placement_matches_peer_scan(
            cells in prop::collection::vec(0u8..=9, 81),
            target in 0usize..81,
            value in 1u8..=9,
        ) {
            let mut grid = Grid::new();
            for (i, &v) in cells.iter().enumerate() {
                grid.set(Position::ALL[i], v);
            }
            let board = SudokuBoard::new(grid);
            let pos = Position::ALL[target];

            let duplicated = Position::ALL
                .iter()
                .any(|&peer| pos.is_peer(peer) && grid.get(peer) == value);
            prop_assert_eq!(board.is_valid_placement(pos, value), !duplicated);
        }

        /// Filling cells never decreases the completion percentage.
        #[test]
        fn prop_completion_percentage_is_monotonic(
            keys in prop::collection::vec(any::<u32>(), 81),
        ) {
            let mut order: Vec<usize> = (0..81).collect();
            order.sort_by_key(|&i| keys[i]);
            let mut board = SudokuBoard::new(Grid::new());
            let mut last = board.completion_percentage();
            for index in order {
                board.apply_move(CellEdit::new(Position::ALL[index], 1)).unwrap();
                let now = board.completion_percentage();
                prop_assert!(now >= last);
                last = now;
            }
            prop_assert_eq!(last, 100);
        }
    }
}
