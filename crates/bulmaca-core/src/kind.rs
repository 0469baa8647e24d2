/// The two supported puzzle game types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameKind {
    /// The 9×9 number-placement puzzle.
    Sudoku,
    /// The substitution-cipher puzzle.
    Kriptogram,
}

impl GameKind {
    /// Returns the lowercase name used on the wire.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sudoku => "sudoku",
            Self::Kriptogram => "kriptogram",
        }
    }
}

impl std::fmt::Display for GameKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
