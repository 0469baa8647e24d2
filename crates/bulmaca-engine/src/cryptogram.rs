use std::collections::{BTreeMap, BTreeSet};

use bulmaca_core::{is_cipher_letter, to_plain_letter, unique_letters};
use rand::Rng;

use crate::{HintOutcome, MoveError, PuzzleBoard};

/// The substitution-cipher board: the encrypted text plus the player's
/// cipher-letter → plain-letter mapping.
///
/// Every mapping key is a letter actually present in the encrypted text;
/// letters revealed by a hint are locked against further edits for the
/// remainder of the session.
///
/// # Example
///
/// ```
/// use bulmaca_engine::{Cryptogram, LetterEdit, PuzzleBoard as _};
///
/// let mut board = Cryptogram::new("ABAB");
/// board.apply_move(LetterEdit::assign('A', 'x')).unwrap();
/// board.apply_move(LetterEdit::assign('B', 'y')).unwrap();
/// assert_eq!(board.decoded_text(), "XYXY");
/// assert_eq!(board.completion_percentage(), 100);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cryptogram {
    encrypted_text: String,
    letters: Vec<char>,
    mapping: BTreeMap<char, char>,
    locked: BTreeSet<char>,
}

/// A single mapping edit; `plain = None` clears the entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LetterEdit {
    /// The cipher letter being mapped.
    pub cipher: char,
    /// The chosen plain letter, or `None` to clear.
    pub plain: Option<char>,
}

impl LetterEdit {
    /// Creates an edit assigning `plain` to `cipher`.
    #[must_use]
    pub fn assign(cipher: char, plain: char) -> Self {
        Self {
            cipher,
            plain: Some(plain),
        }
    }

    /// Creates an edit clearing the entry for `cipher`.
    #[must_use]
    pub fn clear(cipher: char) -> Self {
        Self {
            cipher,
            plain: None,
        }
    }
}

impl Cryptogram {
    /// Creates a board from the encrypted text.
    #[must_use]
    pub fn new(encrypted_text: impl Into<String>) -> Self {
        let encrypted_text = encrypted_text.into();
        let letters = unique_letters(&encrypted_text);
        Self {
            encrypted_text,
            letters,
            mapping: BTreeMap::new(),
            locked: BTreeSet::new(),
        }
    }

    /// Returns the encrypted text.
    #[must_use]
    pub fn encrypted_text(&self) -> &str {
        &self.encrypted_text
    }

    /// Returns the distinct cipher letters of the text, sorted.
    #[must_use]
    pub fn letters(&self) -> &[char] {
        &self.letters
    }

    /// Returns the current mapping.
    #[must_use]
    pub fn mapping(&self) -> &BTreeMap<char, char> {
        &self.mapping
    }

    /// Returns the plain letter currently mapped to `cipher`, if any.
    #[must_use]
    pub fn mapped(&self, cipher: char) -> Option<char> {
        self.mapping.get(&cipher).copied()
    }

    /// Returns whether `cipher` was revealed by a hint and is locked.
    #[must_use]
    pub fn is_locked(&self, cipher: char) -> bool {
        self.locked.contains(&cipher)
    }

    /// Returns the encrypted text with mapped letters substituted.
    ///
    /// Unmapped cipher letters render as `_`; non-letters pass through
    /// unchanged.
    #[must_use]
    pub fn decoded_text(&self) -> String {
        self.encrypted_text
            .chars()
            .map(|ch| {
                if is_cipher_letter(ch) {
                    self.mapped(ch).unwrap_or('_')
                } else {
                    ch
                }
            })
            .collect()
    }
}

impl PuzzleBoard for Cryptogram {
    type Move = LetterEdit;
    type HintPayload = BTreeMap<char, char>;

    const HINT_BUDGET: u8 = 1;
    const AUTO_DETECT_COMPLETION: bool = false;

    fn apply_move(&mut self, mov: Self::Move) -> Result<(), MoveError> {
        if !self.letters.contains(&mov.cipher) {
            return Err(MoveError::UnknownLetter(mov.cipher));
        }
        if self.is_locked(mov.cipher) {
            return Err(MoveError::LockedLetter(mov.cipher));
        }
        match mov.plain {
            Some(plain) => {
                let upper = to_plain_letter(plain).ok_or(MoveError::NotALetter(plain))?;
                self.mapping.insert(mov.cipher, upper);
            }
            None => {
                self.mapping.remove(&mov.cipher);
            }
        }
        Ok(())
    }

    /// Merges the full cipher map in one atomic update and locks every
    /// revealed letter. Entries for letters absent from the text are
    /// dropped to preserve the mapping-key invariant; a payload with no
    /// applicable entry leaves the board unchanged.
    fn apply_hint(
        &mut self,
        payload: &BTreeMap<char, char>,
        _rng: &mut dyn Rng,
    ) -> HintOutcome {
        let mut revealed = 0;
        for (&cipher, &plain) in payload {
            if !self.letters.contains(&cipher) {
                continue;
            }
            self.mapping.insert(cipher, plain);
            self.locked.insert(cipher);
            revealed += 1;
        }
        if revealed == 0 {
            return HintOutcome::NoTarget;
        }
        HintOutcome::Revealed { letters: revealed }
    }

    fn is_full(&self) -> bool {
        self.letters
            .iter()
            .all(|cipher| self.mapping.contains_key(cipher))
    }

    /// Mapped letters over distinct letters, rounded to the nearest whole
    /// percent. A text without letters counts as trivially complete.
    #[expect(clippy::cast_possible_truncation)]
    fn completion_percentage(&self) -> u8 {
        let total = self.letters.len();
        if total == 0 {
            return 100;
        }
        let mapped = self
            .letters
            .iter()
            .filter(|cipher| self.mapping.contains_key(cipher))
            .count();
        ((mapped * 100 + total / 2) / total) as u8
    }

    fn check_ready(&self) -> bool {
        self.completion_percentage() >= 50
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use rand::SeedableRng as _;
    use rand_pcg::Pcg64Mcg;

    use super::*;

    fn rng() -> Pcg64Mcg {
        Pcg64Mcg::seed_from_u64(1)
    }

    #[test]
    fn test_letters_come_from_text_only() {
        let mut board = Cryptogram::new("ABAB");
        assert_eq!(board.letters(), ['A', 'B']);

        assert_eq!(
            board.apply_move(LetterEdit::assign('Z', 'Q')),
            Err(MoveError::UnknownLetter('Z'))
        );
        assert!(board.mapping().is_empty());
    }

    #[test]
    fn test_decode_round_trip() {
        let mut board = Cryptogram::new("XYZ XYZ, XY!");
        board.apply_move(LetterEdit::assign('X', 'E')).unwrap();
        board.apply_move(LetterEdit::assign('Y', 'V')).unwrap();
        assert_eq!(board.decoded_text(), "EV_ EV_, EV!");

        board.apply_move(LetterEdit::assign('Z', 'E')).unwrap();
        // Duplicate plain letters are not rejected locally.
        assert_eq!(board.decoded_text(), "EVE EVE, EV!");
        assert!(board.is_full());
    }

    #[test]
    fn test_input_is_uppercased_and_overwrites() {
        let mut board = Cryptogram::new("AB");
        board.apply_move(LetterEdit::assign('A', 'k')).unwrap();
        assert_eq!(board.mapped('A'), Some('K'));
        board.apply_move(LetterEdit::assign('A', 'ç')).unwrap();
        assert_eq!(board.mapped('A'), Some('Ç'));

        board.apply_move(LetterEdit::clear('A')).unwrap();
        assert_eq!(board.mapped('A'), None);
    }

    #[test]
    fn test_non_letters_are_rejected_as_plain_values() {
        let mut board = Cryptogram::new("AB");
        assert_eq!(
            board.apply_move(LetterEdit::assign('A', '3')),
            Err(MoveError::NotALetter('3'))
        );
        assert_eq!(
            board.apply_move(LetterEdit::assign('A', ' ')),
            Err(MoveError::NotALetter(' '))
        );
        assert!(board.mapping().is_empty());
    }

    #[test]
    fn test_completion_percentage_and_check_guard() {
        let mut board = Cryptogram::new("ABCD");
        assert_eq!(board.completion_percentage(), 0);
        assert!(!board.check_ready());

        board.apply_move(LetterEdit::assign('A', 'X')).unwrap();
        assert_eq!(board.completion_percentage(), 25);
        board.apply_move(LetterEdit::assign('B', 'Y')).unwrap();
        assert_eq!(board.completion_percentage(), 50);
        assert!(board.check_ready());

        board.apply_move(LetterEdit::assign('C', 'Z')).unwrap();
        board.apply_move(LetterEdit::assign('D', 'W')).unwrap();
        assert_eq!(board.completion_percentage(), 100);
        assert!(board.is_full());
    }

    #[test]
    fn test_hint_merges_and_locks_everything() {
        let mut board = Cryptogram::new("ABAB");
        board.apply_move(LetterEdit::assign('A', 'Q')).unwrap();

        let payload: BTreeMap<char, char> =
            [('A', 'X'), ('B', 'Y'), ('Z', 'W')].into_iter().collect();
        let outcome = board.apply_hint(&payload, &mut rng());
        // 'Z' is not in the text and is dropped.
        assert_eq!(outcome, HintOutcome::Revealed { letters: 2 });

        assert_eq!(board.decoded_text(), "XYXY");
        assert!(board.is_locked('A') && board.is_locked('B'));
        assert_eq!(
            board.apply_move(LetterEdit::assign('A', 'Q')),
            Err(MoveError::LockedLetter('A'))
        );
        assert_eq!(
            board.apply_move(LetterEdit::clear('B')),
            Err(MoveError::LockedLetter('B'))
        );
    }

    #[test]
    fn test_hint_without_applicable_entries_is_a_no_op() {
        let mut board = Cryptogram::new("ABAB");

        let payload: BTreeMap<char, char> = [('Y', 'P'), ('Z', 'W')].into_iter().collect();
        assert_eq!(board.apply_hint(&payload, &mut rng()), HintOutcome::NoTarget);
        assert!(board.mapping().is_empty());
        assert!(!board.is_locked('A'));

        let empty = BTreeMap::new();
        assert_eq!(board.apply_hint(&empty, &mut rng()), HintOutcome::NoTarget);
    }

    proptest! {
        /// Mapping letters never decreases the completion percentage.
        #[test]
        fn prop_completion_percentage_is_monotonic(
            keys in prop::collection::vec(any::<u32>(), 8),
        ) {
            let letters = ['A', 'B', 'C', 'D', 'E', 'F', 'G', 'H'];
            let mut order: Vec<usize> = (0..letters.len()).collect();
            order.sort_by_key(|&i| keys[i]);

            let mut board = Cryptogram::new(letters.iter().collect::<String>());
            let mut last = board.completion_percentage();
            for index in order {
                board
                    .apply_move(LetterEdit::assign(letters[index], 'X'))
                    .unwrap();
                let now = board.completion_percentage();
                prop_assert!(now >= last);
                last = now;
            }
            prop_assert_eq!(last, 100);
        }
    }
}
