//! Cipher alphabet helpers for the kriptogram puzzle.
//!
//! Encrypted texts use the uppercase Turkish alphabet (plus Q, W, X, which
//! the backend keeps for loanwords). Everything outside this alphabet,
//! such as spaces, punctuation, and digits, passes through the cipher
//! unchanged.

/// The uppercase alphabet used by the cipher, in backend order.
pub const CIPHER_ALPHABET: &str = "ABCÇDEFGĞHIİJKLMNOÖPQRSŞTUÜVWXYZ";

/// Returns whether `ch` is a letter of the cipher alphabet.
#[must_use]
pub fn is_cipher_letter(ch: char) -> bool {
    CIPHER_ALPHABET.contains(ch)
}

/// Normalizes player input to a single uppercase cipher-alphabet letter.
///
/// Returns `None` for empty-ish input such as whitespace or characters
/// that do not uppercase into the alphabet.
///
/// # Example
///
/// ```
/// use bulmaca_core::to_plain_letter;
///
/// assert_eq!(to_plain_letter('a'), Some('A'));
/// assert_eq!(to_plain_letter('ç'), Some('Ç'));
/// assert_eq!(to_plain_letter('Ş'), Some('Ş'));
/// assert_eq!(to_plain_letter(' '), None);
/// assert_eq!(to_plain_letter('3'), None);
/// ```
#[must_use]
pub fn to_plain_letter(ch: char) -> Option<char> {
    let upper = ch.to_uppercase().next()?;
    is_cipher_letter(upper).then_some(upper)
}

/// Returns the distinct cipher letters appearing in `text`, sorted.
///
/// # Example
///
/// ```
/// use bulmaca_core::unique_letters;
///
/// assert_eq!(unique_letters("ABAB"), vec!['A', 'B']);
/// assert_eq!(unique_letters("CBA CBA!"), vec!['A', 'B', 'C']);
/// assert_eq!(unique_letters("123"), Vec::<char>::new());
/// ```
#[must_use]
pub fn unique_letters(text: &str) -> Vec<char> {
    let mut letters: Vec<char> = text.chars().filter(|&ch| is_cipher_letter(ch)).collect();
    letters.sort_unstable();
    letters.dedup();
    letters
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alphabet_has_no_duplicates() {
        let letters = unique_letters(CIPHER_ALPHABET);
        assert_eq!(letters.len(), CIPHER_ALPHABET.chars().count());
    }

    #[test]
    fn test_turkish_letters_are_cipher_letters() {
        for ch in ['Ç', 'Ğ', 'I', 'İ', 'Ö', 'Ş', 'Ü'] {
            assert!(is_cipher_letter(ch), "{ch} missing from alphabet");
        }
        assert!(!is_cipher_letter('ç'));
        assert!(!is_cipher_letter('_'));
    }

    #[test]
    fn test_unique_letters_ignores_non_letters() {
        assert_eq!(unique_letters("MERHABA DUNYA"), vec![
            'A', 'B', 'D', 'E', 'H', 'M', 'N', 'R', 'U', 'Y'
        ]);
    }
}
