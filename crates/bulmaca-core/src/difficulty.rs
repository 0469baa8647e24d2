use std::str::FromStr;

/// A difficulty tier, derived from the level number.
///
/// Tiers partition levels into four contiguous bands; the labels are the
/// Turkish names used by the backend service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Difficulty {
    /// Levels 1-10.
    Kolay,
    /// Levels 11-20.
    Orta,
    /// Levels 21-30.
    Zor,
    /// Levels 31 and above.
    Uzman,
}

impl Difficulty {
    /// All tiers in ascending order.
    pub const ALL: [Self; 4] = [Self::Kolay, Self::Orta, Self::Zor, Self::Uzman];

    /// Returns the tier for a level number.
    ///
    /// # Example
    ///
    /// ```
    /// use bulmaca_core::Difficulty;
    ///
    /// assert_eq!(Difficulty::from_level(1), Difficulty::Kolay);
    /// assert_eq!(Difficulty::from_level(10), Difficulty::Kolay);
    /// assert_eq!(Difficulty::from_level(11), Difficulty::Orta);
    /// assert_eq!(Difficulty::from_level(25), Difficulty::Zor);
    /// assert_eq!(Difficulty::from_level(31), Difficulty::Uzman);
    /// assert_eq!(Difficulty::from_level(999), Difficulty::Uzman);
    /// ```
    #[must_use]
    pub fn from_level(level: u32) -> Self {
        match level {
            0..=10 => Self::Kolay,
            11..=20 => Self::Orta,
            21..=30 => Self::Zor,
            _ => Self::Uzman,
        }
    }

    /// Returns the lowercase label used on the wire.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Kolay => "kolay",
            Self::Orta => "orta",
            Self::Zor => "zor",
            Self::Uzman => "uzman",
        }
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An error which can be returned when parsing a [`Difficulty`] label.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("unknown difficulty label: {_0:?}")]
pub struct ParseDifficultyError(#[error(not(source))] pub String);

impl FromStr for Difficulty {
    type Err = ParseDifficultyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|tier| tier.as_str() == s)
            .ok_or_else(|| ParseDifficultyError(s.to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_bands_are_contiguous() {
        for level in 1..=40 {
            let tier = Difficulty::from_level(level);
            let next = Difficulty::from_level(level + 1);
            assert!(next >= tier, "tier regressed at level {level}");
        }
    }

    #[test]
    fn test_label_round_trip() {
        for tier in Difficulty::ALL {
            assert_eq!(tier.as_str().parse::<Difficulty>(), Ok(tier));
        }
        assert!("expert".parse::<Difficulty>().is_err());
    }
}
