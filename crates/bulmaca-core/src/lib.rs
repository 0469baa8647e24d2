//! Shared primitives for the bulmaca puzzle client.
//!
//! This crate holds the leaf types used by both puzzle engines: 9×9 grid
//! coordinates and storage for the number-placement game, difficulty tiers,
//! game kinds, and the cipher alphabet helpers for the kriptogram game.

pub use self::{
    alphabet::{CIPHER_ALPHABET, is_cipher_letter, to_plain_letter, unique_letters},
    difficulty::{Difficulty, ParseDifficultyError},
    grid::{Grid, ParseGridError},
    kind::GameKind,
    position::Position,
};

mod alphabet;
mod difficulty;
mod grid;
mod kind;
mod position;
