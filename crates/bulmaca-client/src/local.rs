//! An in-memory service backend for demos and tests.
//!
//! Behaves like the real service at the wire level: it issues sessions and
//! puzzles, validates submitted answers against the solutions it handed
//! out, reveals hint payloads, and tracks per-type progress. Responses are
//! delivered synchronously, so one [`GameClient::update`] completes any
//! round trip.
//!
//! [`GameClient::update`]: crate::GameClient::update

use std::collections::{BTreeMap, HashMap};

use bulmaca_core::{CIPHER_ALPHABET, Difficulty, GameKind, is_cipher_letter, unique_letters};

use crate::service::{
    AnswerDto, HintDto, PuzzleDto, ServiceError, ServiceHandle, ServiceRequest, ServiceResponse,
    ServiceTransport, SessionDto, UserProgressDto, ValidationDto,
};

const PLAIN_TEXTS: [&str; 3] = [
    "DAMLAYA DAMLAYA GÖL OLUR",
    "SAKLA SAMANI GELİR ZAMANI",
    "İŞLEYEN DEMİR IŞILDAR",
];

#[derive(Debug, Clone, PartialEq, Eq)]
enum Expected {
    Grid(String),
    CipherMap(BTreeMap<char, char>),
}

/// The in-memory backend.
#[derive(Debug, Default)]
pub struct LocalService {
    issued: HashMap<String, Expected>,
    progress: HashMap<String, u32>,
    next_session: u64,
    injected_failure: Option<ServiceError>,
}

impl LocalService {
    /// The solution grid every issued Sudoku puzzle is carved from.
    pub const SUDOKU_SOLUTION: &'static str =
        "185362947793148526246795183564239871931874265827516394318427659672951438459683712";

    /// Creates an empty backend with no saved progress.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next dispatched request fail with the given error.
    pub fn inject_failure(&mut self, err: ServiceError) {
        self.injected_failure = Some(err);
    }

    fn handle_request(&mut self, request: ServiceRequest) -> Result<ServiceResponse, ServiceError> {
        match request {
            ServiceRequest::StartSession { .. } => {
                self.next_session += 1;
                Ok(ServiceResponse::SessionStarted(SessionDto {
                    session_id: format!("session-{}", self.next_session),
                }))
            }
            ServiceRequest::EndSession { .. } => Ok(ServiceResponse::SessionEnded),
            ServiceRequest::GetNewPuzzle { game_type, level } => {
                self.issue_puzzle(&game_type, level)
            }
            ServiceRequest::ValidateSolution {
                puzzle_id, answer, ..
            } => self.validate(&puzzle_id, &answer),
            ServiceRequest::GetHint { puzzle_id, .. } => self.hint(&puzzle_id),
            ServiceRequest::UpdateProgress {
                game_type, level, ..
            } => {
                let entry = self.progress.entry(game_type).or_insert(0);
                *entry = (*entry).max(level);
                Ok(ServiceResponse::ProgressUpdated)
            }
            ServiceRequest::GetUserProgress { game_type } => {
                let highest_level = self.progress.get(&game_type).copied().unwrap_or(0);
                Ok(ServiceResponse::UserProgress(UserProgressDto {
                    game_type,
                    highest_level,
                    current_level: highest_level + 1,
                }))
            }
        }
    }

    fn issue_puzzle(
        &mut self,
        game_type: &str,
        level: u32,
    ) -> Result<ServiceResponse, ServiceError> {
        let id = format!("{game_type}-{level}");
        let difficulty = Difficulty::from_level(level);
        let time_limit = time_limit(difficulty);
        if game_type == GameKind::Sudoku.as_str() {
            self.issued
                .insert(id.clone(), Expected::Grid(Self::SUDOKU_SOLUTION.to_owned()));
            Ok(ServiceResponse::Puzzle(PuzzleDto {
                id,
                game_type: game_type.to_owned(),
                level,
                time_limit,
                grid: Some(sudoku_puzzle(difficulty)),
                encrypted_text: None,
            }))
        } else if game_type == GameKind::Kriptogram.as_str() {
            let index = usize::try_from(level.saturating_sub(1))
                .map_or(0, |i| i % PLAIN_TEXTS.len());
            let offset = usize::try_from(level).map_or(1, |l| l % 31 + 1);
            let encrypted_text = encrypt(PLAIN_TEXTS[index], offset);
            // Only letters of the issued text: the player's mapping never
            // contains other keys, so a correct answer matches exactly.
            let letters = unique_letters(&encrypted_text);
            let mut map = cipher_map(offset);
            map.retain(|cipher, _| letters.contains(cipher));
            self.issued.insert(id.clone(), Expected::CipherMap(map));
            Ok(ServiceResponse::Puzzle(PuzzleDto {
                id,
                game_type: game_type.to_owned(),
                level,
                time_limit,
                grid: None,
                encrypted_text: Some(encrypted_text),
            }))
        } else {
            Err(ServiceError::Rejected(format!(
                "unknown game type: {game_type}"
            )))
        }
    }

    fn validate(
        &self,
        puzzle_id: &str,
        answer: &AnswerDto,
    ) -> Result<ServiceResponse, ServiceError> {
        let Some(expected) = self.issued.get(puzzle_id) else {
            return Err(ServiceError::Rejected(format!(
                "unknown puzzle: {puzzle_id}"
            )));
        };
        let is_correct = match (expected, answer) {
            (Expected::Grid(solution), AnswerDto::Grid(grid)) => grid == solution,
            (Expected::CipherMap(map), AnswerDto::CipherMap(answer)) => answer == map,
            _ => false,
        };
        Ok(ServiceResponse::Validation(ValidationDto { is_correct }))
    }

    fn hint(&self, puzzle_id: &str) -> Result<ServiceResponse, ServiceError> {
        match self.issued.get(puzzle_id) {
            Some(Expected::Grid(solution)) => Ok(ServiceResponse::Hint(HintDto {
                solution: Some(solution.clone()),
                cipher_map: None,
            })),
            Some(Expected::CipherMap(map)) => Ok(ServiceResponse::Hint(HintDto {
                solution: None,
                cipher_map: Some(map.clone()),
            })),
            None => Err(ServiceError::Rejected(format!(
                "unknown puzzle: {puzzle_id}"
            ))),
        }
    }
}

impl ServiceTransport for LocalService {
    fn dispatch(&mut self, request: ServiceRequest) -> Result<ServiceHandle, ServiceError> {
        let (responder, handle) = ServiceHandle::pair();
        let result = match self.injected_failure.take() {
            Some(err) => Err(err),
            None => self.handle_request(request),
        };
        let _ = responder.send(result);
        Ok(handle)
    }
}

fn time_limit(difficulty: Difficulty) -> u32 {
    match difficulty {
        Difficulty::Kolay => 300,
        Difficulty::Orta => 450,
        Difficulty::Zor => 600,
        Difficulty::Uzman => 900,
    }
}

fn blank_count(difficulty: Difficulty) -> usize {
    match difficulty {
        Difficulty::Kolay => 24,
        Difficulty::Orta => 32,
        Difficulty::Zor => 44,
        Difficulty::Uzman => 52,
    }
}

/// Carves givens out of the solution grid.
///
/// Blanked indices step by 37, which is coprime with 81, so they scatter
/// over the whole grid without repeating.
fn sudoku_puzzle(difficulty: Difficulty) -> String {
    let mut cells: Vec<char> = LocalService::SUDOKU_SOLUTION.chars().collect();
    for i in 0..blank_count(difficulty) {
        cells[i * 37 % 81] = '.';
    }
    cells.into_iter().collect()
}

/// Builds the cipher-letter → plain-letter map for a rotation cipher.
fn cipher_map(offset: usize) -> BTreeMap<char, char> {
    let letters: Vec<char> = CIPHER_ALPHABET.chars().collect();
    letters
        .iter()
        .enumerate()
        .map(|(i, &plain)| (letters[(i + offset) % letters.len()], plain))
        .collect()
}

fn encrypt(plain: &str, offset: usize) -> String {
    let letters: Vec<char> = CIPHER_ALPHABET.chars().collect();
    plain
        .chars()
        .map(|ch| {
            if is_cipher_letter(ch) {
                letters
                    .iter()
                    .position(|&letter| letter == ch)
                    .map_or(ch, |i| letters[(i + offset) % letters.len()])
            } else {
                ch
            }
        })
        .collect()
}
