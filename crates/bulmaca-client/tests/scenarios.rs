//! End-to-end scenarios against the in-memory service backend.

use bulmaca_client::{
    ActiveGame, ClientError, GameClient, LocalService, Notice, ServiceError,
};
use bulmaca_core::{GameKind, Grid, Position};
use bulmaca_engine::{
    CellEdit, CheckError, HintError, LetterEdit, PuzzleBoard as _, SessionError, SessionPhase,
};

fn client() -> GameClient<LocalService> {
    GameClient::new(LocalService::new())
}

fn empty_cells(client: &GameClient<LocalService>) -> Vec<Position> {
    match client.game().expect("active game") {
        ActiveGame::Sudoku(session) => Position::ALL
            .iter()
            .copied()
            .filter(|&pos| session.board().value(pos) == 0)
            .collect(),
        ActiveGame::Kriptogram(_) => panic!("expected a sudoku game"),
    }
}

fn solution() -> Grid {
    LocalService::SUDOKU_SOLUTION.parse().expect("valid grid")
}

#[test]
fn sudoku_level_is_solved_with_a_single_validation_round_trip() {
    let mut client = client();
    client.start_game(GameKind::Sudoku, 5);
    assert!(client.is_loading());
    client.update();

    let notices = client.drain_notices();
    assert!(matches!(
        notices.as_slice(),
        [Notice::PuzzleReady {
            kind: GameKind::Sudoku,
            level: 5,
            ..
        }]
    ));

    // Half a minute on the clock before solving.
    for _ in 0..30 {
        client.tick();
    }

    let solution = solution();
    let empties = empty_cells(&client);
    for &pos in &empties {
        client.edit_cell(CellEdit::new(pos, solution.get(pos))).unwrap();
    }
    client.update();

    let game = client.game().expect("active game");
    assert_eq!(game.phase(), SessionPhase::Completed);
    assert!(game.meta().completed);
    assert_eq!(game.meta().moves, u32::try_from(empties.len()).unwrap());

    let notices = client.drain_notices();
    assert!(notices.contains(&Notice::Solved { time_taken: 30 }));
    assert!(notices.contains(&Notice::ProgressSaved));
    assert!(!client.has_pending_work());

    // The solve was recorded: resuming continues at the next level.
    client.resume(GameKind::Sudoku);
    client.update();
    let notices = client.drain_notices();
    assert!(notices.contains(&Notice::ProgressLoaded { level: 6 }));
    assert!(matches!(
        client.game(),
        Some(ActiveGame::Sudoku(session)) if session.puzzle().level == 6
    ));
}

#[test]
fn advisory_check_reports_conflicts_without_blocking() {
    let mut client = client();
    client.start_game(GameKind::Sudoku, 1);
    client.update();
    client.drain_notices();

    let empties = empty_cells(&client);
    let solution = solution();
    // A value that is not the solution value for the cell.
    let pos = empties[0];
    let wrong = if solution.get(pos) == 9 { 1 } else { 9 };
    client.edit_cell(CellEdit::new(pos, wrong)).unwrap();

    let report = client.check_board().unwrap();
    assert!(report.empty > 0);
    let notices = client.drain_notices();
    assert!(notices.contains(&Notice::CheckReport {
        incorrect: report.incorrect,
        empty: report.empty,
    }));

    // Advisory only: the board still accepts edits.
    client.edit_cell(CellEdit::new(pos, 0)).unwrap();
}

#[test]
fn sudoku_hints_fill_cells_and_respect_the_budget() {
    let mut client = client();
    client.start_game(GameKind::Sudoku, 2);
    client.update();
    client.drain_notices();

    let solution = solution();
    for used in 1..=3u8 {
        client.request_hint().unwrap();
        client.update();
        let game = client.game().expect("active game");
        assert_eq!(game.meta().hints_used, used);
        let notices = client.drain_notices();
        let placed = notices.iter().find_map(|notice| match notice {
            Notice::HintPlaced { pos, value } => Some((*pos, *value)),
            _ => None,
        });
        let (pos, value) = placed.expect("hint placement notice");
        assert_eq!(value, solution.get(pos));
    }

    assert_eq!(
        client.request_hint(),
        Err(ClientError::Hint(HintError::BudgetExhausted { budget: 3 }))
    );
}

#[test]
fn cryptogram_hint_reveals_the_map_and_submission_succeeds() {
    let mut client = client();
    client.start_game(GameKind::Kriptogram, 3);
    client.update();
    let notices = client.drain_notices();
    assert!(matches!(
        notices.as_slice(),
        [Notice::PuzzleReady {
            kind: GameKind::Kriptogram,
            level: 3,
            ..
        }]
    ));

    // Premature submission is rejected locally by the fill-ratio guard.
    assert!(matches!(
        client.submit_solution(),
        Err(ClientError::Check(CheckError::NotReady { .. }))
    ));

    client.request_hint().unwrap();
    client.update();

    let decoded = match client.game().expect("active game") {
        ActiveGame::Kriptogram(session) => {
            assert!(session.board().is_full());
            assert_eq!(session.hints_remaining(), 0);
            session.board().decoded_text()
        }
        ActiveGame::Sudoku(_) => panic!("expected a kriptogram game"),
    };
    assert!(!decoded.contains('_'));
    assert_eq!(
        client.request_hint(),
        Err(ClientError::Hint(HintError::BudgetExhausted { budget: 1 }))
    );

    client.submit_solution().unwrap();
    client.update();

    let game = client.game().expect("active game");
    assert_eq!(game.phase(), SessionPhase::Completed);
    let notices = client.drain_notices();
    assert!(notices.iter().any(|n| matches!(n, Notice::HintRevealed { .. })));
    assert!(notices.iter().any(|n| matches!(n, Notice::Solved { .. })));
    assert!(notices.contains(&Notice::ProgressSaved));
}

#[test]
fn incorrect_cryptogram_submission_reopens_the_session() {
    let mut client = client();
    client.start_game(GameKind::Kriptogram, 1);
    client.update();
    client.drain_notices();

    // An identity mapping is never the rotation the service issued.
    let letters: Vec<char> = match client.game().expect("active game") {
        ActiveGame::Kriptogram(session) => session.board().letters().to_vec(),
        ActiveGame::Sudoku(_) => panic!("expected a kriptogram game"),
    };
    for &cipher in &letters {
        client.edit_letter(LetterEdit::assign(cipher, cipher)).unwrap();
    }

    client.submit_solution().unwrap();
    client.update();

    let game = client.game().expect("active game");
    assert_eq!(game.phase(), SessionPhase::InProgress);
    assert!(!game.meta().completed);
    assert!(client.drain_notices().contains(&Notice::Incorrect));

    // Edits are accepted again after the negative verdict.
    client.edit_letter(LetterEdit::clear(letters[0])).unwrap();
}

#[test]
fn timer_expiry_closes_the_session_and_blocks_input() {
    let mut client = client();
    client.start_game(GameKind::Sudoku, 1);
    client.update();
    client.drain_notices();

    // Level 1 is kolay: a 300 second limit.
    for _ in 0..300 {
        client.tick();
    }

    let game = client.game().expect("active game");
    assert_eq!(game.phase(), SessionPhase::Expired);
    let notices = client.drain_notices();
    assert_eq!(
        notices.iter().filter(|&n| *n == Notice::TimeExpired).count(),
        1
    );

    let pos = empty_cells(&client)[0];
    assert_eq!(
        client.edit_cell(CellEdit::new(pos, 1)),
        Err(ClientError::Session(SessionError::NotActive))
    );
    assert_eq!(
        client.request_hint(),
        Err(ClientError::Hint(HintError::NotActive))
    );

    // Extra ticks never fire a second expiry.
    client.tick();
    assert!(client.drain_notices().is_empty());

    // The best-effort session close drains without further notices.
    client.update();
    assert!(!client.has_pending_work());
}

#[test]
fn stale_load_responses_are_discarded() {
    let mut client = client();
    client.start_game(GameKind::Sudoku, 1);
    client.start_game(GameKind::Sudoku, 7);
    client.update();

    let ready: Vec<_> = client
        .drain_notices()
        .into_iter()
        .filter(|n| matches!(n, Notice::PuzzleReady { .. }))
        .collect();
    assert_eq!(
        ready,
        vec![Notice::PuzzleReady {
            kind: GameKind::Sudoku,
            level: 7,
            difficulty: bulmaca_core::Difficulty::Kolay,
        }]
    );
    assert!(matches!(
        client.game(),
        Some(ActiveGame::Sudoku(session)) if session.puzzle().level == 7
    ));
}

#[test]
fn failed_validation_round_trip_reopens_the_session() {
    let mut client = client();
    client.start_game(GameKind::Sudoku, 1);
    client.update();
    client.drain_notices();

    let solution = solution();
    let empties = empty_cells(&client);
    let (&last, rest) = empties.split_last().expect("at least one empty cell");
    for &pos in rest {
        client.edit_cell(CellEdit::new(pos, solution.get(pos))).unwrap();
    }

    // The completing edit dispatches validation into a failing transport.
    client
        .transport_mut()
        .inject_failure(ServiceError::Rejected("bakımda".to_owned()));
    client.edit_cell(CellEdit::new(last, solution.get(last))).unwrap();
    client.update();

    let game = client.game().expect("active game");
    assert_eq!(game.phase(), SessionPhase::InProgress);
    assert!(client
        .drain_notices()
        .iter()
        .any(|n| matches!(n, Notice::CheckFailed { .. })));

    // A retry against the recovered transport completes the level.
    client.submit_solution().unwrap();
    client.update();
    assert_eq!(
        client.game().expect("active game").phase(),
        SessionPhase::Completed
    );
}

#[test]
fn restart_issues_a_fresh_session_for_the_same_level() {
    let mut client = client();
    client.start_game(GameKind::Sudoku, 4);
    client.update();
    client.drain_notices();

    let first_session = client
        .game()
        .expect("active game")
        .session_id()
        .as_str()
        .to_owned();
    let pos = empty_cells(&client)[0];
    client.edit_cell(CellEdit::new(pos, 3)).unwrap();

    client.restart().unwrap();
    client.update();

    let game = client.game().expect("active game");
    assert_eq!(game.puzzle().level, 4);
    assert_ne!(game.session_id().as_str(), first_session);
    assert_eq!(game.meta().moves, 0);
    match game {
        ActiveGame::Sudoku(session) => assert_eq!(session.board().value(pos), 0),
        ActiveGame::Kriptogram(_) => panic!("expected a sudoku game"),
    }
}
