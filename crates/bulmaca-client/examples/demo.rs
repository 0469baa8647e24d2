//! Plays one Sudoku level and one cryptogram against the in-memory
//! service backend, printing every notice along the way.
//!
//! ```sh
//! RUST_LOG=info cargo run -p bulmaca-client --example demo
//! ```

use bulmaca_client::{ActiveGame, GameClient, LocalService};
use bulmaca_core::{GameKind, Grid, Position};
use bulmaca_engine::{CellEdit, format_time};

fn pump(client: &mut GameClient<LocalService>) {
    client.update();
    for notice in client.drain_notices() {
        println!("* {notice}");
    }
}

fn main() {
    env_logger::init();

    let mut client = GameClient::new(LocalService::new());

    client.start_game(GameKind::Sudoku, 1);
    pump(&mut client);

    // Burn a hint, then fill the rest from the known demo solution.
    client.request_hint().expect("hint budget available");
    pump(&mut client);

    let solution: Grid = LocalService::SUDOKU_SOLUTION.parse().expect("valid grid");
    let empties: Vec<Position> = match client.game().expect("active game") {
        ActiveGame::Sudoku(session) => Position::ALL
            .iter()
            .copied()
            .filter(|&pos| session.board().value(pos) == 0)
            .collect(),
        ActiveGame::Kriptogram(_) => unreachable!(),
    };
    for _ in 0..45 {
        client.tick();
    }
    for pos in empties {
        client
            .edit_cell(CellEdit::new(pos, solution.get(pos)))
            .expect("editable cell");
    }
    pump(&mut client);

    if let Some(game) = client.game() {
        println!(
            "sudoku finished in {} with {} moves and {} hint(s)",
            format_time(game.puzzle().time_limit - game.meta().time_left),
            game.meta().moves,
            game.meta().hints_used,
        );
    }

    // The cryptogram's single hint reveals the whole cipher map.
    client.resume(GameKind::Kriptogram);
    pump(&mut client);
    client.request_hint().expect("hint budget available");
    pump(&mut client);

    if let Some(ActiveGame::Kriptogram(session)) = client.game() {
        println!("encrypted: {}", session.board().encrypted_text());
        println!("decoded:   {}", session.board().decoded_text());
    }
    client.submit_solution().expect("mapping is complete");
    pump(&mut client);
}
