// Copyright 2022 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use structopt::StructOpt;
use tracing_subscriber::{filter::LevelFilter, EnvFilter, FmtSubscriber};

use arbiter::{piece::PieceId, Game};

/// Prints every legal move for the side to move, in the notation that `arbiter` accepts.
#[derive(Debug, StructOpt)]
struct Options {
    /// FEN representation of the position to analyze.
    #[structopt(name = "FEN")]
    fen: String,
}

fn main() -> anyhow::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(LevelFilter::WARN)
        .with_env_filter(EnvFilter::from_env("ARBITER_LOG"))
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let ops = Options::from_args();
    let mut game = Game::from_fen(ops.fen)?;
    if let Some(outcome) = game.outcome() {
        println!("{}", outcome);
        return Ok(());
    }

    let ids: Vec<PieceId> = game.player(game.active()).in_play().map(|p| p.id()).collect();
    for id in ids {
        let piece = game.piece(id);
        let (kind, origin) = match piece.position() {
            Some(origin) => (piece.kind(), origin),
            None => continue,
        };

        for dest in game.generate_moves(id, None) {
            println!("{}{}{}", kind, origin, dest);
        }
    }

    Ok(())
}
