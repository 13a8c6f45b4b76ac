// Copyright 2017-2022 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! `arbiter` keeps the rules of a game of chess between two people.
//!
//! As a library, `arbiter` tracks the board and both players' pieces, decodes the moves that players type in, and
//! refuses anything the rules don't allow: moves that leave a king in check, castling through attacked squares,
//! en-passant captures that come too late. It notices checkmate and stalemate, and handles draw offers and
//! resignation. As an executable, `arbiter` runs a game at the terminal, saving and loading games as JSON.

pub mod board;
pub mod core;
pub mod game;
pub mod movegen;
pub mod notation;
pub mod piece;
pub mod player;
pub mod snapshot;

pub use game::{AppliedMove, CastleSide, FenParseError, Game, MoveError, MoveRequest, Outcome};
