// Copyright 2022 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Plain-data images of a game, for saving games to disk and loading them back.
//!
//! A snapshot records every piece of both players' sets, including captured ones, so that a restored game is
//! indistinguishable from the one that was saved: castling rights, en-passant windows, promotions, and pending draw
//! offers all survive the trip.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    core::{self, Color, PieceKind, Square},
    game::{Game, Outcome},
    piece::{Piece, PieceFlags, PieceId},
    player::SET_SIZE,
};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PieceSnapshot {
    pub kind: PieceKind,
    pub promoted: Option<PieceKind>,
    pub position: Option<Square>,
    pub captured: bool,
    pub castle: bool,
    pub passant_offensive: bool,
    pub passant_defensive: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    pub color: Color,
    pub draw_requested: bool,
    pub pieces: Vec<PieceSnapshot>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub active: Color,
    pub outcome: Option<Outcome>,
    pub players: Vec<PlayerSnapshot>,
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SnapshotError {
    #[error("expected a white and a black player")]
    Players,
    #[error("{color} has {count} pieces")]
    PieceCount { color: Color, count: usize },
    #[error("{color} piece #{slot} should be a {}", .expected.name())]
    KindMismatch {
        color: Color,
        slot: usize,
        expected: PieceKind,
    },
    #[error("{color} piece #{slot} cannot be promoted to a {}", .kind.name())]
    InvalidPromotion {
        color: Color,
        slot: usize,
        kind: PieceKind,
    },
    #[error("{color} piece #{slot} must either be on the board or captured")]
    Inconsistent { color: Color, slot: usize },
    #[error("{0} has no king")]
    MissingKing(Color),
    #[error("more than one piece on {0}")]
    SharedSquare(Square),
}

impl From<&Piece> for PieceSnapshot {
    fn from(piece: &Piece) -> PieceSnapshot {
        PieceSnapshot {
            kind: piece.base_kind(),
            promoted: piece.promoted(),
            position: piece.position(),
            captured: piece.is_captured(),
            castle: piece.can_castle(),
            passant_offensive: piece.passant_offensive(),
            passant_defensive: piece.passant_defensive(),
        }
    }
}

impl PieceSnapshot {
    fn flags(&self) -> PieceFlags {
        let mut flags = PieceFlags::NONE;
        flags.set(PieceFlags::CASTLE, self.castle);
        flags.set(PieceFlags::PASSANT_OFFENSIVE, self.passant_offensive);
        flags.set(PieceFlags::PASSANT_DEFENSIVE, self.passant_defensive);
        flags
    }
}

impl Game {
    pub fn snapshot(&self) -> GameSnapshot {
        let players = core::colors()
            .map(|color| {
                let player = self.player(color);
                PlayerSnapshot {
                    color,
                    draw_requested: player.draw_requested(),
                    pieces: player.pieces().iter().map(PieceSnapshot::from).collect(),
                }
            })
            .collect();

        GameSnapshot {
            active: self.active(),
            outcome: self.outcome(),
            players,
        }
    }

    /// Rebuilds a game from a snapshot, checking that it describes a position that could come up in play.
    pub fn from_snapshot(snapshot: &GameSnapshot) -> Result<Game, SnapshotError> {
        let mut game = Game::empty();
        if snapshot.players.len() != 2 {
            return Err(SnapshotError::Players);
        }

        for (color, saved) in core::colors().zip(snapshot.players.iter()) {
            if saved.color != color {
                return Err(SnapshotError::Players);
            }

            if saved.pieces.len() != SET_SIZE {
                return Err(SnapshotError::PieceCount {
                    color,
                    count: saved.pieces.len(),
                });
            }

            for (slot, piece) in saved.pieces.iter().enumerate() {
                let id = PieceId::new(color, slot as u8);
                restore_piece(&mut game, id, piece)?;
            }

            if !game.player(color).king().in_play() {
                return Err(SnapshotError::MissingKing(color));
            }

            game.player_mut(color)
                .set_draw_requested(saved.draw_requested);
        }

        game.restore_turn(snapshot.active, snapshot.outcome);
        tracing::debug!(active = %snapshot.active, "game restored from snapshot");
        Ok(game)
    }
}

fn restore_piece(game: &mut Game, id: PieceId, saved: &PieceSnapshot) -> Result<(), SnapshotError> {
    let color = id.color();
    let slot = id.index();
    let expected = game.piece(id).base_kind();
    if saved.kind != expected {
        return Err(SnapshotError::KindMismatch {
            color,
            slot,
            expected,
        });
    }

    if let Some(kind) = saved.promoted {
        if expected != PieceKind::Pawn || !kind.is_promotion_target() {
            return Err(SnapshotError::InvalidPromotion { color, slot, kind });
        }
    }

    if saved.captured == saved.position.is_some() {
        return Err(SnapshotError::Inconsistent { color, slot });
    }

    game.piece_mut(id)
        .restore(saved.promoted, saved.captured, saved.flags());
    if let Some(square) = saved.position {
        if game.board().occupant(square).is_some() {
            return Err(SnapshotError::SharedSquare(square));
        }

        game.set_position(id, Some(square));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::MoveRequest;

    fn sq(s: &str) -> Square {
        s.parse().unwrap()
    }

    fn played_game() -> Game {
        let mut game = Game::new();
        for (kind, dest) in [
            (PieceKind::Pawn, "e4"),
            (PieceKind::Pawn, "a6"),
            (PieceKind::Pawn, "e5"),
            (PieceKind::Pawn, "d5"),
        ] {
            game.apply_move(&MoveRequest::new(kind, sq(dest))).unwrap();
        }

        game.offer_draw().unwrap();
        game
    }

    #[test]
    fn json_round_trip() {
        let game = played_game();
        let json = serde_json::to_string(&game.snapshot()).unwrap();
        let restored = Game::from_snapshot(&serde_json::from_str(&json).unwrap()).unwrap();
        assert_eq!(game.as_fen(), restored.as_fen());
        assert_eq!(game.snapshot(), restored.snapshot());
        assert!(restored.player(Color::White).draw_requested());
        assert_eq!(Some(sq("d6")), restored.en_passant_target());
    }

    #[test]
    fn restored_game_plays_on() {
        let game = played_game();
        let mut restored = Game::from_snapshot(&game.snapshot()).unwrap();
        let applied = restored
            .apply_move(&MoveRequest::new(PieceKind::Pawn, sq("d6")))
            .unwrap();
        assert!(applied.en_passant);
    }

    #[test]
    fn squares_are_algebraic() {
        let json = serde_json::to_value(Game::new().snapshot()).unwrap();
        let king = &json["players"][0]["pieces"][4];
        assert_eq!("e1", king["position"]);
        assert_eq!("King", king["kind"]);
    }

    #[test]
    fn outcome_survives() {
        let mut game = Game::new();
        game.resign().unwrap();
        let restored = Game::from_snapshot(&game.snapshot()).unwrap();
        assert_eq!(
            Some(Outcome::Resignation {
                winner: Color::Black
            }),
            restored.outcome()
        );
    }

    mod validation {
        use super::*;

        #[test]
        fn missing_piece() {
            let mut snapshot = Game::new().snapshot();
            snapshot.players[1].pieces.pop();
            assert_eq!(
                Err(SnapshotError::PieceCount {
                    color: Color::Black,
                    count: 15
                }),
                Game::from_snapshot(&snapshot).map(|_| ())
            );
        }

        #[test]
        fn shared_square() {
            let mut snapshot = Game::new().snapshot();
            snapshot.players[0].pieces[12].position = Some(sq("e7"));
            assert_eq!(
                Err(SnapshotError::SharedSquare(sq("e7"))),
                Game::from_snapshot(&snapshot).map(|_| ())
            );
        }

        #[test]
        fn captured_king() {
            let mut snapshot = Game::new().snapshot();
            snapshot.players[0].pieces[4].position = None;
            snapshot.players[0].pieces[4].captured = true;
            assert_eq!(
                Err(SnapshotError::MissingKing(Color::White)),
                Game::from_snapshot(&snapshot).map(|_| ())
            );
        }

        #[test]
        fn wrong_kind_in_slot() {
            let mut snapshot = Game::new().snapshot();
            snapshot.players[0].pieces[0].kind = PieceKind::Queen;
            assert_eq!(
                Err(SnapshotError::KindMismatch {
                    color: Color::White,
                    slot: 0,
                    expected: PieceKind::Rook
                }),
                Game::from_snapshot(&snapshot).map(|_| ())
            );
        }

        #[test]
        fn captured_piece_on_board() {
            let mut snapshot = Game::new().snapshot();
            snapshot.players[1].pieces[8].captured = true;
            assert_eq!(
                Err(SnapshotError::Inconsistent {
                    color: Color::Black,
                    slot: 8
                }),
                Game::from_snapshot(&snapshot).map(|_| ())
            );
        }

        #[test]
        fn promoted_knight() {
            let mut snapshot = Game::new().snapshot();
            snapshot.players[0].pieces[1].promoted = Some(PieceKind::Queen);
            assert_eq!(
                Err(SnapshotError::InvalidPromotion {
                    color: Color::White,
                    slot: 1,
                    kind: PieceKind::Queen
                }),
                Game::from_snapshot(&snapshot).map(|_| ())
            );
        }

        #[test]
        fn swapped_players() {
            let mut snapshot = Game::new().snapshot();
            snapshot.players.swap(0, 1);
            assert_eq!(
                Err(SnapshotError::Players),
                Game::from_snapshot(&snapshot).map(|_| ())
            );
        }
    }
}
