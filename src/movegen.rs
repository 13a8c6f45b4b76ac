// Copyright 2021 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Pseudo-legal move generation. Everything here reads the board and never mutates it; filtering out moves that
//! leave the king in check is the job of `Game`.

use crate::core::*;
use crate::piece::Piece;
use crate::Game;

const KNIGHT_OFFSETS: [(i8, i8); 8] = [
    (-2, 1),
    (-1, 2),
    (1, 2),
    (2, 1),
    (2, -1),
    (1, -2),
    (-2, -1),
    (-1, -2),
];

const KING_OFFSETS: [(i8, i8); 8] = [
    (1, 0),
    (-1, 0),
    (0, 1),
    (0, -1),
    (1, 1),
    (-1, -1),
    (1, -1),
    (-1, 1),
];

/// Generates the pseudo-legal destinations of `piece` as if it were standing on `origin`.
pub fn generate_moves(game: &Game, piece: &Piece, origin: Square, moves: &mut Vec<Square>) {
    let us = piece.color();
    match piece.kind() {
        PieceKind::Pawn => generate_pawn_moves(game, piece, origin, moves),
        PieceKind::Knight => generate_stepping_moves(game, us, origin, &KNIGHT_OFFSETS, moves),
        PieceKind::King => generate_stepping_moves(game, us, origin, &KING_OFFSETS, moves),
        PieceKind::Bishop => generate_sliding_moves(game, us, origin, &DIAGONAL, moves),
        PieceKind::Rook => generate_sliding_moves(game, us, origin, &ORTHOGONAL, moves),
        PieceKind::Queen => {
            generate_sliding_moves(game, us, origin, &ORTHOGONAL, moves);
            generate_sliding_moves(game, us, origin, &DIAGONAL, moves);
        }
    }
}

pub fn generate_pawn_moves(game: &Game, piece: &Piece, origin: Square, moves: &mut Vec<Square>) {
    let us = piece.color();
    let board = game.board();
    let up = us.forward();

    // Single and double pawn pushes.
    if let Some(single) = origin.offset(0, up) {
        if board.is_empty(single) {
            moves.push(single);
            if origin.rank() == us.pawn_rank() {
                if let Some(double) = single.offset(0, up) {
                    if board.is_empty(double) {
                        moves.push(double);
                    }
                }
            }
        }
    }

    // Captures, which are only possible onto enemy-occupied squares.
    for side in [-1, 1] {
        if let Some(target) = origin.offset(side, up) {
            if board.alignment(target) == Some(us.toggle()) {
                moves.push(target);
            }
        }
    }

    moves.extend(en_passant_moves(game, piece, origin));
}

/// Returns the en-passant captures available to `piece` from `origin`: the squares behind adjacent enemy pawns that
/// have just advanced two squares.
pub fn en_passant_moves(game: &Game, piece: &Piece, origin: Square) -> Vec<Square> {
    let us = piece.color();
    let board = game.board();
    let mut moves = Vec::new();
    for side in [-1, 1] {
        let (beside, behind) = match (origin.offset(side, 0), origin.offset(side, us.forward())) {
            (Some(beside), Some(behind)) => (beside, behind),
            _ => continue,
        };

        let victim = match board.occupant(beside) {
            Some(id) if id.color() != us => game.piece(id),
            _ => continue,
        };

        if victim.kind() == PieceKind::Pawn && victim.passant_defensive() && board.is_empty(behind) {
            moves.push(behind);
        }
    }

    moves
}

/// Knight and king moves: fixed offsets, kept on the board and off of our own pieces.
fn generate_stepping_moves(
    game: &Game,
    us: Color,
    origin: Square,
    offsets: &[(i8, i8)],
    moves: &mut Vec<Square>,
) {
    let board = game.board();
    for &(files, ranks) in offsets {
        if let Some(target) = origin.offset(files, ranks) {
            if board.alignment(target) != Some(us) {
                moves.push(target);
            }
        }
    }
}

/// Rook, bishop and queen moves: rays that stop at the edge of the board, just short of our own pieces, or on top of
/// an enemy piece.
fn generate_sliding_moves(
    game: &Game,
    us: Color,
    origin: Square,
    directions: &[Direction],
    moves: &mut Vec<Square>,
) {
    let board = game.board();
    for &dir in directions {
        let mut cursor = origin;
        while let Some(next) = cursor.towards(dir) {
            match board.alignment(next) {
                None => moves.push(next),
                Some(color) if color == us => break,
                Some(_) => {
                    moves.push(next);
                    break;
                }
            }

            cursor = next;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::generate_moves;
    use crate::core::*;
    use crate::Game;

    fn sq(s: &str) -> Square {
        s.parse().unwrap()
    }

    fn moves_from(fen: &'static str, origin: &str) -> HashSet<Square> {
        let game = Game::from_fen(fen).unwrap();
        let id = game.board().occupant(sq(origin)).expect("no piece at origin");
        let mut moves = Vec::new();
        generate_moves(&game, game.piece(id), sq(origin), &mut moves);
        moves.into_iter().collect()
    }

    fn assert_moves_generated(fen: &'static str, origin: &str, expected: &[&str]) {
        let moves = moves_from(fen, origin);
        let expected: HashSet<Square> = expected.iter().map(|s| sq(s)).collect();
        if moves != expected {
            let game = Game::from_fen(fen).unwrap();
            println!("{}", game);
            println!("generated: {:?}", moves);
            println!("expected:  {:?}", expected);
            panic!()
        }
    }

    mod pawns {
        use super::*;

        #[test]
        fn white_pawn_smoke_test() {
            assert_moves_generated("4k3/8/8/8/5P2/8/8/4K3 w - -", "f4", &["f5"]);
        }

        #[test]
        fn double_push_from_home_rank() {
            assert_moves_generated("4k3/8/8/8/8/8/2P5/4K3 w - -", "c2", &["c3", "c4"]);
        }

        #[test]
        fn no_double_push_when_blocked() {
            assert_moves_generated("4k3/8/8/8/8/4p3/4P3/4K3 w - -", "e2", &[]);
            assert_moves_generated("4k3/8/8/8/4p3/8/4P3/4K3 w - -", "e2", &["e3"]);
        }

        #[test]
        fn black_pawn_moves_down() {
            assert_moves_generated("4k3/3p4/8/8/8/8/8/4K3 b - -", "d7", &["d6", "d5"]);
        }

        #[test]
        fn captures_only_enemies() {
            assert_moves_generated("4k3/8/8/2p1N3/3P4/8/8/4K3 w - -", "d4", &["d5", "c5"]);
        }

        #[test]
        fn en_passant_target() {
            // black just played d7-d5
            assert_moves_generated("4k3/8/8/3pP3/8/8/8/4K3 w - d6", "e5", &["e6", "d6"]);
        }

        #[test]
        fn no_en_passant_without_flag() {
            assert_moves_generated("4k3/8/8/3pP3/8/8/8/4K3 w - -", "e5", &["e6"]);
        }
    }

    mod knights {
        use super::*;

        #[test]
        fn corner_knight() {
            assert_moves_generated("4k3/8/8/8/8/8/8/N3K3 w - -", "a1", &["b3", "c2"]);
        }

        #[test]
        fn excludes_own_pieces() {
            assert_moves_generated("4k3/8/8/8/8/1P6/8/N3K3 w - -", "a1", &["c2"]);
        }
    }

    mod sliders {
        use super::*;

        #[test]
        fn bishop_smoke_test() {
            assert_moves_generated(
                "8/8/8/8/3B4/8/8/K6k w - -",
                "d4",
                &[
                    "e5", "f6", "g7", "h8", "e3", "f2", "g1", "c3", "b2", "c5", "b6", "a7",
                ],
            );
        }

        #[test]
        fn bishop_captures_stop_rays() {
            assert_moves_generated(
                "k7/8/8/2p1p3/3B4/2p1p3/8/K7 w - -",
                "d4",
                &["e5", "e3", "c5", "c3"],
            );
        }

        #[test]
        fn rook_stops_before_own_piece() {
            assert_moves_generated(
                "k7/8/8/8/8/8/8/R2K4 w - -",
                "a1",
                &["b1", "c1", "a2", "a3", "a4", "a5", "a6", "a7", "a8"],
            );
        }

        #[test]
        fn queen_combines_rook_and_bishop() {
            let moves = moves_from("k7/8/8/8/8/8/8/K6Q w - -", "h1");
            assert!(moves.contains(&sq("b1")));
            assert!(moves.contains(&sq("h8")));
            assert!(moves.contains(&sq("b7")));
            assert!(!moves.contains(&sq("a1")));
            assert_eq!(20, moves.len());
        }
    }

    mod kings {
        use super::*;

        #[test]
        fn king_in_corner() {
            assert_moves_generated("k7/8/8/8/8/8/8/7K w - -", "h1", &["g1", "g2", "h2"]);
        }
    }
}
