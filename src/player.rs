// Copyright 2022 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use crate::{
    core::{Color, File, PieceKind, Square},
    piece::{Piece, PieceFlags, PieceId},
};

/// The number of pieces each player owns for the whole game.
pub const SET_SIZE: usize = 16;

/// Base kinds of a player's piece set, by slot. Slots 0 through 7 start on the back rank on files a through h; slots
/// 8 through 15 are the pawns on files a through h.
const SET_LAYOUT: [PieceKind; SET_SIZE] = [
    PieceKind::Rook,
    PieceKind::Knight,
    PieceKind::Bishop,
    PieceKind::Queen,
    PieceKind::King,
    PieceKind::Bishop,
    PieceKind::Knight,
    PieceKind::Rook,
    PieceKind::Pawn,
    PieceKind::Pawn,
    PieceKind::Pawn,
    PieceKind::Pawn,
    PieceKind::Pawn,
    PieceKind::Pawn,
    PieceKind::Pawn,
    PieceKind::Pawn,
];

const KING_SLOT: usize = 4;

/// One side of the game and the fixed set of pieces it plays with.
#[derive(Clone, Debug)]
pub struct Player {
    color: Color,
    pieces: Vec<Piece>,
    draw_requested: bool,
}

impl Player {
    pub fn new(color: Color) -> Player {
        let pieces = SET_LAYOUT
            .iter()
            .enumerate()
            .map(|(i, &kind)| Piece::new(PieceId::new(color, i as u8), kind))
            .collect();
        Player {
            color,
            pieces,
            draw_requested: false,
        }
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn pieces(&self) -> &[Piece] {
        &self.pieces
    }

    pub fn piece(&self, id: PieceId) -> &Piece {
        debug_assert_eq!(self.color, id.color());
        &self.pieces[id.index()]
    }

    pub(crate) fn piece_mut(&mut self, id: PieceId) -> &mut Piece {
        debug_assert_eq!(self.color, id.color());
        &mut self.pieces[id.index()]
    }

    pub fn king(&self) -> &Piece {
        &self.pieces[KING_SLOT]
    }

    pub fn in_play(&self) -> impl Iterator<Item = &Piece> {
        self.pieces.iter().filter(|p| p.in_play())
    }

    pub fn captured(&self) -> impl Iterator<Item = &Piece> {
        self.pieces.iter().filter(|p| p.is_captured())
    }

    pub fn draw_requested(&self) -> bool {
        self.draw_requested
    }

    pub(crate) fn set_draw_requested(&mut self, value: bool) {
        self.draw_requested = value;
    }

    /// Clears the en-passant flags of all of this player's pawns.
    pub(crate) fn clear_passant_flags(&mut self) {
        for piece in self.pieces.iter_mut() {
            piece.set_flags(PieceFlags::PASSANT, false);
        }
    }

    /// Returns every piece to its initial state, off of the board.
    pub(crate) fn reset(&mut self) {
        for piece in self.pieces.iter_mut() {
            piece.reset();
        }

        self.draw_requested = false;
    }

    /// The square that the piece in the given slot starts the game on.
    pub(crate) fn home_square(&self, id: PieceId) -> Square {
        let index = id.index();
        let (file, rank) = if index < 8 {
            (index + 1, self.color.back_rank())
        } else {
            (index - 7, self.color.pawn_rank())
        };

        Square::of(
            File::try_from(file as u8).expect("slot index maps onto the board"),
            rank,
        )
    }

    /// Finds an unused slot (one that isn't on the board) whose base kind is `kind`.
    pub(crate) fn free_slot(&self, kind: PieceKind) -> Option<PieceId> {
        self.pieces
            .iter()
            .find(|p| p.base_kind() == kind && p.position().is_none() && !p.is_captured())
            .map(Piece::id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sixteen_pieces() {
        let player = Player::new(Color::Black);
        assert_eq!(SET_SIZE, player.pieces().len());
        assert_eq!(PieceKind::King, player.king().base_kind());
        let pawns = player
            .pieces()
            .iter()
            .filter(|p| p.base_kind() == PieceKind::Pawn)
            .count();
        assert_eq!(8, pawns);
    }

    #[test]
    fn home_squares() {
        let player = Player::new(Color::Black);
        let king = player.king().id();
        assert_eq!("e8", player.home_square(king).to_string());
        assert_eq!(
            "h7",
            player
                .home_square(PieceId::new(Color::Black, 15))
                .to_string()
        );
        assert_eq!(
            "a8",
            player.home_square(PieceId::new(Color::Black, 0)).to_string()
        );
    }

    #[test]
    fn free_slot_by_kind() {
        let player = Player::new(Color::White);
        let slot = player.free_slot(PieceKind::Queen).unwrap();
        assert_eq!(3, slot.index());
    }
}
