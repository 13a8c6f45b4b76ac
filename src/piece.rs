// Copyright 2022 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Individual chess pieces and the state that they carry across a game.

use std::fmt;

use bitflags::bitflags;

use crate::core::{Color, PieceKind, PieceSymbol, Square};

/// Identifies a piece by its color and its slot in that color's fixed piece set. Board cells refer to pieces through
/// these ids; the pieces themselves are owned by their player.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct PieceId {
    color: Color,
    index: u8,
}

impl PieceId {
    pub(crate) const fn new(color: Color, index: u8) -> PieceId {
        PieceId { color, index }
    }

    pub const fn color(self) -> Color {
        self.color
    }

    pub const fn index(self) -> usize {
        self.index as usize
    }
}

impl fmt::Display for PieceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.color, self.index)
    }
}

bitflags! {
    pub struct PieceFlags: u8 {
        const NONE = 0;
        /// King or rook that has not yet moved.
        const CASTLE = 0b0000_0001;
        /// Pawn that may capture en passant on its next move.
        const PASSANT_OFFENSIVE = 0b0000_0010;
        /// Pawn that just advanced two squares and may be captured en passant.
        const PASSANT_DEFENSIVE = 0b0000_0100;
        const PASSANT = Self::PASSANT_OFFENSIVE.bits | Self::PASSANT_DEFENSIVE.bits;
    }
}

/// A single piece. Pieces are never destroyed over the course of a game; captured pieces stay in their player's set
/// with the captured flag set and no position.
#[derive(Clone, Debug)]
pub struct Piece {
    id: PieceId,
    kind: PieceKind,
    promoted: Option<PieceKind>,
    position: Option<Square>,
    captured: bool,
    flags: PieceFlags,
    /// Legal destinations as of the last move generation from this piece's own square.
    moves: Vec<Square>,
}

impl Piece {
    pub(crate) fn new(id: PieceId, kind: PieceKind) -> Piece {
        let flags = match kind {
            PieceKind::King | PieceKind::Rook => PieceFlags::CASTLE,
            _ => PieceFlags::NONE,
        };

        Piece {
            id,
            kind,
            promoted: None,
            position: None,
            captured: false,
            flags,
            moves: Vec::new(),
        }
    }

    pub fn id(&self) -> PieceId {
        self.id
    }

    pub fn color(&self) -> Color {
        self.id.color
    }

    /// The kind that this piece moves as. For promoted pawns, this is the kind the pawn was promoted to.
    pub fn kind(&self) -> PieceKind {
        self.promoted.unwrap_or(self.kind)
    }

    /// The kind that this piece started the game as.
    pub fn base_kind(&self) -> PieceKind {
        self.kind
    }

    pub fn promoted(&self) -> Option<PieceKind> {
        self.promoted
    }

    pub fn position(&self) -> Option<Square> {
        self.position
    }

    pub fn is_captured(&self) -> bool {
        self.captured
    }

    /// Whether or not this piece is still on the board.
    pub fn in_play(&self) -> bool {
        !self.captured && self.position.is_some()
    }

    pub fn can_castle(&self) -> bool {
        self.flags.contains(PieceFlags::CASTLE)
    }

    pub fn passant_offensive(&self) -> bool {
        self.flags.contains(PieceFlags::PASSANT_OFFENSIVE)
    }

    pub fn passant_defensive(&self) -> bool {
        self.flags.contains(PieceFlags::PASSANT_DEFENSIVE)
    }

    pub fn cached_moves(&self) -> &[Square] {
        &self.moves
    }

    pub fn symbol(&self) -> PieceSymbol {
        PieceSymbol {
            color: self.color(),
            kind: self.kind(),
        }
    }

    // Position is only ever written by `Game::set_position`, which keeps the board's back-references in sync.
    pub(crate) fn set_position_raw(&mut self, position: Option<Square>) {
        self.position = position;
    }

    pub(crate) fn set_captured(&mut self, captured: bool) {
        self.captured = captured;
    }

    pub(crate) fn set_flags(&mut self, flags: PieceFlags, value: bool) {
        self.flags.set(flags, value);
    }

    pub(crate) fn cache_moves(&mut self, moves: Vec<Square>) {
        self.moves = moves;
    }

    pub(crate) fn promote(&mut self, kind: PieceKind) {
        debug_assert_eq!(PieceKind::Pawn, self.kind);
        debug_assert!(kind.is_promotion_target());
        self.promoted = Some(kind);
    }

    /// Restores this piece to its state at the start of a game, off of the board.
    pub(crate) fn reset(&mut self) {
        let fresh = Piece::new(self.id, self.kind);
        *self = fresh;
    }

    pub(crate) fn restore(
        &mut self,
        promoted: Option<PieceKind>,
        captured: bool,
        flags: PieceFlags,
    ) {
        self.promoted = promoted;
        self.captured = captured;
        self.flags = flags;
        self.moves.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn castle_flag_on_kings_and_rooks() {
        let king = Piece::new(PieceId::new(Color::White, 4), PieceKind::King);
        let rook = Piece::new(PieceId::new(Color::White, 7), PieceKind::Rook);
        let knight = Piece::new(PieceId::new(Color::White, 6), PieceKind::Knight);
        assert!(king.can_castle());
        assert!(rook.can_castle());
        assert!(!knight.can_castle());
    }

    #[test]
    fn promotion_changes_effective_kind() {
        let mut pawn = Piece::new(PieceId::new(Color::Black, 8), PieceKind::Pawn);
        pawn.promote(PieceKind::Knight);
        assert_eq!(PieceKind::Knight, pawn.kind());
        assert_eq!(PieceKind::Pawn, pawn.base_kind());
        assert_eq!("n", pawn.symbol().to_string());

        pawn.reset();
        assert_eq!(PieceKind::Pawn, pawn.kind());
        assert_eq!(None, pawn.promoted());
    }

    #[test]
    fn unplaced_piece_not_in_play() {
        let mut pawn = Piece::new(PieceId::new(Color::White, 8), PieceKind::Pawn);
        assert!(!pawn.in_play());
        pawn.set_position_raw(Some("a2".parse().unwrap()));
        assert!(pawn.in_play());
        pawn.set_captured(true);
        assert!(!pawn.in_play());
    }

    #[test]
    fn reset_restores_flags() {
        let mut rook = Piece::new(PieceId::new(Color::White, 0), PieceKind::Rook);
        rook.set_flags(PieceFlags::CASTLE, false);
        rook.set_captured(true);
        rook.reset();
        assert!(rook.can_castle());
        assert!(!rook.is_captured());
        assert_eq!(None, rook.position());
    }
}
