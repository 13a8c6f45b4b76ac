// Copyright 2017-2022 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    board::Board,
    core::{self, *},
    movegen,
    piece::{Piece, PieceFlags, PieceId},
    player::Player,
};

mod fen;

pub use fen::FenParseError;

/// How a game ended.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Checkmate { winner: Color },
    Stalemate,
    Draw,
    Resignation { winner: Color },
}

impl Outcome {
    pub fn winner(self) -> Option<Color> {
        match self {
            Outcome::Checkmate { winner } | Outcome::Resignation { winner } => Some(winner),
            Outcome::Stalemate | Outcome::Draw => None,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Checkmate { winner } => write!(f, "checkmate, {} wins", winner),
            Outcome::Stalemate => write!(f, "stalemate"),
            Outcome::Draw => write!(f, "draw by agreement"),
            Outcome::Resignation { winner } => write!(f, "{} wins by resignation", winner),
        }
    }
}

/// Reasons that a move, castle, or draw request was refused. The game is left untouched whenever one of these is
/// returned.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum MoveError {
    #[error("illegal move")]
    Illegal,
    #[error("ambiguous move: more than one {} can move to {destination}", .kind.name())]
    Ambiguous {
        kind: PieceKind,
        destination: Square,
    },
    #[error("pawn moving to {0} must be promoted")]
    PromotionRequired(Square),
    #[error("invalid promotion to a {}", .0.name())]
    InvalidPromotion(PieceKind),
    #[error("the game is over")]
    GameOver,
    #[error("no draw has been offered")]
    NoDrawOffer,
}

/// A request to move a piece of a given kind to a destination, as decoded from move notation. The origin file and
/// rank narrow down which piece is meant when more than one could make the move.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct MoveRequest {
    pub kind: PieceKind,
    pub destination: Square,
    pub origin_file: Option<File>,
    pub origin_rank: Option<Rank>,
    pub promotion: Option<PieceKind>,
}

impl MoveRequest {
    pub fn new(kind: PieceKind, destination: Square) -> MoveRequest {
        MoveRequest {
            kind,
            destination,
            origin_file: None,
            origin_rank: None,
            promotion: None,
        }
    }

    pub fn from_file(mut self, file: File) -> MoveRequest {
        self.origin_file = Some(file);
        self
    }

    pub fn from_rank(mut self, rank: Rank) -> MoveRequest {
        self.origin_rank = Some(rank);
        self
    }

    pub fn promote_to(mut self, kind: PieceKind) -> MoveRequest {
        self.promotion = Some(kind);
        self
    }

    fn matches_origin(&self, origin: Square) -> bool {
        self.origin_file.map_or(true, |f| f == origin.file())
            && self.origin_rank.map_or(true, |r| r == origin.rank())
    }
}

/// A move that has been carried out on the board.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct AppliedMove {
    pub piece: PieceId,
    pub kind: PieceKind,
    pub source: Square,
    pub destination: Square,
    pub captured: Option<PieceId>,
    pub en_passant: bool,
    pub promotion: Option<PieceKind>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CastleSide {
    Kingside,
    Queenside,
}

/// A game of chess between two players, from the opening position to its outcome. The game owns the board and both
/// players' pieces and is the only thing that moves pieces around.
#[derive(Clone, Debug)]
pub struct Game {
    board: Board,
    players: [Player; 2],
    active: Color,
    outcome: Option<Outcome>,
}

impl Game {
    /// Creates a new game with all pieces on their starting squares and White to move.
    pub fn new() -> Game {
        let mut game = Game::empty();
        game.reset();
        game
    }

    /// A game with no pieces on the board. Not playable until pieces are placed.
    pub(crate) fn empty() -> Game {
        Game {
            board: Board::new(),
            players: [Player::new(Color::White), Player::new(Color::Black)],
            active: Color::White,
            outcome: None,
        }
    }

    /// Puts every piece back on its starting square, undoing promotions, captures, and castling, and hands the move
    /// to White.
    pub fn reset(&mut self) {
        self.board.clear();
        for color in core::colors() {
            self.player_mut(color).reset();
            let ids: Vec<PieceId> = self.player(color).pieces().iter().map(Piece::id).collect();
            for id in ids {
                let home = self.player(color).home_square(id);
                self.set_position(id, Some(home));
            }
        }

        self.active = Color::White;
        self.outcome = None;
        tracing::debug!("game reset to the starting position");
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn player(&self, color: Color) -> &Player {
        &self.players[color as usize]
    }

    pub(crate) fn player_mut(&mut self, color: Color) -> &mut Player {
        &mut self.players[color as usize]
    }

    /// The color whose turn it is to move.
    pub fn active(&self) -> Color {
        self.active
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    pub fn is_over(&self) -> bool {
        self.outcome.is_some()
    }

    pub fn piece(&self, id: PieceId) -> &Piece {
        self.player(id.color()).piece(id)
    }

    pub(crate) fn piece_mut(&mut self, id: PieceId) -> &mut Piece {
        self.player_mut(id.color()).piece_mut(id)
    }

    pub fn piece_at(&self, square: Square) -> Option<&Piece> {
        self.board.occupant(square).map(|id| self.piece(id))
    }

    /// Moves a piece to a square, or off of the board. This is the only place a piece's position is written; it
    /// keeps the board's cells pointing at the pieces standing on them.
    pub(crate) fn set_position(&mut self, id: PieceId, position: Option<Square>) {
        let previous = self.piece(id).position();
        self.piece_mut(id).set_position_raw(position);
        if let Some(previous) = previous {
            if self.board.occupant(previous) == Some(id) {
                self.board.set_occupant(previous, None);
            }
        }

        if let Some(position) = position {
            self.board.set_occupant(position, Some(id));
        }
    }

    pub(crate) fn restore_turn(&mut self, active: Color, outcome: Option<Outcome>) {
        self.active = active;
        self.outcome = outcome;
    }

    /// Takes a piece off of the board for good.
    fn capture(&mut self, id: PieceId) {
        self.set_position(id, None);
        self.piece_mut(id).set_captured(true);
    }
}

//
// Move generation, legality, and check detection.
//

impl Game {
    /// Generates the destinations that the given piece can move to. Moves for the side to move are filtered down to
    /// those that don't leave its king attacked; moves for the other side are only pseudo-legal.
    ///
    /// If `origin` is given, moves are generated as if the piece stood there, and the result is not remembered.
    /// Otherwise the result is also cached on the piece.
    pub fn generate_moves(&mut self, id: PieceId, origin: Option<Square>) -> Vec<Square> {
        let filter = id.color() == self.active;
        self.collect_moves(id, origin, filter)
    }

    fn collect_moves(&mut self, id: PieceId, origin: Option<Square>, filter: bool) -> Vec<Square> {
        let piece = self.piece(id);
        if piece.is_captured() {
            return vec![];
        }

        let actual = piece.position();
        let origin = match origin.or(actual) {
            Some(origin) => origin,
            None => return vec![],
        };

        let mut moves = Vec::new();
        movegen::generate_moves(self, piece, origin, &mut moves);
        let from_actual = Some(origin) == actual;
        if from_actual && piece.kind() == PieceKind::Pawn && id.color() == self.active {
            let en_passant = !movegen::en_passant_moves(self, piece, origin).is_empty();
            if en_passant {
                self.piece_mut(id)
                    .set_flags(PieceFlags::PASSANT_OFFENSIVE, true);
            }
        }

        if filter {
            let mut legal = Vec::with_capacity(moves.len());
            for dest in moves {
                if !self.would_expose_king(id, dest) {
                    legal.push(dest);
                }
            }

            moves = legal;
        }

        if from_actual {
            self.piece_mut(id).cache_moves(moves.clone());
        }

        moves
    }

    /// Whether moving the given piece to `dest` would leave its own king attacked. The move is tried out on the
    /// board and always taken back before returning.
    pub fn would_expose_king(&mut self, id: PieceId, dest: Square) -> bool {
        let origin = self.piece(id).position();
        let mut displaced = Vec::with_capacity(2);
        if let Some(occupant) = self.board.occupant(dest) {
            if occupant != id {
                displaced.push((occupant, dest));
            }
        }

        if let Some(origin) = origin {
            if let Some(victim) = self.en_passant_victim(id, origin, dest) {
                if let Some(square) = self.piece(victim).position() {
                    displaced.push((victim, square));
                }
            }
        }

        for &(piece, _) in &displaced {
            self.set_position(piece, None);
        }

        self.set_position(id, Some(dest));
        let exposed = self.is_in_check(id.color());
        self.set_position(id, origin);
        for &(piece, square) in &displaced {
            self.set_position(piece, Some(square));
        }

        exposed
    }

    /// If a pawn moving from `origin` to `dest` would be an en-passant capture, returns the pawn that it would
    /// capture.
    fn en_passant_victim(&self, id: PieceId, origin: Square, dest: Square) -> Option<PieceId> {
        if self.piece(id).kind() != PieceKind::Pawn
            || origin.file() == dest.file()
            || !self.board.is_empty(dest)
        {
            return None;
        }

        let beside = Square::of(dest.file(), origin.rank());
        let victim = self.board.occupant(beside)?;
        let piece = self.piece(victim);
        if victim.color() != id.color()
            && piece.kind() == PieceKind::Pawn
            && piece.passant_defensive()
        {
            Some(victim)
        } else {
            None
        }
    }

    /// Whether any enemy piece attacks the king of the given color.
    pub fn is_in_check(&self, color: Color) -> bool {
        let target = match self.player(color).king().position() {
            Some(target) => target,
            None => return false,
        };

        let mut moves = Vec::new();
        for piece in self.player(color.toggle()).in_play() {
            moves.clear();
            if let Some(origin) = piece.position() {
                movegen::generate_moves(self, piece, origin, &mut moves);
            }

            if moves.contains(&target) {
                return true;
            }
        }

        false
    }

    /// Whether any piece of the given color has a legal move.
    fn has_legal_moves(&mut self, color: Color) -> bool {
        let ids: Vec<PieceId> = self.player(color).in_play().map(Piece::id).collect();
        for id in ids {
            if !self.collect_moves(id, None, true).is_empty() {
                return true;
            }
        }

        false
    }

    pub fn is_checkmate(&mut self, color: Color) -> bool {
        self.is_in_check(color) && !self.has_legal_moves(color)
    }

    pub fn is_stalemate(&mut self, color: Color) -> bool {
        !self.is_in_check(color) && !self.has_legal_moves(color)
    }

    /// Whether both players have agreed to a draw.
    pub fn is_draw(&self) -> bool {
        self.players.iter().all(Player::draw_requested)
    }
}

//
// Making moves and the flow of turns.
//

impl Game {
    /// Moves the active player's piece of the requested kind to the requested square. Exactly one such piece must be
    /// able to legally make the move, after narrowing by the request's origin file and rank.
    pub fn apply_move(&mut self, request: &MoveRequest) -> Result<AppliedMove, MoveError> {
        if self.outcome.is_some() {
            return Err(MoveError::GameOver);
        }

        let us = self.active;
        let dest = request.destination;
        let candidates: Vec<PieceId> = self
            .player(us)
            .in_play()
            .filter(|p| p.kind() == request.kind)
            .map(Piece::id)
            .collect();

        let mut movable = Vec::new();
        for id in candidates {
            let moves = self.generate_moves(id, None);
            let origin = self.piece(id).position();
            if moves.contains(&dest) && origin.map_or(false, |o| request.matches_origin(o)) {
                movable.push(id);
            }
        }

        let id = match movable.as_slice() {
            [] => {
                tracing::debug!(kind = request.kind.name(), %dest, "no piece can make this move");
                return Err(MoveError::Illegal);
            }
            [id] => *id,
            _ => {
                tracing::debug!(kind = request.kind.name(), %dest, count = movable.len(), "ambiguous move");
                return Err(MoveError::Ambiguous {
                    kind: request.kind,
                    destination: dest,
                });
            }
        };

        let piece = self.piece(id);
        let kind = piece.kind();
        let source = piece.position().ok_or(MoveError::Illegal)?;
        let promotion = if kind == PieceKind::Pawn && dest.rank() == us.promotion_rank() {
            match request.promotion {
                None => return Err(MoveError::PromotionRequired(dest)),
                Some(target) if !target.is_promotion_target() => {
                    return Err(MoveError::InvalidPromotion(target))
                }
                Some(target) => Some(target),
            }
        } else if let Some(target) = request.promotion {
            tracing::debug!(kind = kind.name(), %dest, "promotion requested on a move that doesn't promote");
            return Err(MoveError::InvalidPromotion(target));
        } else {
            None
        };

        // Nothing below this point may fail; the move is happening.
        let mut captured = None;
        let mut en_passant = false;
        if kind == PieceKind::Pawn {
            if piece.passant_offensive() {
                if let Some(victim) = self.en_passant_victim(id, source, dest) {
                    self.capture(victim);
                    captured = Some(victim);
                    en_passant = true;
                }
            }

            let distance = dest.rank().number() as i8 - source.rank().number() as i8;
            if source.rank() == us.pawn_rank() && distance.abs() == 2 {
                self.piece_mut(id)
                    .set_flags(PieceFlags::PASSANT_DEFENSIVE, true);
            }
        }

        if let Some(occupant) = self.board.occupant(dest) {
            self.capture(occupant);
            captured = Some(occupant);
        }

        self.set_position(id, Some(dest));
        if let Some(target) = promotion {
            self.piece_mut(id).promote(target);
        }

        let base = self.piece(id).base_kind();
        if base == PieceKind::King || base == PieceKind::Rook {
            self.piece_mut(id).set_flags(PieceFlags::CASTLE, false);
        }

        tracing::info!(
            color = %us,
            piece = %id,
            kind = kind.name(),
            %source,
            %dest,
            captured = captured.is_some(),
            en_passant,
            "move"
        );
        self.pass_turn();
        Ok(AppliedMove {
            piece: id,
            kind,
            source,
            destination: dest,
            captured,
            en_passant,
            promotion,
        })
    }

    pub fn castle_kingside(&mut self) -> Result<(), MoveError> {
        self.castle(CastleSide::Kingside)
    }

    pub fn castle_queenside(&mut self) -> Result<(), MoveError> {
        self.castle(CastleSide::Queenside)
    }

    /// Castles the active player's king with the rook on the given side. The king and rook must not have moved, the
    /// squares between them must be empty, and the king may not castle out of, through, or into check.
    pub fn castle(&mut self, side: CastleSide) -> Result<(), MoveError> {
        if self.outcome.is_some() {
            return Err(MoveError::GameOver);
        }

        let us = self.active;
        let king = self.player(us).king();
        let king_id = king.id();
        let rank = match king.position() {
            Some(square) if king.can_castle() => square.rank(),
            _ => return Err(MoveError::Illegal),
        };

        // Squares that must be empty, squares the king passes over, and where the king and rook end up.
        let (rook_file, empty, traversed, king_file, rook_dest_file) = match side {
            CastleSide::Kingside => (
                FILE_H,
                &[FILE_F, FILE_G][..],
                &[FILE_F, FILE_G][..],
                FILE_G,
                FILE_F,
            ),
            CastleSide::Queenside => (
                FILE_A,
                &[FILE_B, FILE_C, FILE_D][..],
                &[FILE_C, FILE_D][..],
                FILE_C,
                FILE_D,
            ),
        };

        let rook_square = Square::of(rook_file, rank);
        let rook_id = match self.piece_at(rook_square) {
            Some(rook)
                if rook.color() == us && rook.kind() == PieceKind::Rook && rook.can_castle() =>
            {
                rook.id()
            }
            _ => {
                tracing::debug!(?side, "no rook eligible for castling");
                return Err(MoveError::Illegal);
            }
        };

        if self.is_in_check(us) {
            tracing::debug!(?side, "cannot castle out of check");
            return Err(MoveError::Illegal);
        }

        if empty
            .iter()
            .any(|&file| !self.board.is_empty(Square::of(file, rank)))
        {
            tracing::debug!(?side, "pieces between king and rook");
            return Err(MoveError::Illegal);
        }

        for &file in traversed {
            if self.would_expose_king(king_id, Square::of(file, rank)) {
                tracing::debug!(?side, "king would pass through check");
                return Err(MoveError::Illegal);
            }
        }

        self.set_position(king_id, Some(Square::of(king_file, rank)));
        self.set_position(rook_id, Some(Square::of(rook_dest_file, rank)));
        self.piece_mut(king_id).set_flags(PieceFlags::CASTLE, false);
        self.piece_mut(rook_id).set_flags(PieceFlags::CASTLE, false);
        tracing::info!(color = %us, ?side, "castle");
        self.pass_turn();
        Ok(())
    }

    /// The active player resigns, handing the game to their opponent.
    pub fn resign(&mut self) -> Result<Outcome, MoveError> {
        if self.outcome.is_some() {
            return Err(MoveError::GameOver);
        }

        let outcome = Outcome::Resignation {
            winner: self.active.toggle(),
        };
        tracing::info!(color = %self.active, "resigned");
        self.outcome = Some(outcome);
        Ok(outcome)
    }

    /// The active player offers a draw. They still have to make their move; the opponent answers the offer on their
    /// turn with `respond_to_draw`. Offering a draw while the opponent's offer is pending accepts it.
    pub fn offer_draw(&mut self) -> Result<(), MoveError> {
        if self.outcome.is_some() {
            return Err(MoveError::GameOver);
        }

        if self.pending_draw_offer() {
            self.respond_to_draw(true)?;
            return Ok(());
        }

        let us = self.active;
        self.player_mut(us).set_draw_requested(true);
        tracing::info!(color = %us, "draw offered");
        Ok(())
    }

    /// Whether the active player's opponent has offered a draw that hasn't been answered yet.
    pub fn pending_draw_offer(&self) -> bool {
        self.outcome.is_none() && self.player(self.active.toggle()).draw_requested()
    }

    /// The active player accepts or declines their opponent's draw offer.
    pub fn respond_to_draw(&mut self, accept: bool) -> Result<Option<Outcome>, MoveError> {
        if self.outcome.is_some() {
            return Err(MoveError::GameOver);
        }

        if !self.pending_draw_offer() {
            return Err(MoveError::NoDrawOffer);
        }

        let us = self.active;
        if accept {
            self.player_mut(us).set_draw_requested(true);
            debug_assert!(self.is_draw());
            self.outcome = Some(Outcome::Draw);
            tracing::info!(color = %us, "draw accepted");
        } else {
            self.player_mut(us.toggle()).set_draw_requested(false);
            tracing::info!(color = %us, "draw declined");
        }

        Ok(self.outcome)
    }

    /// Hands the move to the other player. Their en-passant window from their previous move has passed, an
    /// unanswered draw offer of theirs lapses, and the game ends if they have no legal moves.
    fn pass_turn(&mut self) {
        let them = self.active.toggle();
        self.active = them;
        self.player_mut(them).clear_passant_flags();
        self.player_mut(them).set_draw_requested(false);
        self.refresh_outcome();
    }

    pub(crate) fn refresh_outcome(&mut self) {
        let to_move = self.active;
        if self.has_legal_moves(to_move) {
            return;
        }

        let outcome = if self.is_in_check(to_move) {
            Outcome::Checkmate {
                winner: to_move.toggle(),
            }
        } else {
            Outcome::Stalemate
        };

        tracing::info!(%outcome, "game over");
        self.outcome = Some(outcome);
    }
}

impl Default for Game {
    fn default() -> Self {
        Game::new()
    }
}

impl fmt::Display for Game {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for rank in core::ranks().rev() {
            for file in core::files() {
                let sq = Square::of(file, rank);
                if let Some(piece) = self.piece_at(sq) {
                    write!(f, " {} ", piece.symbol())?;
                } else {
                    write!(f, " . ")?;
                }
            }

            writeln!(f, "| {}", rank)?;
        }

        for _ in core::files() {
            write!(f, "---")?;
        }

        writeln!(f)?;
        for file in core::files() {
            write!(f, " {} ", file)?;
        }

        writeln!(f)?;
        Ok(())
    }
}
