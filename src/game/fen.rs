// Copyright 2017-2022 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Reading and writing games as FEN strings. Only the fields that the rules care about are kept: piece placement,
//! side to move, castling availability, and the en-passant square. Move counters are accepted and ignored.

use std::{
    fmt::Write,
    iter::Peekable,
    str::Chars,
};

use thiserror::Error;

use crate::{
    core::{self, *},
    piece::{PieceFlags, PieceId},
    Game,
};

#[derive(Clone, PartialEq, Eq, Debug, Error)]
pub enum FenParseError {
    #[error("unexpected char: {0}")]
    UnexpectedChar(char),
    #[error("unexpected EOF while reading")]
    UnexpectedEnd,
    #[error("invalid digit")]
    InvalidDigit,
    #[error("file does not sum to 8")]
    FileDoesNotSumToEight,
    #[error("unknown piece: {0}")]
    UnknownPiece(char),
    #[error("too many pieces of kind {0}")]
    TooManyPieces(char),
    #[error("{0} has no king")]
    MissingKing(Color),
    #[error("invalid side to move")]
    InvalidSideToMove,
    #[error("invalid castle")]
    InvalidCastle,
    #[error("invalid en-passant")]
    InvalidEnPassant,
}

type Stream<'a> = Peekable<Chars<'a>>;

fn eat(iter: &mut Stream<'_>, expected: char) -> Result<(), FenParseError> {
    match iter.next() {
        Some(c) if c == expected => Ok(()),
        Some(c) => Err(FenParseError::UnexpectedChar(c)),
        None => Err(FenParseError::UnexpectedEnd),
    }
}

fn advance(iter: &mut Stream<'_>) {
    let _ = iter.next();
}

fn peek(iter: &mut Stream<'_>) -> Result<char, FenParseError> {
    iter.peek().copied().ok_or(FenParseError::UnexpectedEnd)
}

/// Consumes a field separator, returning false if the string ended instead.
fn eat_separator(iter: &mut Stream<'_>) -> Result<bool, FenParseError> {
    match iter.peek() {
        None => Ok(false),
        Some(_) => eat(iter, ' ').map(|_| true),
    }
}

fn eat_side_to_move(iter: &mut Stream<'_>) -> Result<Color, FenParseError> {
    let side = match peek(iter)? {
        'w' => Color::White,
        'b' => Color::Black,
        _ => return Err(FenParseError::InvalidSideToMove),
    };

    advance(iter);
    Ok(side)
}

/// Castling rights as (color, side) pairs.
fn eat_castle_status(iter: &mut Stream<'_>) -> Result<Vec<(Color, bool)>, FenParseError> {
    if peek(iter)? == '-' {
        advance(iter);
        return Ok(vec![]);
    }

    let mut rights = Vec::new();
    for _ in 0..4 {
        let right = match iter.peek() {
            Some('K') => (Color::White, true),
            Some('Q') => (Color::White, false),
            Some('k') => (Color::Black, true),
            Some('q') => (Color::Black, false),
            Some(' ') | None => break,
            Some(_) => return Err(FenParseError::InvalidCastle),
        };

        rights.push(right);
        advance(iter);
    }

    if rights.is_empty() {
        return Err(FenParseError::InvalidCastle);
    }

    Ok(rights)
}

fn eat_en_passant(iter: &mut Stream<'_>) -> Result<Option<Square>, FenParseError> {
    let c = peek(iter)?;
    if c == '-' {
        advance(iter);
        return Ok(None);
    }

    let file = File::try_from(c).map_err(|_| FenParseError::InvalidEnPassant)?;
    advance(iter);
    let rank = Rank::try_from(peek(iter)?).map_err(|_| FenParseError::InvalidEnPassant)?;
    advance(iter);
    Ok(Some(Square::of(file, rank)))
}

impl Game {
    /// Constructs a new game from a FEN representation of a board position.
    ///
    /// Pieces are assigned to their player's fixed set by kind. Extra queens, rooks, bishops, and knights take the
    /// place of missing pawns, as if they had been promoted; pieces that aren't on the board count as captured.
    pub fn from_fen(fen: impl AsRef<str>) -> Result<Game, FenParseError> {
        let mut game = Game::empty();
        let iter = &mut fen.as_ref().chars().peekable();
        for rank in core::ranks().rev() {
            let mut file = 0;
            while file < 8 {
                let c = peek(iter)?;
                // digits 1 through 8 indicate empty squares.
                if c.is_ascii_digit() {
                    if !('1'..='8').contains(&c) {
                        return Err(FenParseError::InvalidDigit);
                    }

                    file += c as u8 - b'0';
                    if file > 8 {
                        return Err(FenParseError::FileDoesNotSumToEight);
                    }

                    advance(iter);
                    continue;
                }

                if c == '/' || c == ' ' {
                    return Err(FenParseError::FileDoesNotSumToEight);
                }

                // if it's not a digit, it represents a piece.
                let symbol = PieceSymbol::try_from(c).map_err(|_| FenParseError::UnknownPiece(c))?;
                let square = Square::of(
                    File::try_from(file + 1).map_err(|_| FenParseError::FileDoesNotSumToEight)?,
                    rank,
                );
                game.place(symbol, square)
                    .ok_or(FenParseError::TooManyPieces(c))?;
                advance(iter);
                file += 1;
            }

            if rank != core::RANK_1 {
                eat(iter, '/')?;
            }
        }

        // Whatever wasn't placed is off the board for good.
        for color in core::colors() {
            let unplaced: Vec<PieceId> = game
                .player(color)
                .pieces()
                .iter()
                .filter(|p| p.position().is_none())
                .map(|p| p.id())
                .collect();
            for id in unplaced {
                game.piece_mut(id).set_captured(true);
            }

            if !game.player(color).king().in_play() {
                return Err(FenParseError::MissingKing(color));
            }

            for id in game.castling_pieces(color) {
                game.piece_mut(id).set_flags(PieceFlags::CASTLE, false);
            }
        }

        eat(iter, ' ')?;
        game.active = eat_side_to_move(iter)?;
        if eat_separator(iter)? {
            for (color, kingside) in eat_castle_status(iter)? {
                game.grant_castle(color, kingside)?;
            }
        }

        if eat_separator(iter)? {
            if let Some(target) = eat_en_passant(iter)? {
                game.grant_en_passant(target)?;
            }
        }

        // Trailing halfmove and fullmove clocks have no bearing on the rules.
        game.refresh_outcome();
        Ok(game)
    }

    /// Puts a piece of the given kind and color on the board, drawing it from its player's unused pieces.
    fn place(&mut self, symbol: PieceSymbol, square: Square) -> Option<PieceId> {
        let player = self.player(symbol.color);
        let (id, promoted) = match player.free_slot(symbol.kind) {
            Some(id) => (id, false),
            None if symbol.kind.is_promotion_target() => (player.free_slot(PieceKind::Pawn)?, true),
            None => return None,
        };

        self.set_position(id, Some(square));
        if promoted {
            self.piece_mut(id).promote(symbol.kind);
        }

        Some(id)
    }

    /// The unpromoted kings and rooks of the given color.
    fn castling_pieces(&self, color: Color) -> Vec<PieceId> {
        self.player(color)
            .pieces()
            .iter()
            .filter(|p| p.promoted().is_none())
            .filter(|p| matches!(p.base_kind(), PieceKind::King | PieceKind::Rook))
            .map(|p| p.id())
            .collect()
    }

    fn grant_castle(&mut self, color: Color, kingside: bool) -> Result<(), FenParseError> {
        let rank = color.back_rank();
        let rook_file = if kingside { FILE_H } else { FILE_A };
        let king = self.piece_at(Square::of(FILE_E, rank));
        let rook = self.piece_at(Square::of(rook_file, rank));
        let (king, rook) = match (king, rook) {
            (Some(king), Some(rook))
                if king.color() == color
                    && rook.color() == color
                    && king.kind() == PieceKind::King
                    && rook.base_kind() == PieceKind::Rook =>
            {
                (king.id(), rook.id())
            }
            _ => return Err(FenParseError::InvalidCastle),
        };

        self.piece_mut(king).set_flags(PieceFlags::CASTLE, true);
        self.piece_mut(rook).set_flags(PieceFlags::CASTLE, true);
        Ok(())
    }

    /// Marks the pawn that just skipped over `target` as open to en-passant capture.
    fn grant_en_passant(&mut self, target: Square) -> Result<(), FenParseError> {
        let mover = self.active.toggle();
        let pawn = target
            .offset(0, mover.forward())
            .and_then(|square| self.piece_at(square))
            .filter(|p| p.color() == mover && p.kind() == PieceKind::Pawn)
            .map(|p| p.id())
            .ok_or(FenParseError::InvalidEnPassant)?;
        let skipped = mover.pawn_rank().number() as i8 + mover.forward();
        if target.rank().number() as i8 != skipped {
            return Err(FenParseError::InvalidEnPassant);
        }

        self.piece_mut(pawn)
            .set_flags(PieceFlags::PASSANT_DEFENSIVE, true);
        Ok(())
    }

    pub fn as_fen(&self) -> String {
        let mut buf = String::new();
        for rank in core::ranks().rev() {
            let mut empty_squares = 0;
            for file in core::files() {
                let square = Square::of(file, rank);
                if let Some(piece) = self.piece_at(square) {
                    if empty_squares != 0 {
                        let _ = write!(&mut buf, "{}", empty_squares);
                    }
                    let _ = write!(&mut buf, "{}", piece.symbol());
                    empty_squares = 0;
                } else {
                    empty_squares += 1;
                }
            }

            if empty_squares != 0 {
                let _ = write!(&mut buf, "{}", empty_squares);
            }

            if rank != core::RANK_1 {
                buf.push('/');
            }
        }

        buf.push(' ');
        match self.active {
            Color::White => buf.push('w'),
            Color::Black => buf.push('b'),
        }

        buf.push(' ');
        let mut any_castle = false;
        for (color, kingside, c) in [
            (Color::White, true, 'K'),
            (Color::White, false, 'Q'),
            (Color::Black, true, 'k'),
            (Color::Black, false, 'q'),
        ] {
            if self.castle_available(color, kingside) {
                buf.push(c);
                any_castle = true;
            }
        }

        if !any_castle {
            buf.push('-');
        }

        buf.push(' ');
        match self.en_passant_target() {
            Some(target) => {
                let _ = write!(&mut buf, "{}", target);
            }
            None => buf.push('-'),
        }

        buf
    }

    /// Whether the king and the given rook of `color` are both still eligible to castle. This says nothing about
    /// whether castling is legal right now.
    pub fn castle_available(&self, color: Color, kingside: bool) -> bool {
        let rank = color.back_rank();
        let rook_file = if kingside { FILE_H } else { FILE_A };
        let eligible = |square: Square, kind: PieceKind| {
            self.piece_at(square)
                .map_or(false, |p| p.color() == color && p.kind() == kind && p.can_castle())
        };

        eligible(Square::of(FILE_E, rank), PieceKind::King)
            && eligible(Square::of(rook_file, rank), PieceKind::Rook)
    }

    /// The square behind the pawn that is currently open to en-passant capture, if there is one.
    pub fn en_passant_target(&self) -> Option<Square> {
        let mover = self.active.toggle();
        self.player(mover)
            .in_play()
            .find(|p| p.kind() == PieceKind::Pawn && p.passant_defensive())
            .and_then(|p| p.position())
            .and_then(|square| square.offset(0, -mover.forward()))
    }
}
