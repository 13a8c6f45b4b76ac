// Copyright 2022 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Decoding of the compact move notation typed in by players.
//!
//! A move is a piece letter followed by the destination square, e.g. `nf3` or `pe4`. When more than one piece of
//! that kind could reach the destination, the file and/or rank that the piece moves from goes between the two:
//! `ngf3`, `n1f3`, `ng1f3`. Input is case-insensitive; a capture marker `x` is allowed anywhere and ignored, as are
//! trailing check and mate markers. Pawns reaching the last rank name their promotion with `=q` or just `q`.
//! Castling is written `o-o` or `o-o-o` (zeroes work too).
//!
//! Nothing here knows about the board; whether a decoded move is legal is up to `Game`.

use std::convert::TryFrom;

use thiserror::Error;

use crate::{
    core::{CoordinateError, File, PieceKind, Rank, Square},
    game::MoveRequest,
};

/// A decoded command to move a piece or to castle.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Notation {
    Move(MoveRequest),
    CastleKingside,
    CastleQueenside,
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum NotationError {
    #[error("empty move")]
    Empty,
    #[error("unknown piece: {0}")]
    UnknownPiece(char),
    #[error("unexpected char: {0}")]
    UnexpectedChar(char),
    #[error("expected a destination square, optionally preceded by the file and rank to move from")]
    BadLength,
    #[error(transparent)]
    Coordinate(#[from] CoordinateError),
}

/// Decodes a single move. See the module documentation for the accepted forms.
pub fn parse(input: &str) -> Result<Notation, NotationError> {
    let lowered = input.trim().to_ascii_lowercase();
    let text = lowered.trim_end_matches(|c| c == '+' || c == '#');
    match text {
        "" => return Err(NotationError::Empty),
        "o-o" | "0-0" => return Ok(Notation::CastleKingside),
        "o-o-o" | "0-0-0" => return Ok(Notation::CastleQueenside),
        _ => {}
    }

    let mut chars: Vec<char> = text.chars().filter(|&c| c != 'x').collect();
    if chars.is_empty() {
        return Err(NotationError::Empty);
    }

    let first = chars.remove(0);
    let kind = PieceKind::try_from(first).map_err(|_| NotationError::UnknownPiece(first))?;
    let promotion = take_promotion(&mut chars)?;

    let (origin_file, origin_rank) = match chars.len() {
        2 => (None, None),
        3 if chars[0].is_ascii_digit() => (None, Some(Rank::try_from(chars[0])?)),
        3 => (Some(File::try_from(chars[0])?), None),
        4 => (
            Some(File::try_from(chars[0])?),
            Some(Rank::try_from(chars[1])?),
        ),
        _ => return Err(NotationError::BadLength),
    };

    let n = chars.len();
    let destination = Square::of(File::try_from(chars[n - 2])?, Rank::try_from(chars[n - 1])?);
    Ok(Notation::Move(MoveRequest {
        kind,
        destination,
        origin_file,
        origin_rank,
        promotion,
    }))
}

/// Strips a promotion suffix off of the end of a move, if there is one. A destination always ends in a rank digit,
/// so a letter after a digit can only name a promotion.
fn take_promotion(chars: &mut Vec<char>) -> Result<Option<PieceKind>, NotationError> {
    let last = match chars.last() {
        Some(&'=') => return Err(NotationError::UnexpectedChar('=')),
        Some(&c) => c,
        None => return Ok(None),
    };

    let before = chars.len().checked_sub(2).map(|i| chars[i]);
    let follows_rank = matches!(before, Some(c) if c.is_ascii_digit() || c == '=');
    if !last.is_ascii_alphabetic() || !follows_rank {
        return Ok(None);
    }

    let kind = PieceKind::try_from(last).map_err(|_| NotationError::UnknownPiece(last))?;
    chars.pop();
    if chars.last() == Some(&'=') {
        chars.pop();
    }

    Ok(Some(kind))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::*;

    fn sq(s: &str) -> Square {
        s.parse().unwrap()
    }

    fn request(input: &str) -> MoveRequest {
        match parse(input) {
            Ok(Notation::Move(request)) => request,
            other => panic!("expected a move from {:?}, got {:?}", input, other),
        }
    }

    mod moves {
        use super::*;

        #[test]
        fn piece_and_destination() {
            let req = request("nf3");
            assert_eq!(PieceKind::Knight, req.kind);
            assert_eq!(sq("f3"), req.destination);
            assert_eq!(None, req.origin_file);
            assert_eq!(None, req.origin_rank);
            assert_eq!(None, req.promotion);
        }

        #[test]
        fn case_insensitive() {
            assert_eq!(request("nf3"), request("NF3"));
            assert_eq!(request("pe4"), request("Pe4"));
        }

        #[test]
        fn origin_file() {
            let req = request("ngf3");
            assert_eq!(Some(FILE_G), req.origin_file);
            assert_eq!(None, req.origin_rank);
        }

        #[test]
        fn origin_rank() {
            let req = request("n1f3");
            assert_eq!(None, req.origin_file);
            assert_eq!(Some(RANK_1), req.origin_rank);
        }

        #[test]
        fn full_origin() {
            let req = request("ng1f3");
            assert_eq!(Some(FILE_G), req.origin_file);
            assert_eq!(Some(RANK_1), req.origin_rank);
            assert_eq!(sq("f3"), req.destination);
        }

        #[test]
        fn capture_marker_ignored() {
            assert_eq!(request("pd5").destination, request("pxd5").destination);
            let req = request("pexd5");
            assert_eq!(Some(FILE_E), req.origin_file);
            assert_eq!(sq("d5"), req.destination);
        }

        #[test]
        fn check_markers_ignored() {
            assert_eq!(request("qh4"), request("qh4+"));
            assert_eq!(request("qh4"), request("qh4#"));
        }

        #[test]
        fn bishop_file_is_not_a_promotion() {
            let req = request("bb2");
            assert_eq!(PieceKind::Bishop, req.kind);
            assert_eq!(sq("b2"), req.destination);
            assert_eq!(None, req.promotion);
        }
    }

    mod promotion {
        use super::*;

        #[test]
        fn with_equals() {
            let req = request("pe8=q");
            assert_eq!(sq("e8"), req.destination);
            assert_eq!(Some(PieceKind::Queen), req.promotion);
        }

        #[test]
        fn bare_suffix() {
            assert_eq!(Some(PieceKind::Knight), request("pa1n").promotion);
            assert_eq!(Some(PieceKind::Rook), request("pdxe8r+").promotion);
        }

        #[test]
        fn dangling_equals() {
            assert_eq!(Err(NotationError::UnexpectedChar('=')), parse("pe8="));
        }
    }

    mod castling {
        use super::*;

        #[test]
        fn kingside() {
            assert_eq!(Ok(Notation::CastleKingside), parse("o-o"));
            assert_eq!(Ok(Notation::CastleKingside), parse("O-O"));
            assert_eq!(Ok(Notation::CastleKingside), parse("0-0+"));
        }

        #[test]
        fn queenside() {
            assert_eq!(Ok(Notation::CastleQueenside), parse("o-o-o"));
            assert_eq!(Ok(Notation::CastleQueenside), parse("0-0-0"));
        }
    }

    mod errors {
        use super::*;

        #[test]
        fn empty() {
            assert_eq!(Err(NotationError::Empty), parse(""));
            assert_eq!(Err(NotationError::Empty), parse("   "));
            assert_eq!(Err(NotationError::Empty), parse("x"));
        }

        #[test]
        fn unknown_piece() {
            assert_eq!(Err(NotationError::UnknownPiece('z')), parse("ze4"));
        }

        #[test]
        fn bad_length() {
            assert_eq!(Err(NotationError::BadLength), parse("n"));
            assert_eq!(Err(NotationError::BadLength), parse("nf"));
            assert_eq!(Err(NotationError::BadLength), parse("nabcd3"));
        }

        #[test]
        fn bad_coordinates() {
            assert_eq!(
                Err(NotationError::Coordinate(CoordinateError::InvalidRankChar('9'))),
                parse("ne9")
            );
            assert_eq!(
                Err(NotationError::Coordinate(CoordinateError::InvalidFileChar('3'))),
                parse("n33")
            );
        }
    }
}
