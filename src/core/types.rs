// Copyright 2017-2022 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use std::{convert::TryFrom, fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors arising from addressing the board with coordinates that don't exist on it.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum CoordinateError {
    #[error("file out of range: {0}")]
    FileOutOfRange(u8),
    #[error("rank out of range: {0}")]
    RankOutOfRange(u8),
    #[error("invalid file char: {0}")]
    InvalidFileChar(char),
    #[error("invalid rank char: {0}")]
    InvalidRankChar(char),
    #[error("invalid square: {0:?}")]
    InvalidSquare(String),
}

#[derive(Debug, Error)]
pub enum PieceParseError {
    #[error("invalid char: {0}")]
    InvalidChar(char),
}

/// A file on the chessboard, numbered 1 (the a-file) through 8 (the h-file).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct File(u8);

impl File {
    pub const fn number(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for File {
    type Error = CoordinateError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if !(1..=8).contains(&value) {
            return Err(CoordinateError::FileOutOfRange(value));
        }

        Ok(File(value))
    }
}

impl TryFrom<char> for File {
    type Error = CoordinateError;

    fn try_from(value: char) -> Result<Self, Self::Error> {
        match value {
            'a'..='h' => Ok(File(value as u8 - b'a' + 1)),
            c => Err(CoordinateError::InvalidFileChar(c)),
        }
    }
}

impl fmt::Display for File {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", (b'a' + self.0 - 1) as char)
    }
}

pub const FILE_A: File = File(1);
pub const FILE_B: File = File(2);
pub const FILE_C: File = File(3);
pub const FILE_D: File = File(4);
pub const FILE_E: File = File(5);
pub const FILE_F: File = File(6);
pub const FILE_G: File = File(7);
pub const FILE_H: File = File(8);

/// A rank on the chessboard, numbered 1 through 8 from White's side.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Rank(u8);

impl Rank {
    pub const fn number(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Rank {
    type Error = CoordinateError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if !(1..=8).contains(&value) {
            return Err(CoordinateError::RankOutOfRange(value));
        }

        Ok(Rank(value))
    }
}

impl TryFrom<char> for Rank {
    type Error = CoordinateError;

    fn try_from(value: char) -> Result<Self, Self::Error> {
        match value {
            '1'..='8' => Ok(Rank(value as u8 - b'0')),
            c => Err(CoordinateError::InvalidRankChar(c)),
        }
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

pub const RANK_1: Rank = Rank(1);
pub const RANK_2: Rank = Rank(2);
pub const RANK_3: Rank = Rank(3);
pub const RANK_4: Rank = Rank(4);
pub const RANK_5: Rank = Rank(5);
pub const RANK_6: Rank = Rank(6);
pub const RANK_7: Rank = Rank(7);
pub const RANK_8: Rank = Rank(8);

/// A square on the chessboard, identified by its file and rank. Squares are plain coordinates; what occupies them
/// is tracked by the board.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Square(u8);

impl Square {
    /// Creates a new Square composed of a given file and rank.
    pub const fn of(file: File, rank: Rank) -> Square {
        Square((rank.0 - 1) * 8 + (file.0 - 1))
    }

    /// Creates a new Square from 1-indexed file and rank numbers, failing if either is off the board.
    pub fn new(file: u8, rank: u8) -> Result<Square, CoordinateError> {
        Ok(Square::of(File::try_from(file)?, Rank::try_from(rank)?))
    }

    pub const fn file(self) -> File {
        File((self.0 & 7) + 1)
    }

    pub const fn rank(self) -> Rank {
        Rank((self.0 >> 3) + 1)
    }

    /// Returns the square displaced from this one by the given number of files and ranks, or None if that square
    /// would be off of the board.
    pub fn offset(self, files: i8, ranks: i8) -> Option<Square> {
        let file = self.file().0 as i8 + files;
        let rank = self.rank().0 as i8 + ranks;
        if !(1..=8).contains(&file) || !(1..=8).contains(&rank) {
            return None;
        }

        Some(Square::of(File(file as u8), Rank(rank as u8)))
    }

    /// Returns the closest square in the given direction, or None if the direction runs off of the board.
    pub fn towards(self, dir: Direction) -> Option<Square> {
        let (files, ranks) = dir.as_vector();
        self.offset(files, ranks)
    }

    pub(crate) const fn index(self) -> usize {
        self.0 as usize
    }
}

impl FromStr for Square {
    type Err = CoordinateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        match (chars.next(), chars.next(), chars.next()) {
            (Some(file), Some(rank), None) => {
                Ok(Square::of(File::try_from(file)?, Rank::try_from(rank)?))
            }
            _ => Err(CoordinateError::InvalidSquare(s.to_owned())),
        }
    }
}

impl TryFrom<String> for Square {
    type Error = CoordinateError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Square> for String {
    fn from(square: Square) -> Self {
        square.to_string()
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.file(), self.rank())
    }
}

#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Color {
    White,
    Black,
}

impl Color {
    pub fn toggle(self) -> Color {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    /// The rank that this color's pawns start on.
    pub fn pawn_rank(self) -> Rank {
        match self {
            Color::White => RANK_2,
            Color::Black => RANK_7,
        }
    }

    /// The rank that this color's pawns promote on.
    pub fn promotion_rank(self) -> Rank {
        match self {
            Color::White => RANK_8,
            Color::Black => RANK_1,
        }
    }

    /// The rank that this color's king and rooks start on.
    pub fn back_rank(self) -> Rank {
        match self {
            Color::White => RANK_1,
            Color::Black => RANK_8,
        }
    }

    /// The direction, in ranks, that this color's pawns advance.
    pub fn forward(self) -> i8 {
        match self {
            Color::White => 1,
            Color::Black => -1,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::White => write!(f, "White"),
            Color::Black => write!(f, "Black"),
        }
    }
}

#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PieceKind {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl PieceKind {
    /// Whether or not a pawn may promote into this kind of piece.
    pub fn is_promotion_target(self) -> bool {
        matches!(
            self,
            PieceKind::Knight | PieceKind::Bishop | PieceKind::Rook | PieceKind::Queen
        )
    }

    pub fn name(self) -> &'static str {
        match self {
            PieceKind::Pawn => "pawn",
            PieceKind::Knight => "knight",
            PieceKind::Bishop => "bishop",
            PieceKind::Rook => "rook",
            PieceKind::Queen => "queen",
            PieceKind::King => "king",
        }
    }
}

impl TryFrom<char> for PieceKind {
    type Error = PieceParseError;

    fn try_from(value: char) -> Result<Self, Self::Error> {
        let kind = match value.to_ascii_lowercase() {
            'p' => PieceKind::Pawn,
            'n' => PieceKind::Knight,
            'b' => PieceKind::Bishop,
            'r' => PieceKind::Rook,
            'q' => PieceKind::Queen,
            'k' => PieceKind::King,
            _ => return Err(PieceParseError::InvalidChar(value)),
        };

        Ok(kind)
    }
}

impl fmt::Display for PieceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = match self {
            PieceKind::Pawn => 'p',
            PieceKind::Knight => 'n',
            PieceKind::Bishop => 'b',
            PieceKind::Rook => 'r',
            PieceKind::Queen => 'q',
            PieceKind::King => 'k',
        };

        write!(f, "{}", c)
    }
}

/// The kind and color of a piece, as seen by someone looking at the board.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PieceSymbol {
    pub color: Color,
    pub kind: PieceKind,
}

impl TryFrom<char> for PieceSymbol {
    type Error = PieceParseError;

    fn try_from(value: char) -> Result<Self, Self::Error> {
        let kind = PieceKind::try_from(value)?;
        let color = if value.is_ascii_uppercase() {
            Color::White
        } else {
            Color::Black
        };

        Ok(PieceSymbol { color, kind })
    }
}

impl fmt::Display for PieceSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = self.kind.to_string();
        match self.color {
            Color::White => write!(f, "{}", c.to_ascii_uppercase()),
            Color::Black => write!(f, "{}", c),
        }
    }
}

#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Direction {
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
}

impl Direction {
    /// Returns this direction as a (files, ranks) step.
    pub const fn as_vector(self) -> (i8, i8) {
        match self {
            Direction::North => (0, 1),
            Direction::NorthEast => (1, 1),
            Direction::East => (1, 0),
            Direction::SouthEast => (1, -1),
            Direction::South => (0, -1),
            Direction::SouthWest => (-1, -1),
            Direction::West => (-1, 0),
            Direction::NorthWest => (-1, 1),
        }
    }
}

pub const ORTHOGONAL: [Direction; 4] = [
    Direction::North,
    Direction::East,
    Direction::South,
    Direction::West,
];

pub const DIAGONAL: [Direction; 4] = [
    Direction::NorthEast,
    Direction::SouthEast,
    Direction::SouthWest,
    Direction::NorthWest,
];

macro_rules! type_iterator {
    ($name:ident, $type:ident, $max:expr) => {
        pub struct $name(u8, u8);

        impl Iterator for $name {
            type Item = $type;

            fn next(&mut self) -> Option<Self::Item> {
                if self.0 >= self.1 {
                    None
                } else {
                    let next = self.0;
                    self.0 += 1;
                    Some($type(next + 1))
                }
            }
        }

        impl ::std::iter::DoubleEndedIterator for $name {
            fn next_back(&mut self) -> Option<Self::Item> {
                if self.1 <= self.0 {
                    None
                } else {
                    self.1 -= 1;
                    Some($type(self.1 + 1))
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                $name(0, $max)
            }
        }
    };
}

type_iterator!(AllRanks, Rank, 8);
type_iterator!(AllFiles, File, 8);

pub fn ranks() -> AllRanks {
    AllRanks::default()
}

pub fn files() -> AllFiles {
    AllFiles::default()
}

/// All squares on the board, a1 through h8, rank by rank.
pub fn squares() -> impl Iterator<Item = Square> {
    (0..64).map(Square)
}

pub fn colors() -> ::std::vec::IntoIter<Color> {
    vec![Color::White, Color::Black].into_iter()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn square_coordinates() {
        let sq = Square::new(5, 4).unwrap();
        assert_eq!(FILE_E, sq.file());
        assert_eq!(RANK_4, sq.rank());
        assert_eq!("e4", sq.to_string());
    }

    #[test]
    fn square_out_of_range() {
        assert_eq!(Err(CoordinateError::FileOutOfRange(0)), Square::new(0, 1));
        assert_eq!(Err(CoordinateError::RankOutOfRange(9)), Square::new(1, 9));
    }

    #[test]
    fn square_parse() {
        let sq: Square = "h8".parse().unwrap();
        assert_eq!(Square::new(8, 8).unwrap(), sq);
        assert!("i1".parse::<Square>().is_err());
        assert!("a9".parse::<Square>().is_err());
        assert!("a".parse::<Square>().is_err());
        assert!("a1b".parse::<Square>().is_err());
    }

    #[test]
    fn offset_off_board() {
        let a1 = Square::of(FILE_A, RANK_1);
        assert_eq!(None, a1.offset(-1, 0));
        assert_eq!(None, a1.towards(Direction::South));
        assert_eq!(Some(Square::of(FILE_B, RANK_2)), a1.towards(Direction::NorthEast));
    }

    #[test]
    fn rank_file_iterators() {
        let files: Vec<_> = files().map(|f| f.to_string()).collect();
        assert_eq!(vec!["a", "b", "c", "d", "e", "f", "g", "h"], files);
        let ranks: Vec<_> = ranks().rev().map(|r| r.number()).collect();
        assert_eq!(vec![8, 7, 6, 5, 4, 3, 2, 1], ranks);
        assert_eq!(64, squares().count());
    }

    #[test]
    fn piece_symbols() {
        let symbol = PieceSymbol::try_from('N').unwrap();
        assert_eq!(Color::White, symbol.color);
        assert_eq!(PieceKind::Knight, symbol.kind);
        assert_eq!("N", symbol.to_string());
        assert_eq!("q", PieceSymbol::try_from('q').unwrap().to_string());
        assert!(PieceSymbol::try_from('x').is_err());
    }
}
