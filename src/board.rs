// Copyright 2022 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The 8x8 grid of cells that pieces stand on.

use crate::{
    core::{self, Color, CoordinateError, Square},
    piece::PieceId,
};

/// A single cell of the board. A cell refers to the piece standing on it, if any, by id; it never owns the piece.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Cell {
    square: Square,
    occupant: Option<PieceId>,
}

impl Cell {
    pub fn square(&self) -> Square {
        self.square
    }

    pub fn occupant(&self) -> Option<PieceId> {
        self.occupant
    }

    /// The color of the piece on this cell, if there is one.
    pub fn alignment(&self) -> Option<Color> {
        self.occupant.map(PieceId::color)
    }

    pub fn is_empty(&self) -> bool {
        self.occupant.is_none()
    }
}

#[derive(Clone, Debug)]
pub struct Board {
    cells: [Cell; 64],
}

impl Board {
    pub fn new() -> Board {
        let mut cells = [Cell {
            square: Square::of(core::FILE_A, core::RANK_1),
            occupant: None,
        }; 64];
        for square in core::squares() {
            cells[square.index()].square = square;
        }

        Board { cells }
    }

    /// Returns the cell at the given 1-indexed file and rank.
    pub fn cell(&self, file: u8, rank: u8) -> Result<&Cell, CoordinateError> {
        let square = Square::new(file, rank)?;
        Ok(self.cell_at(square))
    }

    pub fn cell_at(&self, square: Square) -> &Cell {
        &self.cells[square.index()]
    }

    pub fn occupant(&self, square: Square) -> Option<PieceId> {
        self.cell_at(square).occupant
    }

    pub fn alignment(&self, square: Square) -> Option<Color> {
        self.cell_at(square).alignment()
    }

    pub fn is_empty(&self, square: Square) -> bool {
        self.cell_at(square).is_empty()
    }

    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter()
    }

    pub fn occupied(&self) -> impl Iterator<Item = (Square, PieceId)> + '_ {
        self.cells
            .iter()
            .filter_map(|cell| cell.occupant.map(|id| (cell.square, id)))
    }

    pub(crate) fn set_occupant(&mut self, square: Square, occupant: Option<PieceId>) {
        self.cells[square.index()].occupant = occupant;
    }

    pub(crate) fn clear(&mut self) {
        for cell in self.cells.iter_mut() {
            cell.occupant = None;
        }
    }
}

impl Default for Board {
    fn default() -> Self {
        Board::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cells_know_their_squares() {
        let board = Board::new();
        let cell = board.cell(3, 6).unwrap();
        assert_eq!("c6", cell.square().to_string());
        assert!(cell.is_empty());
        assert_eq!(None, cell.alignment());
    }

    #[test]
    fn invalid_coordinates() {
        let board = Board::new();
        assert_eq!(
            Err(CoordinateError::FileOutOfRange(9)),
            board.cell(9, 1).map(|c| c.square())
        );
        assert_eq!(
            Err(CoordinateError::RankOutOfRange(0)),
            board.cell(1, 0).map(|c| c.square())
        );
    }

    #[test]
    fn alignment_follows_occupant() {
        let mut board = Board::new();
        let sq: Square = "d4".parse().unwrap();
        board.set_occupant(sq, Some(PieceId::new(Color::Black, 3)));
        assert_eq!(Some(Color::Black), board.alignment(sq));
        assert_eq!(1, board.occupied().count());

        board.clear();
        assert!(board.is_empty(sq));
    }

    #[test]
    fn every_square_has_one_cell() {
        let board = Board::new();
        let squares: std::collections::HashSet<_> = board.cells().map(Cell::square).collect();
        assert_eq!(64, squares.len());
        assert!(board.cells().all(Cell::is_empty));
    }
}
