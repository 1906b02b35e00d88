/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

/// Precomputed and ray-walked attack sets for every piece.
mod attacks;

/// Sets of squares, stored as 64-bit integers.
mod bitboard;

/// The full state of a game: side to move, rights, counters, and move history.
mod game;

/// Move encoding and UCI notation.
mod moves;

/// Perft node counting, for validating move generation.
mod perft;

/// Pieces and their kinds.
mod piece;

/// Piece placement and castling rights.
mod position;

/// Squares and colors.
mod square;

/// Zobrist hashing of positions.
mod zobrist;

pub use attacks::*;
pub use bitboard::*;
pub use game::*;
pub use moves::*;
pub use perft::*;
pub use piece::*;
pub use position::*;
pub use square::*;
pub use zobrist::*;
