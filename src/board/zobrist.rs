/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fmt;

use super::{CastlingRights, Color, Piece, PieceKind, Square};

/// Stores Zobrist hash keys, for hashing [`Game`](super::Game)s.
///
/// Generated at compile time, so keys remain constant between compilations.
const ZOBRIST_TABLE: ZobristHashTable = ZobristHashTable::new();

/// Four random u64 values.
const SEEDS: [u64; 4] = [
    0x6A09_E667_F3BC_C908,
    0xBB67_AE85_84CA_A73B,
    0x3C6E_F372_FE94_F82B,
    0xA54F_F53A_5F1D_36F1,
];

/// A key identifying a chess position, used to detect repetitions.
///
/// Two positions with the same pieces, side to move, castling rights, and en passant square share a key.
#[derive(Default, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Clone, Copy)]
pub struct ZobristKey(u64);

impl ZobristKey {
    /// Return the inner `u64` of this key.
    ///
    /// # Example
    /// ```
    /// # use newt::*;
    /// let zero = ZobristKey::default();
    /// assert_eq!(zero.inner(), 0);
    /// ```
    #[inline(always)]
    pub const fn inner(&self) -> u64 {
        self.0
    }

    /// Adds/removes `hash_key` to this [`ZobristKey`].
    ///
    /// This is done with the XOR operator, so hashing the same value twice is a no-op.
    #[inline(always)]
    pub fn hash(&mut self, hash_key: u64) {
        self.0 ^= hash_key;
    }

    /// Adds/removes the hash for the provided `piece` at `square`.
    ///
    /// # Example
    /// ```
    /// # use newt::*;
    /// let pawn = Piece::new(Color::Black, PieceKind::Pawn);
    /// let mut d7 = ZobristKey::default();
    /// d7.hash_piece(Square::D7, pawn);
    ///
    /// let mut d5 = ZobristKey::default();
    /// d5.hash_piece(Square::D5, pawn);
    /// assert_ne!(d5, d7);
    ///
    /// d7.hash_piece(Square::D7, pawn);
    /// assert_eq!(d7, ZobristKey::default());
    /// ```
    #[inline(always)]
    pub fn hash_piece(&mut self, square: Square, piece: Piece) {
        self.hash(ZOBRIST_TABLE.piece_keys[square][piece_index(piece)]);
    }

    /// Adds/removes the hash for an en passant square on the file of `ep_square`.
    #[inline(always)]
    pub fn hash_ep_square(&mut self, ep_square: Square) {
        self.hash(ZOBRIST_TABLE.ep_keys[ep_square.file() as usize]);
    }

    /// Same as [`ZobristKey::hash_ep_square`], doing nothing for `None`.
    #[inline(always)]
    pub fn hash_optional_ep_square(&mut self, ep_square: Option<Square>) {
        if let Some(square) = ep_square {
            self.hash_ep_square(square);
        }
    }

    /// Adds/removes the hash for the provided `castling_rights`.
    #[inline(always)]
    pub fn hash_castling_rights(&mut self, castling_rights: CastlingRights) {
        self.hash(ZOBRIST_TABLE.castling_keys[castling_rights.index()]);
    }

    /// Adds/removes the hash for the side to move. White's key is `0`.
    #[inline(always)]
    pub fn hash_side_to_move(&mut self, color: Color) {
        if color.is_black() {
            self.hash(ZOBRIST_TABLE.black_key);
        }
    }
}

impl fmt::Display for ZobristKey {
    #[inline(always)]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

#[inline(always)]
const fn piece_index(piece: Piece) -> usize {
    piece.color().index() * PieceKind::COUNT + piece.kind().index()
}

struct ZobristHashTable {
    /// One unique key for every colored piece on every square.
    piece_keys: [[u64; Color::COUNT * PieceKind::COUNT]; Square::COUNT],

    /// One key per file on which an en passant capture may happen.
    ep_keys: [u64; 8],

    /// One key for every combination of castling rights.
    castling_keys: [u64; CastlingRights::COUNT],

    black_key: u64,
}

impl ZobristHashTable {
    const fn new() -> Self {
        let mut piece_keys = [[0; Color::COUNT * PieceKind::COUNT]; Square::COUNT];
        let mut ep_keys = [0; 8];
        let mut castling_keys = [0; CastlingRights::COUNT];

        let mut state = SEEDS;

        let mut i = 0;
        while i < Square::COUNT {
            let mut j = 0;
            while j < Color::COUNT * PieceKind::COUNT {
                let key;
                (key, state) = xoshiro(state);
                piece_keys[i][j] = key;
                j += 1;
            }
            i += 1;
        }

        i = 0;
        while i < ep_keys.len() {
            let key;
            (key, state) = xoshiro(state);
            ep_keys[i] = key;
            i += 1;
        }

        // No castling rights hashes to 0.
        i = 1;
        while i < CastlingRights::COUNT {
            let key;
            (key, state) = xoshiro(state);
            castling_keys[i] = key;
            i += 1;
        }

        let (black_key, _) = xoshiro(state);

        Self {
            piece_keys,
            ep_keys,
            castling_keys,
            black_key,
        }
    }
}

/// One step of the xoshiro256** generator, from <https://prng.di.unimi.it/xoshiro256starstar.c>
const fn xoshiro(mut s: [u64; 4]) -> (u64, [u64; 4]) {
    let result = s[1].wrapping_mul(5).rotate_left(7).wrapping_mul(9);

    let t = s[1] << 17;

    s[2] ^= s[0];
    s[3] ^= s[1];
    s[1] ^= s[2];
    s[0] ^= s[3];

    s[2] ^= t;

    s[3] = s[3].rotate_left(45);
    (result, s)
}
