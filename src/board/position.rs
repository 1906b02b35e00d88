/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{fmt, ops::BitOr};

use anyhow::{bail, Result};

use super::{attacks_for, bishop_attacks, king_attacks, knight_attacks, pawn_attacks, rook_attacks};
use super::{Bitboard, Color, Move, Piece, PieceKind, Square};

/// The castling rights of both players, stored as four bit flags.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Debug)]
pub struct CastlingRights(u8);

impl CastlingRights {
    pub const NONE: Self = Self(0);
    pub const WHITE_SHORT: Self = Self(0b0001);
    pub const WHITE_LONG: Self = Self(0b0010);
    pub const BLACK_SHORT: Self = Self(0b0100);
    pub const BLACK_LONG: Self = Self(0b1000);
    pub const ALL: Self = Self(0b1111);

    /// Number of possible combinations of castling rights.
    pub const COUNT: usize = 16;

    #[inline(always)]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    #[inline(always)]
    pub const fn contains(self, rights: Self) -> bool {
        self.0 & rights.0 == rights.0
    }

    #[inline(always)]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    #[inline(always)]
    pub fn insert(&mut self, rights: Self) {
        self.0 |= rights.0;
    }

    #[inline(always)]
    pub fn remove(&mut self, rights: Self) {
        self.0 &= !rights.0;
    }

    /// Kingside castling right for `color`.
    #[inline(always)]
    pub const fn short(color: Color) -> Self {
        match color {
            Color::White => Self::WHITE_SHORT,
            Color::Black => Self::BLACK_SHORT,
        }
    }

    /// Queenside castling right for `color`.
    #[inline(always)]
    pub const fn long(color: Color) -> Self {
        match color {
            Color::White => Self::WHITE_LONG,
            Color::Black => Self::BLACK_LONG,
        }
    }

    /// Rights lost when a piece moves from, or is captured on, `square`.
    ///
    /// # Example
    /// ```
    /// # use newt::*;
    /// assert_eq!(CastlingRights::lost_on(Square::H1), CastlingRights::WHITE_SHORT);
    /// assert_eq!(CastlingRights::lost_on(Square::D4), CastlingRights::NONE);
    /// ```
    #[inline(always)]
    pub const fn lost_on(square: Square) -> Self {
        match square.index() {
            0 => Self::WHITE_LONG,
            4 => Self(Self::WHITE_SHORT.0 | Self::WHITE_LONG.0),
            7 => Self::WHITE_SHORT,
            56 => Self::BLACK_LONG,
            60 => Self(Self::BLACK_SHORT.0 | Self::BLACK_LONG.0),
            63 => Self::BLACK_SHORT,
            _ => Self::NONE,
        }
    }

    /// Parses the castling field of a FEN string, such as `KQkq` or `-`.
    pub fn from_fen(castling: &str) -> Result<Self> {
        let mut rights = Self::NONE;
        if castling == "-" {
            return Ok(rights);
        }

        for c in castling.chars() {
            rights.insert(match c {
                'K' => Self::WHITE_SHORT,
                'Q' => Self::WHITE_LONG,
                'k' => Self::BLACK_SHORT,
                'q' => Self::BLACK_LONG,
                _ => bail!("Invalid castling rights {castling:?}: Unexpected char {c:?}"),
            });
        }

        Ok(rights)
    }

    pub fn to_fen(self) -> String {
        if self.is_empty() {
            return String::from("-");
        }

        [
            (Self::WHITE_SHORT, 'K'),
            (Self::WHITE_LONG, 'Q'),
            (Self::BLACK_SHORT, 'k'),
            (Self::BLACK_LONG, 'q'),
        ]
        .into_iter()
        .filter_map(|(rights, c)| self.contains(rights).then_some(c))
        .collect()
    }
}

impl BitOr for CastlingRights {
    type Output = Self;
    #[inline(always)]
    fn bitor(self, rhs: Self) -> Self::Output {
        Self(self.0 | rhs.0)
    }
}

impl fmt::Display for CastlingRights {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_fen())
    }
}

/// What happened on the board when a move was applied.
///
/// Holds everything needed to take the move back.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Applied {
    /// The piece that left the source square.
    pub moved: Piece,

    /// The piece that was captured, and the square it was captured on.
    pub captured: Option<(Square, Piece)>,

    /// The squares the Rook travelled between, if this move was a castle.
    pub rook: Option<(Square, Square)>,
}

/// The placement of pieces on a chess board.
///
/// Stores a mailbox for fast lookups by square, alongside one [`Bitboard`] per [`Color`] and per [`PieceKind`].
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Board {
    mailbox: [Option<Piece>; Square::COUNT],
    colors: [Bitboard; Color::COUNT],
    kinds: [Bitboard; PieceKind::COUNT],
}

impl Board {
    /// Creates an empty [`Board`].
    ///
    /// # Example
    /// ```
    /// # use newt::Board;
    /// let board = Board::new();
    /// assert_eq!(board.to_fen(), "8/8/8/8/8/8/8/8");
    /// ```
    #[inline(always)]
    pub const fn new() -> Self {
        Self {
            mailbox: [None; Square::COUNT],
            colors: [Bitboard::EMPTY; Color::COUNT],
            kinds: [Bitboard::EMPTY; PieceKind::COUNT],
        }
    }

    /// Constructs a [`Board`] from the piece placement field of a FEN string.
    pub fn from_fen(placements: &str) -> Result<Self> {
        let mut board = Self::new();

        if placements.matches('/').count() != 7 {
            bail!("FEN must have piece placements for all 8 ranks. Got {placements:?}");
        }

        // Reversed so that White's pieces land on the low ranks
        for (rank, row) in placements.split('/').rev().enumerate() {
            let mut file = 0;

            for c in row.chars() {
                if let Some(empty) = c.to_digit(10) {
                    file += empty as u8;
                    continue;
                }

                let piece = Piece::from_char(c)?;
                if file > 7 {
                    bail!("Too many squares on rank {} of FEN placements {placements:?}", rank + 1);
                }
                board.place(piece, Square::new(file, rank as u8));
                file += 1;
            }

            if file != 8 {
                bail!(
                    "Rank {} of FEN placements {placements:?} must describe exactly 8 squares",
                    rank + 1
                );
            }
        }

        Ok(board)
    }

    /// Generates the piece placement field of a FEN string for this board.
    pub fn to_fen(&self) -> String {
        let mut rows = Vec::with_capacity(8);

        for rank in (0..8).rev() {
            let mut row = String::new();
            let mut empty = 0;

            for file in 0..8 {
                match self.piece_at(Square::new(file, rank)) {
                    Some(piece) => {
                        if empty != 0 {
                            row += &empty.to_string();
                            empty = 0;
                        }
                        row.push(piece.char());
                    }
                    None => empty += 1,
                }
            }

            if empty != 0 {
                row += &empty.to_string();
            }
            rows.push(row);
        }

        rows.join("/")
    }

    /// Places `piece` on `square`, replacing whatever was there.
    #[inline(always)]
    pub fn place(&mut self, piece: Piece, square: Square) {
        self.take(square);
        self.mailbox[square] = Some(piece);
        self.colors[piece.color()] |= square.bitboard();
        self.kinds[piece.kind()] |= square.bitboard();
    }

    /// Removes and returns the piece on `square`, if there is one.
    #[inline(always)]
    pub fn take(&mut self, square: Square) -> Option<Piece> {
        let piece = self.mailbox[square].take()?;
        self.colors[piece.color()] ^= square.bitboard();
        self.kinds[piece.kind()] ^= square.bitboard();
        Some(piece)
    }

    #[inline(always)]
    pub const fn piece_at(&self, square: Square) -> Option<Piece> {
        self.mailbox[square.index()]
    }

    /// All squares holding a piece of `kind`, regardless of color.
    #[inline(always)]
    pub fn kind(&self, kind: PieceKind) -> Bitboard {
        self.kinds[kind]
    }

    /// All squares holding a piece of `color`.
    #[inline(always)]
    pub fn color_bb(&self, color: Color) -> Bitboard {
        self.colors[color]
    }

    /// All squares holding a piece of `kind` and `color`.
    ///
    /// # Example
    /// ```
    /// # use newt::*;
    /// let board = Game::default();
    /// assert_eq!(board.pieces(PieceKind::Knight, Color::Black).population(), 2);
    /// ```
    #[inline(always)]
    pub fn pieces(&self, kind: PieceKind, color: Color) -> Bitboard {
        self.kinds[kind] & self.colors[color]
    }

    #[inline(always)]
    pub fn occupied(&self) -> Bitboard {
        self.colors[Color::White] | self.colors[Color::Black]
    }

    /// Number of pieces on the board, Kings and Pawns included.
    #[inline(always)]
    pub fn occupied_count(&self) -> u32 {
        self.occupied().population()
    }

    /// The square of `color`'s King, or `None` if it has no King.
    #[inline(always)]
    pub fn king_square(&self, color: Color) -> Option<Square> {
        self.pieces(PieceKind::King, color).lsb()
    }

    /// Iterates over all occupied squares and their pieces, from `a1` to `h8`.
    pub fn iter(&self) -> impl Iterator<Item = (Square, Piece)> + '_ {
        self.occupied()
            .into_iter()
            .filter_map(|square| self.piece_at(square).map(|piece| (square, piece)))
    }

    /// The pieces of `color` that attack `square`.
    ///
    /// Pins are ignored: a pinned piece still attacks the squares it could reach.
    ///
    /// # Example
    /// ```
    /// # use newt::*;
    /// let board = Game::default();
    /// // e3 is covered by the d2 and f2 pawns
    /// assert_eq!(board.attackers(Color::White, Square::E3).population(), 2);
    /// // f3 is covered by e2, g2, and the g1 knight
    /// assert_eq!(board.attackers(Color::White, Square::F3).population(), 3);
    /// ```
    pub fn attackers(&self, color: Color, square: Square) -> Bitboard {
        let blockers = self.occupied();
        let queens = self.kind(PieceKind::Queen);

        let attackers = (pawn_attacks(square, color.opponent()) & self.kind(PieceKind::Pawn))
            | (knight_attacks(square) & self.kind(PieceKind::Knight))
            | (king_attacks(square) & self.kind(PieceKind::King))
            | (bishop_attacks(square, blockers) & (self.kind(PieceKind::Bishop) | queens))
            | (rook_attacks(square, blockers) & (self.kind(PieceKind::Rook) | queens));

        attackers & self.colors[color]
    }

    /// Returns `true` if any piece of `by` attacks `square`.
    #[inline(always)]
    pub fn is_attacked(&self, square: Square, by: Color) -> bool {
        self.attackers(by, square).is_nonempty()
    }

    /// Squares attacked by the piece on `square`, or an empty set if it is vacant.
    #[inline(always)]
    pub fn attacks_from(&self, square: Square) -> Bitboard {
        self.piece_at(square)
            .map(|piece| attacks_for(piece, square, self.occupied()))
            .unwrap_or_default()
    }

    /// Moves pieces on the board according to `mv`, returning what was moved and captured.
    ///
    /// `ep_square` is the current en passant target, if any, used to recognize en passant captures.
    /// A King moving two files is treated as castling and also moves the corresponding Rook.
    /// Returns `None`, leaving the board untouched, if there is no piece on the source square.
    pub fn apply(&mut self, mv: Move, ep_square: Option<Square>) -> Option<Applied> {
        let (from, to) = (mv.from(), mv.to());
        let moved = self.take(from)?;

        let mut captured = self.take(to).map(|piece| (to, piece));
        let mut rook = None;

        match moved.kind() {
            PieceKind::Pawn if ep_square == Some(to) && from.file() != to.file() => {
                let victim = Square::new(to.file(), from.rank());
                captured = self.take(victim).map(|piece| (victim, piece));
            }

            PieceKind::King if from.file().abs_diff(to.file()) == 2 => {
                let rook_file = if to.file() > from.file() { 7 } else { 0 };
                let rook_from = Square::new(rook_file, from.rank());
                let rook_to = Square::new((from.file() + to.file()) / 2, from.rank());

                if let Some(piece) = self.take(rook_from) {
                    self.place(piece, rook_to);
                    rook = Some((rook_from, rook_to));
                }
            }

            _ => {}
        }

        let landed = match (moved.kind(), mv.promotion()) {
            (PieceKind::Pawn, Some(promotion)) => Piece::new(moved.color(), promotion),
            _ => moved,
        };
        self.place(landed, to);

        Some(Applied {
            moved,
            captured,
            rook,
        })
    }

    /// Reverts a move previously applied with [`Board::apply`].
    pub fn revert(&mut self, mv: Move, applied: Applied) {
        self.take(mv.to());
        self.place(applied.moved, mv.from());

        if let Some((square, piece)) = applied.captured {
            self.place(piece, square);
        }

        if let Some((rook_from, rook_to)) = applied.rook {
            if let Some(piece) = self.take(rook_to) {
                self.place(piece, rook_from);
            }
        }
    }
}

impl Default for Board {
    #[inline(always)]
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rank in (0..8).rev() {
            write!(f, "{}| ", rank + 1)?;
            for file in 0..8 {
                match self.piece_at(Square::new(file, rank)) {
                    Some(piece) => write!(f, "{piece} ")?,
                    None => write!(f, ". ")?,
                }
            }
            writeln!(f)?;
        }
        writeln!(f, " +----------------")?;
        write!(f, "   a b c d e f g h")
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Board({})", self.to_fen())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STARTPOS: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR";

    #[test]
    fn test_placement_round_trip() {
        let board = Board::from_fen(STARTPOS).unwrap();
        assert_eq!(board.to_fen(), STARTPOS);
        assert_eq!(board.occupied_count(), 32);
        assert_eq!(board.king_square(Color::White), Some(Square::E1));
        assert_eq!(board.king_square(Color::Black), Some(Square::E8));
    }

    #[test]
    fn test_bad_placements() {
        assert!(Board::from_fen("8/8/8/8/8/8/8").is_err());
        assert!(Board::from_fen("9/8/8/8/8/8/8/8").is_err());
        assert!(Board::from_fen("7/8/8/8/8/8/8/8").is_err());
        assert!(Board::from_fen("ppppppppp/8/8/8/8/8/8/8").is_err());
        assert!(Board::from_fen("x7/8/8/8/8/8/8/8").is_err());
    }

    #[test]
    fn test_castling_rights_fen() {
        assert_eq!(CastlingRights::from_fen("KQkq").unwrap(), CastlingRights::ALL);
        assert_eq!(CastlingRights::from_fen("-").unwrap(), CastlingRights::NONE);
        assert_eq!(CastlingRights::from_fen("Kq").unwrap().to_fen(), "Kq");
        assert!(CastlingRights::from_fen("KX").is_err());
    }

    #[test]
    fn test_apply_and_revert_castle() {
        let mut board = Board::from_fen("r3k2r/8/8/8/8/8/8/R3K2R").unwrap();
        let original = board;

        let mv = Move::new(Square::E1, Square::G1);
        let applied = board.apply(mv, None).unwrap();
        assert_eq!(applied.rook, Some((Square::H1, Square::F1)));
        assert_eq!(board.to_fen(), "r3k2r/8/8/8/8/8/8/R4RK1");

        board.revert(mv, applied);
        assert_eq!(board, original);
    }

    #[test]
    fn test_apply_and_revert_en_passant() {
        let mut board = Board::from_fen("8/8/8/3pP3/8/8/8/8").unwrap();
        let original = board;

        let mv = Move::new(Square::E5, Square::D6);
        let applied = board.apply(mv, Some(Square::D6)).unwrap();
        assert_eq!(
            applied.captured,
            Some((Square::D5, Piece::new(Color::Black, PieceKind::Pawn)))
        );
        assert_eq!(board.to_fen(), "8/8/3P4/8/8/8/8/8");

        board.revert(mv, applied);
        assert_eq!(board, original);
    }

    #[test]
    fn test_attackers_through_blockers() {
        let board = Board::from_fen("4k3/8/8/8/4q3/8/4P3/R3K3").unwrap();
        assert!(board.is_attacked(Square::E3, Color::Black));
        assert!(!board.is_attacked(Square::E1, Color::Black));
        assert_eq!(board.attackers(Color::White, Square::A8).population(), 1);
    }
}
