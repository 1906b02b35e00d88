/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{fmt, str::FromStr};

use anyhow::{anyhow, bail, Result};

use super::{PieceKind, Square};

/// An ordered collection of moves, as produced by move generation.
pub type MoveList = Vec<Move>;

/// A move on a chess board: a source square, a destination square, and an optional promotion.
///
/// Castling is encoded as the King moving two files, and en passant as a Pawn moving diagonally onto the en passant square.
/// Whether a move is one of those special kinds is inferred from the position it is played in.
///
/// Internally encoded using the following bit pattern:
/// ```text
///     000 000000 000000
///      |    |      |
///      |    |      +- Source square of the move.
///      |    +- Target square of the move.
///      +- Promotion, if any.
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct Move(u16);

impl Move {
    /// Mask for the source ("from") bits.
    const SRC_MASK: u16 = 0b0000_0000_0011_1111;
    /// Mask for the destination ("to") bits.
    const DST_MASK: u16 = 0b0000_1111_1100_0000;
    /// Start index of destination bits.
    const DST_BITS: u16 = 6;
    /// Start index of promotion bits.
    const PRM_BITS: u16 = 12;

    /// Creates a new [`Move`] without a promotion.
    ///
    /// # Example
    /// ```
    /// # use newt::{Move, Square};
    /// let e2e4 = Move::new(Square::E2, Square::E4);
    /// assert_eq!(e2e4.to_string(), "e2e4");
    /// ```
    #[inline(always)]
    pub const fn new(from: Square, to: Square) -> Self {
        Self((to.index() as u16) << Self::DST_BITS | from.index() as u16)
    }

    /// Creates a new [`Move`] that promotes a Pawn to `promotion`.
    ///
    /// # Example
    /// ```
    /// # use newt::{Move, PieceKind, Square};
    /// let e7e8n = Move::with_promotion(Square::E7, Square::E8, PieceKind::Knight);
    /// assert_eq!(e7e8n.to_string(), "e7e8n");
    /// ```
    #[inline(always)]
    pub const fn with_promotion(from: Square, to: Square, promotion: PieceKind) -> Self {
        let bits = match promotion {
            PieceKind::Knight => 1,
            PieceKind::Bishop => 2,
            PieceKind::Rook => 3,
            // Pawns and Kings are never promotion targets; treat anything else as a Queen.
            _ => 4,
        };
        Self(Self::new(from, to).0 | bits << Self::PRM_BITS)
    }

    #[inline(always)]
    pub const fn from(&self) -> Square {
        Square::from_index_unchecked((self.0 & Self::SRC_MASK) as usize)
    }

    #[inline(always)]
    pub const fn to(&self) -> Square {
        Square::from_index_unchecked(((self.0 & Self::DST_MASK) >> Self::DST_BITS) as usize)
    }

    /// The kind this move promotes to, if it is a promotion.
    #[inline(always)]
    pub const fn promotion(&self) -> Option<PieceKind> {
        match self.0 >> Self::PRM_BITS {
            1 => Some(PieceKind::Knight),
            2 => Some(PieceKind::Bishop),
            3 => Some(PieceKind::Rook),
            4 => Some(PieceKind::Queen),
            _ => None,
        }
    }

    #[inline(always)]
    pub const fn is_promotion(&self) -> bool {
        self.0 >> Self::PRM_BITS != 0
    }

    /// Parses a move from [UCI notation](https://en.wikipedia.org//wiki/Universal_Chess_Interface), such as `e2e4` or `e7e8q`.
    ///
    /// Parsing is purely syntactic; legality is checked by the game the move is played in.
    ///
    /// # Example
    /// ```
    /// # use newt::*;
    /// let mv = Move::from_uci("b7c8b").unwrap();
    /// assert_eq!(mv, Move::with_promotion(Square::B7, Square::C8, PieceKind::Bishop));
    /// assert!(Move::from_uci("e2").is_err());
    /// assert!(Move::from_uci("e7e8k").is_err());
    /// ```
    pub fn from_uci(uci: &str) -> Result<Self> {
        let from = uci
            .get(0..2)
            .ok_or(anyhow!("Move str must contain a `from` square. Got {uci:?}"))?;
        let to = uci
            .get(2..4)
            .ok_or(anyhow!("Move str must contain a `to` square. Got {uci:?}"))?;

        let from = Square::from_uci(from)?;
        let to = Square::from_uci(to)?;

        match uci.get(4..) {
            None | Some("") => Ok(Self::new(from, to)),
            Some(promotion) => {
                let mut chars = promotion.chars();
                let (Some(c), None) = (chars.next(), chars.next()) else {
                    bail!("Invalid promotion {promotion:?} in move {uci:?}");
                };
                let kind = PieceKind::from_char(c)?;
                if matches!(kind, PieceKind::Pawn | PieceKind::King) {
                    bail!("Cannot promote to a {kind} in move {uci:?}");
                }
                Ok(Self::with_promotion(from, to, kind))
            }
        }
    }

    /// Converts this move to UCI notation.
    pub fn to_uci(&self) -> String {
        match self.promotion() {
            Some(promotion) => format!("{}{}{}", self.from(), self.to(), promotion.char()),
            None => format!("{}{}", self.from(), self.to()),
        }
    }
}

impl FromStr for Move {
    type Err = anyhow::Error;
    #[inline(always)]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_uci(s)
    }
}

impl fmt::Display for Move {
    /// A [`Move`] is displayed in its UCI format.
    #[inline(always)]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_uci())
    }
}

impl fmt::Debug for Move {
    #[inline(always)]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Move({self})")
    }
}

impl<T: AsRef<str>> PartialEq<T> for Move {
    #[inline(always)]
    fn eq(&self, other: &T) -> bool {
        self.to_uci().eq(other.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_move_accessors() {
        let mv = Move::with_promotion(Square::A7, Square::B8, PieceKind::Rook);
        assert_eq!(mv.from(), Square::A7);
        assert_eq!(mv.to(), Square::B8);
        assert_eq!(mv.promotion(), Some(PieceKind::Rook));
        assert!(mv.is_promotion());

        let mv = Move::new(Square::H8, Square::A1);
        assert_eq!(mv.from(), Square::H8);
        assert_eq!(mv.to(), Square::A1);
        assert_eq!(mv.promotion(), None);
    }

    #[test]
    fn test_move_parsing() {
        assert_eq!(Move::from_uci("e2e4").unwrap(), "e2e4");
        assert_eq!(Move::from_uci("a2a1q").unwrap(), "a2a1q");
        assert_eq!("g7g8N".parse::<Move>().unwrap(), "g7g8n");
        assert!(Move::from_uci("").is_err());
        assert!(Move::from_uci("e2e9").is_err());
        assert!(Move::from_uci("e2e4qq").is_err());
        assert!(Move::from_uci("e7e8p").is_err());
    }
}
