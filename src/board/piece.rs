/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{
    fmt,
    ops::{Index, IndexMut},
    str::FromStr,
};

use anyhow::{bail, Result};

use super::Color;

/// The kind of a chess piece, without its color.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum PieceKind {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl PieceKind {
    pub const COUNT: usize = 6;

    /// All piece kinds, ordered by increasing material value.
    #[inline(always)]
    pub const fn all() -> [Self; Self::COUNT] {
        [
            Self::Pawn,
            Self::Knight,
            Self::Bishop,
            Self::Rook,
            Self::Queen,
            Self::King,
        ]
    }

    /// All piece kinds that can be captured.
    #[inline(always)]
    pub const fn all_except_king() -> [Self; Self::COUNT - 1] {
        [
            Self::Pawn,
            Self::Knight,
            Self::Bishop,
            Self::Rook,
            Self::Queen,
        ]
    }

    /// The kinds a Pawn may promote to, most valuable first.
    #[inline(always)]
    pub const fn promotions() -> [Self; 4] {
        [Self::Queen, Self::Rook, Self::Bishop, Self::Knight]
    }

    #[inline(always)]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Lowercase character for this kind, as used in FEN and UCI.
    #[inline(always)]
    pub const fn char(self) -> char {
        match self {
            Self::Pawn => 'p',
            Self::Knight => 'n',
            Self::Bishop => 'b',
            Self::Rook => 'r',
            Self::Queen => 'q',
            Self::King => 'k',
        }
    }

    #[inline(always)]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Pawn => "pawn",
            Self::Knight => "knight",
            Self::Bishop => "bishop",
            Self::Rook => "rook",
            Self::Queen => "queen",
            Self::King => "king",
        }
    }

    /// Parses a kind from its character, ignoring case.
    pub fn from_char(kind: char) -> Result<Self> {
        match kind.to_ascii_lowercase() {
            'p' => Ok(Self::Pawn),
            'n' => Ok(Self::Knight),
            'b' => Ok(Self::Bishop),
            'r' => Ok(Self::Rook),
            'q' => Ok(Self::Queen),
            'k' => Ok(Self::King),
            _ => bail!("Invalid char for PieceKind: Must be one of [p, n, b, r, q, k]. Got {kind:?}"),
        }
    }
}

impl fmt::Display for PieceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.name().fmt(f)
    }
}

impl<T> Index<PieceKind> for [T; PieceKind::COUNT] {
    type Output = T;
    #[inline(always)]
    fn index(&self, index: PieceKind) -> &Self::Output {
        &self[index.index()]
    }
}

impl<T> IndexMut<PieceKind> for [T; PieceKind::COUNT] {
    #[inline(always)]
    fn index_mut(&mut self, index: PieceKind) -> &mut Self::Output {
        &mut self[index.index()]
    }
}

/// A chess piece: a [`PieceKind`] belonging to a [`Color`].
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Piece {
    color: Color,
    kind: PieceKind,
}

impl Piece {
    #[inline(always)]
    pub const fn new(color: Color, kind: PieceKind) -> Self {
        Self { color, kind }
    }

    #[inline(always)]
    pub const fn color(&self) -> Color {
        self.color
    }

    #[inline(always)]
    pub const fn kind(&self) -> PieceKind {
        self.kind
    }

    /// FEN character: uppercase for White, lowercase for Black.
    ///
    /// # Example
    /// ```
    /// # use newt::{Color, Piece, PieceKind};
    /// assert_eq!(Piece::new(Color::White, PieceKind::Knight).char(), 'N');
    /// assert_eq!(Piece::new(Color::Black, PieceKind::Queen).char(), 'q');
    /// ```
    #[inline(always)]
    pub const fn char(&self) -> char {
        let c = self.kind.char();
        match self.color {
            Color::White => c.to_ascii_uppercase(),
            Color::Black => c,
        }
    }

    /// Parses a piece from its FEN character.
    pub fn from_char(piece: char) -> Result<Self> {
        let kind = PieceKind::from_char(piece)?;
        let color = if piece.is_ascii_uppercase() {
            Color::White
        } else {
            Color::Black
        };

        Ok(Self::new(color, kind))
    }
}

impl FromStr for Piece {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Self::from_char(c),
            _ => bail!("Invalid Piece {s:?}: Must be a single FEN character"),
        }
    }
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.char())
    }
}

impl fmt::Debug for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.color, self.kind)
    }
}
