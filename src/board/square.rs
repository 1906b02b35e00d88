/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{
    fmt,
    ops::{Index, IndexMut, Not},
    str::FromStr,
};

use anyhow::{bail, Context, Result};

use super::Bitboard;

/// One of the two players in a game of chess.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum Color {
    White,
    Black,
}

impl Color {
    pub const COUNT: usize = 2;

    /// Both colors, White first.
    #[inline(always)]
    pub const fn all() -> [Self; Self::COUNT] {
        [Self::White, Self::Black]
    }

    /// Returns the other player.
    ///
    /// # Example
    /// ```
    /// # use newt::Color;
    /// assert_eq!(Color::White.opponent(), Color::Black);
    /// assert_eq!(Color::Black.opponent(), Color::White);
    /// ```
    #[inline(always)]
    pub const fn opponent(self) -> Self {
        match self {
            Self::White => Self::Black,
            Self::Black => Self::White,
        }
    }

    #[inline(always)]
    pub const fn index(self) -> usize {
        self as usize
    }

    #[inline(always)]
    pub const fn is_white(self) -> bool {
        matches!(self, Self::White)
    }

    #[inline(always)]
    pub const fn is_black(self) -> bool {
        matches!(self, Self::Black)
    }

    /// Human-readable name of this color.
    #[inline(always)]
    pub const fn name(self) -> &'static str {
        match self {
            Self::White => "White",
            Self::Black => "Black",
        }
    }

    /// The character used for this color in FEN strings.
    #[inline(always)]
    pub const fn char(self) -> char {
        match self {
            Self::White => 'w',
            Self::Black => 'b',
        }
    }

    /// Parses the side-to-move field of a FEN string.
    pub fn from_char(color: char) -> Result<Self> {
        match color {
            'w' | 'W' => Ok(Self::White),
            'b' | 'B' => Ok(Self::Black),
            _ => bail!("Invalid char for Color: Must be one of [w, b]. Got {color:?}"),
        }
    }
}

impl Not for Color {
    type Output = Self;
    #[inline(always)]
    fn not(self) -> Self::Output {
        self.opponent()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.name().fmt(f)
    }
}

impl<T> Index<Color> for [T; Color::COUNT] {
    type Output = T;
    #[inline(always)]
    fn index(&self, index: Color) -> &Self::Output {
        &self[index.index()]
    }
}

impl<T> IndexMut<Color> for [T; Color::COUNT] {
    #[inline(always)]
    fn index_mut(&mut self, index: Color) -> &mut Self::Output {
        &mut self[index.index()]
    }
}

/// One of the 64 squares of a chess board.
///
/// Squares are numbered from `a1 = 0` to `h8 = 63`, files varying fastest.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(transparent)]
pub struct Square(u8);

#[rustfmt::skip]
impl Square {
    pub const A1: Self = Self(0);  pub const B1: Self = Self(1);  pub const C1: Self = Self(2);  pub const D1: Self = Self(3);
    pub const E1: Self = Self(4);  pub const F1: Self = Self(5);  pub const G1: Self = Self(6);  pub const H1: Self = Self(7);
    pub const A2: Self = Self(8);  pub const B2: Self = Self(9);  pub const C2: Self = Self(10); pub const D2: Self = Self(11);
    pub const E2: Self = Self(12); pub const F2: Self = Self(13); pub const G2: Self = Self(14); pub const H2: Self = Self(15);
    pub const A3: Self = Self(16); pub const B3: Self = Self(17); pub const C3: Self = Self(18); pub const D3: Self = Self(19);
    pub const E3: Self = Self(20); pub const F3: Self = Self(21); pub const G3: Self = Self(22); pub const H3: Self = Self(23);
    pub const A4: Self = Self(24); pub const B4: Self = Self(25); pub const C4: Self = Self(26); pub const D4: Self = Self(27);
    pub const E4: Self = Self(28); pub const F4: Self = Self(29); pub const G4: Self = Self(30); pub const H4: Self = Self(31);
    pub const A5: Self = Self(32); pub const B5: Self = Self(33); pub const C5: Self = Self(34); pub const D5: Self = Self(35);
    pub const E5: Self = Self(36); pub const F5: Self = Self(37); pub const G5: Self = Self(38); pub const H5: Self = Self(39);
    pub const A6: Self = Self(40); pub const B6: Self = Self(41); pub const C6: Self = Self(42); pub const D6: Self = Self(43);
    pub const E6: Self = Self(44); pub const F6: Self = Self(45); pub const G6: Self = Self(46); pub const H6: Self = Self(47);
    pub const A7: Self = Self(48); pub const B7: Self = Self(49); pub const C7: Self = Self(50); pub const D7: Self = Self(51);
    pub const E7: Self = Self(52); pub const F7: Self = Self(53); pub const G7: Self = Self(54); pub const H7: Self = Self(55);
    pub const A8: Self = Self(56); pub const B8: Self = Self(57); pub const C8: Self = Self(58); pub const D8: Self = Self(59);
    pub const E8: Self = Self(60); pub const F8: Self = Self(61); pub const G8: Self = Self(62); pub const H8: Self = Self(63);
}

impl Square {
    pub const MIN: u8 = 0;
    pub const MAX: u8 = 63;
    pub const COUNT: usize = 64;

    /// Returns an iterator over all squares, from `a1` to `h8`.
    ///
    /// # Example
    /// ```
    /// # use newt::Square;
    /// let mut iter = Square::iter();
    /// assert_eq!(iter.len(), 64);
    /// assert_eq!(iter.next().unwrap(), Square::A1);
    /// assert_eq!(iter.last().unwrap(), Square::H8);
    /// ```
    #[inline(always)]
    pub fn iter() -> impl ExactSizeIterator<Item = Self> + DoubleEndedIterator<Item = Self> {
        (Self::MIN..=Self::MAX).map(Self)
    }

    /// Creates a new [`Square`] from a zero-based file and rank.
    ///
    /// # Example
    /// ```
    /// # use newt::Square;
    /// assert_eq!(Square::new(2, 3), Square::C4);
    /// ```
    #[inline(always)]
    pub const fn new(file: u8, rank: u8) -> Self {
        debug_assert!(file < 8 && rank < 8, "File and rank must be between [0,8)");
        Self(rank << 3 | file)
    }

    /// Creates a new [`Square`] from the provided index, which must be `[0, 63]`.
    pub fn from_index(index: usize) -> Result<Self> {
        if index > Self::MAX as usize {
            bail!(
                "Invalid index for Square: Must be between [{}, {}]. Got {index}",
                Self::MIN,
                Self::MAX
            );
        }
        Ok(Self(index as u8))
    }

    /// Creates a new [`Square`] from the provided index, without error checking.
    #[inline(always)]
    pub const fn from_index_unchecked(index: usize) -> Self {
        debug_assert!(index < 64, "Index must be between [0,64)");
        Self(index as u8)
    }

    #[inline(always)]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Zero-based file of this square, where `0` is the a-file.
    #[inline(always)]
    pub const fn file(self) -> u8 {
        self.0 & 0b111
    }

    /// Zero-based rank of this square, where `0` is the first rank.
    #[inline(always)]
    pub const fn rank(self) -> u8 {
        self.0 >> 3
    }

    /// Mirrors this square vertically, so that `a1` becomes `a8`.
    ///
    /// # Example
    /// ```
    /// # use newt::Square;
    /// assert_eq!(Square::A1.flipped(), Square::A8);
    /// assert_eq!(Square::E4.flipped(), Square::E5);
    /// ```
    #[inline(always)]
    pub const fn flipped(self) -> Self {
        Self(self.0 ^ 0b111_000)
    }

    /// Rank of this square as seen by `color`, so that each side's back rank is `0`.
    #[inline(always)]
    pub const fn relative_rank(self, color: Color) -> u8 {
        match color {
            Color::White => self.rank(),
            Color::Black => 7 - self.rank(),
        }
    }

    /// Returns the square `file_delta` files and `rank_delta` ranks away, if it is on the board.
    ///
    /// # Example
    /// ```
    /// # use newt::Square;
    /// assert_eq!(Square::E4.offset(1, 2), Some(Square::F6));
    /// assert_eq!(Square::H8.offset(1, 0), None);
    /// ```
    #[inline(always)]
    pub const fn offset(self, file_delta: i8, rank_delta: i8) -> Option<Self> {
        let file = self.file() as i8 + file_delta;
        let rank = self.rank() as i8 + rank_delta;

        if file < 0 || file > 7 || rank < 0 || rank > 7 {
            None
        } else {
            Some(Self::new(file as u8, rank as u8))
        }
    }

    /// Chebyshev ("king move") distance between two squares.
    ///
    /// # Example
    /// ```
    /// # use newt::Square;
    /// assert_eq!(Square::A1.distance(Square::H8), 7);
    /// assert_eq!(Square::E4.distance(Square::D5), 1);
    /// ```
    #[inline(always)]
    pub const fn distance(self, other: Self) -> u8 {
        let files = self.file().abs_diff(other.file());
        let ranks = self.rank().abs_diff(other.rank());

        if files > ranks {
            files
        } else {
            ranks
        }
    }

    /// Returns `true` if this is a light square. `a1` is dark.
    #[inline(always)]
    pub const fn is_light(self) -> bool {
        (self.file() + self.rank()) % 2 == 1
    }

    /// A [`Bitboard`] containing only this square.
    #[inline(always)]
    pub const fn bitboard(self) -> Bitboard {
        Bitboard::from_square(self)
    }

    /// Parses a square from its UCI notation, such as `e4`.
    ///
    /// # Example
    /// ```
    /// # use newt::Square;
    /// assert_eq!(Square::from_uci("e4").unwrap(), Square::E4);
    /// assert!(Square::from_uci("i9").is_err());
    /// ```
    pub fn from_uci(square: &str) -> Result<Self> {
        let mut chars = square.chars();
        let (Some(file), Some(rank), None) = (chars.next(), chars.next(), chars.next()) else {
            bail!("Invalid Square {square:?}: Must be a file followed by a rank");
        };

        if !('a'..='h').contains(&file) {
            bail!("Invalid file {file:?} in Square {square:?}: Must be between [a, h]");
        }

        let rank = rank
            .to_digit(10)
            .filter(|r| (1..=8).contains(r))
            .with_context(|| format!("Invalid rank {rank:?} in Square {square:?}"))?;

        Ok(Self::new(file as u8 - b'a', rank as u8 - 1))
    }

    /// Converts this square to UCI notation.
    #[inline(always)]
    pub fn to_uci(self) -> String {
        format!("{}{}", (b'a' + self.file()) as char, self.rank() + 1)
    }
}

impl FromStr for Square {
    type Err = anyhow::Error;
    #[inline(always)]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_uci(s)
    }
}

impl<T> Index<Square> for [T; Square::COUNT] {
    type Output = T;
    /// A [`Square`] can be used to index into an array of 64 elements.
    #[inline(always)]
    fn index(&self, index: Square) -> &Self::Output {
        &self[index.index()]
    }
}

impl<T> IndexMut<Square> for [T; Square::COUNT] {
    #[inline(always)]
    fn index_mut(&mut self, index: Square) -> &mut Self::Output {
        &mut self[index.index()]
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.to_uci().fmt(f)
    }
}

impl fmt::Debug for Square {
    /// Displays UCI notation along with the internal index.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.to_uci(), self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uci_round_trip_on_corners() {
        for square in [Square::A1, Square::H1, Square::A8, Square::H8] {
            assert_eq!(Square::from_uci(&square.to_uci()).unwrap(), square);
        }
    }

    #[test]
    fn test_relative_rank() {
        assert_eq!(Square::E2.relative_rank(Color::White), 1);
        assert_eq!(Square::E7.relative_rank(Color::Black), 1);
        assert_eq!(Square::E8.relative_rank(Color::White), 7);
    }

    #[test]
    fn test_square_colors() {
        assert!(!Square::A1.is_light());
        assert!(Square::H1.is_light());
        assert!(Square::D1.is_light());
        assert!(!Square::E1.is_light());
    }
}
