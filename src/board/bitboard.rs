/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{fmt, ops::Not};

use super::Square;

/// A set of squares, stored as one bit per square.
///
/// Bit `n` corresponds to the square with index `n`, so `a1` is the least-significant bit.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(transparent)]
pub struct Bitboard(u64);

impl Bitboard {
    pub const EMPTY: Self = Self(0);
    pub const FULL: Self = Self(u64::MAX);
    pub const LIGHT_SQUARES: Self = Self(0x55AA_55AA_55AA_55AA);
    pub const DARK_SQUARES: Self = Self(0xAA55_AA55_AA55_AA55);

    #[inline(always)]
    pub const fn new(bits: u64) -> Self {
        Self(bits)
    }

    /// Creates a [`Bitboard`] containing only `square`.
    ///
    /// # Example
    /// ```
    /// # use newt::{Bitboard, Square};
    /// let e4 = Bitboard::from_square(Square::E4);
    /// assert!(e4.contains(Square::E4));
    /// assert_eq!(e4.population(), 1);
    /// ```
    #[inline(always)]
    pub const fn from_square(square: Square) -> Self {
        Self(1 << square.index())
    }

    #[inline(always)]
    pub const fn inner(&self) -> u64 {
        self.0
    }

    #[inline(always)]
    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    #[inline(always)]
    pub const fn is_nonempty(&self) -> bool {
        self.0 != 0
    }

    #[inline(always)]
    pub const fn contains(&self, square: Square) -> bool {
        self.0 & (1 << square.index()) != 0
    }

    /// Number of squares in this set.
    #[inline(always)]
    pub const fn population(&self) -> u32 {
        self.0.count_ones()
    }

    /// The lowest-indexed square in this set, if any.
    #[inline(always)]
    pub const fn lsb(&self) -> Option<Square> {
        if self.0 == 0 {
            None
        } else {
            Some(Square::from_index_unchecked(self.0.trailing_zeros() as usize))
        }
    }

    /// Removes and returns the lowest-indexed square in this set.
    #[inline(always)]
    pub fn pop_lsb(&mut self) -> Option<Square> {
        let square = self.lsb()?;
        self.0 &= self.0 - 1;
        Some(square)
    }

    /// `const` union, used when building lookup tables at compile time.
    #[inline(always)]
    pub const fn or(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    #[inline(always)]
    pub const fn iter(&self) -> BitboardIter {
        BitboardIter(*self)
    }
}

/// Iterates over the squares of a [`Bitboard`], from `a1` towards `h8`.
pub struct BitboardIter(Bitboard);

impl Iterator for BitboardIter {
    type Item = Square;

    #[inline(always)]
    fn next(&mut self) -> Option<Self::Item> {
        self.0.pop_lsb()
    }

    #[inline(always)]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.0.population() as usize;
        (n, Some(n))
    }
}

impl ExactSizeIterator for BitboardIter {}

impl IntoIterator for Bitboard {
    type Item = Square;
    type IntoIter = BitboardIter;

    #[inline(always)]
    fn into_iter(self) -> Self::IntoIter {
        BitboardIter(self)
    }
}

impl FromIterator<Square> for Bitboard {
    fn from_iter<T: IntoIterator<Item = Square>>(iter: T) -> Self {
        iter.into_iter()
            .fold(Self::EMPTY, |bb, square| bb | square.bitboard())
    }
}

macro_rules! impl_bitwise_op {
    ($trait:tt, $fn:ident, $assign_trait:tt, $assign_fn:ident) => {
        impl std::ops::$trait for Bitboard {
            type Output = Self;
            #[inline(always)]
            fn $fn(self, rhs: Self) -> Self::Output {
                Self(self.0.$fn(rhs.0))
            }
        }

        impl std::ops::$assign_trait for Bitboard {
            #[inline(always)]
            fn $assign_fn(&mut self, rhs: Self) {
                self.0.$assign_fn(rhs.0);
            }
        }
    };
}

impl_bitwise_op!(BitAnd, bitand, BitAndAssign, bitand_assign);
impl_bitwise_op!(BitOr, bitor, BitOrAssign, bitor_assign);
impl_bitwise_op!(BitXor, bitxor, BitXorAssign, bitxor_assign);

impl Not for Bitboard {
    type Output = Self;
    #[inline(always)]
    fn not(self) -> Self::Output {
        Self(!self.0)
    }
}

impl fmt::Display for Bitboard {
    /// Prints an 8x8 grid with rank 8 at the top, `X` marking members of the set.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rank in (0..8).rev() {
            write!(f, "{} ", rank + 1)?;
            for file in 0..8 {
                let c = if self.contains(Square::new(file, rank)) {
                    'X'
                } else {
                    '.'
                };
                write!(f, " {c}")?;
            }
            writeln!(f)?;
        }
        write!(f, "   a b c d e f g h")
    }
}

impl fmt::Debug for Bitboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Bitboard(0x{:016X})", self.0)
    }
}
