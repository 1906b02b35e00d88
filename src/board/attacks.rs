/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use super::{Bitboard, Color, Piece, PieceKind, Square};

const KNIGHT_DELTAS: [(i8, i8); 8] = [
    (1, 2),
    (2, 1),
    (2, -1),
    (1, -2),
    (-1, -2),
    (-2, -1),
    (-2, 1),
    (-1, 2),
];

const KING_DELTAS: [(i8, i8); 8] = [
    (0, 1),
    (1, 1),
    (1, 0),
    (1, -1),
    (0, -1),
    (-1, -1),
    (-1, 0),
    (-1, 1),
];

const BISHOP_DIRECTIONS: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, -1), (-1, 1)];
const ROOK_DIRECTIONS: [(i8, i8); 4] = [(0, 1), (1, 0), (0, -1), (-1, 0)];

const KNIGHT_ATTACKS: [Bitboard; Square::COUNT] = leaper_table(&KNIGHT_DELTAS);
const KING_ATTACKS: [Bitboard; Square::COUNT] = leaper_table(&KING_DELTAS);
const PAWN_ATTACKS: [[Bitboard; Square::COUNT]; Color::COUNT] = [
    leaper_table(&[(-1, 1), (1, 1)]),
    leaper_table(&[(-1, -1), (1, -1)]),
];

/// Builds a table of attacks for a piece that jumps by fixed `deltas`.
const fn leaper_table(deltas: &[(i8, i8)]) -> [Bitboard; Square::COUNT] {
    let mut table = [Bitboard::EMPTY; Square::COUNT];

    let mut i = 0;
    while i < Square::COUNT {
        let square = Square::from_index_unchecked(i);
        let mut j = 0;
        while j < deltas.len() {
            if let Some(to) = square.offset(deltas[j].0, deltas[j].1) {
                table[i] = table[i].or(to.bitboard());
            }
            j += 1;
        }
        i += 1;
    }

    table
}

/// Walks each direction from `square` until the edge of the board or the first blocker, inclusive.
fn ray_attacks(square: Square, blockers: Bitboard, directions: &[(i8, i8)]) -> Bitboard {
    let mut attacks = Bitboard::EMPTY;

    for &(df, dr) in directions {
        let mut current = square;
        while let Some(next) = current.offset(df, dr) {
            attacks |= next.bitboard();
            if blockers.contains(next) {
                break;
            }
            current = next;
        }
    }

    attacks
}

/// Squares attacked by a Pawn of `color` on `square`.
///
/// # Example
/// ```
/// # use newt::*;
/// let attacks = pawn_attacks(Square::E4, Color::White);
/// assert!(attacks.contains(Square::D5));
/// assert!(attacks.contains(Square::F5));
/// assert_eq!(attacks.population(), 2);
/// ```
#[inline(always)]
pub const fn pawn_attacks(square: Square, color: Color) -> Bitboard {
    PAWN_ATTACKS[color.index()][square.index()]
}

#[inline(always)]
pub const fn knight_attacks(square: Square) -> Bitboard {
    KNIGHT_ATTACKS[square.index()]
}

#[inline(always)]
pub const fn king_attacks(square: Square) -> Bitboard {
    KING_ATTACKS[square.index()]
}

/// Squares attacked by a Bishop on `square`, given the board's occupancy.
#[inline(always)]
pub fn bishop_attacks(square: Square, blockers: Bitboard) -> Bitboard {
    ray_attacks(square, blockers, &BISHOP_DIRECTIONS)
}

/// Squares attacked by a Rook on `square`, given the board's occupancy.
///
/// # Example
/// ```
/// # use newt::*;
/// let blockers = Square::A4.bitboard();
/// let attacks = rook_attacks(Square::A1, blockers);
/// assert!(attacks.contains(Square::A4));
/// assert!(!attacks.contains(Square::A5));
/// assert!(attacks.contains(Square::H1));
/// ```
#[inline(always)]
pub fn rook_attacks(square: Square, blockers: Bitboard) -> Bitboard {
    ray_attacks(square, blockers, &ROOK_DIRECTIONS)
}

#[inline(always)]
pub fn queen_attacks(square: Square, blockers: Bitboard) -> Bitboard {
    bishop_attacks(square, blockers) | rook_attacks(square, blockers)
}

/// Squares attacked by `piece` standing on `square`.
pub fn attacks_for(piece: Piece, square: Square, blockers: Bitboard) -> Bitboard {
    match piece.kind() {
        PieceKind::Pawn => pawn_attacks(square, piece.color()),
        PieceKind::Knight => knight_attacks(square),
        PieceKind::Bishop => bishop_attacks(square, blockers),
        PieceKind::Rook => rook_attacks(square, blockers),
        PieceKind::Queen => queen_attacks(square, blockers),
        PieceKind::King => king_attacks(square),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leaper_counts() {
        assert_eq!(knight_attacks(Square::A1).population(), 2);
        assert_eq!(knight_attacks(Square::D4).population(), 8);
        assert_eq!(king_attacks(Square::H8).population(), 3);
        assert_eq!(king_attacks(Square::E4).population(), 8);
    }

    #[test]
    fn test_pawn_attacks_on_edges() {
        assert_eq!(pawn_attacks(Square::A2, Color::White), Square::B3.bitboard());
        assert_eq!(pawn_attacks(Square::H7, Color::Black), Square::G6.bitboard());
        assert!(pawn_attacks(Square::E8, Color::White).is_empty());
    }

    #[test]
    fn test_sliders_stop_at_blockers() {
        let blockers = Square::D4.bitboard() | Square::F6.bitboard();
        let attacks = queen_attacks(Square::D1, blockers);
        assert!(attacks.contains(Square::D4));
        assert!(!attacks.contains(Square::D5));

        let attacks = bishop_attacks(Square::C3, blockers);
        assert!(attacks.contains(Square::D4));
        assert!(!attacks.contains(Square::E5));
        assert!(!attacks.contains(Square::F6));
        assert!(attacks.contains(Square::A1));
        assert!(attacks.contains(Square::A5));

        let attacks = bishop_attacks(Square::D4, blockers);
        assert!(attacks.contains(Square::F6));
        assert!(!attacks.contains(Square::G7));
    }
}
