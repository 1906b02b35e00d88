/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use super::{mate_score, Evaluator, MATE_SCORE};
use crate::{Color, Game, Noise, Piece, PieceKind, Square};

/// Values of each [`PieceKind`], in centipawns. The King's value only matters for its sign.
pub const POSITIONAL_VALUES: [f64; PieceKind::COUNT] = [100.0, 320.0, 330.0, 500.0, 900.0, 20_000.0];

/// Upper bound of the random tie-break added to non-terminal scores.
const TIE_BREAK: f64 = 10.0;

/// Piece-square tables, from <https://www.chessprogramming.org/Simplified_Evaluation_Function>.
///
/// White indexes these directly by [`Square`], so the first row is rank 1 and each row runs from the a-file to the h-file.
#[rustfmt::skip]
const PSQT: [[i32; Square::COUNT]; PieceKind::COUNT] = [
    // Pawn
    [
         0,  0,  0,  0,  0,  0,  0,  0,
        50, 50, 50, 50, 50, 50, 50, 50,
        10, 10, 20, 30, 30, 20, 10, 10,
         5,  5, 10, 25, 25, 10,  5,  5,
         0,  0,  0, 20, 20,  0,  0,  0,
         5, -5,-10,  0,  0,-10, -5,  5,
         5, 10, 10,-20,-20, 10, 10,  5,
         0,  0,  0,  0,  0,  0,  0,  0,
    ],
    // Knight
    [
        -50,-40,-30,-30,-30,-30,-40,-50,
        -40,-20,  0,  0,  0,  0,-20,-40,
        -30,  0, 10, 15, 15, 10,  0,-30,
        -30,  5, 15, 20, 20, 15,  5,-30,
        -30,  0, 15, 20, 20, 15,  0,-30,
        -30,  5, 10, 15, 15, 10,  5,-30,
        -40,-20,  0,  5,  5,  0,-20,-40,
        -50,-40,-30,-30,-30,-30,-40,-50,
    ],
    // Bishop
    [
        -20,-10,-10,-10,-10,-10,-10,-20,
        -10,  0,  0,  0,  0,  0,  0,-10,
        -10,  0,  5, 10, 10,  5,  0,-10,
        -10,  5,  5, 10, 10,  5,  5,-10,
        -10,  0, 10, 10, 10, 10,  0,-10,
        -10, 10, 10, 10, 10, 10, 10,-10,
        -10,  5,  0,  0,  0,  0,  5,-10,
        -20,-10,-10,-10,-10,-10,-10,-20,
    ],
    // Rook
    [
         0,  0,  0,  0,  0,  0,  0,  0,
         5, 10, 10, 10, 10, 10, 10,  5,
        -5,  0,  0,  0,  0,  0,  0, -5,
        -5,  0,  0,  0,  0,  0,  0, -5,
        -5,  0,  0,  0,  0,  0,  0, -5,
        -5,  0,  0,  0,  0,  0,  0, -5,
        -5,  0,  0,  0,  0,  0,  0, -5,
         0,  0,  0,  5,  5,  0,  0,  0,
    ],
    // Queen
    [
        -20,-10,-10, -5, -5,-10,-10,-20,
        -10,  0,  0,  0,  0,  0,  0,-10,
        -10,  0,  5,  5,  5,  5,  0,-10,
         -5,  0,  5,  5,  5,  5,  0, -5,
          0,  0,  5,  5,  5,  5,  0, -5,
        -10,  5,  5,  5,  5,  5,  0,-10,
        -10,  0,  5,  0,  0,  0,  0,-10,
        -20,-10,-10, -5, -5,-10,-10,-20,
    ],
    // King
    [
        -30,-40,-40,-50,-50,-40,-40,-30,
        -30,-40,-40,-50,-50,-40,-40,-30,
        -30,-40,-40,-50,-50,-40,-40,-30,
        -30,-40,-40,-50,-50,-40,-40,-30,
        -20,-30,-30,-40,-40,-30,-30,-20,
        -10,-20,-20,-20,-20,-20,-20,-10,
         20, 20,  0,  0,  0,  0, 20, 20,
         20, 30, 10,  0,  0, 10, 30, 20,
    ],
];

/// Piece-square bonus for `piece` standing on `square`.
///
/// Black reads the same tables mirrored vertically.
///
/// # Example
/// ```
/// # use newt::*;
/// let white_knight = Piece::new(Color::White, PieceKind::Knight);
/// let black_knight = Piece::new(Color::Black, PieceKind::Knight);
/// assert_eq!(psqt_bonus(white_knight, Square::B1), -40);
/// assert_eq!(psqt_bonus(black_knight, Square::B8), -40);
/// assert_eq!(psqt_bonus(white_knight, Square::E4), 20);
///
/// let white_pawn = Piece::new(Color::White, PieceKind::Pawn);
/// let black_pawn = Piece::new(Color::Black, PieceKind::Pawn);
/// assert_eq!(psqt_bonus(white_pawn, Square::E2), 50);
/// assert_eq!(psqt_bonus(black_pawn, Square::E7), 50);
/// ```
#[inline(always)]
pub fn psqt_bonus(piece: Piece, square: Square) -> i32 {
    let index = match piece.color() {
        Color::White => square,
        Color::Black => square.flipped(),
    };
    PSQT[piece.kind()][index]
}

/// Scores a position by material and piece placement, with a small random tie-break.
///
/// Checkmate scores [`MATE_SCORE`]; stalemate and insufficient material score exactly `0`.
#[derive(Clone, Copy, Debug, Default)]
pub struct PositionalEvaluator;

impl Evaluator for PositionalEvaluator {
    fn name(&self) -> &'static str {
        "Positional"
    }

    fn evaluate(&self, game: &Game, color: Color, noise: &mut Noise) -> f64 {
        if game.is_checkmate() {
            return mate_score(game, color, MATE_SCORE);
        }
        if game.is_stalemate() || game.is_insufficient_material() {
            return 0.0;
        }

        let score = game.iter().fold(0.0, |score, (square, piece)| {
            let value = POSITIONAL_VALUES[piece.kind()] + psqt_bonus(piece, square) as f64;
            if piece.color() == color {
                score + value
            } else {
                score - value
            }
        });

        score + noise.sample(TIE_BREAK)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_startpos_is_even() {
        let score = PositionalEvaluator.evaluate(&Game::default(), Color::White, &mut Noise::silent());
        assert_eq!(score, 0.0);
    }

    #[test]
    fn test_pawn_push_changes_table_score() {
        let game = Game::from_fen("rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1").unwrap();
        let score = PositionalEvaluator.evaluate(&game, Color::White, &mut Noise::silent());
        // e2 is worth 50 and e4 is worth 25
        assert_eq!(score, -25.0);
        let score = PositionalEvaluator.evaluate(&game, Color::Black, &mut Noise::silent());
        assert_eq!(score, 25.0);
    }

    #[test]
    fn test_white_reads_tables_unmirrored() {
        for square in Square::iter() {
            for kind in PieceKind::all() {
                let white = psqt_bonus(Piece::new(Color::White, kind), square);
                assert_eq!(white, PSQT[kind][square], "{kind} on {square}");
            }
        }
    }

    #[test]
    fn test_tie_break_is_bounded() {
        let game = Game::from_fen("rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1").unwrap();
        let mut noise = Noise::seeded(3);
        for _ in 0..32 {
            let score = PositionalEvaluator.evaluate(&game, Color::White, &mut noise);
            assert!((-25.0..-15.0).contains(&score), "{score} out of range");
        }
    }

    #[test]
    fn test_tables_are_mirrored_for_black() {
        for square in Square::iter() {
            for kind in PieceKind::all() {
                let white = psqt_bonus(Piece::new(Color::White, kind), square);
                let black = psqt_bonus(Piece::new(Color::Black, kind), square.flipped());
                assert_eq!(white, black, "{kind} on {square}");
            }
        }
    }
}
