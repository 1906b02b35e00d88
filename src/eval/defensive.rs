/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use super::{defense_balance, material_of, Evaluator, MATERIAL_VALUES};
use crate::{Color, Game, Noise};

/// Weight of each friendly attacker on one of our pieces, scaled by that piece's value.
pub const DEFEND_WEIGHT: f64 = 0.001;

/// Weight of each enemy attacker on one of our pieces, scaled by that piece's value.
pub const ATTACKED_WEIGHT: f64 = 0.001;

/// Scores a position by material, nudged toward keeping pieces guarded and out of reach.
///
/// Uses the same piece values as the [`MaterialEvaluator`](super::MaterialEvaluator).
/// Like that evaluator, it has no notion of checkmate or draws.
///
/// # Example
/// ```
/// # use newt::*;
/// // A guarded Knight is worth slightly more than a loose one
/// let guarded: Game = "4k3/8/8/8/3N4/8/8/3RK3 w - - 0 1".parse().unwrap();
/// let loose: Game = "4k3/8/8/8/3N4/8/8/R3K3 w - - 0 1".parse().unwrap();
///
/// let mut noise = Noise::silent();
/// let guarded = DefensiveEvaluator.evaluate(&guarded, Color::White, &mut noise);
/// let loose = DefensiveEvaluator.evaluate(&loose, Color::White, &mut noise);
/// assert!(guarded > loose);
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct DefensiveEvaluator;

impl Evaluator for DefensiveEvaluator {
    fn name(&self) -> &'static str {
        "Defensive"
    }

    fn evaluate(&self, game: &Game, color: Color, _noise: &mut Noise) -> f64 {
        let material = material_of(game, color, &MATERIAL_VALUES)
            - material_of(game, !color, &MATERIAL_VALUES);

        material
            + defense_balance(game, color, &MATERIAL_VALUES, DEFEND_WEIGHT, ATTACKED_WEIGHT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_startpos_is_even() {
        let mut noise = Noise::silent();
        let white = DefensiveEvaluator.evaluate(&Game::default(), Color::White, &mut noise);
        let black = DefensiveEvaluator.evaluate(&Game::default(), Color::Black, &mut noise);
        assert!(white > 0.0, "Every piece starts guarded or unattacked");
        assert_eq!(white, black);
    }

    #[test]
    fn test_attacked_piece_is_penalized() {
        // Black's Rook on d8 attacks the Knight on d4, which nothing guards
        let game = Game::from_fen("3rk3/8/8/8/3N4/8/8/6K1 w - - 0 1").unwrap();
        let score = DefensiveEvaluator.evaluate(&game, Color::White, &mut Noise::silent());

        // 30 - 55 for material, -30 * 0.001 for the threatened Knight
        assert!((score - (-25.0 - 0.03)).abs() < 1e-9, "{score}");
    }

    #[test]
    fn test_ignores_checkmate() {
        let game = Game::from_fen("rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3").unwrap();
        let score = DefensiveEvaluator.evaluate(&game, Color::White, &mut Noise::silent());
        assert!(score.is_finite());
        assert!(score.abs() < 10.0, "Material is level, so {score} should be small");
    }
}
