/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use super::{material_of, Evaluator};
use crate::{Color, Game, Noise, PieceKind};

/// Values of each [`PieceKind`], in pawn tenths.
pub const MATERIAL_VALUES: [f64; PieceKind::COUNT] = [10.0, 30.0, 35.0, 55.0, 100.0, 0.0];

/// Scores a position by the difference in material alone.
///
/// # Example
/// ```
/// # use newt::*;
/// // White is up a Knight
/// let game: Game = "4k3/8/8/8/8/8/8/1N2K3 w - - 0 1".parse().unwrap();
/// let score = MaterialEvaluator.evaluate(&game, Color::White, &mut Noise::silent());
/// assert_eq!(score, 30.0);
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct MaterialEvaluator;

impl Evaluator for MaterialEvaluator {
    fn name(&self) -> &'static str {
        "Material"
    }

    #[inline(always)]
    fn evaluate(&self, game: &Game, color: Color, _noise: &mut Noise) -> f64 {
        material_of(game, color, &MATERIAL_VALUES) - material_of(game, !color, &MATERIAL_VALUES)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_material_is_symmetric() {
        let game = Game::from_fen("r3k3/8/8/8/8/8/8/1B2K3 w - - 0 1").unwrap();
        let mut noise = Noise::silent();
        let white = MaterialEvaluator.evaluate(&game, Color::White, &mut noise);
        let black = MaterialEvaluator.evaluate(&game, Color::Black, &mut noise);
        assert_eq!(white, -20.0);
        assert_eq!(black, 20.0);
    }

    #[test]
    fn test_startpos_is_even() {
        let score = MaterialEvaluator.evaluate(&Game::default(), Color::Black, &mut Noise::silent());
        assert_eq!(score, 0.0);
    }
}
