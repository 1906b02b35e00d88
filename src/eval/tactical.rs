/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use super::{mate_score, Evaluator, MATE_SCORE};
use crate::{Color, Game, Noise};

/// Bonus for any position in which the side to move is in check.
pub const CHECK_BONUS: f64 = 1500.0;

/// Scores only checkmates and checks, steering play toward forcing sequences.
///
/// A check is rewarded no matter which side is in check.
///
/// # Example
/// ```
/// # use newt::*;
/// let game: Game = "4k3/8/8/8/8/8/8/4K2R b - - 0 1".parse().unwrap();
/// assert_eq!(TacticalEvaluator.evaluate(&game, Color::White, &mut Noise::silent()), 0.0);
///
/// let game: Game = "4k3/8/8/8/8/8/8/4R1K1 b - - 0 1".parse().unwrap();
/// assert_eq!(TacticalEvaluator.evaluate(&game, Color::White, &mut Noise::silent()), 1500.0);
/// assert_eq!(TacticalEvaluator.evaluate(&game, Color::Black, &mut Noise::silent()), 1500.0);
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct TacticalEvaluator;

impl Evaluator for TacticalEvaluator {
    fn name(&self) -> &'static str {
        "Tactical"
    }

    fn evaluate(&self, game: &Game, color: Color, _noise: &mut Noise) -> f64 {
        if game.is_checkmate() {
            mate_score(game, color, MATE_SCORE)
        } else if game.is_check() {
            CHECK_BONUS
        } else {
            0.0
        }
    }
}
