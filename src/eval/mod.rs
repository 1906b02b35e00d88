/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{fmt, str::FromStr};

use anyhow::bail;

use crate::{Color, Game, Noise, PieceKind};

/// Weighted piece count, for static material comparisons.
mod material;

/// Material plus piece-square tables.
mod positional;

/// Rewards for checkmate and check, nothing else.
mod tactical;

/// Material plus how well each piece is guarded.
mod defensive;

/// A blend of many weighted, phase-scaled heuristics.
mod heuristic;

pub use defensive::*;
pub use heuristic::*;
pub use material::*;
pub use positional::*;
pub use tactical::*;

/// Score of a forced checkmate, for evaluators that use a finite mate score.
pub const MATE_SCORE: f64 = 1e6;

/// Scores chess positions from the perspective of a single player.
///
/// Higher scores are better for `color`. Scores are only comparable between calls to the same evaluator.
pub trait Evaluator {
    /// Short, human-readable name of this evaluator.
    fn name(&self) -> &'static str;

    /// Scores `game` from `color`'s perspective.
    ///
    /// Evaluators that perturb their scores draw the perturbation from `noise`.
    fn evaluate(&self, game: &Game, color: Color, noise: &mut Noise) -> f64;
}

/// Sums `values[kind]` over every piece of `color`.
#[inline(always)]
pub fn material_of(game: &Game, color: Color, values: &[f64; PieceKind::COUNT]) -> f64 {
    PieceKind::all().into_iter().fold(0.0, |total, kind| {
        total + game.pieces(kind, color).population() as f64 * values[kind]
    })
}

/// Sums, over every non-King piece of `color`, its friendly attackers weighted by `defend`
/// minus its enemy attackers weighted by `attacked`, each scaled by that piece's value.
pub fn defense_balance(
    game: &Game,
    color: Color,
    values: &[f64; PieceKind::COUNT],
    defend: f64,
    attacked: f64,
) -> f64 {
    let mut balance = 0.0;

    for kind in PieceKind::all_except_king() {
        let value = values[kind];

        for square in game.pieces(kind, color) {
            let defenders = game.attackers(color, square).population() as f64;
            let attackers = game.attackers(!color, square).population() as f64;
            balance += defenders * value * defend - attackers * value * attacked;
        }
    }

    balance
}

/// Checkmate score from `color`'s perspective: losing if `color` is the side that has been mated.
#[inline(always)]
pub(crate) fn mate_score(game: &Game, color: Color, mate: f64) -> f64 {
    if game.side_to_move() == color {
        -mate
    } else {
        mate
    }
}

/// The evaluators this crate provides.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub enum EvaluatorKind {
    Material,
    Positional,
    Tactical,
    #[default]
    Heuristic,
    Defensive,
}

impl EvaluatorKind {
    #[inline(always)]
    pub const fn all() -> [Self; 5] {
        [
            Self::Material,
            Self::Positional,
            Self::Tactical,
            Self::Heuristic,
            Self::Defensive,
        ]
    }

    #[inline(always)]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Material => "material",
            Self::Positional => "positional",
            Self::Tactical => "tactical",
            Self::Heuristic => "heuristic",
            Self::Defensive => "defensive",
        }
    }

    /// Alternate names accepted when parsing.
    #[inline(always)]
    pub const fn aliases(&self) -> &'static [&'static str] {
        match self {
            Self::Material => &["simple"],
            Self::Positional => &["pst"],
            Self::Tactical => &["check"],
            Self::Heuristic => &["complex"],
            Self::Defensive => &["human"],
        }
    }

    /// Builds an evaluator of this kind with its default tuning.
    ///
    /// # Example
    /// ```
    /// # use newt::*;
    /// let evaluator = EvaluatorKind::Material.build();
    /// assert_eq!(evaluator.name(), "Material");
    /// ```
    pub fn build(&self) -> Box<dyn Evaluator> {
        match self {
            Self::Material => Box::new(MaterialEvaluator),
            Self::Positional => Box::new(PositionalEvaluator),
            Self::Tactical => Box::new(TacticalEvaluator),
            Self::Heuristic => Box::new(HeuristicEvaluator::default()),
            Self::Defensive => Box::new(DefensiveEvaluator),
        }
    }
}

impl FromStr for EvaluatorKind {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.to_ascii_lowercase();
        for kind in Self::all() {
            if kind.name() == s || kind.aliases().contains(&s.as_str()) {
                return Ok(kind);
            }
        }

        bail!("Unknown evaluator {s:?}: Must be one of [material, positional, tactical, heuristic, defensive]")
    }
}

impl fmt::Display for EvaluatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
