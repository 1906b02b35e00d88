/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fmt;

use super::{defense_balance, material_of, mate_score, Evaluator};
use crate::{Bitboard, Color, Game, Noise, PieceKind, Square};

/// The four central squares.
const CENTER: [Square; 4] = [Square::D4, Square::E4, Square::D5, Square::E5];

/// Tunable weights of the [`HeuristicEvaluator`].
///
/// The defaults are the hand-tuned values the evaluator was designed around.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HeuristicWeights {
    /// Value of each [`PieceKind`], in pawns.
    pub values: [f64; PieceKind::COUNT],

    /// Per friendly attacker on one of our pieces, scaled by that piece's value.
    pub defend: f64,
    /// Per enemy attacker on one of our pieces, scaled by that piece's value.
    pub attacked: f64,
    /// Per friendly attacker on an enemy piece, scaled by that piece's value.
    pub attack: f64,

    pub king_walk: f64,
    /// Per square of distance between the enemy King and the center.
    pub cornering: f64,
    /// Per square of distance between the two Kings.
    pub king_distance: f64,

    pub pawn_advance: f64,

    /// Per square of distance between one of our pieces and each central square. Negative, as a penalty.
    pub center_distance: f64,
    pub center_control: f64,
    pub opp_center_control: f64,

    /// Per square attacked by any of our pieces.
    pub coverage: f64,

    /// Endgame factor above which the King-hunting terms switch on.
    pub endgame_gate: f64,
}

impl Default for HeuristicWeights {
    fn default() -> Self {
        Self {
            values: [1.0, 3.0, 3.5, 5.5, 10.0, 0.0],
            defend: 0.0075,
            attacked: 0.0075,
            attack: 0.005,
            king_walk: 0.02,
            cornering: 0.03,
            king_distance: 0.06,
            pawn_advance: 0.01,
            center_distance: -0.0002,
            center_control: 0.002,
            opp_center_control: 0.0015,
            coverage: 0.04,
            endgame_gate: 1.7,
        }
    }
}

/// How far a game has progressed, derived from the number of pieces left on the board.
///
/// Each factor lies in `[1, 2]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Phase {
    /// `2` with a full board, falling to `1` once half the pieces are gone.
    pub opening: f64,
    /// Peaks at `2` with half the pieces on the board, `1` at either extreme.
    pub middlegame: f64,
    /// `1` until half the pieces are gone, rising to `2` on an empty board.
    pub endgame: f64,
}

impl Phase {
    /// Computes the phase of a board holding `pieces` pieces.
    ///
    /// # Example
    /// ```
    /// # use newt::Phase;
    /// let start = Phase::new(32);
    /// assert_eq!((start.opening, start.middlegame, start.endgame), (2.0, 1.0, 1.0));
    ///
    /// let middle = Phase::new(16);
    /// assert_eq!((middle.opening, middle.middlegame, middle.endgame), (1.0, 2.0, 1.0));
    /// ```
    pub fn new(pieces: u32) -> Self {
        let fraction = pieces as f64 / 16.0;

        Self {
            opening: 1.0 + (fraction - 1.0).max(0.0),
            middlegame: 2.0 - (2.0 * (fraction - 1.0).abs()).min(1.0),
            endgame: 2.0 - fraction.min(1.0),
        }
    }
}

/// Each weighted term of a heuristic evaluation, from one player's perspective.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct HeuristicTerms {
    pub material: f64,
    pub defense: f64,
    pub pressure: f64,
    pub center_control: f64,
    pub center_distance: f64,
    pub king_walk: f64,
    pub cornering: f64,
    pub king_approach: f64,
    pub pawn_advance: f64,
    pub coverage: f64,
    pub presence: f64,
}

impl HeuristicTerms {
    /// Sum of all terms.
    pub fn total(&self) -> f64 {
        self.material
            + self.defense
            + self.pressure
            + self.center_control
            + self.center_distance
            + self.king_walk
            + self.cornering
            + self.king_approach
            + self.pawn_advance
            + self.coverage
            + self.presence
    }
}

impl fmt::Display for HeuristicTerms {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rows = [
            ("material", self.material),
            ("defense", self.defense),
            ("pressure", self.pressure),
            ("center control", self.center_control),
            ("center distance", self.center_distance),
            ("king walk", self.king_walk),
            ("cornering", self.cornering),
            ("king approach", self.king_approach),
            ("pawn advance", self.pawn_advance),
            ("coverage", self.coverage),
            ("presence", self.presence),
        ];

        for (name, value) in rows {
            writeln!(f, "{name:<16} {value:>+10.4}")?;
        }
        write!(f, "{:<16} {:>+10.4}", "total", self.total())
    }
}

/// Rank of `square` counted from `color`'s side, where White counts from `0` and Black from `1`.
#[inline(always)]
fn advancement(square: Square, color: Color) -> f64 {
    match color {
        Color::White => square.rank() as f64,
        Color::Black => (8 - square.rank()) as f64,
    }
}

/// Scores a position with a blend of material, piece safety, central control, King activity, and mobility.
///
/// Checkmate scores infinitely. A drawn position scores the negated sum shrunk by a factor of 8,
/// so that a side that was ahead prefers to have avoided the draw.
#[derive(Clone, Copy, Debug, Default)]
pub struct HeuristicEvaluator {
    weights: HeuristicWeights,
}

impl HeuristicEvaluator {
    #[inline(always)]
    pub const fn new(weights: HeuristicWeights) -> Self {
        Self { weights }
    }

    #[inline(always)]
    pub const fn weights(&self) -> &HeuristicWeights {
        &self.weights
    }

    /// Computes every term of the evaluation of `game` from `color`'s perspective, without terminal overrides.
    pub fn terms(&self, game: &Game, color: Color) -> HeuristicTerms {
        let w = &self.weights;
        let them = !color;
        let pieces = game.occupied_count();
        let phase = Phase::new(pieces);
        let mut terms = HeuristicTerms::default();

        let mine = material_of(game, color, &w.values);
        let theirs = material_of(game, them, &w.values);
        terms.material =
            (mine - theirs) / phase.middlegame + mine / theirs.max(w.values[PieceKind::Pawn]);

        terms.defense = defense_balance(game, color, &w.values, w.defend, w.attacked);

        for kind in PieceKind::all_except_king() {
            let value = w.values[kind];

            for square in game.pieces(kind, them) {
                let attackers = game.attackers(color, square).population() as f64;
                terms.pressure += attackers * value * w.attack;
            }
        }

        for center in CENTER {
            let ours = game.attackers(color, center).population() as f64;
            let theirs = game.attackers(them, center).population() as f64;
            terms.center_control += ours * w.center_control - theirs * w.opp_center_control;
        }
        terms.center_control *= phase.endgame;

        let distance: u32 = game
            .color_bb(color)
            .into_iter()
            .map(|square| CENTER.iter().map(|&c| square.distance(c) as u32).sum::<u32>())
            .sum();
        terms.center_distance =
            distance as f64 * w.center_distance * phase.opening * phase.middlegame;

        let gate = (phase.endgame - w.endgame_gate).max(0.0);
        let king = game.king_square(color);
        let enemy_king = game.king_square(them);

        if let Some(king) = king {
            let walk = phase.endgame.powi(2) - phase.opening.powi(2) - 1.0;
            terms.king_walk = advancement(king, color) * w.king_walk * walk.max(0.0);
        }

        if let Some(enemy_king) = enemy_king {
            let distance: u32 = CENTER.iter().map(|&c| enemy_king.distance(c) as u32).sum();
            terms.cornering = distance as f64 * w.cornering * gate;
        }

        if let (Some(king), Some(enemy_king)) = (king, enemy_king) {
            terms.king_approach = -(king.distance(enemy_king) as f64) * w.king_distance * gate;
        }

        let advanced: f64 = game
            .pieces(PieceKind::Pawn, color)
            .into_iter()
            .map(|square| advancement(square, color))
            .sum();
        terms.pawn_advance = advanced * w.pawn_advance * phase.endgame;

        let covered = game
            .color_bb(color)
            .into_iter()
            .fold(Bitboard::EMPTY, |covered, square| covered | game.attacks_from(square));
        terms.coverage =
            covered.population() as f64 * w.coverage * phase.middlegame * phase.endgame;

        terms.presence = pieces as f64 * (phase.middlegame - 1.0);

        terms
    }
}

impl Evaluator for HeuristicEvaluator {
    fn name(&self) -> &'static str {
        "Heuristic"
    }

    fn evaluate(&self, game: &Game, color: Color, _noise: &mut Noise) -> f64 {
        if game.is_checkmate() {
            return mate_score(game, color, f64::INFINITY);
        }

        let score = self.terms(game, color).total();

        if game.is_stalemate() || game.is_insufficient_material() {
            return -score / 8.0;
        }

        score
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_extremes() {
        let empty = Phase::new(0);
        assert_eq!((empty.opening, empty.middlegame, empty.endgame), (1.0, 1.0, 2.0));

        for pieces in 0..=32 {
            let phase = Phase::new(pieces);
            for factor in [phase.opening, phase.middlegame, phase.endgame] {
                assert!((1.0..=2.0).contains(&factor), "{factor} out of range for {pieces} pieces");
            }
        }
    }

    #[test]
    fn test_startpos_terms() {
        let terms = HeuristicEvaluator::default().terms(&Game::default(), Color::White);
        assert_eq!(terms.material, 1.0);
        assert_eq!(terms.presence, 0.0);
        assert_eq!(terms.king_walk, 0.0);
        assert_eq!(terms.cornering, 0.0);
        assert_eq!(terms.king_approach, 0.0);
        assert!(terms.coverage > 0.0);
    }

    #[test]
    fn test_bare_kings_hunt_terms() {
        let game = Game::from_fen("8/8/8/8/8/8/8/K6k w - - 0 1").unwrap();
        let terms = HeuristicEvaluator::default().terms(&game, Color::White);
        assert!(terms.total().is_finite());
        assert!(terms.cornering > 0.0);
        assert!(terms.king_approach < 0.0);
    }

    #[test]
    fn test_decentralized_pieces_are_penalized() {
        let eval = HeuristicEvaluator::default();
        let central = Game::from_fen("4k3/8/8/8/4N3/8/8/4K3 w - - 0 1").unwrap();
        let corner = Game::from_fen("4k3/8/8/8/8/8/8/N3K3 w - - 0 1").unwrap();

        let central = eval.terms(&central, Color::White).center_distance;
        let corner = eval.terms(&corner, Color::White).center_distance;
        assert!(central <= 0.0, "Distance from the center should never be rewarded");
        assert!(corner < central, "Knight on a1 ({corner}) should score below a knight on e4 ({central})");

        let startpos = eval.terms(&Game::default(), Color::White);
        assert!(startpos.center_distance < 0.0);
    }

    #[test]
    fn test_king_hunt_only_late() {
        let game = Game::from_fen("4k3/8/8/8/8/8/8/Q3K3 w - - 0 1").unwrap();
        let terms = HeuristicEvaluator::default().terms(&game, Color::White);
        assert!(terms.cornering > 0.0);
        assert!(terms.king_walk == 0.0, "King on its home rank should not be rewarded");

        let terms = HeuristicEvaluator::default().terms(&Game::default(), Color::White);
        assert_eq!(terms.cornering, 0.0);
        assert_eq!(terms.king_approach, 0.0);
    }

    #[test]
    fn test_checkmate_is_infinite() {
        let game = Game::from_fen("rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3").unwrap();
        let eval = HeuristicEvaluator::default();
        let mut noise = Noise::silent();
        assert_eq!(eval.evaluate(&game, Color::White, &mut noise), f64::NEG_INFINITY);
        assert_eq!(eval.evaluate(&game, Color::Black, &mut noise), f64::INFINITY);
    }
}
