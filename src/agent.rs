/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fmt;

use crate::{
    Color, Evaluator, EvaluatorKind, Game, Move, Noise, Search, SearchConfig, DEFAULT_JITTER,
};

/// The outcome of an [`Agent`] choosing a move.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Decision {
    /// The move to play, or `None` if there are no legal moves.
    pub bestmove: Option<Move>,

    /// Marks a move that needs special handling by the host.
    ///
    /// No [`Agent`] ever produces one, so this is always `false`.
    pub nudge: bool,

    /// Score of the search, from the [`Agent`]'s perspective.
    pub score: f64,

    /// Number of nodes searched.
    pub nodes: u64,

    /// Whether `bestmove` is the first legal move rather than a move the search chose.
    pub fallback: bool,
}

/// A player that picks moves by searching a fixed number of plies ahead, scoring leaves with its [`Evaluator`].
///
/// An [`Agent`] holds no state between decisions, so one can be reused for an entire game.
pub struct Agent {
    color: Color,
    depth: usize,
    evaluator: Box<dyn Evaluator>,
    jitter: f64,
}

impl Agent {
    /// Constructs a new [`Agent`] playing `color`, searching `depth` plies with `evaluator`.
    #[inline(always)]
    pub fn new(color: Color, depth: usize, evaluator: Box<dyn Evaluator>) -> Self {
        Self {
            color,
            depth,
            evaluator,
            jitter: DEFAULT_JITTER,
        }
    }

    /// Constructs a new [`Agent`] with the default tuning of the evaluator `kind`.
    ///
    /// # Example
    /// ```
    /// # use newt::*;
    /// let agent = Agent::from_kind(Color::Black, 3, EvaluatorKind::Heuristic);
    /// assert_eq!(agent.name(), "Heuristic bot (depth 3)");
    /// ```
    #[inline(always)]
    pub fn from_kind(color: Color, depth: usize, kind: EvaluatorKind) -> Self {
        Self::new(color, depth, kind.build())
    }

    /// Overrides the scale of the noise added to leaf evaluations.
    #[inline(always)]
    pub fn with_jitter(mut self, jitter: f64) -> Self {
        self.jitter = jitter;
        self
    }

    #[inline(always)]
    pub const fn color(&self) -> Color {
        self.color
    }

    #[inline(always)]
    pub const fn depth(&self) -> usize {
        self.depth
    }

    #[inline(always)]
    pub const fn jitter(&self) -> f64 {
        self.jitter
    }

    #[inline(always)]
    pub fn evaluator(&self) -> &dyn Evaluator {
        self.evaluator.as_ref()
    }

    /// Human-readable name of this agent, such as `Positional bot (depth 2)`.
    pub fn name(&self) -> String {
        format!("{} bot (depth {})", self.evaluator.name(), self.depth)
    }

    /// Chooses a move for the side to move in `game`.
    ///
    /// `game` is searched in place and restored before this returns.
    /// If the search yields no move, the first legal move is chosen instead.
    ///
    /// # Example
    /// ```
    /// # use newt::*;
    /// let mut game = Game::default();
    /// let agent = Agent::from_kind(Color::White, 2, EvaluatorKind::Material);
    ///
    /// let decision = agent.choose_move(&mut game, &mut Noise::seeded(1));
    /// assert!(game.is_legal(decision.bestmove.unwrap()));
    /// assert!(!decision.fallback);
    /// ```
    pub fn choose_move(&self, game: &mut Game, noise: &mut Noise) -> Decision {
        let config = SearchConfig {
            depth: self.depth,
            jitter: self.jitter,
        };
        let res = Search::new(self.evaluator(), self.color, config).start(game, noise);

        let (bestmove, fallback) = match res.bestmove {
            Some(mv) => (Some(mv), false),
            None => {
                let first = game.legal_moves().first().copied();
                (first, first.is_some())
            }
        };

        Decision {
            bestmove,
            nudge: false,
            score: res.score,
            nodes: res.nodes,
            fallback,
        }
    }
}

impl fmt::Debug for Agent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Agent")
            .field("color", &self.color)
            .field("depth", &self.depth)
            .field("evaluator", &self.evaluator.name())
            .field("jitter", &self.jitter)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MaterialEvaluator;

    #[test]
    fn test_no_moves_in_checkmate() {
        let mut game: Game = "rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3"
            .parse()
            .unwrap();
        let agent = Agent::from_kind(Color::White, 2, EvaluatorKind::Positional);

        let decision = agent.choose_move(&mut game, &mut Noise::silent());
        assert!(decision.bestmove.is_none());
        assert!(!decision.fallback);
        assert!(!decision.nudge);
        assert_eq!(decision.score, -crate::MATE_SCORE);
    }

    #[test]
    fn test_depth_zero_falls_back_to_first_legal_move() {
        let mut game = Game::default();
        let agent = Agent::new(Color::White, 0, Box::new(MaterialEvaluator));

        let decision = agent.choose_move(&mut game, &mut Noise::silent());
        assert_eq!(decision.bestmove, game.legal_moves().first().copied());
        assert!(decision.fallback);
        assert_eq!(decision.nodes, 1);
    }

    #[test]
    fn test_score_is_from_agents_perspective() {
        // Black to move can win White's queen
        let mut game: Game = "3rk3/8/8/8/3Q4/8/8/4K3 b - - 0 1".parse().unwrap();
        let agent = Agent::from_kind(Color::Black, 1, EvaluatorKind::Material).with_jitter(0.0);

        let decision = agent.choose_move(&mut game, &mut Noise::silent());
        assert_eq!(decision.bestmove.unwrap(), "d8d4");
        assert_eq!(decision.score, 55.0);
    }

    #[test]
    fn test_name_and_debug() {
        let agent = Agent::new(Color::White, 2, Box::new(MaterialEvaluator));
        assert_eq!(agent.name(), "Material bot (depth 2)");
        assert!(format!("{agent:?}").contains("Material"));
    }
}
