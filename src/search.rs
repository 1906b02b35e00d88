/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use crate::{safe_moves, Color, Evaluator, Game, Move, Noise};

/// Depth searched when none is specified.
pub const DEFAULT_DEPTH: usize = 2;

/// Upper bound of the random perturbation added to every leaf evaluation.
pub const DEFAULT_JITTER: f64 = 0.01;

/// The result of a search, containing the best move found, score, and total nodes searched.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchResult {
    /// Evaluation of the position, from the perspective of the searching player.
    pub score: f64,

    /// Best move found during the search.
    ///
    /// This is always `None` at leaf nodes, and at nodes without any safe moves.
    pub bestmove: Option<Move>,

    /// Number of nodes searched.
    pub nodes: u64,
}

/// Configuration variables for executing a [`Search`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchConfig {
    /// Depth, in plies, to search from the root.
    pub depth: usize,

    /// Scale of the noise added to leaf evaluations, to break ties between equal moves.
    ///
    /// Must stay below the smallest meaningful difference between two evaluations.
    pub jitter: f64,
}

impl Default for SearchConfig {
    #[inline(always)]
    fn default() -> Self {
        Self {
            depth: DEFAULT_DEPTH,
            jitter: DEFAULT_JITTER,
        }
    }
}

/// Executes a depth-bounded [minimax](https://www.chessprogramming.org/Minimax) search
/// with [alpha-beta pruning](https://www.chessprogramming.org/Alpha-Beta), scoring leaves with an [`Evaluator`].
///
/// Every score is from the perspective of a single player, so the search alternates between
/// maximizing (that player to move) and minimizing (their opponent to move).
pub struct Search<'a> {
    /// Scores the leaves of the search tree.
    evaluator: &'a dyn Evaluator,

    /// The player whose advantage is being maximized.
    perspective: Color,

    /// Configuration variables for this instance of the search.
    config: SearchConfig,

    /// Nodes visited since this search was constructed.
    nodes: u64,
}

impl<'a> Search<'a> {
    /// Construct a new [`Search`] that scores positions with `evaluator` on behalf of `perspective`.
    #[inline(always)]
    pub fn new(evaluator: &'a dyn Evaluator, perspective: Color, config: SearchConfig) -> Self {
        Self {
            evaluator,
            perspective,
            config,
            nodes: 0,
        }
    }

    #[inline(always)]
    pub const fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Nodes visited so far.
    #[inline(always)]
    pub const fn nodes(&self) -> u64 {
        self.nodes
    }

    /// Start the search on `game` at the configured depth.
    ///
    /// The root maximizes if the searching player is to move, and the window begins fully open.
    ///
    /// # Example
    /// ```
    /// # use newt::*;
    /// let mut game = Game::default();
    /// let evaluator = MaterialEvaluator;
    /// let config = SearchConfig { depth: 1, jitter: 0.0 };
    ///
    /// let res = Search::new(&evaluator, Color::White, config).start(&mut game, &mut Noise::silent());
    /// assert_eq!(res.score, 0.0);
    /// assert!(res.bestmove.is_some());
    /// assert_eq!(game, Game::default());
    /// ```
    pub fn start(&mut self, game: &mut Game, noise: &mut Noise) -> SearchResult {
        let maximizing = game.side_to_move() == self.perspective;

        self.search(
            game,
            self.config.depth,
            f64::NEG_INFINITY,
            f64::INFINITY,
            maximizing,
            noise,
        )
    }

    /// Primary location of search logic.
    ///
    /// `game` is mutated while searching, but every move made is unmade before this returns.
    pub fn search(
        &mut self,
        game: &mut Game,
        depth: usize,
        mut alpha: f64,
        mut beta: f64,
        maximizing: bool,
        noise: &mut Noise,
    ) -> SearchResult {
        self.nodes += 1;

        // If we've reached a terminal node, evaluate the position
        if depth == 0 || game.is_game_over() {
            let score = self.evaluator.evaluate(game, self.perspective, noise)
                + noise.sample(self.config.jitter);

            return SearchResult {
                score,
                bestmove: None,
                nodes: self.nodes,
            };
        }

        let mut score = if maximizing {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        };
        let mut bestmove = None;

        for mv in safe_moves(game) {
            let mut child = game.make_scoped(mv);
            let child_score = self
                .search(&mut child, depth - 1, alpha, beta, !maximizing, noise)
                .score;

            // Strict comparisons, so that the first of several equal moves is kept
            if maximizing {
                if child_score > score {
                    score = child_score;
                    bestmove = Some(mv);
                }
                alpha = alpha.max(score);
            } else {
                if child_score < score {
                    score = child_score;
                    bestmove = Some(mv);
                }
                beta = beta.min(score);
            }

            if beta <= alpha {
                break;
            }
        }

        SearchResult {
            score,
            bestmove,
            nodes: self.nodes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MaterialEvaluator, TacticalEvaluator};

    fn search_fen(fen: &str, evaluator: &dyn Evaluator, depth: usize) -> (Game, SearchResult) {
        let mut game: Game = fen.parse().unwrap();
        let config = SearchConfig { depth, jitter: 0.0 };
        let perspective = game.side_to_move();

        let res = Search::new(evaluator, perspective, config).start(&mut game, &mut Noise::silent());
        (game, res)
    }

    #[test]
    fn test_white_mate_in_1() {
        let fen = "k7/8/KQ6/8/8/8/8/8 w - - 0 1";
        let (mut game, res) = search_fen(fen, &TacticalEvaluator, 1);

        let bestmove = res.bestmove.expect("Search produced no move");
        game.make_move(bestmove);
        assert!(game.is_checkmate(), "{bestmove} does not mate in {fen:?}");
        assert_eq!(res.score, crate::MATE_SCORE);
    }

    #[test]
    fn test_captures_hanging_queen() {
        let fen = "4k3/8/8/3q4/8/8/8/3RK3 w - - 0 1";
        let (_, res) = search_fen(fen, &MaterialEvaluator, 2);
        assert_eq!(res.bestmove.unwrap(), "d1d5");
        assert_eq!(res.score, 55.0);
    }

    #[test]
    fn test_stalemate() {
        let fen = "k7/8/KQ6/8/8/8/8/8 b - - 0 1";
        let (_, res) = search_fen(fen, &MaterialEvaluator, 3);
        assert!(res.bestmove.is_none());
        assert_eq!(res.score, -100.0);
        assert_eq!(res.nodes, 1);
    }

    #[test]
    fn test_minimizing_root() {
        let mut game: Game = "4k3/8/8/3q4/8/8/8/3RK3 w - - 0 1".parse().unwrap();
        let config = SearchConfig {
            depth: 1,
            jitter: 0.0,
        };

        // Black searches while White is to move: White's best reply is Black's worst case
        let res = Search::new(&MaterialEvaluator, Color::Black, config)
            .start(&mut game, &mut Noise::silent());
        assert_eq!(res.bestmove.unwrap(), "d1d5");
        assert_eq!(res.score, -55.0);
    }

    #[test]
    fn test_jitter_is_bounded() {
        let mut game = Game::default();
        let config = SearchConfig {
            depth: 0,
            jitter: 0.5,
        };
        let mut noise = Noise::seeded(7);

        for _ in 0..16 {
            let res = Search::new(&MaterialEvaluator, Color::White, config).start(&mut game, &mut noise);
            assert!((0.0..0.5).contains(&res.score), "{} exceeds jitter", res.score);
        }
    }
}
