/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use super::{Game, Move};

/// Perform a perft at the specified depth, collecting only data about the number of possible positions (nodes).
///
/// This performs bulk counting, meaning that, at depth 1, it returns the number of available moves,
/// rather than making them, recursing again, and returning 1 for each terminal case.
///
/// The game is restored to its original state before this returns.
#[inline(always)]
pub fn perft(game: &mut Game, depth: usize) -> u64 {
    perft_generic::<true>(game, depth)
}

/// Perform a perft at the specified depth, returning the number of nodes reachable after each move available at the root.
pub fn splitperft(game: &mut Game, depth: usize) -> Vec<(Move, u64)> {
    if depth == 0 {
        return Vec::new();
    }

    game.legal_moves()
        .into_iter()
        .map(|mv| {
            let mut child = game.make_scoped(mv);
            (mv, perft_generic::<true>(&mut child, depth - 1))
        })
        .collect()
}

/// Generic version of [`perft`] that allows you to specify whether to perform bulk counting.
pub fn perft_generic<const BULK: bool>(game: &mut Game, depth: usize) -> u64 {
    // Bulk counting; no need to recurse again just to apply a singular move and return 1.
    if BULK && depth == 1 {
        return game.legal_moves().len() as u64;
    }
    // Recursion limit; return 1, since we're fathoming this node.
    else if depth == 0 {
        return 1;
    }

    game.legal_moves().into_iter().fold(0, |nodes, mv| {
        let mut child = game.make_scoped(mv);
        nodes + perft_generic::<BULK>(&mut child, depth - 1)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bulk_matches_full_count() {
        let mut game = Game::default();
        assert_eq!(perft_generic::<true>(&mut game, 3), perft_generic::<false>(&mut game, 3));
    }

    #[test]
    fn test_splitperft_sums_to_perft() {
        let mut game = Game::default();
        let split = splitperft(&mut game, 3);
        assert_eq!(split.len(), 20);
        assert_eq!(split.iter().map(|(_, nodes)| nodes).sum::<u64>(), 8_902);
        assert_eq!(game, Game::default());
    }
}
