/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use crate::{Game, Move, MoveList};

/// Returns every legal move in `game` that, once made, leaves the mover's King unattacked.
///
/// Each candidate is made on `game` and taken back before the next is tried,
/// so `game` is unchanged when this returns.
/// The order of the returned moves is the order of [`Game::legal_moves`], but callers should not rely on it.
///
/// # Example
/// ```
/// # use newt::*;
/// let mut game = Game::default();
/// assert_eq!(safe_moves(&mut game).len(), 20);
/// assert_eq!(game, Game::default());
/// ```
pub fn safe_moves(game: &mut Game) -> MoveList {
    let candidates = game.legal_moves();
    filter_safe(game, candidates)
}

/// Keeps only the `candidates` that do not leave the mover's King attacked in `game`.
///
/// A side without a King is never considered to be in danger.
pub fn filter_safe(game: &mut Game, candidates: impl IntoIterator<Item = Move>) -> MoveList {
    let mover = game.side_to_move();

    candidates
        .into_iter()
        .filter(|&mv| {
            let after = game.make_scoped(mv);
            let safe = after
                .king_square(mover)
                .map_or(true, |king| !after.is_attacked(king, !mover));
            safe
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CastlingRights, Color, Square, FEN_STARTPOS};

    #[test]
    fn test_safe_moves_match_legal_moves() {
        let fens = [
            FEN_STARTPOS,
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
            "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
            "rnbqkbnr/ppp1p1pp/8/3pPp2/8/8/PPPP1PPP/RNBQKBNR w KQkq f6 0 3",
        ];

        for fen in fens {
            let mut game = Game::from_fen(fen).unwrap();
            let before = game.clone();
            assert_eq!(safe_moves(&mut game), game.legal_moves(), "Mismatch on {fen}");
            assert_eq!(game, before, "{fen} was modified");
        }
    }

    #[test]
    fn test_pseudo_legal_moves_are_filtered() {
        // The e2 knight is pinned by the e8 rook
        let mut game = Game::from_fen("4r2k/8/8/8/8/8/4N3/4K3 w - - 0 1").unwrap();
        let candidates = game.pseudo_legal_moves();
        let safe = filter_safe(&mut game, candidates.iter().copied());

        assert!(candidates.iter().any(|mv| mv.from() == Square::E2));
        assert!(safe.iter().all(|mv| mv.from() != Square::E2));
        assert_eq!(safe, game.legal_moves());
    }

    #[test]
    fn test_missing_king_is_safe() {
        let game = Game::from_fen("4k3/8/8/8/8/8/4P3/4K3 w - - 0 1").unwrap();
        let mut board = *game.board();
        board.take(Square::E1);
        let mut king_less = Game::from_parts(board, Color::White, CastlingRights::NONE, None, 0, 1);

        let pawn_moves = king_less.legal_moves();
        assert_eq!(pawn_moves.len(), 2);
        assert_eq!(filter_safe(&mut king_less, pawn_moves.clone()), pawn_moves);
    }
}
