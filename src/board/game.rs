/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{
    fmt,
    ops::{Deref, DerefMut},
    str::FromStr,
};

use anyhow::{anyhow, bail, Context, Result};

use super::{
    attacks_for, pawn_attacks, perft, Applied, Bitboard, Board, CastlingRights, Color, Move,
    MoveList, Piece, PieceKind, Square, ZobristKey,
};

/// Halfmoves without a capture or Pawn move after which the game is drawn.
const SEVENTY_FIVE_MOVES: usize = 150;

/// Occurrences of a single position after which the game is drawn.
const FIVEFOLD: usize = 5;

/// Everything needed to take back a move made on a [`Game`].
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct Undo {
    mv: Move,
    /// `None` if the move was made from an empty square, passing the turn.
    applied: Option<Applied>,
    castling: CastlingRights,
    ep_square: Option<Square>,
    halfmove: usize,
    fullmove: usize,
    key: ZobristKey,
}

/// A game of chess.
///
/// This is the complete, mutable state of a game: the [`Board`], the side to move, castling and en passant
/// rights, the move counters, and a stack of every move made so far so that each can be taken back.
///
/// The basic methods you're probably looking for are [`Game::from_fen`], [`Game::legal_moves`],
/// [`Game::make_move`], and [`Game::unmake_move`].
///
/// A [`Game`] dereferences to its [`Board`], so placement queries such as [`Board::attackers`] can be called on it directly.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Game {
    board: Board,
    side_to_move: Color,
    castling: CastlingRights,
    ep_square: Option<Square>,
    halfmove: usize,
    fullmove: usize,
    key: ZobristKey,
    history: Vec<Undo>,
}

impl Game {
    /// Assembles a [`Game`] from its parts, computing its [`ZobristKey`].
    ///
    /// Castling rights that the placement of Kings and Rooks cannot support are dropped.
    pub fn from_parts(
        board: Board,
        side_to_move: Color,
        castling: CastlingRights,
        ep_square: Option<Square>,
        halfmove: usize,
        fullmove: usize,
    ) -> Self {
        let mut castling = castling;
        for color in Color::all() {
            let rank = if color.is_white() { 0 } else { 7 };
            let king = Piece::new(color, PieceKind::King);
            let rook = Piece::new(color, PieceKind::Rook);

            if board.piece_at(Square::new(4, rank)) != Some(king) {
                castling.remove(CastlingRights::short(color));
                castling.remove(CastlingRights::long(color));
            }
            if board.piece_at(Square::new(7, rank)) != Some(rook) {
                castling.remove(CastlingRights::short(color));
            }
            if board.piece_at(Square::new(0, rank)) != Some(rook) {
                castling.remove(CastlingRights::long(color));
            }
        }

        let mut game = Self {
            board,
            side_to_move,
            castling,
            ep_square,
            halfmove,
            fullmove,
            key: ZobristKey::default(),
            history: Vec::new(),
        };
        game.key = game.compute_key();
        game
    }

    /// Creates a new [`Game`] from the provided FEN string.
    ///
    /// Missing trailing fields default to `w - - 0 1`.
    /// Each side must have exactly one King.
    ///
    /// # Example
    /// ```
    /// # use newt::*;
    /// let game = Game::from_fen("4k3/8/8/8/8/8/8/4K2R w K - 0 1").unwrap();
    /// assert_eq!(game.side_to_move(), Color::White);
    /// assert_eq!(game.legal_moves().len(), 15);
    ///
    /// assert!(Game::from_fen("8/8/8/8/8/8/8/8 w - - 0 1").is_err());
    /// ```
    pub fn from_fen(fen: &str) -> Result<Self> {
        let mut split = fen.split_whitespace();

        let placements = split
            .next()
            .ok_or(anyhow!("FEN string must have piece placements."))?;
        let board = Board::from_fen(placements)?;

        for color in Color::all() {
            let kings = board.pieces(PieceKind::King, color).population();
            if kings != 1 {
                bail!(
                    "FEN must have exactly one {} King. Got {kings} in {fen:?}",
                    color.name()
                );
            }
        }

        let active_color = split.next().unwrap_or("w");
        let side_to_move = match active_color {
            "w" => Color::White,
            "b" => Color::Black,
            _ => bail!("FEN side to move must be `w` or `b`. Got {active_color:?}"),
        };

        let castling = CastlingRights::from_fen(split.next().unwrap_or("-"))?;

        let ep_square = match split.next().unwrap_or("-") {
            "-" => None,
            square => {
                let square = Square::from_uci(square)?;
                if square.relative_rank(side_to_move) != 5 {
                    bail!("En passant square {square} is not reachable with {} to move", side_to_move.name());
                }
                Some(square)
            }
        };

        let halfmove = split.next().unwrap_or("0");
        let halfmove = halfmove.parse().with_context(|| {
            format!("FEN string must have valid halfmove counter. Got {halfmove:?}")
        })?;

        let fullmove = split.next().unwrap_or("1");
        let fullmove = fullmove.parse().with_context(|| {
            format!("FEN string must have valid fullmove counter. Got {fullmove:?}")
        })?;

        Ok(Self::from_parts(
            board,
            side_to_move,
            castling,
            ep_square,
            halfmove,
            fullmove,
        ))
    }

    /// Generates a FEN string for the current position.
    ///
    /// # Example
    /// ```
    /// # use newt::*;
    /// let game = Game::default();
    /// assert_eq!(game.to_fen(), FEN_STARTPOS);
    /// ```
    pub fn to_fen(&self) -> String {
        let ep_square = self
            .ep_square
            .map(|square| square.to_string())
            .unwrap_or_else(|| String::from("-"));

        format!(
            "{} {} {} {ep_square} {} {}",
            self.board.to_fen(),
            self.side_to_move.char(),
            self.castling,
            self.halfmove,
            self.fullmove
        )
    }

    /// Computes the [`ZobristKey`] of the current position from scratch.
    fn compute_key(&self) -> ZobristKey {
        let mut key = ZobristKey::default();

        for (square, piece) in self.board.iter() {
            key.hash_piece(square, piece);
        }
        key.hash_optional_ep_square(self.ep_square);
        key.hash_castling_rights(self.castling);
        key.hash_side_to_move(self.side_to_move);

        key
    }

    #[inline(always)]
    pub const fn board(&self) -> &Board {
        &self.board
    }

    #[inline(always)]
    pub const fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    #[inline(always)]
    pub const fn castling_rights(&self) -> CastlingRights {
        self.castling
    }

    #[inline(always)]
    pub const fn ep_square(&self) -> Option<Square> {
        self.ep_square
    }

    #[inline(always)]
    pub const fn halfmove(&self) -> usize {
        self.halfmove
    }

    #[inline(always)]
    pub const fn fullmove(&self) -> usize {
        self.fullmove
    }

    #[inline(always)]
    pub const fn key(&self) -> ZobristKey {
        self.key
    }

    /// Number of moves that can currently be taken back with [`Game::unmake_move`].
    #[inline(always)]
    pub fn ply(&self) -> usize {
        self.history.len()
    }

    /// The most recently made move, if any.
    #[inline(always)]
    pub fn last_move(&self) -> Option<Move> {
        self.history.last().map(|undo| undo.mv)
    }

    /// Applies `mv` to the game, pushing a record onto the history so it can be taken back.
    ///
    /// No legality checks are performed. Making a move from an empty square passes the turn.
    ///
    /// # Example
    /// ```
    /// # use newt::*;
    /// let mut game = Game::default();
    /// game.make_move("e2e4".parse().unwrap());
    /// assert_eq!(game.to_fen(), "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1");
    ///
    /// assert_eq!(game.unmake_move().unwrap(), "e2e4");
    /// assert_eq!(game, Game::default());
    /// ```
    pub fn make_move(&mut self, mv: Move) {
        let color = self.side_to_move;
        let applied = self.board.apply(mv, self.ep_square);

        self.history.push(Undo {
            mv,
            applied,
            castling: self.castling,
            ep_square: self.ep_square,
            halfmove: self.halfmove,
            fullmove: self.fullmove,
            key: self.key,
        });

        self.key.hash_optional_ep_square(self.ep_square);
        self.key.hash_castling_rights(self.castling);
        self.ep_square = None;
        self.halfmove += 1;

        if let Some(applied) = applied {
            let (from, to) = (mv.from(), mv.to());

            self.key.hash_piece(from, applied.moved);
            if let Some(landed) = self.board.piece_at(to) {
                self.key.hash_piece(to, landed);
            }
            if let Some((square, captured)) = applied.captured {
                self.key.hash_piece(square, captured);
            }
            if let Some((rook_from, rook_to)) = applied.rook {
                let rook = Piece::new(color, PieceKind::Rook);
                self.key.hash_piece(rook_from, rook);
                self.key.hash_piece(rook_to, rook);
            }

            let is_pawn = applied.moved.kind() == PieceKind::Pawn;
            if is_pawn || applied.captured.is_some() {
                self.halfmove = 0;
            }

            // Only record an en passant square if an enemy Pawn could capture onto it
            if is_pawn && from.rank().abs_diff(to.rank()) == 2 {
                let ep_square = Square::new(from.file(), (from.rank() + to.rank()) / 2);
                let capturers =
                    pawn_attacks(ep_square, color) & self.board.pieces(PieceKind::Pawn, !color);
                if capturers.is_nonempty() {
                    self.ep_square = Some(ep_square);
                }
            }

            self.castling.remove(CastlingRights::lost_on(from));
            self.castling.remove(CastlingRights::lost_on(to));
        }

        self.key.hash_optional_ep_square(self.ep_square);
        self.key.hash_castling_rights(self.castling);

        if color.is_black() {
            self.fullmove += 1;
        }
        self.side_to_move = !color;
        self.key.hash_side_to_move(color);
        self.key.hash_side_to_move(!color);
    }

    /// Applies all of the provided moves, in order.
    pub fn make_moves(&mut self, moves: impl IntoIterator<Item = Move>) {
        for mv in moves {
            self.make_move(mv);
        }
    }

    /// Takes back the most recent move, restoring the game exactly as it was before it was made.
    ///
    /// Returns the move that was taken back, or `None` if no moves have been made.
    pub fn unmake_move(&mut self) -> Option<Move> {
        let undo = self.history.pop()?;

        if let Some(applied) = undo.applied {
            self.board.revert(undo.mv, applied);
        }

        self.side_to_move = !self.side_to_move;
        self.castling = undo.castling;
        self.ep_square = undo.ep_square;
        self.halfmove = undo.halfmove;
        self.fullmove = undo.fullmove;
        self.key = undo.key;

        Some(undo.mv)
    }

    /// Makes `mv` and returns a guard that takes it back when dropped.
    ///
    /// # Example
    /// ```
    /// # use newt::*;
    /// let mut game = Game::default();
    /// {
    ///     let after = game.make_scoped("g1f3".parse().unwrap());
    ///     assert_eq!(after.side_to_move(), Color::Black);
    /// }
    /// assert_eq!(game, Game::default());
    /// ```
    #[inline(always)]
    pub fn make_scoped(&mut self, mv: Move) -> MoveGuard<'_> {
        MoveGuard::new(self, mv)
    }

    /// Copies `self` and returns a [`Game`] after having applied the provided [`Move`].
    #[inline(always)]
    pub fn with_move_made(&self, mv: Move) -> Self {
        let mut copied = self.clone();
        copied.make_move(mv);
        copied
    }

    /// Parses `uci` and applies it, if it is legal in the current position.
    pub fn make_move_uci(&mut self, uci: &str) -> Result<Move> {
        let mv = Move::from_uci(uci)?;
        if !self.is_legal(mv) {
            bail!("Illegal move {uci:?} in position {}", self.to_fen());
        }
        self.make_move(mv);
        Ok(mv)
    }

    /// Generates all moves for the side to move that obey piece movement rules,
    /// without checking whether they leave the mover's King attacked.
    pub fn pseudo_legal_moves(&self) -> MoveList {
        let mut moves = MoveList::with_capacity(48);
        let color = self.side_to_move;
        let ours = self.board.color_bb(color);
        let theirs = self.board.color_bb(!color);
        let blockers = ours | theirs;

        for from in ours {
            let Some(piece) = self.board.piece_at(from) else {
                continue;
            };

            match piece.kind() {
                PieceKind::Pawn => self.pawn_moves(from, color, theirs, &mut moves),

                kind => {
                    let targets = attacks_for(piece, from, blockers) & !ours;
                    moves.extend(targets.into_iter().map(|to| Move::new(from, to)));

                    if kind == PieceKind::King {
                        self.castling_moves(from, color, &mut moves);
                    }
                }
            }
        }

        moves
    }

    fn pawn_moves(&self, from: Square, color: Color, theirs: Bitboard, moves: &mut MoveList) {
        let forward = if color.is_white() { 1 } else { -1 };

        if let Some(one) = from.offset(0, forward) {
            if self.board.piece_at(one).is_none() {
                push_pawn_move(moves, from, one, color);

                if from.relative_rank(color) == 1 {
                    if let Some(two) = one.offset(0, forward) {
                        if self.board.piece_at(two).is_none() {
                            moves.push(Move::new(from, two));
                        }
                    }
                }
            }
        }

        let attacks = pawn_attacks(from, color);
        for to in attacks & theirs {
            push_pawn_move(moves, from, to, color);
        }

        if let Some(ep_square) = self.ep_square {
            if attacks.contains(ep_square) && self.board.piece_at(ep_square).is_none() {
                moves.push(Move::new(from, ep_square));
            }
        }
    }

    fn castling_moves(&self, king: Square, color: Color, moves: &mut MoveList) {
        let rank = if color.is_white() { 0 } else { 7 };
        if king != Square::new(4, rank) || self.is_check() {
            return;
        }

        let rook = Some(Piece::new(color, PieceKind::Rook));
        let vacant = |files: &[u8]| {
            files
                .iter()
                .all(|&file| self.board.piece_at(Square::new(file, rank)).is_none())
        };
        let safe = |files: &[u8]| {
            files
                .iter()
                .all(|&file| !self.board.is_attacked(Square::new(file, rank), !color))
        };

        if self.castling.contains(CastlingRights::short(color))
            && self.board.piece_at(Square::new(7, rank)) == rook
            && vacant(&[5, 6])
            && safe(&[5, 6])
        {
            moves.push(Move::new(king, Square::new(6, rank)));
        }

        if self.castling.contains(CastlingRights::long(color))
            && self.board.piece_at(Square::new(0, rank)) == rook
            && vacant(&[1, 2, 3])
            && safe(&[3, 2])
        {
            moves.push(Move::new(king, Square::new(2, rank)));
        }
    }

    /// Returns `true` if making `mv` would not leave the mover's King attacked.
    ///
    /// Works on a scratch copy of the [`Board`]; `self` is not modified.
    pub fn keeps_king_safe(&self, mv: Move) -> bool {
        let color = self.side_to_move;
        let mut board = self.board;
        board.apply(mv, self.ep_square);

        board
            .king_square(color)
            .map_or(true, |king| !board.is_attacked(king, !color))
    }

    /// Generates all legal moves for the side to move.
    ///
    /// # Example
    /// ```
    /// # use newt::*;
    /// assert_eq!(Game::default().legal_moves().len(), 20);
    /// ```
    pub fn legal_moves(&self) -> MoveList {
        self.pseudo_legal_moves()
            .into_iter()
            .filter(|&mv| self.keeps_king_safe(mv))
            .collect()
    }

    /// Returns `true` if the side to move has at least one legal move.
    pub fn has_legal_moves(&self) -> bool {
        self.pseudo_legal_moves()
            .into_iter()
            .any(|mv| self.keeps_king_safe(mv))
    }

    /// Returns `true` if `mv` is legal in the current position.
    pub fn is_legal(&self, mv: Move) -> bool {
        self.pseudo_legal_moves().contains(&mv) && self.keeps_king_safe(mv)
    }

    /// Returns `true` if the side to move's King is attacked.
    #[inline(always)]
    pub fn is_check(&self) -> bool {
        let color = self.side_to_move;
        self.board
            .king_square(color)
            .is_some_and(|king| self.board.is_attacked(king, !color))
    }

    /// Returns `true` if the side to move is in check and has no legal moves.
    ///
    /// # Example
    /// ```
    /// # use newt::*;
    /// // Fool's mate
    /// let game = Game::from_fen("rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3").unwrap();
    /// assert!(game.is_checkmate());
    /// assert!(game.is_game_over());
    /// ```
    pub fn is_checkmate(&self) -> bool {
        self.is_check() && !self.has_legal_moves()
    }

    /// Returns `true` if the side to move is not in check but has no legal moves.
    pub fn is_stalemate(&self) -> bool {
        !self.is_check() && !self.has_legal_moves()
    }

    /// Returns `true` if `color` can never deliver checkmate, no matter how the opponent plays.
    ///
    /// A side with a Pawn, Rook, or Queen always has enough material.
    /// A lone Knight is insufficient unless the opponent has pieces other than Kings and Queens to block with.
    /// Bishops are insufficient if every Bishop on the board stands on the same square color and no Pawns or Knights remain.
    pub fn has_insufficient_material(&self, color: Color) -> bool {
        let ours = self.board.color_bb(color);
        let heavy = self.board.kind(PieceKind::Pawn)
            | self.board.kind(PieceKind::Rook)
            | self.board.kind(PieceKind::Queen);

        if (ours & heavy).is_nonempty() {
            return false;
        }

        if (ours & self.board.kind(PieceKind::Knight)).is_nonempty() {
            let theirs = self.board.color_bb(!color);
            let blockers = theirs
                & !self.board.kind(PieceKind::King)
                & !self.board.kind(PieceKind::Queen);
            return ours.population() <= 2 && blockers.is_empty();
        }

        let bishops = self.board.kind(PieceKind::Bishop);
        if (ours & bishops).is_nonempty() {
            let same_color = (bishops & Bitboard::DARK_SQUARES).is_empty()
                || (bishops & Bitboard::LIGHT_SQUARES).is_empty();
            let minors = self.board.kind(PieceKind::Pawn) | self.board.kind(PieceKind::Knight);
            return same_color && minors.is_empty();
        }

        true
    }

    /// Returns `true` if neither side can deliver checkmate.
    ///
    /// # Example
    /// ```
    /// # use newt::*;
    /// let kbk: Game = "8/8/4k3/8/2B5/8/8/4K3 w - - 0 1".parse().unwrap();
    /// assert!(kbk.is_insufficient_material());
    ///
    /// // Bishops on different square colors can still mate
    /// let kbkb: Game = "8/3bk3/8/8/3K4/8/5B2/8 w - - 0 1".parse().unwrap();
    /// assert!(!kbkb.is_insufficient_material());
    /// ```
    pub fn is_insufficient_material(&self) -> bool {
        Color::all()
            .into_iter()
            .all(|color| self.has_insufficient_material(color))
    }

    /// Returns `true` if 75 moves have passed by each side without a capture or Pawn move, and the last move did not mate.
    pub fn is_seventyfive_moves(&self) -> bool {
        self.halfmove >= SEVENTY_FIVE_MOVES && !self.is_checkmate()
    }

    /// Number of times the current position has occurred since the last irreversible move, including now.
    pub fn repetitions(&self) -> usize {
        1 + self
            .history
            .iter()
            .rev()
            .take(self.halfmove)
            .filter(|undo| undo.key == self.key)
            .count()
    }

    /// Returns `true` if the current position has occurred five times.
    pub fn is_fivefold_repetition(&self) -> bool {
        self.repetitions() >= FIVEFOLD
    }

    /// Returns `true` if the game has ended by checkmate, stalemate, insufficient material,
    /// the 75-move rule, or fivefold repetition.
    pub fn is_game_over(&self) -> bool {
        !self.has_legal_moves()
            || self.is_insufficient_material()
            || self.halfmove >= SEVENTY_FIVE_MOVES
            || self.is_fivefold_repetition()
    }

    /// Counts the leaf nodes of the legal move tree `depth` plies deep.
    ///
    /// # Example
    /// ```
    /// # use newt::*;
    /// let mut game = Game::default();
    /// assert_eq!(game.perft(3), 8_902);
    /// ```
    #[inline(always)]
    pub fn perft(&mut self, depth: usize) -> u64 {
        perft(self, depth)
    }
}

/// Pushes a Pawn move, expanding it into every promotion if it reaches the last rank.
fn push_pawn_move(moves: &mut MoveList, from: Square, to: Square, color: Color) {
    if to.relative_rank(color) == 7 {
        moves.extend(
            PieceKind::promotions()
                .into_iter()
                .map(|kind| Move::with_promotion(from, to, kind)),
        );
    } else {
        moves.push(Move::new(from, to));
    }
}

impl Default for Game {
    /// The standard starting position.
    fn default() -> Self {
        use PieceKind::*;
        const BACK_RANK: [PieceKind; 8] = [Rook, Knight, Bishop, Queen, King, Bishop, Knight, Rook];

        let mut board = Board::new();
        for (file, kind) in BACK_RANK.into_iter().enumerate() {
            let file = file as u8;
            board.place(Piece::new(Color::White, kind), Square::new(file, 0));
            board.place(Piece::new(Color::White, Pawn), Square::new(file, 1));
            board.place(Piece::new(Color::Black, Pawn), Square::new(file, 6));
            board.place(Piece::new(Color::Black, kind), Square::new(file, 7));
        }

        Self::from_parts(board, Color::White, CastlingRights::ALL, None, 0, 1)
    }
}

impl FromStr for Game {
    type Err = anyhow::Error;
    #[inline(always)]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_fen(s)
    }
}

impl Deref for Game {
    type Target = Board;
    #[inline(always)]
    fn deref(&self) -> &Self::Target {
        &self.board
    }
}

impl fmt::Display for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.board)?;
        writeln!(f)?;
        writeln!(f, "FEN: {}", self.to_fen())?;
        write!(f, "Key: {}", self.key)
    }
}

/// A move made on a [`Game`] that is taken back when this guard is dropped.
///
/// Dereferences to the [`Game`] in the state after the move.
pub struct MoveGuard<'a> {
    game: &'a mut Game,
}

impl<'a> MoveGuard<'a> {
    #[inline(always)]
    pub fn new(game: &'a mut Game, mv: Move) -> Self {
        game.make_move(mv);
        Self { game }
    }
}

impl Deref for MoveGuard<'_> {
    type Target = Game;
    #[inline(always)]
    fn deref(&self) -> &Self::Target {
        self.game
    }
}

impl DerefMut for MoveGuard<'_> {
    #[inline(always)]
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.game
    }
}

impl Drop for MoveGuard<'_> {
    #[inline(always)]
    fn drop(&mut self) {
        self.game.unmake_move();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FEN_STARTPOS;

    #[test]
    fn test_default_is_startpos() {
        assert_eq!(Game::default(), Game::from_fen(FEN_STARTPOS).unwrap());
    }

    #[test]
    fn test_fen_round_trip() {
        let fens = [
            FEN_STARTPOS,
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
            "rnbqkbnr/ppp1p1pp/8/3pPp2/8/8/PPPP1PPP/RNBQKBNR w KQkq f6 0 3",
            "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 b - - 12 40",
        ];
        for fen in fens {
            assert_eq!(Game::from_fen(fen).unwrap().to_fen(), fen);
        }
    }

    #[test]
    fn test_fen_errors() {
        assert!(Game::from_fen("").is_err());
        assert!(Game::from_fen("8/8/8/8/8/8/8/K6k x - - 0 1").is_err());
        assert!(Game::from_fen("8/8/8/8/8/8/8/K6k w - e4 0 1").is_err());
        assert!(Game::from_fen("8/8/8/8/8/8/8/K6k w - - x 1").is_err());
        assert!(Game::from_fen("8/8/8/8/8/8/8/KK5k w - - 0 1").is_err());
    }

    #[test]
    fn test_unmake_restores_everything() {
        let fen = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";
        let original = Game::from_fen(fen).unwrap();
        let mut game = original.clone();

        for mv in original.legal_moves() {
            game.make_move(mv);
            assert_eq!(
                game.key(),
                game.compute_key(),
                "Incremental key diverged after {mv}"
            );
            for reply in game.legal_moves() {
                game.make_move(reply);
                assert_eq!(game.key(), game.compute_key(), "Key diverged after {mv} {reply}");
                game.unmake_move();
            }
            game.unmake_move();
            assert_eq!(game, original, "Position not restored after {mv}");
        }
    }

    #[test]
    fn test_castling_rights_lost() {
        let mut game = Game::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
        game.make_move_uci("h1h8").unwrap();
        assert_eq!(game.castling_rights(), CastlingRights::WHITE_LONG | CastlingRights::BLACK_LONG);
    }

    #[test]
    fn test_castling_through_check() {
        // The f8 rook covers f1, so White cannot castle short
        let game = Game::from_fen("4kr2/8/8/8/8/8/8/R3K2R w KQ - 0 1").unwrap();
        assert!(!game.is_legal("e1g1".parse().unwrap()));
        assert!(game.is_legal("e1c1".parse().unwrap()));
    }

    #[test]
    fn test_en_passant_square_only_when_capturable() {
        let mut game = Game::default();
        game.make_move_uci("e2e4").unwrap();
        assert_eq!(game.ep_square(), None);

        let mut game = Game::from_fen("4k3/8/8/8/3p4/8/4P3/4K3 w - - 0 1").unwrap();
        game.make_move_uci("e2e4").unwrap();
        assert_eq!(game.ep_square(), Some(Square::E3));
        assert!(game.is_legal("d4e3".parse().unwrap()));
    }

    #[test]
    fn test_stalemate() {
        let game = Game::from_fen("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1").unwrap();
        assert!(game.is_stalemate());
        assert!(!game.is_checkmate());
        assert!(game.is_game_over());
    }

    #[test]
    fn test_insufficient_material() {
        let draws = [
            "8/8/4k3/8/8/8/8/4K3 w - - 0 1",
            "8/8/4k3/8/8/2N5/8/4K3 w - - 0 1",
            "8/2b1k3/8/8/3K4/8/5B2/8 w - - 0 1",
        ];
        for fen in draws {
            let game = Game::from_fen(fen).unwrap();
            assert!(game.is_insufficient_material(), "{fen} should be a draw");
            assert!(game.is_game_over());
        }

        let not_draws = [
            "8/8/4k3/8/8/8/4P3/4K3 w - - 0 1",
            "8/8/4k3/3n4/8/2N5/8/4K3 w - - 0 1",
            "8/8/4k3/8/8/2NN4/8/4K3 w - - 0 1",
        ];
        for fen in not_draws {
            let game = Game::from_fen(fen).unwrap();
            assert!(!game.is_insufficient_material(), "{fen} should not be a draw");
        }
    }

    #[test]
    fn test_fivefold_repetition() {
        let mut game = Game::default();
        let shuffle = ["g1f3", "g8f6", "f3g1", "f6g8"];

        for _ in 0..3 {
            for mv in shuffle {
                game.make_move_uci(mv).unwrap();
            }
        }
        assert_eq!(game.repetitions(), 4);
        assert!(!game.is_fivefold_repetition());

        for mv in shuffle {
            game.make_move_uci(mv).unwrap();
        }
        assert_eq!(game.repetitions(), 5);
        assert!(game.is_fivefold_repetition());
        assert!(game.is_game_over());
    }

    #[test]
    fn test_seventyfive_moves() {
        let game = Game::from_fen("4k3/8/8/8/8/8/8/R3K3 w - - 150 100").unwrap();
        assert!(game.is_seventyfive_moves());
        assert!(game.is_game_over());
    }

    #[test]
    fn test_move_guard_unmakes_on_drop() {
        let mut game = Game::default();
        let before = game.clone();
        for mv in before.legal_moves() {
            let guard = game.make_scoped(mv);
            assert_eq!(guard.ply(), 1);
            assert_eq!(guard.last_move(), Some(mv));
        }
        assert_eq!(game, before);
    }
}
