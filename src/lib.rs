/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

/// A player that chooses moves by searching with an evaluator.
mod agent;

/// Chess rules: board representation, move generation, and game state.
mod board;

/// Commands accepted by the engine, parsed with `clap`.
mod cli;

/// Code related to the engine's functionality, such as user input handling.
mod engine;

/// Evaluation of chess positions.
mod eval;

/// Injectable randomness for tie-breaking.
mod noise;

/// Filters moves that would leave the mover's King in check.
mod safety;

/// Main engine logic; all search related code.
mod search;

/// Misc utility functions, constants, and types.
mod utils;

pub use agent::*;
pub use board::*;
pub use cli::*;
pub use engine::*;
pub use eval::*;
pub use noise::*;
pub use safety::*;
pub use search::*;
pub use utils::*;
