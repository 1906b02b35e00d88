/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::str::FromStr;

use crate::EvaluatorKind;
use clap::{builder::PossibleValue, Parser, ValueEnum};

/// A command to be sent to the engine.
#[derive(Debug, Clone, PartialEq, Parser)]
#[command(
    multicall = true,
    about,
    rename_all = "lower",
    override_usage("<ENGINE COMMAND>")
)]
pub enum EngineCommand {
    /// Run a benchmark of fixed-depth searches on a series of positions.
    Bench {
        /// If set, the benchmarking results will be printed in a well-formatted table.
        #[arg(short, long, default_value = "false")]
        pretty: bool,

        /// Override the default benchmark depth.
        #[arg(short, long, required = false)]
        depth: Option<usize>,
    },

    /// Print a visual representation of the current board state.
    #[command(alias = "d")]
    Display,

    /// Print an evaluation of the current position, from the perspective of the side to move.
    Eval {
        /// Evaluator to use, instead of the configured one.
        #[arg(short, long, ignore_case = true)]
        eval: Option<EvaluatorKind>,

        /// If set, every term of the heuristic evaluation will be printed as well.
        #[arg(short, long, default_value = "false")]
        pretty: bool,
    },

    /// Quit the engine.
    #[command(alias = "quit")]
    Exit,

    /// Generate and print a FEN string for the current position.
    Fen,

    /// Choose a move for the side to move, and print it.
    Go {
        /// Depth to search, instead of the configured one.
        #[arg(short, long)]
        depth: Option<usize>,

        /// Evaluator to use, instead of the configured one.
        #[arg(short, long, ignore_case = true)]
        eval: Option<EvaluatorKind>,

        /// Seed for the tie-breaking noise, instead of the configured one.
        #[arg(short, long)]
        seed: Option<u64>,
    },

    /// Shows all moves in the current position that do not leave the King in check.
    Moves,

    /// Display the current value of the specified option, or of every option.
    Option { name: Option<String> },

    /// Performs a perft on the current position at the supplied depth, printing total node count.
    Perft { depth: usize },

    /// Set the current position.
    ///
    /// Usage: position [startpos | fen <FEN>] [moves <move>...]
    Position {
        #[arg(trailing_var_arg = true, allow_hyphen_values = true, num_args = 0..)]
        args: Vec<String>,
    },

    /// Change the value of an option.
    Set {
        name: String,

        #[arg(allow_hyphen_values = true)]
        value: String,
    },

    /// Performs a split perft on the current position at the supplied depth.
    #[command(alias = "sperft")]
    Splitperft { depth: usize },
}

impl FromStr for EngineCommand {
    type Err = clap::Error;
    /// Attempt to parse an [`EngineCommand`] from a whitespace-separated string.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_parse_from(s.split_ascii_whitespace())
    }
}

impl ValueEnum for EvaluatorKind {
    fn value_variants<'a>() -> &'a [Self] {
        &[
            EvaluatorKind::Material,
            EvaluatorKind::Positional,
            EvaluatorKind::Tactical,
            EvaluatorKind::Heuristic,
            EvaluatorKind::Defensive,
        ]
    }

    fn to_possible_value(&self) -> Option<PossibleValue> {
        // Each evaluator is known by its name, as well as an older alias
        Some(PossibleValue::new(self.name()).aliases(self.aliases().iter().copied()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_go() {
        let cmd: EngineCommand = "go --depth 3 --eval PST".parse().unwrap();
        assert_eq!(
            cmd,
            EngineCommand::Go {
                depth: Some(3),
                eval: Some(EvaluatorKind::Positional),
                seed: None,
            }
        );

        let cmd: EngineCommand = "go -s 42".parse().unwrap();
        assert_eq!(
            cmd,
            EngineCommand::Go {
                depth: None,
                eval: None,
                seed: Some(42),
            }
        );
    }

    #[test]
    fn test_parse_position() {
        let cmd: EngineCommand = "position fen 8/8/8/4k3/8/8/3QK3/8 w - - 0 1 moves d2d4"
            .parse()
            .unwrap();
        let EngineCommand::Position { args } = cmd else {
            panic!("Expected a position command");
        };
        assert_eq!(
            args,
            ["fen", "8/8/8/4k3/8/8/3QK3/8", "w", "-", "-", "0", "1", "moves", "d2d4"]
        );
    }

    #[test]
    fn test_parse_aliases() {
        assert_eq!("d".parse::<EngineCommand>().unwrap(), EngineCommand::Display);
        assert_eq!("quit".parse::<EngineCommand>().unwrap(), EngineCommand::Exit);
        assert_eq!(
            "sperft 2".parse::<EngineCommand>().unwrap(),
            EngineCommand::Splitperft { depth: 2 }
        );
        assert_eq!(
            "eval -e complex".parse::<EngineCommand>().unwrap(),
            EngineCommand::Eval {
                eval: Some(EvaluatorKind::Heuristic),
                pretty: false,
            }
        );
    }

    #[test]
    fn test_parse_every_evaluator() {
        for kind in EvaluatorKind::all() {
            let cmd: EngineCommand = format!("go --eval {kind}").parse().unwrap();
            assert_eq!(
                cmd,
                EngineCommand::Go {
                    depth: None,
                    eval: Some(kind),
                    seed: None,
                }
            );
        }
        assert_eq!(
            "eval -e human".parse::<EngineCommand>().unwrap(),
            EngineCommand::Eval {
                eval: Some(EvaluatorKind::Defensive),
                pretty: false,
            }
        );
    }

    #[test]
    fn test_parse_errors() {
        assert!("go --eval random".parse::<EngineCommand>().is_err());
        assert!("perft".parse::<EngineCommand>().is_err());
        assert!("fly".parse::<EngineCommand>().is_err());
    }
}
