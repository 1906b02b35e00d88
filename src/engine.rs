/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{
    fmt,
    io::{self, Write},
    ops::ControlFlow,
    time::Instant,
};

use anyhow::{bail, Context, Result};

use crate::{
    perft, safe_moves, splitperft, Agent, EngineCommand, EvaluatorKind, Game, HeuristicEvaluator,
    Noise, BENCHMARK_FENS, DEFAULT_DEPTH, DEFAULT_JITTER,
};

/// Default depth at which to run the benchmark searches.
const BENCH_DEPTH: usize = 3;

/// Settings applied to every search and evaluation, changed with the `set` command.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineOptions {
    /// Depth of searches started by `go`.
    pub depth: usize,

    /// Evaluator used by `go` and `eval`.
    pub eval: EvaluatorKind,

    /// Seed of the tie-breaking noise. If `None`, the noise is seeded from system entropy.
    pub seed: Option<u64>,

    /// Scale of the noise added to leaf evaluations.
    pub jitter: f64,
}

impl EngineOptions {
    /// Names of every option, in the order they are displayed.
    pub const NAMES: [&'static str; 4] = ["depth", "eval", "seed", "jitter"];

    /// Returns the current value of the option `name`, if it exists.
    pub fn get(&self, name: &str) -> Option<String> {
        let value = match name {
            "depth" => self.depth.to_string(),
            "eval" => self.eval.to_string(),
            "seed" => self
                .seed
                .map_or_else(|| String::from("none"), |seed| seed.to_string()),
            "jitter" => self.jitter.to_string(),
            _ => return None,
        };

        Some(value)
    }

    /// Sets option `name` to `value`.
    ///
    /// Will return an error if `name` isn't a valid option or `value` is not a valid value for that option.
    pub fn set(&mut self, name: &str, value: &str) -> Result<()> {
        match name {
            "depth" => {
                let Ok(depth) = value.parse() else {
                    bail!("expected integer. got {value:?}");
                };
                self.depth = depth;
            }

            "eval" => self.eval = value.parse()?,

            "seed" => {
                self.seed = if value.eq_ignore_ascii_case("none") {
                    None
                } else {
                    let Ok(seed) = value.parse() else {
                        bail!("expected integer or \"none\". got {value:?}");
                    };
                    Some(seed)
                };
            }

            "jitter" => {
                let Ok(jitter) = value.parse::<f64>() else {
                    bail!("expected number. got {value:?}");
                };
                if !jitter.is_finite() || jitter < 0.0 {
                    bail!("jitter must be a non-negative number. got {jitter}");
                }
                self.jitter = jitter;
            }

            _ => bail!("Unrecognized option {name:?} with value {value:?}"),
        }

        Ok(())
    }

    /// Creates the noise used by a single search or evaluation.
    #[inline(always)]
    pub fn noise(&self, seed: Option<u64>) -> Noise {
        match seed.or(self.seed) {
            Some(seed) => Noise::seeded(seed),
            None => Noise::from_entropy(),
        }
    }
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            depth: DEFAULT_DEPTH,
            eval: EvaluatorKind::default(),
            seed: None,
            jitter: DEFAULT_JITTER,
        }
    }
}

impl fmt::Display for EngineOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, name) in Self::NAMES.into_iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{name} := {}", self.get(name).unwrap_or_default())?;
        }
        Ok(())
    }
}

/// The Newt chess engine.
///
/// Holds a single game, and executes [`EngineCommand`]s on it one at a time.
#[derive(Debug, Default)]
pub struct Engine {
    /// The current state of the chess board, as known to the engine.
    ///
    /// This is modified whenever moves are played or new positions are given.
    game: Game,

    /// Settings for searches and evaluations.
    options: EngineOptions,
}

impl Engine {
    /// Constructs a new [`Engine`] instance to be executed with [`Engine::run`].
    #[inline(always)]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a string of the engine's name and current version.
    pub fn name(&self) -> String {
        format!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
    }

    #[inline(always)]
    pub const fn game(&self) -> &Game {
        &self.game
    }

    #[inline(always)]
    pub const fn options(&self) -> &EngineOptions {
        &self.options
    }

    /// Execute the main event loop for the engine, reading one command per line of `stdin`.
    ///
    /// Commands that fail print their error and do not stop the engine.
    pub fn run(&mut self) -> Result<()> {
        let mut buffer = String::with_capacity(2048);

        loop {
            // Clear the buffer, read input, and trim the trailing newline
            buffer.clear();
            let bytes = io::stdin()
                .read_line(&mut buffer)
                .context("Failed to read line when parsing commands")?;

            // For ctrl + d
            if 0 == bytes {
                return Ok(());
            }

            // Ignore empty lines
            let buf = buffer.trim();
            if buf.is_empty() {
                continue;
            }

            let cmd = match buf.parse::<EngineCommand>() {
                Ok(cmd) => cmd,
                Err(err) => {
                    err.print()?;
                    continue;
                }
            };

            match self.execute(cmd) {
                Ok(ControlFlow::Break(())) => return Ok(()),
                Ok(ControlFlow::Continue(())) => {}
                // Keep running, even on error
                Err(e) => eprintln!("Error: {e:#}"),
            }
        }
    }

    /// Executes a single [`EngineCommand`], returning [`ControlFlow::Break`] if the engine should quit.
    pub fn execute(&mut self, cmd: EngineCommand) -> Result<ControlFlow<()>> {
        match cmd {
            EngineCommand::Bench { depth, pretty } => self.bench(depth, pretty)?,

            EngineCommand::Display => println!("{}", self.game),

            EngineCommand::Eval { eval, pretty } => self.eval(eval, pretty),

            EngineCommand::Exit => return Ok(ControlFlow::Break(())),

            EngineCommand::Fen => println!("{}", self.game.to_fen()),

            EngineCommand::Go { depth, eval, seed } => self.go(depth, eval, seed),

            EngineCommand::Moves => self.moves(),

            EngineCommand::Option { name } => {
                if let Some(name) = name {
                    let Some(value) = self.options.get(&name) else {
                        bail!("{} has no option {name:?}", self.name());
                    };
                    println!("{name} := {value}");
                } else {
                    println!("{}", self.options);
                }
            }

            EngineCommand::Perft { depth } => {
                let now = Instant::now();
                let nodes = perft(&mut self.game, depth);
                let elapsed = now.elapsed();
                println!("{nodes} nodes / {elapsed:?}");
            }

            EngineCommand::Position { args } => self.game = parse_position(&args)?,

            EngineCommand::Set { name, value } => self.options.set(&name, &value)?,

            EngineCommand::Splitperft { depth } => {
                let mut total = 0;
                for (mv, nodes) in splitperft(&mut self.game, depth) {
                    println!("{mv}: {nodes}");
                    total += nodes;
                }
                println!("\n{total}");
            }
        }

        Ok(ControlFlow::Continue(()))
    }

    /// Executes the `go` command, choosing and printing a move for the side to move.
    fn go(&mut self, depth: Option<usize>, eval: Option<EvaluatorKind>, seed: Option<u64>) {
        let depth = depth.unwrap_or(self.options.depth);
        let kind = eval.unwrap_or(self.options.eval);
        let mut noise = self.options.noise(seed);

        let agent = Agent::from_kind(self.game.side_to_move(), depth, kind)
            .with_jitter(self.options.jitter);

        let now = Instant::now();
        let decision = agent.choose_move(&mut self.game, &mut noise);
        let ms = now.elapsed().as_millis();

        println!(
            "info depth {depth} nodes {} score {:.4} time {ms}",
            decision.nodes, decision.score
        );
        if decision.fallback {
            println!("info string {} found no move; playing the first legal move", agent.name());
        }

        match decision.bestmove {
            Some(mv) => println!("bestmove {mv}"),
            None => println!("bestmove (none)"),
        }
    }

    /// Executes the `eval` command, printing an evaluation of the current position.
    fn eval(&self, eval: Option<EvaluatorKind>, pretty: bool) {
        let kind = eval.unwrap_or(self.options.eval);
        let color = self.game.side_to_move();
        let mut noise = self.options.noise(None);

        if pretty {
            let terms = HeuristicEvaluator::default().terms(&self.game, color);
            println!("{terms}\n");
            print!("{kind} score for {color}: ");
        }

        println!("{}", kind.build().evaluate(&self.game, color, &mut noise));
    }

    /// Executes the `moves` command, displaying all moves that keep the King safe.
    fn moves(&mut self) {
        let moves = safe_moves(&mut self.game);

        // If there are none, print "(none)"
        if moves.is_empty() {
            println!("(none)");
        } else {
            // Otherwise, join them by comma-space
            let string = moves
                .iter()
                .map(|mv| mv.to_string())
                .collect::<Vec<_>>()
                .join(", ");
            println!("{string}");
        }
    }

    /// Execute the `bench` command, running a fixed-depth search on a series of positions and displaying the results.
    fn bench(&self, depth: Option<usize>, pretty: bool) -> Result<()> {
        let depth = depth.unwrap_or(BENCH_DEPTH);
        let benches = BENCHMARK_FENS;
        let mut nodes = 0;

        // Padding for printing FENs
        let width = benches.iter().map(|fen| fen.len()).max().unwrap_or_default();

        println!(
            "Running fixed-depth search (d={depth}) with the {} evaluator on {} positions",
            self.options.eval,
            benches.len()
        );

        let now = Instant::now();
        for (i, fen) in benches.into_iter().enumerate() {
            print!("{:>2}/{:>2}: {fen:<width$} := ", i + 1, benches.len());
            // flush stdout so the node count will appear on the same line after search concludes
            io::stdout().lock().flush()?;

            let mut game = Game::from_fen(fen)?;
            let agent = Agent::from_kind(game.side_to_move(), depth, self.options.eval)
                .with_jitter(self.options.jitter);

            let decision = agent.choose_move(&mut game, &mut self.options.noise(None));
            nodes += decision.nodes;
            println!("{}", decision.nodes);
        }

        // Compute results
        let elapsed = now.elapsed();
        let nps = (nodes as f32 / elapsed.as_secs_f32()) as u64;
        let k_nps = nodes as f32 / elapsed.as_secs_f32() / 1_000.0;
        let ms = elapsed.as_millis();

        if pretty {
            // Display the results in a nice table
            println!();
            println!("+-- Benchmark Complete --+");
            println!("| time (ms)  {ms:<12}|");
            println!("|     nodes  {nodes:<12}|");
            println!("|       nps  {nps:<12}|");
            println!("|      Knps  {k_nps:<12.2}|");
            println!("+------------------------+");
        } else {
            println!("{nodes} nodes / {elapsed:?} := {nps} nps");
        }

        Ok(())
    }
}

/// Parses the arguments of the `position` command into a new [`Game`].
///
/// Accepts `[startpos | fen <FEN>] [moves <move>...]`, where an empty setup means the starting position.
/// Every move must be legal in the position it is played in.
pub fn parse_position<T: AsRef<str>>(args: &[T]) -> Result<Game> {
    let split = args
        .iter()
        .position(|arg| arg.as_ref() == "moves")
        .unwrap_or(args.len());
    let (setup, moves) = args.split_at(split);

    let mut game = match setup.split_first() {
        None => Game::default(),
        Some((kind, [])) if kind.as_ref() == "startpos" => Game::default(),
        Some((kind, fen)) if kind.as_ref() == "fen" => {
            let fen = fen.iter().map(|s| s.as_ref()).collect::<Vec<&str>>().join(" ");
            Game::from_fen(&fen)?
        }
        _ => bail!("usage: position [startpos | fen <FEN>] [moves <move>...]"),
    };

    // Skip the "moves" token itself
    for mv in moves.iter().skip(1) {
        game.make_move_uci(mv.as_ref())?;
    }

    Ok(game)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FEN_STARTPOS;

    fn execute(engine: &mut Engine, input: &str) -> Result<ControlFlow<()>> {
        engine.execute(input.parse().unwrap())
    }

    fn continues(engine: &mut Engine, input: &str) {
        let flow = execute(engine, input).unwrap();
        assert_eq!(flow, ControlFlow::Continue(()), "{input:?} should not stop the engine");
    }

    #[test]
    fn test_parse_position() {
        assert_eq!(parse_position::<&str>(&[]).unwrap(), Game::default());
        assert_eq!(parse_position(&["startpos"]).unwrap(), Game::default());

        let game = parse_position(&["startpos", "moves", "e2e4", "e7e5"]).unwrap();
        assert_eq!(
            game.to_fen(),
            "rnbqkbnr/pppp1ppp/8/4p3/4P3/8/PPPP1PPP/RNBQKBNR w KQkq - 0 2"
        );

        let mut args = vec!["fen"];
        args.extend(FEN_STARTPOS.split(' '));
        let game = parse_position(&args).unwrap();
        assert_eq!(game, Game::default());

        assert!(parse_position(&["startpos", "moves", "e2e5"]).is_err());
        assert!(parse_position(&["somewhere"]).is_err());
        assert!(parse_position(&["startpos", "extra"]).is_err());
    }

    #[test]
    fn test_failed_position_keeps_game() {
        let mut engine = Engine::new();
        continues(&mut engine, "position startpos moves d2d4");
        let before = engine.game().clone();

        assert!(execute(&mut engine, "position startpos moves d2d4 d7d3").is_err());
        assert_eq!(engine.game(), &before);
    }

    #[test]
    fn test_set_options() {
        let mut engine = Engine::new();
        continues(&mut engine, "set depth 4");
        continues(&mut engine, "set eval pst");
        continues(&mut engine, "set seed 9");
        continues(&mut engine, "set jitter 0");

        let options = engine.options();
        assert_eq!(options.depth, 4);
        assert_eq!(options.eval, EvaluatorKind::Positional);
        assert_eq!(options.seed, Some(9));
        assert_eq!(options.jitter, 0.0);

        continues(&mut engine, "set seed none");
        assert_eq!(engine.options().seed, None);

        assert!(execute(&mut engine, "set depth deep").is_err());
        assert!(execute(&mut engine, "set jitter -1").is_err());
        assert!(execute(&mut engine, "set threads 2").is_err());
        assert!(execute(&mut engine, "option threads").is_err());
    }

    #[test]
    fn test_exit_breaks() {
        let mut engine = Engine::new();
        assert_eq!(execute(&mut engine, "quit").unwrap(), ControlFlow::Break(()));
        assert_eq!(execute(&mut engine, "fen").unwrap(), ControlFlow::Continue(()));
    }

    #[test]
    fn test_go_restores_game() {
        let mut engine = Engine::new();
        continues(&mut engine, "position fen 8/8/8/4k3/8/8/3QK3/8 w - - 0 1");
        let before = engine.game().clone();
        continues(&mut engine, "go --depth 2 --eval positional --seed 1");
        assert_eq!(engine.game(), &before);
    }

    #[test]
    fn test_go_with_every_evaluator() {
        let mut engine = Engine::new();
        continues(&mut engine, "set seed 3");
        for kind in EvaluatorKind::all() {
            continues(&mut engine, &format!("go --depth 1 --eval {kind}"));
            continues(&mut engine, &format!("eval --eval {kind}"));
        }
        assert_eq!(engine.game(), &Game::default());
    }

    #[test]
    fn test_options_display() {
        let options = EngineOptions::default();
        assert_eq!(
            options.to_string(),
            "depth := 2\neval := heuristic\nseed := none\njitter := 0.01"
        );
    }
}
