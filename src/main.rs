/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::ops::ControlFlow;

use clap::{error::ErrorKind, Parser};
use newt::{Engine, EngineCommand};

fn main() {
    let mut engine = Engine::new();

    // Skip the executable name
    let args = std::env::args().skip(1).collect::<Vec<_>>();

    // Greedily parse the longest prefix of the remaining arguments that forms a command
    let mut arg_idx = args.len();
    let mut parsed_idx = 0;
    while parsed_idx < arg_idx {
        let slice = &args[parsed_idx..arg_idx];

        match EngineCommand::try_parse_from(slice) {
            Ok(cmd) => {
                match engine.execute(cmd) {
                    Ok(ControlFlow::Break(())) => return,
                    Ok(ControlFlow::Continue(())) => {}
                    Err(e) => eprintln!("Error: {e:#}"),
                }
                parsed_idx = arg_idx;
                arg_idx = args.len();
            }

            // Edge case: `--help` and `--version` are both "error" cases according to Clap
            Err(e)
                if matches!(e.kind(), ErrorKind::DisplayHelp)
                    || matches!(e.kind(), ErrorKind::DisplayVersion) =>
            {
                println!("{e}");
                parsed_idx = arg_idx;
                arg_idx = args.len();
            }

            Err(e) => {
                // Nothing starting here parses; skip the offending argument
                if arg_idx == parsed_idx + 1 {
                    eprintln!("ERROR on input {slice:?}:\n{e}");
                    parsed_idx += 1;
                    arg_idx = args.len();
                } else {
                    arg_idx -= 1;
                }
            }
        }
    }

    if let Err(e) = engine.run() {
        eprintln!("{} encountered an error: {e}", env!("CARGO_PKG_NAME"));
    }
}
