//! `cli-replay` binary entry point
//!
//! This binary serves two roles depending on how it is invoked: run under
//! its own name it parses arguments with
//! `clap` and dispatches to a subcommand; run under a trampoline name
//! installed by `cli_replay_core::lifecycle::setup`, it never reaches the
//! `clap` parser — it replays one step via [`cli_replay_cli::trampoline`]
//! and exits with the matched response's exit code.

use cli_replay_cli::{argv0_basename, cli, SELF_NAME};

fn main() {
    let args: Vec<String> = std::env::args().collect();
    let invoked_as = args
        .first()
        .map(|a| argv0_basename(a))
        .unwrap_or(SELF_NAME);

    if invoked_as == SELF_NAME {
        if let Err(e) = cli::run_cli() {
            eprintln!("cli-replay: {}", e);
            std::process::exit(e.exit_code());
        }
        return;
    }

    cli_replay_cli::trampoline::run(args);
}
