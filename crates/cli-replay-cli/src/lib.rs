//! cli-replay command-line interface
//!
//! This binary serves two roles depending on how it is invoked: run under
//! its own name (`cli-replay`) it is the
//! `clap`-driven CLI in [`cli`]; run under a trampoline name installed by
//! [`cli_replay_core::lifecycle`], it replays one step via [`trampoline`].

pub mod cli;
pub mod color;
pub mod logging;
pub mod trampoline;

use std::path::Path;

/// The CLI binary's own name, used to tell a normal invocation apart from
/// a trampoline invocation.
pub const SELF_NAME: &str = "cli-replay";

/// Basename of `argv[0]`, with a platform executable extension (`.exe`)
/// stripped so Windows trampolines compare equal to their Unix names.
pub fn argv0_basename(argv0: &str) -> &str {
    let name = Path::new(argv0)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(argv0);
    name.strip_suffix(".exe").unwrap_or(name)
}
