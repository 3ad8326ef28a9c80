//! One module per subcommand, mirroring `cli::Commands`.

pub mod check;
pub mod clean;
pub mod run;
pub mod verify;
