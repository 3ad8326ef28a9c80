//! `tracing` subscriber setup
//!
//! Filtered by `RUST_LOG`, defaulting to `info` when unset.

pub fn init(verbose: u8) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let subscriber = fmt::Subscriber::builder().with_env_filter(filter).finish();

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        // Already installed (e.g. a test harness set one up first); not fatal.
        tracing::trace!("global tracing subscriber already set");
    }
}
