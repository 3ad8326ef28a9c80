//! Scenario model, replay engine, session lifecycle, process supervisor,
//! and verification reporting for cli-replay.
//!
//! Module map:
//! - [`model`] — data shapes.
//! - [`validate`] — scenario loading, validation, flattening.
//! - [`matcher`] — argv pattern matching.
//! - [`state`] — session state persistence.
//! - [`engine`] — the match/advance state machine and response rendering.
//! - [`lifecycle`] — session setup/teardown, trampolines, allowlisting.
//! - [`supervisor`] — child process spawning and signal forwarding.
//! - [`verify`] and [`report`] — verification and its renderings.
//! - [`ttl`] — expired-session cleanup.

pub mod duration;
pub mod engine;
pub mod error;
pub mod lifecycle;
pub mod matcher;
pub mod model;
pub mod report;
pub mod state;
pub mod supervisor;
pub mod ttl;
pub mod validate;
pub mod verify;

pub use error::{ReplayError, Result};
pub use model::{Scenario, State};
pub use validate::ValidatedScenario;
