//! Shared utilities for the cli-replay workspace
//!
//! Small leaf crate with no dependency on `cli-replay-core`, so that
//! `cli-replay-template` (which also depends on this crate) never pulls in
//! the replay engine.

use rand::RngCore;

/// Common result type for shared operations
pub type SharedResult<T> = Result<T, SharedError>;

/// Shared error type
#[derive(Debug, thiserror::Error)]
pub enum SharedError {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Generate a session identifier: 8 bytes of cryptographically random data,
/// hex-encoded. Falls back to a PID-derived value if the OS RNG is
/// unavailable.
pub fn generate_session_id() -> String {
    let mut bytes = [0u8; 8];
    match rand::rngs::OsRng.try_fill_bytes(&mut bytes) {
        Ok(()) => hex::encode(bytes),
        Err(_) => {
            let pid = std::process::id();
            let nanos = std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.subsec_nanos())
                .unwrap_or(0);
            let mut fallback = [0u8; 8];
            fallback[0..4].copy_from_slice(&pid.to_be_bytes());
            fallback[4..8].copy_from_slice(&nanos.to_be_bytes());
            hex::encode(fallback)
        }
    }
}
