//! Response template rendering pipeline
//!
//! Two independent pieces, composed by callers (typically the replay
//! engine in `cli-replay-core`):
//!
//! - [`context::assemble_vars`] builds the variable set for one render:
//!   `meta.vars` as a baseline, overridden by the filtered process
//!   environment, with session captures nested under the reserved
//!   `capture` key.
//! - [`renderer::render`] substitutes `{{ .name }}` / `{{ .namespace.name }}`
//!   references against that variable set.

pub mod context;
pub mod error;
pub mod renderer;

pub use context::{assemble_vars, ResolvedVars};
pub use error::{Result, TemplateError};
pub use renderer::render;
