//! Public API surface for clients of the cover runtime.
mod errors;
mod handle;

pub use errors::{Result, RuntimeError};
pub use handle::RuntimeHandle;
