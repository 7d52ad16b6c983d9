//! Runtime implementations of the `cover-core` oracle traits.
//!
//! Geometry is not computed here: [`ScriptedVisibility`] serves percent
//! cover from a table the host (or a scenario) fills in, and classifies it
//! with the session's cover catalog.
mod visibility;

pub use visibility::{CoverLine, ScriptedVisibility};
