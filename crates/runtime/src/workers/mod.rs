//! Worker tasks that back the runtime orchestration.
//!
//! The cover worker owns a session's controller and processes commands one
//! at a time; the document host worker lives in [`crate::privileged`].

mod cover;

pub use cover::{Command, CoverWorker};
