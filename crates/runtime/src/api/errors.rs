//! Unified error types surfaced by the runtime API.
//!
//! Wraps failures from worker coordination, content loading, and cover
//! queries so clients can bubble them up with consistent context.
use thiserror::Error;
use tokio::sync::oneshot;

use cover_core::CoverError;

use crate::privileged::PrivilegedError;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("cover worker command channel closed")]
    CommandChannelClosed,

    #[error("cover worker reply channel closed")]
    ReplyChannelClosed(#[source] oneshot::error::RecvError),

    #[error("worker join failed")]
    WorkerJoin(#[source] tokio::task::JoinError),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Cover(#[from] CoverError),

    #[error(transparent)]
    Privileged(#[from] PrivilegedError),
}
