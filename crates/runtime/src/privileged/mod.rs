//! Privileged document writes.
//!
//! Persisting a cover effect means creating a document on the authoritative
//! host. A session that holds authority writes directly through
//! [`DocumentHostHandle`]; any other session forwards the request through a
//! [`ProxyPort`]. Both sit behind [`PrivilegedPort`].
mod host;
mod proxy;

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use cover_core::{CoverEffectId, TokenId};

pub use host::{DocumentHostHandle, DocumentHostWorker};
pub use proxy::ProxyPort;

/// Identifier assigned by the host to a stored document.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DocumentId(pub u64);

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "doc:{}", self.0)
    }
}

/// Shape of the document backing an effect.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    /// An effect embedded directly on the actor.
    ActiveEffect,
    /// An item owned by the actor that carries the effect.
    Item,
}

/// A document stored on behalf of one `(token, effect)` pair.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentData {
    pub kind: DocumentKind,
    /// Item subtype, for [`DocumentKind::Item`] documents.
    #[serde(default)]
    pub item_type: Option<String>,
    pub token: TokenId,
    pub effect: CoverEffectId,
    pub name: String,
}

impl DocumentData {
    pub fn backs(&self, token: TokenId, effect: CoverEffectId) -> bool {
        self.token == token && self.effect == effect
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum PrivilegedError {
    #[error("host rejected the operation: {0}")]
    Rejected(String),

    #[error("no response from the authoritative host within {0:?}")]
    Timeout(Duration),

    #[error("no authoritative host is connected")]
    NoAuthority,

    #[error("document host closed")]
    HostClosed,
}

/// Document operations that need authority over the shared session.
#[async_trait]
pub trait PrivilegedPort: Send + Sync {
    /// Whether writes through this port execute with local authority.
    fn is_authorized(&self) -> bool;

    async fn create_document(&self, data: DocumentData) -> Result<DocumentId, PrivilegedError>;

    async fn delete_document(&self, id: DocumentId) -> Result<(), PrivilegedError>;
}
