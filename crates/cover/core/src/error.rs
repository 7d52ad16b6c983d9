//! Error types for cover recomputation.
//!
//! Errors never cross the host event boundary: the router and the cascade
//! flush record them per token and keep going. [`ErrorSeverity`] decides how
//! loudly a recorded failure is logged.
use crate::env::EffectStoreError;
use crate::state::TokenId;

/// Severity level of an error, used for categorization and logging.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorSeverity {
    /// Stale input (e.g. an event for a token that already left the scene).
    ///
    /// The next full recompute resolves it; logged at warn level.
    Recoverable,

    /// A collaborator misbehaved or state went out of sync.
    ///
    /// These indicate bugs and should be investigated.
    Internal,
}

impl ErrorSeverity {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Internal => "internal",
        }
    }

    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }
}

/// Errors surfaced while recomputing cover for one token.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CoverError {
    #[error("token {0} is not placed on the scene")]
    UnknownToken(TokenId),

    #[error("effect store rejected update for token {token}: {source}")]
    EffectStore {
        token: TokenId,
        #[source]
        source: EffectStoreError,
    },
}

impl CoverError {
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            CoverError::UnknownToken(_) => ErrorSeverity::Recoverable,
            CoverError::EffectStore { .. } => ErrorSeverity::Internal,
        }
    }

    /// Token the failure belongs to.
    pub fn token(&self) -> TokenId {
        match self {
            CoverError::UnknownToken(token) | CoverError::EffectStore { token, .. } => *token,
        }
    }
}
