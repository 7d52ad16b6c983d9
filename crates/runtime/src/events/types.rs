//! Event types for different topics.

use serde::{Deserialize, Serialize};

use cover_core::{CoverEffectId, CoverEffectSet, CoverMode, CoverTypeSet, TokenId};

use crate::privileged::DocumentId;

/// Events describing what a dispatch changed on screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoverEvent {
    /// A token's displayed cover markers changed.
    CoverTypesChanged {
        token: TokenId,
        cover_types: CoverTypeSet,
    },

    /// The cover effects applied to a token's actor changed.
    CoverEffectsChanged {
        token: TokenId,
        cover_effects: CoverEffectSet,
    },

    /// The attacker set of a mode changed.
    AttackersChanged {
        mode: CoverMode,
        attackers: Vec<TokenId>,
    },

    /// Recomputing one token failed; the rest of the cascade went on.
    RecomputeFailed {
        token: TokenId,
        mode: CoverMode,
        error: String,
    },
}

/// Which privileged write an event refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrivilegedOperation {
    Create,
    Delete,
}

/// Events related to persisted effect documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrivilegedEvent {
    /// A storage document now backs an applied effect.
    DocumentCreated {
        token: TokenId,
        effect: CoverEffectId,
        document: DocumentId,
        proxied: bool,
    },

    /// A storage document was deleted.
    DocumentDeleted {
        token: TokenId,
        effect: CoverEffectId,
        document: DocumentId,
    },

    /// A privileged write failed. The local effect state is left as is.
    OperationFailed {
        token: TokenId,
        effect: CoverEffectId,
        operation: PrivilegedOperation,
        error: String,
    },

    /// A create finished after its effect had been removed again; the
    /// document was deleted right away.
    ResultDiscarded {
        token: TokenId,
        effect: CoverEffectId,
        document: DocumentId,
    },
}
