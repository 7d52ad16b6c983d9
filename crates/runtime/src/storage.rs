//! Per-system rules for where a persisted cover effect lives.
//!
//! Some systems embed effects on the actor, others wrap them in an owned
//! item. Each [`StorageStrategy`] describes how to find, create and delete
//! the documents backing one `(token, effect)` pair. The table is selected
//! once per session with [`StorageStrategy::for_system`].
use std::collections::BTreeMap;

use cover_core::{CoverEffect, CoverEffectId, TokenId};

use crate::privileged::{DocumentData, DocumentId, DocumentKind};

/// Documents known to back applied effects, keyed by host id.
pub type DocumentIndex = BTreeMap<DocumentId, DocumentData>;

pub type FindStorage = fn(&DocumentIndex, TokenId, CoverEffectId) -> Option<DocumentId>;
pub type CreateStorage = fn(&StorageStrategy, TokenId, &CoverEffect) -> DocumentData;
pub type DeleteStorage = fn(&DocumentIndex, TokenId, CoverEffectId) -> Vec<DocumentId>;

#[derive(Clone, Copy)]
pub struct StorageStrategy {
    pub system_id: &'static str,
    pub document_kind: DocumentKind,
    /// Item subtype used by item-backed strategies.
    pub item_type: Option<&'static str>,
    pub find_storage: FindStorage,
    pub create_storage: CreateStorage,
    pub delete_storage: DeleteStorage,
}

static STRATEGIES: [StorageStrategy; 4] = [
    StorageStrategy {
        system_id: "dnd5e",
        document_kind: DocumentKind::ActiveEffect,
        item_type: None,
        find_storage: find_first,
        create_storage: create_document,
        delete_storage: delete_all,
    },
    StorageStrategy {
        system_id: "pf2e",
        document_kind: DocumentKind::Item,
        item_type: Some("effect"),
        find_storage: find_first,
        create_storage: create_document,
        delete_storage: delete_first,
    },
    StorageStrategy {
        system_id: "sfrpg",
        document_kind: DocumentKind::Item,
        item_type: Some("effect"),
        find_storage: find_first,
        create_storage: create_document,
        delete_storage: delete_first,
    },
    StorageStrategy {
        system_id: GENERIC_STORAGE,
        document_kind: DocumentKind::ActiveEffect,
        item_type: None,
        find_storage: find_first,
        create_storage: create_document,
        delete_storage: delete_all,
    },
];

const GENERIC_STORAGE: &str = "generic";

impl StorageStrategy {
    /// Strategy for a system id; unknown systems use the generic entry.
    pub fn for_system(system_id: &str) -> &'static StorageStrategy {
        STRATEGIES
            .iter()
            .find(|strategy| strategy.system_id == system_id)
            .unwrap_or(&STRATEGIES[STRATEGIES.len() - 1])
    }

    pub fn all() -> &'static [StorageStrategy] {
        &STRATEGIES
    }

    pub fn find(
        &self,
        documents: &DocumentIndex,
        token: TokenId,
        effect: CoverEffectId,
    ) -> Option<DocumentId> {
        (self.find_storage)(documents, token, effect)
    }

    pub fn create(&self, token: TokenId, effect: &CoverEffect) -> DocumentData {
        (self.create_storage)(self, token, effect)
    }

    pub fn delete(
        &self,
        documents: &DocumentIndex,
        token: TokenId,
        effect: CoverEffectId,
    ) -> Vec<DocumentId> {
        (self.delete_storage)(documents, token, effect)
    }
}

impl std::fmt::Debug for StorageStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageStrategy")
            .field("system_id", &self.system_id)
            .field("document_kind", &self.document_kind)
            .field("item_type", &self.item_type)
            .finish_non_exhaustive()
    }
}

fn matching(
    documents: &DocumentIndex,
    token: TokenId,
    effect: CoverEffectId,
) -> impl Iterator<Item = DocumentId> + '_ {
    documents
        .iter()
        .filter(move |(_, data)| data.backs(token, effect))
        .map(|(id, _)| *id)
}

fn find_first(documents: &DocumentIndex, token: TokenId, effect: CoverEffectId) -> Option<DocumentId> {
    matching(documents, token, effect).next()
}

fn delete_first(documents: &DocumentIndex, token: TokenId, effect: CoverEffectId) -> Vec<DocumentId> {
    matching(documents, token, effect).take(1).collect()
}

fn delete_all(documents: &DocumentIndex, token: TokenId, effect: CoverEffectId) -> Vec<DocumentId> {
    matching(documents, token, effect).collect()
}

fn create_document(strategy: &StorageStrategy, token: TokenId, effect: &CoverEffect) -> DocumentData {
    DocumentData {
        kind: strategy.document_kind,
        item_type: strategy.item_type.map(str::to_owned),
        token,
        effect: effect.id,
        name: effect.name.clone(),
    }
}
