//! Effect store applying cover classifications to tokens.
use std::collections::{BTreeSet, HashMap};

use crate::cover::{CoverEffectId, CoverEffectSet, CoverTypeSet};
use crate::state::TokenId;

/// Errors reported by an [`EffectStore`].
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum EffectStoreError {
    /// The effect has no definition the store can persist.
    #[error("cover effect {0} has no stored definition")]
    UnknownEffect(CoverEffectId),

    /// The backing store cannot accept writes.
    #[error("effect store unavailable: {0}")]
    Unavailable(String),
}

/// Applies or clears cover markers and mechanical effects on tokens.
///
/// `None` and an empty set both clear. Each call reports whether the
/// displayed set differed from before.
pub trait EffectStore: Send {
    fn replace_cover_types(
        &mut self,
        token: TokenId,
        types: Option<&CoverTypeSet>,
    ) -> Result<bool, EffectStoreError>;

    fn replace_local_effects(
        &mut self,
        token: TokenId,
        effects: Option<&CoverEffectSet>,
    ) -> Result<bool, EffectStoreError>;

    /// Currently displayed cover types.
    fn cover_types(&self, token: TokenId) -> CoverTypeSet;

    /// Currently applied cover effects.
    fn cover_effects(&self, token: TokenId) -> CoverEffectSet;

    /// Drops everything recorded for a removed token.
    fn forget(&mut self, token: TokenId);
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
struct Applied {
    cover_types: CoverTypeSet,
    cover_effects: CoverEffectSet,
}

/// In-memory [`EffectStore`] that only tracks the displayed state.
#[derive(Clone, Debug, Default)]
pub struct LocalEffectStore {
    applied: HashMap<TokenId, Applied>,
}

impl LocalEffectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tokens with any cover type or effect applied.
    pub fn tokens(&self) -> impl Iterator<Item = TokenId> + '_ {
        self.applied.keys().copied()
    }

    fn replace<T: Ord + Clone>(
        slot: &mut BTreeSet<T>,
        next: Option<&BTreeSet<T>>,
    ) -> bool {
        let next = next.cloned().unwrap_or_default();
        if *slot == next {
            return false;
        }
        *slot = next;
        true
    }

    fn prune(&mut self, token: TokenId) {
        if self.applied.get(&token) == Some(&Applied::default()) {
            self.applied.remove(&token);
        }
    }
}

impl EffectStore for LocalEffectStore {
    fn replace_cover_types(
        &mut self,
        token: TokenId,
        types: Option<&CoverTypeSet>,
    ) -> Result<bool, EffectStoreError> {
        let applied = self.applied.entry(token).or_default();
        let changed = Self::replace(&mut applied.cover_types, types);
        self.prune(token);
        Ok(changed)
    }

    fn replace_local_effects(
        &mut self,
        token: TokenId,
        effects: Option<&CoverEffectSet>,
    ) -> Result<bool, EffectStoreError> {
        let applied = self.applied.entry(token).or_default();
        let changed = Self::replace(&mut applied.cover_effects, effects);
        self.prune(token);
        Ok(changed)
    }

    fn cover_types(&self, token: TokenId) -> CoverTypeSet {
        self.applied
            .get(&token)
            .map(|applied| applied.cover_types.clone())
            .unwrap_or_default()
    }

    fn cover_effects(&self, token: TokenId) -> CoverEffectSet {
        self.applied
            .get(&token)
            .map(|applied| applied.cover_effects.clone())
            .unwrap_or_default()
    }

    fn forget(&mut self, token: TokenId) {
        self.applied.remove(&token);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cover::CoverTypeId;

    #[test]
    fn replace_reports_only_real_changes() {
        let mut store = LocalEffectStore::new();
        let half = CoverTypeSet::from([CoverTypeId(1)]);

        assert_eq!(store.replace_cover_types(TokenId(1), Some(&half)), Ok(true));
        assert_eq!(store.replace_cover_types(TokenId(1), Some(&half)), Ok(false));
        assert_eq!(store.cover_types(TokenId(1)), half);

        assert_eq!(store.replace_cover_types(TokenId(1), None), Ok(true));
        assert_eq!(
            store.replace_cover_types(TokenId(1), Some(&CoverTypeSet::new())),
            Ok(false)
        );
        assert_eq!(store.tokens().count(), 0);
    }

    #[test]
    fn modes_are_tracked_independently() {
        let mut store = LocalEffectStore::new();
        let effects = CoverEffectSet::from([CoverEffectId(3)]);

        assert_eq!(store.replace_local_effects(TokenId(4), Some(&effects)), Ok(true));
        assert!(store.cover_types(TokenId(4)).is_empty());
        assert_eq!(store.cover_effects(TokenId(4)), effects);

        store.forget(TokenId(4));
        assert!(store.cover_effects(TokenId(4)).is_empty());
    }
}
