//! Per-token store of directional cover results.
//!
//! A [`CoverCache`] belongs to one defending token and is keyed by attacker.
//! It never decides freshness: callers purge entries when either side of a
//! pair moves.
use std::collections::HashMap;

use crate::cover::CoverRecord;
use crate::state::TokenId;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct CoverCache {
    entries: HashMap<TokenId, CoverRecord>,
}

impl CoverCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, attacker: TokenId) -> Option<&CoverRecord> {
        self.entries.get(&attacker)
    }

    pub fn put(&mut self, attacker: TokenId, record: CoverRecord) {
        self.entries.insert(attacker, record);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Drops the entry for one attacker, returning it if present.
    pub fn invalidate(&mut self, attacker: TokenId) -> Option<CoverRecord> {
        self.entries.remove(&attacker)
    }

    pub fn contains(&self, attacker: TokenId) -> bool {
        self.entries.contains_key(&attacker)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cover::{CoverTypeId, CoverTypeSet};

    #[test]
    fn invalidate_touches_only_one_attacker() {
        let mut cache = CoverCache::new();
        cache.put(TokenId(1), CoverRecord::none());
        cache.put(
            TokenId(2),
            CoverRecord::new(0.5, CoverTypeSet::from([CoverTypeId(1)])),
        );

        assert!(cache.invalidate(TokenId(1)).is_some());
        assert!(cache.invalidate(TokenId(1)).is_none());
        assert!(!cache.contains(TokenId(1)));
        assert_eq!(cache.get(TokenId(2)).map(|r| r.percent_cover), Some(0.5));

        cache.clear();
        assert!(cache.is_empty());
    }
}
