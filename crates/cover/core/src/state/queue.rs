use std::collections::BTreeSet;

use super::TokenId;
use crate::policy::CoverMode;

/// Ordered, de-duplicating set of `(token, mode)` pairs awaiting re-derivation.
///
/// Transitions only mark tokens; the cascade flush drains the queue once per
/// host event so each pair is recomputed at most once.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DirtyQueue {
    pending: BTreeSet<(TokenId, CoverMode)>,
}

impl DirtyQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false if the pair was already queued.
    pub fn mark(&mut self, token: TokenId, mode: CoverMode) -> bool {
        self.pending.insert((token, mode))
    }

    pub fn mark_all(&mut self, tokens: impl IntoIterator<Item = TokenId>, mode: CoverMode) {
        for token in tokens {
            self.pending.insert((token, mode));
        }
    }

    /// Drops every pending pair for a token.
    pub fn forget(&mut self, token: TokenId) {
        self.pending.retain(|(id, _)| *id != token);
    }

    pub fn contains(&self, token: TokenId, mode: CoverMode) -> bool {
        self.pending.contains(&(token, mode))
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Removes and returns all pending pairs in token order.
    pub fn drain(&mut self) -> Vec<(TokenId, CoverMode)> {
        std::mem::take(&mut self.pending).into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marks_are_deduplicated_and_ordered() {
        let mut queue = DirtyQueue::new();
        assert!(queue.mark(TokenId(2), CoverMode::CoverEffects));
        assert!(!queue.mark(TokenId(2), CoverMode::CoverEffects));
        queue.mark_all([TokenId(1), TokenId(2)], CoverMode::CoverTypes);

        assert_eq!(
            queue.drain(),
            vec![
                (TokenId(1), CoverMode::CoverTypes),
                (TokenId(2), CoverMode::CoverTypes),
                (TokenId(2), CoverMode::CoverEffects),
            ]
        );
        assert!(queue.is_empty());
    }

    #[test]
    fn forget_drops_both_modes() {
        let mut queue = DirtyQueue::new();
        queue.mark(TokenId(1), CoverMode::CoverTypes);
        queue.mark(TokenId(1), CoverMode::CoverEffects);
        queue.mark(TokenId(2), CoverMode::CoverTypes);

        queue.forget(TokenId(1));
        assert_eq!(queue.len(), 1);
        assert!(queue.contains(TokenId(2), CoverMode::CoverTypes));
    }
}
