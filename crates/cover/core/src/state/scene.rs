use std::collections::BTreeMap;

use super::{Token, TokenId};
use crate::cache::CoverCache;

/// Cover bookkeeping attached to one placed token.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TokenCover {
    pub cache: CoverCache,
    /// Displayed cover types changed since the last redraw.
    pub redraw: bool,
}

/// A token placed on the active scene together with its cover bookkeeping.
#[derive(Clone, Debug, PartialEq)]
pub struct Placeable {
    pub token: Token,
    pub cover: TokenCover,
}

impl Placeable {
    pub fn new(token: Token) -> Self {
        Self {
            token,
            cover: TokenCover::default(),
        }
    }
}

/// Tokens on the active scene, iterated in id order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Scene {
    placeables: BTreeMap<TokenId, Placeable>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_tokens(tokens: impl IntoIterator<Item = Token>) -> Self {
        let mut scene = Self::new();
        for token in tokens {
            scene.insert(token);
        }
        scene
    }

    /// Places a token with an empty cache. A token with the same id is
    /// replaced and its cache dropped.
    pub fn insert(&mut self, token: Token) -> Option<Placeable> {
        self.placeables.insert(token.id, Placeable::new(token))
    }

    pub fn remove(&mut self, id: TokenId) -> Option<Placeable> {
        self.placeables.remove(&id)
    }

    pub fn contains(&self, id: TokenId) -> bool {
        self.placeables.contains_key(&id)
    }

    pub fn token(&self, id: TokenId) -> Option<&Token> {
        self.placeables.get(&id).map(|placeable| &placeable.token)
    }

    pub fn token_mut(&mut self, id: TokenId) -> Option<&mut Token> {
        self.placeables
            .get_mut(&id)
            .map(|placeable| &mut placeable.token)
    }

    pub fn cache(&self, id: TokenId) -> Option<&CoverCache> {
        self.placeables
            .get(&id)
            .map(|placeable| &placeable.cover.cache)
    }

    pub fn cache_mut(&mut self, id: TokenId) -> Option<&mut CoverCache> {
        self.placeables
            .get_mut(&id)
            .map(|placeable| &mut placeable.cover.cache)
    }

    pub fn ids(&self) -> impl Iterator<Item = TokenId> + '_ {
        self.placeables.keys().copied()
    }

    pub fn tokens(&self) -> impl Iterator<Item = &Token> {
        self.placeables.values().map(|placeable| &placeable.token)
    }

    pub fn len(&self) -> usize {
        self.placeables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.placeables.is_empty()
    }

    /// Drops cached results against `attacker` from every other token.
    pub fn purge_attacker(&mut self, attacker: TokenId) {
        for (id, placeable) in self.placeables.iter_mut() {
            if *id != attacker {
                placeable.cover.cache.invalidate(attacker);
            }
        }
    }

    pub fn clear_all_caches(&mut self) {
        for placeable in self.placeables.values_mut() {
            placeable.cover.cache.clear();
        }
    }

    pub fn mark_redraw(&mut self, id: TokenId) {
        if let Some(placeable) = self.placeables.get_mut(&id) {
            placeable.cover.redraw = true;
        }
    }

    /// Returns tokens flagged for redraw and resets their flags.
    pub fn take_redraws(&mut self) -> Vec<TokenId> {
        self.placeables
            .iter_mut()
            .filter(|(_, placeable)| placeable.cover.redraw)
            .map(|(id, placeable)| {
                placeable.cover.redraw = false;
                *id
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cover::CoverRecord;
    use crate::state::Position;

    fn scene() -> Scene {
        Scene::from_tokens((1..=3).map(|id| Token::new(TokenId(id), "", Position::ORIGIN)))
    }

    #[test]
    fn purge_leaves_own_cache_alone() {
        let mut scene = scene();
        for id in 1..=3 {
            let cache = scene.cache_mut(TokenId(id)).unwrap();
            cache.put(TokenId(1), CoverRecord::none());
            cache.put(TokenId(2), CoverRecord::none());
        }

        scene.purge_attacker(TokenId(1));

        assert!(scene.cache(TokenId(1)).unwrap().contains(TokenId(1)));
        assert!(!scene.cache(TokenId(2)).unwrap().contains(TokenId(1)));
        assert!(!scene.cache(TokenId(3)).unwrap().contains(TokenId(1)));
        assert!(scene.cache(TokenId(3)).unwrap().contains(TokenId(2)));
    }

    #[test]
    fn redraws_are_taken_once() {
        let mut scene = scene();
        scene.mark_redraw(TokenId(3));
        scene.mark_redraw(TokenId(1));
        scene.mark_redraw(TokenId(42));

        assert_eq!(scene.take_redraws(), vec![TokenId(1), TokenId(3)]);
        assert!(scene.take_redraws().is_empty());
    }
}
