//! Shared fixtures for unit tests.
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::config::CoverSettings;
use crate::cover::{
    CoverCatalog, CoverEffect, CoverEffectId, CoverEffectSet, CoverType, CoverTypeId,
    CoverTypeSet,
};
use crate::env::{CoverEnv, EffectStore, EffectStoreError, LocalEffectStore, VisibilityOracle};
use crate::state::{CoverState, Token, TokenId};

pub const HALF: CoverTypeId = CoverTypeId(1);
pub const FULL: CoverTypeId = CoverTypeId(2);
pub const HALF_EFFECT: CoverEffectId = CoverEffectId(1);
pub const FULL_EFFECT: CoverEffectId = CoverEffectId(2);

pub fn catalog() -> CoverCatalog {
    CoverCatalog::new(
        vec![
            CoverType::new(HALF, "half", 0.5),
            CoverType::new(FULL, "full", 1.0),
        ],
        vec![
            CoverEffect::new(HALF_EFFECT, "half cover", [HALF]),
            CoverEffect::new(FULL_EFFECT, "full cover", [FULL]),
        ],
    )
}

/// Visibility backed by a `(attacker, defender) -> percent` table.
///
/// Unlisted pairs have a clear line.
#[derive(Debug, Default)]
pub struct TableVisibility {
    percents: HashMap<(TokenId, TokenId), f32>,
    catalog: CoverCatalog,
    queries: AtomicUsize,
    destroyed: std::sync::Mutex<Vec<TokenId>>,
}

impl TableVisibility {
    pub fn new(catalog: CoverCatalog) -> Self {
        Self {
            catalog,
            ..Self::default()
        }
    }

    pub fn set(&mut self, attacker: TokenId, defender: TokenId, percent: f32) {
        self.percents.insert((attacker, defender), percent);
    }

    pub fn queries(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    pub fn destroyed(&self) -> Vec<TokenId> {
        self.destroyed.lock().unwrap().clone()
    }

    fn lookup(&self, attacker: &Token, defender: &Token) -> f32 {
        self.percents
            .get(&(attacker.id, defender.id))
            .copied()
            .unwrap_or(0.0)
    }
}

impl VisibilityOracle for TableVisibility {
    fn percent_cover(&self, attacker: &Token, defender: &Token) -> f32 {
        self.queries.fetch_add(1, Ordering::SeqCst);
        self.lookup(attacker, defender)
    }

    fn cover_types(&self, attacker: &Token, defender: &Token) -> CoverTypeSet {
        self.catalog.classify(self.lookup(attacker, defender))
    }

    fn destroy(&self, token: TokenId) {
        self.destroyed.lock().unwrap().push(token);
    }
}

/// Local store that rejects writes for selected tokens.
#[derive(Debug, Default)]
pub struct TestEffects {
    inner: LocalEffectStore,
    failing: HashSet<TokenId>,
}

impl TestEffects {
    pub fn fail_for(&mut self, token: TokenId) {
        self.failing.insert(token);
    }

    pub fn cover_types_of(&self, token: TokenId) -> CoverTypeSet {
        self.inner.cover_types(token)
    }

    pub fn cover_effects_of(&self, token: TokenId) -> CoverEffectSet {
        self.inner.cover_effects(token)
    }

    fn check(&self, token: TokenId) -> Result<(), EffectStoreError> {
        if self.failing.contains(&token) {
            Err(EffectStoreError::Unavailable(format!("writes to {token} rejected")))
        } else {
            Ok(())
        }
    }
}

impl EffectStore for TestEffects {
    fn replace_cover_types(
        &mut self,
        token: TokenId,
        types: Option<&CoverTypeSet>,
    ) -> Result<bool, EffectStoreError> {
        self.check(token)?;
        self.inner.replace_cover_types(token, types)
    }

    fn replace_local_effects(
        &mut self,
        token: TokenId,
        effects: Option<&CoverEffectSet>,
    ) -> Result<bool, EffectStoreError> {
        self.check(token)?;
        self.inner.replace_local_effects(token, effects)
    }

    fn cover_types(&self, token: TokenId) -> CoverTypeSet {
        self.inner.cover_types(token)
    }

    fn cover_effects(&self, token: TokenId) -> CoverEffectSet {
        self.inner.cover_effects(token)
    }

    fn forget(&mut self, token: TokenId) {
        self.inner.forget(token);
    }
}

/// Session state plus every collaborator, split on demand into a
/// `(state, env)` pair.
#[derive(Debug)]
pub struct Fixture {
    pub state: CoverState,
    pub settings: CoverSettings,
    pub catalog: CoverCatalog,
    pub visibility: TableVisibility,
    pub effects: TestEffects,
}

impl Fixture {
    pub fn new(settings: CoverSettings, tokens: Vec<Token>) -> Self {
        let catalog = catalog();
        Self {
            state: CoverState::from_tokens(tokens),
            settings,
            visibility: TableVisibility::new(catalog.clone()),
            catalog,
            effects: TestEffects::default(),
        }
    }

    pub fn split(&mut self) -> (&mut CoverState, CoverEnv<'_>) {
        (
            &mut self.state,
            CoverEnv::new(
                &self.visibility,
                &self.settings,
                &self.catalog,
                &mut self.effects,
            ),
        )
    }
}
