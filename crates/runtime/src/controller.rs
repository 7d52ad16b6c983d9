//! Session controller binding the cover engine to runtime collaborators.
//!
//! [`CoverController`] owns the [`CoverState`] of one client together with
//! its settings, catalog, visibility oracle and persisted effect store. It
//! builds a [`CoverEnv`] per call, routes host events through
//! [`EventRouter`], and publishes what changed on the event bus.
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use cover_core::{
    CoverCatalog, CoverEffectSet, CoverEnv, CoverError, CoverMode, CoverOrchestrator,
    CoverRecord, CoverSettings, CoverState, CoverTypeSet, DispatchReport, EffectStore,
    EventRouter, HostEvent, SettingChange, TokenId, VisibilityOracle,
};

use crate::events::{CoverEvent, EventBus};
use crate::store::PersistedEffectStore;

/// Displayed cover of one token.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenCoverSnapshot {
    pub token: TokenId,
    pub cover_types: CoverTypeSet,
    pub cover_effects: CoverEffectSet,
}

/// Read-only view of a session for clients.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverSnapshot {
    pub tokens: Vec<TokenCoverSnapshot>,
    pub cover_type_attackers: Vec<TokenId>,
    pub cover_effect_attackers: Vec<TokenId>,
    pub in_combat: bool,
}

impl CoverSnapshot {
    pub fn token(&self, id: TokenId) -> Option<&TokenCoverSnapshot> {
        self.tokens.iter().find(|entry| entry.token == id)
    }

    pub fn attackers(&self, mode: CoverMode) -> &[TokenId] {
        match mode {
            CoverMode::CoverTypes => &self.cover_type_attackers,
            CoverMode::CoverEffects => &self.cover_effect_attackers,
        }
    }
}

pub struct CoverController {
    state: CoverState,
    settings: CoverSettings,
    catalog: Arc<CoverCatalog>,
    visibility: Arc<dyn VisibilityOracle>,
    store: PersistedEffectStore,
    events: EventBus,
}

impl CoverController {
    pub fn new(
        state: CoverState,
        settings: CoverSettings,
        catalog: Arc<CoverCatalog>,
        visibility: Arc<dyn VisibilityOracle>,
        store: PersistedEffectStore,
        events: EventBus,
    ) -> Self {
        Self {
            state,
            settings,
            catalog,
            visibility,
            store,
            events,
        }
    }

    pub fn state(&self) -> &CoverState {
        &self.state
    }

    pub fn settings(&self) -> &CoverSettings {
        &self.settings
    }

    pub fn store(&self) -> &PersistedEffectStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut PersistedEffectStore {
        &mut self.store
    }

    /// Routes one host event and publishes the resulting changes.
    pub fn dispatch(&mut self, event: HostEvent) -> DispatchReport {
        let mut env = CoverEnv::new(
            self.visibility.as_ref(),
            &self.settings,
            &self.catalog,
            &mut self.store,
        );
        let report = EventRouter::new(&mut self.state).dispatch(event, &mut env);
        self.publish(&report);
        report
    }

    /// Writes a setting and, if its value changed, replays it as a
    /// [`HostEvent::SettingsChanged`].
    pub fn update_setting(&mut self, change: SettingChange) -> DispatchReport {
        if !self.settings.apply(change) {
            debug!(key = ?change.key(), "setting unchanged");
            return DispatchReport::default();
        }
        self.dispatch(HostEvent::SettingsChanged { key: change.key() })
    }

    /// Cover of `defender` against one attacker, for attack resolution.
    pub fn cover_from(
        &mut self,
        defender: TokenId,
        attacker: TokenId,
    ) -> Result<CoverRecord, CoverError> {
        let env = CoverEnv::new(
            self.visibility.as_ref(),
            &self.settings,
            &self.catalog,
            &mut self.store,
        );
        CoverOrchestrator::new(&mut self.state).cover_from_attacker(defender, attacker, &env)
    }

    pub fn snapshot(&self) -> CoverSnapshot {
        let attackers = |mode: CoverMode| -> Vec<TokenId> {
            self.state.attackers.members(mode).iter().copied().collect()
        };
        CoverSnapshot {
            tokens: self
                .state
                .scene
                .ids()
                .map(|token| TokenCoverSnapshot {
                    token,
                    cover_types: self.store.cover_types(token),
                    cover_effects: self.store.cover_effects(token),
                })
                .collect(),
            cover_type_attackers: attackers(CoverMode::CoverTypes),
            cover_effect_attackers: attackers(CoverMode::CoverEffects),
            in_combat: self.state.combat.is_active(),
        }
    }

    fn publish(&self, report: &DispatchReport) {
        for mode in &report.attackers_changed {
            self.events.publish(CoverEvent::AttackersChanged {
                mode: *mode,
                attackers: self.state.attackers.members(*mode).iter().copied().collect(),
            });
        }
        for (token, mode) in &report.changed {
            let event = match mode {
                CoverMode::CoverTypes => CoverEvent::CoverTypesChanged {
                    token: *token,
                    cover_types: self.store.cover_types(*token),
                },
                CoverMode::CoverEffects => CoverEvent::CoverEffectsChanged {
                    token: *token,
                    cover_effects: self.store.cover_effects(*token),
                },
            };
            self.events.publish(event);
        }
        for failure in &report.failures {
            self.events.publish(CoverEvent::RecomputeFailed {
                token: failure.token,
                mode: failure.mode,
                error: failure.error.to_string(),
            });
        }
    }
}
