//! Traits describing the collaborators cover tracking depends on.
//!
//! Oracles answer visibility and settings queries; the effect store applies
//! results. The [`CoverEnv`] aggregate bundles them with the cover catalog so
//! orchestrator calls never reach for concrete implementations.
mod effects;
mod settings;
mod visibility;

pub use effects::{EffectStore, EffectStoreError, LocalEffectStore};
pub use settings::SettingsOracle;
pub use visibility::VisibilityOracle;

use crate::cover::CoverCatalog;

/// Collaborators required by the orchestrator and the event router.
pub struct CoverEnv<'a> {
    visibility: &'a dyn VisibilityOracle,
    settings: &'a dyn SettingsOracle,
    catalog: &'a CoverCatalog,
    effects: &'a mut dyn EffectStore,
}

impl<'a> CoverEnv<'a> {
    pub fn new(
        visibility: &'a dyn VisibilityOracle,
        settings: &'a dyn SettingsOracle,
        catalog: &'a CoverCatalog,
        effects: &'a mut dyn EffectStore,
    ) -> Self {
        Self {
            visibility,
            settings,
            catalog,
            effects,
        }
    }

    pub fn visibility(&self) -> &'a dyn VisibilityOracle {
        self.visibility
    }

    pub fn settings(&self) -> &'a dyn SettingsOracle {
        self.settings
    }

    pub fn catalog(&self) -> &'a CoverCatalog {
        self.catalog
    }

    pub fn effects(&self) -> &dyn EffectStore {
        &*self.effects
    }

    pub fn effects_mut(&mut self) -> &mut dyn EffectStore {
        &mut *self.effects
    }
}

impl std::fmt::Debug for CoverEnv<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoverEnv")
            .field("catalog", self.catalog)
            .finish_non_exhaustive()
    }
}
