//! Cover tracking logic shared across clients.
//!
//! `cover-core` decides which tokens count as attackers, caches directional
//! cover results per defending token, and keeps displayed cover types and
//! cover effects consistent as host events arrive. All session state lives in
//! [`state::CoverState`]; every mutation flows through
//! [`orchestrator::CoverOrchestrator`] or [`router::EventRouter`], which read
//! external collaborators through [`env::CoverEnv`].
pub mod cache;
pub mod config;
pub mod cover;
pub mod env;
pub mod error;
pub mod event;
pub mod orchestrator;
pub mod policy;
pub mod registry;
pub mod router;
pub mod state;

#[cfg(test)]
pub(crate) mod test_support;

pub use cache::CoverCache;
pub use config::{CoverSettings, ModeSettings, SettingChange, SettingField, SettingKey};
pub use cover::{
    CoverCatalog, CoverEffect, CoverEffectId, CoverEffectSet, CoverRecord, CoverType,
    CoverTypeId, CoverTypeSet,
};
pub use env::{
    CoverEnv, EffectStore, EffectStoreError, LocalEffectStore, SettingsOracle, VisibilityOracle,
};
pub use error::{CoverError, ErrorSeverity};
pub use event::HostEvent;
pub use orchestrator::{CascadeReport, CoverOrchestrator, RecomputeFailure};
pub use policy::{CoverMode, PolicyInputs, PolicyRule, UsePolicy};
pub use registry::AttackerRegistry;
pub use router::{DispatchReport, EventRouter};
pub use state::{
    CombatState, CombatantId, CoverState, DirtyQueue, Encounter, EncounterId, Placeable,
    Position, Scene, Token, TokenCover, TokenId,
};
