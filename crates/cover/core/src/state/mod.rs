//! Session state for one acting client.
//!
//! [`CoverState`] replaces process-wide globals: the scene snapshot, the
//! combat tracker, both attacker sets and the dirty queue live here and are
//! handed to the orchestrator explicitly. Independent states never share
//! membership, so tests can run several side by side.
mod combat;
mod queue;
mod scene;
mod token;

pub use combat::{CombatState, Encounter, EncounterId};
pub use queue::DirtyQueue;
pub use scene::{Placeable, Scene, TokenCover};
pub use token::{CombatantId, Position, Token, TokenId};

use crate::policy::CoverMode;
use crate::registry::AttackerRegistry;

#[derive(Clone, Debug, Default)]
pub struct CoverState {
    pub scene: Scene,
    pub combat: CombatState,
    pub attackers: AttackerRegistry,
    pub pending: DirtyQueue,
}

impl CoverState {
    pub fn new(scene: Scene) -> Self {
        Self {
            scene,
            ..Self::default()
        }
    }

    pub fn from_tokens(tokens: impl IntoIterator<Item = Token>) -> Self {
        Self::new(Scene::from_tokens(tokens))
    }

    /// Queues every placed token for re-derivation in `mode`.
    pub fn mark_all_dirty(&mut self, mode: CoverMode) {
        self.pending.mark_all(self.scene.ids(), mode);
    }

    /// Queues every placed token except `skip` in `mode`.
    pub fn mark_others_dirty(&mut self, skip: TokenId, mode: CoverMode) {
        self.pending
            .mark_all(self.scene.ids().filter(|id| *id != skip), mode);
    }
}
