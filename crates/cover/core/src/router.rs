//! Binds host events to registry and orchestrator calls.
//!
//! Every [`HostEvent`] is handled in three steps: update the snapshot (token
//! fields, combat tracker, scene), run the matching transition, then drain
//! the dirty queue once. Dispatch never fails; per-token errors come back in
//! the [`DispatchReport`].
use tracing::debug;

use crate::env::CoverEnv;
use crate::event::HostEvent;
use crate::orchestrator::{CoverOrchestrator, RecomputeFailure};
use crate::policy::CoverMode;
use crate::state::{CoverState, DirtyQueue, Scene, TokenId};

/// What a single host event changed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DispatchReport {
    /// Pairs whose displayed cover changed.
    pub changed: Vec<(TokenId, CoverMode)>,
    /// Modes whose attacker set changed.
    pub attackers_changed: Vec<CoverMode>,
    /// Tokens whose cover-type markers need redrawing.
    pub redraws: Vec<TokenId>,
    pub failures: Vec<RecomputeFailure>,
}

impl DispatchReport {
    pub fn is_empty(&self) -> bool {
        self.changed.is_empty() && self.attackers_changed.is_empty() && self.failures.is_empty()
    }

    fn note_attackers_changed(&mut self, mode: CoverMode) {
        if !self.attackers_changed.contains(&mode) {
            self.attackers_changed.push(mode);
        }
    }
}

pub struct EventRouter<'a> {
    state: &'a mut CoverState,
}

impl<'a> EventRouter<'a> {
    pub fn new(state: &'a mut CoverState) -> Self {
        Self { state }
    }

    pub fn dispatch(&mut self, event: HostEvent, env: &mut CoverEnv<'_>) -> DispatchReport {
        debug!(target: "cover::router", event = %event, "dispatching host event");
        let mut report = DispatchReport::default();

        match event {
            HostEvent::TokenCreated { token } => {
                let id = token.id;
                let replaced = self.state.scene.insert(token).is_some();
                let mut orchestrator = CoverOrchestrator::new(self.state);
                if replaced {
                    // Cached pairs were measured against the old placement.
                    orchestrator.token_moved(id);
                }
                for mode in CoverMode::ALL {
                    if orchestrator.sync_attacker(id, mode, env) {
                        report.note_attackers_changed(mode);
                    }
                    orchestrator.mark_dirty(id, mode);
                }
            }
            HostEvent::TokenRemoved { token } => self.remove_token(token, env, &mut report),
            HostEvent::TokenMoved { token, position } => {
                let Some(snapshot) = self.state.scene.token_mut(token) else {
                    debug!(target: "cover::router", token = %token, "move for unknown token ignored");
                    return report;
                };
                snapshot.position = position;
                CoverOrchestrator::new(self.state).token_moved(token);
            }
            HostEvent::TokenControlChanged { token, controlled } => {
                let Some(snapshot) = self.state.scene.token_mut(token) else {
                    return report;
                };
                snapshot.controlled = controlled;
                let mut orchestrator = CoverOrchestrator::new(self.state);
                for mode in CoverMode::ALL {
                    if orchestrator.sync_attacker(token, mode, env) {
                        report.note_attackers_changed(mode);
                    }
                }
            }
            HostEvent::TokenTargetChanged { token, targeted } => {
                let Some(snapshot) = self.state.scene.token_mut(token) else {
                    return report;
                };
                snapshot.targeted = targeted;
                CoverOrchestrator::new(self.state).target_status_changed(token, env);
            }
            HostEvent::TokenVisibilityChanged { token, visible } => {
                let Some(snapshot) = self.state.scene.token_mut(token) else {
                    return report;
                };
                snapshot.visible = visible;
                self.state.pending.mark(token, CoverMode::CoverTypes);
            }
            HostEvent::CombatStarted { encounter } => {
                self.state.combat.start(encounter);
                for mode in CoverMode::ALL {
                    if env.settings().use_policy(mode).depends_on_combat() {
                        self.full_recompute(mode, env, &mut report);
                    }
                }
            }
            HostEvent::CombatTurnChanged {
                encounter,
                round,
                turn,
            } => {
                if !self.state.combat.set_turn(encounter, round, turn) {
                    debug!(
                        target: "cover::router",
                        encounter = encounter.0,
                        "turn change for unknown encounter"
                    );
                }
                for mode in CoverMode::ALL {
                    if env.settings().use_policy(mode).depends_on_turn() {
                        self.full_recompute(mode, env, &mut report);
                    }
                }
            }
            HostEvent::CombatEnded { encounter } => {
                let viewed = self.state.combat.viewed();
                self.state.combat.end(encounter);
                let none_left = !self.state.combat.is_active();
                let view_changed = viewed != self.state.combat.viewed();
                for mode in CoverMode::ALL {
                    if !env.settings().use_policy(mode).depends_on_combat() {
                        continue;
                    }
                    if none_left || view_changed {
                        self.full_recompute(mode, env, &mut report);
                    } else if CoverOrchestrator::new(self.state).recompute_attackers(mode, env) {
                        report.note_attackers_changed(mode);
                    }
                }
            }
            HostEvent::SettingsChanged { key } => {
                CoverOrchestrator::new(self.state).reset_all_caches();
                self.full_recompute(key.mode, env, &mut report);
            }
            HostEvent::SceneLoaded { tokens } => {
                let previous = std::mem::replace(&mut self.state.scene, Scene::from_tokens(tokens));
                for id in previous.ids().filter(|id| !self.state.scene.contains(*id)) {
                    env.visibility().destroy(id);
                    env.effects_mut().forget(id);
                }
                self.state.pending = DirtyQueue::new();
                for mode in CoverMode::ALL {
                    self.full_recompute(mode, env, &mut report);
                }
            }
        }

        let mut orchestrator = CoverOrchestrator::new(self.state);
        let cascade = orchestrator.flush(env);
        report.changed = cascade.changed;
        report.failures = cascade.failures;
        report.redraws = orchestrator.take_redraws();
        report
    }

    /// Rebuilds the attacker set and re-derives every token in `mode`.
    fn full_recompute(
        &mut self,
        mode: CoverMode,
        env: &CoverEnv<'_>,
        report: &mut DispatchReport,
    ) {
        let mut orchestrator = CoverOrchestrator::new(self.state);
        if orchestrator.recompute_attackers(mode, env) {
            report.note_attackers_changed(mode);
        }
        orchestrator.mark_all_dirty(mode);
    }

    fn remove_token(&mut self, token: TokenId, env: &mut CoverEnv<'_>, report: &mut DispatchReport) {
        if self.state.scene.remove(token).is_none() {
            debug!(target: "cover::router", token = %token, "removal of unknown token ignored");
            return;
        }
        self.state.pending.forget(token);
        self.state.scene.purge_attacker(token);
        for mode in self.state.attackers.remove_everywhere(token) {
            report.note_attackers_changed(mode);
            self.state.mark_all_dirty(mode);
        }
        env.visibility().destroy(token);
        env.effects_mut().forget(token);
    }
}
