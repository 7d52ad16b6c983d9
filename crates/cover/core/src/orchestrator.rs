//! Per-token cover decisions and the recompute cascade.
//!
//! [`CoverOrchestrator`] is the only writer of [`CoverState`]. Transitions
//! (`token_moved`, `add_attacker`, ...) update caches and membership
//! immediately and queue affected `(token, mode)` pairs; [`CoverOrchestrator::flush`]
//! then re-derives every queued pair exactly once. A failure on one token is
//! recorded and logged, and the rest of the cascade still runs.
use std::collections::BTreeSet;

use tracing::{debug, error, trace, warn};

use crate::cover::{CoverRecord, CoverTypeSet, least_cover};
use crate::env::CoverEnv;
use crate::error::CoverError;
use crate::policy::CoverMode;
use crate::registry::AttackerRegistry;
use crate::state::{CoverState, Token, TokenId};

/// A token whose recompute failed during a cascade.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecomputeFailure {
    pub token: TokenId,
    pub mode: CoverMode,
    pub error: CoverError,
}

/// Outcome of draining the dirty queue.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CascadeReport {
    /// Pairs whose displayed cover changed, in token order.
    pub changed: Vec<(TokenId, CoverMode)>,
    pub failures: Vec<RecomputeFailure>,
}

impl CascadeReport {
    pub fn is_empty(&self) -> bool {
        self.changed.is_empty() && self.failures.is_empty()
    }
}

pub struct CoverOrchestrator<'a> {
    state: &'a mut CoverState,
}

impl<'a> CoverOrchestrator<'a> {
    pub fn new(state: &'a mut CoverState) -> Self {
        Self { state }
    }

    pub fn state(&self) -> &CoverState {
        self.state
    }

    fn token(&self, id: TokenId) -> Result<&Token, CoverError> {
        self.state
            .scene
            .token(id)
            .ok_or(CoverError::UnknownToken(id))
    }

    // ------------------------------------------------------------------
    // Classification
    // ------------------------------------------------------------------

    /// Evaluates the mode's policy against the token right now.
    pub fn is_attacker(&self, token: TokenId, mode: CoverMode, env: &CoverEnv<'_>) -> bool {
        let Some(token) = self.state.scene.token(token) else {
            return false;
        };
        AttackerRegistry::is_attacker(token, env.settings().use_policy(mode), &self.state.combat)
    }

    /// Whether cover may be displayed or applied on `token` for `mode`.
    ///
    /// Registered attackers (forced or not) never show cover.
    pub fn should_show_cover(&self, token: TokenId, mode: CoverMode, env: &CoverEnv<'_>) -> bool {
        let Some(snapshot) = self.state.scene.token(token) else {
            return false;
        };
        if mode == CoverMode::CoverTypes && !snapshot.visible {
            return false;
        }
        if self.state.attackers.contains(mode, token) || self.is_attacker(token, mode, env) {
            return false;
        }
        let settings = env.settings();
        if settings.targets_only(mode) && !snapshot.targeted {
            return false;
        }
        let inputs = AttackerRegistry::policy_inputs(snapshot, &self.state.combat);
        settings.use_policy(mode).rule().shows_cover(&inputs)
    }

    /// Cover of `defender` against a single attacker, served from the
    /// defender's cache when possible.
    pub fn cover_from_attacker(
        &mut self,
        defender: TokenId,
        attacker: TokenId,
        env: &CoverEnv<'_>,
    ) -> Result<CoverRecord, CoverError> {
        if defender == attacker {
            return Ok(CoverRecord::none());
        }
        if let Some(record) = self
            .state
            .scene
            .cache(defender)
            .and_then(|cache| cache.get(attacker))
        {
            return Ok(record.clone());
        }

        let defender_token = self.token(defender)?;
        let attacker_token = self.token(attacker)?;
        let visibility = env.visibility();
        let record = CoverRecord::new(
            visibility.percent_cover(attacker_token, defender_token),
            visibility.cover_types(attacker_token, defender_token),
        );
        trace!(
            target: "cover::orchestrator",
            defender = %defender,
            attacker = %attacker,
            percent = record.percent_cover,
            "queried cover"
        );

        if let Some(cache) = self.state.scene.cache_mut(defender) {
            cache.put(attacker, record.clone());
        }
        Ok(record)
    }

    /// Combined classification of `defender` under least-cover-wins.
    ///
    /// The defender itself is skipped; no attackers means no cover.
    pub fn minimum_cover_from_attackers(
        &mut self,
        defender: TokenId,
        attackers: impl IntoIterator<Item = TokenId>,
        env: &CoverEnv<'_>,
    ) -> Result<CoverTypeSet, CoverError> {
        let mut records = Vec::new();
        for attacker in attackers {
            if attacker == defender {
                continue;
            }
            records.push(self.cover_from_attacker(defender, attacker, env)?);
        }
        Ok(least_cover(&records, env.catalog()))
    }

    fn current_classification(
        &mut self,
        token: TokenId,
        mode: CoverMode,
        env: &CoverEnv<'_>,
    ) -> Result<CoverTypeSet, CoverError> {
        let attackers: BTreeSet<TokenId> = self.state.attackers.members(mode).clone();
        self.minimum_cover_from_attackers(token, attackers, env)
    }

    // ------------------------------------------------------------------
    // Display
    // ------------------------------------------------------------------

    /// Re-derives the displayed cover types of a token.
    ///
    /// Returns whether the displayed set changed; a change flags the token
    /// for redraw.
    pub fn recompute_cover_types(
        &mut self,
        token: TokenId,
        env: &mut CoverEnv<'_>,
    ) -> Result<bool, CoverError> {
        self.token(token)?;
        if !self.should_show_cover(token, CoverMode::CoverTypes, env) {
            return self.clear_cover_types(token, env);
        }

        let types = self.current_classification(token, CoverMode::CoverTypes, env)?;
        let changed = env
            .effects_mut()
            .replace_cover_types(token, Some(&types))
            .map_err(|source| CoverError::EffectStore { token, source })?;
        if changed {
            self.state.scene.mark_redraw(token);
            debug!(
                target: "cover::orchestrator",
                token = %token,
                types = ?types,
                "cover types changed"
            );
        }
        Ok(changed)
    }

    /// Re-derives the cover effects applied to a token's actor.
    pub fn recompute_cover_effects(
        &mut self,
        token: TokenId,
        env: &mut CoverEnv<'_>,
    ) -> Result<bool, CoverError> {
        self.token(token)?;
        if !self.should_show_cover(token, CoverMode::CoverEffects, env) {
            return self.clear_cover_effects(token, env);
        }

        let types = self.current_classification(token, CoverMode::CoverEffects, env)?;
        let effects = env.catalog().effects_for(&types);
        let changed = env
            .effects_mut()
            .replace_local_effects(token, Some(&effects))
            .map_err(|source| CoverError::EffectStore { token, source })?;
        if changed {
            debug!(
                target: "cover::orchestrator",
                token = %token,
                effects = ?effects,
                "cover effects changed"
            );
        }
        Ok(changed)
    }

    pub fn recompute(
        &mut self,
        token: TokenId,
        mode: CoverMode,
        env: &mut CoverEnv<'_>,
    ) -> Result<bool, CoverError> {
        match mode {
            CoverMode::CoverTypes => self.recompute_cover_types(token, env),
            CoverMode::CoverEffects => self.recompute_cover_effects(token, env),
        }
    }

    pub fn clear_cover_types(
        &mut self,
        token: TokenId,
        env: &mut CoverEnv<'_>,
    ) -> Result<bool, CoverError> {
        let changed = env
            .effects_mut()
            .replace_cover_types(token, None)
            .map_err(|source| CoverError::EffectStore { token, source })?;
        if changed {
            self.state.scene.mark_redraw(token);
        }
        Ok(changed)
    }

    pub fn clear_cover_effects(
        &mut self,
        token: TokenId,
        env: &mut CoverEnv<'_>,
    ) -> Result<bool, CoverError> {
        env.effects_mut()
            .replace_local_effects(token, None)
            .map_err(|source| CoverError::EffectStore { token, source })
    }

    pub fn clear(
        &mut self,
        token: TokenId,
        mode: CoverMode,
        env: &mut CoverEnv<'_>,
    ) -> Result<bool, CoverError> {
        match mode {
            CoverMode::CoverTypes => self.clear_cover_types(token, env),
            CoverMode::CoverEffects => self.clear_cover_effects(token, env),
        }
    }

    // ------------------------------------------------------------------
    // Transitions
    // ------------------------------------------------------------------

    /// An attacker shows no cover; everyone else re-derives.
    pub fn attackers_changed(
        &mut self,
        token: TokenId,
        mode: CoverMode,
        env: &mut CoverEnv<'_>,
    ) -> Result<bool, CoverError> {
        if self.state.attackers.contains(mode, token) {
            self.clear(token, mode, env)
        } else {
            self.recompute(token, mode, env)
        }
    }

    /// Invalidates every cached pair involving `token` and queues the
    /// tokens whose display depends on its position.
    pub fn token_moved(&mut self, token: TokenId) {
        if let Some(cache) = self.state.scene.cache_mut(token) {
            cache.clear();
        }
        self.state.scene.purge_attacker(token);

        for mode in CoverMode::ALL {
            self.state.pending.mark(token, mode);
        }
        let modes: Vec<CoverMode> = self.state.attackers.modes_of(token).collect();
        for mode in modes {
            self.state.mark_others_dirty(token, mode);
        }
    }

    /// Queues the token for modes evaluated on targeted tokens only.
    pub fn target_status_changed(&mut self, token: TokenId, env: &CoverEnv<'_>) {
        for mode in CoverMode::ALL {
            if env.settings().targets_only(mode) {
                self.state.pending.mark(token, mode);
            }
        }
    }

    /// Registers an attacker. Without `force` the policy must agree.
    ///
    /// Returns false if nothing changed.
    pub fn add_attacker(
        &mut self,
        token: TokenId,
        mode: CoverMode,
        force: bool,
        env: &CoverEnv<'_>,
    ) -> bool {
        if self.state.attackers.contains(mode, token) || !self.state.scene.contains(token) {
            return false;
        }
        if !force && !self.is_attacker(token, mode, env) {
            return false;
        }
        self.state.attackers.insert(mode, token);
        debug!(target: "cover::orchestrator", token = %token, mode = %mode, force, "attacker added");
        self.state.mark_all_dirty(mode);
        true
    }

    pub fn remove_attacker(&mut self, token: TokenId, mode: CoverMode) -> bool {
        if !self.state.attackers.remove(mode, token) {
            return false;
        }
        debug!(target: "cover::orchestrator", token = %token, mode = %mode, "attacker removed");
        self.state.mark_all_dirty(mode);
        true
    }

    /// Adds or removes the token so membership matches the current policy.
    pub fn sync_attacker(&mut self, token: TokenId, mode: CoverMode, env: &CoverEnv<'_>) -> bool {
        if self.is_attacker(token, mode, env) {
            self.add_attacker(token, mode, true, env)
        } else {
            self.remove_attacker(token, mode)
        }
    }

    /// Rebuilds the attacker set of `mode` from every placed token.
    ///
    /// On any change all tokens are queued once, however many memberships
    /// moved.
    pub fn recompute_attackers(&mut self, mode: CoverMode, env: &CoverEnv<'_>) -> bool {
        let policy = env.settings().use_policy(mode);
        let next: BTreeSet<TokenId> = self
            .state
            .scene
            .tokens()
            .filter(|token| AttackerRegistry::is_attacker(token, policy, &self.state.combat))
            .map(|token| token.id)
            .collect();

        let diff = self.state.attackers.replace(mode, next);
        if diff.is_empty() {
            return false;
        }
        debug!(
            target: "cover::orchestrator",
            mode = %mode,
            policy = %policy,
            changed = diff.len(),
            "attacker set rebuilt"
        );
        self.state.mark_all_dirty(mode);
        true
    }

    pub fn mark_dirty(&mut self, token: TokenId, mode: CoverMode) {
        self.state.pending.mark(token, mode);
    }

    pub fn mark_all_dirty(&mut self, mode: CoverMode) {
        self.state.mark_all_dirty(mode);
    }

    /// Drops every cached pair on the scene.
    pub fn reset_all_caches(&mut self) {
        self.state.scene.clear_all_caches();
    }

    /// Tokens whose displayed cover types changed since the last call.
    pub fn take_redraws(&mut self) -> Vec<TokenId> {
        self.state.scene.take_redraws()
    }

    /// Re-derives every queued pair once, isolating failures per token.
    pub fn flush(&mut self, env: &mut CoverEnv<'_>) -> CascadeReport {
        let mut report = CascadeReport::default();
        for (token, mode) in self.state.pending.drain() {
            if !self.state.scene.contains(token) {
                continue;
            }
            match self.attackers_changed(token, mode, env) {
                Ok(true) => report.changed.push((token, mode)),
                Ok(false) => {}
                Err(err) => {
                    if err.severity().is_recoverable() {
                        warn!(
                            target: "cover::orchestrator",
                            token = %token,
                            mode = %mode,
                            severity = err.severity().as_str(),
                            error = %err,
                            "cover recompute skipped"
                        );
                    } else {
                        error!(
                            target: "cover::orchestrator",
                            token = %token,
                            mode = %mode,
                            severity = err.severity().as_str(),
                            error = %err,
                            "cover recompute failed"
                        );
                    }
                    report.failures.push(RecomputeFailure {
                        token,
                        mode,
                        error: err,
                    });
                }
            }
        }
        report
    }
}
