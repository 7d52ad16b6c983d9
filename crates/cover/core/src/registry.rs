//! Attacker sets and the classification that fills them.
//!
//! The registry only stores membership. Deciding who belongs is a pure
//! function of the token, the combat tracker and the mode's [`UsePolicy`];
//! the orchestrator re-derives membership whenever any of them changes.
use std::collections::BTreeSet;

use crate::policy::{CoverMode, PolicyInputs, UsePolicy};
use crate::state::{CombatState, Token, TokenId};

/// One attacker set per [`CoverMode`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AttackerRegistry {
    cover_types: BTreeSet<TokenId>,
    cover_effects: BTreeSet<TokenId>,
}

impl AttackerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the policy inputs for a token from the current combat state.
    pub fn policy_inputs(token: &Token, combat: &CombatState) -> PolicyInputs {
        PolicyInputs {
            controlled: token.controlled,
            combat_active: combat.is_active(),
            active_combatant: combat.is_active_combatant(token),
            participant: combat.is_participant(token),
        }
    }

    /// Returns true if `token` classifies as an attacker under `policy`.
    pub fn is_attacker(token: &Token, policy: UsePolicy, combat: &CombatState) -> bool {
        policy
            .rule()
            .is_attacker(&Self::policy_inputs(token, combat))
    }

    pub fn members(&self, mode: CoverMode) -> &BTreeSet<TokenId> {
        match mode {
            CoverMode::CoverTypes => &self.cover_types,
            CoverMode::CoverEffects => &self.cover_effects,
        }
    }

    fn members_mut(&mut self, mode: CoverMode) -> &mut BTreeSet<TokenId> {
        match mode {
            CoverMode::CoverTypes => &mut self.cover_types,
            CoverMode::CoverEffects => &mut self.cover_effects,
        }
    }

    pub fn contains(&self, mode: CoverMode, token: TokenId) -> bool {
        self.members(mode).contains(&token)
    }

    /// Returns false if the token was already a member.
    pub fn insert(&mut self, mode: CoverMode, token: TokenId) -> bool {
        self.members_mut(mode).insert(token)
    }

    /// Returns false if the token was not a member.
    pub fn remove(&mut self, mode: CoverMode, token: TokenId) -> bool {
        self.members_mut(mode).remove(&token)
    }

    /// Replaces the membership of `mode` and returns the symmetric difference.
    pub fn replace(&mut self, mode: CoverMode, next: BTreeSet<TokenId>) -> BTreeSet<TokenId> {
        let members = self.members_mut(mode);
        let diff = members.symmetric_difference(&next).copied().collect();
        *members = next;
        diff
    }

    /// Removes a token from every set and returns the modes it was a member of.
    pub fn remove_everywhere(&mut self, token: TokenId) -> Vec<CoverMode> {
        CoverMode::ALL
            .into_iter()
            .filter(|mode| self.remove(*mode, token))
            .collect()
    }

    /// Modes in which the token is currently registered.
    pub fn modes_of(&self, token: TokenId) -> impl Iterator<Item = CoverMode> + '_ {
        CoverMode::ALL
            .into_iter()
            .filter(move |mode| self.contains(*mode, token))
    }

    pub fn len(&self, mode: CoverMode) -> usize {
        self.members(mode).len()
    }

    pub fn is_empty(&self, mode: CoverMode) -> bool {
        self.members(mode).is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{CombatantId, Encounter, EncounterId, Position};

    fn token(id: u32) -> Token {
        Token::new(TokenId(id), "", Position::ORIGIN).with_combatant(CombatantId(id))
    }

    #[test]
    fn combat_policy_waits_for_combat() {
        let controlled = token(1).controlled();
        let mut combat = CombatState::new();
        assert!(!AttackerRegistry::is_attacker(
            &controlled,
            UsePolicy::Combat,
            &combat
        ));

        combat.start(Encounter::new(EncounterId(1), vec![CombatantId(1)]));
        assert!(AttackerRegistry::is_attacker(
            &controlled,
            UsePolicy::Combat,
            &combat
        ));
    }

    #[test]
    fn active_combatant_is_attacker_without_control() {
        let mut combat = CombatState::new();
        combat.start(Encounter::new(
            EncounterId(1),
            vec![CombatantId(2), CombatantId(1)],
        ));
        assert!(AttackerRegistry::is_attacker(
            &token(2),
            UsePolicy::Combatant,
            &combat
        ));
        assert!(!AttackerRegistry::is_attacker(
            &token(1).controlled(),
            UsePolicy::Combatant,
            &combat
        ));
    }

    #[test]
    fn replace_returns_changed_members() {
        let mut registry = AttackerRegistry::new();
        registry.insert(CoverMode::CoverTypes, TokenId(1));
        registry.insert(CoverMode::CoverTypes, TokenId(2));

        let diff = registry.replace(
            CoverMode::CoverTypes,
            BTreeSet::from([TokenId(2), TokenId(3)]),
        );
        assert_eq!(diff, BTreeSet::from([TokenId(1), TokenId(3)]));
        assert!(registry.is_empty(CoverMode::CoverEffects));
    }

    #[test]
    fn remove_everywhere_reports_modes() {
        let mut registry = AttackerRegistry::new();
        registry.insert(CoverMode::CoverEffects, TokenId(5));

        assert_eq!(
            registry.remove_everywhere(TokenId(5)),
            vec![CoverMode::CoverEffects]
        );
        assert!(registry.remove_everywhere(TokenId(5)).is_empty());
    }
}
