use std::collections::BTreeMap;

use super::{CombatantId, Token};

/// Identifier of a turn-based encounter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EncounterId(pub u32);

/// A turn-based encounter as reported by the host.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Encounter {
    pub id: EncounterId,
    #[cfg_attr(feature = "serde", serde(default))]
    pub started: bool,
    #[cfg_attr(feature = "serde", serde(default))]
    pub round: u32,
    /// Index into `combatants` of the combatant whose turn it is.
    #[cfg_attr(feature = "serde", serde(default))]
    pub turn: Option<usize>,
    pub combatants: Vec<CombatantId>,
}

impl Encounter {
    pub fn new(id: EncounterId, combatants: Vec<CombatantId>) -> Self {
        Self {
            id,
            started: false,
            round: 0,
            turn: None,
            combatants,
        }
    }

    /// Starts the encounter at round 1, first turn.
    #[must_use]
    pub fn started(mut self) -> Self {
        self.started = true;
        self.round = self.round.max(1);
        if self.turn.is_none() && !self.combatants.is_empty() {
            self.turn = Some(0);
        }
        self
    }

    pub fn current_combatant(&self) -> Option<CombatantId> {
        self.turn.and_then(|turn| self.combatants.get(turn).copied())
    }

    pub fn includes(&self, combatant: CombatantId) -> bool {
        self.combatants.contains(&combatant)
    }
}

/// All encounters known to the client plus the one currently viewed.
///
/// Only a viewed encounter that has started counts as the active combat.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CombatState {
    encounters: BTreeMap<EncounterId, Encounter>,
    viewed: Option<EncounterId>,
}

impl CombatState {
    pub fn new() -> Self {
        Self::default()
    }

    /// The viewed encounter, if it has started.
    pub fn active(&self) -> Option<&Encounter> {
        self.viewed
            .and_then(|id| self.encounters.get(&id))
            .filter(|encounter| encounter.started)
    }

    pub fn viewed(&self) -> Option<EncounterId> {
        self.viewed
    }

    pub fn is_active(&self) -> bool {
        self.active().is_some()
    }

    pub fn encounter(&self, id: EncounterId) -> Option<&Encounter> {
        self.encounters.get(&id)
    }

    pub fn len(&self) -> usize {
        self.encounters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.encounters.is_empty()
    }

    /// Records a started encounter and makes it the viewed one.
    pub fn start(&mut self, encounter: Encounter) {
        let id = encounter.id;
        let encounter = if encounter.started {
            encounter
        } else {
            encounter.started()
        };
        self.encounters.insert(id, encounter);
        self.viewed = Some(id);
    }

    /// Updates round and turn. Returns false for an unknown encounter.
    pub fn set_turn(&mut self, id: EncounterId, round: u32, turn: Option<usize>) -> bool {
        match self.encounters.get_mut(&id) {
            Some(encounter) => {
                encounter.round = round;
                encounter.turn = turn;
                true
            }
            None => false,
        }
    }

    /// Removes an encounter. If it was viewed, the first remaining started
    /// encounter becomes the viewed one.
    pub fn end(&mut self, id: EncounterId) -> Option<Encounter> {
        let removed = self.encounters.remove(&id);
        if self.viewed == Some(id) {
            self.viewed = self
                .encounters
                .values()
                .find(|encounter| encounter.started)
                .map(|encounter| encounter.id);
        }
        removed
    }

    pub fn is_active_combatant(&self, token: &Token) -> bool {
        match (self.active(), token.combatant) {
            (Some(encounter), Some(combatant)) => {
                encounter.current_combatant() == Some(combatant)
            }
            _ => false,
        }
    }

    pub fn is_participant(&self, token: &Token) -> bool {
        match (self.active(), token.combatant) {
            (Some(encounter), Some(combatant)) => encounter.includes(combatant),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{Position, TokenId};

    fn fighter(id: u32) -> Token {
        Token::new(TokenId(id), "fighter", Position::ORIGIN).with_combatant(CombatantId(id))
    }

    #[test]
    fn unstarted_encounter_is_not_active() {
        let mut combat = CombatState::new();
        combat.start(Encounter::new(EncounterId(1), vec![CombatantId(1)]));
        assert!(combat.is_active());

        let mut pending = CombatState::new();
        pending
            .encounters
            .insert(EncounterId(2), Encounter::new(EncounterId(2), vec![]));
        pending.viewed = Some(EncounterId(2));
        assert!(!pending.is_active());
    }

    #[test]
    fn active_combatant_follows_turn() {
        let mut combat = CombatState::new();
        combat.start(Encounter::new(
            EncounterId(1),
            vec![CombatantId(1), CombatantId(2)],
        ));

        assert!(combat.is_active_combatant(&fighter(1)));
        assert!(!combat.is_active_combatant(&fighter(2)));
        assert!(combat.is_participant(&fighter(2)));

        assert!(combat.set_turn(EncounterId(1), 1, Some(1)));
        assert!(combat.is_active_combatant(&fighter(2)));
        assert!(!combat.is_active_combatant(&fighter(1)));
    }

    #[test]
    fn ending_viewed_encounter_falls_back_to_remaining() {
        let mut combat = CombatState::new();
        combat.start(Encounter::new(EncounterId(1), vec![CombatantId(1)]));
        combat.start(Encounter::new(EncounterId(2), vec![CombatantId(2)]));

        combat.end(EncounterId(2));
        assert_eq!(combat.active().map(|e| e.id), Some(EncounterId(1)));

        combat.end(EncounterId(1));
        assert!(!combat.is_active());
        assert!(combat.is_empty());
    }

    #[test]
    fn tokens_outside_combat_are_never_participants() {
        let combat = CombatState::new();
        assert!(!combat.is_participant(&fighter(1)));
        assert!(!combat.is_active_combatant(&Token::new(TokenId(9), "", Position::ORIGIN)));
    }
}
