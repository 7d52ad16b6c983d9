//! Cover modes, use policies, and the policy decision table.
//!
//! Each [`UsePolicy`] maps to a [`PolicyRule`] holding two pure decision
//! functions over [`PolicyInputs`]: whether a token counts as an attacker and
//! whether a (non-attacker) token may display cover. Keeping the branching in
//! one table makes the whole policy surface enumerable in tests.
use strum::{AsRefStr, Display, EnumCount, EnumIter, EnumString};

/// The two independently configured cover subsystems.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Display, AsRefStr, EnumIter,
    EnumCount, EnumString,
)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum CoverMode {
    /// Displayed cover markers (icons).
    CoverTypes,
    /// Applied mechanical effects.
    CoverEffects,
}

impl CoverMode {
    pub const ALL: [CoverMode; 2] = [CoverMode::CoverTypes, CoverMode::CoverEffects];
}

/// When cover is tracked and applied for a [`CoverMode`].
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Display, AsRefStr, EnumIter, EnumCount,
    EnumString,
)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[repr(u8)]
pub enum UsePolicy {
    /// Cover is never tracked.
    #[default]
    Never = 0,
    /// Cover is resolved at attack time only, never continuously.
    Attack = 1,
    /// Controlled tokens are attackers at all times.
    Always = 2,
    /// Controlled tokens are attackers while a combat is active.
    Combat = 3,
    /// The active combatant is the attacker.
    Combatant = 4,
}

impl UsePolicy {
    /// Returns the decision rule for this policy.
    pub fn rule(self) -> &'static PolicyRule {
        &POLICY_RULES[self as usize]
    }

    /// Returns true if changes to combat state can alter attacker membership.
    pub const fn depends_on_combat(self) -> bool {
        matches!(self, UsePolicy::Combat | UsePolicy::Combatant)
    }

    /// Returns true if turn changes can alter attacker membership.
    pub const fn depends_on_turn(self) -> bool {
        matches!(self, UsePolicy::Combatant)
    }
}

/// Inputs the policy rules are evaluated against.
///
/// Built from a token snapshot and the current combat state; the rules never
/// look at anything else.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PolicyInputs {
    /// Token is selected by the acting client.
    pub controlled: bool,
    /// A started combat is being viewed.
    pub combat_active: bool,
    /// Token is the combatant whose turn it currently is.
    pub active_combatant: bool,
    /// Token is a participant of the active combat.
    pub participant: bool,
}

/// Pair of decision functions selected by a [`UsePolicy`].
#[derive(Clone, Copy)]
pub struct PolicyRule {
    /// Whether the token counts as an attacker.
    pub attacker: fn(&PolicyInputs) -> bool,
    /// Whether a non-attacking token may display cover.
    pub show_cover: fn(&PolicyInputs) -> bool,
}

impl PolicyRule {
    pub fn is_attacker(&self, inputs: &PolicyInputs) -> bool {
        (self.attacker)(inputs)
    }

    pub fn shows_cover(&self, inputs: &PolicyInputs) -> bool {
        (self.show_cover)(inputs)
    }
}

impl std::fmt::Debug for PolicyRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PolicyRule").finish_non_exhaustive()
    }
}

/// Indexed by `UsePolicy as usize`.
static POLICY_RULES: [PolicyRule; UsePolicy::COUNT] = [
    // Never
    PolicyRule {
        attacker: never,
        show_cover: never,
    },
    // Attack: resolved out-of-band when an attack is rolled.
    PolicyRule {
        attacker: controlled,
        show_cover: never,
    },
    // Always
    PolicyRule {
        attacker: controlled,
        show_cover: always,
    },
    // Combat
    PolicyRule {
        attacker: controlled_in_combat,
        show_cover: combat_active,
    },
    // Combatant
    PolicyRule {
        attacker: active_combatant,
        show_cover: combat_participant,
    },
];

fn never(_: &PolicyInputs) -> bool {
    false
}

fn always(_: &PolicyInputs) -> bool {
    true
}

fn controlled(inputs: &PolicyInputs) -> bool {
    inputs.controlled
}

fn controlled_in_combat(inputs: &PolicyInputs) -> bool {
    inputs.combat_active && inputs.controlled
}

fn combat_active(inputs: &PolicyInputs) -> bool {
    inputs.combat_active
}

fn active_combatant(inputs: &PolicyInputs) -> bool {
    inputs.combat_active && inputs.active_combatant
}

fn combat_participant(inputs: &PolicyInputs) -> bool {
    inputs.combat_active && inputs.participant
}
