//! Host events consumed by the [`EventRouter`](crate::router::EventRouter).
use std::fmt;

use crate::config::SettingKey;
use crate::state::{Encounter, EncounterId, Position, Token, TokenId};

/// Something changed on the host side that may affect cover.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum HostEvent {
    TokenCreated {
        token: Token,
    },
    TokenRemoved {
        token: TokenId,
    },
    TokenMoved {
        token: TokenId,
        position: Position,
    },
    TokenControlChanged {
        token: TokenId,
        controlled: bool,
    },
    TokenTargetChanged {
        token: TokenId,
        targeted: bool,
    },
    TokenVisibilityChanged {
        token: TokenId,
        visible: bool,
    },
    CombatStarted {
        encounter: Encounter,
    },
    CombatTurnChanged {
        encounter: EncounterId,
        round: u32,
        turn: Option<usize>,
    },
    CombatEnded {
        encounter: EncounterId,
    },
    /// A cover setting was written; the new value is read from settings.
    SettingsChanged {
        key: SettingKey,
    },
    /// The active scene was replaced.
    SceneLoaded {
        tokens: Vec<Token>,
    },
}

impl HostEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            HostEvent::TokenCreated { .. } => "token_created",
            HostEvent::TokenRemoved { .. } => "token_removed",
            HostEvent::TokenMoved { .. } => "token_moved",
            HostEvent::TokenControlChanged { .. } => "token_control_changed",
            HostEvent::TokenTargetChanged { .. } => "token_target_changed",
            HostEvent::TokenVisibilityChanged { .. } => "token_visibility_changed",
            HostEvent::CombatStarted { .. } => "combat_started",
            HostEvent::CombatTurnChanged { .. } => "combat_turn_changed",
            HostEvent::CombatEnded { .. } => "combat_ended",
            HostEvent::SettingsChanged { .. } => "settings_changed",
            HostEvent::SceneLoaded { .. } => "scene_loaded",
        }
    }
}

impl fmt::Display for HostEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.kind())
    }
}
