#![allow(dead_code)]

use std::time::Duration;

use cover_core::{CombatantId, Position, Token, TokenId};
use cover_runtime::{CoverLine, Event, RuntimeConfig};
use tokio::sync::broadcast;

pub const ARCHER: TokenId = TokenId(1);
pub const GOBLIN: TokenId = TokenId(2);
pub const ORC: TokenId = TokenId(3);

pub fn config(system_id: &str) -> RuntimeConfig {
    RuntimeConfig {
        system_id: system_id.to_owned(),
        ..RuntimeConfig::default()
    }
}

pub fn party() -> Vec<Token> {
    vec![
        Token::new(ARCHER, "Archer", Position::new(0, 0))
            .controlled()
            .with_combatant(CombatantId(1)),
        Token::new(GOBLIN, "Goblin", Position::new(4, 2)).with_combatant(CombatantId(2)),
        Token::new(ORC, "Orc", Position::new(6, 6)),
    ]
}

pub fn line(attacker: TokenId, defender: TokenId, percent: f32) -> CoverLine {
    CoverLine {
        attacker,
        defender,
        percent,
    }
}

/// Drains every event already published on a receiver.
pub async fn drain(rx: &mut broadcast::Receiver<Event>) -> Vec<Event> {
    let mut events = Vec::new();
    while let Ok(Ok(event)) = tokio::time::timeout(Duration::from_millis(50), rx.recv()).await {
        events.push(event);
    }
    events
}
