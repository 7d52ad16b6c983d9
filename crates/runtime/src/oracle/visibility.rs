//! Scripted percent-cover table served through [`VisibilityOracle`].
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use serde::{Deserialize, Serialize};
use tracing::trace;

use cover_core::{CoverCatalog, CoverTypeSet, Token, TokenId, VisibilityOracle};

/// Percent cover a defender has against one attacker.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CoverLine {
    pub attacker: TokenId,
    pub defender: TokenId,
    pub percent: f32,
}

/// VisibilityOracle backed by a mutable `(attacker, defender)` table.
///
/// Pairs without an entry have a clear line. Entries involving a destroyed
/// token are dropped.
#[derive(Debug)]
pub struct ScriptedVisibility {
    lines: RwLock<HashMap<(TokenId, TokenId), f32>>,
    catalog: Arc<CoverCatalog>,
}

impl ScriptedVisibility {
    pub fn new(catalog: Arc<CoverCatalog>) -> Self {
        Self {
            lines: RwLock::new(HashMap::new()),
            catalog,
        }
    }

    pub fn with_lines(
        catalog: Arc<CoverCatalog>,
        lines: impl IntoIterator<Item = CoverLine>,
    ) -> Self {
        let visibility = Self::new(catalog);
        for line in lines {
            visibility.set(line);
        }
        visibility
    }

    /// Records the percent for a pair, replacing any previous value.
    ///
    /// Cached results are not invalidated; the host reports the change with
    /// the matching movement event.
    pub fn set(&self, line: CoverLine) {
        self.lines
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert((line.attacker, line.defender), line.percent);
    }

    fn lookup(&self, attacker: TokenId, defender: TokenId) -> f32 {
        self.lines
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&(attacker, defender))
            .copied()
            .unwrap_or(0.0)
    }
}

impl VisibilityOracle for ScriptedVisibility {
    fn percent_cover(&self, attacker: &Token, defender: &Token) -> f32 {
        let percent = self.lookup(attacker.id, defender.id);
        trace!(attacker = %attacker.id, defender = %defender.id, percent, "scripted percent cover");
        percent
    }

    fn cover_types(&self, attacker: &Token, defender: &Token) -> CoverTypeSet {
        self.catalog.classify(self.lookup(attacker.id, defender.id))
    }

    fn destroy(&self, token: TokenId) {
        self.lines
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|(attacker, defender), _| *attacker != token && *defender != token);
    }
}
