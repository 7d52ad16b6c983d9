//! Visibility oracle answering per-pair cover queries.
use crate::cover::CoverTypeSet;
use crate::state::{Token, TokenId};

/// Measures how much of a defender is obstructed from an attacker.
///
/// Geometry lives entirely behind this trait. Combining several attackers is
/// done by the orchestrator from the per-pair answers.
pub trait VisibilityOracle: Send + Sync {
    /// Fraction of `defender` obstructed from `attacker`, in `[0, 1]`.
    fn percent_cover(&self, attacker: &Token, defender: &Token) -> f32;

    /// Cover classification for a single attacker/defender pair.
    fn cover_types(&self, attacker: &Token, defender: &Token) -> CoverTypeSet;

    /// Releases resources tied to a token leaving the scene.
    fn destroy(&self, _token: TokenId) {}
}
