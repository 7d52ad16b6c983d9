//! Settings oracle for the per-mode cover configuration.
use crate::policy::{CoverMode, UsePolicy};

/// Provides the current cover settings of the acting client.
pub trait SettingsOracle: Send + Sync {
    /// Returns when cover is tracked for `mode`.
    fn use_policy(&self, mode: CoverMode) -> UsePolicy;

    /// Returns true if only targeted tokens are evaluated for `mode`.
    fn targets_only(&self, mode: CoverMode) -> bool;
}
