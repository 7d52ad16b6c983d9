//! Cover settings and the keys used to announce setting changes.
use crate::env::SettingsOracle;
use crate::policy::{CoverMode, UsePolicy};

/// Settings for a single [`CoverMode`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ModeSettings {
    /// When cover is tracked and applied.
    pub use_policy: UsePolicy,
    /// Only evaluate cover for targeted tokens.
    pub targeting: bool,
}

impl ModeSettings {
    pub const fn new(use_policy: UsePolicy, targeting: bool) -> Self {
        Self {
            use_policy,
            targeting,
        }
    }
}

/// Client-side cover settings, one [`ModeSettings`] per mode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CoverSettings {
    pub cover_types: ModeSettings,
    pub cover_effects: ModeSettings,
}

impl CoverSettings {
    pub const fn new(cover_types: ModeSettings, cover_effects: ModeSettings) -> Self {
        Self {
            cover_types,
            cover_effects,
        }
    }

    /// Same settings for both modes.
    pub const fn uniform(use_policy: UsePolicy, targeting: bool) -> Self {
        let mode = ModeSettings::new(use_policy, targeting);
        Self::new(mode, mode)
    }

    pub fn mode(&self, mode: CoverMode) -> &ModeSettings {
        match mode {
            CoverMode::CoverTypes => &self.cover_types,
            CoverMode::CoverEffects => &self.cover_effects,
        }
    }

    pub fn mode_mut(&mut self, mode: CoverMode) -> &mut ModeSettings {
        match mode {
            CoverMode::CoverTypes => &mut self.cover_types,
            CoverMode::CoverEffects => &mut self.cover_effects,
        }
    }

    /// Applies a change and returns whether the stored value differed.
    pub fn apply(&mut self, change: SettingChange) -> bool {
        let settings = self.mode_mut(change.mode());
        match change {
            SettingChange::UsePolicy { policy, .. } => {
                let changed = settings.use_policy != policy;
                settings.use_policy = policy;
                changed
            }
            SettingChange::Targeting { enabled, .. } => {
                let changed = settings.targeting != enabled;
                settings.targeting = enabled;
                changed
            }
        }
    }
}

impl SettingsOracle for CoverSettings {
    fn use_policy(&self, mode: CoverMode) -> UsePolicy {
        self.mode(mode).use_policy
    }

    fn targets_only(&self, mode: CoverMode) -> bool {
        self.mode(mode).targeting
    }
}

/// Which field of a mode's settings changed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum SettingField {
    Use,
    Targeting,
}

/// Identifies a single cover setting.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SettingKey {
    pub mode: CoverMode,
    pub field: SettingField,
}

impl SettingKey {
    pub const fn new(mode: CoverMode, field: SettingField) -> Self {
        Self { mode, field }
    }
}

/// A new value for one cover setting.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum SettingChange {
    UsePolicy { mode: CoverMode, policy: UsePolicy },
    Targeting { mode: CoverMode, enabled: bool },
}

impl SettingChange {
    pub const fn mode(&self) -> CoverMode {
        match self {
            SettingChange::UsePolicy { mode, .. } | SettingChange::Targeting { mode, .. } => *mode,
        }
    }

    pub const fn key(&self) -> SettingKey {
        match self {
            SettingChange::UsePolicy { mode, .. } => SettingKey::new(*mode, SettingField::Use),
            SettingChange::Targeting { mode, .. } => {
                SettingKey::new(*mode, SettingField::Targeting)
            }
        }
    }
}
