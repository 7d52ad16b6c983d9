use std::collections::BTreeSet;
use std::fmt;

/// Identifier of a registered cover type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CoverTypeId(pub u16);

impl fmt::Display for CoverTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "type:{}", self.0)
    }
}

/// Identifier of a registered cover effect.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CoverEffectId(pub u16);

impl fmt::Display for CoverEffectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "effect:{}", self.0)
    }
}

/// Ordered set of cover types; the classification unit.
pub type CoverTypeSet = BTreeSet<CoverTypeId>;

/// Ordered set of cover effects applied to an actor.
pub type CoverEffectSet = BTreeSet<CoverEffectId>;

/// Named cover classification with the obstruction fraction needed to reach it.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CoverType {
    pub id: CoverTypeId,
    pub name: String,
    /// Minimum fraction of the defender that must be obstructed, in `[0, 1]`.
    pub percent_threshold: f32,
    /// Breaks ties between non-overlapping types with equal thresholds.
    #[cfg_attr(feature = "serde", serde(default))]
    pub priority: u8,
    /// Overlapping types are applied alongside the winning type.
    #[cfg_attr(feature = "serde", serde(default))]
    pub can_overlap: bool,
    #[cfg_attr(feature = "serde", serde(default))]
    pub icon: Option<String>,
}

impl CoverType {
    pub fn new(id: CoverTypeId, name: impl Into<String>, percent_threshold: f32) -> Self {
        Self {
            id,
            name: name.into(),
            percent_threshold,
            priority: 0,
            can_overlap: false,
            icon: None,
        }
    }

    #[must_use]
    pub fn with_priority(mut self, priority: u8) -> Self {
        self.priority = priority;
        self
    }

    #[must_use]
    pub fn overlapping(mut self) -> Self {
        self.can_overlap = true;
        self
    }

    #[must_use]
    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    /// A type is met by any positive cover at or above its threshold.
    pub fn is_met_by(&self, percent: f32) -> bool {
        percent > 0.0 && percent >= self.percent_threshold
    }
}

/// Mechanical effect activated by any of its cover types.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CoverEffect {
    pub id: CoverEffectId,
    pub name: String,
    pub cover_types: CoverTypeSet,
}

impl CoverEffect {
    pub fn new(
        id: CoverEffectId,
        name: impl Into<String>,
        cover_types: impl IntoIterator<Item = CoverTypeId>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            cover_types: cover_types.into_iter().collect(),
        }
    }

    pub fn applies_to(&self, classification: &CoverTypeSet) -> bool {
        !self.cover_types.is_disjoint(classification)
    }
}
