use super::{CoverEffect, CoverEffectSet, CoverType, CoverTypeId, CoverTypeSet};

/// Registered cover types and cover effects for one game system.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CoverCatalog {
    #[cfg_attr(feature = "serde", serde(default))]
    pub cover_types: Vec<CoverType>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub cover_effects: Vec<CoverEffect>,
}

impl CoverCatalog {
    pub fn new(cover_types: Vec<CoverType>, cover_effects: Vec<CoverEffect>) -> Self {
        Self {
            cover_types,
            cover_effects,
        }
    }

    pub fn cover_type(&self, id: CoverTypeId) -> Option<&CoverType> {
        self.cover_types.iter().find(|ty| ty.id == id)
    }

    /// Classifies an obstruction fraction.
    ///
    /// The met non-overlapping type with the highest threshold wins (higher
    /// priority breaks ties); every met overlapping type is added alongside.
    pub fn classify(&self, percent: f32) -> CoverTypeSet {
        let met = self.cover_types.iter().filter(|ty| ty.is_met_by(percent));

        let mut winner: Option<&CoverType> = None;
        let mut result = CoverTypeSet::new();
        for ty in met {
            if ty.can_overlap {
                result.insert(ty.id);
                continue;
            }
            let better = match winner {
                None => true,
                Some(current) => {
                    ty.percent_threshold > current.percent_threshold
                        || (ty.percent_threshold == current.percent_threshold
                            && ty.priority > current.priority)
                }
            };
            if better {
                winner = Some(ty);
            }
        }
        if let Some(ty) = winner {
            result.insert(ty.id);
        }
        result
    }

    /// Largest threshold in the set; `0.0` for no cover or unknown ids.
    pub fn strength(&self, types: &CoverTypeSet) -> f32 {
        types
            .iter()
            .filter_map(|id| self.cover_type(*id))
            .map(|ty| ty.percent_threshold)
            .fold(0.0, f32::max)
    }

    /// Every effect activated by the classification.
    pub fn effects_for(&self, classification: &CoverTypeSet) -> CoverEffectSet {
        self.cover_effects
            .iter()
            .filter(|effect| effect.applies_to(classification))
            .map(|effect| effect.id)
            .collect()
    }
}
