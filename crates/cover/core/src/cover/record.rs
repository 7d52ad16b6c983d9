use super::{CoverCatalog, CoverTypeSet};

/// Directional result of one attacker against one defender.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CoverRecord {
    /// Fraction of the defender obstructed from the attacker, clamped to `[0, 1]`.
    pub percent_cover: f32,
    pub cover_types: CoverTypeSet,
}

impl CoverRecord {
    pub fn new(percent_cover: f32, cover_types: CoverTypeSet) -> Self {
        let percent_cover = if percent_cover.is_nan() {
            0.0
        } else {
            percent_cover.clamp(0.0, 1.0)
        };
        Self {
            percent_cover,
            cover_types,
        }
    }

    /// Clear line: no obstruction, no cover types.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn has_cover(&self) -> bool {
        !self.cover_types.is_empty()
    }
}

/// Combines per-attacker records under least-cover-wins.
///
/// The weakest classification (by [`CoverCatalog::strength`], then percent)
/// is returned. No records means no cover.
pub fn least_cover<'r>(
    records: impl IntoIterator<Item = &'r CoverRecord>,
    catalog: &CoverCatalog,
) -> CoverTypeSet {
    records
        .into_iter()
        .min_by(|a, b| {
            catalog
                .strength(&a.cover_types)
                .total_cmp(&catalog.strength(&b.cover_types))
                .then(a.percent_cover.total_cmp(&b.percent_cover))
        })
        .map(|record| record.cover_types.clone())
        .unwrap_or_default()
}
