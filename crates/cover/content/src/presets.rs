//! Built-in cover catalogs keyed by game system id.
//!
//! Each system ships its own cover tiers and one cover effect per tier.
//! Unknown systems fall back to [`GENERIC_SYSTEM`].
use cover_core::{CoverCatalog, CoverEffect, CoverEffectId, CoverType, CoverTypeId};

pub const GENERIC_SYSTEM: &str = "generic";

/// Systems with a built-in catalog.
pub const SUPPORTED_SYSTEMS: &[&str] = &["dnd5e", "pf2e", "sfrpg", GENERIC_SYSTEM];

/// `(name, threshold, effect name)` per tier, in id order starting at 1.
type Tier = (&'static str, f32, &'static str);

const DND5E: &[Tier] = &[
    ("half", 0.5, "Half Cover"),
    ("three-quarters", 0.75, "Three-Quarters Cover"),
    ("total", 1.0, "Total Cover"),
];

const PF2E: &[Tier] = &[
    ("lesser", 0.25, "Lesser Cover"),
    ("standard", 0.5, "Standard Cover"),
    ("greater", 0.75, "Greater Cover"),
];

const SFRPG: &[Tier] = &[
    ("partial", 0.25, "Partial Cover"),
    ("cover", 0.5, "Cover"),
    ("improved", 0.75, "Improved Cover"),
    ("total", 1.0, "Total Cover"),
];

const GENERIC: &[Tier] = &[("low", 0.5, "Low Cover"), ("high", 0.75, "High Cover")];

fn tiers(system_id: &str) -> Option<&'static [Tier]> {
    match system_id {
        "dnd5e" => Some(DND5E),
        "pf2e" => Some(PF2E),
        "sfrpg" => Some(SFRPG),
        GENERIC_SYSTEM => Some(GENERIC),
        _ => None,
    }
}

fn build(tiers: &[Tier]) -> CoverCatalog {
    let mut cover_types = Vec::with_capacity(tiers.len());
    let mut cover_effects = Vec::with_capacity(tiers.len());
    for (index, (name, threshold, effect)) in (1u16..).zip(tiers) {
        let id = CoverTypeId(index);
        cover_types.push(CoverType::new(id, *name, *threshold).with_icon(format!("icons/{name}.svg")));
        cover_effects.push(CoverEffect::new(CoverEffectId(index), *effect, [id]));
    }
    CoverCatalog::new(cover_types, cover_effects)
}

/// Returns the built-in catalog for a system, or `None` if it has none.
pub fn catalog_for_system(system_id: &str) -> Option<CoverCatalog> {
    tiers(system_id).map(build)
}

/// Built-in catalog for a system, falling back to the generic tiers.
pub fn catalog_or_generic(system_id: &str) -> CoverCatalog {
    build(tiers(system_id).unwrap_or(GENERIC))
}
