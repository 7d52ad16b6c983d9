//! Cover classifications: types, effects, per-pair records and the catalog
//! that ties them together.
mod catalog;
mod record;
mod types;

pub use catalog::CoverCatalog;
pub use record::{CoverRecord, least_cover};
pub use types::{CoverEffect, CoverEffectId, CoverEffectSet, CoverType, CoverTypeId, CoverTypeSet};
