//! Cover catalog loader.

use std::collections::BTreeSet;
use std::path::Path;

use cover_core::{CoverCatalog, CoverEffect, CoverType};
use serde::{Deserialize, Serialize};

use crate::loaders::{LoadResult, read_file};

/// Cover catalog structure for RON files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogFile {
    /// Game system the catalog was authored for.
    pub system_id: String,
    pub cover_types: Vec<CoverType>,
    #[serde(default)]
    pub cover_effects: Vec<CoverEffect>,
}

impl CatalogFile {
    /// Checks ids are unique, thresholds lie in `[0, 1]` and effects only
    /// reference declared cover types.
    pub fn validate(&self) -> LoadResult<()> {
        let mut type_ids = BTreeSet::new();
        for ty in &self.cover_types {
            if !type_ids.insert(ty.id) {
                anyhow::bail!("Duplicate cover type id {} ({})", ty.id, ty.name);
            }
            if !(0.0..=1.0).contains(&ty.percent_threshold) {
                anyhow::bail!(
                    "Cover type {} has threshold {} outside [0, 1]",
                    ty.name,
                    ty.percent_threshold
                );
            }
        }

        let mut effect_ids = BTreeSet::new();
        for effect in &self.cover_effects {
            if !effect_ids.insert(effect.id) {
                anyhow::bail!("Duplicate cover effect id {} ({})", effect.id, effect.name);
            }
            if let Some(missing) = effect.cover_types.iter().find(|id| !type_ids.contains(id)) {
                anyhow::bail!(
                    "Cover effect {} references unknown cover type {}",
                    effect.name,
                    missing
                );
            }
        }
        Ok(())
    }

    pub fn into_catalog(self) -> CoverCatalog {
        CoverCatalog::new(self.cover_types, self.cover_effects)
    }
}

/// Loader for cover catalogs from RON files.
pub struct CatalogLoader;

impl CatalogLoader {
    /// Load and validate a catalog from a RON file.
    pub fn load(path: &Path) -> LoadResult<CatalogFile> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    /// Parse and validate a catalog from RON text.
    pub fn parse(content: &str) -> LoadResult<CatalogFile> {
        let file: CatalogFile = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse cover catalog RON: {}", e))?;
        file.validate()?;
        Ok(file)
    }
}
