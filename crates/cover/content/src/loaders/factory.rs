//! Content factory resolving cover content from a data directory.

use std::path::{Path, PathBuf};

use cover_core::{CoverCatalog, CoverSettings};

use crate::loaders::{CatalogLoader, LoadResult, SettingsLoader};
use crate::presets;

/// Content factory that loads cover content from a data directory.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── settings.toml
/// └── catalogs/
///     ├── dnd5e.ron
///     └── sfrpg.ron
/// ```
pub struct ContentFactory {
    data_dir: PathBuf,
}

impl ContentFactory {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Data shipped with this crate.
    pub fn bundled() -> Self {
        Self::new(Path::new(env!("CARGO_MANIFEST_DIR")).join("data"))
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Load settings from `settings.toml`, or defaults if the file is absent.
    pub fn load_settings(&self) -> LoadResult<CoverSettings> {
        let path = self.data_dir.join("settings.toml");
        if !path.exists() {
            return Ok(CoverSettings::default());
        }
        SettingsLoader::load(&path)
    }

    /// Load `catalogs/<system_id>.ron`, falling back to the built-in catalog.
    pub fn load_catalog(&self, system_id: &str) -> LoadResult<CoverCatalog> {
        let path = self
            .data_dir
            .join("catalogs")
            .join(format!("{system_id}.ron"));
        if !path.exists() {
            return Ok(presets::catalog_or_generic(system_id));
        }

        let file = CatalogLoader::load(&path)?;
        if file.system_id != system_id {
            anyhow::bail!(
                "Catalog {} declares system '{}', expected '{}'",
                path.display(),
                file.system_id,
                system_id
            );
        }
        Ok(file.into_catalog())
    }
}
