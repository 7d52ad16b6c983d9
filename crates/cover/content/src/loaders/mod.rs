//! Content loaders for reading cover data from files.

pub mod catalog;
pub mod factory;
pub mod settings;

pub use catalog::{CatalogFile, CatalogLoader};
pub use factory::ContentFactory;
pub use settings::SettingsLoader;

use std::path::Path;

/// Common result type for loaders.
pub type LoadResult<T> = anyhow::Result<T>;

/// Helper function to read file contents.
pub(crate) fn read_file(path: &Path) -> LoadResult<String> {
    std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read file {}: {}", path.display(), e))
}
