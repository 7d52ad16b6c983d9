//! Data-driven cover content and loaders.
//!
//! This crate houses the built-in cover catalogs for each supported game
//! system and, behind the `loaders` feature, loaders for data files:
//! - Cover settings (data-driven via TOML)
//! - Cover catalogs (data-driven via RON)
//!
//! Content is consumed by the runtime and never appears in session state.

pub mod presets;

#[cfg(feature = "loaders")]
pub mod loaders;

pub use presets::{GENERIC_SYSTEM, SUPPORTED_SYSTEMS, catalog_for_system, catalog_or_generic};

#[cfg(feature = "loaders")]
pub use loaders::{CatalogFile, CatalogLoader, ContentFactory, LoadResult, SettingsLoader};
