//! Cover settings loader.

use std::path::Path;

use cover_core::CoverSettings;

use crate::loaders::{LoadResult, read_file};

/// Loader for client cover settings from TOML files.
///
/// Missing tables or fields fall back to [`CoverSettings::default`].
pub struct SettingsLoader;

impl SettingsLoader {
    /// Load settings from a TOML file.
    pub fn load(path: &Path) -> LoadResult<CoverSettings> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    /// Parse settings from TOML text.
    pub fn parse(content: &str) -> LoadResult<CoverSettings> {
        toml::from_str(content).map_err(|e| anyhow::anyhow!("Failed to parse settings TOML: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cover_core::{CoverMode, SettingsOracle, UsePolicy};
    use std::io::Write;

    #[test]
    fn loads_partial_settings_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[cover_effects]\nuse_policy = \"combatant\"\ntargeting = true"
        )
        .unwrap();

        let settings = SettingsLoader::load(file.path()).unwrap();
        assert_eq!(settings.use_policy(CoverMode::CoverEffects), UsePolicy::Combatant);
        assert!(settings.targets_only(CoverMode::CoverEffects));
        assert_eq!(settings.use_policy(CoverMode::CoverTypes), UsePolicy::Never);
    }

    #[test]
    fn rejects_unknown_policy() {
        let err = SettingsLoader::parse("[cover_types]\nuse_policy = \"sometimes\"").unwrap_err();
        assert!(err.to_string().contains("settings TOML"));
    }

    #[test]
    fn missing_file_names_path() {
        let err = SettingsLoader::load(Path::new("/nonexistent/cover.toml")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/cover.toml"));
    }
}
