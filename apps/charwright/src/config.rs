//! # Configuration
//!
//! Application settings from an optional `charwright.toml`, overlaid by
//! environment variables.
//!
//! ```toml
//! catalog_dir = "catalog"
//! save_url = "https://characters.example.net"
//! save_token = "secret"
//! random_species = ["Mammal", "Avian"]
//! ```
//!
//! ## Environment Overrides
//!
//! - `CHARWRIGHT_CATALOG_DIR`: catalog directory
//! - `CHARWRIGHT_SAVE_URL`: base URL of the character store
//! - `CHARWRIGHT_SAVE_TOKEN`: bearer token sent with saves

use charwright_core::{CharwrightError, SpeciesId, SpeciesPool};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const ENV_CATALOG_DIR: &str = "CHARWRIGHT_CATALOG_DIR";
pub const ENV_SAVE_URL: &str = "CHARWRIGHT_SAVE_URL";
pub const ENV_SAVE_TOKEN: &str = "CHARWRIGHT_SAVE_TOKEN";

/// Top-level application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Directory holding the catalog documents and `traits/`.
    pub catalog_dir: PathBuf,
    /// Base URL of the character store. Saving is skipped when unset.
    pub save_url: Option<String>,
    pub save_token: Option<String>,
    /// Species the random generator draws from. Unset means every catalog
    /// species; an empty list means the built-in five.
    pub random_species: Option<Vec<String>>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            catalog_dir: PathBuf::from("catalog"),
            save_url: None,
            save_token: None,
            random_species: None,
        }
    }
}

impl AppConfig {
    /// Load the configuration file (if given) and apply environment overrides.
    ///
    /// An explicitly named file that is missing or malformed is an error.
    pub fn load(path: Option<&Path>) -> Result<Self, CharwrightError> {
        let mut config = match path {
            Some(path) => {
                let contents = std::fs::read_to_string(path).map_err(|e| {
                    CharwrightError::Io(format!("Cannot read config '{}': {}", path.display(), e))
                })?;
                let config = Self::from_toml_str(&contents)?;
                tracing::info!("Loaded config from {}", path.display());
                config
            }
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, CharwrightError> {
        toml::from_str(contents)
            .map_err(|e| CharwrightError::Serialization(format!("Invalid config: {}", e)))
    }

    /// Overlay values from a key lookup. Empty values are ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(dir) = get(ENV_CATALOG_DIR) {
            self.catalog_dir = PathBuf::from(dir);
        }
        if let Some(url) = get(ENV_SAVE_URL) {
            self.save_url = Some(url);
        }
        if let Some(token) = get(ENV_SAVE_TOKEN) {
            self.save_token = Some(token);
        }
    }

    /// Directory holding one `<species>.json` trait table per species.
    #[must_use]
    pub fn traits_dir(&self) -> PathBuf {
        self.catalog_dir.join("traits")
    }

    #[must_use]
    pub fn species_pool(&self) -> SpeciesPool {
        match &self.random_species {
            None => SpeciesPool::Catalog,
            Some(list) if list.is_empty() => SpeciesPool::default_fixed(),
            Some(list) => SpeciesPool::Fixed(list.iter().map(SpeciesId::new).collect()),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.catalog_dir, PathBuf::from("catalog"));
        assert!(config.save_url.is_none());
        assert_eq!(config.species_pool(), SpeciesPool::Catalog);
        assert_eq!(config.traits_dir(), PathBuf::from("catalog").join("traits"));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = AppConfig::from_toml_str("save_url = \"http://localhost:9000\"").expect("parse");
        assert_eq!(config.save_url.as_deref(), Some("http://localhost:9000"));
        assert_eq!(config.catalog_dir, PathBuf::from("catalog"));
    }

    #[test]
    fn test_invalid_toml_rejected() {
        assert!(matches!(
            AppConfig::from_toml_str("catalog_dir = ["),
            Err(CharwrightError::Serialization(_))
        ));
    }

    #[test]
    fn test_overrides_win_over_file() {
        let mut config = AppConfig::from_toml_str("catalog_dir = \"from-file\"").expect("parse");
        let env = BTreeMap::from([
            (ENV_CATALOG_DIR, "from-env".to_string()),
            (ENV_SAVE_TOKEN, "   ".to_string()),
        ]);
        config.apply_overrides(|key| env.get(key).cloned());

        assert_eq!(config.catalog_dir, PathBuf::from("from-env"));
        assert!(config.save_token.is_none());
    }

    #[test]
    fn test_species_pool_from_list() {
        let fixed = AppConfig::from_toml_str("random_species = [\"Avian\"]").expect("parse");
        assert_eq!(
            fixed.species_pool(),
            SpeciesPool::Fixed(vec![SpeciesId::new("Avian")])
        );

        let builtin = AppConfig::from_toml_str("random_species = []").expect("parse");
        assert_eq!(builtin.species_pool(), SpeciesPool::default_fixed());
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let result = AppConfig::load(Some(Path::new("/nonexistent/charwright.toml")));
        assert!(matches!(result, Err(CharwrightError::Io(_))));
    }
}
