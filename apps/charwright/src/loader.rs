//! # Catalog Loader
//!
//! Reads catalog documents from a directory.
//!
//! ```text
//! catalog/
//! ├── species.json       { "<species>": { "<attribute>": <int>, ... }, ... }
//! ├── backgrounds.json   [ BackgroundStep, ... ]
//! ├── spells.json        [ Spell, ... ]
//! ├── gear.json          [ GearItem, ... ]
//! ├── portraits.json     [ "<token>", ... ]
//! └── traits/
//!     └── <species>.json [ TraitOption, ... ]
//! ```
//!
//! The five catalog documents load concurrently; the catalog exists only
//! once all of them succeed. Trait tables are read per species on demand.

use charwright_core::{
    BackgroundStep, CharwrightError, GearItem, OptionCatalog, SpeciesBaseTable, SpeciesId, Spell,
    TraitOption, TraitSource, TraitTable,
};
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub const SPECIES_FILE: &str = "species.json";
pub const BACKGROUNDS_FILE: &str = "backgrounds.json";
pub const SPELLS_FILE: &str = "spells.json";
pub const GEAR_FILE: &str = "gear.json";
pub const PORTRAITS_FILE: &str = "portraits.json";

/// Maximum size of a single catalog document (16 MB).
const MAX_DOCUMENT_SIZE: u64 = 16 * 1024 * 1024;

// =============================================================================
// CATALOG
// =============================================================================

async fn read_document<T: DeserializeOwned>(path: PathBuf) -> Result<T, CharwrightError> {
    let metadata = tokio::fs::metadata(&path)
        .await
        .map_err(|e| CharwrightError::Catalog(format!("Cannot read '{}': {}", path.display(), e)))?;
    if metadata.len() > MAX_DOCUMENT_SIZE {
        return Err(CharwrightError::Catalog(format!(
            "'{}' is {} bytes, over the {} byte limit",
            path.display(),
            metadata.len(),
            MAX_DOCUMENT_SIZE
        )));
    }

    let bytes = tokio::fs::read(&path)
        .await
        .map_err(|e| CharwrightError::Catalog(format!("Cannot read '{}': {}", path.display(), e)))?;
    serde_json::from_slice(&bytes)
        .map_err(|e| CharwrightError::Catalog(format!("Invalid JSON in '{}': {}", path.display(), e)))
}

/// Load the full option catalog from `dir`.
pub async fn load_catalog(dir: &Path) -> Result<OptionCatalog, CharwrightError> {
    let (species, backgrounds, spells, gear, portraits) = tokio::try_join!(
        read_document::<BTreeMap<SpeciesId, SpeciesBaseTable>>(dir.join(SPECIES_FILE)),
        read_document::<Vec<BackgroundStep>>(dir.join(BACKGROUNDS_FILE)),
        read_document::<Vec<Spell>>(dir.join(SPELLS_FILE)),
        read_document::<Vec<GearItem>>(dir.join(GEAR_FILE)),
        read_document::<Vec<String>>(dir.join(PORTRAITS_FILE)),
    )?;

    let catalog = OptionCatalog::new(species, backgrounds, spells, gear, portraits)?;
    let summary = catalog.summary();
    tracing::info!(
        dir = %dir.display(),
        species = summary.species.len(),
        steps = summary.step_count,
        spells = summary.spell_count,
        gear = summary.gear_count,
        portraits = summary.portrait_count,
        "Catalog loaded"
    );
    Ok(catalog)
}

// =============================================================================
// TRAIT TABLES
// =============================================================================

/// Trait tables read from `<dir>/<species>.json`.
#[derive(Debug, Clone)]
pub struct FsTraitSource {
    dir: PathBuf,
}

impl FsTraitSource {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path of the trait table for `species`.
    ///
    /// Species ids become file names, so only letters, digits, `-` and `_`
    /// are accepted.
    fn table_path(&self, species: &SpeciesId) -> Result<PathBuf, CharwrightError> {
        let id = species.as_str();
        let valid = !id.is_empty()
            && id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(CharwrightError::UnknownSpecies(species.clone()));
        }
        Ok(self.dir.join(format!("{id}.json")))
    }
}

impl TraitSource for FsTraitSource {
    fn trait_table(&self, species: &SpeciesId) -> Result<TraitTable, CharwrightError> {
        let path = self.table_path(species)?;
        let bytes = std::fs::read(&path).map_err(|e| {
            CharwrightError::TraitTable(format!("Cannot read '{}': {}", path.display(), e))
        })?;
        let options: Vec<TraitOption> = serde_json::from_slice(&bytes).map_err(|e| {
            CharwrightError::TraitTable(format!("Invalid JSON in '{}': {}", path.display(), e))
        })?;

        tracing::debug!(species = %species, options = options.len(), "Trait table read");
        Ok(TraitTable::new(species.clone(), options))
    }
}

// =============================================================================
// TESTS
// =============================================================================
