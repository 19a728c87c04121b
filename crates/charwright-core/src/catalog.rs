//! # Option Catalog
//!
//! The immutable, session-scoped tables every rule reads from.
//!
//! The catalog is loaded once (by the binary) and shared read-only, usually as
//! `Arc<OptionCatalog>`. Species trait tables are not part of it: they are
//! requested per species through a [`TraitSource`], because the chosen species
//! can change during a build.

use crate::primitives::SELECTABLE_SPELL_TIER;
use crate::steps::{BodyPartStep, build_step_sequence};
use crate::types::{
    AttributeMap, BackgroundStep, CharwrightError, GearItem, SpeciesId, Spell, TraitOption,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// =============================================================================
// SPECIES BASE TABLE
// =============================================================================

/// Base attribute values for one species.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpeciesBaseTable(pub AttributeMap);

impl SpeciesBaseTable {
    /// Create a table from `(attribute, value)` pairs.
    #[must_use]
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, i32)>) -> Self {
        Self(pairs.into_iter().map(|(k, v)| (k.to_string(), v)).collect())
    }

    /// Look up one attribute.
    #[must_use]
    pub fn get(&self, attribute: &str) -> Option<i32> {
        self.0.get(attribute).copied()
    }
}

// =============================================================================
// OPTION CATALOG
// =============================================================================

/// The complete set of option tables for one session.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OptionCatalog {
    pub species: BTreeMap<SpeciesId, SpeciesBaseTable>,
    pub backgrounds: Vec<BackgroundStep>,
    pub spells: Vec<Spell>,
    pub gear: Vec<GearItem>,
    pub portraits: Vec<String>,
}

impl OptionCatalog {
    /// Assemble a catalog from its five documents.
    ///
    /// Background step ids must be unique, since selections are keyed by them.
    pub fn new(
        species: BTreeMap<SpeciesId, SpeciesBaseTable>,
        backgrounds: Vec<BackgroundStep>,
        spells: Vec<Spell>,
        gear: Vec<GearItem>,
        portraits: Vec<String>,
    ) -> Result<Self, CharwrightError> {
        let mut seen = std::collections::BTreeSet::new();
        for step in &backgrounds {
            if !seen.insert(step.id.as_str()) {
                return Err(CharwrightError::Catalog(format!(
                    "duplicate background step id '{}'",
                    step.id
                )));
            }
        }

        Ok(Self {
            species,
            backgrounds,
            spells,
            gear,
            portraits,
        })
    }

    /// All species ids, in sorted order.
    #[must_use]
    pub fn species_ids(&self) -> Vec<SpeciesId> {
        self.species.keys().cloned().collect()
    }

    #[must_use]
    pub fn has_species(&self, species: &SpeciesId) -> bool {
        self.species.contains_key(species)
    }

    /// Base attribute table of a species, if the catalog knows it.
    #[must_use]
    pub fn base_table(&self, species: &SpeciesId) -> Option<&SpeciesBaseTable> {
        self.species.get(species)
    }

    #[must_use]
    pub fn background_step(&self, id: &str) -> Option<&BackgroundStep> {
        self.backgrounds.iter().find(|s| s.id == id)
    }

    /// Spells offered during building (tier 1 only), in catalog order.
    ///
    /// Spells are chosen by name, so a repeated name keeps only its first entry.
    #[must_use]
    pub fn spell_pool(&self) -> Vec<&Spell> {
        let mut seen = std::collections::BTreeSet::new();
        self.spells
            .iter()
            .filter(|s| s.tier == SELECTABLE_SPELL_TIER)
            .filter(|s| seen.insert(s.name.as_str()))
            .collect()
    }

    #[must_use]
    pub fn spell(&self, name: &str) -> Option<&Spell> {
        self.spells.iter().find(|s| s.name == name)
    }

    #[must_use]
    pub fn gear_item(&self, name: &str) -> Option<&GearItem> {
        self.gear.iter().find(|g| g.name == name)
    }

    #[must_use]
    pub fn has_portrait(&self, token: &str) -> bool {
        self.portraits.iter().any(|p| p == token)
    }

    /// Counts and ids describing this catalog.
    #[must_use]
    pub fn summary(&self) -> CatalogSummary {
        CatalogSummary {
            species: self.species_ids(),
            background_steps: self.backgrounds.iter().map(|s| s.id.clone()).collect(),
            step_count: build_step_sequence(self).len(),
            spell_count: self.spells.len(),
            selectable_spell_count: self.spell_pool().len(),
            gear_count: self.gear.len(),
            portrait_count: self.portraits.len(),
        }
    }
}

/// Overview of a loaded catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogSummary {
    pub species: Vec<SpeciesId>,
    pub background_steps: Vec<String>,
    pub step_count: usize,
    pub spell_count: usize,
    pub selectable_spell_count: usize,
    pub gear_count: usize,
    pub portrait_count: usize,
}

// =============================================================================
// TRAIT TABLES
// =============================================================================

/// The body-part trait options of one species.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraitTable {
    pub species: SpeciesId,
    pub options: Vec<TraitOption>,
}

impl TraitTable {
    #[must_use]
    pub fn new(species: SpeciesId, options: Vec<TraitOption>) -> Self {
        Self { species, options }
    }

    /// Options belonging to one body-part step, in table order.
    #[must_use]
    pub fn options_for(&self, step: BodyPartStep) -> Vec<&TraitOption> {
        self.options
            .iter()
            .filter(|o| o.step_id == step.id())
            .collect()
    }

    /// Find an option of a step by its name.
    #[must_use]
    pub fn find(&self, step: BodyPartStep, option_name: &str) -> Option<&TraitOption> {
        self.options
            .iter()
            .find(|o| o.step_id == step.id() && o.option_name == option_name)
    }
}

/// Anything that can produce a species' trait table on request.
///
/// The binary implements this over the catalog directory; tests use
/// [`InMemoryTraits`].
pub trait TraitSource {
    /// Fetch the trait table for a species.
    fn trait_table(&self, species: &SpeciesId) -> Result<TraitTable, CharwrightError>;
}

/// A [`TraitSource`] backed by a map held in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTraits {
    tables: BTreeMap<SpeciesId, Vec<TraitOption>>,
}

impl InMemoryTraits {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the options of a species.
    #[must_use]
    pub fn with_species(mut self, species: SpeciesId, options: Vec<TraitOption>) -> Self {
        self.tables.insert(species, options);
        self
    }
}

impl TraitSource for InMemoryTraits {
    fn trait_table(&self, species: &SpeciesId) -> Result<TraitTable, CharwrightError> {
        self.tables
            .get(species)
            .map(|options| TraitTable::new(species.clone(), options.clone()))
            .ok_or_else(|| CharwrightError::TraitTable(format!("no trait table for '{species}'")))
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BackgroundOption, SkillGrant};

    fn spell(name: &str, tier: u8) -> Spell {
        Spell {
            school: "Evocation".to_string(),
            name: name.to_string(),
            tier,
            description: String::new(),
            kind: "Attack".to_string(),
            damage_type: "Fire".to_string(),
            attribute: "Intellect".to_string(),
        }
    }

    fn step(id: &str) -> BackgroundStep {
        BackgroundStep {
            id: id.to_string(),
            title: id.to_string(),
            description: String::new(),
            options: vec![BackgroundOption {
                name: "Option".to_string(),
                category: "Trade".to_string(),
                narrative_text: String::new(),
                grants: SkillGrant::new("Trade", "Haggling"),
            }],
        }
    }

    #[test]
    fn duplicate_background_ids_rejected() {
        let result = OptionCatalog::new(
            BTreeMap::new(),
            vec![step("upbringing"), step("upbringing")],
            vec![],
            vec![],
            vec![],
        );
        assert!(matches!(result, Err(CharwrightError::Catalog(_))));
    }

    #[test]
    fn spell_pool_only_tier_one() {
        let catalog = OptionCatalog {
            spells: vec![spell("Spark", 1), spell("Inferno", 3), spell("Frost", 1)],
            ..OptionCatalog::default()
        };
        let names: Vec<_> = catalog.spell_pool().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Spark", "Frost"]);
    }

    #[test]
    fn spell_pool_keeps_first_of_repeated_name() {
        let mut second_spark = spell("Spark", 1);
        second_spark.school = "Storm".to_string();
        let catalog = OptionCatalog {
            spells: vec![spell("Spark", 1), second_spark, spell("Frost", 1)],
            ..OptionCatalog::default()
        };
        let pool = catalog.spell_pool();
        let names: Vec<_> = pool.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Spark", "Frost"]);
        assert_ne!(pool[0].school, "Storm");
    }

    #[test]
    fn summary_counts_steps() {
        let catalog = OptionCatalog::new(
            BTreeMap::from([(
                SpeciesId::new("Mammal"),
                SpeciesBaseTable::from_pairs([("Might", 10)]),
            )]),
            vec![step("upbringing"), step("calling")],
            vec![spell("Spark", 1)],
            vec![],
            vec!["token-1".to_string()],
        )
        .expect("catalog");

        let summary = catalog.summary();
        // species + 7 body parts + 2 backgrounds + spells + gear + finalize
        assert_eq!(summary.step_count, 13);
        assert_eq!(summary.selectable_spell_count, 1);
        assert_eq!(summary.portrait_count, 1);
    }

    #[test]
    fn in_memory_traits_missing_species_is_error() {
        let source = InMemoryTraits::new();
        let result = source.trait_table(&SpeciesId::new("Avian"));
        assert!(matches!(result, Err(CharwrightError::TraitTable(_))));
    }
}
