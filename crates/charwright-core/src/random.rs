//! # Random Character Generation
//!
//! Fabricates a fully populated [`SelectionState`] straight from the catalog.
//!
//! This path deliberately skips step validation and eligibility filtering:
//! a random character may hold spells its attributes do not unlock. Every
//! pick is uniform and driven by a caller-supplied `Rng`, so a seeded RNG
//! reproduces the same character.

use crate::catalog::{OptionCatalog, TraitSource, TraitTable};
use crate::primitives::MAX_CHOSEN_SPELLS;
use crate::steps::BodyPartStep;
use crate::types::{CharwrightError, SelectionState, SpeciesId};
use rand::Rng;
use rand::seq::SliceRandom;

/// First half of a generated name.
pub const NAME_PREFIXES: [&str; 10] = [
    "Ash", "Bram", "Cor", "Dun", "El", "Fen", "Gal", "Hal", "Ith", "Kor",
];

/// Second half of a generated name.
pub const NAME_SUFFIXES: [&str; 10] = [
    "wyn", "ric", "mira", "dal", "eth", "os", "ara", "mund", "iel", "var",
];

/// Species ids used by [`SpeciesPool::Fixed`] when none are configured.
pub const DEFAULT_RANDOM_SPECIES: [&str; 5] = ["Mammal", "Reptile", "Avian", "Amphibian", "Insectoid"];

/// Where the random generator draws its species from.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SpeciesPool {
    /// Every species present in the catalog at generation time.
    #[default]
    Catalog,
    /// A fixed list, independent of the catalog. Ids the catalog does not
    /// know still get picked and fall back to default attributes.
    Fixed(Vec<SpeciesId>),
}

impl SpeciesPool {
    /// The fixed pool of [`DEFAULT_RANDOM_SPECIES`].
    #[must_use]
    pub fn default_fixed() -> Self {
        Self::Fixed(DEFAULT_RANDOM_SPECIES.iter().map(|s| SpeciesId::new(*s)).collect())
    }

    fn candidates(&self, catalog: &OptionCatalog) -> Vec<SpeciesId> {
        match self {
            SpeciesPool::Catalog => catalog.species_ids(),
            SpeciesPool::Fixed(ids) => ids.clone(),
        }
    }
}

/// A generated selection together with the trait table it was drawn from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RandomCharacter {
    pub selection: SelectionState,
    pub trait_table: Option<TraitTable>,
}

/// Generates random characters.
#[derive(Debug, Clone, Default)]
pub struct RandomGenerator {
    pool: SpeciesPool,
}

impl RandomGenerator {
    #[must_use]
    pub fn new(pool: SpeciesPool) -> Self {
        Self { pool }
    }

    #[must_use]
    pub fn pool(&self) -> &SpeciesPool {
        &self.pool
    }

    /// Generate a complete selection.
    ///
    /// Fails only if there is no species to pick from. A trait table that
    /// cannot be fetched leaves every body-part step empty.
    pub fn generate<R: Rng + ?Sized>(
        &self,
        catalog: &OptionCatalog,
        source: &dyn TraitSource,
        rng: &mut R,
    ) -> Result<RandomCharacter, CharwrightError> {
        let species = self
            .pool
            .candidates(catalog)
            .choose(rng)
            .cloned()
            .ok_or_else(|| CharwrightError::Catalog("no species to pick from".to_string()))?;

        let mut selection = SelectionState::new();
        selection.choose_species(species.clone());

        let trait_table = match source.trait_table(&species) {
            Ok(table) => Some(table),
            Err(e) => {
                tracing::warn!(species = %species, error = %e, "Random character has no trait table");
                None
            }
        };

        if let Some(table) = &trait_table {
            for step in BodyPartStep::ALL {
                let options = table.options_for(step);
                if let Some(option) = options.choose(rng) {
                    selection
                        .traits
                        .insert(step.id().to_string(), (*option).clone());
                }
            }
        }

        for step in &catalog.backgrounds {
            if let Some(option) = step.options.choose(rng) {
                selection.backgrounds.insert(step.id.clone(), option.clone());
            }
        }

        selection.name = random_name(rng);

        if let Some(token) = catalog.portraits.choose(rng) {
            selection.portrait = token.clone();
        }

        // Tier 1 only, the same pool the spell step offers.
        let pool = catalog.spell_pool();
        if pool.len() >= MAX_CHOSEN_SPELLS {
            for spell in pool.choose_multiple(rng, MAX_CHOSEN_SPELLS) {
                selection.spells.toggle((*spell).clone());
            }
        }

        tracing::debug!(
            species = %species,
            name = %selection.name,
            traits = selection.traits.len(),
            spells = selection.spells.len(),
            "Generated random character"
        );

        Ok(RandomCharacter {
            selection,
            trait_table,
        })
    }
}

/// A name built from one prefix and one suffix.
pub fn random_name<R: Rng + ?Sized>(rng: &mut R) -> String {
    let prefix = NAME_PREFIXES.choose(rng).copied().unwrap_or("Nameless");
    let suffix = NAME_SUFFIXES.choose(rng).copied().unwrap_or("");
    format!("{prefix}{suffix}")
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{InMemoryTraits, SpeciesBaseTable};
    use crate::types::{BackgroundOption, BackgroundStep, SkillGrant, Spell, TraitOption};
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::BTreeMap;

    fn trait_option(step: BodyPartStep, name: &str) -> TraitOption {
        TraitOption {
            step_id: step.id().to_string(),
            category: "Form".to_string(),
            body_part: step.title().to_string(),
            stat1: "Might".to_string(),
            stat2: "Wits".to_string(),
            mechanic_text: String::new(),
            option_name: name.to_string(),
        }
    }

    fn spell(name: &str) -> Spell {
        Spell {
            school: "Evocation".to_string(),
            name: name.to_string(),
            tier: 1,
            description: String::new(),
            kind: "Attack".to_string(),
            damage_type: "Fire".to_string(),
            attribute: "Presence".to_string(),
        }
    }

    fn catalog() -> OptionCatalog {
        OptionCatalog {
            species: BTreeMap::from([(
                SpeciesId::new("Mammal"),
                SpeciesBaseTable::from_pairs([("Might", 10)]),
            )]),
            backgrounds: vec![BackgroundStep {
                id: "upbringing".to_string(),
                title: "Upbringing".to_string(),
                description: String::new(),
                options: vec![BackgroundOption {
                    name: "Farmhand".to_string(),
                    category: "Rural".to_string(),
                    narrative_text: "Raised among the barley.".to_string(),
                    grants: SkillGrant::new("Rural", "Husbandry"),
                }],
            }],
            spells: vec![spell("Flare"), spell("Glimmer"), spell("Hex")],
            gear: vec![],
            portraits: vec!["token-1".to_string(), "token-2".to_string()],
        }
    }

    fn traits() -> InMemoryTraits {
        // No "senses" options: that step must stay empty.
        InMemoryTraits::new().with_species(
            SpeciesId::new("Mammal"),
            BodyPartStep::ALL
                .into_iter()
                .filter(|s| *s != BodyPartStep::Senses)
                .map(|s| trait_option(s, &format!("{s} A")))
                .collect(),
        )
    }

    #[test]
    fn generates_complete_selection() {
        let mut rng = StdRng::seed_from_u64(7);
        let generated = RandomGenerator::default()
            .generate(&catalog(), &traits(), &mut rng)
            .expect("generate");
        let selection = generated.selection;

        assert_eq!(selection.species, Some(SpeciesId::new("Mammal")));
        assert_eq!(selection.traits.len(), 6);
        assert!(!selection.traits.contains_key("senses"));
        assert_eq!(selection.backgrounds.len(), 1);
        assert_eq!(selection.spells.len(), 2);
        assert!(!selection.name.is_empty());
        assert!(selection.portrait.starts_with("token-"));
        assert!(generated.trait_table.is_some());
    }

    #[test]
    fn spells_are_not_filtered_by_eligibility() {
        // Presence stays at 10, below the spell threshold.
        let mut rng = StdRng::seed_from_u64(11);
        let generated = RandomGenerator::default()
            .generate(&catalog(), &traits(), &mut rng)
            .expect("generate");
        assert_eq!(generated.selection.spells.len(), 2);
    }

    #[test]
    fn same_seed_same_character() {
        let a = RandomGenerator::default()
            .generate(&catalog(), &traits(), &mut StdRng::seed_from_u64(42))
            .expect("generate");
        let b = RandomGenerator::default()
            .generate(&catalog(), &traits(), &mut StdRng::seed_from_u64(42))
            .expect("generate");
        assert_eq!(a, b);
    }

    #[test]
    fn repeated_spell_names_still_yield_two_spells() {
        let mut catalog = catalog();
        catalog.spells = vec![spell("Flare"), spell("Flare"), spell("Hex")];
        for seed in 0..30 {
            let generated = RandomGenerator::default()
                .generate(&catalog, &traits(), &mut StdRng::seed_from_u64(seed))
                .expect("generate");
            assert_eq!(generated.selection.spells.len(), 2);
            assert!(generated.selection.spells.contains("Flare"));
            assert!(generated.selection.spells.contains("Hex"));
        }
    }

    #[test]
    fn higher_tier_spells_are_never_drawn() {
        let mut catalog = catalog();
        let mut quake = spell("Quake");
        quake.tier = 2;
        let mut storm = spell("Storm");
        storm.tier = 3;
        catalog.spells = vec![spell("Flare"), quake, storm];

        let generated = RandomGenerator::default()
            .generate(&catalog, &traits(), &mut StdRng::seed_from_u64(5))
            .expect("generate");
        assert!(generated.selection.spells.is_empty());
    }

    #[test]
    fn missing_trait_table_leaves_traits_empty() {
        let mut rng = StdRng::seed_from_u64(3);
        let generated = RandomGenerator::default()
            .generate(&catalog(), &InMemoryTraits::new(), &mut rng)
            .expect("generate");
        assert!(generated.selection.traits.is_empty());
        assert!(generated.trait_table.is_none());
    }

    #[test]
    fn fixed_pool_ignores_catalog() {
        let generator = RandomGenerator::new(SpeciesPool::Fixed(vec![SpeciesId::new("Avian")]));
        let generated = generator
            .generate(&catalog(), &traits(), &mut StdRng::seed_from_u64(1))
            .expect("generate");
        assert_eq!(generated.selection.species, Some(SpeciesId::new("Avian")));
    }

    #[test]
    fn empty_pool_is_error() {
        let generator = RandomGenerator::new(SpeciesPool::Fixed(vec![]));
        let result = generator.generate(&catalog(), &traits(), &mut StdRng::seed_from_u64(1));
        assert!(matches!(result, Err(CharwrightError::Catalog(_))));
    }

    #[test]
    fn names_come_from_word_lists() {
        let mut rng = StdRng::seed_from_u64(99);
        for _ in 0..20 {
            let name = random_name(&mut rng);
            let prefix = NAME_PREFIXES.iter().find(|p| name.starts_with(*p));
            let suffix = prefix.map(|p| &name[p.len()..]);
            assert!(suffix.is_some_and(|s| NAME_SUFFIXES.contains(&s)));
        }
    }
}
