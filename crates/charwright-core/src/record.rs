//! # Character Record
//!
//! The final, persistable form of a finished character.
//!
//! The record is a snapshot: stats are the derived totals at assembly time,
//! and traits flatten body-part options and background skills into one list.

use crate::catalog::OptionCatalog;
use crate::eligibility::selected_backgrounds;
use crate::primitives::SKILL_MASTERY_EFFECT;
use crate::stats::DerivedStats;
use crate::steps::BodyPartStep;
use crate::types::{AttributeMap, ChosenGear, GearItem, SelectionState, Spell};
use serde::{Deserialize, Serialize};

/// One entry in a record's trait list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TraitEntry {
    /// A selected body-part trait.
    BodyPart {
        name: String,
        category: String,
        effect_text: String,
        body_part: String,
    },
    /// A skill granted by a background option.
    Skill {
        name: String,
        category: String,
        effect: String,
    },
}

impl TraitEntry {
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            TraitEntry::BodyPart { name, .. } | TraitEntry::Skill { name, .. } => name,
        }
    }
}

/// A finished character, ready to hand to persistence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterRecord {
    pub name: String,
    pub species: String,
    pub stats: AttributeMap,
    pub traits: Vec<TraitEntry>,
    pub powers: Vec<Spell>,
    pub inventory: Vec<GearItem>,
    pub gear: ChosenGear,
    pub backstory: String,
    pub portrait: String,
}

impl CharacterRecord {
    /// Assemble a record from a selection and its derived stats.
    ///
    /// Body-part traits come first in step order, followed by one skill entry
    /// per selected background option in the catalog's step order.
    #[must_use]
    pub fn assemble(
        catalog: &OptionCatalog,
        selection: &SelectionState,
        stats: &DerivedStats,
    ) -> Self {
        let body_traits = BodyPartStep::ALL.into_iter().filter_map(|step| {
            selection.traits.get(step.id()).map(|o| TraitEntry::BodyPart {
                name: o.option_name.clone(),
                category: o.category.clone(),
                effect_text: o.mechanic_text.clone(),
                body_part: o.body_part.clone(),
            })
        });
        let skills = selected_backgrounds(catalog, selection)
            .into_iter()
            .map(|o| TraitEntry::Skill {
                name: o.grants.skill().to_string(),
                category: o.category.clone(),
                effect: SKILL_MASTERY_EFFECT.to_string(),
            });

        Self {
            name: selection.name.clone(),
            species: selection
                .species
                .as_ref()
                .map(|s| s.as_str().to_string())
                .unwrap_or_default(),
            stats: stats.total.clone(),
            traits: body_traits.chain(skills).collect(),
            powers: selection.spells.as_slice().to_vec(),
            inventory: selection.gear.items().into_iter().cloned().collect(),
            gear: selection.gear.clone(),
            backstory: selection.backstory.clone(),
            portrait: selection.portrait.clone(),
        }
    }
}
