//! # Eligibility Filters
//!
//! Predicates deciding which spells and gear a character has unlocked.
//!
//! - Spells: attribute gate, `total[spell.attribute] >= 12`, exact key match.
//! - Gear: skill gate, the item's related skill must be granted by a selected
//!   background option.
//!
//! Also home of [`ChosenSpells`], the bounded spell selection.

use crate::catalog::OptionCatalog;
use crate::primitives::{MAX_CHOSEN_SPELLS, SPELL_ATTRIBUTE_THRESHOLD};
use crate::stats::DerivedStats;
use crate::types::{BackgroundOption, GearItem, SelectionState, Spell};
use serde::{Deserialize, Serialize};

// =============================================================================
// SPELLS
// =============================================================================

/// Whether the character's totals unlock a spell.
#[must_use]
pub fn spell_eligible(spell: &Spell, stats: &DerivedStats) -> bool {
    stats
        .total(&spell.attribute)
        .is_some_and(|total| total >= SPELL_ATTRIBUTE_THRESHOLD)
}

/// Selectable spells the character has unlocked, in catalog order.
#[must_use]
pub fn eligible_spells<'a>(catalog: &'a OptionCatalog, stats: &DerivedStats) -> Vec<&'a Spell> {
    catalog
        .spell_pool()
        .into_iter()
        .filter(|spell| spell_eligible(spell, stats))
        .collect()
}

/// Outcome of toggling a spell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpellToggle {
    Added,
    Removed,
    /// Two spells already chosen; nothing changed.
    Full,
    /// The spell is not unlocked for this character; nothing changed.
    Locked,
}

/// At most [`MAX_CHOSEN_SPELLS`] distinct spells, identified by name.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<Spell>", into = "Vec<Spell>")]
pub struct ChosenSpells(Vec<Spell>);

impl ChosenSpells {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Select the spell, or deselect it if already chosen.
    pub fn toggle(&mut self, spell: Spell) -> SpellToggle {
        if let Some(pos) = self.0.iter().position(|s| s.name == spell.name) {
            self.0.remove(pos);
            return SpellToggle::Removed;
        }
        if self.0.len() >= MAX_CHOSEN_SPELLS {
            return SpellToggle::Full;
        }
        self.0.push(spell);
        SpellToggle::Added
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|s| s.name == name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Spell] {
        &self.0
    }
}

impl TryFrom<Vec<Spell>> for ChosenSpells {
    type Error = String;

    fn try_from(spells: Vec<Spell>) -> Result<Self, Self::Error> {
        let mut chosen = ChosenSpells::new();
        for spell in spells {
            let name = spell.name.clone();
            match chosen.toggle(spell) {
                SpellToggle::Added => {}
                SpellToggle::Removed => return Err(format!("spell '{name}' chosen twice")),
                SpellToggle::Full | SpellToggle::Locked => {
                    return Err(format!("at most {MAX_CHOSEN_SPELLS} spells may be chosen"));
                }
            }
        }
        Ok(chosen)
    }
}

impl From<ChosenSpells> for Vec<Spell> {
    fn from(chosen: ChosenSpells) -> Self {
        chosen.0
    }
}

// =============================================================================
// GEAR
// =============================================================================

/// Selected background options in the catalog's step order.
///
/// Selections keyed by a step id the catalog does not define are left out.
#[must_use]
pub fn selected_backgrounds<'s>(
    catalog: &OptionCatalog,
    selection: &'s SelectionState,
) -> Vec<&'s BackgroundOption> {
    catalog
        .backgrounds
        .iter()
        .filter_map(|step| selection.backgrounds.get(&step.id))
        .collect()
}

/// Skill names granted by the selected background options, in step order.
#[must_use]
pub fn acquired_skills(catalog: &OptionCatalog, selection: &SelectionState) -> Vec<String> {
    selected_backgrounds(catalog, selection)
        .into_iter()
        .map(|option| option.grants.skill().to_string())
        .collect()
}

/// Whether a gear item's related skill has been acquired.
#[must_use]
pub fn gear_eligible(item: &GearItem, acquired: &[String]) -> bool {
    acquired.iter().any(|skill| *skill == item.related_skill_name)
}

/// Gear the selection has unlocked, in catalog order.
#[must_use]
pub fn eligible_gear<'a>(catalog: &'a OptionCatalog, selection: &SelectionState) -> Vec<&'a GearItem> {
    let acquired = acquired_skills(catalog, selection);
    catalog
        .gear
        .iter()
        .filter(|item| gear_eligible(item, &acquired))
        .collect()
}

// =============================================================================
// TESTS
// =============================================================================
