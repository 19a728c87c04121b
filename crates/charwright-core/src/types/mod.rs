//! # Core Type Definitions
//!
//! This module contains the catalog and selection types shared by every rule:
//! - Identifiers (`SpeciesId`)
//! - Catalog entries (`TraitOption`, `BackgroundStep`, `BackgroundOption`, `Spell`, `GearItem`)
//! - The mutable build state (`SelectionState`, `ChosenGear`)
//! - Error types (`CharwrightError`)
//!
//! ## Determinism Guarantees
//!
//! - Attributes are plain `i32` values, no floating point
//! - Keyed collections are `BTreeMap` so iteration order is stable

use crate::eligibility::ChosenSpells;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Attribute name to integer value.
pub type AttributeMap = BTreeMap<String, i32>;

// =============================================================================
// IDENTIFIERS
// =============================================================================

/// Identifier of a species (ancestry) in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpeciesId(pub String);

impl SpeciesId {
    /// Create a new species id.
    #[must_use]
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SpeciesId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// TRAIT OPTIONS
// =============================================================================

/// A selectable body-part trait from a species' trait table.
///
/// Ordinary options grant `+1` to `stat1` and `+1` to `stat2`. Options of the
/// stature step instead carry free text such as `"+1 Might, -1 Finesse"` in
/// both stat fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraitOption {
    /// The body-part step this option belongs to (e.g. `"arms"`).
    pub step_id: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub body_part: String,
    #[serde(default)]
    pub stat1: String,
    #[serde(default)]
    pub stat2: String,
    #[serde(default)]
    pub mechanic_text: String,
    pub option_name: String,
}

// =============================================================================
// BACKGROUNDS
// =============================================================================

/// The `[category, skill_name]` pair a background option grants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillGrant(pub String, pub String);

impl SkillGrant {
    /// Create a new grant.
    #[must_use]
    pub fn new(category: impl Into<String>, skill: impl Into<String>) -> Self {
        Self(category.into(), skill.into())
    }

    #[must_use]
    pub fn category(&self) -> &str {
        &self.0
    }

    /// The skill name; this is what gear eligibility matches against.
    #[must_use]
    pub fn skill(&self) -> &str {
        &self.1
    }
}

/// One choice within a background step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackgroundOption {
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub narrative_text: String,
    pub grants: SkillGrant,
}

/// A catalog-defined background stage with its own option list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackgroundStep {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub options: Vec<BackgroundOption>,
}

impl BackgroundStep {
    /// Find an option of this step by name.
    #[must_use]
    pub fn find_option(&self, name: &str) -> Option<&BackgroundOption> {
        self.options.iter().find(|o| o.name == name)
    }
}

// =============================================================================
// SPELLS & GEAR
// =============================================================================

/// A spell from the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Spell {
    #[serde(default)]
    pub school: String,
    pub name: String,
    pub tier: u8,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub damage_type: String,
    /// Attribute whose total gates this spell. Matched exactly, no normalization.
    pub attribute: String,
}

/// Which equipment slot a gear item occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GearSlot {
    Weapon,
    Armor,
}

/// A piece of gear from the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GearItem {
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    /// Skill a character must have acquired for this item to be unlocked.
    pub related_skill_name: String,
    #[serde(default)]
    pub effect_text: String,
    #[serde(default)]
    pub cost: u32,
}

impl GearItem {
    /// The slot this item equips into.
    ///
    /// Items typed `Armor` or `Shield` (any case) go to the armor slot;
    /// everything else is treated as a weapon.
    #[must_use]
    pub fn slot(&self) -> GearSlot {
        let kind = self.kind.trim();
        if kind.eq_ignore_ascii_case("armor") || kind.eq_ignore_ascii_case("shield") {
            GearSlot::Armor
        } else {
            GearSlot::Weapon
        }
    }
}

/// The two equipment slots of a character under construction.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ChosenGear {
    #[serde(default)]
    pub weapon: Option<GearItem>,
    #[serde(default)]
    pub armor: Option<GearItem>,
}

impl ChosenGear {
    /// Put an item into its slot, replacing whatever was there.
    pub fn equip(&mut self, item: GearItem) -> GearSlot {
        let slot = item.slot();
        match slot {
            GearSlot::Weapon => self.weapon = Some(item),
            GearSlot::Armor => self.armor = Some(item),
        }
        slot
    }

    /// Empty a slot.
    pub fn unequip(&mut self, slot: GearSlot) {
        match slot {
            GearSlot::Weapon => self.weapon = None,
            GearSlot::Armor => self.armor = None,
        }
    }

    /// True when neither slot is filled.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.weapon.is_none() && self.armor.is_none()
    }

    /// Filled slots as a list, weapon first.
    #[must_use]
    pub fn items(&self) -> Vec<&GearItem> {
        self.weapon.iter().chain(self.armor.iter()).collect()
    }
}

// =============================================================================
// SELECTION STATE
// =============================================================================

/// Everything the user (or the random generator) has chosen so far.
///
/// Trait and background selections are keyed by their step id. The state is
/// replaced wholesale on every change; derived values are never stored here.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SelectionState {
    #[serde(default)]
    pub species: Option<SpeciesId>,
    #[serde(default)]
    pub traits: BTreeMap<String, TraitOption>,
    #[serde(default)]
    pub backgrounds: BTreeMap<String, BackgroundOption>,
    #[serde(default)]
    pub spells: ChosenSpells,
    #[serde(default)]
    pub gear: ChosenGear,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub backstory: String,
    #[serde(default)]
    pub portrait: String,
}

impl SelectionState {
    /// Create an empty selection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Choose a species. Switching to a different species clears every
    /// body-part trait, since those belong to the previous species' table.
    pub fn choose_species(&mut self, species: SpeciesId) {
        if self.species.as_ref() != Some(&species) {
            self.traits.clear();
        }
        self.species = Some(species);
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur in the Charwright system.
///
/// Validation failures are not errors; they are reported as
/// [`crate::validator::StepRejection`] values.
#[derive(Debug, Error)]
pub enum CharwrightError {
    /// The step id is not part of this build sequence.
    #[error("Unknown step: {0}")]
    UnknownStep(String),

    /// No option with this name exists in the given step.
    #[error("Unknown option '{option}' for step '{step}'")]
    UnknownOption { step: String, option: String },

    /// The species id is not present in the catalog.
    #[error("Unknown species: {0}")]
    UnknownSpecies(SpeciesId),

    /// An operation needs data that has not arrived yet.
    #[error("Not ready: {0}")]
    NotReady(String),

    /// The save guard (name and portrait) is not satisfied.
    #[error("Character cannot be saved yet: {0}")]
    SaveBlocked(String),

    /// A catalog document could not be loaded or is inconsistent.
    #[error("Catalog error: {0}")]
    Catalog(String),

    /// A species trait table could not be fetched.
    #[error("Trait table error: {0}")]
    TraitTable(String),

    /// A serialization or deserialization error occurred.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(String),
}

// =============================================================================
// TESTS
// =============================================================================
