//! # Stat Derivation
//!
//! Pure mapping from (species base table, selected traits) to
//! `{ base, bonus, total }` attribute maps.
//!
//! ## Algorithm
//!
//! 1. `base` = core attributes at 10, overlaid by the species table.
//! 2. `bonus[*] = 0`, `total = base`.
//! 3. Stature option: every `(+|-)N Attribute` token in its two text fields is
//!    applied as a signed delta.
//! 4. Every other body-part option, in fixed step order: `+1` to `stat1`, `+1`
//!    to `stat2`.
//!
//! Every application touches `bonus` and `total` together, so
//! `total[a] == base[a] + bonus[a]` holds after each step. Names that are not
//! in `base` never fail the derivation; they are reported as
//! [`SkippedModifier`]s.

use crate::catalog::{OptionCatalog, SpeciesBaseTable};
use crate::primitives::{CORE_ATTRIBUTES, DEFAULT_ATTRIBUTE_VALUE, NO_STAT};
use crate::steps::BodyPartStep;
use crate::types::{AttributeMap, SelectionState, TraitOption};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Matches signed modifiers like `+1 Might` or `-2 Finesse`.
static SIGNED_DELTA_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?P<delta>[+-]\d+)\s*(?P<attribute>[A-Za-z]+)")
        .expect("Failed to compile signed delta regex")
});

// =============================================================================
// DERIVED STATS
// =============================================================================

/// Base, bonus and total attribute maps for one character.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DerivedStats {
    pub base: AttributeMap,
    pub bonus: AttributeMap,
    pub total: AttributeMap,
}

impl DerivedStats {
    /// Start from a base map with zero bonus.
    #[must_use]
    pub fn from_base(base: AttributeMap) -> Self {
        let bonus = base.keys().map(|k| (k.clone(), 0)).collect();
        let total = base.clone();
        Self { base, bonus, total }
    }

    /// Apply a delta to an attribute. Returns `false` if `base` lacks it.
    fn apply(&mut self, attribute: &str, delta: i32) -> bool {
        if !self.base.contains_key(attribute) {
            return false;
        }
        if let Some(bonus) = self.bonus.get_mut(attribute) {
            *bonus = bonus.saturating_add(delta);
        }
        if let Some(total) = self.total.get_mut(attribute) {
            *total = total.saturating_add(delta);
        }
        true
    }

    #[must_use]
    pub fn base(&self, attribute: &str) -> Option<i32> {
        self.base.get(attribute).copied()
    }

    #[must_use]
    pub fn bonus(&self, attribute: &str) -> Option<i32> {
        self.bonus.get(attribute).copied()
    }

    #[must_use]
    pub fn total(&self, attribute: &str) -> Option<i32> {
        self.total.get(attribute).copied()
    }

    /// Check `total == base + bonus` across every attribute.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.base.len() == self.bonus.len()
            && self.base.len() == self.total.len()
            && self.base.iter().all(|(attr, base)| {
                let bonus = self.bonus.get(attr).copied().unwrap_or(0);
                self.total.get(attr).copied() == Some(base.saturating_add(bonus))
            })
    }
}

/// Why a modifier was left out of a derivation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// The attribute is not in the character's base table.
    #[default]
    UnknownAttribute,
    /// The signed number does not fit an attribute value.
    DeltaOutOfRange,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::UnknownAttribute => f.write_str("unknown attribute"),
            SkipReason::DeltaOutOfRange => f.write_str("delta out of range"),
        }
    }
}

/// A modifier that could not be applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedModifier {
    pub step: BodyPartStep,
    pub option: String,
    pub attribute: String,
    #[serde(default)]
    pub reason: SkipReason,
}

/// Result of a derivation: the stats plus the modifiers that were dropped.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Derivation {
    pub stats: DerivedStats,
    pub skipped: Vec<SkippedModifier>,
}

// =============================================================================
// DERIVATION
// =============================================================================

/// Core attributes at their default, overlaid by the species table.
#[must_use]
pub fn base_attributes(table: Option<&SpeciesBaseTable>) -> AttributeMap {
    let mut base: AttributeMap = CORE_ATTRIBUTES
        .iter()
        .map(|a| ((*a).to_string(), DEFAULT_ATTRIBUTE_VALUE))
        .collect();
    if let Some(table) = table {
        base.extend(table.0.iter().map(|(k, v)| (k.clone(), *v)));
    }
    base
}

/// Extract every signed `(attribute, delta)` token from stature text.
///
/// A delta is `None` when its number does not fit in an `i32`.
#[must_use]
pub fn parse_signed_deltas(text: &str) -> Vec<(String, Option<i32>)> {
    SIGNED_DELTA_PATTERN
        .captures_iter(text)
        .filter_map(|caps| {
            let delta = caps.name("delta")?.as_str().parse::<i32>().ok();
            let attribute = caps.name("attribute")?.as_str().to_string();
            Some((attribute, delta))
        })
        .collect()
}

/// Derive stats from a base table and trait selections keyed by step id.
///
/// Only the seven body-part step ids are read; stature is always applied
/// first regardless of map order.
#[must_use]
pub fn derive(
    table: Option<&SpeciesBaseTable>,
    traits: &BTreeMap<String, TraitOption>,
) -> Derivation {
    let mut stats = DerivedStats::from_base(base_attributes(table));
    let mut skipped = Vec::new();

    for step in BodyPartStep::ALL {
        let Some(option) = traits.get(step.id()) else {
            continue;
        };

        let modifiers: Vec<(String, Option<i32>)> = if step == BodyPartStep::Stature {
            parse_signed_deltas(&option.stat1)
                .into_iter()
                .chain(parse_signed_deltas(&option.stat2))
                .collect()
        } else {
            [&option.stat1, &option.stat2]
                .into_iter()
                .map(|s| s.trim())
                .filter(|s| !s.is_empty() && !s.eq_ignore_ascii_case(NO_STAT))
                .map(|s| (s.to_string(), Some(1)))
                .collect()
        };

        for (attribute, delta) in modifiers {
            let reason = match delta {
                Some(delta) if stats.apply(&attribute, delta) => continue,
                Some(_) => SkipReason::UnknownAttribute,
                None => SkipReason::DeltaOutOfRange,
            };
            tracing::debug!(
                step = %step,
                option = %option.option_name,
                attribute = %attribute,
                reason = %reason,
                "Skipping modifier"
            );
            skipped.push(SkippedModifier {
                step,
                option: option.option_name.clone(),
                attribute,
                reason,
            });
        }
    }

    Derivation { stats, skipped }
}

/// Derive stats for a selection against a catalog.
///
/// With no species chosen (or an unknown one) every core attribute sits at
/// its default.
#[must_use]
pub fn derive_for(catalog: &OptionCatalog, selection: &SelectionState) -> Derivation {
    let table = selection
        .species
        .as_ref()
        .and_then(|id| catalog.base_table(id));
    derive(table, &selection.traits)
}

// =============================================================================
// TESTS
// =============================================================================
