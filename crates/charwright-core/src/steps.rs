//! # Build Steps
//!
//! Step identity for the build wizard.
//!
//! | Position | Step | Count |
//! |----------|------|-------|
//! | 0 | `SpeciesChoice` | 1 |
//! | 1..=7 | `BodyPart(..)` | 7, fixed |
//! | 8.. | `Background(id)` | N, from the catalog |
//! | N+8 | `SpellPick` | 1 |
//! | N+9 | `GearPick` | 1 |
//! | N+10 | `Finalize` | 1 |
//!
//! The sequence is built once per catalog and never changes afterwards.

use crate::catalog::OptionCatalog;
use serde::{Deserialize, Serialize};

// =============================================================================
// BODY PART STEPS
// =============================================================================

/// The seven fixed body-part steps, in build order.
///
/// `Stature` comes first and is the only step whose options carry signed
/// multi-attribute deltas instead of two `+1` grants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BodyPartStep {
    Stature,
    Head,
    Torso,
    Arms,
    Legs,
    Skin,
    Senses,
}

impl BodyPartStep {
    /// All body-part steps in build order.
    pub const ALL: [BodyPartStep; 7] = [
        BodyPartStep::Stature,
        BodyPartStep::Head,
        BodyPartStep::Torso,
        BodyPartStep::Arms,
        BodyPartStep::Legs,
        BodyPartStep::Skin,
        BodyPartStep::Senses,
    ];

    /// The `step_id` string trait options use for this step.
    #[must_use]
    pub fn id(&self) -> &'static str {
        match self {
            BodyPartStep::Stature => "stature",
            BodyPartStep::Head => "head",
            BodyPartStep::Torso => "torso",
            BodyPartStep::Arms => "arms",
            BodyPartStep::Legs => "legs",
            BodyPartStep::Skin => "skin",
            BodyPartStep::Senses => "senses",
        }
    }

    #[must_use]
    pub fn title(&self) -> &'static str {
        match self {
            BodyPartStep::Stature => "Stature",
            BodyPartStep::Head => "Head",
            BodyPartStep::Torso => "Torso",
            BodyPartStep::Arms => "Arms",
            BodyPartStep::Legs => "Legs",
            BodyPartStep::Skin => "Skin & Covering",
            BodyPartStep::Senses => "Senses",
        }
    }

    /// Parse a catalog `step_id`.
    #[must_use]
    pub fn from_id(id: &str) -> Option<BodyPartStep> {
        Self::ALL.into_iter().find(|s| s.id() == id)
    }
}

impl std::fmt::Display for BodyPartStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

// =============================================================================
// STEP ID
// =============================================================================

/// One position in the build sequence.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum StepId {
    SpeciesChoice,
    BodyPart(BodyPartStep),
    Background(String),
    SpellPick,
    GearPick,
    Finalize,
}

impl StepId {
    /// Short stable key, used in logs and CLI output.
    #[must_use]
    pub fn key(&self) -> String {
        match self {
            StepId::SpeciesChoice => "species".to_string(),
            StepId::BodyPart(part) => format!("body:{}", part.id()),
            StepId::Background(id) => format!("background:{id}"),
            StepId::SpellPick => "spells".to_string(),
            StepId::GearPick => "gear".to_string(),
            StepId::Finalize => "finalize".to_string(),
        }
    }

    /// Parse a key produced by [`StepId::key`].
    #[must_use]
    pub fn from_key(key: &str) -> Option<StepId> {
        match key {
            "species" => Some(StepId::SpeciesChoice),
            "spells" => Some(StepId::SpellPick),
            "gear" => Some(StepId::GearPick),
            "finalize" => Some(StepId::Finalize),
            _ => {
                if let Some(part) = key.strip_prefix("body:") {
                    BodyPartStep::from_id(part).map(StepId::BodyPart)
                } else {
                    key.strip_prefix("background:")
                        .filter(|id| !id.is_empty())
                        .map(|id| StepId::Background(id.to_string()))
                }
            }
        }
    }

    #[must_use]
    pub fn is_finalize(&self) -> bool {
        matches!(self, StepId::Finalize)
    }
}

impl std::fmt::Display for StepId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.key())
    }
}

/// Build the full step sequence for a catalog.
#[must_use]
pub fn build_step_sequence(catalog: &OptionCatalog) -> Vec<StepId> {
    let mut steps = Vec::with_capacity(BodyPartStep::ALL.len() + catalog.backgrounds.len() + 4);
    steps.push(StepId::SpeciesChoice);
    steps.extend(BodyPartStep::ALL.into_iter().map(StepId::BodyPart));
    steps.extend(
        catalog
            .backgrounds
            .iter()
            .map(|b| StepId::Background(b.id.clone())),
    );
    steps.push(StepId::SpellPick);
    steps.push(StepId::GearPick);
    steps.push(StepId::Finalize);
    steps
}

// =============================================================================
// TESTS
// =============================================================================
