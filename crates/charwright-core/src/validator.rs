//! # Step Validator
//!
//! Decides whether the build may move forward from a given step.
//!
//! `validate` is total over [`StepId`]. It never mutates the selection; a
//! failure is a [`StepRejection`] carrying a message for display. The finalize
//! step always passes here; whether the finished character may be saved is
//! a separate check, [`save_guard`].

use crate::catalog::OptionCatalog;
use crate::eligibility::eligible_spells;
use crate::primitives::{MAX_CHOSEN_SPELLS, NOTICE_TTL};
use crate::stats::derive_for;
use crate::steps::StepId;
use crate::types::SelectionState;
use serde::{Deserialize, Serialize};
use std::time::Instant;

// =============================================================================
// REJECTION
// =============================================================================

/// A failed step validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepRejection {
    pub step: StepId,
    pub message: String,
}

impl StepRejection {
    fn new(step: &StepId, message: impl Into<String>) -> Self {
        Self {
            step: step.clone(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for StepRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.step, self.message)
    }
}

// =============================================================================
// VALIDATION
// =============================================================================

/// Validate the selection for one step.
pub fn validate(
    step: &StepId,
    selection: &SelectionState,
    catalog: &OptionCatalog,
) -> Result<(), StepRejection> {
    match step {
        StepId::SpeciesChoice => {
            if selection.species.is_none() {
                return Err(StepRejection::new(step, "Choose a species before continuing."));
            }
        }
        StepId::BodyPart(part) => {
            if !selection.traits.contains_key(part.id()) {
                return Err(StepRejection::new(
                    step,
                    format!("Choose a {} trait before continuing.", part.title()),
                ));
            }
        }
        StepId::Background(id) => {
            if !selection.backgrounds.contains_key(id) {
                let title = catalog
                    .background_step(id)
                    .map_or(id.as_str(), |s| s.title.as_str());
                return Err(StepRejection::new(
                    step,
                    format!("Choose an option for {title} before continuing."),
                ));
            }
        }
        StepId::SpellPick => {
            let stats = derive_for(catalog, selection).stats;
            let eligible = eligible_spells(catalog, &stats);

            if eligible.len() >= MAX_CHOSEN_SPELLS {
                if selection.spells.len() != MAX_CHOSEN_SPELLS {
                    return Err(StepRejection::new(
                        step,
                        format!("Choose exactly {MAX_CHOSEN_SPELLS} spells before continuing."),
                    ));
                }
            } else if !eligible.iter().all(|s| selection.spells.contains(&s.name)) {
                return Err(StepRejection::new(
                    step,
                    format!(
                        "Choose all {} available spell(s) before continuing.",
                        eligible.len()
                    ),
                ));
            }
        }
        StepId::GearPick => {
            if selection.gear.is_empty() {
                return Err(StepRejection::new(
                    step,
                    "Equip a weapon or armor before continuing.",
                ));
            }
        }
        StepId::Finalize => {}
    }
    Ok(())
}

/// Reason the character cannot be saved yet, if any.
#[must_use]
pub fn save_guard(selection: &SelectionState) -> Option<String> {
    if selection.name.trim().is_empty() {
        return Some("Give your character a name.".to_string());
    }
    if selection.portrait.trim().is_empty() {
        return Some("Choose a portrait.".to_string());
    }
    None
}

/// Whether the save action is enabled.
#[must_use]
pub fn can_save(selection: &SelectionState) -> bool {
    save_guard(selection).is_none()
}

// =============================================================================
// NOTICE
// =============================================================================

/// A transient message raised by a rejected advance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationNotice {
    pub message: String,
    pub raised_at: Instant,
}

impl ValidationNotice {
    #[must_use]
    pub fn raise(message: impl Into<String>, now: Instant) -> Self {
        Self {
            message: message.into(),
            raised_at: now,
        }
    }

    #[must_use]
    pub fn expires_at(&self) -> Instant {
        self.raised_at + NOTICE_TTL
    }

    /// Whether the notice should still be shown at `now`.
    #[must_use]
    pub fn is_active(&self, now: Instant) -> bool {
        now < self.expires_at()
    }
}

// =============================================================================
// TESTS
// =============================================================================
