//! # Build Session
//!
//! One character build: catalog, selection, wizard, and the species trait
//! table, threaded together.
//!
//! - The selection is replaced wholesale on every change; derived values are
//!   recomputed from it on demand
//! - Trait tables are requested per species with a sequence-numbered
//!   [`TraitRequest`]; responses for anything but the latest request are
//!   discarded
//! - Random generation is a separate operation that bypasses every gate

use crate::caps::{CapWarning, cap_warnings};
use crate::catalog::{OptionCatalog, TraitSource, TraitTable};
use crate::eligibility::{
    SpellToggle, acquired_skills, eligible_gear, eligible_spells, selected_backgrounds,
    spell_eligible,
};
use crate::random::RandomGenerator;
use crate::record::CharacterRecord;
use crate::stats::{Derivation, DerivedStats, derive_for};
use crate::steps::{BodyPartStep, StepId};
use crate::types::{CharwrightError, GearItem, GearSlot, SelectionState, SpeciesId, Spell};
use crate::validator::{StepRejection, ValidationNotice, save_guard};
use crate::wizard::WizardStateMachine;
use rand::Rng;
use std::sync::Arc;
use std::time::Instant;

/// Ticket for an in-flight trait-table fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraitRequest {
    pub species: SpeciesId,
    pub sequence: u64,
}

/// A single character build.
#[derive(Debug, Clone)]
pub struct BuildSession {
    catalog: Arc<OptionCatalog>,
    wizard: WizardStateMachine,
    selection: SelectionState,
    trait_table: Option<TraitTable>,
    trait_sequence: u64,
    notice: Option<ValidationNotice>,
    backstory_seeded: bool,
}

impl BuildSession {
    /// Start an empty build at the species step.
    #[must_use]
    pub fn new(catalog: Arc<OptionCatalog>) -> Self {
        let wizard = WizardStateMachine::new(&catalog);
        Self {
            catalog,
            wizard,
            selection: SelectionState::new(),
            trait_table: None,
            trait_sequence: 0,
            notice: None,
            backstory_seeded: false,
        }
    }

    /// Resume a build from an existing selection, positioned at the first step.
    #[must_use]
    pub fn with_selection(catalog: Arc<OptionCatalog>, selection: SelectionState) -> Self {
        let mut session = Self::new(catalog);
        session.selection = selection;
        session
    }

    #[must_use]
    pub fn catalog(&self) -> &OptionCatalog {
        &self.catalog
    }

    #[must_use]
    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    #[must_use]
    pub fn wizard(&self) -> &WizardStateMachine {
        &self.wizard
    }

    #[must_use]
    pub fn current_step(&self) -> &StepId {
        self.wizard.current()
    }

    #[must_use]
    pub fn trait_table(&self) -> Option<&TraitTable> {
        self.trait_table.as_ref()
    }

    /// Copy the selection, edit the copy, replace the original.
    fn revise(&mut self, edit: impl FnOnce(&mut SelectionState)) {
        let mut next = self.selection.clone();
        edit(&mut next);
        self.selection = next;
    }

    // =========================================================================
    // SPECIES & TRAIT TABLES
    // =========================================================================

    /// Choose a species and open a trait-table request for it.
    ///
    /// A different species clears the body-part traits and the loaded table.
    pub fn select_species(&mut self, species: SpeciesId) -> Result<TraitRequest, CharwrightError> {
        if !self.catalog.has_species(&species) {
            return Err(CharwrightError::UnknownSpecies(species));
        }
        if self.selection.species.as_ref() != Some(&species) {
            self.trait_table = None;
        }
        let chosen = species.clone();
        self.revise(|s| s.choose_species(chosen));

        self.trait_sequence += 1;
        Ok(TraitRequest {
            species,
            sequence: self.trait_sequence,
        })
    }

    /// Deliver the result of a trait-table fetch.
    ///
    /// Returns `true` if the table was installed. Stale responses and failed
    /// fetches leave the current table as it is.
    pub fn receive_trait_table(
        &mut self,
        request: &TraitRequest,
        result: Result<TraitTable, CharwrightError>,
    ) -> bool {
        if request.sequence != self.trait_sequence {
            tracing::debug!(
                species = %request.species,
                sequence = request.sequence,
                latest = self.trait_sequence,
                "Discarding stale trait table response"
            );
            return false;
        }
        match result {
            Ok(table) => {
                self.trait_table = Some(table);
                true
            }
            Err(e) => {
                tracing::warn!(species = %request.species, error = %e, "Trait table fetch failed");
                false
            }
        }
    }

    /// Choose a species and fetch its trait table synchronously.
    pub fn select_species_from(
        &mut self,
        species: SpeciesId,
        source: &dyn TraitSource,
    ) -> Result<bool, CharwrightError> {
        let request = self.select_species(species)?;
        let result = source.trait_table(&request.species);
        Ok(self.receive_trait_table(&request, result))
    }

    /// Select a body-part trait from the loaded table.
    pub fn select_trait(&mut self, step: BodyPartStep, option_name: &str) -> Result<(), CharwrightError> {
        let table = self.trait_table.as_ref().ok_or_else(|| {
            CharwrightError::NotReady(format!("no trait table loaded for step {step}"))
        })?;
        let option = table
            .find(step, option_name)
            .cloned()
            .ok_or_else(|| CharwrightError::UnknownOption {
                step: step.id().to_string(),
                option: option_name.to_string(),
            })?;
        self.revise(|s| {
            s.traits.insert(step.id().to_string(), option);
        });
        Ok(())
    }

    pub fn clear_trait(&mut self, step: BodyPartStep) {
        self.revise(|s| {
            s.traits.remove(step.id());
        });
    }

    // =========================================================================
    // BACKGROUNDS, SPELLS, GEAR
    // =========================================================================

    /// Select an option of a background step.
    pub fn select_background(&mut self, step_id: &str, option_name: &str) -> Result<(), CharwrightError> {
        let step = self
            .catalog
            .background_step(step_id)
            .ok_or_else(|| CharwrightError::UnknownStep(step_id.to_string()))?;
        let option = step
            .find_option(option_name)
            .cloned()
            .ok_or_else(|| CharwrightError::UnknownOption {
                step: step_id.to_string(),
                option: option_name.to_string(),
            })?;
        self.revise(|s| {
            s.backgrounds.insert(step_id.to_string(), option);
        });
        Ok(())
    }

    /// Toggle a spell from the selectable pool.
    ///
    /// Deselecting always works; selecting requires the spell to be eligible.
    pub fn toggle_spell(&mut self, name: &str) -> Result<SpellToggle, CharwrightError> {
        let spell = self
            .catalog
            .spell_pool()
            .into_iter()
            .find(|s| s.name == name)
            .cloned()
            .ok_or_else(|| CharwrightError::UnknownOption {
                step: StepId::SpellPick.key(),
                option: name.to_string(),
            })?;

        if !self.selection.spells.contains(name) && !spell_eligible(&spell, &self.stats()) {
            return Ok(SpellToggle::Locked);
        }

        let mut outcome = SpellToggle::Full;
        self.revise(|s| outcome = s.spells.toggle(spell));
        Ok(outcome)
    }

    /// Equip an unlocked gear item. Returns `None` if the item is locked.
    pub fn equip_gear(&mut self, name: &str) -> Result<Option<GearSlot>, CharwrightError> {
        let item = self
            .catalog
            .gear_item(name)
            .cloned()
            .ok_or_else(|| CharwrightError::UnknownOption {
                step: StepId::GearPick.key(),
                option: name.to_string(),
            })?;
        if !self.eligible_gear().iter().any(|g| g.name == item.name) {
            return Ok(None);
        }
        let slot = item.slot();
        self.revise(|s| {
            s.gear.equip(item);
        });
        Ok(Some(slot))
    }

    pub fn unequip_gear(&mut self, slot: GearSlot) {
        self.revise(|s| s.gear.unequip(slot));
    }

    // =========================================================================
    // NAME, BACKSTORY, PORTRAIT
    // =========================================================================

    pub fn set_name(&mut self, name: impl Into<String>) {
        let name = name.into();
        self.revise(|s| s.name = name);
    }

    pub fn set_backstory(&mut self, backstory: impl Into<String>) {
        let backstory = backstory.into();
        self.revise(|s| s.backstory = backstory);
    }

    /// Choose a portrait token from the catalog.
    pub fn set_portrait(&mut self, token: &str) -> Result<(), CharwrightError> {
        if !self.catalog.has_portrait(token) {
            return Err(CharwrightError::UnknownOption {
                step: StepId::Finalize.key(),
                option: token.to_string(),
            });
        }
        let token = token.to_string();
        self.revise(|s| s.portrait = token);
        Ok(())
    }

    // =========================================================================
    // DERIVED VALUES
    // =========================================================================

    #[must_use]
    pub fn derivation(&self) -> Derivation {
        derive_for(&self.catalog, &self.selection)
    }

    #[must_use]
    pub fn stats(&self) -> DerivedStats {
        self.derivation().stats
    }

    #[must_use]
    pub fn cap_warnings(&self) -> Vec<CapWarning> {
        cap_warnings(&self.stats())
    }

    #[must_use]
    pub fn eligible_spells(&self) -> Vec<&Spell> {
        eligible_spells(&self.catalog, &self.stats())
    }

    #[must_use]
    pub fn eligible_gear(&self) -> Vec<&GearItem> {
        eligible_gear(&self.catalog, &self.selection)
    }

    #[must_use]
    pub fn acquired_skills(&self) -> Vec<String> {
        acquired_skills(&self.catalog, &self.selection)
    }

    // =========================================================================
    // NAVIGATION
    // =========================================================================

    /// Advance the wizard if the current step validates.
    ///
    /// A rejection raises a notice visible until `now + NOTICE_TTL`.
    pub fn advance(&mut self, now: Instant) -> Result<usize, StepRejection> {
        match self.wizard.advance(&self.selection, &self.catalog) {
            Ok(pointer) => {
                self.notice = None;
                self.on_step_entered();
                Ok(pointer)
            }
            Err(rejection) => {
                tracing::debug!(step = %rejection.step, message = %rejection.message, "Advance rejected");
                self.notice = Some(ValidationNotice::raise(rejection.message.clone(), now));
                Err(rejection)
            }
        }
    }

    /// Step back one step. Returns `false` at the first step.
    pub fn retreat(&mut self) -> bool {
        self.wizard.retreat()
    }

    /// The current validation notice, unless it has expired.
    #[must_use]
    pub fn active_notice(&self, now: Instant) -> Option<&ValidationNotice> {
        self.notice.as_ref().filter(|n| n.is_active(now))
    }

    /// Replace the selection with a random character and jump to `Finalize`.
    ///
    /// No step gate or eligibility rule is consulted. Any in-flight trait
    /// request is invalidated.
    pub fn generate_random<R: Rng + ?Sized>(
        &mut self,
        generator: &RandomGenerator,
        source: &dyn TraitSource,
        rng: &mut R,
    ) -> Result<(), CharwrightError> {
        let generated = generator.generate(&self.catalog, source, rng)?;
        self.selection = generated.selection;
        self.trait_table = generated.trait_table;
        self.trait_sequence += 1;
        self.notice = None;
        self.wizard.jump_to_finalize();
        self.on_step_entered();
        Ok(())
    }

    /// Seed the backstory the first time `Finalize` is entered with it empty.
    fn on_step_entered(&mut self) {
        if !self.wizard.is_at_finalize() || self.backstory_seeded {
            return;
        }
        self.backstory_seeded = true;
        if !self.selection.backstory.trim().is_empty() {
            return;
        }
        let backstory = self.default_backstory();
        self.revise(|s| s.backstory = backstory);
    }

    /// Narrative texts of the selected backgrounds in step order, or a
    /// one-line fallback when none carry any text.
    fn default_backstory(&self) -> String {
        let narrative: Vec<&str> = selected_backgrounds(&self.catalog, &self.selection)
            .into_iter()
            .map(|o| o.narrative_text.trim())
            .filter(|t| !t.is_empty())
            .collect();
        if !narrative.is_empty() {
            return narrative.join(" ");
        }

        let name = if self.selection.name.trim().is_empty() {
            "This wanderer"
        } else {
            self.selection.name.trim()
        };
        match &self.selection.species {
            Some(species) => format!("{name} is a {species} whose past is still unwritten."),
            None => format!("{name} has a past that is still unwritten."),
        }
    }

    // =========================================================================
    // FINALIZE
    // =========================================================================

    /// Whether the save action is enabled.
    #[must_use]
    pub fn can_save(&self) -> bool {
        self.wizard.is_at_finalize() && save_guard(&self.selection).is_none()
    }

    /// Assemble the character record.
    ///
    /// Requires the wizard to be on `Finalize` and the save guard to pass.
    pub fn finalize(&self) -> Result<CharacterRecord, CharwrightError> {
        if !self.wizard.is_at_finalize() {
            return Err(CharwrightError::SaveBlocked(format!(
                "still on step {}",
                self.wizard.current()
            )));
        }
        if let Some(reason) = save_guard(&self.selection) {
            return Err(CharwrightError::SaveBlocked(reason));
        }
        Ok(CharacterRecord::assemble(
            &self.catalog,
            &self.selection,
            &self.stats(),
        ))
    }
}

// =============================================================================
// TESTS
// =============================================================================
