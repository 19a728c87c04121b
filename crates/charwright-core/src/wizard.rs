//! # Wizard State Machine
//!
//! Holds the step sequence and the current step pointer.
//!
//! - `advance` is gated by [`validate`] on the current step
//! - `retreat` is unconditional while the pointer is above zero
//! - `jump_to_finalize` skips every gate; only the random generation path
//!   uses it

use crate::catalog::OptionCatalog;
use crate::steps::{StepId, build_step_sequence};
use crate::types::SelectionState;
use crate::validator::{StepRejection, validate};

/// The linear build wizard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WizardStateMachine {
    steps: Vec<StepId>,
    pointer: usize,
}

impl WizardStateMachine {
    /// Build the wizard for a catalog, positioned at the first step.
    #[must_use]
    pub fn new(catalog: &OptionCatalog) -> Self {
        Self {
            steps: build_step_sequence(catalog),
            pointer: 0,
        }
    }

    #[must_use]
    pub fn steps(&self) -> &[StepId] {
        &self.steps
    }

    #[must_use]
    pub fn pointer(&self) -> usize {
        self.pointer
    }

    #[must_use]
    pub fn last_index(&self) -> usize {
        self.steps.len().saturating_sub(1)
    }

    /// The step the pointer is on.
    #[must_use]
    pub fn current(&self) -> &StepId {
        // The sequence always holds at least SpeciesChoice..Finalize.
        &self.steps[self.pointer.min(self.last_index())]
    }

    #[must_use]
    pub fn is_at_finalize(&self) -> bool {
        self.current().is_finalize()
    }

    /// Index of a step in the sequence.
    #[must_use]
    pub fn position_of(&self, step: &StepId) -> Option<usize> {
        self.steps.iter().position(|s| s == step)
    }

    /// Move forward one step if the current step validates.
    ///
    /// Returns the new pointer. The pointer never moves past `Finalize`.
    pub fn advance(
        &mut self,
        selection: &SelectionState,
        catalog: &OptionCatalog,
    ) -> Result<usize, StepRejection> {
        validate(self.current(), selection, catalog)?;
        self.pointer = (self.pointer + 1).min(self.last_index());
        Ok(self.pointer)
    }

    /// Move back one step. Returns `false` at the first step.
    pub fn retreat(&mut self) -> bool {
        if self.pointer == 0 {
            return false;
        }
        self.pointer -= 1;
        true
    }

    /// Place the pointer on `Finalize` without validating anything.
    pub(crate) fn jump_to_finalize(&mut self) {
        self.pointer = self.last_index();
    }
}
