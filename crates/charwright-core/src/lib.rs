//! # charwright-core
//!
//! The character-building rules engine for Charwright - THE RULES.
//!
//! Given a catalog of composable options (species base attributes, body-part
//! traits, background choices, spells, gear) this crate derives attributes,
//! reports advisory caps, filters unlocked options, gates a linear build
//! wizard, generates random characters, and assembles the final record.
//!
//! ## Architectural Constraints
//!
//! - No async, no network, no file access: catalogs come in already parsed
//! - Every rule is a pure function of `(catalog, selection)`
//! - Randomness only through a caller-supplied `rand::Rng`
//!
//! ## Example
//!
//! ```
//! use charwright_core::{BuildSession, OptionCatalog};
//! use std::sync::Arc;
//! use std::time::Instant;
//!
//! let mut session = BuildSession::new(Arc::new(OptionCatalog::default()));
//! // Nothing chosen yet: the species step refuses to advance.
//! assert!(session.advance(Instant::now()).is_err());
//! assert_eq!(session.wizard().pointer(), 0);
//! ```

// =============================================================================
// MODULES
// =============================================================================

pub mod caps;
pub mod catalog;
pub mod eligibility;
pub mod primitives;
pub mod random;
pub mod record;
pub mod session;
pub mod stats;
pub mod steps;
pub mod types;
pub mod validator;
pub mod wizard;

// =============================================================================
// RE-EXPORTS: Core Types
// =============================================================================

pub use types::{
    AttributeMap, BackgroundOption, BackgroundStep, CharwrightError, ChosenGear, GearItem,
    GearSlot, SelectionState, SkillGrant, SpeciesId, Spell, TraitOption,
};

// =============================================================================
// RE-EXPORTS: Catalog & Steps
// =============================================================================

pub use catalog::{
    CatalogSummary, InMemoryTraits, OptionCatalog, SpeciesBaseTable, TraitSource, TraitTable,
};
pub use steps::{BodyPartStep, StepId, build_step_sequence};

// =============================================================================
// RE-EXPORTS: Rules
// =============================================================================

pub use caps::{CapWarning, cap_for, cap_warnings};
pub use eligibility::{
    ChosenSpells, SpellToggle, acquired_skills, eligible_gear, eligible_spells, gear_eligible,
    selected_backgrounds, spell_eligible,
};
pub use stats::{Derivation, DerivedStats, SkipReason, SkippedModifier, derive, derive_for};
pub use validator::{StepRejection, ValidationNotice, can_save, save_guard, validate};

// =============================================================================
// RE-EXPORTS: Build Flow
// =============================================================================

pub use random::{RandomCharacter, RandomGenerator, SpeciesPool};
pub use record::{CharacterRecord, TraitEntry};
pub use session::{BuildSession, TraitRequest};
pub use wizard::WizardStateMachine;
