//! # API Request/Response Types
//!
//! This module defines the JSON structures for the HTTP API.

use crate::persist::SaveOutcome;
use charwright_core::{
    CapWarning, CatalogSummary, CharacterRecord, DerivedStats, GearItem, SelectionState,
    SkippedModifier, SpeciesId, Spell, StepId, TraitOption,
};
use serde::{Deserialize, Serialize};

// =============================================================================
// HEALTH RESPONSE
// =============================================================================

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

// =============================================================================
// ERROR RESPONSE
// =============================================================================

/// Body of every non-2xx JSON response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

// =============================================================================
// CATALOG
// =============================================================================

/// Catalog summary and the build sequence it produces.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogResponse {
    pub summary: CatalogSummary,
    pub steps: Vec<StepId>,
}

/// A species' trait table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraitsResponse {
    pub species: SpeciesId,
    pub options: Vec<TraitOption>,
}

// =============================================================================
// DERIVE
// =============================================================================

/// Everything computed from a selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeriveResponse {
    pub stats: DerivedStats,
    pub cap_warnings: Vec<CapWarning>,
    pub eligible_spells: Vec<Spell>,
    pub eligible_gear: Vec<GearItem>,
    pub acquired_skills: Vec<String>,
    pub skipped: Vec<SkippedModifier>,
}

// =============================================================================
// VALIDATE
// =============================================================================

/// Validate one step of a selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidateRequest {
    pub step: StepId,
    #[serde(default)]
    pub selection: SelectionState,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidateResponse {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ValidateResponse {
    #[must_use]
    pub fn passed() -> Self {
        Self {
            ok: true,
            message: None,
        }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            message: Some(message.into()),
        }
    }
}

// =============================================================================
// RANDOM & SAVE
// =============================================================================

/// Random character request. Without a seed the generator is seeded from
/// the OS.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RandomRequest {
    #[serde(default)]
    pub seed: Option<u64>,
}

/// A finished character and what happened when it was saved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveCharacterResponse {
    pub record: CharacterRecord,
    pub outcome: SaveOutcome,
}
