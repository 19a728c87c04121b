//! # API Endpoint Handlers
//!
//! This module implements the actual HTTP endpoint handlers.

use super::{
    AppState,
    types::{
        CatalogResponse, DeriveResponse, ErrorResponse, HealthResponse, RandomRequest,
        SaveCharacterResponse, TraitsResponse, ValidateRequest, ValidateResponse,
    },
};
use crate::persist::persist_record;
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use charwright_core::{
    BuildSession, CharacterRecord, CharwrightError, SelectionState, SpeciesId,
    WizardStateMachine, acquired_skills, build_step_sequence, cap_warnings, derive_for,
    eligible_gear, eligible_spells, save_guard, validate,
};
use rand::SeedableRng;
use rand::rngs::StdRng;

/// HTTP status for a core error.
fn error_status(error: &CharwrightError) -> StatusCode {
    match error {
        CharwrightError::UnknownSpecies(_) | CharwrightError::TraitTable(_) => {
            StatusCode::NOT_FOUND
        }
        CharwrightError::UnknownStep(_)
        | CharwrightError::UnknownOption { .. }
        | CharwrightError::NotReady(_)
        | CharwrightError::SaveBlocked(_) => StatusCode::BAD_REQUEST,
        CharwrightError::Catalog(_)
        | CharwrightError::Serialization(_)
        | CharwrightError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_response(error: &CharwrightError) -> Response {
    (error_status(error), Json(ErrorResponse::new(error.to_string()))).into_response()
}

fn task_failed(e: &tokio::task::JoinError) -> Response {
    tracing::error!("Blocking task failed: {}", e);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse::new("internal task failure")),
    )
        .into_response()
}

// =============================================================================
// HEALTH HANDLER
// =============================================================================

/// Health check endpoint.
pub async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse::default())
}

// =============================================================================
// CATALOG HANDLERS
// =============================================================================

/// Catalog summary and build sequence.
pub async fn catalog_handler(State(state): State<AppState>) -> impl IntoResponse {
    let response = CatalogResponse {
        summary: state.catalog.summary(),
        steps: build_step_sequence(&state.catalog),
    };
    (StatusCode::OK, Json(response))
}

/// Trait table of one species.
pub async fn traits_handler(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let species = SpeciesId::new(id);
    if !state.catalog.has_species(&species) {
        return error_response(&CharwrightError::UnknownSpecies(species));
    }

    let traits = state.traits.clone();
    let result = tokio::task::spawn_blocking(move || traits.trait_table(&species)).await;
    match result {
        Ok(Ok(table)) => (
            StatusCode::OK,
            Json(TraitsResponse {
                species: table.species,
                options: table.options,
            }),
        )
            .into_response(),
        Ok(Err(e)) => {
            tracing::warn!(error = %e, "Trait table unavailable");
            error_response(&e)
        }
        Err(e) => task_failed(&e),
    }
}

// =============================================================================
// DERIVE HANDLER
// =============================================================================

/// Derived stats, cap warnings and unlocked options for a selection.
pub async fn derive_handler(
    State(state): State<AppState>,
    Json(selection): Json<SelectionState>,
) -> impl IntoResponse {
    let derivation = derive_for(&state.catalog, &selection);
    let response = DeriveResponse {
        cap_warnings: cap_warnings(&derivation.stats),
        eligible_spells: eligible_spells(&state.catalog, &derivation.stats)
            .into_iter()
            .cloned()
            .collect(),
        eligible_gear: eligible_gear(&state.catalog, &selection)
            .into_iter()
            .cloned()
            .collect(),
        acquired_skills: acquired_skills(&state.catalog, &selection),
        stats: derivation.stats,
        skipped: derivation.skipped,
    };
    (StatusCode::OK, Json(response))
}

// =============================================================================
// VALIDATE HANDLER
// =============================================================================

/// Validate a selection against one step of the build sequence.
pub async fn validate_handler(
    State(state): State<AppState>,
    Json(request): Json<ValidateRequest>,
) -> Response {
    if WizardStateMachine::new(&state.catalog)
        .position_of(&request.step)
        .is_none()
    {
        return error_response(&CharwrightError::UnknownStep(request.step.key()));
    }

    let response = match validate(&request.step, &request.selection, &state.catalog) {
        Ok(()) => ValidateResponse::passed(),
        Err(rejection) => ValidateResponse::rejected(rejection.message),
    };
    (StatusCode::OK, Json(response)).into_response()
}

// =============================================================================
// RANDOM HANDLER
// =============================================================================

/// Generate a random character and return its record.
pub async fn random_handler(
    State(state): State<AppState>,
    Json(request): Json<RandomRequest>,
) -> Response {
    let AppState {
        catalog,
        traits,
        generator,
        ..
    } = state;

    let result = tokio::task::spawn_blocking(move || {
        let mut rng = match request.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let mut session = BuildSession::new(catalog);
        session.generate_random(&generator, traits.as_ref(), &mut rng)?;
        session.finalize()
    })
    .await;

    match result {
        Ok(Ok(record)) => (StatusCode::OK, Json(record)).into_response(),
        Ok(Err(e)) => error_response(&e),
        Err(e) => task_failed(&e),
    }
}

// =============================================================================
// SAVE HANDLER
// =============================================================================

/// Assemble and save a finished character.
///
/// The save guard must pass; the save itself is lenient, so a store outage
/// still returns the record with an `offline` outcome.
pub async fn save_character_handler(
    State(state): State<AppState>,
    Json(selection): Json<SelectionState>,
) -> Response {
    if let Some(reason) = save_guard(&selection) {
        return error_response(&CharwrightError::SaveBlocked(reason));
    }

    let stats = derive_for(&state.catalog, &selection).stats;
    let record = CharacterRecord::assemble(&state.catalog, &selection, &stats);
    let outcome = persist_record(state.save_client.as_ref(), &record, |record, outcome| {
        tracing::info!(name = %record.name, saved = outcome.is_saved(), "Character finished");
    })
    .await;

    (
        StatusCode::OK,
        Json(SaveCharacterResponse { record, outcome }),
    )
        .into_response()
}
