//! Integration tests for the Charwright HTTP API.
//!
//! Uses axum-test to test the API handlers without starting a real server.

// Allow holding MutexGuard across await in auth tests - tests are serialized
// intentionally to avoid env var conflicts
#![allow(clippy::unwrap_used, clippy::panic, clippy::await_holding_lock)]

use axum::http::HeaderValue;
use axum_test::TestServer;
use charwright::api::{
    AppState, CatalogResponse, DeriveResponse, ErrorResponse, HealthResponse,
    SaveCharacterResponse, TraitsResponse, ValidateResponse, create_router,
};
use charwright_core::{
    BackgroundOption, BackgroundStep, BodyPartStep, CharacterRecord, GearItem, InMemoryTraits,
    OptionCatalog, SkillGrant, SpeciesBaseTable, SpeciesId, Spell, TraitOption,
};
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::Mutex;

/// Mutex to serialize tests since they modify env vars.
static AUTH_TEST_MUTEX: Mutex<()> = Mutex::new(());

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

/// Guard wrapper that holds the mutex and ensures cleanup on drop.
struct TestGuard {
    _guard: std::sync::MutexGuard<'static, ()>,
}

impl Drop for TestGuard {
    fn drop(&mut self) {
        // SAFETY: Tests run sequentially under AUTH_TEST_MUTEX, so no concurrent env access.
        unsafe { std::env::remove_var("CHARWRIGHT_API_KEY") };
    }
}

fn trait_option(step: BodyPartStep, name: &str, stat1: &str) -> TraitOption {
    TraitOption {
        step_id: step.id().to_string(),
        category: "Form".to_string(),
        body_part: step.title().to_string(),
        stat1: stat1.to_string(),
        stat2: "Vitality".to_string(),
        mechanic_text: format!("{name} mechanic"),
        option_name: name.to_string(),
    }
}

fn spell(name: &str, attribute: &str) -> Spell {
    Spell {
        school: "Primal".to_string(),
        name: name.to_string(),
        tier: 1,
        description: String::new(),
        kind: "Utility".to_string(),
        damage_type: String::new(),
        attribute: attribute.to_string(),
    }
}

fn catalog() -> OptionCatalog {
    OptionCatalog::new(
        BTreeMap::from([(
            SpeciesId::new("Mammal"),
            SpeciesBaseTable::from_pairs([("Might", 10), ("Vitality", 11)]),
        )]),
        vec![BackgroundStep {
            id: "upbringing".to_string(),
            title: "Upbringing".to_string(),
            description: String::new(),
            options: vec![BackgroundOption {
                name: "Smithy".to_string(),
                category: "Craft".to_string(),
                narrative_text: "Grew up beside the forge.".to_string(),
                grants: SkillGrant::new("Craft", "Smithing"),
            }],
        }],
        vec![spell("Stoneskin", "Vitality"), spell("Insight", "Wits")],
        vec![GearItem {
            name: "Hammer".to_string(),
            kind: "Weapon".to_string(),
            related_skill_name: "Smithing".to_string(),
            effect_text: String::new(),
            cost: 4,
        }],
        vec!["token-1".to_string()],
    )
    .unwrap()
}

fn traits() -> InMemoryTraits {
    InMemoryTraits::new().with_species(
        SpeciesId::new("Mammal"),
        BodyPartStep::ALL
            .into_iter()
            .map(|step| trait_option(step, &format!("{step} A"), "Might"))
            .collect(),
    )
}

fn build_server() -> TestServer {
    let state = AppState::new(catalog(), traits());
    TestServer::new(create_router(state)).unwrap()
}

/// Create a test server with authentication disabled.
/// Returns a guard that must be kept alive during the test.
fn create_test_server() -> (TestServer, TestGuard) {
    let guard = AUTH_TEST_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    // SAFETY: Tests run sequentially under AUTH_TEST_MUTEX, so no concurrent env access.
    unsafe { std::env::remove_var("CHARWRIGHT_API_KEY") };
    (build_server(), TestGuard { _guard: guard })
}

/// A selection that passes every step and the save guard.
fn complete_selection() -> serde_json::Value {
    json!({
        "species": "Mammal",
        "traits": {
            "arms": {
                "step_id": "arms", "category": "Limb", "body_part": "Arms",
                "stat1": "Might", "stat2": "Vitality", "mechanic_text": "",
                "option_name": "Thick Arms"
            }
        },
        "backgrounds": {
            "upbringing": {
                "name": "Smithy", "category": "Craft",
                "narrative_text": "Grew up beside the forge.",
                "grants": ["Craft", "Smithing"]
            }
        },
        "name": "Brannoc",
        "portrait": "token-1"
    })
}

// =============================================================================
// HEALTH & CATALOG TESTS
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let (server, _guard) = create_test_server();

    let response = server.get("/health").await;

    response.assert_status_ok();
    let health: HealthResponse = response.json();
    assert_eq!(health.status, "ok");
    assert_eq!(health.version, env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_catalog_summary_and_steps() {
    let (server, _guard) = create_test_server();

    let response = server.get("/catalog").await;

    response.assert_status_ok();
    let catalog: CatalogResponse = response.json();
    assert_eq!(catalog.summary.species, vec![SpeciesId::new("Mammal")]);
    // species + 7 body parts + 1 background + spells + gear + finalize
    assert_eq!(catalog.steps.len(), 12);
}

#[tokio::test]
async fn test_species_traits() {
    let (server, _guard) = create_test_server();

    let response = server.get("/species/Mammal/traits").await;

    response.assert_status_ok();
    let traits: TraitsResponse = response.json();
    assert_eq!(traits.species, SpeciesId::new("Mammal"));
    assert_eq!(traits.options.len(), BodyPartStep::ALL.len());
}

#[tokio::test]
async fn test_unknown_species_traits_not_found() {
    let (server, _guard) = create_test_server();

    let response = server.get("/species/Avian/traits").await;

    response.assert_status_not_found();
    let error: ErrorResponse = response.json();
    assert!(error.error.contains("Avian"));
}

// =============================================================================
// DERIVE & VALIDATE TESTS
// =============================================================================

#[tokio::test]
async fn test_derive_selection() {
    let (server, _guard) = create_test_server();

    let response = server.post("/derive").json(&complete_selection()).await;

    response.assert_status_ok();
    let derived: DeriveResponse = response.json();
    assert_eq!(derived.stats.total("Might"), Some(11));
    assert_eq!(derived.stats.total("Vitality"), Some(12));
    assert!(derived.cap_warnings.is_empty());
    // Vitality 12 unlocks Stoneskin; Wits stays at 10.
    let spells: Vec<_> = derived.eligible_spells.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(spells, vec!["Stoneskin"]);
    assert_eq!(derived.eligible_gear.len(), 1);
    assert_eq!(derived.acquired_skills, vec!["Smithing".to_string()]);
}

#[tokio::test]
async fn test_derive_reports_unknown_attributes() {
    let (server, _guard) = create_test_server();
    let mut selection = complete_selection();
    selection["traits"]["arms"]["stat1"] = json!("Luck");

    let response = server.post("/derive").json(&selection).await;

    response.assert_status_ok();
    let derived: DeriveResponse = response.json();
    assert_eq!(derived.skipped.len(), 1);
    assert_eq!(derived.skipped[0].attribute, "Luck");
}

#[tokio::test]
async fn test_validate_species_step() {
    let (server, _guard) = create_test_server();

    let rejected = server
        .post("/validate")
        .json(&json!({ "step": { "kind": "species_choice" }, "selection": {} }))
        .await;
    rejected.assert_status_ok();
    let body: ValidateResponse = rejected.json();
    assert!(!body.ok);
    assert!(body.message.is_some_and(|m| !m.is_empty()));

    let passed = server
        .post("/validate")
        .json(&json!({ "step": { "kind": "species_choice" }, "selection": { "species": "Mammal" } }))
        .await;
    let body: ValidateResponse = passed.json();
    assert!(body.ok);
    assert!(body.message.is_none());
}

#[tokio::test]
async fn test_validate_spell_step_single_eligible() {
    let (server, _guard) = create_test_server();

    // Only Stoneskin is eligible, so it alone must be chosen.
    let response = server
        .post("/validate")
        .json(&json!({ "step": { "kind": "spell_pick" }, "selection": complete_selection() }))
        .await;
    let body: ValidateResponse = response.json();
    assert!(!body.ok);
}

#[tokio::test]
async fn test_validate_unknown_background_step() {
    let (server, _guard) = create_test_server();

    let response = server
        .post("/validate")
        .json(&json!({ "step": { "kind": "background", "id": "nope" }, "selection": {} }))
        .await;

    response.assert_status_bad_request();
}

// =============================================================================
// RANDOM & SAVE TESTS
// =============================================================================

#[tokio::test]
async fn test_random_is_reproducible() {
    let (server, _guard) = create_test_server();

    let first: CharacterRecord = server.post("/random").json(&json!({ "seed": 9 })).await.json();
    let second: CharacterRecord = server.post("/random").json(&json!({ "seed": 9 })).await.json();

    assert_eq!(first, second);
    assert_eq!(first.species, "Mammal");
    assert!(!first.name.is_empty());
    assert_eq!(first.portrait, "token-1");
    assert_eq!(first.backstory, "Grew up beside the forge.");
}

#[tokio::test]
async fn test_random_without_seed() {
    let (server, _guard) = create_test_server();

    let response = server.post("/random").json(&json!({})).await;

    response.assert_status_ok();
    let record: CharacterRecord = response.json();
    assert_eq!(record.traits.len(), BodyPartStep::ALL.len() + 1);
}

#[tokio::test]
async fn test_save_character_offline_without_store() {
    let (server, _guard) = create_test_server();

    let response = server.post("/characters").json(&complete_selection()).await;

    response.assert_status_ok();
    let saved: SaveCharacterResponse = response.json();
    assert_eq!(saved.record.name, "Brannoc");
    assert_eq!(saved.record.stats.get("Might"), Some(&11));
    assert!(!saved.outcome.is_saved());
}

#[tokio::test]
async fn test_save_character_requires_name() {
    let (server, _guard) = create_test_server();
    let mut selection = complete_selection();
    selection["name"] = json!("   ");

    let response = server.post("/characters").json(&selection).await;

    response.assert_status_bad_request();
    let error: ErrorResponse = response.json();
    assert!(error.error.contains("name"));
}

#[tokio::test]
async fn test_three_spells_rejected_at_parse() {
    let (server, _guard) = create_test_server();
    let mut selection = complete_selection();
    let stoneskin = serde_json::to_value(spell("Stoneskin", "Vitality")).unwrap();
    selection["spells"] = json!([stoneskin.clone(), stoneskin.clone(), stoneskin]);

    let response = server.post("/derive").json(&selection).await;

    assert!(response.status_code().is_client_error());
}

// =============================================================================
// ERROR HANDLING TESTS
// =============================================================================

#[tokio::test]
async fn test_404_on_unknown_endpoint() {
    let (server, _guard) = create_test_server();

    let response = server.get("/unknown").await;
    response.assert_status_not_found();
}

#[tokio::test]
async fn test_method_not_allowed() {
    let (server, _guard) = create_test_server();

    let response = server.post("/health").await;
    assert_eq!(response.status_code().as_u16(), 405);
}

#[tokio::test]
async fn test_invalid_json_body() {
    let (server, _guard) = create_test_server();

    let response = server
        .post("/derive")
        .bytes(bytes::Bytes::from("not valid json"))
        .content_type("application/json")
        .await;

    assert!(response.status_code().is_client_error());
}

// =============================================================================
// AUTHENTICATION MIDDLEWARE TESTS
// =============================================================================

/// Create a test server with authentication enabled.
/// Must be called while holding AUTH_TEST_MUTEX.
fn create_auth_test_server(api_key: &str) -> TestServer {
    // SAFETY: Tests run sequentially under AUTH_TEST_MUTEX, so no concurrent env access.
    unsafe { std::env::set_var("CHARWRIGHT_API_KEY", api_key) };
    build_server()
}

/// Clean up auth env var after test.
fn cleanup_auth_env() {
    // SAFETY: Tests run sequentially under AUTH_TEST_MUTEX, so no concurrent env access.
    unsafe { std::env::remove_var("CHARWRIGHT_API_KEY") };
}

#[tokio::test]
async fn test_auth_valid_bearer_token() {
    let _guard = AUTH_TEST_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    let api_key = "test-secret-key-12345";
    let server = create_auth_test_server(api_key);

    let response = server
        .get("/catalog")
        .add_header(
            axum::http::header::AUTHORIZATION,
            format!("Bearer {}", api_key)
                .parse::<HeaderValue>()
                .unwrap(),
        )
        .await;

    cleanup_auth_env();

    response.assert_status_ok();
}

#[tokio::test]
async fn test_auth_invalid_token_rejected() {
    let _guard = AUTH_TEST_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    let server = create_auth_test_server("correct-key");

    let response = server
        .get("/catalog")
        .add_header(
            axum::http::header::AUTHORIZATION,
            "Bearer wrong-key".parse::<HeaderValue>().unwrap(),
        )
        .await;

    cleanup_auth_env();

    assert_eq!(response.status_code().as_u16(), 401);
    let error: ErrorResponse = response.json();
    assert_eq!(error.error, "Unauthorized");
}

#[tokio::test]
async fn test_auth_missing_header_rejected() {
    let _guard = AUTH_TEST_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    let server = create_auth_test_server("required-key");

    let response = server.post("/random").json(&json!({})).await;

    cleanup_auth_env();

    assert_eq!(response.status_code().as_u16(), 401);
}

#[tokio::test]
async fn test_auth_health_endpoint_bypasses_auth() {
    let _guard = AUTH_TEST_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    let server = create_auth_test_server("secret-key-for-bypass-test");

    let response = server.get("/health").await;

    cleanup_auth_env();

    response.assert_status_ok();
}
