//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.

use charwright::api::{self, AppState};
use charwright::config::AppConfig;
use charwright::loader::{FsTraitSource, load_catalog};
use charwright::persist::{SaveClient, persist_record};
use charwright_core::{
    BuildSession, CharwrightError, OptionCatalog, RandomGenerator, SelectionState,
    build_step_sequence,
};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

// =============================================================================
// FILE HELPERS
// =============================================================================

/// Maximum size of a selection file (1 MB).
const MAX_SELECTION_FILE_SIZE: u64 = 1024 * 1024;

/// Canonicalize an input path and make sure it names a regular file.
fn validate_file_path(path: &Path) -> Result<PathBuf, CharwrightError> {
    let canonical = path.canonicalize().map_err(|e| {
        CharwrightError::Io(format!("Invalid file path '{}': {}", path.display(), e))
    })?;

    if !canonical.is_file() {
        return Err(CharwrightError::Io(format!(
            "Path '{}' is not a regular file",
            path.display()
        )));
    }

    Ok(canonical)
}

/// Canonicalize the parent directory of an output path.
fn validate_output_path(path: &Path) -> Result<PathBuf, CharwrightError> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let canonical_parent = parent.canonicalize().map_err(|e| {
        CharwrightError::Io(format!(
            "Invalid output directory '{}': {}",
            parent.display(),
            e
        ))
    })?;

    if !canonical_parent.is_dir() {
        return Err(CharwrightError::Io(format!(
            "Output directory '{}' is not a valid directory",
            parent.display()
        )));
    }

    let filename = path
        .file_name()
        .ok_or_else(|| CharwrightError::Io("Output path has no filename".to_string()))?;

    Ok(canonical_parent.join(filename))
}

/// Read a selection JSON file.
fn read_selection(path: &Path) -> Result<SelectionState, CharwrightError> {
    let path = validate_file_path(path)?;
    let metadata = std::fs::metadata(&path)
        .map_err(|e| CharwrightError::Io(format!("Cannot read file metadata: {}", e)))?;
    if metadata.len() > MAX_SELECTION_FILE_SIZE {
        return Err(CharwrightError::Serialization(format!(
            "File size {} bytes exceeds maximum allowed {} bytes",
            metadata.len(),
            MAX_SELECTION_FILE_SIZE
        )));
    }

    let contents = std::fs::read_to_string(&path)
        .map_err(|e| CharwrightError::Io(format!("Cannot read '{}': {}", path.display(), e)))?;
    serde_json::from_str(&contents)
        .map_err(|e| CharwrightError::Serialization(format!("Invalid selection: {}", e)))
}

fn to_pretty_json<T: Serialize>(value: &T) -> Result<String, CharwrightError> {
    serde_json::to_string_pretty(value).map_err(|e| CharwrightError::Serialization(e.to_string()))
}

// =============================================================================
// SHARED SETUP
// =============================================================================

/// Load the catalog named by the configuration. Failure is fatal.
pub async fn load_catalog_or_fail(config: &AppConfig) -> Result<Arc<OptionCatalog>, CharwrightError> {
    match load_catalog(&config.catalog_dir).await {
        Ok(catalog) => Ok(Arc::new(catalog)),
        Err(e) => {
            tracing::error!(dir = %config.catalog_dir.display(), "Catalog failed to load");
            Err(e)
        }
    }
}

fn save_client(config: &AppConfig) -> Option<SaveClient> {
    config
        .save_url
        .as_ref()
        .map(|url| SaveClient::new(url.clone(), config.save_token.clone()))
}

// =============================================================================
// SERVER COMMAND
// =============================================================================

/// Start the HTTP server.
pub async fn cmd_server(
    config: &AppConfig,
    catalog: Arc<OptionCatalog>,
    host: &str,
    port: u16,
) -> Result<(), CharwrightError> {
    println!("Charwright Server Starting...");
    println!();
    println!("Configuration:");
    println!("  Host:     {}", host);
    println!("  Port:     {}", port);
    println!("  Catalog:  {}", config.catalog_dir.display());
    println!(
        "  Store:    {}",
        config.save_url.as_deref().unwrap_or("(none, saves report offline)")
    );
    println!();
    println!("Endpoints:");
    println!("  GET  /health              - Health check");
    println!("  GET  /catalog             - Catalog summary");
    println!("  GET  /species/{{id}}/traits - Trait table");
    println!("  POST /derive              - Derive stats");
    println!("  POST /validate            - Validate a step");
    println!("  POST /random              - Random character");
    println!("  POST /characters          - Finish and save");
    println!();
    println!("Press Ctrl+C to stop");
    println!();

    let state = AppState {
        catalog,
        traits: Arc::new(FsTraitSource::new(config.traits_dir())),
        generator: RandomGenerator::new(config.species_pool()),
        save_client: save_client(config),
    };

    let addr = format!("{}:{}", host, port);
    api::run_server(&addr, state).await
}

// =============================================================================
// CATALOG COMMAND
// =============================================================================

/// Show a summary of the catalog.
pub fn cmd_catalog(
    config: &AppConfig,
    catalog: &OptionCatalog,
    json_mode: bool,
) -> Result<(), CharwrightError> {
    let summary = catalog.summary();

    if json_mode {
        let output = serde_json::json!({
            "catalog_dir": config.catalog_dir.to_string_lossy(),
            "summary": summary,
            "steps": build_step_sequence(catalog)
                .iter()
                .map(|s| s.key())
                .collect::<Vec<_>>(),
        });
        println!("{}", to_pretty_json(&output)?);
        return Ok(());
    }

    let species: Vec<&str> = summary.species.iter().map(|s| s.as_str()).collect();
    println!("Charwright Catalog");
    println!("==================");
    println!("Directory:  {}", config.catalog_dir.display());
    println!();
    println!("Species:    {}", species.join(", "));
    println!("Backgrounds: {}", summary.background_steps.join(", "));
    println!("Steps:      {}", summary.step_count);
    println!(
        "Spells:     {} ({} selectable)",
        summary.spell_count, summary.selectable_spell_count
    );
    println!("Gear:       {}", summary.gear_count);
    println!("Portraits:  {}", summary.portrait_count);

    Ok(())
}

// =============================================================================
// RANDOM COMMAND
// =============================================================================

/// Generate a random character, print it, and optionally write and save it.
pub async fn cmd_random(
    config: &AppConfig,
    catalog: Arc<OptionCatalog>,
    json_mode: bool,
    seed: Option<u64>,
    save: bool,
    out: Option<&Path>,
) -> Result<(), CharwrightError> {
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let generator = RandomGenerator::new(config.species_pool());
    let traits = FsTraitSource::new(config.traits_dir());

    let mut session = BuildSession::new(catalog);
    session.generate_random(&generator, &traits, &mut rng)?;
    let record = session.finalize()?;
    let json = to_pretty_json(&record)?;

    if let Some(out) = out {
        let path = validate_output_path(out)?;
        tokio::fs::write(&path, &json)
            .await
            .map_err(|e| CharwrightError::Io(format!("Cannot write '{}': {}", path.display(), e)))?;
        tracing::info!("Character written to {}", path.display());
    }

    let outcome = if save {
        let client = save_client(config);
        Some(
            persist_record(client.as_ref(), &record, |record, outcome| {
                tracing::info!(name = %record.name, saved = outcome.is_saved(), "Character finished");
            })
            .await,
        )
    } else {
        None
    };

    if json_mode {
        let output = serde_json::json!({ "record": record, "outcome": outcome });
        println!("{}", to_pretty_json(&output)?);
        return Ok(());
    }

    println!("{}", json);
    if let Some(outcome) = outcome {
        println!();
        println!("Save: {}", to_pretty_json(&outcome)?);
    }
    Ok(())
}

// =============================================================================
// DERIVE COMMAND
// =============================================================================

/// Print the derived view of a selection file.
pub fn cmd_derive(
    catalog: Arc<OptionCatalog>,
    json_mode: bool,
    selection_path: &Path,
) -> Result<(), CharwrightError> {
    let selection = read_selection(selection_path)?;
    let session = BuildSession::with_selection(catalog, selection);
    let derivation = session.derivation();
    let warnings = session.cap_warnings();
    let spells = session.eligible_spells();
    let gear = session.eligible_gear();
    let skills = session.acquired_skills();

    if json_mode {
        let output = serde_json::json!({
            "stats": derivation.stats,
            "cap_warnings": warnings,
            "eligible_spells": spells,
            "eligible_gear": gear,
            "acquired_skills": skills,
            "skipped": derivation.skipped,
        });
        println!("{}", to_pretty_json(&output)?);
        return Ok(());
    }

    println!("Derived Stats");
    println!("=============");
    println!("{:<12} {:>5} {:>6} {:>6}", "Attribute", "Base", "Bonus", "Total");
    for (attribute, base) in &derivation.stats.base {
        println!(
            "{:<12} {:>5} {:>+6} {:>6}",
            attribute,
            base,
            derivation.stats.bonus(attribute).unwrap_or(0),
            derivation.stats.total(attribute).unwrap_or(*base)
        );
    }

    if !warnings.is_empty() {
        println!();
        for warning in &warnings {
            println!("WARNING: {}", warning.message);
        }
    }
    for skipped in &derivation.skipped {
        println!(
            "Skipped: {} ({}) '{}': {}",
            skipped.option, skipped.step, skipped.attribute, skipped.reason
        );
    }

    println!();
    let spell_names: Vec<&str> = spells.iter().map(|s| s.name.as_str()).collect();
    let gear_names: Vec<&str> = gear.iter().map(|g| g.name.as_str()).collect();
    println!("Skills:          {}", skills.join(", "));
    println!("Eligible spells: {}", spell_names.join(", "));
    println!("Eligible gear:   {}", gear_names.join(", "));

    Ok(())
}

// =============================================================================
// WALK COMMAND
// =============================================================================

/// Advance the wizard over a selection file as far as it validates.
pub fn cmd_walk(
    catalog: Arc<OptionCatalog>,
    json_mode: bool,
    selection_path: &Path,
) -> Result<(), CharwrightError> {
    let selection = read_selection(selection_path)?;
    let mut session = BuildSession::with_selection(catalog, selection);
    let now = Instant::now();

    let mut rejection = None;
    while !session.wizard().is_at_finalize() {
        if let Err(r) = session.advance(now) {
            rejection = Some(r);
            break;
        }
    }

    let save_blocked = session.finalize().err();

    if json_mode {
        let output = serde_json::json!({
            "reached": session.current_step().key(),
            "pointer": session.wizard().pointer(),
            "last_index": session.wizard().last_index(),
            "message": rejection.as_ref().map(|r| r.message.clone()),
            "can_save": session.can_save(),
            "save_blocked": save_blocked.as_ref().map(|e| e.to_string()),
        });
        println!("{}", to_pretty_json(&output)?);
        return Ok(());
    }

    println!("Wizard Replay");
    println!("=============");
    println!(
        "Reached: {} (step {} of {})",
        session.current_step(),
        session.wizard().pointer() + 1,
        session.wizard().last_index() + 1
    );
    if let Some(notice) = session.active_notice(now) {
        println!("Blocked: {}", notice.message);
    }
    if session.wizard().is_at_finalize() {
        match &save_blocked {
            None => println!("Ready to save."),
            Some(e) => println!("Not ready to save: {}", e),
        }
    }

    Ok(())
}
