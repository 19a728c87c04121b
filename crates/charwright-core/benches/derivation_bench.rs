//! # Derivation Benchmarks
//!
//! Performance benchmarks for stat derivation, eligibility, and random builds.
//!
//! Run with: `cargo bench -p charwright-core`

use charwright_core::{
    BodyPartStep, InMemoryTraits, OptionCatalog, RandomGenerator, SpeciesBaseTable, SpeciesId,
    Spell, TraitOption, derive, eligible_spells,
};
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::collections::BTreeMap;
use std::hint::black_box;

fn trait_option(step: BodyPartStep, index: usize) -> TraitOption {
    let (stat1, stat2) = if step == BodyPartStep::Stature {
        ("+2 Might, -1 Finesse".to_string(), "+1 Vitality".to_string())
    } else {
        ("Wits".to_string(), "Presence".to_string())
    };
    TraitOption {
        step_id: step.id().to_string(),
        category: "Form".to_string(),
        body_part: step.title().to_string(),
        stat1,
        stat2,
        mechanic_text: String::new(),
        option_name: format!("{step} {index}"),
    }
}

fn full_traits() -> BTreeMap<String, TraitOption> {
    BodyPartStep::ALL
        .into_iter()
        .map(|step| (step.id().to_string(), trait_option(step, 0)))
        .collect()
}

/// A catalog with `size` tier-1 spells spread over the core attributes.
fn catalog_with_spells(size: usize) -> OptionCatalog {
    let attributes = ["Might", "Finesse", "Vitality", "Intellect", "Wits", "Presence"];
    OptionCatalog {
        species: BTreeMap::from([(
            SpeciesId::new("Mammal"),
            SpeciesBaseTable::from_pairs([("Might", 12), ("Wits", 11)]),
        )]),
        spells: (0..size)
            .map(|i| Spell {
                school: "Arcane".to_string(),
                name: format!("Spell {i}"),
                tier: 1,
                description: String::new(),
                kind: "Utility".to_string(),
                damage_type: String::new(),
                attribute: attributes[i % attributes.len()].to_string(),
            })
            .collect(),
        portraits: vec!["token-1".to_string()],
        ..OptionCatalog::default()
    }
}

// =============================================================================
// BENCHMARKS
// =============================================================================

fn bench_derive(c: &mut Criterion) {
    let table = SpeciesBaseTable::from_pairs([("Might", 12), ("Wits", 9)]);
    let traits = full_traits();

    c.bench_function("derive_full_selection", |b| {
        b.iter(|| black_box(derive(Some(black_box(&table)), black_box(&traits))));
    });
}

fn bench_eligible_spells(c: &mut Criterion) {
    let mut group = c.benchmark_group("eligible_spells");
    let stats = derive(
        Some(&SpeciesBaseTable::from_pairs([("Might", 12), ("Wits", 11)])),
        &full_traits(),
    )
    .stats;

    for size in [10, 100, 1000].iter() {
        let catalog = catalog_with_spells(*size);
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| black_box(eligible_spells(&catalog, &stats)));
        });
    }

    group.finish();
}

fn bench_random_character(c: &mut Criterion) {
    let catalog = catalog_with_spells(50);
    let source = InMemoryTraits::new().with_species(
        SpeciesId::new("Mammal"),
        BodyPartStep::ALL
            .into_iter()
            .flat_map(|step| (0..8).map(move |i| trait_option(step, i)))
            .collect(),
    );
    let generator = RandomGenerator::default();
    let mut rng = StdRng::seed_from_u64(1);

    c.bench_function("random_character", |b| {
        b.iter(|| black_box(generator.generate(&catalog, &source, &mut rng)));
    });
}

criterion_group!(
    benches,
    bench_derive,
    bench_eligible_spells,
    bench_random_character
);
criterion_main!(benches);
