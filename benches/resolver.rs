use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};

use remedy_core::{resolve, AssemblySession, Remedy, RemedyCatalog};

fn make_catalog(size: usize) -> RemedyCatalog {
    // Seed remedies named "Ailment 0".."Ailment N" so late stages scan the whole catalog.
    (0..size)
        .map(|i| {
            Remedy::new(format!("Ailment {i}"), ["Ginger", "Honey", "Tulsi"])
                .with_instructions("Boil. Strain. Serve warm.")
        })
        .collect()
}

fn bench_resolve_stages(c: &mut Criterion) {
    let catalog = make_catalog(256);
    let last = "Ailment 255";

    let mut group = c.benchmark_group("resolver");
    group.throughput(Throughput::Elements(1));

    group.bench_function("exact", |b| {
        b.iter(|| resolve(black_box(&catalog), black_box(last)));
    });
    group.bench_function("case_insensitive", |b| {
        b.iter(|| resolve(black_box(&catalog), black_box("AILMENT 255")));
    });
    group.bench_function("hyphen_variant", |b| {
        b.iter(|| resolve(black_box(&catalog), black_box("ailment-255")));
    });
    group.bench_function("miss", |b| {
        b.iter(|| resolve(black_box(&catalog), black_box("Unknown Ailment")));
    });
    group.finish();
}

fn bench_assembly(c: &mut Criterion) {
    let remedy = Remedy::new("Cold", (0..32).map(|i| format!("Ingredient {i}")));

    c.bench_function("assembly/fill_and_mix", |b| {
        b.iter(|| {
            let mut session = AssemblySession::from_remedy(&remedy);
            for ingredient in &remedy.ingredients {
                session.add_ingredient(ingredient.as_str()).unwrap();
            }
            session.finalize().unwrap()
        });
    });
}

criterion_group!(benches, bench_resolve_stages, bench_assembly);
criterion_main!(benches);
