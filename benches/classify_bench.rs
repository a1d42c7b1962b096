use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use kanji_topics::algo::engine::{Engine, EngineConfig};
use kanji_topics::algo::item::Item;
use kanji_topics::algo::taxonomy::{embedded_default_json, parse_taxonomy};

/// Synthetic kanji spread over matched, fallback-only and unmatched glosses.
fn generate_items(n: usize) -> Vec<Item> {
    let glosses = [
        ("法", "law, method", "法律", "legislation"),
        ("雪", "snow", "雪国", "snow country"),
        ("猫", "cat", "子猫", "kitten"),
        ("戸", "door", "戸口", "doorway"),
        ("忙", "busy", "多忙", "pressure of work"),
        ("券", "ticket", "定期券", "commuter pass"),
        ("匂", "fragrance", "匂い", "smell"),
        ("乙", "latter", "甲乙", "A and B"),
    ];
    (0..n)
        .map(|i| {
            let (ch, gloss, word, word_gloss) = glosses[i % glosses.len()];
            Item::new(i as i64 + 1, ch, gloss).with_example(word, word_gloss)
        })
        .collect()
}

fn engine() -> Engine {
    let tax = parse_taxonomy(embedded_default_json()).expect("embedded taxonomy");
    Engine::new(tax, EngineConfig::default()).expect("engine")
}

fn bench_route(c: &mut Criterion) {
    let e = engine();
    let items = generate_items(1000);
    c.bench_function("route/1000_items", |b| b.iter(|| e.route(black_box(&items))));
}

fn bench_run(c: &mut Criterion) {
    let e = engine();
    let mut group = c.benchmark_group("run");
    for size in [100, 500, 2000] {
        let items = generate_items(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &items, |b, items| {
            b.iter(|| e.run(black_box(items)).expect("run"))
        });
    }
    group.finish();
}

fn bench_taxonomy_parse(c: &mut Criterion) {
    c.bench_function("taxonomy/parse_embedded", |b| {
        b.iter(|| parse_taxonomy(black_box(embedded_default_json())))
    });
}

criterion_group!(benches, bench_route, bench_run, bench_taxonomy_parse);
criterion_main!(benches);
