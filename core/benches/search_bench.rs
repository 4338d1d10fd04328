use criterion::{criterion_group, criterion_main, Criterion};
use ir_core::stemmer::normalize;
use ir_core::tokenizer::tokenize;
use ir_core::SearchEngine;

const TEXT: &str = "It was the best of times, it was the worst of times, it was the age of wisdom, \
    it was the age of foolishness, it was the epoch of belief, it was the epoch of incredulity, \
    it was the season of Light, it was the season of Darkness, it was the spring of hope, \
    it was the winter of despair, we had everything before us, we had nothing before us.";

fn bench_normalize(c: &mut Criterion) {
    c.bench_function("tokenize_and_normalize", |b| {
        b.iter(|| tokenize(TEXT).iter().map(|t| normalize(t)).count())
    });
}

fn bench_search(c: &mut Criterion) {
    let mut engine = SearchEngine::default();
    for doc_id in 0..500 {
        let text = if doc_id % 3 == 0 { TEXT.replace("hope", "dread") } else { TEXT.to_string() };
        engine.build_index_for_document(&text, doc_id);
    }
    c.bench_function("boolean_search", |b| {
        b.iter(|| engine.boolean_search("season epoch NOT dread"))
    });
}

criterion_group!(benches, bench_normalize, bench_search);
criterion_main!(benches);
