//! Benchmarks for keyword matching.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use docsift::config::SearchConfig;
use docsift::search::KeywordMatcher;

fn corpus() -> String {
    let paragraph = "The committee reviewed the proposal for a Phase III clinical trial \
                     and recommended additional safety data before approval. ";
    paragraph.repeat(2_000)
}

fn search_benchmark(c: &mut Criterion) {
    let text = corpus();
    let matcher = KeywordMatcher::new("clinical trial", &SearchConfig::default()).unwrap();
    let missing = KeywordMatcher::new("pharmacovigilance", &SearchConfig::default()).unwrap();

    c.bench_function("count", |b| b.iter(|| black_box(matcher.count(black_box(&text)))));
    c.bench_function("search_with_snippets", |b| {
        b.iter(|| black_box(matcher.search(black_box(&text))))
    });
    c.bench_function("search_no_match", |b| {
        b.iter(|| black_box(missing.search(black_box(&text))))
    });
}

criterion_group!(benches, search_benchmark);
criterion_main!(benches);
