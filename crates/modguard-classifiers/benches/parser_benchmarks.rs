//! Verdict parser throughput benchmarks
//!
//! Covers both parsing branches: the structured JSON path and the keyword
//! heuristic fallback over unstructured prose.
//!
//! Run with: cargo bench -p modguard-classifiers

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use modguard_classifiers::VerdictParser;

fn benchmark_parser(c: &mut Criterion) {
    let parser = VerdictParser::new().expect("Failed to create verdict parser");

    let long_prose = "The submitted text discusses gardening tips and seasonal planting. ".repeat(40);

    let test_cases = vec![
        (
            "bare_json",
            r#"{"classification":"SAFE","reasoning":"friendly message","confidence":0.95}"#.to_string(),
        ),
        (
            "fenced_json",
            "Assessment:\n```json\n{\"classification\": \"INAPPROPRIATE\", \"reasoning\": \"threatening language\", \"confidence\": 0.88}\n```".to_string(),
        ),
        ("prose_flagged", "The image contains explicit sexual content.".to_string()),
        ("prose_safe", "this image is totally fine, appropriate for all ages".to_string()),
        ("prose_unclear_long", long_prose),
    ];

    let mut group = c.benchmark_group("Verdict_Parser");
    group.significance_level(0.05);
    group.sample_size(100);

    for (name, raw) in &test_cases {
        group.bench_with_input(BenchmarkId::new("parse", name), raw, |b, raw| {
            b.iter(|| parser.parse(black_box(raw)))
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_parser);
criterion_main!(benches);
