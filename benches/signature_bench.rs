// SPDX-License-Identifier: MIT OR Apache-2.0
//! Benchmarks for canonical JSON and request signing with varying history sizes.

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

use bcb_baichuan_sdk::dialect::{BaichuanConfig, BaichuanMessage};
use bcb_baichuan_sdk::request::build_request;
use bcb_baichuan_sdk::signing::canonical_json;
use bcb_baichuan_sdk::{SecretKey, signature};
use bcb_core::ChatMessage;

/// Build a conversation of `n` alternating turns with some non-ASCII text.
fn make_history(n: usize) -> Vec<ChatMessage> {
    (0..n)
        .map(|i| {
            if i % 2 == 0 {
                ChatMessage::human(format!("question {i}: \u{4f60}\u{597d}"))
            } else {
                ChatMessage::ai(format!("answer {i}: hello \u{1f600}"))
            }
        })
        .collect()
}

fn make_wire(n: usize) -> Vec<BaichuanMessage> {
    (0..n)
        .map(|i| BaichuanMessage::new("user", format!("token-{i} \u{e9}")))
        .collect()
}

fn bench_canonical_json(c: &mut Criterion) {
    let mut group = c.benchmark_group("canonical_json_by_messages");

    for size in [1, 10, 100, 500] {
        let messages = make_wire(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &messages, |b, m| {
            b.iter(|| canonical_json(black_box(m)).unwrap());
        });
    }

    group.finish();
}

fn bench_signature(c: &mut Criterion) {
    let key = SecretKey::new("bench-secret");
    let mut group = c.benchmark_group("signature_by_messages");

    for size in [1, 10, 100] {
        let messages = make_wire(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &messages, |b, m| {
            b.iter(|| signature(&key, black_box(m), 1700000000).unwrap());
        });
    }

    group.finish();
}

fn bench_build_request(c: &mut Criterion) {
    let config = BaichuanConfig {
        api_key: Some(SecretKey::new("bench-api-key")),
        secret_key: Some(SecretKey::new("bench-secret")),
        ..BaichuanConfig::default()
    };
    let history = make_history(50);
    c.bench_function("build_request_50_turns", |b| {
        b.iter(|| build_request(&config, black_box(&history), 1700000000).unwrap());
    });
}

criterion_group!(
    benches,
    bench_canonical_json,
    bench_signature,
    bench_build_request,
);
criterion_main!(benches);
