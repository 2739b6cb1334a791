use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use dictate::sentence_detector::{normalize_text, SentenceSegmenter};
use dictate::timing::sentences_from_text;

const SIMPLE_TEXT: &str = "Hello world. This is a test. How are you?";
const COMPLEX_TEXT: &str = "\u{201C}Mr. Smith,\u{201D} she said, \u{201C}went to Washington, D.C. last week.\u{201D}\n\
    He replied, \u{2018}I saw them there at 9 a.m.\u{2019} It was a surprise!\n\
    Pi is roughly 3.14\u{2026} isn\u{2019}t it?";

fn long_text() -> String {
    COMPLEX_TEXT.repeat(200)
}

fn bench_segmentation(c: &mut Criterion) {
    let segmenter = SentenceSegmenter::with_default_rules().expect("default rules compile");
    let long = long_text();
    let mut group = c.benchmark_group("segmentation");

    group.bench_function("simple_text", |b| {
        b.iter(|| segmenter.segment(black_box(SIMPLE_TEXT)))
    });

    group.bench_function("complex_text", |b| {
        b.iter(|| segmenter.segment(black_box(COMPLEX_TEXT)))
    });

    group.throughput(Throughput::Bytes(long.len() as u64));
    group.bench_function("long_text", |b| {
        b.iter(|| segmenter.segment(black_box(&long)))
    });

    group.finish();
}

fn bench_normalization_and_timing(c: &mut Criterion) {
    let long = long_text();
    let mut group = c.benchmark_group("text_preparation");
    group.throughput(Throughput::Bytes(long.len() as u64));

    group.bench_function("normalize_long_text", |b| {
        b.iter(|| normalize_text(black_box(&long)))
    });

    group.bench_function("estimated_timings_long_text", |b| {
        b.iter(|| sentences_from_text(black_box(&long)))
    });

    group.finish();
}

criterion_group!(benches, bench_segmentation, bench_normalization_and_timing);
criterion_main!(benches);
