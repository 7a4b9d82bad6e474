use accgen::credential::{Detector, parse};
use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;

fn restock_payload(records: usize) -> String {
    let mut text = String::new();
    for i in 0..records {
        if i % 2 == 0 {
            text.push_str(&format!("user{i}:secret{i}\n"));
        } else {
            text.push_str(&format!("Username\nuser{i}\nPassword\nsecret{i}\n\n"));
        }
    }
    text
}

fn parser_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("parser");

    for records in [10, 1_000] {
        let payload = restock_payload(records);
        group.throughput(Throughput::Bytes(payload.len() as u64));
        group.bench_function(format!("mixed_{records}"), |b| {
            b.iter(|| parse(black_box(&payload)))
        });
    }

    group.finish();
}

fn detector_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("detector");
    let detector = Detector::new().unwrap();
    let template = "New account\nUsername\nbob\nPassword\nhunter2\nCombo\nbob:hunter2";
    let chatter = "nothing to see here, just a regular message about the weather";

    group.throughput(Throughput::Elements(1));
    group.bench_function("template", |b| b.iter(|| detector.detect(black_box(template))));
    group.bench_function("chatter", |b| b.iter(|| detector.detect(black_box(chatter))));

    group.finish();
}

criterion_group!(benches, parser_benchmark, detector_benchmark);
criterion_main!(benches);
