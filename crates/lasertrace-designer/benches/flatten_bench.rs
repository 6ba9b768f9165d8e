use criterion::{black_box, criterion_group, criterion_main, Criterion};
use lasertrace_designer::{parse_path, Flattener};

const WAVE: &str = "M0 0 C10 40 30 40 40 0 S70 -40 80 0 S110 40 120 0 S150 -40 160 0 \
                    Q170 30 180 0 T200 0 T220 0 A30 15 20 1 1 260 0 Z";

fn bench_flatten(c: &mut Criterion) {
    let path = parse_path(WAVE, None, false).expect("benchmark path parses");

    let mut group = c.benchmark_group("flatten");
    for tolerance in [0.1, 0.01, 0.001] {
        let flattener = Flattener::new(tolerance);
        group.bench_function(format!("wave_tol_{tolerance}"), |b| {
            b.iter(|| flattener.flatten_path(black_box(&path)))
        });
    }
    group.finish();
}

fn bench_parse(c: &mut Criterion) {
    c.bench_function("parse_wave", |b| {
        b.iter(|| parse_path(black_box(WAVE), None, false))
    });
}

criterion_group!(benches, bench_flatten, bench_parse);
criterion_main!(benches);
