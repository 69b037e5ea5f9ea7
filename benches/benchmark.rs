//! Parse and normalization benchmarks.

use criterion::{Criterion, criterion_group, criterion_main};
use symbra::{add, expand, parse};

fn bench_pipeline(c: &mut Criterion) {
    c.bench_function("parse_mixed_expression", |b| {
        b.iter(|| parse("3*x^2 + 2*x*y - y^2 + sin(x) + sqrt(8)").unwrap());
    });

    c.bench_function("fold_fifty_like_terms", |b| {
        let x = parse("x").unwrap();
        b.iter(|| {
            let mut acc = parse("0").unwrap();
            for _ in 0..50 {
                acc = add(&acc, &x);
            }
            acc
        });
    });

    c.bench_function("expand_binomial_eighth_power", |b| {
        let t = parse("(x+1)^8").unwrap();
        b.iter(|| expand(&t));
    });
}

criterion_group!(benches, bench_pipeline);
criterion_main!(benches);
