#![allow(
    clippy::print_stdout,
    clippy::unwrap_used,
    clippy::panic,
    reason = "fuzz harness reports its seed and asserts directly"
)]

//! Seeded random fuzzing of the parse → normalize → emit pipeline.
//!
//! Each run prints its seed so failures reproduce exactly.

use rand::{RngExt, SeedableRng, rngs::StdRng};

use crate::{Group, Term, add, multiply, parse};

fn random_std_rng_with_seed() -> (StdRng, u64) {
    let seed: u64 = rand::random();
    (StdRng::seed_from_u64(seed), seed)
}

const ATOMS: &[&str] = &[
    "x", "y", "z", "a", "b", "c", "0", "1", "2", "3", "7", "12", "pi", "sqrt(2)", "sin(x)",
    "1/3",
];

fn random_expr(rng: &mut StdRng, depth: usize) -> String {
    if depth == 0 {
        return ATOMS[rng.random_range(0..ATOMS.len())].to_string();
    }
    match rng.random_range(0..7) {
        0 | 1 => format!(
            "{}+{}",
            random_expr(rng, depth - 1),
            random_expr(rng, depth - 1)
        ),
        2 => format!(
            "{}-{}",
            random_expr(rng, depth - 1),
            random_expr(rng, depth - 1)
        ),
        3 | 4 => format!(
            "{}*{}",
            random_expr(rng, depth - 1),
            random_expr(rng, depth - 1)
        ),
        5 => format!("({})^{}", random_expr(rng, depth - 1), rng.random_range(0..4)),
        _ => format!("-({})", random_expr(rng, depth - 1)),
    }
}

fn assert_canonical(t: &Term, source: &str) {
    if t.group().is_composite() && t.power().is_one() {
        assert!(
            t.children().len() >= 2,
            "demotable composite from '{source}': {}",
            t.text()
        );
    }
    for child in t.children().values() {
        assert!(
            !child.multiplier().is_zero(),
            "zero child from '{source}': {}",
            t.text()
        );
        if t.group() == Group::CB {
            assert!(
                child.multiplier().is_one(),
                "non-unit product child from '{source}': {}",
                t.text()
            );
        }
        assert_canonical(child, source);
    }
    for arg in t.args() {
        assert_canonical(arg, source);
    }
}

#[test]
fn fuzz_parse_roundtrip_and_invariants() {
    let (mut rng, seed) = random_std_rng_with_seed();
    println!("fuzz_parse_roundtrip_and_invariants seed: {seed}");

    for _ in 0..300 {
        let source = random_expr(&mut rng, 3);
        let term = match parse(&source) {
            Ok(t) => t,
            Err(e) => panic!("seed {seed}: '{source}' failed to parse: {e}"),
        };
        assert_canonical(&term, &source);

        let emitted = term.text();
        let again = match parse(&emitted) {
            Ok(t) => t,
            Err(e) => panic!("seed {seed}: emitted '{emitted}' failed to re-parse: {e}"),
        };
        assert_eq!(
            again, term,
            "seed {seed}: '{source}' → '{emitted}' did not round-trip"
        );
    }
}

#[test]
fn fuzz_kernel_algebra_laws() {
    let (mut rng, seed) = random_std_rng_with_seed();
    println!("fuzz_kernel_algebra_laws seed: {seed}");

    for _ in 0..200 {
        let a = parse(&random_expr(&mut rng, 2)).unwrap();
        let b = parse(&random_expr(&mut rng, 2)).unwrap();

        assert_eq!(add(&a, &b), add(&b, &a), "seed {seed}: addition commuted");
        assert_eq!(
            multiply(&a, &b),
            multiply(&b, &a),
            "seed {seed}: multiplication commuted"
        );

        let zero = Term::zero();
        assert_eq!(add(&a, &zero), a, "seed {seed}: additive identity");
        assert_eq!(
            multiply(&a, &Term::one()),
            a,
            "seed {seed}: multiplicative identity"
        );
        assert!(
            multiply(&a, &zero).is_zero(),
            "seed {seed}: zero absorption"
        );
    }
}
