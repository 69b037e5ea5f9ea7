//! Property tests over randomly generated expression sources.

use quickcheck::{Arbitrary, Gen, TestResult, quickcheck};

use crate::{Group, Term, add, multiply, parse, subtract};

/// A randomly generated, always-parseable expression source string.
#[derive(Clone, Debug)]
struct ExprSource(String);

impl Arbitrary for ExprSource {
    fn arbitrary(g: &mut Gen) -> Self {
        ExprSource(gen_expr(g, 3))
    }
}

fn gen_expr(g: &mut Gen, depth: u8) -> String {
    if depth == 0 {
        return gen_atom(g);
    }
    match g.choose(&[0u8, 1, 2, 3, 4, 5]).copied().unwrap_or(5) {
        0 | 1 => format!("{}+{}", gen_expr(g, depth - 1), gen_expr(g, depth - 1)),
        2 => format!("{}-{}", gen_expr(g, depth - 1), gen_expr(g, depth - 1)),
        3 => format!("{}*{}", gen_expr(g, depth - 1), gen_expr(g, depth - 1)),
        4 => {
            let exp = g.choose(&[0u8, 1, 2, 3]).copied().unwrap_or(2);
            format!("({})^{}", gen_expr(g, depth - 1), exp)
        }
        _ => gen_atom(g),
    }
}

fn gen_atom(g: &mut Gen) -> String {
    g.choose(&[
        "x", "y", "z", "a", "b", "0", "1", "2", "3", "5", "7", "sin(x)", "sqrt(2)", "x^2",
    ])
    .copied()
    .unwrap_or("x")
    .to_string()
}

/// Walk a term and verify the canonical-form invariants the kernel
/// promises: no zero-multiplier children, unit multipliers on product
/// children, no demotable single-child composites.
fn check_invariants(t: &Term) -> Result<(), String> {
    if t.group().is_composite() && t.power().is_one() && t.children().len() < 2 {
        return Err(format!("demotable composite: {}", t.text()));
    }
    for child in t.children().values() {
        if child.multiplier().is_zero() {
            return Err(format!("zero-multiplier child in {}", t.text()));
        }
        if t.group() == Group::CB && !child.multiplier().is_one() {
            return Err(format!("non-unit product child in {}", t.text()));
        }
        check_invariants(child)?;
    }
    for arg in t.args() {
        check_invariants(arg)?;
    }
    Ok(())
}

quickcheck! {
    fn prop_clone_fidelity(src: ExprSource) -> TestResult {
        let Ok(t) = parse(&src.0) else {
            return TestResult::discard();
        };
        TestResult::from_bool(t.clone() == t)
    }

    fn prop_round_trip(src: ExprSource) -> TestResult {
        let Ok(t) = parse(&src.0) else {
            return TestResult::discard();
        };
        match parse(&t.text()) {
            Ok(again) => TestResult::from_bool(again == t),
            Err(e) => TestResult::error(format!("emitted '{}' failed: {e}", t.text())),
        }
    }

    fn prop_kernel_output_is_canonical(src: ExprSource) -> TestResult {
        let Ok(t) = parse(&src.0) else {
            return TestResult::discard();
        };
        match check_invariants(&t) {
            Ok(()) => TestResult::passed(),
            Err(msg) => TestResult::error(msg),
        }
    }

    fn prop_addition_commutes(a: ExprSource, b: ExprSource) -> TestResult {
        let (Ok(ta), Ok(tb)) = (parse(&a.0), parse(&b.0)) else {
            return TestResult::discard();
        };
        TestResult::from_bool(add(&ta, &tb) == add(&tb, &ta))
    }

    fn prop_multiplication_commutes(a: ExprSource, b: ExprSource) -> TestResult {
        let (Ok(ta), Ok(tb)) = (parse(&a.0), parse(&b.0)) else {
            return TestResult::discard();
        };
        TestResult::from_bool(multiply(&ta, &tb) == multiply(&tb, &ta))
    }

    fn prop_add_then_subtract_recovers(a: ExprSource, b: ExprSource) -> TestResult {
        let (Ok(ta), Ok(tb)) = (parse(&a.0), parse(&b.0)) else {
            return TestResult::discard();
        };
        let sum = add(&ta, &tb);
        TestResult::from_bool(subtract(&sum, &tb) == ta)
    }

    fn prop_doubling_matches_scaling(src: ExprSource) -> TestResult {
        let Ok(t) = parse(&src.0) else {
            return TestResult::discard();
        };
        let two = Term::int(2);
        TestResult::from_bool(add(&t, &t) == multiply(&two, &t))
    }

    fn prop_equality_requires_structure(src: ExprSource) -> TestResult {
        let Ok(t) = parse(&src.0) else {
            return TestResult::discard();
        };
        if t.is_zero() {
            return TestResult::discard();
        }
        // Adding one must change the term.
        let bumped = add(&t, &Term::one());
        TestResult::from_bool(bumped != t)
    }
}
