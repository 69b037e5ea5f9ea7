//! Expansion: distribute products over sums and open up integer powers of
//! composite bases.
//!
//! The kernel itself never distributes: `(x+1)*(y+1)` stays a product and
//! `(x+1)^2` a squared sum. `expand` is the explicit transform that turns
//! them into flat polynomials.

use crate::core::settings::Settings;
use crate::core::term::{Group, Term};
use crate::kernel::{add, distribute_multiplier, multiply};

/// Fully distribute a term into a flat sum where possible.
pub fn expand(t: &Term, settings: &Settings) -> Term {
    match t.group() {
        Group::CP | Group::PL => expand_sum(t, settings),
        Group::CB => expand_product(t, settings),
        Group::FN => {
            let mut out = t.clone();
            out.args = out.args.iter().map(|a| expand(a, settings)).collect();
            out.update_hash();
            out
        }
        Group::N | Group::P | Group::S | Group::EX => t.clone(),
    }
}

fn expand_sum(t: &Term, settings: &Settings) -> Term {
    match t.rational_power().and_then(crate::core::frac::Frac::to_integer) {
        // Flat sum: push the lazy head multiplier down and rebuild from
        // expanded children.
        Some(1) => {
            let distributed = distribute_multiplier(t);
            let mut flat = Term::zero();
            for child in distributed.children().values() {
                flat = add(&flat, &expand(child, settings), settings);
            }
            flat
        }
        // Small positive integer power: open it by repeated distributed
        // multiplication of the flattened base.
        Some(n) if n > 1 && n <= i64::from(settings.expansion_cap) => {
            let mut base = t.clone();
            base.multiplier = crate::core::frac::Frac::one();
            base.power = crate::core::term::Power::Rat(crate::core::frac::Frac::one());
            let flat = expand_sum(&base, settings);
            let mut out = flat.clone();
            for _ in 1..n {
                out = distributed_multiply(&out, &flat, settings);
            }
            if !t.multiplier().is_one() {
                out = multiply(&Term::number(t.multiplier().clone()), &out, settings);
                out = distribute_if_sum(&out);
            }
            out
        }
        // Negative, fractional, oversized, or symbolic powers stay closed;
        // children still expand in place.
        _ => {
            let mut out = t.clone();
            let old = std::mem::take(&mut out.children);
            for child in old.into_values() {
                let expanded = expand(&child, settings);
                let key = expanded.key_for_group(out.group(), settings);
                if let Some(existing) = out.children.remove(&key) {
                    let combined = add(&existing, &expanded, settings);
                    if !combined.is_zero() {
                        out.children.insert(key, combined);
                    }
                } else {
                    out.children.insert(key, expanded);
                }
            }
            out.update_hash();
            out
        }
    }
}

fn expand_product(t: &Term, settings: &Settings) -> Term {
    if !t.power().is_one() {
        return t.clone();
    }
    let mut out = Term::number(t.multiplier().clone());
    for child in t.children().values() {
        let expanded = expand(child, settings);
        out = distributed_multiply(&out, &expanded, settings);
    }
    out
}

/// Multiply, distributing either side's flat sum over the other.
fn distributed_multiply(a: &Term, b: &Term, settings: &Settings) -> Term {
    if is_flat_sum(a) {
        let a = distribute_if_sum(a);
        let mut out = Term::zero();
        for child in a.children().values() {
            out = add(&out, &distributed_multiply(child, b, settings), settings);
        }
        return out;
    }
    if is_flat_sum(b) {
        return distributed_multiply(b, a, settings);
    }
    multiply(a, b, settings)
}

fn is_flat_sum(t: &Term) -> bool {
    matches!(t.group(), Group::CP | Group::PL) && t.power().is_one()
}

fn distribute_if_sum(t: &Term) -> Term {
    if is_flat_sum(t) {
        distribute_multiplier(t)
    } else {
        t.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::frac::Frac;
    use crate::kernel::pow;

    fn s() -> Settings {
        Settings::default()
    }

    fn x() -> Term {
        Term::variable("x")
    }

    #[test]
    fn expands_squared_binomial() {
        // (x+1)^2 = x^2 + 2x + 1
        let sum = add(&x(), &Term::one(), &s());
        let squared = pow(&sum, &Term::int(2), &s()).unwrap();
        let expanded = expand(&squared, &s());

        let x2 = pow(&x(), &Term::int(2), &s()).unwrap();
        let two_x = multiply(&Term::int(2), &x(), &s());
        let expected = add(&add(&x2, &two_x, &s()), &Term::one(), &s());
        assert_eq!(expanded, expected);
    }

    #[test]
    fn expands_product_of_sums() {
        // (x+1)*(y+2) = x*y + 2x + y + 2
        let a = add(&x(), &Term::one(), &s());
        let b = add(&Term::variable("y"), &Term::int(2), &s());
        let product = multiply(&a, &b, &s());
        let expanded = expand(&product, &s());
        assert_eq!(expanded.group(), Group::CP);
        assert_eq!(expanded.len(), 4);
    }

    #[test]
    fn distributes_lazy_multiplier() {
        // 3*(x+1) expands to 3x + 3
        let sum = add(&x(), &Term::one(), &s());
        let scaled = multiply(&Term::int(3), &sum, &s());
        let expanded = expand(&scaled, &s());
        let expected = add(
            &multiply(&Term::int(3), &x(), &s()),
            &Term::int(3),
            &s(),
        );
        assert_eq!(expanded, expected);
    }

    #[test]
    fn atoms_are_untouched() {
        assert_eq!(expand(&x(), &s()), x());
        let r = pow(&x(), &Term::number(Frac::new(1, 2)), &s()).unwrap();
        assert_eq!(expand(&r, &s()), r);
    }
}
