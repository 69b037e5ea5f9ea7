//! Exponentiation and radicals.
//!
//! `pow` normalizes across every base/exponent shape: exact folding for
//! rational cases, perfect-power extraction for fractional exponents of
//! integers (group P), exponent chaining, and EX promotion/demotion for
//! symbolic exponents.

use num_bigint::BigInt;
use num_integer::Roots;
use num_traits::{One, Zero};

use crate::core::error::AlgebraError;
use crate::core::frac::Frac;
use crate::core::settings::Settings;
use crate::core::term::{Group, Power, Term};
use crate::kernel::{apply_power, multiply, power_term};

/// Raise `base` to `exp`, producing a canonical result.
///
/// `x^0` and `0^0` are 1; `0^positive` is 0; `0^negative` is a division
/// by zero.
pub fn pow(base: &Term, exp: &Term, settings: &Settings) -> Result<Term, AlgebraError> {
    if exp.group() == Group::N {
        let p = exp.multiplier().clone();
        if p.is_zero() {
            return Ok(Term::one());
        }
        if base.is_zero() {
            return if p.is_negative() {
                Err(AlgebraError::DivisionByZero)
            } else {
                Ok(Term::zero())
            };
        }
        if p.is_one() {
            return Ok(base.clone());
        }
        if base.group() == Group::N {
            return numeric_pow(base.multiplier(), &p);
        }
        // The multiplier and the core raise independently:
        // (m*core)^p = m^p * core^p.
        let coeff = numeric_pow(base.multiplier(), &p)?;
        let mut core = base.clone();
        core.multiplier = Frac::one();
        let raised = raise_core(core, &p, settings)?;
        return Ok(multiply(&coeff, &raised, settings));
    }

    // Symbolic exponent.
    if base.is_zero() {
        return Ok(Term::zero());
    }
    if base.is_one() {
        return Ok(Term::one());
    }
    if base.group() == Group::N {
        return Ok(promote_numeric(base.multiplier(), exp));
    }
    let mut out = if base.multiplier().is_one() {
        base.clone()
    } else {
        // Split the coefficient off: (m*core)^exp = m^exp * core^exp.
        let coeff = promote_numeric(base.multiplier(), exp);
        let mut core = base.clone();
        core.multiplier = Frac::one();
        let raised = raise_symbolic(core, exp, settings);
        return Ok(multiply(&coeff, &raised, settings));
    };
    out.multiplier = Frac::one();
    Ok(raise_symbolic(out, exp, settings))
}

/// `sqrt(x)` is `x^(1/2)`, with perfect squares folded by `pow`.
pub fn sqrt(t: &Term, settings: &Settings) -> Result<Term, AlgebraError> {
    pow(t, &Term::number(Frac::new(1, 2)), settings)
}

/// Raise a unit-multiplier core by a rational exponent.
fn raise_core(core: Term, p: &Frac, settings: &Settings) -> Result<Term, AlgebraError> {
    match core.group() {
        // A flat product distributes the exponent over its factors.
        Group::CB if core.power().is_one() => {
            let exp = Term::number(p.clone());
            let mut out = Term::one();
            for child in core.children().values() {
                out = multiply(&out, &pow(child, &exp, settings)?, settings);
            }
            Ok(out)
        }
        _ => {
            let raised = mul_power(core.power(), p, settings);
            Ok(apply_power(core, raised, settings))
        }
    }
}

/// Raise a unit-multiplier core by a symbolic exponent, chaining any
/// existing power multiplicatively.
fn raise_symbolic(core: Term, exp: &Term, settings: &Settings) -> Term {
    let chained = if core.power().is_one() {
        Power::Term(Box::new(exp.clone()))
    } else {
        let existing = power_term(core.power());
        let combined = multiply(&existing, exp, settings);
        if combined.is_constant() {
            Power::Rat(combined.multiplier().clone())
        } else {
            Power::Term(Box::new(combined))
        }
    };
    apply_power(core, chained, settings)
}

/// Multiply an existing power by a rational exponent.
fn mul_power(power: &Power, p: &Frac, settings: &Settings) -> Power {
    match power {
        Power::Rat(r) => Power::Rat(r * p),
        Power::Term(t) => {
            let combined = multiply(t, &Term::number(p.clone()), settings);
            if combined.is_constant() {
                Power::Rat(combined.multiplier().clone())
            } else {
                Power::Term(Box::new(combined))
            }
        }
    }
}

/// Promote a numeric base under a symbolic exponent to group EX.
fn promote_numeric(m: &Frac, exp: &Term) -> Term {
    if m.is_one() {
        return Term::one();
    }
    // Fractions and negatives parenthesize so the hash re-parses as a base.
    let hash = if m.is_integer() && !m.is_negative() {
        m.to_string()
    } else {
        format!("({m})")
    };
    let mut t = Term::blank(Group::EX, hash);
    t.previous_group = Some(Group::N);
    t.power = Power::Term(Box::new(exp.clone()));
    t
}

/// Exact rational exponentiation: integer exponents fold completely;
/// fractional exponents extract perfect-power factors and leave the rest
/// as group-P radicals. The caller guarantees a nonzero base.
pub(crate) fn numeric_pow(m: &Frac, p: &Frac) -> Result<Term, AlgebraError> {
    if let Some(k) = p.to_integer() {
        if m.is_zero() && k < 0 {
            return Err(AlgebraError::DivisionByZero);
        }
        return Ok(Term::number(m.pow(k)));
    }
    if p.is_negative() {
        let inv = m.invert()?;
        return numeric_pow(&inv, &-p);
    }

    let v = match p.denom().to_string().parse::<u32>() {
        Ok(v) => v,
        // Astronomical root index: keep the radical symbolic.
        Err(_) => return Ok(raw_radical(m, p)),
    };
    let u0 = match p.numer().to_string().parse::<u64>() {
        Ok(u) => u,
        Err(_) => return Ok(raw_radical(m, p)),
    };

    // Negative bases: even roots of index two pull out the imaginary unit,
    // odd roots carry the sign, other even indices stay symbolic.
    if m.is_negative() {
        let abs = m.abs();
        if v == 2 {
            let inner = numeric_pow(&abs, p)?;
            let i = Term::imaginary_unit("i");
            return Ok(multiply(&i, &inner, &Settings::default()));
        }
        if v % 2 == 1 {
            let inner = numeric_pow(&abs, p)?;
            let sign = if u0 % 2 == 1 { -1 } else { 1 };
            return Ok(multiply(&Term::int(sign), &inner, &Settings::default()));
        }
        return Ok(raw_radical(m, p));
    }

    let k = (u0 / u64::from(v)) as i64;
    let u = (u0 % u64::from(v)) as i64;
    if u == 0 {
        return Ok(Term::number(m.pow(k)));
    }

    let (out_n, in_n) = extract_root(m.numer(), v);
    let (out_d, in_d) = extract_root(m.denom(), v);

    let mut rational = m.pow(k);
    rational = &rational * &Frac::new(out_n, out_d).pow(u);

    let frac_exp = Frac::new(u, i64::from(v));
    let mut out = Term::number(rational);
    let settings = Settings::default();
    if !in_n.is_one() {
        out = multiply(&out, &Term::surd(in_n, frac_exp.clone()), &settings);
    }
    if !in_d.is_one() {
        out = multiply(&out, &Term::surd(in_d, -&frac_exp), &settings);
    }
    Ok(out)
}

/// A group-P radical with no extraction attempted (non-integer bases and
/// out-of-range indices).
fn raw_radical(m: &Frac, p: &Frac) -> Term {
    if m.is_integer() {
        return Term::surd(m.numer().clone(), p.clone());
    }
    let settings = Settings::default();
    let num = Term::surd(m.numer().clone(), p.clone());
    let den = Term::surd(m.denom().clone(), -p);
    multiply(&num, &den, &settings)
}

/// Split a non-negative integer `n` into `(outside, inside)` with
/// `n = outside^v * inside`, pulling out every perfect v-th-power factor
/// reachable by small-prime trial division.
fn extract_root(n: &BigInt, v: u32) -> (BigInt, BigInt) {
    if n.is_one() || v == 0 {
        return (BigInt::one(), n.clone());
    }
    let root = n.nth_root(v);
    if root.pow(v) == *n {
        return (root, BigInt::one());
    }

    let mut remaining = n.clone();
    let mut outside = BigInt::one();
    let mut inside = BigInt::one();
    let mut d = 2u32;
    while d <= 1000 {
        let big_d = BigInt::from(d);
        if &big_d * &big_d > remaining {
            break;
        }
        let mut count = 0u32;
        while (&remaining % &big_d).is_zero() {
            remaining /= &big_d;
            count += 1;
        }
        if count > 0 {
            outside *= big_d.pow(count / v);
            inside *= big_d.pow(count % v);
        }
        d += if d == 2 { 1 } else { 2 };
    }
    if !remaining.is_one() {
        let r = remaining.nth_root(v);
        if r.pow(v) == remaining {
            outside *= r;
        } else {
            inside *= remaining;
        }
    }
    (outside, inside)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s() -> Settings {
        Settings::default()
    }

    fn x() -> Term {
        Term::variable("x")
    }

    #[test]
    fn trivial_exponents() {
        assert!(pow(&x(), &Term::zero(), &s()).unwrap().is_one());
        assert_eq!(pow(&x(), &Term::one(), &s()).unwrap(), x());
        assert!(pow(&Term::zero(), &Term::zero(), &s()).unwrap().is_one());
        assert!(pow(&Term::zero(), &Term::int(3), &s()).unwrap().is_zero());
        assert_eq!(
            pow(&Term::zero(), &Term::int(-1), &s()),
            Err(AlgebraError::DivisionByZero)
        );
    }

    #[test]
    fn integer_exponents_fold_exactly() {
        let r = pow(&Term::int(2), &Term::int(10), &s()).unwrap();
        assert_eq!(r, Term::int(1024));
        let r = pow(&Term::number(Frac::new(2, 3)), &Term::int(-2), &s()).unwrap();
        assert_eq!(r, Term::number(Frac::new(9, 4)));
    }

    #[test]
    fn perfect_squares_fold() {
        let r = sqrt(&Term::int(4), &s()).unwrap();
        assert_eq!(r, Term::int(2));
    }

    #[test]
    fn imperfect_squares_extract() {
        // sqrt(8) = 2*2^(1/2)
        let r = sqrt(&Term::int(8), &s()).unwrap();
        assert_eq!(r.text(), "2*2^(1/2)");
        // sqrt(2) stays a radical
        let r = sqrt(&Term::int(2), &s()).unwrap();
        assert_eq!(r.group(), Group::P);
        assert_eq!(r.text(), "2^(1/2)");
    }

    #[test]
    fn radical_times_itself_demotes() {
        let r = sqrt(&Term::int(2), &s()).unwrap();
        let prod = multiply(&r, &r, &s());
        assert_eq!(prod, Term::int(2));
    }

    #[test]
    fn sqrt_of_negative_pulls_out_i() {
        let r = sqrt(&Term::int(-4), &s()).unwrap();
        assert_eq!(r.text(), "2*i");
        assert!(r.is_imaginary());
    }

    #[test]
    fn multiplier_distributes_over_power() {
        // (2x)^3 = 8*x^3
        let two_x = multiply(&Term::int(2), &x(), &s());
        let r = pow(&two_x, &Term::int(3), &s()).unwrap();
        assert_eq!(r.text(), "8*x^3");
    }

    #[test]
    fn product_distributes_integer_power() {
        let xy = multiply(&x(), &Term::variable("y"), &s());
        let r = pow(&xy, &Term::int(2), &s()).unwrap();
        assert_eq!(r.text(), "x^2*y^2");
    }

    #[test]
    fn exponent_chaining_multiplies() {
        // (x^2)^3 = x^6
        let x2 = pow(&x(), &Term::int(2), &s()).unwrap();
        let r = pow(&x2, &Term::int(3), &s()).unwrap();
        assert_eq!(r.text(), "x^6");
    }

    #[test]
    fn symbolic_exponent_promotes_to_ex() {
        let y = Term::variable("y");
        let r = pow(&x(), &y, &s()).unwrap();
        assert_eq!(r.group(), Group::EX);
        assert_eq!(r.previous_group(), Some(Group::S));
        assert_eq!(r.text(), "x^(y)");
    }

    #[test]
    fn symbolic_exponent_on_numeric_base() {
        let y = Term::variable("y");
        let r = pow(&Term::int(2), &y, &s()).unwrap();
        assert_eq!(r.group(), Group::EX);
        assert_eq!(r.previous_group(), Some(Group::N));
        assert_eq!(r.text(), "2^(y)");
    }

    #[test]
    fn ex_demotes_when_power_collapses() {
        let y = Term::variable("y");
        let two_y = pow(&Term::int(2), &y, &s()).unwrap();
        let y_inv = crate::kernel::invert(&y, &s()).unwrap();
        // (2^y)^(1/y) = 2
        let r = pow(&two_y, &y_inv, &s()).unwrap();
        assert_eq!(r, Term::int(2));
    }

    #[test]
    fn composite_base_keeps_power() {
        let sum = crate::kernel::add(&x(), &Term::one(), &s());
        let r = pow(&sum, &Term::int(2), &s()).unwrap();
        assert_eq!(r.group(), Group::CP);
        assert_eq!(r.rational_power(), Some(&Frac::from(2)));
        assert_eq!(r.text(), "(1+x)^2");
    }
}
