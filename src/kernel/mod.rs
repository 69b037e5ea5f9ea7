//! The normalizing arithmetic kernel.
//!
//! Pure functions over [`Term`]: every operation clones its inputs, mutates
//! the clone, and restores the canonical-form invariants before returning:
//!
//! - no child with multiplier 0;
//! - CB children stored with multiplier 1, the product of all child
//!   multipliers aggregated on the head;
//! - PL/CP head multipliers distribute lazily, never duplicated into
//!   children;
//! - composites that fall to zero or one child demote;
//! - group-P terms whose power turns integral fold into the multiplier;
//! - touched composites end with [`Term::update_hash`].
//!
//! Settings are threaded through for the child-key sentinel and the
//! expansion cap; the crate-root re-exports wrap these with defaults.

mod expand;
mod pow;

pub use expand::expand;
pub use pow::{pow, sqrt};

use crate::core::error::AlgebraError;
use crate::core::frac::Frac;
use crate::core::settings::Settings;
use crate::core::term::{Group, Power, Term};

// =============================================================================
// ADDITION
// =============================================================================

/// Add two terms, producing a canonical result.
pub fn add(a: &Term, b: &Term, settings: &Settings) -> Term {
    if a.is_infinite() {
        return a.clone();
    }
    if b.is_infinite() {
        return b.clone();
    }
    if a.is_zero() {
        return b.clone();
    }
    if b.is_zero() {
        return a.clone();
    }
    if a.group() == Group::N && b.group() == Group::N {
        return Term::number(a.multiplier() + b.multiplier());
    }

    // Like terms: identical up to multiplier.
    if like_terms(a, b) {
        let m = a.multiplier() + b.multiplier();
        if m.is_zero() {
            return Term::zero();
        }
        let mut out = a.clone();
        out.multiplier = m;
        return out;
    }

    // Same base, different power: group into a power-list.
    if let Some(pl) = try_power_list(a, b, settings) {
        return pl;
    }

    // General sum: a CP container keyed by content hash.
    let mut container = cp_container(a, settings);
    insert_add(&mut container, b, settings);
    finalize_sum(container, settings)
}

/// Subtract: `a + (-b)`.
pub fn subtract(a: &Term, b: &Term, settings: &Settings) -> Term {
    add(a, &negate(b), settings)
}

/// Negate a term by flipping its multiplier's sign.
pub fn negate(t: &Term) -> Term {
    let mut out = t.clone();
    out.multiplier = -&out.multiplier;
    out
}

fn like_terms(a: &Term, b: &Term) -> bool {
    let mut ac = a.clone();
    ac.multiplier = Frac::one();
    let mut bc = b.clone();
    bc.multiplier = Frac::one();
    ac == bc
}

/// True for groups whose terms can share a power-list base.
fn pl_capable(g: Group) -> bool {
    matches!(g, Group::S | Group::P | Group::EX)
}

fn try_power_list(a: &Term, b: &Term, settings: &Settings) -> Option<Term> {
    // Insert into an existing power-list over the same base. A PL keeps
    // the shared base name in its value.
    if a.group() == Group::PL
        && a.multiplier().is_one()
        && a.power().is_one()
        && pl_capable(b.group())
        && a.value() == b.base_hash()
    {
        let mut pl = a.clone();
        insert_pl(&mut pl, b, settings);
        return Some(finalize_sum(pl, settings));
    }
    if b.group() == Group::PL
        && b.multiplier().is_one()
        && b.power().is_one()
        && pl_capable(a.group())
        && b.value() == a.base_hash()
    {
        return try_power_list(b, a, settings);
    }
    // Two same-base terms of different power start a new power-list.
    if pl_capable(a.group())
        && pl_capable(b.group())
        && a.base_hash() == b.base_hash()
        && a.power() != b.power()
    {
        let mut pl = Term::blank(Group::PL, a.base_hash());
        pl.children
            .insert(a.key_for_group(Group::PL, settings), a.clone());
        insert_pl(&mut pl, b, settings);
        return Some(finalize_sum(pl, settings));
    }
    None
}

fn insert_pl(pl: &mut Term, b: &Term, settings: &Settings) {
    let key = b.key_for_group(Group::PL, settings);
    if let Some(existing) = pl.children.remove(&key) {
        let combined = add(&existing, b, settings);
        if !combined.is_zero() {
            pl.children.insert(key, combined);
        }
    } else {
        pl.children.insert(key, b.clone());
    }
    pl.update_hash();
}

/// Start a CP container from `a`. A CP or PL at unit multiplier and power
/// contributes its children directly; anything else (including a sum whose
/// head multiplier is held up lazily) nests as a single opaque child.
fn cp_container(a: &Term, settings: &Settings) -> Term {
    let mut container = Term::blank(Group::CP, String::new());
    insert_add(&mut container, a, settings);
    container
}

fn insert_add(container: &mut Term, b: &Term, settings: &Settings) {
    if b.is_zero() {
        return;
    }
    // An incoming flat sum distributes its head multiplier and merges
    // child-wise, so `x+1-(x+1)` cancels. The container's own head
    // multiplier is never touched.
    if matches!(b.group(), Group::CP | Group::PL) && b.power().is_one() {
        let flat = distribute_multiplier(b);
        for child in flat.children().values() {
            insert_add(container, child, settings);
        }
        container.update_hash();
        return;
    }
    let key = b.key_for_group(Group::CP, settings);
    if let Some(existing) = container.children.remove(&key) {
        let combined = add(&existing, b, settings);
        if !combined.is_zero() {
            // A same-content collision preserves the content hash, so the
            // key is still current.
            container.children.insert(key, combined);
        }
    } else {
        container.children.insert(key, b.clone());
    }
    container.update_hash();
}

/// Demote degenerate sums: zero children → 0, a single child → that child
/// scaled by the head multiplier. A general sum whose children all share
/// one base regroups as a power-list, keeping the representation of a sum
/// unique.
fn finalize_sum(mut t: Term, settings: &Settings) -> Term {
    if !t.group().is_composite() {
        return t;
    }
    if t.children.is_empty() {
        return Term::zero();
    }
    if t.children.len() == 1 && t.power().is_one() {
        let head = t.multiplier.clone();
        let mut child = t
            .children
            .into_iter()
            .next()
            .map(|(_, c)| c)
            .unwrap_or_else(Term::zero);
        child.multiplier = &child.multiplier * &head;
        if child.multiplier.is_zero() {
            return Term::zero();
        }
        return child;
    }
    if t.group() == Group::CP
        && let Some(base) = shared_pl_base(&t)
    {
        let mut pl = Term::blank(Group::PL, base);
        pl.multiplier = t.multiplier.clone();
        pl.power = t.power.clone();
        for child in t.children.values() {
            pl.children
                .insert(child.key_for_group(Group::PL, settings), child.clone());
        }
        return pl;
    }
    t.update_hash();
    t
}

/// The common base name of a sum's children, when every child is a
/// power-list-capable term over the same base.
fn shared_pl_base(t: &Term) -> Option<String> {
    let mut base: Option<String> = None;
    for child in t.children.values() {
        if !pl_capable(child.group()) {
            return None;
        }
        let bh = child.base_hash();
        match &base {
            None => base = Some(bh),
            Some(existing) if *existing == bh => {}
            Some(_) => return None,
        }
    }
    base
}

// =============================================================================
// MULTIPLICATION
// =============================================================================

/// Multiply two terms, producing a canonical result.
pub fn multiply(a: &Term, b: &Term, settings: &Settings) -> Term {
    if a.is_zero() || b.is_zero() {
        return Term::zero();
    }
    if a.is_infinite() || b.is_infinite() {
        let mut inf = Term::infinity();
        if a.sign() * b.sign() < 0 {
            inf.multiplier = -&inf.multiplier;
        }
        return inf;
    }
    if a.group() == Group::N && b.group() == Group::N {
        return Term::number(a.multiplier() * b.multiplier());
    }
    // A numeric factor folds into the other term's multiplier.
    if a.group() == Group::N {
        let mut out = b.clone();
        out.multiplier = &out.multiplier * a.multiplier();
        return out;
    }
    if b.group() == Group::N {
        return multiply(b, a, settings);
    }
    // Equal bases combine by adding powers.
    if combinable(a, b) {
        return combine_powers(a, b, settings);
    }
    // General product: a CB container keyed by base hash.
    let mut container = Term::blank(Group::CB, String::new());
    insert_mul(&mut container, a, settings);
    insert_mul(&mut container, b, settings);
    finalize_product(container, settings)
}

/// Divide: `a * b⁻¹`. Dividing by a zero term is an error.
pub fn divide(a: &Term, b: &Term, settings: &Settings) -> Result<Term, AlgebraError> {
    Ok(multiply(a, &invert(b, settings)?, settings))
}

/// Invert a term: negate the power of every multiplicative factor and
/// invert the multiplier.
pub fn invert(t: &Term, settings: &Settings) -> Result<Term, AlgebraError> {
    if t.is_zero() {
        return Err(AlgebraError::DivisionByZero);
    }
    let mut out = t.clone();
    out.multiplier = out.multiplier.invert()?;
    match out.group() {
        Group::N => {}
        Group::CB => {
            let children = std::mem::take(&mut out.children);
            for (key, child) in children {
                let mut c = child;
                flip_power(&mut c, settings);
                out.children.insert(key, c);
            }
            out.update_hash();
        }
        _ => flip_power(&mut out, settings),
    }
    Ok(out)
}

fn flip_power(t: &mut Term, settings: &Settings) {
    match &t.power {
        Power::Rat(r) => t.power = Power::Rat(-r),
        Power::Term(p) => {
            let negated = multiply(&Term::int(-1), p, settings);
            t.power = Power::Term(Box::new(negated));
        }
    }
}

/// Push a lazily held CP/PL head multiplier into the children.
pub fn distribute_multiplier(t: &Term) -> Term {
    if !matches!(t.group(), Group::CP | Group::PL)
        || t.multiplier().is_one()
        || !t.power().is_one()
    {
        return t.clone();
    }
    let mut out = t.clone();
    let head = std::mem::replace(&mut out.multiplier, Frac::one());
    for child in out.children.values_mut() {
        child.multiplier = &child.multiplier * &head;
    }
    out.update_hash();
    out
}

fn combinable(a: &Term, b: &Term) -> bool {
    if a.group() == Group::N || b.group() == Group::N {
        return false;
    }
    // Flat products merge through the container path instead.
    if (a.group() == Group::CB && a.power().is_one())
        || (b.group() == Group::CB && b.power().is_one())
    {
        return false;
    }
    a.base_hash() == b.base_hash()
}

pub(crate) fn combine_powers(a: &Term, b: &Term, settings: &Settings) -> Term {
    let mult = a.multiplier() * b.multiplier();
    // Prefer a non-EX template so demotion restores the right shape.
    let mut out = if a.group() == Group::EX && b.group() != Group::EX {
        b.clone()
    } else {
        a.clone()
    };
    out.multiplier = mult;
    let sum = add_powers(a.power(), b.power(), settings);
    apply_power(out, sum, settings)
}

fn add_powers(a: &Power, b: &Power, settings: &Settings) -> Power {
    match (a, b) {
        (Power::Rat(x), Power::Rat(y)) => Power::Rat(x + y),
        _ => {
            let at = power_term(a);
            let bt = power_term(b);
            let sum = add(&at, &bt, settings);
            if sum.is_constant() {
                Power::Rat(sum.multiplier().clone())
            } else {
                Power::Term(Box::new(sum))
            }
        }
    }
}

pub(crate) fn power_term(p: &Power) -> Term {
    match p {
        Power::Rat(r) => Term::number(r.clone()),
        Power::Term(t) => (**t).clone(),
    }
}

/// Install a combined power on a term, demoting or promoting EX as needed,
/// then renormalize the atom.
pub(crate) fn apply_power(mut out: Term, p: Power, settings: &Settings) -> Term {
    match p {
        Power::Rat(r) => {
            if r.is_zero() {
                return Term::number(out.multiplier.clone());
            }
            if out.group() == Group::EX {
                let restored = out.previous_group.take().unwrap_or(Group::S);
                out.group = restored;
                if restored == Group::N {
                    // The base of a numeric EX lives in its value hash.
                    let base = frac_from_hash(out.value());
                    let raised = pow::numeric_pow(&base, &r)
                        .unwrap_or_else(|_| Term::number(base.clone()));
                    return multiply(&Term::number(out.multiplier.clone()), &raised, settings);
                }
            }
            out.power = Power::Rat(r);
            normalize_atom(out, settings)
        }
        Power::Term(t) => {
            if t.is_constant() {
                let r = t.multiplier().clone();
                return apply_power(out, Power::Rat(r), settings);
            }
            if out.group() != Group::EX {
                out.previous_group = Some(out.group());
                out.group = Group::EX;
            }
            out.power = Power::Term(t);
            out
        }
    }
}

/// Renormalize an atom after a power change: P folds on integer powers and
/// the imaginary unit cycles with period four.
pub(crate) fn normalize_atom(t: Term, settings: &Settings) -> Term {
    let mut t = t;
    match t.group() {
        Group::P => {
            if let Some(r) = t.power.as_rat()
                && r.is_integer()
                && let Some(exp) = r.to_integer()
            {
                let base = frac_from_hash(t.value());
                return Term::number(&t.multiplier * &base.pow(exp));
            }
        }
        Group::S if t.imaginary => {
            if let Some(r) = t.power.as_rat()
                && r.is_integer()
                && let Some(exp) = r.to_integer()
            {
                return fold_imaginary(exp, t.multiplier.clone(), t.value());
            }
        }
        Group::CB => {
            // A product that regained unit power may hold foldable children.
            if t.power.is_one() {
                let mut rebuilt = Term::blank(Group::CB, String::new());
                rebuilt.multiplier = t.multiplier.clone();
                for child in t.children.values() {
                    insert_mul(&mut rebuilt, child, settings);
                }
                return finalize_product(rebuilt, settings);
            }
        }
        _ => {}
    }
    t
}

/// `i^exp` as a term with the given multiplier: the cycle 1, i, -1, -i.
fn fold_imaginary(exp: i64, mult: Frac, name: &str) -> Term {
    let phase = exp.rem_euclid(4);
    let negative = phase == 2 || phase == 3;
    let keeps_i = phase == 1 || phase == 3;
    let m = if negative { -&mult } else { mult };
    if keeps_i {
        let mut t = Term::imaginary_unit(name);
        t.multiplier = m;
        t
    } else {
        Term::number(m)
    }
}

/// Parse a numeric identity hash (`"2"`, `"(1/2)"`) back into a rational.
pub(crate) fn frac_from_hash(hash: &str) -> Frac {
    let trimmed = hash.trim_start_matches('(').trim_end_matches(')');
    let mut parts = trimmed.splitn(2, '/');
    let num: num_bigint::BigInt = parts
        .next()
        .and_then(|s| s.parse().ok())
        .unwrap_or_default();
    match parts.next().and_then(|s| s.parse::<num_bigint::BigInt>().ok()) {
        Some(den) => Frac::new(num, den),
        None => Frac::from(num),
    }
}

pub(crate) fn insert_mul(container: &mut Term, factor: &Term, settings: &Settings) {
    if factor.group() == Group::N {
        container.multiplier = &container.multiplier * factor.multiplier();
        return;
    }
    // Flat products flatten into the container.
    if factor.group() == Group::CB && factor.power().is_one() {
        container.multiplier = &container.multiplier * factor.multiplier();
        for child in factor.children().values() {
            insert_mul(container, child, settings);
        }
        return;
    }
    let mut f = factor.clone();
    container.multiplier = &container.multiplier * &f.multiplier;
    f.multiplier = Frac::one();
    let key = f.key_for_group(Group::CB, settings);
    if let Some(existing) = container.children.remove(&key) {
        let combined = multiply(&existing, &f, settings);
        // Re-insert: folds numerics into the head, re-keys demoted shapes.
        insert_mul(container, &combined, settings);
    } else {
        container.children.insert(key, f);
    }
}

/// Demote degenerate products: zero children → the head multiplier as a
/// numeric, one child at unit head power → that child scaled by the head.
pub(crate) fn finalize_product(mut t: Term, _settings: &Settings) -> Term {
    if t.group() != Group::CB {
        return t;
    }
    if t.multiplier.is_zero() {
        return Term::zero();
    }
    if t.children.is_empty() {
        return Term::number(t.multiplier.clone());
    }
    if t.children.len() == 1 && t.power().is_one() {
        let head = t.multiplier.clone();
        let mut child = t
            .children
            .into_iter()
            .next()
            .map(|(_, c)| c)
            .unwrap_or_else(Term::one);
        child.multiplier = &child.multiplier * &head;
        return child;
    }
    t.update_hash();
    t
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn s() -> Settings {
        Settings::default()
    }

    fn x() -> Term {
        Term::variable("x")
    }

    fn y() -> Term {
        Term::variable("y")
    }

    #[test]
    fn add_folds_numerics() {
        let r = add(&Term::int(2), &Term::int(3), &s());
        assert_eq!(r, Term::int(5));
    }

    #[test]
    fn add_collapses_like_terms() {
        let r = add(&x(), &x(), &s());
        assert_eq!(r.text(), "2*x");
        let r = subtract(&multiply(&Term::int(3), &x(), &s()), &multiply(&Term::int(3), &x(), &s()), &s());
        assert!(r.is_zero());
    }

    #[test]
    fn add_builds_general_sums() {
        let r = add(&x(), &y(), &s());
        assert_eq!(r.group(), Group::CP);
        assert_eq!(r.text(), "x+y");
    }

    #[test]
    fn sum_is_commutative_at_canonical_level() {
        let z = Term::variable("z");
        let abc = add(&add(&x(), &y(), &s()), &z, &s());
        let cab = add(&add(&z, &x(), &s()), &y(), &s());
        assert_eq!(abc, cab);
    }

    #[test]
    fn zero_children_are_removed() {
        // x + y - y = x (single child demotes)
        let sum = add(&add(&x(), &y(), &s()), &negate(&y()), &s());
        assert_eq!(sum, x());
    }

    #[test]
    fn same_base_different_power_groups_into_power_list() {
        let mut x2 = x();
        x2.power = Power::Rat(Frac::from(2));
        let r = add(&x(), &x2, &s());
        assert_eq!(r.group(), Group::PL);
        assert_eq!(r.value(), "x");
        assert_eq!(r.len(), 2);
        assert_eq!(r.text(), "x+x^2");
    }

    #[test]
    fn multiply_folds_exponents_on_equal_bases() {
        let mut x2 = x();
        x2.power = Power::Rat(Frac::from(2));
        let mut x3 = x();
        x3.power = Power::Rat(Frac::from(3));
        let r = multiply(&x2, &x3, &s());
        assert_eq!(r.text(), "x^5");
    }

    #[test]
    fn multiply_extracts_child_multipliers() {
        let two_x = multiply(&Term::int(2), &x(), &s());
        let three_y = multiply(&Term::int(3), &y(), &s());
        let r = multiply(&two_x, &three_y, &s());
        assert_eq!(r.group(), Group::CB);
        assert_eq!(r.multiplier(), &Frac::from(6));
        for child in r.children().values() {
            assert!(child.multiplier().is_one());
        }
    }

    #[test]
    fn product_is_commutative_at_canonical_level() {
        let z = Term::variable("z");
        let abc = multiply(&multiply(&x(), &y(), &s()), &z, &s());
        let cab = multiply(&multiply(&z, &x(), &s()), &y(), &s());
        assert_eq!(abc, cab);
    }

    #[test]
    fn canceling_powers_demote_the_product() {
        let xinv = invert(&x(), &s()).unwrap();
        let r = multiply(&x(), &xinv, &s());
        assert!(r.is_one());
    }

    #[test]
    fn inverting_twice_is_identity() {
        let r = invert(&invert(&x(), &s()).unwrap(), &s()).unwrap();
        assert_eq!(r, x());
    }

    #[test]
    fn divide_by_zero_is_an_error() {
        assert_eq!(
            divide(&x(), &Term::zero(), &s()),
            Err(AlgebraError::DivisionByZero)
        );
    }

    #[test]
    fn imaginary_unit_squares_to_minus_one() {
        let i = Term::imaginary_unit("i");
        let r = multiply(&i, &i, &s());
        assert_eq!(r, Term::int(-1));
        let r3 = multiply(&r, &i, &s());
        assert_eq!(r3.text(), "-i");
    }

    #[test]
    fn distribute_multiplier_pushes_head_into_children() {
        let sum = add(&x(), &y(), &s());
        let scaled = multiply(&Term::int(2), &sum, &s());
        assert_eq!(scaled.multiplier(), &Frac::from(2));
        let dist = distribute_multiplier(&scaled);
        assert!(dist.multiplier().is_one());
        for child in dist.children().values() {
            assert_eq!(child.multiplier(), &Frac::from(2));
        }
    }

    #[test]
    fn scalar_multiplication_holds_the_head_multiplier() {
        // 2*(x+y) keeps its multiplier lazily at the head.
        let scaled = multiply(&Term::int(2), &add(&x(), &y(), &s()), &s());
        assert_eq!(scaled.group(), Group::CP);
        assert_eq!(scaled.multiplier(), &Frac::from(2));
        for child in scaled.children().values() {
            assert!(child.multiplier().is_one());
        }
        // Two like sums merge coefficients without distribution.
        let doubled = add(&scaled, &scaled, &s());
        assert_eq!(doubled.multiplier(), &Frac::from(4));
    }

    #[test]
    fn incoming_sums_distribute_on_insertion() {
        // 2*(x+y) + z merges child-wise: 2x + 2y + z.
        let scaled = multiply(&Term::int(2), &add(&x(), &y(), &s()), &s());
        let z = Term::variable("z");
        let r = add(&scaled, &z, &s());
        assert_eq!(r.group(), Group::CP);
        assert_eq!(r.len(), 3);
        // And a scaled sum cancels against its distributed form.
        let spread = distribute_multiplier(&scaled);
        assert!(subtract(&scaled, &spread, &s()).is_zero());
    }

    #[test]
    fn subtraction_of_sums_cancels() {
        let sum = add(&x(), &y(), &s());
        let r = subtract(&sum, &sum, &s());
        assert!(r.is_zero());
    }
}
