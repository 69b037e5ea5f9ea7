//! Canonical text emission for terms.
//!
//! The canonical text is load-bearing: composite identity hashes are built
//! from it, child-map keys are substrings of it, and the parser can re-read
//! any emitted form back into an equal term. Children are emitted in child-map
//! key order, which fixes a deterministic output for structurally equal terms
//! regardless of construction order.
//!
//! Three projections exist per term:
//! - *bare text*: multiplier and head power excluded (the base hash)
//! - *content text*: multiplier excluded, power included
//! - *full text*: everything

use std::collections::BTreeMap;

use crate::core::frac::Frac;
use crate::core::term::{Group, Power, Term};

/// Join sum children (CP/PL) in key order, folding leading `+` on negated
/// terms into `-`.
pub(crate) fn join_sum(children: &BTreeMap<String, Term>) -> String {
    let mut out = String::new();
    for child in children.values() {
        let text = term_text(child);
        if out.is_empty() {
            out.push_str(&text);
        } else if let Some(stripped) = text.strip_prefix('-') {
            out.push('-');
            out.push_str(stripped);
        } else {
            out.push('+');
            out.push_str(&text);
        }
    }
    out
}

/// Join product children (CB) in key order. CB children are stored with
/// unit multipliers, so each child's content text is its full contribution.
pub(crate) fn join_product(children: &BTreeMap<String, Term>) -> String {
    let parts: Vec<String> = children.values().map(content_text).collect();
    parts.join("*")
}

/// Render a rational power suffix. Integer powers ≥ 0 emit bare; anything
/// else is parenthesized so the emission re-parses unambiguously.
fn power_suffix(power: &Power) -> String {
    match power {
        Power::Rat(r) => {
            if r.is_one() {
                String::new()
            } else if r.is_integer() && !r.is_negative() {
                format!("^{r}")
            } else {
                format!("^({r})")
            }
        }
        Power::Term(t) => format!("^({})", term_text(t)),
    }
}

/// The bare text of a term: multiplier and head power excluded.
pub(crate) fn bare_text(term: &Term) -> String {
    match term.group() {
        Group::N => crate::core::settings::DEFAULT_CONST_HASH.into(),
        // Atom and promoted-EX hashes live in `value`. A power-list keeps
        // its base name there, so its text derives from the children, as
        // do the other composites'.
        Group::S | Group::P | Group::EX | Group::FN => term.value().into(),
        Group::CP | Group::PL => format!("({})", join_sum(term.children())),
        Group::CB => join_product(term.children()),
    }
}

/// The content text of a term: multiplier excluded, power included.
pub(crate) fn content_text(term: &Term) -> String {
    match term.group() {
        Group::N => bare_text(term),
        // A product base needs parentheses before a power suffix so that
        // `(x*y)^(1/2)` does not re-parse as `x*y^(1/2)`; same for a
        // negative numeric base under a radical.
        Group::CB if !term.power().is_one() => {
            format!("({}){}", bare_text(term), power_suffix(term.power()))
        }
        Group::P if term.value().starts_with('-') => {
            format!("({}){}", bare_text(term), power_suffix(term.power()))
        }
        _ => format!("{}{}", bare_text(term), power_suffix(term.power())),
    }
}

fn multiplier_prefix(m: &Frac) -> String {
    if m.is_one() {
        String::new()
    } else if (-m).is_one() {
        "-".into()
    } else {
        format!("{m}*")
    }
}

/// The full canonical text of a term.
pub(crate) fn term_text(term: &Term) -> String {
    match term.group() {
        Group::N => term.multiplier().to_string(),
        // A bare sum at unit multiplier and power prints without the outer
        // parentheses; every nested occurrence goes through content_text,
        // whose CP/PL bare text carries them.
        Group::CP | Group::PL
            if term.multiplier().is_one() && term.power().is_one() =>
        {
            join_sum(term.children())
        }
        Group::CB if term.power().is_one() => {
            format!("{}{}", multiplier_prefix(term.multiplier()), bare_text(term))
        }
        Group::CB => format!(
            "{}({}){}",
            multiplier_prefix(term.multiplier()),
            bare_text(term),
            power_suffix(term.power())
        ),
        _ => format!(
            "{}{}",
            multiplier_prefix(term.multiplier()),
            content_text(term)
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::frac::Frac;
    use crate::core::term::Term;

    #[test]
    fn atoms_render_plainly() {
        assert_eq!(Term::variable("x").text(), "x");
        assert_eq!(Term::int(5).text(), "5");
        assert_eq!(Term::int(-3).text(), "-3");
        assert_eq!(Term::number(Frac::new(3, 4)).text(), "3/4");
    }

    #[test]
    fn powers_parenthesize_when_ambiguous() {
        let mut x = Term::variable("x");
        x.power = Power::Rat(Frac::from(2));
        assert_eq!(x.text(), "x^2");
        x.power = Power::Rat(Frac::new(1, 2));
        assert_eq!(x.text(), "x^(1/2)");
        x.power = Power::Rat(Frac::from(-1));
        assert_eq!(x.text(), "x^(-1)");
    }

    #[test]
    fn multiplier_prefixes() {
        let mut x = Term::variable("x");
        x.multiplier = Frac::from(5);
        assert_eq!(x.text(), "5*x");
        x.multiplier = Frac::from(-1);
        assert_eq!(x.text(), "-x");
        x.multiplier = Frac::new(-3, 4);
        assert_eq!(x.text(), "-3/4*x");
    }

    #[test]
    fn function_text_is_its_hash() {
        let f = Term::function("sin", vec![Term::variable("x")]);
        assert_eq!(f.text(), "sin(x)");
    }
}
