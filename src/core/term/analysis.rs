//! Term observers: predicates, variable enumeration, numeric comparison,
//! and numerator/denominator extraction.

use std::collections::BTreeSet;

use num_bigint::BigInt;

use crate::core::error::AlgebraError;
use crate::core::frac::Frac;
use crate::core::settings::Settings;
use crate::core::term::{Group, NAMED_CONSTANTS, Power, Term};

impl Term {
    /// True for the numeric term 1.
    pub fn is_one(&self) -> bool {
        self.group == Group::N && self.multiplier.is_one()
    }

    /// True for the numeric terms 1 and -1.
    pub fn is_abs_one(&self) -> bool {
        self.group == Group::N && self.multiplier.abs().is_one()
    }

    /// True for the numeric term 0.
    pub fn is_zero(&self) -> bool {
        self.group == Group::N && self.multiplier.is_zero()
    }

    /// True when the term is a pure numeric constant (group N).
    pub fn is_constant(&self) -> bool {
        self.group == Group::N
    }

    /// True when the term evaluates to a constant: numerics, radicals,
    /// named constants, the imaginary unit, and any combination or
    /// function application built solely from them.
    pub fn is_constant_deep(&self) -> bool {
        match self.group {
            Group::N | Group::P => true,
            Group::S => self.imaginary || NAMED_CONSTANTS.contains(&self.value.as_str()),
            Group::FN => self.args.iter().all(Term::is_constant_deep),
            Group::PL | Group::CP | Group::CB => {
                self.children.values().all(Term::is_constant_deep)
            }
            Group::EX => {
                let base_const = match self.previous_group {
                    Some(Group::S) => {
                        self.imaginary || NAMED_CONSTANTS.contains(&self.value.as_str())
                    }
                    Some(Group::N | Group::P) => true,
                    Some(Group::FN) => self.args.iter().all(Term::is_constant_deep),
                    _ => {
                        !self.children.is_empty()
                            && self.children.values().all(Term::is_constant_deep)
                    }
                };
                base_const
                    && self
                        .power
                        .as_term()
                        .is_some_and(Term::is_constant_deep)
            }
        }
    }

    /// True for an integer-valued numeric term.
    pub fn is_integer(&self) -> bool {
        self.group == Group::N && self.multiplier.is_integer()
    }

    /// True when the term is or contains the imaginary unit.
    pub fn is_imaginary(&self) -> bool {
        if self.imaginary {
            return true;
        }
        self.args.iter().any(Term::is_imaginary)
            || self.children.values().any(Term::is_imaginary)
            || self.power.as_term().is_some_and(|p| p.is_imaginary())
    }

    /// True for the distinguished infinity.
    pub fn is_infinite(&self) -> bool {
        self.infinite || self.multiplier.is_infinite()
    }

    /// True for unit-of-measure atoms.
    pub fn is_unit(&self) -> bool {
        self.unit
    }

    /// Sign of the multiplier as -1, 0, or 1.
    pub fn sign(&self) -> i8 {
        self.multiplier.signum()
    }

    /// Numeric less-than. Comparing non-numeric terms is a type error.
    pub fn lt(&self, other: &Term) -> Result<bool, AlgebraError> {
        match (self.group, other.group) {
            (Group::N, Group::N) => Ok(self.multiplier < other.multiplier),
            _ => Err(AlgebraError::type_error(
                "cannot numerically compare non-numeric terms",
            )),
        }
    }

    /// Numeric greater-than. Comparing non-numeric terms is a type error.
    pub fn gt(&self, other: &Term) -> Result<bool, AlgebraError> {
        match (self.group, other.group) {
            (Group::N, Group::N) => Ok(self.multiplier > other.multiplier),
            _ => Err(AlgebraError::type_error(
                "cannot numerically compare non-numeric terms",
            )),
        }
    }

    /// True when the named atom occurs anywhere in the term.
    pub fn contains(&self, name: &str) -> bool {
        let here = match self.group {
            Group::S => self.value == name,
            Group::EX => self.previous_group == Some(Group::S) && self.value == name,
            _ => false,
        };
        here
            || self.args.iter().any(|a| a.contains(name))
            || self.children.values().any(|c| c.contains(name))
            || self.power.as_term().is_some_and(|p| p.contains(name))
    }

    fn collect_variables(&self, out: &mut BTreeSet<String>) {
        match self.group {
            Group::S => {
                if !self.imaginary
                    && !self.unit
                    && !NAMED_CONSTANTS.contains(&self.value.as_str())
                {
                    out.insert(self.value.clone());
                }
            }
            Group::EX => {
                if self.previous_group == Some(Group::S)
                    && !NAMED_CONSTANTS.contains(&self.value.as_str())
                {
                    out.insert(self.value.clone());
                }
            }
            _ => {}
        }
        for arg in &self.args {
            arg.collect_variables(out);
        }
        for child in self.children.values() {
            child.collect_variables(out);
        }
        if let Some(p) = self.power.as_term() {
            p.collect_variables(out);
        }
    }

    /// All variable names in the term, alphabetically sorted.
    pub fn variables(&self) -> Vec<String> {
        let mut set = BTreeSet::new();
        self.collect_variables(&mut set);
        set.into_iter().collect()
    }

    /// True when the term is a polynomial: atoms raised to non-negative
    /// integer powers combined by sums and products.
    pub fn is_poly(&self) -> bool {
        fn integer_power(p: &Power) -> bool {
            p.as_rat()
                .is_some_and(|r| r.is_integer() && !r.is_negative())
        }
        match self.group {
            Group::N => true,
            Group::S => integer_power(&self.power),
            Group::PL | Group::CP | Group::CB => {
                integer_power(&self.power) && self.children.values().all(Term::is_poly)
            }
            Group::P | Group::EX | Group::FN => false,
        }
    }

    /// True when the term is a polynomial of degree at most one.
    pub fn is_linear(&self) -> bool {
        match self.group {
            Group::N => true,
            Group::S => self.power.is_one(),
            Group::PL | Group::CP => {
                self.power.is_one() && self.children.values().all(Term::is_linear)
            }
            Group::P | Group::EX | Group::FN | Group::CB => false,
        }
    }

    /// The numerator part: factors with non-negative powers and the
    /// multiplier's numerator.
    pub fn num(&self) -> Term {
        let settings = Settings::default();
        let mult_num = Term::number(Frac::from(self.multiplier.numer().clone()));
        match self.group {
            Group::N => mult_num,
            Group::CB => {
                let mut out = mult_num;
                for child in self.children.values() {
                    if !child_power_negative(child) {
                        out = crate::kernel::multiply(&out, child, &settings);
                    }
                }
                out
            }
            _ if child_power_negative(self) => mult_num,
            _ => {
                let mut c = self.clone();
                c.multiplier = Frac::from(self.multiplier.numer().clone());
                c
            }
        }
    }

    /// The denominator part: factors with negative powers, inverted, and
    /// the multiplier's denominator.
    pub fn denom(&self) -> Term {
        let settings = Settings::default();
        let mult_den = Term::number(Frac::from(self.multiplier.denom().clone()));
        match self.group {
            Group::N => mult_den,
            Group::CB => {
                let mut out = mult_den;
                for child in self.children.values() {
                    if child_power_negative(child) {
                        out = crate::kernel::multiply(&out, &flip_power(child), &settings);
                    }
                }
                out
            }
            _ if child_power_negative(self) => {
                let mut flipped = flip_power(self);
                flipped.multiplier = Frac::from(self.multiplier.denom().clone());
                flipped
            }
            _ => mult_den,
        }
    }

    /// Decimal rendering of a numeric term at the given precision.
    pub fn to_decimal(&self, precision: u32) -> Result<String, AlgebraError> {
        if self.group == Group::N {
            Ok(self.multiplier.to_decimal(precision))
        } else {
            Err(AlgebraError::type_error(
                "to_decimal requires a numeric term",
            ))
        }
    }

    /// The multiplier's numerator as a big integer (numeric terms).
    pub fn numer_int(&self) -> Option<BigInt> {
        (self.group == Group::N).then(|| self.multiplier.numer().clone())
    }
}

fn child_power_negative(t: &Term) -> bool {
    t.power.as_rat().is_some_and(Frac::is_negative)
}

fn flip_power(t: &Term) -> Term {
    let mut c = t.clone();
    if let Power::Rat(r) = &c.power {
        c.power = Power::Rat(-r);
    }
    c
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_variants_are_distinct() {
        assert!(Term::one().is_one());
        assert!(Term::one().is_abs_one());
        assert!(!Term::int(-1).is_one());
        assert!(Term::int(-1).is_abs_one());
        assert!(!Term::int(2).is_abs_one());
    }

    #[test]
    fn constant_variants_are_distinct() {
        assert!(Term::int(3).is_constant());
        assert!(!Term::variable("pi").is_constant());
        assert!(Term::variable("pi").is_constant_deep());
        assert!(!Term::variable("x").is_constant_deep());
        let f = Term::function("sin", vec![Term::int(1)]);
        assert!(!f.is_constant());
        assert!(f.is_constant_deep());
    }

    #[test]
    fn numeric_comparison_is_fallible() {
        assert_eq!(Term::int(2).lt(&Term::int(3)), Ok(true));
        assert_eq!(Term::int(5).gt(&Term::int(3)), Ok(true));
        assert!(Term::variable("x").lt(&Term::int(3)).is_err());
    }

    #[test]
    fn variables_are_alphabetical() {
        let f = Term::function(
            "f",
            vec![Term::variable("c"), Term::variable("a"), Term::variable("b")],
        );
        assert_eq!(f.variables(), vec!["a", "b", "c"]);
        assert!(Term::variable("pi").variables().is_empty());
    }

    #[test]
    fn linear_and_poly_predicates() {
        assert!(Term::variable("x").is_linear());
        assert!(Term::variable("x").is_poly());
        let mut x2 = Term::variable("x");
        x2.power = Power::Rat(Frac::from(2));
        assert!(x2.is_poly());
        assert!(!x2.is_linear());
        let mut xr = Term::variable("x");
        xr.power = Power::Rat(Frac::new(1, 2));
        assert!(!xr.is_poly());
    }

    #[test]
    fn num_denom_of_rational() {
        let t = Term::number(Frac::new(3, 4));
        assert_eq!(t.num(), Term::int(3));
        assert_eq!(t.denom(), Term::int(4));
    }
}
