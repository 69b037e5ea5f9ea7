//! Operator overloading for `Term`.
//!
//! `Add`, `Sub`, `Mul`, and `Neg` route through the kernel with default
//! settings. Division and exponentiation are fallible (division by zero),
//! so they stay as explicit kernel calls rather than operator impls.

use std::ops::{Add, Mul, Neg, Sub};

use crate::core::settings::Settings;
use crate::core::term::Term;
use crate::kernel;

macro_rules! impl_term_ops {
    ($lhs:ty, $rhs:ty) => {
        impl Add<$rhs> for $lhs {
            type Output = Term;
            fn add(self, rhs: $rhs) -> Term {
                kernel::add(&self, &rhs, &Settings::default())
            }
        }
        impl Sub<$rhs> for $lhs {
            type Output = Term;
            fn sub(self, rhs: $rhs) -> Term {
                kernel::subtract(&self, &rhs, &Settings::default())
            }
        }
        impl Mul<$rhs> for $lhs {
            type Output = Term;
            fn mul(self, rhs: $rhs) -> Term {
                kernel::multiply(&self, &rhs, &Settings::default())
            }
        }
    };
}

impl_term_ops!(Term, Term);

impl Add<&Term> for &Term {
    type Output = Term;
    fn add(self, rhs: &Term) -> Term {
        kernel::add(self, rhs, &Settings::default())
    }
}

impl Sub<&Term> for &Term {
    type Output = Term;
    fn sub(self, rhs: &Term) -> Term {
        kernel::subtract(self, rhs, &Settings::default())
    }
}

impl Mul<&Term> for &Term {
    type Output = Term;
    fn mul(self, rhs: &Term) -> Term {
        kernel::multiply(self, rhs, &Settings::default())
    }
}

impl Neg for Term {
    type Output = Term;
    fn neg(self) -> Term {
        kernel::negate(&self)
    }
}

impl Neg for &Term {
    type Output = Term;
    fn neg(self) -> Term {
        kernel::negate(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operators_route_through_kernel() {
        let x = Term::variable("x");
        let sum = &x + &x;
        assert_eq!(sum.text(), "2*x");
        let neg = -&x;
        assert_eq!(neg.text(), "-x");
        let diff = x.clone() - x.clone();
        assert!(diff.is_zero());
    }
}
