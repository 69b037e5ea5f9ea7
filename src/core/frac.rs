//! Exact rational numbers backed by arbitrary-precision integers
//!
//! `Frac` is the coefficient type carried by every term. The sign lives on
//! the numerator, the denominator stays positive, and every arithmetic
//! operation leaves the fraction in lowest terms. A distinguished infinity
//! (`1/0`) is representable but never reduced.

use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};

use num_bigint::BigInt;
use num_integer::{Integer, Roots};
use num_traits::{One, Signed, ToPrimitive, Zero};

use crate::core::error::AlgebraError;

/// An exact rational number with arbitrary-precision numerator and denominator.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Frac {
    /// Signed numerator
    num: BigInt,
    /// Non-negative denominator; zero only for the distinguished infinity
    den: BigInt,
}

impl Frac {
    /// Construct from a numerator/denominator pair, reducing to lowest terms.
    /// A zero denominator yields the distinguished infinity with the
    /// numerator's sign.
    pub fn new(num: impl Into<BigInt>, den: impl Into<BigInt>) -> Self {
        let num = num.into();
        let mut den = den.into();
        if den.is_zero() {
            let sign = if num.is_negative() { -1 } else { 1 };
            return Frac {
                num: BigInt::from(sign),
                den,
            };
        }
        let mut num = num;
        if den.is_negative() {
            num = -num;
            den = -den;
        }
        let g = num.gcd(&den);
        if !g.is_one() {
            num /= &g;
            den /= &g;
        }
        Frac { num, den }
    }

    /// The rational zero
    pub fn zero() -> Self {
        Frac {
            num: BigInt::zero(),
            den: BigInt::one(),
        }
    }

    /// The rational one
    pub fn one() -> Self {
        Frac {
            num: BigInt::one(),
            den: BigInt::one(),
        }
    }

    /// The distinguished infinity (`1/0`, never reduced)
    pub fn infinity() -> Self {
        Frac {
            num: BigInt::one(),
            den: BigInt::zero(),
        }
    }

    /// Parse a decimal literal: `"42"`, `"1.25"`, `"-0.5"`, `".5"`, `"5."`
    pub fn from_decimal(literal: &str) -> Result<Self, AlgebraError> {
        let s = literal.trim();
        if s.is_empty() {
            return Err(AlgebraError::invalid_number(literal));
        }
        let (sign, digits) = match s.strip_prefix('-') {
            Some(rest) => (-1, rest),
            None => (1, s.strip_prefix('+').unwrap_or(s)),
        };
        let mut parts = digits.splitn(2, '.');
        let int_part = parts.next().unwrap_or("");
        let frac_part = parts.next().unwrap_or("");
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(AlgebraError::invalid_number(literal));
        }
        if !int_part.chars().all(|c| c.is_ascii_digit())
            || !frac_part.chars().all(|c| c.is_ascii_digit())
        {
            return Err(AlgebraError::invalid_number(literal));
        }
        let joined = format!("{int_part}{frac_part}");
        let num: BigInt = joined
            .parse()
            .map_err(|_| AlgebraError::invalid_number(literal))?;
        let den = BigInt::from(10u32).pow(frac_part.len() as u32);
        Ok(Frac::new(num * sign, den))
    }

    /// Convert a finite float to an exact rational via its decimal rendering
    /// at the given precision. Returns `None` for NaN or infinities.
    pub fn from_f64_prec(value: f64, precision: u32) -> Option<Self> {
        if !value.is_finite() {
            return None;
        }
        let rendered = format!("{:.*}", precision as usize, value);
        Frac::from_decimal(&rendered).ok()
    }

    /// Numerator (sign carrier)
    #[inline]
    pub fn numer(&self) -> &BigInt {
        &self.num
    }

    /// Denominator (non-negative)
    #[inline]
    pub fn denom(&self) -> &BigInt {
        &self.den
    }

    /// True if the denominator is 1
    #[inline]
    pub fn is_integer(&self) -> bool {
        self.den.is_one()
    }

    /// True for the distinguished infinity
    #[inline]
    pub fn is_infinite(&self) -> bool {
        self.den.is_zero()
    }

    /// True if the value is exactly zero
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.num.is_zero() && !self.den.is_zero()
    }

    /// True if the value is exactly one
    #[inline]
    pub fn is_one(&self) -> bool {
        self.num.is_one() && self.den.is_one()
    }

    /// True if the value is negative
    #[inline]
    pub fn is_negative(&self) -> bool {
        self.num.is_negative()
    }

    /// Sign as -1, 0, or 1
    pub fn signum(&self) -> i8 {
        match self.num.sign() {
            num_bigint::Sign::Minus => -1,
            num_bigint::Sign::NoSign => 0,
            num_bigint::Sign::Plus => 1,
        }
    }

    /// Absolute value
    pub fn abs(&self) -> Self {
        Frac {
            num: self.num.abs(),
            den: self.den.clone(),
        }
    }

    /// Multiplicative inverse; zero yields `DivisionByZero`
    pub fn invert(&self) -> Result<Self, AlgebraError> {
        if self.is_zero() {
            return Err(AlgebraError::DivisionByZero);
        }
        Ok(Frac::new(self.den.clone(), self.num.clone()))
    }

    /// Raise to an integer power. A negative exponent on zero yields the
    /// distinguished infinity; callers guard division explicitly.
    pub fn pow(&self, exp: i64) -> Self {
        if exp == 0 {
            return Frac::one();
        }
        let e = exp.unsigned_abs() as u32;
        let raised = Frac {
            num: self.num.pow(e),
            den: self.den.pow(e),
        };
        if exp < 0 {
            Frac::new(raised.den, raised.num)
        } else {
            raised
        }
    }

    /// The value as an `i64` exponent, when it is a small integer
    pub fn to_integer(&self) -> Option<i64> {
        if self.is_integer() {
            self.num.to_i64()
        } else {
            None
        }
    }

    /// The value as a `BigInt`, when integral
    pub fn to_bigint(&self) -> Option<BigInt> {
        if self.is_integer() {
            Some(self.num.clone())
        } else {
            None
        }
    }

    /// Exact k-th root if this rational is a perfect k-th power
    pub fn nth_root_exact(&self, k: u32) -> Option<Self> {
        if self.is_negative() || self.is_infinite() || k == 0 {
            return None;
        }
        let rn = self.num.nth_root(k);
        let rd = self.den.nth_root(k);
        if rn.clone().pow(k) == self.num && rd.clone().pow(k) == self.den {
            Some(Frac { num: rn, den: rd })
        } else {
            None
        }
    }

    /// Decimal string with at most `precision` fractional digits
    /// (truncated, trailing zeros trimmed).
    pub fn to_decimal(&self, precision: u32) -> String {
        if self.is_infinite() {
            return if self.is_negative() {
                "-Infinity".into()
            } else {
                "Infinity".into()
            };
        }
        if self.is_integer() {
            return self.num.to_string();
        }
        let negative = self.is_negative();
        let num = self.num.abs();
        let (int_part, rem) = num.div_rem(&self.den);
        let scale = BigInt::from(10u32).pow(precision);
        let frac_digits = (rem * &scale) / &self.den;
        let mut frac_str = format!("{:0>width$}", frac_digits, width = precision as usize);
        while frac_str.ends_with('0') {
            frac_str.pop();
        }
        let sign = if negative { "-" } else { "" };
        if frac_str.is_empty() {
            format!("{sign}{int_part}")
        } else {
            format!("{sign}{int_part}.{frac_str}")
        }
    }
}

impl Default for Frac {
    fn default() -> Self {
        Frac::zero()
    }
}

impl From<i64> for Frac {
    fn from(v: i64) -> Self {
        Frac {
            num: BigInt::from(v),
            den: BigInt::one(),
        }
    }
}

impl From<BigInt> for Frac {
    fn from(v: BigInt) -> Self {
        Frac {
            num: v,
            den: BigInt::one(),
        }
    }
}

impl PartialOrd for Frac {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Frac {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.is_infinite(), other.is_infinite()) {
            (true, true) => self.num.cmp(&other.num),
            (true, false) => {
                if self.is_negative() {
                    Ordering::Less
                } else {
                    Ordering::Greater
                }
            }
            (false, true) => {
                if other.is_negative() {
                    Ordering::Greater
                } else {
                    Ordering::Less
                }
            }
            // Denominators are non-negative, so cross-multiplication
            // preserves order.
            (false, false) => (&self.num * &other.den).cmp(&(&other.num * &self.den)),
        }
    }
}

impl fmt::Display for Frac {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_infinite() {
            return if self.is_negative() {
                write!(f, "-Infinity")
            } else {
                write!(f, "Infinity")
            };
        }
        if self.is_integer() {
            write!(f, "{}", self.num)
        } else {
            write!(f, "{}/{}", self.num, self.den)
        }
    }
}

// Infinity absorbs in addition and multiplication; everything else reduces.

impl Add for &Frac {
    type Output = Frac;
    fn add(self, rhs: &Frac) -> Frac {
        if self.is_infinite() {
            return self.clone();
        }
        if rhs.is_infinite() {
            return rhs.clone();
        }
        Frac::new(
            &self.num * &rhs.den + &rhs.num * &self.den,
            &self.den * &rhs.den,
        )
    }
}

impl Sub for &Frac {
    type Output = Frac;
    fn sub(self, rhs: &Frac) -> Frac {
        self + &(-rhs)
    }
}

impl Mul for &Frac {
    type Output = Frac;
    fn mul(self, rhs: &Frac) -> Frac {
        if self.is_infinite() || rhs.is_infinite() {
            let sign = i64::from(self.signum() * rhs.signum());
            let mut inf = Frac::infinity();
            inf.num = BigInt::from(if sign < 0 { -1 } else { 1 });
            return inf;
        }
        Frac::new(&self.num * &rhs.num, &self.den * &rhs.den)
    }
}

impl Div for &Frac {
    type Output = Frac;
    fn div(self, rhs: &Frac) -> Frac {
        // Callers guard zero divisors; dividing by zero here yields the
        // distinguished infinity.
        Frac::new(&self.num * &rhs.den, &self.den * &rhs.num)
    }
}

impl Neg for &Frac {
    type Output = Frac;
    fn neg(self) -> Frac {
        Frac {
            num: -&self.num,
            den: self.den.clone(),
        }
    }
}

macro_rules! impl_owned_ops {
    ($($trait:ident :: $method:ident),*) => {
        $(
            impl $trait for Frac {
                type Output = Frac;
                fn $method(self, rhs: Frac) -> Frac {
                    $trait::$method(&self, &rhs)
                }
            }
        )*
    };
}

impl_owned_ops!(Add::add, Sub::sub, Mul::mul, Div::div);

impl Neg for Frac {
    type Output = Frac;
    fn neg(self) -> Frac {
        -&self
    }
}
