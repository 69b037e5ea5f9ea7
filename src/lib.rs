#![forbid(unsafe_code)]
//! Symbolic Algebra Kernel
//!
//! A canonical-form symbolic algebra core: an exact-rational term type, a
//! hand-written infix tokenizer, and a normalizing arithmetic kernel.
//!
//! # Features
//! - Canonical, hashable terms with exact-rational multipliers
//! - Implicit multiplication, unary operators, and function application
//!   (including `sin x + 1` space-scope syntax)
//! - A pure arithmetic kernel (`add`, `multiply`, `pow`, ...) that keeps
//!   every result in canonical form
//! - An injected [`Context`] carrying settings, operators, functions, and
//!   preprocessor hooks
//!
//! # Usage Examples
//!
//! ## Parsing and canonical forms
//! ```
//! use symbra::parse;
//! let t = parse("2x + 3x").unwrap();
//! assert_eq!(t.text(), "5*x");
//! assert_eq!(parse("a+b+c").unwrap(), parse("c+a+b").unwrap());
//! ```
//!
//! ## Kernel arithmetic
//! ```
//! use symbra::{multiply, parse};
//! let a = parse("x^2").unwrap();
//! let b = parse("x^3").unwrap();
//! assert_eq!(multiply(&a, &b).text(), "x^5");
//! ```
//!
//! ## Substitution
//! ```
//! use symbra::{parse, Context, Substitutions};
//! let mut subs = Substitutions::new();
//! subs.insert("x".to_string(), "2".into());
//! let ctx = Context::new();
//! let t = ctx.parse_with("x+1", &subs).unwrap();
//! assert_eq!(t, parse("3").unwrap());
//! ```

mod context;
mod core;
mod functions;
mod kernel;
mod parser;

#[cfg(test)]
mod tests;

// Re-export key types from core
pub use crate::core::{AlgebraError, Frac, Group, Power, Settings, Span, Term};

// Re-export the context and its collaborators
pub use context::Context;
pub use functions::{FunctionDefinition, FunctionProvider};
pub use parser::{
    Bracket, Brackets, OperatorDescriptor, OperatorDictionary, PreprocessorFn, Preprocessors,
    Substitution, Substitutions, Token, TokenKind,
};

/// Parse an expression with a default context.
///
/// # Example
/// ```
/// use symbra::parse;
/// assert_eq!(parse("sqrt(4)").unwrap(), parse("2").unwrap());
/// ```
pub fn parse(input: &str) -> Result<Term, AlgebraError> {
    Context::new().parse(input)
}

/// Parse with substitutions applied, using a default context.
pub fn parse_with(input: &str, subs: &Substitutions) -> Result<Term, AlgebraError> {
    Context::new().parse_with(input, subs)
}

/// Fold every constant subtree of a term to a decimal rational, using a
/// default context.
pub fn evaluate(term: &Term) -> Result<Term, AlgebraError> {
    Context::new().evaluate(term)
}

/// Add two terms canonically.
pub fn add(a: &Term, b: &Term) -> Term {
    kernel::add(a, b, &Settings::default())
}

/// Subtract `b` from `a` canonically.
pub fn subtract(a: &Term, b: &Term) -> Term {
    kernel::subtract(a, b, &Settings::default())
}

/// Multiply two terms canonically.
pub fn multiply(a: &Term, b: &Term) -> Term {
    kernel::multiply(a, b, &Settings::default())
}

/// Divide `a` by `b`; dividing by a zero term is an error.
pub fn divide(a: &Term, b: &Term) -> Result<Term, AlgebraError> {
    kernel::divide(a, b, &Settings::default())
}

/// Raise `base` to `exp` canonically.
pub fn pow(base: &Term, exp: &Term) -> Result<Term, AlgebraError> {
    kernel::pow(base, exp, &Settings::default())
}

/// The square root of a term, as `t^(1/2)` with perfect squares folded.
pub fn sqrt(t: &Term) -> Result<Term, AlgebraError> {
    kernel::sqrt(t, &Settings::default())
}

/// Negate a term.
pub fn negate(t: &Term) -> Term {
    kernel::negate(t)
}

/// Invert a term; inverting a zero term is an error.
pub fn invert(t: &Term) -> Result<Term, AlgebraError> {
    kernel::invert(t, &Settings::default())
}

/// Distribute products over sums and open integer powers of composites.
pub fn expand(t: &Term) -> Term {
    kernel::expand(t, &Settings::default())
}
