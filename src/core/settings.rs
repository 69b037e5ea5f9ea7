//! Tunable settings consumed by the tokenizer, the kernel, and decimal emission.
//!
//! Settings travel inside a [`Context`](crate::Context) rather than living in
//! process-wide statics; callers that need a temporary override clone the
//! context, mutate, and drop the clone.

/// Default sentinel value stored on pure-numeric terms.
pub const DEFAULT_CONST_HASH: &str = "#";

/// Default pattern for inserting `*` between a numeric coefficient and the
/// identifier or bracket that follows it (`2x`, `3(`). The word boundary
/// keeps digits inside identifiers (`x2y`) untouched.
pub const DEFAULT_IMPLIED_MULTIPLICATION_PATTERN: &str = r"\b(\d+(?:\.\d+)?)([A-Za-z_(])";

/// Recognized knobs for parsing and canonical emission.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Sentinel value used when keying numeric terms into sum child maps.
    pub const_hash: String,
    /// Atom name for the imaginary unit.
    pub imaginary_unit: String,
    /// Reserved function name for the square-root unwrap optimization.
    pub sqrt_name: String,
    /// Reserved function name for the transparent-parentheses wrapper.
    pub parenthesis_name: String,
    /// Glyph used in canonical hashes for exponentiation.
    pub power_operator: String,
    /// When false, unknown alphanumeric runs split into single-letter products.
    pub use_multicharacter_vars: bool,
    /// Pattern used to insert `*` between coefficient-identifier pairs.
    pub implied_multiplication_pattern: String,
    /// Decimal precision for `to_decimal`.
    pub precision: u32,
    /// Largest non-negative integer exponent expanded by repeated
    /// multiplication when raising a composite base.
    pub expansion_cap: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            const_hash: DEFAULT_CONST_HASH.into(),
            imaginary_unit: "i".into(),
            sqrt_name: "sqrt".into(),
            parenthesis_name: "parens".into(),
            power_operator: "^".into(),
            use_multicharacter_vars: true,
            implied_multiplication_pattern: DEFAULT_IMPLIED_MULTIPLICATION_PATTERN.into(),
            precision: 21,
            expansion_cap: 50,
        }
    }
}
