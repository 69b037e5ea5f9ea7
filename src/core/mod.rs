//! Core types for the symbolic algebra kernel
//!
//! This module contains the fundamental types:
//! - `Term` / `Group` / `Power` - the canonical symbolic term
//! - `Frac` - exact rationals with arbitrary-precision integers
//! - `Settings` - parsing and emission knobs
//! - `AlgebraError` / `Span` - error types
//! - Canonical text emission (term_text and the hash projections)

pub(crate) mod display; // Canonical text emission
pub(crate) mod error; // Error types (AlgebraError, Span)
pub(crate) mod frac; // Exact rationals
pub(crate) mod settings; // Settings record
pub(crate) mod term; // The Term type and its observers

// Public re-exports (for external API)
pub use error::{AlgebraError, Span};
pub use frac::Frac;
pub use settings::Settings;
pub use term::{Group, Power, Term};
