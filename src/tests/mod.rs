//! Crate-level test suites.

mod fuzz;
mod properties;
