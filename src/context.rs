//! The injected context: settings, dictionaries, functions, units, and
//! preprocessor hooks.
//!
//! Everything the original design kept in process-wide state travels here
//! instead. A `Context` is cheap to build and clone, so "set, operate,
//! restore" becomes "clone, mutate the clone, drop it". No synchronization
//! is provided; share a context across threads behind your own lock.

use rustc_hash::FxHashMap;

use crate::core::error::AlgebraError;
use crate::core::settings::Settings;
use crate::core::term::Term;
use crate::functions::FunctionProvider;
use crate::parser::{
    Brackets, OperatorDictionary, PreprocessorFn, Preprocessors, Substitutions,
};

/// Parsing and evaluation context.
#[derive(Debug, Clone, Default)]
pub struct Context {
    /// Tunable settings (sentinels, precision, implied-multiplication
    /// pattern, ...).
    pub settings: Settings,
    /// Operator glyphs and their descriptors.
    pub operators: OperatorDictionary,
    /// Bracket pairs.
    pub brackets: Brackets,
    /// Callable functions.
    pub functions: FunctionProvider,
    /// Unit-of-measure atoms by name.
    pub units: FxHashMap<String, Term>,
    /// Ordered user rewrite hooks.
    pub preprocessors: Preprocessors,
    /// When set, every constant subtree folds to a decimal rational.
    pub parse_to_number: bool,
}

impl Context {
    /// A context with default settings, operators, brackets, and built-in
    /// functions.
    pub fn new() -> Self {
        Context::default()
    }

    /// Enable or disable number-folding mode.
    #[must_use]
    pub fn with_numeric_folding(mut self, on: bool) -> Self {
        self.parse_to_number = on;
        self
    }

    /// Parse an expression into a canonical term.
    pub fn parse(&self, input: &str) -> Result<Term, AlgebraError> {
        crate::parser::parse_with(self, input, None)
    }

    /// Parse with a substitution map applied to matched atoms.
    pub fn parse_with(
        &self,
        input: &str,
        subs: &Substitutions,
    ) -> Result<Term, AlgebraError> {
        crate::parser::parse_with(self, input, Some(subs))
    }

    /// Fold every constant subtree of a term to a decimal rational at the
    /// configured precision.
    pub fn evaluate(&self, term: &Term) -> Result<Term, AlgebraError> {
        crate::parser::evaluate(self, term)
    }

    /// Register a rewrite hook; see [`Preprocessors::add`].
    pub fn add_preprocessor(
        &mut self,
        name: &str,
        action: PreprocessorFn,
        order: Option<usize>,
    ) -> Result<(), AlgebraError> {
        self.preprocessors.add(name, action, order)
    }

    /// Remove a rewrite hook by name.
    pub fn remove_preprocessor(&mut self, name: &str) -> Result<(), AlgebraError> {
        self.preprocessors.remove(name)
    }

    /// Registered hook names, in execution order.
    pub fn preprocessor_names(&self) -> Vec<&str> {
        self.preprocessors.names()
    }

    /// Declare a unit-of-measure atom recognized by the tokenizer.
    pub fn register_unit(&mut self, name: &str) {
        self.units
            .insert(name.to_string(), Term::unit_atom(name.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_context_parses() {
        let ctx = Context::new();
        assert_eq!(ctx.parse("1+1").unwrap(), Term::int(2));
    }

    #[test]
    fn units_tokenize_as_unit_atoms() {
        let mut ctx = Context::new();
        ctx.register_unit("kg");
        let t = ctx.parse("2kg").unwrap();
        assert!(t.variables().is_empty());
        assert_eq!(t.text(), "2*kg");
    }

    #[test]
    fn scoped_override_by_clone() {
        let ctx = Context::new();
        let mut loose = ctx.clone();
        loose.settings.precision = 3;
        assert_eq!(loose.settings.precision, 3);
        assert_eq!(ctx.settings.precision, 21);
    }
}
