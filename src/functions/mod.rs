//! Function dispatch.
//!
//! The [`FunctionProvider`] answers `descriptor(name)` queries from the
//! tokenizer (is this identifier a function?) and dispatches `call` from the
//! parser driver. Calls reduce symbolically where an exact rule exists
//! (`sqrt` unwraps to a power, `parens` is transparent, `abs` and `factorial`
//! fold on suitable arguments) and otherwise return an FN wrapper term.

mod registry;

pub use registry::FunctionDefinition;

use num_bigint::BigInt;
use num_traits::{One, ToPrimitive};
use rustc_hash::FxHashMap;

use crate::core::error::AlgebraError;
use crate::core::frac::Frac;
use crate::core::settings::Settings;
use crate::core::term::{Group, NAMED_CONSTANTS, Power, Term};
use crate::kernel;

/// Registry of callable functions, injected into the tokenizer and driver.
#[derive(Debug, Clone)]
pub struct FunctionProvider {
    defs: FxHashMap<String, FunctionDefinition>,
    /// Names declared callable without a numeric evaluator.
    symbolic: Vec<String>,
}

impl Default for FunctionProvider {
    fn default() -> Self {
        let mut defs = FxHashMap::default();
        for def in registry::builtin_definitions() {
            defs.insert(def.name.to_string(), def);
        }
        FunctionProvider {
            defs,
            symbolic: Vec::new(),
        }
    }
}

impl FunctionProvider {
    /// A provider with all built-ins registered.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a function's descriptor.
    pub fn get_function_descriptor(&self, name: &str) -> Option<&FunctionDefinition> {
        self.defs.get(name)
    }

    /// True when the identifier names a callable function.
    pub fn is_function(&self, name: &str) -> bool {
        self.defs.contains_key(name) || self.symbolic.iter().any(|s| s == name)
    }

    /// Register a custom function definition.
    ///
    /// Returns an error when the name is already taken.
    pub fn register(&mut self, name: &str, def: FunctionDefinition) -> Result<(), String> {
        if self.is_function(name) {
            return Err(format!("Function '{name}' is already defined"));
        }
        self.defs.insert(name.to_string(), def);
        Ok(())
    }

    /// Declare a function name with no evaluation or reduction rule; calls
    /// stay symbolic FN wrappers.
    pub fn declare(&mut self, name: &str) {
        if !self.is_function(name) {
            self.symbolic.push(name.to_string());
        }
    }

    /// Dispatch a function call over evaluated argument terms.
    pub fn call(
        &self,
        name: &str,
        args: Vec<Term>,
        settings: &Settings,
        numeric: bool,
    ) -> Result<Term, AlgebraError> {
        if let Some(def) = self.defs.get(name)
            && !def.validate_arity(args.len())
        {
            return Err(AlgebraError::InvalidFunctionCall {
                name: name.to_string(),
                expected: *def.arity.start(),
                got: args.len(),
            });
        }

        // Reserved names reduce structurally.
        if name == settings.sqrt_name && args.len() == 1 {
            return kernel::sqrt(&args[0], settings);
        }
        if name == settings.parenthesis_name && args.len() == 1 {
            return Ok(args[0].clone());
        }

        if let Some(reduced) = self.reduce(name, &args, settings) {
            return Ok(reduced);
        }

        let wrapper = Term::function(name, args);
        if numeric
            && let Some(value) = self.numeric_value(&wrapper)
            && let Some(folded) = Frac::from_f64_prec(value, settings.precision)
        {
            return Ok(Term::number(folded));
        }
        Ok(wrapper)
    }

    /// Exact symbolic reductions; `None` leaves the call wrapped.
    fn reduce(&self, name: &str, args: &[Term], settings: &Settings) -> Option<Term> {
        match name {
            "abs" => {
                let arg = &args[0];
                if arg.is_constant() {
                    return Some(Term::number(arg.multiplier().abs()));
                }
                if arg.multiplier().is_negative() {
                    // |m*rest| = |m| * abs(rest)
                    let mut rest = arg.clone();
                    rest.multiplier = Frac::one();
                    let wrapped = Term::function(name, vec![rest]);
                    return Some(kernel::multiply(
                        &Term::number(arg.multiplier().abs()),
                        &wrapped,
                        settings,
                    ));
                }
                None
            }
            "factorial" => {
                let arg = &args[0];
                let n = arg.numer_int().filter(|_| arg.is_integer())?;
                if n < BigInt::from(0) || n > BigInt::from(500) {
                    return None;
                }
                let mut acc = BigInt::one();
                let mut k = BigInt::from(2);
                while k <= n {
                    acc *= &k;
                    k += 1;
                }
                Some(Term::number(Frac::from(acc)))
            }
            "min" | "max" => {
                if !args.iter().all(Term::is_constant) {
                    return None;
                }
                let picked = if name == "min" {
                    args.iter().min_by(|a, b| a.multiplier().cmp(b.multiplier()))
                } else {
                    args.iter().max_by(|a, b| a.multiplier().cmp(b.multiplier()))
                };
                picked.cloned()
            }
            "ln" => {
                let arg = &args[0];
                if arg.is_one() {
                    return Some(Term::zero());
                }
                if arg.group() == Group::S && arg.value() == "e" && arg.multiplier().is_one() {
                    return Some(Term::one());
                }
                None
            }
            "log" => (args.len() == 1 && args[0].is_one()).then(Term::zero),
            "exp" => args[0].is_zero().then(Term::one),
            _ => None,
        }
    }

    /// Approximate a constant term as a float, recursing through functions
    /// with registered evaluators. `None` for anything non-constant.
    pub(crate) fn numeric_value(&self, t: &Term) -> Option<f64> {
        let mult = frac_to_f64(t.multiplier())?;
        let base = match t.group() {
            Group::N => 1.0,
            Group::S => {
                if t.is_imaginary() || t.is_unit() {
                    return None;
                }
                named_constant(t.value())?
            }
            Group::P => frac_to_f64(&kernel::frac_from_hash(t.value()))?,
            Group::EX => match t.previous_group() {
                Some(Group::N | Group::P) => frac_to_f64(&kernel::frac_from_hash(t.value()))?,
                Some(Group::S) => named_constant(t.value())?,
                _ => {
                    if t.children().is_empty() {
                        return None;
                    }
                    self.sum_or_product_value(t)?
                }
            },
            Group::FN => {
                let def = self.defs.get(t.fname())?;
                if !def.validate_arity(t.args().len()) {
                    return None;
                }
                let vals: Option<Vec<f64>> =
                    t.args().iter().map(|a| self.numeric_value(a)).collect();
                (def.eval)(&vals?)?
            }
            Group::CP | Group::PL | Group::CB => self.sum_or_product_value(t)?,
        };
        let exponent = match t.power() {
            Power::Rat(r) => frac_to_f64(r)?,
            Power::Term(p) => self.numeric_value(p)?,
        };
        let raised = if t.group() == Group::N {
            1.0
        } else {
            base.powf(exponent)
        };
        let out = mult * raised;
        out.is_finite().then_some(out)
    }

    fn sum_or_product_value(&self, t: &Term) -> Option<f64> {
        let values: Option<Vec<f64>> = t
            .children()
            .values()
            .map(|c| self.numeric_value(c))
            .collect();
        let values = values?;
        let multiplies =
            t.group() == Group::CB || t.previous_group() == Some(Group::CB);
        Some(if multiplies {
            values.iter().product()
        } else {
            values.iter().sum()
        })
    }
}

fn named_constant(name: &str) -> Option<f64> {
    if !NAMED_CONSTANTS.contains(&name) {
        return None;
    }
    match name {
        "pi" => Some(std::f64::consts::PI),
        "e" => Some(std::f64::consts::E),
        _ => None,
    }
}

fn frac_to_f64(f: &Frac) -> Option<f64> {
    if f.is_infinite() {
        return None;
    }
    let num = f.numer().to_f64()?;
    let den = f.denom().to_f64()?;
    let v = num / den;
    v.is_finite().then_some(v)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s() -> Settings {
        Settings::default()
    }

    #[test]
    fn sqrt_unwraps_to_a_power() {
        let p = FunctionProvider::new();
        let r = p.call("sqrt", vec![Term::int(4)], &s(), false).unwrap();
        assert_eq!(r, Term::int(2));
        let r = p.call("sqrt", vec![Term::variable("x")], &s(), false).unwrap();
        assert_eq!(r.text(), "x^(1/2)");
    }

    #[test]
    fn parens_is_transparent() {
        let p = FunctionProvider::new();
        let x = Term::variable("x");
        assert_eq!(p.call("parens", vec![x.clone()], &s(), false).unwrap(), x);
    }

    #[test]
    fn factorial_folds_integers() {
        let p = FunctionProvider::new();
        let r = p.call("factorial", vec![Term::int(5)], &s(), false).unwrap();
        assert_eq!(r, Term::int(120));
        let r = p
            .call("factorial", vec![Term::variable("n")], &s(), false)
            .unwrap();
        assert_eq!(r.group(), Group::FN);
    }

    #[test]
    fn abs_extracts_the_sign() {
        let p = FunctionProvider::new();
        let r = p.call("abs", vec![Term::int(-7)], &s(), false).unwrap();
        assert_eq!(r, Term::int(7));
        let neg_x = kernel::negate(&Term::variable("x"));
        let r = p.call("abs", vec![neg_x], &s(), false).unwrap();
        assert_eq!(r.text(), "abs(x)");
    }

    #[test]
    fn unknown_declared_functions_wrap() {
        let mut p = FunctionProvider::new();
        p.declare("f");
        assert!(p.is_function("f"));
        let r = p.call("f", vec![Term::variable("x")], &s(), false).unwrap();
        assert_eq!(r.group(), Group::FN);
        assert_eq!(r.value(), "f(x)");
    }

    #[test]
    fn arity_is_checked() {
        let p = FunctionProvider::new();
        let err = p.call("sin", vec![], &s(), false);
        assert!(matches!(
            err,
            Err(AlgebraError::InvalidFunctionCall { .. })
        ));
    }

    #[test]
    fn numeric_mode_folds_constants() {
        let p = FunctionProvider::new();
        let r = p.call("sin", vec![Term::zero()], &s(), true).unwrap();
        assert!(r.is_zero());
        let r = p.call("cos", vec![Term::zero()], &s(), true).unwrap();
        assert!(r.is_one());
    }
}
