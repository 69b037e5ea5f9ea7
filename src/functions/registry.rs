//! Built-in function definitions.
//!
//! Each definition carries the accepted arity and a numeric evaluator used
//! only in number-folding mode; symbolic reductions live on the provider.

use std::ops::RangeInclusive;

/// Definition of a callable function: arity plus numeric evaluation.
#[derive(Clone)]
pub struct FunctionDefinition {
    /// Canonical name of the function (e.g. "sin", "sqrt").
    pub name: &'static str,
    /// Acceptable argument count.
    pub arity: RangeInclusive<usize>,
    /// Numerical evaluation, used when folding constants to decimals.
    pub eval: fn(&[f64]) -> Option<f64>,
}

impl FunctionDefinition {
    /// Helper to check if an argument count is valid
    #[inline]
    pub(crate) fn validate_arity(&self, args: usize) -> bool {
        self.arity.contains(&args)
    }
}

impl std::fmt::Debug for FunctionDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FunctionDefinition")
            .field("name", &self.name)
            .field("arity", &self.arity)
            .finish()
    }
}

fn eval_factorial(args: &[f64]) -> Option<f64> {
    let n = args[0];
    if n < 0.0 || n.fract() != 0.0 || n > 170.0 {
        return None;
    }
    let mut acc = 1.0f64;
    let mut k = 2.0f64;
    while k <= n {
        acc *= k;
        k += 1.0;
    }
    Some(acc)
}

fn eval_min(args: &[f64]) -> Option<f64> {
    args.iter().copied().reduce(f64::min)
}

fn eval_max(args: &[f64]) -> Option<f64> {
    args.iter().copied().reduce(f64::max)
}

fn eval_log(args: &[f64]) -> Option<f64> {
    match args {
        [x] => Some(x.ln()),
        [x, base] => Some(x.log(*base)),
        _ => None,
    }
}

/// All built-in definitions registered on a fresh provider.
pub(crate) fn builtin_definitions() -> Vec<FunctionDefinition> {
    vec![
        FunctionDefinition {
            name: "sqrt",
            arity: 1..=1,
            eval: |a| Some(a[0].sqrt()),
        },
        FunctionDefinition {
            name: "parens",
            arity: 1..=1,
            eval: |a| Some(a[0]),
        },
        FunctionDefinition {
            name: "abs",
            arity: 1..=1,
            eval: |a| Some(a[0].abs()),
        },
        FunctionDefinition {
            name: "factorial",
            arity: 1..=1,
            eval: eval_factorial,
        },
        FunctionDefinition {
            name: "min",
            arity: 1..=usize::MAX,
            eval: eval_min,
        },
        FunctionDefinition {
            name: "max",
            arity: 1..=usize::MAX,
            eval: eval_max,
        },
        FunctionDefinition {
            name: "sin",
            arity: 1..=1,
            eval: |a| Some(a[0].sin()),
        },
        FunctionDefinition {
            name: "cos",
            arity: 1..=1,
            eval: |a| Some(a[0].cos()),
        },
        FunctionDefinition {
            name: "tan",
            arity: 1..=1,
            eval: |a| Some(a[0].tan()),
        },
        FunctionDefinition {
            name: "asin",
            arity: 1..=1,
            eval: |a| Some(a[0].asin()),
        },
        FunctionDefinition {
            name: "acos",
            arity: 1..=1,
            eval: |a| Some(a[0].acos()),
        },
        FunctionDefinition {
            name: "atan",
            arity: 1..=1,
            eval: |a| Some(a[0].atan()),
        },
        FunctionDefinition {
            name: "ln",
            arity: 1..=1,
            eval: |a| Some(a[0].ln()),
        },
        FunctionDefinition {
            name: "log",
            arity: 1..=2,
            eval: eval_log,
        },
        FunctionDefinition {
            name: "exp",
            arity: 1..=1,
            eval: |a| Some(a[0].exp()),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn factorial_eval_is_exact_for_small_integers() {
        assert_eq!(eval_factorial(&[5.0]), Some(120.0));
        assert_eq!(eval_factorial(&[0.0]), Some(1.0));
        assert_eq!(eval_factorial(&[-1.0]), None);
        assert_eq!(eval_factorial(&[2.5]), None);
    }

    #[test]
    fn builtins_include_the_reserved_names() {
        let names: Vec<&str> = builtin_definitions().iter().map(|d| d.name).collect();
        assert!(names.contains(&"sqrt"));
        assert!(names.contains(&"parens"));
    }
}
