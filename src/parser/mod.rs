//! Parser pipeline: string → preprocessed text → scope tree → operator
//! tree → [`Term`].
//!
//! The driver walks the operator tree post-order. Operator nodes dispatch
//! through their descriptor's operation to the kernel; unknown operations
//! fall through to the function provider, so injected operators can route
//! to custom functions. Substitutions replace matched atoms before
//! dispatch, and number-folding mode additionally collapses every constant
//! subtree to a decimal rational at the configured precision.

pub(crate) mod preprocess;
pub(crate) mod tokenizer;
pub(crate) mod tokens;
pub(crate) mod tree;

pub use preprocess::{PreprocessorFn, Preprocessors};
pub use tokens::{Bracket, Brackets, OperatorDescriptor, OperatorDictionary, Token, TokenKind};

use std::collections::HashMap;

use crate::context::Context;
use crate::core::error::AlgebraError;
use crate::core::frac::Frac;
use crate::core::term::{Group, Power, Term};
use crate::kernel;
use tree::Node;

/// A substitution target: an already-built term, or source text parsed on
/// first use.
#[derive(Debug, Clone)]
pub enum Substitution {
    /// Substitute a ready-made term.
    Term(Term),
    /// Substitute the parse of this text.
    Text(String),
}

impl From<Term> for Substitution {
    fn from(t: Term) -> Self {
        Substitution::Term(t)
    }
}

impl From<&str> for Substitution {
    fn from(s: &str) -> Self {
        Substitution::Text(s.to_string())
    }
}

impl From<String> for Substitution {
    fn from(s: String) -> Self {
        Substitution::Text(s)
    }
}

/// Atom-name → replacement map applied during evaluation.
pub type Substitutions = HashMap<String, Substitution>;

/// Parse an expression against a context, with optional substitutions.
pub fn parse_with(
    ctx: &Context,
    input: &str,
    subs: Option<&Substitutions>,
) -> Result<Term, AlgebraError> {
    if input.trim().is_empty() {
        return Err(AlgebraError::EmptyExpression);
    }
    let prepared = preprocess::prepare_expression(input, ctx)?;
    if prepared.is_empty() {
        return Err(AlgebraError::EmptyExpression);
    }
    let root = tokenizer::tokenize(&prepared, ctx)?;
    let node = tree::build_tree(&root)?;
    let term = eval_node(&node, ctx, subs)?;
    if ctx.parse_to_number {
        evaluate(ctx, &term)
    } else {
        Ok(term)
    }
}

fn eval_node(
    node: &Node,
    ctx: &Context,
    subs: Option<&Substitutions>,
) -> Result<Term, AlgebraError> {
    match node {
        Node::Leaf(t) => eval_leaf(t, ctx, subs),
        Node::Unary { op, child } => {
            let c = eval_node(child, ctx, subs)?;
            let operation = op
                .descriptor
                .as_ref()
                .map(|d| d.operation.as_str())
                .unwrap_or_default();
            match operation {
                "add" => Ok(c),
                "subtract" => Ok(kernel::negate(&c)),
                other => ctx
                    .functions
                    .call(other, vec![c], &ctx.settings, ctx.parse_to_number),
            }
        }
        Node::Binary { op, left, right } => {
            let l = eval_node(left, ctx, subs)?;
            let r = eval_node(right, ctx, subs)?;
            let operation = op
                .descriptor
                .as_ref()
                .map(|d| d.operation.as_str())
                .unwrap_or_default();
            let settings = &ctx.settings;
            match operation {
                "add" => Ok(kernel::add(&l, &r, settings)),
                "subtract" => Ok(kernel::subtract(&l, &r, settings)),
                "multiply" => Ok(kernel::multiply(&l, &r, settings)),
                "divide" => kernel::divide(&l, &r, settings),
                "pow" => kernel::pow(&l, &r, settings),
                "comma" => Err(AlgebraError::invalid_syntax(
                    "',' is only valid between function arguments",
                )),
                other => ctx
                    .functions
                    .call(other, vec![l, r], settings, ctx.parse_to_number),
            }
        }
        Node::Function { name, args } => {
            let terms: Result<Vec<Term>, AlgebraError> =
                args.iter().map(|a| eval_node(a, ctx, subs)).collect();
            ctx.functions
                .call(&name.text, terms?, &ctx.settings, ctx.parse_to_number)
        }
    }
}

fn eval_leaf(
    token: &Token,
    ctx: &Context,
    subs: Option<&Substitutions>,
) -> Result<Term, AlgebraError> {
    if token.kind == TokenKind::Unit {
        return Ok(ctx
            .units
            .get(&token.text)
            .cloned()
            .unwrap_or_else(|| Term::unit_atom(token.text.clone())));
    }
    let first_is_numeric = token
        .text
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_digit() || c == '.');
    if first_is_numeric {
        return Ok(Term::number(Frac::from_decimal(&token.text)?));
    }
    if let Some(map) = subs
        && let Some(replacement) = map.get(&token.text)
    {
        return match replacement {
            Substitution::Term(t) => Ok(t.clone()),
            Substitution::Text(src) => parse_with(ctx, src, None),
        };
    }
    if token.text == ctx.settings.imaginary_unit {
        return Ok(Term::imaginary_unit(token.text.clone()));
    }
    if token.text == "Infinity" {
        return Ok(Term::infinity());
    }
    Ok(Term::variable(token.text.clone()))
}

// =============================================================================
// NUMBER FOLDING (PARSE2NUMBER semantics)
// =============================================================================

/// Re-run a term through the kernel, collapsing every constant subtree to
/// a decimal rational at the context's precision.
pub fn evaluate(ctx: &Context, term: &Term) -> Result<Term, AlgebraError> {
    fold_numeric(ctx, term)
}

fn fold_numeric(ctx: &Context, t: &Term) -> Result<Term, AlgebraError> {
    let settings = &ctx.settings;
    if t.group() == Group::N {
        return Ok(t.clone());
    }
    if t.is_constant_deep()
        && let Some(v) = ctx.functions.numeric_value(t)
        && let Some(f) = Frac::from_f64_prec(v, settings.precision)
    {
        return Ok(Term::number(f));
    }
    match t.group() {
        Group::FN => {
            let args: Result<Vec<Term>, AlgebraError> =
                t.args().iter().map(|a| fold_numeric(ctx, a)).collect();
            let called = ctx.functions.call(t.fname(), args?, settings, true)?;
            apply_head(ctx, &called, t)
        }
        Group::CP | Group::PL => {
            let mut sum = Term::zero();
            for child in t.children().values() {
                sum = kernel::add(&sum, &fold_numeric(ctx, child)?, settings);
            }
            apply_head(ctx, &sum, t)
        }
        Group::CB => {
            let mut product = Term::one();
            for child in t.children().values() {
                product = kernel::multiply(&product, &fold_numeric(ctx, child)?, settings);
            }
            apply_head(ctx, &product, t)
        }
        Group::EX => {
            let exp = match t.power() {
                Power::Term(p) => fold_numeric(ctx, p)?,
                Power::Rat(r) => Term::number(r.clone()),
            };
            let mut base = t.clone();
            base.power = Power::Rat(Frac::one());
            base.multiplier = Frac::one();
            if let Some(g) = base.previous_group.take() {
                base.group = g;
                if g == Group::N {
                    // A numeric EX keeps its base in the value hash.
                    base = Term::number(kernel::frac_from_hash(t.value()));
                }
            }
            let raised = kernel::pow(&base, &exp, settings)?;
            Ok(kernel::multiply(
                &Term::number(t.multiplier().clone()),
                &raised,
                settings,
            ))
        }
        Group::N | Group::P | Group::S => Ok(t.clone()),
    }
}

/// Reapply an original term's head power and multiplier to its rebuilt
/// body.
fn apply_head(ctx: &Context, rebuilt: &Term, original: &Term) -> Result<Term, AlgebraError> {
    let settings = &ctx.settings;
    let raised = match original.power() {
        Power::Rat(r) if r.is_one() => rebuilt.clone(),
        Power::Rat(r) => kernel::pow(rebuilt, &Term::number(r.clone()), settings)?,
        Power::Term(p) => kernel::pow(rebuilt, &fold_numeric(ctx, p)?, settings)?,
    };
    Ok(kernel::multiply(
        &Term::number(original.multiplier().clone()),
        &raised,
        settings,
    ))
}
