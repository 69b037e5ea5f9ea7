//! Input preparation: user preprocessor hooks and the built-in rewrites.
//!
//! User hooks run first, in registration order. The built-in pipeline then
//! iterates to a textual fixpoint: whitespace normalization, bracket-space
//! removal, scientific-notation expansion, and implied-multiplication
//! insertion. Each rewrite either grows the operator count or leaves the
//! string unchanged, so the loop terminates.

use std::sync::Arc;

use regex::Regex;

use crate::context::Context;
use crate::core::error::AlgebraError;

/// A registered rewrite hook.
pub type PreprocessorFn = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// One named preprocessor.
#[derive(Clone)]
pub struct Preprocessor {
    name: String,
    action: PreprocessorFn,
}

impl Preprocessor {
    /// The hook's registration name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl std::fmt::Debug for Preprocessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Preprocessor")
            .field("name", &self.name)
            .finish()
    }
}

/// Ordered registry of user rewrite hooks.
#[derive(Debug, Clone, Default)]
pub struct Preprocessors {
    hooks: Vec<Preprocessor>,
}

impl Preprocessors {
    /// Register a hook. With `order` given, the hook is spliced in at that
    /// position and later hooks shift back; otherwise it appends.
    pub fn add(
        &mut self,
        name: &str,
        action: PreprocessorFn,
        order: Option<usize>,
    ) -> Result<(), AlgebraError> {
        if self.hooks.iter().any(|h| h.name == name) {
            return Err(AlgebraError::Preprocessor(format!(
                "preprocessor '{name}' is already registered"
            )));
        }
        let hook = Preprocessor {
            name: name.to_string(),
            action,
        };
        match order {
            Some(at) if at < self.hooks.len() => self.hooks.insert(at, hook),
            _ => self.hooks.push(hook),
        }
        Ok(())
    }

    /// Remove a hook by name.
    pub fn remove(&mut self, name: &str) -> Result<(), AlgebraError> {
        let at = self
            .hooks
            .iter()
            .position(|h| h.name == name)
            .ok_or_else(|| {
                AlgebraError::Preprocessor(format!("no preprocessor named '{name}'"))
            })?;
        self.hooks.remove(at);
        Ok(())
    }

    /// Registered hook names, in execution order.
    pub fn names(&self) -> Vec<&str> {
        self.hooks.iter().map(|h| h.name.as_str()).collect()
    }

    fn apply(&self, input: &str) -> String {
        self.hooks
            .iter()
            .fold(input.to_string(), |s, h| (h.action)(&s))
    }
}

/// Run user hooks, then the built-in pipeline to fixpoint.
pub fn prepare_expression(input: &str, ctx: &Context) -> Result<String, AlgebraError> {
    let mut s = ctx.preprocessors.apply(input);

    // A custom power glyph normalizes to the canonical one before scanning.
    if ctx.settings.power_operator != "^" {
        s = s.replace(&ctx.settings.power_operator, "^");
    }

    let implied = Regex::new(&ctx.settings.implied_multiplication_pattern).map_err(|e| {
        AlgebraError::Preprocessor(format!("invalid implied-multiplication pattern: {e}"))
    })?;

    loop {
        let before = s.clone();
        s = collapse_whitespace(&s);
        s = strip_bracket_spaces(&s);
        s = expand_scientific(&s)?;
        s = implied.replace_all(&s, "$1*$2").into_owned();
        s = s.replace(")(", ")*(");
        s = CLOSE_PAREN_IDENT.replace_all(&s, ")*$1").into_owned();
        if s == before {
            return Ok(s);
        }
    }
}

static CLOSE_PAREN_IDENT: std::sync::LazyLock<Regex> = std::sync::LazyLock::new(|| {
    Regex::new(r"\)([0-9A-Za-z_.])").expect("literal pattern")
});

static SCIENTIFIC: std::sync::LazyLock<Regex> = std::sync::LazyLock::new(|| {
    Regex::new(r"(\d+(?:\.\d+)?)[eE]([+-]?\d+)([^0-9A-Za-z_.]|$)").expect("literal pattern")
});

fn collapse_whitespace(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_space = false;
    for c in s.chars() {
        if c.is_whitespace() {
            if !in_space {
                out.push(' ');
            }
            in_space = true;
        } else {
            out.push(c);
            in_space = false;
        }
    }
    out.trim().to_string()
}

fn strip_bracket_spaces(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let chars: Vec<char> = s.chars().collect();
    for (i, &c) in chars.iter().enumerate() {
        if c == ' ' {
            let prev = i.checked_sub(1).map(|j| chars[j]);
            let next = chars.get(i + 1).copied();
            if matches!(prev, Some('(' | ')')) || matches!(next, Some('(' | ')')) {
                continue;
            }
        }
        out.push(c);
    }
    out
}

/// Rewrite `1.2e-3` style literals into plain decimals by shifting the
/// decimal point.
fn expand_scientific(s: &str) -> Result<String, AlgebraError> {
    let mut result = s.to_string();
    loop {
        let found = match SCIENTIFIC.captures(&result) {
            None => return Ok(result),
            Some(caps) => {
                let whole = caps.get(0).map_or(0..0, |m| m.range());
                let mantissa = caps[1].to_string();
                let exponent: i64 = caps[2]
                    .parse()
                    .map_err(|_| AlgebraError::invalid_number(&caps[0]))?;
                let tail = caps.get(3).map_or(String::new(), |m| m.as_str().to_string());
                (whole, mantissa, exponent, tail)
            }
        };
        let (whole, mantissa, exponent, tail) = found;
        let expanded = shift_decimal(&mantissa, exponent)?;
        result.replace_range(whole, &format!("{expanded}{tail}"));
    }
}

fn shift_decimal(mantissa: &str, exponent: i64) -> Result<String, AlgebraError> {
    let (int_part, frac_part) = match mantissa.split_once('.') {
        Some((i, f)) => (i.to_string(), f.to_string()),
        None => (mantissa.to_string(), String::new()),
    };
    let digits: String = format!("{int_part}{frac_part}");
    let point = int_part.len() as i64 + exponent;
    if digits.is_empty() {
        return Err(AlgebraError::invalid_number(mantissa));
    }
    let len = digits.len() as i64;
    let out = if point <= 0 {
        format!("0.{}{}", "0".repeat(point.unsigned_abs() as usize), digits)
    } else if point >= len {
        format!("{}{}", digits, "0".repeat((point - len) as usize))
    } else {
        format!("{}.{}", &digits[..point as usize], &digits[point as usize..])
    };
    Ok(out)
}
