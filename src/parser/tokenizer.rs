//! The scanner: one forward pass from prepared text to a scope tree.
//!
//! Operator runs are greedily chunked against the dictionary, brackets
//! open and close nested scopes (with parity checked by id pairing), and a
//! space after a function name opens an *implicit* scope that a following
//! operator, second space, or closing bracket terminates, so `sin x + 1`
//! tokenizes like `sin(x) + 1`. Spaces between plain operands read as
//! implicit multiplication.

use crate::context::Context;
use crate::core::error::{AlgebraError, Span};
use crate::parser::tokens::{Scope, ScopeItem, Token};

/// Tokenize prepared input into the root scope.
pub fn tokenize(input: &str, ctx: &Context) -> Result<Scope, AlgebraError> {
    Scanner::new(input, ctx).run()
}

struct Scanner<'ctx> {
    chars: Vec<char>,
    ctx: &'ctx Context,
    /// Scope stack; index 0 is the root.
    scopes: Vec<Scope>,
    /// Open brackets: glyph, column, pairing id.
    open: Vec<(char, usize, u8)>,
    /// Start column of the pending identifier/number run.
    pending: Option<usize>,
    /// A space separates the previous operand from whatever comes next.
    has_space: bool,
    i: usize,
}

impl<'ctx> Scanner<'ctx> {
    fn new(input: &str, ctx: &'ctx Context) -> Self {
        Scanner {
            chars: input.chars().collect(),
            ctx,
            scopes: vec![Scope::new(0, None, false)],
            open: Vec::new(),
            pending: None,
            has_space: false,
            i: 0,
        }
    }

    fn top(&mut self) -> &mut Scope {
        let at = self.scopes.len() - 1;
        &mut self.scopes[at]
    }

    fn run(mut self) -> Result<Scope, AlgebraError> {
        while self.i < self.chars.len() {
            let c = self.chars[self.i];
            if c == ' ' {
                self.on_space()?;
                self.i += 1;
            } else if self.ctx.brackets.is_bracket(c) {
                self.on_bracket(c)?;
                self.i += 1;
            } else if self.ctx.operators.is_operator_char(c) {
                self.on_operator_run()?;
            } else if c.is_alphanumeric() || c == '_' || c == '.' {
                if self.pending.is_none() {
                    self.pending = Some(self.i);
                }
                self.i += 1;
            } else {
                return Err(AlgebraError::invalid_syntax_at(
                    format!("unexpected character '{c}'"),
                    Span::at(self.i),
                ));
            }
        }
        self.flush_value()?;
        self.close_implicit();
        if let Some(&(glyph, col, _)) = self.open.first() {
            return Err(AlgebraError::parity_at(
                format!("unclosed '{glyph}'"),
                col,
            ));
        }
        Ok(self.scopes.swap_remove(0))
    }

    // -------------------------------------------------------------------------
    // Space handling (space-as-scope)
    // -------------------------------------------------------------------------

    fn on_space(&mut self) -> Result<(), AlgebraError> {
        if let Some(start) = self.pending {
            let text: String = self.chars[start..self.i].iter().collect();
            if self.ctx.functions.is_function(&text) {
                // Function application by space: open an implicit scope.
                self.pending = None;
                self.emit_gap_multiplication()?;
                let col = start;
                self.top().push_token(Token::function(text, col));
                self.scopes.push(Scope::new(self.i, None, true));
                self.has_space = false;
                return Ok(());
            }
            self.flush_value()?;
        } else if self
            .scopes
            .last()
            .is_some_and(|s| s.implicit && s.ends_in_operand())
        {
            // A space after a complete argument terminates the function's
            // scope; after a comma it stays open.
            self.close_implicit();
        }
        self.has_space = true;
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Brackets
    // -------------------------------------------------------------------------

    fn on_bracket(&mut self, c: char) -> Result<(), AlgebraError> {
        let Some(bracket) = self.ctx.brackets.get(c).cloned() else {
            return Err(AlgebraError::invalid_syntax_at(
                format!("unexpected '{c}'"),
                Span::at(self.i),
            ));
        };
        if bracket.is_open {
            if let Some(start) = self.pending.take() {
                let text: String = self.chars[start..self.i].iter().collect();
                if self.ctx.functions.is_function(&text) {
                    self.emit_gap_multiplication()?;
                    self.top().push_token(Token::function(text, start));
                } else {
                    // Identifier before a bracket: implicit multiplication.
                    self.pending = Some(start);
                    self.flush_value()?;
                    self.push_operator("*", self.i)?;
                }
            } else {
                self.emit_gap_multiplication()?;
            }
            self.scopes
                .push(Scope::new(self.i, bracket.maps_to.clone(), false));
            self.open.push((c, self.i, bracket.id));
        } else {
            self.flush_value()?;
            self.close_implicit();
            let Some((glyph, col, id)) = self.open.pop() else {
                return Err(AlgebraError::parity_at(
                    format!("unmatched '{c}'"),
                    self.i,
                ));
            };
            if id != bracket.id - 1 {
                return Err(AlgebraError::parity_at(
                    format!("'{c}' does not close '{glyph}' opened at column {}", col + 1),
                    self.i,
                ));
            }
            self.pop_scope();
            self.has_space = false;
        }
        Ok(())
    }

    fn pop_scope(&mut self) {
        if self.scopes.len() > 1
            && let Some(done) = self.scopes.pop()
        {
            self.top().items.push(ScopeItem::Scope(done));
        }
    }

    /// Pop every open space-scope back into its parent.
    fn close_implicit(&mut self) {
        while self.scopes.len() > 1 && self.scopes.last().is_some_and(|s| s.implicit) {
            self.pop_scope();
        }
    }

    // -------------------------------------------------------------------------
    // Operators
    // -------------------------------------------------------------------------

    fn on_operator_run(&mut self) -> Result<(), AlgebraError> {
        self.flush_value()?;
        let start = self.i;
        while self.i < self.chars.len() && self.ctx.operators.is_operator_char(self.chars[self.i])
        {
            self.i += 1;
        }
        let run: String = self.chars[start..self.i].iter().collect();
        // An operator terminates a space-opened function scope, except the
        // argument separator, which keeps the scope open.
        if !run.starts_with(',') {
            self.close_implicit();
        }
        let tokens = self.ctx.operators.chunkify(&run, start)?;
        for t in tokens {
            self.top().push_token(t);
        }
        self.has_space = false;
        Ok(())
    }

    fn push_operator(&mut self, glyph: &str, column: usize) -> Result<(), AlgebraError> {
        let tokens = self.ctx.operators.chunkify(glyph, column)?;
        for t in tokens {
            self.top().push_token(t);
        }
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Pending-token flushing
    // -------------------------------------------------------------------------

    /// Insert the implicit `*` a space between operands implies.
    fn emit_gap_multiplication(&mut self) -> Result<(), AlgebraError> {
        if self.has_space && self.top().ends_in_operand() {
            self.push_operator("*", self.i)?;
        }
        self.has_space = false;
        Ok(())
    }

    fn flush_value(&mut self) -> Result<(), AlgebraError> {
        let Some(start) = self.pending.take() else {
            return Ok(());
        };
        let text: String = self.chars[start..self.i].iter().collect();
        self.emit_gap_multiplication()?;

        let first_is_numeric = text
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_digit() || c == '.');
        if first_is_numeric {
            if !valid_number(&text) {
                return Err(AlgebraError::InvalidNumber {
                    value: text,
                    span: Some(Span::new(start, self.i)),
                });
            }
            self.top().push_token(Token::value(text, start));
            return Ok(());
        }

        if self.ctx.units.contains_key(&text) {
            self.top().push_token(Token::unit(text, start));
            return Ok(());
        }

        // Single-character-variable mode splits unknown runs into a
        // product of one-letter atoms.
        if !self.ctx.settings.use_multicharacter_vars
            && text.chars().count() > 1
            && !self.ctx.functions.is_function(&text)
        {
            let mut first = true;
            for (offset, ch) in text.chars().enumerate() {
                let col = start + offset;
                validate_name(&ch.to_string(), col, col + 1)?;
                if !first {
                    self.push_operator("*", col)?;
                }
                self.top().push_token(Token::value(ch.to_string(), col));
                first = false;
            }
            return Ok(());
        }

        validate_name(&text, start, self.i)?;
        self.top().push_token(Token::value(text, start));
        Ok(())
    }
}

fn valid_number(text: &str) -> bool {
    let mut dots = 0;
    let mut digits = 0;
    for c in text.chars() {
        match c {
            '0'..='9' => digits += 1,
            '.' => dots += 1,
            _ => return false,
        }
    }
    digits > 0 && dots <= 1
}

/// Identifiers are `[A-Za-z_][A-Za-z0-9_]*`.
pub(crate) fn validate_name(name: &str, start: usize, end: usize) -> Result<(), AlgebraError> {
    let mut chars = name.chars();
    let head_ok = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    if head_ok && chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        Ok(())
    } else {
        Err(AlgebraError::InvalidName {
            name: name.to_string(),
            span: Some(Span::new(start, end)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::tokens::TokenKind;

    fn tok(input: &str) -> Result<Scope, AlgebraError> {
        let ctx = Context::new();
        tokenize(input, &ctx)
    }

    fn flat_kinds(scope: &Scope) -> Vec<TokenKind> {
        scope
            .items
            .iter()
            .filter_map(|i| match i {
                ScopeItem::Token(t) => Some(t.kind),
                ScopeItem::Scope(_) => None,
            })
            .collect()
    }

    #[test]
    fn plain_expression_tokenizes_flat() {
        let scope = tok("x+1").unwrap();
        assert_eq!(scope.items.len(), 3);
        assert_eq!(
            flat_kinds(&scope),
            vec![TokenKind::Value, TokenKind::Operator, TokenKind::Value]
        );
    }

    #[test]
    fn brackets_nest_scopes() {
        let scope = tok("(x+1)").unwrap();
        assert_eq!(scope.items.len(), 1);
        assert!(matches!(&scope.items[0], ScopeItem::Scope(s) if s.items.len() == 3));
    }

    #[test]
    fn function_before_bracket_is_a_function_token() {
        let scope = tok("sin(x)").unwrap();
        assert_eq!(scope.items.len(), 2);
        assert!(
            matches!(&scope.items[0], ScopeItem::Token(t) if t.kind == TokenKind::Function && t.text == "sin")
        );
        assert!(matches!(&scope.items[1], ScopeItem::Scope(_)));
    }

    #[test]
    fn non_function_before_bracket_multiplies() {
        let scope = tok("x(y)").unwrap();
        // x * (y)
        assert_eq!(scope.items.len(), 3);
        assert!(
            matches!(&scope.items[1], ScopeItem::Token(t) if t.kind == TokenKind::Operator && t.text == "*")
        );
    }

    #[test]
    fn space_scope_wraps_function_argument() {
        let scope = tok("sin x + 1").unwrap();
        // sin, [x], +, 1
        assert_eq!(scope.items.len(), 4);
        assert!(
            matches!(&scope.items[0], ScopeItem::Token(t) if t.kind == TokenKind::Function)
        );
        assert!(matches!(&scope.items[1], ScopeItem::Scope(s) if s.implicit && s.items.len() == 1));
        assert!(
            matches!(&scope.items[2], ScopeItem::Token(t) if t.text == "+")
        );
    }

    #[test]
    fn space_between_operands_multiplies() {
        let scope = tok("2 x").unwrap();
        assert_eq!(
            flat_kinds(&scope),
            vec![TokenKind::Value, TokenKind::Operator, TokenKind::Value]
        );
    }

    #[test]
    fn operator_columns_are_tracked() {
        let scope = tok("a+b").unwrap();
        if let ScopeItem::Token(t) = &scope.items[1] {
            assert_eq!(t.column, 1);
        } else {
            panic!("expected operator token");
        }
    }

    #[test]
    fn unmatched_close_is_a_parity_error() {
        let err = tok("x)").unwrap_err();
        assert!(matches!(err, AlgebraError::Parity { .. }));
        assert!(err.to_string().contains("column 2"));
    }

    #[test]
    fn unclosed_open_is_a_parity_error() {
        let err = tok("sin(x").unwrap_err();
        assert!(matches!(err, AlgebraError::Parity { .. }));
        assert!(err.to_string().contains("column 4"));
    }

    #[test]
    fn double_plus_splits_without_a_registered_operator() {
        let scope = tok("a++b").unwrap();
        assert_eq!(scope.items.len(), 4);
        assert!(
            matches!(&scope.items[1], ScopeItem::Token(t) if t.text == "+" && t.column == 1)
        );
        assert!(
            matches!(&scope.items[2], ScopeItem::Token(t) if t.text == "+" && t.column == 2)
        );
    }

    #[test]
    fn double_plus_stays_whole_with_a_registered_operator() {
        let mut ctx = Context::new();
        ctx.operators.insert(
            "++",
            crate::parser::tokens::OperatorDescriptor {
                precedence: 2,
                left_assoc: true,
                prefix: false,
                postfix: false,
                operation: "add".to_string(),
            },
        );
        let scope = tokenize("a++b", &ctx).unwrap();
        assert_eq!(scope.items.len(), 3);
        assert!(
            matches!(&scope.items[1], ScopeItem::Token(t) if t.text == "++")
        );
    }

    #[test]
    fn invalid_characters_are_rejected() {
        assert!(matches!(
            tok("x@y"),
            Err(AlgebraError::InvalidSyntax { .. })
        ));
    }

    #[test]
    fn malformed_numbers_are_rejected() {
        assert!(matches!(
            tok("1.2.3"),
            Err(AlgebraError::InvalidNumber { .. })
        ));
    }
}
