//! Token and scope types plus the injected operator/bracket dictionaries.

use rustc_hash::FxHashMap;

use crate::core::error::{AlgebraError, Span};

/// What a token is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// An operator glyph with a descriptor.
    Operator,
    /// An identifier that names a callable function.
    Function,
    /// A variable name or numeric literal.
    Value,
    /// A unit-of-measure atom.
    Unit,
}

/// How an operator binds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperatorDescriptor {
    /// Binding strength; higher binds tighter.
    pub precedence: u8,
    /// Left-associative when true (`^` is right-associative).
    pub left_assoc: bool,
    /// The operator also has a prefix form (`-x`, `+x`).
    pub prefix: bool,
    /// The operator is postfix (`x!`).
    pub postfix: bool,
    /// Kernel operation or function name this operator dispatches to.
    pub operation: String,
}

/// One lexed token with its source column (0-indexed).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Raw text.
    pub text: String,
    /// Classification.
    pub kind: TokenKind,
    /// 0-indexed source column.
    pub column: usize,
    /// Operator descriptor, for operator tokens.
    pub descriptor: Option<OperatorDescriptor>,
}

impl Token {
    pub(crate) fn value(text: impl Into<String>, column: usize) -> Self {
        Token {
            text: text.into(),
            kind: TokenKind::Value,
            column,
            descriptor: None,
        }
    }

    pub(crate) fn unit(text: impl Into<String>, column: usize) -> Self {
        Token {
            text: text.into(),
            kind: TokenKind::Unit,
            column,
            descriptor: None,
        }
    }

    pub(crate) fn function(text: impl Into<String>, column: usize) -> Self {
        Token {
            text: text.into(),
            kind: TokenKind::Function,
            column,
            descriptor: None,
        }
    }

    pub(crate) fn operator(text: impl Into<String>, column: usize, d: OperatorDescriptor) -> Self {
        Token {
            text: text.into(),
            kind: TokenKind::Operator,
            column,
            descriptor: Some(d),
        }
    }

    /// True for operand-shaped tokens.
    pub(crate) fn is_operand(&self) -> bool {
        matches!(self.kind, TokenKind::Value | TokenKind::Unit)
    }
}

/// An item in a scope: a token or a nested scope.
#[derive(Debug, Clone, PartialEq)]
pub enum ScopeItem {
    /// A single token.
    Token(Token),
    /// A bracketed or space-opened nested scope.
    Scope(Scope),
}

/// An ordered token sequence opened by a bracket (or by the
/// space-after-function rule) and closed by its match.
#[derive(Debug, Clone, PartialEq)]
pub struct Scope {
    /// Items in source order.
    pub items: Vec<ScopeItem>,
    /// 0-indexed column where the scope opened.
    pub column: usize,
    /// Function name the opening bracket maps to, when any.
    pub maps_to: Option<String>,
    /// True for scopes opened by the space-after-function rule.
    pub implicit: bool,
}

impl Scope {
    pub(crate) fn new(column: usize, maps_to: Option<String>, implicit: bool) -> Self {
        Scope {
            items: Vec::new(),
            column,
            maps_to,
            implicit,
        }
    }

    pub(crate) fn push_token(&mut self, t: Token) {
        self.items.push(ScopeItem::Token(t));
    }

    /// True when the last item can act as a left operand.
    pub(crate) fn ends_in_operand(&self) -> bool {
        match self.items.last() {
            Some(ScopeItem::Scope(_)) => true,
            Some(ScopeItem::Token(t)) => {
                t.is_operand()
                    || t.descriptor.as_ref().is_some_and(|d| d.postfix)
            }
            None => false,
        }
    }
}

/// A bracket glyph with its pairing id. Openers and closers pair by the
/// `opener.id == closer.id - 1` convention.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bracket {
    /// The glyph.
    pub glyph: char,
    /// Pairing id.
    pub id: u8,
    /// True for opening brackets.
    pub is_open: bool,
    /// Function the bracket maps its scope to, when any.
    pub maps_to: Option<String>,
}

/// Injected bracket map.
#[derive(Debug, Clone)]
pub struct Brackets {
    map: FxHashMap<char, Bracket>,
}

impl Default for Brackets {
    fn default() -> Self {
        let mut map = FxHashMap::default();
        map.insert(
            '(',
            Bracket {
                glyph: '(',
                id: 1,
                is_open: true,
                maps_to: None,
            },
        );
        map.insert(
            ')',
            Bracket {
                glyph: ')',
                id: 2,
                is_open: false,
                maps_to: None,
            },
        );
        Brackets { map }
    }
}

impl Brackets {
    /// Look up a bracket glyph.
    pub fn get(&self, glyph: char) -> Option<&Bracket> {
        self.map.get(&glyph)
    }

    /// True when the glyph is any bracket.
    pub fn is_bracket(&self, glyph: char) -> bool {
        self.map.contains_key(&glyph)
    }

    /// Register a bracket pair. The closer's id must be the opener's plus
    /// one for matching to succeed.
    pub fn insert(&mut self, bracket: Bracket) {
        self.map.insert(bracket.glyph, bracket);
    }

    /// True when `closer` closes `opener`.
    pub fn matches(&self, opener: &Bracket, closer: &Bracket) -> bool {
        opener.is_open && !closer.is_open && opener.id == closer.id - 1
    }
}

/// Injected operator map with greedy longest-match chunking.
#[derive(Debug, Clone)]
pub struct OperatorDictionary {
    ops: FxHashMap<String, OperatorDescriptor>,
    max_glyph_len: usize,
}

impl Default for OperatorDictionary {
    fn default() -> Self {
        let mut dict = OperatorDictionary {
            ops: FxHashMap::default(),
            max_glyph_len: 1,
        };
        dict.insert(",", op(0, true, false, false, "comma"));
        dict.insert("+", op(2, true, true, false, "add"));
        dict.insert("-", op(2, true, true, false, "subtract"));
        dict.insert("*", op(4, true, false, false, "multiply"));
        dict.insert("/", op(4, true, false, false, "divide"));
        dict.insert("^", op(6, false, false, false, "pow"));
        dict.insert("**", op(6, false, false, false, "pow"));
        dict.insert("!", op(7, true, false, true, "factorial"));
        dict
    }
}

fn op(
    precedence: u8,
    left_assoc: bool,
    prefix: bool,
    postfix: bool,
    operation: &str,
) -> OperatorDescriptor {
    OperatorDescriptor {
        precedence,
        left_assoc,
        prefix,
        postfix,
        operation: operation.to_string(),
    }
}

impl OperatorDictionary {
    /// Register or replace an operator glyph.
    pub fn insert(&mut self, glyph: &str, descriptor: OperatorDescriptor) {
        self.max_glyph_len = self.max_glyph_len.max(glyph.chars().count());
        self.ops.insert(glyph.to_string(), descriptor);
    }

    /// Look up a glyph.
    pub fn get(&self, glyph: &str) -> Option<&OperatorDescriptor> {
        self.ops.get(glyph)
    }

    /// True when the character can start or continue an operator run.
    pub fn is_operator_char(&self, c: char) -> bool {
        self.ops.keys().any(|g| g.contains(c))
    }

    /// Greedy longest-match split of an operator run into known glyphs,
    /// each emitted with its descriptor and source column.
    pub fn chunkify(&self, run: &str, column: usize) -> Result<Vec<Token>, AlgebraError> {
        let chars: Vec<char> = run.chars().collect();
        let mut tokens = Vec::new();
        let mut pos = 0;
        while pos < chars.len() {
            let mut matched = None;
            let upper = self.max_glyph_len.min(chars.len() - pos);
            for len in (1..=upper).rev() {
                let candidate: String = chars[pos..pos + len].iter().collect();
                if let Some(d) = self.ops.get(&candidate) {
                    matched = Some((candidate, len, d.clone()));
                    break;
                }
            }
            match matched {
                Some((glyph, len, d)) => {
                    tokens.push(Token::operator(glyph, column + pos, d));
                    pos += len;
                }
                None => {
                    return Err(AlgebraError::InvalidOperator {
                        glyph: chars[pos..].iter().collect(),
                        span: Span::at(column + pos),
                    });
                }
            }
        }
        Ok(tokens)
    }
}
