//! Operator-tree construction.
//!
//! Each scope reduces to a single [`Node`] by shunting-yard: operands push,
//! binary operators reduce by precedence and associativity, prefix
//! operators bind the operand to their right, postfix operators the one to
//! their left, and a function token binds the scope that follows as its
//! argument list.

use crate::core::error::{AlgebraError, Span};
use crate::parser::tokens::{OperatorDescriptor, Scope, ScopeItem, Token, TokenKind};

/// Precedence of prefix operators: tighter than `*`, looser than `^`, so
/// `-x^2` reads `-(x^2)` while `-2*x` reads `(-2)*x`.
const PREFIX_PRECEDENCE: u8 = 5;

/// One node of the operator tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// A literal, variable, or unit token.
    Leaf(Token),
    /// A prefix or postfix application.
    Unary {
        /// The operator token.
        op: Token,
        /// Its single operand.
        child: Box<Node>,
    },
    /// A binary application.
    Binary {
        /// The operator token.
        op: Token,
        /// Left operand.
        left: Box<Node>,
        /// Right operand.
        right: Box<Node>,
    },
    /// A function applied to evaluated arguments.
    Function {
        /// The function name token.
        name: Token,
        /// Ordered arguments.
        args: Vec<Node>,
    },
}

enum StackOp {
    Binary(Token),
    Prefix(Token),
}

impl StackOp {
    fn precedence(&self) -> u8 {
        match self {
            StackOp::Prefix(_) => PREFIX_PRECEDENCE,
            StackOp::Binary(t) => t.descriptor.as_ref().map_or(0, |d| d.precedence),
        }
    }
}

/// Build the operator tree for a scope.
pub fn build_tree(scope: &Scope) -> Result<Node, AlgebraError> {
    // A scope labeled by its opening bracket becomes that function's call.
    if let Some(fname) = &scope.maps_to {
        let name = Token::function(fname.clone(), scope.column);
        let args = build_args(scope)?;
        return Ok(Node::Function { name, args });
    }
    build_items(&scope.items, scope.column)
}

/// Split a scope on its top-level commas and build each argument.
pub fn build_args(scope: &Scope) -> Result<Vec<Node>, AlgebraError> {
    let mut args = Vec::new();
    let mut current: Vec<ScopeItem> = Vec::new();
    for item in &scope.items {
        if is_comma(item) {
            args.push(build_items(&current, scope.column)?);
            current.clear();
        } else {
            current.push(item.clone());
        }
    }
    if current.is_empty() && !args.is_empty() {
        return Err(AlgebraError::invalid_syntax_at(
            "trailing comma in argument list",
            Span::at(scope.column),
        ));
    }
    if !current.is_empty() {
        args.push(build_items(&current, scope.column)?);
    }
    Ok(args)
}

fn is_comma(item: &ScopeItem) -> bool {
    matches!(item, ScopeItem::Token(t) if t.kind == TokenKind::Operator && t.text == ",")
}

fn build_items(items: &[ScopeItem], scope_col: usize) -> Result<Node, AlgebraError> {
    let mut output: Vec<Node> = Vec::new();
    let mut ops: Vec<StackOp> = Vec::new();
    let mut prev_operand = false;

    let mut idx = 0;
    while idx < items.len() {
        match &items[idx] {
            ScopeItem::Token(t) if t.kind == TokenKind::Function => {
                // A function binds the scope that follows as its arguments.
                let Some(ScopeItem::Scope(args_scope)) = items.get(idx + 1) else {
                    return Err(AlgebraError::invalid_syntax_at(
                        format!("function '{}' is not applied to arguments", t.text),
                        Span::at(t.column),
                    ));
                };
                if prev_operand {
                    push_implicit_mul(&mut output, &mut ops, t.column)?;
                }
                let args = build_args(args_scope)?;
                output.push(Node::Function {
                    name: t.clone(),
                    args,
                });
                prev_operand = true;
                idx += 2;
                continue;
            }
            ScopeItem::Token(t) if t.kind == TokenKind::Operator => {
                let Some(d) = t.descriptor.clone() else {
                    return Err(AlgebraError::invalid_syntax_at(
                        format!("operator '{}' has no descriptor", t.text),
                        Span::at(t.column),
                    ));
                };
                if t.text == "," {
                    return Err(AlgebraError::invalid_syntax_at(
                        "unexpected ','",
                        Span::at(t.column),
                    ));
                }
                if !prev_operand {
                    if !d.prefix {
                        return Err(AlgebraError::invalid_syntax_at(
                            format!("operator '{}' expects a left operand", t.text),
                            Span::at(t.column),
                        ));
                    }
                    ops.push(StackOp::Prefix(t.clone()));
                } else if d.postfix {
                    let child = pop_operand(&mut output, t)?;
                    output.push(Node::Unary {
                        op: t.clone(),
                        child: Box::new(child),
                    });
                    // prev_operand stays true: a postfix result is an operand.
                } else {
                    shunt_binary(&mut output, &mut ops, t, &d)?;
                    prev_operand = false;
                }
            }
            ScopeItem::Token(t) => {
                if prev_operand {
                    push_implicit_mul(&mut output, &mut ops, t.column)?;
                }
                output.push(Node::Leaf(t.clone()));
                prev_operand = true;
            }
            ScopeItem::Scope(s) => {
                if prev_operand {
                    push_implicit_mul(&mut output, &mut ops, s.column)?;
                }
                output.push(build_tree(s)?);
                prev_operand = true;
            }
        }
        idx += 1;
    }

    while let Some(op) = ops.pop() {
        reduce(&mut output, op)?;
    }
    match output.len() {
        1 => Ok(output.remove(0)),
        0 => Err(AlgebraError::invalid_syntax_at(
            "empty expression",
            Span::at(scope_col),
        )),
        _ => Err(AlgebraError::invalid_syntax_at(
            "expression does not reduce to a single value",
            Span::at(scope_col),
        )),
    }
}

fn shunt_binary(
    output: &mut Vec<Node>,
    ops: &mut Vec<StackOp>,
    t: &Token,
    d: &OperatorDescriptor,
) -> Result<(), AlgebraError> {
    loop {
        let reduce_top = ops.last().is_some_and(|top| {
            let top_prec = top.precedence();
            top_prec > d.precedence || (top_prec == d.precedence && d.left_assoc)
        });
        if !reduce_top {
            break;
        }
        if let Some(op) = ops.pop() {
            reduce(output, op)?;
        }
    }
    ops.push(StackOp::Binary(t.clone()));
    Ok(())
}

fn push_implicit_mul(
    output: &mut Vec<Node>,
    ops: &mut Vec<StackOp>,
    column: usize,
) -> Result<(), AlgebraError> {
    let d = OperatorDescriptor {
        precedence: 4,
        left_assoc: true,
        prefix: false,
        postfix: false,
        operation: "multiply".to_string(),
    };
    let t = Token::operator("*", column, d.clone());
    shunt_binary(output, ops, &t, &d)
}

fn reduce(output: &mut Vec<Node>, op: StackOp) -> Result<(), AlgebraError> {
    match op {
        StackOp::Prefix(t) => {
            let child = pop_operand(output, &t)?;
            output.push(Node::Unary {
                op: t,
                child: Box::new(child),
            });
        }
        StackOp::Binary(t) => {
            let right = pop_operand(output, &t)?;
            let left = pop_operand(output, &t)?;
            output.push(Node::Binary {
                op: t,
                left: Box::new(left),
                right: Box::new(right),
            });
        }
    }
    Ok(())
}

fn pop_operand(output: &mut Vec<Node>, op: &Token) -> Result<Node, AlgebraError> {
    output.pop().ok_or_else(|| {
        AlgebraError::invalid_syntax_at(
            format!("operator '{}' is missing an operand", op.text),
            Span::at(op.column),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Context;
    use crate::parser::tokenizer::tokenize;

    fn tree(input: &str) -> Node {
        let ctx = Context::new();
        let scope = tokenize(input, &ctx).unwrap();
        build_tree(&scope).unwrap()
    }

    fn op_text(node: &Node) -> &str {
        match node {
            Node::Binary { op, .. } | Node::Unary { op, .. } => &op.text,
            Node::Function { name, .. } => &name.text,
            Node::Leaf(t) => &t.text,
        }
    }

    #[test]
    fn precedence_orders_the_tree() {
        // 1 + 2*3 reduces the product below the sum
        let n = tree("1+2*3");
        assert_eq!(op_text(&n), "+");
        if let Node::Binary { right, .. } = &n {
            assert_eq!(op_text(right), "*");
        } else {
            panic!("expected binary node");
        }
    }

    #[test]
    fn power_is_right_associative() {
        // 2^3^2 = 2^(3^2)
        let n = tree("2^3^2");
        if let Node::Binary { op, right, .. } = &n {
            assert_eq!(op.text, "^");
            assert_eq!(op_text(right), "^");
        } else {
            panic!("expected binary node");
        }
    }

    #[test]
    fn prefix_minus_binds_below_power() {
        // -x^2 = -(x^2)
        let n = tree("-x^2");
        if let Node::Unary { op, child } = &n {
            assert_eq!(op.text, "-");
            assert_eq!(op_text(child), "^");
        } else {
            panic!("expected unary node");
        }
    }

    #[test]
    fn double_plus_parses_as_binary_then_prefix() {
        // a++b = a + (+b)
        let n = tree("a++b");
        if let Node::Binary { op, right, .. } = &n {
            assert_eq!(op.text, "+");
            assert!(matches!(right.as_ref(), Node::Unary { op, .. } if op.text == "+"));
        } else {
            panic!("expected binary node");
        }
    }

    #[test]
    fn postfix_factorial_wraps_its_operand() {
        let n = tree("x!");
        assert!(matches!(&n, Node::Unary { op, .. } if op.text == "!"));
    }

    #[test]
    fn functions_bind_their_scope() {
        let n = tree("sin(x)+1");
        if let Node::Binary { left, .. } = &n {
            assert!(matches!(left.as_ref(), Node::Function { name, args } if name.text == "sin" && args.len() == 1));
        } else {
            panic!("expected binary node");
        }
    }

    #[test]
    fn multi_argument_functions_split_on_commas() {
        let n = tree("min(1,2,3)");
        assert!(matches!(&n, Node::Function { args, .. } if args.len() == 3));
    }

    #[test]
    fn operators_without_left_operand_are_rejected() {
        let ctx = Context::new();
        let scope = tokenize("*x", &ctx).unwrap();
        assert!(build_tree(&scope).is_err());
    }
}
