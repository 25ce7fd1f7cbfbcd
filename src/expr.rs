use serde::Serialize;

use crate::ops::{BinaryOp, UnaryOp};
use crate::token::{Span, Token};
use crate::value::Value;

/// A folded node: the value is fully known at parse time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvalExpr {
    pub value: Value,

    /// Source range of the whole folded subtree.
    pub span: Span,
}

/// Infix operator node whose operands are not all known.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BinaryExpr<'a> {
    pub left: Box<Expr<'a>>,

    pub op: BinaryOp,

    /// The operator token, kept for diagnostics.
    pub operator: Token<'a>,

    pub right: Box<Expr<'a>>,

    /// Height of the subtree rooted here, so it never has to be walked.
    #[serde(skip)]
    pub height: usize,
}

/// Prefix operator node whose operand is not known.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnaryExpr<'a> {
    pub op: UnaryOp,

    pub operator: Token<'a>,

    pub operand: Box<Expr<'a>>,

    #[serde(skip)]
    pub height: usize,
}

/// Expression tree. Every node exclusively owns its children.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Expr<'a> {
    /// Folded constant
    Eval(EvalExpr),

    /// Unresolved name
    Identifier(Token<'a>),

    /// `object.name`
    Member {
        object: Box<Expr<'a>>,
        name: Token<'a>,
    },

    /// `callee(arguments)`; also covers array indexing, which the syntax
    /// cannot tell apart from a call
    Call {
        callee: Box<Expr<'a>>,
        /// The closing `)`.
        paren: Token<'a>,
        arguments: Vec<Expr<'a>>,
    },

    /// Parenthesised deferred expression
    Grouping { inner: Box<Expr<'a>>, span: Span },

    /// Unary `-` / `+`
    Sign(UnaryExpr<'a>),

    /// `^`
    Exponent(BinaryExpr<'a>),

    /// `*` / `/`
    Multiplicative(BinaryExpr<'a>),

    /// `\`
    IntDivision(BinaryExpr<'a>),

    /// `Mod`
    Modulo(BinaryExpr<'a>),

    /// `+` / `-`
    Additive(BinaryExpr<'a>),

    /// `&`
    Concat(BinaryExpr<'a>),

    /// `= <> < <= > >=`
    Comparison(BinaryExpr<'a>),

    Not(UnaryExpr<'a>),

    And(BinaryExpr<'a>),

    Or(BinaryExpr<'a>),

    Xor(BinaryExpr<'a>),

    Eqv(BinaryExpr<'a>),

    Imp(BinaryExpr<'a>),
}

impl<'a> Expr<'a> {
    /// Deferred node of the category `op` belongs to.
    pub fn binary(left: Expr<'a>, op: BinaryOp, operator: Token<'a>, right: Expr<'a>) -> Self {
        let node = BinaryExpr {
            height: 1 + left.height().max(right.height()),
            left: Box::new(left),
            op,
            operator,
            right: Box::new(right),
        };

        match op {
            BinaryOp::Power => Expr::Exponent(node),
            BinaryOp::Multiply | BinaryOp::Divide => Expr::Multiplicative(node),
            BinaryOp::IntDivide => Expr::IntDivision(node),
            BinaryOp::Modulo => Expr::Modulo(node),
            BinaryOp::Add | BinaryOp::Subtract => Expr::Additive(node),
            BinaryOp::Concat => Expr::Concat(node),
            BinaryOp::Equal
            | BinaryOp::NotEqual
            | BinaryOp::Less
            | BinaryOp::LessEqual
            | BinaryOp::Greater
            | BinaryOp::GreaterEqual => Expr::Comparison(node),
            BinaryOp::And => Expr::And(node),
            BinaryOp::Or => Expr::Or(node),
            BinaryOp::Xor => Expr::Xor(node),
            BinaryOp::Eqv => Expr::Eqv(node),
            BinaryOp::Imp => Expr::Imp(node),
        }
    }

    pub fn unary(op: UnaryOp, operator: Token<'a>, operand: Expr<'a>) -> Self {
        let node = UnaryExpr {
            height: 1 + operand.height(),
            op,
            operator,
            operand: Box::new(operand),
        };

        match op {
            UnaryOp::Not => Expr::Not(node),
            UnaryOp::Negate | UnaryOp::Plus => Expr::Sign(node),
        }
    }

    /// The binary payload, whatever the category.
    pub fn as_binary(&self) -> Option<&BinaryExpr<'a>> {
        match self {
            Expr::Exponent(b)
            | Expr::Multiplicative(b)
            | Expr::IntDivision(b)
            | Expr::Modulo(b)
            | Expr::Additive(b)
            | Expr::Concat(b)
            | Expr::Comparison(b)
            | Expr::And(b)
            | Expr::Or(b)
            | Expr::Xor(b)
            | Expr::Eqv(b)
            | Expr::Imp(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_unary(&self) -> Option<&UnaryExpr<'a>> {
        match self {
            Expr::Sign(u) | Expr::Not(u) => Some(u),
            _ => None,
        }
    }

    /// Number of nodes on the longest path down from this one. Operator
    /// nodes answer from their stored height; only postfix and grouping
    /// wrappers, whose nesting the parser bounds, are descended into.
    pub fn height(&self) -> usize {
        match self {
            Expr::Eval(_) | Expr::Identifier(_) => 1,
            Expr::Member { object, .. } => 1 + object.height(),
            Expr::Call {
                callee, arguments, ..
            } => {
                1 + arguments
                    .iter()
                    .map(Expr::height)
                    .fold(callee.height(), usize::max)
            }
            Expr::Grouping { inner, .. } => 1 + inner.height(),
            Expr::Sign(u) | Expr::Not(u) => u.height,
            other => other.as_binary().map_or(1, |b| b.height),
        }
    }

    /// Source range covered by the node.
    pub fn span(&self) -> Span {
        match self {
            Expr::Eval(e) => e.span,
            Expr::Identifier(token) => token.span,
            Expr::Member { object, name } => object.span().to(name.span),
            Expr::Call { callee, paren, .. } => callee.span().to(paren.span),
            Expr::Grouping { span, .. } => *span,
            Expr::Sign(u) | Expr::Not(u) => u.operator.span.to(u.operand.span()),
            other => match other.as_binary() {
                Some(b) => b.left.span().to(b.right.span()),
                None => Span::default(),
            },
        }
    }
}
