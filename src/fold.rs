//! Foldability analysis and the fold step the parser runs at every level.
//!
//! Folding is strictly bottom-up: a node is replaced by an [`EvalExpr`] only
//! when every direct child already is one. Since each level folds before
//! returning, "all children are `Eval`" and "the whole subtree is constant"
//! coincide for trees the parser builds. A subtree with an identifier, call
//! or member access anywhere stays deferred, and so does every ancestor.

use log::debug;

use crate::error::{ParseError, Result};
use crate::expr::{EvalExpr, Expr};
use crate::ops::{apply_binary, apply_unary, BinaryOp, UnaryOp};
use crate::token::Token;
use crate::value::Value;

/// Compile-time constness of an expression subtree.
pub trait Foldable {
    /// Is the subtree made only of known values and side-effect-free
    /// operators?
    fn is_foldable(&self) -> bool;

    /// The known value, when the node has already been folded.
    fn folded(&self) -> Option<&Value>;
}

impl Foldable for Expr<'_> {
    fn is_foldable(&self) -> bool {
        match self {
            Expr::Eval(_) => true,

            // names and calls may be anything at run time
            Expr::Identifier(_) | Expr::Member { .. } | Expr::Call { .. } => false,

            Expr::Grouping { inner, .. } => inner.is_foldable(),

            Expr::Sign(u) | Expr::Not(u) => u.operand.is_foldable(),

            other => other
                .as_binary()
                .is_some_and(|b| b.left.is_foldable() && b.right.is_foldable()),
        }
    }

    fn folded(&self) -> Option<&Value> {
        match self {
            Expr::Eval(e) => Some(&e.value),
            _ => None,
        }
    }
}

/// Build the node for `left operator right`, folding it when both operands
/// are known. An operator failure on known operands is an error, never a
/// reason to keep the node.
pub fn fold_binary<'a>(left: Expr<'a>, operator: Token<'a>, right: Expr<'a>) -> Result<Expr<'a>> {
    let Some(op) = BinaryOp::from_token_kind(operator.kind) else {
        return Err(ParseError::unexpected(
            operator.span,
            operator.lexeme,
            "Expected a binary operator",
        ));
    };

    if let (Expr::Eval(l), Expr::Eval(r)) = (&left, &right) {
        let value = apply_binary(op, &l.value, &r.value)
            .map_err(|e| ParseError::from_eval(e, operator.span))?;

        debug!("Folded '{}' at {} into {:?}", op.symbol(), operator.span, value);

        return Ok(Expr::Eval(EvalExpr {
            value,
            span: l.span.to(r.span),
        }));
    }

    debug_assert!(
        !matches!((&left, &right), (Expr::Eval(_), Expr::Eval(_))),
        "constant operands reached a deferred node"
    );

    debug!("Deferred '{}' at {}", op.symbol(), operator.span);

    Ok(Expr::binary(left, op, operator, right))
}

/// Prefix counterpart of [`fold_binary`].
pub fn fold_unary<'a>(operator: Token<'a>, operand: Expr<'a>) -> Result<Expr<'a>> {
    let Some(op) = UnaryOp::from_token_kind(operator.kind) else {
        return Err(ParseError::unexpected(
            operator.span,
            operator.lexeme,
            "Expected a prefix operator",
        ));
    };

    if let Expr::Eval(inner) = &operand {
        let value =
            apply_unary(op, &inner.value).map_err(|e| ParseError::from_eval(e, operator.span))?;

        debug!("Folded '{}' at {} into {:?}", op.symbol(), operator.span, value);

        return Ok(Expr::Eval(EvalExpr {
            value,
            span: operator.span.to(inner.span),
        }));
    }

    debug!("Deferred '{}' at {}", op.symbol(), operator.span);

    Ok(Expr::unary(op, operator, operand))
}
