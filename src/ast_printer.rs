use crate::expr::Expr;

/// Prints an expression back to source text.
///
/// Every operator node is parenthesised, so the output re-parses to the same
/// grouping no matter how the precedence ladder would read it. Folded nodes
/// print as their literal text.
pub struct AstPrinter;

impl AstPrinter {
    pub fn print(expr: &Expr<'_>) -> String {
        match expr {
            // ── folded values ───────────────────────────────────────────
            Expr::Eval(folded) => {
                let literal = folded.value.to_literal();

                // `-5 ^ x` would read as `-(5 ^ x)`
                if literal.starts_with('-') {
                    format!("({})", literal)
                } else {
                    literal
                }
            }

            // ── names, members, calls ───────────────────────────────────
            Expr::Identifier(name) => name.lexeme.into(),

            Expr::Member { object, name } => format!("{}.{}", Self::print(object), name.lexeme),

            Expr::Call {
                callee, arguments, ..
            } => {
                let mut s = format!("{}(", Self::print(callee));
                for (i, arg) in arguments.iter().enumerate() {
                    if i > 0 {
                        s.push_str(", ");
                    }
                    s.push_str(&Self::print(arg));
                }
                s.push(')');
                s
            }

            // operator nodes bring their own parentheses
            Expr::Grouping { inner, .. } if inner.as_binary().is_some() || inner.as_unary().is_some() => {
                Self::print(inner)
            }

            Expr::Grouping { inner, .. } => format!("({})", Self::print(inner)),

            // ── prefix operators ────────────────────────────────────────
            Expr::Sign(node) => format!("({}{})", node.op.symbol(), Self::print(&node.operand)),

            Expr::Not(node) => format!("(Not {})", Self::print(&node.operand)),

            // ── infix operators ─────────────────────────────────────────
            Expr::Exponent(node)
            | Expr::Multiplicative(node)
            | Expr::IntDivision(node)
            | Expr::Modulo(node)
            | Expr::Additive(node)
            | Expr::Concat(node)
            | Expr::Comparison(node)
            | Expr::And(node)
            | Expr::Or(node)
            | Expr::Xor(node)
            | Expr::Eqv(node)
            | Expr::Imp(node) => format!(
                "({} {} {})",
                Self::print(&node.left),
                node.op.symbol(),
                Self::print(&node.right)
            ),
        }
    }
}
