/*!
Recursive-descent expression parser with constant folding.

Grammar (loosest to tightest; every binary level is left-associative
except `^`)
-----------------------------------------------------------------------

```text
expression     → imp ;
imp            → eqv ( "Imp" eqv )* ;
eqv            → xor ( "Eqv" xor )* ;
xor            → or ( "Xor" or )* ;
or             → and ( "Or" and )* ;
and            → not ( "And" not )* ;
not            → "Not"* comparison ;
comparison     → concat ( ( "=" | "<>" | "<" | "<=" | ">" | ">=" ) concat )* ;
concat         → additive ( "&" additive )* ;
additive       → modulo ( ( "+" | "-" ) modulo )* ;
modulo         → intdiv ( "Mod" intdiv )* ;
intdiv         → multiplicative ( "\" multiplicative )* ;
multiplicative → unary ( ( "*" | "/" ) unary )* ;
unary          → ( "+" | "-" )* exponent ;
exponent       → primary ( "^" unary )? ;
primary        → LITERAL
               | IDENT ( "(" arguments? ")" | "." IDENT )*
               | "(" expression ")" ;
arguments      → expression ( "," expression )* ;
```

The right operand of `^` goes through `unary`, which lands straight back in
`exponent`: that makes `^` right-associative and lets `2 ^ -1` through.

Every level builds its node through [`fold_binary`] / [`fold_unary`], so a
subtree whose operands are all literals comes back as a single
[`Expr::Eval`] before the enclosing level sees it.

### Logging Policy

| Location                      | Level  | Purpose                                   |
|-------------------------------|--------|-------------------------------------------|
| `parse_expression`            | `info` | Lifecycle milestones.                     |
| `parse_expr`                  | `debug`| Entry into a (nested) expression.         |
| fold helpers                  | `debug`| Folded vs deferred decision per operator. |
*/

use std::marker::PhantomData;

use log::{debug, info};

use crate::error::{ParseError, Result};
use crate::expr::{EvalExpr, Expr};
use crate::fold::{fold_binary, fold_unary};
use crate::literal::literal_value;
use crate::stream::{TokenBuffer, TokenStream};
use crate::token::{Token, TokenKind};

/// Parser settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParserConfig {
    /// Deepest allowed nesting of parenthesised expressions, call arguments,
    /// `^` right operands, prefix operator runs and postfix suffix runs.
    pub max_depth: usize,

    /// Tallest deferred tree the parser may build. Flat operator chains
    /// such as `a & b & c & ...` grow the tree without nesting the grammar.
    pub max_height: usize,
}

impl ParserConfig {
    pub const DEFAULT_MAX_DEPTH: usize = 32;

    pub const DEFAULT_MAX_HEIGHT: usize = 1024;
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            max_depth: Self::DEFAULT_MAX_DEPTH,
            max_height: Self::DEFAULT_MAX_HEIGHT,
        }
    }
}

const COMPARISON_OPERATORS: &[TokenKind] = &[
    TokenKind::EQUAL,
    TokenKind::NOT_EQUAL,
    TokenKind::LESS,
    TokenKind::LESS_EQUAL,
    TokenKind::GREATER,
    TokenKind::GREATER_EQUAL,
];

/// Parse one expression from `stream` with the default configuration.
///
/// The stream is left on the first token after the expression.
pub fn parse_expr<'a, S>(stream: &mut S) -> Result<Expr<'a>>
where
    S: TokenStream<'a> + ?Sized,
{
    ExprParser::new(stream, ParserConfig::default()).parse_expr()
}

/// Scan and parse `src` as exactly one expression; trailing line breaks
/// are allowed, anything else after the expression is an error.
pub fn parse_expression(src: &str, config: ParserConfig) -> Result<Expr<'_>> {
    info!("Parsing expression of {} bytes", src.len());

    let mut stream = TokenBuffer::from_source(src)?;
    let expr = ExprParser::new(&mut stream, config).parse_expr()?;

    while stream.matches(TokenKind::NEWLINE).is_some() {}

    if !stream.is_at_end() {
        let token = stream.peek();

        return Err(ParseError::unexpected(
            token.span,
            token.lexeme,
            "Expected end of expression",
        ));
    }

    info!("Parsed expression, folded: {}", matches!(expr, Expr::Eval(_)));

    Ok(expr)
}

/// Expression parser over a borrowed token stream.
pub struct ExprParser<'s, 'a, S: ?Sized> {
    stream: &'s mut S,
    config: ParserConfig,
    depth: usize,
    _tokens: PhantomData<Token<'a>>,
}

impl<'s, 'a, S> ExprParser<'s, 'a, S>
where
    S: TokenStream<'a> + ?Sized,
{
    pub fn new(stream: &'s mut S, config: ParserConfig) -> Self {
        Self {
            stream,
            config,
            depth: 0,
            _tokens: PhantomData,
        }
    }

    // ───────────────────────── public API ─────────────────────────

    /// Parse an expression starting at the current token.
    pub fn parse_expr(&mut self) -> Result<Expr<'a>> {
        debug!("Entering expression at depth {}", self.depth);

        self.nested(Self::parse_imp_expr)
    }

    // ─────────────────────── logical levels ───────────────────────

    fn parse_imp_expr(&mut self) -> Result<Expr<'a>> {
        self.parse_left_assoc(&[TokenKind::IMP], Self::parse_eqv_expr)
    }

    fn parse_eqv_expr(&mut self) -> Result<Expr<'a>> {
        self.parse_left_assoc(&[TokenKind::EQV], Self::parse_xor_expr)
    }

    fn parse_xor_expr(&mut self) -> Result<Expr<'a>> {
        self.parse_left_assoc(&[TokenKind::XOR], Self::parse_or_expr)
    }

    fn parse_or_expr(&mut self) -> Result<Expr<'a>> {
        self.parse_left_assoc(&[TokenKind::OR], Self::parse_and_expr)
    }

    fn parse_and_expr(&mut self) -> Result<Expr<'a>> {
        self.parse_left_assoc(&[TokenKind::AND], Self::parse_not_expr)
    }

    fn parse_not_expr(&mut self) -> Result<Expr<'a>> {
        let operators = self.prefix_operators(&[TokenKind::NOT])?;
        let operand = self.parse_comparison_expr()?;

        self.bounded(Self::apply_prefix(operators, operand)?)
    }

    // ─────────────────────── value levels ─────────────────────────

    fn parse_comparison_expr(&mut self) -> Result<Expr<'a>> {
        self.parse_left_assoc(COMPARISON_OPERATORS, Self::parse_concat_expr)
    }

    fn parse_concat_expr(&mut self) -> Result<Expr<'a>> {
        self.parse_left_assoc(&[TokenKind::AMPERSAND], Self::parse_additive_expr)
    }

    fn parse_additive_expr(&mut self) -> Result<Expr<'a>> {
        self.parse_left_assoc(
            &[TokenKind::PLUS, TokenKind::MINUS],
            Self::parse_modulo_expr,
        )
    }

    fn parse_modulo_expr(&mut self) -> Result<Expr<'a>> {
        self.parse_left_assoc(&[TokenKind::MOD], Self::parse_int_division_expr)
    }

    fn parse_int_division_expr(&mut self) -> Result<Expr<'a>> {
        self.parse_left_assoc(&[TokenKind::BACKSLASH], Self::parse_multiplicative_expr)
    }

    fn parse_multiplicative_expr(&mut self) -> Result<Expr<'a>> {
        self.parse_left_assoc(&[TokenKind::STAR, TokenKind::SLASH], Self::parse_unary_expr)
    }

    fn parse_unary_expr(&mut self) -> Result<Expr<'a>> {
        let operators = self.prefix_operators(&[TokenKind::PLUS, TokenKind::MINUS])?;
        let operand = self.parse_exponent_expr()?;

        self.bounded(Self::apply_prefix(operators, operand)?)
    }

    fn parse_exponent_expr(&mut self) -> Result<Expr<'a>> {
        let base = self.parse_primary_expr()?;

        match self.stream.matches(TokenKind::CARET) {
            Some(operator) => {
                let exponent = self.nested(Self::parse_unary_expr)?;

                self.bounded(fold_binary(base, operator, exponent)?)
            }

            None => Ok(base),
        }
    }

    // ─────────────────────── primary terms ────────────────────────

    fn parse_primary_expr(&mut self) -> Result<Expr<'a>> {
        let token = *self.stream.peek();

        match token.kind {
            TokenKind::LITERAL(_) => {
                self.stream.advance();

                Ok(Expr::Eval(EvalExpr {
                    value: literal_value(&token)?,
                    span: token.span,
                }))
            }

            TokenKind::IDENTIFIER => {
                self.stream.advance();

                self.parse_postfix(Expr::Identifier(token))
            }

            TokenKind::LEFT_PAREN => {
                self.stream.advance();

                let inner = self.parse_expr()?;
                let close = self.consume(TokenKind::RIGHT_PAREN, "Expected ')' after expression")?;
                let span = token.span.to(close.span);

                match inner {
                    Expr::Eval(folded) => Ok(Expr::Eval(EvalExpr {
                        value: folded.value,
                        span,
                    })),
                    deferred => self.bounded(Expr::Grouping {
                        inner: Box::new(deferred),
                        span,
                    }),
                }
            }

            _ => Err(self.unexpected_here("Expected expression")),
        }
    }

    /// Call and member suffixes after a name: `a.b(1)(2).c`.
    fn parse_postfix(&mut self, mut expr: Expr<'a>) -> Result<Expr<'a>> {
        let mut suffixes = 0;

        while matches!(self.stream.peek().kind, TokenKind::LEFT_PAREN | TokenKind::DOT) {
            // a suffix run nests like a prefix run
            if self.depth + suffixes >= self.config.max_depth {
                return Err(self.recursion_limit());
            }

            suffixes += 1;

            if self.stream.matches(TokenKind::LEFT_PAREN).is_some() {
                expr = self.finish_call(expr)?;
            } else if self.stream.matches(TokenKind::DOT).is_some() {
                let name = self.consume(TokenKind::IDENTIFIER, "Expected member name after '.'")?;

                expr = Expr::Member {
                    object: Box::new(expr),
                    name,
                };
            }
        }

        self.bounded(expr)
    }

    fn finish_call(&mut self, callee: Expr<'a>) -> Result<Expr<'a>> {
        let mut arguments: Vec<Expr<'a>> = Vec::new();

        if !self.stream.check(TokenKind::RIGHT_PAREN) {
            loop {
                arguments.push(self.parse_expr()?);

                if self.stream.matches(TokenKind::COMMA).is_none() {
                    break;
                }
            }
        }

        let paren = self.consume(TokenKind::RIGHT_PAREN, "Expected ')' after arguments")?;

        Ok(Expr::Call {
            callee: Box::new(callee),
            paren,
            arguments,
        })
    }

    // ────────────────────── utility helpers ───────────────────────

    /// One left-associative level: `next ( op next )*`, folding as it goes.
    fn parse_left_assoc(
        &mut self,
        operators: &[TokenKind],
        next: fn(&mut Self) -> Result<Expr<'a>>,
    ) -> Result<Expr<'a>> {
        let mut expr = next(self)?;

        while operators.contains(&self.stream.peek().kind) {
            let operator = self.stream.advance();
            let right = next(self)?;

            expr = self.bounded(fold_binary(expr, operator, right)?)?;
        }

        Ok(expr)
    }

    /// Collect a run of prefix operators. The run is bounded like nesting
    /// since a deferred chain becomes a tree just as deep.
    fn prefix_operators(&mut self, kinds: &[TokenKind]) -> Result<Vec<Token<'a>>> {
        let mut operators = Vec::new();

        while kinds.contains(&self.stream.peek().kind) {
            if self.depth + operators.len() >= self.config.max_depth {
                return Err(self.recursion_limit());
            }

            operators.push(self.stream.advance());
        }

        Ok(operators)
    }

    /// Apply queued prefix operators inside-out: the one nearest the
    /// operand first.
    fn apply_prefix(operators: Vec<Token<'a>>, operand: Expr<'a>) -> Result<Expr<'a>> {
        operators
            .into_iter()
            .rev()
            .try_fold(operand, |expr, operator| fold_unary(operator, expr))
    }

    /// Run `f` one nesting level deeper, failing past `max_depth`.
    fn nested(&mut self, f: fn(&mut Self) -> Result<Expr<'a>>) -> Result<Expr<'a>> {
        if self.depth >= self.config.max_depth {
            return Err(self.recursion_limit());
        }

        self.depth += 1;
        let result = f(self);
        self.depth -= 1;

        result
    }

    /// Reject a deferred node taller than `max_height`. Folded nodes are
    /// always a single node and pass.
    fn bounded(&self, expr: Expr<'a>) -> Result<Expr<'a>> {
        if expr.height() <= self.config.max_height {
            return Ok(expr);
        }

        let span = self.stream.peek().span;

        info!("Height limit {} hit at {}", self.config.max_height, span);

        Err(ParseError::RecursionLimit {
            limit: self.config.max_height,
            span,
        })
    }

    fn consume(&mut self, kind: TokenKind, message: &str) -> Result<Token<'a>> {
        match self.stream.matches(kind) {
            Some(token) => Ok(token),
            None => Err(self.unexpected_here(message)),
        }
    }

    fn unexpected_here(&self, message: &str) -> ParseError {
        let token = self.stream.peek();

        let found = match token.kind {
            TokenKind::EOF => "end of input",
            TokenKind::NEWLINE => "end of line",
            _ => token.lexeme,
        };

        ParseError::unexpected(token.span, found, message)
    }

    fn recursion_limit(&self) -> ParseError {
        let span = self.stream.peek().span;

        info!("Recursion limit {} hit at {}", self.config.max_depth, span);

        ParseError::RecursionLimit {
            limit: self.config.max_depth,
            span,
        }
    }
}
