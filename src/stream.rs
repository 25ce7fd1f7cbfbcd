//! The token boundary between a token producer and the expression parser.
//!
//! The parser only ever needs one token of lookahead: it peeks at the
//! current token to decide which production applies and advances past it
//! once committed. Any producer (the bundled [`Scanner`] or a statement-level
//! front-end holding its own buffer) plugs in through [`TokenStream`].

use log::info;

use crate::error::Result;
use crate::scanner::Scanner;
use crate::token::{Span, Token, TokenKind};

/// Cursor over a sequence of tokens that always ends in `EOF`.
pub trait TokenStream<'a> {
    /// Current token, not consumed.
    fn peek(&self) -> &Token<'a>;

    /// Consume and return the current token. At `EOF` the cursor stays put
    /// and `EOF` is returned again.
    fn advance(&mut self) -> Token<'a>;

    /// Is the current token of `kind`?
    #[inline]
    fn check(&self, kind: TokenKind) -> bool {
        self.peek().kind == kind
    }

    /// Consume the current token iff it is of `kind`.
    #[inline]
    fn matches(&mut self, kind: TokenKind) -> Option<Token<'a>> {
        if self.check(kind) {
            Some(self.advance())
        } else {
            None
        }
    }

    #[inline]
    fn is_at_end(&self) -> bool {
        self.check(TokenKind::EOF)
    }
}

/// [`TokenStream`] over an owned, fully scanned token vector.
#[derive(Debug, Clone)]
pub struct TokenBuffer<'a> {
    tokens: Vec<Token<'a>>,
    current: usize,
}

impl<'a> TokenBuffer<'a> {
    /// Wrap already scanned tokens. An `EOF` token is appended when the
    /// vector does not end with one.
    pub fn new(mut tokens: Vec<Token<'a>>) -> Self {
        if tokens.last().map(|t| t.kind) != Some(TokenKind::EOF) {
            let end = tokens.last().map_or(0, |t| t.span.end);
            tokens.push(Token::new(TokenKind::EOF, "", Span::new(end, end)));
        }

        Self { tokens, current: 0 }
    }

    /// Scan `src` completely; the first lexical error aborts.
    pub fn from_source(src: &'a str) -> Result<Self> {
        let tokens = Scanner::new(src).collect::<Result<Vec<_>>>()?;

        info!("Buffered {} tokens", tokens.len());

        Ok(Self::new(tokens))
    }

    /// Index of the current token.
    #[inline]
    pub fn position(&self) -> usize {
        self.current
    }

    /// Tokens not yet consumed, `EOF` included.
    pub fn remaining(&self) -> &[Token<'a>] {
        &self.tokens[self.current..]
    }
}

impl<'a> TokenStream<'a> for TokenBuffer<'a> {
    #[inline(always)]
    fn peek(&self) -> &Token<'a> {
        &self.tokens[self.current]
    }

    #[inline(always)]
    fn advance(&mut self) -> Token<'a> {
        let token = self.tokens[self.current];

        if token.kind != TokenKind::EOF {
            self.current += 1;
        }

        token
    }
}
