//! Module `scanner` implements a one-pass lexer for the text of a single
//! code-block expression.
//!
//! It turns a `&str` into a sequence of `Token<'a>`s whose lexemes borrow the
//! source, skipping whitespace, `'` comments and `_` line continuations, and
//! emitting exactly one `EOF` token at the end. It is a `FusedIterator`, so
//! it chains safely with other iterator adapters.
//!
//! # Public API
//!
//! - `Scanner::new(src: &'a str) -> Scanner<'a>`
//!   Create a new lexer over the input text.
//!
//! - `impl Iterator for Scanner<'a>`
//!   Yields `Result<Token<'a>, ParseError>`; `Err` reports a lexing error
//!   with the span of the offending text.
//!
//! # Token Recognition (`scan_token`)
//!
//! - Punctuators: `(`, `)`, `,`, `.`, `:`, `+`, `-`, `*`, `/`, `\`, `^`, `&`, `=`.
//! - Two-character operators: `<>`, `<=`, `>=`.
//! - String literals `"..."` with `""` as an embedded quote; no line breaks.
//! - Date literals `#...#`, kept raw for the literal reader.
//! - Numbers: integer, fraction, `E±digits` exponent, `&H` hex and `&O` octal.
//! - Identifiers/keywords, resolved case-insensitively via a perfect-hash
//!   `KEYWORDS` map; `[bracketed names]` are always identifiers.
//! - Line breaks become `NEWLINE` tokens; statements end there.
//!
//! Literal *values* are not computed here. A malformed hex or date literal
//! is still one token; [`crate::literal::literal_value`] rejects it later
//! with a `LiteralFormat` error.

use crate::error::{ParseError, Result};
use crate::token::{LiteralKind, Span, Token, TokenKind};
use log::{debug, info};
use memchr::memchr;
use phf::phf_map;
use std::iter::FusedIterator;

// ─────────────────────────────────────────────────────────────────────────────
// Static keyword map (compile-time perfect hash, lower-case keys)
// ─────────────────────────────────────────────────────────────────────────────

static KEYWORDS: phf::Map<&'static [u8], TokenKind> = phf_map! {
    b"and"   => TokenKind::AND,
    b"or"    => TokenKind::OR,
    b"not"   => TokenKind::NOT,
    b"xor"   => TokenKind::XOR,
    b"eqv"   => TokenKind::EQV,
    b"imp"   => TokenKind::IMP,
    b"mod"   => TokenKind::MOD,
    b"true"  => TokenKind::LITERAL(LiteralKind::BOOLEAN),
    b"false" => TokenKind::LITERAL(LiteralKind::BOOLEAN),
    b"empty" => TokenKind::LITERAL(LiteralKind::EMPTY),
    b"null"  => TokenKind::LITERAL(LiteralKind::NULL),
};

/// Longest key in [`KEYWORDS`]; longer words skip the lookup entirely.
const MAX_KEYWORD_LEN: usize = 5;

/// Single pass **scanner** over one expression's source text.
pub struct Scanner<'a> {
    src: &'a str,               // whole expression text
    bytes: &'a [u8],            // same text, byte view
    start: usize,               // index of the *first* byte of the current lexeme
    curr: usize,                // index *one past* the last byte examined
    pending: Option<TokenKind>, // recognised token kind waiting to be emitted
}

impl<'a> Scanner<'a> {
    /// Create a new lexer over `src`.
    #[inline]
    pub fn new(src: &'a str) -> Self {
        info!("Scanner created over {} bytes", src.len());

        Self {
            src,
            bytes: src.as_bytes(),
            start: 0,
            curr: 0,
            pending: None,
        }
    }

    // ───────────────────────────── primitive helpers ────────────────────────

    #[inline(always)]
    const fn len(&self) -> usize {
        self.bytes.len()
    }

    #[inline(always)]
    fn is_at_end(&self) -> bool {
        self.curr >= self.len()
    }

    /// Advance one byte and return it. Callers guard with [`Self::is_at_end`].
    #[inline(always)]
    fn advance(&mut self) -> u8 {
        let b = self.bytes[self.curr];
        self.curr += 1;
        b
    }

    /// Current byte, or `0` past the end.
    #[inline(always)]
    fn peek(&self) -> u8 {
        if self.is_at_end() {
            0
        } else {
            self.bytes[self.curr]
        }
    }

    /// Byte after [`Self::peek`], or `0` past the end.
    #[inline(always)]
    fn peek_next(&self) -> u8 {
        if self.curr + 1 >= self.len() {
            0
        } else {
            self.bytes[self.curr + 1]
        }
    }

    #[inline(always)]
    fn match_byte(&mut self, expected: u8) -> bool {
        if !self.is_at_end() && self.peek() == expected {
            self.advance();
            true
        } else {
            false
        }
    }

    #[inline(always)]
    fn span(&self) -> Span {
        Span::new(self.start, self.curr)
    }

    // ───────────────────────────── core lexing ─────────────────────────────

    /// Scan a *single* token starting at `self.curr`. A recognised lexeme
    /// leaves its kind in `self.pending`; whitespace, comments and line
    /// continuations return `Ok(())` with `pending = None`.
    fn scan_token(&mut self) -> Result<()> {
        let b = self.advance();

        match b {
            // ── single-character punctuators ──────────────────────────────
            b'(' => self.pending = Some(TokenKind::LEFT_PAREN),
            b')' => self.pending = Some(TokenKind::RIGHT_PAREN),
            b',' => self.pending = Some(TokenKind::COMMA),
            b':' => self.pending = Some(TokenKind::COLON),
            b'+' => self.pending = Some(TokenKind::PLUS),
            b'-' => self.pending = Some(TokenKind::MINUS),
            b'*' => self.pending = Some(TokenKind::STAR),
            b'/' => self.pending = Some(TokenKind::SLASH),
            b'\\' => self.pending = Some(TokenKind::BACKSLASH),
            b'^' => self.pending = Some(TokenKind::CARET),
            b'=' => self.pending = Some(TokenKind::EQUAL),

            b'.' => {
                if self.peek().is_ascii_digit() {
                    self.parse_number();
                } else {
                    self.pending = Some(TokenKind::DOT);
                }
            }

            // ── two-character operators (<>, <=, >=) ─────────────────────
            b'<' => {
                let kind = if self.match_byte(b'>') {
                    TokenKind::NOT_EQUAL
                } else if self.match_byte(b'=') {
                    TokenKind::LESS_EQUAL
                } else {
                    TokenKind::LESS
                };

                self.pending = Some(kind);
            }

            b'>' => {
                let kind = if self.match_byte(b'=') {
                    TokenKind::GREATER_EQUAL
                } else {
                    TokenKind::GREATER
                };

                self.pending = Some(kind);
            }

            // ── '&' is concatenation unless it opens &H / &O ─────────────
            b'&' => {
                let radix = self.peek().to_ascii_uppercase();

                if (radix == b'H' || radix == b'O') && self.peek_next().is_ascii_alphanumeric() {
                    self.parse_radix_number(radix);
                } else {
                    self.pending = Some(TokenKind::AMPERSAND);
                }
            }

            // ── whitespace / newline ─────────────────────────────────────
            b' ' | b'\t' | b'\r' => {
                if b == b'\r' && self.match_byte(b'\n') {
                    self.pending = Some(TokenKind::NEWLINE);
                }
            }

            b'\n' => self.pending = Some(TokenKind::NEWLINE),

            // ── comments (' … until newline, newline itself kept) ────────
            b'\'' => {
                if let Some(pos) = memchr(b'\n', &self.bytes[self.curr..]) {
                    self.curr += pos;

                    // leave a CRLF pair whole for the NEWLINE token
                    if self.curr > self.start + 1 && self.bytes[self.curr - 1] == b'\r' {
                        self.curr -= 1;
                    }
                } else {
                    self.curr = self.len();
                }
            }

            // ── line continuation: '_' followed by the end of the line ───
            b'_' => return self.parse_continuation(),

            b'"' => return self.parse_string(),

            b'#' => return self.parse_date(),

            b'[' => return self.parse_bracketed_identifier(),

            b'0'..=b'9' => self.parse_number(),

            b'a'..=b'z' | b'A'..=b'Z' => self.parse_identifier(),

            // ── unexpected character ─────────────────────────────────────
            _ => {
                // keep `curr` on a char boundary for the next call
                while self.peek() & 0b1100_0000 == 0b1000_0000 {
                    self.advance();
                }

                return Err(ParseError::lex(
                    self.span(),
                    format!(
                        "Unexpected character: {}",
                        &self.src[self.start..self.curr]
                    ),
                ));
            }
        }

        Ok(())
    }

    /// `_` must be followed by nothing but blanks up to the line break.
    fn parse_continuation(&mut self) -> Result<()> {
        while matches!(self.peek(), b' ' | b'\t') {
            self.advance();
        }

        self.match_byte(b'\r');

        if self.match_byte(b'\n') || self.is_at_end() {
            debug!("Line continuation at {}", self.span());

            return Ok(());
        }

        Err(ParseError::lex(self.span(), "Unexpected character: _"))
    }

    /// Parse a double-quoted string literal; `""` is an escaped quote.
    ///
    /// * `self.start` still points to the opening `"`.
    /// * On success, `self.curr` points **past** the closing `"`.
    fn parse_string(&mut self) -> Result<()> {
        loop {
            match memchr(b'"', &self.bytes[self.curr..]) {
                Some(pos) => {
                    if memchr(b'\n', &self.bytes[self.curr..self.curr + pos]).is_some() {
                        break;
                    }

                    self.curr += pos + 1;

                    if !self.match_byte(b'"') {
                        self.pending = Some(TokenKind::LITERAL(LiteralKind::STRING));

                        return Ok(());
                    }
                }

                None => break,
            }
        }

        // report up to the end of the line
        self.curr = memchr(b'\n', &self.bytes[self.start..])
            .map_or(self.len(), |pos| self.start + pos);

        Err(ParseError::lex(self.span(), "Unterminated string."))
    }

    /// Parse a `#...#` date literal. The text between the hashes is validated
    /// later by the literal reader.
    fn parse_date(&mut self) -> Result<()> {
        while !self.is_at_end() && !matches!(self.peek(), b'#' | b'\n') {
            self.advance();
        }

        if !self.match_byte(b'#') {
            return Err(ParseError::lex(self.span(), "Unterminated date literal."));
        }

        self.pending = Some(TokenKind::LITERAL(LiteralKind::DATE));

        Ok(())
    }

    fn parse_bracketed_identifier(&mut self) -> Result<()> {
        while !self.is_at_end() && !matches!(self.peek(), b']' | b'\n') {
            self.advance();
        }

        if !self.match_byte(b']') {
            return Err(ParseError::lex(self.span(), "Unterminated bracketed name."));
        }

        self.pending = Some(TokenKind::IDENTIFIER);

        Ok(())
    }

    /// Parse a decimal number (`123`, `3.14`, `.5`, `1E+20`).
    fn parse_number(&mut self) {
        let mut kind = LiteralKind::INTEGER;

        // `.5` enters here with the dot already consumed
        if self.bytes[self.start] == b'.' {
            kind = LiteralKind::FLOAT;
        }

        while self.peek().is_ascii_digit() {
            self.advance();
        }

        if kind == LiteralKind::INTEGER && self.peek() == b'.' && self.peek_next().is_ascii_digit()
        {
            kind = LiteralKind::FLOAT;
            self.advance(); // consume "."

            while self.peek().is_ascii_digit() {
                self.advance();
            }
        }

        // Exponent only when digits follow, so `1Eqv` style runs stay apart.
        if matches!(self.peek(), b'e' | b'E') {
            let sign = usize::from(matches!(self.peek_next(), b'+' | b'-'));
            let digit_at = self.curr + 1 + sign;

            if digit_at < self.len() && self.bytes[digit_at].is_ascii_digit() {
                kind = LiteralKind::FLOAT;
                self.curr = digit_at;

                while self.peek().is_ascii_digit() {
                    self.advance();
                }
            }
        }

        self.pending = Some(TokenKind::LITERAL(kind));
    }

    /// Parse `&H..` / `&O..` with an optional trailing `&` type suffix.
    /// Any alphanumeric run is taken so bad digits surface as one malformed
    /// literal instead of a confusing token split.
    fn parse_radix_number(&mut self, radix: u8) {
        self.advance(); // the 'H' / 'O'

        while self.peek().is_ascii_alphanumeric() {
            self.advance();
        }

        self.match_byte(b'&');

        let kind = if radix == b'H' {
            LiteralKind::HEX
        } else {
            LiteralKind::OCTAL
        };

        self.pending = Some(TokenKind::LITERAL(kind));
    }

    /// Parse an identifier and decide if it is a **keyword** or a generic
    /// `IDENTIFIER` token.
    fn parse_identifier(&mut self) {
        while {
            let c: u8 = self.peek();
            c.is_ascii_alphanumeric() || c == b'_'
        } {
            self.advance();
        }

        let slice: &[u8] = &self.bytes[self.start..self.curr];

        let kind = if slice.len() <= MAX_KEYWORD_LEN {
            let mut lower = [0u8; MAX_KEYWORD_LEN];
            let lower = &mut lower[..slice.len()];
            lower.copy_from_slice(slice);
            lower.make_ascii_lowercase();

            KEYWORDS
                .get(&*lower)
                .copied()
                .unwrap_or(TokenKind::IDENTIFIER)
        } else {
            TokenKind::IDENTIFIER
        };

        self.pending = Some(kind);
    }
}

// ───────────────────────── Iterator implementation ─────────────────────────

impl<'a> Iterator for Scanner<'a> {
    type Item = Result<Token<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        while self.curr <= self.len() {
            // EOF guard – emit exactly one EOF then terminate.
            if self.curr == self.len() {
                self.curr += 1; // ensure fused semantics
                let end = self.len();
                return Some(Ok(Token::new(TokenKind::EOF, "", Span::new(end, end))));
            }

            self.start = self.curr;
            self.pending = None;

            if let Err(e) = self.scan_token() {
                return Some(Err(e));
            }

            if let Some(kind) = self.pending.take() {
                let lexeme: &'a str = &self.src[self.start..self.curr];
                debug!("Scanned token ({:?}) at {}", kind, self.span());

                return Some(Ok(Token::new(kind, lexeme, self.span())));
            }
            // Otherwise it was whitespace / comment → continue loop.
        }

        None // already yielded EOF
    }
}

impl<'a> FusedIterator for Scanner<'a> {}
