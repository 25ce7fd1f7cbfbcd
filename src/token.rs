use log::debug;
use serde::Serialize;
use std::fmt;

/// Half-open `start..end` range of zero-based byte offsets into the source.
///
/// The scanner only accepts ASCII outside string/comment bodies, so for the
/// usual source text these are also character offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    #[inline]
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Smallest span covering both `self` and `other`.
    #[inline]
    pub fn to(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// Subkind of a literal token. The raw text stays in [`Token::lexeme`] and
/// is turned into a value by [`crate::literal::literal_value`].
#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum LiteralKind {
    /// `42`
    INTEGER,

    /// `3.14`, `1E+20`
    FLOAT,

    /// `&HFF`, `&HFF&`
    HEX,

    /// `&O17`, `&O17&`
    OCTAL,

    /// `"text"` (quotes included in the lexeme)
    STRING,

    /// `#1/2/2003#` (hashes included in the lexeme)
    DATE,

    /// `True` / `False`
    BOOLEAN,

    /// `Empty`
    EMPTY,

    /// `Null`
    NULL,
}

/// The different kinds of tokens produced for an expression.
///
/// Keywords are case-insensitive in the source; the kind is the same
/// whatever the spelling.
#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TokenKind {
    /// '('
    LEFT_PAREN,

    /// ')'
    RIGHT_PAREN,

    /// ','
    COMMA,

    /// '.'
    DOT,

    /// ':' statement separator
    COLON,

    /// '+'
    PLUS,

    /// '-'
    MINUS,

    /// '*'
    STAR,

    /// '/'
    SLASH,

    /// '\' integer division
    BACKSLASH,

    /// '^'
    CARET,

    /// '&' concatenation
    AMPERSAND,

    /// '='
    EQUAL,

    /// '<>'
    NOT_EQUAL,

    /// '<'
    LESS,

    /// '<='
    LESS_EQUAL,

    /// '>'
    GREATER,

    /// '>='
    GREATER_EQUAL,

    /// A user-defined name (plain or `[bracketed]`)
    IDENTIFIER,

    /// Any literal; the subkind says how to read the lexeme
    LITERAL(LiteralKind),

    /// 'And'
    AND,

    /// 'Or'
    OR,

    /// 'Not'
    NOT,

    /// 'Xor'
    XOR,

    /// 'Eqv'
    EQV,

    /// 'Imp'
    IMP,

    /// 'Mod'
    MOD,

    /// Line break; statements end here
    NEWLINE,

    /// End-of-input marker
    EOF,
}

impl TokenKind {
    /// Upper-case name of the kind, used by the token dump and diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            TokenKind::LEFT_PAREN => "LEFT_PAREN",
            TokenKind::RIGHT_PAREN => "RIGHT_PAREN",
            TokenKind::COMMA => "COMMA",
            TokenKind::DOT => "DOT",
            TokenKind::COLON => "COLON",
            TokenKind::PLUS => "PLUS",
            TokenKind::MINUS => "MINUS",
            TokenKind::STAR => "STAR",
            TokenKind::SLASH => "SLASH",
            TokenKind::BACKSLASH => "BACKSLASH",
            TokenKind::CARET => "CARET",
            TokenKind::AMPERSAND => "AMPERSAND",
            TokenKind::EQUAL => "EQUAL",
            TokenKind::NOT_EQUAL => "NOT_EQUAL",
            TokenKind::LESS => "LESS",
            TokenKind::LESS_EQUAL => "LESS_EQUAL",
            TokenKind::GREATER => "GREATER",
            TokenKind::GREATER_EQUAL => "GREATER_EQUAL",
            TokenKind::IDENTIFIER => "IDENTIFIER",
            TokenKind::LITERAL(LiteralKind::INTEGER) => "INTEGER",
            TokenKind::LITERAL(LiteralKind::FLOAT) => "FLOAT",
            TokenKind::LITERAL(LiteralKind::HEX) => "HEX",
            TokenKind::LITERAL(LiteralKind::OCTAL) => "OCTAL",
            TokenKind::LITERAL(LiteralKind::STRING) => "STRING",
            TokenKind::LITERAL(LiteralKind::DATE) => "DATE",
            TokenKind::LITERAL(LiteralKind::BOOLEAN) => "BOOLEAN",
            TokenKind::LITERAL(LiteralKind::EMPTY) => "EMPTY",
            TokenKind::LITERAL(LiteralKind::NULL) => "NULL",
            TokenKind::AND => "AND",
            TokenKind::OR => "OR",
            TokenKind::NOT => "NOT",
            TokenKind::XOR => "XOR",
            TokenKind::EQV => "EQV",
            TokenKind::IMP => "IMP",
            TokenKind::MOD => "MOD",
            TokenKind::NEWLINE => "NEWLINE",
            TokenKind::EOF => "EOF",
        }
    }

    #[inline]
    pub fn is_literal(&self) -> bool {
        matches!(self, TokenKind::LITERAL(_))
    }
}

/// A scanned token: its kind, the exact source text and where it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Token<'a> {
    /// The category of this token.
    pub kind: TokenKind,

    /// The exact substring from the source that produced this token.
    pub lexeme: &'a str,

    /// Byte range of the lexeme in the source.
    pub span: Span,
}

impl<'a> Token<'a> {
    pub fn new(kind: TokenKind, lexeme: &'a str, span: Span) -> Self {
        debug!(
            "Creating new token: kind={:?}, lexeme={:?}, span={}",
            kind, lexeme, span
        );

        Self { kind, lexeme, span }
    }
}

impl<'a> fmt::Display for Token<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.kind == TokenKind::NEWLINE {
            return write!(f, "NEWLINE {} {}", self.lexeme.escape_debug(), self.span);
        }

        write!(f, "{} {} {}", self.kind.name(), self.lexeme, self.span)
    }
}
