//! Centralised error hierarchy for the expression front-end.
//!
//! The scanner, the literal reader and the parser (including constant
//! folding) all report failures through [`ParseError`]. Every variant carries
//! the [`Span`] of the offending token so callers can point at the source.
//!
//! Operator application itself knows nothing about source positions; it
//! returns an [`EvalError`] and the parser attaches the operator's span via
//! [`ParseError::from_eval`].
//!
//! The module **does not** print diagnostics itself

use thiserror::Error;

use log::info;

use crate::token::{LiteralKind, Span};

/// Canonical error type used throughout the crate.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum ParseError {
    /// Lexical (scanner) error.
    #[error("[{span}] Error: {message}")]
    Lex { message: String, span: Span },

    /// The token stream does not match the expected production.
    #[error("[{span}] Error at '{found}': {message}")]
    UnexpectedToken {
        /// Lexeme of the token actually found (empty at end of input).
        found: String,

        /// What the parser expected instead.
        message: String,

        span: Span,
    },

    /// Literal text that cannot be read as its declared subkind.
    #[error("[{span}] Error: malformed {kind:?} literal {lexeme}")]
    LiteralFormat {
        kind: LiteralKind,
        lexeme: String,
        span: Span,
    },

    /// Operator applied to operands it is not defined for.
    #[error("[{span}] Error: type mismatch: {message}")]
    InvalidOperandType { message: String, span: Span },

    /// Integer division, modulo or `/` by a literal zero.
    #[error("[{span}] Error: division by zero")]
    DivisionByZero { span: Span },

    /// A folded result that cannot be represented (infinite or NaN).
    #[error("[{span}] Error: overflow")]
    Overflow { span: Span },

    /// Expression nesting deeper than the configured limit.
    #[error("[{span}] Error: expression nested deeper than {limit} levels")]
    RecursionLimit { limit: usize, span: Span },
}

impl ParseError {
    /// Helper constructor for the **scanner**.
    pub fn lex<S: Into<String>>(span: Span, msg: S) -> Self {
        let message: String = msg.into();

        info!("Creating Lex error: span={}, msg={}", span, message);

        ParseError::Lex { message, span }
    }

    /// Helper constructor for grammar violations.
    pub fn unexpected<F: Into<String>, S: Into<String>>(span: Span, found: F, msg: S) -> Self {
        let found: String = found.into();
        let message: String = msg.into();

        info!(
            "Creating UnexpectedToken error: span={}, found={:?}, msg={}",
            span, found, message
        );

        ParseError::UnexpectedToken {
            found,
            message,
            span,
        }
    }

    /// Helper constructor for the **literal reader**.
    pub fn literal_format<S: Into<String>>(span: Span, kind: LiteralKind, lexeme: S) -> Self {
        let lexeme: String = lexeme.into();

        info!(
            "Creating LiteralFormat error: span={}, kind={:?}, lexeme={}",
            span, kind, lexeme
        );

        ParseError::LiteralFormat { kind, lexeme, span }
    }

    /// Attach a source span to a failed operator application.
    pub fn from_eval(err: EvalError, span: Span) -> Self {
        info!("Folding failed at {}: {}", span, err);

        match err {
            EvalError::InvalidOperandType(message) => {
                ParseError::InvalidOperandType { message, span }
            }

            EvalError::DivisionByZero => ParseError::DivisionByZero { span },

            EvalError::Overflow => ParseError::Overflow { span },
        }
    }

    /// Source range the error points at.
    pub fn span(&self) -> Span {
        match self {
            ParseError::Lex { span, .. }
            | ParseError::UnexpectedToken { span, .. }
            | ParseError::LiteralFormat { span, .. }
            | ParseError::InvalidOperandType { span, .. }
            | ParseError::DivisionByZero { span }
            | ParseError::Overflow { span }
            | ParseError::RecursionLimit { span, .. } => *span,
        }
    }
}

/// Failure of a single operator application on known values.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    #[error("{0}")]
    InvalidOperandType(String),

    #[error("division by zero")]
    DivisionByZero,

    #[error("overflow")]
    Overflow,
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, ParseError>;
