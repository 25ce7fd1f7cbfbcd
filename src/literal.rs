//! Reading literal tokens into [`Value`]s.

use log::debug;

use crate::error::{ParseError, Result};
use crate::token::{LiteralKind, Token, TokenKind};
use crate::value::{parse_date_str, parse_radix, Value};

/// Convert a literal token into its value.
///
/// Fails with `LiteralFormat` when the lexeme does not read as its subkind,
/// and with `UnexpectedToken` when handed something that is not a literal.
pub fn literal_value(token: &Token<'_>) -> Result<Value> {
    let TokenKind::LITERAL(kind) = token.kind else {
        return Err(ParseError::unexpected(
            token.span,
            token.lexeme,
            "Expected a literal",
        ));
    };

    let malformed = || ParseError::literal_format(token.span, kind, token.lexeme);
    let text = token.lexeme;

    let value = match kind {
        LiteralKind::INTEGER => match text.parse::<i64>() {
            Ok(i) => Value::Integer(i),

            // too wide for 64 bits: keep it as a double
            Err(_) => text
                .parse::<f64>()
                .ok()
                .filter(|f| f.is_finite() && text.bytes().all(|b| b.is_ascii_digit()))
                .map(Value::Float)
                .ok_or_else(malformed)?,
        },

        LiteralKind::FLOAT => {
            let f: f64 = text.parse().map_err(|_| malformed())?;

            if !f.is_finite() {
                return Err(malformed());
            }

            Value::Float(f)
        }

        LiteralKind::HEX | LiteralKind::OCTAL => {
            let radix = if kind == LiteralKind::HEX { 16 } else { 8 };
            let digits = text.get(2..).ok_or_else(malformed)?;

            Value::Integer(parse_radix(digits, radix).ok_or_else(malformed)?)
        }

        LiteralKind::STRING => {
            let inner = text
                .strip_prefix('"')
                .and_then(|s| s.strip_suffix('"'))
                .ok_or_else(malformed)?;

            Value::String(inner.replace("\"\"", "\""))
        }

        LiteralKind::DATE => {
            let inner = text
                .strip_prefix('#')
                .and_then(|s| s.strip_suffix('#'))
                .ok_or_else(malformed)?;

            Value::Date(parse_date_str(inner).ok_or_else(malformed)?)
        }

        LiteralKind::BOOLEAN => {
            if text.eq_ignore_ascii_case("true") {
                Value::Boolean(true)
            } else if text.eq_ignore_ascii_case("false") {
                Value::Boolean(false)
            } else {
                return Err(malformed());
            }
        }

        LiteralKind::EMPTY => Value::Empty,

        LiteralKind::NULL => Value::Null,
    };

    debug!("Literal {} at {} read as {:?}", text, token.span, value);

    Ok(value)
}
