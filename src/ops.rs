//! Operator semantics over known [`Value`]s.
//!
//! These are the rules constant folding applies, so they follow the
//! scripting language rather than Rust:
//!
//! * `+ - *` stay integral while both sides are integers and the result
//!   fits, and fall back to doubles otherwise. `+` never concatenates.
//! * `/` always yields a double; `\` and `Mod` truncate both operands first.
//! * Logical operators are bitwise over 64-bit integers. `True` is `-1`, so
//!   on two Booleans the bitwise result is exactly the truth table, and it
//!   is handed back as a Boolean.
//! * `Null` propagates, except where the other operand alone decides a
//!   logical result (`Null And False` is `False`).

use log::debug;
use serde::Serialize;
use std::cmp::Ordering;

use crate::error::EvalError;
use crate::token::TokenKind;
use crate::value::{date_to_serial, parse_date_str, parse_numeric_str, serial_to_date, Number, Value};

type OpResult = Result<Value, EvalError>;

/// Every infix operator of the ladder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum BinaryOp {
    Imp,
    Eqv,
    Xor,
    Or,
    And,
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    Concat,
    Add,
    Subtract,
    Modulo,
    IntDivide,
    Multiply,
    Divide,
    Power,
}

impl BinaryOp {
    pub fn from_token_kind(kind: TokenKind) -> Option<Self> {
        let op = match kind {
            TokenKind::IMP => BinaryOp::Imp,
            TokenKind::EQV => BinaryOp::Eqv,
            TokenKind::XOR => BinaryOp::Xor,
            TokenKind::OR => BinaryOp::Or,
            TokenKind::AND => BinaryOp::And,
            TokenKind::EQUAL => BinaryOp::Equal,
            TokenKind::NOT_EQUAL => BinaryOp::NotEqual,
            TokenKind::LESS => BinaryOp::Less,
            TokenKind::LESS_EQUAL => BinaryOp::LessEqual,
            TokenKind::GREATER => BinaryOp::Greater,
            TokenKind::GREATER_EQUAL => BinaryOp::GreaterEqual,
            TokenKind::AMPERSAND => BinaryOp::Concat,
            TokenKind::PLUS => BinaryOp::Add,
            TokenKind::MINUS => BinaryOp::Subtract,
            TokenKind::MOD => BinaryOp::Modulo,
            TokenKind::BACKSLASH => BinaryOp::IntDivide,
            TokenKind::STAR => BinaryOp::Multiply,
            TokenKind::SLASH => BinaryOp::Divide,
            TokenKind::CARET => BinaryOp::Power,
            _ => return None,
        };

        Some(op)
    }

    /// Canonical source spelling.
    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOp::Imp => "Imp",
            BinaryOp::Eqv => "Eqv",
            BinaryOp::Xor => "Xor",
            BinaryOp::Or => "Or",
            BinaryOp::And => "And",
            BinaryOp::Equal => "=",
            BinaryOp::NotEqual => "<>",
            BinaryOp::Less => "<",
            BinaryOp::LessEqual => "<=",
            BinaryOp::Greater => ">",
            BinaryOp::GreaterEqual => ">=",
            BinaryOp::Concat => "&",
            BinaryOp::Add => "+",
            BinaryOp::Subtract => "-",
            BinaryOp::Modulo => "Mod",
            BinaryOp::IntDivide => "\\",
            BinaryOp::Multiply => "*",
            BinaryOp::Divide => "/",
            BinaryOp::Power => "^",
        }
    }
}

/// Prefix operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum UnaryOp {
    Negate,
    Plus,
    Not,
}

impl UnaryOp {
    pub fn from_token_kind(kind: TokenKind) -> Option<Self> {
        match kind {
            TokenKind::MINUS => Some(UnaryOp::Negate),
            TokenKind::PLUS => Some(UnaryOp::Plus),
            TokenKind::NOT => Some(UnaryOp::Not),
            _ => None,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            UnaryOp::Negate => "-",
            UnaryOp::Plus => "+",
            UnaryOp::Not => "Not",
        }
    }
}

/// Apply an infix operator to two known values.
pub fn apply_binary(op: BinaryOp, left: &Value, right: &Value) -> OpResult {
    let result = match op {
        BinaryOp::Add | BinaryOp::Subtract | BinaryOp::Multiply | BinaryOp::Divide => {
            arithmetic(op, left, right)
        }

        BinaryOp::IntDivide | BinaryOp::Modulo => integer_division(op, left, right),

        BinaryOp::Power => power(left, right),

        BinaryOp::Concat => Ok(concat(left, right)),

        BinaryOp::Equal
        | BinaryOp::NotEqual
        | BinaryOp::Less
        | BinaryOp::LessEqual
        | BinaryOp::Greater
        | BinaryOp::GreaterEqual => comparison(op, left, right),

        BinaryOp::And | BinaryOp::Or | BinaryOp::Xor | BinaryOp::Eqv | BinaryOp::Imp => {
            logical(op, left, right)
        }
    };

    debug!(
        "apply {:?} {} {:?} => {:?}",
        left,
        op.symbol(),
        right,
        result
    );

    result.map_err(|e| match e {
        EvalError::InvalidOperandType(msg) => EvalError::InvalidOperandType(format!(
            "'{}' on {} and {}: {}",
            op.symbol(),
            left.type_name(),
            right.type_name(),
            msg
        )),
        other => other,
    })
}

/// Apply a prefix operator to a known value.
pub fn apply_unary(op: UnaryOp, operand: &Value) -> OpResult {
    if operand.is_null() {
        return Ok(Value::Null);
    }

    let result = match op {
        UnaryOp::Plus => operand.to_number().map(|_| operand.clone()),

        UnaryOp::Negate => match operand.to_number()? {
            Number::Int(i) => Ok(i
                .checked_neg()
                .map_or_else(|| Value::Float(-(i as f64)), Value::Integer)),
            Number::Float(f) => Ok(Value::Float(-f)),
        },

        UnaryOp::Not => match operand {
            Value::Boolean(b) => Ok(Value::Boolean(!b)),
            other => other.to_integer().map(|i| Value::Integer(!i)),
        },
    };

    debug!("apply {} {:?} => {:?}", op.symbol(), operand, result);

    result
}

// ─────────────────────────── arithmetic ────────────────────────────────────

fn finite(f: f64) -> OpResult {
    if f.is_finite() {
        Ok(Value::Float(f))
    } else {
        Err(EvalError::Overflow)
    }
}

fn arithmetic(op: BinaryOp, left: &Value, right: &Value) -> OpResult {
    if left.is_null() || right.is_null() {
        return Ok(Value::Null);
    }

    if let Some(value) = date_arithmetic(op, left, right)? {
        return Ok(value);
    }

    let l = left.to_number()?;
    let r = right.to_number()?;

    if op == BinaryOp::Divide {
        let divisor = r.as_f64();

        if divisor == 0.0 {
            return Err(EvalError::DivisionByZero);
        }

        return finite(l.as_f64() / divisor);
    }

    if let (Number::Int(a), Number::Int(b)) = (l, r) {
        let exact = match op {
            BinaryOp::Add => a.checked_add(b),
            BinaryOp::Subtract => a.checked_sub(b),
            _ => a.checked_mul(b),
        };

        if let Some(i) = exact {
            return Ok(Value::Integer(i));
        }
    }

    let (a, b) = (l.as_f64(), r.as_f64());

    finite(match op {
        BinaryOp::Add => a + b,
        BinaryOp::Subtract => a - b,
        _ => a * b,
    })
}

/// `Date ± number` moves the date; `Date - Date` is a day count. Anything
/// else is plain numeric arithmetic and yields `None`.
fn date_arithmetic(op: BinaryOp, left: &Value, right: &Value) -> Result<Option<Value>, EvalError> {
    let moved = |serial: f64| {
        serial_to_date(serial)
            .map(|d| Some(Value::Date(d)))
            .ok_or(EvalError::Overflow)
    };

    match (op, left, right) {
        (BinaryOp::Subtract, Value::Date(a), Value::Date(b)) => {
            Ok(Some(Value::Float(date_to_serial(*a) - date_to_serial(*b))))
        }

        (BinaryOp::Add, Value::Date(d), other) | (BinaryOp::Add, other, Value::Date(d)) => {
            moved(date_to_serial(*d) + other.to_number()?.as_f64())
        }

        (BinaryOp::Subtract, Value::Date(d), other) => {
            moved(date_to_serial(*d) - other.to_number()?.as_f64())
        }

        _ => Ok(None),
    }
}

fn integer_division(op: BinaryOp, left: &Value, right: &Value) -> OpResult {
    if left.is_null() || right.is_null() {
        return Ok(Value::Null);
    }

    let a = left.to_integer()?;
    let b = right.to_integer()?;

    if b == 0 {
        return Err(EvalError::DivisionByZero);
    }

    if op == BinaryOp::Modulo {
        // truncating remainder: the sign follows the dividend
        return Ok(Value::Integer(a.wrapping_rem(b)));
    }

    a.checked_div(b)
        .map(Value::Integer)
        .ok_or(EvalError::Overflow)
}

fn power(left: &Value, right: &Value) -> OpResult {
    if left.is_null() || right.is_null() {
        return Ok(Value::Null);
    }

    let base = left.to_number()?;
    let exponent = right.to_number()?;

    if let (Number::Int(b), Number::Int(e)) = (base, exponent) {
        if e >= 0 {
            // these bases never overflow, however large the exponent
            let exact = match b {
                0 => Some(if e == 0 { 1 } else { 0 }),
                1 => Some(1),
                -1 => Some(if e % 2 == 0 { 1 } else { -1 }),
                _ => u32::try_from(e).ok().and_then(|e| b.checked_pow(e)),
            };

            if let Some(i) = exact {
                return Ok(Value::Integer(i));
            }
        }
    }

    let (b, e) = (base.as_f64(), exponent.as_f64());

    if b == 0.0 && e < 0.0 {
        return Err(EvalError::DivisionByZero);
    }

    let p = b.powf(e);

    if p.is_nan() {
        return Err(EvalError::InvalidOperandType(format!(
            "{} cannot be raised to the fractional power {}",
            b, e
        )));
    }

    finite(p)
}

// ─────────────────────────── strings ───────────────────────────────────────

fn concat(left: &Value, right: &Value) -> Value {
    if left.is_null() && right.is_null() {
        return Value::Null;
    }

    Value::String(format!("{}{}", left, right))
}

// ─────────────────────────── comparison ────────────────────────────────────

fn comparison(op: BinaryOp, left: &Value, right: &Value) -> OpResult {
    let Some(ordering) = compare(left, right)? else {
        return Ok(Value::Null);
    };

    let truth = match op {
        BinaryOp::Equal => ordering == Ordering::Equal,
        BinaryOp::NotEqual => ordering != Ordering::Equal,
        BinaryOp::Less => ordering == Ordering::Less,
        BinaryOp::LessEqual => ordering != Ordering::Greater,
        BinaryOp::Greater => ordering == Ordering::Greater,
        _ => ordering != Ordering::Less,
    };

    Ok(Value::Boolean(truth))
}

/// Three-way comparison; `None` when either side is Null.
pub fn compare(left: &Value, right: &Value) -> Result<Option<Ordering>, EvalError> {
    let ordering = match (left, right) {
        (Value::Null, _) | (_, Value::Null) => return Ok(None),

        (Value::String(a), Value::String(b)) => a.as_str().cmp(b.as_str()),

        (Value::String(s), Value::Empty) => s.as_str().cmp(""),
        (Value::Empty, Value::String(s)) => "".cmp(s.as_str()),

        (Value::Date(d), Value::String(s)) => d.cmp(&date_operand(s)?),
        (Value::String(s), Value::Date(d)) => date_operand(s)?.cmp(d),

        (Value::String(s), number) => match parse_numeric_str(s) {
            Some(n) => compare_numbers(n, number.to_number()?),
            None => Ordering::Greater,
        },
        (number, Value::String(s)) => match parse_numeric_str(s) {
            Some(n) => compare_numbers(number.to_number()?, n),
            None => Ordering::Less,
        },

        (Value::Date(a), Value::Date(b)) => a.cmp(b),

        (a, b) => compare_numbers(a.to_number()?, b.to_number()?),
    };

    Ok(Some(ordering))
}

fn date_operand(s: &str) -> Result<chrono::NaiveDateTime, EvalError> {
    parse_date_str(s)
        .ok_or_else(|| EvalError::InvalidOperandType(format!("\"{}\" is not a date", s)))
}

fn compare_numbers(a: Number, b: Number) -> Ordering {
    match (a, b) {
        (Number::Int(x), Number::Int(y)) => x.cmp(&y),
        _ => a
            .as_f64()
            .partial_cmp(&b.as_f64())
            .unwrap_or(Ordering::Equal),
    }
}

// ─────────────────────────── logic ─────────────────────────────────────────

fn bits(op: BinaryOp, a: i64, b: i64) -> i64 {
    match op {
        BinaryOp::And => a & b,
        BinaryOp::Or => a | b,
        BinaryOp::Xor => a ^ b,
        BinaryOp::Eqv => !(a ^ b),
        _ => !a | b,
    }
}

/// Does this pair combine as Booleans rather than as integers?
fn boolean_pair(left: &Value, right: &Value) -> bool {
    matches!(
        (left, right),
        (Value::Boolean(_), Value::Boolean(_))
            | (Value::Boolean(_), Value::Empty)
            | (Value::Empty, Value::Boolean(_))
    )
}

fn logical(op: BinaryOp, left: &Value, right: &Value) -> OpResult {
    if left.is_null() || right.is_null() {
        return logical_with_null(op, left, right);
    }

    let result = bits(op, left.to_integer()?, right.to_integer()?);

    if boolean_pair(left, right) {
        Ok(Value::Boolean(result != 0))
    } else {
        Ok(Value::Integer(result))
    }
}

/// Null is "unknown": the result is known only when the other operand
/// settles it regardless of what Null stands for.
fn logical_with_null(op: BinaryOp, left: &Value, right: &Value) -> OpResult {
    let (known, null_on_left) = match (left, right) {
        (Value::Null, Value::Null) => return Ok(Value::Null),
        (Value::Null, other) => (other, true),
        (other, _) => (other, false),
    };

    let k = known.to_integer()?;

    let settled = match op {
        BinaryOp::And if k == 0 => Some(0),
        BinaryOp::Or if k == -1 => Some(-1),
        // Null Imp True, and False Imp Null
        BinaryOp::Imp if null_on_left && k == -1 => Some(-1),
        BinaryOp::Imp if !null_on_left && k == 0 => Some(-1),
        _ => None,
    };

    Ok(match settled {
        None => Value::Null,
        Some(bits) if matches!(known, Value::Boolean(_) | Value::Empty) => Value::Boolean(bits != 0),
        Some(bits) => Value::Integer(bits),
    })
}
