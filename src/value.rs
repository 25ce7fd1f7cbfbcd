//! Runtime values carried by folded expressions, and the coercions the
//! operators rely on.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;
use std::fmt;

use crate::error::EvalError;

/// Day zero of the OLE automation date serial (`CDbl(#12/30/1899#) = 0`).
pub fn base_date() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(1899, 12, 30)
        .unwrap_or_default()
        .and_time(NaiveTime::MIN)
}

const MILLIS_PER_DAY: f64 = 86_400_000.0;

const SECONDS_PER_DAY: f64 = 86_400.0;

const DATE_FORMATS: &[&str] = &[
    "%m/%d/%Y",
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%B %d, %Y",
    "%b %d, %Y",
    "%d %B %Y",
    "%d %b %Y",
];

const TIME_FORMATS: &[&str] = &["%H:%M:%S", "%H:%M", "%I:%M:%S %p", "%I:%M %p"];

/// A fully known value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Value {
    /// Uninitialised; `0` in arithmetic, `""` in string contexts.
    Empty,

    /// No valid data; propagates through most operators.
    Null,

    Boolean(bool),

    Integer(i64),

    Float(f64),

    String(String),

    Date(NaiveDateTime),
}

/// Numeric view of a value after coercion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    #[inline]
    pub fn as_f64(self) -> f64 {
        match self {
            Number::Int(i) => i as f64,
            Number::Float(f) => f,
        }
    }

    /// Truncate toward zero; floats outside the `i64` range overflow.
    pub fn truncate(self) -> Result<i64, EvalError> {
        match self {
            Number::Int(i) => Ok(i),
            Number::Float(f) => {
                let t = f.trunc();

                // 2^63 is exactly representable; anything at or above is out
                if !t.is_finite() || t >= 9_223_372_036_854_775_808.0 || t < i64::MIN as f64 {
                    Err(EvalError::Overflow)
                } else {
                    Ok(t as i64)
                }
            }
        }
    }
}

impl From<Number> for Value {
    fn from(n: Number) -> Self {
        match n {
            Number::Int(i) => Value::Integer(i),
            Number::Float(f) => Value::Float(f),
        }
    }
}

impl Value {
    /// Name reported in type mismatch diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Empty => "Empty",
            Value::Null => "Null",
            Value::Boolean(_) => "Boolean",
            Value::Integer(_) => "Integer",
            Value::Float(_) => "Double",
            Value::String(_) => "String",
            Value::Date(_) => "Date",
        }
    }

    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Numeric coercion: Empty is 0, True is -1, dates become their serial
    /// and strings must look like numbers. Null is the caller's business.
    pub fn to_number(&self) -> Result<Number, EvalError> {
        match self {
            Value::Empty => Ok(Number::Int(0)),
            Value::Boolean(b) => Ok(Number::Int(if *b { -1 } else { 0 })),
            Value::Integer(i) => Ok(Number::Int(*i)),
            Value::Float(f) => Ok(Number::Float(*f)),
            Value::Date(d) => Ok(Number::Float(date_to_serial(*d))),
            Value::String(s) => parse_numeric_str(s).ok_or_else(|| {
                EvalError::InvalidOperandType(format!("\"{}\" is not numeric", s))
            }),
            Value::Null => Err(EvalError::InvalidOperandType(
                "invalid use of Null".to_string(),
            )),
        }
    }

    /// Integer coercion used by `\`, `Mod` and bitwise logic.
    pub fn to_integer(&self) -> Result<i64, EvalError> {
        self.to_number()?.truncate()
    }

    /// Source text that reads back as an equal value.
    pub fn to_literal(&self) -> String {
        match self {
            Value::Empty => "Empty".to_string(),
            Value::Null => "Null".to_string(),
            Value::Boolean(true) => "True".to_string(),
            Value::Boolean(false) => "False".to_string(),

            // the magnitude of i64::MIN has no literal of its own
            Value::Integer(i64::MIN) => "(-9223372036854775807 - 1)".to_string(),
            Value::Integer(i) => itoa::Buffer::new().format(*i).to_string(),

            // Debug keeps the fraction ("4.0") so the scanner reads a float
            Value::Float(f) => format!("{:?}", f),

            Value::String(s) => format!("\"{}\"", s.replace('"', "\"\"")),

            Value::Date(d) => {
                if d.date() == base_date().date() && d.time() != NaiveTime::MIN {
                    format!("#{}#", d.format("%H:%M:%S"))
                } else if d.time() == NaiveTime::MIN {
                    format!("#{}#", d.format("%Y-%m-%d"))
                } else {
                    format!("#{}#", d.format("%Y-%m-%d %H:%M:%S"))
                }
            }
        }
    }
}

/// String coercion, as used by `&`.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Empty | Value::Null => Ok(()),
            Value::Boolean(true) => f.write_str("True"),
            Value::Boolean(false) => f.write_str("False"),
            Value::Integer(i) => f.write_str(itoa::Buffer::new().format(*i)),
            Value::Float(x) => f.write_str(&format_float(*x)),
            Value::String(s) => f.write_str(s),
            Value::Date(d) => {
                let on_base = d.date() == base_date().date();
                let midnight = d.time() == NaiveTime::MIN;

                if on_base && midnight {
                    f.write_str("12:00:00 AM")
                } else if on_base {
                    write!(f, "{}", d.format("%-I:%M:%S %p"))
                } else if midnight {
                    write!(f, "{}", d.format("%-m/%-d/%Y"))
                } else {
                    write!(f, "{}", d.format("%-m/%-d/%Y %-I:%M:%S %p"))
                }
            }
        }
    }
}

/// Render a double with at most 15 significant digits: positional for
/// decimal exponents in `-5..15`, `1.5E+20` style otherwise.
pub fn format_float(x: f64) -> String {
    if x == 0.0 {
        return "0".to_string();
    }

    let sci = format!("{:.14e}", x);
    let Some((mantissa, exp)) = sci.split_once('e') else {
        return sci;
    };
    let exp: i32 = exp.parse().unwrap_or(0);

    let negative = mantissa.starts_with('-');
    let digits: String = mantissa.chars().filter(char::is_ascii_digit).collect();
    let digits = digits.trim_end_matches('0');
    let digits = if digits.is_empty() { "0" } else { digits };

    let mut out = String::with_capacity(24);
    if negative {
        out.push('-');
    }

    if !(-5..15).contains(&exp) {
        out.push_str(&digits[..1]);
        if digits.len() > 1 {
            out.push('.');
            out.push_str(&digits[1..]);
        }
        out.push('E');
        out.push(if exp < 0 { '-' } else { '+' });
        out.push_str(&format!("{:02}", exp.abs()));

        return out;
    }

    if exp < 0 {
        out.push_str("0.");
        for _ in 0..(-exp - 1) {
            out.push('0');
        }
        out.push_str(digits);

        return out;
    }

    let int_len = exp as usize + 1;
    if digits.len() <= int_len {
        out.push_str(digits);
        for _ in digits.len()..int_len {
            out.push('0');
        }
    } else {
        out.push_str(&digits[..int_len]);
        out.push('.');
        out.push_str(&digits[int_len..]);
    }

    out
}

/// Read a string the way numeric coercion does: surrounding blanks are
/// ignored and `&H` / `&O` prefixes are honoured.
pub fn parse_numeric_str(s: &str) -> Option<Number> {
    let t = s.trim();

    if t.is_empty() {
        return None;
    }

    if t.len() > 2 && t.as_bytes()[0] == b'&' {
        let radix = match t.as_bytes()[1].to_ascii_uppercase() {
            b'H' => 16,
            b'O' => 8,
            _ => return None,
        };

        return parse_radix(&t[2..], radix).map(Number::Int);
    }

    // f64's parser also takes "inf" and "NaN"; the language does not
    if !t
        .bytes()
        .all(|b| b.is_ascii_digit() || matches!(b, b'.' | b'e' | b'E' | b'+' | b'-'))
    {
        return None;
    }

    if let Ok(i) = t.parse::<i64>() {
        return Some(Number::Int(i));
    }

    t.parse::<f64>()
        .ok()
        .filter(|f| f.is_finite())
        .map(Number::Float)
}

/// Digits of a `&H`/`&O` number, optional trailing `&`. The 64-bit pattern is
/// reinterpreted as signed, so `&HFFFFFFFFFFFFFFFF` is -1.
pub fn parse_radix(digits: &str, radix: u32) -> Option<i64> {
    let digits = digits.strip_suffix('&').unwrap_or(digits);

    if digits.is_empty() {
        return None;
    }

    u64::from_str_radix(digits, radix).ok().map(|u| u as i64)
}

/// Parse the text of a date literal or of a string compared against a date.
pub fn parse_date_str(s: &str) -> Option<NaiveDateTime> {
    let t = s.trim();

    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(t, fmt) {
            return window_year(d.and_time(NaiveTime::MIN));
        }
    }

    for date_fmt in DATE_FORMATS {
        for time_fmt in TIME_FORMATS {
            let fmt = format!("{} {}", date_fmt, time_fmt);

            if let Ok(dt) = NaiveDateTime::parse_from_str(t, &fmt) {
                return window_year(dt);
            }
        }
    }

    TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(t, fmt).ok())
        .map(|time| base_date().date().and_time(time))
}

/// Years below 100 go through the century window: `00`-`29` is 20xx and
/// `30`-`99` is 19xx, so `#1/2/03#` is in 2003.
fn window_year(d: NaiveDateTime) -> Option<NaiveDateTime> {
    match d.year() {
        y @ 0..=29 => d.with_year(y + 2000),
        y @ 30..=99 => d.with_year(y + 1900),
        _ => Some(d),
    }
}

/// OLE serial: whole days since 1899-12-30 plus the time of day as a fraction.
pub fn date_to_serial(d: NaiveDateTime) -> f64 {
    (d - base_date()).num_milliseconds() as f64 / MILLIS_PER_DAY
}

/// Inverse of [`date_to_serial`], rounded to the whole second: dates carry
/// no finer resolution, and `to_literal` writes none.
pub fn serial_to_date(serial: f64) -> Option<NaiveDateTime> {
    let seconds = serial * SECONDS_PER_DAY;

    if !seconds.is_finite() || seconds.abs() > 1.0e14 {
        return None;
    }

    base_date().checked_add_signed(Duration::try_seconds(seconds.round() as i64)?)
}
