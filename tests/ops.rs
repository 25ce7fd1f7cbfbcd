#[cfg(test)]
mod ops_tests {
    use asp_expr as asp;

    use asp::error::EvalError;
    use asp::ops::{apply_binary, apply_unary, BinaryOp, UnaryOp};
    use asp::value::{format_float, Value};
    use chrono::NaiveDate;

    fn int(i: i64) -> Value {
        Value::Integer(i)
    }

    fn string(s: &str) -> Value {
        Value::String(s.to_string())
    }

    fn day(y: i32, m: u32, d: u32) -> Value {
        Value::Date(NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(0, 0, 0).unwrap())
    }

    fn bin(op: BinaryOp, l: Value, r: Value) -> Result<Value, EvalError> {
        apply_binary(op, &l, &r)
    }

    fn is_type_error(result: Result<Value, EvalError>) -> bool {
        matches!(result, Err(EvalError::InvalidOperandType(_)))
    }

    // ── arithmetic ──────────────────────────────────────────────────────

    #[test]
    fn test_ops_01_integer_overflow_widens_to_double() {
        assert_eq!(
            bin(BinaryOp::Add, int(i64::MAX), int(1)),
            Ok(Value::Float(i64::MAX as f64 + 1.0))
        );
        assert_eq!(bin(BinaryOp::Multiply, int(6), int(7)), Ok(int(42)));
    }

    #[test]
    fn test_ops_02_plus_never_concatenates() {
        assert_eq!(bin(BinaryOp::Add, string("1"), string("2")), Ok(int(3)));
        assert!(is_type_error(bin(BinaryOp::Add, string("a"), string("b"))));
    }

    #[test]
    fn test_ops_03_booleans_and_empty_in_arithmetic() {
        assert_eq!(bin(BinaryOp::Add, Value::Boolean(true), int(1)), Ok(int(0)));
        assert_eq!(bin(BinaryOp::Subtract, Value::Empty, int(1)), Ok(int(-1)));
    }

    #[test]
    fn test_ops_04_division_is_always_double() {
        assert_eq!(bin(BinaryOp::Divide, int(4), int(2)), Ok(Value::Float(2.0)));
        assert_eq!(bin(BinaryOp::Divide, int(1), int(2)), Ok(Value::Float(0.5)));
        assert_eq!(
            bin(BinaryOp::Divide, int(1), int(0)),
            Err(EvalError::DivisionByZero)
        );
    }

    #[test]
    fn test_ops_05_integer_division_truncates() {
        assert_eq!(bin(BinaryOp::IntDivide, Value::Float(7.9), int(2)), Ok(int(3)));
        assert_eq!(bin(BinaryOp::IntDivide, int(-7), int(2)), Ok(int(-3)));
        assert_eq!(
            bin(BinaryOp::IntDivide, int(1), Value::Float(0.4)),
            Err(EvalError::DivisionByZero)
        );
    }

    #[test]
    fn test_ops_06_modulo_follows_dividend_sign() {
        assert_eq!(bin(BinaryOp::Modulo, int(-7), int(3)), Ok(int(-1)));
        assert_eq!(bin(BinaryOp::Modulo, int(7), int(-3)), Ok(int(1)));
        assert_eq!(bin(BinaryOp::Modulo, Value::Float(5.9), int(2)), Ok(int(1)));
        assert_eq!(bin(BinaryOp::Modulo, int(i64::MIN), int(-1)), Ok(int(0)));
        assert_eq!(
            bin(BinaryOp::Modulo, int(5), int(0)),
            Err(EvalError::DivisionByZero)
        );
    }

    #[test]
    fn test_ops_07_power() {
        assert_eq!(bin(BinaryOp::Power, int(2), int(10)), Ok(int(1024)));
        assert_eq!(bin(BinaryOp::Power, int(2), int(-1)), Ok(Value::Float(0.5)));
        assert_eq!(
            bin(BinaryOp::Power, Value::Float(2.0), int(2)),
            Ok(Value::Float(4.0))
        );
        assert_eq!(
            bin(BinaryOp::Power, int(0), int(-1)),
            Err(EvalError::DivisionByZero)
        );
        assert!(is_type_error(bin(BinaryOp::Power, int(-8), Value::Float(0.5))));
    }

    #[test]
    fn test_ops_08_float_overflow_is_an_error() {
        assert_eq!(
            bin(BinaryOp::Multiply, Value::Float(1e308), int(10)),
            Err(EvalError::Overflow)
        );
    }

    #[test]
    fn test_ops_09_date_arithmetic() {
        assert_eq!(bin(BinaryOp::Add, day(2003, 1, 2), int(1)), Ok(day(2003, 1, 3)));
        assert_eq!(bin(BinaryOp::Add, int(30), day(2003, 1, 2)), Ok(day(2003, 2, 1)));
        assert_eq!(
            bin(BinaryOp::Subtract, day(2003, 1, 3), day(2003, 1, 2)),
            Ok(Value::Float(1.0))
        );
        assert_eq!(
            bin(BinaryOp::Subtract, day(2003, 1, 3), int(2)),
            Ok(day(2003, 1, 1))
        );
    }

    #[test]
    fn test_ops_10_null_propagates_through_arithmetic() {
        assert_eq!(bin(BinaryOp::Add, Value::Null, int(1)), Ok(Value::Null));
        assert_eq!(bin(BinaryOp::Modulo, int(1), Value::Null), Ok(Value::Null));
        assert_eq!(apply_unary(UnaryOp::Negate, &Value::Null), Ok(Value::Null));
    }

    // ── concatenation ───────────────────────────────────────────────────

    #[test]
    fn test_ops_11_concatenation_stringifies() {
        assert_eq!(
            bin(BinaryOp::Concat, int(1), Value::Boolean(true)),
            Ok(string("1True"))
        );
        assert_eq!(bin(BinaryOp::Concat, Value::Null, string("a")), Ok(string("a")));
        assert_eq!(bin(BinaryOp::Concat, Value::Null, Value::Null), Ok(Value::Null));
        assert_eq!(
            bin(BinaryOp::Concat, Value::Float(0.1 + 0.2), Value::Empty),
            Ok(string("0.3"))
        );
        assert_eq!(
            bin(BinaryOp::Concat, day(2003, 1, 2), string("")),
            Ok(string("1/2/2003"))
        );
    }

    #[test]
    fn test_ops_12_float_display() {
        assert_eq!(format_float(1.0 / 3.0), "0.333333333333333");
        assert_eq!(format_float(1e20), "1E+20");
        assert_eq!(format_float(1.5e-7), "1.5E-07");
        assert_eq!(format_float(123456.0), "123456");
        assert_eq!(format_float(-2.5), "-2.5");
        assert_eq!(format_float(0.00001), "0.00001");
    }

    // ── comparison ──────────────────────────────────────────────────────

    #[test]
    fn test_ops_13_string_comparison_is_ordinal() {
        assert_eq!(
            bin(BinaryOp::Less, string("B"), string("a")),
            Ok(Value::Boolean(true))
        );
        assert_eq!(
            bin(BinaryOp::Equal, string("a"), string("A")),
            Ok(Value::Boolean(false))
        );
    }

    #[test]
    fn test_ops_14_mixed_numeric_comparison() {
        assert_eq!(
            bin(BinaryOp::Equal, int(1), Value::Float(1.0)),
            Ok(Value::Boolean(true))
        );
        assert_eq!(
            bin(BinaryOp::Equal, int(1), string("1")),
            Ok(Value::Boolean(true))
        );
        assert_eq!(
            bin(BinaryOp::Less, int(5), string("abc")),
            Ok(Value::Boolean(true))
        );
        assert_eq!(
            bin(BinaryOp::Less, Value::Boolean(true), Value::Boolean(false)),
            Ok(Value::Boolean(true))
        );
        assert_eq!(
            bin(BinaryOp::Equal, Value::Empty, int(0)),
            Ok(Value::Boolean(true))
        );
        assert_eq!(
            bin(BinaryOp::Equal, Value::Empty, string("")),
            Ok(Value::Boolean(true))
        );
    }

    #[test]
    fn test_ops_15_date_against_string() {
        assert_eq!(
            bin(BinaryOp::Equal, day(2003, 1, 2), string("1/2/2003")),
            Ok(Value::Boolean(true))
        );
        assert!(is_type_error(bin(
            BinaryOp::Less,
            day(2003, 1, 2),
            string("hello")
        )));
    }

    #[test]
    fn test_ops_16_comparison_with_null_is_null() {
        assert_eq!(bin(BinaryOp::Equal, Value::Null, int(1)), Ok(Value::Null));
        assert_eq!(bin(BinaryOp::Equal, Value::Null, Value::Null), Ok(Value::Null));
    }

    // ── logic ───────────────────────────────────────────────────────────

    #[test]
    fn test_ops_17_bitwise_on_integers() {
        assert_eq!(bin(BinaryOp::And, int(12), int(10)), Ok(int(8)));
        assert_eq!(bin(BinaryOp::Or, int(12), int(10)), Ok(int(14)));
        assert_eq!(bin(BinaryOp::Xor, int(12), int(10)), Ok(int(6)));
        assert_eq!(bin(BinaryOp::Eqv, int(12), int(10)), Ok(int(-7)));
        assert_eq!(bin(BinaryOp::Imp, int(12), int(10)), Ok(int(-5)));
        assert_eq!(bin(BinaryOp::And, Value::Boolean(true), int(3)), Ok(int(3)));
    }

    #[test]
    fn test_ops_18_not() {
        assert_eq!(apply_unary(UnaryOp::Not, &int(0)), Ok(int(-1)));
        assert_eq!(
            apply_unary(UnaryOp::Not, &Value::Boolean(true)),
            Ok(Value::Boolean(false))
        );
        assert_eq!(apply_unary(UnaryOp::Not, &Value::Null), Ok(Value::Null));
    }

    #[test]
    fn test_ops_19_null_logic() {
        let t = Value::Boolean(true);
        let f = Value::Boolean(false);
        let n = Value::Null;

        assert_eq!(bin(BinaryOp::And, n.clone(), f.clone()), Ok(f.clone()));
        assert_eq!(bin(BinaryOp::And, n.clone(), t.clone()), Ok(n.clone()));
        assert_eq!(bin(BinaryOp::Or, n.clone(), t.clone()), Ok(t.clone()));
        assert_eq!(bin(BinaryOp::Or, f.clone(), n.clone()), Ok(n.clone()));
        assert_eq!(bin(BinaryOp::Imp, f.clone(), n.clone()), Ok(t.clone()));
        assert_eq!(bin(BinaryOp::Imp, t.clone(), n.clone()), Ok(n.clone()));
        assert_eq!(bin(BinaryOp::Imp, n.clone(), t.clone()), Ok(t.clone()));
        assert_eq!(bin(BinaryOp::Imp, n.clone(), f.clone()), Ok(n.clone()));
        assert_eq!(bin(BinaryOp::Xor, n.clone(), t), Ok(n.clone()));
        assert_eq!(bin(BinaryOp::Eqv, n.clone(), n.clone()), Ok(n));
    }

    // ── unary sign ──────────────────────────────────────────────────────

    #[test]
    fn test_ops_20_sign() {
        assert_eq!(apply_unary(UnaryOp::Negate, &Value::Boolean(true)), Ok(int(1)));
        assert_eq!(apply_unary(UnaryOp::Negate, &Value::Empty), Ok(int(0)));
        assert_eq!(
            apply_unary(UnaryOp::Negate, &int(i64::MIN)),
            Ok(Value::Float(-(i64::MIN as f64)))
        );
        assert_eq!(apply_unary(UnaryOp::Plus, &string("3")), Ok(string("3")));
        assert!(is_type_error(apply_unary(UnaryOp::Plus, &string("abc"))));
        assert!(is_type_error(apply_unary(UnaryOp::Negate, &string("abc"))));
    }

    #[test]
    fn test_ops_21_power_of_unit_bases_stays_integral() {
        assert_eq!(bin(BinaryOp::Power, int(1), int(5_000_000_000)), Ok(int(1)));
        assert_eq!(bin(BinaryOp::Power, int(0), int(5_000_000_000)), Ok(int(0)));
        assert_eq!(bin(BinaryOp::Power, int(0), int(0)), Ok(int(1)));
        assert_eq!(bin(BinaryOp::Power, int(-1), int(5_000_000_000)), Ok(int(1)));
        assert_eq!(bin(BinaryOp::Power, int(-1), int(5_000_000_001)), Ok(int(-1)));
        assert_eq!(
            bin(BinaryOp::Power, int(2), int(5_000_000_000)),
            Err(EvalError::Overflow)
        );
    }

    #[test]
    fn test_ops_22_date_arithmetic_rounds_to_the_second() {
        let noon = Value::Date(
            NaiveDate::from_ymd_opt(2020, 1, 1)
                .unwrap()
                .and_hms_opt(12, 0, 0)
                .unwrap(),
        );

        assert_eq!(
            bin(BinaryOp::Add, day(2020, 1, 1), Value::Float(0.0000001)),
            Ok(day(2020, 1, 1))
        );
        assert_eq!(
            bin(BinaryOp::Add, day(2020, 1, 1), Value::Float(0.5000001)),
            Ok(noon)
        );
    }
}
