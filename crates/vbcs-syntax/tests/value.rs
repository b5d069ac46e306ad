use super::*;

#[test]
fn test_decimal_parse_and_display() {
    let d = DecimalValue::parse("12.50").expect("valid decimal");
    assert_eq!(d.mantissa, 1250);
    assert_eq!(d.scale, 2);
    assert_eq!(d.to_string(), "12.50");

    let small = DecimalValue::parse("-0.05").expect("valid decimal");
    assert_eq!(small.to_string(), "-0.05");
    assert!(DecimalValue::parse("1.2.3").is_none());
}

#[test]
fn test_decimal_arithmetic_is_exact() {
    let a = DecimalValue::parse("0.1").expect("valid");
    let b = DecimalValue::parse("0.2").expect("valid");
    let sum = a.checked_add(b).expect("no overflow");
    assert_eq!(sum.to_string(), "0.3");
    let product = a.checked_mul(DecimalValue::from_integer(3)).expect("no overflow");
    assert_eq!(product.compare(sum), Some(std::cmp::Ordering::Equal));
}

#[test]
fn test_date_display() {
    assert_eq!(DateValue::date(2000, 1, 2).to_string(), "2000-01-02");
    let with_time = DateValue {
        hour: 13,
        minute: 5,
        ..DateValue::date(1999, 12, 31)
    };
    assert_eq!(with_time.to_string(), "1999-12-31 13:05:00");
}

#[test]
fn test_const_value_classification() {
    assert!(ConstValue::UInt64(u64::MAX).is_integral());
    assert_eq!(ConstValue::UInt64(u64::MAX).as_i128(), Some(i128::from(u64::MAX)));
    assert!(ConstValue::Double(1.5).is_floating());
    assert_eq!(ConstValue::Int16(3).as_f64(), Some(3.0));
    assert!(!ConstValue::String("1".into()).is_numeric());
}
