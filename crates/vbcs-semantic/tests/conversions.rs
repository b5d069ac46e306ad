use super::*;
use SpecialType::*;

#[test]
fn test_source_lattice() {
    assert!(classify_source_special(Int32, Int64).is_widening());
    assert!(classify_source_special(Int64, Int32).is_narrowing());
    assert!(classify_source_special(Byte, SByte).is_narrowing());
    assert!(classify_source_special(Int32, Double).is_numeric());
    assert!(classify_source_special(Char, String).is_widening());
    assert!(classify_source_special(Int32, String).is_narrowing());
    assert!(classify_source_special(Object, Int32).is_narrowing());
    assert!(!classify_source_special(Char, Int32).exists());
}

#[test]
fn test_target_rules() {
    assert!(classify_target_special(Int32, Int64, None).is_implicit());
    assert!(classify_target_special(Int64, Int32, None).is_explicit());
    assert!(classify_target_special(Int32, Object, None).contains(TargetConversion::BOXING));
    assert!(classify_target_special(Object, Int32, None).is_unboxing());
    assert!(!classify_target_special(Int32, String, None).exists());
    assert!(!classify_target_special(Boolean, Int32, None).exists());

    let five = ConstValue::Int32(5);
    let narrowed = classify_target_special(Int32, Byte, Some(&five));
    assert!(narrowed.is_implicit());
    assert!(narrowed.is_constant_expression());

    let big = ConstValue::Int32(300);
    assert!(classify_target_special(Int32, Byte, Some(&big)).is_explicit());
}

#[test]
fn test_source_binary_results() {
    assert_eq!(source_binary_result(BinaryOp::Add, Byte, Byte), Some(Byte));
    assert_eq!(source_binary_result(BinaryOp::Add, Byte, SByte), Some(Int16));
    assert_eq!(source_binary_result(BinaryOp::Add, UInt32, Int32), Some(Int64));
    assert_eq!(source_binary_result(BinaryOp::Add, UInt64, Int64), Some(Decimal));
    assert_eq!(source_binary_result(BinaryOp::Divide, Int32, Int32), Some(Double));
    assert_eq!(source_binary_result(BinaryOp::Divide, Decimal, Int32), Some(Decimal));
    assert_eq!(source_binary_result(BinaryOp::IntegerDivide, Int32, Int32), Some(Int32));
    assert_eq!(source_binary_result(BinaryOp::IntegerDivide, Double, Int32), Some(Int64));
    assert_eq!(source_binary_result(BinaryOp::And, Boolean, Boolean), Some(Boolean));
    assert_eq!(source_binary_result(BinaryOp::And, UInt64, Int32), None);
    assert_eq!(source_binary_result(BinaryOp::LeftShift, Byte, Int32), Some(Byte));
    assert_eq!(source_binary_result(BinaryOp::Concatenate, Int32, Int32), Some(String));
}

#[test]
fn test_target_promotion() {
    assert_eq!(target_binary_promotion(Byte, Byte), Some(Int32));
    assert_eq!(target_binary_promotion(UInt32, Int32), Some(Int64));
    assert_eq!(target_binary_promotion(Int32, Double), Some(Double));
    assert_eq!(target_binary_promotion(Decimal, Double), None);
    assert_eq!(target_unary_promotion(Int16), Some(Int32));
}
