use super::*;
use vbcs_semantic::SemanticTable;
use vbcs_syntax::value::ConstValue;

const PLAIN: ConversionSite = ConversionSite {
    is_constant: false,
    always_explicit: false,
};
const CONSTANT: ConversionSite = ConversionSite {
    is_constant: true,
    always_explicit: false,
};

/// Identifier of `static_type` used where `converted` is expected.
fn typed(arena: &mut SourceArena, table: &mut SemanticTable, static_type: TypeId, converted: TypeId) -> NodeIndex {
    let node = arena.identifier("x");
    table.set_type(node, static_type);
    table.set_converted(node, converted);
    node
}

fn classify(arena: &SourceArena, table: &SemanticTable, node: NodeIndex, site: ConversionSite) -> ConversionKind {
    TypeConversionAnalyzer::new(arena, table).classify(node, None, site)
}

#[test]
fn test_identity_when_types_agree() {
    let mut arena = SourceArena::new();
    let mut table = SemanticTable::new();
    let node = typed(&mut arena, &mut table, TypeId::INT32, TypeId::INT32);
    assert_eq!(classify(&arena, &table, node, PLAIN), ConversionKind::Identity);
    let boxed = typed(&mut arena, &mut table, TypeId::DOUBLE, TypeId::OBJECT);
    assert_eq!(classify(&arena, &table, boxed, PLAIN), ConversionKind::Identity);
}

#[test]
fn test_missing_types_are_unknown() {
    let mut arena = SourceArena::new();
    let table = SemanticTable::new();
    let node = arena.identifier("x");
    assert_eq!(classify(&arena, &table, node, PLAIN), ConversionKind::Unknown);
}

#[test]
fn test_conversions_to_string_and_from_object_use_the_runtime() {
    let mut arena = SourceArena::new();
    let mut table = SemanticTable::new();
    let to_string = typed(&mut arena, &mut table, TypeId::INT32, TypeId::STRING);
    assert_eq!(classify(&arena, &table, to_string, PLAIN), ConversionKind::RuntimeConversion);
    let unboxing = typed(&mut arena, &mut table, TypeId::OBJECT, TypeId::INT32);
    assert_eq!(classify(&arena, &table, unboxing, PLAIN), ConversionKind::RuntimeConversion);
    let object_string = typed(&mut arena, &mut table, TypeId::OBJECT, TypeId::STRING);
    assert_eq!(
        classify(&arena, &table, object_string, PLAIN),
        ConversionKind::RuntimeConversion
    );

    let literal = arena.int_literal(5);
    table.set_constant(literal, ConstValue::Int32(5));
    table.set_converted(literal, TypeId::STRING);
    assert_eq!(classify(&arena, &table, literal, PLAIN), ConversionKind::ConstantFold);
}

#[test]
fn test_numeric_widening_is_a_harmless_cast() {
    let mut arena = SourceArena::new();
    let mut table = SemanticTable::new();
    let node = typed(&mut arena, &mut table, TypeId::INT32, TypeId::INT64);
    assert_eq!(classify(&arena, &table, node, PLAIN), ConversionKind::NonDestructiveCast);
}

#[test]
fn test_numeric_narrowing_is_checked_at_runtime() {
    let mut arena = SourceArena::new();
    let mut table = SemanticTable::new();
    let node = typed(&mut arena, &mut table, TypeId::DOUBLE, TypeId::INT32);
    assert_eq!(classify(&arena, &table, node, PLAIN), ConversionKind::RuntimeConversion);
}

#[test]
fn test_constant_narrowing_in_constant_context() {
    let mut arena = SourceArena::new();
    let mut table = SemanticTable::new();
    let small = arena.int_literal(5);
    table.set_constant(small, ConstValue::Int32(5));
    table.set_converted(small, TypeId::BYTE);
    assert_eq!(classify(&arena, &table, small, CONSTANT), ConversionKind::Identity);

    let large = arena.int_literal(300);
    table.set_constant(large, ConstValue::Int32(300));
    table.set_converted(large, TypeId::BYTE);
    assert_eq!(classify(&arena, &table, large, CONSTANT), ConversionKind::NonDestructiveCast);
    assert_eq!(classify(&arena, &table, large, PLAIN), ConversionKind::ConstantFold);
}

#[test]
fn test_byte_arithmetic_is_promoted_by_the_target() {
    let mut arena = SourceArena::new();
    let mut table = SemanticTable::new();
    let a = typed(&mut arena, &mut table, TypeId::BYTE, TypeId::BYTE);
    let b = typed(&mut arena, &mut table, TypeId::BYTE, TypeId::BYTE);
    let sum = arena.binary(BinaryOp::Add, a, b);
    table.set_type(sum, TypeId::BYTE);
    let analyzer = TypeConversionAnalyzer::new(&arena, &table);
    assert_eq!(analyzer.probe_type(sum), Some(TypeId::INT32));
    assert_eq!(analyzer.classify(sum, None, PLAIN), ConversionKind::RuntimeConversion);
}

#[test]
fn test_enum_conversions_are_casts() {
    let mut arena = SourceArena::new();
    let mut table = SemanticTable::new();
    let color = table.add_enum("Color", None, TypeId::INT32);
    let to_number = typed(&mut arena, &mut table, color, TypeId::INT32);
    assert_eq!(classify(&arena, &table, to_number, PLAIN), ConversionKind::NonDestructiveCast);
    let to_enum = typed(&mut arena, &mut table, TypeId::INT32, color);
    assert_eq!(classify(&arena, &table, to_enum, PLAIN), ConversionKind::NonDestructiveCast);
}

#[test]
fn test_reference_downcast_is_destructive() {
    let mut arena = SourceArena::new();
    let mut table = SemanticTable::new();
    let shape = table.add_class("Shape", None);
    let circle = table.add_class("Circle", None);
    let node = typed(&mut arena, &mut table, shape, circle);
    assert_eq!(classify(&arena, &table, node, PLAIN), ConversionKind::DestructiveCast);
}
