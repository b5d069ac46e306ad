use super::*;
use crate::symbols::ParameterInfo;

#[test]
fn test_converted_type_defaults_to_static_type() {
    let mut table = SemanticTable::new();
    let node = NodeIndex(3);
    table.set_type(node, TypeId::INT32);
    assert_eq!(table.converted_type(node), Some(TypeId::INT32));
    table.set_converted(node, TypeId::DOUBLE);
    assert_eq!(table.converted_type(node), Some(TypeId::DOUBLE));
    assert_eq!(table.static_type(node), Some(TypeId::INT32));
}

#[test]
fn test_constants_type_their_node() {
    let mut table = SemanticTable::new();
    table.set_constant(NodeIndex(0), ConstValue::Int64(7));
    assert_eq!(table.static_type(NodeIndex(0)), Some(TypeId::INT64));
    assert_eq!(table.constant_value(NodeIndex(0)), Some(ConstValue::Int64(7)));
}

#[test]
fn test_symbols_type_referencing_nodes() {
    let mut table = SemanticTable::new();
    let local = table.add_symbol(Symbol::local("count", TypeId::INT32));
    let method = table.add_symbol(Symbol::method(
        "Swap",
        TypeId::VOID,
        vec![ParameterInfo::by_ref("a", TypeId::INT32)],
    ));
    table.set_symbol(NodeIndex(1), local);
    table.set_symbol(NodeIndex(2), method);
    assert_eq!(table.static_type(NodeIndex(1)), Some(TypeId::INT32));
    assert_eq!(table.static_type(NodeIndex(2)), None);
    assert!(table.symbol(method).is_some_and(Symbol::has_by_ref_parameters));
}

#[test]
fn test_enum_conversions() {
    let mut table = SemanticTable::new();
    let color = table.add_enum("Color", None, TypeId::INT32);
    let to_int = table.classify_target_conversion(color, TypeId::INT32, None);
    assert!(to_int.is_explicit() && to_int.is_enumeration());
    assert!(table.classify_source_conversion(color, TypeId::INT64).is_widening());
    assert!(table.classify_source_conversion(TypeId::INT32, color).is_narrowing());
}

#[test]
fn test_interned_composite_types() {
    let mut table = SemanticTable::new();
    let array = table.array_of(TypeId::INT32, 1);
    assert_eq!(table.array_of(TypeId::INT32, 1), array);
    assert_ne!(table.array_of(TypeId::INT32, 2), array);
    let nullable = table.nullable_of(TypeId::INT32);
    assert!(table.classify_target_conversion(TypeId::INT32, nullable, None).is_implicit());
}

#[test]
fn test_flow_facts() {
    let mut table = SemanticTable::new();
    let ret = table.add_symbol(Symbol::new("F", SymbolKind::FunctionReturnValue, TypeId::INT32));
    table.record_write(NodeIndex(10), ret);
    table.record_read(NodeIndex(11), ret);
    table.set_end_unreachable(NodeIndex(11));

    let flow = table.analyze_data_flow(&[NodeIndex(10), NodeIndex(11)]);
    assert!(flow.writes(ret));
    assert!(flow.reads(ret));
    assert!(!table.analyze_control_flow(&[NodeIndex(10), NodeIndex(11)]).end_point_reachable);
    assert!(table.analyze_control_flow(&[NodeIndex(10)]).end_point_reachable);
}

#[test]
fn test_overrides_win() {
    let mut table = SemanticTable::new();
    let base = table.add_class("Animal", None);
    let derived = table.add_class("Dog", None);
    table.set_target_conversion(
        derived,
        base,
        TargetConversion::EXISTS | TargetConversion::IMPLICIT | TargetConversion::REFERENCE,
    );
    assert!(table.classify_target_conversion(derived, base, None).is_implicit());
    assert!(table.classify_target_conversion(base, derived, None).is_explicit());
}
