use super::*;

#[test]
fn test_node_index_sentinel() {
    assert!(NodeIndex::NONE.is_none());
    assert!(NodeIndex(0).is_some());
}

#[test]
fn test_arena_text_of_spanned_node() {
    let mut arena = SourceArena::with_text("Dim x = 5 \\ 2");
    let lit = arena.add_spanned(
        SourceKind::Literal {
            value: ConstValue::Int32(5),
            text: "5".to_string(),
        },
        8,
        9,
    );
    let synthetic = arena.int_literal(2);
    assert_eq!(arena.text(lit), "5");
    assert_eq!(arena.text(synthetic), "");
    assert_eq!(arena.text(NodeIndex::NONE), "");
}

#[test]
fn test_skip_parentheses() {
    let mut arena = SourceArena::new();
    let inner = arena.identifier("x");
    let once = arena.add(SourceKind::Parenthesized { expression: inner });
    let twice = arena.add(SourceKind::Parenthesized { expression: once });
    assert_eq!(arena.skip_parentheses(twice), inner);
    assert_eq!(arena.identifier_text(inner), Some("x"));
}

#[test]
fn test_type_ref_element() {
    let ty = TypeRef::named("Integer").array(1).array(2);
    assert!(ty.is_array());
    assert_eq!(ty.element().array_ranks, vec![1]);
}

#[test]
fn test_compound_assignment_maps_to_binary() {
    assert_eq!(AssignmentOp::Assign.binary_op(), None);
    assert_eq!(AssignmentOp::Concatenate.binary_op(), Some(BinaryOp::Concatenate));
    assert!(BinaryOp::IntegerDivide.is_arithmetic());
    assert!(BinaryOp::LessThan.is_comparison());
}

#[test]
fn test_predefined_cast_names() {
    assert_eq!(PredefinedCast::from_name("CINT"), Some(PredefinedCast::CInt));
    assert_eq!(PredefinedCast::from_name("CFoo"), None);
}

#[test]
fn test_string_literal_builder_doubles_quotes() {
    let mut arena = SourceArena::new();
    let idx = arena.string_literal("a\"b");
    let Some(SourceKind::Literal { text, .. }) = arena.kind(idx) else {
        panic!("expected literal");
    };
    assert_eq!(text, "\"a\"\"b\"");
}
