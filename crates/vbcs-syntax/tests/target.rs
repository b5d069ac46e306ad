use super::*;
use crate::printer::CsPrinter;

fn print(node: &CsNode) -> String {
    CsPrinter::emit_to_string(node)
}

#[test]
fn test_binary_builder_parenthesizes_by_precedence() {
    let sum = CsNode::binary(CsNode::id("a"), "+", CsNode::id("b"));
    let product = CsNode::binary(sum, "*", CsNode::id("c"));
    assert_eq!(print(&product), "(a + b) * c");

    let nested = CsNode::binary(
        CsNode::id("a"),
        "-",
        CsNode::binary(CsNode::id("b"), "-", CsNode::id("c")),
    );
    assert_eq!(print(&nested), "a - (b - c)");

    let left_assoc = CsNode::binary(
        CsNode::binary(CsNode::id("a"), "-", CsNode::id("b")),
        "-",
        CsNode::id("c"),
    );
    assert_eq!(print(&left_assoc), "a - b - c");
}

#[test]
fn test_cast_parenthesizes_operand() {
    assert_eq!(print(&CsNode::cast("double", CsNode::number("5"))), "(double)5");
    let sum = CsNode::binary(CsNode::id("a"), "+", CsNode::id("b"));
    assert_eq!(print(&CsNode::cast("int", sum)), "(int)(a + b)");
    assert_eq!(print(&CsNode::cast("Color", CsNode::number("-1"))), "(Color)(-1)");
}

#[test]
fn test_not_folds_equality() {
    let eq = CsNode::binary(CsNode::id("a"), "==", CsNode::NullLiteral);
    assert_eq!(print(&CsNode::not(eq)), "a != null");

    let call = CsNode::static_call("string", "IsNullOrEmpty", vec![CsNode::id("s")]);
    assert_eq!(print(&CsNode::not(call.clone())), "!string.IsNullOrEmpty(s)");
    assert_eq!(CsNode::not(CsNode::not(call.clone())), call);
}

#[test]
fn test_member_access_on_non_primary_object() {
    let sum = CsNode::binary(CsNode::id("a"), "+", CsNode::id("b"));
    assert_eq!(print(&CsNode::member(sum, "Length")), "(a + b).Length");
    assert_eq!(
        print(&CsNode::member_conditional(CsNode::id("Changed"), "Invoke")),
        "Changed?.Invoke"
    );
}

#[test]
fn test_paren_is_not_doubled() {
    let node = CsNode::id("x").paren().paren();
    assert_eq!(print(&node), "(x)");
    assert_eq!(node.unparenthesized(), &CsNode::id("x"));
}

#[test]
fn test_flatten_sequences() {
    let seq = CsNode::Sequence(vec![
        CsNode::expr_stmt(CsNode::id("a")),
        CsNode::Sequence(vec![CsNode::expr_stmt(CsNode::id("b"))]),
    ]);
    let mut out = Vec::new();
    seq.flatten_into(&mut out);
    assert_eq!(out.len(), 2);
}

#[test]
fn test_conditional_operands() {
    let cond = CsNode::conditional(
        CsNode::binary(CsNode::id("step"), ">=", CsNode::number("0")),
        CsNode::binary(CsNode::id("i"), "<=", CsNode::id("to")),
        CsNode::binary(CsNode::id("i"), ">=", CsNode::id("to")),
    );
    assert_eq!(print(&cond), "step >= 0 ? i <= to : i >= to");
}
