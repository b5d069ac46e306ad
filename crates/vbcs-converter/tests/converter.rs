use super::*;
use crate::driver::{ConvertedUnit, convert_unit};
use vbcs_common::diagnostic_codes;
use vbcs_semantic::{ParameterInfo, SemanticTable, SymbolKind};
use vbcs_syntax::printer::CsPrinter;
use vbcs_syntax::source::{
    Accessor, BinaryOp, CaseBlock, CaseClause, Declarator, EventContainer, HandlesItem, LambdaBody, Modifiers,
    QueryClause, ReDimClause, TypeBlockKind,
};
use vbcs_syntax::value::ConstValue;

// =============================================================================
// Helpers
// =============================================================================

fn method(arena: &mut SourceArena, name: &str, body: Vec<NodeIndex>) -> NodeIndex {
    arena.add(SourceKind::Method {
        name: name.to_string(),
        modifiers: Modifiers::PUBLIC,
        is_function: false,
        type_params: Vec::new(),
        params: Vec::new(),
        return_type: None,
        handles: Vec::new(),
        body: Some(body),
    })
}

fn type_block(arena: &mut SourceArena, kind: TypeBlockKind, name: &str, members: Vec<NodeIndex>) -> NodeIndex {
    arena.add(SourceKind::TypeBlock {
        kind,
        name: name.to_string(),
        modifiers: Modifiers::empty(),
        type_params: Vec::new(),
        inherits: Vec::new(),
        implements: Vec::new(),
        members,
    })
}

fn unit(arena: &mut SourceArena, members: Vec<NodeIndex>) -> NodeIndex {
    arena.add(SourceKind::CompilationUnit {
        options: Vec::new(),
        imports: Vec::new(),
        members,
    })
}

/// `Class Sample` with one `Sub Run` holding `body`.
fn run_method_unit(arena: &mut SourceArena, body: Vec<NodeIndex>) -> NodeIndex {
    let run = method(arena, "Run", body);
    let class = type_block(arena, TypeBlockKind::Class, "Sample", vec![run]);
    unit(arena, vec![class])
}

fn convert(arena: &SourceArena, root: NodeIndex, table: &SemanticTable) -> ConvertedUnit {
    convert_unit(arena, root, Some(table), &ConversionOptions::default(), None).expect("unit converts")
}

fn convert_with(arena: &SourceArena, root: NodeIndex, table: &SemanticTable, options: &ConversionOptions) -> ConvertedUnit {
    convert_unit(arena, root, Some(table), options, None).expect("unit converts")
}

fn printed(unit: &ConvertedUnit) -> String {
    CsPrinter::emit_to_string(&unit.root)
}

fn typed_int(arena: &mut SourceArena, table: &mut SemanticTable, value: i32) -> NodeIndex {
    let literal = arena.int_literal(value);
    table.set_constant(literal, ConstValue::Int32(value));
    literal
}

fn reference(arena: &mut SourceArena, table: &mut SemanticTable, name: &str, symbol: SymbolId) -> NodeIndex {
    let node = arena.identifier(name);
    table.set_symbol(node, symbol);
    node
}

fn local(arena: &mut SourceArena, table: &mut SemanticTable, name: &str, type_id: TypeId) -> NodeIndex {
    let symbol = table.add_symbol(Symbol::local(name, type_id));
    reference(arena, table, name, symbol)
}

fn lambda_parameter(arena: &mut SourceArena, name: &str, type_ref: Option<TypeRef>) -> NodeIndex {
    arena.add(SourceKind::Parameter {
        name: name.to_string(),
        modifiers: Modifiers::empty(),
        type_ref,
        default: None,
    })
}

fn empty_if(arena: &mut SourceArena, condition: NodeIndex) -> NodeIndex {
    arena.add(SourceKind::If {
        condition,
        then_block: Vec::new(),
        else_ifs: Vec::new(),
        else_block: None,
    })
}

/// `Fill(Count)` where `Fill` takes its argument `ByRef` and `Count` is a
/// writable property.
struct ByRefFixture {
    fill: SymbolId,
    count: SymbolId,
}

impl ByRefFixture {
    fn new(table: &mut SemanticTable) -> Self {
        let fill = table.add_symbol(Symbol::method(
            "Fill",
            TypeId::VOID,
            vec![ParameterInfo::by_ref("count", TypeId::INT32)],
        ));
        let count = table.add_symbol(Symbol::property("Count", TypeId::INT32));
        Self { fill, count }
    }

    fn call(&self, arena: &mut SourceArena, table: &mut SemanticTable) -> NodeIndex {
        let callee = reference(arena, table, "Fill", self.fill);
        let argument = reference(arena, table, "Count", self.count);
        arena.invocation(callee, vec![argument])
    }
}

// =============================================================================
// Comparisons
// =============================================================================

#[test]
fn test_is_nothing_becomes_null_check() {
    let mut arena = SourceArena::new();
    let table = SemanticTable::new();
    let x = arena.identifier("x");
    let nothing = arena.nothing();
    let test = arena.binary(BinaryOp::Is, x, nothing);
    let statement = empty_if(&mut arena, test);
    let root = run_method_unit(&mut arena, vec![statement]);

    let output = printed(&convert(&arena, root, &table));
    assert!(output.contains("if (x == null) { }"), "{output}");
}

#[test]
fn test_object_equality_uses_runtime_helper() {
    let mut arena = SourceArena::new();
    let mut table = SemanticTable::new();
    let a = table.add_symbol(Symbol::local("a", TypeId::OBJECT));
    let b = table.add_symbol(Symbol::local("b", TypeId::OBJECT));
    let left = reference(&mut arena, &mut table, "a", a);
    let right = reference(&mut arena, &mut table, "b", b);
    let test = arena.binary(BinaryOp::Equals, left, right);
    let statement = empty_if(&mut arena, test);
    let root = run_method_unit(&mut arena, vec![statement]);

    let unit = convert(&arena, root, &table);
    let output = printed(&unit);
    assert!(
        output.contains("if (Operators.ConditionalCompareObjectEqual(a, b, false)) { }"),
        "{output}"
    );
    assert!(unit.extra_imports.contains("Microsoft.VisualBasic.CompilerServices"));
    assert!(output.starts_with("using Microsoft.VisualBasic.CompilerServices;"), "{output}");
}

#[test]
fn test_string_equal_to_empty_tests_null_or_empty() {
    let mut arena = SourceArena::new();
    let mut table = SemanticTable::new();
    let s = table.add_symbol(Symbol::local("s", TypeId::STRING));
    let left = reference(&mut arena, &mut table, "s", s);
    let empty = arena.string_literal("");
    table.set_constant(empty, ConstValue::String(String::new()));
    let test = arena.binary(BinaryOp::Equals, left, empty);
    let statement = empty_if(&mut arena, test);
    let root = run_method_unit(&mut arena, vec![statement]);

    let output = printed(&convert(&arena, root, &table));
    assert!(output.contains("if (string.IsNullOrEmpty(s)) { }"), "{output}");
}

#[test]
fn test_string_against_number_compares_as_numbers() {
    let mut arena = SourceArena::new();
    let mut table = SemanticTable::new();
    let left = local(&mut arena, &mut table, "s", TypeId::STRING);
    table.set_converted(left, TypeId::DOUBLE);
    let right = local(&mut arena, &mut table, "n", TypeId::INT32);
    table.set_converted(right, TypeId::DOUBLE);
    let test = arena.binary(BinaryOp::Equals, left, right);
    let statement = empty_if(&mut arena, test);
    let root = run_method_unit(&mut arena, vec![statement]);

    let output = printed(&convert(&arena, root, &table));
    assert!(
        output.contains("if (Conversions.ToDouble(s) == (double)n) { }"),
        "{output}"
    );
    assert!(!output.contains("?? \"\""), "{output}");
    assert!(!output.contains("CompareString"), "{output}");
}

#[test]
fn test_compare_text_uses_culture_compare_info() {
    let mut arena = SourceArena::new();
    let mut table = SemanticTable::new();
    let left = local(&mut arena, &mut table, "s", TypeId::STRING);
    let right = local(&mut arena, &mut table, "t", TypeId::STRING);
    let test = arena.binary(BinaryOp::Equals, left, right);
    let statement = empty_if(&mut arena, test);
    let root = run_method_unit(&mut arena, vec![statement]);
    let options = ConversionOptions {
        option_compare_text: true,
        ..ConversionOptions::default()
    };

    let unit = convert_with(&arena, root, &table, &options);
    let output = printed(&unit);
    assert!(
        output.contains(
            "if (CultureInfo.CurrentCulture.CompareInfo.Compare((s ?? \"\"), (t ?? \"\"), \
             CompareOptions.IgnoreCase | CompareOptions.IgnoreKanaType | CompareOptions.IgnoreWidth) == 0) { }"
        ),
        "{output}"
    );
    assert!(unit.extra_imports.contains("System.Globalization"));
}

#[test]
fn test_string_ordering_goes_through_compare_string() {
    let mut arena = SourceArena::new();
    let mut table = SemanticTable::new();
    let left = local(&mut arena, &mut table, "s", TypeId::STRING);
    let right = local(&mut arena, &mut table, "t", TypeId::STRING);
    let test = arena.binary(BinaryOp::LessThan, left, right);
    let statement = empty_if(&mut arena, test);
    let root = run_method_unit(&mut arena, vec![statement]);

    let unit = convert(&arena, root, &table);
    let output = printed(&unit);
    assert!(
        output.contains("if (Operators.CompareString(s, t, false) < 0) { }"),
        "{output}"
    );
    assert!(unit.extra_imports.contains("Microsoft.VisualBasic.CompilerServices"));
}

#[test]
fn test_char_array_compares_as_a_string() {
    let mut arena = SourceArena::new();
    let mut table = SemanticTable::new();
    let char_array = table.array_of(TypeId::CHAR, 1);
    let left = local(&mut arena, &mut table, "chars", char_array);
    let right = local(&mut arena, &mut table, "s", TypeId::STRING);
    let test = arena.binary(BinaryOp::Equals, left, right);
    let statement = empty_if(&mut arena, test);
    let root = run_method_unit(&mut arena, vec![statement]);

    let output = printed(&convert(&arena, root, &table));
    assert!(
        output.contains("if (new string(chars) == (s ?? \"\")) { }"),
        "{output}"
    );
}

// =============================================================================
// By-reference hoisting
// =============================================================================

#[test]
fn test_property_passed_by_ref_is_hoisted_and_written_back() {
    let mut arena = SourceArena::new();
    let mut table = SemanticTable::new();
    let fixture = ByRefFixture::new(&mut table);
    let call = fixture.call(&mut arena, &mut table);
    let statement = arena.expression_statement(call);
    let root = run_method_unit(&mut arena, vec![statement]);

    let output = printed(&convert(&arena, root, &table));
    let declared = output.find("int argCount = Count;").expect(&output);
    let called = output.find("Fill(ref argCount);").expect(&output);
    let written = output.find("Count = argCount;").expect(&output);
    assert!(declared < called && called < written, "{output}");
}

#[test]
fn test_sibling_hoists_get_distinct_names() {
    let mut arena = SourceArena::new();
    let mut table = SemanticTable::new();
    let fixture = ByRefFixture::new(&mut table);
    let first_call = fixture.call(&mut arena, &mut table);
    let first = arena.expression_statement(first_call);
    let second_call = fixture.call(&mut arena, &mut table);
    let second = arena.expression_statement(second_call);
    let root = run_method_unit(&mut arena, vec![first, second]);

    let output = printed(&convert(&arena, root, &table));
    let first_declared = output.find("int argCount = Count;").expect(&output);
    let first_called = output.find("Fill(ref argCount);").expect(&output);
    let second_declared = output.find("int argCount1 = Count;").expect(&output);
    let second_called = output.find("Fill(ref argCount1);").expect(&output);
    assert!(first_declared < first_called, "{output}");
    assert!(first_called < second_declared, "{output}");
    assert!(second_declared < second_called, "{output}");
}

#[test]
fn test_local_passed_by_ref_is_not_hoisted() {
    let mut arena = SourceArena::new();
    let mut table = SemanticTable::new();
    let fixture = ByRefFixture::new(&mut table);
    let total = table.add_symbol(Symbol::local("total", TypeId::INT32));
    let callee = reference(&mut arena, &mut table, "Fill", fixture.fill);
    let argument = reference(&mut arena, &mut table, "total", total);
    let call = arena.invocation(callee, vec![argument]);
    let statement = arena.expression_statement(call);
    let root = run_method_unit(&mut arena, vec![statement]);

    let output = printed(&convert(&arena, root, &table));
    assert!(output.contains("Fill(ref total);"), "{output}");
    assert!(!output.contains("argCount"), "{output}");
}

#[test]
fn test_hoisting_frames_are_balanced_after_conversion() {
    let mut arena = SourceArena::new();
    let mut table = SemanticTable::new();
    let fixture = ByRefFixture::new(&mut table);
    let call = fixture.call(&mut arena, &mut table);
    let statement = arena.expression_statement(call);
    let run = method(&mut arena, "Run", vec![statement]);
    let members = vec![run];

    let mut converter = Converter::new(&arena, &table, ConversionOptions::default());
    let _ = converter.convert_unit_members(&[], &members);
    assert_eq!(converter.context().locals.depth(), 0);
}

#[test]
fn test_each_declarator_hoists_before_its_own_variable() {
    let mut arena = SourceArena::new();
    let mut table = SemanticTable::new();
    let grow = table.add_symbol(Symbol::method(
        "Grow",
        TypeId::INT32,
        vec![ParameterInfo::by_ref("count", TypeId::INT32)],
    ));
    let count = table.add_symbol(Symbol::property("Count", TypeId::INT32));
    let mut declarators = Vec::new();
    for name in ["a", "b"] {
        let callee = reference(&mut arena, &mut table, "Grow", grow);
        let argument = reference(&mut arena, &mut table, "Count", count);
        let call = arena.invocation(callee, vec![argument]);
        let declared = arena.modified_identifier(name);
        declarators.push(Declarator {
            names: vec![declared],
            as_type: Some(TypeRef::named("Integer")),
            as_new: None,
            initializer: Some(call),
        });
    }
    let statement = arena.add(SourceKind::LocalDeclaration {
        modifiers: Modifiers::DIM,
        declarators,
    });
    let root = run_method_unit(&mut arena, vec![statement]);

    let unit = convert(&arena, root, &table);
    let output = printed(&unit);
    let first_hoist = output.find("int argCount = Count;").expect(&output);
    let first = output.find("int a = Grow(ref argCount);").expect(&output);
    let second_hoist = output.find("int argCount1 = Count;").expect(&output);
    let second = output.find("int b = Grow(ref argCount1);").expect(&output);
    assert!(first_hoist < first && first < second_hoist && second_hoist < second, "{output}");
    // Declarations have no statement after them to write back from.
    assert!(!output.contains("Count = argCount"), "{output}");
    assert!(
        !unit
            .diagnostics
            .iter()
            .any(|d| d.code == diagnostic_codes::AMBIGUOUS_BY_REF_HOIST)
    );
}

#[test]
fn test_hoist_in_loop_condition_is_rejected() {
    let mut arena = SourceArena::new();
    let mut table = SemanticTable::new();
    let fixture = ByRefFixture::new(&mut table);
    let condition = fixture.call(&mut arena, &mut table);
    let statement = arena.add(SourceKind::While {
        condition,
        body: Vec::new(),
    });
    let root = run_method_unit(&mut arena, vec![statement]);

    let unit = convert(&arena, root, &table);
    assert!(unit.members.iter().any(|outcome| matches!(
        outcome,
        MemberOutcome::ErrorPlaceholder { message, .. } if message.contains("evaluated on every iteration")
    )));
    assert!(
        unit.diagnostics
            .iter()
            .any(|d| d.code == diagnostic_codes::AMBIGUOUS_BY_REF_HOIST)
    );
}

// =============================================================================
// Statements
// =============================================================================

#[test]
fn test_select_with_distinct_constants_becomes_switch() {
    let mut arena = SourceArena::new();
    let mut table = SemanticTable::new();
    let n = table.add_symbol(Symbol::local("n", TypeId::INT32));
    let selector = reference(&mut arena, &mut table, "n", n);
    let one = typed_int(&mut arena, &mut table, 1);
    let two = typed_int(&mut arena, &mut table, 2);
    let select = arena.add(SourceKind::SelectCase {
        selector,
        cases: vec![
            CaseBlock {
                clauses: vec![CaseClause::Value(one)],
                statements: Vec::new(),
            },
            CaseBlock {
                clauses: vec![CaseClause::Value(two)],
                statements: Vec::new(),
            },
            CaseBlock {
                clauses: vec![CaseClause::Else],
                statements: Vec::new(),
            },
        ],
    });
    let root = run_method_unit(&mut arena, vec![select]);

    let output = printed(&convert(&arena, root, &table));
    assert!(output.contains("switch (n) {"), "{output}");
    assert!(output.contains("case 1:"), "{output}");
    assert!(output.contains("case 2:"), "{output}");
    assert!(output.contains("default:"), "{output}");
    assert_eq!(output.matches("break;").count(), 3, "{output}");
}

#[test]
fn test_select_with_range_becomes_if_chain() {
    let mut arena = SourceArena::new();
    let mut table = SemanticTable::new();
    let n = table.add_symbol(Symbol::local("n", TypeId::INT32));
    let selector = reference(&mut arena, &mut table, "n", n);
    let low = typed_int(&mut arena, &mut table, 1);
    let high = typed_int(&mut arena, &mut table, 5);
    let select = arena.add(SourceKind::SelectCase {
        selector,
        cases: vec![CaseBlock {
            clauses: vec![CaseClause::Range(low, high)],
            statements: Vec::new(),
        }],
    });
    let root = run_method_unit(&mut arena, vec![select]);

    let output = printed(&convert(&arena, root, &table));
    assert!(!output.contains("switch ("), "{output}");
    assert!(output.contains("var switchExpr = n;"), "{output}");
    assert!(
        output.contains("if (switchExpr >= 1 && switchExpr <= 5) { }"),
        "{output}"
    );
}

#[test]
fn test_for_loop_with_constant_bounds() {
    let mut arena = SourceArena::new();
    let mut table = SemanticTable::new();
    let control = arena.modified_identifier("i");
    let from = typed_int(&mut arena, &mut table, 0);
    let to = typed_int(&mut arena, &mut table, 9);
    let statement = arena.add(SourceKind::ForNext {
        control,
        control_type: Some(TypeRef::named("Integer")),
        from,
        to,
        step: None,
        body: Vec::new(),
    });
    let root = run_method_unit(&mut arena, vec![statement]);

    let output = printed(&convert(&arena, root, &table));
    assert!(output.contains("for (int i = 0; i <= 9; i++) { }"), "{output}");
}

#[test]
fn test_for_loop_bound_read_from_a_field_is_evaluated_once() {
    let mut arena = SourceArena::new();
    let mut table = SemanticTable::new();
    let limit = table.add_symbol(Symbol::field("limit", TypeId::INT32));
    let control = arena.modified_identifier("i");
    let from = typed_int(&mut arena, &mut table, 1);
    let to = reference(&mut arena, &mut table, "limit", limit);
    let statement = arena.add(SourceKind::ForNext {
        control,
        control_type: Some(TypeRef::named("Integer")),
        from,
        to,
        step: None,
        body: Vec::new(),
    });
    let root = run_method_unit(&mut arena, vec![statement]);

    let output = printed(&convert(&arena, root, &table));
    assert!(
        output.contains("for (int i = 1, loopTo = limit; i <= loopTo; i++) { }"),
        "{output}"
    );
}

#[test]
fn test_redim_preserve_copies_old_contents() {
    let mut arena = SourceArena::new();
    let mut table = SemanticTable::new();
    let array_type = table.array_of(TypeId::INT32, 1);
    let arr = table.add_symbol(Symbol::local("arr", array_type));
    let target = reference(&mut arena, &mut table, "arr", arr);
    let bound = typed_int(&mut arena, &mut table, 7);
    let statement = arena.add(SourceKind::ReDim {
        preserve: true,
        clauses: vec![ReDimClause {
            target,
            bounds: vec![bound],
        }],
    });
    let root = run_method_unit(&mut arena, vec![statement]);

    let unit = convert(&arena, root, &table);
    let output = printed(&unit);
    let snapshot = output.find("var arrOld = arr;").expect(&output);
    let allocation = output.find("arr = new int[8];").expect(&output);
    let copy = output
        .find("Array.Copy(arrOld, arr, Math.Min(8, arrOld.Length));")
        .expect(&output);
    assert!(snapshot < allocation && allocation < copy, "{output}");
    assert!(output.contains("if (arrOld != null) {"), "{output}");
    assert!(unit.extra_imports.contains("System"));
}

// =============================================================================
// Members
// =============================================================================

#[test]
fn test_function_assigning_its_name_gets_a_return_holder() {
    let mut arena = SourceArena::new();
    let mut table = SemanticTable::new();
    let result = table.add_symbol(Symbol::new("Total", SymbolKind::FunctionReturnValue, TypeId::INT32));
    let target = reference(&mut arena, &mut table, "Total", result);
    let one = typed_int(&mut arena, &mut table, 1);
    let assignment = arena.assignment(target, one);
    table.record_write(assignment, result);
    let function = arena.add(SourceKind::Method {
        name: "Total".to_string(),
        modifiers: Modifiers::PUBLIC,
        is_function: true,
        type_params: Vec::new(),
        params: Vec::new(),
        return_type: Some(TypeRef::named("Integer")),
        handles: Vec::new(),
        body: Some(vec![assignment]),
    });
    let class = type_block(&mut arena, TypeBlockKind::Class, "Sample", vec![function]);
    let root = unit(&mut arena, vec![class]);

    let output = printed(&convert(&arena, root, &table));
    let declared = output.find("int TotalRet = default;").expect(&output);
    let assigned = output.find("TotalRet = 1;").expect(&output);
    let returned = output.find("return TotalRet;").expect(&output);
    assert!(output.contains("public int Total() {"), "{output}");
    assert!(declared < assigned && assigned < returned, "{output}");
}

#[test]
fn test_module_becomes_static_class() {
    let mut arena = SourceArena::new();
    let table = SemanticTable::new();
    let run = method(&mut arena, "Run", Vec::new());
    let module = type_block(&mut arena, TypeBlockKind::Module, "Helpers", vec![run]);
    let root = unit(&mut arena, vec![module]);

    let output = printed(&convert(&arena, root, &table));
    assert!(output.contains("internal static class Helpers {"), "{output}");
    assert!(output.contains("public static void Run() { }"), "{output}");
}

#[test]
fn test_event_without_type_gets_a_delegate() {
    let mut arena = SourceArena::new();
    let table = SemanticTable::new();
    let sender = arena.add(SourceKind::Parameter {
        name: "sender".to_string(),
        modifiers: Modifiers::BY_VAL,
        type_ref: Some(TypeRef::named("Object")),
        default: None,
    });
    let event = arena.add(SourceKind::Event {
        name: "Changed".to_string(),
        modifiers: Modifiers::PUBLIC,
        type_ref: None,
        params: vec![sender],
    });
    let class = type_block(&mut arena, TypeBlockKind::Class, "Model", vec![event]);
    let root = unit(&mut arena, vec![class]);

    let output = printed(&convert(&arena, root, &table));
    assert!(
        output.contains("public delegate void ChangedEventHandler(object sender);"),
        "{output}"
    );
    assert!(output.contains("public event ChangedEventHandler Changed;"), "{output}");
}

#[test]
fn test_auto_property_keeps_accessors() {
    let mut arena = SourceArena::new();
    let table = SemanticTable::new();
    let property = arena.add(SourceKind::Property {
        name: "Title".to_string(),
        modifiers: Modifiers::PUBLIC,
        params: Vec::new(),
        type_ref: Some(TypeRef::named("String")),
        initializer: None,
        getter: None,
        setter: None,
    });
    let read_only = arena.add(SourceKind::Property {
        name: "Id".to_string(),
        modifiers: Modifiers::PUBLIC | Modifiers::READ_ONLY,
        params: Vec::new(),
        type_ref: Some(TypeRef::named("Integer")),
        initializer: None,
        getter: None,
        setter: None,
    });
    let class = type_block(&mut arena, TypeBlockKind::Class, "Model", vec![property, read_only]);
    let root = unit(&mut arena, vec![class]);

    let output = printed(&convert(&arena, root, &table));
    assert!(output.contains("public string Title { get; set; }"), "{output}");
    assert!(output.contains("public int Id { get; }"), "{output}");
}

#[test]
fn test_with_events_field_moves_handlers_in_setter() {
    let mut arena = SourceArena::new();
    let table = SemanticTable::new();
    let name = arena.modified_identifier("btn");
    let field = arena.add(SourceKind::Field {
        modifiers: Modifiers::WITH_EVENTS,
        declarators: vec![Declarator {
            names: vec![name],
            as_type: Some(TypeRef::named("Button")),
            as_new: None,
            initializer: None,
        }],
    });
    let handler = arena.add(SourceKind::Method {
        name: "OnClick".to_string(),
        modifiers: Modifiers::PRIVATE,
        is_function: false,
        type_params: Vec::new(),
        params: Vec::new(),
        return_type: None,
        handles: vec![HandlesItem {
            container: EventContainer::Field("btn".to_string()),
            event: "Click".to_string(),
        }],
        body: Some(Vec::new()),
    });
    let class = type_block(&mut arena, TypeBlockKind::Class, "Form1", vec![field, handler]);
    let root = unit(&mut arena, vec![class]);

    let output = printed(&convert(&arena, root, &table));
    assert!(output.contains("private Button _btn;"), "{output}");
    assert!(output.contains("private Button btn {"), "{output}");
    assert!(output.contains("return _btn;"), "{output}");
    let unsubscribe = output.find("_btn.Click -= OnClick;").expect(&output);
    let assign = output.find("_btn = value;").expect(&output);
    let subscribe = output.find("_btn.Click += OnClick;").expect(&output);
    assert!(unsubscribe < assign && assign < subscribe, "{output}");
    assert!(output.contains("private void OnClick() { }"), "{output}");
}

#[test]
fn test_full_property_setter_uses_value() {
    let mut arena = SourceArena::new();
    let mut table = SemanticTable::new();
    let backing = table.add_symbol(Symbol::field("_size", TypeId::INT32));
    let parameter_symbol = table.add_symbol(Symbol::parameter("v", TypeId::INT32));
    let parameter = arena.add(SourceKind::Parameter {
        name: "v".to_string(),
        modifiers: Modifiers::BY_VAL,
        type_ref: Some(TypeRef::named("Integer")),
        default: None,
    });
    table.declare(parameter, parameter_symbol);
    let target = reference(&mut arena, &mut table, "_size", backing);
    let value = reference(&mut arena, &mut table, "v", parameter_symbol);
    let assignment = arena.assignment(target, value);
    let read = reference(&mut arena, &mut table, "_size", backing);
    let ret = arena.add(SourceKind::Return { expression: Some(read) });
    table.set_end_unreachable(ret);
    let property = arena.add(SourceKind::Property {
        name: "Size".to_string(),
        modifiers: Modifiers::PUBLIC,
        params: Vec::new(),
        type_ref: Some(TypeRef::named("Integer")),
        initializer: None,
        getter: Some(Accessor {
            modifiers: Modifiers::empty(),
            parameter: None,
            body: vec![ret],
        }),
        setter: Some(Accessor {
            modifiers: Modifiers::empty(),
            parameter: Some(parameter),
            body: vec![assignment],
        }),
    });
    let class = type_block(&mut arena, TypeBlockKind::Class, "Box", vec![property]);
    let root = unit(&mut arena, vec![class]);

    let output = printed(&convert(&arena, root, &table));
    assert!(output.contains("public int Size {"), "{output}");
    assert!(output.contains("return _size;"), "{output}");
    assert!(output.contains("_size = value;"), "{output}");
}

// =============================================================================
// Error placeholders
// =============================================================================

#[test]
fn test_unsupported_statement_replaces_only_its_member() {
    let source = "Sub Broken()\n    On Error Resume Next\nEnd Sub";
    let mut arena = SourceArena::with_text(source);
    let table = SemanticTable::new();
    let on_error = arena.add(SourceKind::OnError {
        text: "On Error Resume Next".to_string(),
    });
    let broken = arena.add_spanned(
        SourceKind::Method {
            name: "Broken".to_string(),
            modifiers: Modifiers::PUBLIC,
            is_function: false,
            type_params: Vec::new(),
            params: Vec::new(),
            return_type: None,
            handles: Vec::new(),
            body: Some(vec![on_error]),
        },
        0,
        source.len() as u32,
    );
    let fine = method(&mut arena, "Fine", Vec::new());
    let class = type_block(&mut arena, TypeBlockKind::Class, "Sample", vec![broken, fine]);
    let root = unit(&mut arena, vec![class]);

    let unit = convert(&arena, root, &table);
    let output = printed(&unit);
    assert!(output.contains("/* CONVERSION ERROR: MethodBlock:"), "{output}");
    assert!(output.contains("On Error Resume Next"), "{output}");
    assert!(output.contains("public void Fine() { }"), "{output}");

    let [first, second] = unit.members.as_slice() else {
        panic!("expected two member outcomes, got {:?}", unit.members);
    };
    match first {
        MemberOutcome::ErrorPlaceholder {
            kind, original_text, ..
        } => {
            assert_eq!(kind, "MethodBlock");
            assert_eq!(original_text, source);
        }
        other => panic!("expected a placeholder, got {other:?}"),
    }
    assert!(matches!(second, MemberOutcome::Converted { name, .. } if name == "Sample.Fine"));

    let error = unit.diagnostics.iter().find(|d| d.is_error()).expect("error diagnostic");
    assert_eq!(error.code, diagnostic_codes::UNSUPPORTED_CONSTRUCT);
    assert_eq!(error.member.as_deref(), Some("Sample.Broken"));
}

#[test]
fn test_root_namespace_wraps_members() {
    let mut arena = SourceArena::new();
    let table = SemanticTable::new();
    let class = type_block(&mut arena, TypeBlockKind::Class, "Sample", Vec::new());
    let root = unit(&mut arena, vec![class]);
    let options = ConversionOptions {
        root_namespace: Some("App".to_string()),
        ..ConversionOptions::default()
    };

    let unit = convert_with(&arena, root, &table, &options);
    let output = printed(&unit);
    assert!(output.starts_with("namespace App {"), "{output}");
    assert!(output.contains("internal class Sample { }"), "{output}");
}

// =============================================================================
// Invocations
// =============================================================================

/// `x = <value>` inside `Sample.Run`, with `x` an `Integer` local.
fn assign_to_x(arena: &mut SourceArena, table: &mut SemanticTable, value: NodeIndex) -> NodeIndex {
    let target = local(arena, table, "x", TypeId::INT32);
    let statement = arena.assignment(target, value);
    run_method_unit(arena, vec![statement])
}

#[test]
fn test_array_invocation_becomes_element_access() {
    let mut arena = SourceArena::new();
    let mut table = SemanticTable::new();
    let array_type = table.array_of(TypeId::INT32, 1);
    let arr = local(&mut arena, &mut table, "arr", array_type);
    let index = typed_int(&mut arena, &mut table, 2);
    let access = arena.invocation(arr, vec![index]);
    let root = assign_to_x(&mut arena, &mut table, access);

    let output = printed(&convert(&arena, root, &table));
    assert!(output.contains("x = arr[2];"), "{output}");
}

#[test]
fn test_delegate_invocation_stays_a_call() {
    let mut arena = SourceArena::new();
    let mut table = SemanticTable::new();
    let callback = table.add_delegate("Callback", None);
    let notify = local(&mut arena, &mut table, "notify", callback);
    let argument = typed_int(&mut arena, &mut table, 5);
    let call = arena.invocation(notify, vec![argument]);
    let statement = arena.expression_statement(call);
    let root = run_method_unit(&mut arena, vec![statement]);

    let output = printed(&convert(&arena, root, &table));
    assert!(output.contains("notify(5);"), "{output}");
    assert!(!output.contains("notify["), "{output}");
}

#[test]
fn test_indexed_property_becomes_element_access() {
    let mut arena = SourceArena::new();
    let mut table = SemanticTable::new();
    let items = table.add_symbol(
        Symbol::property("Items", TypeId::INT32).with_parameters(vec![ParameterInfo::new("index", TypeId::INT32)]),
    );
    let callee = reference(&mut arena, &mut table, "Items", items);
    let index = typed_int(&mut arena, &mut table, 0);
    let access = arena.invocation(callee, vec![index]);
    let root = assign_to_x(&mut arena, &mut table, access);

    let output = printed(&convert(&arena, root, &table));
    assert!(output.contains("x = Items[0];"), "{output}");
}

#[test]
fn test_named_default_property_indexes_this() {
    let mut arena = SourceArena::new();
    let mut table = SemanticTable::new();
    let item = table.add_symbol(
        Symbol::new(
            "Item",
            SymbolKind::Property {
                is_default: true,
                is_read_only: true,
            },
            TypeId::INT32,
        )
        .with_parameters(vec![ParameterInfo::new("index", TypeId::INT32)]),
    );
    let callee = reference(&mut arena, &mut table, "Item", item);
    let index = typed_int(&mut arena, &mut table, 0);
    let access = arena.invocation(callee, vec![index]);
    table.set_symbol(access, item);
    let root = assign_to_x(&mut arena, &mut table, access);

    let output = printed(&convert(&arena, root, &table));
    assert!(output.contains("x = this[0];"), "{output}");
}

#[test]
fn test_method_named_without_parentheses_is_called() {
    let mut arena = SourceArena::new();
    let mut table = SemanticTable::new();
    let compute = table.add_symbol(Symbol::method("Compute", TypeId::INT32, Vec::new()));
    let value = reference(&mut arena, &mut table, "Compute", compute);
    let root = assign_to_x(&mut arena, &mut table, value);

    let output = printed(&convert(&arena, root, &table));
    assert!(output.contains("x = Compute();"), "{output}");
}

// =============================================================================
// Qualification
// =============================================================================

#[test]
fn test_module_member_is_qualified_from_another_type() {
    let mut arena = SourceArena::new();
    let mut table = SemanticTable::new();
    let helpers = table.add_module("Helpers", None);
    let log = table.add_symbol(Symbol::method("Log", TypeId::VOID, Vec::new()).in_type(helpers));
    let callee = reference(&mut arena, &mut table, "Log", log);
    let call = arena.invocation(callee, Vec::new());
    let statement = arena.expression_statement(call);
    let root = run_method_unit(&mut arena, vec![statement]);

    let unit = convert(&arena, root, &table);
    let output = printed(&unit);
    assert!(output.contains("Helpers.Log();"), "{output}");
    assert!(
        !unit
            .diagnostics
            .iter()
            .any(|d| d.code == diagnostic_codes::QUALIFICATION_REVERTED)
    );
}

#[test]
fn test_module_member_stays_simple_inside_its_module() {
    let mut arena = SourceArena::new();
    let mut table = SemanticTable::new();
    let helpers = table.add_module("Helpers", None);
    let helpers_symbol = table.add_symbol(Symbol::type_symbol("Helpers", helpers));
    let log = table.add_symbol(Symbol::method("Log", TypeId::VOID, Vec::new()).in_type(helpers));
    let callee = reference(&mut arena, &mut table, "Log", log);
    let call = arena.invocation(callee, Vec::new());
    let statement = arena.expression_statement(call);
    let run = method(&mut arena, "Run", vec![statement]);
    let module = type_block(&mut arena, TypeBlockKind::Module, "Helpers", vec![run]);
    table.declare(module, helpers_symbol);
    let root = unit(&mut arena, vec![module]);

    let output = printed(&convert(&arena, root, &table));
    assert!(output.contains("Log();"), "{output}");
    assert!(!output.contains("Helpers.Log"), "{output}");
}

#[test]
fn test_qualification_reverts_when_the_written_name_differs() {
    let mut arena = SourceArena::new();
    let mut table = SemanticTable::new();
    let helpers = table.add_module("Helpers", None);
    let log = table.add_symbol(Symbol::method("Log", TypeId::VOID, Vec::new()).in_type(helpers));
    // Written through an alias the front-end resolved to `Log`.
    let callee = reference(&mut arena, &mut table, "Record", log);
    let call = arena.invocation(callee, Vec::new());
    let statement = arena.expression_statement(call);
    let root = run_method_unit(&mut arena, vec![statement]);

    let unit = convert(&arena, root, &table);
    let output = printed(&unit);
    assert!(output.contains("Log();"), "{output}");
    assert!(!output.contains("Helpers.Log"), "{output}");
    let reverted = unit
        .diagnostics
        .iter()
        .find(|d| d.code == diagnostic_codes::QUALIFICATION_REVERTED)
        .expect("revert reported");
    assert!(!reverted.is_error());
    assert!(reverted.message_text.contains("Helpers.Log"), "{}", reverted.message_text);
}

#[test]
fn test_my_base_reaches_this_for_members_of_the_current_type() {
    let mut arena = SourceArena::new();
    let mut table = SemanticTable::new();
    let shape = table.add_class("Shape", None);
    let sample = table.add_class("Sample", None);
    let sample_symbol = table.add_symbol(Symbol::type_symbol("Sample", sample));
    let save = table.add_symbol(Symbol::method("Save", TypeId::VOID, Vec::new()).in_type(sample));
    let close = table.add_symbol(Symbol::method("Close", TypeId::VOID, Vec::new()).in_type(shape));

    let mut statements = Vec::new();
    for (name, symbol) in [("Save", save), ("Close", close)] {
        let my_base = arena.add(SourceKind::MyBase);
        let access = arena.add(SourceKind::MemberAccess {
            expression: Some(my_base),
            name: name.to_string(),
            type_args: Vec::new(),
        });
        table.set_symbol(access, symbol);
        let call = arena.invocation(access, Vec::new());
        statements.push(arena.expression_statement(call));
    }
    let run = method(&mut arena, "Run", statements);
    let class = type_block(&mut arena, TypeBlockKind::Class, "Sample", vec![run]);
    table.declare(class, sample_symbol);
    let root = unit(&mut arena, vec![class]);

    let unit = convert(&arena, root, &table);
    let output = printed(&unit);
    assert!(output.contains("this.Save();"), "{output}");
    assert!(output.contains("base.Close();"), "{output}");
    assert_eq!(
        unit.diagnostics
            .iter()
            .filter(|d| d.code == diagnostic_codes::QUALIFICATION_REVERTED)
            .count(),
        1
    );
}

// =============================================================================
// Lambdas and queries
// =============================================================================

#[test]
fn test_single_return_lambda_collapses_to_an_expression() {
    let mut arena = SourceArena::new();
    let mut table = SemanticTable::new();
    let parameter = lambda_parameter(&mut arena, "x", None);
    let x = arena.identifier("x");
    let two = arena.int_literal(2);
    let product = arena.binary(BinaryOp::Multiply, x, two);
    let body = arena.add(SourceKind::Return {
        expression: Some(product),
    });
    let lambda = arena.add(SourceKind::Lambda {
        is_function: true,
        is_async: false,
        params: vec![parameter],
        body: LambdaBody::Statements(vec![body]),
    });
    let handler = local(&mut arena, &mut table, "handler", TypeId::OBJECT);
    let statement = arena.assignment(handler, lambda);
    let root = run_method_unit(&mut arena, vec![statement]);

    let output = printed(&convert(&arena, root, &table));
    assert!(output.contains("handler = x => x * 2;"), "{output}");
    assert!(!output.contains("return"), "{output}");
}

#[test]
fn test_typed_lambda_local_becomes_a_local_function() {
    let mut arena = SourceArena::new();
    let mut table = SemanticTable::new();
    let n_symbol = table.add_symbol(Symbol::parameter("n", TypeId::INT32));
    let parameter = lambda_parameter(&mut arena, "n", Some(TypeRef::named("Integer")));
    table.declare(parameter, n_symbol);
    let n = reference(&mut arena, &mut table, "n", n_symbol);
    let two = typed_int(&mut arena, &mut table, 2);
    let product = arena.binary(BinaryOp::Multiply, n, two);
    table.set_type(product, TypeId::INT32);
    let lambda = arena.add(SourceKind::Lambda {
        is_function: true,
        is_async: false,
        params: vec![parameter],
        body: LambdaBody::Expression(product),
    });
    let func = table.add_delegate("Func", Some("System"));
    let twice = table.add_symbol(Symbol::local("twice", func));
    let name = arena.modified_identifier("twice");
    table.declare(name, twice);
    let statement = arena.dim(name, None, Some(lambda));
    let root = run_method_unit(&mut arena, vec![statement]);

    let output = printed(&convert(&arena, root, &table));
    assert!(output.contains("int twice(int n) => n * 2;"), "{output}");
    assert!(!output.contains("twice ="), "{output}");
}

#[test]
fn test_query_with_take_calls_the_operator_on_the_query() {
    let mut arena = SourceArena::new();
    let table = SemanticTable::new();
    let items = arena.identifier("items");
    let n = arena.identifier("n");
    let two = arena.int_literal(2);
    let filter = arena.binary(BinaryOp::GreaterThan, n, two);
    let three = arena.int_literal(3);
    let query = arena.add(SourceKind::Query {
        clauses: vec![
            QueryClause::From {
                variable: "n".to_string(),
                type_ref: None,
                collection: items,
            },
            QueryClause::Where(filter),
            QueryClause::Take(three),
        ],
    });
    let result = arena.identifier("result");
    let statement = arena.assignment(result, query);
    let root = run_method_unit(&mut arena, vec![statement]);

    let unit = convert(&arena, root, &table);
    let output = printed(&unit);
    assert!(
        output.contains("result = (from n in items where n > 2 select n).Take(3);"),
        "{output}"
    );
    assert!(unit.extra_imports.contains("System.Linq"));
}

// =============================================================================
// Literals and arithmetic
// =============================================================================

#[test]
fn test_integer_division_stays_integral() {
    let mut arena = SourceArena::new();
    let mut table = SemanticTable::new();
    let mut statements = Vec::new();
    for (name, type_name, converted) in [("x", "Integer", TypeId::INT32), ("y", "Double", TypeId::DOUBLE)] {
        let five = typed_int(&mut arena, &mut table, 5);
        let two = typed_int(&mut arena, &mut table, 2);
        let quotient = arena.binary(BinaryOp::IntegerDivide, five, two);
        table.set_type(quotient, TypeId::INT32);
        table.set_converted(quotient, converted);
        let declared = arena.modified_identifier(name);
        statements.push(arena.dim(declared, Some(TypeRef::named(type_name)), Some(quotient)));
    }
    let root = run_method_unit(&mut arena, statements);

    let output = printed(&convert(&arena, root, &table));
    assert!(output.contains("int x = 5 / 2;"), "{output}");
    assert!(output.contains("double y = (double)(5 / 2);"), "{output}");
    assert!(!output.contains("2.5"), "{output}");
}

#[test]
fn test_type_character_suffixes_survive_conversion() {
    let mut arena = SourceArena::new();
    let mut table = SemanticTable::new();
    let cases = [
        ("mask", "Long", ConstValue::Int64(255), "&HFFL"),
        ("limit", "ULong", ConstValue::UInt64(10), "10UL"),
        ("ratio", "Single", ConstValue::Single(2.5), "2.5!"),
        ("total", "Double", ConstValue::Double(3.0), "3R"),
    ];
    let mut statements = Vec::new();
    for (name, type_name, value, text) in cases {
        let literal = arena.literal(value.clone(), text);
        table.set_constant(literal, value);
        let declared = arena.modified_identifier(name);
        statements.push(arena.dim(declared, Some(TypeRef::named(type_name)), Some(literal)));
    }
    let root = run_method_unit(&mut arena, statements);

    let output = printed(&convert(&arena, root, &table));
    assert!(output.contains("long mask = 0xFFL;"), "{output}");
    assert!(output.contains("ulong limit = 10UL;"), "{output}");
    assert!(output.contains("float ratio = 2.5F;"), "{output}");
    assert!(output.contains("double total = 3D;"), "{output}");
}
