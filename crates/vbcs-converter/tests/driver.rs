use super::*;
use vbcs_semantic::SemanticTable;
use vbcs_syntax::printer::CsPrinter;
use vbcs_syntax::source::{BinaryOp, ImportClause, Modifiers, OptionStatement, TypeBlockKind};

fn import(name: &str) -> ImportClause {
    ImportClause {
        alias: None,
        name: name.to_string(),
    }
}

/// `Class Sample` with `Sub Run` holding `body`, under `options` and
/// `imports`.
fn sample_unit(
    arena: &mut SourceArena,
    options: Vec<OptionStatement>,
    imports: Vec<ImportClause>,
    body: Vec<NodeIndex>,
) -> NodeIndex {
    let run = arena.add(SourceKind::Method {
        name: "Run".to_string(),
        modifiers: Modifiers::PUBLIC,
        is_function: false,
        type_params: Vec::new(),
        params: Vec::new(),
        return_type: None,
        handles: Vec::new(),
        body: Some(body),
    });
    let class = arena.add(SourceKind::TypeBlock {
        kind: TypeBlockKind::Class,
        name: "Sample".to_string(),
        modifiers: Modifiers::PUBLIC,
        type_params: Vec::new(),
        inherits: Vec::new(),
        implements: Vec::new(),
        members: vec![run],
    });
    arena.add(SourceKind::CompilationUnit {
        options,
        imports,
        members: vec![class],
    })
}

#[test]
fn test_missing_model_is_a_unit_error() {
    let mut arena = SourceArena::new();
    let root = sample_unit(&mut arena, Vec::new(), Vec::new(), Vec::new());
    let result = convert_unit(&arena, root, None, &ConversionOptions::default(), None);
    assert_eq!(result.err(), Some(UnitError::NoSemanticModel));
}

#[test]
fn test_root_must_be_a_compilation_unit() {
    let mut arena = SourceArena::new();
    let table = SemanticTable::new();
    let root = arena.identifier("x");
    let result = convert_unit(&arena, root, Some(&table), &ConversionOptions::default(), None);
    assert_eq!(result.err(), Some(UnitError::NotACompilationUnit("IdentifierName")));
}

#[test]
fn test_root_outside_the_arena() {
    let arena = SourceArena::new();
    let table = SemanticTable::new();
    let result = convert_unit(&arena, NodeIndex(7), Some(&table), &ConversionOptions::default(), None);
    assert_eq!(result.err(), Some(UnitError::MissingRoot));
}

#[test]
fn test_cancelled_before_start() {
    let mut arena = SourceArena::new();
    let table = SemanticTable::new();
    let root = sample_unit(&mut arena, Vec::new(), Vec::new(), Vec::new());
    let flag = CancellationFlag::new();
    flag.cancel();
    let result = convert_unit(&arena, root, Some(&table), &ConversionOptions::default(), Some(flag));
    assert_eq!(result.err(), Some(UnitError::Cancelled));
}

#[test]
fn test_required_imports_follow_the_units_own() {
    let mut arena = SourceArena::new();
    let table = SemanticTable::new();
    let end = arena.add(SourceKind::End);
    let root = sample_unit(&mut arena, Vec::new(), vec![import("System.Text")], vec![end]);

    let unit = convert_unit(&arena, root, Some(&table), &ConversionOptions::default(), None).expect("converts");
    let output = CsPrinter::emit_to_string(&unit.root);
    assert!(output.starts_with("using System.Text;\nusing System;\n"), "{output}");
    assert!(output.contains("Environment.Exit(0);"), "{output}");
    assert_eq!(unit.extra_imports.iter().collect::<Vec<_>>(), vec!["System"]);
}

#[test]
fn test_imports_already_present_are_not_repeated() {
    let mut arena = SourceArena::new();
    let table = SemanticTable::new();
    let end = arena.add(SourceKind::End);
    let root = sample_unit(&mut arena, Vec::new(), vec![import("System")], vec![end]);

    let unit = convert_unit(&arena, root, Some(&table), &ConversionOptions::default(), None).expect("converts");
    let output = CsPrinter::emit_to_string(&unit.root);
    assert_eq!(output.matches("using System;").count(), 1, "{output}");
    assert!(unit.extra_imports.is_empty());
}

#[test]
fn test_unit_option_statements_override_defaults() {
    let mut arena = SourceArena::new();
    let table = SemanticTable::new();
    let left = arena.identifier("name");
    let right = arena.identifier("pattern");
    let like = arena.binary(BinaryOp::Like, left, right);
    let statement = arena.expression_statement(like);
    let root = sample_unit(
        &mut arena,
        vec![OptionStatement::CompareText(true)],
        Vec::new(),
        vec![statement],
    );

    let unit = convert_unit(&arena, root, Some(&table), &ConversionOptions::default(), None).expect("converts");
    let output = CsPrinter::emit_to_string(&unit.root);
    assert!(
        output.contains("LikeOperator.LikeString(name, pattern, CompareMethod.Text);"),
        "{output}"
    );
}

#[test]
fn test_stats_count_members_and_serialize_camel_case() {
    let mut arena = SourceArena::new();
    let table = SemanticTable::new();
    let root = sample_unit(&mut arena, Vec::new(), Vec::new(), Vec::new());

    let unit = convert_unit(&arena, root, Some(&table), &ConversionOptions::default(), None).expect("converts");
    let stats = unit.stats();
    assert_eq!(
        stats,
        UnitStats {
            converted_members: 1,
            error_placeholders: 0,
            diagnostics: 0,
        }
    );
    assert!(!unit.has_errors());
    let json = serde_json::to_value(stats).expect("serializes");
    assert_eq!(
        json,
        serde_json::json!({ "convertedMembers": 1, "errorPlaceholders": 0, "diagnostics": 0 })
    );
}

#[test]
fn test_placeholder_members_count_as_errors() {
    let mut arena = SourceArena::new();
    let table = SemanticTable::new();
    let on_error = arena.add(SourceKind::OnError {
        text: "On Error GoTo Handler".to_string(),
    });
    let root = sample_unit(&mut arena, Vec::new(), Vec::new(), vec![on_error]);

    let unit = convert_unit(&arena, root, Some(&table), &ConversionOptions::default(), None).expect("converts");
    assert_eq!(unit.stats().error_placeholders, 1);
    assert_eq!(unit.stats().converted_members, 0);
    assert!(unit.has_errors());
    assert!(unit.members[0].is_error());
}
