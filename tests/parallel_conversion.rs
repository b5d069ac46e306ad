//! Integration tests for converting several units through the facade.

use vbcs::syntax::source::{Modifiers, SourceKind, TypeBlockKind};
use vbcs::tracing_config::LogFormat;
use vbcs::{
    CancellationFlag, ConversionOptions, CsPrinter, SemanticModel, SemanticTable, SourceArena,
    UnitError, UnitInput, UnitStats, convert_units, total_stats,
};

/// Arena holding `Class <name>` with an empty `Sub Run`.
fn class_unit(name: &str) -> (SourceArena, vbcs::NodeIndex) {
    let mut arena = SourceArena::new();
    let run = arena.add(SourceKind::Method {
        name: "Run".to_string(),
        modifiers: Modifiers::PUBLIC,
        is_function: false,
        type_params: Vec::new(),
        params: Vec::new(),
        return_type: None,
        handles: Vec::new(),
        body: Some(Vec::new()),
    });
    let class = arena.add(SourceKind::TypeBlock {
        kind: TypeBlockKind::Class,
        name: name.to_string(),
        modifiers: Modifiers::PUBLIC,
        type_params: Vec::new(),
        inherits: Vec::new(),
        implements: Vec::new(),
        members: vec![run],
    });
    let root = arena.add(SourceKind::CompilationUnit {
        options: Vec::new(),
        imports: Vec::new(),
        members: vec![class],
    });
    (arena, root)
}

fn input<'a>(
    unit: &'a (SourceArena, vbcs::NodeIndex),
    model: Option<&'a (dyn SemanticModel + Sync)>,
) -> UnitInput<'a> {
    UnitInput {
        arena: &unit.0,
        root: unit.1,
        model,
    }
}

#[test]
fn test_results_come_back_in_input_order() {
    let table = SemanticTable::new();
    let names = ["Alpha", "Beta", "Gamma", "Delta"];
    let units: Vec<_> = names.iter().map(|name| class_unit(name)).collect();
    let inputs: Vec<_> = units.iter().map(|unit| input(unit, Some(&table))).collect();

    let results = convert_units(&inputs, &ConversionOptions::default(), None);
    assert_eq!(results.len(), names.len());
    for (name, result) in names.iter().zip(&results) {
        let unit = result.as_ref().expect("converts");
        let output = CsPrinter::emit_to_string(&unit.root);
        assert!(output.contains(&format!("class {name}")), "{output}");
    }
}

#[test]
fn test_one_failing_unit_does_not_stop_the_others() {
    let table = SemanticTable::new();
    let first = class_unit("First");
    let second = class_unit("Second");
    let inputs = [input(&first, None), input(&second, Some(&table))];

    let results = convert_units(&inputs, &ConversionOptions::default(), None);
    assert_eq!(results[0].as_ref().err(), Some(&UnitError::NoSemanticModel));
    assert!(results[1].is_ok());
}

#[test]
fn test_shared_cancellation_stops_every_unit() {
    let table = SemanticTable::new();
    let units = [class_unit("First"), class_unit("Second")];
    let inputs: Vec<_> = units.iter().map(|unit| input(unit, Some(&table))).collect();
    let flag = CancellationFlag::new();
    flag.cancel();

    let results = convert_units(&inputs, &ConversionOptions::default(), Some(&flag));
    assert!(
        results
            .iter()
            .all(|result| result.as_ref().err() == Some(&UnitError::Cancelled))
    );
}

#[test]
fn test_total_stats_skip_failed_units() {
    let table = SemanticTable::new();
    let units = [class_unit("First"), class_unit("Second"), class_unit("Third")];
    let inputs = [
        input(&units[0], Some(&table)),
        input(&units[1], None),
        input(&units[2], Some(&table)),
    ];

    let results = convert_units(&inputs, &ConversionOptions::default(), None);
    assert_eq!(
        total_stats(&results),
        UnitStats {
            converted_members: 2,
            error_placeholders: 0,
            diagnostics: 0,
        }
    );
}

#[test]
fn test_log_format_names() {
    assert_eq!(LogFormat::parse("tree"), LogFormat::Tree);
    assert_eq!(LogFormat::parse(" JSON "), LogFormat::Json);
    assert_eq!(LogFormat::parse("text"), LogFormat::Text);
    assert_eq!(LogFormat::parse(""), LogFormat::Text);
    assert_eq!(LogFormat::parse("yaml"), LogFormat::Text);
}
