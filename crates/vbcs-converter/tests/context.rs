use super::*;
use vbcs_syntax::source::{EventContainer, HandlesItem, TypeBlockKind};

fn local(name: &str) -> AdditionalLocal {
    AdditionalLocal {
        prefix: "arg".to_string(),
        name: name.to_string(),
        declared_type: "int".to_string(),
        initializer: CsNode::number("1"),
        write_back: None,
    }
}

#[test]
fn test_add_local_without_frame_is_ambiguous() {
    let mut locals = AdditionalLocals::default();
    let result = locals.add(local("argX"));
    assert!(matches!(result, Err(ConversionError::AmbiguousHoist(_))));
}

#[test]
fn test_frames_collect_independently() {
    let mut locals = AdditionalLocals::default();
    locals.push_frame();
    locals.add(local("argA")).unwrap();
    locals.push_frame();
    locals.add(local("argB")).unwrap();
    let inner = locals.pop_frame();
    let outer = locals.pop_frame();
    assert_eq!(inner.len(), 1);
    assert_eq!(inner[0].name, "argB");
    assert_eq!(outer[0].name, "argA");
    assert_eq!(locals.depth(), 0);
}

#[test]
fn test_declaration_uses_declared_type() {
    let decl = local("argValue").declaration();
    let CsNode::LocalDeclaration(decl) = decl else {
        panic!("expected a local declaration");
    };
    assert_eq!(decl.type_name, "int");
    assert_eq!(decl.declarators[0].name, "argValue");
}

#[test]
fn test_exit_innermost_loop_breaks() {
    let mut ctx = ConversionContext::new();
    ctx.push_breakable(BreakableKind::For);
    assert_eq!(ctx.exit_target(ExitKind::For), Some(JumpTarget::Break));
}

#[test]
fn test_exit_loop_through_switch_uses_label() {
    let mut ctx = ConversionContext::new();
    ctx.push_breakable(BreakableKind::Do);
    ctx.push_breakable(BreakableKind::Select { is_switch: true });
    assert_eq!(
        ctx.exit_target(ExitKind::Do),
        Some(JumpTarget::Goto("exitDo".to_string()))
    );
    // The same label is reused for a second exit.
    assert_eq!(
        ctx.exit_target(ExitKind::Do),
        Some(JumpTarget::Goto("exitDo".to_string()))
    );
    ctx.pop_breakable();
    let popped = ctx.pop_breakable().unwrap();
    assert_eq!(popped.exit_label.as_deref(), Some("exitDo"));
}

#[test]
fn test_exit_loop_through_if_chain_select_breaks() {
    let mut ctx = ConversionContext::new();
    ctx.push_breakable(BreakableKind::While);
    ctx.push_breakable(BreakableKind::Select { is_switch: false });
    assert_eq!(ctx.exit_target(ExitKind::While), Some(JumpTarget::Break));
}

#[test]
fn test_exit_select_from_if_chain_needs_label() {
    let mut ctx = ConversionContext::new();
    ctx.push_breakable(BreakableKind::Select { is_switch: false });
    assert_eq!(
        ctx.exit_target(ExitKind::Select),
        Some(JumpTarget::Goto("exitSelect".to_string()))
    );
}

#[test]
fn test_exit_outer_loop_from_inner_loop_needs_label() {
    let mut ctx = ConversionContext::new();
    ctx.push_breakable(BreakableKind::For);
    ctx.push_breakable(BreakableKind::Do);
    assert_eq!(
        ctx.exit_target(ExitKind::For),
        Some(JumpTarget::Goto("exitFor".to_string()))
    );
}

#[test]
fn test_exit_without_target() {
    let mut ctx = ConversionContext::new();
    assert_eq!(ctx.exit_target(ExitKind::Do), None);
}

#[test]
fn test_continue_targets() {
    let mut ctx = ConversionContext::new();
    ctx.push_breakable(BreakableKind::For);
    ctx.push_breakable(BreakableKind::Select { is_switch: true });
    assert_eq!(ctx.continue_target(ContinueKind::For), Some(JumpTarget::Continue));
    ctx.push_breakable(BreakableKind::While);
    assert_eq!(
        ctx.continue_target(ContinueKind::For),
        Some(JumpTarget::Goto("continueLoop".to_string()))
    );
}

#[test]
fn test_handlers_for_container() {
    let mut ctx = ConversionContext::new();
    ctx.types.push(TypeFrame {
        name: "Form1".to_string(),
        type_id: None,
        kind: TypeBlockKind::Class,
        handles: vec![MethodWithHandles {
            method: "OnClick".to_string(),
            is_shared: false,
            items: vec![
                HandlesItem {
                    container: EventContainer::Field("button".to_string()),
                    event: "Click".to_string(),
                },
                HandlesItem {
                    container: EventContainer::Me,
                    event: "Load".to_string(),
                },
            ],
        }],
    });
    let handlers = ctx.handlers_for(&EventContainer::Field("button".to_string()));
    assert_eq!(handlers, vec![("Click".to_string(), "OnClick".to_string())]);
    assert_eq!(ctx.handlers_for(&EventContainer::MyBase), Vec::new());
}

#[test]
fn test_report_attaches_member() {
    let mut ctx = ConversionContext::new();
    ctx.current_member = Some("Module1.Main".to_string());
    ctx.report(Diagnostic::warning(0, 1, "w".to_string(), 1002));
    assert_eq!(ctx.diagnostics[0].member.as_deref(), Some("Module1.Main"));
}
