//! Per-unit conversion state.
//!
//! Everything the rewriters share while walking one compilation unit lives
//! in `ConversionContext`. Scoped parts (name scopes, hoisting frames,
//! with-receivers, breakables, method frames) are stacks; the converter
//! pushes and pops them in pairs around the closure doing the work, so a
//! `?` inside the closure never leaves a frame behind.

use indexmap::IndexSet;
use tracing::trace;
use vbcs_common::{Diagnostic, names_equal};
use vbcs_semantic::{SymbolId, TypeId};
use vbcs_syntax::source::{ContinueKind, EventContainer, ExitKind, HandlesItem, TypeBlockKind};
use vbcs_syntax::target::{CsDeclarator, CsLocalDeclaration, CsNode};

use crate::error::{ConversionError, ConvertResult};
use crate::namer::NameRegistry;

// =============================================================================
// Additional Locals
// =============================================================================

/// A local synthesized while converting an expression, declared right
/// before the statement that needed it.
#[derive(Clone, Debug, PartialEq)]
pub struct AdditionalLocal {
    /// Prefix the name was derived from (`arg`, `loopTo`, ...)
    pub prefix: String,
    pub name: String,
    pub declared_type: String,
    pub initializer: CsNode,
    /// Assignment copying the local back into a property after the statement
    pub write_back: Option<CsNode>,
}

impl AdditionalLocal {
    pub fn declaration(&self) -> CsNode {
        CsNode::local(
            self.declared_type.clone(),
            self.name.clone(),
            Some(self.initializer.clone()),
        )
    }
}

/// Stack of collecting frames, one per statement being converted.
#[derive(Debug, Default)]
pub struct AdditionalLocals {
    frames: Vec<Vec<AdditionalLocal>>,
}

impl AdditionalLocals {
    pub fn push_frame(&mut self) {
        self.frames.push(Vec::new());
    }

    /// Pop the innermost frame and return what it collected.
    pub fn pop_frame(&mut self) -> Vec<AdditionalLocal> {
        self.frames.pop().unwrap_or_default()
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Add a local to the innermost frame. Outside any statement there is no
    /// place to declare it.
    pub fn add(&mut self, local: AdditionalLocal) -> ConvertResult<()> {
        let Some(frame) = self.frames.last_mut() else {
            return Err(ConversionError::AmbiguousHoist(format!(
                "no enclosing statement can declare '{}'",
                local.name
            )));
        };
        trace!(name = %local.name, "hoisted local");
        frame.push(local);
        Ok(())
    }
}

// =============================================================================
// Breakable Constructs
// =============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BreakableKind {
    Do,
    For,
    While,
    /// `Select Case`; `is_switch` when it became a target `switch`
    Select { is_switch: bool },
    Try,
}

impl BreakableKind {
    const fn matches_exit(self, exit: ExitKind) -> bool {
        matches!(
            (self, exit),
            (Self::Do, ExitKind::Do)
                | (Self::For, ExitKind::For)
                | (Self::While, ExitKind::While)
                | (Self::Select { .. }, ExitKind::Select)
                | (Self::Try, ExitKind::Try)
        )
    }

    const fn matches_continue(self, kind: ContinueKind) -> bool {
        matches!(
            (self, kind),
            (Self::Do, ContinueKind::Do) | (Self::For, ContinueKind::For) | (Self::While, ContinueKind::While)
        )
    }

    const fn is_loop(self) -> bool {
        matches!(self, Self::Do | Self::For | Self::While)
    }

    /// Label prefix for jumps out of this construct.
    const fn exit_label_base(self) -> &'static str {
        match self {
            Self::Do => "exitDo",
            Self::For => "exitFor",
            Self::While => "exitWhile",
            Self::Select { .. } => "exitSelect",
            Self::Try => "exitTry",
        }
    }
}

#[derive(Clone, Debug)]
pub struct Breakable {
    pub kind: BreakableKind,
    /// Label placed right after the construct, created on first use
    pub exit_label: Option<String>,
    /// Label placed at the end of the loop body, created on first use
    pub continue_label: Option<String>,
}

/// How an `Exit`/`Continue` leaves its construct.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum JumpTarget {
    Break,
    Continue,
    Goto(String),
}

// =============================================================================
// Method Frames
// =============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MethodKind {
    Sub,
    Function,
    Getter,
    Setter,
    Constructor,
    /// Multi-line lambda body
    Lambda,
}

#[derive(Clone, Debug)]
pub struct MethodFrame {
    pub name: String,
    pub kind: MethodKind,
    /// Target return type, `void` for subs
    pub return_type: String,
    /// Local standing in for the function-name variable
    pub return_holder: Option<String>,
    pub return_symbol: Option<SymbolId>,
    /// Setter parameter rendered as `value`
    pub setter_value: Option<SymbolId>,
}

impl MethodFrame {
    pub fn new(name: impl Into<String>, kind: MethodKind, return_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            return_type: return_type.into(),
            return_holder: None,
            return_symbol: None,
            setter_value: None,
        }
    }

    pub const fn returns_value(&self) -> bool {
        matches!(self.kind, MethodKind::Function | MethodKind::Getter)
    }
}

// =============================================================================
// Handles
// =============================================================================

/// A method with a `Handles` clause.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MethodWithHandles {
    pub method: String,
    pub is_shared: bool,
    pub items: Vec<HandlesItem>,
}

impl MethodWithHandles {
    /// Events this method handles on `container`.
    pub fn events_of<'h>(&'h self, container: &'h EventContainer) -> impl Iterator<Item = &'h str> + 'h {
        self.items
            .iter()
            .filter(move |item| same_container(&item.container, container))
            .map(|item| item.event.as_str())
    }
}

fn same_container(a: &EventContainer, b: &EventContainer) -> bool {
    match (a, b) {
        (EventContainer::Field(a), EventContainer::Field(b)) => names_equal(a, b),
        _ => a == b,
    }
}

/// Type whose members are being converted.
#[derive(Clone, Debug)]
pub struct TypeFrame {
    pub name: String,
    pub type_id: Option<TypeId>,
    pub kind: TypeBlockKind,
    pub handles: Vec<MethodWithHandles>,
}

impl TypeFrame {
    pub const fn is_module(&self) -> bool {
        matches!(self.kind, TypeBlockKind::Module)
    }

    pub const fn is_interface(&self) -> bool {
        matches!(self.kind, TypeBlockKind::Interface)
    }
}

// =============================================================================
// Conversion Context
// =============================================================================

#[derive(Debug, Default)]
pub struct ConversionContext {
    pub names: NameRegistry,
    pub locals: AdditionalLocals,
    pub with_receivers: Vec<CsNode>,
    pub breakables: Vec<Breakable>,
    pub methods: Vec<MethodFrame>,
    pub types: Vec<TypeFrame>,
    /// Enclosing namespace declarations, outermost first
    pub namespaces: Vec<String>,
    /// Namespaces that need no qualification: imports and enclosing namespaces
    pub namespaces_in_scope: Vec<String>,
    pub extra_imports: IndexSet<String>,
    pub diagnostics: Vec<Diagnostic>,
    /// Display name of the member being converted
    pub current_member: Option<String>,
    pub expression_depth: u32,
    pub statement_depth: u32,
    pub declaration_depth: u32,
}

impl ConversionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn require_import(&mut self, namespace: &str) {
        self.extra_imports.insert(namespace.to_string());
    }

    pub fn report(&mut self, diagnostic: Diagnostic) {
        let diagnostic = match &self.current_member {
            Some(member) => diagnostic.with_member(member.clone()),
            None => diagnostic,
        };
        self.diagnostics.push(diagnostic);
    }

    pub fn method(&self) -> Option<&MethodFrame> {
        self.methods.last()
    }

    pub fn method_mut(&mut self) -> Option<&mut MethodFrame> {
        self.methods.last_mut()
    }

    pub fn current_type(&self) -> Option<&TypeFrame> {
        self.types.last()
    }

    pub fn push_breakable(&mut self, kind: BreakableKind) {
        self.breakables.push(Breakable {
            kind,
            exit_label: None,
            continue_label: None,
        });
    }

    pub fn pop_breakable(&mut self) -> Option<Breakable> {
        self.breakables.pop()
    }

    /// Resolve `Exit Do/For/While/Select/Try`.
    ///
    /// A `break` reaches the target only when no target `switch` sits in
    /// between; `Select` chains lowered to `if` and `Try` blocks are not
    /// breakable at all and always need a label.
    pub fn exit_target(&mut self, exit: ExitKind) -> Option<JumpTarget> {
        let index = self.breakables.iter().rposition(|b| b.kind.matches_exit(exit))?;
        let target_kind = self.breakables[index].kind;
        let intercepted = self.breakables[index + 1..]
            .iter()
            .any(|b| matches!(b.kind, BreakableKind::Select { is_switch: true }) || b.kind.is_loop());
        let needs_label = matches!(
            target_kind,
            BreakableKind::Select { is_switch: false } | BreakableKind::Try
        ) || intercepted;
        if !needs_label {
            return Some(JumpTarget::Break);
        }
        let label = match &self.breakables[index].exit_label {
            Some(label) => label.clone(),
            None => {
                let label = self.names.unique_name(target_kind.exit_label_base(), &[]);
                self.breakables[index].exit_label = Some(label.clone());
                label
            }
        };
        Some(JumpTarget::Goto(label))
    }

    /// Resolve `Continue Do/For/While`: plain `continue` when the target is
    /// the innermost loop.
    pub fn continue_target(&mut self, kind: ContinueKind) -> Option<JumpTarget> {
        let index = self.breakables.iter().rposition(|b| b.kind.matches_continue(kind))?;
        let innermost_loop = self.breakables.iter().rposition(|b| b.kind.is_loop());
        if innermost_loop == Some(index) {
            return Some(JumpTarget::Continue);
        }
        let label = match &self.breakables[index].continue_label {
            Some(label) => label.clone(),
            None => {
                let label = self.names.unique_name("continueLoop", &[]);
                self.breakables[index].continue_label = Some(label.clone());
                label
            }
        };
        Some(JumpTarget::Goto(label))
    }

    /// Event handlers registered in the current type for `container`, as
    /// `(event, method)` pairs.
    pub fn handlers_for(&self, container: &EventContainer) -> Vec<(String, String)> {
        let Some(frame) = self.current_type() else {
            return Vec::new();
        };
        frame
            .handles
            .iter()
            .flat_map(|m| m.events_of(container).map(|event| (event.to_string(), m.method.clone())))
            .collect()
    }
}

/// `T a = x, b = y;` from parts.
pub fn local_declaration(type_name: String, declarators: Vec<CsDeclarator>, is_const: bool) -> CsNode {
    CsNode::LocalDeclaration(CsLocalDeclaration {
        type_name,
        declarators,
        is_const,
        is_ref: false,
    })
}

#[cfg(test)]
#[path = "../tests/context.rs"]
mod tests;
