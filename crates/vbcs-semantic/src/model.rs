//! The semantic model interface.
//!
//! Symbol resolution, type inference and flow analysis are provided by an
//! external semantic layer. The converter only ever sees it through this
//! trait, always as `&dyn SemanticModel`, and only asks questions about
//! nodes of the arena it is converting.

use crate::conversions::{SourceConversion, TargetConversion};
use crate::symbols::{Symbol, SymbolId};
use crate::types::{TypeId, TypeInfo};
use vbcs_syntax::source::NodeIndex;
use vbcs_syntax::value::ConstValue;

/// Result of data-flow analysis over a contiguous statement range.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DataFlowInfo {
    /// Variables definitely assigned on every path through the range
    pub always_assigned: Vec<SymbolId>,
    pub read_inside: Vec<SymbolId>,
    pub written_inside: Vec<SymbolId>,
}

impl DataFlowInfo {
    pub fn reads(&self, symbol: SymbolId) -> bool {
        self.read_inside.contains(&symbol)
    }

    pub fn writes(&self, symbol: SymbolId) -> bool {
        self.written_inside.contains(&symbol)
    }
}

/// Result of control-flow analysis over a contiguous statement range.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ControlFlowInfo {
    pub end_point_reachable: bool,
}

impl Default for ControlFlowInfo {
    fn default() -> Self {
        Self {
            end_point_reachable: true,
        }
    }
}

pub trait SemanticModel {
    /// Type of the expression as written.
    fn static_type(&self, node: NodeIndex) -> Option<TypeId>;

    /// Type the expression is implicitly converted to by its context.
    fn converted_type(&self, node: NodeIndex) -> Option<TypeId>;

    /// Constant value of the expression, when it is a constant expression.
    fn constant_value(&self, node: NodeIndex) -> Option<ConstValue>;

    /// Symbol an expression refers to (identifiers, member accesses,
    /// invocations, object creations).
    fn resolve_symbol(&self, node: NodeIndex) -> Option<SymbolId>;

    /// Symbol a declaration node introduces (methods, parameters, declared
    /// names of locals and fields).
    fn declared_symbol(&self, node: NodeIndex) -> Option<SymbolId>;

    fn symbol(&self, id: SymbolId) -> Option<&Symbol>;

    fn type_info(&self, id: TypeId) -> Option<&TypeInfo>;

    fn analyze_data_flow(&self, statements: &[NodeIndex]) -> DataFlowInfo;

    fn analyze_control_flow(&self, statements: &[NodeIndex]) -> ControlFlowInfo;

    /// Every name visible at `node` (locals, parameters, members, types).
    fn lookup_visible_names(&self, node: NodeIndex) -> Vec<String>;

    /// Conversion from `from` to `to` under source-dialect rules.
    fn classify_source_conversion(&self, from: TypeId, to: TypeId) -> SourceConversion;

    /// Conversion from `from` to `to` under target-dialect rules. `constant`
    /// enables implicit constant-expression conversions.
    fn classify_target_conversion(
        &self,
        from: TypeId,
        to: TypeId,
        constant: Option<&ConstValue>,
    ) -> TargetConversion;
}
