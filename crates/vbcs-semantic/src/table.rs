//! In-memory semantic model.
//!
//! `SemanticTable` implements `SemanticModel` from explicit annotations: the
//! host (or a test) registers types, symbols and per-node facts, and the
//! table answers the converter's questions from those maps plus the
//! built-in conversion rules in `conversions`.
//!
//! Flow analysis is answered from per-statement facts: `record_read` /
//! `record_write` attach symbol reads and writes to a statement node and
//! `analyze_data_flow` unions them over the requested range.

use crate::conversions::{
    SourceConversion, TargetConversion, classify_source_special, classify_target_special,
};
use crate::model::{ControlFlowInfo, DataFlowInfo, SemanticModel};
use crate::symbols::{Symbol, SymbolId, SymbolKind};
use crate::types::{SpecialType, TypeId, TypeInfo, TypeKind};
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::trace;
use vbcs_syntax::source::NodeIndex;
use vbcs_syntax::value::ConstValue;

#[derive(Clone, Debug)]
pub struct SemanticTable {
    types: Vec<TypeInfo>,
    symbols: Vec<Symbol>,
    static_types: FxHashMap<NodeIndex, TypeId>,
    converted_types: FxHashMap<NodeIndex, TypeId>,
    constants: FxHashMap<NodeIndex, ConstValue>,
    referenced: FxHashMap<NodeIndex, SymbolId>,
    declared: FxHashMap<NodeIndex, SymbolId>,
    visible_names: FxHashMap<NodeIndex, Vec<String>>,
    global_names: Vec<String>,
    reads: FxHashMap<NodeIndex, Vec<SymbolId>>,
    writes: FxHashMap<NodeIndex, Vec<SymbolId>>,
    unreachable_ends: FxHashSet<NodeIndex>,
    array_types: FxHashMap<(TypeId, u32), TypeId>,
    nullable_types: FxHashMap<TypeId, TypeId>,
    source_overrides: FxHashMap<(TypeId, TypeId), SourceConversion>,
    target_overrides: FxHashMap<(TypeId, TypeId), TargetConversion>,
}

impl Default for SemanticTable {
    fn default() -> Self {
        Self::new()
    }
}

impl SemanticTable {
    /// Create a table holding the special types at their reserved ids.
    pub fn new() -> Self {
        let mut types = Vec::with_capacity(TypeId::FIRST_USER as usize + 16);
        types.push(TypeInfo::new("?", None, TypeKind::Error));
        for special in SpecialType::ALL {
            debug_assert_eq!(TypeId::of_special(special).0 as usize, types.len());
            types.push(TypeInfo::new(
                special.vb_keyword(),
                Some("System"),
                TypeKind::Special(special),
            ));
        }
        Self {
            types,
            symbols: Vec::new(),
            static_types: FxHashMap::default(),
            converted_types: FxHashMap::default(),
            constants: FxHashMap::default(),
            referenced: FxHashMap::default(),
            declared: FxHashMap::default(),
            visible_names: FxHashMap::default(),
            global_names: Vec::new(),
            reads: FxHashMap::default(),
            writes: FxHashMap::default(),
            unreachable_ends: FxHashSet::default(),
            array_types: FxHashMap::default(),
            nullable_types: FxHashMap::default(),
            source_overrides: FxHashMap::default(),
            target_overrides: FxHashMap::default(),
        }
    }

    // =========================================================================
    // Types
    // =========================================================================

    pub fn add_type(&mut self, info: TypeInfo) -> TypeId {
        let id = TypeId(self.types.len() as u32);
        self.types.push(info);
        id
    }

    pub fn add_class(&mut self, name: &str, namespace: Option<&str>) -> TypeId {
        self.add_type(TypeInfo::new(name, namespace, TypeKind::Class))
    }

    pub fn add_module(&mut self, name: &str, namespace: Option<&str>) -> TypeId {
        self.add_type(TypeInfo::new(name, namespace, TypeKind::Module))
    }

    pub fn add_structure(&mut self, name: &str, namespace: Option<&str>) -> TypeId {
        self.add_type(TypeInfo::new(name, namespace, TypeKind::Structure))
    }

    pub fn add_enum(&mut self, name: &str, namespace: Option<&str>, underlying: TypeId) -> TypeId {
        self.add_type(TypeInfo::new(name, namespace, TypeKind::Enum { underlying }))
    }

    pub fn add_delegate(&mut self, name: &str, namespace: Option<&str>) -> TypeId {
        self.add_type(TypeInfo::new(name, namespace, TypeKind::Delegate))
    }

    /// Interned array type.
    pub fn array_of(&mut self, element: TypeId, rank: u32) -> TypeId {
        if let Some(&id) = self.array_types.get(&(element, rank)) {
            return id;
        }
        let name = format!("{}()", self.type_name(element));
        let id = self.add_type(TypeInfo::new(name, None, TypeKind::Array { element, rank }));
        self.array_types.insert((element, rank), id);
        id
    }

    /// Interned nullable type.
    pub fn nullable_of(&mut self, underlying: TypeId) -> TypeId {
        if let Some(&id) = self.nullable_types.get(&underlying) {
            return id;
        }
        let name = format!("{}?", self.type_name(underlying));
        let id = self.add_type(TypeInfo::new(name, None, TypeKind::Nullable { underlying }));
        self.nullable_types.insert(underlying, id);
        id
    }

    fn type_name(&self, id: TypeId) -> &str {
        self.types.get(id.0 as usize).map_or("?", |info| info.name.as_str())
    }

    fn special_of(&self, id: TypeId) -> Option<SpecialType> {
        self.types.get(id.0 as usize)?.special()
    }

    // =========================================================================
    // Symbols and node facts
    // =========================================================================

    pub fn add_symbol(&mut self, symbol: Symbol) -> SymbolId {
        let id = SymbolId(self.symbols.len() as u32);
        self.symbols.push(symbol);
        id
    }

    /// Set the static type; the converted type defaults to the same type.
    pub fn set_type(&mut self, node: NodeIndex, type_id: TypeId) {
        self.static_types.insert(node, type_id);
    }

    pub fn set_converted(&mut self, node: NodeIndex, type_id: TypeId) {
        self.converted_types.insert(node, type_id);
    }

    /// Register a constant, typing the node by the value when untyped.
    pub fn set_constant(&mut self, node: NodeIndex, value: ConstValue) {
        if let Some(special) = SpecialType::of_value(&value) {
            self.static_types
                .entry(node)
                .or_insert(TypeId::of_special(special));
        }
        self.constants.insert(node, value);
    }

    pub fn set_symbol(&mut self, node: NodeIndex, symbol: SymbolId) {
        self.referenced.insert(node, symbol);
        if let Some(info) = self.symbols.get(symbol.0 as usize)
            && !matches!(
                info.kind,
                SymbolKind::Method { .. } | SymbolKind::Type | SymbolKind::Namespace
            )
        {
            self.static_types.entry(node).or_insert(info.type_id);
        }
    }

    pub fn declare(&mut self, node: NodeIndex, symbol: SymbolId) {
        self.declared.insert(node, symbol);
    }

    pub fn set_visible_names(&mut self, node: NodeIndex, names: Vec<String>) {
        self.visible_names.insert(node, names);
    }

    /// Names visible everywhere (members, types, imports).
    pub fn add_global_name(&mut self, name: impl Into<String>) {
        self.global_names.push(name.into());
    }

    pub fn record_read(&mut self, statement: NodeIndex, symbol: SymbolId) {
        self.reads.entry(statement).or_default().push(symbol);
    }

    pub fn record_write(&mut self, statement: NodeIndex, symbol: SymbolId) {
        self.writes.entry(statement).or_default().push(symbol);
    }

    /// Mark a statement after which control never continues (a `Return`,
    /// a `Throw`, an infinite loop).
    pub fn set_end_unreachable(&mut self, statement: NodeIndex) {
        self.unreachable_ends.insert(statement);
    }

    pub fn set_source_conversion(&mut self, from: TypeId, to: TypeId, conversion: SourceConversion) {
        self.source_overrides.insert((from, to), conversion);
    }

    pub fn set_target_conversion(&mut self, from: TypeId, to: TypeId, conversion: TargetConversion) {
        self.target_overrides.insert((from, to), conversion);
    }

    // =========================================================================
    // Structural conversion rules
    // =========================================================================

    fn source_conversion(&self, from: TypeId, to: TypeId) -> SourceConversion {
        if from == to {
            return SourceConversion::EXISTS
                | SourceConversion::IDENTITY
                | SourceConversion::WIDENING;
        }
        let (Some(from_info), Some(to_info)) = (self.type_info(from), self.type_info(to)) else {
            return SourceConversion::empty();
        };
        match (&from_info.kind, &to_info.kind) {
            (TypeKind::Special(a), TypeKind::Special(b)) => classify_source_special(*a, *b),
            (TypeKind::Enum { underlying }, TypeKind::Special(b)) if b.is_numeric() => {
                // An enum widens to its underlying type and anything wider.
                let base = self
                    .special_of(*underlying)
                    .map(|a| classify_source_special(a, *b))
                    .unwrap_or_default();
                base | SourceConversion::ENUM
            }
            (TypeKind::Special(a), TypeKind::Enum { .. }) if a.is_numeric() => {
                SourceConversion::EXISTS
                    | SourceConversion::NARROWING
                    | SourceConversion::NUMERIC
                    | SourceConversion::ENUM
            }
            (TypeKind::Enum { .. }, TypeKind::Enum { .. }) => {
                SourceConversion::EXISTS | SourceConversion::NARROWING | SourceConversion::ENUM
            }
            (_, TypeKind::Special(SpecialType::Object)) => {
                SourceConversion::EXISTS | SourceConversion::WIDENING | SourceConversion::REFERENCE
            }
            (TypeKind::Special(SpecialType::Object), _) => {
                SourceConversion::EXISTS
                    | SourceConversion::NARROWING
                    | SourceConversion::REFERENCE
            }
            (TypeKind::Enum { .. }, TypeKind::Special(SpecialType::String)) => {
                SourceConversion::EXISTS | SourceConversion::NARROWING | SourceConversion::STRING
            }
            (_, TypeKind::Nullable { underlying }) if *underlying == from => {
                SourceConversion::EXISTS | SourceConversion::WIDENING
            }
            (TypeKind::Nullable { underlying }, _) if *underlying == to => {
                SourceConversion::EXISTS | SourceConversion::NARROWING
            }
            _ if from_info.is_reference_type() && to_info.is_reference_type() => {
                // Hierarchy is unknown here; hosts override when it matters.
                SourceConversion::EXISTS | SourceConversion::NARROWING | SourceConversion::REFERENCE
            }
            _ => SourceConversion::empty(),
        }
    }

    fn target_conversion(
        &self,
        from: TypeId,
        to: TypeId,
        constant: Option<&ConstValue>,
    ) -> TargetConversion {
        if from == to {
            return TargetConversion::EXISTS
                | TargetConversion::IDENTITY
                | TargetConversion::IMPLICIT;
        }
        let (Some(from_info), Some(to_info)) = (self.type_info(from), self.type_info(to)) else {
            return TargetConversion::empty();
        };
        match (&from_info.kind, &to_info.kind) {
            (TypeKind::Special(a), TypeKind::Special(b)) => classify_target_special(*a, *b, constant),
            (TypeKind::Enum { .. }, TypeKind::Special(b)) if b.is_numeric() || *b == SpecialType::Char => {
                TargetConversion::EXISTS | TargetConversion::EXPLICIT | TargetConversion::ENUMERATION
            }
            (TypeKind::Special(a), TypeKind::Enum { .. }) if a.is_numeric() || *a == SpecialType::Char => {
                // Literal zero converts implicitly to any enum.
                let zero = constant.and_then(ConstValue::as_i128) == Some(0);
                if zero {
                    TargetConversion::EXISTS
                        | TargetConversion::IMPLICIT
                        | TargetConversion::ENUMERATION
                        | TargetConversion::CONSTANT_EXPRESSION
                } else {
                    TargetConversion::EXISTS
                        | TargetConversion::EXPLICIT
                        | TargetConversion::ENUMERATION
                }
            }
            (TypeKind::Enum { .. }, TypeKind::Enum { .. }) => {
                TargetConversion::EXISTS | TargetConversion::EXPLICIT | TargetConversion::ENUMERATION
            }
            (_, TypeKind::Special(SpecialType::Object)) => {
                let kind = if from_info.is_value_type() {
                    TargetConversion::BOXING
                } else {
                    TargetConversion::REFERENCE
                };
                TargetConversion::EXISTS | TargetConversion::IMPLICIT | kind
            }
            (TypeKind::Special(SpecialType::Object), _) => {
                let kind = if to_info.is_value_type() {
                    TargetConversion::UNBOXING
                } else {
                    TargetConversion::REFERENCE
                };
                TargetConversion::EXISTS | TargetConversion::EXPLICIT | kind
            }
            (_, TypeKind::Nullable { underlying }) if *underlying == from => {
                TargetConversion::EXISTS | TargetConversion::IMPLICIT | TargetConversion::NULLABLE
            }
            (TypeKind::Nullable { underlying }, _) if *underlying == to => {
                TargetConversion::EXISTS | TargetConversion::EXPLICIT | TargetConversion::NULLABLE
            }
            _ if from_info.is_reference_type() && to_info.is_reference_type() => {
                TargetConversion::EXISTS | TargetConversion::EXPLICIT | TargetConversion::REFERENCE
            }
            _ => TargetConversion::empty(),
        }
    }
}

impl SemanticModel for SemanticTable {
    fn static_type(&self, node: NodeIndex) -> Option<TypeId> {
        self.static_types.get(&node).copied()
    }

    fn converted_type(&self, node: NodeIndex) -> Option<TypeId> {
        self.converted_types
            .get(&node)
            .or_else(|| self.static_types.get(&node))
            .copied()
    }

    fn constant_value(&self, node: NodeIndex) -> Option<ConstValue> {
        self.constants.get(&node).cloned()
    }

    fn resolve_symbol(&self, node: NodeIndex) -> Option<SymbolId> {
        self.referenced.get(&node).copied()
    }

    fn declared_symbol(&self, node: NodeIndex) -> Option<SymbolId> {
        self.declared.get(&node).copied()
    }

    fn symbol(&self, id: SymbolId) -> Option<&Symbol> {
        self.symbols.get(id.0 as usize)
    }

    fn type_info(&self, id: TypeId) -> Option<&TypeInfo> {
        self.types.get(id.0 as usize)
    }

    fn analyze_data_flow(&self, statements: &[NodeIndex]) -> DataFlowInfo {
        let mut info = DataFlowInfo::default();
        let push_unique = |list: &mut Vec<SymbolId>, symbols: Option<&Vec<SymbolId>>| {
            for &symbol in symbols.into_iter().flatten() {
                if !list.contains(&symbol) {
                    list.push(symbol);
                }
            }
        };
        for statement in statements {
            push_unique(&mut info.read_inside, self.reads.get(statement));
            push_unique(&mut info.written_inside, self.writes.get(statement));
        }
        info.always_assigned = info.written_inside.clone();
        trace!(
            statements = statements.len(),
            reads = info.read_inside.len(),
            writes = info.written_inside.len(),
            "data flow"
        );
        info
    }

    fn analyze_control_flow(&self, statements: &[NodeIndex]) -> ControlFlowInfo {
        let end_point_reachable = statements
            .last()
            .is_none_or(|last| !self.unreachable_ends.contains(last));
        ControlFlowInfo {
            end_point_reachable,
        }
    }

    fn lookup_visible_names(&self, node: NodeIndex) -> Vec<String> {
        let mut names = self.global_names.clone();
        if let Some(local) = self.visible_names.get(&node) {
            names.extend(local.iter().cloned());
        }
        names
    }

    fn classify_source_conversion(&self, from: TypeId, to: TypeId) -> SourceConversion {
        if let Some(&conversion) = self.source_overrides.get(&(from, to)) {
            return conversion;
        }
        self.source_conversion(from, to)
    }

    fn classify_target_conversion(
        &self,
        from: TypeId,
        to: TypeId,
        constant: Option<&ConstValue>,
    ) -> TargetConversion {
        if let Some(&conversion) = self.target_overrides.get(&(from, to)) {
            return conversion;
        }
        self.target_conversion(from, to, constant)
    }
}

#[cfg(test)]
#[path = "../tests/table.rs"]
mod tests;
