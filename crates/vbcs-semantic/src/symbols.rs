//! Symbols resolved by the semantic model.

use crate::types::TypeId;
use smallvec::SmallVec;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SymbolId(pub u32);

/// How an argument is passed to a parameter.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum PassingMode {
    #[default]
    ByValue,
    ByRef,
    /// By-reference parameter the target dialect declares `out`
    Out,
}

impl PassingMode {
    pub const fn is_by_ref(self) -> bool {
        matches!(self, Self::ByRef | Self::Out)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParameterInfo {
    pub name: String,
    pub type_id: TypeId,
    pub passing: PassingMode,
    pub is_optional: bool,
    pub is_param_array: bool,
}

impl ParameterInfo {
    pub fn new(name: impl Into<String>, type_id: TypeId) -> Self {
        Self {
            name: name.into(),
            type_id,
            passing: PassingMode::ByValue,
            is_optional: false,
            is_param_array: false,
        }
    }

    pub fn by_ref(name: impl Into<String>, type_id: TypeId) -> Self {
        Self {
            passing: PassingMode::ByRef,
            ..Self::new(name, type_id)
        }
    }

    pub fn out(name: impl Into<String>, type_id: TypeId) -> Self {
        Self {
            passing: PassingMode::Out,
            ..Self::new(name, type_id)
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SymbolKind {
    Method { is_function: bool },
    Constructor,
    Property { is_default: bool, is_read_only: bool },
    Field { is_read_only: bool, is_const: bool, is_with_events: bool },
    Local { is_const: bool },
    Parameter,
    /// Implicit variable named after the enclosing function or property getter
    FunctionReturnValue,
    Event,
    Type,
    Namespace,
}

/// A resolved symbol.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Symbol {
    /// Declared spelling
    pub name: String,
    pub kind: SymbolKind,
    /// Value type of variables/properties/fields, return type of methods,
    /// the type itself for type symbols
    pub type_id: TypeId,
    pub is_shared: bool,
    pub containing_type: Option<TypeId>,
    pub parameters: SmallVec<[ParameterInfo; 4]>,
}

impl Symbol {
    pub fn new(name: impl Into<String>, kind: SymbolKind, type_id: TypeId) -> Self {
        Self {
            name: name.into(),
            kind,
            type_id,
            is_shared: false,
            containing_type: None,
            parameters: SmallVec::new(),
        }
    }

    pub fn local(name: impl Into<String>, type_id: TypeId) -> Self {
        Self::new(name, SymbolKind::Local { is_const: false }, type_id)
    }

    pub fn parameter(name: impl Into<String>, type_id: TypeId) -> Self {
        Self::new(name, SymbolKind::Parameter, type_id)
    }

    pub fn field(name: impl Into<String>, type_id: TypeId) -> Self {
        Self::new(
            name,
            SymbolKind::Field {
                is_read_only: false,
                is_const: false,
                is_with_events: false,
            },
            type_id,
        )
    }

    pub fn property(name: impl Into<String>, type_id: TypeId) -> Self {
        Self::new(
            name,
            SymbolKind::Property {
                is_default: false,
                is_read_only: false,
            },
            type_id,
        )
    }

    /// `Sub` when `return_type` is `TypeId::VOID`, `Function` otherwise.
    pub fn method(name: impl Into<String>, return_type: TypeId, parameters: Vec<ParameterInfo>) -> Self {
        Self {
            parameters: parameters.into(),
            ..Self::new(
                name,
                SymbolKind::Method {
                    is_function: return_type != TypeId::VOID,
                },
                return_type,
            )
        }
    }

    pub fn type_symbol(name: impl Into<String>, type_id: TypeId) -> Self {
        Self::new(name, SymbolKind::Type, type_id)
    }

    #[must_use]
    pub const fn shared(mut self) -> Self {
        self.is_shared = true;
        self
    }

    #[must_use]
    pub const fn in_type(mut self, containing: TypeId) -> Self {
        self.containing_type = Some(containing);
        self
    }

    #[must_use]
    pub fn with_parameters(mut self, parameters: Vec<ParameterInfo>) -> Self {
        self.parameters = parameters.into();
        self
    }

    pub const fn is_method(&self) -> bool {
        matches!(self.kind, SymbolKind::Method { .. })
    }

    pub const fn is_property(&self) -> bool {
        matches!(self.kind, SymbolKind::Property { .. })
    }

    /// Locals, parameters and writable fields: storage that can be passed
    /// by reference directly.
    pub const fn is_assignable_storage(&self) -> bool {
        match self.kind {
            SymbolKind::Local { is_const } => !is_const,
            SymbolKind::Parameter | SymbolKind::FunctionReturnValue => true,
            SymbolKind::Field {
                is_read_only,
                is_const,
                is_with_events,
            } => !is_read_only && !is_const && !is_with_events,
            _ => false,
        }
    }

    pub fn has_by_ref_parameters(&self) -> bool {
        self.parameters.iter().any(|p| p.passing.is_by_ref())
    }
}
