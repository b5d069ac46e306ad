//! By-reference arguments.
//!
//! The target only passes storage by reference. Anything else in a
//! `ByRef` position (a property, a call result, a converted value) is copied
//! into a fresh local declared right before the enclosing statement; the
//! local is passed instead. Writable properties are copied back after the
//! statement, which is what the source dialect does for them.

use super::Converter;
use tracing::trace;
use vbcs_common::names::upper_first;
use vbcs_semantic::{ParameterInfo, PassingMode, SymbolKind, TypeId};
use vbcs_syntax::source::{NodeIndex, SourceKind};
use vbcs_syntax::target::{CsArgument, CsNode, RefKind};

use crate::context::AdditionalLocal;
use crate::error::ConvertResult;
use crate::type_conversions::ConversionSite;

const ARGUMENT_PREFIX: &str = "arg";

impl<'a> Converter<'a> {
    pub(crate) fn convert_by_ref_argument(
        &mut self,
        expression: NodeIndex,
        parameter: &ParameterInfo,
    ) -> ConvertResult<CsArgument> {
        let ref_kind = if parameter.passing == PassingMode::Out {
            RefKind::Out
        } else {
            RefKind::Ref
        };
        if self.is_simple_storage(expression, parameter.type_id) {
            let storage = self.convert_expression(expression)?;
            return Ok(CsArgument::by_ref(storage, ref_kind));
        }

        let base = format!("{ARGUMENT_PREFIX}{}", upper_first(&parameter.name));
        let name = self.unique_name(&base, expression);
        let site = ConversionSite {
            is_constant: false,
            always_explicit: true,
        };
        let initializer = self.convert_value_to(expression, Some(parameter.type_id), site)?;
        let declared_type = self.type_name(parameter.type_id);
        let write_back = self
            .write_back_target(expression)?
            .map(|target| CsNode::assign(target, CsNode::id(name.clone())));
        trace!(%name, write_back = write_back.is_some(), "hoisting by-ref argument");
        self.ctx.locals.add(AdditionalLocal {
            prefix: ARGUMENT_PREFIX.to_string(),
            name: name.clone(),
            declared_type,
            initializer,
            write_back,
        })?;
        Ok(CsArgument::by_ref(CsNode::id(name), ref_kind))
    }

    /// Locals, parameters, writable fields and array elements of exactly the
    /// parameter's type. Parentheses make the source pass a copy.
    fn is_simple_storage(&self, expression: NodeIndex, parameter_type: TypeId) -> bool {
        if self.model.static_type(expression) != Some(parameter_type) {
            return false;
        }
        match self.arena.kind(expression) {
            Some(SourceKind::Identifier { .. } | SourceKind::MemberAccess { .. }) => self
                .symbol_of(expression)
                .is_some_and(|symbol| symbol.is_assignable_storage()),
            Some(SourceKind::Invocation { expression: array, .. }) => self
                .model
                .static_type(*array)
                .and_then(|t| self.type_info(t))
                .is_some_and(|info| info.is_array()),
            _ => false,
        }
    }

    /// Writable property the hoisted copy is assigned back to. Only
    /// receivers that can be evaluated twice qualify.
    fn write_back_target(&mut self, expression: NodeIndex) -> ConvertResult<Option<CsNode>> {
        let writable = self.symbol_of(expression).is_some_and(|symbol| {
            matches!(
                symbol.kind,
                SymbolKind::Property {
                    is_read_only: false,
                    ..
                }
            )
        });
        if !writable {
            return Ok(None);
        }
        let stable_receiver = match self.kind_of(expression)? {
            SourceKind::Identifier { .. } => true,
            SourceKind::MemberAccess { expression: None, .. } => true,
            SourceKind::MemberAccess {
                expression: Some(receiver),
                ..
            } => matches!(
                self.kind_of(*receiver)?,
                SourceKind::Identifier { .. } | SourceKind::Me | SourceKind::MyBase | SourceKind::MyClass
            ),
            _ => false,
        };
        if !stable_receiver {
            return Ok(None);
        }
        self.convert_reference(expression).map(Some)
    }
}
