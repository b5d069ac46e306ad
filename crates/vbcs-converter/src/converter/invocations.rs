//! `expression(arguments)`: calls, array indexing and property indexing.
//!
//! The source dialect writes all three the same way; the resolved symbol
//! decides which target form applies.

use super::Converter;
use tracing::trace;
use vbcs_common::names_equal;
use vbcs_semantic::{ParameterInfo, Symbol, SymbolKind, TypeId, TypeKind};
use vbcs_syntax::source::{Argument, NodeIndex, PredefinedCast, SourceKind};
use vbcs_syntax::target::{CsArgument, CsNode};

use crate::error::{ConversionError, ConvertResult};

/// Target form of an invocation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum InvocationShape {
    /// `f(args)` on the reference form of the callee
    Call,
    /// `d(args)` on a delegate-typed value
    DelegateCall,
    /// `x[args]` on the value of the callee
    Element,
    /// `this[args]` / `obj[args]` for an explicitly named default property
    DefaultProperty,
}

impl<'a> Converter<'a> {
    pub(crate) fn convert_invocation(
        &mut self,
        node: NodeIndex,
        expression: NodeIndex,
        arguments: &'a [Argument],
    ) -> ConvertResult<CsNode> {
        if let Some(cast) = self.intrinsic_cast(expression, arguments) {
            return self.convert_predefined_cast(cast.0, cast.1);
        }
        let symbol = self.symbol_of(node).or_else(|| self.symbol_of(expression));
        let shape = self.invocation_shape(node, expression, symbol);
        trace!(node = node.0, ?shape, "invocation shape");
        let parameters: &'a [ParameterInfo] = match (shape, symbol) {
            (InvocationShape::Element, Some(symbol)) if !symbol.is_property() => &[],
            (_, Some(symbol)) => symbol.parameters.as_slice(),
            (_, None) => &[],
        };

        match shape {
            InvocationShape::Call => {
                let callee = self.convert_reference(expression)?;
                let arguments = self.convert_arguments(arguments, parameters)?;
                Ok(CsNode::call_with(callee, arguments))
            }
            InvocationShape::DelegateCall => {
                let callee = self.convert_value(expression)?;
                let arguments = self.convert_arguments(arguments, parameters)?;
                Ok(CsNode::call_with(callee, arguments))
            }
            InvocationShape::Element => {
                let object = self.convert_value(expression)?;
                let arguments = self.convert_arguments(arguments, parameters)?;
                Ok(element_with(object, arguments))
            }
            InvocationShape::DefaultProperty => {
                let object = match self.kind_of(expression)? {
                    SourceKind::MemberAccess {
                        expression: Some(receiver),
                        ..
                    } => self.convert_expression(*receiver)?,
                    SourceKind::MemberAccess { expression: None, .. } => {
                        self.ctx.with_receivers.last().cloned().ok_or_else(|| {
                            ConversionError::unsupported(
                                "InvocationExpression",
                                "'.' member access outside a With block",
                            )
                        })?
                    }
                    _ => CsNode::This,
                };
                let arguments = self.convert_arguments(arguments, parameters)?;
                Ok(element_with(object, arguments))
            }
        }
    }

    /// `CInt(x)` and friends when the front-end left them as calls.
    fn intrinsic_cast(&self, expression: NodeIndex, arguments: &[Argument]) -> Option<(PredefinedCast, NodeIndex)> {
        let SourceKind::Identifier { name } = self.arena.kind(expression)? else {
            return None;
        };
        if self.symbol_of(expression).is_some() {
            return None;
        }
        let cast = PredefinedCast::from_name(name)?;
        match arguments {
            [Argument {
                name: None,
                expression: Some(operand),
            }] => Some((cast, *operand)),
            _ => None,
        }
    }

    fn invocation_shape(&self, node: NodeIndex, expression: NodeIndex, symbol: Option<&Symbol>) -> InvocationShape {
        let Some(symbol) = symbol else {
            let indexable = self.model.static_type(expression).is_some_and(|t| {
                t == TypeId::STRING || self.type_info(t).is_some_and(|info| info.is_array())
            });
            return if indexable {
                InvocationShape::Element
            } else {
                InvocationShape::Call
            };
        };
        match symbol.kind {
            SymbolKind::Method { .. } | SymbolKind::Constructor | SymbolKind::Event => InvocationShape::Call,
            SymbolKind::Property { is_default, .. } => {
                let names_itself = self.model.resolve_symbol(expression).is_some()
                    && self.model.resolve_symbol(expression) == self.model.resolve_symbol(node);
                if is_default && names_itself && !symbol.parameters.is_empty() {
                    InvocationShape::DefaultProperty
                } else {
                    InvocationShape::Element
                }
            }
            _ => {
                let value_type = self.value_type(expression).and_then(|t| self.type_info(t));
                if value_type.is_some_and(|info| matches!(info.kind, TypeKind::Delegate)) {
                    InvocationShape::DelegateCall
                } else {
                    InvocationShape::Element
                }
            }
        }
    }

    /// Convert an argument list against the callee's parameters.
    ///
    /// Arguments bind by name or position; the ones past the last parameter
    /// go to a trailing `ParamArray`. Once an argument has been omitted, the
    /// following ones are passed by name since the target cannot skip
    /// positions.
    pub(crate) fn convert_arguments(
        &mut self,
        arguments: &'a [Argument],
        parameters: &'a [ParameterInfo],
    ) -> ConvertResult<Vec<CsArgument>> {
        let mut converted = Vec::with_capacity(arguments.len());
        let mut after_omitted = false;
        for (position, argument) in arguments.iter().enumerate() {
            let parameter = match &argument.name {
                Some(name) => parameters.iter().find(|p| names_equal(&p.name, name)),
                None => parameters
                    .get(position)
                    .or_else(|| parameters.last().filter(|p| p.is_param_array)),
            };
            let Some(expression) = argument.expression else {
                after_omitted = true;
                continue;
            };
            let mut result = match parameter {
                Some(parameter) if parameter.passing.is_by_ref() => {
                    self.convert_by_ref_argument(expression, parameter)?
                }
                _ => CsArgument::new(self.convert_value(expression)?),
            };
            if let Some(name) = &argument.name {
                let name = parameter.map_or(name.as_str(), |p| p.name.as_str());
                result = result.named(name);
            } else if after_omitted {
                let Some(parameter) = parameter else {
                    return Err(ConversionError::unsupported(
                        "ArgumentList",
                        "argument after an omitted one has no known parameter",
                    ));
                };
                result = result.named(parameter.name.clone());
            }
            converted.push(result);
        }
        Ok(converted)
    }
}

fn element_with(object: CsNode, arguments: Vec<CsArgument>) -> CsNode {
    CsNode::ElementAccess {
        object: Box::new(object.paren_if_below(vbcs_syntax::target::precedence::PRIMARY)),
        arguments,
    }
}
