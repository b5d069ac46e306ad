//! Adapting expressions to their context type.

use super::Converter;
use tracing::debug;
use vbcs_common::{diagnostic_codes, format_message};
use vbcs_semantic::{SpecialType, TypeId, TypeKind};
use vbcs_syntax::source::{NodeIndex, SourceKind, UnaryOp};
use vbcs_syntax::target::CsNode;
use vbcs_syntax::value::ConstValue;

use crate::constant_folding::convert_value;
use crate::error::ConvertResult;
use crate::literals::{render_literal, render_numeric_value};
use crate::type_conversions::{ConversionKind, ConversionSite};

/// Namespace of the source dialect's runtime helpers (`Conversions`,
/// `Operators`, `LikeOperator`).
pub(crate) const COMPILER_SERVICES: &str = "Microsoft.VisualBasic.CompilerServices";

impl<'a> Converter<'a> {
    /// Convert an expression in a value position: the rewritten expression
    /// adapted to the type its context converts it to.
    pub(crate) fn convert_value(&mut self, node: NodeIndex) -> ConvertResult<CsNode> {
        self.convert_value_to(node, None, ConversionSite::default())
    }

    /// Convert an expression and adapt it to `target` (its converted type
    /// when `None`).
    pub(crate) fn convert_value_to(
        &mut self,
        node: NodeIndex,
        target: Option<TypeId>,
        site: ConversionSite,
    ) -> ConvertResult<CsNode> {
        let expression = self.convert_expression(node)?;
        let Some(to) = target.or_else(|| self.model.converted_type(node)) else {
            return Ok(expression);
        };
        let kind = self.analyzer().classify(node, Some(to), site);
        self.apply_conversion(node, expression, kind, to)
    }

    pub(crate) fn apply_conversion(
        &mut self,
        node: NodeIndex,
        expression: CsNode,
        kind: ConversionKind,
        to: TypeId,
    ) -> ConvertResult<CsNode> {
        let converted = match kind {
            ConversionKind::Identity | ConversionKind::Unknown => expression,
            ConversionKind::NonDestructiveCast => self.widening_cast(node, expression, to),
            ConversionKind::DestructiveCast => {
                let type_name = self.type_name(to);
                CsNode::cast(type_name, expression)
            }
            ConversionKind::RuntimeConversion => self.runtime_conversion(expression, to),
            ConversionKind::ConstantFold => self.fold_constant(node, expression, to),
        };
        Ok(converted)
    }

    /// Value of a literal, looking through parentheses and a leading sign.
    pub(crate) fn literal_value(&self, node: NodeIndex) -> Option<ConstValue> {
        let node = self.arena.skip_parentheses(node);
        if let Some(value) = self.model.constant_value(node) {
            return Some(value);
        }
        match self.arena.kind(node)? {
            SourceKind::Literal { value, .. } => Some(value.clone()),
            SourceKind::Unary {
                op: UnaryOp::Minus,
                ..
            } => self.folder().fold(node).ok(),
            _ => None,
        }
    }

    /// Cast that cannot change the value. Numeric literals are re-rendered in
    /// the destination type instead (`5` as `long` is `5L`).
    fn widening_cast(&mut self, node: NodeIndex, expression: CsNode, to: TypeId) -> CsNode {
        let is_literal = matches!(
            expression.unparenthesized(),
            CsNode::NumericLiteral(_)
        ) || matches!(
            expression.unparenthesized(),
            CsNode::PrefixUnary { operator: "-", operand } if matches!(operand.unparenthesized(), CsNode::NumericLiteral(_))
        );
        if is_literal
            && let Some(special) = self.special_of(to).filter(|s| s.is_numeric())
            && let Some(value) = self.literal_value(node)
            && let Ok(converted) = convert_value(&value, special)
        {
            return CsNode::number(render_numeric_value(&converted));
        }
        let type_name = self.type_name(to);
        CsNode::cast(type_name, expression)
    }

    /// Call to the runtime conversion helper for `to`, or a plain cast when
    /// runtime conversions are turned off.
    pub(crate) fn runtime_conversion(&mut self, expression: CsNode, to: TypeId) -> CsNode {
        if !self.options.emit_runtime_conversions {
            let type_name = self.type_name(to);
            return CsNode::cast(type_name, expression);
        }
        let kind = self.type_info(to).map(|info| &info.kind);
        match kind {
            Some(TypeKind::Special(SpecialType::Object)) => expression,
            Some(TypeKind::Special(special)) => match special.conversion_helper() {
                Some(helper) => {
                    self.require_import(COMPILER_SERVICES);
                    CsNode::static_call("Conversions", helper, vec![expression])
                }
                None => expression,
            },
            Some(TypeKind::Enum { underlying }) => {
                let underlying = *underlying;
                let inner = self.runtime_conversion(expression, underlying);
                let type_name = self.type_name(to);
                CsNode::cast(type_name, inner)
            }
            _ => {
                self.require_import(COMPILER_SERVICES);
                let type_name = self.type_name(to);
                CsNode::call(
                    CsNode::member(
                        CsNode::id("Conversions"),
                        format!("ToGenericParameter<{type_name}>"),
                    ),
                    vec![expression],
                )
            }
        }
    }

    /// Evaluate a constant conversion now. A failed evaluation keeps the
    /// runtime form and says why in a trailing comment.
    fn fold_constant(&mut self, node: NodeIndex, expression: CsNode, to: TypeId) -> CsNode {
        let Some(special) = self.numeric_special_of(to) else {
            let type_name = self.type_name(to);
            return CsNode::cast(type_name, expression);
        };
        match self.folder().fold_to(node, special) {
            Ok(value) => {
                let literal = render_literal(&value, None, &mut self.ctx.extra_imports);
                if self.type_info(to).is_some_and(|info| info.is_enum()) {
                    let type_name = self.type_name(to);
                    CsNode::cast(type_name, literal)
                } else {
                    literal
                }
            }
            Err(error) => {
                debug!(node = node.0, %error, "constant fold failed, emitting runtime conversion");
                let message = format_message(
                    diagnostic_codes::CONSTANT_EVALUATION_TEMPLATE,
                    &[&error.to_string()],
                );
                self.warn(node, diagnostic_codes::CONSTANT_EVALUATION_FAILED, message);
                self.runtime_conversion(expression, to)
                    .with_comment(format!("CONVERSION WARNING: {error}"))
            }
        }
    }
}
