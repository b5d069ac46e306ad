//! Expression rewriting.
//!
//! `convert_expression` produces the target form of an expression without
//! adapting it to its context; `convert_value` (in `conversions`) adds the
//! context conversion on top. Operands of operators are value positions, so
//! they go through `convert_value`, while receivers and cast operands do not.

use super::Converter;
use tracing::trace;
use vbcs_semantic::{SpecialType, TypeId, TypeKind};
use vbcs_syntax::source::{
    Argument, BinaryOp, CastKind, FieldInitializer, InterpolatedPart, NodeIndex, ObjectInitializer,
    PredefinedCast, SourceKind, TypeRef, UnaryOp,
};
use vbcs_syntax::target::{CsArgument, CsInterpolation, CsNode, TypeTestKind};
use vbcs_syntax::value::ConstValue;

use crate::constant_folding::predefined_cast_type;
use crate::error::{ConversionError, ConvertResult};
use crate::literals::{SYSTEM_NAMESPACE, render_literal};
use crate::type_conversions::{ConversionKind, ConversionSite};

impl<'a> Converter<'a> {
    pub(crate) fn convert_expression(&mut self, node: NodeIndex) -> ConvertResult<CsNode> {
        self.with_expression_depth(|c| c.convert_expression_kind(node))
    }

    fn convert_expression_kind(&mut self, node: NodeIndex) -> ConvertResult<CsNode> {
        let kind = self.kind_of(node)?;
        trace!(node = node.0, kind = kind.name(), "convert expression");
        match kind {
            SourceKind::Literal { value, text } => Ok(self.convert_literal(node, value, text)),
            SourceKind::Identifier { name } => self.convert_identifier(node, name),
            SourceKind::Me | SourceKind::MyClass => Ok(CsNode::This),
            SourceKind::MyBase => Ok(CsNode::Base),
            SourceKind::MemberAccess {
                expression,
                name,
                type_args,
            } => self.convert_member_access(node, *expression, name, type_args),
            SourceKind::Invocation {
                expression,
                arguments,
            } => self.convert_invocation(node, *expression, arguments),
            SourceKind::Binary { op, left, right } => self.convert_binary(*op, *left, *right),
            SourceKind::Unary { op, operand } => self.convert_unary(*op, *operand),
            SourceKind::Cast {
                kind,
                expression,
                type_ref,
            } => self.convert_cast(node, *kind, *expression, type_ref),
            SourceKind::PredefinedCast {
                keyword,
                expression,
            } => self.convert_predefined_cast(*keyword, *expression),
            SourceKind::TypeOfIs {
                expression,
                type_ref,
                negated,
            } => {
                let operand = self.convert_expression(*expression)?;
                let type_name = self.type_ref_name(type_ref);
                let test = CsNode::type_test(operand, type_name, TypeTestKind::Is);
                Ok(if *negated { CsNode::not(test) } else { test })
            }
            SourceKind::TernaryIf {
                condition,
                when_true,
                when_false,
            } => Ok(CsNode::conditional(
                self.convert_value(*condition)?,
                self.convert_value(*when_true)?,
                self.convert_value(*when_false)?,
            )),
            SourceKind::CoalesceIf { first, second } => Ok(CsNode::binary(
                self.convert_value(*first)?,
                "??",
                self.convert_value(*second)?,
            )),
            SourceKind::Lambda {
                is_function,
                is_async,
                params,
                body,
            } => self.convert_lambda(*is_function, *is_async, params, body),
            SourceKind::ObjectCreation {
                type_ref,
                arguments,
                initializer,
            } => self.convert_object_creation(node, type_ref, arguments.as_deref(), initializer.as_ref()),
            SourceKind::AnonymousObject { members } => {
                let initializer = self.convert_member_initializers(members)?;
                Ok(CsNode::ObjectCreation {
                    type_name: String::new(),
                    arguments: None,
                    initializer: Some(initializer),
                })
            }
            SourceKind::ArrayCreation {
                element_type,
                bounds,
                rank,
                initializer,
            } => self.convert_array_creation(element_type, bounds, *rank, *initializer),
            SourceKind::CollectionInitializer { elements } => self.convert_array_literal(node, elements),
            SourceKind::Query { clauses } => self.convert_query(clauses),
            SourceKind::AddressOf { expression } => self.convert_reference(*expression),
            SourceKind::Parenthesized { expression } => {
                Ok(self.convert_expression(*expression)?.paren())
            }
            SourceKind::InterpolatedString { parts } => self.convert_interpolated_string(parts),
            SourceKind::GetType { type_ref } => Ok(CsNode::TypeOf(self.type_ref_name(type_ref))),
            SourceKind::NameOf { expression } => {
                Ok(CsNode::NameOf(Box::new(self.convert_reference(*expression)?)))
            }
            SourceKind::Await { expression } => {
                Ok(CsNode::Await(Box::new(self.convert_value(*expression)?)))
            }
            other => Err(ConversionError::unsupported(
                other.name(),
                "not valid in an expression position",
            )),
        }
    }

    // =========================================================================
    // Literals
    // =========================================================================

    fn convert_literal(&mut self, node: NodeIndex, value: &ConstValue, text: &str) -> CsNode {
        if matches!(value, ConstValue::Nothing) {
            // `Nothing` is the default of whatever type the context wants.
            let wants_value_type = self
                .model
                .converted_type(node)
                .is_some_and(|t| self.is_value_type(t));
            return if wants_value_type {
                CsNode::DefaultLiteral(None)
            } else {
                CsNode::NullLiteral
            };
        }
        render_literal(value, Some(text), &mut self.ctx.extra_imports)
    }

    fn convert_interpolated_string(&mut self, parts: &[InterpolatedPart]) -> ConvertResult<CsNode> {
        let mut converted = Vec::with_capacity(parts.len());
        for part in parts {
            converted.push(match part {
                InterpolatedPart::Text(text) => CsInterpolation::Text(text.clone()),
                InterpolatedPart::Expression {
                    expression,
                    alignment,
                    format,
                } => CsInterpolation::Expression {
                    expression: self.convert_value(*expression)?,
                    alignment: alignment.map(|a| self.convert_value(a)).transpose()?,
                    format: format.clone(),
                },
            });
        }
        Ok(CsNode::InterpolatedString(converted))
    }

    // =========================================================================
    // Operators
    // =========================================================================

    fn operand_special(&self, node: NodeIndex) -> Option<SpecialType> {
        self.value_type(node).and_then(|t| self.numeric_special_of(t))
    }

    fn convert_binary(&mut self, op: BinaryOp, left: NodeIndex, right: NodeIndex) -> ConvertResult<CsNode> {
        if op.is_comparison() || matches!(op, BinaryOp::Is | BinaryOp::IsNot | BinaryOp::Like) {
            return self.convert_comparison(op, left, right);
        }
        let mut l = self.convert_value(left)?;
        let mut r = self.convert_value(right)?;
        let operator = match op {
            BinaryOp::Add => "+",
            BinaryOp::Concatenate => {
                l = self.ensure_string(left, l);
                r = self.ensure_string(right, r);
                "+"
            }
            BinaryOp::Subtract => "-",
            BinaryOp::Multiply => "*",
            BinaryOp::Divide => {
                let floating = |s: Option<SpecialType>| {
                    s.is_some_and(|s| s.is_floating() || s == SpecialType::Decimal)
                };
                if !floating(self.operand_special(left)) && !floating(self.operand_special(right)) {
                    l = CsNode::cast("double", l);
                }
                "/"
            }
            BinaryOp::IntegerDivide => "/",
            BinaryOp::Modulo => "%",
            BinaryOp::Power => {
                self.require_import(SYSTEM_NAMESPACE);
                return Ok(CsNode::static_call("Math", "Pow", vec![l, r]));
            }
            BinaryOp::And => "&",
            BinaryOp::Or => "|",
            BinaryOp::Xor => "^",
            BinaryOp::AndAlso => "&&",
            BinaryOp::OrElse => "||",
            BinaryOp::LeftShift => "<<",
            BinaryOp::RightShift => ">>",
            BinaryOp::Equals
            | BinaryOp::NotEquals
            | BinaryOp::LessThan
            | BinaryOp::LessThanOrEqual
            | BinaryOp::GreaterThan
            | BinaryOp::GreaterThanOrEqual
            | BinaryOp::Is
            | BinaryOp::IsNot
            | BinaryOp::Like => {
                return Err(ConversionError::unsupported(
                    "BinaryExpression",
                    "comparison operator outside a comparison",
                ));
            }
        };
        Ok(CsNode::binary(l, operator, r))
    }

    /// Concatenation operands the model did not already convert to `String`.
    pub(crate) fn ensure_string(&mut self, node: NodeIndex, converted: CsNode) -> CsNode {
        let is_text = self
            .value_type(node)
            .is_some_and(|t| t == TypeId::STRING || t == TypeId::CHAR);
        if is_text || matches!(converted, CsNode::StringLiteral { .. }) {
            converted
        } else {
            self.runtime_conversion(converted, TypeId::STRING)
        }
    }

    fn convert_unary(&mut self, op: UnaryOp, operand: NodeIndex) -> ConvertResult<CsNode> {
        let value = self.convert_value(operand)?;
        Ok(match op {
            UnaryOp::Plus => CsNode::prefix("+", value),
            UnaryOp::Minus => CsNode::prefix("-", value),
            UnaryOp::Not => {
                let is_bitwise = self.value_type(operand).is_some_and(|t| {
                    t != TypeId::BOOLEAN && self.numeric_special_of(t).is_some_and(SpecialType::is_integral)
                });
                if is_bitwise {
                    CsNode::prefix("~", value)
                } else {
                    CsNode::not(value)
                }
            }
        })
    }

    // =========================================================================
    // Casts
    // =========================================================================

    fn convert_cast(
        &mut self,
        node: NodeIndex,
        kind: CastKind,
        expression: NodeIndex,
        type_ref: &TypeRef,
    ) -> ConvertResult<CsNode> {
        match kind {
            CastKind::TryCast => {
                let operand = self.convert_expression(expression)?;
                let type_name = self.type_ref_name(type_ref);
                Ok(CsNode::type_test(operand, type_name, TypeTestKind::As))
            }
            CastKind::DirectCast => {
                let operand = self.convert_expression(expression)?;
                let type_name = self.type_ref_name(type_ref);
                Ok(CsNode::cast(type_name, operand))
            }
            CastKind::CType => match self.model.static_type(node) {
                Some(target) => self.convert_explicit(expression, target),
                None => {
                    let operand = self.convert_expression(expression)?;
                    let type_name = self.type_ref_name(type_ref);
                    Ok(CsNode::cast(type_name, operand))
                }
            },
        }
    }

    pub(crate) fn convert_predefined_cast(
        &mut self,
        keyword: PredefinedCast,
        expression: NodeIndex,
    ) -> ConvertResult<CsNode> {
        if keyword == PredefinedCast::CObj {
            return self.convert_expression(expression);
        }
        let target = TypeId::of_special(predefined_cast_type(keyword));
        self.convert_explicit(expression, target)
    }

    /// `CType`-style conversion of `expression` to `target`. Without type
    /// information the runtime helper keeps the source semantics.
    fn convert_explicit(&mut self, expression: NodeIndex, target: TypeId) -> ConvertResult<CsNode> {
        let operand = self.convert_expression(expression)?;
        let site = ConversionSite {
            is_constant: false,
            always_explicit: true,
        };
        let kind = match self.analyzer().classify(expression, Some(target), site) {
            ConversionKind::Unknown => ConversionKind::RuntimeConversion,
            kind => kind,
        };
        self.apply_conversion(expression, operand, kind, target)
    }

    // =========================================================================
    // Creation
    // =========================================================================

    fn convert_member_initializers(&mut self, members: &[FieldInitializer]) -> ConvertResult<Vec<CsNode>> {
        members
            .iter()
            .map(|member| {
                let value = self.convert_value(member.value)?;
                Ok(CsNode::assign(CsNode::id(member.name.clone()), value))
            })
            .collect()
    }

    fn convert_object_creation(
        &mut self,
        node: NodeIndex,
        type_ref: &TypeRef,
        arguments: Option<&'a [Argument]>,
        initializer: Option<&'a ObjectInitializer>,
    ) -> ConvertResult<CsNode> {
        let type_name = self.type_ref_name(type_ref);
        let parameters = self.symbol_of(node).map(|s| s.parameters.as_slice()).unwrap_or(&[]);
        let arguments: Option<Vec<CsArgument>> = match arguments {
            Some(arguments) => Some(self.convert_arguments(arguments, parameters)?),
            None => None,
        };
        let initializer = match initializer {
            None => None,
            Some(ObjectInitializer::Members(members)) => Some(self.convert_member_initializers(members)?),
            Some(ObjectInitializer::Collection(elements)) => {
                let mut items = Vec::with_capacity(elements.len());
                for element in elements {
                    items.push(self.convert_initializer_element(*element)?);
                }
                Some(items)
            }
        };
        let arguments = match (&arguments, &initializer) {
            (None, None) => Some(Vec::new()),
            _ => arguments,
        };
        Ok(CsNode::ObjectCreation {
            type_name,
            arguments,
            initializer,
        })
    }

    /// Element of an initializer list; nested `{...}` stay nested lists.
    fn convert_initializer_element(&mut self, node: NodeIndex) -> ConvertResult<CsNode> {
        if let SourceKind::CollectionInitializer { elements } = self.kind_of(node)? {
            let mut items = Vec::with_capacity(elements.len());
            for element in elements {
                items.push(self.convert_initializer_element(*element)?);
            }
            return Ok(CsNode::InitializerList(items));
        }
        self.convert_value(node)
    }

    fn convert_array_creation(
        &mut self,
        element_type: &TypeRef,
        bounds: &[NodeIndex],
        rank: u32,
        initializer: Option<NodeIndex>,
    ) -> ConvertResult<CsNode> {
        let element_type = self.type_ref_name(element_type);
        let mut sizes = Vec::with_capacity(bounds.len());
        for bound in bounds {
            sizes.push(self.array_length(*bound)?);
        }
        let initializer = match initializer {
            Some(init) => Some(self.initializer_items(init)?),
            None if sizes.is_empty() => Some(Vec::new()),
            None => None,
        };
        Ok(CsNode::ArrayCreation {
            element_type,
            sizes,
            rank: rank.max(1),
            initializer,
        })
    }

    fn initializer_items(&mut self, node: NodeIndex) -> ConvertResult<Vec<CsNode>> {
        match self.kind_of(node)? {
            SourceKind::CollectionInitializer { elements } => {
                let mut items = Vec::with_capacity(elements.len());
                for element in elements {
                    items.push(self.convert_initializer_element(*element)?);
                }
                Ok(items)
            }
            _ => Ok(vec![self.convert_value(node)?]),
        }
    }

    /// Array literal `{1, 2}`: `new T[] {...}` typed from the converted type.
    fn convert_array_literal(&mut self, node: NodeIndex, elements: &[NodeIndex]) -> ConvertResult<CsNode> {
        let array = self
            .value_type(node)
            .and_then(|t| match self.type_info(t).map(|info| &info.kind) {
                Some(TypeKind::Array { element, rank }) => Some((*element, *rank)),
                _ => None,
            });
        let (element_type, rank) = match array {
            Some((element, rank)) => (self.type_name(element), rank),
            None => (String::new(), 1),
        };
        let mut items = Vec::with_capacity(elements.len());
        for element in elements {
            items.push(self.convert_initializer_element(*element)?);
        }
        Ok(CsNode::ArrayCreation {
            element_type,
            sizes: Vec::new(),
            rank,
            initializer: Some(items),
        })
    }

    /// Length of an array dimension from its upper bound (`ub + 1`), folded
    /// when the bound is constant.
    pub(crate) fn array_length(&mut self, upper_bound: NodeIndex) -> ConvertResult<CsNode> {
        if let Ok(value) = self.folder().fold_to(upper_bound, SpecialType::Int64)
            && let Some(ub) = value.as_i128()
        {
            return Ok(CsNode::number((ub + 1).to_string()));
        }
        // `n - 1` becomes `n` rather than `n - 1 + 1`.
        if let SourceKind::Binary {
            op: BinaryOp::Subtract,
            left,
            right,
        } = self.kind_of(self.arena.skip_parentheses(upper_bound))?
            && self.literal_value(*right).and_then(|v| v.as_i128()) == Some(1)
        {
            return self.convert_value(*left);
        }
        let bound = self.convert_value(upper_bound)?;
        Ok(CsNode::binary(bound, "+", CsNode::number("1")))
    }
}
