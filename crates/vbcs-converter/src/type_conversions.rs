//! Classification of implicit conversions.
//!
//! The source dialect converts implicitly in many places the target dialect
//! requires a cast, and some of its conversions (to `String`, from `Object`,
//! checked numeric narrowing) have runtime semantics no target cast
//! reproduces. For every expression occurrence the analyzer compares the
//! source classification of `static -> converted` with the target
//! classification of `probe -> converted` and picks one `ConversionKind`.
//!
//! The probe type is what the target dialect computes for the expression:
//! the static type, except for arithmetic, where the target's numeric
//! promotion applies (`byte + byte` is `int`).

use tracing::trace;
use vbcs_semantic::conversions::{target_binary_promotion, target_unary_promotion};
use vbcs_semantic::{SemanticModel, SpecialType, TypeId};
use vbcs_syntax::source::{BinaryOp, NodeIndex, SourceArena, SourceKind, UnaryOp};

/// How an expression must be adapted to its context type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ConversionKind {
    /// Emit the expression unchanged
    Identity,
    /// A cast that cannot change the value
    NonDestructiveCast,
    /// A cast that may truncate or throw
    DestructiveCast,
    /// A call to the runtime conversion helpers
    RuntimeConversion,
    /// Evaluate now and emit the literal result
    ConstantFold,
    /// Types unavailable; emit unchanged
    Unknown,
}

/// Caller-supplied facts about the position being converted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ConversionSite {
    /// Constant declarations, enum member values, case labels
    pub is_constant: bool,
    /// Positions where an implicit conversion is not allowed at all
    /// (by-reference arguments, switch labels)
    pub always_explicit: bool,
}

pub struct TypeConversionAnalyzer<'a> {
    arena: &'a SourceArena,
    model: &'a dyn SemanticModel,
}

impl<'a> TypeConversionAnalyzer<'a> {
    pub fn new(arena: &'a SourceArena, model: &'a dyn SemanticModel) -> Self {
        Self { arena, model }
    }

    fn special(&self, id: TypeId) -> Option<SpecialType> {
        self.model.type_info(id)?.special()
    }

    /// Type the target dialect gives an arithmetic expression, `None` for
    /// every other expression.
    pub fn probe_type(&self, node: NodeIndex) -> Option<TypeId> {
        let node = self.arena.skip_parentheses(node);
        let operand = |n: NodeIndex| {
            self.model
                .converted_type(n)
                .and_then(|t| self.special(t))
        };
        let promoted = match self.arena.kind(node)? {
            SourceKind::Binary { op, left, right } => match op {
                BinaryOp::Add
                | BinaryOp::Subtract
                | BinaryOp::Multiply
                | BinaryOp::Divide
                | BinaryOp::IntegerDivide
                | BinaryOp::Modulo
                | BinaryOp::And
                | BinaryOp::Or
                | BinaryOp::Xor => target_binary_promotion(operand(*left)?, operand(*right)?)?,
                BinaryOp::LeftShift | BinaryOp::RightShift => target_unary_promotion(operand(*left)?)?,
                BinaryOp::Power => SpecialType::Double,
                _ => return None,
            },
            SourceKind::Unary {
                op: UnaryOp::Minus | UnaryOp::Plus | UnaryOp::Not,
                operand: inner,
            } => target_unary_promotion(operand(*inner)?)?,
            _ => return None,
        };
        Some(TypeId::of_special(promoted))
    }

    /// Classify the conversion of `node` to `target` (its converted type
    /// when `None`).
    pub fn classify(
        &self,
        node: NodeIndex,
        target: Option<TypeId>,
        site: ConversionSite,
    ) -> ConversionKind {
        let kind = self.classify_inner(node, target, site);
        trace!(node = node.0, ?kind, "conversion kind");
        kind
    }

    fn classify_inner(
        &self,
        node: NodeIndex,
        target: Option<TypeId>,
        site: ConversionSite,
    ) -> ConversionKind {
        let Some(static_type) = self.model.static_type(node) else {
            return ConversionKind::Unknown;
        };
        let Some(converted) = target.or_else(|| self.model.converted_type(node)) else {
            return ConversionKind::Unknown;
        };
        let (Some(from_info), Some(to_info)) = (
            self.model.type_info(static_type),
            self.model.type_info(converted),
        ) else {
            return ConversionKind::Unknown;
        };

        let to_special = to_info.special();
        if from_info.is_enum() && to_special.is_some_and(SpecialType::is_numeric) {
            return ConversionKind::NonDestructiveCast;
        }
        let arithmetic_probe = self.probe_type(node);
        let probe = arithmetic_probe.unwrap_or(static_type);
        if converted == TypeId::OBJECT || (static_type == converted && probe == converted) {
            return ConversionKind::Identity;
        }

        let constant = self.model.constant_value(node);
        let runtime_or_fold = if constant.is_some() {
            ConversionKind::ConstantFold
        } else {
            ConversionKind::RuntimeConversion
        };
        let source = self.model.classify_source_conversion(static_type, converted);
        let target_conv = self
            .model
            .classify_target_conversion(probe, converted, constant.as_ref());
        let to_string = to_special == Some(SpecialType::String);
        let object_to_string = static_type == TypeId::OBJECT && to_string;

        if (!target_conv.exists() || target_conv.is_unboxing() || object_to_string)
            && (source.is_narrowing() || to_string)
        {
            return runtime_or_fold;
        }
        if source.is_widening() && source.is_numeric() && target_conv.is_implicit() && target_conv.is_numeric() {
            return ConversionKind::NonDestructiveCast;
        }
        if target_conv.is_explicit() && target_conv.is_enumeration() {
            return ConversionKind::NonDestructiveCast;
        }
        if target_conv.is_explicit() && target_conv.is_numeric() && source.is_narrowing() && source.is_numeric() {
            if !site.is_constant {
                return runtime_or_fold;
            }
            let fits = match (self.special(probe), to_special, constant.as_ref()) {
                (Some(from), Some(to), Some(value)) => {
                    vbcs_semantic::conversions::fits_implicit_constant(from, to, value)
                }
                _ => false,
            };
            return if fits {
                ConversionKind::Identity
            } else {
                ConversionKind::NonDestructiveCast
            };
        }
        if arithmetic_probe.is_some()
            && probe != converted
            && self
                .model
                .classify_source_conversion(converted, probe)
                .is_widening()
        {
            return runtime_or_fold;
        }

        if source.is_identity() || target_conv.is_identity() {
            return ConversionKind::Identity;
        }
        if site.always_explicit {
            return if source.is_widening() {
                ConversionKind::NonDestructiveCast
            } else {
                ConversionKind::DestructiveCast
            };
        }
        if target_conv.is_implicit() || !target_conv.exists() {
            ConversionKind::Identity
        } else {
            ConversionKind::DestructiveCast
        }
    }
}

#[cfg(test)]
#[path = "../tests/type_conversions.rs"]
mod tests;
