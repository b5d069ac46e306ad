//! Comparison emulation.
//!
//! The source dialect's `=` is loose: `Nothing` equals `""`, strings may
//! compare case-insensitively (`Option Compare Text`) and `Object` operands
//! compare by their runtime values. Every comparison takes one of three
//! paths:
//!
//! - direct: both operands strictly typed, or `Nothing` against a reference
//! - text: `String` and `Char()` operands
//! - object: either operand typed `Object`, through the runtime helpers

use super::Converter;
use super::conversions::COMPILER_SERVICES;
use tracing::trace;
use vbcs_semantic::{TypeId, TypeKind};
use vbcs_syntax::source::{BinaryOp, NodeIndex};
use vbcs_syntax::target::CsNode;
use vbcs_syntax::value::ConstValue;

use crate::error::ConvertResult;

const GLOBALIZATION_NAMESPACE: &str = "System.Globalization";
const VISUAL_BASIC_NAMESPACE: &str = "Microsoft.VisualBasic";

/// What the emulator needs to know about one side of a comparison.
#[derive(Clone, Debug)]
pub(crate) struct Operand {
    pub node: NodeIndex,
    pub type_id: Option<TypeId>,
    pub is_nothing: bool,
    pub is_empty_string: bool,
    /// Already converted value (a hoisted `Select Case` selector)
    pub converted: Option<CsNode>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ComparisonPath {
    Direct,
    Text,
    Object,
}

impl<'a> Converter<'a> {
    pub(crate) fn operand(&self, node: NodeIndex) -> Operand {
        let value = self.literal_value(node);
        Operand {
            node,
            type_id: self.model.static_type(node),
            is_nothing: matches!(value, Some(ConstValue::Nothing)),
            is_empty_string: matches!(&value, Some(ConstValue::String(s)) if s.is_empty()),
            converted: None,
        }
    }

    fn operand_value(&mut self, operand: &Operand) -> ConvertResult<CsNode> {
        match &operand.converted {
            Some(value) => Ok(value.clone()),
            None => self.convert_value(operand.node),
        }
    }

    pub(crate) fn convert_comparison(
        &mut self,
        op: BinaryOp,
        left: NodeIndex,
        right: NodeIndex,
    ) -> ConvertResult<CsNode> {
        let left = self.operand(left);
        let right = self.operand(right);
        self.compare(op, left, right)
    }

    /// Comparison of two operands. Also used for `Select Case` clauses,
    /// where the left operand is the hoisted selector.
    pub(crate) fn compare(&mut self, op: BinaryOp, left: Operand, right: Operand) -> ConvertResult<CsNode> {
        match op {
            BinaryOp::Is | BinaryOp::IsNot => self.reference_comparison(op, left, right),
            BinaryOp::Like => self.like(left, right),
            _ => {
                let path = self.comparison_path(&left, &right);
                trace!(?op, ?path, "comparison path");
                match path {
                    ComparisonPath::Direct => {
                        let l = self.operand_value(&left)?;
                        let r = self.operand_value(&right)?;
                        Ok(CsNode::binary(l, operator(op), r))
                    }
                    ComparisonPath::Text => self.text_comparison(op, left, right),
                    ComparisonPath::Object => self.object_comparison(op, left, right),
                }
            }
        }
    }

    fn is_text(&self, type_id: TypeId) -> bool {
        type_id == TypeId::STRING || self.is_char_array(type_id)
    }

    fn is_char_array(&self, type_id: TypeId) -> bool {
        self.type_info(type_id).is_some_and(|info| {
            matches!(
                info.kind,
                TypeKind::Array {
                    element: TypeId::CHAR,
                    rank: 1
                }
            )
        })
    }

    fn comparison_path(&self, left: &Operand, right: &Operand) -> ComparisonPath {
        // `Nothing` takes the type of the other side.
        let typed: Vec<Option<TypeId>> = [left, right]
            .iter()
            .filter(|operand| !operand.is_nothing)
            .map(|operand| operand.type_id)
            .collect();
        if typed.is_empty() || typed.iter().any(Option::is_none) {
            return ComparisonPath::Direct;
        }
        let types: Vec<TypeId> = typed.into_iter().flatten().collect();
        if types.contains(&TypeId::OBJECT) {
            ComparisonPath::Object
        } else if types.iter().all(|t| self.is_text(*t)) {
            ComparisonPath::Text
        } else {
            ComparisonPath::Direct
        }
    }

    fn compare_text_literal(&self) -> CsNode {
        CsNode::BooleanLiteral(self.options.option_compare_text)
    }

    // =========================================================================
    // Reference identity
    // =========================================================================

    fn reference_comparison(&mut self, op: BinaryOp, left: Operand, right: Operand) -> ConvertResult<CsNode> {
        let equal = op == BinaryOp::Is;
        let l = self.operand_value(&left)?;
        let r = self.operand_value(&right)?;
        if left.is_nothing || right.is_nothing {
            let operand = if left.is_nothing { r } else { l };
            let operator = if equal { "==" } else { "!=" };
            return Ok(CsNode::binary(operand, operator, CsNode::NullLiteral));
        }
        // `==` on strings compares contents.
        if left.type_id == Some(TypeId::STRING) || right.type_id == Some(TypeId::STRING) {
            let test = CsNode::static_call("object", "ReferenceEquals", vec![l, r]);
            return Ok(if equal { test } else { CsNode::not(test) });
        }
        Ok(CsNode::binary(l, if equal { "==" } else { "!=" }, r))
    }

    fn like(&mut self, left: Operand, right: Operand) -> ConvertResult<CsNode> {
        let l = self.operand_value(&left)?;
        let r = self.operand_value(&right)?;
        self.require_import(COMPILER_SERVICES);
        self.require_import(VISUAL_BASIC_NAMESPACE);
        let method = if self.options.option_compare_text {
            "Text"
        } else {
            "Binary"
        };
        let compare = CsNode::member(CsNode::id("CompareMethod"), method);
        Ok(CsNode::static_call("LikeOperator", "LikeString", vec![l, r, compare]))
    }

    // =========================================================================
    // Text
    // =========================================================================

    fn text_comparison(&mut self, op: BinaryOp, left: Operand, right: Operand) -> ConvertResult<CsNode> {
        if matches!(op, BinaryOp::Equals | BinaryOp::NotEquals)
            && let Some(other) = empty_test_operand(&left, &right)
            && other.type_id == Some(TypeId::STRING)
        {
            let value = self.operand_value(other)?;
            let test = CsNode::static_call("string", "IsNullOrEmpty", vec![value]);
            return Ok(if op == BinaryOp::Equals {
                test
            } else {
                CsNode::not(test)
            });
        }

        if op.is_comparison() && !matches!(op, BinaryOp::Equals | BinaryOp::NotEquals) {
            let l = self.text_operand(&left, false)?;
            let r = self.text_operand(&right, false)?;
            self.require_import(COMPILER_SERVICES);
            let text_compare = self.compare_text_literal();
            let compare = CsNode::static_call("Operators", "CompareString", vec![l, r, text_compare]);
            return Ok(CsNode::binary(compare, operator(op), CsNode::number("0")));
        }

        let l = self.text_operand(&left, true)?;
        let r = self.text_operand(&right, true)?;
        if !self.options.option_compare_text {
            return Ok(CsNode::binary(l, operator(op), r));
        }
        self.require_import(GLOBALIZATION_NAMESPACE);
        let compare_info = CsNode::member(
            CsNode::member(CsNode::id("CultureInfo"), "CurrentCulture"),
            "CompareInfo",
        );
        let options = ["IgnoreCase", "IgnoreKanaType", "IgnoreWidth"]
            .into_iter()
            .map(|flag| CsNode::member(CsNode::id("CompareOptions"), flag))
            .reduce(|acc, flag| CsNode::binary(acc, "|", flag))
            .unwrap_or(CsNode::id("CompareOptions.None"));
        let compare = CsNode::call(CsNode::member(compare_info, "Compare"), vec![l, r, options]);
        Ok(CsNode::binary(compare, operator(op), CsNode::number("0")))
    }

    /// One side of a text comparison: `Nothing` is `""`, char arrays become
    /// strings, and with `coalesce` anything else that may be null gets
    /// `?? ""`.
    fn text_operand(&mut self, operand: &Operand, coalesce: bool) -> ConvertResult<CsNode> {
        if operand.is_nothing {
            return Ok(CsNode::string(""));
        }
        if operand.type_id.is_some_and(|t| self.is_char_array(t)) {
            let array = match &operand.converted {
                Some(value) => value.clone(),
                None => self.convert_expression(operand.node)?,
            };
            return Ok(CsNode::new_object("string", vec![array]));
        }
        let value = self.operand_value(operand)?;
        if !coalesce || value.unparenthesized().is_literal() || self.literal_value(operand.node).is_some() {
            return Ok(value);
        }
        Ok(CsNode::binary(value, "??", CsNode::string("")).paren())
    }

    // =========================================================================
    // Object
    // =========================================================================

    fn object_comparison(&mut self, op: BinaryOp, left: Operand, right: Operand) -> ConvertResult<CsNode> {
        let l = self.operand_value(&left)?;
        let r = self.operand_value(&right)?;
        let helper = match op {
            BinaryOp::Equals => "ConditionalCompareObjectEqual",
            BinaryOp::NotEquals => "ConditionalCompareObjectNotEqual",
            BinaryOp::LessThan => "ConditionalCompareObjectLess",
            BinaryOp::LessThanOrEqual => "ConditionalCompareObjectLessEqual",
            BinaryOp::GreaterThan => "ConditionalCompareObjectGreater",
            _ => "ConditionalCompareObjectGreaterEqual",
        };
        self.require_import(COMPILER_SERVICES);
        let text_compare = self.compare_text_literal();
        Ok(CsNode::static_call("Operators", helper, vec![l, r, text_compare]))
    }
}

/// For `x = ""` / `x = Nothing`, the side that is not empty.
fn empty_test_operand<'o>(left: &'o Operand, right: &'o Operand) -> Option<&'o Operand> {
    let empty = |o: &Operand| o.is_nothing || o.is_empty_string;
    match (empty(left), empty(right)) {
        (false, true) => Some(left),
        (true, false) => Some(right),
        _ => None,
    }
}

const fn operator(op: BinaryOp) -> &'static str {
    match op {
        BinaryOp::NotEquals => "!=",
        BinaryOp::LessThan => "<",
        BinaryOp::LessThanOrEqual => "<=",
        BinaryOp::GreaterThan => ">",
        BinaryOp::GreaterThanOrEqual => ">=",
        _ => "==",
    }
}
