//! `If` and `Select Case`.

use super::statements::labeled_empty;
use super::{Converter, flush_locals};
use crate::context::BreakableKind;
use crate::error::{ConversionError, ConvertResult};
use crate::type_conversions::ConversionSite;
use rustc_hash::FxHashSet;
use tracing::debug;
use vbcs_semantic::{SpecialType, TypeId};
use vbcs_syntax::source::{BinaryOp, CaseBlock, CaseClause, ElseIfBlock, NodeIndex};
use vbcs_syntax::target::{CsNode, CsSwitchSection};
use vbcs_syntax::value::ConstValue;

use crate::constant_folding::format_value;

impl<'a> Converter<'a> {
    pub(crate) fn convert_if(
        &mut self,
        condition: NodeIndex,
        then_block: &'a [NodeIndex],
        else_ifs: &'a [ElseIfBlock],
        else_block: Option<&'a [NodeIndex]>,
    ) -> ConvertResult<Vec<CsNode>> {
        let condition = self.convert_value(condition)?;
        let then_branch = self.convert_block(then_block)?;
        let else_branch = self.convert_else_chain(else_ifs, else_block)?;
        Ok(vec![CsNode::if_stmt(condition, then_branch, else_branch)])
    }

    /// `ElseIf` conditions are evaluated only when reached, so anything one
    /// hoists is declared inside the enclosing `else`.
    fn convert_else_chain(
        &mut self,
        else_ifs: &'a [ElseIfBlock],
        else_block: Option<&'a [NodeIndex]>,
    ) -> ConvertResult<Option<Vec<CsNode>>> {
        let Some((first, rest)) = else_ifs.split_first() else {
            return else_block.map(|block| self.convert_block(block)).transpose();
        };
        let (condition, locals) = self.collect_hoisted(|c| c.convert_value(first.condition))?;
        let then_branch = self.convert_block(&first.statements)?;
        let else_branch = self.convert_else_chain(rest, else_block)?;
        let nested = CsNode::if_stmt(condition, then_branch, else_branch);
        Ok(Some(flush_locals(vec![nested], locals, false)))
    }

    // =========================================================================
    // Select Case
    // =========================================================================

    pub(crate) fn convert_select(
        &mut self,
        node: NodeIndex,
        selector: NodeIndex,
        cases: &'a [CaseBlock],
    ) -> ConvertResult<Vec<CsNode>> {
        if self.switch_compatible(selector, cases) {
            self.convert_switch(selector, cases)
        } else {
            self.convert_case_chain(node, selector, cases)
        }
    }

    /// A target `switch` needs a switchable selector, constant labels that
    /// are pairwise distinct, and the same equality as the source: strings
    /// only under binary comparison and without an `""` label, which the
    /// source also matches for `Nothing`.
    fn switch_compatible(&self, selector: NodeIndex, cases: &[CaseBlock]) -> bool {
        let Some(selector_type) = self.value_type(selector) else {
            return false;
        };
        let is_enum = self.type_info(selector_type).is_some_and(|info| info.is_enum());
        let switchable = is_enum
            || match self.special_of(selector_type) {
                Some(SpecialType::String) => !self.options.option_compare_text,
                Some(special) => special.is_integral() || special == SpecialType::Char,
                None => false,
            };
        if !switchable {
            return false;
        }
        let mut seen = FxHashSet::default();
        for clause in cases.iter().flat_map(|case| case.clauses.iter()) {
            match clause {
                CaseClause::Else => {}
                CaseClause::Value(value) => {
                    let Ok(folded) = self.folder().fold(*value) else {
                        return false;
                    };
                    if matches!(&folded, ConstValue::String(s) if s.is_empty())
                        || !seen.insert(format_value(&folded))
                    {
                        return false;
                    }
                }
                CaseClause::Range(..) | CaseClause::Relational(..) => return false,
            }
        }
        true
    }

    fn convert_switch(&mut self, selector: NodeIndex, cases: &'a [CaseBlock]) -> ConvertResult<Vec<CsNode>> {
        let expression = self.convert_value(selector)?;
        let selector_type = self.value_type(selector);
        let site = ConversionSite {
            is_constant: true,
            always_explicit: true,
        };
        let (sections, breakable) = self.with_breakable(BreakableKind::Select { is_switch: true }, |c| {
            let mut sections = Vec::with_capacity(cases.len());
            for case in cases {
                let mut labels = Vec::with_capacity(case.clauses.len());
                for clause in &case.clauses {
                    match clause {
                        CaseClause::Else => labels.push(None),
                        CaseClause::Value(value) => {
                            labels.push(Some(c.convert_value_to(*value, selector_type, site)?));
                        }
                        CaseClause::Range(..) | CaseClause::Relational(..) => {
                            return Err(ConversionError::unsupported(
                                "CaseClause",
                                "range and relational clauses need an if chain",
                            ));
                        }
                    }
                }
                let mut statements = c.convert_block(&case.statements)?;
                if !ends_with_jump(&statements) {
                    statements.push(CsNode::Break);
                }
                sections.push(CsSwitchSection { labels, statements });
            }
            Ok(sections)
        })?;
        let mut out = vec![CsNode::Switch {
            expression: Box::new(expression),
            sections,
        }];
        if let Some(label) = breakable.exit_label {
            out.push(labeled_empty(label));
        }
        Ok(out)
    }

    /// `Select Case` as an `if`/`else if` chain over a `switchExpr` local,
    /// using source comparison semantics for every clause.
    fn convert_case_chain(
        &mut self,
        node: NodeIndex,
        selector: NodeIndex,
        cases: &'a [CaseBlock],
    ) -> ConvertResult<Vec<CsNode>> {
        debug!(node = node.0, "select case lowered to an if chain");
        let value = self.convert_value(selector)?;
        let name = self.unique_name("switchExpr", selector);
        let declaration = CsNode::var(name.clone(), value);
        let mut subject = self.operand(selector);
        subject.converted = Some(CsNode::id(name));
        subject.is_nothing = false;
        subject.is_empty_string = false;
        if subject.type_id.is_none() {
            subject.type_id = self.value_type(selector).or(Some(TypeId::OBJECT));
        }

        let (branches, breakable) = self.with_breakable(BreakableKind::Select { is_switch: false }, |c| {
            let mut branches = Vec::with_capacity(cases.len());
            for case in cases {
                let condition = if case.clauses.iter().any(|clause| matches!(clause, CaseClause::Else)) {
                    None
                } else {
                    Some(c.case_condition(&subject, &case.clauses)?)
                };
                let body = c.convert_block(&case.statements)?;
                branches.push((condition, body));
            }
            Ok(branches)
        })?;

        let mut chain: Option<Vec<CsNode>> = None;
        for (condition, body) in branches.into_iter().rev() {
            chain = Some(match condition {
                Some(condition) => vec![CsNode::if_stmt(condition, body, chain)],
                None => body,
            });
        }
        let mut out = vec![declaration];
        out.extend(chain.unwrap_or_default());
        if let Some(label) = breakable.exit_label {
            out.push(labeled_empty(label));
        }
        Ok(out)
    }

    /// Clauses of one case joined with `||`. Clause expressions run only
    /// when their case is reached, so they may not hoist.
    fn case_condition(&mut self, subject: &super::equality::Operand, clauses: &'a [CaseClause]) -> ConvertResult<CsNode> {
        let (condition, locals) = self.collect_hoisted(|c| {
            let mut condition: Option<CsNode> = None;
            for clause in clauses {
                let test = match clause {
                    CaseClause::Value(value) => {
                        let operand = c.operand(*value);
                        c.compare(BinaryOp::Equals, subject.clone(), operand)?
                    }
                    CaseClause::Relational(op, value) => {
                        let operand = c.operand(*value);
                        c.compare(*op, subject.clone(), operand)?
                    }
                    CaseClause::Range(low, high) => {
                        let low = c.operand(*low);
                        let high = c.operand(*high);
                        let lower = c.compare(BinaryOp::GreaterThanOrEqual, subject.clone(), low)?;
                        let upper = c.compare(BinaryOp::LessThanOrEqual, subject.clone(), high)?;
                        CsNode::binary(lower, "&&", upper)
                    }
                    CaseClause::Else => continue,
                };
                condition = Some(match condition {
                    Some(previous) => CsNode::binary(previous, "||", test),
                    None => test,
                });
            }
            Ok(condition.unwrap_or(CsNode::BooleanLiteral(false)))
        })?;
        if !locals.is_empty() {
            return Err(ConversionError::AmbiguousHoist(
                "a Case expression passes a non-variable by reference".to_string(),
            ));
        }
        Ok(condition)
    }
}

/// Whether control cannot fall out of the end of `statements`.
pub(crate) fn ends_with_jump(statements: &[CsNode]) -> bool {
    matches!(
        statements.last(),
        Some(
            CsNode::Break
                | CsNode::Continue
                | CsNode::Return(_)
                | CsNode::Goto(_)
                | CsNode::Throw(_)
        )
    )
}
