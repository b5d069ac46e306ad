//! `For`, `For Each`, `While` and `Do ... Loop`.
//!
//! Loop conditions are evaluated on every iteration, so a by-reference
//! temporary hoisted out of one would be computed only once. Those are
//! rejected as `AmbiguousHoist` instead of being converted wrongly.

use super::Converter;
use super::statements::labeled_empty;
use crate::context::{Breakable, BreakableKind};
use crate::error::{ConversionError, ConvertResult};
use crate::type_conversions::ConversionSite;
use tracing::trace;
use vbcs_common::names::upper_first;
use vbcs_semantic::{SymbolKind, TypeId};
use vbcs_syntax::source::{LoopCondition, LoopConditionKind, NodeIndex, SourceKind, TypeRef};
use vbcs_syntax::target::{CsDeclarator, CsLocalDeclaration, CsNode};

/// Direction of a `For` loop.
enum StepKind {
    /// Constant step; `ascending` when it is not negative
    Constant { ascending: bool, unit: bool, value: CsNode },
    /// Step only known at run time, held in a local
    Variable(String),
}

/// How the control variable of a `For`/`For Each` is introduced.
struct ControlVariable {
    name: String,
    type_name: String,
    type_id: Option<TypeId>,
    /// Declared by the loop itself rather than an existing variable
    declared: bool,
}

impl<'a> Converter<'a> {
    fn control_variable(&mut self, control: NodeIndex, control_type: Option<&'a TypeRef>) -> ConvertResult<ControlVariable> {
        if let SourceKind::ModifiedIdentifier { name, .. } = self.kind_of(control)? {
            let symbol_type = self.declared_of(control).map(|s| s.type_id);
            let type_name = match (control_type, symbol_type) {
                (Some(type_ref), _) => self.type_ref_name(type_ref),
                (None, Some(type_id)) => self.type_name(type_id),
                (None, None) => "var".to_string(),
            };
            return Ok(ControlVariable {
                name: name.clone(),
                type_name,
                type_id: symbol_type,
                declared: true,
            });
        }
        let type_id = self.model.static_type(control);
        let type_name = type_id.map_or_else(|| "var".to_string(), |t| self.type_name(t));
        let name = match self.convert_expression(control)? {
            CsNode::Identifier(name) => name,
            other => {
                return Err(ConversionError::unsupported(
                    "ForBlock",
                    format!("control variable {other:?} is not a simple name"),
                ));
            }
        };
        Ok(ControlVariable {
            name,
            type_name,
            type_id,
            declared: false,
        })
    }

    /// Convert a loop body inside its breakable, appending the continue
    /// label when a `Continue` from a nested loop needed one.
    fn convert_loop_body(
        &mut self,
        kind: BreakableKind,
        prefix: Vec<CsNode>,
        body: &'a [NodeIndex],
    ) -> ConvertResult<(Vec<CsNode>, Breakable)> {
        let (mut statements, breakable) = self.with_breakable(kind, |c| {
            let mut statements = prefix;
            statements.extend(c.convert_block(body)?);
            Ok(statements)
        })?;
        if let Some(label) = &breakable.continue_label {
            statements.push(labeled_empty(label.clone()));
        }
        Ok((statements, breakable))
    }

    /// A loop condition, converted without hoisting.
    fn loop_condition(&mut self, condition: NodeIndex, construct: &str) -> ConvertResult<CsNode> {
        let (value, locals) = self.collect_hoisted(|c| c.convert_value(condition))?;
        if !locals.is_empty() {
            return Err(ConversionError::AmbiguousHoist(format!(
                "the {construct} condition is evaluated on every iteration"
            )));
        }
        Ok(value)
    }

    // =========================================================================
    // For
    // =========================================================================

    pub(crate) fn convert_for(
        &mut self,
        control: NodeIndex,
        control_type: Option<&'a TypeRef>,
        from: NodeIndex,
        to: NodeIndex,
        step: Option<NodeIndex>,
        body: &'a [NodeIndex],
    ) -> ConvertResult<Vec<CsNode>> {
        let variable = self.control_variable(control, control_type)?;
        let site = ConversionSite::default();
        let start = self.convert_value_to(from, variable.type_id, site)?;
        let end = self.convert_value_to(to, variable.type_id, site)?;

        // Loop-invariant bounds are evaluated once before the loop.
        let mut extra = Vec::new();
        let bound = if self.is_loop_invariant(to, body) {
            end
        } else {
            let name = self.unique_name("loopTo", to);
            extra.push(CsDeclarator::new(name.clone(), Some(end)));
            CsNode::id(name)
        };
        let step_kind = match step {
            None => StepKind::Constant {
                ascending: true,
                unit: true,
                value: CsNode::number("1"),
            },
            Some(step) => match self.folder().fold(step).ok().and_then(|v| v.as_f64()) {
                Some(value) => StepKind::Constant {
                    ascending: value >= 0.0,
                    unit: value.abs() == 1.0,
                    value: self.convert_value_to(step, variable.type_id, site)?,
                },
                None => {
                    let name = self.unique_name("loopStep", step);
                    let value = self.convert_value_to(step, variable.type_id, site)?;
                    extra.push(CsDeclarator::new(name.clone(), Some(value)));
                    StepKind::Variable(name)
                }
            },
        };
        trace!(control = %variable.name, declared = variable.declared, hoisted = extra.len(), "for loop");

        let control_node = CsNode::id(variable.name.clone());
        let condition = match &step_kind {
            StepKind::Constant { ascending: true, .. } => CsNode::binary(control_node.clone(), "<=", bound),
            StepKind::Constant { ascending: false, .. } => CsNode::binary(control_node.clone(), ">=", bound),
            StepKind::Variable(step) => CsNode::conditional(
                CsNode::binary(CsNode::id(step.clone()), ">=", CsNode::number("0")),
                CsNode::binary(control_node.clone(), "<=", bound.clone()),
                CsNode::binary(control_node.clone(), ">=", bound),
            ),
        };
        let incrementor = match step_kind {
            StepKind::Constant {
                ascending,
                unit: true,
                ..
            } => CsNode::PostfixUnary {
                operand: Box::new(control_node.clone()),
                operator: if ascending { "++" } else { "--" },
            },
            StepKind::Constant { value, .. } => CsNode::assign_op(control_node.clone(), "+=", value),
            StepKind::Variable(step) => CsNode::assign_op(control_node.clone(), "+=", CsNode::id(step)),
        };

        let (statements, breakable) = self.convert_loop_body(BreakableKind::For, Vec::new(), body)?;

        let mut out = Vec::new();
        let (declaration, initializers) = if variable.declared {
            let mut declarators = vec![CsDeclarator::new(variable.name, Some(start))];
            // Extra locals share the loop declaration when their type matches.
            if variable.type_name == "var" {
                for declarator in extra {
                    out.push(declarator_local("var", declarator));
                }
            } else {
                declarators.extend(extra);
            }
            let declaration = CsLocalDeclaration {
                type_name: variable.type_name,
                declarators,
                is_const: false,
                is_ref: false,
            };
            (Some(declaration), Vec::new())
        } else {
            for declarator in extra {
                out.push(declarator_local(&variable.type_name, declarator));
            }
            (None, vec![CsNode::assign(control_node, start)])
        };
        out.push(CsNode::For {
            declaration,
            initializers,
            condition: Some(Box::new(condition)),
            incrementors: vec![incrementor],
            body: statements,
        });
        if let Some(label) = breakable.exit_label {
            out.push(labeled_empty(label));
        }
        Ok(out)
    }

    /// Constants, and locals or parameters the loop body never assigns.
    fn is_loop_invariant(&self, bound: NodeIndex, body: &[NodeIndex]) -> bool {
        if self.literal_value(bound).is_some() || self.folder().fold(bound).is_ok() {
            return true;
        }
        let Some(SourceKind::Identifier { .. }) = self.arena.kind(bound) else {
            return false;
        };
        let Some((id, symbol)) = self.symbol_entry(bound) else {
            return false;
        };
        symbol.is_assignable_storage()
            && !matches!(symbol.kind, SymbolKind::Field { .. })
            && !self.model.analyze_data_flow(body).writes(id)
    }

    // =========================================================================
    // For Each
    // =========================================================================

    pub(crate) fn convert_for_each(
        &mut self,
        control: NodeIndex,
        control_type: Option<&'a TypeRef>,
        collection: NodeIndex,
        body: &'a [NodeIndex],
    ) -> ConvertResult<Vec<CsNode>> {
        let variable = self.control_variable(control, control_type)?;
        let collection = self.convert_value(collection)?;

        // An existing variable cannot be the iteration variable; iterate a
        // fresh one and assign it first thing in the body.
        let (loop_name, type_name, prefix) = if variable.declared {
            (variable.name, variable.type_name, Vec::new())
        } else {
            let current = self.unique_name(&format!("current{}", upper_first(&variable.name)), control);
            let assignment = CsNode::expr_stmt(CsNode::assign(
                CsNode::id(variable.name),
                CsNode::id(current.clone()),
            ));
            (current, "var".to_string(), vec![assignment])
        };

        let (statements, breakable) = self.convert_loop_body(BreakableKind::For, prefix, body)?;
        let mut out = vec![CsNode::ForEach {
            type_name,
            variable: loop_name,
            collection: Box::new(collection),
            body: statements,
        }];
        if let Some(label) = breakable.exit_label {
            out.push(labeled_empty(label));
        }
        Ok(out)
    }

    // =========================================================================
    // While / Do
    // =========================================================================

    pub(crate) fn convert_while(&mut self, condition: NodeIndex, body: &'a [NodeIndex]) -> ConvertResult<Vec<CsNode>> {
        let condition = self.loop_condition(condition, "While")?;
        let (statements, breakable) = self.convert_loop_body(BreakableKind::While, Vec::new(), body)?;
        let mut out = vec![CsNode::While {
            condition: Box::new(condition),
            body: statements,
        }];
        if let Some(label) = breakable.exit_label {
            out.push(labeled_empty(label));
        }
        Ok(out)
    }

    pub(crate) fn convert_do_loop(
        &mut self,
        condition: Option<&'a LoopCondition>,
        body: &'a [NodeIndex],
    ) -> ConvertResult<Vec<CsNode>> {
        let converted = match condition {
            Some(condition) => {
                let value = self.loop_condition(condition.expression, "Do")?;
                Some(match condition.kind {
                    LoopConditionKind::While => value,
                    LoopConditionKind::Until => CsNode::not(value),
                })
            }
            None => None,
        };
        let (statements, breakable) = self.convert_loop_body(BreakableKind::Do, Vec::new(), body)?;
        let statement = match (condition, converted) {
            (Some(condition), Some(value)) if !condition.at_top => CsNode::DoWhile {
                body: statements,
                condition: Box::new(value),
            },
            (_, value) => CsNode::While {
                condition: Box::new(value.unwrap_or(CsNode::BooleanLiteral(true))),
                body: statements,
            },
        };
        let mut out = vec![statement];
        if let Some(label) = breakable.exit_label {
            out.push(labeled_empty(label));
        }
        Ok(out)
    }
}

fn declarator_local(type_name: &str, declarator: CsDeclarator) -> CsNode {
    CsNode::local(type_name, declarator.name, declarator.initializer)
}
