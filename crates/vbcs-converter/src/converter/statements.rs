//! Statement rewriting.
//!
//! Every statement converts inside its own hoisting frame: locals the
//! expression rules synthesize while converting it are declared right
//! before the statement's output, and property write-backs follow it.
//! Compound statements convert their nested blocks statement by statement,
//! so a hoist inside a body never escapes to the enclosing statement.

use super::{Converter, flush_locals};
use crate::context::{BreakableKind, JumpTarget, local_declaration};
use crate::error::{ConversionError, ConvertResult};
use crate::literals::SYSTEM_NAMESPACE;
use crate::type_conversions::ConversionSite;
use tracing::{debug, trace};
use vbcs_semantic::{SymbolId, TypeId, TypeKind};
use vbcs_syntax::source::{
    AssignmentOp, CatchBlock, ContinueKind, Declarator, ExitKind, Modifiers, NodeIndex, SourceKind,
    TypeRef, UsingResources,
};
use vbcs_syntax::target::{CsCatch, CsDeclarator, CsLocalDeclaration, CsNode};
use vbcs_syntax::value::ConstValue;

/// A name declared by a `Dim`/`Const`/field declarator, converted.
#[derive(Clone, Debug)]
pub(crate) struct DeclaredVariable {
    pub node: NodeIndex,
    pub name: String,
    pub type_name: String,
    pub initializer: Option<CsNode>,
    pub symbol: Option<SymbolId>,
    /// The initializer, when it is a lambda that may become a function
    pub lambda: Option<NodeIndex>,
}

impl<'a> Converter<'a> {
    /// Convert a statement list.
    pub(crate) fn convert_block(&mut self, statements: &'a [NodeIndex]) -> ConvertResult<Vec<CsNode>> {
        let mut out = Vec::with_capacity(statements.len());
        for (i, statement) in statements.iter().enumerate() {
            let following = &statements[i + 1..];
            for node in self.convert_statement(*statement, following)? {
                node.flatten_into(&mut out);
            }
        }
        Ok(out)
    }

    /// Convert one statement. `following` are the statements after it in
    /// the same block, for flow questions about the rest of the block.
    pub(crate) fn convert_statement(
        &mut self,
        node: NodeIndex,
        following: &'a [NodeIndex],
    ) -> ConvertResult<Vec<CsNode>> {
        self.with_statement_depth(|c| {
            let kind = c.kind_of(node)?;
            trace!(node = node.0, kind = kind.name(), "convert statement");
            let write_back = matches!(
                kind,
                SourceKind::ExpressionStatement { .. }
                    | SourceKind::Assignment { .. }
                    | SourceKind::RaiseEvent { .. }
            );
            let (nodes, locals) = c.collect_hoisted(|c| c.convert_statement_kind(node, kind, following))?;
            Ok(flush_locals(nodes, locals, write_back))
        })
    }

    fn convert_statement_kind(
        &mut self,
        node: NodeIndex,
        kind: &'a SourceKind,
        following: &'a [NodeIndex],
    ) -> ConvertResult<Vec<CsNode>> {
        match kind {
            SourceKind::LocalDeclaration {
                modifiers,
                declarators,
            } => self.convert_local_declaration(*modifiers, declarators, following),
            SourceKind::Assignment { op, target, value } => {
                Ok(vec![CsNode::expr_stmt(self.convert_assignment(*op, *target, *value)?)])
            }
            SourceKind::ExpressionStatement { expression } => {
                Ok(vec![CsNode::expr_stmt(self.convert_expression(*expression)?)])
            }
            SourceKind::If {
                condition,
                then_block,
                else_ifs,
                else_block,
            } => self.convert_if(*condition, then_block, else_ifs, else_block.as_deref()),
            SourceKind::SelectCase { selector, cases } => self.convert_select(node, *selector, cases),
            SourceKind::ForNext {
                control,
                control_type,
                from,
                to,
                step,
                body,
            } => self.convert_for(*control, control_type.as_ref(), *from, *to, *step, body),
            SourceKind::ForEach {
                control,
                control_type,
                collection,
                body,
            } => self.convert_for_each(*control, control_type.as_ref(), *collection, body),
            SourceKind::While { condition, body } => self.convert_while(*condition, body),
            SourceKind::DoLoop { condition, body } => self.convert_do_loop(condition.as_ref(), body),
            SourceKind::Exit(exit) => self.convert_exit(*exit).map(|n| vec![n]),
            SourceKind::Continue(kind) => self.convert_continue(*kind).map(|n| vec![n]),
            SourceKind::Return { expression } => {
                let value = match expression {
                    Some(expression) => Some(self.convert_value(*expression)?),
                    None => self.implicit_return_value(),
                };
                Ok(vec![CsNode::ret(value)])
            }
            SourceKind::Try {
                body,
                catches,
                finally,
            } => self.convert_try(body, catches, finally.as_deref()),
            SourceKind::Throw { expression } => {
                let value = expression.map(|e| self.convert_value(e)).transpose()?;
                Ok(vec![CsNode::Throw(value.map(Box::new))])
            }
            SourceKind::Using { resources, body } => self.convert_using(resources, body),
            SourceKind::SyncLock { expression, body } => {
                let expression = self.convert_value(*expression)?;
                let body = self.convert_block(body)?;
                Ok(vec![CsNode::Lock {
                    expression: Box::new(expression),
                    body,
                }])
            }
            SourceKind::With { expression, body } => self.convert_with(*expression, body),
            SourceKind::Label(label) => Ok(vec![CsNode::Labeled {
                label: label_name(label),
                statement: Box::new(CsNode::Empty),
            }]),
            SourceKind::GoTo(label) => Ok(vec![CsNode::Goto(label_name(label))]),
            SourceKind::Erase { targets } => targets
                .iter()
                .map(|target| {
                    let target = self.convert_expression(*target)?;
                    Ok(CsNode::expr_stmt(CsNode::assign(target, CsNode::NullLiteral)))
                })
                .collect(),
            SourceKind::ReDim { preserve, clauses } => self.convert_redim(*preserve, clauses),
            SourceKind::AddHandler { event, handler } => self.convert_handler(*event, *handler, "+="),
            SourceKind::RemoveHandler { event, handler } => self.convert_handler(*event, *handler, "-="),
            SourceKind::RaiseEvent { name, arguments } => {
                let symbol = self.symbol_of(node);
                let parameters = symbol.map(|s| s.parameters.as_slice()).unwrap_or(&[]);
                let event_name = symbol.map_or_else(|| name.clone(), |s| s.name.clone());
                let arguments = self.convert_arguments(arguments, parameters)?;
                let invoke = CsNode::member_conditional(CsNode::id(event_name), "Invoke");
                Ok(vec![CsNode::expr_stmt(CsNode::call_with(invoke, arguments))])
            }
            SourceKind::Stop => Ok(vec![CsNode::expr_stmt(CsNode::call(
                CsNode::member(CsNode::id("System.Diagnostics.Debugger"), "Break"),
                Vec::new(),
            ))]),
            SourceKind::End => {
                self.require_import(SYSTEM_NAMESPACE);
                Ok(vec![CsNode::expr_stmt(CsNode::static_call(
                    "Environment",
                    "Exit",
                    vec![CsNode::number("0")],
                ))])
            }
            SourceKind::Yield { expression } => {
                Ok(vec![CsNode::YieldReturn(Box::new(self.convert_value(*expression)?))])
            }
            SourceKind::OnError { .. } => Err(ConversionError::unsupported(
                kind.name(),
                "unstructured error handling has no target equivalent",
            )),
            other => Err(ConversionError::unsupported(
                other.name(),
                "not valid in a statement position",
            )),
        }
    }

    // =========================================================================
    // Declarations
    // =========================================================================

    fn convert_local_declaration(
        &mut self,
        modifiers: Modifiers,
        declarators: &'a [Declarator],
        following: &'a [NodeIndex],
    ) -> ConvertResult<Vec<CsNode>> {
        if modifiers.contains(Modifiers::STATIC) {
            return Err(ConversionError::unsupported(
                "LocalDeclarationStatement",
                "Static locals keep their value between calls",
            ));
        }
        let is_const = modifiers.contains(Modifiers::CONST);
        let site = ConversionSite {
            is_constant: is_const,
            always_explicit: false,
        };
        let mut out = Vec::new();
        for declarator in declarators {
            // Each declarator hoists into its own frame so its temporaries
            // are declared after the variables before it.
            let (nodes, locals) = self.collect_hoisted(|c| {
                let variables = c.convert_declarator(declarator, site, !is_const)?;
                c.local_declarations(variables, is_const, following)
            })?;
            out.extend(flush_locals(nodes, locals, false));
        }
        Ok(out)
    }

    /// Convert the names of one declarator. `allow_var` permits an
    /// inferred `var` type for untyped names with an initializer.
    pub(crate) fn convert_declarator(
        &mut self,
        declarator: &'a Declarator,
        site: ConversionSite,
        allow_var: bool,
    ) -> ConvertResult<Vec<DeclaredVariable>> {
        let mut variables = Vec::with_capacity(declarator.names.len());
        for &name_node in &declarator.names {
            let SourceKind::ModifiedIdentifier {
                name,
                bounds,
                array_rank,
                nullable,
            } = self.kind_of(name_node)?
            else {
                return Err(ConversionError::unsupported(
                    "VariableDeclarator",
                    "declared name is not an identifier",
                ));
            };
            let symbol = self.declared_entry(name_node);
            let symbol_type = symbol.map(|(_, s)| s.type_id);

            let written = declarator
                .as_type
                .as_ref()
                .map(|t| modified_type(t, *nullable, *array_rank, bounds.len()));
            let lambda = declarator.initializer.filter(|&init| {
                matches!(self.arena.kind(init), Some(SourceKind::Lambda { .. }))
            });
            let infers = allow_var
                && self.options.option_infer
                && written.is_none()
                && bounds.is_empty()
                && lambda.is_none()
                && declarator
                    .initializer
                    .is_some_and(|init| !matches!(self.literal_value(init), Some(ConstValue::Nothing)));
            let type_name = match (&written, symbol_type) {
                (Some(type_ref), _) => self.type_ref_name(type_ref),
                (None, _) if infers => "var".to_string(),
                (None, Some(type_id)) => self.type_name(type_id),
                (None, None) if declarator.as_new.is_some() => "var".to_string(),
                (None, None) => "object".to_string(),
            };

            let initializer = if let Some(creation) = declarator.as_new {
                Some(self.convert_expression(creation)?)
            } else if !bounds.is_empty() {
                let element_type = match (&declarator.as_type, symbol_type) {
                    (Some(as_type), _) => {
                        let element = modified_type(as_type, *nullable, *array_rank, 0);
                        self.type_ref_name(&element)
                    }
                    (None, Some(type_id)) => self.array_element_name(type_id),
                    (None, None) => "object".to_string(),
                };
                let mut sizes = Vec::with_capacity(bounds.len());
                for bound in bounds {
                    sizes.push(self.array_length(*bound)?);
                }
                Some(CsNode::ArrayCreation {
                    element_type,
                    rank: sizes.len() as u32,
                    sizes,
                    initializer: None,
                })
            } else {
                match declarator.initializer {
                    Some(init) => Some(self.convert_value_to(init, None, site)?),
                    None => None,
                }
            };

            variables.push(DeclaredVariable {
                node: name_node,
                name: name.clone(),
                type_name,
                initializer,
                symbol: symbol.map(|(id, _)| id),
                lambda,
            });
        }
        Ok(variables)
    }

    /// Target name of the element type of an array type.
    pub(crate) fn array_element_name(&mut self, array: TypeId) -> String {
        match self.type_info(array).map(|info| &info.kind) {
            Some(TypeKind::Array { element, .. }) => {
                let element = *element;
                self.type_name(element)
            }
            _ => "object".to_string(),
        }
    }

    /// Local declarations for converted variables: consecutive variables of
    /// the same explicit type share one declaration; a lambda the rest of
    /// the block never reassigns becomes a local function.
    fn local_declarations(
        &mut self,
        variables: Vec<DeclaredVariable>,
        is_const: bool,
        following: &'a [NodeIndex],
    ) -> ConvertResult<Vec<CsNode>> {
        let mut out = Vec::new();
        let mut group: Option<(String, Vec<CsDeclarator>)> = None;
        let single = variables.len() == 1;
        for variable in variables {
            if single
                && !is_const
                && let (Some(lambda), Some(symbol)) = (variable.lambda, variable.symbol)
                && !self.model.analyze_data_flow(following).writes(symbol)
                && let Some(function) = self.try_local_function(&variable.name, lambda)?
            {
                debug!(name = %variable.name, "lambda local promoted to a local function");
                out.push(CsNode::LocalFunction(Box::new(function)));
                continue;
            }
            let initializer = variable
                .initializer
                .or_else(|| (!is_const).then_some(CsNode::DefaultLiteral(None)));
            let declarator = CsDeclarator::new(variable.name, initializer);
            match &mut group {
                Some((type_name, declarators)) if *type_name == variable.type_name && type_name.as_str() != "var" => {
                    declarators.push(declarator);
                }
                _ => {
                    if let Some((type_name, declarators)) = group.take() {
                        out.push(local_declaration(type_name, declarators, is_const));
                    }
                    group = Some((variable.type_name, vec![declarator]));
                }
            }
        }
        if let Some((type_name, declarators)) = group {
            out.push(local_declaration(type_name, declarators, is_const));
        }
        Ok(out)
    }

    // =========================================================================
    // Assignment
    // =========================================================================

    pub(crate) fn convert_assignment(
        &mut self,
        op: AssignmentOp,
        target: NodeIndex,
        value: NodeIndex,
    ) -> ConvertResult<CsNode> {
        let target_node = self.convert_expression(target)?;
        let target_type = self.model.static_type(target);
        let assignment = match op {
            AssignmentOp::Assign => CsNode::assign(target_node, self.convert_value(value)?),
            AssignmentOp::Add => CsNode::assign_op(target_node, "+=", self.convert_value(value)?),
            AssignmentOp::Subtract => CsNode::assign_op(target_node, "-=", self.convert_value(value)?),
            AssignmentOp::Multiply => CsNode::assign_op(target_node, "*=", self.convert_value(value)?),
            AssignmentOp::LeftShift => CsNode::assign_op(target_node, "<<=", self.convert_value(value)?),
            AssignmentOp::RightShift => CsNode::assign_op(target_node, ">>=", self.convert_value(value)?),
            AssignmentOp::IntegerDivide => CsNode::assign_op(target_node, "/=", self.convert_value(value)?),
            AssignmentOp::Concatenate => {
                let converted = self.convert_value(value)?;
                let converted = self.ensure_string(value, converted);
                CsNode::assign_op(target_node, "+=", converted)
            }
            AssignmentOp::Divide => {
                let integral = target_type
                    .and_then(|t| self.numeric_special_of(t))
                    .is_some_and(|s| s.is_integral());
                let converted = self.convert_value(value)?;
                match target_type {
                    Some(target_type) if integral => {
                        let quotient = CsNode::binary(target_node.clone(), "/", CsNode::cast("double", converted));
                        let quotient = self.runtime_conversion(quotient, target_type);
                        CsNode::assign(target_node, quotient)
                    }
                    _ => CsNode::assign_op(target_node, "/=", converted),
                }
            }
            AssignmentOp::Power => {
                self.require_import(SYSTEM_NAMESPACE);
                let converted = self.convert_value(value)?;
                let power = CsNode::static_call("Math", "Pow", vec![target_node.clone(), converted]);
                let power = match target_type {
                    Some(t) if t != TypeId::DOUBLE => self.runtime_conversion(power, t),
                    _ => power,
                };
                CsNode::assign(target_node, power)
            }
        };
        Ok(assignment)
    }

    // =========================================================================
    // Jumps
    // =========================================================================

    /// Value returned when leaving the current method without an
    /// expression: the return holder, `default`, or nothing for subs.
    pub(crate) fn implicit_return_value(&self) -> Option<CsNode> {
        let frame = self.ctx.method()?;
        if !frame.returns_value() {
            return None;
        }
        Some(match &frame.return_holder {
            Some(holder) => CsNode::id(holder.clone()),
            None => CsNode::DefaultLiteral(None),
        })
    }

    fn convert_exit(&mut self, exit: ExitKind) -> ConvertResult<CsNode> {
        if matches!(exit, ExitKind::Sub | ExitKind::Function | ExitKind::Property) {
            return Ok(CsNode::ret(self.implicit_return_value()));
        }
        match self.ctx.exit_target(exit) {
            Some(JumpTarget::Goto(label)) => Ok(CsNode::Goto(label)),
            Some(_) => Ok(CsNode::Break),
            None => Err(ConversionError::unsupported(
                "ExitStatement",
                format!("no enclosing {exit:?} block"),
            )),
        }
    }

    fn convert_continue(&mut self, kind: ContinueKind) -> ConvertResult<CsNode> {
        match self.ctx.continue_target(kind) {
            Some(JumpTarget::Goto(label)) => Ok(CsNode::Goto(label)),
            Some(_) => Ok(CsNode::Continue),
            None => Err(ConversionError::unsupported(
                "ContinueStatement",
                format!("no enclosing {kind:?} loop"),
            )),
        }
    }

    // =========================================================================
    // Blocks
    // =========================================================================

    fn convert_try(
        &mut self,
        body: &'a [NodeIndex],
        catches: &'a [CatchBlock],
        finally: Option<&'a [NodeIndex]>,
    ) -> ConvertResult<Vec<CsNode>> {
        let (statement, breakable) = self.with_breakable(BreakableKind::Try, |c| {
            let body = c.convert_block(body)?;
            let mut converted = Vec::with_capacity(catches.len());
            for catch in catches {
                converted.push(c.convert_catch(catch)?);
            }
            let finally = finally.map(|f| c.convert_block(f)).transpose()?;
            Ok(CsNode::Try {
                body,
                catches: converted,
                finally,
            })
        })?;
        let mut out = vec![statement];
        if let Some(label) = breakable.exit_label {
            out.push(labeled_empty(label));
        }
        Ok(out)
    }

    fn convert_catch(&mut self, catch: &'a CatchBlock) -> ConvertResult<CsCatch> {
        let name = match catch.name {
            Some(name) => Some(
                self.arena
                    .identifier_text(name)
                    .ok_or_else(|| ConversionError::unsupported("CatchBlock", "catch variable is not a name"))?
                    .to_string(),
            ),
            None => None,
        };
        let type_name = match (&catch.type_ref, &name) {
            (Some(type_ref), _) => Some(self.type_ref_name(type_ref)),
            (None, Some(_)) => {
                self.require_import(SYSTEM_NAMESPACE);
                Some("Exception".to_string())
            }
            (None, None) => None,
        };
        let filter = catch.when.map(|w| self.convert_value(w)).transpose()?;
        let body = self.convert_block(&catch.body)?;
        Ok(CsCatch {
            type_name,
            name,
            filter,
            body,
        })
    }

    fn convert_using(&mut self, resources: &'a UsingResources, body: &'a [NodeIndex]) -> ConvertResult<Vec<CsNode>> {
        let body = self.convert_block(body)?;
        let resources = match resources {
            UsingResources::Expression(expression) => vec![self.convert_value(*expression)?],
            UsingResources::Declarations(declarators) => {
                let site = ConversionSite::default();
                let mut declarations = Vec::new();
                for declarator in declarators {
                    for variable in self.convert_declarator(declarator, site, true)? {
                        declarations.push(CsNode::local(
                            variable.type_name,
                            variable.name,
                            variable.initializer,
                        ));
                    }
                }
                declarations
            }
        };
        // `Using a, b` nests one `using` per resource.
        let mut statement = body;
        for resource in resources.into_iter().rev() {
            statement = vec![CsNode::Using {
                resource: Box::new(resource),
                body: statement,
            }];
        }
        Ok(statement)
    }

    /// `With x ... End With`: the receiver is evaluated once into a
    /// `withBlock` local that `.Member` accesses inside the block use.
    fn convert_with(&mut self, expression: NodeIndex, body: &'a [NodeIndex]) -> ConvertResult<Vec<CsNode>> {
        if matches!(
            self.kind_of(expression)?,
            SourceKind::Me | SourceKind::MyBase | SourceKind::MyClass
        ) {
            let receiver = self.convert_expression(expression)?;
            let statements = self.with_receiver(receiver, |c| c.convert_block(body))?;
            return Ok(vec![CsNode::Block(statements)]);
        }

        let value = self.convert_value(expression)?;
        let name = self.unique_name("withBlock", expression);
        let by_ref = self.is_assignable_structure(expression);
        let declaration = if by_ref {
            CsNode::LocalDeclaration(CsLocalDeclaration {
                type_name: "var".to_string(),
                declarators: vec![CsDeclarator::new(name.clone(), Some(CsNode::prefix("ref ", value)))],
                is_const: false,
                is_ref: true,
            })
        } else {
            CsNode::var(name.clone(), value)
        };
        let mut statements = vec![declaration];
        statements.extend(self.with_receiver(CsNode::id(name), |c| c.convert_block(body))?);
        Ok(vec![CsNode::Block(statements)])
    }

    /// Structure-typed storage: member assignments through a `With` must
    /// reach the original, not a copy.
    fn is_assignable_structure(&self, expression: NodeIndex) -> bool {
        let is_structure = self
            .model
            .static_type(expression)
            .and_then(|t| self.type_info(t))
            .is_some_and(|info| matches!(info.kind, TypeKind::Structure));
        is_structure
            && self
                .symbol_of(expression)
                .is_some_and(|symbol| symbol.is_assignable_storage())
    }

    fn convert_handler(&mut self, event: NodeIndex, handler: NodeIndex, operator: &'static str) -> ConvertResult<Vec<CsNode>> {
        let event = self.convert_reference(event)?;
        let handler = self.convert_expression(handler)?;
        Ok(vec![CsNode::expr_stmt(CsNode::assign_op(event, operator, handler))])
    }
}

/// `As` type of a name carrying its own modifiers: `x?`, `arr()`, `arr(5)`.
fn modified_type(as_type: &TypeRef, nullable: bool, array_rank: u32, bound_count: usize) -> TypeRef {
    let mut type_ref = as_type.clone();
    if nullable {
        type_ref.nullable = true;
    }
    if array_rank > 0 {
        type_ref = type_ref.array(array_rank);
    }
    if bound_count > 0 {
        type_ref = type_ref.array(bound_count as u32);
    }
    type_ref
}

/// Numeric line labels are not identifiers in the target.
fn label_name(label: &str) -> String {
    if label.starts_with(|c: char| c.is_ascii_digit()) {
        format!("_{label}")
    } else {
        label.to_string()
    }
}

pub(crate) fn labeled_empty(label: String) -> CsNode {
    CsNode::Labeled {
        label,
        statement: Box::new(CsNode::Empty),
    }
}
