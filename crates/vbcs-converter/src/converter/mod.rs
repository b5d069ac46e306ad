//! Tree rewriter.
//!
//! `Converter` walks one source compilation unit depth-first and builds the
//! target tree bottom-up. Each submodule adds one family of rewrite rules to
//! the same `impl<'a> Converter<'a>`:
//!
//! - `conversions`: adapting an expression to its context type
//! - `equality`: comparison and `Like` emulation
//! - `expressions`: operators, literals, casts, object and array creation
//! - `references`: identifiers, member access, qualification
//! - `invocations`: call/index disambiguation and argument lists
//! - `hoisting`: by-reference arguments that need a temporary
//! - `lambdas` / `queries`: lambda bodies, local-function promotion, queries
//! - `statements` / `branches` / `loops` / `redim`: statement rules
//! - `members` / `declarations`: type members and containers
//!
//! The arena and the semantic model are borrowed for `'a`, so node kinds and
//! symbols looked up through them can be held across `&mut self` calls.

mod branches;
mod conversions;
mod declarations;
mod equality;
mod expressions;
mod hoisting;
mod invocations;
mod lambdas;
mod loops;
mod members;
mod queries;
mod redim;
mod references;
mod statements;

use tracing::debug;
use vbcs_common::Diagnostic;
use vbcs_common::limits::{MAX_DECLARATION_DEPTH, MAX_EXPRESSION_DEPTH, MAX_STATEMENT_DEPTH};
use vbcs_semantic::{SemanticModel, SpecialType, Symbol, SymbolId, TypeId, TypeInfo, TypeKind};
use vbcs_syntax::source::{NodeIndex, SourceArena, SourceKind, TypeRef};
use vbcs_syntax::target::CsNode;

use crate::constant_folding::ConstantFolder;
use crate::context::{
    AdditionalLocal, Breakable, BreakableKind, ConversionContext, MethodFrame, TypeFrame,
};
use crate::driver::MemberOutcome;
use crate::error::{ConversionError, ConvertResult};
use crate::options::{CancellationFlag, ConversionOptions};
use crate::type_conversions::TypeConversionAnalyzer;
use crate::type_names::{type_id_name, type_ref_name};

pub struct Converter<'a> {
    pub(crate) arena: &'a SourceArena,
    pub(crate) model: &'a dyn SemanticModel,
    pub(crate) options: ConversionOptions,
    pub(crate) ctx: ConversionContext,
    /// Outcome of every member converted so far, in source order
    pub(crate) members: Vec<MemberOutcome>,
    cancellation: Option<CancellationFlag>,
    cancelled: bool,
}

impl<'a> Converter<'a> {
    pub fn new(
        arena: &'a SourceArena,
        model: &'a dyn SemanticModel,
        options: ConversionOptions,
    ) -> Self {
        Self {
            arena,
            model,
            options,
            ctx: ConversionContext::new(),
            members: Vec::new(),
            cancellation: None,
            cancelled: false,
        }
    }

    #[must_use]
    pub fn with_cancellation(mut self, flag: CancellationFlag) -> Self {
        self.cancellation = Some(flag);
        self
    }

    pub fn context(&self) -> &ConversionContext {
        &self.ctx
    }

    pub fn into_parts(self) -> (ConversionContext, Vec<MemberOutcome>) {
        (self.ctx, self.members)
    }

    pub const fn was_cancelled(&self) -> bool {
        self.cancelled
    }

    /// Polled between declarations; once set, remaining declarations are
    /// skipped.
    pub(crate) fn check_cancelled(&mut self) -> bool {
        if !self.cancelled && self.cancellation.as_ref().is_some_and(CancellationFlag::is_cancelled) {
            debug!("conversion cancelled");
            self.cancelled = true;
        }
        self.cancelled
    }

    // =========================================================================
    // Node and model access
    // =========================================================================

    pub(crate) fn kind_of(&self, node: NodeIndex) -> ConvertResult<&'a SourceKind> {
        self.arena
            .kind(node)
            .ok_or_else(|| ConversionError::unsupported("Node", format!("node {} does not exist", node.0)))
    }

    /// Symbol a reference resolves to.
    pub(crate) fn symbol_entry(&self, node: NodeIndex) -> Option<(SymbolId, &'a Symbol)> {
        let model = self.model;
        let id = model.resolve_symbol(node)?;
        model.symbol(id).map(|symbol| (id, symbol))
    }

    pub(crate) fn symbol_of(&self, node: NodeIndex) -> Option<&'a Symbol> {
        self.symbol_entry(node).map(|(_, symbol)| symbol)
    }

    pub(crate) fn declared_entry(&self, node: NodeIndex) -> Option<(SymbolId, &'a Symbol)> {
        let model = self.model;
        let id = model.declared_symbol(node)?;
        model.symbol(id).map(|symbol| (id, symbol))
    }

    pub(crate) fn declared_of(&self, node: NodeIndex) -> Option<&'a Symbol> {
        self.declared_entry(node).map(|(_, symbol)| symbol)
    }

    pub(crate) fn type_info(&self, id: TypeId) -> Option<&'a TypeInfo> {
        let model = self.model;
        model.type_info(id)
    }

    pub(crate) fn special_of(&self, id: TypeId) -> Option<SpecialType> {
        self.type_info(id)?.special()
    }

    /// Special type of `id`, looking through enums to their underlying type.
    pub(crate) fn numeric_special_of(&self, id: TypeId) -> Option<SpecialType> {
        match &self.type_info(id)?.kind {
            TypeKind::Special(special) => Some(*special),
            TypeKind::Enum { underlying } => self.special_of(*underlying),
            _ => None,
        }
    }

    /// Type of an expression as the context sees it.
    pub(crate) fn value_type(&self, node: NodeIndex) -> Option<TypeId> {
        self.model
            .converted_type(node)
            .or_else(|| self.model.static_type(node))
    }

    pub(crate) fn is_value_type(&self, id: TypeId) -> bool {
        self.type_info(id).is_some_and(TypeInfo::is_value_type)
    }

    pub(crate) fn analyzer(&self) -> TypeConversionAnalyzer<'a> {
        TypeConversionAnalyzer::new(self.arena, self.model)
    }

    pub(crate) fn folder(&self) -> ConstantFolder<'a> {
        ConstantFolder::new(self.arena, self.model, self.options.option_compare_text)
    }

    // =========================================================================
    // Names
    // =========================================================================

    /// Target spelling of a resolved type, recording any import it needs.
    pub(crate) fn type_name(&mut self, id: TypeId) -> String {
        type_id_name(
            self.model,
            id,
            &self.ctx.namespaces_in_scope,
            &mut self.ctx.extra_imports,
        )
    }

    pub(crate) fn type_ref_name(&mut self, type_ref: &TypeRef) -> String {
        type_ref_name(type_ref, &mut self.ctx.extra_imports)
    }

    /// Fresh identifier derived from `base`, unique among the names visible
    /// at `at` and every name synthesized in enclosing scopes.
    pub(crate) fn unique_name(&mut self, base: &str, at: NodeIndex) -> String {
        let visible = if at.is_some() {
            self.model.lookup_visible_names(at)
        } else {
            Vec::new()
        };
        self.ctx.names.unique_name(base, &visible)
    }

    pub(crate) fn require_import(&mut self, namespace: &str) {
        self.ctx.require_import(namespace);
    }

    // =========================================================================
    // Diagnostics
    // =========================================================================

    pub(crate) fn span(&self, node: NodeIndex) -> (u32, u32) {
        self.arena
            .get(node)
            .map_or((0, 0), |n| (n.pos, n.end.saturating_sub(n.pos)))
    }

    pub(crate) fn warn(&mut self, node: NodeIndex, code: u32, message: String) {
        let (start, length) = self.span(node);
        self.ctx.report(Diagnostic::warning(start, length, message, code));
    }

    pub(crate) fn inform(&mut self, node: NodeIndex, code: u32, message: String) {
        let (start, length) = self.span(node);
        self.ctx.report(Diagnostic::message(start, length, message, code));
    }

    // =========================================================================
    // Scoped state
    // =========================================================================
    //
    // Every helper below pushes, runs the closure, and pops before looking at
    // the closure's result, so an `Err` leaves the context as it found it.

    fn with_depth<T>(
        &mut self,
        counter: fn(&mut ConversionContext) -> &mut u32,
        limit: u32,
        f: impl FnOnce(&mut Self) -> ConvertResult<T>,
    ) -> ConvertResult<T> {
        let depth = counter(&mut self.ctx);
        if *depth >= limit {
            return Err(ConversionError::DepthExceeded);
        }
        *depth += 1;
        let result = f(self);
        *counter(&mut self.ctx) -= 1;
        result
    }

    pub(crate) fn with_expression_depth<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> ConvertResult<T>,
    ) -> ConvertResult<T> {
        self.with_depth(|ctx| &mut ctx.expression_depth, MAX_EXPRESSION_DEPTH, f)
    }

    pub(crate) fn with_statement_depth<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> ConvertResult<T>,
    ) -> ConvertResult<T> {
        self.with_depth(|ctx| &mut ctx.statement_depth, MAX_STATEMENT_DEPTH, f)
    }

    pub(crate) fn with_declaration_depth<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> ConvertResult<T>,
    ) -> ConvertResult<T> {
        self.with_depth(|ctx| &mut ctx.declaration_depth, MAX_DECLARATION_DEPTH, f)
    }

    pub(crate) fn with_name_scope<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> ConvertResult<T>,
    ) -> ConvertResult<T> {
        self.ctx.names.push_scope();
        let result = f(self);
        self.ctx.names.pop_scope();
        result
    }

    /// Run `f` with a fresh hoisting frame and return what it collected.
    pub(crate) fn collect_hoisted<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> ConvertResult<T>,
    ) -> ConvertResult<(T, Vec<AdditionalLocal>)> {
        self.ctx.locals.push_frame();
        let result = f(self);
        let locals = self.ctx.locals.pop_frame();
        result.map(|value| (value, locals))
    }

    pub(crate) fn with_breakable<T>(
        &mut self,
        kind: BreakableKind,
        f: impl FnOnce(&mut Self) -> ConvertResult<T>,
    ) -> ConvertResult<(T, Breakable)> {
        self.ctx.push_breakable(kind);
        let result = f(self);
        let breakable = self.ctx.pop_breakable();
        let value = result?;
        let breakable = breakable.ok_or_else(|| {
            ConversionError::unsupported("Breakable", "breakable stack underflow")
        })?;
        Ok((value, breakable))
    }

    pub(crate) fn with_method<T>(
        &mut self,
        frame: MethodFrame,
        f: impl FnOnce(&mut Self) -> ConvertResult<T>,
    ) -> ConvertResult<T> {
        self.ctx.methods.push(frame);
        let result = f(self);
        self.ctx.methods.pop();
        result
    }

    pub(crate) fn with_type<T>(
        &mut self,
        frame: TypeFrame,
        f: impl FnOnce(&mut Self) -> ConvertResult<T>,
    ) -> ConvertResult<T> {
        self.ctx.types.push(frame);
        let result = f(self);
        self.ctx.types.pop();
        result
    }

    pub(crate) fn with_receiver<T>(
        &mut self,
        receiver: CsNode,
        f: impl FnOnce(&mut Self) -> ConvertResult<T>,
    ) -> ConvertResult<T> {
        self.ctx.with_receivers.push(receiver);
        let result = f(self);
        self.ctx.with_receivers.pop();
        result
    }

    /// Run `f` with `namespaces` additionally in scope.
    pub(crate) fn with_namespaces<T>(
        &mut self,
        namespaces: Vec<String>,
        f: impl FnOnce(&mut Self) -> ConvertResult<T>,
    ) -> ConvertResult<T> {
        let mark = self.ctx.namespaces_in_scope.len();
        self.ctx.namespaces_in_scope.extend(namespaces);
        let result = f(self);
        self.ctx.namespaces_in_scope.truncate(mark);
        result
    }
}

/// Place hoisted declarations before `nodes` and, when `write_back` is set,
/// their property write-backs after them.
pub(crate) fn flush_locals(
    nodes: Vec<CsNode>,
    locals: Vec<AdditionalLocal>,
    write_back: bool,
) -> Vec<CsNode> {
    if locals.is_empty() {
        return nodes;
    }
    let mut out: Vec<CsNode> = locals.iter().map(AdditionalLocal::declaration).collect();
    out.extend(nodes);
    for local in locals {
        match local.write_back {
            Some(assignment) if write_back => out.push(CsNode::expr_stmt(assignment)),
            Some(_) => debug!(local = %local.name, "write-back dropped outside an expression statement"),
            None => {}
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/converter.rs"]
mod tests;
