//! Names and member accesses.
//!
//! A reference converts in one of two forms. The *reference* form is what a
//! callee, `AddressOf` or `NameOf` needs: the member itself. The *value*
//! form additionally calls methods written without parentheses, which the
//! source dialect allows and the target does not.

use super::Converter;
use tracing::{debug, trace};
use vbcs_common::{diagnostic_codes, format_message, names_equal};
use vbcs_semantic::{Symbol, SymbolKind, TypeId, TypeKind};
use vbcs_syntax::source::{NodeIndex, SourceKind, TypeRef};
use vbcs_syntax::target::CsNode;

use crate::error::{ConversionError, ConvertResult};

impl<'a> Converter<'a> {
    /// Identifier in a value position.
    pub(crate) fn convert_identifier(&mut self, node: NodeIndex, name: &str) -> ConvertResult<CsNode> {
        let reference = self.convert_name_reference(node, name)?;
        Ok(self.auto_call(node, reference))
    }

    /// `x.Name` / `.Name` in a value position.
    pub(crate) fn convert_member_access(
        &mut self,
        node: NodeIndex,
        receiver: Option<NodeIndex>,
        name: &str,
        type_args: &[TypeRef],
    ) -> ConvertResult<CsNode> {
        let reference = self.convert_member_reference(node, receiver, name, type_args)?;
        Ok(self.auto_call(node, reference))
    }

    /// Reference form of any expression: names and member accesses are not
    /// auto-called, everything else converts as usual.
    pub(crate) fn convert_reference(&mut self, node: NodeIndex) -> ConvertResult<CsNode> {
        match self.kind_of(node)? {
            SourceKind::Identifier { name } => self.convert_name_reference(node, name),
            SourceKind::MemberAccess {
                expression,
                name,
                type_args,
            } => self.convert_member_reference(node, *expression, name, type_args),
            _ => self.convert_expression(node),
        }
    }

    fn auto_call(&self, node: NodeIndex, reference: CsNode) -> CsNode {
        match self.symbol_of(node) {
            Some(symbol) if symbol.is_method() => CsNode::call(reference, Vec::new()),
            _ => reference,
        }
    }

    // =========================================================================
    // Simple names
    // =========================================================================

    fn convert_name_reference(&mut self, node: NodeIndex, written: &str) -> ConvertResult<CsNode> {
        let Some((id, symbol)) = self.symbol_entry(node) else {
            trace!(name = written, "unresolved name kept as written");
            return Ok(CsNode::id(written));
        };
        // Lambdas see the setter value and return holder of their method.
        for frame in self.ctx.methods.iter().rev() {
            if frame.setter_value == Some(id) {
                return Ok(CsNode::id("value"));
            }
            if frame.return_symbol == Some(id)
                && let Some(holder) = &frame.return_holder
            {
                return Ok(CsNode::id(holder.clone()));
            }
        }
        match symbol.kind {
            SymbolKind::Type => Ok(CsNode::id(self.type_name(symbol.type_id))),
            SymbolKind::Method { .. }
            | SymbolKind::Property { .. }
            | SymbolKind::Field { .. }
            | SymbolKind::Event => Ok(self.qualify(node, written, symbol)),
            _ => Ok(CsNode::id(symbol.name.clone())),
        }
    }

    /// Whether a simple-name reference to `symbol` needs its containing type
    /// spelled out in the target.
    fn needs_qualification(&self, symbol: &Symbol, containing: TypeId) -> bool {
        let current = self.ctx.current_type().and_then(|frame| frame.type_id);
        if current == Some(containing) {
            return false;
        }
        let in_module = self
            .type_info(containing)
            .is_some_and(|info| matches!(info.kind, TypeKind::Module));
        if in_module {
            self.options.qualify_module_members
        } else {
            symbol.is_shared
        }
    }

    /// Module members and shared members of other types get `Type.Name`.
    /// The qualified form is kept only if it still names the symbol.
    fn qualify(&mut self, node: NodeIndex, written: &str, symbol: &'a Symbol) -> CsNode {
        let simple = CsNode::id(symbol.name.clone());
        let Some(containing) = symbol.containing_type else {
            return simple;
        };
        if !self.needs_qualification(symbol, containing) {
            return simple;
        }
        let type_name = self.type_name(containing);
        let qualified_text = format!("{type_name}.{}", symbol.name);
        let resolves = !type_name.is_empty()
            && type_name != "object"
            && names_equal(written, &symbol.name)
            && self.type_info(containing).is_some();
        if !resolves {
            self.revert_qualification(node, &qualified_text, &symbol.name);
            return simple;
        }
        trace!(name = %qualified_text, "qualified reference");
        CsNode::member(CsNode::id(type_name), symbol.name.clone())
    }

    fn revert_qualification(&mut self, node: NodeIndex, qualified: &str, name: &str) {
        debug!(qualified, name, "qualified form failed its self-check, reverting");
        let message = format_message(
            diagnostic_codes::QUALIFICATION_REVERTED_TEMPLATE,
            &[qualified, name],
        );
        self.inform(node, diagnostic_codes::QUALIFICATION_REVERTED, message);
    }

    // =========================================================================
    // Member access
    // =========================================================================

    fn convert_member_reference(
        &mut self,
        node: NodeIndex,
        receiver: Option<NodeIndex>,
        name: &str,
        type_args: &[TypeRef],
    ) -> ConvertResult<CsNode> {
        let symbol = self.symbol_of(node);
        if let Some(symbol) = symbol
            && symbol.kind == SymbolKind::Type
        {
            return Ok(CsNode::id(self.type_name(symbol.type_id)));
        }
        let member_name = match symbol {
            Some(symbol) if !matches!(symbol.kind, SymbolKind::Namespace) => symbol.name.clone(),
            _ => name.to_string(),
        };
        let member_name = if type_args.is_empty() {
            member_name
        } else {
            let args: Vec<String> = type_args.iter().map(|t| self.type_ref_name(t)).collect();
            format!("{member_name}<{}>", args.join(", "))
        };

        let object = match receiver {
            Some(receiver) => self.convert_receiver(node, receiver, &member_name)?,
            None => self.ctx.with_receivers.last().cloned().ok_or_else(|| {
                ConversionError::unsupported("MemberAccessExpression", "'.' member access outside a With block")
            })?,
        };
        Ok(CsNode::member(object, member_name))
    }

    /// Receiver of a member access.
    fn convert_receiver(&mut self, node: NodeIndex, receiver: NodeIndex, member: &str) -> ConvertResult<CsNode> {
        match self.kind_of(receiver)? {
            SourceKind::MyBase => {
                // `base.M` only reaches inherited members.
                let current = self.ctx.current_type().and_then(|frame| frame.type_id);
                let declared_here = self
                    .symbol_of(node)
                    .is_some_and(|s| s.containing_type.is_some() && s.containing_type == current);
                if declared_here {
                    self.revert_qualification(node, &format!("base.{member}"), member);
                    return Ok(CsNode::This);
                }
                Ok(CsNode::Base)
            }
            _ if self.is_late_bound(node, receiver) => {
                let object = self.convert_expression(receiver)?;
                Ok(CsNode::cast("dynamic", object).paren())
            }
            _ => self.convert_expression(receiver),
        }
    }

    /// Member access the source dialect binds at run time: `Option Strict
    /// Off`, nothing resolved, receiver typed `Object`.
    fn is_late_bound(&self, node: NodeIndex, receiver: NodeIndex) -> bool {
        !self.options.option_strict
            && self.symbol_of(node).is_none()
            && self.model.static_type(receiver) == Some(TypeId::OBJECT)
    }
}
