//! Compilation units, namespaces, types, enums and delegates.
//!
//! Every declaration converts behind a guard: a `ConversionError` raised
//! anywhere inside one member replaces that member with an error
//! placeholder and a diagnostic, and conversion continues with the next
//! member. Cancellation is polled between declarations.

use super::Converter;
use super::members::{MemberSite, member_modifiers};
use crate::context::{MethodWithHandles, TypeFrame};
use crate::driver::MemberOutcome;
use crate::error::{ConversionError, ConvertResult};
use crate::type_conversions::ConversionSite;
use tracing::{debug, instrument};
use vbcs_common::{Diagnostic, diagnostic_codes, format_message};
use vbcs_semantic::{TypeId, TypeKind};
use vbcs_syntax::source::{
    EnumMemberData, ImportClause, Modifiers, NodeIndex, SourceKind, TypeBlockKind, TypeRef,
};
use vbcs_syntax::target::{CsNode, CsTypeDeclaration, CsTypeKind};

impl<'a> Converter<'a> {
    // =========================================================================
    // Compilation unit
    // =========================================================================

    /// Convert the members of a compilation unit. Usings for `imports` come
    /// first; imports required by the conversion are merged by the driver.
    pub(crate) fn convert_unit_members(&mut self, imports: &[ImportClause], members: &'a [NodeIndex]) -> CsNode {
        let usings = imports
            .iter()
            .map(|import| CsNode::UsingDirective {
                alias: import.alias.clone(),
                name: import.name.clone(),
            })
            .collect();
        let imported = imports
            .iter()
            .filter(|import| import.alias.is_none())
            .map(|import| import.name.clone())
            .collect();

        let root_namespace = self.options.root_namespace.clone().filter(|ns| !ns.is_empty());
        let converted = self
            .with_namespaces(imported, |c| {
                Ok(match root_namespace {
                    Some(root) => vec![c.convert_namespace(&root, members)],
                    None => c.convert_declarations(members),
                })
            })
            .unwrap_or_default();
        CsNode::CompilationUnit {
            usings,
            members: converted,
        }
    }

    /// Convert a declaration list, guarding each member and stopping at
    /// cancellation.
    fn convert_declarations(&mut self, members: &'a [NodeIndex]) -> Vec<CsNode> {
        let mut out = Vec::with_capacity(members.len());
        for &member in members {
            if self.check_cancelled() {
                break;
            }
            out.extend(self.convert_declaration_guarded(member));
        }
        out
    }

    // =========================================================================
    // Member guard
    // =========================================================================

    #[instrument(level = "debug", skip(self), fields(member = tracing::field::Empty))]
    fn convert_declaration_guarded(&mut self, node: NodeIndex) -> Vec<CsNode> {
        let kind = match self.kind_of(node) {
            Ok(kind) => kind,
            Err(error) => return vec![self.error_placeholder(node, "Node", &error)],
        };
        let member_name = self.member_display_name(kind);
        tracing::Span::current().record("member", member_name.as_str());
        let previous = self.ctx.current_member.replace(member_name.clone());
        let result = self.with_declaration_depth(|c| c.convert_declaration(node, kind));

        let nodes = match result {
            Ok(nodes) => {
                if !is_container(kind) {
                    self.members.push(MemberOutcome::Converted {
                        name: member_name,
                        nodes: nodes.clone(),
                    });
                }
                nodes
            }
            Err(error) => {
                debug!(member = %member_name, %error, "member replaced by an error placeholder");
                vec![self.error_placeholder(node, kind.name(), &error)]
            }
        };
        // Restored after the placeholder so its diagnostic names the member.
        self.ctx.current_member = previous;
        nodes
    }

    /// `/* CONVERSION ERROR: ... */` standing in for `node`, with its
    /// diagnostic.
    fn error_placeholder(&mut self, node: NodeIndex, kind: &'static str, error: &ConversionError) -> CsNode {
        let message = error.to_string();
        let original_text = self.arena.text(node).to_string();
        let (start, length) = self.span(node);
        let text = format_message(diagnostic_codes::UNSUPPORTED_CONSTRUCT_TEMPLATE, &[kind, &message]);
        self.ctx.report(Diagnostic::error(start, length, text, error.code()));
        self.members.push(MemberOutcome::ErrorPlaceholder {
            kind: kind.to_string(),
            original_text: original_text.clone(),
            message: message.clone(),
        });
        CsNode::ErrorPlaceholder {
            kind: kind.to_string(),
            message,
            original_text,
        }
    }

    /// `Type.Member` for diagnostics.
    fn member_display_name(&self, kind: &SourceKind) -> String {
        let member = match kind {
            SourceKind::Namespace { name, .. }
            | SourceKind::TypeBlock { name, .. }
            | SourceKind::EnumBlock { name, .. }
            | SourceKind::DelegateDecl { name, .. }
            | SourceKind::Method { name, .. }
            | SourceKind::Property { name, .. }
            | SourceKind::Event { name, .. } => name.clone(),
            SourceKind::Constructor { .. } => "New".to_string(),
            SourceKind::Field { declarators, .. } => declarators
                .iter()
                .flat_map(|d| d.names.iter())
                .find_map(|&n| self.arena.identifier_text(n))
                .unwrap_or("field")
                .to_string(),
            other => other.name().to_string(),
        };
        match self.ctx.current_type() {
            Some(frame) => format!("{}.{member}", frame.name),
            None => member,
        }
    }

    fn convert_declaration(&mut self, node: NodeIndex, kind: &'a SourceKind) -> ConvertResult<Vec<CsNode>> {
        match kind {
            SourceKind::Namespace { name, members } => Ok(vec![self.convert_namespace(name, members)]),
            SourceKind::TypeBlock {
                kind: block_kind,
                name,
                modifiers,
                type_params,
                inherits,
                implements,
                members,
            } => self.convert_type_block(
                node,
                *block_kind,
                name,
                *modifiers,
                type_params,
                inherits,
                implements,
                members,
            ),
            SourceKind::EnumBlock {
                name,
                modifiers,
                underlying,
                members,
            } => self.convert_enum(node, name, *modifiers, underlying.as_ref(), members),
            SourceKind::DelegateDecl {
                name,
                modifiers,
                is_function,
                params,
                return_type,
            } => self.convert_delegate(node, name, *modifiers, *is_function, params, return_type.as_ref()),
            SourceKind::Method {
                name,
                modifiers,
                is_function,
                type_params,
                params,
                return_type,
                body,
                ..
            } => self.convert_method(
                node,
                name,
                *modifiers,
                *is_function,
                type_params,
                params,
                return_type.as_ref(),
                body.as_deref(),
            ),
            SourceKind::Constructor {
                modifiers,
                params,
                body,
            } => self.convert_constructor(node, *modifiers, params, body),
            SourceKind::Property {
                name,
                modifiers,
                params,
                type_ref,
                initializer,
                getter,
                setter,
            } => self.convert_property(
                node,
                name,
                *modifiers,
                params,
                type_ref.as_ref(),
                *initializer,
                getter.as_ref(),
                setter.as_ref(),
            ),
            SourceKind::Event {
                name,
                modifiers,
                type_ref,
                params,
            } => self.convert_event(node, name, *modifiers, type_ref.as_ref(), params),
            SourceKind::Field {
                modifiers,
                declarators,
            } => self.convert_field(*modifiers, declarators),
            other => Err(ConversionError::unsupported(
                other.name(),
                "not valid in a declaration position",
            )),
        }
    }

    // =========================================================================
    // Containers
    // =========================================================================

    fn convert_namespace(&mut self, name: &str, members: &'a [NodeIndex]) -> CsNode {
        let full_name = self
            .ctx
            .namespaces
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(name))
            .collect::<Vec<_>>()
            .join(".");
        self.ctx.namespaces.push(name.to_string());
        let members = self
            .with_namespaces(vec![full_name], |c| Ok(c.convert_declarations(members)))
            .unwrap_or_default();
        self.ctx.namespaces.pop();
        CsNode::Namespace {
            name: name.to_string(),
            members,
        }
    }

    /// Accessibility a type gets when none is written.
    fn type_site(&self) -> MemberSite {
        let default_access = if self.ctx.current_type().is_some() {
            "public"
        } else {
            "internal"
        };
        self.member_site(default_access)
    }

    #[allow(clippy::too_many_arguments)]
    fn convert_type_block(
        &mut self,
        node: NodeIndex,
        kind: TypeBlockKind,
        name: &str,
        modifiers: Modifiers,
        type_params: &[String],
        inherits: &[TypeRef],
        implements: &[TypeRef],
        members: &'a [NodeIndex],
    ) -> ConvertResult<Vec<CsNode>> {
        let mut site = self.type_site();
        // Nested types are not module members.
        site.in_module = false;
        let mut target_modifiers = member_modifiers(modifiers, site);
        let target_kind = match kind {
            TypeBlockKind::Class => CsTypeKind::Class,
            TypeBlockKind::Module => {
                target_modifiers.push("static");
                CsTypeKind::Class
            }
            TypeBlockKind::Structure => CsTypeKind::Struct,
            TypeBlockKind::Interface => CsTypeKind::Interface,
        };
        let mut bases = Vec::with_capacity(inherits.len() + implements.len());
        for base in inherits.iter().chain(implements) {
            bases.push(self.type_ref_name(base));
        }

        let frame = TypeFrame {
            name: name.to_string(),
            type_id: self.declared_of(node).map(|s| s.type_id),
            kind,
            handles: self.collect_handles(members),
        };
        let converted = self.with_type(frame, |c| {
            let mut converted = c.convert_declarations(members);
            if let Some(constructor) = c.synthesized_constructor(members) {
                converted.insert(0, constructor);
            }
            Ok(converted)
        })?;

        Ok(vec![CsNode::TypeDeclaration(CsTypeDeclaration {
            kind: target_kind,
            modifiers: target_modifiers,
            name: name.to_string(),
            type_params: type_params.to_vec(),
            bases,
            members: converted,
        })])
    }

    /// Methods of a type with `Handles` clauses.
    fn collect_handles(&self, members: &[NodeIndex]) -> Vec<MethodWithHandles> {
        members
            .iter()
            .filter_map(|&member| match self.arena.kind(member)? {
                SourceKind::Method {
                    name,
                    modifiers,
                    handles,
                    ..
                } if !handles.is_empty() => Some(MethodWithHandles {
                    method: name.clone(),
                    is_shared: modifiers.contains(Modifiers::SHARED),
                    items: handles.clone(),
                }),
                _ => None,
            })
            .collect()
    }

    /// A parameterless constructor wiring `Handles Me.E` handlers, for a
    /// class that declares no instance constructor of its own.
    fn synthesized_constructor(&self, members: &[NodeIndex]) -> Option<CsNode> {
        let frame = self.ctx.current_type()?;
        if frame.kind != TypeBlockKind::Class {
            return None;
        }
        let has_constructor = members.iter().any(|&member| {
            matches!(
                self.arena.kind(member),
                Some(SourceKind::Constructor { modifiers, .. }) if !modifiers.contains(Modifiers::SHARED)
            )
        });
        if has_constructor {
            return None;
        }
        let wiring = self.own_handler_wiring();
        if wiring.is_empty() {
            return None;
        }
        debug!(type_name = %frame.name, handlers = wiring.len(), "constructor synthesized for event wiring");
        Some(CsNode::Constructor {
            modifiers: vec!["public"],
            name: frame.name.clone(),
            parameters: Vec::new(),
            initializer: None,
            body: wiring,
        })
    }

    // =========================================================================
    // Enums and delegates
    // =========================================================================

    fn convert_enum(
        &mut self,
        node: NodeIndex,
        name: &str,
        modifiers: Modifiers,
        underlying: Option<&TypeRef>,
        members: &'a [EnumMemberData],
    ) -> ConvertResult<Vec<CsNode>> {
        let mut site = self.type_site();
        site.in_module = false;
        let target_modifiers = member_modifiers(modifiers, site);
        let base = underlying.map(|t| self.type_ref_name(t)).filter(|base| base != "int");
        let underlying_type = self.declared_of(node).and_then(|symbol| {
            match self.type_info(symbol.type_id).map(|info| &info.kind) {
                Some(TypeKind::Enum { underlying }) => Some(*underlying),
                _ => None,
            }
        });
        let site = ConversionSite {
            is_constant: true,
            always_explicit: false,
        };
        let mut converted = Vec::with_capacity(members.len());
        for member in members {
            let value = match member.value {
                Some(value) => Some(self.convert_value_to(value, underlying_type, site)?),
                None => None,
            };
            converted.push((member.name.clone(), value));
        }
        Ok(vec![CsNode::EnumDeclaration {
            modifiers: target_modifiers,
            name: name.to_string(),
            base,
            members: converted,
        }])
    }

    fn convert_delegate(
        &mut self,
        node: NodeIndex,
        name: &str,
        modifiers: Modifiers,
        is_function: bool,
        params: &'a [NodeIndex],
        return_type: Option<&TypeRef>,
    ) -> ConvertResult<Vec<CsNode>> {
        let mut site = self.type_site();
        site.in_module = false;
        let symbol = self.declared_of(node);
        let return_type = match (is_function, return_type, symbol) {
            (false, _, _) => "void".to_string(),
            (true, Some(type_ref), _) => self.type_ref_name(type_ref),
            (true, None, Some(symbol)) if symbol.type_id != TypeId::VOID => self.type_name(symbol.type_id),
            (true, None, _) => "object".to_string(),
        };
        let infos = symbol.map_or(&[][..], |s| s.parameters.as_slice());
        let parameters = self.convert_parameters(params, Some(infos))?;
        Ok(vec![CsNode::DelegateDeclaration {
            modifiers: member_modifiers(modifiers, site),
            return_type,
            name: name.to_string(),
            parameters,
        }])
    }
}

/// Declarations whose members report their own outcomes.
const fn is_container(kind: &SourceKind) -> bool {
    matches!(kind, SourceKind::Namespace { .. } | SourceKind::TypeBlock { .. })
}
