//! Type members: methods, constructors, properties, events and fields.
//!
//! ```text
//! Public Function Total() As Integer      public int Total()
//!     Total = 1                      =>   {
//!     If x Then Exit Function                 int TotalRet = default;
//!     Total += 2                              TotalRet = 1;
//! End Function                                if (x) return TotalRet;
//!                                             TotalRet += 2;
//!                                             return TotalRet;
//!                                         }
//! ```

use super::Converter;
use crate::context::{MethodFrame, MethodKind, TypeFrame};
use crate::error::{ConversionError, ConvertResult};
use crate::type_conversions::ConversionSite;
use tracing::{debug, trace};
use vbcs_semantic::{ParameterInfo, PassingMode, SymbolId, SymbolKind, TypeId};
use vbcs_syntax::source::{
    Accessor, Argument, Declarator, EventContainer, Modifiers, NodeIndex, SourceKind, TypeBlockKind, TypeRef,
};
use vbcs_syntax::target::{
    ConstructorInitializerKind, CsAccessor, CsBody, CsConstructorInitializer, CsDeclarator, CsMethod, CsNode,
    CsParam, CsProperty, ParamModifier,
};

use super::statements::DeclaredVariable;

// =============================================================================
// Modifiers
// =============================================================================

/// Where a member is declared, for its modifier defaults.
#[derive(Clone, Copy, Debug)]
pub(crate) struct MemberSite {
    /// Accessibility made explicit when none is written
    pub default_access: &'static str,
    pub in_module: bool,
    pub in_interface: bool,
}

impl MemberSite {
    pub(crate) fn of(frame: Option<&TypeFrame>, default_access: &'static str) -> Self {
        Self {
            default_access,
            in_module: frame.is_some_and(TypeFrame::is_module),
            in_interface: frame.is_some_and(TypeFrame::is_interface),
        }
    }
}

/// Target modifiers in target order: access, `new`, `static`, inheritance,
/// `readonly`/`const`, `async`, `partial`.
pub(crate) fn member_modifiers(modifiers: Modifiers, site: MemberSite) -> Vec<&'static str> {
    let mut out = Vec::new();
    if !site.in_interface {
        let protected = modifiers.contains(Modifiers::PROTECTED);
        let friend = modifiers.contains(Modifiers::FRIEND);
        if modifiers.contains(Modifiers::PUBLIC) {
            out.push("public");
        } else if protected && friend {
            out.extend(["protected", "internal"]);
        } else if protected {
            out.push("protected");
        } else if friend {
            out.push("internal");
        } else if modifiers.contains(Modifiers::PRIVATE) {
            out.push("private");
        } else if !site.default_access.is_empty() {
            out.push(site.default_access);
        }
    }
    if modifiers.contains(Modifiers::SHADOWS) {
        out.push("new");
    }
    let is_const = modifiers.contains(Modifiers::CONST);
    if !is_const && (modifiers.contains(Modifiers::SHARED) || site.in_module) {
        out.push("static");
    }
    if modifiers.contains(Modifiers::MUST_OVERRIDE) || modifiers.contains(Modifiers::MUST_INHERIT) {
        out.push("abstract");
    }
    if modifiers.contains(Modifiers::OVERRIDABLE) {
        out.push("virtual");
    }
    if modifiers.contains(Modifiers::NOT_OVERRIDABLE) || modifiers.contains(Modifiers::NOT_INHERITABLE) {
        out.push("sealed");
    }
    if modifiers.contains(Modifiers::OVERRIDES) {
        out.push("override");
    }
    if is_const {
        out.push("const");
    } else if modifiers.contains(Modifiers::READ_ONLY) {
        out.push("readonly");
    }
    if modifiers.contains(Modifiers::ASYNC) {
        out.push("async");
    }
    if modifiers.contains(Modifiers::PARTIAL) {
        out.push("partial");
    }
    out
}

impl<'a> Converter<'a> {
    pub(crate) fn member_site(&self, default_access: &'static str) -> MemberSite {
        MemberSite::of(self.ctx.current_type(), default_access)
    }

    // =========================================================================
    // Parameters
    // =========================================================================

    /// Convert parameter declarations. `infos` are the resolved parameters
    /// of the enclosing member; without them (lambdas) a parameter with no
    /// `As` clause stays untyped.
    pub(crate) fn convert_parameters(
        &mut self,
        params: &'a [NodeIndex],
        infos: Option<&'a [ParameterInfo]>,
    ) -> ConvertResult<Vec<CsParam>> {
        let mut out = Vec::with_capacity(params.len());
        for (position, &node) in params.iter().enumerate() {
            let SourceKind::Parameter {
                name,
                modifiers,
                type_ref,
                default,
            } = self.kind_of(node)?
            else {
                return Err(ConversionError::unsupported("ParameterList", "parameter is not a Parameter node"));
            };
            let info = infos.and_then(|infos| infos.get(position));
            let type_id = info
                .map(|info| info.type_id)
                .or_else(|| self.declared_of(node).map(|symbol| symbol.type_id));
            let type_name = match (type_ref, infos) {
                (Some(type_ref), _) => Some(self.type_ref_name(type_ref)),
                (None, Some(_)) => Some(type_id.map_or_else(|| "object".to_string(), |t| self.type_name(t))),
                (None, None) => None,
            };
            let modifier = if modifiers.contains(Modifiers::PARAM_ARRAY) {
                ParamModifier::Params
            } else if info.is_some_and(|i| i.passing == PassingMode::Out) {
                ParamModifier::Out
            } else if modifiers.contains(Modifiers::BY_REF) || info.is_some_and(|i| i.passing == PassingMode::ByRef) {
                ParamModifier::Ref
            } else {
                ParamModifier::None
            };
            let site = ConversionSite {
                is_constant: true,
                always_explicit: false,
            };
            let default_value = match default {
                Some(value) => Some(self.convert_value_to(*value, type_id, site)?),
                None if modifiers.contains(Modifiers::OPTIONAL) => Some(CsNode::DefaultLiteral(None)),
                None => None,
            };
            out.push(CsParam {
                name: name.clone(),
                type_name,
                modifier,
                default_value,
            });
        }
        Ok(out)
    }

    // =========================================================================
    // Bodies
    // =========================================================================

    /// The implicit variable named after a function or getter, when the
    /// body uses it.
    fn return_value_symbol(&self, body: &[NodeIndex]) -> Option<SymbolId> {
        let flow = self.model.analyze_data_flow(body);
        flow.written_inside
            .iter()
            .chain(flow.read_inside.iter())
            .copied()
            .find(|&id| {
                self.model
                    .symbol(id)
                    .is_some_and(|symbol| symbol.kind == SymbolKind::FunctionReturnValue)
            })
    }

    /// Convert a method-like body inside its own name scope and method
    /// frame, adding the return holder and the implicit final return.
    pub(crate) fn convert_method_body(
        &mut self,
        mut frame: MethodFrame,
        body: &'a [NodeIndex],
        is_iterator: bool,
    ) -> ConvertResult<Vec<CsNode>> {
        let returns_value = frame.returns_value() && !is_iterator;
        self.with_name_scope(|c| {
            let mut statements = Vec::new();
            if returns_value && let Some(symbol) = c.return_value_symbol(body) {
                let at = body.first().copied().unwrap_or(NodeIndex::NONE);
                let holder = c.unique_name(&format!("{}Ret", frame.name), at);
                trace!(%holder, "function return holder");
                statements.push(CsNode::local(
                    frame.return_type.clone(),
                    holder.clone(),
                    Some(CsNode::DefaultLiteral(None)),
                ));
                frame.return_holder = Some(holder);
                frame.return_symbol = Some(symbol);
            }
            let holder = frame.return_holder.clone();
            c.with_method(frame, |c| {
                statements.extend(c.convert_block(body)?);
                if returns_value && c.model.analyze_control_flow(body).end_point_reachable {
                    let value = holder.map_or(CsNode::DefaultLiteral(None), CsNode::id);
                    statements.push(CsNode::ret(Some(value)));
                }
                Ok(statements)
            })
        })
    }

    // =========================================================================
    // Methods
    // =========================================================================

    #[allow(clippy::too_many_arguments)]
    pub(crate) fn convert_method(
        &mut self,
        node: NodeIndex,
        name: &str,
        modifiers: Modifiers,
        is_function: bool,
        type_params: &[String],
        params: &'a [NodeIndex],
        return_type: Option<&TypeRef>,
        body: Option<&'a [NodeIndex]>,
    ) -> ConvertResult<Vec<CsNode>> {
        let symbol = self.declared_of(node);
        let infos = symbol.map_or(&[][..], |s| s.parameters.as_slice());
        let return_type = match (return_type, symbol) {
            _ if !is_function => "void".to_string(),
            (Some(type_ref), _) => self.type_ref_name(type_ref),
            (None, Some(symbol)) if symbol.type_id != TypeId::VOID => self.type_name(symbol.type_id),
            _ => "object".to_string(),
        };
        let name = symbol.map_or_else(|| name.to_string(), |s| s.name.clone());
        let parameters = self.convert_parameters(params, Some(infos))?;
        let mut target_modifiers = member_modifiers(modifiers, self.member_site("public"));

        let body = match body {
            None => CsBody::None,
            Some(body) => {
                let kind = if is_function {
                    MethodKind::Function
                } else {
                    MethodKind::Sub
                };
                let frame = MethodFrame::new(name.clone(), kind, return_type.clone());
                let is_iterator = modifiers.contains(Modifiers::ITERATOR);
                CsBody::Block(self.convert_method_body(frame, body, is_iterator)?)
            }
        };
        if matches!(body, CsBody::None) && self.ctx.current_type().is_some_and(TypeFrame::is_interface) {
            target_modifiers.clear();
        }
        Ok(vec![CsNode::Method(Box::new(CsMethod {
            modifiers: target_modifiers,
            return_type,
            name,
            type_params: type_params.to_vec(),
            parameters,
            body,
        }))])
    }

    // =========================================================================
    // Constructors
    // =========================================================================

    pub(crate) fn convert_constructor(
        &mut self,
        node: NodeIndex,
        modifiers: Modifiers,
        params: &'a [NodeIndex],
        body: &'a [NodeIndex],
    ) -> ConvertResult<Vec<CsNode>> {
        let type_name = self.current_type_name()?;
        let is_shared = modifiers.contains(Modifiers::SHARED);
        let symbol = self.declared_of(node);
        let infos = symbol.map_or(&[][..], |s| s.parameters.as_slice());
        let parameters = self.convert_parameters(params, Some(infos))?;
        let target_modifiers = if is_shared {
            vec!["static"]
        } else {
            member_modifiers(modifiers, self.member_site("public"))
        };

        let (initializer, rest) = match body.split_first() {
            Some((first, rest)) if !is_shared => match self.constructor_call(*first)? {
                Some((kind, arguments)) => (Some(self.convert_constructor_call(*first, kind, arguments)?), rest),
                None => (None, body),
            },
            _ => (None, body),
        };
        let frame = MethodFrame::new(type_name.clone(), MethodKind::Constructor, "void");
        let mut statements = Vec::new();
        // A `this(...)` chain already wires the handlers.
        let chains_to_this = matches!(
            &initializer,
            Some(CsConstructorInitializer {
                kind: ConstructorInitializerKind::This,
                ..
            })
        );
        if !is_shared && !chains_to_this {
            statements.extend(self.own_handler_wiring());
        }
        statements.extend(self.convert_method_body(frame, rest, false)?);
        Ok(vec![CsNode::Constructor {
            modifiers: target_modifiers,
            name: type_name,
            parameters,
            initializer,
            body: statements,
        }])
    }

    fn current_type_name(&self) -> ConvertResult<String> {
        self.ctx
            .current_type()
            .map(|frame| frame.name.clone())
            .ok_or_else(|| ConversionError::unsupported("ConstructorBlock", "constructor outside a type"))
    }

    /// `MyBase.New(...)` / `Me.New(...)` / `MyClass.New(...)` as the first
    /// statement of a constructor.
    fn constructor_call(
        &self,
        statement: NodeIndex,
    ) -> ConvertResult<Option<(ConstructorInitializerKind, &'a [Argument])>> {
        let SourceKind::ExpressionStatement { expression } = self.kind_of(statement)? else {
            return Ok(None);
        };
        let SourceKind::Invocation { expression, arguments } = self.kind_of(*expression)? else {
            return Ok(None);
        };
        let SourceKind::MemberAccess {
            expression: Some(receiver),
            name,
            ..
        } = self.kind_of(*expression)?
        else {
            return Ok(None);
        };
        if !name.eq_ignore_ascii_case("New") {
            return Ok(None);
        }
        Ok(match self.kind_of(*receiver)? {
            SourceKind::MyBase => Some((ConstructorInitializerKind::Base, arguments.as_slice())),
            SourceKind::Me | SourceKind::MyClass => Some((ConstructorInitializerKind::This, arguments.as_slice())),
            _ => None,
        })
    }

    fn convert_constructor_call(
        &mut self,
        statement: NodeIndex,
        kind: ConstructorInitializerKind,
        arguments: &'a [Argument],
    ) -> ConvertResult<CsConstructorInitializer> {
        let SourceKind::ExpressionStatement { expression } = self.kind_of(statement)? else {
            return Err(ConversionError::unsupported("ConstructorBlock", "constructor call is not a statement"));
        };
        let parameters = self.symbol_of(*expression).map_or(&[][..], |s| s.parameters.as_slice());
        // Initializer arguments cannot use statement temporaries.
        let (arguments, locals) = self.collect_hoisted(|c| c.convert_arguments(arguments, parameters))?;
        if !locals.is_empty() {
            return Err(ConversionError::AmbiguousHoist(
                "a constructor call passes a non-variable by reference".to_string(),
            ));
        }
        Ok(CsConstructorInitializer { kind, arguments })
    }

    /// `Event += Handler;` for every `Handles Me.E`/`MyBase.E`/`MyClass.E`
    /// in the current type.
    pub(crate) fn own_handler_wiring(&self) -> Vec<CsNode> {
        [EventContainer::Me, EventContainer::MyBase, EventContainer::MyClass]
            .iter()
            .flat_map(|container| self.ctx.handlers_for(container))
            .map(|(event, method)| CsNode::expr_stmt(CsNode::assign_op(CsNode::id(event), "+=", CsNode::id(method))))
            .collect()
    }

    // =========================================================================
    // Properties
    // =========================================================================

    #[allow(clippy::too_many_arguments)]
    pub(crate) fn convert_property(
        &mut self,
        node: NodeIndex,
        name: &str,
        modifiers: Modifiers,
        params: &'a [NodeIndex],
        type_ref: Option<&TypeRef>,
        initializer: Option<NodeIndex>,
        getter: Option<&'a Accessor>,
        setter: Option<&'a Accessor>,
    ) -> ConvertResult<Vec<CsNode>> {
        let symbol = self.declared_of(node);
        let is_default = modifiers.contains(Modifiers::DEFAULT);
        if !params.is_empty() && !is_default {
            return Err(ConversionError::unsupported(
                "PropertyBlock",
                "only the default property may take parameters",
            ));
        }
        let type_id = symbol.map(|s| s.type_id);
        let type_name = match (type_ref, type_id) {
            (Some(type_ref), _) => self.type_ref_name(type_ref),
            (None, Some(type_id)) => self.type_name(type_id),
            (None, None) => "object".to_string(),
        };
        let name = symbol.map_or_else(|| name.to_string(), |s| s.name.clone());
        let infos = symbol.map_or(&[][..], |s| s.parameters.as_slice());
        let parameters = self.convert_parameters(params, Some(infos))?;
        let in_interface = self.ctx.current_type().is_some_and(TypeFrame::is_interface);
        let property_modifiers = modifiers.difference(Modifiers::READ_ONLY | Modifiers::WRITE_ONLY | Modifiers::DEFAULT);
        let target_modifiers = member_modifiers(property_modifiers, self.member_site("public"));
        let read_only = modifiers.contains(Modifiers::READ_ONLY);
        let write_only = modifiers.contains(Modifiers::WRITE_ONLY);

        let is_auto = getter.is_none() && setter.is_none();
        let (getter, setter, initializer) = if is_auto {
            let auto = || CsAccessor {
                modifiers: Vec::new(),
                body: None,
            };
            let initializer = match initializer {
                Some(value) => Some(self.convert_value_to(value, type_id, ConversionSite::default())?),
                None => None,
            };
            let getter = (!write_only).then(auto);
            let setter = (!read_only).then(auto);
            (getter, setter, initializer)
        } else {
            let getter = match getter {
                Some(accessor) => Some(self.convert_getter(&name, &type_name, accessor)?),
                None => None,
            };
            let setter = match setter {
                Some(accessor) => Some(self.convert_setter(&name, accessor)?),
                None => None,
            };
            (getter, setter, None)
        };

        Ok(vec![CsNode::Property(Box::new(CsProperty {
            modifiers: if in_interface { Vec::new() } else { target_modifiers },
            type_name,
            name: if is_default { "this".to_string() } else { name },
            parameters,
            getter,
            setter,
            initializer,
        }))])
    }

    fn accessor_modifiers(&self, accessor: &Accessor) -> Vec<&'static str> {
        let access = accessor.modifiers & Modifiers::ACCESSIBILITY;
        if access.is_empty() {
            return Vec::new();
        }
        member_modifiers(access, MemberSite::of(None, ""))
    }

    fn convert_getter(&mut self, name: &str, type_name: &str, accessor: &'a Accessor) -> ConvertResult<CsAccessor> {
        let frame = MethodFrame::new(name, MethodKind::Getter, type_name);
        let body = self.convert_method_body(frame, &accessor.body, false)?;
        Ok(CsAccessor {
            modifiers: self.accessor_modifiers(accessor),
            body: Some(body),
        })
    }

    fn convert_setter(&mut self, name: &str, accessor: &'a Accessor) -> ConvertResult<CsAccessor> {
        let mut frame = MethodFrame::new(name, MethodKind::Setter, "void");
        frame.setter_value = accessor.parameter.and_then(|p| self.model.declared_symbol(p));
        let body = self.convert_method_body(frame, &accessor.body, false)?;
        Ok(CsAccessor {
            modifiers: self.accessor_modifiers(accessor),
            body: Some(body),
        })
    }

    // =========================================================================
    // Events
    // =========================================================================

    /// `Event E As T` is a plain event; `Event E(args)` also needs a
    /// delegate type, `EEventHandler`.
    pub(crate) fn convert_event(
        &mut self,
        node: NodeIndex,
        name: &str,
        modifiers: Modifiers,
        type_ref: Option<&TypeRef>,
        params: &'a [NodeIndex],
    ) -> ConvertResult<Vec<CsNode>> {
        let target_modifiers = if self.ctx.current_type().is_some_and(TypeFrame::is_interface) {
            Vec::new()
        } else {
            member_modifiers(modifiers, self.member_site("public"))
        };
        if let Some(type_ref) = type_ref {
            let type_name = self.type_ref_name(type_ref);
            return Ok(vec![CsNode::Event {
                modifiers: target_modifiers,
                type_name,
                name: name.to_string(),
            }]);
        }
        let delegate_name = format!("{name}EventHandler");
        let infos = self.declared_of(node).map_or(&[][..], |s| s.parameters.as_slice());
        let parameters = self.convert_parameters(params, Some(infos))?;
        let delegate_access = target_modifiers
            .iter()
            .copied()
            .filter(|m| matches!(*m, "public" | "protected" | "internal" | "private"))
            .collect();
        Ok(vec![
            CsNode::DelegateDeclaration {
                modifiers: delegate_access,
                return_type: "void".to_string(),
                name: delegate_name.clone(),
                parameters,
            },
            CsNode::Event {
                modifiers: target_modifiers,
                type_name: delegate_name,
                name: name.to_string(),
            },
        ])
    }

    // =========================================================================
    // Fields
    // =========================================================================

    pub(crate) fn convert_field(&mut self, modifiers: Modifiers, declarators: &'a [Declarator]) -> ConvertResult<Vec<CsNode>> {
        let is_const = modifiers.contains(Modifiers::CONST);
        let default_access = if self.ctx.current_type().is_some_and(|f| f.kind == TypeBlockKind::Structure) {
            "public"
        } else {
            "private"
        };
        let site = ConversionSite {
            is_constant: is_const,
            always_explicit: false,
        };
        let field_modifiers = modifiers.difference(Modifiers::WITH_EVENTS | Modifiers::DIM);
        let target_modifiers = member_modifiers(field_modifiers, self.member_site(default_access));

        let mut out = Vec::new();
        for declarator in declarators {
            let (variables, locals) = self.collect_hoisted(|c| c.convert_declarator(declarator, site, false))?;
            if !locals.is_empty() {
                return Err(ConversionError::AmbiguousHoist(
                    "a field initializer passes a non-variable by reference".to_string(),
                ));
            }
            if modifiers.contains(Modifiers::WITH_EVENTS) {
                for variable in variables {
                    out.extend(self.with_events_field(&target_modifiers, variable));
                }
                continue;
            }
            if modifiers.contains(Modifiers::READ_ONLY)
                && let [variable] = variables.as_slice()
                && let Some(lambda) = variable.lambda
                && let Some(mut method) = self.try_local_function(&variable.name, lambda)?
            {
                debug!(name = %variable.name, "read-only lambda field promoted to a method");
                let mut method_modifiers: Vec<&'static str> =
                    target_modifiers.iter().copied().filter(|m| *m != "readonly").collect();
                method_modifiers.append(&mut method.modifiers);
                method.modifiers = method_modifiers;
                out.push(CsNode::Method(Box::new(method)));
                continue;
            }
            out.extend(field_groups(&target_modifiers, variables));
        }
        Ok(out)
    }

    /// `WithEvents` field: a private backing field plus a property whose
    /// setter moves every `Handles` subscription to the new value.
    fn with_events_field(&mut self, modifiers: &[&'static str], variable: DeclaredVariable) -> Vec<CsNode> {
        let backing = format!("_{}", variable.name);
        let handlers = self.ctx.handlers_for(&EventContainer::Field(variable.name.clone()));
        trace!(field = %variable.name, handlers = handlers.len(), "WithEvents field");
        let subscriptions = |operator: &'static str| -> Vec<CsNode> {
            handlers
                .iter()
                .map(|(event, method)| {
                    CsNode::expr_stmt(CsNode::assign_op(
                        CsNode::member(CsNode::id(backing.clone()), event.clone()),
                        operator,
                        CsNode::id(method.clone()),
                    ))
                })
                .collect()
        };
        let not_null = || CsNode::binary(CsNode::id(backing.clone()), "!=", CsNode::NullLiteral);
        let mut setter = Vec::new();
        if !handlers.is_empty() {
            setter.push(CsNode::if_stmt(not_null(), subscriptions("-="), None));
        }
        setter.push(CsNode::expr_stmt(CsNode::assign(CsNode::id(backing.clone()), CsNode::id("value"))));
        if !handlers.is_empty() {
            setter.push(CsNode::if_stmt(not_null(), subscriptions("+="), None));
        }

        let mut field_modifiers = vec!["private"];
        if modifiers.contains(&"static") {
            field_modifiers.push("static");
        }
        let property_modifiers: Vec<&'static str> = modifiers.iter().copied().filter(|m| *m != "readonly").collect();
        vec![
            CsNode::Field {
                modifiers: field_modifiers,
                type_name: variable.type_name.clone(),
                declarators: vec![CsDeclarator::new(backing.clone(), variable.initializer)],
            },
            CsNode::Property(Box::new(CsProperty {
                modifiers: property_modifiers,
                type_name: variable.type_name,
                name: variable.name,
                parameters: Vec::new(),
                getter: Some(CsAccessor {
                    modifiers: Vec::new(),
                    body: Some(vec![CsNode::ret(Some(CsNode::id(backing)))]),
                }),
                setter: Some(CsAccessor {
                    modifiers: Vec::new(),
                    body: Some(setter),
                }),
                initializer: None,
            })),
        ]
    }
}

/// One field declaration per run of variables of the same type.
fn field_groups(modifiers: &[&'static str], variables: Vec<DeclaredVariable>) -> Vec<CsNode> {
    let mut out: Vec<CsNode> = Vec::new();
    for variable in variables {
        let declarator = CsDeclarator::new(variable.name, variable.initializer);
        if let Some(CsNode::Field {
            type_name,
            declarators,
            ..
        }) = out.last_mut()
            && *type_name == variable.type_name
        {
            declarators.push(declarator);
            continue;
        }
        out.push(CsNode::Field {
            modifiers: modifiers.to_vec(),
            type_name: variable.type_name,
            declarators: vec![declarator],
        });
    }
    out
}
