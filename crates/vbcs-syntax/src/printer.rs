//! Reference printer for target trees.
//!
//! Production formatting belongs to an external formatter; this printer
//! exists so tests, diagnostics and debugging sessions can look at a
//! converted tree as text. Output is deterministic: four-space indentation,
//! braces on the statement line, one statement per line.

use crate::target::{
    ConstructorInitializerKind, CsAccessor, CsArgument, CsBody, CsCatch, CsDeclarator,
    CsInterpolation, CsLocalDeclaration, CsMethod, CsNode, CsParam, CsProperty, CsQueryClause,
    CsSwitchSection, CsTypeDeclaration, CsTypeKind, ParamModifier, RefKind, TypeTestKind,
};
use std::fmt::Write as _;

/// Prints `CsNode` trees as target-dialect source text.
pub struct CsPrinter {
    output: String,
    indent_level: u32,
    indent_str: &'static str,
}

impl Default for CsPrinter {
    fn default() -> Self {
        Self::new()
    }
}

impl CsPrinter {
    pub const fn new() -> Self {
        Self {
            output: String::new(),
            indent_level: 0,
            indent_str: "    ",
        }
    }

    /// Print a single node (and its subtree) to a fresh string.
    pub fn emit_to_string(node: &CsNode) -> String {
        let mut printer = Self::new();
        printer.emit(node);
        printer.output
    }

    /// Print a list of statements, one per line.
    pub fn emit_statements_to_string(nodes: &[CsNode]) -> String {
        let mut printer = Self::new();
        printer.emit_statement_list(nodes);
        printer.output
    }

    pub fn emit(&mut self, node: &CsNode) {
        self.emit_node(node);
    }

    pub fn get_output(&self) -> &str {
        &self.output
    }

    pub fn finish(self) -> String {
        self.output
    }

    // =========================================================================
    // Writer primitives
    // =========================================================================

    fn write(&mut self, s: &str) {
        self.output.push_str(s);
    }

    fn write_line(&mut self) {
        self.output.push('\n');
    }

    fn write_indent(&mut self) {
        for _ in 0..self.indent_level {
            self.output.push_str(self.indent_str);
        }
    }

    const fn increase_indent(&mut self) {
        self.indent_level += 1;
    }

    const fn decrease_indent(&mut self) {
        if self.indent_level > 0 {
            self.indent_level -= 1;
        }
    }

    fn write_escaped(&mut self, s: &str, quote: char) {
        for c in s.chars() {
            match c {
                '\\' => self.output.push_str("\\\\"),
                '\n' => self.output.push_str("\\n"),
                '\r' => self.output.push_str("\\r"),
                '\t' => self.output.push_str("\\t"),
                '\0' => self.output.push_str("\\0"),
                c if c == quote => {
                    self.output.push('\\');
                    self.output.push(c);
                }
                c if (c as u32) < 0x20 || c == '\x7F' => {
                    let _ = write!(self.output, "\\u{:04X}", c as u32);
                }
                _ => self.output.push(c),
            }
        }
    }

    fn write_modifiers(&mut self, modifiers: &[&'static str]) {
        for modifier in modifiers {
            self.write(modifier);
            self.write(" ");
        }
    }

    // =========================================================================
    // Dispatch
    // =========================================================================

    fn emit_node(&mut self, node: &CsNode) {
        match node {
            CsNode::NumericLiteral(text) => self.write(text),
            CsNode::StringLiteral { value, verbatim } => {
                if *verbatim {
                    self.write("@\"");
                    let doubled = value.replace('"', "\"\"");
                    self.write(&doubled);
                    self.write("\"");
                } else {
                    self.write("\"");
                    self.write_escaped(value, '"');
                    self.write("\"");
                }
            }
            CsNode::CharLiteral(ch) => {
                self.write("'");
                self.write_escaped(&ch.to_string(), '\'');
                self.write("'");
            }
            CsNode::BooleanLiteral(value) => self.write(if *value { "true" } else { "false" }),
            CsNode::NullLiteral => self.write("null"),
            CsNode::DefaultLiteral(type_name) => match type_name {
                Some(type_name) => {
                    self.write("default(");
                    self.write(type_name);
                    self.write(")");
                }
                None => self.write("default"),
            },
            CsNode::Identifier(name) => self.write(name),
            CsNode::This => self.write("this"),
            CsNode::Base => self.write("base"),
            CsNode::Binary {
                left,
                operator,
                right,
            } => {
                self.emit_node(left);
                self.write(" ");
                self.write(operator);
                self.write(" ");
                self.emit_node(right);
            }
            CsNode::PrefixUnary { operator, operand } => {
                self.write(operator);
                self.emit_node(operand);
            }
            CsNode::PostfixUnary { operand, operator } => {
                self.emit_node(operand);
                self.write(operator);
            }
            CsNode::Assignment {
                target,
                operator,
                value,
            } => {
                self.emit_node(target);
                self.write(" ");
                self.write(operator);
                self.write(" ");
                self.emit_node(value);
            }
            CsNode::Call { callee, arguments } => {
                self.emit_node(callee);
                self.write("(");
                self.emit_arguments(arguments);
                self.write(")");
            }
            CsNode::MemberAccess {
                object,
                name,
                null_conditional,
            } => {
                self.emit_node(object);
                self.write(if *null_conditional { "?." } else { "." });
                self.write(name);
            }
            CsNode::ElementAccess { object, arguments } => {
                self.emit_node(object);
                self.write("[");
                self.emit_arguments(arguments);
                self.write("]");
            }
            CsNode::Conditional {
                condition,
                when_true,
                when_false,
            } => {
                self.emit_node(condition);
                self.write(" ? ");
                self.emit_node(when_true);
                self.write(" : ");
                self.emit_node(when_false);
            }
            CsNode::Parenthesized(inner) => {
                self.write("(");
                self.emit_node(inner);
                self.write(")");
            }
            CsNode::Cast {
                type_name,
                expression,
            } => {
                self.write("(");
                self.write(type_name);
                self.write(")");
                self.emit_node(expression);
            }
            CsNode::TypeTest {
                expression,
                type_name,
                kind,
            } => {
                self.emit_node(expression);
                self.write(match kind {
                    TypeTestKind::Is => " is ",
                    TypeTestKind::As => " as ",
                });
                self.write(type_name);
            }
            CsNode::ObjectCreation {
                type_name,
                arguments,
                initializer,
            } => self.emit_object_creation(type_name, arguments.as_deref(), initializer.as_deref()),
            CsNode::ArrayCreation {
                element_type,
                sizes,
                rank,
                initializer,
            } => self.emit_array_creation(element_type, sizes, *rank, initializer.as_deref()),
            CsNode::InitializerList(elements) => self.emit_initializer_list(elements),
            CsNode::Lambda {
                parameters,
                body,
                is_async,
            } => self.emit_lambda(parameters, body, *is_async),
            CsNode::TypeOf(type_name) => {
                self.write("typeof(");
                self.write(type_name);
                self.write(")");
            }
            CsNode::NameOf(expression) => {
                self.write("nameof(");
                self.emit_node(expression);
                self.write(")");
            }
            CsNode::Await(expression) => {
                self.write("await ");
                self.emit_node(expression);
            }
            CsNode::InterpolatedString(parts) => self.emit_interpolated_string(parts),
            CsNode::Query(clauses) => self.emit_query(clauses),

            // Statements
            CsNode::LocalDeclaration(decl) => {
                self.emit_local_declaration(decl);
                self.write(";");
            }
            CsNode::LocalFunction(method) => self.emit_method(method),
            CsNode::ExpressionStatement(expression) => {
                self.emit_node(expression);
                self.write(";");
            }
            CsNode::Return(expression) => {
                self.write("return");
                if let Some(expression) = expression {
                    self.write(" ");
                    self.emit_node(expression);
                }
                self.write(";");
            }
            CsNode::If {
                condition,
                then_branch,
                else_branch,
            } => self.emit_if(condition, then_branch, else_branch.as_deref()),
            CsNode::Block(statements) => self.emit_block(statements),
            CsNode::Switch {
                expression,
                sections,
            } => self.emit_switch(expression, sections),
            CsNode::For {
                declaration,
                initializers,
                condition,
                incrementors,
                body,
            } => {
                self.write("for (");
                if let Some(declaration) = declaration {
                    self.emit_local_declaration(declaration);
                } else {
                    self.emit_comma_separated(initializers);
                }
                self.write(";");
                if let Some(condition) = condition {
                    self.write(" ");
                    self.emit_node(condition);
                }
                self.write(";");
                if !incrementors.is_empty() {
                    self.write(" ");
                    self.emit_comma_separated(incrementors);
                }
                self.write(") ");
                self.emit_block(body);
            }
            CsNode::ForEach {
                type_name,
                variable,
                collection,
                body,
            } => {
                self.write("foreach (");
                self.write(type_name);
                self.write(" ");
                self.write(variable);
                self.write(" in ");
                self.emit_node(collection);
                self.write(") ");
                self.emit_block(body);
            }
            CsNode::While { condition, body } => {
                self.write("while (");
                self.emit_node(condition);
                self.write(") ");
                self.emit_block(body);
            }
            CsNode::DoWhile { body, condition } => {
                self.write("do ");
                self.emit_block(body);
                self.write(" while (");
                self.emit_node(condition);
                self.write(");");
            }
            CsNode::Break => self.write("break;"),
            CsNode::Continue => self.write("continue;"),
            CsNode::Goto(label) => {
                self.write("goto ");
                self.write(label);
                self.write(";");
            }
            CsNode::Labeled { label, statement } => {
                self.write(label);
                self.write(":");
                self.write_line();
                self.write_indent();
                self.emit_node(statement);
            }
            CsNode::Try {
                body,
                catches,
                finally,
            } => self.emit_try(body, catches, finally.as_deref()),
            CsNode::Throw(expression) => {
                self.write("throw");
                if let Some(expression) = expression {
                    self.write(" ");
                    self.emit_node(expression);
                }
                self.write(";");
            }
            CsNode::Using { resource, body } => {
                self.write("using (");
                match resource.as_ref() {
                    CsNode::LocalDeclaration(decl) => self.emit_local_declaration(decl),
                    other => self.emit_node(other),
                }
                self.write(") ");
                self.emit_block(body);
            }
            CsNode::Lock { expression, body } => {
                self.write("lock (");
                self.emit_node(expression);
                self.write(") ");
                self.emit_block(body);
            }
            CsNode::YieldReturn(expression) => {
                self.write("yield return ");
                self.emit_node(expression);
                self.write(";");
            }
            CsNode::Empty => self.write(";"),

            // Declarations
            CsNode::UsingDirective { alias, name } => {
                self.write("using ");
                if let Some(alias) = alias {
                    self.write(alias);
                    self.write(" = ");
                }
                self.write(name);
                self.write(";");
            }
            CsNode::CompilationUnit { usings, members } => {
                for using in usings {
                    self.emit_node(using);
                    self.write_line();
                }
                if !usings.is_empty() && !members.is_empty() {
                    self.write_line();
                }
                self.emit_statement_list(members);
            }
            CsNode::Namespace { name, members } => {
                self.write("namespace ");
                self.write(name);
                self.write(" ");
                self.emit_block(members);
            }
            CsNode::TypeDeclaration(decl) => self.emit_type_declaration(decl),
            CsNode::EnumDeclaration {
                modifiers,
                name,
                base,
                members,
            } => {
                self.write_modifiers(modifiers);
                self.write("enum ");
                self.write(name);
                if let Some(base) = base {
                    self.write(" : ");
                    self.write(base);
                }
                self.write(" {");
                self.write_line();
                self.increase_indent();
                for (i, (member, value)) in members.iter().enumerate() {
                    self.write_indent();
                    self.write(member);
                    if let Some(value) = value {
                        self.write(" = ");
                        self.emit_node(value);
                    }
                    if i + 1 < members.len() {
                        self.write(",");
                    }
                    self.write_line();
                }
                self.decrease_indent();
                self.write_indent();
                self.write("}");
            }
            CsNode::DelegateDeclaration {
                modifiers,
                return_type,
                name,
                parameters,
            } => {
                self.write_modifiers(modifiers);
                self.write("delegate ");
                self.write(return_type);
                self.write(" ");
                self.write(name);
                self.write("(");
                self.emit_parameters(parameters);
                self.write(");");
            }
            CsNode::Method(method) => self.emit_method(method),
            CsNode::Constructor {
                modifiers,
                name,
                parameters,
                initializer,
                body,
            } => {
                self.write_modifiers(modifiers);
                self.write(name);
                self.write("(");
                self.emit_parameters(parameters);
                self.write(")");
                if let Some(initializer) = initializer {
                    self.write(match initializer.kind {
                        ConstructorInitializerKind::Base => " : base(",
                        ConstructorInitializerKind::This => " : this(",
                    });
                    self.emit_arguments(&initializer.arguments);
                    self.write(")");
                }
                self.write(" ");
                self.emit_block(body);
            }
            CsNode::Field {
                modifiers,
                type_name,
                declarators,
            } => {
                self.write_modifiers(modifiers);
                self.write(type_name);
                self.write(" ");
                self.emit_declarators(declarators);
                self.write(";");
            }
            CsNode::Property(property) => self.emit_property(property),
            CsNode::Event {
                modifiers,
                type_name,
                name,
            } => {
                self.write_modifiers(modifiers);
                self.write("event ");
                self.write(type_name);
                self.write(" ");
                self.write(name);
                self.write(";");
            }

            // Special
            CsNode::Comment { text, is_block } => {
                if *is_block {
                    self.write("/* ");
                    self.write(text);
                    self.write(" */");
                } else {
                    self.write("// ");
                    self.write(text);
                }
            }
            CsNode::WithTrailingComment { node, comment } => {
                self.emit_node(node);
                self.write(" /* ");
                self.write(comment);
                self.write(" */");
            }
            CsNode::ErrorPlaceholder {
                kind,
                message,
                original_text,
            } => {
                self.write("/* CONVERSION ERROR: ");
                self.write(kind);
                self.write(": ");
                self.write(message);
                if !original_text.is_empty() {
                    // The original text must not terminate the comment early.
                    let safe = original_text.replace("*/", "* /");
                    self.write_line();
                    self.write(&safe);
                }
                self.write_line();
                self.write_indent();
                self.write("*/");
            }
            CsNode::Raw(text) => self.write(text),
            CsNode::Sequence(nodes) => {
                for (i, node) in nodes.iter().enumerate() {
                    if i > 0 {
                        self.write_line();
                        self.write_indent();
                    }
                    self.emit_node(node);
                }
            }
        }
    }

    // =========================================================================
    // Expressions
    // =========================================================================

    fn emit_comma_separated(&mut self, nodes: &[CsNode]) {
        for (i, node) in nodes.iter().enumerate() {
            if i > 0 {
                self.write(", ");
            }
            self.emit_node(node);
        }
    }

    fn emit_arguments(&mut self, arguments: &[CsArgument]) {
        for (i, argument) in arguments.iter().enumerate() {
            if i > 0 {
                self.write(", ");
            }
            if let Some(name) = &argument.name {
                self.write(name);
                self.write(": ");
            }
            match argument.ref_kind {
                RefKind::None => {}
                RefKind::Ref => self.write("ref "),
                RefKind::Out => self.write("out "),
            }
            self.emit_node(&argument.expression);
        }
    }

    fn emit_object_creation(
        &mut self,
        type_name: &str,
        arguments: Option<&[CsArgument]>,
        initializer: Option<&[CsNode]>,
    ) {
        self.write("new");
        if !type_name.is_empty() {
            self.write(" ");
            self.write(type_name);
            // `new T { ... }` is fine without an argument list.
            if let Some(arguments) = arguments {
                self.write("(");
                self.emit_arguments(arguments);
                self.write(")");
            } else if initializer.is_none() {
                self.write("()");
            }
        }
        if let Some(initializer) = initializer {
            self.write(" ");
            self.emit_initializer_list(initializer);
        }
    }

    fn emit_array_creation(
        &mut self,
        element_type: &str,
        sizes: &[CsNode],
        rank: u32,
        initializer: Option<&[CsNode]>,
    ) {
        self.write("new");
        if !element_type.is_empty() {
            self.write(" ");
            // Jagged suffixes stay on the element type: `new int[5][]`.
            let (base, jagged) = match element_type.find('[') {
                Some(pos) => element_type.split_at(pos),
                None => (element_type, ""),
            };
            self.write(base);
            self.write("[");
            if sizes.is_empty() {
                for _ in 1..rank.max(1) {
                    self.write(",");
                }
            } else {
                self.emit_comma_separated(sizes);
            }
            self.write("]");
            self.write(jagged);
        } else {
            self.write("[]");
        }
        if let Some(initializer) = initializer {
            self.write(" ");
            self.emit_initializer_list(initializer);
        }
    }

    fn emit_initializer_list(&mut self, elements: &[CsNode]) {
        if elements.is_empty() {
            self.write("{ }");
            return;
        }
        self.write("{ ");
        self.emit_comma_separated(elements);
        self.write(" }");
    }

    fn emit_lambda(&mut self, parameters: &[CsParam], body: &CsBody, is_async: bool) {
        if is_async {
            self.write("async ");
        }
        match parameters {
            [single] if single.type_name.is_none() && single.modifier == ParamModifier::None => {
                self.write(&single.name);
            }
            _ => {
                self.write("(");
                self.emit_parameters(parameters);
                self.write(")");
            }
        }
        self.write(" => ");
        match body {
            CsBody::Expression(expression) => self.emit_node(expression),
            CsBody::Block(statements) => self.emit_block(statements),
            CsBody::None => self.write("{ }"),
        }
    }

    fn emit_interpolated_string(&mut self, parts: &[CsInterpolation]) {
        self.write("$\"");
        for part in parts {
            match part {
                CsInterpolation::Text(text) => {
                    let braces = text.replace('{', "{{").replace('}', "}}");
                    self.write_escaped(&braces, '"');
                }
                CsInterpolation::Expression {
                    expression,
                    alignment,
                    format,
                } => {
                    self.write("{");
                    // A conditional would be read as the format separator.
                    if matches!(expression, CsNode::Conditional { .. }) {
                        self.write("(");
                        self.emit_node(expression);
                        self.write(")");
                    } else {
                        self.emit_node(expression);
                    }
                    if let Some(alignment) = alignment {
                        self.write(",");
                        self.emit_node(alignment);
                    }
                    if let Some(format) = format {
                        self.write(":");
                        self.write(format);
                    }
                    self.write("}");
                }
            }
        }
        self.write("\"");
    }

    fn emit_query(&mut self, clauses: &[CsQueryClause]) {
        for (i, clause) in clauses.iter().enumerate() {
            if i > 0 {
                self.write(" ");
            }
            match clause {
                CsQueryClause::From {
                    type_name,
                    variable,
                    collection,
                } => {
                    self.write("from ");
                    if let Some(type_name) = type_name {
                        self.write(type_name);
                        self.write(" ");
                    }
                    self.write(variable);
                    self.write(" in ");
                    self.emit_node(collection);
                }
                CsQueryClause::Where(condition) => {
                    self.write("where ");
                    self.emit_node(condition);
                }
                CsQueryClause::Let { name, value } => {
                    self.write("let ");
                    self.write(name);
                    self.write(" = ");
                    self.emit_node(value);
                }
                CsQueryClause::OrderBy(orderings) => {
                    self.write("orderby ");
                    for (j, (expression, descending)) in orderings.iter().enumerate() {
                        if j > 0 {
                            self.write(", ");
                        }
                        self.emit_node(expression);
                        if *descending {
                            self.write(" descending");
                        }
                    }
                }
                CsQueryClause::Select(expression) => {
                    self.write("select ");
                    self.emit_node(expression);
                }
            }
        }
    }

    // =========================================================================
    // Statements
    // =========================================================================

    fn emit_statement_list(&mut self, statements: &[CsNode]) {
        let mut first = true;
        for statement in statements {
            if let CsNode::Sequence(inner) = statement {
                for node in inner {
                    if !first {
                        self.write_line();
                    }
                    first = false;
                    self.write_indent();
                    self.emit_node(node);
                }
                continue;
            }
            if !first {
                self.write_line();
            }
            first = false;
            self.write_indent();
            self.emit_node(statement);
        }
    }

    fn emit_block(&mut self, statements: &[CsNode]) {
        if statements.is_empty() {
            self.write("{ }");
            return;
        }
        self.write("{");
        self.write_line();
        self.increase_indent();
        self.emit_statement_list(statements);
        self.write_line();
        self.decrease_indent();
        self.write_indent();
        self.write("}");
    }

    fn emit_local_declaration(&mut self, decl: &CsLocalDeclaration) {
        if decl.is_const {
            self.write("const ");
        }
        if decl.is_ref {
            self.write("ref ");
        }
        self.write(&decl.type_name);
        self.write(" ");
        self.emit_declarators(&decl.declarators);
    }

    fn emit_declarators(&mut self, declarators: &[CsDeclarator]) {
        for (i, declarator) in declarators.iter().enumerate() {
            if i > 0 {
                self.write(", ");
            }
            self.write(&declarator.name);
            if let Some(initializer) = &declarator.initializer {
                self.write(" = ");
                self.emit_node(initializer);
            }
        }
    }

    fn emit_if(&mut self, condition: &CsNode, then_branch: &[CsNode], else_branch: Option<&[CsNode]>) {
        self.write("if (");
        self.emit_node(condition);
        self.write(") ");
        self.emit_block(then_branch);
        if let Some(else_branch) = else_branch {
            self.write(" else ");
            match else_branch {
                [nested @ CsNode::If { .. }] => self.emit_node(nested),
                _ => self.emit_block(else_branch),
            }
        }
    }

    fn emit_switch(&mut self, expression: &CsNode, sections: &[CsSwitchSection]) {
        self.write("switch (");
        self.emit_node(expression);
        self.write(") {");
        self.write_line();
        self.increase_indent();
        for section in sections {
            for label in &section.labels {
                self.write_indent();
                match label {
                    Some(value) => {
                        self.write("case ");
                        self.emit_node(value);
                        self.write(":");
                    }
                    None => self.write("default:"),
                }
                self.write_line();
            }
            self.increase_indent();
            if !section.statements.is_empty() {
                self.emit_statement_list(&section.statements);
                self.write_line();
            }
            self.decrease_indent();
        }
        self.decrease_indent();
        self.write_indent();
        self.write("}");
    }

    fn emit_try(&mut self, body: &[CsNode], catches: &[CsCatch], finally: Option<&[CsNode]>) {
        self.write("try ");
        self.emit_block(body);
        for catch in catches {
            self.write(" catch");
            if let Some(type_name) = &catch.type_name {
                self.write(" (");
                self.write(type_name);
                if let Some(name) = &catch.name {
                    self.write(" ");
                    self.write(name);
                }
                self.write(")");
            }
            if let Some(filter) = &catch.filter {
                self.write(" when (");
                self.emit_node(filter);
                self.write(")");
            }
            self.write(" ");
            self.emit_block(&catch.body);
        }
        if let Some(finally) = finally {
            self.write(" finally ");
            self.emit_block(finally);
        }
    }

    // =========================================================================
    // Declarations
    // =========================================================================

    fn emit_parameters(&mut self, parameters: &[CsParam]) {
        for (i, param) in parameters.iter().enumerate() {
            if i > 0 {
                self.write(", ");
            }
            match param.modifier {
                ParamModifier::None => {}
                ParamModifier::Ref => self.write("ref "),
                ParamModifier::Out => self.write("out "),
                ParamModifier::Params => self.write("params "),
            }
            if let Some(type_name) = &param.type_name {
                self.write(type_name);
                self.write(" ");
            }
            self.write(&param.name);
            if let Some(default) = &param.default_value {
                self.write(" = ");
                self.emit_node(default);
            }
        }
    }

    fn emit_type_parameters(&mut self, type_params: &[String]) {
        if type_params.is_empty() {
            return;
        }
        self.write("<");
        self.write(&type_params.join(", "));
        self.write(">");
    }

    fn emit_type_declaration(&mut self, decl: &CsTypeDeclaration) {
        self.write_modifiers(&decl.modifiers);
        self.write(match decl.kind {
            CsTypeKind::Class => "class ",
            CsTypeKind::Struct => "struct ",
            CsTypeKind::Interface => "interface ",
        });
        self.write(&decl.name);
        self.emit_type_parameters(&decl.type_params);
        if !decl.bases.is_empty() {
            self.write(" : ");
            self.write(&decl.bases.join(", "));
        }
        self.write(" ");
        self.emit_block(&decl.members);
    }

    fn emit_method(&mut self, method: &CsMethod) {
        self.write_modifiers(&method.modifiers);
        self.write(&method.return_type);
        self.write(" ");
        self.write(&method.name);
        self.emit_type_parameters(&method.type_params);
        self.write("(");
        self.emit_parameters(&method.parameters);
        self.write(")");
        match &method.body {
            CsBody::Block(statements) => {
                self.write(" ");
                self.emit_block(statements);
            }
            CsBody::Expression(expression) => {
                self.write(" => ");
                self.emit_node(expression);
                self.write(";");
            }
            CsBody::None => self.write(";"),
        }
    }

    fn emit_accessor(&mut self, keyword: &str, accessor: &CsAccessor) {
        self.write_modifiers(&accessor.modifiers);
        self.write(keyword);
        match &accessor.body {
            Some(body) => {
                self.write(" ");
                self.emit_block(body);
            }
            None => self.write(";"),
        }
    }

    fn emit_property(&mut self, property: &CsProperty) {
        self.write_modifiers(&property.modifiers);
        self.write(&property.type_name);
        self.write(" ");
        if property.parameters.is_empty() {
            self.write(&property.name);
        } else {
            self.write("this[");
            self.emit_parameters(&property.parameters);
            self.write("]");
        }
        let is_auto = property.getter.as_ref().is_none_or(|a| a.body.is_none())
            && property.setter.as_ref().is_none_or(|a| a.body.is_none());
        if is_auto {
            self.write(" {");
            if let Some(getter) = &property.getter {
                self.write(" ");
                self.emit_accessor("get", getter);
            }
            if let Some(setter) = &property.setter {
                self.write(" ");
                self.emit_accessor("set", setter);
            }
            self.write(" }");
            if let Some(initializer) = &property.initializer {
                self.write(" = ");
                self.emit_node(initializer);
                self.write(";");
            }
            return;
        }
        self.write(" {");
        self.write_line();
        self.increase_indent();
        if let Some(getter) = &property.getter {
            self.write_indent();
            self.emit_accessor("get", getter);
            self.write_line();
        }
        if let Some(setter) = &property.setter {
            self.write_indent();
            self.emit_accessor("set", setter);
            self.write_line();
        }
        self.decrease_indent();
        self.write_indent();
        self.write("}");
    }
}

#[cfg(test)]
#[path = "../tests/printer.rs"]
mod tests;
