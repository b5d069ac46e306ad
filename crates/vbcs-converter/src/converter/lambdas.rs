//! Lambdas and lambda-to-local-function promotion.

use super::{Converter, flush_locals};
use crate::context::{MethodFrame, MethodKind};
use crate::error::ConvertResult;
use tracing::trace;
use vbcs_syntax::source::{LambdaBody, NodeIndex, SourceKind};
use vbcs_syntax::target::{CsBody, CsMethod, CsNode, CsParam};

impl<'a> Converter<'a> {
    pub(crate) fn convert_lambda(
        &mut self,
        is_function: bool,
        is_async: bool,
        params: &'a [NodeIndex],
        body: &'a LambdaBody,
    ) -> ConvertResult<CsNode> {
        let mut parameters = self.convert_parameters(params, None)?;
        // The target infers either all parameter types or none.
        if parameters.iter().any(|p| p.type_name.is_none()) {
            for parameter in &mut parameters {
                parameter.type_name = None;
            }
        }
        let kind = if is_function {
            MethodKind::Function
        } else {
            MethodKind::Sub
        };
        let frame = MethodFrame::new("lambda", MethodKind::Lambda, "");
        let body = self.with_method(frame, |c| c.convert_lambda_body(kind, body))?;
        Ok(CsNode::Lambda {
            parameters,
            body: Box::new(body),
            is_async,
        })
    }

    /// `Function(x) x + 1`, and statement bodies made of a single `Return`
    /// (functions) or a single call (subs), become expression bodies.
    fn convert_lambda_body(&mut self, kind: MethodKind, body: &'a LambdaBody) -> ConvertResult<CsBody> {
        match body {
            LambdaBody::Expression(expression) => self.expression_body(kind, *expression),
            LambdaBody::Statements(statements) => match self.single_expression(kind, statements) {
                Some(expression) => self.expression_body(kind, expression),
                None => Ok(CsBody::Block(self.convert_block(statements)?)),
            },
        }
    }

    fn single_expression(&self, kind: MethodKind, statements: &[NodeIndex]) -> Option<NodeIndex> {
        let [statement] = statements else {
            return None;
        };
        match (kind, self.arena.kind(*statement)?) {
            (
                MethodKind::Function,
                SourceKind::Return {
                    expression: Some(expression),
                },
            ) => Some(*expression),
            (MethodKind::Sub, SourceKind::ExpressionStatement { expression }) => Some(*expression),
            _ => None,
        }
    }

    /// An expression body. By-reference temporaries need statements, so a
    /// body that hoists anything becomes a block.
    fn expression_body(&mut self, kind: MethodKind, expression: NodeIndex) -> ConvertResult<CsBody> {
        let returns_value = kind == MethodKind::Function;
        let (value, locals) = self.collect_hoisted(|c| {
            if returns_value {
                c.convert_value(expression)
            } else {
                c.convert_expression(expression)
            }
        })?;
        if locals.is_empty() {
            return Ok(CsBody::Expression(value));
        }
        trace!(hoisted = locals.len(), "lambda body expanded to a block");
        let statement = if returns_value {
            CsNode::ret(Some(value))
        } else {
            CsNode::expr_stmt(value)
        };
        Ok(CsBody::Block(flush_locals(vec![statement], locals, !returns_value)))
    }

    /// The local function a lambda-initialized local can become: every
    /// parameter typed and the return type known.
    pub(crate) fn try_local_function(&mut self, name: &str, lambda: NodeIndex) -> ConvertResult<Option<CsMethod>> {
        let SourceKind::Lambda {
            is_function,
            is_async,
            params,
            body,
        } = self.kind_of(lambda)?
        else {
            return Ok(None);
        };
        let Some(return_type) = self.lambda_return_type(*is_function, body) else {
            return Ok(None);
        };
        let parameters = self.convert_parameters(params, None)?;
        if parameters.iter().any(|p: &CsParam| p.type_name.is_none()) {
            return Ok(None);
        }
        let kind = if *is_function {
            MethodKind::Function
        } else {
            MethodKind::Sub
        };
        let frame = MethodFrame::new(name, kind, return_type.clone());
        let body = self.with_method(frame, |c| c.convert_lambda_body(kind, body))?;
        let mut modifiers = Vec::new();
        if *is_async {
            modifiers.push("async");
        }
        Ok(Some(CsMethod {
            modifiers,
            return_type,
            name: name.to_string(),
            type_params: Vec::new(),
            parameters,
            body,
        }))
    }

    /// `void` for subs; for functions the type of the single expression or
    /// of the first top-level `Return` value.
    fn lambda_return_type(&mut self, is_function: bool, body: &'a LambdaBody) -> Option<String> {
        if !is_function {
            return Some("void".to_string());
        }
        let returned = match body {
            LambdaBody::Expression(expression) => Some(*expression),
            LambdaBody::Statements(statements) => statements.iter().find_map(|s| match self.arena.kind(*s) {
                Some(SourceKind::Return { expression }) => *expression,
                _ => None,
            }),
        }?;
        let type_id = self.value_type(returned)?;
        Some(self.type_name(type_id))
    }
}
