//! `ReDim [Preserve]`.
//!
//! ```text
//! ReDim Preserve arr(7)        var arrOld = arr;
//!                         =>   arr = new int[8];
//!                              if (arrOld != null)
//!                                  Array.Copy(arrOld, arr, Math.Min(8, arrOld.Length));
//! ```
//!
//! Multi-rank arrays are copied one row of the last dimension at a time,
//! since only the last bound may change under `Preserve`.

use super::Converter;
use crate::error::{ConversionError, ConvertResult};
use crate::literals::SYSTEM_NAMESPACE;
use tracing::trace;
use vbcs_syntax::source::{NodeIndex, ReDimClause};
use vbcs_syntax::target::{CsDeclarator, CsLocalDeclaration, CsNode};

impl<'a> Converter<'a> {
    pub(crate) fn convert_redim(&mut self, preserve: bool, clauses: &'a [ReDimClause]) -> ConvertResult<Vec<CsNode>> {
        let mut out = Vec::new();
        for clause in clauses {
            out.extend(self.convert_redim_clause(preserve, clause)?);
        }
        Ok(out)
    }

    fn convert_redim_clause(&mut self, preserve: bool, clause: &'a ReDimClause) -> ConvertResult<Vec<CsNode>> {
        let Some(array_type) = self.model.static_type(clause.target) else {
            return Err(ConversionError::MissingSymbol(format!(
                "type of ReDim target {}",
                self.arena.text(clause.target)
            )));
        };
        let element_type = self.array_element_name(array_type);
        let target = self.convert_expression(clause.target)?;
        let mut sizes = Vec::with_capacity(clause.bounds.len());
        for bound in &clause.bounds {
            sizes.push(self.array_length(*bound)?);
        }
        let rank = sizes.len();
        let allocation = CsNode::expr_stmt(CsNode::assign(
            target.clone(),
            CsNode::ArrayCreation {
                element_type,
                sizes: sizes.clone(),
                rank: rank as u32,
                initializer: None,
            },
        ));
        if !preserve {
            return Ok(vec![allocation]);
        }

        self.require_import(SYSTEM_NAMESPACE);
        let base = match &target {
            CsNode::Identifier(name) => format!("{name}Old"),
            CsNode::MemberAccess { name, .. } => format!("{name}Old"),
            _ => "arrOld".to_string(),
        };
        let old_name = self.unique_name(&base, clause.target);
        trace!(old = %old_name, rank, "redim preserve");
        let old = CsNode::id(old_name.clone());
        let snapshot = CsNode::LocalDeclaration(CsLocalDeclaration {
            type_name: "var".to_string(),
            declarators: vec![CsDeclarator::new(old_name, Some(target.clone()))],
            is_const: false,
            is_ref: false,
        });

        let copy = if rank <= 1 {
            let new_length = match sizes.into_iter().next() {
                Some(size) if size.is_literal() || matches!(size, CsNode::Identifier(_)) => size,
                _ => CsNode::member(target.clone(), "Length"),
            };
            let count = CsNode::static_call("Math", "Min", vec![new_length, CsNode::member(old.clone(), "Length")]);
            CsNode::expr_stmt(CsNode::static_call("Array", "Copy", vec![old.clone(), target, count]))
        } else {
            self.row_copy(&old, target, rank, clause.target)
        };
        let guarded = CsNode::if_stmt(
            CsNode::binary(old, "!=", CsNode::NullLiteral),
            vec![copy],
            None,
        );
        Ok(vec![snapshot, allocation, guarded])
    }

    /// ```text
    /// for (var i = 0; i <= arrOld.Length / arrOld.GetLength(last) - 1; ++i)
    ///     Array.Copy(arrOld, i * arrOld.GetLength(last), arr, i * arr.GetLength(last),
    ///                Math.Min(arrOld.GetLength(last), arr.GetLength(last)));
    /// ```
    fn row_copy(&mut self, old: &CsNode, target: CsNode, rank: usize, at: NodeIndex) -> CsNode {
        let last = CsNode::number((rank - 1).to_string());
        let get_length = |array: &CsNode| CsNode::call(CsNode::member(array.clone(), "GetLength"), vec![last.clone()]);
        let index_name = self.unique_name("i", at);
        let index = CsNode::id(index_name.clone());

        let rows = CsNode::binary(
            CsNode::binary(CsNode::member(old.clone(), "Length"), "/", get_length(old)),
            "-",
            CsNode::number("1"),
        );
        let count = CsNode::static_call("Math", "Min", vec![get_length(old), get_length(&target)]);
        let copy = CsNode::static_call(
            "Array",
            "Copy",
            vec![
                old.clone(),
                CsNode::binary(index.clone(), "*", get_length(old)),
                target.clone(),
                CsNode::binary(index.clone(), "*", get_length(&target)),
                count,
            ],
        );
        CsNode::For {
            declaration: Some(CsLocalDeclaration {
                type_name: "var".to_string(),
                declarators: vec![CsDeclarator::new(index_name, Some(CsNode::number("0")))],
                is_const: false,
                is_ref: false,
            }),
            initializers: Vec::new(),
            condition: Some(Box::new(CsNode::binary(index.clone(), "<=", rows))),
            incrementors: vec![CsNode::prefix("++", index)],
            body: vec![CsNode::expr_stmt(copy)],
        }
    }
}
