//! Query expressions.
//!
//! `From`/`Where`/`Let`/`Order By`/`Select` map onto target query syntax.
//! The target has no query keywords for `Distinct`, `Take` and `Skip`; they
//! become method calls on the parenthesized query and may only trail it.

use super::Converter;
use crate::error::{ConversionError, ConvertResult};
use vbcs_syntax::source::{QueryClause, SelectItem};
use vbcs_syntax::target::{CsNode, CsQueryClause};

const LINQ_NAMESPACE: &str = "System.Linq";

impl<'a> Converter<'a> {
    pub(crate) fn convert_query(&mut self, clauses: &'a [QueryClause]) -> ConvertResult<CsNode> {
        let split = clauses
            .iter()
            .position(|c| matches!(c, QueryClause::Distinct | QueryClause::Take(_) | QueryClause::Skip(_)))
            .unwrap_or(clauses.len());
        let (body, tail) = clauses.split_at(split);

        let mut converted = Vec::with_capacity(body.len() + 1);
        let mut range_variable: Option<&str> = None;
        let mut selected = false;
        for clause in body {
            if selected {
                return Err(ConversionError::unsupported(
                    "QueryExpression",
                    "clauses after Select need a continuation",
                ));
            }
            let clause = match clause {
                QueryClause::From {
                    variable,
                    type_ref,
                    collection,
                } => {
                    range_variable = Some(variable);
                    CsQueryClause::From {
                        type_name: type_ref.as_ref().map(|t| self.type_ref_name(t)),
                        variable: variable.clone(),
                        collection: self.convert_value(*collection)?,
                    }
                }
                QueryClause::Where(condition) => CsQueryClause::Where(self.convert_value(*condition)?),
                QueryClause::Let { name, value } => {
                    range_variable = Some(name);
                    CsQueryClause::Let {
                        name: name.clone(),
                        value: self.convert_value(*value)?,
                    }
                }
                QueryClause::OrderBy(items) => {
                    let mut orderings = Vec::with_capacity(items.len());
                    for item in items {
                        orderings.push((self.convert_value(item.expression)?, item.descending));
                    }
                    CsQueryClause::OrderBy(orderings)
                }
                QueryClause::Select(items) => {
                    selected = true;
                    CsQueryClause::Select(self.convert_selection(items)?)
                }
                QueryClause::Distinct | QueryClause::Take(_) | QueryClause::Skip(_) => continue,
            };
            converted.push(clause);
        }
        if !selected {
            let Some(variable) = range_variable else {
                return Err(ConversionError::unsupported("QueryExpression", "query has no range variable"));
            };
            converted.push(CsQueryClause::Select(CsNode::id(variable)));
        }

        self.require_import(LINQ_NAMESPACE);
        let mut query = CsNode::Query(converted);
        for clause in tail {
            query = match clause {
                QueryClause::Distinct => CsNode::call(CsNode::member(query.paren(), "Distinct"), Vec::new()),
                QueryClause::Take(count) => {
                    let count = self.convert_value(*count)?;
                    CsNode::call(CsNode::member(query.paren(), "Take"), vec![count])
                }
                QueryClause::Skip(count) => {
                    let count = self.convert_value(*count)?;
                    CsNode::call(CsNode::member(query.paren(), "Skip"), vec![count])
                }
                _ => {
                    return Err(ConversionError::unsupported(
                        "QueryExpression",
                        "query clauses after Distinct, Take or Skip",
                    ));
                }
            };
        }
        Ok(query)
    }

    /// A single unnamed item selects its value; anything else projects an
    /// anonymous object.
    fn convert_selection(&mut self, items: &'a [SelectItem]) -> ConvertResult<CsNode> {
        if let [SelectItem { name: None, expression }] = items {
            return self.convert_value(*expression);
        }
        let mut members = Vec::with_capacity(items.len());
        for item in items {
            let value = self.convert_value(item.expression)?;
            members.push(match &item.name {
                Some(name) => CsNode::assign(CsNode::id(name.clone()), value),
                None => value,
            });
        }
        Ok(CsNode::ObjectCreation {
            type_name: String::new(),
            arguments: None,
            initializer: Some(members),
        })
    }
}
