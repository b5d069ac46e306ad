//! Target spellings of types.
//!
//! Types reach the converter either as written (`TypeRef` from an `As`
//! clause) or as resolved ids from the semantic model. Both map primitive
//! names to target keywords; resolved ids are additionally qualified with
//! their namespace when it is not in scope.

use indexmap::IndexSet;
use vbcs_semantic::{SemanticModel, SpecialType, TypeId, TypeKind};
use vbcs_syntax::source::TypeRef;

use crate::literals::SYSTEM_NAMESPACE;

/// `[]`, `[,]`, ... for an array of `rank` dimensions.
pub fn rank_suffix(rank: u32) -> String {
    format!("[{}]", ",".repeat(rank.saturating_sub(1) as usize))
}

fn record_special(special: SpecialType, imports: &mut IndexSet<String>) -> &'static str {
    if special == SpecialType::DateTime {
        imports.insert(SYSTEM_NAMESPACE.to_string());
    }
    special.cs_keyword()
}

/// Target name of a type as written in source.
pub fn type_ref_name(type_ref: &TypeRef, imports: &mut IndexSet<String>) -> String {
    let mut name = match SpecialType::from_vb_name(&type_ref.name) {
        Some(special) if type_ref.type_args.is_empty() => record_special(special, imports).to_string(),
        _ => type_ref.name.clone(),
    };
    if !type_ref.type_args.is_empty() {
        let args: Vec<String> = type_ref
            .type_args
            .iter()
            .map(|arg| type_ref_name(arg, imports))
            .collect();
        name = format!("{name}<{}>", args.join(", "));
    }
    if type_ref.nullable {
        name.push('?');
    }
    for rank in &type_ref.array_ranks {
        name.push_str(&rank_suffix(*rank));
    }
    name
}

/// Target name of a resolved type. `in_scope` lists namespaces that need no
/// qualification (imports and enclosing namespaces).
pub fn type_id_name(
    model: &dyn SemanticModel,
    id: TypeId,
    in_scope: &[String],
    imports: &mut IndexSet<String>,
) -> String {
    let Some(info) = model.type_info(id) else {
        return "object".to_string();
    };
    match &info.kind {
        TypeKind::Special(special) => record_special(*special, imports).to_string(),
        TypeKind::Array { element, rank } => {
            // Jagged arrays keep the outermost rank first: `int[,][]`.
            let mut suffixes = rank_suffix(*rank);
            let mut element = *element;
            while let Some(TypeKind::Array { element: inner, rank }) =
                model.type_info(element).map(|info| &info.kind)
            {
                suffixes.push_str(&rank_suffix(*rank));
                element = *inner;
            }
            format!("{}{suffixes}", type_id_name(model, element, in_scope, imports))
        }
        TypeKind::Nullable { underlying } => {
            format!("{}?", type_id_name(model, *underlying, in_scope, imports))
        }
        TypeKind::TypeParameter | TypeKind::Error => info.name.clone(),
        _ => match info.namespace.as_deref() {
            Some(namespace) if !namespace.is_empty() && !namespace_in_scope(namespace, in_scope) => {
                info.qualified_name()
            }
            _ => info.name.clone(),
        },
    }
}

/// Whether `namespace` is imported or encloses the current declaration.
pub fn namespace_in_scope(namespace: &str, in_scope: &[String]) -> bool {
    in_scope
        .iter()
        .any(|candidate| candidate.eq_ignore_ascii_case(namespace))
}

#[cfg(test)]
#[path = "../tests/type_names.rs"]
mod tests;
