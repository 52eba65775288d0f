//! Classification of source type expressions into semantic shapes
//!
//! Classification is total: every expression yields either a resolved
//! primitive/component type with its list depth, or an ambiguity with the
//! reason it could not be pinned down. General numeric spellings all
//! normalize to `Float`; only the branded integer marker yields `Int`.

use serde::{Deserialize, Serialize};

use crate::diagnostics::AmbiguityReason;
use crate::provider::ComponentScope;
use crate::types::{
    uniform_literal_kind, DynamicOrigin, LiteralKind, LiteralValue, PrimitiveKeyword,
    PrimitiveType, SourceTypeExpression,
};

/// Innermost type of a successfully classified expression
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClassifiedType {
    Primitive(PrimitiveType),
    Component(String),
}

/// Outcome of classifying one type expression
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Classification {
    Resolved { ty: ClassifiedType, depth: usize },
    Ambiguous(AmbiguityReason),
}

impl Classification {
    fn primitive(primitive: PrimitiveType) -> Self {
        Classification::Resolved {
            ty: ClassifiedType::Primitive(primitive),
            depth: 0,
        }
    }

    pub fn is_ambiguous(&self) -> bool {
        matches!(self, Classification::Ambiguous(_))
    }
}

/// Classify `expr`, resolving component references against `scope`
pub fn classify<S>(expr: &SourceTypeExpression, scope: &S) -> Classification
where
    S: ComponentScope + ?Sized,
{
    match expr {
        SourceTypeExpression::BrandedIntegerMarker => Classification::primitive(PrimitiveType::Int),
        SourceTypeExpression::PrimitiveKeyword(keyword) => {
            Classification::primitive(match keyword {
                PrimitiveKeyword::Number => PrimitiveType::Float,
                PrimitiveKeyword::String => PrimitiveType::String,
                PrimitiveKeyword::Boolean => PrimitiveType::Boolean,
            })
        }
        SourceTypeExpression::LiteralUnion(members) => classify_literals(members),
        SourceTypeExpression::ComponentReference(name) => {
            if scope.is_component(name) {
                Classification::Resolved {
                    ty: ClassifiedType::Component(name.clone()),
                    depth: 0,
                }
            } else {
                Classification::Ambiguous(AmbiguityReason::Unknown)
            }
        }
        SourceTypeExpression::ArrayOf(inner) => classify_list(inner, scope),
        SourceTypeExpression::GeneralUnion(members) => classify_union(members, scope),
        SourceTypeExpression::AnyOrUnknown(DynamicOrigin::Explicit) => {
            Classification::Ambiguous(AmbiguityReason::Any)
        }
        SourceTypeExpression::AnyOrUnknown(DynamicOrigin::Unresolved) => {
            Classification::Ambiguous(AmbiguityReason::Unknown)
        }
    }
}

/// Homogeneous literal unions are enums over a single primitive
fn classify_literals<'a>(members: impl IntoIterator<Item = &'a LiteralValue>) -> Classification {
    match uniform_literal_kind(members) {
        Some(LiteralKind::String) => Classification::primitive(PrimitiveType::String),
        Some(LiteralKind::Number) => Classification::primitive(PrimitiveType::Float),
        Some(LiteralKind::Boolean) => Classification::primitive(PrimitiveType::Boolean),
        None => Classification::Ambiguous(AmbiguityReason::InvalidEnum),
    }
}

fn classify_list<S>(inner: &SourceTypeExpression, scope: &S) -> Classification
where
    S: ComponentScope + ?Sized,
{
    let element = match inner {
        SourceTypeExpression::GeneralUnion(branches) => classify_branches(branches, scope),
        other => match classify(other, scope) {
            Classification::Ambiguous(_) => {
                Classification::Ambiguous(AmbiguityReason::InvalidListUniformType)
            }
            resolved => resolved,
        },
    };

    match element {
        Classification::Resolved { ty, depth } => Classification::Resolved {
            ty,
            depth: depth + 1,
        },
        ambiguous => ambiguous,
    }
}

fn classify_union<S>(members: &[SourceTypeExpression], scope: &S) -> Classification
where
    S: ComponentScope + ?Sized,
{
    let Some((first, rest)) = members.split_first() else {
        return Classification::Ambiguous(AmbiguityReason::Union);
    };

    if rest.iter().all(|member| member == first) {
        return classify(first, scope);
    }

    let literal_groups: Option<Vec<&Vec<LiteralValue>>> = members
        .iter()
        .map(|member| match member {
            SourceTypeExpression::LiteralUnion(values) => Some(values),
            _ => None,
        })
        .collect();
    if let Some(groups) = literal_groups {
        let values = groups.into_iter().flatten();
        return match uniform_literal_kind(values.clone()) {
            Some(_) => classify_literals(values),
            None => Classification::Ambiguous(AmbiguityReason::Union),
        };
    }

    // `A[] | B[]` is a list of `A | B`
    let elements: Option<Vec<SourceTypeExpression>> = members
        .iter()
        .map(|member| match member {
            SourceTypeExpression::ArrayOf(inner) => Some(inner.as_ref().clone()),
            _ => None,
        })
        .collect();
    if let Some(elements) = elements {
        return classify_list(&SourceTypeExpression::GeneralUnion(elements), scope);
    }

    Classification::Ambiguous(AmbiguityReason::Union)
}

/// Element union of a list: branches must agree on depth, then the union
/// itself must classify the same way it would outside a list
fn classify_branches<S>(branches: &[SourceTypeExpression], scope: &S) -> Classification
where
    S: ComponentScope + ?Sized,
{
    let mut depths = Vec::with_capacity(branches.len());
    for branch in branches {
        match classify(branch, scope) {
            Classification::Resolved { depth, .. } => depths.push(depth),
            Classification::Ambiguous(_) => {
                return Classification::Ambiguous(AmbiguityReason::InvalidListUniformType)
            }
        }
    }

    if let Some((depth, rest)) = depths.split_first() {
        if rest.iter().any(|d| d != depth) {
            return Classification::Ambiguous(AmbiguityReason::InvalidListUniformDepth);
        }
    }

    match classify_union(branches, scope) {
        Classification::Ambiguous(AmbiguityReason::InvalidListUniformDepth) => {
            Classification::Ambiguous(AmbiguityReason::InvalidListUniformDepth)
        }
        Classification::Ambiguous(_) => {
            Classification::Ambiguous(AmbiguityReason::InvalidListUniformType)
        }
        resolved => resolved,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn scope() -> BTreeSet<String> {
        ["ChildComponent".to_string()].into_iter().collect()
    }

    fn resolved(primitive: PrimitiveType, depth: usize) -> Classification {
        Classification::Resolved {
            ty: ClassifiedType::Primitive(primitive),
            depth,
        }
    }

    fn strings(values: &[&str]) -> SourceTypeExpression {
        SourceTypeExpression::LiteralUnion(
            values
                .iter()
                .map(|v| LiteralValue::String(v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn test_primitives() {
        let scope = scope();
        assert_eq!(
            classify(&SourceTypeExpression::BrandedIntegerMarker, &scope),
            resolved(PrimitiveType::Int, 0)
        );
        assert_eq!(
            classify(&SourceTypeExpression::number(), &scope),
            resolved(PrimitiveType::Float, 0)
        );
        assert_eq!(
            classify(&SourceTypeExpression::string(), &scope),
            resolved(PrimitiveType::String, 0)
        );
        assert_eq!(
            classify(&SourceTypeExpression::boolean(), &scope),
            resolved(PrimitiveType::Boolean, 0)
        );
    }

    #[test]
    fn test_literal_unions() {
        let scope = scope();
        assert_eq!(classify(&strings(&["a", "b"]), &scope), resolved(PrimitiveType::String, 0));

        let numbers = SourceTypeExpression::LiteralUnion(vec![
            LiteralValue::Number(1.0),
            LiteralValue::Number(2.5),
        ]);
        assert_eq!(classify(&numbers, &scope), resolved(PrimitiveType::Float, 0));

        let mixed = SourceTypeExpression::LiteralUnion(vec![
            LiteralValue::String("a".to_string()),
            LiteralValue::Number(1.0),
        ]);
        assert_eq!(
            classify(&mixed, &scope),
            Classification::Ambiguous(AmbiguityReason::InvalidEnum)
        );

        let flags = SourceTypeExpression::LiteralUnion(vec![
            LiteralValue::Boolean(true),
            LiteralValue::Boolean(false),
        ]);
        assert_eq!(classify(&flags, &scope), resolved(PrimitiveType::Boolean, 0));

        assert_eq!(
            classify(&SourceTypeExpression::LiteralUnion(vec![]), &scope),
            Classification::Ambiguous(AmbiguityReason::InvalidEnum)
        );
    }

    #[test]
    fn test_component_references() {
        let scope = scope();
        assert_eq!(
            classify(&SourceTypeExpression::reference("ChildComponent"), &scope),
            Classification::Resolved {
                ty: ClassifiedType::Component("ChildComponent".to_string()),
                depth: 0,
            }
        );
        assert_eq!(
            classify(&SourceTypeExpression::reference("Nowhere"), &scope),
            Classification::Ambiguous(AmbiguityReason::Unknown)
        );
        assert_eq!(
            classify(
                &SourceTypeExpression::list_of(SourceTypeExpression::reference("ChildComponent"), 1),
                &scope
            ),
            Classification::Resolved {
                ty: ClassifiedType::Component("ChildComponent".to_string()),
                depth: 1,
            }
        );
    }

    #[test]
    fn test_dynamic_types() {
        let scope = scope();
        assert_eq!(
            classify(&SourceTypeExpression::AnyOrUnknown(DynamicOrigin::Explicit), &scope),
            Classification::Ambiguous(AmbiguityReason::Any)
        );
        assert_eq!(
            classify(&SourceTypeExpression::AnyOrUnknown(DynamicOrigin::Unresolved), &scope),
            Classification::Ambiguous(AmbiguityReason::Unknown)
        );
    }

    #[test]
    fn test_lists() {
        let scope = scope();
        assert_eq!(
            classify(&SourceTypeExpression::list_of(SourceTypeExpression::number(), 1), &scope),
            resolved(PrimitiveType::Float, 1)
        );
        assert_eq!(
            classify(&SourceTypeExpression::list_of(SourceTypeExpression::string(), 2), &scope),
            resolved(PrimitiveType::String, 2)
        );
        assert_eq!(
            classify(&SourceTypeExpression::list_of(strings(&["x", "y"]), 1), &scope),
            resolved(PrimitiveType::String, 1)
        );
    }

    #[test]
    fn test_list_branch_depth_mismatch() {
        let scope = scope();
        // (string | string[])[]
        let expr = SourceTypeExpression::list_of(
            SourceTypeExpression::GeneralUnion(vec![
                SourceTypeExpression::string(),
                SourceTypeExpression::list_of(SourceTypeExpression::string(), 1),
            ]),
            1,
        );
        assert_eq!(
            classify(&expr, &scope),
            Classification::Ambiguous(AmbiguityReason::InvalidListUniformDepth)
        );

        // string[] | number[][] reports depth before element type
        let expr = SourceTypeExpression::GeneralUnion(vec![
            SourceTypeExpression::list_of(SourceTypeExpression::string(), 1),
            SourceTypeExpression::list_of(SourceTypeExpression::number(), 2),
        ]);
        assert_eq!(
            classify(&expr, &scope),
            Classification::Ambiguous(AmbiguityReason::InvalidListUniformDepth)
        );
    }

    #[test]
    fn test_list_branch_type_mismatch() {
        let scope = scope();
        // (string | number)[]
        let expr = SourceTypeExpression::list_of(
            SourceTypeExpression::GeneralUnion(vec![
                SourceTypeExpression::string(),
                SourceTypeExpression::number(),
            ]),
            1,
        );
        assert_eq!(
            classify(&expr, &scope),
            Classification::Ambiguous(AmbiguityReason::InvalidListUniformType)
        );

        // any[] propagates as a list type error
        let expr = SourceTypeExpression::list_of(
            SourceTypeExpression::AnyOrUnknown(DynamicOrigin::Explicit),
            1,
        );
        assert_eq!(
            classify(&expr, &scope),
            Classification::Ambiguous(AmbiguityReason::InvalidListUniformType)
        );
    }

    #[test]
    fn test_union_classifies_the_same_inside_a_list() {
        let scope = scope();
        let mixed = || SourceTypeExpression::GeneralUnion(vec![
            SourceTypeExpression::string(),
            strings(&["a"]),
        ]);
        assert_eq!(
            classify(&mixed(), &scope),
            Classification::Ambiguous(AmbiguityReason::Union)
        );

        // (string | 'a')[]
        assert_eq!(
            classify(&SourceTypeExpression::list_of(mixed(), 1), &scope),
            Classification::Ambiguous(AmbiguityReason::InvalidListUniformType)
        );

        // string[] | 'a'[]
        let arrays = SourceTypeExpression::GeneralUnion(vec![
            SourceTypeExpression::list_of(SourceTypeExpression::string(), 1),
            SourceTypeExpression::list_of(strings(&["a"]), 1),
        ]);
        assert_eq!(
            classify(&arrays, &scope),
            Classification::Ambiguous(AmbiguityReason::InvalidListUniformType)
        );
    }

    #[test]
    fn test_uniform_array_union_resolves() {
        let scope = scope();
        // 'a'[] | 'b'[] merges like 'a' | 'b'
        let expr = SourceTypeExpression::GeneralUnion(vec![
            SourceTypeExpression::list_of(strings(&["a"]), 1),
            SourceTypeExpression::list_of(strings(&["b"]), 1),
        ]);
        assert_eq!(classify(&expr, &scope), resolved(PrimitiveType::String, 1));
        assert_eq!(
            classify(&SourceTypeExpression::list_of(
                SourceTypeExpression::GeneralUnion(vec![strings(&["a"]), strings(&["b"])]),
                1,
            ), &scope),
            resolved(PrimitiveType::String, 1)
        );

        let nested = SourceTypeExpression::GeneralUnion(vec![
            SourceTypeExpression::list_of(SourceTypeExpression::number(), 2),
            SourceTypeExpression::list_of(SourceTypeExpression::number(), 2),
        ]);
        assert_eq!(classify(&nested, &scope), resolved(PrimitiveType::Float, 2));
    }

    #[test]
    fn test_general_unions() {
        let scope = scope();
        let expr = SourceTypeExpression::GeneralUnion(vec![
            SourceTypeExpression::string(),
            SourceTypeExpression::number(),
        ]);
        assert_eq!(
            classify(&expr, &scope),
            Classification::Ambiguous(AmbiguityReason::Union)
        );

        let single = SourceTypeExpression::GeneralUnion(vec![SourceTypeExpression::boolean()]);
        assert_eq!(classify(&single, &scope), resolved(PrimitiveType::Boolean, 0));

        let repeated = SourceTypeExpression::GeneralUnion(vec![
            SourceTypeExpression::string(),
            SourceTypeExpression::string(),
        ]);
        assert_eq!(classify(&repeated, &scope), resolved(PrimitiveType::String, 0));

        let literal_groups = SourceTypeExpression::GeneralUnion(vec![strings(&["a"]), strings(&["b"])]);
        assert_eq!(classify(&literal_groups, &scope), resolved(PrimitiveType::String, 0));

        let mixed_groups = SourceTypeExpression::GeneralUnion(vec![
            strings(&["a"]),
            SourceTypeExpression::LiteralUnion(vec![LiteralValue::Number(1.0)]),
        ]);
        assert_eq!(
            classify(&mixed_groups, &scope),
            Classification::Ambiguous(AmbiguityReason::Union)
        );

        assert_eq!(
            classify(&SourceTypeExpression::GeneralUnion(vec![]), &scope),
            Classification::Ambiguous(AmbiguityReason::Union)
        );
    }
}
