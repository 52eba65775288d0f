//! Source type expressions and the primitive set they resolve into

use serde::{Deserialize, Serialize};
use std::fmt;

/// Primitive keyword spelled directly in a declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PrimitiveKeyword {
    /// Any general numeric spelling (`number`, `Float`, ...)
    Number,
    String,
    Boolean,
}

/// Distinguishes an explicitly dynamic annotation from an unresolved one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DynamicOrigin {
    /// The declaration asked for a dynamic value (`any`)
    Explicit,
    /// The declaration's type could not be resolved to a symbol (`unknown`)
    Unresolved,
}

/// A single literal member of a literal union
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LiteralValue {
    String(String),
    Number(f64),
    Boolean(bool),
}

impl LiteralValue {
    fn kind(&self) -> LiteralKind {
        match self {
            LiteralValue::String(_) => LiteralKind::String,
            LiteralValue::Number(_) => LiteralKind::Number,
            LiteralValue::Boolean(_) => LiteralKind::Boolean,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LiteralKind {
    String,
    Number,
    Boolean,
}

/// Returns the common literal kind of `members`, or `None` when the members
/// are empty or mix kinds.
pub(crate) fn uniform_literal_kind<'a>(
    members: impl IntoIterator<Item = &'a LiteralValue>,
) -> Option<LiteralKind> {
    let mut kinds = members.into_iter().map(LiteralValue::kind);
    let first = kinds.next()?;
    kinds.all(|kind| kind == first).then_some(first)
}

/// Unclassified type expression as delivered by a declaration provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SourceTypeExpression {
    PrimitiveKeyword(PrimitiveKeyword),
    /// Explicit integral numeric contract
    BrandedIntegerMarker,
    ArrayOf(Box<SourceTypeExpression>),
    LiteralUnion(Vec<LiteralValue>),
    GeneralUnion(Vec<SourceTypeExpression>),
    ComponentReference(String),
    AnyOrUnknown(DynamicOrigin),
}

impl SourceTypeExpression {
    pub fn number() -> Self {
        Self::PrimitiveKeyword(PrimitiveKeyword::Number)
    }

    pub fn string() -> Self {
        Self::PrimitiveKeyword(PrimitiveKeyword::String)
    }

    pub fn boolean() -> Self {
        Self::PrimitiveKeyword(PrimitiveKeyword::Boolean)
    }

    pub fn reference(name: impl Into<String>) -> Self {
        Self::ComponentReference(name.into())
    }

    /// Wrap `inner` in `depth` levels of list nesting
    pub fn list_of(inner: SourceTypeExpression, depth: usize) -> Self {
        (0..depth).fold(inner, |acc, _| Self::ArrayOf(Box::new(acc)))
    }
}

/// Platform-neutral primitive a property can resolve to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PrimitiveType {
    Int,
    Float,
    String,
    Boolean,
}

impl fmt::Display for PrimitiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrimitiveType::Int => write!(f, "Int"),
            PrimitiveType::Float => write!(f, "Float"),
            PrimitiveType::String => write!(f, "String"),
            PrimitiveType::Boolean => write!(f, "Boolean"),
        }
    }
}
