//! Type inference and component graph resolution for strata schemas
//!
//! A build starts from a set of entry component names, asks a
//! [`DeclarationProvider`] for their raw property declarations, classifies
//! every type expression and follows component references until the whole
//! reachable graph is resolved into a [`Program`].

pub mod builder;
pub mod classifier;
pub mod diagnostics;
pub mod error;
pub mod fingerprint;
pub mod graph;
pub mod program;
pub mod provider;
pub mod resolver;
pub mod types;

pub use builder::ProgramBuilder;
pub use classifier::{classify, Classification, ClassifiedType};
pub use diagnostics::{AmbiguityReason, Diagnostic, DiagnosticReport};
pub use error::{CoreError, ProviderError};
pub use fingerprint::ProgramFingerprint;
pub use graph::ReferenceGraph;
pub use program::{Component, ComponentWarnings, Program, Property, ResolvedType};
pub use provider::{ComponentScope, DeclarationProvider, MemoryProvider, PropertyDeclaration};
pub use types::{DynamicOrigin, LiteralValue, PrimitiveKeyword, PrimitiveType, SourceTypeExpression};
