//! Declaration provider seam
//!
//! Parsing source text into declarations happens outside this crate. A build
//! only needs two things from a source: whether a name is a declared
//! component, and the ordered raw property declarations of that component.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};

use crate::error::ProviderError;
use crate::types::SourceTypeExpression;

/// A raw property declaration with its unclassified type expression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyDeclaration {
    pub name: String,
    pub type_expression: SourceTypeExpression,
}

impl PropertyDeclaration {
    pub fn new(name: impl Into<String>, type_expression: SourceTypeExpression) -> Self {
        Self {
            name: name.into(),
            type_expression,
        }
    }
}

/// Answers whether a name refers to a declared component
pub trait ComponentScope {
    fn is_component(&self, name: &str) -> bool;
}

impl ComponentScope for BTreeSet<String> {
    fn is_component(&self, name: &str) -> bool {
        self.contains(name)
    }
}

impl ComponentScope for HashSet<String> {
    fn is_component(&self, name: &str) -> bool {
        self.contains(name)
    }
}

/// Source of component declarations for a build
pub trait DeclarationProvider: ComponentScope {
    /// Ordered property declarations of `component`.
    ///
    /// Failing here is fatal to the whole build.
    fn lookup(&self, component: &str) -> Result<Vec<PropertyDeclaration>, ProviderError>;

    /// Get a human-readable name for this provider (for debugging)
    fn name(&self) -> &str {
        "provider"
    }
}

/// Provider backed by declarations held in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryProvider {
    components: BTreeMap<String, Result<Vec<PropertyDeclaration>, String>>,
}

impl MemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a component with its properties in order
    pub fn component<N, I, P>(mut self, name: N, properties: I) -> Self
    where
        N: Into<String>,
        I: IntoIterator<Item = (P, SourceTypeExpression)>,
        P: Into<String>,
    {
        let declarations = properties
            .into_iter()
            .map(|(prop, expr)| PropertyDeclaration::new(prop, expr))
            .collect();
        self.components.insert(name.into(), Ok(declarations));
        self
    }

    /// Declare a component whose source cannot be read
    pub fn malformed(mut self, name: impl Into<String>, message: impl Into<String>) -> Self {
        self.components.insert(name.into(), Err(message.into()));
        self
    }

    pub fn component_names(&self) -> impl Iterator<Item = &str> {
        self.components.keys().map(String::as_str)
    }
}

impl ComponentScope for MemoryProvider {
    fn is_component(&self, name: &str) -> bool {
        self.components.contains_key(name)
    }
}

impl DeclarationProvider for MemoryProvider {
    fn lookup(&self, component: &str) -> Result<Vec<PropertyDeclaration>, ProviderError> {
        match self.components.get(component) {
            Some(Ok(declarations)) => Ok(declarations.clone()),
            Some(Err(message)) => Err(ProviderError::Malformed {
                component: component.to_string(),
                message: message.clone(),
            }),
            None => Err(ProviderError::NotFound(component.to_string())),
        }
    }

    fn name(&self) -> &str {
        "memory"
    }
}
