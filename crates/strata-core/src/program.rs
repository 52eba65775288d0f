//! The resolved, platform-neutral schema produced by a build

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::diagnostics::{AmbiguityReason, Diagnostic, DiagnosticReport};
use crate::types::PrimitiveType;

/// What a property finally resolved to
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolvedType {
    Primitive(PrimitiveType),
    /// Name of another component in the same program
    Component(String),
    /// Placeholder for an ambiguous property
    Unresolved,
}

impl ResolvedType {
    pub fn as_primitive(&self) -> Option<PrimitiveType> {
        match self {
            ResolvedType::Primitive(primitive) => Some(*primitive),
            _ => None,
        }
    }

    pub fn as_component(&self) -> Option<&str> {
        match self {
            ResolvedType::Component(name) => Some(name),
            _ => None,
        }
    }

    pub fn is_unresolved(&self) -> bool {
        matches!(self, ResolvedType::Unresolved)
    }
}

impl From<PrimitiveType> for ResolvedType {
    fn from(primitive: PrimitiveType) -> Self {
        ResolvedType::Primitive(primitive)
    }
}

/// One named, typed member of a component
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Property {
    pub name: String,
    #[serde(rename = "type")]
    pub resolved_type: ResolvedType,
    /// Number of list levels wrapping the resolved type
    pub depth: usize,
    pub is_component: bool,
}

/// Ambiguous property names of one component, with the reason for each
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentWarnings {
    ambiguous_types: BTreeMap<String, AmbiguityReason>,
}

impl ComponentWarnings {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_ambiguous(&mut self, property: impl Into<String>, reason: AmbiguityReason) {
        self.ambiguous_types.insert(property.into(), reason);
    }

    /// Names of the ambiguous properties, in name order
    pub fn ambiguous_types(&self) -> impl Iterator<Item = &str> {
        self.ambiguous_types.keys().map(String::as_str)
    }

    pub fn contains(&self, property: &str) -> bool {
        self.ambiguous_types.contains_key(property)
    }

    pub fn reason(&self, property: &str) -> Option<AmbiguityReason> {
        self.ambiguous_types.get(property).copied()
    }

    pub fn len(&self) -> usize {
        self.ambiguous_types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ambiguous_types.is_empty()
    }
}

/// A named schema unit with its properties in declaration order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Component {
    pub name: String,
    pub properties: Vec<Property>,
    pub warnings: ComponentWarnings,
}

impl Component {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            properties: Vec::new(),
            warnings: ComponentWarnings::new(),
        }
    }

    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.name == name)
    }

    pub fn has_property(&self, name: &str) -> bool {
        self.property(name).is_some()
    }

    /// Names of components this one references, in declaration order
    pub fn referenced_components(&self) -> impl Iterator<Item = &str> {
        self.properties
            .iter()
            .filter_map(|p| p.resolved_type.as_component())
    }

    /// Ambiguous properties as diagnostics, in declaration order
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.properties
            .iter()
            .filter_map(|p| {
                self.warnings.reason(&p.name).map(|reason| Diagnostic {
                    component: self.name.clone(),
                    property: p.name.clone(),
                    reason,
                })
            })
            .collect()
    }
}

/// Transitive closure of the components reachable from a build's entry names
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Program {
    target_components: BTreeMap<String, Component>,
    local_component_names: Vec<String>,
}

impl Program {
    pub(crate) fn new(
        target_components: BTreeMap<String, Component>,
        local_component_names: Vec<String>,
    ) -> Self {
        Self {
            target_components,
            local_component_names,
        }
    }

    pub fn target_components(&self) -> &BTreeMap<String, Component> {
        &self.target_components
    }

    /// Entry component names, in the order they were declared
    pub fn local_component_names(&self) -> &[String] {
        &self.local_component_names
    }

    pub fn component(&self, name: &str) -> Option<&Component> {
        self.target_components.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.target_components.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.target_components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.target_components.is_empty()
    }

    pub fn components(&self) -> impl Iterator<Item = &Component> {
        self.target_components.values()
    }

    pub fn local_components(&self) -> impl Iterator<Item = &Component> {
        self.local_component_names
            .iter()
            .filter_map(|name| self.target_components.get(name))
    }

    /// Ambiguous properties across all components
    pub fn diagnostics(&self) -> DiagnosticReport {
        DiagnosticReport::new(
            self.target_components
                .values()
                .flat_map(Component::diagnostics)
                .collect(),
        )
    }

    pub fn has_ambiguities(&self) -> bool {
        self.target_components
            .values()
            .any(|c| !c.warnings.is_empty())
    }
}
