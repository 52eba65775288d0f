//! Turns classified declarations into finished properties

use std::collections::HashSet;

use crate::classifier::{classify, Classification, ClassifiedType};
use crate::program::{Component, Property, ResolvedType};
use crate::provider::{ComponentScope, PropertyDeclaration};

/// Resolves the declarations of one component at a time
pub struct PropertyResolver<'a, S: ComponentScope + ?Sized> {
    scope: &'a S,
}

impl<'a, S: ComponentScope + ?Sized> PropertyResolver<'a, S> {
    pub fn new(scope: &'a S) -> Self {
        Self { scope }
    }

    /// Resolve one declaration of `component`.
    ///
    /// Ambiguous declarations still produce a property, with an unresolved
    /// type, and are recorded in the component's warnings. Nothing else on
    /// `component` is touched.
    pub fn resolve_property(&self, decl: &PropertyDeclaration, component: &mut Component) -> Property {
        let classification = classify(&decl.type_expression, self.scope);
        tracing::trace!(
            "PropertyResolver: {}.{} classified as {:?}",
            component.name,
            decl.name,
            classification
        );

        match classification {
            Classification::Resolved { ty, depth } => {
                let (resolved_type, is_component) = match ty {
                    ClassifiedType::Primitive(primitive) => (ResolvedType::Primitive(primitive), false),
                    ClassifiedType::Component(name) => (ResolvedType::Component(name), true),
                };
                Property {
                    name: decl.name.clone(),
                    resolved_type,
                    depth,
                    is_component,
                }
            }
            Classification::Ambiguous(reason) => {
                tracing::warn!(
                    "ambiguous type on property {} of component {} ({})",
                    decl.name,
                    component.name,
                    reason
                );
                component.warnings.record_ambiguous(decl.name.clone(), reason);
                Property {
                    name: decl.name.clone(),
                    resolved_type: ResolvedType::Unresolved,
                    depth: 0,
                    is_component: false,
                }
            }
        }
    }

    /// Resolve every declaration of a component in declaration order.
    ///
    /// A repeated property name keeps its first declaration.
    pub fn resolve_component(&self, name: &str, declarations: &[PropertyDeclaration]) -> Component {
        let mut component = Component::new(name);
        let mut seen = HashSet::new();

        for decl in declarations {
            if !seen.insert(decl.name.as_str()) {
                tracing::warn!(
                    "PropertyResolver: skipping duplicate property {} of component {}",
                    decl.name,
                    name
                );
                continue;
            }
            let property = self.resolve_property(decl, &mut component);
            component.properties.push(property);
        }

        component
    }
}
