//! Ambiguity diagnostics collected while resolving components
//!
//! Ambiguous property types never fail a build. Each one is recorded on the
//! owning component together with the reason the classifier gave, and can be
//! surfaced afterwards through [`DiagnosticReport`].

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Why a type expression could not be classified into one primitive or
/// component type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AmbiguityReason {
    /// Literal union mixing literal kinds
    InvalidEnum,
    /// Unresolved symbol or reference to an undeclared component
    Unknown,
    /// Explicitly dynamic type
    Any,
    /// Union of unrelated types
    Union,
    /// List branches nested to different depths
    InvalidListUniformDepth,
    /// List branches with different element types
    InvalidListUniformType,
}

impl AmbiguityReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            AmbiguityReason::InvalidEnum => "invalidEnum",
            AmbiguityReason::Unknown => "unknown",
            AmbiguityReason::Any => "any",
            AmbiguityReason::Union => "union",
            AmbiguityReason::InvalidListUniformDepth => "invalidListUniformDepth",
            AmbiguityReason::InvalidListUniformType => "invalidListUniformType",
        }
    }

    pub fn describe(&self) -> &'static str {
        match self {
            AmbiguityReason::InvalidEnum => "enum members mix literal kinds",
            AmbiguityReason::Unknown => "type could not be resolved",
            AmbiguityReason::Any => "type is explicitly dynamic",
            AmbiguityReason::Union => "union of unrelated types",
            AmbiguityReason::InvalidListUniformDepth => "list branches differ in depth",
            AmbiguityReason::InvalidListUniformType => "list branches differ in element type",
        }
    }
}

impl fmt::Display for AmbiguityReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One ambiguous property, located by component and property name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub component: String,
    pub property: String,
    pub reason: AmbiguityReason,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ambiguous type on property {} of component {} ({}: {})",
            self.property,
            self.component,
            self.reason,
            self.reason.describe()
        )
    }
}

/// Collected diagnostics for a whole program
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiagnosticReport {
    entries: Vec<Diagnostic>,
}

impl DiagnosticReport {
    pub fn new(entries: Vec<Diagnostic>) -> Self {
        Self { entries }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn count(&self) -> usize {
        self.entries.len()
    }

    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    pub fn by_reason(&self, reason: AmbiguityReason) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter().filter(move |d| d.reason == reason)
    }

    pub fn for_component<'a>(&'a self, component: &'a str) -> impl Iterator<Item = &'a Diagnostic> {
        self.entries.iter().filter(move |d| d.component == component)
    }

    /// Format diagnostics grouped by reason
    pub fn format_summary(&self) -> String {
        if self.entries.is_empty() {
            return "No ambiguous types".to_string();
        }

        let mut by_reason: BTreeMap<AmbiguityReason, Vec<&Diagnostic>> = BTreeMap::new();
        for entry in &self.entries {
            by_reason.entry(entry.reason).or_default().push(entry);
        }

        let mut lines = Vec::new();
        lines.push(format!("Found {} ambiguous type(s):", self.entries.len()));
        lines.push(String::new());

        for (reason, entries) in by_reason {
            lines.push(format!("## {} ({}):", reason, entries.len()));
            for entry in entries {
                lines.push(format!("  - {}.{}", entry.component, entry.property));
            }
            lines.push(String::new());
        }

        lines.join("\n")
    }

    /// One line per diagnostic
    pub fn format_compact(&self) -> String {
        self.entries
            .iter()
            .map(|d| d.to_string())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl fmt::Display for DiagnosticReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_summary())
    }
}
