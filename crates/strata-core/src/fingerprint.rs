//! Content fingerprinting of resolved programs
//!
//! Downstream generators compare fingerprints to decide whether a build
//! changed anything that affects their output.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

use crate::program::{Component, Program, ResolvedType};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramFingerprint {
    /// Hash of each resolved component, keyed by name
    pub component_hashes: BTreeMap<String, String>,
    /// Hash over the entry names and every component hash
    pub combined_hash: String,
    /// Version of strata that created this fingerprint
    pub strata_version: String,
}

impl ProgramFingerprint {
    pub fn of(program: &Program) -> Self {
        let component_hashes: BTreeMap<String, String> = program
            .components()
            .map(|c| (c.name.clone(), hash_component(c)))
            .collect();

        let mut hasher = Sha256::new();
        for name in program.local_component_names() {
            hasher.update(b"entry:");
            hasher.update(name.as_bytes());
            hasher.update(b"\n");
        }
        for (name, hash) in &component_hashes {
            hasher.update(format!("{}={}\n", name, hash).as_bytes());
        }

        Self {
            component_hashes,
            combined_hash: format!("{:x}", hasher.finalize()),
            strata_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    pub fn content_matches(&self, other: &ProgramFingerprint) -> bool {
        self.combined_hash == other.combined_hash
    }

    /// Components added, removed or changed between `other` and `self`
    pub fn changed_components(&self, other: &ProgramFingerprint) -> Vec<String> {
        let mut changed: Vec<String> = self
            .component_hashes
            .iter()
            .filter(|(name, hash)| other.component_hashes.get(*name) != Some(*hash))
            .map(|(name, _)| name.clone())
            .collect();
        changed.extend(
            other
                .component_hashes
                .keys()
                .filter(|name| !self.component_hashes.contains_key(*name))
                .cloned(),
        );
        changed.sort();
        changed
    }

    /// Get a short hash for display purposes
    pub fn short_hash(&self) -> String {
        self.combined_hash.chars().take(12).collect()
    }
}

fn hash_component(component: &Component) -> String {
    let mut hasher = Sha256::new();
    hasher.update(component.name.as_bytes());
    hasher.update(b"\n");
    for property in &component.properties {
        let ty = match &property.resolved_type {
            ResolvedType::Primitive(primitive) => primitive.to_string(),
            ResolvedType::Component(name) => format!("component:{}", name),
            ResolvedType::Unresolved => "unresolved".to_string(),
        };
        hasher.update(
            format!(
                "{}|{}|{}|{}\n",
                property.name, ty, property.depth, property.is_component
            )
            .as_bytes(),
        );
    }
    for name in component.warnings.ambiguous_types() {
        if let Some(reason) = component.warnings.reason(name) {
            hasher.update(format!("ambiguous:{}:{}\n", name, reason).as_bytes());
        }
    }
    format!("{:x}", hasher.finalize())
}

impl Program {
    pub fn fingerprint(&self) -> ProgramFingerprint {
        ProgramFingerprint::of(self)
    }
}
