//! Component source files and the declaration provider built on them
//!
//! A source file is a YAML or JSON mapping with a `components` key. Each
//! component maps property names to type expressions, in declaration order:
//!
//! ```yaml
//! components:
//!   Card:
//!     title: string
//!     tags: string[]
//!     footer: Footer
//! ```
//!
//! Type expressions are kept as text until a build asks for the component,
//! so a malformed expression fails the build that needs it.

use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use indexmap::IndexMap;
use regex::Regex;
use serde::de::{Deserializer, MapAccess, Visitor};
use serde::Deserialize;
use strata_core::{ComponentScope, DeclarationProvider, PropertyDeclaration, ProviderError};
use walkdir::WalkDir;

use crate::error::ParserError;
use crate::type_expr::parse_type_expression;

const SOURCE_EXTENSIONS: &[&str] = &["yaml", "yml", "json"];

fn identifier_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("identifier pattern is valid")
    })
}

/// Mapping in document order, remembering the first key written twice.
///
/// Both serde_json and serde_yaml let a repeated key overwrite the earlier
/// value when filling an `IndexMap`, so the repeat is recorded here instead.
#[derive(Debug, Default)]
struct Declared<V> {
    entries: IndexMap<String, V>,
    duplicate: Option<String>,
}

impl<'de, V: Deserialize<'de>> Deserialize<'de> for Declared<V> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct DeclaredVisitor<V>(PhantomData<V>);

        impl<'de, V: Deserialize<'de>> Visitor<'de> for DeclaredVisitor<V> {
            type Value = Declared<V>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a mapping")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut declared = Declared {
                    entries: IndexMap::with_capacity(map.size_hint().unwrap_or(0)),
                    duplicate: None,
                };
                while let Some((key, value)) = map.next_entry::<String, V>()? {
                    if declared.entries.contains_key(&key) {
                        declared.duplicate.get_or_insert(key);
                    } else {
                        declared.entries.insert(key, value);
                    }
                }
                Ok(declared)
            }
        }

        deserializer.deserialize_map(DeclaredVisitor(PhantomData))
    }
}

#[derive(Debug, Deserialize)]
struct RawSourceFile {
    #[serde(default)]
    components: Declared<Declared<String>>,
}

/// One component as written in a source file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentSource {
    pub name: String,
    /// Property names and their unparsed type expressions
    pub properties: IndexMap<String, String>,
}

/// A loaded source file
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: PathBuf,
    pub components: Vec<ComponentSource>,
}

impl SourceFile {
    /// Parse `content`, choosing JSON or YAML from the path's extension
    pub fn parse(path: impl Into<PathBuf>, content: &str) -> Result<Self, ParserError> {
        let path = path.into();
        let raw: RawSourceFile = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => serde_json::from_str(content)?,
            _ => serde_yaml::from_str(content)?,
        };

        if let Some(name) = raw.components.duplicate {
            return Err(ParserError::InvalidSource {
                path,
                message: format!("component '{}' declared twice", name),
            });
        }

        let mut components = Vec::with_capacity(raw.components.entries.len());
        for (name, properties) in raw.components.entries {
            validate_identifier(&name)?;
            if let Some(property) = properties.duplicate {
                return Err(ParserError::DuplicateProperty {
                    component: name,
                    property,
                });
            }
            for property in properties.entries.keys() {
                validate_identifier(property)?;
            }
            components.push(ComponentSource {
                name,
                properties: properties.entries,
            });
        }

        Ok(Self { path, components })
    }

    pub fn component_names(&self) -> impl Iterator<Item = &str> {
        self.components.iter().map(|c| c.name.as_str())
    }
}

fn validate_identifier(name: &str) -> Result<(), ParserError> {
    if identifier_pattern().is_match(name) {
        Ok(())
    } else {
        Err(ParserError::InvalidIdentifier(name.to_string()))
    }
}

/// All source files of a project, usable as a declaration provider
#[derive(Debug, Clone, Default)]
pub struct SourceSet {
    files: Vec<SourceFile>,
    /// Component name -> (file index, component index)
    index: HashMap<String, (usize, usize)>,
}

impl SourceSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every source file below `root`, in path order.
    ///
    /// Paths are recorded relative to `root`.
    pub fn load_dir(root: impl AsRef<Path>) -> Result<Self, ParserError> {
        let root = root.as_ref();
        let mut paths = Vec::new();
        for entry in WalkDir::new(root) {
            let entry = entry.map_err(|e| ParserError::InvalidSource {
                path: root.to_path_buf(),
                message: e.to_string(),
            })?;
            let is_source = entry
                .path()
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|ext| SOURCE_EXTENSIONS.contains(&ext));
            if entry.file_type().is_file() && is_source {
                paths.push(entry.into_path());
            }
        }
        paths.sort();

        let mut set = Self::new();
        for path in paths {
            let content = std::fs::read_to_string(&path)?;
            let relative = path.strip_prefix(root).unwrap_or(&path).to_path_buf();
            tracing::debug!("SourceSet: loading {}", relative.display());
            set.add_file(SourceFile::parse(relative, &content)?)?;
        }

        tracing::info!(
            "Loaded {} source file(s) declaring {} component(s)",
            set.files.len(),
            set.index.len()
        );
        Ok(set)
    }

    /// Parse and add a source file from memory
    pub fn add_source(&mut self, path: impl Into<PathBuf>, content: &str) -> Result<(), ParserError> {
        self.add_file(SourceFile::parse(path, content)?)
    }

    pub fn add_file(&mut self, file: SourceFile) -> Result<(), ParserError> {
        let file_idx = self.files.len();
        for (component_idx, component) in file.components.iter().enumerate() {
            if let Some(&(existing, _)) = self.index.get(&component.name) {
                return Err(ParserError::DuplicateComponent {
                    name: component.name.clone(),
                    first: self.files[existing].path.clone(),
                    second: file.path.clone(),
                });
            }
            self.index
                .insert(component.name.clone(), (file_idx, component_idx));
        }
        self.files.push(file);
        Ok(())
    }

    pub fn files(&self) -> &[SourceFile] {
        &self.files
    }

    pub fn component(&self, name: &str) -> Option<&ComponentSource> {
        self.index
            .get(name)
            .map(|&(file, component)| &self.files[file].components[component])
    }

    /// File that declares `name`
    pub fn declaring_file(&self, name: &str) -> Option<&Path> {
        self.index
            .get(name)
            .map(|&(file, _)| self.files[file].path.as_path())
    }

    /// Components declared directly in `entry`, in declaration order.
    ///
    /// An exact path match wins. Otherwise `entry` may name a path suffix,
    /// as long as exactly one file ends with it.
    pub fn entry_names(&self, entry: impl AsRef<Path>) -> Result<Vec<String>, ParserError> {
        let entry = entry.as_ref();
        let file = match self.files.iter().find(|f| f.path == entry) {
            Some(file) => file,
            None => {
                let mut matches = self.files.iter().filter(|f| f.path.ends_with(entry));
                match (matches.next(), matches.next()) {
                    (Some(file), None) => file,
                    (None, _) => return Err(ParserError::EntryNotFound(entry.to_path_buf())),
                    (Some(first), Some(second)) => {
                        return Err(ParserError::AmbiguousEntry {
                            entry: entry.to_path_buf(),
                            first: first.path.clone(),
                            second: second.path.clone(),
                        })
                    }
                }
            }
        };
        Ok(file.component_names().map(str::to_string).collect())
    }
}

impl ComponentScope for SourceSet {
    fn is_component(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }
}

impl DeclarationProvider for SourceSet {
    fn lookup(&self, component: &str) -> Result<Vec<PropertyDeclaration>, ProviderError> {
        let source = self
            .component(component)
            .ok_or_else(|| ProviderError::NotFound(component.to_string()))?;

        source
            .properties
            .iter()
            .map(|(name, expr)| {
                parse_type_expression(expr)
                    .map(|type_expression| PropertyDeclaration::new(name.clone(), type_expression))
                    .map_err(|err| ProviderError::Malformed {
                        component: component.to_string(),
                        message: format!("property '{}': {}", name, err),
                    })
            })
            .collect()
    }

    fn name(&self) -> &str {
        "source-set"
    }
}
