//! Library interface for the strata CLI

pub mod manifest;
pub mod output;

use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use strata_core::Program;
use strata_parser::{compile, SourceSet};

use crate::manifest::StrataManifest;
use crate::output::{render, OutputFormat};

/// Effective settings for one compile run, after CLI overrides
#[derive(Debug, Clone, PartialEq)]
pub struct CompileSettings {
    pub source_dir: PathBuf,
    pub entry: PathBuf,
    pub format: OutputFormat,
    pub output: Option<PathBuf>,
    pub deny_ambiguous: bool,
}

impl CompileSettings {
    /// Settings from a manifest whose relative paths are resolved against `base_dir`
    pub fn from_manifest(manifest: &StrataManifest, base_dir: &Path) -> Self {
        Self {
            source_dir: base_dir.join(&manifest.project.source_dir),
            entry: manifest.project.entry.clone(),
            format: manifest.output.format,
            output: manifest.output.path.as_ref().map(|p| base_dir.join(p)),
            deny_ambiguous: manifest.diagnostics.deny_ambiguous,
        }
    }
}

impl Default for CompileSettings {
    fn default() -> Self {
        Self::from_manifest(&StrataManifest::default(), Path::new("."))
    }
}

/// Load the sources and build the program
pub fn build_program(settings: &CompileSettings) -> Result<Program> {
    let sources = SourceSet::load_dir(&settings.source_dir)
        .with_context(|| format!("Failed to load sources from {}", settings.source_dir.display()))?;
    let program = compile(&sources, &settings.entry)
        .with_context(|| format!("Failed to compile entry {}", settings.entry.display()))?;
    Ok(program)
}

/// Report ambiguities and fail when they are denied
pub fn check_program(program: &Program, deny_ambiguous: bool) -> Result<()> {
    let diagnostics = program.diagnostics();
    for diagnostic in diagnostics.entries() {
        warn!("{}", diagnostic);
    }
    for cycle in program.reference_cycles() {
        info!("Reference cycle: {}", cycle.join(" -> "));
    }

    if deny_ambiguous && !diagnostics.is_empty() {
        bail!(
            "{} ambiguous property type(s) found\n{}",
            diagnostics.count(),
            diagnostics.format_compact()
        );
    }
    Ok(())
}

/// Build, check and render; returns the rendered program when no output
/// path is configured
pub fn run_compile(settings: &CompileSettings) -> Result<Option<String>> {
    let program = build_program(settings)?;
    check_program(&program, settings.deny_ambiguous)?;

    let rendered = render(&program, settings.format)?;
    match &settings.output {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, rendered)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!(
                "Wrote {} component(s) to {} (fingerprint {})",
                program.len(),
                path.display(),
                program.fingerprint().short_hash()
            );
            Ok(None)
        }
        None => Ok(Some(rendered)),
    }
}
