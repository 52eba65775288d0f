//! Rendering of resolved programs

use anyhow::Result;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt::Write;

use strata_core::{Program, ResolvedType};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Json,
    Yaml,
    Summary,
}

pub fn render(program: &Program, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(program)?),
        OutputFormat::Yaml => Ok(serde_yaml::to_string(program)?),
        OutputFormat::Summary => Ok(render_summary(program)?),
    }
}

fn render_summary(program: &Program) -> Result<String, std::fmt::Error> {
    let mut out = String::new();
    writeln!(
        out,
        "{} component(s), entry: {}",
        program.len(),
        program.local_component_names().join(", ")
    )?;

    for component in program.components() {
        writeln!(out)?;
        writeln!(out, "{}", component.name)?;
        for property in &component.properties {
            let ty = match &property.resolved_type {
                ResolvedType::Primitive(primitive) => primitive.to_string(),
                ResolvedType::Component(name) => name.clone(),
                ResolvedType::Unresolved => "?".to_string(),
            };
            writeln!(
                out,
                "  {}: {}{}",
                property.name,
                ty,
                "[]".repeat(property.depth)
            )?;
        }
    }

    let diagnostics = program.diagnostics();
    if !diagnostics.is_empty() {
        writeln!(out)?;
        write!(out, "{}", diagnostics.format_summary())?;
    }

    let cycles = program.reference_cycles();
    if !cycles.is_empty() {
        writeln!(out)?;
        for cycle in cycles {
            writeln!(out, "reference cycle: {}", cycle.join(" -> "))?;
        }
    }

    writeln!(out)?;
    writeln!(out, "fingerprint: {}", program.fingerprint().short_hash())?;
    Ok(out)
}
