//! Builds programs from on-disk component sources

use std::path::PathBuf;

use pretty_assertions::assert_eq;
use strata_core::{AmbiguityReason, CoreError, PrimitiveType, ResolvedType};
use strata_parser::{compile, ParserError, SourceSet};

fn fixture_dir(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

#[test]
fn test_valid_fixture_program() -> Result<(), Box<dyn std::error::Error>> {
    let sources = SourceSet::load_dir(fixture_dir("valid"))?;
    assert_eq!(sources.files().len(), 3);

    let program = compile(&sources, "index.yaml")?;
    assert_eq!(program.len(), 3);
    assert_eq!(program.local_component_names(), &["Valid".to_string()]);

    let valid = program.component("Valid").ok_or("Valid missing")?;
    assert_eq!(valid.properties.len(), 16);

    let resolved: Vec<(&str, Option<PrimitiveType>, usize)> = valid
        .properties
        .iter()
        .take(9)
        .map(|p| (p.name.as_str(), p.resolved_type.as_primitive(), p.depth))
        .collect();
    assert_eq!(
        resolved,
        vec![
            ("int", Some(PrimitiveType::Int), 0),
            ("number", Some(PrimitiveType::Float), 0),
            ("float", Some(PrimitiveType::Float), 0),
            ("string", Some(PrimitiveType::String), 0),
            ("boolean", Some(PrimitiveType::Boolean), 0),
            ("stringEnum", Some(PrimitiveType::String), 0),
            ("numberEnum", Some(PrimitiveType::Float), 0),
            ("validListDepth1", Some(PrimitiveType::Float), 1),
            ("validListDepth2", Some(PrimitiveType::String), 2),
        ]
    );

    let child = valid.property("child").ok_or("child missing")?;
    assert_eq!(
        child.resolved_type,
        ResolvedType::Component("ChildComponent".to_string())
    );
    assert!(child.is_component);

    let ambiguous: Vec<(&str, Option<AmbiguityReason>)> = valid
        .warnings
        .ambiguous_types()
        .map(|name| (name, valid.warnings.reason(name)))
        .collect();
    assert_eq!(
        ambiguous,
        vec![
            ("any", Some(AmbiguityReason::Any)),
            ("invalidEnum", Some(AmbiguityReason::InvalidEnum)),
            ("invalidListUniformDepth", Some(AmbiguityReason::InvalidListUniformDepth)),
            ("invalidListUniformType", Some(AmbiguityReason::InvalidListUniformType)),
            ("union", Some(AmbiguityReason::Union)),
            ("unknown", Some(AmbiguityReason::Unknown)),
        ]
    );

    let child_component = program.component("ChildComponent").ok_or("child component missing")?;
    assert_eq!(child_component.properties.len(), 1);
    assert!(child_component.warnings.is_empty());
    let grandchild = child_component.property("grandchild").ok_or("grandchild missing")?;
    assert_eq!(
        grandchild.resolved_type,
        ResolvedType::Component("GrandchildComponent".to_string())
    );
    assert!(grandchild.is_component);

    let grandchild_component = program
        .component("GrandchildComponent")
        .ok_or("grandchild component missing")?;
    assert_eq!(grandchild_component.properties.len(), 1);
    assert!(grandchild_component.warnings.is_empty());
    let diez = grandchild_component.property("diez").ok_or("diez missing")?;
    assert_eq!(diez.resolved_type, ResolvedType::Primitive(PrimitiveType::String));
    assert!(!diez.is_component);
    Ok(())
}

#[test]
fn test_non_entry_file_as_entry() -> Result<(), Box<dyn std::error::Error>> {
    let sources = SourceSet::load_dir(fixture_dir("valid"))?;
    let program = compile(&sources, "child.yaml")?;

    assert_eq!(program.local_component_names(), &["ChildComponent".to_string()]);
    assert_eq!(program.len(), 2);
    assert!(!program.contains("Valid"));
    Ok(())
}

#[test]
fn test_malformed_reference_fails_whole_build() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    std::fs::write(
        dir.path().join("index.yaml"),
        "components:\n  Root:\n    leaf: Leaf\n    label: string\n",
    )?;
    std::fs::write(
        dir.path().join("leaf.yaml"),
        "components:\n  Leaf:\n    size: \"'s' |\"\n",
    )?;

    let sources = SourceSet::load_dir(dir.path())?;
    let err = compile(&sources, "index.yaml").unwrap_err();
    match err {
        ParserError::Core(CoreError::Provider { component, .. }) => assert_eq!(component, "Leaf"),
        other => panic!("expected provider failure, got {:?}", other),
    }
    Ok(())
}

#[test]
fn test_unknown_entry_file() -> Result<(), Box<dyn std::error::Error>> {
    let sources = SourceSet::load_dir(fixture_dir("valid"))?;
    assert!(matches!(
        compile(&sources, "missing.yaml"),
        Err(ParserError::EntryNotFound(_))
    ));
    Ok(())
}

#[test]
fn test_non_source_files_are_ignored() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    std::fs::write(dir.path().join("README.md"), "# not a source")?;
    std::fs::write(
        dir.path().join("index.yml"),
        "components:\n  Only:\n    flag: boolean\n",
    )?;

    let sources = SourceSet::load_dir(dir.path())?;
    assert_eq!(sources.files().len(), 1);
    let program = compile(&sources, "index.yml")?;
    assert_eq!(program.len(), 1);
    Ok(())
}

#[test]
fn test_root_entry_beats_nested_file_of_same_name() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    std::fs::create_dir(dir.path().join("a"))?;
    std::fs::write(
        dir.path().join("a").join("index.yaml"),
        "components:\n  Nested:\n    label: string\n",
    )?;
    std::fs::write(
        dir.path().join("index.yaml"),
        "components:\n  Root:\n    nested: Nested\n",
    )?;

    let sources = SourceSet::load_dir(dir.path())?;
    let program = compile(&sources, "index.yaml")?;
    assert_eq!(program.local_component_names(), &["Root".to_string()]);
    assert!(program.contains("Nested"));
    Ok(())
}
