//! Spec-file loading tests
//!
//! Exercises the declarative scenario layer against the shipped specs
//! directory and against freshly written files.

use std::fs;
use std::path::PathBuf;

use tempfile::TempDir;

use timekeeper_e2e::scenarios::Scenario;
use timekeeper_e2e::spec::ScenarioSpec;
use timekeeper_e2e::step::PageStep;

fn shipped_specs_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("specs")
}

#[test]
fn shipped_specs_parse() {
    let specs = ScenarioSpec::load_all(&shipped_specs_dir()).unwrap();
    assert!(!specs.is_empty(), "specs/ should carry at least the smoke spec");

    let smoke = specs.iter().find(|s| s.name == "board-smoke").unwrap();
    assert!(smoke.tags.iter().any(|t| t == "smoke"));
    assert!(matches!(smoke.steps.first(), Some(PageStep::Navigate { .. })));
}

#[test]
fn shipped_specs_convert_to_runnable_scenarios() {
    let specs = ScenarioSpec::load_all(&shipped_specs_dir()).unwrap();

    for spec in &specs {
        let scenario = Scenario::from_spec(spec);
        assert_eq!(scenario.name(), spec.name);
        assert_eq!(scenario.steps().len(), spec.steps.len());
        assert!(!scenario.has_verify());
    }
}

#[test]
fn load_all_walks_nested_directories() {
    let dir = TempDir::new().unwrap();
    fs::create_dir_all(dir.path().join("nested")).unwrap();

    fs::write(
        dir.path().join("a.yaml"),
        r#"
name: first
steps:
  - action: navigate
    url: /
"#,
    )
    .unwrap();
    fs::write(
        dir.path().join("nested/b.yml"),
        r#"
name: second
steps:
  - action: log
    message: nested specs load too
"#,
    )
    .unwrap();
    fs::write(dir.path().join("notes.txt"), "not a spec").unwrap();

    let specs = ScenarioSpec::load_all(dir.path()).unwrap();
    let names: Vec<&str> = specs.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(specs.len(), 2);
    assert!(names.contains(&"first"));
    assert!(names.contains(&"second"));
}

#[test]
fn malformed_spec_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("broken.yaml"),
        r#"
name: broken
steps:
  - action: warp
    selector: 'tr'
"#,
    )
    .unwrap();

    assert!(ScenarioSpec::load_all(dir.path()).is_err());
}
