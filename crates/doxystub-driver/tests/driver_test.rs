//! End-to-end tests of the batch pipeline on temporary directories.

use std::fs;
use std::path::Path;

use doxystub_driver::{find_unit, Driver, DriverError, StubConfig};
use serde_json::json;

fn graph_json() -> serde_json::Value {
    json!({
        "id": "classogdf_1_1Graph",
        "kind": "class",
        "name": "ogdf::Graph",
        "children": [
            {"tag": "section", "kind": "public-func", "children": [
                {"tag": "member", "kind": "function", "id": "g_nodes", "name": "numberOfNodes",
                 "type": "int"}
            ]}
        ]
    })
}

fn namespace_json() -> serde_json::Value {
    json!({
        "id": "namespaceogdf",
        "kind": "namespace",
        "name": "ogdf",
        "children": [
            {"tag": "inner_class", "refid": "classogdf_1_1Graph", "text": "ogdf::Graph"}
        ]
    })
}

fn write_json(dir: &Path, name: &str, value: &serde_json::Value) {
    fs::write(dir.join(name), value.to_string()).expect("Failed to write fixture");
}

fn driver(out: &Path) -> Driver {
    Driver::new(StubConfig::default().with_output_dir(out))
}

/// Directories contribute their JSON files in name order; other files are ignored.
#[test]
fn test_load_directory_in_order() {
    let input = tempfile::tempdir().expect("Failed to create temp dir");
    write_json(input.path(), "b.json", &graph_json());
    write_json(input.path(), "a.json", &json!([namespace_json()]));
    fs::write(input.path().join("notes.txt"), "ignored").expect("Failed to write notes");

    let driver = Driver::default();
    let compounds = driver.load(&[input.path()]).expect("Failed to load");
    let names: Vec<_> = compounds.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, ["ogdf", "ogdf::Graph"]);
}

/// A malformed export names the offending file.
#[test]
fn test_load_reports_bad_file() {
    let input = tempfile::tempdir().expect("Failed to create temp dir");
    let path = input.path().join("broken.json");
    fs::write(&path, "{").expect("Failed to write fixture");

    match Driver::default().load(&[&path]) {
        Err(DriverError::ParseInput { path: reported, .. }) => assert_eq!(reported, path),
        other => panic!("expected a parse error, got {:?}", other),
    }
}

/// Selection keeps configured kinds inside the root namespace that are not private.
#[test]
fn test_select() {
    let compounds: Vec<_> = [
        graph_json(),
        json!({"id": "f", "kind": "file", "name": "Graph.h"}),
        json!({"id": "s", "kind": "struct", "name": "std::pair"}),
        json!({"id": "x", "kind": "class", "name": "ogdfx::Other"}),
        json!({"id": "p", "kind": "class", "name": "ogdf::Hidden", "prot": "private"}),
    ]
    .into_iter()
    .map(|v| serde_json::from_value(v).expect("Failed to deserialize compound"))
    .collect();

    let selected = Driver::default().select(compounds.clone());
    let ids: Vec<_> = selected.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, ["classogdf_1_1Graph"]);

    let mut config = StubConfig::default();
    config.input.root_namespace.clear();
    let selected = Driver::new(config).select(compounds);
    assert_eq!(selected.len(), 3);
}

/// A full run writes one file per unit with the provenance header and preamble.
#[test]
fn test_generate_writes_units() {
    let input = tempfile::tempdir().expect("Failed to create temp dir");
    let out = tempfile::tempdir().expect("Failed to create temp dir");
    write_json(input.path(), "all.json", &json!([namespace_json(), graph_json()]));

    let driver = driver(out.path());
    let output = driver.generate(&[input.path()]).expect("Failed to generate");
    assert_eq!(output.units.len(), 2);

    let package = fs::read_to_string(out.path().join("ogdf/__init__.pyi"))
        .expect("Failed to read package unit");
    assert!(package.starts_with(
        "# file ogdf/__init__.pyi generated from namespaceogdf\nimport enum\nfrom typing import *\n"
    ));
    assert!(package.contains("from ogdf.Graph import *"));

    let class = fs::read_to_string(out.path().join("ogdf/Graph.pyi")).expect("Failed to read class unit");
    assert!(class.starts_with("# file ogdf/Graph.pyi generated from classogdf_1_1Graph\n"));
    assert!(class.contains("def numberOfNodes(self) -> int:"));
}

/// Looking up a unit that was not generated is an error.
#[test]
fn test_find_unit() {
    let compounds = vec![serde_json::from_value(graph_json()).expect("Failed to deserialize compound")];
    let output = Driver::default().run(&compounds).expect("Failed to run");

    let unit = find_unit(&output, "ogdf.Graph").expect("Missing unit");
    assert_eq!(unit.source_id, "classogdf_1_1Graph");
    assert!(matches!(
        find_unit(&output, "ogdf.Tree"),
        Err(DriverError::UnitNotFound(name)) if name == "ogdf.Tree"
    ));
}

/// A formatter that is not installed only warns.
#[test]
fn test_missing_formatter_is_not_fatal() {
    let out = tempfile::tempdir().expect("Failed to create temp dir");
    let mut config = StubConfig::default();
    config.format.command = Some(vec!["doxystub-no-such-formatter".to_string()]);

    Driver::new(config).format(out.path()).expect("Missing formatter should not fail");
}

/// A formatter exiting with failure aborts.
#[cfg(unix)]
#[test]
fn test_failing_formatter_is_fatal() {
    let out = tempfile::tempdir().expect("Failed to create temp dir");
    let mut config = StubConfig::default();
    config.format.command = Some(vec!["false".to_string()]);

    assert!(matches!(
        Driver::new(config).format(out.path()),
        Err(DriverError::Format { .. })
    ));
}
