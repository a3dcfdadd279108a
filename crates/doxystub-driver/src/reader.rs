//! Loading of declaration exports.
//!
//! An export is a JSON file holding either a single compound or an array of
//! compounds. Directories contribute their `*.json` files in name order.

use std::path::{Path, PathBuf};

use doxystub_common::CompoundDef;
use log::debug;
use serde::Deserialize;

use crate::error::{DriverError, Result};

#[derive(Deserialize)]
#[serde(untagged)]
enum Export {
    Many(Vec<CompoundDef>),
    One(Box<CompoundDef>),
}

/// Expand directories into their JSON files, keeping the order of `paths`.
pub fn collect_inputs<P: AsRef<Path>>(paths: &[P]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for path in paths {
        let path = path.as_ref();
        if !path.is_dir() {
            files.push(path.to_path_buf());
            continue;
        }
        let entries = std::fs::read_dir(path).map_err(|source| DriverError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut found = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| DriverError::Read {
                path: path.to_path_buf(),
                source,
            })?;
            let file = entry.path();
            if file.is_file() && file.extension().is_some_and(|ext| ext == "json") {
                found.push(file);
            }
        }
        found.sort();
        files.extend(found);
    }
    Ok(files)
}

/// Read the compounds of one export file.
pub fn read_file(path: &Path) -> Result<Vec<CompoundDef>> {
    let content = std::fs::read_to_string(path).map_err(|source| DriverError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let compounds = parse_export(&content).map_err(|source| DriverError::ParseInput {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path:? = path, compounds = compounds.len(); "Read export");
    Ok(compounds)
}

/// Parse export text.
pub fn parse_export(content: &str) -> std::result::Result<Vec<CompoundDef>, serde_json::Error> {
    Ok(match serde_json::from_str(content)? {
        Export::Many(compounds) => compounds,
        Export::One(compound) => vec![*compound],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A single compound and an array of compounds are both accepted.
    #[test]
    fn test_parse_single_and_array() {
        let one = r#"{"id": "a", "kind": "class", "name": "ogdf::A"}"#;
        let many = r#"[{"id": "a", "kind": "class", "name": "ogdf::A"},
                       {"id": "b", "kind": "namespace", "name": "ogdf"}]"#;

        let parsed = parse_export(one).expect("Failed to parse single compound");
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].name, "ogdf::A");

        let parsed = parse_export(many).expect("Failed to parse compound array");
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[1].kind, "namespace");
    }

    #[test]
    fn test_parse_garbage() {
        assert!(parse_export("{\"kind\": 3}").is_err());
        assert!(parse_export("not json").is_err());
    }
}
