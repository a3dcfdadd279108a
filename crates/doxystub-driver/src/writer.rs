//! Placement of emitted units on disk.

use std::path::{Path, PathBuf};

use doxystub_core::EmittedUnit;
use log::debug;

use crate::error::{DriverError, Result};

/// Path of `unit` relative to the output directory.
pub fn unit_path(unit: &EmittedUnit) -> PathBuf {
    let mut path: PathBuf = unit.qualified_name.split('.').collect();
    if unit.is_package {
        path.push("__init__.pyi");
    } else {
        path.set_extension("pyi");
    }
    path
}

/// Full file contents: provenance comment, preamble, body.
pub fn unit_contents(unit: &EmittedUnit, relative: &Path, preamble: &[String]) -> String {
    let mut out = format!(
        "# file {} generated from {}\n",
        relative.display(),
        unit.source_id
    );
    for line in preamble {
        out.push_str(line);
        out.push('\n');
    }
    out.push('\n');
    out.push_str(&unit.text);
    if !unit.text.ends_with('\n') {
        out.push('\n');
    }
    out
}

/// Write `unit` below `dir`, creating intermediate directories.
pub fn write_unit(dir: &Path, unit: &EmittedUnit, preamble: &[String]) -> Result<PathBuf> {
    let relative = unit_path(unit);
    let path = dir.join(&relative);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| DriverError::Write {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    std::fs::write(&path, unit_contents(unit, &relative, preamble)).map_err(|source| {
        DriverError::Write {
            path: path.clone(),
            source,
        }
    })?;
    debug!(path:? = path, unit = unit.qualified_name.as_str(); "Wrote unit");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit(name: &str, is_package: bool) -> EmittedUnit {
        EmittedUnit {
            qualified_name: name.to_string(),
            source_id: "classogdf_1_1Graph".to_string(),
            is_package,
            text: "class Graph(object):\n    ...".to_string(),
        }
    }

    #[test]
    fn test_unit_path() {
        assert_eq!(unit_path(&unit("ogdf.Graph", false)), PathBuf::from("ogdf/Graph.pyi"));
        assert_eq!(unit_path(&unit("ogdf", true)), PathBuf::from("ogdf/__init__.pyi"));
        assert_eq!(
            unit_path(&unit("ogdf.Graph", true)),
            PathBuf::from("ogdf/Graph/__init__.pyi")
        );
    }

    #[test]
    fn test_unit_contents() {
        let u = unit("ogdf.Graph", false);
        let text = unit_contents(&u, &unit_path(&u), &["import enum".to_string()]);
        assert_eq!(
            text,
            "# file ogdf/Graph.pyi generated from classogdf_1_1Graph\n\
             import enum\n\
             \n\
             class Graph(object):\n    ...\n"
        );
    }
}
