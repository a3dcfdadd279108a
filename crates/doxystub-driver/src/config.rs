//! Batch configuration types (doxystub.toml format).

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{DriverError, Result};

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StubConfig {
    /// Which compounds to translate.
    #[serde(default)]
    pub input: InputConfig,

    /// Where and how units are written.
    #[serde(default)]
    pub output: OutputConfig,

    /// External formatter run over the output.
    #[serde(default)]
    pub format: FormatConfig,
}

/// Compound selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputConfig {
    /// Compounds outside this namespace are skipped; empty keeps all.
    #[serde(default = "default_root_namespace")]
    pub root_namespace: String,

    /// Compound kinds to translate.
    #[serde(default = "default_kinds")]
    pub kinds: Vec<String>,
}

/// Output layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Output directory.
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,

    /// Lines written after the provenance comment of every unit.
    #[serde(default = "default_preamble")]
    pub preamble: Vec<String>,
}

/// Formatter invocation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FormatConfig {
    /// Program and arguments; the output directory is appended.
    #[serde(default)]
    pub command: Option<Vec<String>>,
}

fn default_root_namespace() -> String {
    "ogdf".to_string()
}

fn default_kinds() -> Vec<String> {
    ["class", "struct", "namespace"].map(String::from).to_vec()
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("stubs")
}

fn default_preamble() -> Vec<String> {
    ["import enum", "from typing import *"].map(String::from).to_vec()
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            root_namespace: default_root_namespace(),
            kinds: default_kinds(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            preamble: default_preamble(),
        }
    }
}

impl StubConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| DriverError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_str(&content)
    }

    /// Parse configuration from TOML text.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Override the output directory.
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output.dir = dir.into();
        self
    }

    /// Drop the formatter.
    pub fn without_formatter(mut self) -> Self {
        self.format.command = None;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let toml = r#"
[input]
root_namespace = "ogdf"
kinds = ["class", "struct"]

[output]
dir = "stubs/ogdf_python"
preamble = ["import enum", "from typing import *", "import ogdf_python.ogdf as ogdf"]

[format]
command = ["black", "-q"]
"#;
        let config = StubConfig::from_str(toml).unwrap();
        assert_eq!(config.input.kinds, ["class", "struct"]);
        assert_eq!(config.output.dir, PathBuf::from("stubs/ogdf_python"));
        assert_eq!(config.output.preamble.len(), 3);
        assert_eq!(
            config.format.command,
            Some(vec!["black".to_string(), "-q".to_string()])
        );
    }

    #[test]
    fn test_defaults() {
        let config = StubConfig::from_str("").unwrap();
        assert_eq!(config, StubConfig::default());
        assert_eq!(config.input.root_namespace, "ogdf");
        assert_eq!(config.input.kinds, ["class", "struct", "namespace"]);
        assert_eq!(config.output.preamble, ["import enum", "from typing import *"]);
        assert!(config.format.command.is_none());
    }

    #[test]
    fn test_partial_section_keeps_other_defaults() {
        let config = StubConfig::from_str("[output]\ndir = \"out\"\n").unwrap();
        assert_eq!(config.output.dir, PathBuf::from("out"));
        assert_eq!(config.output.preamble, default_preamble());
    }

    #[test]
    fn test_overrides() {
        let config = StubConfig::from_str("[format]\ncommand = [\"black\"]\n")
            .unwrap()
            .with_output_dir("elsewhere")
            .without_formatter();
        assert_eq!(config.output.dir, PathBuf::from("elsewhere"));
        assert!(config.format.command.is_none());
    }

    #[test]
    fn test_invalid_toml() {
        assert!(matches!(
            StubConfig::from_str("[input\n"),
            Err(DriverError::ParseToml(_))
        ));
    }
}
