//! Batch pipeline: read declaration exports, translate them, write stubs.

mod config;
mod error;
pub mod reader;
pub mod writer;

pub use config::{FormatConfig, InputConfig, OutputConfig, StubConfig};
pub use doxystub_core::{BatchOutput, BatchReport, EmittedUnit};
pub use error::{DriverError, Result};

use std::path::{Path, PathBuf};
use std::process::Command;

use doxystub_common::{CompoundDef, DiagnosticLevel, Protection};
use log::{debug, info, warn};

/// Orchestrates one stub generation run.
#[derive(Debug, Clone, Default)]
pub struct Driver {
    config: StubConfig,
}

impl Driver {
    pub fn new(config: StubConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &StubConfig {
        &self.config
    }

    /// Read every compound of the given files and directories, in order.
    pub fn load<P: AsRef<Path>>(&self, paths: &[P]) -> Result<Vec<CompoundDef>> {
        let mut compounds = Vec::new();
        for file in reader::collect_inputs(paths)? {
            compounds.extend(reader::read_file(&file)?);
        }
        info!(compounds = compounds.len(); "Loaded declarations");
        Ok(compounds)
    }

    /// Keep the compounds this configuration translates.
    pub fn select(&self, compounds: Vec<CompoundDef>) -> Vec<CompoundDef> {
        let total = compounds.len();
        let selected: Vec<_> = compounds
            .into_iter()
            .filter(|compound| self.is_selected(compound))
            .collect();
        debug!(total = total, selected = selected.len(); "Selected compounds");
        selected
    }

    fn is_selected(&self, compound: &CompoundDef) -> bool {
        let input = &self.config.input;
        if compound.prot == Protection::Private || !input.kinds.iter().any(|k| *k == compound.kind) {
            return false;
        }
        let root = input.root_namespace.as_str();
        if root.is_empty() {
            return true;
        }
        let name = compound.name.trim_start_matches("::");
        name == root || name.strip_prefix(root).is_some_and(|rest| rest.starts_with("::"))
    }

    /// Translate the selected compounds.
    pub fn run(&self, compounds: &[CompoundDef]) -> Result<BatchOutput> {
        Ok(doxystub_core::generate(compounds)?)
    }

    /// Write every unit below `dir`; returns the written paths.
    pub fn write(&self, output: &BatchOutput, dir: &Path) -> Result<Vec<PathBuf>> {
        let mut written = Vec::with_capacity(output.units.len());
        for unit in &output.units {
            written.push(writer::write_unit(dir, unit, &self.config.output.preamble)?);
        }
        info!(units = written.len(), dir:? = dir; "Wrote stubs");
        Ok(written)
    }

    /// Run the configured formatter over `dir`.
    pub fn format(&self, dir: &Path) -> Result<()> {
        let Some((program, args)) = self
            .config
            .format
            .command
            .as_deref()
            .and_then(|command| command.split_first())
        else {
            return Ok(());
        };

        let mut cmd = Command::new(program);
        cmd.args(args);
        cmd.arg(dir);

        let output = match cmd.output() {
            Ok(output) => output,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(program = program.as_str(); "Formatter not found, leaving output unformatted");
                return Ok(());
            }
            Err(source) => {
                return Err(DriverError::Spawn {
                    command: program.clone(),
                    source,
                })
            }
        };

        if !output.status.success() {
            return Err(DriverError::Format {
                command: program.clone(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }
        debug!(program = program.as_str(); "Formatted output");
        Ok(())
    }

    /// Load, select, translate, write and format.
    pub fn generate<P: AsRef<Path>>(&self, paths: &[P]) -> Result<BatchOutput> {
        let compounds = self.select(self.load(paths)?);
        let output = self.run(&compounds)?;
        let dir = &self.config.output.dir;
        self.write(&output, dir)?;
        self.format(dir)?;
        log_report(&output.report);
        Ok(output)
    }
}

/// Find the unit generated for `qualified_name`.
pub fn find_unit<'a>(output: &'a BatchOutput, qualified_name: &str) -> Result<&'a EmittedUnit> {
    output
        .units
        .iter()
        .find(|unit| unit.qualified_name == qualified_name)
        .ok_or_else(|| DriverError::UnitNotFound(qualified_name.to_string()))
}

/// Log the end-of-run summary.
pub fn log_report(report: &BatchReport) {
    if report.is_clean() {
        info!("Batch finished without diagnostics");
        return;
    }
    for diagnostic in report.diagnostics() {
        match diagnostic.level {
            DiagnosticLevel::Error | DiagnosticLevel::Warning => warn!("{}", diagnostic),
            DiagnosticLevel::Info => info!("{}", diagnostic),
        }
    }
    info!(
        unresolved = report.unresolved_types.len(),
        unqualified = report.unqualified.len();
        "Batch finished"
    );
}
