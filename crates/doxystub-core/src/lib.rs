//! Translation of C++ API declarations into Python stub declarations.
//!
//! This crate provides:
//! - the token translator from C++ type text to Python typing vocabulary
//! - type expressions that keep references to the declarations they name
//! - declaration entities, each checked by the identifier repair loop
//! - the two-phase symbol registry and resolver
//! - emission of top-level units as stub modules
//!
//! # Architecture
//!
//! ```text
//! CompoundDef → construct + repair → resolve → emit → EmittedUnit
//! ```
//!
//! All entities and type expressions of a run live in one [`Batch`]. Phase 1
//! ([`Batch::add_compound`]) must finish for every compound before phase 2
//! ([`Batch::resolve`]) starts, because names register in traversal order.

mod batch;
mod convert;
mod emit;
mod entity;
mod error;
mod render;
mod repair;
mod report;
mod resolve;
mod translate;
mod types;
mod validate;

pub use batch::{Batch, Qualification};
pub use emit::EmittedUnit;
pub use entity::{
    Class, CompoundKind, Entity, EntityData, EntityId, Enum, Function, Member, Param, Receiver,
    TemplateParam, Variable, VariableKind,
};
pub use error::{CoreError, Result};
pub use repair::Repair;
pub use report::BatchReport;
pub use resolve::{Resolver, SymbolTable};
pub use translate::{translate, translate_default};
pub use types::{Part, TypeExpr, TypeId, ANY};
pub use validate::{SyntaxError, Validator};

use doxystub_common::CompoundDef;
use log::info;

/// Output of a complete in-memory run.
#[derive(Debug)]
pub struct BatchOutput {
    pub units: Vec<EmittedUnit>,
    pub report: BatchReport,
    pub symbols: SymbolTable,
}

/// Run both phases over `compounds` in order, then emit every unit.
pub fn generate(compounds: &[CompoundDef]) -> Result<BatchOutput> {
    let mut batch = Batch::new()?;
    info!(compounds = compounds.len(); "Constructing entities");
    for compound in compounds {
        batch.add_compound(compound)?;
    }
    info!(roots = batch.roots().len(); "Resolving names");
    let symbols = batch.resolve();
    let units = batch.emit_all()?;
    let report = batch.report(&symbols);
    Ok(BatchOutput {
        units,
        report,
        symbols,
    })
}
