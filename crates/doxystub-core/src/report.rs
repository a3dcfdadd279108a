//! Aggregated diagnostics of a finished batch.

use std::collections::{BTreeMap, BTreeSet};

use doxystub_common::{Diagnostic, DiagnosticKind};
use log::warn;

use crate::batch::Qualification;
use crate::entity::Entity;
use crate::resolve::{is_resolvable, SymbolTable};
use crate::Batch;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub unknown_member_kinds: BTreeSet<String>,
    pub unknown_node_kinds: BTreeSet<String>,
    /// Rendering of every type that bound to nothing, mapped to its raw text.
    pub unresolved_types: BTreeMap<String, String>,
    /// Entities that fell back to their local name.
    pub unqualified: Vec<String>,
}

impl BatchReport {
    pub fn is_clean(&self) -> bool {
        self.unknown_member_kinds.is_empty()
            && self.unknown_node_kinds.is_empty()
            && self.unresolved_types.is_empty()
            && self.unqualified.is_empty()
    }

    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        let mut out = Vec::new();
        for kind in &self.unknown_member_kinds {
            out.push(
                Diagnostic::warning(DiagnosticKind::Unclassified, format!("unhandled member kind '{}'", kind))
                    .with_help("members of this kind were skipped"),
            );
        }
        for kind in &self.unknown_node_kinds {
            out.push(
                Diagnostic::warning(DiagnosticKind::Unclassified, format!("unhandled element '{}'", kind))
                    .with_help("elements of this kind were skipped"),
            );
        }
        for entity in &self.unqualified {
            out.push(Diagnostic::warning(
                DiagnosticKind::Qualification,
                format!("no qualified name for {}", entity),
            ));
        }
        for (rendering, raw) in &self.unresolved_types {
            out.push(Diagnostic::info(
                DiagnosticKind::UnresolvedType,
                format!("unresolved type {} (from {:?})", rendering, raw),
            ));
        }
        out
    }
}

impl Batch {
    /// Collect the diagnostics of a resolved batch.
    ///
    /// Probing resolvability binds what the finished table can still bind.
    pub fn report(&mut self, table: &SymbolTable) -> BatchReport {
        let mut unresolved_types = BTreeMap::new();
        for ty in self.type_ids().collect::<Vec<_>>() {
            if !self.type_expr(ty).reported || !self.type_is_set(ty) || is_resolvable(self, table, ty) {
                continue;
            }
            unresolved_types.insert(self.render_type(ty), self.type_expr(ty).raw.trim().to_string());
        }

        let mut unqualified = Vec::new();
        for id in self.entity_ids() {
            let data = self.entity(id);
            if matches!(data.entity, Entity::Param(_) | Entity::Template(_)) {
                continue;
            }
            if let Qualification::Fallback(name) = self.qualification(id) {
                warn!(entity = name.as_str(), class = data.entity.class_name(); "Entity has no qualified name");
                unqualified.push(format!("{} '{}'", data.entity.class_name(), name));
            }
        }

        BatchReport {
            unknown_member_kinds: self.unknown_member_kinds.clone(),
            unknown_node_kinds: self.unknown_node_kinds.clone(),
            unresolved_types,
            unqualified,
        }
    }
}
