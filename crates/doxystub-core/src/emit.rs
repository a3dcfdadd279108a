//! Emission of class and namespace bodies, and of whole top-level units.

use log::{debug, info};

use crate::entity::{Class, Entity, EntityId, Member};
use crate::error::{CoreError, Result};
use crate::render::{docstring, indent_block, py_repr, INDENT};
use crate::Batch;

/// A top-level entity rendered as a module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmittedUnit {
    pub qualified_name: String,
    /// Id of the declaration the unit was generated from.
    pub source_id: String,
    /// The unit declares nested types and becomes a package.
    pub is_package: bool,
    pub text: String,
}

impl Batch {
    pub(crate) fn render_class(&self, class: &Class, brief: Option<&str>) -> String {
        let mut blocks = Vec::new();
        let mut exports = Vec::new();
        let own_prefix = format!("{}.", class.qualname);

        for &subtype in &class.subtypes {
            if !self.type_is_set(subtype) {
                continue;
            }
            let rendered = self.render_type(subtype);
            let module = rendered.split('[').next().unwrap_or_default().to_string();
            blocks.push(format!("from {} import *", module));
            exports.push(module.strip_prefix(&own_prefix).unwrap_or(&module).to_string());
        }
        if class.kind.has_scope() {
            exports.push(class.name.to_string());
        } else {
            exports.extend(class.namespace.keys().map(|name| name.to_string()));
        }
        let exports: Vec<String> = exports.iter().map(|name| py_repr(name)).collect();
        blocks.push(format!("__all__ = [{}]", exports.join(", ")));

        let indent = if class.kind.has_scope() {
            blocks.extend(class.templates.values().map(|&template| self.render(template)));

            let mut bases: Vec<String> = class.bases.iter().map(|&base| self.render_type(base)).collect();
            let generic: Vec<String> = class
                .generic
                .iter()
                .filter(|&&template| {
                    !matches!(&self.entity(template).entity, Entity::Template(t) if t.ignore)
                })
                .map(|&template| self.entity(template).entity.name().to_string())
                .collect();
            if !generic.is_empty() {
                bases.push(format!("Generic[{}]", generic.join(", ")));
            }
            if bases.is_empty() {
                bases.push("object".to_string());
            }
            blocks.push(format!("class {}({}):", class.name, bases.join(", ")));
            INDENT
        } else {
            ""
        };

        if let Some(brief) = brief {
            blocks.push(indent_block(&docstring(brief), indent));
        }
        // Comments alone do not make a body.
        let mut statements = 0;
        for member in &class.members {
            match member {
                Member::Entity(id) => {
                    blocks.push(indent_block(&self.render(*id), indent));
                    statements += 1;
                }
                Member::Header(header) => blocks.push(indent_block(&header_comment(header), indent)),
                Member::Subtype(_) => {}
            }
        }
        if statements == 0 {
            blocks.push(format!("{}...", indent));
        }
        blocks.join("\n\n")
    }

    /// Render one top-level entity as a unit.
    pub fn emit(&self, root: EntityId) -> EmittedUnit {
        let data = self.entity(root);
        let is_package = data
            .entity
            .as_class()
            .is_some_and(|class| class.is_package);
        EmittedUnit {
            qualified_name: self.qualified_name(root),
            source_id: data.source_id.clone().unwrap_or_default(),
            is_package,
            text: self.render(root),
        }
    }

    /// Emit and re-validate every root, in construction order.
    pub fn emit_all(&mut self) -> Result<Vec<EmittedUnit>> {
        info!(units = self.roots().len(); "Emitting units");
        let mut units = Vec::with_capacity(self.roots().len());
        for root in self.roots().to_vec() {
            let unit = self.emit(root);
            if let Err(reason) = self.validator.validate(&unit.text) {
                return Err(CoreError::InvalidUnit {
                    qualified_name: unit.qualified_name,
                    rendering: unit.text,
                    reason,
                });
            }
            debug!(unit = unit.qualified_name.as_str(), bytes = unit.text.len(); "Emitted unit");
            units.push(unit);
        }
        Ok(units)
    }
}

fn header_comment(header: &str) -> String {
    let lines: Vec<String> = header.lines().map(|line| format!("# {}", line.trim_end())).collect();
    if lines.is_empty() {
        "#".to_string()
    } else {
        lines.join("\n")
    }
}
