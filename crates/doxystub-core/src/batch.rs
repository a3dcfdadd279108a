//! The batch arena.
//!
//! A [`Batch`] owns every entity and type expression built during one run,
//! together with the id registry and the diagnostic sets. Construction fills
//! it compound by compound; resolution and emission read it afterwards.

use std::collections::BTreeSet;

use rustc_hash::FxHashMap;
use smol_str::SmolStr;

use crate::entity::{EntityData, EntityId};
use crate::error::Result;
use crate::types::{TypeExpr, TypeId};
use crate::validate::Validator;

/// Placeholder for an entity that has neither a container nor a name.
const UNKNOWN_NAME: &str = "???";

/// Outcome of computing a qualified name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Qualification {
    Known(String),
    /// No container to qualify against; the local name stands in.
    Fallback(String),
}

impl Qualification {
    pub fn into_name(self) -> String {
        match self {
            Qualification::Known(name) | Qualification::Fallback(name) => name,
        }
    }
}

#[derive(Debug)]
pub struct Batch {
    entities: Vec<EntityData>,
    types: Vec<TypeExpr>,
    /// Source id to entity, filled at construction.
    by_source_id: FxHashMap<String, EntityId>,
    roots: Vec<EntityId>,
    pub(crate) unknown_member_kinds: BTreeSet<String>,
    pub(crate) unknown_node_kinds: BTreeSet<String>,
    pub(crate) validator: Validator,
}

impl Batch {
    pub fn new() -> Result<Self> {
        Ok(Self {
            entities: Vec::new(),
            types: Vec::new(),
            by_source_id: FxHashMap::default(),
            roots: Vec::new(),
            unknown_member_kinds: BTreeSet::new(),
            unknown_node_kinds: BTreeSet::new(),
            validator: Validator::new()?,
        })
    }

    pub(crate) fn push_entity(&mut self, data: EntityData) -> EntityId {
        let id = EntityId(self.entities.len() as u32);
        if let Some(source_id) = &data.source_id {
            self.by_source_id.insert(source_id.clone(), id);
        }
        self.entities.push(data);
        id
    }

    pub(crate) fn push_type(&mut self, expr: TypeExpr) -> TypeId {
        let id = TypeId(self.types.len() as u32);
        self.types.push(expr);
        id
    }

    pub(crate) fn push_root(&mut self, id: EntityId) {
        self.roots.push(id);
    }

    pub fn entity(&self, id: EntityId) -> &EntityData {
        &self.entities[id.0 as usize]
    }

    pub(crate) fn entity_mut(&mut self, id: EntityId) -> &mut EntityData {
        &mut self.entities[id.0 as usize]
    }

    pub fn type_expr(&self, id: TypeId) -> &TypeExpr {
        &self.types[id.0 as usize]
    }

    pub(crate) fn type_expr_mut(&mut self, id: TypeId) -> &mut TypeExpr {
        &mut self.types[id.0 as usize]
    }

    pub fn entity_ids(&self) -> impl Iterator<Item = EntityId> {
        (0..self.entities.len() as u32).map(EntityId)
    }

    pub fn type_ids(&self) -> impl Iterator<Item = TypeId> {
        (0..self.types.len() as u32).map(TypeId)
    }

    /// Top-level compounds in construction order.
    pub fn roots(&self) -> &[EntityId] {
        &self.roots
    }

    /// Look up an entity by the unique id of its declaration.
    pub fn lookup_source_id(&self, source_id: &str) -> Option<EntityId> {
        self.by_source_id.get(source_id).copied()
    }

    /// Top-level compound with the given qualified name.
    pub fn find_root(&self, qualified_name: &str) -> Option<EntityId> {
        self.roots
            .iter()
            .copied()
            .find(|&id| self.entity(id).entity.explicit_qualname() == Some(qualified_name))
    }

    /// Member of a class or namespace by rendered name; the first one for overloads.
    pub fn member_named(&self, class: EntityId, name: &str) -> Option<EntityId> {
        let class = self.entity(class).entity.as_class()?;
        class.namespace.get(name)?.first().copied()
    }

    /// All members of a class or namespace sharing a rendered name.
    pub fn members_named(&self, class: EntityId, name: &str) -> &[EntityId] {
        self.entity(class)
            .entity
            .as_class()
            .and_then(|class| class.namespace.get(name))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn qualification(&self, id: EntityId) -> Qualification {
        let data = self.entity(id);
        if let Some(qualname) = data.entity.explicit_qualname() {
            return Qualification::Known(qualname.to_string());
        }
        let name: &SmolStr = data.entity.name();
        match data.container {
            Some(container) => {
                Qualification::Known(format!("{}.{}", self.qualified_name(container), name))
            }
            None if name.contains('.') => Qualification::Known(name.to_string()),
            None if !name.is_empty() => Qualification::Fallback(name.to_string()),
            None => Qualification::Fallback(UNKNOWN_NAME.to_string()),
        }
    }

    pub fn qualified_name(&self, id: EntityId) -> String {
        self.qualification(id).into_name()
    }

    pub fn unknown_member_kinds(&self) -> &BTreeSet<String> {
        &self.unknown_member_kinds
    }

    pub fn unknown_node_kinds(&self) -> &BTreeSet<String> {
        &self.unknown_node_kinds
    }
}

#[cfg(test)]
impl Batch {
    pub(crate) fn push_test_class(&mut self, source_id: &str, qualname: &str) -> EntityId {
        use crate::entity::{Class, CompoundKind, Entity};

        let name = qualname.rsplit('.').next().unwrap_or(qualname);
        let id = self.push_entity(EntityData {
            container: None,
            brief: None,
            source_id: Some(source_id.to_string()),
            entity: Entity::Class(Class::new(qualname.to_string(), name.into(), CompoundKind::Class)),
        });
        self.push_root(id);
        id
    }
}
