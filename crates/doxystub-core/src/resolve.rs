//! Binding of type expressions to the declarations they name.
//!
//! Resolution runs after every compound of a batch has been constructed.
//! Entities register their qualified name in traversal order, so a name can
//! only bind to something visited earlier; direct reference ids bind to any
//! entity of the batch regardless of order.

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use rustc_hash::FxHashMap;

use crate::entity::{Entity, EntityId, Member};
use crate::types::{Part, TypeId};
use crate::Batch;

static DOTTED_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*(\.[A-Za-z_][A-Za-z0-9_]*)*$").unwrap());

/// Qualified name to entity, filled during resolution.
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    by_name: FxHashMap<String, EntityId>,
}

impl SymbolTable {
    pub fn get(&self, qualified_name: &str) -> Option<EntityId> {
        self.by_name.get(qualified_name).copied()
    }

    pub fn contains(&self, qualified_name: &str) -> bool {
        self.by_name.contains_key(qualified_name)
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    fn register(&mut self, qualified_name: String, id: EntityId) {
        self.by_name.insert(qualified_name, id);
    }
}

enum Visit {
    Type(TypeId),
    Entity(EntityId),
    Register,
}

/// Depth-first resolution pass over a batch.
pub struct Resolver<'a> {
    batch: &'a mut Batch,
    table: SymbolTable,
}

impl<'a> Resolver<'a> {
    pub fn new(batch: &'a mut Batch) -> Self {
        Self {
            batch,
            table: SymbolTable::default(),
        }
    }

    pub fn into_table(self) -> SymbolTable {
        self.table
    }

    /// Resolve an entity and everything it contains, registering names on the way.
    pub fn resolve_entity(&mut self, id: EntityId) {
        for visit in self.visits(id) {
            match visit {
                Visit::Type(ty) => bind_type(self.batch, &self.table, ty),
                Visit::Entity(child) => self.resolve_entity(child),
                Visit::Register => {
                    let qualified_name = self.batch.qualified_name(id);
                    self.table.register(qualified_name, id);
                }
            }
        }
    }

    fn visits(&self, id: EntityId) -> Vec<Visit> {
        match &self.batch.entity(id).entity {
            Entity::Class(class) => {
                let mut visits: Vec<Visit> = class.bases.iter().copied().map(Visit::Type).collect();
                visits.extend(class.members.iter().filter_map(|member| match member {
                    Member::Entity(child) => Some(Visit::Entity(*child)),
                    Member::Subtype(ty) => Some(Visit::Type(*ty)),
                    Member::Header(_) => None,
                }));
                visits.push(Visit::Register);
                visits
            }
            Entity::Function(function) => {
                let mut visits = vec![Visit::Type(function.returns)];
                visits.extend(function.params.iter().copied().map(Visit::Entity));
                visits.push(Visit::Register);
                visits
            }
            Entity::Variable(variable) => {
                let mut visits: Vec<Visit> = variable.type_expr().map(Visit::Type).into_iter().collect();
                visits.push(Visit::Register);
                visits
            }
            Entity::Enum(enumeration) => std::iter::once(Visit::Register)
                .chain(enumeration.values.iter().copied().map(Visit::Entity))
                .collect(),
            Entity::Param(param) => vec![Visit::Type(param.ty)],
            Entity::Template(_) => Vec::new(),
        }
    }
}

impl Batch {
    /// Resolve every root in construction order.
    pub fn resolve(&mut self) -> SymbolTable {
        let roots = self.roots().to_vec();
        let mut resolver = Resolver::new(self);
        for root in roots {
            resolver.resolve_entity(root);
        }
        resolver.into_table()
    }
}

/// Bind `ty` and its nested parts. Calling it again never rebinds.
pub(crate) fn bind_type(batch: &mut Batch, table: &SymbolTable, ty: TypeId) {
    let expr = batch.type_expr(ty);
    if expr.blank {
        return;
    }
    let nested: Vec<TypeId> = expr
        .parts
        .iter()
        .filter_map(|part| match part {
            Part::Nested(nested) => Some(*nested),
            Part::Text(_) => None,
        })
        .collect();
    for nested in nested {
        bind_type(batch, table, nested);
    }

    let expr = batch.type_expr(ty);
    if expr.target.is_some() {
        return;
    }
    let target = expr
        .refid
        .as_deref()
        .and_then(|refid| batch.lookup_source_id(refid))
        .or_else(|| lookup_by_name(batch, table, ty));
    if let Some(target) = target {
        debug!(ty = ty.0, target = batch.qualified_name(target).as_str(); "Bound type expression");
        batch.type_expr_mut(ty).target = Some(target);
    }
}

/// Name lookup for an expression made of a single part.
fn lookup_by_name(batch: &Batch, table: &SymbolTable, ty: TypeId) -> Option<EntityId> {
    let expr = batch.type_expr(ty);
    let [part] = expr.parts.as_slice() else {
        return None;
    };
    match part {
        Part::Nested(nested) => {
            let target = batch.type_expr(*nested).target?;
            table.get(&batch.qualified_name(target))
        }
        Part::Text(text) if DOTTED_NAME.is_match(text) => table.get(text).or_else(|| {
            let scope = batch.qualified_name(expr.container?);
            let found = enclosing_scopes(&scope).find_map(|scope| table.get(&format!("{}.{}", scope, text)));
            found
        }),
        Part::Text(_) => None,
    }
}

/// `a.b.c`, `a.b`, `a`.
fn enclosing_scopes(scope: &str) -> impl Iterator<Item = &str> {
    let mut rest = Some(scope);
    std::iter::from_fn(move || {
        let current = rest?;
        rest = current.rfind('.').map(|dot| &current[..dot]);
        Some(current)
    })
}

/// Resolve `ty`, then report whether it names a known declaration.
pub(crate) fn is_resolvable(batch: &mut Batch, table: &SymbolTable, ty: TypeId) -> bool {
    bind_type(batch, table, ty);
    let expr = batch.type_expr(ty);
    if expr.target.is_some() {
        return true;
    }
    match expr.parts.first() {
        Some(Part::Nested(nested)) => {
            let nested = *nested;
            is_resolvable(batch, table, nested)
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use doxystub_common::Markup;

    #[test]
    fn test_binds_by_reference_id() {
        let mut batch = Batch::new().unwrap();
        let graph = batch.push_test_class("classogdf_1_1Graph", "ogdf.Graph");
        let ty = batch.add_type(
            Some(&Markup::text("const ").with_child(Markup::reference("classogdf_1_1Graph", "Graph"), " &")),
            None,
            true,
        );
        let table = SymbolTable::default();
        bind_type(&mut batch, &table, ty);
        assert!(is_resolvable(&mut batch, &table, ty));
        assert_eq!(batch.render_type(ty), "ogdf.Graph");
        assert_eq!(batch.qualified_name(graph), "ogdf.Graph");
    }

    #[test]
    fn test_binds_by_name_in_enclosing_scope() {
        let mut batch = Batch::new().unwrap();
        let graph = batch.push_test_class("classogdf_1_1Graph", "ogdf.Graph");
        let node = batch.push_test_class("classogdf_1_1NodeElement", "ogdf.NodeElement");
        let mut table = SymbolTable::default();
        table.register("ogdf.NodeElement".into(), node);

        let ty = batch.add_text_type("NodeElement", Some(graph));
        bind_type(&mut batch, &table, ty);
        assert_eq!(batch.type_expr(ty).target, Some(node));

        let generic = batch.add_text_type("List[NodeElement]", Some(graph));
        bind_type(&mut batch, &table, generic);
        assert_eq!(batch.type_expr(generic).target, None);
        assert!(!is_resolvable(&mut batch, &table, generic));
    }

    #[test]
    fn test_enclosing_scopes() {
        let scopes: Vec<_> = enclosing_scopes("ogdf.Graph.Iter").collect();
        assert_eq!(scopes, ["ogdf.Graph.Iter", "ogdf.Graph", "ogdf"]);
    }

    #[test]
    fn test_binding_is_idempotent() {
        let mut batch = Batch::new().unwrap();
        let first = batch.push_test_class("a", "ns.First");
        let second = batch.push_test_class("b", "ns.Second");
        let mut table = SymbolTable::default();
        table.register("ns.Thing".into(), first);

        let ty = batch.add_text_type("ns.Thing", None);
        bind_type(&mut batch, &table, ty);
        table.register("ns.Thing".into(), second);
        bind_type(&mut batch, &table, ty);
        assert_eq!(batch.type_expr(ty).target, Some(first));
    }
}
