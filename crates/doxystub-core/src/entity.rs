//! Declaration entities.
//!
//! Every entity lives in the [`Batch`](crate::Batch) arena and is referred to
//! by [`EntityId`]. Containers and resolved type targets are plain ids, so the
//! container/contained cycle never turns into an ownership cycle.

use indexmap::IndexMap;
use smol_str::SmolStr;

use crate::repair::Repair;
use crate::types::TypeId;

/// Stable index of an entity in its batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub(crate) u32);

/// Fields shared by every entity.
#[derive(Debug, Clone)]
pub struct EntityData {
    /// Owning scope. Never owned by the entity.
    pub container: Option<EntityId>,
    pub brief: Option<String>,
    /// Unique id of the declaration in the export.
    pub source_id: Option<String>,
    pub entity: Entity,
}

#[derive(Debug, Clone)]
pub enum Entity {
    Param(Param),
    Template(TemplateParam),
    Function(Function),
    Variable(Variable),
    Enum(Enum),
    Class(Class),
}

impl Entity {
    /// Name of the variant, used in diagnostics.
    pub fn class_name(&self) -> &'static str {
        match self {
            Entity::Param(_) => "Param",
            Entity::Template(_) => "Template",
            Entity::Function(_) => "Function",
            Entity::Variable(_) => "Variable",
            Entity::Enum(_) => "Enum",
            Entity::Class(_) => "Class",
        }
    }

    /// Local (unqualified) name.
    pub fn name(&self) -> &SmolStr {
        match self {
            Entity::Param(p) => &p.name,
            Entity::Template(t) => &t.name,
            Entity::Function(f) => &f.name,
            Entity::Variable(v) => &v.name,
            Entity::Enum(e) => &e.name,
            Entity::Class(c) => &c.name,
        }
    }

    pub(crate) fn name_mut(&mut self) -> &mut SmolStr {
        match self {
            Entity::Param(p) => &mut p.name,
            Entity::Template(t) => &mut t.name,
            Entity::Function(f) => &mut f.name,
            Entity::Variable(v) => &mut v.name,
            Entity::Enum(e) => &mut e.name,
            Entity::Class(c) => &mut c.name,
        }
    }

    /// Qualified name fixed at construction, if the variant carries one.
    pub fn explicit_qualname(&self) -> Option<&str> {
        match self {
            Entity::Enum(e) => Some(&e.qualname),
            Entity::Class(c) => Some(&c.qualname),
            _ => None,
        }
    }

    /// Ordered repair strategies tried when the rendering does not validate.
    pub fn repairs(&self) -> &'static [Repair] {
        match self {
            Entity::Param(_) => Repair::PARAM,
            Entity::Template(_) => Repair::TEMPLATE,
            Entity::Function(_) => Repair::FUNCTION,
            Entity::Variable(_) => Repair::VARIABLE,
            Entity::Enum(_) | Entity::Class(_) => Repair::NAME,
        }
    }

    pub fn as_variable(&self) -> Option<&Variable> {
        match self {
            Entity::Variable(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_enum(&self) -> Option<&Enum> {
        match self {
            Entity::Enum(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_class(&self) -> Option<&Class> {
        match self {
            Entity::Class(c) => Some(c),
            _ => None,
        }
    }
}

/// A function parameter.
#[derive(Debug, Clone)]
pub struct Param {
    pub name: SmolStr,
    pub ty: TypeId,
    /// Translated default value; empty means none.
    pub default: Option<String>,
}

/// A template parameter.
#[derive(Debug, Clone)]
pub struct TemplateParam {
    pub name: SmolStr,
    /// Encodes a constraint (`enable_if`) rather than a type variable.
    pub ignore: bool,
}

/// How a function receives its instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Receiver {
    /// Member function taking `self`.
    Instance,
    /// Static member function.
    Static,
    /// Namespace-level function.
    Free,
}

#[derive(Debug, Clone)]
pub struct Function {
    pub name: SmolStr,
    pub returns: TypeId,
    pub params: Vec<EntityId>,
    pub templates: Vec<EntityId>,
    pub receiver: Receiver,
    /// Set by the owning scope once all siblings are known.
    pub overloaded: bool,
}

/// What a variable declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariableKind {
    /// `name: T = ...`
    Value { ty: TypeId },
    /// `name = enum.auto()`
    EnumMember,
    /// `name: TypeAlias = T`
    Alias { target: TypeId },
}

#[derive(Debug, Clone)]
pub struct Variable {
    pub name: SmolStr,
    pub kind: VariableKind,
}

impl Variable {
    /// The type expression the variable carries, if any.
    pub fn type_expr(&self) -> Option<TypeId> {
        match self.kind {
            VariableKind::Value { ty } => Some(ty),
            VariableKind::Alias { target } => Some(target),
            VariableKind::EnumMember => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Enum {
    pub qualname: String,
    pub name: SmolStr,
    /// Scoped enumeration; plain ones are integer backed.
    pub strong: bool,
    pub values: Vec<EntityId>,
}

/// Kind of a compound scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompoundKind {
    Class,
    Struct,
    Union,
    Namespace,
    /// Transparent grouping: members belong to the enclosing namespace.
    Group,
}

impl CompoundKind {
    pub fn parse(kind: &str) -> Option<Self> {
        match kind {
            "class" => Some(CompoundKind::Class),
            "struct" => Some(CompoundKind::Struct),
            "union" => Some(CompoundKind::Union),
            "namespace" => Some(CompoundKind::Namespace),
            "group" => Some(CompoundKind::Group),
            _ => None,
        }
    }

    /// Whether the compound renders its own `class` block.
    pub fn has_scope(self) -> bool {
        matches!(self, CompoundKind::Class | CompoundKind::Struct | CompoundKind::Union)
    }
}

/// An entry of a class body, in document order.
#[derive(Debug, Clone)]
pub enum Member {
    Entity(EntityId),
    /// Reference to a nested class or namespace.
    Subtype(TypeId),
    /// Section header, rendered as a comment.
    Header(String),
}

#[derive(Debug, Clone)]
pub struct Class {
    pub qualname: String,
    pub name: SmolStr,
    pub kind: CompoundKind,
    pub bases: Vec<TypeId>,
    /// The class's own template parameters.
    pub generic: Vec<EntityId>,
    /// Own template parameters plus those of templated members, keyed by rendering.
    pub templates: IndexMap<String, EntityId>,
    pub members: Vec<Member>,
    /// Members by rendered name, for overload detection and exports.
    pub namespace: IndexMap<SmolStr, Vec<EntityId>>,
    pub subtypes: Vec<TypeId>,
    /// Declares nested classes or namespaces and is emitted as a package.
    pub is_package: bool,
}

impl Class {
    pub(crate) fn new(qualname: String, name: SmolStr, kind: CompoundKind) -> Self {
        Self {
            qualname,
            name,
            kind,
            bases: Vec::new(),
            generic: Vec::new(),
            templates: IndexMap::new(),
            members: Vec::new(),
            namespace: IndexMap::new(),
            subtypes: Vec::new(),
            is_package: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compound_kind_parse() {
        assert_eq!(CompoundKind::parse("struct"), Some(CompoundKind::Struct));
        assert_eq!(CompoundKind::parse("group"), Some(CompoundKind::Group));
        assert_eq!(CompoundKind::parse("file"), None);
        assert!(CompoundKind::Union.has_scope());
        assert!(!CompoundKind::Namespace.has_scope());
        assert!(!CompoundKind::Group.has_scope());
    }

    #[test]
    fn test_repair_tables_per_variant() {
        let class = Entity::Class(Class::new("a.B".into(), "B".into(), CompoundKind::Class));
        assert_eq!(class.repairs(), Repair::NAME);
        assert_eq!(class.class_name(), "Class");
        assert_eq!(class.explicit_qualname(), Some("a.B"));
    }
}
