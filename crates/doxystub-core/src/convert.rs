//! Construction of entities from the declaration tree.
//!
//! This is the first phase of a batch: every compound is turned into entities
//! and each entity passes the repair loop as soon as it exists. Nothing is
//! resolved here, since qualified names of later compounds are not known yet.

use doxystub_common::{Child, CompoundDef, EnumValueDef, Markup, MemberDef, ParamDef, Protection};
use indexmap::IndexMap;
use log::{debug, warn};
use smol_str::SmolStr;

use crate::entity::{
    Class, CompoundKind, Entity, EntityData, EntityId, Enum, Function, Member, Param, Receiver,
    TemplateParam, Variable, VariableKind,
};
use crate::error::Result;
use crate::render::{normalize_brief, CONSTRUCTOR};
use crate::translate::{translate, translate_default};
use crate::Batch;

/// Where members of the compound being built end up.
#[derive(Clone, Copy)]
struct Scope {
    /// Container assigned to members.
    container: Option<EntityId>,
    /// Kind of that container, deciding how functions receive `self`.
    kind: Option<CompoundKind>,
}

impl Batch {
    /// Build one compound unit and everything below it.
    ///
    /// Returns `None` for compounds of a kind the model does not handle.
    pub fn add_compound(&mut self, def: &CompoundDef) -> Result<Option<EntityId>> {
        let Some(kind) = CompoundKind::parse(&def.kind) else {
            warn!(kind = def.kind.as_str(), id = def.id.as_str(); "Skipping compound of unhandled kind");
            self.unknown_node_kinds.insert(format!("compounddef:{}", def.kind));
            return Ok(None);
        };
        let id = self.add_class(def, kind, None)?;
        self.push_root(id);
        Ok(Some(id))
    }

    fn add_class(
        &mut self,
        def: &CompoundDef,
        kind: CompoundKind,
        container: Option<EntityId>,
    ) -> Result<EntityId> {
        let name_ty = self.add_text_type(&def.name, container);
        let mut qualname = self.render_type(name_ty);
        if let Some(bracket) = qualname.find('[') {
            warn!(compound = qualname.as_str(); "Dropping generic arguments from compound name");
            qualname.truncate(bracket);
        }
        let name = SmolStr::new(qualname.rsplit('.').next().unwrap_or_default());

        let id = self.push_entity(EntityData {
            container,
            brief: normalize_brief(def.brief.as_deref()),
            source_id: Some(def.id.clone()),
            entity: Entity::Class(Class::new(qualname, name.clone(), kind)),
        });

        let bases = def
            .bases
            .iter()
            .map(|base| self.add_type(Some(base), Some(id), true))
            .collect();
        let generic = match &def.template_params {
            Some(params) => self.add_templates(params, container)?,
            None => Vec::new(),
        };

        let scope = if kind == CompoundKind::Group {
            let kind = container.and_then(|c| self.entity(c).entity.as_class().map(|class| class.kind));
            Scope { container, kind }
        } else {
            Scope {
                container: Some(id),
                kind: Some(kind),
            }
        };
        let mut members = Vec::new();
        let mut alias_templates = Vec::new();
        self.collect_members(&def.children, &name, scope, &mut members, &mut alias_templates)?;

        let mut templates = IndexMap::new();
        for template in generic.iter().chain(&alias_templates).copied() {
            templates.entry(self.render(template)).or_insert(template);
        }
        let mut namespace: IndexMap<SmolStr, Vec<EntityId>> = IndexMap::new();
        let mut subtypes = Vec::new();
        for member in &members {
            match *member {
                Member::Entity(member) => {
                    if let Entity::Function(function) = &self.entity(member).entity {
                        for &template in &function.templates {
                            templates.entry(self.render(template)).or_insert(template);
                        }
                    }
                    let data = self.entity_mut(member);
                    if let Entity::Function(function) = &mut data.entity {
                        if function.name == name {
                            function.name = SmolStr::new(CONSTRUCTOR);
                        }
                    }
                    let local = data.entity.name().clone();
                    namespace.entry(local).or_default().push(member);
                }
                Member::Subtype(ty) => subtypes.push(ty),
                Member::Header(_) => {}
            }
        }
        for group in namespace.values().filter(|group| group.len() > 1) {
            for &member in group {
                if let Entity::Function(function) = &mut self.entity_mut(member).entity {
                    function.overloaded = true;
                }
            }
        }

        if let Entity::Class(class) = &mut self.entity_mut(id).entity {
            class.bases = bases;
            class.generic = generic;
            class.templates = templates;
            class.members = members;
            class.namespace = namespace;
            class.subtypes = subtypes;
            class.is_package = def.has_inner_types();
        }
        self.check(id)?;
        debug!(compound = self.qualified_name(id).as_str(); "Constructed compound");
        Ok(id)
    }

    fn collect_members(
        &mut self,
        children: &[Child],
        owner: &str,
        scope: Scope,
        members: &mut Vec<Member>,
        alias_templates: &mut Vec<EntityId>,
    ) -> Result<()> {
        for child in children {
            match child {
                Child::Section { children, .. } => {
                    self.collect_members(children, owner, scope, members, alias_templates)?;
                }
                Child::Header { text } => members.push(Member::Header(text.clone())),
                Child::Member(member) => {
                    if member.prot == Protection::Private {
                        continue;
                    }
                    match member.kind.as_str() {
                        "variable" => members.push(Member::Entity(self.add_variable(member, scope)?)),
                        "function" => members.push(Member::Entity(self.add_function(member, scope)?)),
                        "typedef" => {
                            if let Some(params) = &member.template_params {
                                alias_templates.extend(self.add_templates(params, scope.container)?);
                            }
                            members.push(Member::Entity(self.add_typedef(member, scope)?));
                        }
                        "enum" => members.push(Member::Entity(self.add_enum(member, scope)?)),
                        "friend" => {}
                        other => {
                            warn!(owner = owner, kind = other, member = member.name.as_str(); "Skipping member of unhandled kind");
                            self.unknown_member_kinds.insert(other.to_string());
                        }
                    }
                }
                Child::InnerClass(markup) | Child::InnerNamespace(markup) => {
                    members.push(Member::Subtype(self.add_type(Some(markup), scope.container, true)));
                }
                Child::Location | Child::Includes => {}
                Child::Other { element } => {
                    warn!(owner = owner, element = element.as_str(); "Skipping unhandled element");
                    self.unknown_node_kinds.insert(element.clone());
                }
            }
        }
        Ok(())
    }

    fn add_param(&mut self, def: &ParamDef, index: usize, container: Option<EntityId>) -> Result<EntityId> {
        let ty = self.add_type(def.ty.as_ref(), container, true);
        let name = match def.declname.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => SmolStr::new(name),
            _ => SmolStr::new(format!("_{}", index)),
        };
        let default = def.defval.as_ref().map(|defval| {
            if self.render_type(ty).starts_with("Callable") {
                "print".to_string()
            } else {
                translate_default(defval)
            }
        });
        let id = self.push_entity(EntityData {
            container,
            brief: None,
            source_id: None,
            entity: Entity::Param(Param { name, ty, default }),
        });
        self.check(id)?;
        Ok(id)
    }

    fn add_templates(&mut self, params: &[ParamDef], container: Option<EntityId>) -> Result<Vec<EntityId>> {
        params
            .iter()
            .map(|param| self.add_template(param, container))
            .collect()
    }

    fn add_template(&mut self, def: &ParamDef, container: Option<EntityId>) -> Result<EntityId> {
        let name = template_name(def);
        let ignore = name.contains("enable_if");
        let id = self.push_entity(EntityData {
            container,
            brief: None,
            source_id: None,
            entity: Entity::Template(TemplateParam {
                name: SmolStr::new(name),
                ignore,
            }),
        });
        self.check(id)?;
        Ok(id)
    }

    fn add_function(&mut self, def: &MemberDef, scope: Scope) -> Result<EntityId> {
        let returns = self.add_type(def.ty.as_ref(), scope.container, true);
        let params = def
            .params
            .iter()
            .enumerate()
            .map(|(index, param)| self.add_param(param, index, scope.container))
            .collect::<Result<Vec<_>>>()?;
        let templates = match &def.template_params {
            Some(params) => self.add_templates(params, scope.container)?,
            None => Vec::new(),
        };
        let receiver = match scope.kind {
            Some(kind) if kind.has_scope() && def.is_static => Receiver::Static,
            Some(kind) if kind.has_scope() => Receiver::Instance,
            _ => Receiver::Free,
        };
        let id = self.push_entity(EntityData {
            container: scope.container,
            brief: normalize_brief(def.brief.as_deref()),
            source_id: def.id.clone(),
            entity: Entity::Function(Function {
                name: SmolStr::new(def.name.trim()),
                returns,
                params,
                templates,
                receiver,
                overloaded: false,
            }),
        });
        self.check(id)?;
        Ok(id)
    }

    fn add_variable(&mut self, def: &MemberDef, scope: Scope) -> Result<EntityId> {
        let ty = self.add_type(def.ty.as_ref(), scope.container, true);
        self.add_variable_entity(def, scope, VariableKind::Value { ty })
    }

    fn add_typedef(&mut self, def: &MemberDef, scope: Scope) -> Result<EntityId> {
        let target = self.add_type(def.ty.as_ref(), scope.container, true);
        self.add_variable_entity(def, scope, VariableKind::Alias { target })
    }

    fn add_variable_entity(&mut self, def: &MemberDef, scope: Scope, kind: VariableKind) -> Result<EntityId> {
        let id = self.push_entity(EntityData {
            container: scope.container,
            brief: normalize_brief(def.brief.as_deref()),
            source_id: def.id.clone(),
            entity: Entity::Variable(Variable {
                name: SmolStr::new(def.name.trim()),
                kind,
            }),
        });
        self.check(id)?;
        Ok(id)
    }

    fn add_enum(&mut self, def: &MemberDef, scope: Scope) -> Result<EntityId> {
        let name = SmolStr::new(def.name.trim());
        let qualname = match def.qualified_name.as_deref().map(translate) {
            Some(qualname) if !qualname.is_empty() => qualname,
            _ => match scope.container {
                Some(container) => format!("{}.{}", self.qualified_name(container), name),
                None => name.to_string(),
            },
        };
        let id = self.push_entity(EntityData {
            container: scope.container,
            brief: normalize_brief(def.brief.as_deref()),
            source_id: def.id.clone(),
            entity: Entity::Enum(Enum {
                qualname,
                name,
                strong: def.strong,
                values: Vec::new(),
            }),
        });
        let values = def
            .enum_values
            .iter()
            .map(|value| self.add_enum_value(value, id))
            .collect::<Result<Vec<_>>>()?;
        if let Entity::Enum(enumeration) = &mut self.entity_mut(id).entity {
            enumeration.values = values;
        }
        self.check(id)?;
        Ok(id)
    }

    fn add_enum_value(&mut self, def: &EnumValueDef, enumeration: EntityId) -> Result<EntityId> {
        let id = self.push_entity(EntityData {
            container: Some(enumeration),
            brief: normalize_brief(def.brief.as_deref()),
            source_id: def.id.clone(),
            entity: Entity::Variable(Variable {
                name: SmolStr::new(def.name.trim()),
                kind: VariableKind::EnumMember,
            }),
        });
        self.check(id)?;
        Ok(id)
    }
}

/// Declared name, else the type text after `class`/`typename`.
fn template_name(def: &ParamDef) -> String {
    let name = match def.declname.as_deref() {
        Some(declname) => declname.to_string(),
        None => {
            let ty = def.ty.as_ref();
            let text = ty.map(Markup::plain_text).unwrap_or_default();
            match text.trim().split_once(' ') {
                Some(("class" | "typename", rest)) => rest.to_string(),
                _ => ty.map(|ty| ty.text.clone()).unwrap_or_default(),
            }
        }
    };
    name.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn param(declname: Option<&str>, ty: &str) -> ParamDef {
        ParamDef {
            declname: declname.map(str::to_string),
            ty: Some(Markup::text(ty)),
            defval: None,
        }
    }

    #[test]
    fn test_template_name() {
        assert_eq!(template_name(&param(Some("T"), "typename")), "T");
        assert_eq!(template_name(&param(None, "typename Container")), "Container");
        assert_eq!(template_name(&param(None, "class  E")), "E");
        assert_eq!(template_name(&param(None, "int")), "int");
        assert_eq!(template_name(&ParamDef::default()), "");
    }

    #[test]
    fn test_unknown_compound_kind_is_recorded() {
        let mut batch = Batch::new().unwrap();
        let def = CompoundDef {
            id: "file_8h".into(),
            kind: "file".into(),
            prot: Protection::Public,
            name: "graph.h".into(),
            brief: None,
            bases: Vec::new(),
            template_params: None,
            children: Vec::new(),
        };
        assert_eq!(batch.add_compound(&def).unwrap(), None);
        assert!(batch.unknown_node_kinds().contains("compounddef:file"));
        assert!(batch.roots().is_empty());
    }
}
