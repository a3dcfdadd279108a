//! The identifier repair loop.
//!
//! Right after construction every entity is rendered and parsed. While the
//! rendering is rejected, the strategy for the current attempt is applied and
//! the entity is rendered again. Running out of strategies is fatal.

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use rustc_hash::FxHashMap;
use smol_str::SmolStr;

use crate::entity::{Entity, EntityId, Receiver};
use crate::error::{CoreError, Result};
use crate::translate::translate;
use crate::types::{unparseable, TypeId};
use crate::Batch;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Repair {
    /// Rename an operator to its protocol method.
    OperatorName,
    /// `operator TYPE` becomes `__TYPE__`.
    ConversionOperator,
    /// `~Name` becomes `__destruct__`.
    Destructor,
    PrefixUnderscore,
    /// Drop the first character and every non-letter after it.
    StripNonAlphabetic,
    /// Replace the default value by `...`.
    ElideDefault,
    /// Replace the entity's type by the unparseable marker.
    OpaqueType,
}

impl Repair {
    pub const PARAM: &'static [Repair] =
        &[Repair::PrefixUnderscore, Repair::ElideDefault, Repair::OpaqueType];
    pub const TEMPLATE: &'static [Repair] = &[Repair::PrefixUnderscore];
    pub const FUNCTION: &'static [Repair] = &[
        Repair::OperatorName,
        Repair::ConversionOperator,
        Repair::Destructor,
        Repair::PrefixUnderscore,
        Repair::StripNonAlphabetic,
        Repair::OpaqueType,
    ];
    pub const VARIABLE: &'static [Repair] = &[
        Repair::PrefixUnderscore,
        Repair::StripNonAlphabetic,
        Repair::PrefixUnderscore,
        Repair::OpaqueType,
    ];
    /// Enums, classes and namespaces.
    pub const NAME: &'static [Repair] = &[
        Repair::PrefixUnderscore,
        Repair::StripNonAlphabetic,
        Repair::PrefixUnderscore,
    ];
}

static OPERATORS: Lazy<FxHashMap<&'static str, &'static str>> = Lazy::new(|| {
    [
        ("operator+", "__add__"),
        ("operator-", "__sub__"),
        ("operator*", "__mul__"),
        ("operator/", "__truediv__"),
        ("operator++", "__preinc__"),
        ("operator--", "__predec__"),
        ("operator[]", "__getitem__"),
        ("operator()", "__call__"),
        ("operator%", "__mod__"),
        ("operator**", "__pow__"),
        ("operator<<", "__lshift__"),
        ("operator>>", "__rshift__"),
        ("operator&", "__and__"),
        ("operator&&", "__dand__"),
        ("operator|", "__or__"),
        ("operator||", "__dor__"),
        ("operator^", "__xor__"),
        ("operator~", "__invert__"),
        ("operator!", "__not__"),
        ("operator,", "__comma__"),
        ("operator+=", "__iadd__"),
        ("operator-=", "__isub__"),
        ("operator*=", "__imul__"),
        ("operator/=", "__idiv__"),
        ("operator%=", "__imod__"),
        ("operator**=", "__ipow__"),
        ("operator<<=", "__ilshift__"),
        ("operator>>=", "__irshift__"),
        ("operator&=", "__iand__"),
        ("operator|=", "__ior__"),
        ("operator^=", "__ixor__"),
        ("operator==", "__eq__"),
        ("operator!=", "__ne__"),
        ("operator>", "__gt__"),
        ("operator<", "__lt__"),
        ("operator>=", "__ge__"),
        ("operator<=", "__le__"),
        ("operator->", "__follow__"),
        ("operator=", "__assign__"),
    ]
    .into_iter()
    .collect()
});

static NON_ALPHABETIC: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-zA-Z]").unwrap());

/// Protocol name of an operator member given its parameter count.
///
/// `int_param` tells whether the only parameter is the postfix marker.
pub(crate) fn operator_name(name: &str, arity: usize, int_param: bool) -> Option<&'static str> {
    let special = match (name, arity) {
        ("operator+", 0) => Some("__pos__"),
        ("operator-", 0) => Some("__neg__"),
        ("operator*", 0) => Some("__deref__"),
        ("operator++", 1) if int_param => Some("__postinc__"),
        ("operator--", 1) if int_param => Some("__postdec__"),
        _ => None,
    };
    special.or_else(|| OPERATORS.get(name).copied())
}

/// `operator bool` becomes `__bool__`.
pub(crate) fn conversion_name(name: &str) -> Option<String> {
    let (keyword, target) = name.split_once(' ')?;
    if keyword != "operator" || target.trim().is_empty() {
        return None;
    }
    Some(format!("__{}__", translate(target)))
}

fn strip_non_alphabetic(name: &str) -> String {
    let rest: String = name.chars().skip(1).collect();
    NON_ALPHABETIC.replace_all(&rest, "").into_owned()
}

impl Batch {
    /// Run the repair loop for a freshly constructed entity.
    pub(crate) fn check(&mut self, id: EntityId) -> Result<()> {
        let repairs = self.entity(id).entity.repairs();
        let mut attempt = 0;
        loop {
            let rendering = self.render(id);
            let reason = match self.validator.validate(&rendering) {
                Ok(()) => return Ok(()),
                Err(reason) => reason,
            };
            let Some(&repair) = repairs.get(attempt) else {
                return Err(CoreError::RepairExhausted {
                    class: self.entity(id).entity.class_name(),
                    qualified_name: self.qualified_name(id),
                    attempts: attempt,
                    rendering,
                    reason,
                });
            };
            attempt += 1;
            debug!(
                entity = self.qualified_name(id).as_str(),
                attempt = attempt,
                repair:? = repair,
                reason = reason.to_string().as_str();
                "Repairing rendering"
            );
            self.apply_repair(id, repair);
        }
    }

    fn apply_repair(&mut self, id: EntityId, repair: Repair) {
        match repair {
            Repair::OperatorName => {
                let renamed = self.operator_rename(id);
                if let Some(renamed) = renamed {
                    *self.entity_mut(id).entity.name_mut() = SmolStr::new(renamed);
                }
            }
            Repair::ConversionOperator => {
                if let Some(renamed) = conversion_name(self.entity(id).entity.name()) {
                    *self.entity_mut(id).entity.name_mut() = SmolStr::new(renamed);
                }
            }
            Repair::Destructor => {
                if self.entity(id).entity.name().starts_with('~') {
                    *self.entity_mut(id).entity.name_mut() = SmolStr::new("__destruct__");
                }
            }
            Repair::PrefixUnderscore => {
                let name = self.entity_mut(id).entity.name_mut();
                *name = SmolStr::new(format!("_{}", name));
            }
            Repair::StripNonAlphabetic => {
                let name = self.entity_mut(id).entity.name_mut();
                *name = SmolStr::new(strip_non_alphabetic(name));
            }
            Repair::ElideDefault => {
                if let Entity::Param(param) = &mut self.entity_mut(id).entity {
                    if param.default.is_some() {
                        param.default = Some("...".to_string());
                    }
                }
            }
            Repair::OpaqueType => {
                if let Some(ty) = self.own_type(id) {
                    let marker = unparseable(&self.render_type(ty));
                    self.type_expr_mut(ty).override_text = Some(marker);
                }
            }
        }
    }

    fn operator_rename(&self, id: EntityId) -> Option<&'static str> {
        let Entity::Function(function) = &self.entity(id).entity else {
            return None;
        };
        // A free operator takes its left operand as the first parameter.
        let arity = match function.receiver {
            Receiver::Free => function.params.len().saturating_sub(1),
            Receiver::Instance | Receiver::Static => function.params.len(),
        };
        let int_param = arity == 1
            && function.params.last().is_some_and(|&param| match &self.entity(param).entity {
                Entity::Param(param) => self.render_type(param.ty) == "int",
                _ => false,
            });
        operator_name(&function.name, arity, int_param)
    }

    /// The type expression an opaque-type repair replaces.
    fn own_type(&self, id: EntityId) -> Option<TypeId> {
        match &self.entity(id).entity {
            Entity::Param(param) => Some(param.ty),
            Entity::Function(function) => Some(function.returns),
            Entity::Variable(variable) => variable.type_expr(),
            _ => None,
        }
    }
}
