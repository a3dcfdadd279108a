//! Declaration tree produced by the documentation-export reader.
//!
//! One [`CompoundDef`] describes a documented class, struct, namespace or
//! grouping together with its nested declarations. Textual sub-markup such as
//! a member's type or a parameter's default value is kept as [`Markup`], which
//! preserves the embedded cross-references the core binds against later.

use serde::{Deserialize, Serialize};

/// Visibility marker of a declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protection {
    #[default]
    Public,
    Protected,
    Private,
    Package,
}

/// Text with embedded reference markers.
///
/// Mirrors an element of the export: leading `text`, an optional `refid`
/// attribute, ordered child elements, and the `tail` text that follows the
/// element inside its parent. In JSON a bare string is accepted as a markup
/// holding only text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "MarkupRepr")]
pub struct Markup {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refid: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Markup>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub tail: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum MarkupRepr {
    Plain(String),
    Element {
        #[serde(default)]
        text: String,
        #[serde(default)]
        refid: Option<String>,
        #[serde(default)]
        children: Vec<Markup>,
        #[serde(default)]
        tail: String,
    },
}

impl From<MarkupRepr> for Markup {
    fn from(repr: MarkupRepr) -> Self {
        match repr {
            MarkupRepr::Plain(text) => Markup::text(text),
            MarkupRepr::Element {
                text,
                refid,
                children,
                tail,
            } => Markup {
                text,
                refid,
                children,
                tail,
            },
        }
    }
}

impl Markup {
    /// A markup holding only text.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    /// A reference marker pointing at the declaration with id `refid`.
    pub fn reference(refid: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            refid: Some(refid.into()),
            ..Self::default()
        }
    }

    /// Append a child element followed by `tail` text.
    pub fn with_child(mut self, mut child: Markup, tail: impl Into<String>) -> Self {
        child.tail = tail.into();
        self.children.push(child);
        self
    }

    /// All text of this element and its descendants in document order,
    /// excluding this element's own tail.
    pub fn plain_text(&self) -> String {
        let mut out = self.text.clone();
        for child in &self.children {
            out.push_str(&child.plain_text());
            out.push_str(&child.tail);
        }
        out
    }

    /// An element without attributes, children or non-blank text.
    pub fn is_empty(&self) -> bool {
        self.refid.is_none() && self.children.is_empty() && self.text.trim().is_empty()
    }
}

/// One compound unit: the root node handed over by the reader.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompoundDef {
    pub id: String,
    /// `class`, `struct`, `namespace`, `group`, ...
    pub kind: String,
    #[serde(default)]
    pub prot: Protection,
    /// Fully qualified name with `::` separators.
    pub name: String,
    #[serde(default)]
    pub brief: Option<String>,
    #[serde(default)]
    pub bases: Vec<Markup>,
    #[serde(default)]
    pub template_params: Option<Vec<ParamDef>>,
    #[serde(default)]
    pub children: Vec<Child>,
}

impl CompoundDef {
    /// Whether the compound declares nested classes or namespaces.
    pub fn has_inner_types(&self) -> bool {
        fn walk(children: &[Child]) -> bool {
            children.iter().any(|child| match child {
                Child::InnerClass(_) | Child::InnerNamespace(_) => true,
                Child::Section { children, .. } => walk(children),
                _ => false,
            })
        }
        walk(&self.children)
    }
}

/// A child element of a compound, in document order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "tag", rename_all = "snake_case")]
pub enum Child {
    /// A member section; its children are flattened into the compound.
    Section {
        #[serde(default)]
        kind: String,
        #[serde(default)]
        children: Vec<Child>,
    },
    /// A user-defined section header, kept as a comment.
    Header { text: String },
    Member(MemberDef),
    InnerClass(Markup),
    InnerNamespace(Markup),
    Location,
    Includes,
    /// Any element the reader does not model.
    Other { element: String },
}

/// A member declaration (variable, function, typedef, enum, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberDef {
    #[serde(default)]
    pub id: Option<String>,
    pub kind: String,
    #[serde(default)]
    pub prot: Protection,
    #[serde(default, rename = "static")]
    pub is_static: bool,
    pub name: String,
    #[serde(default)]
    pub qualified_name: Option<String>,
    #[serde(default)]
    pub brief: Option<String>,
    #[serde(default, rename = "type")]
    pub ty: Option<Markup>,
    #[serde(default)]
    pub params: Vec<ParamDef>,
    #[serde(default)]
    pub template_params: Option<Vec<ParamDef>>,
    /// Scoped (`enum class`) enumeration.
    #[serde(default)]
    pub strong: bool,
    #[serde(default)]
    pub enum_values: Vec<EnumValueDef>,
}

/// A function parameter or template parameter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParamDef {
    #[serde(default)]
    pub declname: Option<String>,
    #[serde(default, rename = "type")]
    pub ty: Option<Markup>,
    #[serde(default)]
    pub defval: Option<Markup>,
}

/// A member of an enumeration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumValueDef {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub brief: Option<String>,
}
