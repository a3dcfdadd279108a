//! Type expressions.
//!
//! A type expression is assembled from the text and reference markers of an
//! exported type. It keeps the nested structure so that every referenced
//! declaration can be bound on its own during resolution.

use doxystub_common::Markup;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::entity::EntityId;
use crate::translate::translate;
use crate::Batch;

/// Rendering of an expression that carries no information.
pub const ANY: &str = "Any";

/// Stable index of a type expression in its batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(pub(crate) u32);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Part {
    Text(String),
    Nested(TypeId),
}

#[derive(Debug, Clone)]
pub struct TypeExpr {
    pub parts: Vec<Part>,
    /// Replaces the assembled parts when a known idiom was recognized.
    pub override_text: Option<String>,
    /// Declaration the expression refers to, bound during resolution.
    pub target: Option<EntityId>,
    /// Direct reference carried by the markup.
    pub refid: Option<String>,
    /// Scope the expression appears in.
    pub container: Option<EntityId>,
    /// Untranslated text, kept for diagnostics.
    pub raw: String,
    /// The markup was absent or blank.
    pub blank: bool,
    /// Listed in the unresolved-type report.
    pub reported: bool,
}

static CONDITIONAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(std\.)?conditional\s*\[(.*),(?P<then>.*),(?P<otherwise>.*)\]\.type").unwrap()
});
static ENABLE_IF: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(std\.)?enable_if\s*\[(.*),(?P<then>.*)\]\.type").unwrap());
static CALLABLE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(std\.)?function\b").unwrap());
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static PUNCT_SPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r" ?([\[\],().]) ?").unwrap());

/// Collapse whitespace runs and drop spaces around brackets, commas and dots.
pub(crate) fn squeeze(text: &str) -> String {
    let collapsed = WHITESPACE.replace_all(text.trim(), " ");
    PUNCT_SPACE.replace_all(&collapsed, "$1").into_owned()
}

/// Escape text for a double-quoted Python string.
pub(crate) fn escape_string(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Opaque marker standing in for a type that cannot be expressed.
pub(crate) fn unparseable(text: &str) -> String {
    format!("UnparseableType[\"{}\"]", escape_string(text))
}

/// Recognize a known idiom in assembled type text.
///
/// Idioms are checked in order and the first match wins. Text that matches
/// none of them but still cannot be Python is wrapped as unparseable.
pub(crate) fn idiom_override(text: &str) -> Option<String> {
    let squeezed = squeeze(text);
    if let Some(caps) = CONDITIONAL.captures(&squeezed) {
        return Some(format!(
            "Union[{}, {}]",
            translate(&caps["then"]),
            translate(&caps["otherwise"])
        ));
    }
    if let Some(caps) = ENABLE_IF.captures(&squeezed) {
        let constraint = squeezed.replace('\\', "\\\\").replace('"', "'");
        return Some(format!("Annotated[{}, \"{}\"]", translate(&caps["then"]), constraint));
    }
    if CALLABLE.is_match(&squeezed) {
        return Some("Callable".to_string());
    }
    if squeezed.contains('-') || squeezed.contains('@') || squeezed.ends_with('.') {
        return Some(unparseable(&squeezed));
    }
    None
}

fn push_text(parts: &mut Vec<Part>, raw: &str) {
    let text = translate(raw);
    if !text.is_empty() {
        parts.push(Part::Text(text));
    }
}

impl Batch {
    /// Build a type expression from exported markup.
    pub(crate) fn add_type(
        &mut self,
        markup: Option<&Markup>,
        container: Option<EntityId>,
        reported: bool,
    ) -> TypeId {
        let Some(markup) = markup else {
            return self.push_type(TypeExpr {
                parts: Vec::new(),
                override_text: None,
                target: None,
                refid: None,
                container,
                raw: String::new(),
                blank: true,
                reported,
            });
        };

        let mut parts = Vec::new();
        push_text(&mut parts, &markup.text);
        for child in &markup.children {
            let nested = self.add_type(Some(child), container, reported);
            parts.push(Part::Nested(nested));
            push_text(&mut parts, &child.tail);
        }

        let mut expr = TypeExpr {
            parts,
            override_text: None,
            target: None,
            refid: markup.refid.clone(),
            container,
            raw: markup.plain_text(),
            blank: markup.is_empty(),
            reported,
        };
        if !expr.parts.is_empty() {
            expr.override_text = idiom_override(&self.join_parts(&expr.parts));
        }
        self.push_type(expr)
    }

    /// Build a type expression from bare text.
    pub(crate) fn add_text_type(&mut self, text: &str, container: Option<EntityId>) -> TypeId {
        self.add_type(Some(&Markup::text(text)), container, false)
    }

    fn join_parts(&self, parts: &[Part]) -> String {
        parts
            .iter()
            .map(|part| match part {
                Part::Text(text) => text.clone(),
                Part::Nested(nested) => self.render_type(*nested),
            })
            .collect()
    }

    /// Render: override, then bound target, then parts, then [`ANY`].
    pub fn render_type(&self, id: TypeId) -> String {
        let expr = self.type_expr(id);
        if let Some(text) = &expr.override_text {
            return text.clone();
        }
        if let Some(target) = expr.target {
            return self.qualified_name(target);
        }
        if !expr.parts.is_empty() {
            return self.join_parts(&expr.parts);
        }
        ANY.to_string()
    }

    /// Whether the expression carries any information.
    pub fn type_is_set(&self, id: TypeId) -> bool {
        let expr = self.type_expr(id);
        !expr.parts.is_empty() || expr.override_text.is_some() || expr.target.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_squeeze() {
        assert_eq!(squeeze("  std.function[ None (int) ]  "), "std.function[None(int)]");
        assert_eq!(squeeze("Dict[ int ,\n  str ]"), "Dict[int,str]");
    }

    #[test]
    fn test_conditional_idiom() {
        let text = "std.conditional[ Const, const_iterator, iterator ].type";
        assert_eq!(
            idiom_override(text).as_deref(),
            Some("Union[const_iterator, iterator]")
        );
    }

    #[test]
    fn test_enable_if_idiom() {
        let text = "std.enable_if[ std.is_integral[T].value, T ].type";
        assert_eq!(
            idiom_override(text).as_deref(),
            Some("Annotated[T, \"std.enable_if[std.is_integral[T].value,T].type\"]")
        );
    }

    #[test]
    fn test_callable_idiom() {
        assert_eq!(idiom_override("std.function[ None(node) ]").as_deref(), Some("Callable"));
        assert_eq!(idiom_override("function[int()]").as_deref(), Some("Callable"));
        assert_eq!(idiom_override("functional"), None);
    }

    #[test]
    fn test_unparseable_fallback() {
        assert_eq!(
            idiom_override("ogdf.Foo.@0").as_deref(),
            Some("UnparseableType[\"ogdf.Foo.@0\"]")
        );
        assert_eq!(
            idiom_override("decltype(a - b)").as_deref(),
            Some("UnparseableType[\"decltype(a - b)\"]")
        );
        assert!(idiom_override("Graph.").is_some());
        assert_eq!(idiom_override("List[int]"), None);
    }

    #[test]
    fn test_parts_from_markup() {
        let mut batch = Batch::new().unwrap();
        let markup = Markup::text("const std::vector< ")
            .with_child(Markup::reference("classogdf_1_1Graph", "Graph"), " > &");
        let ty = batch.add_type(Some(&markup), None, true);
        let expr = batch.type_expr(ty);
        assert_eq!(expr.parts.len(), 3);
        assert!(matches!(&expr.parts[0], Part::Text(t) if t == "List["));
        assert!(matches!(&expr.parts[2], Part::Text(t) if t == "]"));
        assert_eq!(batch.render_type(ty), "List[Graph]");
        assert!(batch.type_is_set(ty));
    }

    #[test]
    fn test_empty_expression_renders_any() {
        let mut batch = Batch::new().unwrap();
        let missing = batch.add_type(None, None, true);
        let blank = batch.add_type(Some(&Markup::text("  const ")), None, true);
        assert_eq!(batch.render_type(missing), ANY);
        assert_eq!(batch.render_type(blank), ANY);
        assert!(!batch.type_is_set(missing));
        assert!(!batch.type_is_set(blank));
    }

    fn spaces() -> impl Strategy<Value = String> {
        prop::sample::select(vec!["", " ", "  ", "\n", " \t "]).prop_map(str::to_string)
    }

    proptest! {
        #[test]
        fn prop_idioms_ignore_whitespace(
            a in spaces(), b in spaces(), c in spaces(), d in spaces(), e in spaces()
        ) {
            let spaced = format!(
                "std.conditional{a}[{b}flag,{c}Foo{d},{e}Bar{a}]{b}.type",
            );
            prop_assert_eq!(
                idiom_override(&spaced),
                idiom_override("std.conditional[flag,Foo,Bar].type")
            );
            let callable = format!("std.function{a}[{b}None{c}({d}int{e}){a}]");
            let callable_override = idiom_override(&callable);
            prop_assert_eq!(callable_override.as_deref(), Some("Callable"));
        }
    }
}
