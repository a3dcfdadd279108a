//! Lexical rewrite of exported C++ text into Python typing vocabulary.
//!
//! The rewrite is purely token based: it never fails and leaves anything it
//! does not know untouched. Text that still is not valid Python afterwards is
//! caught by the type-expression fallbacks and the repair loop.

use doxystub_common::Markup;
use once_cell::sync::Lazy;
use regex::Regex;

/// Upper bound on rewrite rounds before the result is taken as is.
const MAX_ROUNDS: usize = 8;

static CHAR_POINTER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(const +)?char +\*").unwrap());

/// Word-level rules, applied in order after punctuation has been rewritten.
static WORD_RULES: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    [
        // qualifiers
        (r"\bconst(expr)?\b", ""),
        (r"\bvolatile\b", ""),
        // builtin types
        (r"\bvoid\b", "None"),
        (r"\bu?int[0-9]+(_t)?\b", "int"),
        (r"\bunsigned\b", ""),
        (r"\b( *(int|short|long|byte|char))+\b", "int"),
        (r"\bdouble\b", "float"),
        (r"\b(std\.)?string\b", "str"),
        (r"\b(std\.)?vector\b", "List"),
        (r"\b(std\.)?pair\b", "Tuple"),
        (r"\b(std\.)?(unordered_)?map\b", "Dict"),
        // literals
        (r"\btrue\b", "True"),
        (r"\bfalse\b", "False"),
        (r"\bnullptr\b", "None"),
        (r"\bNULL\b", "None"),
    ]
    .into_iter()
    .map(|(pattern, replacement)| (Regex::new(pattern).unwrap(), replacement))
    .collect()
});

static INTRODUCER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\s*\b(class|typename)\b)+").unwrap());

/// Translate raw declaration text (a type or a default value) to Python.
///
/// Rules are re-applied until the text stops changing, so the result is a
/// fixed point: translating it again yields the same text.
///
/// # Example
/// ```
/// use doxystub_core::translate;
/// assert_eq!(translate("const std::vector<uint32_t> &"), "List[int]");
/// assert_eq!(translate("const char *"), "str");
/// ```
pub fn translate(raw: &str) -> String {
    let mut current = translate_once(raw);
    for _ in 0..MAX_ROUNDS {
        let next = translate_once(&current);
        if next == current {
            break;
        }
        current = next;
    }
    current
}

fn translate_once(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }

    let name = CHAR_POINTER.replace_all(raw, "str");
    let mut name = name
        .replace("::", ".")
        .replace('<', "[")
        .replace('>', "]")
        .replace('&', "")
        .replace('*', "")
        .replace("...", "")
        .trim()
        .to_string();

    for (pattern, replacement) in WORD_RULES.iter() {
        name = pattern.replace_all(&name, *replacement).into_owned();
    }

    INTRODUCER.replace(&name, "").trim().to_string()
}

/// Translate a default-value expression chunk by chunk.
///
/// A left shift comes out of the bracket rewrite as `[[`; it is restored when
/// no closing bracket shows that the brackets were generic arguments.
pub fn translate_default(markup: &Markup) -> String {
    let mut value = String::new();
    push_chunks(markup, &mut value);
    if value.contains("[[") && !value.contains(']') {
        value = value.replace("[[", "<<");
    }
    value
}

fn push_chunks(markup: &Markup, out: &mut String) {
    out.push_str(&translate(&markup.text));
    for child in &markup.children {
        push_chunks(child, out);
        out.push_str(&translate(&child.tail));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_strips_qualifiers_and_markers() {
        assert_eq!(translate("const Graph &"), "Graph");
        assert_eq!(translate("volatile node *"), "node");
        assert_eq!(translate("Args..."), "Args");
        assert_eq!(translate("ogdf::Graph::node"), "ogdf.Graph.node");
    }

    #[test]
    fn test_generic_brackets() {
        assert_eq!(translate("NodeArray< int >"), "NodeArray[ int ]");
        assert_eq!(translate("std::pair<node, edge>"), "Tuple[node, edge]");
        assert_eq!(translate("std::unordered_map<std::string, double>"), "Dict[str, float]");
        assert_eq!(translate("std::map<int, bool>"), "Dict[int, bool]");
    }

    #[test]
    fn test_integer_family() {
        assert_eq!(translate("unsigned long long"), "int");
        assert_eq!(translate("uint64_t"), "int");
        assert_eq!(translate("int8_t"), "int");
        assert_eq!(translate("short"), "int");
        assert_eq!(translate("unsigned char"), "int");
    }

    #[test]
    fn test_char_pointer_is_string() {
        assert_eq!(translate("const char *"), "str");
        assert_eq!(translate("char *"), "str");
        assert_eq!(translate("std::string"), "str");
    }

    #[test]
    fn test_literals() {
        assert_eq!(translate("true"), "True");
        assert_eq!(translate("false"), "False");
        assert_eq!(translate("nullptr"), "None");
        assert_eq!(translate("NULL"), "None");
        assert_eq!(translate("void"), "None");
    }

    #[test]
    fn test_introducers() {
        assert_eq!(translate("class T"), "T");
        assert_eq!(translate("typename Container"), "Container");
        assert_eq!(translate("const class typename X"), "X");
        assert_eq!(translate("subclass"), "subclass");
    }

    #[test]
    fn test_empty_and_unmapped() {
        assert_eq!(translate(""), "");
        assert_eq!(translate("   "), "");
        assert_eq!(translate("Foo-Bar"), "Foo-Bar");
    }

    #[test]
    fn test_default_value_chunks() {
        let markup = Markup::text("").with_child(Markup::reference("enumx", "Color::Red"), "");
        assert_eq!(translate_default(&markup), "Color.Red");
        assert_eq!(translate_default(&Markup::text("1 << 3")), "1 << 3");
        assert_eq!(translate_default(&Markup::text("std::vector<int>()")), "List[int]()");
        assert_eq!(translate_default(&Markup::text("nullptr")), "None");
    }

    fn raw_text() -> impl Strategy<Value = String> {
        let token = prop::sample::select(vec![
            "const", "volatile", "char", "*", "&", "int", "unsigned", "long", "short",
            "std::", "::", "vector", "map", "pair", "string", "<", ">", ",", "...",
            "class", "typename", "void", "true", "nullptr", "double", "Graph", "T", ":", ".",
        ]);
        let sep = prop::sample::select(vec!["", " "]);
        prop::collection::vec((token, sep), 0..12).prop_map(|parts| {
            parts
                .into_iter()
                .map(|(token, sep)| format!("{}{}", token, sep))
                .collect()
        })
    }

    proptest! {
        #[test]
        fn prop_translate_is_idempotent(raw in raw_text()) {
            let once = translate(&raw);
            prop_assert_eq!(translate(&once), once);
        }

        #[test]
        fn prop_translate_output_is_trimmed(raw in raw_text()) {
            let out = translate(&raw);
            prop_assert_eq!(out.trim(), out.as_str());
        }
    }
}
