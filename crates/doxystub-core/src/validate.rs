//! Python syntax checks backed by tree-sitter.

use thiserror::Error;
use tree_sitter::{Node, Parser};

use crate::error::Result;

/// Longest snippet kept in a [`SyntaxError`].
const SNIPPET_LEN: usize = 40;

/// Reserved words of Python 3; none of them may stand as a name.
///
/// The grammar recovers some of these as plain identifiers (`in` as a
/// parameter, `async` as a variable), so identifiers are checked against the
/// list after parsing.
const KEYWORDS: &[&str] = &[
    "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class",
    "continue", "def", "del", "elif", "else", "except", "finally", "for", "from", "global",
    "if", "import", "in", "is", "lambda", "nonlocal", "not", "or", "pass", "raise", "return",
    "try", "while", "with", "yield",
];

/// First syntax problem found in a rendering.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}, column {column}: {}", describe(.snippet, .missing))]
pub struct SyntaxError {
    /// 1-based.
    pub line: usize,
    /// 1-based.
    pub column: usize,
    pub snippet: String,
    /// The parser expected a token that is absent.
    pub missing: bool,
}

fn describe(snippet: &str, missing: &bool) -> String {
    if *missing {
        format!("missing `{}`", snippet)
    } else if snippet.is_empty() {
        "invalid syntax".to_string()
    } else {
        format!("invalid syntax near `{}`", snippet)
    }
}

/// Reusable Python parser used to accept or reject generated text.
pub struct Validator {
    parser: Parser,
}

impl std::fmt::Debug for Validator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Validator").finish_non_exhaustive()
    }
}

impl Validator {
    pub fn new() -> Result<Self> {
        let mut parser = Parser::new();
        let language = tree_sitter_python::LANGUAGE;
        parser.set_language(&language.into())?;
        Ok(Self { parser })
    }

    /// Accept `source` iff it parses as a Python module without error nodes.
    pub fn validate(&mut self, source: &str) -> std::result::Result<(), SyntaxError> {
        let Some(tree) = self.parser.parse(source, None) else {
            return Err(SyntaxError {
                line: 1,
                column: 1,
                snippet: String::new(),
                missing: false,
            });
        };
        let root = tree.root_node();
        if !root.has_error() {
            return match reserved_identifier(root, source) {
                Some(node) => Err(SyntaxError {
                    line: node.start_position().row + 1,
                    column: node.start_position().column + 1,
                    snippet: node_text(node, source).to_string(),
                    missing: false,
                }),
                None => Ok(()),
            };
        }

        let node = first_error(root).unwrap_or(root);
        let position = node.start_position();
        let snippet = if node.is_missing() {
            node.kind().to_string()
        } else {
            node_text(node, source)
                .lines()
                .next()
                .unwrap_or_default()
                .chars()
                .take(SNIPPET_LEN)
                .collect()
        };
        Err(SyntaxError {
            line: position.row + 1,
            column: position.column + 1,
            snippet,
            missing: node.is_missing(),
        })
    }

    pub fn is_valid(&mut self, source: &str) -> bool {
        self.validate(source).is_ok()
    }
}

fn node_text<'s>(node: Node<'_>, source: &'s str) -> &'s str {
    source.get(node.start_byte()..node.end_byte()).unwrap_or_default()
}

/// First identifier spelled like a reserved word, in document order.
fn reserved_identifier<'t>(root: Node<'t>, source: &str) -> Option<Node<'t>> {
    let mut cursor = root.walk();
    loop {
        let node = cursor.node();
        if node.kind() == "identifier" && KEYWORDS.contains(&node_text(node, source)) {
            return Some(node);
        }
        if cursor.goto_first_child() || cursor.goto_next_sibling() {
            continue;
        }
        loop {
            if !cursor.goto_parent() {
                return None;
            }
            if cursor.goto_next_sibling() {
                break;
            }
        }
    }
}

/// Depth-first search for the first error or missing node.
fn first_error(node: Node<'_>) -> Option<Node<'_>> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    if !node.has_error() {
        return None;
    }
    let mut cursor = node.walk();
    let children: Vec<_> = node.children(&mut cursor).collect();
    children.into_iter().find_map(first_error)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_stub_constructs() {
        let mut validator = Validator::new().unwrap();
        assert!(validator.is_valid("def f(self, _0: int) -> Any:\n    ..."));
        assert!(validator.is_valid("x: List[int] = ..."));
        assert!(validator.is_valid("T = TypeVar('T')"));
        assert!(validator.is_valid("from ogdf.Graph import *"));
        assert!(validator.is_valid("# only a comment"));
        assert!(validator.is_valid("@overload\n@staticmethod\ndef g() -> None:\n    ..."));
    }

    #[test]
    fn test_rejects_reserved_names() {
        let mut validator = Validator::new().unwrap();
        assert!(!validator.is_valid("None: int = ..."));
        assert!(!validator.is_valid("def operator[](self) -> Any:\n    ..."));
        assert!(!validator.is_valid("class from(object):\n    ..."));
    }

    #[test]
    fn test_rejects_keywords_recovered_as_identifiers() {
        let mut validator = Validator::new().unwrap();
        for name in ["in", "is", "lambda", "None", "True", "async", "await"] {
            let param = format!("def f(self, {}: int) -> Any:\n    ...", name);
            assert!(!validator.is_valid(&param), "accepted parameter {}", name);
        }
        assert!(!validator.is_valid("async: int = ..."));
        assert!(!validator.is_valid("class async(object):\n    ..."));

        let err = validator.validate("def f(self, is: int) -> Any:\n    ...").unwrap_err();
        assert_eq!((err.line, err.column), (1, 13));
        assert_eq!(err.snippet, "is");
    }

    #[test]
    fn test_keywords_in_their_own_positions() {
        let mut validator = Validator::new().unwrap();
        assert!(validator.is_valid("def f(x: int = None) -> None:\n    ..."));
        assert!(validator.is_valid("flag: bool = True"));
        assert!(validator.is_valid("from typing import *"));
        assert!(validator.is_valid("inner: int = ...\nisolated: int = ..."));
    }

    #[test]
    fn test_reports_position() {
        let mut validator = Validator::new().unwrap();
        let err = validator.validate("y: List[ = ...").unwrap_err();
        assert_eq!(err.line, 1);
        assert!(err.to_string().starts_with("line 1, column"));
    }
}
