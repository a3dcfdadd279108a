//! Rendering of single entities as Python stub text.
//!
//! Rendering is a pure function of the arena; nothing here mutates state.
//! Class and namespace bodies are assembled in [`crate::emit`].

use crate::entity::{Entity, EntityId, Enum, Function, Param, Receiver, TemplateParam, Variable, VariableKind};
use crate::types::{escape_string, ANY};
use crate::Batch;

pub(crate) const INDENT: &str = "    ";

/// Name every constructor is renamed to.
pub(crate) const CONSTRUCTOR: &str = "__init__";

/// Prefix every non-blank line of `text`.
pub(crate) fn indent_block(text: &str, prefix: &str) -> String {
    text.split_inclusive('\n')
        .map(|line| {
            if line.trim().is_empty() {
                line.to_string()
            } else {
                format!("{}{}", prefix, line)
            }
        })
        .collect()
}

/// One-line docstring.
pub(crate) fn docstring(brief: &str) -> String {
    format!("\"\"\"{}\"\"\"", escape_string(brief))
}

/// Python `repr()` of a string.
pub(crate) fn py_repr(text: &str) -> String {
    let quote = if text.contains('\'') && !text.contains('"') { '"' } else { '\'' };
    let mut out = String::with_capacity(text.len() + 2);
    out.push(quote);
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}

/// Whitespace-normalize a brief summary; blank ones are dropped.
pub(crate) fn normalize_brief(raw: Option<&str>) -> Option<String> {
    let brief = raw?
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    (!brief.is_empty()).then_some(brief)
}

impl Batch {
    /// Render one entity.
    pub fn render(&self, id: EntityId) -> String {
        let data = self.entity(id);
        let brief = data.brief.as_deref();
        match &data.entity {
            Entity::Param(param) => self.render_param(param),
            Entity::Template(template) => render_template(template),
            Entity::Function(function) => self.render_function(function, brief),
            Entity::Variable(variable) => self.render_variable(variable, brief),
            Entity::Enum(enumeration) => self.render_enum(enumeration, brief),
            Entity::Class(class) => self.render_class(class, brief),
        }
    }

    fn render_param(&self, param: &Param) -> String {
        let mut out = param.name.to_string();
        let annotated = self.type_is_set(param.ty);
        if annotated {
            out.push_str(": ");
            out.push_str(&self.render_type(param.ty));
        }
        match param.default.as_deref() {
            Some(default) if !default.is_empty() && annotated => {
                out.push_str(" = ");
                out.push_str(default);
            }
            Some(default) if !default.is_empty() => {
                out.push('=');
                out.push_str(default);
            }
            _ => {}
        }
        out
    }

    fn render_function(&self, function: &Function, brief: Option<&str>) -> String {
        let mut lines = Vec::new();
        if function.overloaded {
            lines.push("@overload".to_string());
        }
        if function.receiver == Receiver::Static {
            lines.push("@staticmethod".to_string());
        }

        let mut params = Vec::with_capacity(function.params.len() + 1);
        if function.receiver == Receiver::Instance {
            params.push("self".to_string());
        }
        params.extend(function.params.iter().map(|&param| self.render(param)));

        let returns = if function.name == CONSTRUCTOR {
            "None".to_string()
        } else if self.type_is_set(function.returns) {
            self.render_type(function.returns)
        } else {
            ANY.to_string()
        };
        lines.push(format!("def {}({}) -> {}:", function.name, params.join(", "), returns));
        if let Some(brief) = brief {
            lines.push(format!("{}{}", INDENT, docstring(brief)));
        }
        lines.push(format!("{}...", INDENT));
        lines.join("\n")
    }

    fn render_variable(&self, variable: &Variable, brief: Option<&str>) -> String {
        let declaration = match variable.kind {
            VariableKind::Value { ty } if self.type_is_set(ty) => {
                format!("{}: {} = ...", variable.name, self.render_type(ty))
            }
            VariableKind::Value { .. } => format!("{} = ...", variable.name),
            VariableKind::EnumMember => format!("{} = enum.auto()", variable.name),
            VariableKind::Alias { target } => {
                format!("{}: TypeAlias = {}", variable.name, self.render_type(target))
            }
        };
        match brief {
            Some(brief) => format!("#: {}\n{}", brief, declaration),
            None => declaration,
        }
    }

    fn render_enum(&self, enumeration: &Enum, brief: Option<&str>) -> String {
        let base = if enumeration.strong { "enum.Enum" } else { "enum.IntEnum" };
        let mut blocks = vec![format!("class {}({}):", enumeration.name, base)];
        if let Some(brief) = brief {
            blocks.push(indent_block(&docstring(brief), INDENT));
        }
        blocks.extend(
            enumeration
                .values
                .iter()
                .map(|&value| indent_block(&self.render(value), INDENT)),
        );
        if enumeration.values.is_empty() {
            blocks.push(format!("{}...", INDENT));
        }
        blocks.join("\n\n")
    }
}

fn render_template(template: &TemplateParam) -> String {
    if template.ignore {
        format!("# {}", template.name)
    } else {
        format!("{} = TypeVar({})", template.name, py_repr(&template.name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indent_skips_blank_lines() {
        assert_eq!(indent_block("a\n\nb", "    "), "    a\n\n    b");
        assert_eq!(indent_block("x\n", "  "), "  x\n");
    }

    #[test]
    fn test_py_repr_quoting() {
        assert_eq!(py_repr("Graph"), "'Graph'");
        assert_eq!(py_repr("it's"), "\"it's\"");
        assert_eq!(py_repr("a'b\"c"), "'a\\'b\"c'");
        assert_eq!(py_repr("back\\slash"), "'back\\\\slash'");
    }

    #[test]
    fn test_normalize_brief() {
        assert_eq!(
            normalize_brief(Some("  Returns the\n   number of nodes. \n")).as_deref(),
            Some("Returns the number of nodes.")
        );
        assert_eq!(normalize_brief(Some(" \n ")), None);
        assert_eq!(normalize_brief(None), None);
    }

    #[test]
    fn test_docstring_escapes() {
        assert_eq!(docstring(r#"say "hi" \o/"#), r#""""say \"hi\" \\o/""""#);
    }

    #[test]
    fn test_template_rendering() {
        let plain = TemplateParam { name: "T".into(), ignore: false };
        let constraint = TemplateParam { name: "std.enable_if[B]".into(), ignore: true };
        assert_eq!(render_template(&plain), "T = TypeVar('T')");
        assert_eq!(render_template(&constraint), "# std.enable_if[B]");
    }
}
