mod decl;
mod diagnostic;

pub use decl::{Child, CompoundDef, EnumValueDef, Markup, MemberDef, ParamDef, Protection};
pub use diagnostic::{Diagnostic, DiagnosticKind, DiagnosticLevel};
