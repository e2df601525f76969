//! The typed program tree.
//!
//! Leaves are C text fragments; interior nodes group them into lines, scopes
//! and control-flow constructs. Every node carries the [`Type`] of the value
//! it produces, `NULL` when it produces none.

use tern_types::Type;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum KeywordKind {
    If,
    Else,
    While,
    Return,
    Function,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum EnumKeywordKind {
    Match,
    Case,
    Default,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProgramNode {
    /// `{ … }` block.
    CodeScope { children: Vec<ProgramNode>, ty: Type },
    /// One statement, terminated by `;`.
    CodeLine { children: Vec<ProgramNode>, ty: Type },
    /// A text fragment.
    Atom { text: String, ty: Type },
    Keyword {
        kind: KeywordKind,
        children: Vec<ProgramNode>,
        ty: Type,
    },
    EnumKeyword {
        kind: EnumKeywordKind,
        children: Vec<ProgramNode>,
        ty: Type,
    },
}

impl ProgramNode {
    /// An untyped text fragment.
    pub fn atom(text: impl Into<String>) -> Self {
        ProgramNode::Atom {
            text: text.into(),
            ty: Type::null(),
        }
    }

    pub fn typed_atom(text: impl Into<String>, ty: Type) -> Self {
        ProgramNode::Atom {
            text: text.into(),
            ty,
        }
    }

    pub fn line(children: Vec<ProgramNode>) -> Self {
        ProgramNode::CodeLine {
            children,
            ty: Type::null(),
        }
    }

    pub fn scope(children: Vec<ProgramNode>) -> Self {
        ProgramNode::CodeScope {
            children,
            ty: Type::null(),
        }
    }

    pub fn keyword(kind: KeywordKind, children: Vec<ProgramNode>) -> Self {
        ProgramNode::Keyword {
            kind,
            children,
            ty: Type::null(),
        }
    }

    pub fn enum_keyword(kind: EnumKeywordKind, children: Vec<ProgramNode>) -> Self {
        ProgramNode::EnumKeyword {
            kind,
            children,
            ty: Type::null(),
        }
    }

    pub fn ty(&self) -> &Type {
        match self {
            ProgramNode::CodeScope { ty, .. }
            | ProgramNode::CodeLine { ty, .. }
            | ProgramNode::Atom { ty, .. }
            | ProgramNode::Keyword { ty, .. }
            | ProgramNode::EnumKeyword { ty, .. } => ty,
        }
    }

    /// Replace the node's type.
    #[must_use]
    pub fn with_ty(mut self, new_ty: Type) -> Self {
        match &mut self {
            ProgramNode::CodeScope { ty, .. }
            | ProgramNode::CodeLine { ty, .. }
            | ProgramNode::Atom { ty, .. }
            | ProgramNode::Keyword { ty, .. }
            | ProgramNode::EnumKeyword { ty, .. } => *ty = new_ty,
        }
        self
    }

    pub fn children(&self) -> &[ProgramNode] {
        match self {
            ProgramNode::CodeScope { children, .. }
            | ProgramNode::CodeLine { children, .. }
            | ProgramNode::Keyword { children, .. }
            | ProgramNode::EnumKeyword { children, .. } => children,
            ProgramNode::Atom { .. } => &[],
        }
    }

    /// Mutable children; `None` for atoms.
    pub fn children_mut(&mut self) -> Option<&mut Vec<ProgramNode>> {
        match self {
            ProgramNode::CodeScope { children, .. }
            | ProgramNode::CodeLine { children, .. }
            | ProgramNode::Keyword { children, .. }
            | ProgramNode::EnumKeyword { children, .. } => Some(children),
            ProgramNode::Atom { .. } => None,
        }
    }

    pub fn keyword_kind(&self) -> Option<KeywordKind> {
        match self {
            ProgramNode::Keyword { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    pub fn is_keyword(&self, want: KeywordKind) -> bool {
        self.keyword_kind() == Some(want)
    }

    pub fn is_scope(&self) -> bool {
        matches!(self, ProgramNode::CodeScope { .. })
    }

    /// Atom text, if this is an atom.
    pub fn text(&self) -> Option<&str> {
        match self {
            ProgramNode::Atom { text, .. } => Some(text),
            _ => None,
        }
    }

    /// Render the subtree as C text.
    pub fn reconstruct(&self) -> String {
        let mut out = String::new();
        self.write_to(&mut out);
        out
    }

    pub fn write_to(&self, out: &mut String) {
        match self {
            ProgramNode::Atom { text, .. } => out.push_str(text),
            ProgramNode::CodeLine { children, .. }
            | ProgramNode::Keyword {
                kind: KeywordKind::Return,
                children,
                ..
            } => {
                write_all(children, out);
                out.push_str(";\n");
            }
            ProgramNode::CodeScope { children, .. } => {
                out.push_str("{\n");
                write_all(children, out);
                out.push_str("}\n");
            }
            ProgramNode::Keyword { children, .. } | ProgramNode::EnumKeyword { children, .. } => {
                write_all(children, out);
            }
        }
    }
}

fn write_all(children: &[ProgramNode], out: &mut String) {
    for child in children {
        child.write_to(out);
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "test assertions use unwrap/expect for clarity"
)]
