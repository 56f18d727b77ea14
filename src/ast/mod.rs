//! Parse-tree node shapes for the Reso surface language.
//!
//! The grammar front end produces these nodes; everything in this crate
//! consumes them. Nodes carry no semantic information, only source
//! positions; types and symbols are resolved during code generation.

mod expression;
mod function;
mod resource;
mod statement;
mod type_name;

pub use self::expression::*;
pub use self::function::*;
pub use self::resource::*;
pub use self::statement::*;
pub use self::type_name::*;

/// Source region of a node, `(line, column)` for both ends, 1-based lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Span {
    pub start: (usize, usize),
    pub end: (usize, usize),
}

impl Span {
    pub fn new(start: (usize, usize), end: (usize, usize)) -> Self {
        Span { start, end }
    }

    pub fn line(&self) -> usize {
        self.start.0
    }

    pub fn column(&self) -> usize {
        self.start.1
    }
}

/// An identifier together with its source position.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Id {
    pub name: String,
    pub span: Span,
}

impl Id {
    pub fn new(name: impl ToString, span: Span) -> Self {
        Id {
            name: name.to_string(),
            span,
        }
    }
}

/// Symbol visibility as written in source: `pub` widens to [`Visibility::Global`],
/// everything else stays private to its compilation unit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Visibility {
    Global,
    #[default]
    FilePrivate,
}

/// One parsed source file: the unit name doubles as the file identifier
/// used by visibility checks.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SourceUnit {
    pub name: String,
    pub items: Vec<Item>,
}

impl SourceUnit {
    pub fn new(name: impl ToString, items: Vec<Item>) -> Self {
        SourceUnit {
            name: name.to_string(),
            items,
        }
    }
}

/// Top-level item of a unit.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum Item {
    Function(FunctionDef),
    Resource(ResourceDef),
}
