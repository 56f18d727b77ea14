use super::{FunctionDef, Id, Span, TypeNode, Visibility};

/// `resource Name { fields? } (: paths)?`
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ResourceDef {
    pub name: Id,
    pub fields: Vec<FieldDecl>,
    pub paths: Vec<PathDecl>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FieldDecl {
    pub name: Id,
    /// Fields must be explicitly typed; the grammar still allows omission,
    /// which registration rejects.
    pub type_name: Option<TypeNode>,
    pub is_const: bool,
    pub visibility: Visibility,
    pub span: Span,
}

/// `path (segment*)? : methods`, a group of methods under a shared path.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PathDecl {
    pub segments: Vec<PathSegmentDecl>,
    pub methods: Vec<FunctionDef>,
    pub span: Span,
}

/// A declared path segment: `/name` or the indexer `[name: type]`.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum PathSegmentDecl {
    Named(Id),
    Indexer {
        name: Id,
        type_name: TypeNode,
        span: Span,
    },
}
