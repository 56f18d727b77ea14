use super::{Block, Id, Span, TypeNode, Visibility};

/// `pub? def name(params?) (-> type)? : block`
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FunctionDef {
    pub name: Id,
    pub visibility: Visibility,
    pub parameters: Vec<Parameter>,
    /// `None` means the function returns unit.
    pub return_type: Option<TypeNode>,
    pub body: Block,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Parameter {
    pub name: Id,
    pub type_name: TypeNode,
    pub span: Span,
}

impl Parameter {
    pub fn new(name: Id, type_name: TypeNode) -> Self {
        let span = name.span;
        Parameter {
            name,
            type_name,
            span,
        }
    }
}
