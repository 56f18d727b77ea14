use super::Span;

/// A type as written in source, before resolution against the registry.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum TypeNode {
    /// A plain name: a primitive or a resource reference.
    Named { name: String, span: Span },
    /// A generic application such as `Vector<i32>`.
    Generic {
        name: String,
        arguments: Vec<TypeNode>,
        span: Span,
    },
    /// The unit type `()`.
    Unit { span: Span },
}

impl TypeNode {
    pub fn named(name: impl ToString, span: Span) -> Self {
        TypeNode::Named {
            name: name.to_string(),
            span,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            TypeNode::Named { span, .. }
            | TypeNode::Generic { span, .. }
            | TypeNode::Unit { span } => *span,
        }
    }
}

impl std::fmt::Display for TypeNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TypeNode::Named { name, .. } => f.write_str(name),
            TypeNode::Generic {
                name, arguments, ..
            } => {
                let arguments = arguments
                    .iter()
                    .map(|argument| argument.to_string())
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "{name}<{arguments}>")
            }
            TypeNode::Unit { .. } => f.write_str("()"),
        }
    }
}
