use super::{Id, Span, TypeNode};

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum Expression {
    IntLiteral(IntLiteral),
    FloatLiteral(FloatLiteral),
    BoolLiteral(BoolLiteral),
    CharLiteral(CharLiteral),
    StringLiteral(StringLiteral),
    Identifier(Id),
    This(Span),
    Unary(UnaryExpression),
    Binary(BinaryExpression),
    Ternary(TernaryExpression),
    Cast(CastExpression),
    Call(CallExpression),
    MethodCall(MethodCallExpression),
    FieldAccess(FieldAccessExpression),
    Initializer(InitializerExpression),
}

impl Expression {
    pub fn span(&self) -> Span {
        match self {
            Expression::IntLiteral(inner) => inner.span,
            Expression::FloatLiteral(inner) => inner.span,
            Expression::BoolLiteral(inner) => inner.span,
            Expression::CharLiteral(inner) => inner.span,
            Expression::StringLiteral(inner) => inner.span,
            Expression::Identifier(id) => id.span,
            Expression::This(span) => *span,
            Expression::Unary(inner) => inner.span,
            Expression::Binary(inner) => inner.span,
            Expression::Ternary(inner) => inner.span,
            Expression::Cast(inner) => inner.span,
            Expression::Call(inner) => inner.span,
            Expression::MethodCall(inner) => inner.span,
            Expression::FieldAccess(inner) => inner.span,
            Expression::Initializer(inner) => inner.span,
        }
    }
}

/// An integer literal. The value is kept wide enough to hold every
/// representable Reso integer; the concrete type is picked at the use site.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct IntLiteral {
    pub value: i128,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FloatLiteral {
    pub value: f64,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct BoolLiteral {
    pub value: bool,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CharLiteral {
    pub value: char,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct StringLiteral {
    pub value: String,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct UnaryExpression {
    pub operator: UnaryOperator,
    pub operand: Box<Expression>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum UnaryOperator {
    /// `+x`
    Plus,
    /// `-x`
    Minus,
    /// `~x`
    BitNot,
    /// `not x`
    Not,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct BinaryExpression {
    pub operator: BinaryOperator,
    pub left: Box<Expression>,
    pub right: Box<Expression>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum BinaryOperator {
    Add,
    Sub,
    Mul,
    /// `div`, truncating division
    Div,
    /// `rem`, truncating remainder
    Rem,
    /// `mod`, mathematical modulo
    Mod,
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
    Less,
    LessEq,
    Greater,
    GreaterEq,
    Eq,
    NotEq,
    And,
    Or,
}

impl BinaryOperator {
    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            BinaryOperator::Less
                | BinaryOperator::LessEq
                | BinaryOperator::Greater
                | BinaryOperator::GreaterEq
                | BinaryOperator::Eq
                | BinaryOperator::NotEq
        )
    }

    pub fn is_logical(&self) -> bool {
        matches!(self, BinaryOperator::And | BinaryOperator::Or)
    }

    /// Division-like operators, rejected on a constant zero divisor.
    pub fn is_division(&self) -> bool {
        matches!(
            self,
            BinaryOperator::Div | BinaryOperator::Rem | BinaryOperator::Mod
        )
    }

    /// Operators valid on integer operands only.
    pub fn is_integer_only(&self) -> bool {
        matches!(
            self,
            BinaryOperator::BitAnd
                | BinaryOperator::BitOr
                | BinaryOperator::BitXor
                | BinaryOperator::Shl
                | BinaryOperator::Shr
        )
    }
}

impl std::fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let symbol = match self {
            BinaryOperator::Add => "+",
            BinaryOperator::Sub => "-",
            BinaryOperator::Mul => "*",
            BinaryOperator::Div => "div",
            BinaryOperator::Rem => "rem",
            BinaryOperator::Mod => "mod",
            BinaryOperator::BitAnd => "&",
            BinaryOperator::BitOr => "|",
            BinaryOperator::BitXor => "^",
            BinaryOperator::Shl => "<<",
            BinaryOperator::Shr => ">>",
            BinaryOperator::Less => "<",
            BinaryOperator::LessEq => "<=",
            BinaryOperator::Greater => ">",
            BinaryOperator::GreaterEq => ">=",
            BinaryOperator::Eq => "==",
            BinaryOperator::NotEq => "!=",
            BinaryOperator::And => "and",
            BinaryOperator::Or => "or",
        };
        f.write_str(symbol)
    }
}

/// `then_value if condition else else_value`
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TernaryExpression {
    pub condition: Box<Expression>,
    pub then_value: Box<Expression>,
    pub else_value: Box<Expression>,
    pub span: Span,
}

/// `value as target`
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CastExpression {
    pub value: Box<Expression>,
    pub target: TypeNode,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CallExpression {
    pub function: Id,
    pub arguments: Vec<Expression>,
    pub span: Span,
}

/// One `/segment` between a receiver and its method: either a path name
/// or an indexer argument expression.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum CallSegment {
    Named(Id),
    Index(Expression),
}

impl CallSegment {
    pub fn span(&self) -> Span {
        match self {
            CallSegment::Named(id) => id.span,
            CallSegment::Index(expression) => expression.span(),
        }
    }
}

/// `receiver/segment/{index}.method(arguments)`
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MethodCallExpression {
    pub receiver: Box<Expression>,
    pub segments: Vec<CallSegment>,
    pub method: Id,
    pub arguments: Vec<Expression>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FieldAccessExpression {
    pub receiver: Box<Expression>,
    pub field: Id,
    pub span: Span,
}

/// `Resource { field = value, … }`
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct InitializerExpression {
    pub resource: Id,
    pub fields: Vec<FieldInitializer>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FieldInitializer {
    pub name: Id,
    pub value: Expression,
    pub span: Span,
}
