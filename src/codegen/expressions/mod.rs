//! Expression lowering. Every expression produces a [`Value`], concrete
//! or untyped; the enclosing statement decides what type to impose.

mod binary;
mod call;
mod cast;
mod field_access;
mod id;
mod initializer;
mod literals;
mod method_call;
mod ternary;
mod unary;

pub(crate) use self::binary::emit_arithmetic;
pub(crate) use self::field_access::field_pointer;

use crate::ast::Expression;

use super::{CgResult, CodeGen, CodegenContext, Value};

impl<'ctx> CodeGen<'ctx> for Expression {
    type Output = CgResult<Value<'ctx>>;

    fn codegen(&self, ctx: &CodegenContext<'ctx>) -> Self::Output {
        match self {
            Expression::IntLiteral(literal) => literal.codegen(ctx),
            Expression::FloatLiteral(literal) => literal.codegen(ctx),
            Expression::BoolLiteral(literal) => literal.codegen(ctx),
            Expression::CharLiteral(literal) => literal.codegen(ctx),
            Expression::StringLiteral(literal) => literal.codegen(ctx),
            Expression::Identifier(id) => id.codegen(ctx),
            Expression::This(span) => id::codegen_this(ctx, *span),
            Expression::Unary(unary) => unary.codegen(ctx),
            Expression::Binary(binary) => binary.codegen(ctx),
            Expression::Ternary(ternary) => ternary.codegen(ctx),
            Expression::Cast(cast) => cast.codegen(ctx),
            Expression::Call(call) => call.codegen(ctx),
            Expression::MethodCall(call) => call.codegen(ctx),
            Expression::FieldAccess(access) => access.codegen(ctx),
            Expression::Initializer(initializer) => initializer.codegen(ctx),
        }
    }
}
