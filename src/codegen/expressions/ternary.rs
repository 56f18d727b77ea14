//! `a if c else b`. Both branches are evaluated eagerly; the choice is a
//! `select`. When either branch is still untyped the whole ternary stays
//! untyped so a use site can impose one type on both branches at once.

use crate::{
    ast::TernaryExpression,
    codegen::{CgResult, CodeGen, CodegenContext, UntypedValue, Value},
    types::Type,
};

impl<'ctx> CodeGen<'ctx> for TernaryExpression {
    type Output = CgResult<Value<'ctx>>;

    fn codegen(&self, ctx: &CodegenContext<'ctx>) -> Self::Output {
        let condition = self.condition.codegen(ctx)?;
        let condition = condition
            .concretize(ctx, &Type::Bool, self.span)?
            .into_int_value();

        let then_value = self.then_value.codegen(ctx)?;
        let else_value = self.else_value.codegen(ctx)?;

        match (then_value, else_value) {
            (
                Value::Concrete {
                    ty: then_type,
                    ir: then_ir,
                },
                Value::Concrete {
                    ty: else_type,
                    ir: else_ir,
                },
            ) => {
                if then_type != else_type {
                    return Err(ctx.error(
                        self.span,
                        format!("Incompatible branch types {then_type} and {else_type}"),
                    ));
                }
                let selected = ctx.ir.select(condition, then_ir, else_ir)?;
                Ok(Value::concrete(then_type, selected))
            }
            (then_value, else_value) => Ok(Value::Untyped(UntypedValue::Ternary {
                condition,
                then_value: Box::new(then_value),
                else_value: Box::new(else_value),
            })),
        }
    }
}
