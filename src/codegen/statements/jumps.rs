//! `return`, `break` and `continue`: the statements that terminate the
//! current block.

use crate::{
    ast::{ReturnStatement, Span},
    codegen::{CgResult, CodeGen, CodegenContext},
    types::Type,
};

impl<'ctx> CodeGen<'ctx> for ReturnStatement {
    type Output = CgResult<bool>;

    fn codegen(&self, ctx: &CodegenContext<'ctx>) -> Self::Output {
        let return_type = ctx
            .symbols
            .borrow()
            .current_return_type()
            .expect("return statement outside of a function");

        let value = match &self.value {
            Some(expression) => {
                let value = expression.codegen(ctx)?;
                value.concretize(ctx, &return_type, expression.span())?
            }
            None => {
                if return_type != Type::Unit {
                    return Err(ctx.error(
                        self.span,
                        format!("Return without a value in a function returning {return_type}"),
                    ));
                }
                ctx.ir.unit_value()
            }
        };

        ctx.ir.ret(Some(value))?;
        Ok(false)
    }
}

pub fn codegen_break<'ctx>(ctx: &CodegenContext<'ctx>, span: Span) -> CgResult<bool> {
    let Some(current_loop) = ctx.current_loop() else {
        return Err(ctx.error(span, "'break' outside of a loop"));
    };
    ctx.ir.br(current_loop.break_block)?;
    Ok(false)
}

pub fn codegen_continue<'ctx>(ctx: &CodegenContext<'ctx>, span: Span) -> CgResult<bool> {
    let Some(current_loop) = ctx.current_loop() else {
        return Err(ctx.error(span, "'continue' outside of a loop"));
    };
    ctx.ir.br(current_loop.continue_block)?;
    Ok(false)
}
