//! `while` lowering: condition, body and after blocks. The body runs
//! under a pushed loop context so `continue` branches to the condition
//! and `break` to the after block. The loop may iterate zero times, so a
//! `while` statement always falls through.

use crate::{
    ast::WhileLoop,
    codegen::{CgResult, CodeGen, CodegenContext, LoopContext},
    types::Type,
};

impl<'ctx> CodeGen<'ctx> for WhileLoop {
    type Output = CgResult<bool>;

    fn codegen(&self, ctx: &CodegenContext<'ctx>) -> Self::Output {
        let function = ctx.ir.current_function()?;
        let condition_block = ctx.ir.append_block(function, "while_condition");
        let body_block = ctx.ir.append_block(function, "while_body");
        let after_block = ctx.ir.append_block(function, "while_end");

        ctx.ir.br(condition_block)?;

        ctx.ir.position_at_end(condition_block);
        let condition = self.condition.codegen(ctx)?;
        let condition = condition
            .concretize(ctx, &Type::Bool, self.condition.span())?
            .into_int_value();
        ctx.ir.condbr(condition, body_block, after_block)?;

        ctx.ir.position_at_end(body_block);
        ctx.symbols.borrow_mut().enter_scope();
        ctx.push_loop(LoopContext {
            continue_block: condition_block,
            break_block: after_block,
        });
        self.body.codegen(ctx);
        ctx.pop_loop();
        ctx.symbols.borrow_mut().exit_scope();

        if !ctx.ir.block_terminated()? {
            ctx.ir.br(condition_block)?;
        }

        ctx.ir.position_at_end(after_block);
        Ok(true)
    }
}
