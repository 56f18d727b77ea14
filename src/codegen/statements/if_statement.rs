//! `if`/`else` lowering: condition block, two scoped branch blocks and a
//! join block that is skipped entirely when both arms terminate.
//! Reachability after the statement is the disjunction of the arms (a
//! missing `else` always reaches).

use crate::{
    ast::IfStatement,
    codegen::{CgResult, CodeGen, CodegenContext},
    types::Type,
};

impl<'ctx> CodeGen<'ctx> for IfStatement {
    type Output = CgResult<bool>;

    fn codegen(&self, ctx: &CodegenContext<'ctx>) -> Self::Output {
        let condition = self.condition.codegen(ctx)?;
        let condition = condition
            .concretize(ctx, &Type::Bool, self.condition.span())?
            .into_int_value();

        let function = ctx.ir.current_function()?;
        let then_block = ctx.ir.append_block(function, "if_then");

        match &self.else_block {
            Some(else_body) => {
                let else_block = ctx.ir.append_block(function, "if_else");
                ctx.ir.condbr(condition, then_block, else_block)?;

                ctx.ir.position_at_end(then_block);
                ctx.symbols.borrow_mut().enter_scope();
                let then_reaches = self.then_block.codegen(ctx);
                ctx.symbols.borrow_mut().exit_scope();
                let then_end = (!ctx.ir.block_terminated()?).then(|| ctx.ir.current_block());

                ctx.ir.position_at_end(else_block);
                ctx.symbols.borrow_mut().enter_scope();
                let else_reaches = else_body.codegen(ctx);
                ctx.symbols.borrow_mut().exit_scope();

                let reaches = then_reaches || else_reaches;
                if reaches {
                    // Join only exists when someone can arrive at it.
                    let join_block = ctx.ir.append_block(function, "if_join");
                    if !ctx.ir.block_terminated()? {
                        ctx.ir.br(join_block)?;
                    }
                    if let Some(then_end) = then_end {
                        ctx.ir.position_at_end(then_end?);
                        ctx.ir.br(join_block)?;
                    }
                    ctx.ir.position_at_end(join_block);
                }
                Ok(reaches)
            }
            None => {
                let join_block = ctx.ir.append_block(function, "if_join");
                ctx.ir.condbr(condition, then_block, join_block)?;

                ctx.ir.position_at_end(then_block);
                ctx.symbols.borrow_mut().enter_scope();
                self.then_block.codegen(ctx);
                ctx.symbols.borrow_mut().exit_scope();
                if !ctx.ir.block_terminated()? {
                    ctx.ir.br(join_block)?;
                }

                ctx.ir.position_at_end(join_block);
                // The false edge always reaches the join.
                Ok(true)
            }
        }
    }
}
