//! Statement lowering and reachability tracking.
//!
//! Every statement lowerer returns a single boolean: whether control may
//! fall through to the next statement. A block keeps lowering after a
//! reported error, but once a statement terminates the block, every
//! following statement is warned as unreachable and skipped, which is
//! what keeps each emitted basic block at exactly one terminator.

mod assignment;
mod declaration;
mod function;
mod if_statement;
mod jumps;
mod resource;
mod while_loop;

pub use self::function::generate_function_body;
pub use self::resource::generate_resource_bodies;

use crate::ast::{Block, Statement};

use super::{CgResult, CodeGen, CodegenContext};

impl<'ctx> CodeGen<'ctx> for Statement {
    /// `Ok(true)` iff control can fall through to the next statement.
    type Output = CgResult<bool>;

    fn codegen(&self, ctx: &CodegenContext<'ctx>) -> Self::Output {
        match self {
            Statement::VariableDeclaration(declaration) => declaration.codegen(ctx),
            Statement::Assignment(assignment) => assignment.codegen(ctx),
            Statement::If(if_statement) => if_statement.codegen(ctx),
            Statement::While(while_loop) => while_loop.codegen(ctx),
            Statement::Return(return_statement) => return_statement.codegen(ctx),
            Statement::Break(span) => jumps::codegen_break(ctx, *span),
            Statement::Continue(span) => jumps::codegen_continue(ctx, *span),
            Statement::Expression(expression) => {
                // Evaluated for side effects; the value is dropped.
                expression.codegen(ctx)?;
                Ok(true)
            }
        }
    }
}

impl<'ctx> CodeGen<'ctx> for Block {
    /// Whether the block falls through its end. Errors inside the block
    /// are reported and lowering continues with the next statement.
    type Output = bool;

    fn codegen(&self, ctx: &CodegenContext<'ctx>) -> Self::Output {
        let mut reachable = true;
        for statement in &self.statements {
            if !reachable {
                ctx.warn(statement.span(), "Unreachable code");
                continue;
            }
            match statement.codegen(ctx) {
                Ok(falls_through) => reachable = falls_through,
                Err(error) => ctx.report(error),
            }
        }
        reachable
    }
}
