//! Identifier and `this` resolution: a readable variable loads from its
//! stack slot.

use crate::{
    ast::{Id, Span},
    codegen::{CgResult, CodeGen, CodegenContext, Value},
};

impl<'ctx> CodeGen<'ctx> for Id {
    type Output = CgResult<Value<'ctx>>;

    fn codegen(&self, ctx: &CodegenContext<'ctx>) -> Self::Output {
        let symbols = ctx.symbols.borrow();
        let Some(variable) = symbols.find_variable(&self.name) else {
            return Err(ctx.error(self.span, format!("Unknown identifier: {}", self.name)));
        };
        if !variable.is_initialized {
            return Err(ctx.error(
                self.span,
                format!("Variable '{}' is read before initialization", self.name),
            ));
        }
        drop(symbols);

        let loaded = ctx.ir.load(
            ctx.llvm_type(&variable.ty)?,
            variable.storage,
            &self.name,
        )?;
        Ok(Value::concrete(variable.ty, loaded))
    }
}

/// `this` resolves to the receiver slot the method prologue bound; using
/// it anywhere else is an error.
pub fn codegen_this<'ctx>(ctx: &CodegenContext<'ctx>, span: Span) -> CgResult<Value<'ctx>> {
    let receiver = ctx.symbols.borrow().find_readable_variable("this");
    let Some(receiver) = receiver else {
        return Err(ctx.error(span, "'this' is only available inside a method"));
    };

    let loaded = ctx
        .ir
        .load(ctx.llvm_type(&receiver.ty)?, receiver.storage, "this")?;
    Ok(Value::concrete(receiver.ty, loaded))
}
