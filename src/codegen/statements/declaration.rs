//! `var`/`const` declarations: resolve or infer the type, allocate a
//! stack slot, store the initializer if present, bind the symbol.

use crate::{
    ast::VariableDeclaration,
    codegen::{CgResult, CodeGen, CodegenContext},
    symbols::VariableSymbol,
};

impl<'ctx> CodeGen<'ctx> for VariableDeclaration {
    type Output = CgResult<bool>;

    fn codegen(&self, ctx: &CodegenContext<'ctx>) -> Self::Output {
        let name = &self.name.name;

        let annotation = self
            .type_name
            .as_ref()
            .map(|node| ctx.registry.resolve_type(node, &ctx.unit()))
            .transpose()?;

        if self.is_const && self.initializer.is_none() {
            return Err(ctx.error(self.span, format!("Constant '{name}' must be initialized")));
        }

        let (ty, initial) = match (&self.initializer, annotation) {
            (Some(expression), Some(ty)) => {
                let value = expression.codegen(ctx)?;
                let value = value.concretize(ctx, &ty, expression.span())?;
                (ty, Some(value))
            }
            (Some(expression), None) => {
                // No annotation: an untyped initializer settles on its
                // default type.
                let value = expression.codegen(ctx)?;
                let (ty, value) = value.concretize_default(ctx, expression.span())?;
                (ty, Some(value))
            }
            (None, Some(ty)) => (ty, None),
            (None, None) => {
                return Err(ctx.error(
                    self.span,
                    format!("Variable '{name}' needs a type annotation or an initializer"),
                ));
            }
        };

        let storage = ctx.ir.alloca(ctx.llvm_type(&ty)?, name)?;
        if let Some(value) = initial {
            ctx.ir.store(storage, value)?;
        }

        ctx.symbols.borrow_mut().define_variable(VariableSymbol {
            name: name.clone(),
            ty,
            storage,
            is_const: self.is_const,
            is_initialized: self.initializer.is_some(),
        });

        Ok(true)
    }
}
