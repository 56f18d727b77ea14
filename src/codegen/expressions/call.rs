//! Free function calls: resolve the symbol, check visibility and arity,
//! concretize every argument against its parameter type, then emit
//! through the function's call strategy.

use inkwell::values::BasicMetadataValueEnum;

use crate::{
    ast::CallExpression,
    codegen::{CgResult, CodeGen, CodegenContext, UntypedValue, Value},
    errors::CompileError,
    symbols::FunctionBody,
};

impl<'ctx> CodeGen<'ctx> for CallExpression {
    type Output = CgResult<Value<'ctx>>;

    fn codegen(&self, ctx: &CodegenContext<'ctx>) -> Self::Output {
        let name = &self.function.name;
        let symbol = ctx.symbols.borrow().find_function(name);
        let Some(function) = symbol else {
            return Err(ctx.error(self.span, format!("Unknown function: {name}")));
        };

        let accessible = ctx
            .symbols
            .borrow()
            .can_access(function.visibility, function.defined_in.as_deref());
        if !accessible {
            return Err(ctx.error(
                self.span,
                format!("Function '{name}' is not accessible from this file"),
            ));
        }

        match function.body {
            FunctionBody::VectorConstructor => {
                if !self.arguments.is_empty() {
                    return Err(ctx.error(
                        self.span,
                        format!(
                            "Function 'Vector' expects 0 arguments, got {}",
                            self.arguments.len()
                        ),
                    ));
                }
                // The element type comes from the use site.
                Ok(Value::Untyped(UntypedValue::EmptyVector))
            }
            FunctionBody::Declared { ref symbol } => {
                if self.arguments.len() != function.parameters.len() {
                    return Err(ctx.error(
                        self.span,
                        format!(
                            "Function '{name}' expects {} arguments, got {}",
                            function.parameters.len(),
                            self.arguments.len()
                        ),
                    ));
                }

                let mut arguments: Vec<BasicMetadataValueEnum<'ctx>> = Vec::new();
                for (argument, (_, parameter_type)) in
                    self.arguments.iter().zip(&function.parameters)
                {
                    let value = argument.codegen(ctx)?;
                    let value = value.concretize(ctx, parameter_type, argument.span())?;
                    arguments.push(value.into());
                }

                let callee = ctx.ir.get_function(symbol).ok_or_else(|| {
                    CompileError::internal(format!("function '{symbol}' was never declared"))
                })?;
                let result = ctx.ir.call_returning(callee, &arguments)?;
                Ok(Value::concrete(function.return_type, result))
            }
        }
    }
}
