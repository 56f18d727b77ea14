//! `e as T`: numeric conversions only. Untyped operands concretize to
//! their default type first, then convert like any other concrete value.

use crate::{
    ast::CastExpression,
    codegen::{conversion::create_conversion, CgResult, CodeGen, CodegenContext, Value},
};

impl<'ctx> CodeGen<'ctx> for CastExpression {
    type Output = CgResult<Value<'ctx>>;

    fn codegen(&self, ctx: &CodegenContext<'ctx>) -> Self::Output {
        let target = ctx.registry.resolve_type(&self.target, &ctx.unit())?;
        if !target.is_numeric() {
            return Err(ctx.error(
                self.span,
                format!("Cast target must be a numeric type, got {target}"),
            ));
        }

        let value = self.value.codegen(ctx)?;
        let (source, ir) = value.concretize_default(ctx, self.span)?;
        if !source.is_numeric() {
            return Err(ctx.error(
                self.span,
                format!("Cannot convert from {source} to {target}"),
            ));
        }

        let converted = create_conversion(ctx, ir, &source, &target, self.span)?;
        Ok(Value::concrete(target, converted))
    }
}
