//! Literal lowering. Numeric literals stay untyped until a use site
//! imposes a type; boolean, char and string literals are concrete
//! immediately. A string literal is a pointer to a fresh `String`
//! instance whose `Vector<u8>` holds the UTF-8 bytes plus the trailing
//! NUL.

use crate::{
    ast::{BoolLiteral, CharLiteral, FloatLiteral, IntLiteral, StringLiteral},
    codegen::{builtins, CgResult, CodeGen, CodegenContext, UntypedValue, Value},
    types::Type,
};

impl<'ctx> CodeGen<'ctx> for IntLiteral {
    type Output = CgResult<Value<'ctx>>;

    fn codegen(&self, _ctx: &CodegenContext<'ctx>) -> Self::Output {
        Ok(Value::Untyped(UntypedValue::Int(self.value)))
    }
}

impl<'ctx> CodeGen<'ctx> for FloatLiteral {
    type Output = CgResult<Value<'ctx>>;

    fn codegen(&self, _ctx: &CodegenContext<'ctx>) -> Self::Output {
        Ok(Value::Untyped(UntypedValue::Float(self.value)))
    }
}

impl<'ctx> CodeGen<'ctx> for BoolLiteral {
    type Output = CgResult<Value<'ctx>>;

    fn codegen(&self, ctx: &CodegenContext<'ctx>) -> Self::Output {
        Ok(Value::concrete(
            Type::Bool,
            ctx.ir.const_bool(self.value).into(),
        ))
    }
}

impl<'ctx> CodeGen<'ctx> for CharLiteral {
    type Output = CgResult<Value<'ctx>>;

    fn codegen(&self, ctx: &CodegenContext<'ctx>) -> Self::Output {
        let scalar = ctx
            .ir
            .const_int(ctx.ir.char_type(), u64::from(self.value as u32), false);
        Ok(Value::concrete(Type::Char, scalar.into()))
    }
}

impl<'ctx> CodeGen<'ctx> for StringLiteral {
    type Output = CgResult<Value<'ctx>>;

    fn codegen(&self, ctx: &CodegenContext<'ctx>) -> Self::Output {
        let string = builtins::string::build_string_literal(ctx, &self.value)?;
        let ty = Type::Resource(builtins::string::string_resource(ctx)?);
        Ok(Value::concrete(ty, string.into()))
    }
}
