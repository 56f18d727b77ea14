//! Field access on resource values: a struct GEP against the resource's
//! heap struct, then a load. Assignment reuses the pointer path.

use inkwell::values::PointerValue;

use crate::{
    ast::{Expression, FieldAccessExpression, Span},
    codegen::{CgResult, CodeGen, CodegenContext, Value},
    types::Field,
};

impl<'ctx> CodeGen<'ctx> for FieldAccessExpression {
    type Output = CgResult<Value<'ctx>>;

    fn codegen(&self, ctx: &CodegenContext<'ctx>) -> Self::Output {
        let (field, pointer) = field_pointer(ctx, &self.receiver, &self.field.name, self.span)?;
        let loaded = ctx
            .ir
            .load(ctx.llvm_type(&field.ty)?, pointer, &self.field.name)?;
        Ok(Value::concrete(field.ty, loaded))
    }
}

/// Resolves `receiver.field` to the field's metadata and its address,
/// checking resource shape and visibility on the way.
pub(crate) fn field_pointer<'ctx>(
    ctx: &CodegenContext<'ctx>,
    receiver: &Expression,
    field_name: &str,
    span: Span,
) -> CgResult<(Field, PointerValue<'ctx>)> {
    let value = receiver.codegen(ctx)?;
    let (receiver_type, receiver_ir) = value.concretize_default(ctx, span)?;

    let Some(resource) = receiver_type.as_resource() else {
        return Err(ctx.error(
            span,
            format!("Type {receiver_type} has no fields"),
        ));
    };

    let Some(index) = resource.field_index(field_name) else {
        return Err(ctx.error(
            span,
            format!(
                "Unknown field '{field_name}' in resource {}",
                resource.name()
            ),
        ));
    };
    let field = resource.field(field_name).expect("index was just found");

    let accessible = ctx
        .symbols
        .borrow()
        .can_access(field.visibility, resource.defined_in().as_deref());
    if !accessible {
        return Err(ctx.error(
            span,
            format!("Field '{field_name}' is not accessible from this file"),
        ));
    }

    let struct_type = ctx.resource_struct_type(resource);
    let pointer = ctx.ir.struct_gep(
        struct_type,
        receiver_ir.into_pointer_value(),
        index as u32,
        field_name,
    )?;
    Ok((field, pointer))
}
