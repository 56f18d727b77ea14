//! Resource initializers `R { field = value, … }`: every field supplied
//! exactly once, each value concretized to its field type, the instance
//! GC-allocated and filled in declaration order.

use std::collections::HashSet;

use crate::{
    ast::InitializerExpression,
    codegen::{CgResult, CodeGen, CodegenContext, Value},
    types::Type,
};

impl<'ctx> CodeGen<'ctx> for InitializerExpression {
    type Output = CgResult<Value<'ctx>>;

    fn codegen(&self, ctx: &CodegenContext<'ctx>) -> Self::Output {
        let name = &self.resource.name;
        let Some(resource) = ctx.registry.get_resource(name) else {
            return Err(ctx.error(self.span, format!("Unknown type: {name}")));
        };

        let accessible = ctx.symbols.borrow().can_access(
            resource.initializer_visibility(),
            resource.defined_in().as_deref(),
        );
        if !accessible {
            return Err(ctx.error(
                self.span,
                format!("Initializer of resource '{name}' is not accessible from this file"),
            ));
        }

        // Shape check before any IR is emitted.
        let mut seen = HashSet::new();
        for initializer in &self.fields {
            if !resource.has_field(&initializer.name.name) {
                return Err(ctx.error(
                    initializer.span,
                    format!(
                        "Unknown field '{}' in resource {name}",
                        initializer.name.name
                    ),
                ));
            }
            if !seen.insert(initializer.name.name.clone()) {
                return Err(ctx.error(
                    initializer.span,
                    format!(
                        "Field '{}' is initialized more than once",
                        initializer.name.name
                    ),
                ));
            }
        }
        for field in resource.fields() {
            if !seen.contains(&field.name) {
                return Err(ctx.error(
                    self.span,
                    format!("Missing initializer for field '{}'", field.name),
                ));
            }
        }

        let struct_type = ctx.resource_struct_type(&resource);
        let size = ctx.ir.size_of(struct_type.into())?;
        let instance = ctx.ir.gc_malloc(size)?;

        // Stores happen in field declaration order, not source order.
        for (index, field) in resource.fields().iter().enumerate() {
            let initializer = self
                .fields
                .iter()
                .find(|candidate| candidate.name.name == field.name)
                .expect("shape check guarantees presence");

            let value = initializer.value.codegen(ctx)?;
            let value = value.concretize(ctx, &field.ty, initializer.span)?;
            let pointer =
                ctx.ir
                    .struct_gep(struct_type, instance, index as u32, &field.name)?;
            ctx.ir.store(pointer, value)?;
        }

        Ok(Value::concrete(
            Type::Resource(resource),
            instance.into(),
        ))
    }
}
