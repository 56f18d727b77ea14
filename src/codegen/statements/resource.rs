//! Resource method bodies. Signatures were declared during registration;
//! here every method gets its prologue (`this`, path indexer parameters,
//! explicit parameters) and its lowered body.

use crate::{
    ast::{PathSegmentDecl, ResourceDef},
    codegen::{CgResult, CodegenContext},
    types::{MethodBody, Type},
};

use super::function::emit_body;

pub fn generate_resource_bodies<'ctx>(
    ctx: &CodegenContext<'ctx>,
    def: &ResourceDef,
) -> CgResult<()> {
    let Some(resource) = ctx.registry.get_resource(&def.name.name) else {
        return Ok(());
    };

    for path in &def.paths {
        // The uniqueness key needs no type resolution, so a method whose
        // registration failed simply is not found and gets skipped.
        let key = path
            .segments
            .iter()
            .map(|segment| match segment {
                PathSegmentDecl::Named(id) => id.name.clone(),
                PathSegmentDecl::Indexer { .. } => "{Indexer}".to_string(),
            })
            .collect::<Vec<_>>()
            .join("/");

        for method_def in &path.methods {
            let Some(method) = resource.find_method(&key, &method_def.name.name) else {
                continue;
            };
            let MethodBody::Declared { symbol } = &method.body else {
                continue;
            };
            let Some(function) = ctx.ir.get_function(symbol) else {
                continue;
            };
            if function.count_basic_blocks() > 0 {
                continue;
            }

            let mut bindings = vec![(
                "this".to_string(),
                Type::Resource(resource.clone()),
            )];
            bindings.extend(method.indexer_parameters());
            bindings.extend(method.parameters.iter().cloned());

            emit_body(
                ctx,
                function,
                &format!("{}.{}", def.name.name, method.name),
                &method.return_type,
                &bindings,
                &method_def.body,
                method_def.span,
                false,
            )?;
        }
    }

    Ok(())
}
