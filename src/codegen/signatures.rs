//! # Signature Registration
//!
//! Two passes across all units before any body is lowered:
//!
//! - **Pass A** creates an opaque named struct and registers the resource
//!   for every `resource` declaration, so cross-file (and recursive)
//!   references resolve.
//! - **Pass B** fills in field layouts and declares every method with its
//!   mangled name and `(this, indexers…, params…)` signature. Duplicates
//!   short-circuited in pass A are diagnosed here.
//!
//! A third pass declares all free functions, enforcing the `main`
//! contract on the way. Bodies come later, once every signature exists,
//! which is what makes forward and mutual references work.

use crate::{
    ast::{Item, PathSegmentDecl, SourceUnit, Visibility},
    errors::CompileError,
    symbols::{FunctionBody, FunctionSymbol},
    types::{mangled_method_name, path_key, Field, Method, MethodBody, PathSegment, Type, TypeHandle},
};

use super::{CgResult, CodegenContext};

/// Pass A: opaque resource struct types.
pub fn register_resource_types(ctx: &CodegenContext, units: &[SourceUnit]) {
    for unit in units {
        for item in &unit.items {
            let Item::Resource(def) = item else { continue };
            let name = &def.name.name;
            if ctx.registry.get_resource(name).is_some() {
                // Duplicate declarations are diagnosed in pass B.
                continue;
            }
            ctx.registry
                .create_resource_type(name, Some(unit.name.clone()), vec![]);
            ctx.ir.struct_named(&format!("{name}_struct"));
        }
    }
}

/// Pass B: field layouts and method declarations.
pub fn register_resource_bodies(ctx: &CodegenContext, units: &[SourceUnit]) -> CgResult<()> {
    for unit in units {
        ctx.set_unit(&unit.name);
        for item in &unit.items {
            let Item::Resource(def) = item else { continue };
            register_resource(ctx, def)?;
        }
    }
    Ok(())
}

fn register_resource(ctx: &CodegenContext, def: &crate::ast::ResourceDef) -> CgResult<()> {
    let name = &def.name.name;
    let resource = ctx
        .registry
        .get_resource(name)
        .expect("pass A registered every resource");

    if ctx
        .symbols
        .borrow_mut()
        .define_resource(resource.clone())
        .is_err()
    {
        ctx.report(ctx.error(def.span, format!("Resource already defined: {name}")));
        return Ok(());
    }

    // Fields, in declaration order.
    let mut fields_ok = true;
    for field in &def.fields {
        let field_name = &field.name.name;
        let Some(type_name) = &field.type_name else {
            ctx.report(ctx.error(
                field.span,
                format!("Resource field must have explicit type: {field_name}"),
            ));
            fields_ok = false;
            continue;
        };
        let ty = match ctx.registry.resolve_type(type_name, &ctx.unit()) {
            Ok(ty) => ty,
            Err(error) => {
                ctx.report(error);
                fields_ok = false;
                continue;
            }
        };
        if resource.has_field(field_name) {
            ctx.report(ctx.error(
                field.span,
                format!("Ambiguous field name in resource: {field_name}"),
            ));
            fields_ok = false;
            continue;
        }
        resource.push_field(Field {
            name: field_name.clone(),
            ty,
            is_const: field.is_const,
            visibility: field.visibility,
        });
    }

    if fields_ok {
        let struct_type = ctx.ir.struct_named(&format!("{name}_struct"));
        let field_types = resource
            .fields()
            .iter()
            .map(|field| ctx.llvm_type(&field.ty))
            .collect::<CgResult<Vec<_>>>()?;
        ctx.ir.struct_set_body(struct_type, &field_types);
    }

    let private_fields = resource
        .fields()
        .iter()
        .any(|field| field.visibility == Visibility::FilePrivate);
    resource.set_initializer_visibility(if private_fields {
        Visibility::FilePrivate
    } else {
        Visibility::Global
    });

    // Methods, grouped by path.
    for path in &def.paths {
        if path.methods.is_empty() {
            ctx.report(ctx.error(
                path.span,
                "Resource path must contain at least one method",
            ));
            continue;
        }

        let mut segments = Vec::new();
        let mut segments_ok = true;
        for segment in &path.segments {
            match segment {
                PathSegmentDecl::Named(id) => segments.push(PathSegment::Named(id.name.clone())),
                PathSegmentDecl::Indexer {
                    name: parameter,
                    type_name,
                    ..
                } => match ctx.registry.resolve_type(type_name, &ctx.unit()) {
                    Ok(ty) => segments.push(PathSegment::Indexer {
                        name: parameter.name.clone(),
                        ty,
                    }),
                    Err(error) => {
                        ctx.report(error);
                        segments_ok = false;
                    }
                },
            }
        }
        if !segments_ok {
            continue;
        }

        for method in &path.methods {
            let method_name = &method.name.name;

            let mut parameters = Vec::new();
            let mut signature_ok = true;
            for parameter in &method.parameters {
                match ctx.registry.resolve_type(&parameter.type_name, &ctx.unit()) {
                    Ok(ty) => parameters.push((parameter.name.name.clone(), ty)),
                    Err(error) => {
                        ctx.report(error);
                        signature_ok = false;
                    }
                }
            }
            let return_type = match &method.return_type {
                Some(node) => match ctx.registry.resolve_type(node, &ctx.unit()) {
                    Ok(ty) => ty,
                    Err(error) => {
                        ctx.report(error);
                        signature_ok = false;
                        Type::Unit
                    }
                },
                None => Type::Unit,
            };
            if !signature_ok {
                continue;
            }

            if resource.has_method(&path_key(&segments), method_name) {
                let path_display = if segments.is_empty() {
                    name.clone()
                } else {
                    format!("{name}/{}", path_key(&segments))
                };
                ctx.report(ctx.error(
                    method.span,
                    format!("Method {method_name} is already defined in path {path_display}"),
                ));
                continue;
            }

            // (this, path indexers…, explicit params…) -> ret
            let symbol = mangled_method_name(name, &segments, method_name);
            let mut llvm_parameters = vec![Type::Resource(resource.clone())];
            llvm_parameters.extend(segments.iter().filter_map(|segment| match segment {
                PathSegment::Indexer { ty, .. } => Some(ty.clone()),
                PathSegment::Named(_) => None,
            }));
            llvm_parameters.extend(parameters.iter().map(|(_, ty)| ty.clone()));
            let function_type = ctx.llvm_function_type(&return_type, &llvm_parameters)?;
            ctx.ir.add_function(&symbol, function_type);

            resource.push_method(Method {
                name: method_name.clone(),
                return_type,
                parameters,
                visibility: method.visibility,
                path: segments.clone(),
                body: MethodBody::Declared { symbol },
            });
        }
    }

    Ok(())
}

/// Third pass: free function declarations and the `main` contract.
pub fn declare_functions(ctx: &CodegenContext, units: &[SourceUnit]) -> CgResult<()> {
    for unit in units {
        ctx.set_unit(&unit.name);
        for item in &unit.items {
            let Item::Function(def) = item else { continue };
            let name = &def.name.name;

            let mut parameters = Vec::new();
            let mut signature_ok = true;
            for parameter in &def.parameters {
                match ctx.registry.resolve_type(&parameter.type_name, &unit.name) {
                    Ok(ty) => parameters.push((parameter.name.name.clone(), ty)),
                    Err(error) => {
                        ctx.report(error);
                        signature_ok = false;
                    }
                }
            }
            let return_type = match &def.return_type {
                Some(node) => match ctx.registry.resolve_type(node, &unit.name) {
                    Ok(ty) => ty,
                    Err(error) => {
                        ctx.report(error);
                        signature_ok = false;
                        Type::Unit
                    }
                },
                None => Type::Unit,
            };
            if !signature_ok {
                continue;
            }

            if name == "main" {
                let i32_type = ctx.registry.get_type(&TypeHandle::I32);
                if def.return_type.is_none() || return_type != i32_type {
                    ctx.report(ctx.error(def.span, "Main function must return i32"));
                    continue;
                }
                if !parameters.is_empty() {
                    ctx.report(ctx.error(def.span, "Main function must not take parameters"));
                    continue;
                }
            }

            let symbol = FunctionSymbol {
                name: name.clone(),
                return_type: return_type.clone(),
                parameters: parameters.clone(),
                visibility: def.visibility,
                defined_in: Some(unit.name.clone()),
                body: FunctionBody::Declared {
                    symbol: name.clone(),
                },
            };
            if ctx.symbols.borrow_mut().define_function(symbol).is_err() {
                ctx.report(CompileError::error(
                    &unit.name,
                    def.name.span,
                    format!("Function '{name}' is already defined"),
                ));
                continue;
            }

            let parameter_types: Vec<Type> =
                parameters.iter().map(|(_, ty)| ty.clone()).collect();
            let function_type = ctx.llvm_function_type(&return_type, &parameter_types)?;
            ctx.ir.add_function(name, function_type);
        }
    }
    Ok(())
}
