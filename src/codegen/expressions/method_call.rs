//! # Method Call Lowering
//!
//! `receiver/segment/{index}.method(args)` resolves a method by
//! `(receiver type, path, method name)`:
//!
//! - named source segments must match the declared path segment exactly;
//! - indexer positions take an argument expression, concretized to the
//!   indexer's parameter type;
//! - `Vector<T>` methods substitute the receiver's element type for the
//!   declared placeholder before any argument is checked.
//!
//! Dispatch is monomorphic: declared methods call their mangled LLVM
//! function with the receiver as leading argument; synthesized methods
//! (the `Vector` operations) emit their IR inline at the call site.

use inkwell::values::{BasicMetadataValueEnum, BasicValueEnum};

use crate::{
    ast::{CallSegment, Expression, MethodCallExpression, Span},
    codegen::{builtins, CgResult, CodeGen, CodegenContext, Value},
    errors::CompileError,
    types::{Method, MethodBody, PathSegment, Type},
};

impl<'ctx> CodeGen<'ctx> for MethodCallExpression {
    type Output = CgResult<Value<'ctx>>;

    fn codegen(&self, ctx: &CodegenContext<'ctx>) -> Self::Output {
        let receiver = self.receiver.codegen(ctx)?;
        let (receiver_type, receiver_ir) = receiver.concretize_default(ctx, self.span)?;

        let method = resolve_method(
            ctx,
            &receiver_type,
            &self.segments,
            &self.method.name,
            self.span,
        )?;

        let defined_in = receiver_type
            .as_resource()
            .and_then(|resource| resource.defined_in());
        let accessible = ctx
            .symbols
            .borrow()
            .can_access(method.visibility, defined_in.as_deref());
        if !accessible {
            return Err(ctx.error(
                self.span,
                format!(
                    "Method '{}' is not accessible from this file",
                    self.method.name
                ),
            ));
        }

        // Vector methods are declared against the element placeholder.
        let element = receiver_type
            .as_resource()
            .filter(|resource| resource.is_vector())
            .and_then(|resource| resource.element_type());
        let substitute = |ty: &Type| match &element {
            Some(element) => ty.substitute("T", element),
            None => ty.clone(),
        };

        // Indexer segments contribute arguments in path order.
        let mut indexer_values: Vec<BasicValueEnum<'ctx>> = Vec::new();
        for (declared, source) in method.path.iter().zip(&self.segments) {
            if let PathSegment::Indexer { ty, .. } = declared {
                let expression = segment_expression(source);
                let target = substitute(ty);
                let value = expression.codegen(ctx)?;
                indexer_values.push(value.concretize(ctx, &target, expression.span())?);
            }
        }

        if self.arguments.len() != method.parameters.len() {
            return Err(ctx.error(
                self.span,
                format!(
                    "Method '{}' expects {} arguments, got {}",
                    self.method.name,
                    method.parameters.len(),
                    self.arguments.len()
                ),
            ));
        }

        let mut argument_values: Vec<BasicValueEnum<'ctx>> = Vec::new();
        for (argument, (_, parameter_type)) in self.arguments.iter().zip(&method.parameters) {
            let target = substitute(parameter_type);
            let value = argument.codegen(ctx)?;
            argument_values.push(value.concretize(ctx, &target, argument.span())?);
        }

        let return_type = substitute(&method.return_type);

        match &method.body {
            MethodBody::Declared { symbol } => {
                let callee = ctx.ir.get_function(symbol).ok_or_else(|| {
                    CompileError::internal(format!("method '{symbol}' was never declared"))
                })?;

                let mut call_arguments: Vec<BasicMetadataValueEnum<'ctx>> = vec![receiver_ir.into()];
                call_arguments.extend(indexer_values.iter().map(|value| BasicMetadataValueEnum::from(*value)));
                call_arguments.extend(argument_values.iter().map(|value| BasicMetadataValueEnum::from(*value)));

                let result = ctx.ir.call_returning(callee, &call_arguments)?;
                Ok(Value::concrete(return_type, result))
            }
            MethodBody::Builtin(kind) => {
                let resource = receiver_type.as_resource().ok_or_else(|| {
                    CompileError::internal("builtin method on a non-resource receiver")
                })?;
                builtins::vector::emit_builtin_method(
                    ctx,
                    *kind,
                    resource,
                    receiver_ir.into_pointer_value(),
                    &indexer_values,
                    &argument_values,
                    self.span,
                )
            }
        }
    }
}

/// A source segment in an indexer position is an argument expression; a
/// bare name becomes an identifier read.
fn segment_expression(segment: &CallSegment) -> Expression {
    match segment {
        CallSegment::Named(id) => Expression::Identifier(id.clone()),
        CallSegment::Index(expression) => expression.clone(),
    }
}

fn segments_match(path: &[PathSegment], segments: &[CallSegment], lenient: bool) -> bool {
    if path.len() != segments.len() {
        return false;
    }
    path.iter().zip(segments).all(|(declared, source)| {
        match (declared, source) {
            (PathSegment::Named(name), CallSegment::Named(id)) => *name == id.name,
            (PathSegment::Named(_), CallSegment::Index(_)) => false,
            (PathSegment::Indexer { .. }, CallSegment::Index(_)) => true,
            // A bare identifier can feed an indexer, but only when no
            // named segment claimed it first.
            (PathSegment::Indexer { .. }, CallSegment::Named(_)) => lenient,
        }
    })
}

fn resolve_method<'ctx>(
    ctx: &CodegenContext<'ctx>,
    receiver_type: &Type,
    segments: &[CallSegment],
    name: &str,
    span: Span,
) -> CgResult<Method> {
    let candidates: Vec<Method> = match receiver_type.as_resource() {
        Some(resource) => resource.methods(),
        None => {
            let symbols = ctx.symbols.borrow();
            match symbols.find_type_method(receiver_type, "", name) {
                Some(method) if segments.is_empty() => return Ok(method),
                _ => Vec::new(),
            }
        }
    };

    let named: Vec<&Method> = candidates
        .iter()
        .filter(|method| method.name == name)
        .collect();
    if named.is_empty() {
        return Err(ctx.error(
            span,
            format!("Method '{name}' is not defined for type {receiver_type}"),
        ));
    }

    // Exact path matches win over identifier-fed indexers.
    for lenient in [false, true] {
        if let Some(method) = named
            .iter()
            .find(|method| segments_match(&method.path, segments, lenient))
        {
            return Ok((*method).clone());
        }
    }

    Err(ctx.error(
        span,
        format!("Method '{name}' is not defined for type {receiver_type}"),
    ))
}
