//! Assignments.
//!
//! Compound forms desugar to `lhs = lhs op rhs` before lowering. Targets
//! are variables (writable once, or repeatedly when `var`), mutable
//! resource fields, and vector path setters: `v/{i} = x` lowers through
//! the path's `set` method.

use crate::{
    ast::{
        Assignment, AssignTarget, BinaryExpression, Expression, FieldAccessExpression, Id,
        MethodCallExpression, Span,
    },
    codegen::{expressions::field_pointer, CgResult, CodeGen, CodegenContext},
};

impl<'ctx> CodeGen<'ctx> for Assignment {
    type Output = CgResult<bool>;

    fn codegen(&self, ctx: &CodegenContext<'ctx>) -> Self::Output {
        // `lhs op= rhs` becomes `lhs = lhs op rhs`.
        let value = match self.operator.binary_operator() {
            None => self.value.clone(),
            Some(operator) => Expression::Binary(BinaryExpression {
                operator,
                left: Box::new(target_as_expression(&self.target)),
                right: Box::new(self.value.clone()),
                span: self.span,
            }),
        };

        match &self.target {
            AssignTarget::Variable(id) => assign_variable(ctx, id, &value, self.span)?,
            AssignTarget::Field {
                receiver, field, ..
            } => {
                let (field, pointer) = field_pointer(ctx, receiver, &field.name, self.span)?;
                if field.is_const {
                    return Err(ctx.error(
                        self.span,
                        format!("Cannot assign to constant field '{}'", field.name),
                    ));
                }
                let lowered = value.codegen(ctx)?;
                let lowered = lowered.concretize(ctx, &field.ty, value.span())?;
                ctx.ir.store(pointer, lowered)?;
            }
            AssignTarget::Path {
                receiver, segments, ..
            } => {
                // `v/{i} = x` compiles to `v/{i}.set(x)`.
                let call = MethodCallExpression {
                    receiver: Box::new(receiver.clone()),
                    segments: segments.clone(),
                    method: Id::new("set", self.span),
                    arguments: vec![value],
                    span: self.span,
                };
                call.codegen(ctx)?;
            }
        }

        Ok(true)
    }
}

fn assign_variable<'ctx>(
    ctx: &CodegenContext<'ctx>,
    id: &Id,
    value: &Expression,
    span: Span,
) -> CgResult<()> {
    let variable = ctx.symbols.borrow().find_variable(&id.name);
    let Some(variable) = variable else {
        return Err(ctx.error(span, format!("Unknown identifier: {}", id.name)));
    };
    if variable.is_const && variable.is_initialized {
        return Err(ctx.error(
            span,
            format!("Cannot assign to constant '{}'", id.name),
        ));
    }

    let lowered = value.codegen(ctx)?;
    let lowered = lowered.concretize(ctx, &variable.ty, value.span())?;
    ctx.ir.store(variable.storage, lowered)?;
    ctx.symbols.borrow_mut().mark_initialized(&id.name);
    Ok(())
}

/// The expression a compound assignment reads its old value through.
fn target_as_expression(target: &AssignTarget) -> Expression {
    match target {
        AssignTarget::Variable(id) => Expression::Identifier(id.clone()),
        AssignTarget::Field {
            receiver,
            field,
            span,
        } => Expression::FieldAccess(FieldAccessExpression {
            receiver: Box::new(receiver.clone()),
            field: field.clone(),
            span: *span,
        }),
        AssignTarget::Path {
            receiver,
            segments,
            span,
        } => Expression::MethodCall(MethodCallExpression {
            receiver: Box::new(receiver.clone()),
            segments: segments.clone(),
            method: Id::new("get", *span),
            arguments: vec![],
            span: *span,
        }),
    }
}
