//! Compile-time values.
//!
//! Every expression lowers to a [`Value`]: either *concrete* (an emitted
//! IR value of a known type) or *untyped* (a literal or deferred
//! expression that concretizes against whatever target type the use site
//! imposes). Untyped values recurse: a binary expression over two
//! literals stays untyped, and a ternary defers its `select` until both
//! branches know their type.

use inkwell::values::{BasicValueEnum, IntValue};

use crate::{
    ast::{BinaryOperator, Span},
    types::{Type, TypeHandle},
};

use super::{expressions::emit_arithmetic, CgResult, CodegenContext};

#[derive(Debug, Clone)]
pub enum Value<'ctx> {
    Concrete {
        ty: Type,
        ir: BasicValueEnum<'ctx>,
    },
    Untyped(UntypedValue<'ctx>),
}

#[derive(Debug, Clone)]
pub enum UntypedValue<'ctx> {
    /// Integer literal; wide enough for every representable value.
    Int(i128),
    /// Floating-point literal.
    Float(f64),
    /// Arithmetic over two untyped operands.
    Binary {
        operator: BinaryOperator,
        left: Box<UntypedValue<'ctx>>,
        right: Box<UntypedValue<'ctx>>,
    },
    /// A ternary whose branches still await a target type. The condition
    /// is already lowered to `i1`.
    Ternary {
        condition: IntValue<'ctx>,
        then_value: Box<Value<'ctx>>,
        else_value: Box<Value<'ctx>>,
    },
    /// The `Vector()` constructor before an element type is imposed.
    EmptyVector,
}

impl<'ctx> Value<'ctx> {
    pub fn concrete(ty: Type, ir: BasicValueEnum<'ctx>) -> Self {
        Value::Concrete { ty, ir }
    }

    pub fn unit(ctx: &CodegenContext<'ctx>) -> Self {
        Value::Concrete {
            ty: Type::Unit,
            ir: ctx.ir.unit_value(),
        }
    }

    /// The type this value has, or would default to.
    pub fn ty(&self, ctx: &CodegenContext<'ctx>, span: Span) -> CgResult<Type> {
        match self {
            Value::Concrete { ty, .. } => Ok(ty.clone()),
            Value::Untyped(untyped) => untyped.default_type(ctx, span),
        }
    }

    /// Forces the value to `target`, emitting whatever IR the deferred
    /// parts need. Concrete values must already have the target type.
    pub fn concretize(
        self,
        ctx: &CodegenContext<'ctx>,
        target: &Type,
        span: Span,
    ) -> CgResult<BasicValueEnum<'ctx>> {
        match self {
            Value::Concrete { ty, ir } => {
                if ty == *target {
                    Ok(ir)
                } else {
                    Err(ctx.error(span, format!("Cannot convert from {ty} to {target}")))
                }
            }
            Value::Untyped(untyped) => untyped.concretize(ctx, target, span),
        }
    }

    /// Concretizes against the value's own default type.
    pub fn concretize_default(
        self,
        ctx: &CodegenContext<'ctx>,
        span: Span,
    ) -> CgResult<(Type, BasicValueEnum<'ctx>)> {
        let target = self.ty(ctx, span)?;
        let ir = self.concretize(ctx, &target, span)?;
        Ok((target, ir))
    }
}

impl<'ctx> UntypedValue<'ctx> {
    /// The concrete type used when no target is imposed: `i32` for
    /// integer literals, `f64` for float literals, and the dominant
    /// default for compound values.
    pub fn default_type(&self, ctx: &CodegenContext<'ctx>, span: Span) -> CgResult<Type> {
        match self {
            UntypedValue::Int(_) => Ok(ctx.registry.get_type(&TypeHandle::I32)),
            UntypedValue::Float(_) => Ok(ctx.registry.get_type(&TypeHandle::F64)),
            UntypedValue::Binary { left, right, .. } => {
                let left = left.default_type(ctx, span)?;
                let right = right.default_type(ctx, span)?;
                if left.is_float() || right.is_float() {
                    Ok(ctx.registry.get_type(&TypeHandle::F64))
                } else {
                    Ok(left)
                }
            }
            UntypedValue::Ternary {
                then_value,
                else_value,
                ..
            } => {
                // A concrete branch settles the question outright.
                if let Value::Concrete { ty, .. } = then_value.as_ref() {
                    return Ok(ty.clone());
                }
                if let Value::Concrete { ty, .. } = else_value.as_ref() {
                    return Ok(ty.clone());
                }
                let then_type = then_value.ty(ctx, span)?;
                let else_type = else_value.ty(ctx, span)?;
                if then_type == else_type {
                    Ok(then_type)
                } else if then_type.is_float() || else_type.is_float() {
                    Ok(ctx.registry.get_type(&TypeHandle::F64))
                } else {
                    Err(ctx.error(
                        span,
                        format!("Incompatible branch types {then_type} and {else_type}"),
                    ))
                }
            }
            UntypedValue::EmptyVector => {
                Err(ctx.error(span, "Cannot infer element type of Vector()"))
            }
        }
    }

    pub fn concretize(
        self,
        ctx: &CodegenContext<'ctx>,
        target: &Type,
        span: Span,
    ) -> CgResult<BasicValueEnum<'ctx>> {
        match self {
            UntypedValue::Int(value) => concretize_int_literal(ctx, value, target, span),
            UntypedValue::Float(value) => concretize_float_literal(ctx, value, target, span),
            UntypedValue::Binary {
                operator,
                left,
                right,
            } => {
                if operator.is_division()
                    && !target.is_float()
                    && matches!(*right, UntypedValue::Int(0))
                {
                    return Err(ctx.error(span, "Division by zero"));
                }
                let left = left.concretize(ctx, target, span)?;
                let right = right.concretize(ctx, target, span)?;
                emit_arithmetic(ctx, operator, target, left, right, span)
            }
            UntypedValue::Ternary {
                condition,
                then_value,
                else_value,
            } => {
                let then_value = then_value.concretize(ctx, target, span)?;
                let else_value = else_value.concretize(ctx, target, span)?;
                Ok(ctx.ir.select(condition, then_value, else_value)?)
            }
            UntypedValue::EmptyVector => {
                let resource = target
                    .as_resource()
                    .filter(|resource| resource.is_vector())
                    .ok_or_else(|| {
                        ctx.error(span, format!("Cannot convert Vector() to {target}"))
                    })?;
                let vector = super::builtins::vector::build_empty_vector(ctx, resource)?;
                Ok(vector.into())
            }
        }
    }
}

fn concretize_int_literal<'ctx>(
    ctx: &CodegenContext<'ctx>,
    value: i128,
    target: &Type,
    span: Span,
) -> CgResult<BasicValueEnum<'ctx>> {
    match target {
        Type::Int(int) => {
            if !int_fits(value, int.width, int.signed) {
                return Err(ctx.error(
                    span,
                    format!("Integer literal {value} out of range for type {target}"),
                ));
            }
            let ty = ctx.ir.int_type(int.width);
            Ok(ctx.ir.const_int(ty, value as u64, int.signed).into())
        }
        Type::Char => {
            if !(0..=0x10FFFF).contains(&value) {
                return Err(ctx.error(
                    span,
                    format!("Integer literal {value} out of range for type char"),
                ));
            }
            let ty = ctx.ir.char_type();
            Ok(ctx.ir.const_int(ty, value as u64, false).into())
        }
        Type::Float(float) => {
            let ty = if float.width == 32 {
                ctx.ir.f32_type()
            } else {
                ctx.ir.f64_type()
            };
            Ok(ctx.ir.const_float(ty, value as f64).into())
        }
        _ => Err(ctx.error(
            span,
            format!("Cannot convert integer literal to non-integer type {target}"),
        )),
    }
}

fn concretize_float_literal<'ctx>(
    ctx: &CodegenContext<'ctx>,
    value: f64,
    target: &Type,
    span: Span,
) -> CgResult<BasicValueEnum<'ctx>> {
    match target {
        Type::Float(float) if float.width == 32 => {
            if value.is_finite() && value.abs() > f64::from(f32::MAX) {
                return Err(ctx.error(
                    span,
                    format!("Float literal {value} out of range for type f32"),
                ));
            }
            Ok(ctx.ir.const_float(ctx.ir.f32_type(), value).into())
        }
        Type::Float(_) => Ok(ctx.ir.const_float(ctx.ir.f64_type(), value).into()),
        _ => Err(ctx.error(
            span,
            format!("Cannot convert float literal to non-float type {target}"),
        )),
    }
}

/// Whether `value` is representable in an integer of the given shape.
pub(crate) fn int_fits(value: i128, width: u32, signed: bool) -> bool {
    if signed {
        let min = -(1i128 << (width - 1));
        let max = (1i128 << (width - 1)) - 1;
        (min..=max).contains(&value)
    } else {
        let max = if width >= 128 {
            i128::MAX
        } else {
            (1i128 << width) - 1
        };
        (0..=max).contains(&value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signed_ranges() {
        assert!(int_fits(2147483647, 32, true));
        assert!(!int_fits(2147483648, 32, true));
        assert!(int_fits(-2147483648, 32, true));
        assert!(!int_fits(-2147483649, 32, true));
    }

    #[test]
    fn unsigned_ranges() {
        assert!(int_fits(255, 8, false));
        assert!(!int_fits(256, 8, false));
        assert!(!int_fits(-1, 8, false));
        assert!(int_fits(u64::MAX as i128, 64, false));
        assert!(!int_fits(u64::MAX as i128 + 1, 64, false));
    }
}
