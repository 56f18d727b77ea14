//! Explicit numeric conversions.
//!
//! Implements the `create_conversion` contract backing `as` casts:
//! identity, integer↔integer (with `char` riding along as an unsigned
//! 32-bit scalar), float↔float, and integer↔float. Widening integers
//! sign-extends signed sources and zero-extends unsigned and `char`
//! sources; narrowing truncates; equal widths reinterpret without an
//! instruction.

use inkwell::values::BasicValueEnum;

use crate::{ast::Span, types::Type};

use super::{CgResult, CodegenContext};

pub fn create_conversion<'ctx>(
    ctx: &CodegenContext<'ctx>,
    value: BasicValueEnum<'ctx>,
    from: &Type,
    to: &Type,
    span: Span,
) -> CgResult<BasicValueEnum<'ctx>> {
    if from == to {
        return Ok(value);
    }

    let unsupported =
        || ctx.error(span, format!("Cannot convert from {from} to {to}"));

    match (from, to) {
        (source, target) if int_shape(source).is_some() && int_shape(target).is_some() => {
            // Integer-to-integer, including char on either side.
            let (source_width, source_signed) = int_shape(source).expect("checked above");
            let (target_width, _) = int_shape(target).expect("checked above");
            let target_type = ctx.ir.int_type(target_width);
            let value = value.into_int_value();

            let converted = if target_width > source_width {
                if source_signed {
                    ctx.ir.sext(value, target_type)?
                } else {
                    ctx.ir.zext(value, target_type)?
                }
            } else if target_width < source_width {
                ctx.ir.trunc(value, target_type)?
            } else {
                value
            };
            Ok(converted.into())
        }
        (Type::Float(source), Type::Float(target)) => {
            let value = value.into_float_value();
            let converted = if target.width > source.width {
                ctx.ir.fpext(value, ctx.ir.f64_type())?
            } else {
                ctx.ir.fptrunc(value, ctx.ir.f32_type())?
            };
            Ok(converted.into())
        }
        (source, Type::Float(target)) if int_shape(source).is_some() => {
            let target_type = if target.width == 32 {
                ctx.ir.f32_type()
            } else {
                ctx.ir.f64_type()
            };
            let (_, source_signed) = int_shape(source).expect("checked above");
            let value = value.into_int_value();
            let converted = if source_signed {
                ctx.ir.sitofp(value, target_type)?
            } else {
                ctx.ir.uitofp(value, target_type)?
            };
            Ok(converted.into())
        }
        (Type::Float(_), target) if int_shape(target).is_some() => {
            let (target_width, target_signed) = int_shape(target).expect("checked above");
            let target_type = ctx.ir.int_type(target_width);
            let value = value.into_float_value();
            let converted = if target_signed {
                ctx.ir.fptosi(value, target_type)?
            } else {
                ctx.ir.fptoui(value, target_type)?
            };
            Ok(converted.into())
        }
        _ => Err(unsupported()),
    }
}

/// `(width, signed)` of the types integer conversions apply to: the
/// integer primitives plus `char` as an unsigned 32-bit scalar. `bool`
/// is deliberately excluded.
fn int_shape(ty: &Type) -> Option<(u32, bool)> {
    match ty {
        Type::Int(int) => Some((int.width, int.signed)),
        Type::Char => Some((32, false)),
        _ => None,
    }
}
