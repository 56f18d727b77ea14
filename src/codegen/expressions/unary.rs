//! Unary operators: `+` is the identity, `-` negates (folding into
//! untyped literals so `-1` stays a literal), `~` is bitwise not on
//! integers, `not` requires bool.

use crate::{
    ast::{BinaryOperator, UnaryExpression, UnaryOperator},
    codegen::{CgResult, CodeGen, CodegenContext, UntypedValue, Value},
    types::Type,
};

impl<'ctx> CodeGen<'ctx> for UnaryExpression {
    type Output = CgResult<Value<'ctx>>;

    fn codegen(&self, ctx: &CodegenContext<'ctx>) -> Self::Output {
        let operand = self.operand.codegen(ctx)?;

        match self.operator {
            UnaryOperator::Plus => Ok(operand),
            UnaryOperator::Minus => match operand {
                Value::Untyped(UntypedValue::Int(value)) => {
                    Ok(Value::Untyped(UntypedValue::Int(-value)))
                }
                Value::Untyped(UntypedValue::Float(value)) => {
                    Ok(Value::Untyped(UntypedValue::Float(-value)))
                }
                Value::Untyped(untyped) => Ok(Value::Untyped(UntypedValue::Binary {
                    operator: BinaryOperator::Sub,
                    left: Box::new(UntypedValue::Int(0)),
                    right: Box::new(untyped),
                })),
                Value::Concrete { ty, ir } if ty.is_integer() => {
                    let negated = ctx.ir.neg(ir.into_int_value())?;
                    Ok(Value::concrete(ty, negated.into()))
                }
                Value::Concrete { ty, ir } if ty.is_float() => {
                    let negated = ctx.ir.fneg(ir.into_float_value())?;
                    Ok(Value::concrete(ty, negated.into()))
                }
                Value::Concrete { ty, .. } => {
                    Err(ctx.error(self.span, format!("Operator '-' is not defined on {ty}")))
                }
            },
            UnaryOperator::BitNot => {
                let (ty, ir) = operand.concretize_default(ctx, self.span)?;
                if !ty.is_integer() {
                    return Err(ctx.error(
                        self.span,
                        format!("Operator '~' requires an integer operand, got {ty}"),
                    ));
                }
                let inverted = ctx.ir.not(ir.into_int_value())?;
                Ok(Value::concrete(ty, inverted.into()))
            }
            UnaryOperator::Not => {
                let operand = operand.concretize(ctx, &Type::Bool, self.span)?;
                let inverted = ctx.ir.not(operand.into_int_value())?;
                Ok(Value::concrete(Type::Bool, inverted.into()))
            }
        }
    }
}
