//! # Binary Expression Lowering
//!
//! Three operator families, three strategies:
//!
//! - **Logical `and`/`or`** short-circuit through a dedicated right-hand
//!   block and a phi at the merge point; both operands must concretize
//!   to `bool`.
//! - **Comparisons** concretize the operands against each other (two
//!   untyped operands agree on a common default first) and emit `icmp`
//!   with signed, unsigned or ordered-float predicates; the result is
//!   always a concrete `bool`.
//! - **Arithmetic, bitwise and shifts** stay *untyped* when both sides
//!   are untyped, producing a deferred binary value that concretizes
//!   recursively; otherwise the untyped side adopts the concrete side's
//!   type and the instruction is emitted. Signedness selects
//!   `sdiv`/`udiv`, `srem`/`urem` and `ashr`/`lshr`; `mod` is the
//!   mathematical modulo `(a rem b + b) rem b`.
//!
//! Division or remainder by a literal zero is rejected at compile time.

use inkwell::values::{BasicValueEnum, IntValue};
use inkwell::{FloatPredicate, IntPredicate};

use crate::{
    ast::{BinaryExpression, BinaryOperator, Span},
    codegen::{CgResult, CodeGen, CodegenContext, UntypedValue, Value},
    types::{Type, TypeHandle},
};

impl<'ctx> CodeGen<'ctx> for BinaryExpression {
    type Output = CgResult<Value<'ctx>>;

    fn codegen(&self, ctx: &CodegenContext<'ctx>) -> Self::Output {
        if self.operator.is_logical() {
            return codegen_short_circuit(ctx, self);
        }

        let left = self.left.codegen(ctx)?;
        let right = self.right.codegen(ctx)?;

        if self.operator.is_comparison() {
            return codegen_comparison(ctx, self.operator, left, right, self.span);
        }

        match (left, right) {
            // Two untyped sides defer the whole operation.
            (Value::Untyped(left), Value::Untyped(right)) => {
                Ok(Value::Untyped(UntypedValue::Binary {
                    operator: self.operator,
                    left: Box::new(left),
                    right: Box::new(right),
                }))
            }
            (Value::Concrete { ty, ir }, right) => {
                if self.operator.is_division()
                    && ty.is_integer()
                    && matches!(right, Value::Untyped(UntypedValue::Int(0)))
                {
                    return Err(ctx.error(self.span, "Division by zero"));
                }
                let right = right.concretize(ctx, &ty, self.span)?;
                let result = emit_arithmetic(ctx, self.operator, &ty, ir, right, self.span)?;
                Ok(Value::concrete(ty, result))
            }
            (left, Value::Concrete { ty, ir }) => {
                let left = left.concretize(ctx, &ty, self.span)?;
                let result = emit_arithmetic(ctx, self.operator, &ty, left, ir, self.span)?;
                Ok(Value::concrete(ty, result))
            }
        }
    }
}

/// `and`/`or` with a then/else block and a phi, so the right operand only
/// evaluates when it has to.
fn codegen_short_circuit<'ctx>(
    ctx: &CodegenContext<'ctx>,
    expression: &BinaryExpression,
) -> CgResult<Value<'ctx>> {
    let left = expression.left.codegen(ctx)?;
    let left = left.concretize(ctx, &Type::Bool, expression.span)?.into_int_value();

    let function = ctx.ir.current_function()?;
    let rhs_block = ctx.ir.append_block(function, "logic_rhs");
    let merge_block = ctx.ir.append_block(function, "logic_merge");
    let entry_block = ctx.ir.current_block()?;

    match expression.operator {
        // `and`: only evaluate the right side when the left was true.
        BinaryOperator::And => ctx.ir.condbr(left, rhs_block, merge_block)?,
        // `or`: only evaluate the right side when the left was false.
        BinaryOperator::Or => ctx.ir.condbr(left, merge_block, rhs_block)?,
        _ => unreachable!("caller checked for a logical operator"),
    }

    ctx.ir.position_at_end(rhs_block);
    let right = expression.right.codegen(ctx)?;
    let right = right
        .concretize(ctx, &Type::Bool, expression.span)?
        .into_int_value();
    let rhs_end_block = ctx.ir.current_block()?;
    ctx.ir.br(merge_block)?;

    ctx.ir.position_at_end(merge_block);
    let short_circuit = ctx
        .ir
        .const_bool(matches!(expression.operator, BinaryOperator::Or));
    let phi = ctx.ir.phi(ctx.ir.bool_type().into(), "logic_result")?;
    phi.add_incoming(&[(&short_circuit, entry_block), (&right, rhs_end_block)]);

    Ok(Value::concrete(Type::Bool, phi.as_basic_value()))
}

fn codegen_comparison<'ctx>(
    ctx: &CodegenContext<'ctx>,
    operator: BinaryOperator,
    left: Value<'ctx>,
    right: Value<'ctx>,
    span: Span,
) -> CgResult<Value<'ctx>> {
    let (ty, left, right) = match (left, right) {
        (Value::Untyped(left), Value::Untyped(right)) => {
            // Agree on a common default before comparing.
            let left_default = left.default_type(ctx, span)?;
            let right_default = right.default_type(ctx, span)?;
            let common = if left_default.is_float() || right_default.is_float() {
                ctx.registry.get_type(&TypeHandle::F64)
            } else {
                left_default
            };
            let left = left.concretize(ctx, &common, span)?;
            let right = right.concretize(ctx, &common, span)?;
            (common, left, right)
        }
        (Value::Concrete { ty, ir }, right) => {
            let right = right.concretize(ctx, &ty, span)?;
            (ty, ir, right)
        }
        (left, Value::Concrete { ty, ir }) => {
            let left = left.concretize(ctx, &ty, span)?;
            (ty, left, ir)
        }
    };

    let result = emit_comparison(ctx, operator, &ty, left, right, span)?;
    Ok(Value::concrete(Type::Bool, result.into()))
}

/// Emits a comparison over two operands of the same concrete type.
pub(crate) fn emit_comparison<'ctx>(
    ctx: &CodegenContext<'ctx>,
    operator: BinaryOperator,
    ty: &Type,
    left: BasicValueEnum<'ctx>,
    right: BasicValueEnum<'ctx>,
    span: Span,
) -> CgResult<IntValue<'ctx>> {
    let not_defined = || {
        ctx.error(
            span,
            format!("Operator '{operator}' is not defined on ({ty}, {ty})"),
        )
    };

    match ty {
        Type::Float(_) => {
            let predicate = match operator {
                BinaryOperator::Eq => FloatPredicate::OEQ,
                BinaryOperator::NotEq => FloatPredicate::ONE,
                BinaryOperator::Less => FloatPredicate::OLT,
                BinaryOperator::LessEq => FloatPredicate::OLE,
                BinaryOperator::Greater => FloatPredicate::OGT,
                BinaryOperator::GreaterEq => FloatPredicate::OGE,
                _ => return Err(not_defined()),
            };
            Ok(ctx
                .ir
                .fcmp(predicate, left.into_float_value(), right.into_float_value())?)
        }
        Type::Int(_) | Type::Char => {
            let signed = ty.is_signed();
            let predicate = match operator {
                BinaryOperator::Eq => IntPredicate::EQ,
                BinaryOperator::NotEq => IntPredicate::NE,
                BinaryOperator::Less if signed => IntPredicate::SLT,
                BinaryOperator::LessEq if signed => IntPredicate::SLE,
                BinaryOperator::Greater if signed => IntPredicate::SGT,
                BinaryOperator::GreaterEq if signed => IntPredicate::SGE,
                BinaryOperator::Less => IntPredicate::ULT,
                BinaryOperator::LessEq => IntPredicate::ULE,
                BinaryOperator::Greater => IntPredicate::UGT,
                BinaryOperator::GreaterEq => IntPredicate::UGE,
                _ => return Err(not_defined()),
            };
            Ok(ctx
                .ir
                .icmp(predicate, left.into_int_value(), right.into_int_value())?)
        }
        Type::Bool => {
            let predicate = match operator {
                BinaryOperator::Eq => IntPredicate::EQ,
                BinaryOperator::NotEq => IntPredicate::NE,
                _ => return Err(not_defined()),
            };
            Ok(ctx
                .ir
                .icmp(predicate, left.into_int_value(), right.into_int_value())?)
        }
        _ => Err(not_defined()),
    }
}

/// Emits an arithmetic, bitwise or shift instruction over two operands of
/// the same concrete type. Also the workhorse behind untyped binary
/// values when they finally concretize.
pub(crate) fn emit_arithmetic<'ctx>(
    ctx: &CodegenContext<'ctx>,
    operator: BinaryOperator,
    ty: &Type,
    left: BasicValueEnum<'ctx>,
    right: BasicValueEnum<'ctx>,
    span: Span,
) -> CgResult<BasicValueEnum<'ctx>> {
    let not_defined = || {
        ctx.error(
            span,
            format!("Operator '{operator}' is not defined on ({ty}, {ty})"),
        )
    };

    match ty {
        Type::Int(_) | Type::Char => {
            let signed = ty.is_signed();
            let left = left.into_int_value();
            let right = right.into_int_value();
            let result = match operator {
                BinaryOperator::Add => ctx.ir.add(left, right)?,
                BinaryOperator::Sub => ctx.ir.sub(left, right)?,
                BinaryOperator::Mul => ctx.ir.mul(left, right)?,
                BinaryOperator::Div if signed => ctx.ir.sdiv(left, right)?,
                BinaryOperator::Div => ctx.ir.udiv(left, right)?,
                BinaryOperator::Rem if signed => ctx.ir.srem(left, right)?,
                BinaryOperator::Rem => ctx.ir.urem(left, right)?,
                BinaryOperator::Mod if signed => {
                    // (a rem b + b) rem b keeps the sign of the divisor.
                    let rem = ctx.ir.srem(left, right)?;
                    let shifted = ctx.ir.add(rem, right)?;
                    ctx.ir.srem(shifted, right)?
                }
                BinaryOperator::Mod => ctx.ir.urem(left, right)?,
                BinaryOperator::BitAnd => ctx.ir.and(left, right)?,
                BinaryOperator::BitOr => ctx.ir.or(left, right)?,
                BinaryOperator::BitXor => ctx.ir.xor(left, right)?,
                BinaryOperator::Shl => ctx.ir.shl(left, right)?,
                BinaryOperator::Shr if signed => ctx.ir.ashr(left, right)?,
                BinaryOperator::Shr => ctx.ir.lshr(left, right)?,
                _ => return Err(not_defined()),
            };
            Ok(result.into())
        }
        Type::Float(_) => {
            let left = left.into_float_value();
            let right = right.into_float_value();
            let result = match operator {
                BinaryOperator::Add => ctx.ir.fadd(left, right)?,
                BinaryOperator::Sub => ctx.ir.fsub(left, right)?,
                BinaryOperator::Mul => ctx.ir.fmul(left, right)?,
                BinaryOperator::Div => ctx.ir.fdiv(left, right)?,
                BinaryOperator::Rem => ctx.ir.frem(left, right)?,
                BinaryOperator::Mod => {
                    let rem = ctx.ir.frem(left, right)?;
                    let shifted = ctx.ir.fadd(rem, right)?;
                    ctx.ir.frem(shifted, right)?
                }
                _ => return Err(not_defined()),
            };
            Ok(result.into())
        }
        _ => Err(not_defined()),
    }
}
