//! # Primitive `to_string`
//!
//! Every primitive gets a method table with a single `to_string() ->
//! String`. The generated function formats with `snprintf` into a fresh
//! `GC_malloc_atomic` buffer sized per type, then wraps the buffer into
//! a `String` whose vector size is the formatted length plus one (the
//! NUL terminator rides along in `size`).
//!
//! Small types are promoted before the variadic call (`i8`/`i16` to
//! `i32`, `u8`/`u16` to `u32`, `f32` to `f64`), matching C's default
//! argument promotions. `bool` selects between the `"true"` and
//! `"false"` globals with a two-block branch and a phi; unit returns the
//! literal `"()"`.

use inkwell::values::BasicMetadataValueEnum;

use crate::{
    ast::Visibility,
    codegen::{CgResult, CodegenContext},
    ir::SNPRINTF,
    types::{Method, MethodBody, Type, TypeHandle},
};

use super::string::{build_string_from_buffer, build_string_literal, string_resource};

/// `(type, printf format, buffer bytes)` for every formatted primitive.
const FORMATS: [(TypeHandle, &str, u64); 13] = [
    (TypeHandle::I8, "%d", 5),
    (TypeHandle::I16, "%d", 7),
    (TypeHandle::I32, "%d", 12),
    (TypeHandle::I64, "%lld", 21),
    (TypeHandle::ISIZE, "%lld", 21),
    (TypeHandle::U8, "%u", 4),
    (TypeHandle::U16, "%u", 6),
    (TypeHandle::U32, "%u", 11),
    (TypeHandle::U64, "%llu", 21),
    (TypeHandle::USIZE, "%llu", 21),
    (TypeHandle::F32, "%.6f", 48),
    (TypeHandle::F64, "%.15f", 64),
    (TypeHandle::CHAR, "%c", 2),
];

const BOOL_BUFFER: u64 = 6;

pub fn register(ctx: &CodegenContext) -> CgResult<()> {
    for (handle, format, buffer) in FORMATS {
        let ty = ctx.registry.get_type(&handle);
        generate_formatted(ctx, &ty, format, buffer)?;
    }
    generate_bool(ctx)?;
    generate_unit(ctx)?;
    Ok(())
}

/// Widen the `i32` result of `snprintf` to the `usize` width. Identity
/// when the target pointer is 32-bit.
fn length_as_size<'ctx>(
    ctx: &CodegenContext<'ctx>,
    length: inkwell::values::IntValue<'ctx>,
) -> CgResult<inkwell::values::IntValue<'ctx>> {
    if ctx.ir.pointer_width() > 32 {
        return Ok(ctx.ir.sext(length, ctx.ir.size_type())?);
    }
    Ok(length)
}

fn symbol_for(ty: &Type) -> String {
    let stem = match ty {
        Type::Unit => "unit".to_string(),
        _ => ty.name(),
    };
    format!("{stem}_to_string")
}

fn register_method(ctx: &CodegenContext, ty: &Type, symbol: String) -> CgResult<()> {
    let string_type = Type::Resource(string_resource(ctx)?);
    ctx.symbols.borrow_mut().define_type_methods(
        ty.name(),
        vec![Method {
            name: "to_string".to_string(),
            return_type: string_type,
            parameters: vec![],
            visibility: Visibility::Global,
            path: vec![],
            body: MethodBody::Declared { symbol },
        }],
    );
    Ok(())
}

fn generate_formatted(
    ctx: &CodegenContext,
    ty: &Type,
    format: &str,
    buffer_bytes: u64,
) -> CgResult<()> {
    let symbol = symbol_for(ty);
    let string_type = Type::Resource(string_resource(ctx)?);
    let function_type = ctx.llvm_function_type(&string_type, std::slice::from_ref(ty))?;
    let function = ctx.ir.add_function(&symbol, function_type);

    let entry = ctx.ir.append_block(function, "entry");
    ctx.ir.position_at_end(entry);

    let value = function.get_nth_param(0).expect("unary function");

    // Promote below-word arguments the way the C varargs ABI expects.
    let promoted: BasicMetadataValueEnum = match ty {
        Type::Int(int) if int.width < 32 && int.signed => ctx
            .ir
            .sext(value.into_int_value(), ctx.ir.int_type(32))?
            .into(),
        Type::Int(int) if int.width < 32 => ctx
            .ir
            .zext(value.into_int_value(), ctx.ir.int_type(32))?
            .into(),
        Type::Float(float) if float.width == 32 => ctx
            .ir
            .fpext(value.into_float_value(), ctx.ir.f64_type())?
            .into(),
        _ => value.into(),
    };

    let capacity = ctx.ir.const_size(buffer_bytes);
    let buffer = ctx.ir.gc_malloc_atomic(capacity)?;
    let format_ptr = ctx.global_string(format)?;

    let snprintf = ctx.ir.runtime_function(SNPRINTF)?;
    let length = ctx
        .ir
        .call_returning(
            snprintf,
            &[buffer.into(), capacity.into(), format_ptr.into(), promoted],
        )?
        .into_int_value();

    // size counts the formatted bytes plus the NUL terminator.
    let length = length_as_size(ctx, length)?;
    let size = ctx.ir.add(length, ctx.ir.const_size(1))?;

    let string = build_string_from_buffer(ctx, buffer, size, capacity)?;
    ctx.ir.ret(Some(string.into()))?;

    register_method(ctx, ty, symbol)
}

/// `bool` has no printf conversion; branch to one of the two constant
/// spellings and format that with `%s`.
fn generate_bool(ctx: &CodegenContext) -> CgResult<()> {
    let ty = Type::Bool;
    let symbol = symbol_for(&ty);
    let string_type = Type::Resource(string_resource(ctx)?);
    let function_type = ctx.llvm_function_type(&string_type, &[ty.clone()])?;
    let function = ctx.ir.add_function(&symbol, function_type);

    let entry = ctx.ir.append_block(function, "entry");
    let true_block = ctx.ir.append_block(function, "spell_true");
    let false_block = ctx.ir.append_block(function, "spell_false");
    let merge_block = ctx.ir.append_block(function, "format");

    ctx.ir.position_at_end(entry);
    let value = function.get_nth_param(0).expect("unary function");
    ctx.ir
        .condbr(value.into_int_value(), true_block, false_block)?;

    ctx.ir.position_at_end(true_block);
    let spelled_true = ctx.global_string("true")?;
    ctx.ir.br(merge_block)?;

    ctx.ir.position_at_end(false_block);
    let spelled_false = ctx.global_string("false")?;
    ctx.ir.br(merge_block)?;

    ctx.ir.position_at_end(merge_block);
    let spelling = ctx.ir.phi(ctx.ir.ptr_type().into(), "spelling")?;
    spelling.add_incoming(&[(&spelled_true, true_block), (&spelled_false, false_block)]);

    let capacity = ctx.ir.const_size(BOOL_BUFFER);
    let buffer = ctx.ir.gc_malloc_atomic(capacity)?;
    let format_ptr = ctx.global_string("%s")?;
    let snprintf = ctx.ir.runtime_function(SNPRINTF)?;
    let length = ctx
        .ir
        .call_returning(
            snprintf,
            &[
                buffer.into(),
                capacity.into(),
                format_ptr.into(),
                spelling.as_basic_value().into(),
            ],
        )?
        .into_int_value();
    let length = length_as_size(ctx, length)?;
    let size = ctx.ir.add(length, ctx.ir.const_size(1))?;

    let string = build_string_from_buffer(ctx, buffer, size, capacity)?;
    ctx.ir.ret(Some(string.into()))?;

    register_method(ctx, &ty, symbol)
}

fn generate_unit(ctx: &CodegenContext) -> CgResult<()> {
    let ty = Type::Unit;
    let symbol = symbol_for(&ty);
    let string_type = Type::Resource(string_resource(ctx)?);
    let function_type = ctx.llvm_function_type(&string_type, &[ty.clone()])?;
    let function = ctx.ir.add_function(&symbol, function_type);

    let entry = ctx.ir.append_block(function, "entry");
    ctx.ir.position_at_end(entry);

    let string = build_string_literal(ctx, "()")?;
    ctx.ir.ret(Some(string.into()))?;

    register_method(ctx, &ty, symbol)
}
