//! The built-in `String` resource: a heap struct holding one field, its
//! `Vector<u8>` byte storage. The stored vector size counts the trailing
//! NUL byte, and the buffer capacity is the byte length plus one.

use inkwell::values::{IntValue, PointerValue};

use crate::{
    ast::Visibility,
    codegen::{CgResult, CodegenContext},
    errors::CompileError,
    types::{Field, ResourceType, Type, TypeHandle},
};

use super::vector;

/// Field index of the byte vector inside the string struct.
pub const DATA: u32 = 0;

pub fn register(ctx: &CodegenContext) -> CgResult<()> {
    let byte = ctx.registry.get_type(&TypeHandle::U8);
    let byte_vector = ctx.registry.get_or_create_vector_type(byte);

    let string = ctx.registry.create_resource_type("String", None, vec![]);
    string.push_field(Field {
        name: "data".to_string(),
        ty: Type::Resource(byte_vector),
        is_const: false,
        visibility: Visibility::Global,
    });

    let struct_type = ctx.ir.struct_named("String_struct");
    ctx.ir
        .struct_set_body(struct_type, &[ctx.ir.ptr_type().into()]);

    // Reserve the built-in names so user resources cannot collide.
    let vector_base = ctx
        .registry
        .get_resource("Vector")
        .expect("vector registers before string");
    let mut symbols = ctx.symbols.borrow_mut();
    let _ = symbols.define_resource(vector_base);
    let _ = symbols.define_resource(string);

    Ok(())
}

pub fn string_resource(ctx: &CodegenContext) -> CgResult<ResourceType> {
    ctx.registry
        .get_resource("String")
        .ok_or_else(|| CompileError::internal("the String resource is not registered"))
}

/// A `String` instance for a literal: the bytes live in a deduplicated
/// global and are copied into a fresh GC buffer of `len + 1` bytes.
pub fn build_string_literal<'ctx>(
    ctx: &CodegenContext<'ctx>,
    text: &str,
) -> CgResult<PointerValue<'ctx>> {
    let global = ctx.global_string(text)?;
    let bytes_with_nul = ctx.ir.const_size(text.len() as u64 + 1);
    let buffer = ctx.ir.gc_malloc_atomic(bytes_with_nul)?;
    ctx.ir.memcpy(buffer, global, bytes_with_nul)?;
    build_string_from_buffer(ctx, buffer, bytes_with_nul, bytes_with_nul)
}

/// Wraps an existing byte buffer into `String { data: Vector<u8> }`.
/// `size` includes the NUL terminator; `capacity` is the buffer size.
pub fn build_string_from_buffer<'ctx>(
    ctx: &CodegenContext<'ctx>,
    buffer: PointerValue<'ctx>,
    size: IntValue<'ctx>,
    capacity: IntValue<'ctx>,
) -> CgResult<PointerValue<'ctx>> {
    let byte = ctx.registry.get_type(&TypeHandle::U8);
    let byte_vector = ctx.registry.get_or_create_vector_type(byte);
    let vector_struct = ctx.resource_struct_type(&byte_vector);
    let data = vector::build_vector(ctx, vector_struct, buffer, size, capacity)?;

    let string = string_resource(ctx)?;
    let string_struct = ctx.resource_struct_type(&string);
    let string_bytes = ctx.ir.size_of(string_struct.into())?;
    let instance = ctx.ir.gc_malloc(string_bytes)?;
    let data_ptr = ctx.ir.struct_gep(string_struct, instance, DATA, "data")?;
    ctx.ir.store(data_ptr, data.into())?;

    Ok(instance)
}

/// The raw byte pointer of a string: `string.data.elements`.
pub fn string_bytes_pointer<'ctx>(
    ctx: &CodegenContext<'ctx>,
    string: PointerValue<'ctx>,
) -> CgResult<PointerValue<'ctx>> {
    let string_struct = ctx.resource_struct_type(&string_resource(ctx)?);
    let data_ptr = ctx.ir.struct_gep(string_struct, string, DATA, "data")?;
    let data = ctx
        .ir
        .load(ctx.ir.ptr_type().into(), data_ptr, "data")?
        .into_pointer_value();

    let byte = ctx.registry.get_type(&TypeHandle::U8);
    let byte_vector = ctx.registry.get_or_create_vector_type(byte);
    let vector_struct = ctx.resource_struct_type(&byte_vector);
    let elements_ptr =
        ctx.ir
            .struct_gep(vector_struct, data, vector::ELEMENTS, "elements")?;
    Ok(ctx
        .ir
        .load(ctx.ir.ptr_type().into(), elements_ptr, "bytes")?
        .into_pointer_value())
}
