//! # The built-in `Vector<T>` resource
//!
//! `Vector` is the one generic resource: registration installs the base
//! resource with the `T` placeholder and its synthesized method set; the
//! registry memoizes concrete `Vector<T>` instances that share those
//! methods. The heap layout is `{ T* elements, usize size, usize
//! capacity }` with `size <= capacity` as the runtime invariant.
//!
//! The methods have no function bodies; every call site gets its IR
//! emitted inline:
//!
//! - `get`/`set` bounds-check `index < size` and abort on violation
//! - `add` doubles the capacity when full (0 grows straight to 4),
//!   moves the old elements with `memmove`, then appends
//! - `insert` shifts `[i, size)` one slot forward, `remove` shifts
//!   `[i+1, size)` back and returns the evicted element
//! - `size`/`capacity` live under their own named paths

use inkwell::{
    types::{BasicTypeEnum, StructType},
    values::{BasicValueEnum, IntValue, PointerValue},
    IntPredicate,
};

use crate::{
    ast::{Span, Visibility},
    codegen::{CgResult, CodegenContext, Value},
    errors::CompileError,
    ir::ABORT,
    symbols::{FunctionBody, FunctionSymbol},
    types::{
        BuiltinMethod, Method, MethodBody, PathSegment, ResourceType, Type, TypeHandle,
    },
};

/// Field indices of the vector heap struct.
pub const ELEMENTS: u32 = 0;
pub const SIZE: u32 = 1;
pub const CAPACITY: u32 = 2;

/// Capacity a zero-capacity vector jumps to on its first growth.
const INITIAL_GROWTH: u64 = 4;

/// Registers the generic `Vector` resource, its synthesized methods and
/// the `Vector()` constructor function.
pub fn register(ctx: &CodegenContext) {
    let usize_type = ctx.registry.get_type(&TypeHandle::USIZE);
    let element = Type::Generic("T".to_string());

    let vector = ctx
        .registry
        .create_resource_type("Vector", None, vec![element.clone()]);

    let indexer = || {
        vec![PathSegment::Indexer {
            name: "index".to_string(),
            ty: usize_type.clone(),
        }]
    };
    let method = |name: &str,
                  path: Vec<PathSegment>,
                  parameters: Vec<(String, Type)>,
                  return_type: Type,
                  builtin: BuiltinMethod| Method {
        name: name.to_string(),
        return_type,
        parameters,
        visibility: Visibility::Global,
        path,
        body: MethodBody::Builtin(builtin),
    };

    vector.push_method(method(
        "get",
        indexer(),
        vec![],
        element.clone(),
        BuiltinMethod::VectorGet,
    ));
    vector.push_method(method(
        "set",
        indexer(),
        vec![("value".to_string(), element.clone())],
        Type::Unit,
        BuiltinMethod::VectorSet,
    ));
    vector.push_method(method(
        "add",
        vec![],
        vec![("element".to_string(), element.clone())],
        Type::Unit,
        BuiltinMethod::VectorAdd,
    ));
    vector.push_method(method(
        "insert",
        vec![],
        vec![
            ("index".to_string(), usize_type.clone()),
            ("element".to_string(), element.clone()),
        ],
        Type::Unit,
        BuiltinMethod::VectorInsert,
    ));
    vector.push_method(method(
        "remove",
        vec![],
        vec![("index".to_string(), usize_type.clone())],
        element.clone(),
        BuiltinMethod::VectorRemove,
    ));
    vector.push_method(method(
        "get",
        vec![PathSegment::Named("size".to_string())],
        vec![],
        usize_type.clone(),
        BuiltinMethod::VectorSize,
    ));
    vector.push_method(method(
        "get",
        vec![PathSegment::Named("capacity".to_string())],
        vec![],
        usize_type,
        BuiltinMethod::VectorCapacity,
    ));

    // `Vector()` is the empty-vector constructor; its element type comes
    // from the use site, like an untyped literal.
    let _ = ctx.symbols.borrow_mut().define_function(FunctionSymbol {
        name: "Vector".to_string(),
        return_type: Type::Resource(vector),
        parameters: vec![],
        visibility: Visibility::Global,
        defined_in: None,
        body: FunctionBody::VectorConstructor,
    });
}

/// An empty vector: `elements = null, size = 0, capacity = 0`.
pub fn build_empty_vector<'ctx>(
    ctx: &CodegenContext<'ctx>,
    resource: &ResourceType,
) -> CgResult<PointerValue<'ctx>> {
    let struct_type = ctx.resource_struct_type(resource);
    build_vector(
        ctx,
        struct_type,
        ctx.ir.const_null(),
        ctx.ir.const_size(0),
        ctx.ir.const_size(0),
    )
}

/// Allocates a vector struct and fills its three fields.
pub fn build_vector<'ctx>(
    ctx: &CodegenContext<'ctx>,
    struct_type: StructType<'ctx>,
    elements: PointerValue<'ctx>,
    size: IntValue<'ctx>,
    capacity: IntValue<'ctx>,
) -> CgResult<PointerValue<'ctx>> {
    let bytes = ctx.ir.size_of(struct_type.into())?;
    let vector = ctx.ir.gc_malloc(bytes)?;

    let elements_ptr = ctx.ir.struct_gep(struct_type, vector, ELEMENTS, "elements")?;
    ctx.ir.store(elements_ptr, elements.into())?;
    let size_ptr = ctx.ir.struct_gep(struct_type, vector, SIZE, "size")?;
    ctx.ir.store(size_ptr, size.into())?;
    let capacity_ptr = ctx.ir.struct_gep(struct_type, vector, CAPACITY, "capacity")?;
    ctx.ir.store(capacity_ptr, capacity.into())?;

    Ok(vector)
}

/// Emits one synthesized vector method inline at its call site.
pub fn emit_builtin_method<'ctx>(
    ctx: &CodegenContext<'ctx>,
    kind: BuiltinMethod,
    resource: &ResourceType,
    this: PointerValue<'ctx>,
    indexers: &[BasicValueEnum<'ctx>],
    arguments: &[BasicValueEnum<'ctx>],
    span: Span,
) -> CgResult<Value<'ctx>> {
    let element = resource.element_type().ok_or_else(|| {
        CompileError::internal(format!("resource {} has no element type", resource.name()))
    })?;
    if matches!(element, Type::Generic(_)) {
        return Err(ctx.error(span, "Cannot infer element type of Vector()"));
    }
    let element_type = ctx.llvm_type(&element)?;
    let struct_type = ctx.resource_struct_type(resource);
    let usize_type = ctx.registry.get_type(&TypeHandle::USIZE);

    let load_field = |index: u32, name: &str| -> CgResult<BasicValueEnum<'ctx>> {
        let pointer = ctx.ir.struct_gep(struct_type, this, index, name)?;
        let ty: BasicTypeEnum<'ctx> = if index == ELEMENTS {
            ctx.ir.ptr_type().into()
        } else {
            ctx.ir.size_type().into()
        };
        Ok(ctx.ir.load(ty, pointer, name)?)
    };
    let store_field = |index: u32, name: &str, value: BasicValueEnum<'ctx>| -> CgResult<()> {
        let pointer = ctx.ir.struct_gep(struct_type, this, index, name)?;
        ctx.ir.store(pointer, value)?;
        Ok(())
    };

    match kind {
        BuiltinMethod::VectorSize => Ok(Value::concrete(usize_type, load_field(SIZE, "size")?)),
        BuiltinMethod::VectorCapacity => Ok(Value::concrete(
            usize_type,
            load_field(CAPACITY, "capacity")?,
        )),
        BuiltinMethod::VectorGet => {
            let index = indexers[0].into_int_value();
            let size = load_field(SIZE, "size")?.into_int_value();
            emit_bounds_check(ctx, index, size, IntPredicate::ULT)?;

            let elements = load_field(ELEMENTS, "elements")?.into_pointer_value();
            let slot = ctx.ir.in_bounds_gep(element_type, elements, &[index], "slot")?;
            let value = ctx.ir.load(element_type, slot, "element")?;
            Ok(Value::concrete(element, value))
        }
        BuiltinMethod::VectorSet => {
            let index = indexers[0].into_int_value();
            let size = load_field(SIZE, "size")?.into_int_value();
            emit_bounds_check(ctx, index, size, IntPredicate::ULT)?;

            let elements = load_field(ELEMENTS, "elements")?.into_pointer_value();
            let slot = ctx.ir.in_bounds_gep(element_type, elements, &[index], "slot")?;
            ctx.ir.store(slot, arguments[0])?;
            Ok(Value::unit(ctx))
        }
        BuiltinMethod::VectorAdd => {
            emit_growth(ctx, struct_type, this, element_type)?;

            let size = load_field(SIZE, "size")?.into_int_value();
            let elements = load_field(ELEMENTS, "elements")?.into_pointer_value();
            let slot = ctx.ir.in_bounds_gep(element_type, elements, &[size], "slot")?;
            ctx.ir.store(slot, arguments[0])?;

            let one = ctx.ir.const_size(1);
            let grown = ctx.ir.add(size, one)?;
            store_field(SIZE, "size", grown.into())?;
            Ok(Value::unit(ctx))
        }
        BuiltinMethod::VectorInsert => {
            let index = arguments[0].into_int_value();
            let size = load_field(SIZE, "size")?.into_int_value();
            emit_bounds_check(ctx, index, size, IntPredicate::ULE)?;

            emit_growth(ctx, struct_type, this, element_type)?;

            // Shift [index, size) one slot forward.
            let size = load_field(SIZE, "size")?.into_int_value();
            let elements = load_field(ELEMENTS, "elements")?.into_pointer_value();
            let element_bytes = element_bytes(ctx, element_type)?;
            let source = ctx.ir.in_bounds_gep(element_type, elements, &[index], "from")?;
            let one = ctx.ir.const_size(1);
            let shifted_index = ctx.ir.add(index, one)?;
            let destination =
                ctx.ir
                    .in_bounds_gep(element_type, elements, &[shifted_index], "to")?;
            let moved = ctx.ir.sub(size, index)?;
            let moved_bytes = ctx.ir.mul(moved, element_bytes)?;
            ctx.ir.memmove(destination, source, moved_bytes)?;

            ctx.ir.store(source, arguments[1])?;
            let grown = ctx.ir.add(size, one)?;
            store_field(SIZE, "size", grown.into())?;
            Ok(Value::unit(ctx))
        }
        BuiltinMethod::VectorRemove => {
            let index = arguments[0].into_int_value();
            let size = load_field(SIZE, "size")?.into_int_value();
            emit_bounds_check(ctx, index, size, IntPredicate::ULT)?;

            let elements = load_field(ELEMENTS, "elements")?.into_pointer_value();
            let slot = ctx.ir.in_bounds_gep(element_type, elements, &[index], "slot")?;
            let removed = ctx.ir.load(element_type, slot, "removed")?;

            // Shift [index + 1, size) one slot back.
            let one = ctx.ir.const_size(1);
            let next_index = ctx.ir.add(index, one)?;
            let source = ctx.ir.in_bounds_gep(element_type, elements, &[next_index], "from")?;
            let element_bytes = element_bytes(ctx, element_type)?;
            let moved = ctx.ir.sub(size, next_index)?;
            let moved_bytes = ctx.ir.mul(moved, element_bytes)?;
            ctx.ir.memmove(slot, source, moved_bytes)?;

            let shrunk = ctx.ir.sub(size, one)?;
            store_field(SIZE, "size", shrunk.into())?;
            Ok(Value::concrete(element, removed))
        }
    }
}

/// Element byte size as a value of the `usize` width. `size_of` constants
/// are 64-bit; narrower targets truncate.
fn element_bytes<'ctx>(
    ctx: &CodegenContext<'ctx>,
    element_type: BasicTypeEnum<'ctx>,
) -> CgResult<IntValue<'ctx>> {
    let bytes = ctx.ir.size_of(element_type)?;
    if ctx.ir.pointer_width() < 64 {
        return Ok(ctx.ir.trunc(bytes, ctx.ir.size_type())?);
    }
    Ok(bytes)
}

/// `index <pred> limit`, else `abort()`.
fn emit_bounds_check<'ctx>(
    ctx: &CodegenContext<'ctx>,
    index: IntValue<'ctx>,
    limit: IntValue<'ctx>,
    predicate: IntPredicate,
) -> CgResult<()> {
    let in_bounds = ctx.ir.icmp(predicate, index, limit)?;

    let function = ctx.ir.current_function()?;
    let ok_block = ctx.ir.append_block(function, "bounds_ok");
    let fail_block = ctx.ir.append_block(function, "bounds_fail");
    ctx.ir.condbr(in_bounds, ok_block, fail_block)?;

    ctx.ir.position_at_end(fail_block);
    let abort = ctx.ir.runtime_function(ABORT)?;
    ctx.ir.call(abort, &[])?;
    ctx.ir.unreachable()?;

    ctx.ir.position_at_end(ok_block);
    Ok(())
}

/// When `size == capacity`, reallocate at double capacity (4 from zero)
/// and move the elements over.
fn emit_growth<'ctx>(
    ctx: &CodegenContext<'ctx>,
    struct_type: StructType<'ctx>,
    this: PointerValue<'ctx>,
    element_type: BasicTypeEnum<'ctx>,
) -> CgResult<()> {
    let size_ptr = ctx.ir.struct_gep(struct_type, this, SIZE, "size")?;
    let capacity_ptr = ctx.ir.struct_gep(struct_type, this, CAPACITY, "capacity")?;
    let elements_ptr = ctx.ir.struct_gep(struct_type, this, ELEMENTS, "elements")?;

    let size_type: BasicTypeEnum<'ctx> = ctx.ir.size_type().into();
    let size = ctx.ir.load(size_type, size_ptr, "size")?.into_int_value();
    let capacity = ctx
        .ir
        .load(size_type, capacity_ptr, "capacity")?
        .into_int_value();

    let full = ctx.ir.icmp(IntPredicate::EQ, size, capacity)?;
    let function = ctx.ir.current_function()?;
    let grow_block = ctx.ir.append_block(function, "vector_grow");
    let continue_block = ctx.ir.append_block(function, "vector_fits");
    ctx.ir.condbr(full, grow_block, continue_block)?;

    ctx.ir.position_at_end(grow_block);
    let zero = ctx.ir.const_size(0);
    let was_empty = ctx.ir.icmp(IntPredicate::EQ, capacity, zero)?;
    let two = ctx.ir.const_size(2);
    let doubled = ctx.ir.mul(capacity, two)?;
    let initial = ctx.ir.const_size(INITIAL_GROWTH);
    let new_capacity = ctx
        .ir
        .select(was_empty, initial.into(), doubled.into())?
        .into_int_value();

    let element_bytes = element_bytes(ctx, element_type)?;
    let new_bytes = ctx.ir.mul(new_capacity, element_bytes)?;
    let new_elements = ctx.ir.gc_malloc(new_bytes)?;

    let old_elements = ctx
        .ir
        .load(ctx.ir.ptr_type().into(), elements_ptr, "old_elements")?
        .into_pointer_value();
    let old_bytes = ctx.ir.mul(size, element_bytes)?;
    ctx.ir.memmove(new_elements, old_elements, old_bytes)?;

    ctx.ir.store(elements_ptr, new_elements.into())?;
    ctx.ir.store(capacity_ptr, new_capacity.into())?;
    ctx.ir.br(continue_block)?;

    ctx.ir.position_at_end(continue_block);
    Ok(())
}
