//! # IR Facade
//!
//! The one layer of the compiler that knows binding-specific details of
//! the LLVM IR builder. Everything above works in terms of this module's
//! operations: types, constants, instructions, garbage-collector runtime
//! calls, verification, optimization and emission.
//!
//! Every operation has a single exit: success returns an IR value, type
//! or block; invalid inputs surface as [`IrError`], which callers treat
//! as fatal. The builder is positioned at exactly one basic block while
//! emitting, and every block handed to a branch ends up with exactly one
//! terminator; the code generator's reachability tracking relies on
//! both invariants.

mod target;

pub use self::target::*;

use std::{error::Error, fmt::Display};

use inkwell::{
    basic_block::BasicBlock,
    builder::{Builder, BuilderError},
    context::Context,
    module::Module,
    targets::TargetMachine,
    types::{BasicMetadataTypeEnum, BasicType, BasicTypeEnum, FloatType, FunctionType, IntType, PointerType, StructType},
    values::{
        BasicMetadataValueEnum, BasicValueEnum, FloatValue, FunctionValue, IntValue, PhiValue,
        PointerValue,
    },
    AddressSpace, FloatPredicate, IntPredicate,
};

/// Failures raised by the facade. All of them are compiler-fatal.
#[derive(Debug)]
pub enum IrError {
    Builder(BuilderError),
    /// An instruction was requested while the builder had no block.
    Unpositioned,
    Verification(String),
    Target(String),
    InvalidInput(String),
}

impl Display for IrError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IrError::Builder(inner) => write!(f, "IR builder failure: {inner}"),
            IrError::Unpositioned => f.write_str("IR builder is not positioned at a basic block"),
            IrError::Verification(message) => write!(f, "module verification failed: {message}"),
            IrError::Target(message) => write!(f, "target machine failure: {message}"),
            IrError::InvalidInput(message) => f.write_str(message),
        }
    }
}

impl Error for IrError {}

impl From<BuilderError> for IrError {
    fn from(value: BuilderError) -> Self {
        IrError::Builder(value)
    }
}

pub type IrResult<T> = Result<T, IrError>;

/// Names of the C-level runtime symbols generated code links against.
pub const GC_INIT: &str = "GC_init";
pub const GC_MALLOC: &str = "GC_malloc";
pub const GC_MALLOC_ATOMIC: &str = "GC_malloc_atomic";
pub const PRINTF: &str = "printf";
pub const SNPRINTF: &str = "snprintf";
pub const ABORT: &str = "abort";

/// The facade over one LLVM context/module/builder triple.
///
/// Owned by the driver for the duration of a compilation; dropping it
/// releases the module and builder before the context.
pub struct Ir<'ctx> {
    context: &'ctx Context,
    module: Module<'ctx>,
    builder: Builder<'ctx>,
    pointer_width: u32,
    /// Named structs created so far; lookups must return the same
    /// instance that the opaque declaration created.
    named_structs: std::cell::RefCell<std::collections::HashMap<String, StructType<'ctx>>>,
}

impl<'ctx> Ir<'ctx> {
    /// Creates the module and builder. When a target machine is given,
    /// its triple and data layout are stamped onto the module so two runs
    /// over the same sources emit identical IR.
    pub fn new(
        context: &'ctx Context,
        module_name: &str,
        machine: Option<&TargetMachine>,
    ) -> Self {
        let module = context.create_module(module_name);
        let builder = context.create_builder();

        let pointer_width = match machine {
            Some(machine) => {
                let data = machine.get_target_data();
                module.set_triple(&machine.get_triple());
                module.set_data_layout(&data.get_data_layout());
                data.get_pointer_byte_size(None) * 8
            }
            None => 64,
        };

        Ir {
            context,
            module,
            builder,
            pointer_width,
            named_structs: std::cell::RefCell::new(std::collections::HashMap::new()),
        }
    }

    pub fn pointer_width(&self) -> u32 {
        self.pointer_width
    }

    // === Types ===

    pub fn int_type(&self, bits: u32) -> IntType<'ctx> {
        self.context.custom_width_int_type(bits)
    }

    pub fn bool_type(&self) -> IntType<'ctx> {
        self.context.bool_type()
    }

    pub fn char_type(&self) -> IntType<'ctx> {
        self.context.i32_type()
    }

    /// Integer of the target pointer width, backing `isize`/`usize`.
    pub fn size_type(&self) -> IntType<'ctx> {
        self.int_type(self.pointer_width)
    }

    pub fn f32_type(&self) -> FloatType<'ctx> {
        self.context.f32_type()
    }

    pub fn f64_type(&self) -> FloatType<'ctx> {
        self.context.f64_type()
    }

    pub fn ptr_type(&self) -> PointerType<'ctx> {
        self.context.i8_type().ptr_type(AddressSpace::default())
    }

    /// The unit type `()`: an empty struct.
    pub fn unit_type(&self) -> StructType<'ctx> {
        self.context.struct_type(&[], false)
    }

    pub fn struct_type(&self, fields: &[BasicTypeEnum<'ctx>]) -> StructType<'ctx> {
        self.context.struct_type(fields, false)
    }

    /// Creates (or fetches) an opaque named struct whose body is set
    /// later, so recursive resource references are legal.
    pub fn struct_named(&self, name: &str) -> StructType<'ctx> {
        if let Some(existing) = self.named_structs.borrow().get(name) {
            return *existing;
        }
        let created = self.context.opaque_struct_type(name);
        self.named_structs
            .borrow_mut()
            .insert(name.to_string(), created);
        created
    }

    pub fn struct_set_body(&self, opaque: StructType<'ctx>, fields: &[BasicTypeEnum<'ctx>]) {
        opaque.set_body(fields, false);
    }

    pub fn array_type(
        &self,
        element: BasicTypeEnum<'ctx>,
        length: u32,
    ) -> inkwell::types::ArrayType<'ctx> {
        element.array_type(length)
    }

    pub fn function_type(
        &self,
        return_type: Option<BasicTypeEnum<'ctx>>,
        parameters: &[BasicMetadataTypeEnum<'ctx>],
        variadic: bool,
    ) -> FunctionType<'ctx> {
        match return_type {
            Some(ty) => ty.fn_type(parameters, variadic),
            None => self.context.void_type().fn_type(parameters, variadic),
        }
    }

    // === Constants ===

    pub fn const_int(&self, ty: IntType<'ctx>, value: u64, sign_extend: bool) -> IntValue<'ctx> {
        ty.const_int(value, sign_extend)
    }

    /// Integer constant from a decimal string, for values beyond `u64`.
    pub fn const_int_from_string(&self, ty: IntType<'ctx>, text: &str) -> IrResult<IntValue<'ctx>> {
        ty.const_int_from_string(text, inkwell::types::StringRadix::Decimal)
            .ok_or_else(|| IrError::InvalidInput(format!("invalid integer constant '{text}'")))
    }

    pub fn const_float(&self, ty: FloatType<'ctx>, value: f64) -> FloatValue<'ctx> {
        ty.const_float(value)
    }

    pub fn const_bool(&self, value: bool) -> IntValue<'ctx> {
        self.bool_type().const_int(u64::from(value), false)
    }

    pub fn const_null(&self) -> PointerValue<'ctx> {
        self.ptr_type().const_null()
    }

    pub fn const_size(&self, value: u64) -> IntValue<'ctx> {
        self.size_type().const_int(value, false)
    }

    pub fn unit_value(&self) -> BasicValueEnum<'ctx> {
        self.unit_type().const_zero().into()
    }

    /// A pointer to a NUL-terminated global string constant. Content
    /// deduplication happens one layer up, in the code generator's cache.
    pub fn global_string(&self, text: &str, name: &str) -> IrResult<PointerValue<'ctx>> {
        Ok(self
            .builder
            .build_global_string_ptr(text, name)?
            .as_pointer_value())
    }

    // === Functions and blocks ===

    pub fn add_function(&self, name: &str, ty: FunctionType<'ctx>) -> FunctionValue<'ctx> {
        self.module.add_function(name, ty, None)
    }

    pub fn get_function(&self, name: &str) -> Option<FunctionValue<'ctx>> {
        self.module.get_function(name)
    }

    /// Fetch a runtime symbol declared by [`Ir::declare_runtime`].
    pub fn runtime_function(&self, name: &str) -> IrResult<FunctionValue<'ctx>> {
        self.module
            .get_function(name)
            .ok_or_else(|| IrError::InvalidInput(format!("runtime function '{name}' not declared")))
    }

    /// Declares the external runtime surface: the GC allocator entry
    /// points plus the libc formatting functions built-ins call into.
    pub fn declare_runtime(&self) {
        let ptr = self.ptr_type();
        let size = self.size_type();
        let i32_type = self.context.i32_type();

        self.module.add_function(
            GC_INIT,
            self.context.void_type().fn_type(&[], false),
            None,
        );
        self.module
            .add_function(GC_MALLOC, ptr.fn_type(&[size.into()], false), None);
        self.module
            .add_function(GC_MALLOC_ATOMIC, ptr.fn_type(&[size.into()], false), None);
        self.module
            .add_function(PRINTF, i32_type.fn_type(&[ptr.into()], true), None);
        self.module.add_function(
            SNPRINTF,
            i32_type.fn_type(&[ptr.into(), size.into(), ptr.into()], true),
            None,
        );
        self.module.add_function(
            ABORT,
            self.context.void_type().fn_type(&[], false),
            None,
        );
    }

    pub fn append_block(&self, function: FunctionValue<'ctx>, name: &str) -> BasicBlock<'ctx> {
        self.context.append_basic_block(function, name)
    }

    pub fn position_at_end(&self, block: BasicBlock<'ctx>) {
        self.builder.position_at_end(block);
    }

    pub fn current_block(&self) -> IrResult<BasicBlock<'ctx>> {
        self.builder.get_insert_block().ok_or(IrError::Unpositioned)
    }

    pub fn current_function(&self) -> IrResult<FunctionValue<'ctx>> {
        self.current_block()?
            .get_parent()
            .ok_or(IrError::Unpositioned)
    }

    /// Whether the block being emitted into already has its terminator.
    pub fn block_terminated(&self) -> IrResult<bool> {
        Ok(self.current_block()?.get_terminator().is_some())
    }

    // === Integer arithmetic ===

    pub fn add(&self, l: IntValue<'ctx>, r: IntValue<'ctx>) -> IrResult<IntValue<'ctx>> {
        Ok(self.builder.build_int_add(l, r, "")?)
    }

    pub fn sub(&self, l: IntValue<'ctx>, r: IntValue<'ctx>) -> IrResult<IntValue<'ctx>> {
        Ok(self.builder.build_int_sub(l, r, "")?)
    }

    pub fn mul(&self, l: IntValue<'ctx>, r: IntValue<'ctx>) -> IrResult<IntValue<'ctx>> {
        Ok(self.builder.build_int_mul(l, r, "")?)
    }

    pub fn sdiv(&self, l: IntValue<'ctx>, r: IntValue<'ctx>) -> IrResult<IntValue<'ctx>> {
        Ok(self.builder.build_int_signed_div(l, r, "")?)
    }

    pub fn udiv(&self, l: IntValue<'ctx>, r: IntValue<'ctx>) -> IrResult<IntValue<'ctx>> {
        Ok(self.builder.build_int_unsigned_div(l, r, "")?)
    }

    pub fn srem(&self, l: IntValue<'ctx>, r: IntValue<'ctx>) -> IrResult<IntValue<'ctx>> {
        Ok(self.builder.build_int_signed_rem(l, r, "")?)
    }

    pub fn urem(&self, l: IntValue<'ctx>, r: IntValue<'ctx>) -> IrResult<IntValue<'ctx>> {
        Ok(self.builder.build_int_unsigned_rem(l, r, "")?)
    }

    pub fn neg(&self, value: IntValue<'ctx>) -> IrResult<IntValue<'ctx>> {
        Ok(self.builder.build_int_neg(value, "")?)
    }

    pub fn not(&self, value: IntValue<'ctx>) -> IrResult<IntValue<'ctx>> {
        Ok(self.builder.build_not(value, "")?)
    }

    pub fn and(&self, l: IntValue<'ctx>, r: IntValue<'ctx>) -> IrResult<IntValue<'ctx>> {
        Ok(self.builder.build_and(l, r, "")?)
    }

    pub fn or(&self, l: IntValue<'ctx>, r: IntValue<'ctx>) -> IrResult<IntValue<'ctx>> {
        Ok(self.builder.build_or(l, r, "")?)
    }

    pub fn xor(&self, l: IntValue<'ctx>, r: IntValue<'ctx>) -> IrResult<IntValue<'ctx>> {
        Ok(self.builder.build_xor(l, r, "")?)
    }

    pub fn shl(&self, l: IntValue<'ctx>, r: IntValue<'ctx>) -> IrResult<IntValue<'ctx>> {
        Ok(self.builder.build_left_shift(l, r, "")?)
    }

    pub fn ashr(&self, l: IntValue<'ctx>, r: IntValue<'ctx>) -> IrResult<IntValue<'ctx>> {
        Ok(self.builder.build_right_shift(l, r, true, "")?)
    }

    pub fn lshr(&self, l: IntValue<'ctx>, r: IntValue<'ctx>) -> IrResult<IntValue<'ctx>> {
        Ok(self.builder.build_right_shift(l, r, false, "")?)
    }

    pub fn icmp(
        &self,
        predicate: IntPredicate,
        l: IntValue<'ctx>,
        r: IntValue<'ctx>,
    ) -> IrResult<IntValue<'ctx>> {
        Ok(self.builder.build_int_compare(predicate, l, r, "")?)
    }

    // === Float arithmetic ===

    pub fn fadd(&self, l: FloatValue<'ctx>, r: FloatValue<'ctx>) -> IrResult<FloatValue<'ctx>> {
        Ok(self.builder.build_float_add(l, r, "")?)
    }

    pub fn fsub(&self, l: FloatValue<'ctx>, r: FloatValue<'ctx>) -> IrResult<FloatValue<'ctx>> {
        Ok(self.builder.build_float_sub(l, r, "")?)
    }

    pub fn fmul(&self, l: FloatValue<'ctx>, r: FloatValue<'ctx>) -> IrResult<FloatValue<'ctx>> {
        Ok(self.builder.build_float_mul(l, r, "")?)
    }

    pub fn fdiv(&self, l: FloatValue<'ctx>, r: FloatValue<'ctx>) -> IrResult<FloatValue<'ctx>> {
        Ok(self.builder.build_float_div(l, r, "")?)
    }

    pub fn frem(&self, l: FloatValue<'ctx>, r: FloatValue<'ctx>) -> IrResult<FloatValue<'ctx>> {
        Ok(self.builder.build_float_rem(l, r, "")?)
    }

    pub fn fneg(&self, value: FloatValue<'ctx>) -> IrResult<FloatValue<'ctx>> {
        Ok(self.builder.build_float_neg(value, "")?)
    }

    pub fn fcmp(
        &self,
        predicate: FloatPredicate,
        l: FloatValue<'ctx>,
        r: FloatValue<'ctx>,
    ) -> IrResult<IntValue<'ctx>> {
        Ok(self.builder.build_float_compare(predicate, l, r, "")?)
    }

    // === Casts ===

    pub fn sext(&self, value: IntValue<'ctx>, to: IntType<'ctx>) -> IrResult<IntValue<'ctx>> {
        Ok(self.builder.build_int_s_extend(value, to, "")?)
    }

    pub fn zext(&self, value: IntValue<'ctx>, to: IntType<'ctx>) -> IrResult<IntValue<'ctx>> {
        Ok(self.builder.build_int_z_extend(value, to, "")?)
    }

    pub fn trunc(&self, value: IntValue<'ctx>, to: IntType<'ctx>) -> IrResult<IntValue<'ctx>> {
        Ok(self.builder.build_int_truncate(value, to, "")?)
    }

    pub fn fpext(&self, value: FloatValue<'ctx>, to: FloatType<'ctx>) -> IrResult<FloatValue<'ctx>> {
        Ok(self.builder.build_float_ext(value, to, "")?)
    }

    pub fn fptrunc(
        &self,
        value: FloatValue<'ctx>,
        to: FloatType<'ctx>,
    ) -> IrResult<FloatValue<'ctx>> {
        Ok(self.builder.build_float_trunc(value, to, "")?)
    }

    pub fn sitofp(&self, value: IntValue<'ctx>, to: FloatType<'ctx>) -> IrResult<FloatValue<'ctx>> {
        Ok(self.builder.build_signed_int_to_float(value, to, "")?)
    }

    pub fn uitofp(&self, value: IntValue<'ctx>, to: FloatType<'ctx>) -> IrResult<FloatValue<'ctx>> {
        Ok(self.builder.build_unsigned_int_to_float(value, to, "")?)
    }

    pub fn fptosi(&self, value: FloatValue<'ctx>, to: IntType<'ctx>) -> IrResult<IntValue<'ctx>> {
        Ok(self.builder.build_float_to_signed_int(value, to, "")?)
    }

    pub fn fptoui(&self, value: FloatValue<'ctx>, to: IntType<'ctx>) -> IrResult<IntValue<'ctx>> {
        Ok(self.builder.build_float_to_unsigned_int(value, to, "")?)
    }

    pub fn bitcast(
        &self,
        value: BasicValueEnum<'ctx>,
        to: BasicTypeEnum<'ctx>,
    ) -> IrResult<BasicValueEnum<'ctx>> {
        Ok(self.builder.build_bit_cast(value, to, "")?)
    }

    // === Memory ===

    pub fn alloca(&self, ty: BasicTypeEnum<'ctx>, name: &str) -> IrResult<PointerValue<'ctx>> {
        Ok(self.builder.build_alloca(ty, name)?)
    }

    pub fn load(
        &self,
        ty: BasicTypeEnum<'ctx>,
        ptr: PointerValue<'ctx>,
        name: &str,
    ) -> IrResult<BasicValueEnum<'ctx>> {
        let typed_ptr = self.builder.build_pointer_cast(ptr, ty.ptr_type(AddressSpace::default()), "")?;
        Ok(self.builder.build_load(typed_ptr, name)?)
    }

    pub fn store(&self, ptr: PointerValue<'ctx>, value: BasicValueEnum<'ctx>) -> IrResult<()> {
        self.builder.build_store(ptr, value)?;
        Ok(())
    }

    pub fn struct_gep(
        &self,
        ty: StructType<'ctx>,
        ptr: PointerValue<'ctx>,
        index: u32,
        name: &str,
    ) -> IrResult<PointerValue<'ctx>> {
        let typed_ptr = self.builder.build_pointer_cast(ptr, ty.ptr_type(AddressSpace::default()), "")?;
        Ok(self.builder.build_struct_gep(typed_ptr, index, name)?)
    }

    pub fn in_bounds_gep(
        &self,
        element: BasicTypeEnum<'ctx>,
        ptr: PointerValue<'ctx>,
        indices: &[IntValue<'ctx>],
        name: &str,
    ) -> IrResult<PointerValue<'ctx>> {
        let typed_ptr = self.builder.build_pointer_cast(ptr, element.ptr_type(AddressSpace::default()), "")?;
        // Safety: callers only index GC-allocated buffers within bounds
        // they have just checked or established.
        Ok(unsafe { self.builder.build_in_bounds_gep(typed_ptr, indices, name)? })
    }

    pub fn memcpy(
        &self,
        dest: PointerValue<'ctx>,
        src: PointerValue<'ctx>,
        size: IntValue<'ctx>,
    ) -> IrResult<()> {
        self.builder.build_memcpy(dest, 1, src, 1, size)?;
        Ok(())
    }

    pub fn memmove(
        &self,
        dest: PointerValue<'ctx>,
        src: PointerValue<'ctx>,
        size: IntValue<'ctx>,
    ) -> IrResult<()> {
        self.builder.build_memmove(dest, 1, src, 1, size)?;
        Ok(())
    }

    pub fn memset(
        &self,
        dest: PointerValue<'ctx>,
        value: IntValue<'ctx>,
        size: IntValue<'ctx>,
    ) -> IrResult<()> {
        self.builder.build_memset(dest, 1, value, size)?;
        Ok(())
    }

    /// Constant byte size of a type, as laid out in the current module.
    pub fn size_of(&self, ty: BasicTypeEnum<'ctx>) -> IrResult<IntValue<'ctx>> {
        ty.size_of()
            .ok_or_else(|| IrError::InvalidInput(format!("type {ty:?} is not sized")))
    }

    // === GC allocator ===

    pub fn gc_init(&self) -> IrResult<()> {
        let gc_init = self.runtime_function(GC_INIT)?;
        self.builder.build_call(gc_init, &[], "")?;
        Ok(())
    }

    /// Heap allocation that may contain pointers.
    pub fn gc_malloc(&self, size: IntValue<'ctx>) -> IrResult<PointerValue<'ctx>> {
        let gc_malloc = self.runtime_function(GC_MALLOC)?;
        self.call_returning(gc_malloc, &[size.into()])
            .map(BasicValueEnum::into_pointer_value)
    }

    /// Heap allocation for pointer-free buffers.
    pub fn gc_malloc_atomic(&self, size: IntValue<'ctx>) -> IrResult<PointerValue<'ctx>> {
        let gc_malloc_atomic = self.runtime_function(GC_MALLOC_ATOMIC)?;
        self.call_returning(gc_malloc_atomic, &[size.into()])
            .map(BasicValueEnum::into_pointer_value)
    }

    // === Control flow ===

    pub fn br(&self, block: BasicBlock<'ctx>) -> IrResult<()> {
        self.builder.build_unconditional_branch(block)?;
        Ok(())
    }

    pub fn condbr(
        &self,
        condition: IntValue<'ctx>,
        then_block: BasicBlock<'ctx>,
        else_block: BasicBlock<'ctx>,
    ) -> IrResult<()> {
        self.builder
            .build_conditional_branch(condition, then_block, else_block)?;
        Ok(())
    }

    pub fn phi(&self, ty: BasicTypeEnum<'ctx>, name: &str) -> IrResult<PhiValue<'ctx>> {
        Ok(self.builder.build_phi(ty, name)?)
    }

    pub fn select(
        &self,
        condition: IntValue<'ctx>,
        then_value: BasicValueEnum<'ctx>,
        else_value: BasicValueEnum<'ctx>,
    ) -> IrResult<BasicValueEnum<'ctx>> {
        Ok(self
            .builder
            .build_select(condition, then_value, else_value, "")?)
    }

    pub fn ret(&self, value: Option<BasicValueEnum<'ctx>>) -> IrResult<()> {
        match value {
            Some(value) => self.builder.build_return(Some(&value))?,
            None => self.builder.build_return(None)?,
        };
        Ok(())
    }

    pub fn unreachable(&self) -> IrResult<()> {
        self.builder.build_unreachable()?;
        Ok(())
    }

    // === Calls ===

    /// Emits a call, yielding the returned value for non-void callees.
    pub fn call(
        &self,
        function: FunctionValue<'ctx>,
        arguments: &[BasicMetadataValueEnum<'ctx>],
    ) -> IrResult<Option<BasicValueEnum<'ctx>>> {
        let site = self.builder.build_call(function, arguments, "")?;
        Ok(site.try_as_basic_value().left())
    }

    /// Emits a call whose callee is known to return a value.
    pub fn call_returning(
        &self,
        function: FunctionValue<'ctx>,
        arguments: &[BasicMetadataValueEnum<'ctx>],
    ) -> IrResult<BasicValueEnum<'ctx>> {
        self.call(function, arguments)?.ok_or_else(|| {
            IrError::InvalidInput(format!(
                "call to '{}' produced no value",
                function.get_name().to_string_lossy()
            ))
        })
    }

    // === Module services ===

    pub fn verify(&self) -> IrResult<()> {
        self.module
            .verify()
            .map_err(|message| IrError::Verification(message.to_string()))
    }

    /// Renders the module as LLVM textual IR.
    pub fn emit_ir(&self) -> String {
        self.module.print_to_string().to_string()
    }

    pub fn write_ir_file(&self, path: &std::path::Path) -> IrResult<()> {
        self.module
            .print_to_file(path)
            .map_err(|message| IrError::Target(message.to_string()))
    }

    pub(crate) fn module(&self) -> &Module<'ctx> {
        &self.module
    }
}
