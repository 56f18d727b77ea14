//! # Code Generation
//!
//! Lowers validated parse trees to LLVM IR through the [`crate::ir`]
//! facade. The central coordination point is the [`CodegenContext`]:
//!
//! - **IR access**: the facade owning module, builder and context
//! - **Type management**: semantic types mapped to LLVM types with a
//!   per-name cache, including lazily materialized resource structs
//! - **Symbols**: the scope stack, function namespace and access
//!   contexts of [`crate::symbols`]
//! - **Diagnostics**: the shared [`ErrorReporter`]; expression and
//!   statement lowerers return `Result` and the enclosing block reports
//!   and continues
//!
//! Lowering follows the visitor pattern of the `CodeGen` trait: every
//! node generates its own IR against the shared context. Expressions
//! produce a [`Value`] (concrete or untyped); statements produce a
//! reachability flag stating whether control may fall through to the
//! next statement.

pub mod builtins;
pub mod conversion;
pub mod expressions;
pub mod signatures;
pub mod statements;
pub mod value;

pub use self::value::{UntypedValue, Value};

use std::{cell::RefCell, collections::HashMap};

use inkwell::{
    basic_block::BasicBlock,
    types::{BasicMetadataTypeEnum, BasicTypeEnum, FunctionType, StructType},
    values::PointerValue,
};

use crate::{
    ast::Span,
    errors::{CompileError, ErrorReporter},
    ir::{Ir, IrError},
    symbols::SymbolTable,
    types::{ResourceType, Type, TypeRegistry},
};

impl From<IrError> for CompileError {
    fn from(value: IrError) -> Self {
        CompileError::internal("IR emission failed").with_cause(value)
    }
}

pub type CgResult<T> = Result<T, CompileError>;

/// Jump targets of the innermost enclosing loop.
#[derive(Debug, Clone, Copy)]
pub struct LoopContext<'ctx> {
    pub continue_block: BasicBlock<'ctx>,
    pub break_block: BasicBlock<'ctx>,
}

/// State threaded through all of code generation. Interior mutability is
/// used for everything the visitor pattern touches through `&self`; code
/// generation is single-threaded.
pub struct CodegenContext<'ctx> {
    pub ir: Ir<'ctx>,
    pub registry: TypeRegistry,
    pub symbols: RefCell<SymbolTable<'ctx>>,
    pub reporter: RefCell<ErrorReporter>,
    /// Semantic type name → LLVM representation.
    llvm_types: RefCell<HashMap<String, BasicTypeEnum<'ctx>>>,
    /// String literal content → global constant, deduplicated per module.
    string_literals: RefCell<HashMap<String, PointerValue<'ctx>>>,
    loop_stack: RefCell<Vec<LoopContext<'ctx>>>,
    current_unit: RefCell<String>,
}

impl<'ctx> CodegenContext<'ctx> {
    pub fn new(ir: Ir<'ctx>) -> Self {
        let registry = TypeRegistry::new(ir.pointer_width());
        CodegenContext {
            ir,
            registry,
            symbols: RefCell::new(SymbolTable::new()),
            reporter: RefCell::new(ErrorReporter::new()),
            llvm_types: RefCell::new(HashMap::new()),
            string_literals: RefCell::new(HashMap::new()),
            loop_stack: RefCell::new(Vec::new()),
            current_unit: RefCell::new(String::new()),
        }
    }

    // === Diagnostics ===

    pub fn unit(&self) -> String {
        self.current_unit.borrow().clone()
    }

    pub fn set_unit(&self, name: &str) {
        *self.current_unit.borrow_mut() = name.to_string();
    }

    pub fn report(&self, error: CompileError) {
        self.reporter.borrow_mut().report(error);
    }

    /// Builds (but does not report) an error against the current unit.
    pub fn error(&self, span: Span, message: impl ToString) -> CompileError {
        CompileError::error(self.unit(), span, message)
    }

    pub fn warn(&self, span: Span, message: impl ToString) {
        self.report(CompileError::warning(self.unit(), span, message));
    }

    // === Loop contexts ===

    pub fn push_loop(&self, context: LoopContext<'ctx>) {
        self.loop_stack.borrow_mut().push(context);
    }

    pub fn pop_loop(&self) {
        self.loop_stack.borrow_mut().pop();
    }

    pub fn current_loop(&self) -> Option<LoopContext<'ctx>> {
        self.loop_stack.borrow().last().copied()
    }

    // === LLVM type mapping ===

    /// The LLVM representation of a semantic type. Resource values are
    /// pointers to their heap struct; unit is the empty struct.
    pub fn llvm_type(&self, ty: &Type) -> CgResult<BasicTypeEnum<'ctx>> {
        if let Some(cached) = self.llvm_types.borrow().get(&ty.name()) {
            return Ok(*cached);
        }

        let mapped: BasicTypeEnum<'ctx> = match ty {
            Type::Int(int) => self.ir.int_type(int.width).into(),
            Type::Float(float) if float.width == 32 => self.ir.f32_type().into(),
            Type::Float(_) => self.ir.f64_type().into(),
            Type::Bool => self.ir.bool_type().into(),
            Type::Char => self.ir.char_type().into(),
            Type::Unit => self.ir.unit_type().into(),
            Type::Null | Type::Resource(_) => self.ir.ptr_type().into(),
            Type::IntLiteral | Type::FloatLiteral | Type::Generic(_) => {
                return Err(CompileError::internal(format!(
                    "type '{ty}' has no LLVM representation"
                )))
            }
        };

        self.llvm_types.borrow_mut().insert(ty.name(), mapped);
        Ok(mapped)
    }

    /// The named heap struct behind a resource. Created opaque by the
    /// first registration pass; vector instances get their canonical
    /// `{ T* elements, usize size, usize capacity }` body on first use.
    pub fn resource_struct_type(&self, resource: &ResourceType) -> StructType<'ctx> {
        let name = format!("{}_struct", resource.name());
        let struct_type = self.ir.struct_named(&name);

        if resource.is_vector() && struct_type.is_opaque() {
            let size = self.ir.size_type();
            self.ir.struct_set_body(
                struct_type,
                &[self.ir.ptr_type().into(), size.into(), size.into()],
            );
        }

        struct_type
    }

    /// Function type for a Reso-level signature. Unit returns are the
    /// empty struct, never `void`: callers always receive a value.
    pub fn llvm_function_type(
        &self,
        return_type: &Type,
        parameters: &[Type],
    ) -> CgResult<FunctionType<'ctx>> {
        let parameter_types = parameters
            .iter()
            .map(|parameter| self.llvm_type(parameter).map(BasicMetadataTypeEnum::from))
            .collect::<CgResult<Vec<_>>>()?;
        let return_type = self.llvm_type(return_type)?;
        Ok(self
            .ir
            .function_type(Some(return_type), &parameter_types, false))
    }

    /// Deduplicated pointer to a NUL-terminated global string constant.
    pub fn global_string(&self, text: &str) -> CgResult<PointerValue<'ctx>> {
        if let Some(cached) = self.string_literals.borrow().get(text) {
            return Ok(*cached);
        }
        let pointer = self.ir.global_string(text, "str")?;
        self.string_literals
            .borrow_mut()
            .insert(text.to_string(), pointer);
        Ok(pointer)
    }
}

/// Core code-generation trait: a node lowers itself against the shared
/// context and produces its node-specific output.
pub trait CodeGen<'ctx> {
    type Output;

    fn codegen(&self, ctx: &CodegenContext<'ctx>) -> Self::Output;
}
