//! Function body generation (the second half of the two-pass scheme:
//! declarations first, bodies once every signature exists).
//!
//! Parameters are spilled to stack slots so they assign like any other
//! variable. Fallthrough handling depends on the function: unit
//! functions return the unit struct implicitly, `main` returns `i32 0`,
//! and any other reachable fallthrough is a missing-return error.

use inkwell::values::FunctionValue;

use crate::{
    ast::{Block, FunctionDef, Span},
    codegen::{CgResult, CodeGen, CodegenContext},
    symbols::{FunctionBody, VariableSymbol},
    types::Type,
};

pub fn generate_function_body<'ctx>(
    ctx: &CodegenContext<'ctx>,
    def: &FunctionDef,
) -> CgResult<()> {
    let name = &def.name.name;
    let Some(symbol) = ctx.symbols.borrow().find_function(name) else {
        // Declaration failed; the error is already reported.
        return Ok(());
    };
    let FunctionBody::Declared {
        symbol: llvm_name, ..
    } = symbol.body
    else {
        return Ok(());
    };
    let Some(function) = ctx.ir.get_function(&llvm_name) else {
        return Ok(());
    };
    if function.count_basic_blocks() > 0 {
        // A duplicate definition; the redefinition diagnostic already
        // fired and the body belongs to the first definition.
        return Ok(());
    }

    let bindings: Vec<(String, Type)> = symbol.parameters.clone();
    emit_body(
        ctx,
        function,
        name,
        &symbol.return_type,
        &bindings,
        &def.body,
        def.span,
        name == "main",
    )
}

/// Shared prologue/body/epilogue emission for functions and methods.
#[allow(clippy::too_many_arguments)]
pub(crate) fn emit_body<'ctx>(
    ctx: &CodegenContext<'ctx>,
    function: FunctionValue<'ctx>,
    display_name: &str,
    return_type: &Type,
    bindings: &[(String, Type)],
    body: &Block,
    span: Span,
    is_main: bool,
) -> CgResult<()> {
    ctx.symbols
        .borrow_mut()
        .enter_function_scope(return_type.clone());

    let entry = ctx.ir.append_block(function, "entry");
    ctx.ir.position_at_end(entry);

    // The collector must be running before any allocation in the program.
    if is_main {
        ctx.ir.gc_init()?;
    }

    for (index, (name, ty)) in bindings.iter().enumerate() {
        let parameter = function
            .get_nth_param(index as u32)
            .expect("declared arity matches the binding list");
        let storage = ctx.ir.alloca(ctx.llvm_type(ty)?, name)?;
        ctx.ir.store(storage, parameter)?;
        ctx.symbols.borrow_mut().define_variable(VariableSymbol {
            name: name.clone(),
            ty: ty.clone(),
            storage,
            is_const: false,
            is_initialized: true,
        });
    }

    let falls_through = body.codegen(ctx);

    if falls_through && !ctx.ir.block_terminated()? {
        if is_main {
            // A fall-through main silently exits with 0.
            let zero = ctx.ir.const_int(ctx.ir.int_type(32), 0, true);
            ctx.ir.ret(Some(zero.into()))?;
        } else if *return_type == Type::Unit {
            ctx.ir.ret(Some(ctx.ir.unit_value()))?;
        } else {
            ctx.report(ctx.error(
                span,
                format!("Function '{display_name}' must return a value"),
            ));
            // Close the block anyway so the module stays well-formed.
            ctx.ir.unreachable()?;
        }
    }

    ctx.symbols.borrow_mut().exit_function_scope();
    Ok(())
}
