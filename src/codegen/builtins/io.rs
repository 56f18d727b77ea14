//! `print` and `println`: thin wrappers around `printf("%s", …)` on the
//! byte pointer dug out of the argument's `String`.

use crate::{
    ast::Visibility,
    codegen::{CgResult, CodegenContext},
    ir::PRINTF,
    symbols::{FunctionBody, FunctionSymbol},
    types::Type,
};

use super::string::{string_bytes_pointer, string_resource};

pub fn register(ctx: &CodegenContext) -> CgResult<()> {
    generate_printer(ctx, "print", "%s")?;
    generate_printer(ctx, "println", "%s\n")?;
    Ok(())
}

fn generate_printer(ctx: &CodegenContext, name: &str, format: &str) -> CgResult<()> {
    let string_type = Type::Resource(string_resource(ctx)?);
    let function_type = ctx.llvm_function_type(&Type::Unit, &[string_type.clone()])?;
    let function = ctx.ir.add_function(name, function_type);

    let entry = ctx.ir.append_block(function, "entry");
    ctx.ir.position_at_end(entry);

    let text = function
        .get_nth_param(0)
        .expect("unary function")
        .into_pointer_value();
    let bytes = string_bytes_pointer(ctx, text)?;
    let format_ptr = ctx.global_string(format)?;

    let printf = ctx.ir.runtime_function(PRINTF)?;
    ctx.ir.call(printf, &[format_ptr.into(), bytes.into()])?;
    ctx.ir.ret(Some(ctx.ir.unit_value()))?;

    let _ = ctx.symbols.borrow_mut().define_function(FunctionSymbol {
        name: name.to_string(),
        return_type: Type::Unit,
        parameters: vec![("text".to_string(), string_type)],
        visibility: Visibility::Global,
        defined_in: None,
        body: FunctionBody::Declared {
            symbol: name.to_string(),
        },
    });

    Ok(())
}
