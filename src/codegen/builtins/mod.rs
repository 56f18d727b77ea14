//! Built-in registration, executed once the primitive types exist and
//! before any user signature is processed: the generic `Vector`, the
//! `String` resource, the primitive `to_string` methods, and the
//! `print`/`println` functions.

pub mod io;
pub mod string;
pub mod to_string;
pub mod vector;

use super::{CgResult, CodegenContext};

pub fn register_builtins(ctx: &CodegenContext) -> CgResult<()> {
    ctx.ir.declare_runtime();
    vector::register(ctx);
    string::register(ctx)?;
    to_string::register(ctx)?;
    io::register(ctx)?;
    Ok(())
}
