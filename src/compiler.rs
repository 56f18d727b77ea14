//! # Compilation Driver
//!
//! Orchestrates a whole compilation: built-in registration, the two
//! signature passes, function declarations, per-unit code generation
//! under the right file context, module verification, optimization and
//! emission. All units are compiled into a single module.
//!
//! The driver never panics for user errors: lowering reports into the
//! shared [`ErrorReporter`] and the result's success flag is true iff no
//! error or fatal diagnostic was seen. Fatal diagnostics short-circuit
//! the remaining phases. The heavyweight LLVM objects (context, module,
//! builder, target machine) are owned here and dropped in reverse
//! construction order on every exit path.

use std::path::PathBuf;

use inkwell::context::Context;
use log::debug;

use crate::{
    ast::{Item, SourceUnit},
    codegen::{builtins, signatures, statements, CodegenContext},
    errors::CompileError,
    ir::{host_target_machine, Ir, PassOptions},
};

#[derive(Debug, Clone)]
pub struct CompileOptions {
    /// Name stamped on the emitted module; fixed so identical inputs
    /// yield byte-identical IR.
    pub module_name: String,
    /// Optimization level 0–3; `None` skips the pass pipeline entirely.
    pub optimization: Option<u8>,
    /// Where to write the textual IR, parent directories created as
    /// needed. The IR text is returned either way.
    pub output: Option<PathBuf>,
}

impl Default for CompileOptions {
    fn default() -> Self {
        CompileOptions {
            module_name: "reso_module".to_string(),
            optimization: None,
            output: None,
        }
    }
}

#[derive(Debug)]
pub struct CompilationResult {
    pub success: bool,
    /// The textual IR; present only when compilation succeeded.
    pub ir: Option<String>,
    pub diagnostics: Vec<CompileError>,
}

impl CompilationResult {
    fn failed(diagnostics: Vec<CompileError>) -> Self {
        CompilationResult {
            success: false,
            ir: None,
            diagnostics,
        }
    }
}

/// Compiles a set of parsed units into one LLVM module.
pub fn compile(units: &[SourceUnit], options: &CompileOptions) -> CompilationResult {
    let machine = match host_target_machine() {
        Ok(machine) => machine,
        Err(error) => {
            return CompilationResult::failed(vec![CompileError::internal(
                "failed to construct the host target machine",
            )
            .with_cause(error)]);
        }
    };

    let context = Context::create();
    let ir = Ir::new(&context, &options.module_name, Some(&machine));
    let ctx = CodegenContext::new(ir);

    debug!("registering built-ins");
    if let Err(error) = builtins::register_builtins(&ctx) {
        ctx.report(error);
        return CompilationResult::failed(ctx.reporter.borrow().diagnostics());
    }

    debug!("pass A: resource type declarations");
    signatures::register_resource_types(&ctx, units);

    debug!("pass B: resource bodies and methods");
    if let Err(error) = signatures::register_resource_bodies(&ctx, units) {
        ctx.report(error);
    }

    debug!("declaring functions");
    if let Err(error) = signatures::declare_functions(&ctx, units) {
        ctx.report(error);
    }

    if ctx.symbols.borrow().find_function("main").is_none() {
        ctx.report(CompileError::error(
            crate::errors::COMPILATION_UNIT,
            crate::ast::Span::default(),
            "No main function defined",
        ));
    }

    if ctx.reporter.borrow().saw_fatal() {
        return CompilationResult::failed(ctx.reporter.borrow().diagnostics());
    }

    for unit in units {
        debug!("generating code for {}", unit.name);
        ctx.set_unit(&unit.name);
        ctx.symbols.borrow_mut().enter_file_context(&unit.name);

        for item in &unit.items {
            let generated = match item {
                Item::Function(def) => statements::generate_function_body(&ctx, def),
                Item::Resource(def) => statements::generate_resource_bodies(&ctx, def),
            };
            if let Err(error) = generated {
                ctx.report(error);
            }
        }

        ctx.symbols.borrow_mut().exit_file_context();
        if ctx.reporter.borrow().saw_fatal() {
            return CompilationResult::failed(ctx.reporter.borrow().diagnostics());
        }
    }

    if !ctx.reporter.borrow().is_clean() {
        return CompilationResult::failed(ctx.reporter.borrow().diagnostics());
    }

    debug!("verifying module");
    if let Err(error) = ctx.ir.verify() {
        ctx.report(CompileError::internal("module verification failed").with_cause(error));
        return CompilationResult::failed(ctx.reporter.borrow().diagnostics());
    }

    if let Some(level) = options.optimization {
        debug!("optimizing at O{level}");
        let pass_options = PassOptions::for_level(level);
        if let Err(error) = ctx.ir.optimize(level, pass_options, &machine) {
            ctx.report(CompileError::internal("optimization pipeline failed").with_cause(error));
            return CompilationResult::failed(ctx.reporter.borrow().diagnostics());
        }
    }

    let ir_text = ctx.ir.emit_ir();

    if let Some(path) = &options.output {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                if let Err(error) = std::fs::create_dir_all(parent) {
                    ctx.report(
                        CompileError::internal(format!(
                            "cannot create output directory {}",
                            parent.display()
                        ))
                        .with_cause(error),
                    );
                    return CompilationResult::failed(ctx.reporter.borrow().diagnostics());
                }
            }
        }
        if let Err(error) = ctx.ir.write_ir_file(path) {
            ctx.report(
                CompileError::internal(format!("cannot write output file {}", path.display()))
                    .with_cause(error),
            );
            return CompilationResult::failed(ctx.reporter.borrow().diagnostics());
        }
    }

    let reporter = ctx.reporter.borrow();
    CompilationResult {
        success: reporter.is_clean(),
        ir: Some(ir_text),
        diagnostics: reporter.diagnostics(),
    }
}
