//! Host target machine construction and the optimization pipeline.
//!
//! Optimization uses LLVM's new pass manager through string pipelines
//! (`default<O0>` … `default<O3>`) plus the handful of pass-builder knobs
//! the driver exposes.

use inkwell::{
    passes::PassBuilderOptions,
    targets::{CodeModel, InitializationConfig, RelocMode, Target, TargetMachine},
    OptimizationLevel,
};

use super::{Ir, IrError, IrResult};

/// The tunable knobs of the default pipeline.
#[derive(Debug, Clone, Copy)]
pub struct PassOptions {
    pub loop_vectorize: bool,
    pub slp_vectorize: bool,
    pub loop_unroll: bool,
    pub loop_interleave: bool,
    pub verify_each: bool,
    pub debug_log: bool,
}

impl PassOptions {
    /// Defaults matching what the given level would enable on its own.
    pub fn for_level(level: u8) -> Self {
        let vectorize = level >= 2;
        PassOptions {
            loop_vectorize: vectorize,
            slp_vectorize: vectorize,
            loop_unroll: level >= 1,
            loop_interleave: vectorize,
            verify_each: false,
            debug_log: false,
        }
    }
}

/// Builds a target machine for the host, used for the module data layout
/// and the optimization pipeline.
pub fn host_target_machine() -> IrResult<TargetMachine> {
    Target::initialize_native(&InitializationConfig::default()).map_err(IrError::Target)?;

    let triple = TargetMachine::get_default_triple();
    let target = Target::from_triple(&triple).map_err(|error| IrError::Target(error.to_string()))?;

    target
        .create_target_machine(
            &triple,
            TargetMachine::get_host_cpu_name().to_str().unwrap_or(""),
            TargetMachine::get_host_cpu_features().to_str().unwrap_or(""),
            OptimizationLevel::Default,
            RelocMode::Default,
            CodeModel::Default,
        )
        .ok_or_else(|| {
            IrError::Target(format!(
                "no target machine for triple {}",
                triple.as_str().to_string_lossy()
            ))
        })
}

impl Ir<'_> {
    /// Runs the default pipeline for `level` (0–3) with the given knobs.
    pub fn optimize(
        &self,
        level: u8,
        options: PassOptions,
        machine: &TargetMachine,
    ) -> IrResult<()> {
        let level = level.min(3);
        let pipeline = format!("default<O{level}>");

        let builder_options = PassBuilderOptions::create();
        builder_options.set_loop_vectorization(options.loop_vectorize);
        builder_options.set_loop_slp_vectorization(options.slp_vectorize);
        builder_options.set_loop_unrolling(options.loop_unroll);
        builder_options.set_loop_interleaving(options.loop_interleave);
        builder_options.set_verify_each(options.verify_each);
        builder_options.set_debug_logging(options.debug_log);

        self.module()
            .run_passes(&pipeline, machine, builder_options)
            .map_err(|error| IrError::Target(error.to_string()))
    }
}
