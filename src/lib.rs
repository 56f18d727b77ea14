//! Semantic analysis and LLVM IR lowering for the Reso programming
//! language.
//!
//! The grammar front end hands this crate parsed [`ast::SourceUnit`]s;
//! [`compiler::compile`] registers signatures across all units, lowers
//! every body, verifies and optionally optimizes the module, and returns
//! the textual IR together with the collected diagnostics.

pub mod ast;
pub mod codegen;
pub mod compiler;
pub mod errors;
pub mod ir;
pub mod symbols;
pub mod types;

pub use compiler::{compile, CompilationResult, CompileOptions};
