//! Code-gen adapter (§4.H): the `ICodeGen` contract and
//! `module_compile_function`, the seam the back-end's instruction encoder
//! tables would sit behind. Real x86-64 encoding is explicitly out of scope
//! for this core (§1) — this crate specifies the *interface* a target's
//! selector/encoder plugs into, plus a deliberately non-real-encoding demo
//! implementation (`stub`) that exercises the contract end-to-end in tests
//! and in `tb-cli`'s demo pipeline.

mod compile;
mod contract;
mod output;
pub mod stub;

pub use compile::module_compile_function;
pub use contract::{CodegenContext, ICodeGen, IselMode, PrologueMeta};
pub use output::{FunctionOutput, SymbolPatch};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CodegenError {
    #[error("code generator reported an unsupported selection for this node")]
    NotImplemented,
    /// `tb_module::ModuleError::UnsupportedTarget` surfaced through this
    /// crate's calls into the module. Code region exhaustion is not
    /// wrapped here: `CodeRegion::reserve` panics on overflow per §7.
    #[error(transparent)]
    ModuleError(#[from] tb_module::ModuleError),
}
