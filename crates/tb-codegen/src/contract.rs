//! The `ICodeGen` virtual interface (§4.H): `{fast_path, complex_path,
//! emit_prologue, emit_epilogue, get_data_type_size}`.

use crate::output::SymbolPatch;
use crate::CodegenError;
use tb_cfg::Cfg;
use tb_emit::Emitter;
use tb_ir::{DataType, Function, NodeId};
use tb_module::{SymbolId, TargetFeatures};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IselMode {
    Fast,
    Complex,
}

/// Opaque prologue/epilogue sizing info a code generator computed while
/// selecting the body. The original threads an opaque `uint64_t
/// prologue_epilogue_metadata` plus a separate `stack_usage`; `meta` plays
/// the same "whatever the generator wants to remember" role here, typed as
/// `u64` rather than modeled further since its shape is target-specific and
/// this core names only the structural contract, not a concrete target's
/// frame layout.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrologueMeta {
    pub stack_usage: u32,
    pub meta: u64,
}

/// Everything a code generator needs to lower one function's scheduled
/// nodes into bytes: the graph, the CFG, the per-block order the list
/// scheduler (component G) produced, the target's feature bits, and the
/// output buffer to emit the function body into.
///
/// `scheds[i]` is the schedule for `cfg.blocks[i]` (§4.G's contract: it
/// covers exactly that block's `items`, terminator last).
pub struct CodegenContext<'a> {
    pub function: &'a Function,
    pub cfg: &'a Cfg,
    pub scheds: &'a [Vec<NodeId>],
    pub features: TargetFeatures,
    pub out: Emitter,
    pub patches: Vec<SymbolPatch>,
    pub stack_usage: u32,
}

impl<'a> CodegenContext<'a> {
    pub fn new(function: &'a Function, cfg: &'a Cfg, scheds: &'a [Vec<NodeId>], features: TargetFeatures) -> Self {
        Self {
            function,
            cfg,
            scheds,
            features,
            out: Emitter::new(),
            patches: Vec::new(),
            stack_usage: 0,
        }
    }

    /// Record a relocation site at the buffer's current tail position.
    pub fn record_patch(&mut self, target: SymbolId, is_function: bool) {
        let pos = self.out.len();
        self.patches.push(SymbolPatch {
            source: self.function.symbol,
            target,
            is_function,
            pos,
        });
    }
}

/// §4.H: `{fast_path, complex_path, emit_prologue, emit_epilogue,
/// get_data_type_size}`.
///
/// `complex_path` defaults to unset (`has_complex_path() == false`); a
/// caller asking for [`IselMode::Complex`] on a generator without one is
/// downgraded to [`IselMode::Fast`] with a warning, per §4.H step 3 — the
/// same "null function pointer" check the original performs before ever
/// calling through it.
pub trait ICodeGen {
    fn has_complex_path(&self) -> bool {
        false
    }

    fn fast_path(&self, ctx: &mut CodegenContext) -> Result<(), CodegenError>;

    fn complex_path(&self, _ctx: &mut CodegenContext) -> Result<(), CodegenError> {
        Err(CodegenError::NotImplemented)
    }

    fn emit_prologue(&self, meta: &PrologueMeta, out: &mut Emitter);
    fn emit_epilogue(&self, meta: &PrologueMeta, out: &mut Emitter);

    fn data_type_size(&self, dt: DataType) -> u32;
}
