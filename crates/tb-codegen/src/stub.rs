//! A deliberately non-real-encoding [`ICodeGen`] implementation.
//!
//! §1 excludes "the instruction encoder tables for x86-64" from this core's
//! scope — the real `tb__x64_codegen` the original dispatches to (see
//! `tb/src/tb.c`'s `tb__find_code_generator`) lives outside this
//! repository. [`DemoCodeGen`] exists only so [`crate::module_compile_function`]
//! and the `ICodeGen` contract have something concrete to run against in
//! tests and in `tb-cli`'s demo pipeline: it emits one synthetic marker byte
//! per scheduled node (the node's opcode discriminant) rather than real
//! machine code, and a textbook Win64 `push rbp; mov rbp, rsp; sub rsp, N`
//! frame for the prologue/epilogue since that shape is standard ABI
//! knowledge rather than part of the excluded encoder tables.

use crate::contract::{CodegenContext, ICodeGen, PrologueMeta};
use crate::CodegenError;
use tb_emit::Emitter;
use tb_ir::{DataType, DataTypeKind, NodeExtra, Opcode};

#[derive(Debug, Default, Clone, Copy)]
pub struct DemoCodeGen;

/// A stable, arbitrary one-byte tag per opcode — just enough for the
/// round-trip property "one marker byte per scheduled node" to be
/// checkable in tests. Not an encoding; see module docs.
fn opcode_marker(op: Opcode) -> u8 {
    // Discriminant order matches declaration order in `tb_ir::Opcode`.
    op as u8
}

impl ICodeGen for DemoCodeGen {
    fn fast_path(&self, ctx: &mut CodegenContext) -> Result<(), CodegenError> {
        let mut max_locals = 0u32;
        for sched in ctx.scheds {
            for &n in sched {
                let node = ctx.function.node(n);
                if node.opcode == Opcode::Local {
                    if let NodeExtra::Local { size, align } = &node.extra {
                        let aligned = (max_locals + align - 1) & !(align - 1);
                        max_locals = aligned + size;
                    }
                }
                if node.opcode == Opcode::Call {
                    if let Some(target_node) = node.inputs.get(1).copied().flatten() {
                        if let NodeExtra::Symbol { symbol } = &ctx.function.node(target_node).extra {
                            ctx.record_patch(*symbol, true);
                        }
                    }
                }
                ctx.out.out1b(opcode_marker(node.opcode));
            }
        }
        ctx.stack_usage = max_locals;
        Ok(())
    }

    fn emit_prologue(&self, meta: &PrologueMeta, out: &mut Emitter) {
        if meta.stack_usage == 0 {
            return;
        }
        // push rbp; mov rbp, rsp; sub rsp, imm32 (16-byte aligned).
        let aligned = (meta.stack_usage as u64 + 15) & !15;
        out.out1b(0x55); // push rbp
        out.out_bytes(&[0x48, 0x89, 0xE5]); // mov rbp, rsp
        out.out_bytes(&[0x48, 0x81, 0xEC]); // sub rsp, imm32
        out.out4b(aligned as u32);
    }

    fn emit_epilogue(&self, meta: &PrologueMeta, out: &mut Emitter) {
        if meta.stack_usage != 0 {
            out.out_bytes(&[0x48, 0x89, 0xEC]); // mov rsp, rbp
        }
        out.out1b(0x5D); // pop rbp
        out.out1b(0xC3); // ret
    }

    fn data_type_size(&self, dt: DataType) -> u32 {
        match dt.kind {
            DataTypeKind::Int => ((dt.data as u32) + 7) / 8,
            DataTypeKind::Ptr => 8,
            DataTypeKind::Float => (dt.data as u32) / 8,
            DataTypeKind::Tuple | DataTypeKind::Control => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tb_cfg::discover_cfg;
    use tb_ir::{Function, NodeId};
    use tb_module::{Arch, Module, SymbolTag, System, TargetDescriptor, TargetFeatures};
    use tb_passes::assign_scheduled_blocks;
    use tb_scheduler::{schedule_block, DefaultLatencyModel};

    fn test_function() -> (Module, Function) {
        let target = TargetDescriptor::new(Arch::X86_64, System::Windows, TargetFeatures::empty()).unwrap();
        let m = Module::create(target);
        let sym = m.create_symbol(SymbolTag::Function, "f");
        (m, Function::new(sym))
    }

    #[test]
    fn emits_exactly_one_byte_per_scheduled_node_with_no_locals() {
        let (_m, mut f) = test_function();
        f.set_input(f.stop, 0, Some(f.root)).unwrap();
        let cfg = discover_cfg(&f);
        assign_scheduled_blocks(&mut f, &cfg);
        let scheds: Vec<Vec<NodeId>> = cfg
            .blocks
            .iter()
            .map(|b| schedule_block(&f, b, &DefaultLatencyModel).unwrap())
            .collect();
        let total_items: usize = cfg.blocks.iter().map(|b| b.items.len()).sum();

        let codegen = DemoCodeGen;
        let mut ctx = CodegenContext::new(&f, &cfg, &scheds, TargetFeatures::empty());
        codegen.fast_path(&mut ctx).unwrap();
        assert_eq!(ctx.out.len(), total_items);
        assert_eq!(ctx.stack_usage, 0);
    }

    #[test]
    fn zero_stack_usage_emits_empty_prologue_and_epilogue_still_has_ret() {
        let codegen = DemoCodeGen;
        let meta = PrologueMeta::default();
        let mut pro = Emitter::new();
        codegen.emit_prologue(&meta, &mut pro);
        assert!(pro.is_empty());

        let mut epi = Emitter::new();
        codegen.emit_epilogue(&meta, &mut epi);
        assert_eq!(epi.bytes(), &[0x5D, 0xC3]);
    }
}
