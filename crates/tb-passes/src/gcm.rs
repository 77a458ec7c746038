//! Global code motion: folds tb-cfg's structural block discovery into the
//! function's `scheduled[gvn]→bb` side table (§4.F), which the list
//! scheduler (component G) reads via [`tb_ir::Function::scheduled_block`].
//!
//! tb-cfg computes *which* nodes belong to which block (dominance-based
//! membership) without needing to know about the passes layer; this module
//! is the seam named in §4.F that turns that membership into the per-gvn
//! map the rest of the pipeline consults.

use tb_cfg::Cfg;
use tb_ir::Function;

/// Stamp `function.scheduled[gvn] = block.id` for every node CFG discovery
/// placed, per §4.E/§4.F.
pub fn assign_scheduled_blocks(function: &mut Function, cfg: &Cfg) {
    for block in &cfg.blocks {
        for &item in &block.items {
            function.set_scheduled_block(item, block.id);
        }
    }
    tracing::debug!(
        target: "ir.passes",
        blocks = cfg.block_count(),
        nodes = function.node_count(),
        "global_code_motion_assigned"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use tb_cfg::discover_cfg;
    use tb_module::{Arch, Module, SymbolTag, System, TargetDescriptor, TargetFeatures};

    #[test]
    fn every_node_gets_a_scheduled_block() {
        let target = TargetDescriptor::new(Arch::X86_64, System::Windows, TargetFeatures::empty()).unwrap();
        let m = Module::create(target);
        let sym = m.create_symbol(SymbolTag::Function, "f");
        let mut f = Function::new(sym);
        f.set_input(f.stop, 0, Some(f.root)).unwrap();
        let cfg = discover_cfg(&f);
        assign_scheduled_blocks(&mut f, &cfg);
        for i in 0..f.node_count() {
            assert!(f.scheduled_block(tb_ir::NodeId(i)).is_some());
        }
    }
}
