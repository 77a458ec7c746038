//! `is_node_ready` (§4.F): "every input of `n` that is scheduled in the same
//! block must be in `done_set`. Cross-block inputs do not gate readiness
//! (they are live-in values)."

use std::collections::HashSet;
use tb_ir::{Function, NodeId};

pub fn is_node_ready(function: &Function, bb_id: usize, done: &HashSet<NodeId>, n: NodeId) -> bool {
    function.node(n).inputs.iter().flatten().all(|&input| {
        match function.scheduled_block(input) {
            Some(b) if b == bb_id => done.contains(&input),
            _ => true,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tb_ir::{DataType, NodeExtra, Opcode};
    use tb_module::{Arch, Module, SymbolTag, System, TargetDescriptor, TargetFeatures};

    fn test_function() -> Function {
        let target = TargetDescriptor::new(Arch::X86_64, System::Windows, TargetFeatures::empty()).unwrap();
        let m = Module::create(target);
        let sym = m.create_symbol(SymbolTag::Function, "f");
        Function::new(sym)
    }

    #[test]
    fn same_block_input_must_be_done_first() {
        let mut f = test_function();
        let a = f.alloc_node(Opcode::IntegerConst, DataType::int(32), 0, NodeExtra::IntegerConst { words: vec![1] });
        let b = f.alloc_node(Opcode::Add, DataType::int(32), 1, NodeExtra::None);
        f.set_input(b, 0, Some(a)).unwrap();
        f.set_scheduled_block(a, 0);
        f.set_scheduled_block(b, 0);

        let done: HashSet<NodeId> = HashSet::new();
        assert!(!is_node_ready(&f, 0, &done, b));

        let mut done = HashSet::new();
        done.insert(a);
        assert!(is_node_ready(&f, 0, &done, b));
    }

    #[test]
    fn cross_block_input_never_gates_readiness() {
        let mut f = test_function();
        let a = f.alloc_node(Opcode::IntegerConst, DataType::int(32), 0, NodeExtra::IntegerConst { words: vec![1] });
        let b = f.alloc_node(Opcode::Add, DataType::int(32), 1, NodeExtra::None);
        f.set_input(b, 0, Some(a)).unwrap();
        f.set_scheduled_block(a, 0);
        f.set_scheduled_block(b, 1);

        let done: HashSet<NodeId> = HashSet::new();
        assert!(is_node_ready(&f, 1, &done, b), "a is in block 0, b is scheduled in block 1: cross-block input is a live-in");
    }
}
