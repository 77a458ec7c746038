//! CFG discovery (§4.E) — derives regions and basic blocks from the
//! control subgraph, then places the remaining pure/data nodes into
//! blocks via a simplified global code motion.
//!
//! Scope note: effect ordering between `STORE`/`CALL`/`LOAD` nodes is
//! modeled here by giving each a `CONTROL`-typed result that chains
//! directly to the next control consumer, the same way `START`/`REGION` do
//! — rather than by a separate memory-edge discipline. `BRANCH` is the only
//! control-chain node with a `TUPLE` result (its successors are reached
//! through its `PROJ` users, per §3's projection rule); `CALL`-as-a-block-end
//! (exception divergence) is out of this core's scope (§1 Non-goals).

use crate::block::{BasicBlock, Cfg};
use std::collections::{BTreeSet, VecDeque};
use tb_ir::{DataTypeKind, Function, NodeId, Opcode};

/// Control-chain successors of `n`: users whose result is itself
/// `CONTROL`-typed (the direct-chaining effectful nodes, `REGION`, `STOP`),
/// plus `BRANCH` users (whose own result is `TUPLE`-typed but which still
/// terminate the current block, with its `PROJ` users as the real next
/// steps — see [`branch_targets`]).
fn control_successors(f: &Function, n: NodeId) -> Vec<NodeId> {
    let mut out: Vec<NodeId> = f
        .users_snapshot(n)
        .into_iter()
        .filter(|&u| f.node(u).dt.kind == DataTypeKind::Control || f.node(u).opcode == Opcode::Branch)
        .collect();
    out.sort_by_key(|n| n.0);
    out
}

/// Projections of a `BRANCH`, ordered by their `index` extra.
fn branch_targets(f: &Function, branch: NodeId) -> Vec<NodeId> {
    let mut projs: Vec<(u32, NodeId)> = f
        .users_snapshot(branch)
        .into_iter()
        .filter(|&u| f.node(u).opcode == Opcode::Proj)
        .map(|u| {
            let index = match &f.node(u).extra {
                tb_ir::NodeExtra::Proj { index } => *index,
                _ => unreachable!("PROJ node without Proj extra"),
            };
            (index, u)
        })
        .collect();
    projs.sort_by_key(|(i, _)| *i);
    projs.into_iter().map(|(_, n)| n).collect()
}

pub fn discover_cfg(f: &Function) -> Cfg {
    let mut cfg = Cfg::default();
    let mut block_start_visited: BTreeSet<NodeId> = BTreeSet::new();
    let mut queue: VecDeque<NodeId> = VecDeque::new();
    queue.push_back(f.root);

    while let Some(start) = queue.pop_front() {
        if block_start_visited.contains(&start) {
            continue;
        }
        block_start_visited.insert(start);

        let id = cfg.blocks.len();
        let mut cur = start;
        let mut items = BTreeSet::new();
        items.insert(cur);

        let end = loop {
            match f.node(cur).opcode {
                Opcode::Branch | Opcode::Stop => break cur,
                _ => {
                    let succs = control_successors(f, cur);
                    match succs.as_slice() {
                        [] => break cur,
                        [single] if f.node(*single).opcode != Opcode::Region => {
                            cur = *single;
                            items.insert(cur);
                        }
                        _ => break cur,
                    }
                }
            }
        };

        if f.node(end).opcode == Opcode::Branch {
            for target in branch_targets(f, end) {
                queue.push_back(target);
            }
        } else {
            for succ in control_successors(f, end) {
                queue.push_back(succ);
            }
        }

        cfg.blocks.push(BasicBlock::new(id, start, end, items));
    }

    place_data_nodes(f, &mut cfg);
    cfg
}

/// Pass 2: place every node not already assigned to a block (pure/data
/// nodes) by repeatedly adopting the block of any already-placed user,
/// iterating to a fixed point. Nodes with no placed user by convergence
/// (e.g. dead code, or constants used only by other not-yet-placed
/// constants) anchor to the entry block: `START`'s direct users
/// (params/constants) are always pinned to entry.
///
/// `PHI` is excluded from this placement, and from `items`, entirely: a
/// phi is not one of "this block's data nodes" in the min-of-users sense
/// used below, it belongs to its *region* (input 0) by definition (§3,
/// §8 "Phi placement"), regardless of where its value is later consumed.
/// `tb-scheduler` seeds phis directly off `users_snapshot(block.start)`
/// at block entry, so they never need a `block_of`/`scheduled_block`
/// entry of their own — see §8's "Schedule completeness" formula, which
/// counts phis separately from `bb.items.count`.
fn place_data_nodes(f: &Function, cfg: &mut Cfg) {
    let n = f.node_count();
    let mut block_of: Vec<Option<usize>> = vec![None; n];
    for b in &cfg.blocks {
        for &item in &b.items {
            block_of[item.0] = Some(b.id);
        }
    }

    let mut changed = true;
    while changed {
        changed = false;
        for i in 0..n {
            if block_of[i].is_some() || f.node(NodeId(i)).opcode == Opcode::Phi {
                continue;
            }
            let node = NodeId(i);
            let placement = f
                .users_snapshot(node)
                .into_iter()
                .filter_map(|u| block_of[u.0])
                .min();
            if let Some(b) = placement {
                block_of[i] = Some(b);
                changed = true;
            }
        }
    }

    for i in 0..n {
        if f.node(NodeId(i)).opcode == Opcode::Phi {
            continue;
        }
        let b = block_of[i].unwrap_or(0);
        cfg.blocks[b].items.insert(NodeId(i));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tb_ir::{DataType, Function, NodeExtra};
    use tb_module::{Arch, Module, SymbolTag, System, TargetDescriptor, TargetFeatures};

    fn test_function() -> (Module, Function) {
        let target = TargetDescriptor::new(Arch::X86_64, System::Windows, TargetFeatures::empty()).unwrap();
        let m = Module::create(target);
        let sym = m.create_symbol(SymbolTag::Function, "f");
        (m, Function::new(sym))
    }

    #[test]
    fn straight_line_function_is_a_single_block() {
        let (_m, mut f) = test_function();
        f.set_input(f.stop, 0, Some(f.root)).unwrap();
        let cfg = discover_cfg(&f);
        assert_eq!(cfg.block_count(), 1);
        assert_eq!(cfg.blocks[0].start, f.root);
        assert_eq!(cfg.blocks[0].end, f.stop);
    }

    #[test]
    fn branch_creates_two_successor_blocks() {
        let (_m, mut f) = test_function();
        let cond = f.alloc_node(Opcode::IntegerConst, DataType::int(1), 0, NodeExtra::IntegerConst { words: vec![1] });
        let branch = f.alloc_node(Opcode::Branch, DataType::tuple(), 2, NodeExtra::Branch { succ_count: 2, keys: vec![0] });
        f.set_input(branch, 0, Some(f.root)).unwrap();
        f.set_input(branch, 1, Some(cond)).unwrap();

        let proj_true = f.alloc_node(Opcode::Proj, DataType::control(), 1, NodeExtra::Proj { index: 0 });
        f.set_input(proj_true, 0, Some(branch)).unwrap();
        let proj_false = f.alloc_node(Opcode::Proj, DataType::control(), 1, NodeExtra::Proj { index: 1 });
        f.set_input(proj_false, 0, Some(branch)).unwrap();

        f.set_input(f.stop, 0, Some(proj_true)).ok();

        let cfg = discover_cfg(&f);
        assert_eq!(cfg.block_count(), 3);
        assert_eq!(cfg.blocks[0].end, branch);
    }
}
