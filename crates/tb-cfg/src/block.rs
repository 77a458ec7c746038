//! `BasicBlock` / `CFG` (§3 BasicBlock, §3 CFG).

use std::collections::BTreeSet;
use tb_ir::NodeId;

#[derive(Debug, Clone)]
pub struct BasicBlock {
    pub id: usize,
    pub start: NodeId,
    pub end: NodeId,
    /// Dominance-based membership, ordered by `NodeId` for deterministic
    /// iteration (item order within the set carries no meaning; the list
    /// scheduler imposes the real order).
    pub items: BTreeSet<NodeId>,
}

impl BasicBlock {
    pub fn new(id: usize, start: NodeId, end: NodeId, items: BTreeSet<NodeId>) -> Self {
        Self {
            id,
            start,
            end,
            items,
        }
    }
}

/// `blocks[0]` is always the start block; `block.id` is its index.
#[derive(Debug, Clone, Default)]
pub struct Cfg {
    pub blocks: Vec<BasicBlock>,
}

impl Cfg {
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }
}
