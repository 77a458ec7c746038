//! Per-block list scheduler (§4.G).
//!
//! `tb-cfg`'s global code motion places every node *except* `PHI` into
//! `BasicBlock::items` (a phi belongs to its region, not to the
//! min-of-users block `place_data_nodes` computes for ordinary data
//! nodes). This crate seeds a non-entry block's phis directly, at the
//! very front of its schedule, by reading `PHI` users off
//! `block.start` — so completeness is `sched.len() == block.items.len()
//! + (entry block ? 0 : count(PHI users of block.start))`, per §8's
//! "Schedule completeness" property. See DESIGN.md for the reasoning.

use crate::latency::LatencyModel;
use std::collections::HashSet;
use tb_cfg::BasicBlock;
use tb_ir::{DataTypeKind, Function, NodeExtra, NodeId, Opcode};
use tb_passes::is_node_ready;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("schedule stuck in block {block}: scheduled {scheduled} of {expected} items")]
    ScheduleStuck {
        block: usize,
        scheduled: usize,
        expected: usize,
    },
}

fn proj_index(f: &Function, proj: NodeId) -> u32 {
    match &f.node(proj).extra {
        NodeExtra::Proj { index } => *index,
        _ => unreachable!("PROJ node without Proj extra"),
    }
}

/// A small ready-set with max-latency selection and first-encountered
/// tie-breaking (§4.G step 4). Unlike [`tb_passes::Worklist`] (a FIFO
/// dedup queue), the list scheduler needs priority-ordered removal, so this
/// is a dedicated, block-local structure rather than a reuse of that type.
#[derive(Default)]
struct ReadySet(Vec<NodeId>);

impl ReadySet {
    fn push_if_absent(&mut self, n: NodeId) {
        if !self.0.contains(&n) {
            self.0.push(n);
        }
    }

    fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn take_max_latency(&mut self, latency: impl Fn(NodeId) -> u32) -> Option<NodeId> {
        if self.0.is_empty() {
            return None;
        }
        let mut best_idx = 0;
        let mut best_val = latency(self.0[0]);
        for (i, &n) in self.0.iter().enumerate().skip(1) {
            let v = latency(n);
            if v > best_val {
                best_val = v;
                best_idx = i;
            }
        }
        Some(self.0.remove(best_idx))
    }
}

/// Schedules one block, producing an ordered `sched` covering `block.items`
/// plus any `PHI` users of `block.start` (seeded first, ahead of
/// `block.start`), with `block.end` as the final entry (§4.G contract).
pub fn schedule_block(
    function: &Function,
    block: &BasicBlock,
    latency: &dyn LatencyModel,
) -> Result<Vec<NodeId>, SchedulerError> {
    // §4.G step 1: `done` tracks scheduled nodes for the duration of this
    // block's pass. It is a plain `HashSet` rather than an arena-backed
    // bitmap: membership is tested and inserted at arbitrary `NodeId`
    // values as nodes become ready in no predictable order, which a
    // stack-only push/pop/peek arena (`tb-arena::TempArena`) cannot host.
    let mut done: HashSet<NodeId> = HashSet::new();
    let mut sched: Vec<NodeId> = Vec::with_capacity(block.items.len());

    // §8 scenario 5: a non-entry block's `PHI` users of `block.start` are
    // seeded first, ahead of `block.start` itself — they are never part of
    // `block.items` (`place_data_nodes` places a phi with its region, not
    // with its users), so they have to be counted and emitted here rather
    // than flow through the ready-set loop below.
    let phi_seed_count = if block.id == 0 {
        0
    } else {
        let mut phi_users: Vec<NodeId> = function
            .users_snapshot(block.start)
            .into_iter()
            .filter(|&u| function.node(u).opcode == Opcode::Phi)
            .collect();
        phi_users.sort_by_key(|n| n.0);
        let count = phi_users.len();
        for p in phi_users {
            sched.push(p);
            done.insert(p);
        }
        count
    };

    // Step 2: seed `block.start` (START/REGION) itself — always part of
    // `items`, so it is pushed like any other item rather than treated as
    // implicit.
    done.insert(block.start);
    sched.push(block.start);

    if block.id == 0 {
        // "direct users of root done (they are parameters/constants pinned
        // to entry)" — restricted to the actual parameter/constant opcodes
        // among root's users, not the control-chain successor that also
        // reads root as its control input 0 (that successor is a real
        // instruction and must still go through the ready-set loop below).
        // They are emitted up front, same as `block.start` itself, so they
        // still count toward `sched.len() == block.items.len()`.
        let mut pinned: Vec<NodeId> = function
            .users_snapshot(block.start)
            .into_iter()
            .filter(|&u| {
                matches!(
                    function.node(u).opcode,
                    Opcode::Proj | Opcode::IntegerConst | Opcode::Float32Const | Opcode::Float64Const
                ) && function.scheduled_block(u) == Some(block.id)
            })
            .collect();
        pinned.sort_by_key(|n| n.0);
        for p in pinned {
            sched.push(p);
            done.insert(p);
        }
    }

    // Step 3: seed the ready set with everything already unblocked.
    let mut ready = ReadySet::default();
    for &item in &block.items {
        if function.scheduled_block(item) == Some(block.id)
            && !done.contains(&item)
            && is_node_ready(function, block.id, &done, item)
        {
            ready.push_if_absent(item);
        }
    }

    // Step 4-6: dispatch loop.
    while !ready.is_empty() {
        let n = ready
            .take_max_latency(|n| latency.latency(function.node(n).opcode))
            .expect("ready set was non-empty");
        sched.push(n);
        done.insert(n);

        let mut newly_done = vec![n];

        // Step 5: projection stickiness.
        if function.node(n).dt.kind == DataTypeKind::Tuple {
            let mut projs: Vec<NodeId> = function
                .users_snapshot(n)
                .into_iter()
                .filter(|&u| function.node(u).opcode == Opcode::Proj)
                .collect();
            projs.sort_by_key(|&p| proj_index(function, p));
            for p in projs {
                sched.push(p);
                done.insert(p);
                newly_done.push(p);
            }
        }

        // Step 6: re-check readiness of users of everything just finished
        // (the chosen node and any projections glued after it), unless the
        // chosen node is the block terminator.
        if n != block.end {
            for done_node in &newly_done {
                for u in function.users_snapshot(*done_node) {
                    if function.scheduled_block(u) == Some(block.id)
                        && !done.contains(&u)
                        && is_node_ready(function, block.id, &done, u)
                    {
                        ready.push_if_absent(u);
                    }
                }
            }
        }
    }

    let expected = block.items.len() + phi_seed_count;
    if sched.len() != expected {
        return Err(SchedulerError::ScheduleStuck {
            block: block.id,
            scheduled: sched.len(),
            expected,
        });
    }
    Ok(sched)
}
