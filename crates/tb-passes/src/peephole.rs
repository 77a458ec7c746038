//! Peephole constant folding (§8 scenario 1: `ADD(INTEGER_CONST 3,
//! INTEGER_CONST 4)` folds to `INTEGER_CONST 7`, and the old constants
//! become unreferenced).
//!
//! A pass is "iterate to fixed point: read item, apply peephole/
//! canonicalization rewrites, push newly exposed users" (§4.F). This is
//! intentionally a small rule set: a worklist driver plus one concrete
//! folding rule, not a full optimizer. More rules slot in by extending
//! [`fold_binary`] the same way.

use crate::worklist::Worklist;
use tb_ir::{Function, NodeExtra, NodeId, Opcode};

/// Single-word constant value of `n`, if `n` is an `INTEGER_CONST` with
/// exactly one word. Multi-word constants are left unfolded (see module
/// docs) rather than silently truncated.
fn single_word_const(f: &Function, n: NodeId) -> Option<u64> {
    let node = f.node(n);
    if node.opcode != Opcode::IntegerConst {
        return None;
    }
    match &node.extra {
        NodeExtra::IntegerConst { words } if words.len() == 1 => Some(words[0]),
        _ => None,
    }
}

fn mask_to_width(value: u64, bits: u16) -> u64 {
    if bits == 0 || bits >= 64 {
        value
    } else {
        value & ((1u64 << bits) - 1)
    }
}

/// Tries to fold `n` into an `INTEGER_CONST`, returning whether a rewrite
/// happened. Only binary integer arithmetic/logical ops over two single-word
/// constant operands are folded.
fn fold_binary(f: &mut Function, n: NodeId) -> bool {
    let node = f.node(n);
    if node.input_count() != 2 {
        return false;
    }
    let opcode = node.opcode;
    let dt = node.dt;
    let (Some(lhs), Some(rhs)) = (node.inputs[0], node.inputs[1]) else {
        return false;
    };
    let (Some(a), Some(b)) = (single_word_const(f, lhs), single_word_const(f, rhs)) else {
        return false;
    };
    let folded = match opcode {
        Opcode::Add => a.wrapping_add(b),
        Opcode::Sub => a.wrapping_sub(b),
        Opcode::Mul => a.wrapping_mul(b),
        Opcode::And => a & b,
        Opcode::Or => a | b,
        Opcode::Xor => a ^ b,
        _ => return false,
    };
    let masked = mask_to_width(folded, dt.data);
    f.rewrite_to_integer_const(n, dt, vec![masked]);
    tracing::trace!(target: "ir.passes", node = n.0, ?opcode, result = masked, "constant_folded");
    true
}

/// Runs the worklist to fixed point over every node currently in `function`,
/// returning the number of successful rewrites. Seeds the worklist with
/// every node up front (a fresh function has no dangling users to chase),
/// then pushes a rewritten node's users since folding may expose further
/// foldable chains.
pub fn run_constant_fold(function: &mut Function) -> usize {
    let mut worklist: Worklist<NodeId> = Worklist::new();
    for i in 0..function.node_count() {
        worklist.push(NodeId(i));
    }

    let mut rewrites = 0;
    while let Some(n) = worklist.pop() {
        if n.0 >= function.node_count() {
            continue;
        }
        if fold_binary(function, n) {
            rewrites += 1;
            worklist.extend(function.users_snapshot(n));
        }
    }
    rewrites
}
