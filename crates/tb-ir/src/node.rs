//! Node representation (§3 Node, §9 Design Notes on extras).
//!
//! The original stores per-opcode payload inline after the node header via
//! a macro trick; §9 explicitly asks for a tagged variant instead. This is
//! that tagged variant: [`NodeExtra`] is an enum, one arm per opcode family
//! that needs extra state, carried alongside the node rather than packed
//! into raw bytes.

use crate::data_type::DataType;
use tb_module::SymbolId;

/// An index into a [`crate::function::Function`]'s node storage. Stable for
/// the function's lifetime (nodes are never relocated or freed individually
/// — see §9's "function's arena owns nodes" note).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

#[derive(Debug, Clone, PartialEq)]
pub enum NodeExtra {
    None,
    /// `PROJ` — §3: "Extra = `{index}`".
    Proj { index: u32 },
    /// `BRANCH` — §4.C: `{succ_count, keys}`. `succ_count == 2 && keys ==
    /// [0]` with an integer condition on input 1 is the boolean case;
    /// otherwise successor 0 is "default" and successor `k > 0` matches
    /// `keys[k - 1]`.
    Branch { succ_count: u32, keys: Vec<i64> },
    /// Integer constants: a little-endian word vector, variable length.
    IntegerConst { words: Vec<u64> },
    Float32Const { value: f32 },
    Float64Const { value: f64 },
    /// Compare opcodes record the operand type on input 1 here, since the
    /// node's own `dt` is the boolean/`i8` result type (§4.C).
    Compare { operand_type: DataType },
    /// `LOCAL` — a stack slot of `{size, align}` bytes.
    Local { size: u32, align: u32 },
    /// `MEMBER_ACCESS` / `ARRAY_ACCESS` constant offset/stride payload.
    Offset { value: i64 },
    /// `SYMBOL` — a reference to a module-level function/external/global,
    /// resolved at emission time into the §6 object-writer patch list
    /// (`{source, target, is_function, pos}`).
    Symbol { symbol: SymbolId },
}

#[derive(Debug, Clone)]
pub struct Node {
    pub gvn: u32,
    pub opcode: crate::opcode::Opcode,
    pub dt: DataType,
    pub inputs: Vec<Option<NodeId>>,
    /// Reverse edges. Order is unspecified (§4.C); callers that need a
    /// stable iteration order while mutating must snapshot first via
    /// `users.clone()`.
    pub users: Vec<NodeId>,
    pub extra: NodeExtra,
}

impl Node {
    pub fn input_count(&self) -> usize {
        self.inputs.len()
    }
}
