//! Function bodies: the per-function node arena, edge maintenance, and the
//! `scheduled[gvn]→block` side table (§3 Function, §4.C).

use crate::data_type::{DataType, DataTypeKind};
use crate::node::{Node, NodeExtra, NodeId};
use crate::opcode::Opcode;
use crate::IrError;
use tb_module::SymbolId;

/// A function body, owned by the compiling thread from prototype assignment
/// until `module_compile_function` returns (§5). `nodes` is the function's
/// arena: it only grows, and dropping the `Function` drops every node and
/// its extras en masse (§9's ownership note), matching the spirit of a bump
/// arena without needing unsafe raw-pointer bookkeeping for the
/// variable-length `inputs`/`users` vectors each node carries.
pub struct Function {
    pub symbol: SymbolId,
    nodes: Vec<Node>,
    pub root: NodeId,
    pub stop: NodeId,
    pub params: Vec<NodeId>,
    /// `scheduled[gvn] = Some(block_index)` once global code motion (§4.F)
    /// has placed the node. Block indices are opaque `usize`s here — tb-cfg
    /// owns the actual `BasicBlock` sequence they index into, so this crate
    /// never needs to depend on tb-cfg.
    scheduled: Vec<Option<usize>>,
}

impl Function {
    /// A fresh function: allocates `START` (root) and `STOP` immediately,
    /// per §3's `root_node (START)` / `stop_node (STOP)` fields.
    pub fn new(symbol: SymbolId) -> Self {
        let mut f = Self {
            symbol,
            nodes: Vec::new(),
            root: NodeId(0),
            stop: NodeId(0),
            params: Vec::new(),
            scheduled: Vec::new(),
        };
        f.root = f.alloc_node(Opcode::Start, DataType::control(), 0, NodeExtra::None);
        f.stop = f.alloc_node(Opcode::Stop, DataType::control(), 1, NodeExtra::None);
        f
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    /// §4.C `alloc_node`: bumps the node arena, assigns `gvn =
    /// function.node_count++`. `input_count` pre-sizes the input array with
    /// `None` edges to be filled by [`Function::set_input`].
    pub fn alloc_node(&mut self, opcode: Opcode, dt: DataType, input_count: usize, extra: NodeExtra) -> NodeId {
        let gvn = self.nodes.len() as u32;
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            gvn,
            opcode,
            dt,
            inputs: vec![None; input_count],
            users: Vec::new(),
            extra,
        });
        self.scheduled.push(None);
        id
    }

    /// §4.C `set_input`: writes the edge and links `node` into `input`'s
    /// user list; unlinks from the previous occupant first if one existed.
    pub fn set_input(&mut self, node: NodeId, index: usize, input: Option<NodeId>) -> Result<(), IrError> {
        if index >= self.nodes[node.0].inputs.len() {
            return Err(IrError::InvalidEdge {
                node: node.0,
                index,
            });
        }
        if let Some(old) = self.nodes[node.0].inputs[index] {
            self.unlink_user(old, node);
        }
        self.nodes[node.0].inputs[index] = input;
        if let Some(new) = input {
            self.nodes[new.0].users.push(node);
        }
        Ok(())
    }

    fn unlink_user(&mut self, producer: NodeId, user: NodeId) {
        let users = &mut self.nodes[producer.0].users;
        if let Some(pos) = users.iter().position(|&u| u == user) {
            users.swap_remove(pos);
        }
    }

    /// A snapshot of `n`'s current users, safe to iterate while mutating the
    /// graph (§4.C: "iteration must tolerate insertion during traversal only
    /// by snapshotting").
    pub fn users_snapshot(&self, n: NodeId) -> Vec<NodeId> {
        self.nodes[n.0].users.clone()
    }

    pub fn scheduled_block(&self, n: NodeId) -> Option<usize> {
        self.scheduled[n.0]
    }

    pub fn set_scheduled_block(&mut self, n: NodeId, block: usize) {
        self.scheduled[n.0] = Some(block);
    }

    /// §4.C `tb_has_effects`, the opcode-list half plus the two structural
    /// clauses: "any node whose result type is `CONTROL`, or whose output
    /// tuple contains a `CONTROL` projection".
    pub fn has_effects(&self, n: NodeId) -> bool {
        let node = &self.nodes[n.0];
        if node.opcode.is_inherently_effectful() {
            return true;
        }
        if node.dt.kind == DataTypeKind::Control {
            return true;
        }
        if node.dt.kind == DataTypeKind::Tuple {
            return node.users.iter().any(|&u| self.nodes[u.0].dt.kind == DataTypeKind::Control);
        }
        false
    }

    /// Peephole rewrite support (§4.F, §8 scenario 1 "Constant fold"): turn
    /// `node` itself into an `INTEGER_CONST`, detaching every existing input
    /// (which unlinks `node` from their user lists, per §4.C's edge-removal
    /// rule) while leaving `node`'s own users — and therefore its `gvn` and
    /// identity — untouched. The detached operands become unreferenced if
    /// `node` was their only user, exactly as §8 scenario 1 describes.
    pub fn rewrite_to_integer_const(&mut self, node: NodeId, dt: DataType, words: Vec<u64>) {
        let input_count = self.nodes[node.0].inputs.len();
        for i in 0..input_count {
            self.set_input(node, i, None).expect("index within original bounds");
        }
        let n = &mut self.nodes[node.0];
        n.opcode = Opcode::IntegerConst;
        n.dt = dt;
        n.inputs.clear();
        n.extra = NodeExtra::IntegerConst { words };
    }

    /// Validates the `PHI` invariant from §8: `input_count == region.input_count
    /// + 1` and input 0 is that region.
    pub fn check_phi_shape(&self, phi: NodeId) -> Result<(), IrError> {
        let node = &self.nodes[phi.0];
        if node.opcode != Opcode::Phi {
            return Ok(());
        }
        let region = node.inputs.first().copied().flatten().ok_or(IrError::InvalidEdge {
            node: phi.0,
            index: 0,
        })?;
        let region_inputs = self.nodes[region.0].input_count();
        if node.input_count() != region_inputs + 1 {
            return Err(IrError::BadType {
                node: phi.0,
                reason: "phi input_count must equal region.input_count + 1".into(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_type::DataType;

    fn test_symbol() -> SymbolId {
        use tb_module::{Arch, Module, System, SymbolTag, TargetDescriptor, TargetFeatures};
        let target = TargetDescriptor::new(Arch::X86_64, System::Windows, TargetFeatures::empty()).unwrap();
        let m = Box::leak(Box::new(Module::create(target)));
        m.create_symbol(SymbolTag::Function, "f")
    }

    #[test]
    fn new_function_has_start_and_stop() {
        let f = Function::new(test_symbol());
        assert_eq!(f.node_count(), 2);
        assert_eq!(f.node(f.root).opcode, Opcode::Start);
        assert_eq!(f.node(f.stop).opcode, Opcode::Stop);
    }

    #[test]
    fn set_input_links_user_and_unlink_on_replace() {
        let mut f = Function::new(test_symbol());
        let a = f.alloc_node(Opcode::IntegerConst, DataType::int(32), 0, NodeExtra::IntegerConst { words: vec![1] });
        let b = f.alloc_node(Opcode::IntegerConst, DataType::int(32), 0, NodeExtra::IntegerConst { words: vec![2] });
        let add = f.alloc_node(Opcode::Add, DataType::int(32), 2, NodeExtra::None);
        f.set_input(add, 0, Some(a)).unwrap();
        f.set_input(add, 1, Some(b)).unwrap();
        assert_eq!(f.node(a).users, vec![add]);

        f.set_input(add, 0, Some(b)).unwrap();
        assert!(f.node(a).users.is_empty());
        assert_eq!(f.node(b).users, vec![add, add]);
    }

    #[test]
    fn invalid_edge_index_is_rejected() {
        let mut f = Function::new(test_symbol());
        let add = f.alloc_node(Opcode::Add, DataType::int(32), 2, NodeExtra::None);
        let err = f.set_input(add, 5, None).unwrap_err();
        assert!(matches!(err, IrError::InvalidEdge { .. }));
    }

    #[test]
    fn gvns_are_assigned_once_and_never_reused() {
        let mut f = Function::new(test_symbol());
        let a = f.alloc_node(Opcode::Poison, DataType::void(), 0, NodeExtra::None);
        let b = f.alloc_node(Opcode::Poison, DataType::void(), 0, NodeExtra::None);
        assert_ne!(f.node(a).gvn, f.node(b).gvn);
        let seen: std::collections::HashSet<u32> = (0..f.node_count()).map(|i| f.node(NodeId(i)).gvn).collect();
        assert_eq!(seen.len(), f.node_count());
    }

    #[test]
    fn store_is_effectful_but_plain_add_is_not() {
        let mut f = Function::new(test_symbol());
        let store = f.alloc_node(Opcode::Store, DataType::control(), 0, NodeExtra::None);
        let add = f.alloc_node(Opcode::Add, DataType::int(32), 0, NodeExtra::None);
        assert!(f.has_effects(store));
        assert!(!f.has_effects(add));
    }
}
