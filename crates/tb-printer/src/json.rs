//! Optional JSON dump mode. Not part of the distilled printer contract
//! (§4.I only asks for DOT); `tb-cli`'s `--format json` flag is the
//! supplemented feature this module exists for, so it stays scoped to this
//! crate rather than pulling `serde` into `tb-ir` itself.

use serde::Serialize;
use tb_ir::{Function, NodeId};

use crate::format::format_dt;

#[derive(Debug, Serialize)]
pub struct JsonNode {
    pub id: usize,
    pub gvn: u32,
    pub opcode: String,
    pub dt: String,
    pub inputs: Vec<Option<usize>>,
}

#[derive(Debug, Serialize)]
pub struct JsonFunction {
    pub root: usize,
    pub stop: usize,
    pub nodes: Vec<JsonNode>,
}

pub fn function_to_json(f: &Function) -> JsonFunction {
    let nodes = (0..f.node_count())
        .map(|i| {
            let id = NodeId(i);
            let node = f.node(id);
            JsonNode {
                id: i,
                gvn: node.gvn,
                opcode: format!("{:?}", node.opcode),
                dt: format_dt(&node.dt),
                inputs: node.inputs.iter().map(|opt| opt.map(|n| n.0)).collect(),
            }
        })
        .collect();
    JsonFunction {
        root: f.root.0,
        stop: f.stop.0,
        nodes,
    }
}

pub fn print_function_json(f: &Function) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&function_to_json(f))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tb_ir::{DataType, NodeExtra, Opcode};
    use tb_module::{Arch, Module, SymbolTag, System, TargetDescriptor, TargetFeatures};

    #[test]
    fn every_node_appears_exactly_once_in_the_dump() {
        let target = TargetDescriptor::new(Arch::X86_64, System::Windows, TargetFeatures::empty()).unwrap();
        let m = Module::create(target);
        let sym = m.create_symbol(SymbolTag::Function, "f");
        let mut f = Function::new(sym);
        f.alloc_node(Opcode::IntegerConst, DataType::int(32), 0, NodeExtra::IntegerConst { words: vec![1] });

        let dump = function_to_json(&f);
        assert_eq!(dump.nodes.len(), f.node_count());
        assert_eq!(dump.root, f.root.0);
    }
}
