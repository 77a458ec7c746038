//! DOT-format printer (§4.I).
//!
//! PROJ vertices are elided only when they are a `BRANCH`'s control
//! projections, so `PROJ` nodes don't clutter the graph, substituting the
//! boolean/switch label rules in their place. Other projections (e.g. a
//! `CALL`'s return-value extraction) still get
//! their own boxed vertex, colored `lightblue` per §4.I's three-color rule,
//! since eliding every `PROJ` uniformly would make that color rule dead
//! code — see DESIGN.md.

use std::collections::HashSet;
use tb_ir::{DataTypeKind, Function, NodeExtra, NodeId, Opcode};

use crate::format::{format_dt, format_integer_const};

fn is_branch_control_proj(f: &Function, n: NodeId) -> bool {
    if f.node(n).opcode != Opcode::Proj {
        return false;
    }
    match f.node(n).inputs.first().copied().flatten() {
        Some(producer) => f.node(producer).opcode == Opcode::Branch,
        None => false,
    }
}

fn visit(f: &Function, n: NodeId, visited: &mut HashSet<NodeId>, nodes: &mut Vec<NodeId>) {
    if !visited.insert(n) {
        return;
    }
    if !is_branch_control_proj(f, n) {
        nodes.push(n);
    }
    for input in f.node(n).inputs.iter().flatten() {
        visit(f, *input, visited, nodes);
    }
}

fn node_color(f: &Function, n: NodeId) -> &'static str {
    if f.node(n).opcode == Opcode::Proj {
        "lightblue"
    } else if f.has_effects(n) {
        "lightgrey"
    } else {
        "antiquewhite1"
    }
}

fn escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

fn node_label(f: &Function, n: NodeId) -> String {
    let node = f.node(n);
    let mut label = format!("%{} {:?}", node.gvn, node.opcode);
    match &node.extra {
        NodeExtra::IntegerConst { words } => {
            label.push(' ');
            label.push_str(&format_integer_const(words, node.dt.data));
        }
        NodeExtra::Float32Const { value } => label.push_str(&format!(" {value}")),
        NodeExtra::Float64Const { value } => label.push_str(&format!(" {value}")),
        NodeExtra::Compare { operand_type } => {
            // Compares record the operand type on input 1, not their own
            // (boolean) `dt` — §4.C, printed here per the original.
            label.push_str(&format!(" ({})", format_dt(operand_type)));
        }
        _ if node.opcode == Opcode::Store => {
            // STORE prints the value operand's type (input 2), not the
            // pointer's (input 1) — `ir_printer.c`.
            if let Some(value) = node.inputs.get(2).copied().flatten() {
                label.push_str(&format!(" [{}]", format_dt(&f.node(value).dt)));
            }
        }
        _ if node.opcode == Opcode::Stop => {
            // STOP prints the types of every input from index 1 onward,
            // skipping the control input at 0.
            let types: Vec<String> = node
                .inputs
                .iter()
                .skip(1)
                .flatten()
                .map(|&i| format_dt(&f.node(i).dt))
                .collect();
            if !types.is_empty() {
                label.push_str(&format!(" ({})", types.join(", ")));
            }
        }
        _ => {
            label.push_str(&format!(" : {}", format_dt(&node.dt)));
        }
    }
    label
}

/// An edge is control-colored if the node it reads from is itself
/// `CONTROL`-typed, or if the consumer is a `REGION` (all of whose inputs
/// are control predecessors) — §4.I: "Control inputs (input 0, and all
/// inputs of `REGION`) are red."
fn is_control_edge(f: &Function, producer: NodeId, user: NodeId) -> bool {
    f.node(producer).dt.kind == DataTypeKind::Control || f.node(user).opcode == Opcode::Region
}

fn branch_proj_label(f: &Function, proj: NodeId) -> String {
    let index = match &f.node(proj).extra {
        NodeExtra::Proj { index } => *index,
        _ => unreachable!("branch control proj without Proj extra"),
    };
    let producer = f.node(proj).inputs[0].expect("branch control proj always has a producer");
    let (succ_count, keys) = match &f.node(producer).extra {
        NodeExtra::Branch { succ_count, keys } => (*succ_count, keys.clone()),
        _ => unreachable!("producer of a branch control proj must be a BRANCH"),
    };
    if succ_count == 2 && keys == [0] {
        if index == 0 {
            "is true?".to_string()
        } else {
            "is false?".to_string()
        }
    } else if index == 0 {
        "is default?".to_string()
    } else {
        format!("is {}?", keys[index as usize - 1])
    }
}

/// §4.I: `CALL` inputs `>1` and `PHI` inputs `>0` are indexed in labels.
fn edge_index_label(user_opcode: Opcode, index: usize) -> Option<String> {
    match user_opcode {
        Opcode::Call if index > 1 => Some(index.to_string()),
        Opcode::Phi if index > 0 => Some(index.to_string()),
        _ => None,
    }
}

/// Prints `f` as a DOT digraph. Printing twice produces byte-identical
/// output (§8 "Round-trip print"): the vertex/edge emission order is fully
/// determined by ascending `NodeId`, with no iteration over an
/// unordered collection.
pub fn print_function_dot(f: &Function) -> String {
    let mut visited = HashSet::new();
    let mut nodes = Vec::new();
    visit(f, f.stop, &mut visited, &mut nodes);
    nodes.sort_by_key(|n| n.0);

    let mut out = String::new();
    out.push_str("digraph IR {\n");
    out.push_str("  node [shape=box, style=\"rounded,filled\"];\n");
    for &n in &nodes {
        out.push_str(&format!(
            "  n{} [label=\"{}\", fillcolor={}];\n",
            n.0,
            escape(&node_label(f, n)),
            node_color(f, n)
        ));
    }
    for &u in &nodes {
        let input_count = f.node(u).input_count();
        for i in 0..input_count {
            let Some(input_node) = f.node(u).inputs[i] else {
                continue;
            };
            if is_branch_control_proj(f, input_node) {
                let producer = f.node(input_node).inputs[0].unwrap();
                let label = branch_proj_label(f, input_node);
                out.push_str(&format!(
                    "  n{} -> n{} [label=\"{}\", color=red];\n",
                    producer.0, u.0, label
                ));
                continue;
            }
            let color = if is_control_edge(f, input_node, u) { "red" } else { "black" };
            match edge_index_label(f.node(u).opcode, i) {
                Some(label) => out.push_str(&format!(
                    "  n{} -> n{} [label=\"{}\", color={}];\n",
                    input_node.0, u.0, label, color
                )),
                None => out.push_str(&format!("  n{} -> n{} [color={}];\n", input_node.0, u.0, color)),
            }
        }
    }
    out.push_str("}\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use tb_ir::DataType;
    use tb_module::{Arch, Module, SymbolTag, System, TargetDescriptor, TargetFeatures};

    fn test_function() -> Function {
        let target = TargetDescriptor::new(Arch::X86_64, System::Windows, TargetFeatures::empty()).unwrap();
        let m = Module::create(target);
        let sym = m.create_symbol(SymbolTag::Function, "f");
        Function::new(sym)
    }

    #[test]
    fn printing_twice_is_byte_identical() {
        let mut f = test_function();
        let c = f.alloc_node(Opcode::IntegerConst, DataType::int(32), 0, NodeExtra::IntegerConst { words: vec![7] });
        f.set_input(f.stop, 0, Some(c)).ok();
        let a = print_function_dot(&f);
        let b = print_function_dot(&f);
        assert_eq!(a, b);
    }

    /// §8 scenario 2: boolean branch labels successor 0 "is true?" and
    /// successor 1 "is false?".
    #[test]
    fn boolean_branch_projections_are_labeled_true_false() {
        let mut f = test_function();
        let cond = f.alloc_node(Opcode::IntegerConst, DataType::int(1), 0, NodeExtra::IntegerConst { words: vec![1] });
        let branch = f.alloc_node(Opcode::Branch, DataType::tuple(), 2, NodeExtra::Branch { succ_count: 2, keys: vec![0] });
        f.set_input(branch, 0, Some(f.root)).unwrap();
        f.set_input(branch, 1, Some(cond)).unwrap();
        let proj_true = f.alloc_node(Opcode::Proj, DataType::control(), 1, NodeExtra::Proj { index: 0 });
        f.set_input(proj_true, 0, Some(branch)).unwrap();
        let region = f.alloc_node(Opcode::Region, DataType::control(), 1, NodeExtra::None);
        f.set_input(region, 0, Some(proj_true)).unwrap();
        f.set_input(f.stop, 0, Some(region)).unwrap();

        let dot = print_function_dot(&f);
        assert!(dot.contains("is true?"));
        assert!(!dot.contains(&format!("n{} [label", proj_true.0)), "branch control proj must not get its own vertex");
    }

    #[test]
    fn store_label_uses_the_value_operand_type_not_the_pointer() {
        let mut f = test_function();
        let ptr = f.alloc_node(Opcode::Local, DataType::ptr(), 0, NodeExtra::Local { size: 8, align: 8 });
        let value = f.alloc_node(Opcode::IntegerConst, DataType::int(64), 0, NodeExtra::IntegerConst { words: vec![1] });
        let store = f.alloc_node(Opcode::Store, DataType::control(), 3, NodeExtra::None);
        f.set_input(store, 0, Some(f.root)).unwrap();
        f.set_input(store, 1, Some(ptr)).unwrap();
        f.set_input(store, 2, Some(value)).unwrap();
        f.set_input(f.stop, 0, Some(store)).unwrap();

        let label = node_label(&f, store);
        assert!(label.contains("i64"), "label was: {label}");
    }
}
