//! Demo function builders. Each one hand-assembles a small IR graph (no
//! parser exists in this repository — §1 puts the C front-end out of
//! scope) to exercise a different corner of the pipeline end to end.

use crate::Demo;
use anyhow::Result;
use tb_abi::{function_set_prototype_from_dbg, DebugField, DebugFunction, DebugType};
use tb_ir::{DataType, Function, NodeExtra, Opcode};
use tb_module::{Module, SymbolTag};

/// Builds the selected demo and returns the finished function, ready for
/// the optimize/schedule/codegen pipeline.
pub fn build(module: &Module, demo: Demo) -> Result<Function> {
    match demo {
        Demo::AddConst => build_add_const(module),
        Demo::Branch => build_branch(module),
        Demo::Call => build_call(module),
    }
}

/// `int add_const(int a) { return a + 3; }`-shaped body, minus the actual
/// `return` plumbing (§1 scopes return-value lowering under the excluded
/// parser/front-end; here the sum is just stored to a local so the
/// scheduler and constant-fold pass both have real work to do). Exercises
/// §8 scenario 1: a peephole-foldable `ADD` of two constants sits alongside
/// one that cannot fold (it reads a parameter).
fn build_add_const(module: &Module) -> Result<Function> {
    let sym = module.create_symbol(SymbolTag::Function, "add_const");
    let mut f = Function::new(sym);

    let dbg = DebugFunction {
        params: vec![DebugField {
            name: Some("a".into()),
            ty: DebugType::Int { bits: 32, signed: true },
        }],
        returns: vec![],
        has_varargs: false,
    };
    let (params, _param_count, _proto) = function_set_prototype_from_dbg(&mut f, module, &dbg)?;
    let a_slot = params[0];

    let a = f.alloc_node(Opcode::Load, DataType::int(32), 2, NodeExtra::None);
    f.set_input(a, 0, Some(f.root))?;
    f.set_input(a, 1, Some(a_slot))?;

    let three = f.alloc_node(Opcode::IntegerConst, DataType::int(32), 0, NodeExtra::IntegerConst { words: vec![3] });
    let sum = f.alloc_node(Opcode::Add, DataType::int(32), 2, NodeExtra::None);
    f.set_input(sum, 0, Some(a))?;
    f.set_input(sum, 1, Some(three))?;

    // A second, fully-constant addition that the peephole pass should fold
    // away entirely (§8 scenario 1).
    let one = f.alloc_node(Opcode::IntegerConst, DataType::int(32), 0, NodeExtra::IntegerConst { words: vec![1] });
    let two = f.alloc_node(Opcode::IntegerConst, DataType::int(32), 0, NodeExtra::IntegerConst { words: vec![2] });
    let folded = f.alloc_node(Opcode::Add, DataType::int(32), 2, NodeExtra::None);
    f.set_input(folded, 0, Some(one))?;
    f.set_input(folded, 1, Some(two))?;

    let out_slot = f.alloc_node(Opcode::Local, DataType::ptr(), 0, NodeExtra::Local { size: 4, align: 4 });
    let store = f.alloc_node(Opcode::Store, DataType::control(), 3, NodeExtra::None);
    f.set_input(store, 0, Some(f.root))?;
    f.set_input(store, 1, Some(out_slot))?;
    f.set_input(store, 2, Some(sum))?;

    let store2 = f.alloc_node(Opcode::Store, DataType::control(), 3, NodeExtra::None);
    f.set_input(store2, 0, Some(store))?;
    f.set_input(store2, 1, Some(out_slot))?;
    f.set_input(store2, 2, Some(folded))?;

    f.set_input(f.stop, 0, Some(store2))?;
    Ok(f)
}

/// `if (a < b) { ... } else { ... }`-shaped control flow: a boolean
/// `BRANCH` whose two `PROJ` successors rejoin at a `REGION` before `STOP`
/// (§8 scenario 2 — the diamond the DOT printer labels "is true?"/"is
/// false?").
fn build_branch(module: &Module) -> Result<Function> {
    let sym = module.create_symbol(SymbolTag::Function, "branch_demo");
    let mut f = Function::new(sym);

    let lhs = f.alloc_node(Opcode::IntegerConst, DataType::int(32), 0, NodeExtra::IntegerConst { words: vec![1] });
    let rhs = f.alloc_node(Opcode::IntegerConst, DataType::int(32), 0, NodeExtra::IntegerConst { words: vec![2] });
    let cmp = f.alloc_node(Opcode::CmpSLt, DataType::bool_(), 2, NodeExtra::Compare { operand_type: DataType::int(32) });
    f.set_input(cmp, 0, Some(lhs))?;
    f.set_input(cmp, 1, Some(rhs))?;

    let branch = f.alloc_node(Opcode::Branch, DataType::tuple(), 2, NodeExtra::Branch { succ_count: 2, keys: vec![0] });
    f.set_input(branch, 0, Some(f.root))?;
    f.set_input(branch, 1, Some(cmp))?;

    let proj_true = f.alloc_node(Opcode::Proj, DataType::control(), 1, NodeExtra::Proj { index: 0 });
    f.set_input(proj_true, 0, Some(branch))?;
    let proj_false = f.alloc_node(Opcode::Proj, DataType::control(), 1, NodeExtra::Proj { index: 1 });
    f.set_input(proj_false, 0, Some(branch))?;

    let slot = f.alloc_node(Opcode::Local, DataType::ptr(), 0, NodeExtra::Local { size: 4, align: 4 });

    let then_const = f.alloc_node(Opcode::IntegerConst, DataType::int(32), 0, NodeExtra::IntegerConst { words: vec![10] });
    let then_store = f.alloc_node(Opcode::Store, DataType::control(), 3, NodeExtra::None);
    f.set_input(then_store, 0, Some(proj_true))?;
    f.set_input(then_store, 1, Some(slot))?;
    f.set_input(then_store, 2, Some(then_const))?;

    let else_const = f.alloc_node(Opcode::IntegerConst, DataType::int(32), 0, NodeExtra::IntegerConst { words: vec![20] });
    let else_store = f.alloc_node(Opcode::Store, DataType::control(), 3, NodeExtra::None);
    f.set_input(else_store, 0, Some(proj_false))?;
    f.set_input(else_store, 1, Some(slot))?;
    f.set_input(else_store, 2, Some(else_const))?;

    let join = f.alloc_node(Opcode::Region, DataType::control(), 2, NodeExtra::None);
    f.set_input(join, 0, Some(then_store))?;
    f.set_input(join, 1, Some(else_store))?;

    f.set_input(f.stop, 0, Some(join))?;
    Ok(f)
}

/// A single `CALL` to an external symbol, exercising the `SYMBOL` opcode
/// and the object-writer patch list (§6) `tb-codegen`'s demo generator
/// produces when it sees a `CALL`'s symbol operand.
fn build_call(module: &Module) -> Result<Function> {
    let sym = module.create_symbol(SymbolTag::Function, "call_demo");
    let callee = module.create_symbol(SymbolTag::External, "puts");
    let mut f = Function::new(sym);

    let symbol_node = f.alloc_node(Opcode::Symbol, DataType::ptr(), 0, NodeExtra::Symbol { symbol: callee });
    let call = f.alloc_node(Opcode::Call, DataType::control(), 2, NodeExtra::None);
    f.set_input(call, 0, Some(f.root))?;
    f.set_input(call, 1, Some(symbol_node))?;

    f.set_input(f.stop, 0, Some(call))?;
    Ok(f)
}
