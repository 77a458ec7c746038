//! `function_set_prototype_from_dbg` (§4.D), grounded in
//! `tb/src/abi.c`'s function of the same name.

use crate::classify::{classify_reg, debug_type_align, debug_type_size, debug_type_to_ir, debug_type_to_prototype, AbiError, RegClass};
use crate::debug_type::DebugFunction;
use tb_ir::{DataType, Function, NodeExtra, NodeId, Opcode};
use tb_module::{
    Abi, CallingConv, FunctionPrototype, Module, PrototypeId, PrototypeParam,
};

/// Preconditions enforced here rather than by the type system: `dbg.returns.len()
/// <= 1` (multi-return is declared unsupported — §9's preserved-layout Open
/// Question: the return slot still follows the last parameter in storage,
/// but the public API refuses to be asked for more than one).
pub fn function_set_prototype_from_dbg(
    function: &mut Function,
    module: &Module,
    dbg: &DebugFunction,
) -> Result<(Vec<NodeId>, usize, PrototypeId), AbiError> {
    assert!(dbg.returns.len() <= 1, "C-level ABI cannot lower multiple returns");
    let abi = module.target.abi;

    let return_count = dbg.returns.len();
    let mut return_param = None;
    if let Some(ret_ty) = dbg.returns.first() {
        classify_reg(abi, ret_ty)?;
        return_param = Some(PrototypeParam {
            name: None,
            dt: debug_type_to_prototype(ret_ty),
        });
    }

    let param_count = dbg.params.len();
    let mut proto_params = Vec::with_capacity(param_count + return_count);
    let mut classes = Vec::with_capacity(param_count);
    for field in &dbg.params {
        let rg = classify_reg(abi, &field.ty)?;
        classes.push(rg);
        let dt = if rg == RegClass::Memory {
            tb_module::PrototypeDataType::Ptr
        } else {
            debug_type_to_prototype(&field.ty)
        };
        proto_params.push(PrototypeParam {
            name: field.name.clone(),
            dt,
        });
    }
    if let Some(ret) = return_param {
        proto_params.push(ret);
    }

    let proto = FunctionPrototype {
        call_conv: match abi {
            Abi::Win64 => CallingConv::Win64,
        },
        has_varargs: dbg.has_varargs,
        param_count,
        return_count,
        params: proto_params,
    };
    let proto_id = module.prototypes.alloc(proto);

    let mut params = Vec::with_capacity(param_count);
    for (i, field) in dbg.params.iter().enumerate() {
        let rg = classes[i];
        let scalar_dt = if rg == RegClass::Memory {
            DataType::ptr()
        } else {
            debug_type_to_ir(&field.ty)
        };
        let proj = function.alloc_node(Opcode::Proj, scalar_dt, 1, NodeExtra::Proj { index: i as u32 });
        function.set_input(proj, 0, Some(function.root)).expect("root always has slot 0");

        if rg == RegClass::Memory {
            params.push(proj);
        } else {
            let size = debug_type_size(&field.ty);
            let align = debug_type_align(&field.ty);
            let slot = function.alloc_node(Opcode::Local, DataType::ptr(), 0, NodeExtra::Local { size, align });
            let store = function.alloc_node(Opcode::Store, DataType::control(), 3, NodeExtra::None);
            function.set_input(store, 0, Some(function.root)).unwrap();
            function.set_input(store, 1, Some(slot)).unwrap();
            function.set_input(store, 2, Some(proj)).unwrap();
            params.push(slot);
        }
    }

    function.params = params.clone();
    Ok((params, param_count, proto_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::debug_type::{DebugField, DebugType};
    use tb_module::{Arch, Module, SymbolTag, System, TargetDescriptor, TargetFeatures};

    fn test_module() -> Module {
        let target = TargetDescriptor::new(Arch::X86_64, System::Windows, TargetFeatures::empty()).unwrap();
        Module::create(target)
    }

    #[test]
    fn win64_aggregate_return_gets_pointer_return_slot() {
        let m = test_module();
        let sym = m.create_symbol(SymbolTag::Function, "agg_ret");
        let mut f = Function::new(sym);
        let dbg = DebugFunction {
            params: vec![],
            returns: vec![DebugType::Record { size: 16, align: 8 }],
            has_varargs: false,
        };
        let (_params, param_count, proto_id) = function_set_prototype_from_dbg(&mut f, &m, &dbg).unwrap();
        assert_eq!(param_count, 0);
        let proto = m.prototypes.get(proto_id);
        assert_eq!(proto.return_count, 1);
        assert_eq!(proto.return_param().unwrap().dt, tb_module::PrototypeDataType::Ptr);
    }

    #[test]
    fn scalar_params_get_a_local_slot_and_a_store() {
        let m = test_module();
        let sym = m.create_symbol(SymbolTag::Function, "add_two");
        let mut f = Function::new(sym);
        let dbg = DebugFunction {
            params: vec![
                DebugField { name: Some("a".into()), ty: DebugType::Int { bits: 32, signed: true } },
                DebugField { name: Some("b".into()), ty: DebugType::Int { bits: 32, signed: true } },
            ],
            returns: vec![DebugType::Int { bits: 32, signed: true }],
            has_varargs: false,
        };
        let (params, param_count, _proto_id) = function_set_prototype_from_dbg(&mut f, &m, &dbg).unwrap();
        assert_eq!(param_count, 2);
        assert_eq!(params.len(), 2);
        for p in params {
            assert_eq!(f.node(p).opcode, Opcode::Local);
        }
    }

    #[test]
    fn memory_class_param_is_used_directly_without_a_local_slot() {
        let m = test_module();
        let sym = m.create_symbol(SymbolTag::Function, "takes_big_struct");
        let mut f = Function::new(sym);
        let dbg = DebugFunction {
            params: vec![DebugField {
                name: Some("s".into()),
                ty: DebugType::Record { size: 32, align: 8 },
            }],
            returns: vec![],
            has_varargs: false,
        };
        let (params, _param_count, _proto_id) = function_set_prototype_from_dbg(&mut f, &m, &dbg).unwrap();
        assert_eq!(f.node(params[0]).opcode, Opcode::Proj);
    }
}
