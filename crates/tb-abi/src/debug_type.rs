//! Debug-typed function signatures (§4.D input to the prototype builder).
//!
//! A much smaller surface than a real C type system — just enough shape to
//! drive `classify_reg`/`debug_type_size` and to describe a function
//! signature for [`crate::prototype::function_set_prototype_from_dbg`].

#[derive(Debug, Clone, PartialEq)]
pub enum DebugType {
    Void,
    Bool,
    Int { bits: u16, signed: bool },
    Pointer,
    Float32,
    Float64,
    /// Struct or union; always passed by its explicit `{size, align}` since
    /// field layout is out of this core's scope.
    Record { size: u32, align: u32 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct DebugField {
    pub name: Option<String>,
    pub ty: DebugType,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DebugFunction {
    pub params: Vec<DebugField>,
    pub returns: Vec<DebugType>,
    pub has_varargs: bool,
}
