//! Function-prototype & ABI classifier (§4.D). Win64 only; SystemV is a
//! named `NotImplemented` gap (see tb-module's `target` module docs for
//! why rejection happens earlier here than in the original C).

mod classify;
mod debug_type;
mod prototype;

pub use classify::{classify_reg, debug_type_align, debug_type_size, debug_type_to_ir, debug_type_to_prototype, prototype_to_ir, AbiError, RegClass};
pub use debug_type::{DebugField, DebugFunction, DebugType};
pub use prototype::function_set_prototype_from_dbg;
