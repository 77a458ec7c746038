//! Opcode set (§3 Opcode set) and the effectful-node rule (§4.C `tb_has_effects`).

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    Start,
    Stop,
    Region,
    Proj,
    Phi,
    Branch,
    Call,
    Load,
    Store,
    Local,
    Symbol,
    IntegerConst,
    Float32Const,
    Float64Const,
    Poison,

    Add,
    Sub,
    Mul,
    UDiv,
    SDiv,
    UMod,
    SMod,
    Shl,
    Shr,
    Sar,
    Rol,
    Ror,
    And,
    Or,
    Xor,
    Neg,
    Not,

    FAdd,
    FSub,
    FMul,
    FDiv,

    CmpEq,
    CmpNe,
    CmpULt,
    CmpULe,
    CmpSLt,
    CmpSLe,
    CmpFLt,
    CmpFLe,

    ZeroExt,
    SignExt,
    Trunc,
    Bitcast,
    FloatExt,
    Int2Float,
    UInt2Float,
    Float2Int,
    Float2UInt,
    Ptr2Int,
    Int2Ptr,

    Memset,
    Memcpy,

    ArrayAccess,
    MemberAccess,
    Select,
    VaStart,
    DebugBreak,
    Syscall,
    MulPair,
}

impl Opcode {
    /// Is this one of the eight named compare opcodes? Their extra payload
    /// carries the *operand* type (§4.C: "Comparisons record the operand
    /// type on input 1, not on the compare's own `dt`").
    pub fn is_compare(&self) -> bool {
        matches!(
            self,
            Opcode::CmpEq
                | Opcode::CmpNe
                | Opcode::CmpULt
                | Opcode::CmpULe
                | Opcode::CmpSLt
                | Opcode::CmpSLe
                | Opcode::CmpFLt
                | Opcode::CmpFLe
        )
    }

    /// §4.C: true for `CALL`, `SYSCALL`, `STORE`, `MEMSET`, `MEMCPY`,
    /// `DEBUGBREAK`, `BRANCH`, `STOP`, and any node whose result type is
    /// `CONTROL`. Whether an output tuple *contains* a `CONTROL` projection
    /// is a property of the node's users, not the opcode alone, so that half
    /// of the rule is checked by [`crate::function::Function::has_effects`]
    /// instead of here.
    pub fn is_inherently_effectful(&self) -> bool {
        matches!(
            self,
            Opcode::Call
                | Opcode::Syscall
                | Opcode::Store
                | Opcode::Memset
                | Opcode::Memcpy
                | Opcode::DebugBreak
                | Opcode::Branch
                | Opcode::Stop
        )
    }
}
