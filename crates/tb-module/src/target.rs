//! Target descriptor (§6 External Interfaces).
//!
//! Only `{X86_64, WINDOWS, WIN64}` is a supported combination; anything else
//! is refused with [`ModuleError::UnsupportedTarget`] at module creation.
//! The original C implementation instead accepts a SystemV-targeting
//! module and only fails later, inside the ABI classifier — see
//! DESIGN.md for why this crate rejects it earlier instead.

use crate::ModuleError;
use bitflags::bitflags;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Arch {
    X86_64,
    /// Recognized (so a caller can name it) but not implemented by this core.
    Aarch64,
    Wasm32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum System {
    Windows,
    /// Recognized but not implemented by this core.
    MacOs,
    Linux,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Abi {
    Win64,
}

bitflags! {
    /// Target ISA feature bits. Only the bits named in §6 are modeled.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct TargetFeatures: u32 {
        const SSE  = 0b0001;
        const AVX  = 0b0010;
        const AVX2 = 0b0100;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TargetDescriptor {
    pub arch: Arch,
    pub system: System,
    pub abi: Abi,
    pub features: TargetFeatures,
}

impl TargetDescriptor {
    /// The only supported target in this core: x86-64 Windows, Win64 ABI.
    pub fn new(arch: Arch, system: System, features: TargetFeatures) -> Result<Self, ModuleError> {
        match (arch, system) {
            (Arch::X86_64, System::Windows) => Ok(Self {
                arch,
                system,
                abi: Abi::Win64,
                features,
            }),
            _ => Err(ModuleError::UnsupportedTarget { arch, system }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn win64_x86_64_is_the_only_supported_target() {
        let target = TargetDescriptor::new(Arch::X86_64, System::Windows, TargetFeatures::SSE)
            .expect("x86_64/windows must be supported");
        assert_eq!(target.abi, Abi::Win64);
    }

    #[test]
    fn other_combinations_are_refused() {
        let err = TargetDescriptor::new(Arch::X86_64, System::Linux, TargetFeatures::empty())
            .unwrap_err();
        assert!(matches!(err, ModuleError::UnsupportedTarget { .. }));
    }
}
