//! Module & symbol table (§4.B).
//!
//! A [`Module`] is the process-wide registry shared by every compiling
//! thread: functions, externals, globals, the file table, per-thread code
//! regions, and the prototype arena. Structural mutation (symbol insertion,
//! file interning, code region allocation) is serialized by a single
//! internal mutex, matching §5's "bulk-allocated, rarely-contended,
//! serialized by intent" policy; the prototype arena and the compiled
//! function counter use their own finer-grained synchronization since the
//! spec calls them out separately (an atomic bump cursor, an atomic add).

mod code_region;
mod file_cache;
mod file_table;
mod global;
mod prototype;
mod section;
mod symbol;
mod target;

pub use code_region::{CodeRegion, CODE_REGION_BUFFER_SIZE};
pub use file_cache::{canonicalize_path, FileCache, TokenStream};
pub use file_table::FileId;
pub use global::{Global, InitObject};
pub use prototype::{
    CallingConv, FunctionPrototype, PrototypeArena, PrototypeDataType, PrototypeId, PrototypeParam,
    DEFAULT_PROTOTYPE_CAPACITY,
};
pub use section::{ModuleSections, Section, SectionKind};
pub use symbol::{SymbolId, SymbolTag, SymbolView, TAG_COUNT};
pub use target::{Abi, Arch, System, TargetDescriptor, TargetFeatures};

use file_table::FileTable;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use thiserror::Error;

/// Errors surfaced at the module boundary, per §7. Resource exhaustion
/// (`PrototypeArena`/`CodeRegion` overflow) is not among these: §7 calls for
/// it to panic with a message rather than return an error, so
/// `PrototypeArena::alloc`/`CodeRegion::reserve` assert directly.
#[derive(Debug, Error)]
pub enum ModuleError {
    #[error("unsupported target: {arch:?}/{system:?}")]
    UnsupportedTarget { arch: Arch, system: System },
}

pub(crate) struct ModuleInner {
    symbols: Vec<symbol::SymbolRecord>,
    first_symbol_of_tag: [Option<SymbolId>; TAG_COUNT],
    symbol_count: [usize; TAG_COUNT],
    files: FileTable,
    code_regions: Vec<Option<CodeRegion>>,
    jit_region: Option<Vec<u8>>,
}

/// The process-wide module. Intended to be shared across compiling threads
/// behind an `Arc<Module>`; every method takes `&self` and synchronizes
/// internally.
pub struct Module {
    pub target: TargetDescriptor,
    pub sections: ModuleSections,
    pub(crate) inner: Mutex<ModuleInner>,
    pub prototypes: PrototypeArena,
    pub file_cache: FileCache,
    compiled_function_count: AtomicUsize,
    /// Number of threads this module's code regions are pre-sized for (§9
    /// Open Question — see `code_region` module docs for the sizing policy
    /// this resolves into).
    expected_threads: usize,
}

impl Module {
    pub fn create(target: TargetDescriptor) -> Self {
        Self::create_with_expected_threads(target, 1)
    }

    /// `expected_threads` bounds how many per-thread code regions will ever
    /// be allocated; each gets a fixed `CODE_REGION_BUFFER_SIZE /
    /// expected_threads` share up front (see `code_region` module docs).
    pub fn create_with_expected_threads(target: TargetDescriptor, expected_threads: usize) -> Self {
        assert!(expected_threads > 0);
        tracing::info!(target: "module.lifecycle", ?target, expected_threads, "module_create");
        let mut code_regions = Vec::with_capacity(expected_threads);
        code_regions.resize_with(expected_threads, || None);
        Self {
            sections: ModuleSections::for_windows(),
            target,
            inner: Mutex::new(ModuleInner {
                symbols: Vec::new(),
                first_symbol_of_tag: [None; TAG_COUNT],
                symbol_count: [0; TAG_COUNT],
                files: FileTable::new(),
                code_regions,
                jit_region: None,
            }),
            prototypes: PrototypeArena::new(DEFAULT_PROTOTYPE_CAPACITY),
            file_cache: FileCache::new(),
            compiled_function_count: AtomicUsize::new(0),
            expected_threads,
        }
    }

    pub fn compiled_function_count(&self) -> usize {
        self.compiled_function_count.load(Ordering::Relaxed)
    }

    pub fn note_function_compiled(&self) {
        self.compiled_function_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Lazily allocate (or fetch) thread `tid`'s code region. Each region is
    /// sized `CODE_REGION_BUFFER_SIZE / expected_threads`, fixed at module
    /// creation time rather than recomputed from the live thread count (see
    /// `code_region` module docs for why).
    pub fn code_region_for(&self, tid: usize) -> Result<(), ModuleError> {
        let mut inner = self.inner.lock().unwrap();
        if tid >= inner.code_regions.len() {
            inner.code_regions.resize_with(tid + 1, || None);
        }
        if inner.code_regions[tid].is_none() {
            let per_thread = CODE_REGION_BUFFER_SIZE / self.expected_threads.max(1);
            inner.code_regions[tid] = Some(CodeRegion::with_capacity(per_thread));
            tracing::debug!(target: "module.codegen", tid, per_thread, "code_region_allocated");
        }
        Ok(())
    }

    /// Reserve `len` bytes at the tail of thread `tid`'s code region,
    /// allocating the region first if needed. Panics if the region is
    /// exhausted (§7).
    pub fn reserve_code(&self, tid: usize, len: usize) -> Result<usize, ModuleError> {
        self.code_region_for(tid)?;
        let mut inner = self.inner.lock().unwrap();
        Ok(inner.code_regions[tid].as_mut().unwrap().reserve(len))
    }

    pub fn with_code_region<R>(&self, tid: usize, f: impl FnOnce(&mut CodeRegion) -> R) -> R {
        let mut inner = self.inner.lock().unwrap();
        f(inner.code_regions[tid].as_mut().expect("code region must be allocated first"))
    }

    pub fn allocate_jit_region(&self, size: usize) {
        let mut inner = self.inner.lock().unwrap();
        inner.jit_region = Some(vec![0u8; size]);
    }

    pub fn has_jit_region(&self) -> bool {
        self.inner.lock().unwrap().jit_region.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_target() -> TargetDescriptor {
        TargetDescriptor::new(Arch::X86_64, System::Windows, TargetFeatures::SSE).unwrap()
    }

    #[test]
    fn module_create_reserves_sentinel_file_and_windows_sections() {
        let m = Module::create(test_target());
        assert_eq!(m.file_path(FileId(0)), "");
        assert_eq!(m.sections.rdata.name, ".rdata");
        assert_eq!(m.sections.tls.name, ".tls$");
    }

    #[test]
    fn code_regions_are_sized_per_expected_thread_count_not_live_count() {
        let m = Module::create_with_expected_threads(test_target(), 4);
        m.code_region_for(0).unwrap();
        m.code_region_for(1).unwrap();
        m.with_code_region(0, |r| assert_eq!(r.capacity(), CODE_REGION_BUFFER_SIZE / 4));
        m.with_code_region(1, |r| assert_eq!(r.capacity(), CODE_REGION_BUFFER_SIZE / 4));
    }

    #[test]
    fn compiled_function_count_is_atomic() {
        let m = Module::create(test_target());
        m.note_function_compiled();
        m.note_function_compiled();
        assert_eq!(m.compiled_function_count(), 2);
    }
}
