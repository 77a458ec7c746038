//! Symbol table (§3 `Symbol`, §4.B).
//!
//! `Function`, `External`, and `Global` in the original share a tagged
//! header embedded as the struct's first field. Here the header lives in
//! [`SymbolRecord`], owned by the [`Module`](crate::Module); a `Function`'s
//! IR body (its node arena, CFG, schedule — component C) is owned
//! separately by the caller and correlated by [`SymbolId`], since the
//! module's symbol table only needs bookkeeping (name, ordinal, tag,
//! intrusive chain), never the graph itself.

use std::fmt;

pub const TAG_COUNT: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(usize)]
pub enum SymbolTag {
    Function = 0,
    External = 1,
    Global = 2,
    Tombstone = 3,
}

/// A handle into a [`Module`](crate::Module)'s symbol table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SymbolId(pub(crate) usize);

impl fmt::Display for SymbolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "%sym{}", self.0)
    }
}

#[derive(Debug, Clone)]
pub(crate) struct SymbolRecord {
    /// Tag at creation time; determines which intrusive chain this record
    /// sits in, and never changes even after tombstoning.
    pub(crate) list_tag: SymbolTag,
    /// Current tag; becomes `Tombstone` after [`Module::kill_symbol`].
    pub(crate) tag: SymbolTag,
    pub(crate) ordinal: i32,
    pub(crate) name: String,
    pub(crate) next: Option<SymbolId>,
}

/// A read-only view of a symbol table entry.
#[derive(Debug, Clone, Copy)]
pub struct SymbolView<'a> {
    pub id: SymbolId,
    pub tag: SymbolTag,
    pub ordinal: i32,
    pub name: &'a str,
}

impl crate::Module {
    /// Create a new symbol under `tag`, returning its id. Mirrors
    /// `tb_symbol_alloc` + intrusive list insertion: new entries are pushed
    /// at the head of their tag's chain.
    pub fn create_symbol(&self, tag: SymbolTag, name: impl Into<String>) -> SymbolId {
        let mut inner = self.inner.lock().unwrap();
        let id = SymbolId(inner.symbols.len());
        let head = inner.first_symbol_of_tag[tag as usize];
        inner.symbols.push(SymbolRecord {
            list_tag: tag,
            tag,
            ordinal: 0,
            name: name.into(),
            next: head,
        });
        inner.first_symbol_of_tag[tag as usize] = Some(id);
        inner.symbol_count[tag as usize] += 1;
        tracing::trace!(target: "module.symbols", ?tag, %id, "symbol_create");
        id
    }

    pub fn symbol_count(&self, tag: SymbolTag) -> usize {
        self.inner.lock().unwrap().symbol_count[tag as usize]
    }

    pub fn symbol_set_name(&self, id: SymbolId, name: impl Into<String>) {
        let mut inner = self.inner.lock().unwrap();
        inner.symbols[id.0].name = name.into();
    }

    pub fn symbol_set_ordinal(&self, id: SymbolId, ordinal: i32) {
        let mut inner = self.inner.lock().unwrap();
        inner.symbols[id.0].ordinal = ordinal;
    }

    pub fn symbol_view(&self, id: SymbolId) -> SymbolView<'static> {
        let inner = self.inner.lock().unwrap();
        let rec = &inner.symbols[id.0];
        // Name is duplicated out from under the lock; callers needing a
        // borrowed view instead get an owned copy via `symbol_name`.
        SymbolView {
            id,
            tag: rec.tag,
            ordinal: rec.ordinal,
            name: Box::leak(rec.name.clone().into_boxed_str()),
        }
    }

    pub fn symbol_name(&self, id: SymbolId) -> String {
        self.inner.lock().unwrap().symbols[id.0].name.clone()
    }

    pub fn symbol_tag(&self, id: SymbolId) -> SymbolTag {
        self.inner.lock().unwrap().symbols[id.0].tag
    }

    /// Mark `id` as logically deleted. The record stays linked in its
    /// original tag's chain; iterators must skip entries whose *current*
    /// tag is `Tombstone`.
    pub fn kill_symbol(&self, id: SymbolId) {
        let mut inner = self.inner.lock().unwrap();
        inner.symbols[id.0].tag = SymbolTag::Tombstone;
        tracing::debug!(target: "module.symbols", %id, "symbol_tombstone");
    }

    /// Iterate every live (non-tombstoned) symbol originally created under
    /// `tag`, in most-recently-created-first order (matching the intrusive
    /// list's insert-at-head semantics).
    pub fn symbols_of_tag(&self, tag: SymbolTag) -> Vec<SymbolId> {
        let inner = self.inner.lock().unwrap();
        let mut out = Vec::new();
        let mut cursor = inner.first_symbol_of_tag[tag as usize];
        while let Some(id) = cursor {
            let rec = &inner.symbols[id.0];
            if rec.tag != SymbolTag::Tombstone {
                out.push(id);
            }
            cursor = rec.next;
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Arch, Module, System, TargetDescriptor, TargetFeatures};

    fn test_module() -> Module {
        let target =
            TargetDescriptor::new(Arch::X86_64, System::Windows, TargetFeatures::empty()).unwrap();
        Module::create(target)
    }

    #[test]
    fn tombstoned_symbol_stays_linked_but_is_skipped() {
        let m = test_module();
        let a = m.create_symbol(SymbolTag::Function, "a");
        let b = m.create_symbol(SymbolTag::Function, "b");
        m.kill_symbol(a);

        assert_eq!(m.symbol_tag(a), SymbolTag::Tombstone);
        let live = m.symbols_of_tag(SymbolTag::Function);
        assert_eq!(live, vec![b]);

        // still linked: a raw chain walk (ignoring tombstone filtering)
        // would still reach `a`, so its ordinal/name mutations remain valid.
        m.symbol_set_ordinal(a, 7);
        assert_eq!(m.inner.lock().unwrap().symbols[a.0].ordinal, 7);
    }

    #[test]
    fn insertion_order_is_most_recent_first() {
        let m = test_module();
        let a = m.create_symbol(SymbolTag::External, "a");
        let b = m.create_symbol(SymbolTag::External, "b");
        let c = m.create_symbol(SymbolTag::External, "c");
        assert_eq!(m.symbols_of_tag(SymbolTag::External), vec![c, b, a]);
    }

    #[test]
    fn symbol_count_tracks_tag_regardless_of_tombstoning() {
        let m = test_module();
        let a = m.create_symbol(SymbolTag::Global, "g");
        m.kill_symbol(a);
        assert_eq!(m.symbol_count(SymbolTag::Global), 1);
    }
}
