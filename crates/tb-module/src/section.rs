//! Object sections (§6 File format invariants).

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SectionKind {
    Text,
    Data,
    RData,
    Tls,
}

#[derive(Debug, Clone)]
pub struct Section {
    pub name: String,
    pub kind: SectionKind,
}

impl Section {
    pub(crate) fn new(name: impl Into<String>, kind: SectionKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ModuleSections {
    pub text: Section,
    pub data: Section,
    pub rdata: Section,
    pub tls: Section,
}

impl ModuleSections {
    /// Section names vary by host system the way `tb_module_create` picks
    /// them: `.rdata`/`.tls$` on Windows, `.rodata`/`.tls` elsewhere. This
    /// core only targets Windows (§6), so the Windows names are used
    /// unconditionally.
    pub(crate) fn for_windows() -> Self {
        Self {
            text: Section::new(".text", SectionKind::Text),
            data: Section::new(".data", SectionKind::Data),
            rdata: Section::new(".rdata", SectionKind::RData),
            tls: Section::new(".tls$", SectionKind::Tls),
        }
    }
}
