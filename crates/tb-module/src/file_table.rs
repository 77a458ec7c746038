//! Module-owned file table (§4.B `file_create`).
//!
//! `FileId`s are indices into `files`; index 0 is a reserved sentinel (the
//! empty path) so a default-constructed `FileId` never aliases a real file.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FileId(pub(crate) usize);

#[derive(Debug, Default)]
pub(crate) struct FileTable {
    paths: Vec<String>,
}

impl FileTable {
    pub(crate) fn new() -> Self {
        Self {
            paths: vec![String::new()],
        }
    }

    /// Linear search for an existing entry, else intern. Mirrors
    /// `tb_file_create`'s scan-then-append under the module lock.
    pub(crate) fn intern(&mut self, path: &str) -> FileId {
        if let Some(pos) = self.paths.iter().skip(1).position(|p| p == path) {
            return FileId(pos + 1);
        }
        let id = FileId(self.paths.len());
        self.paths.push(path.to_string());
        id
    }

    pub(crate) fn path(&self, id: FileId) -> &str {
        &self.paths[id.0]
    }
}

impl crate::Module {
    pub fn file_create(&self, path: &str) -> FileId {
        let mut inner = self.inner.lock().unwrap();
        inner.files.intern(path)
    }

    pub fn file_path(&self, id: FileId) -> String {
        let inner = self.inner.lock().unwrap();
        inner.files.path(id).to_string()
    }
}
