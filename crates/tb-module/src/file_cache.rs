//! File cache (§3 `FileCache`, supplemented from `lib/file_cache.c`).
//!
//! A locked mapping from canonicalized path to a parsed token stream,
//! guaranteeing at-most-one tokenization per path. The real preprocessor and
//! lexer are out of scope for this core (§1), so [`TokenStream`] here is an
//! opaque placeholder recording only what a cache consumer needs to know
//! happened (byte length and source path) — enough to test the cache's
//! locking and interning contract without a real lexer behind it.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

/// Stand-in for the real preprocessor's tokenized output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenStream {
    pub source_path: String,
    pub byte_len: usize,
}

/// Canonicalize a path the way §3 describes: case-folded and
/// forward-slash-normalized on Windows, `realpath`'d elsewhere. Lexical
/// cleanup (collapsing `.`/`..` components) is applied uniformly first so
/// the contract is testable without the path needing to exist on disk.
pub fn canonicalize_path(path: &str) -> String {
    let lexically_clean = lexically_normalize(path);
    if cfg!(windows) {
        lexically_clean.replace('\\', "/").to_lowercase()
    } else {
        match std::fs::canonicalize(&lexically_clean) {
            Ok(resolved) => resolved.to_string_lossy().into_owned(),
            Err(_) => lexically_clean,
        }
    }
}

fn lexically_normalize(path: &str) -> String {
    let is_absolute = Path::new(path).is_absolute();
    let mut stack: Vec<&str> = Vec::new();
    for component in path.split(['/', '\\']) {
        match component {
            "" | "." => {}
            ".." => {
                if stack.last().map(|c| *c != "..").unwrap_or(false) {
                    stack.pop();
                } else if !is_absolute {
                    stack.push("..");
                }
            }
            other => stack.push(other),
        }
    }
    let joined = stack.join("/");
    if is_absolute {
        format!("/{joined}")
    } else {
        joined
    }
}

#[derive(Debug, Default)]
pub struct FileCache {
    table: Mutex<HashMap<String, TokenStream>>,
}

impl FileCache {
    pub fn new() -> Self {
        Self {
            table: Mutex::new(HashMap::new()),
        }
    }

    /// Record the tokenization of `filepath`. Overwrites any prior entry —
    /// callers are expected to have already consulted [`lookup`] to decide
    /// whether tokenization was necessary at all.
    pub fn put(&self, filepath: &str, tokens: TokenStream) {
        let key = canonicalize_path(filepath);
        self.table.lock().unwrap().insert(key, tokens);
    }

    /// Returns a copy of the cached token stream for `filepath`, if present.
    /// Copying out under the lock (rather than returning a guard) matches
    /// §3's "readers copy the stored struct out under the lock" contract.
    pub fn lookup(&self, filepath: &str) -> Option<TokenStream> {
        let key = canonicalize_path(filepath);
        self.table.lock().unwrap().get(&key).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_miss_then_put_then_hit() {
        let cache = FileCache::new();
        assert!(cache.lookup("a/b.c").is_none());
        cache.put(
            "a/b.c",
            TokenStream {
                source_path: "a/b.c".into(),
                byte_len: 42,
            },
        );
        let hit = cache.lookup("a/b.c").expect("must hit after put");
        assert_eq!(hit.byte_len, 42);
    }

    #[test]
    fn lexical_dot_dot_collapses() {
        assert_eq!(lexically_normalize("a/b/../c.c"), "a/c.c");
        assert_eq!(lexically_normalize("./a/./b.c"), "a/b.c");
    }

    #[test]
    fn equivalent_relative_paths_hit_the_same_entry() {
        let cache = FileCache::new();
        cache.put(
            "dir/./file.c",
            TokenStream {
                source_path: "dir/file.c".into(),
                byte_len: 1,
            },
        );
        assert!(cache.lookup("dir/sub/../file.c").is_some());
    }
}
