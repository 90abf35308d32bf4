use std::path::{Path, PathBuf};
use std::sync::Arc;

use dashmap::DashMap;

use crate::matcher::CompiledMatcher;

/// Raw rule-file text keyed by absolute path.
///
/// Entries live as long as the cache. A rule file edited on disk after it was
/// first read keeps returning the old text.
#[derive(Debug, Default)]
pub struct LoadCache {
    entries: DashMap<PathBuf, Arc<str>>,
}

impl LoadCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get<P: AsRef<Path>>(&self, path: P) -> Option<Arc<str>> {
        self.entries
            .get(path.as_ref())
            .map(|entry| Arc::clone(entry.value()))
    }

    pub fn insert<P: Into<PathBuf>>(&self, path: P, contents: Arc<str>) {
        self.entries.insert(path.into(), contents);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MatcherKey {
    base_dir: PathBuf,
    rules: Arc<str>,
}

impl MatcherKey {
    pub fn new<P: Into<PathBuf>>(base_dir: P, rules: Arc<str>) -> Self {
        Self {
            base_dir: base_dir.into(),
            rules,
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn rules(&self) -> &str {
        &self.rules
    }
}

/// Compiled matchers keyed by base directory and rule text. Never evicted.
#[derive(Debug, Default)]
pub struct MatcherCache {
    entries: DashMap<MatcherKey, Arc<CompiledMatcher>>,
}

impl MatcherCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &MatcherKey) -> Option<Arc<CompiledMatcher>> {
        self.entries.get(key).map(|entry| Arc::clone(entry.value()))
    }

    pub fn insert(&self, key: MatcherKey, matcher: Arc<CompiledMatcher>) {
        self.entries.insert(key, matcher);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
