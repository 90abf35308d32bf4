pub mod cache;
pub mod commands;
pub mod error;
pub mod file_info;
pub mod filesystem;
mod filter;
mod matcher;
pub mod path;
pub mod source;

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::cache::{LoadCache, MatcherCache, MatcherKey};
pub use crate::error::*;
pub use crate::file_info::{
    ConfigResolver, ExtensionTable, FileInfo, FileInfoOptions, InferParser, NoConfig,
    ResolvedConfig, StaticConfig,
};
pub use crate::filesystem::{FileReader, FsReader};
pub use crate::filter::{IgnorePredicate, SourceFilter};
pub use crate::matcher::CompiledMatcher;
pub use crate::path::FileRef;
pub use crate::source::{IgnoreQuery, RuleSource, DEFAULT_EXCLUSION};

/// Long-lived state shared by every ignore query: the working directory that
/// unanchored rules and relative paths resolve against, the rule-file reader,
/// and the load and matcher caches.
///
/// `Context` is `Send + Sync`; concurrent queries share it through an `Arc`.
pub struct Context<F = FsReader> {
    cwd: PathBuf,
    reader: F,

    loads: LoadCache,
    matchers: MatcherCache,
}

impl Context {
    pub fn new() -> io::Result<Self> {
        Ok(Self::with_cwd(std::env::current_dir()?))
    }

    pub fn with_cwd<P: Into<PathBuf>>(cwd: P) -> Self {
        Self::with_reader(cwd, FsReader)
    }
}

impl<F: FileReader> Context<F> {
    pub fn with_reader<P: Into<PathBuf>>(cwd: P, reader: F) -> Self {
        Context {
            cwd: cwd.into(),
            reader,
            loads: LoadCache::new(),
            matchers: MatcherCache::new(),
        }
    }

    #[inline]
    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    #[inline]
    pub fn reader(&self) -> &F {
        &self.reader
    }

    #[inline]
    pub fn load_cache(&self) -> &LoadCache {
        &self.loads
    }

    #[inline]
    pub fn matcher_cache(&self) -> &MatcherCache {
        &self.matchers
    }

    /// Absolute, normalized path of `file`.
    pub fn resolve_file(&self, file: &FileRef) -> Result<PathBuf> {
        Ok(path::absolutize(&self.cwd, &file.to_path()?))
    }

    /// Raw text of a rule file, or an empty string when there is no file or
    /// it cannot be read.
    pub async fn load_ignore_patterns(
        &self,
        file: Option<&FileRef>,
        should_cache: bool,
    ) -> Result<Arc<str>> {
        let Some(file) = file.filter(|file| !file.is_empty()) else {
            return Ok(Arc::from(""));
        };
        let path = self.resolve_file(file)?;

        if should_cache {
            if let Some(contents) = self.loads.get(&path) {
                log::trace!("rules cached: {}", path.display());
                return Ok(contents);
            }
        }

        let contents: Arc<str> = Arc::from(self.reader.read(&path).await.unwrap_or_default());
        log::trace!("rules loaded: {} ({} bytes)", path.display(), contents.len());
        self.loads.insert(path, Arc::clone(&contents));
        Ok(contents)
    }

    /// Compiled matcher for `source`, compiled at most once per base
    /// directory and rule text unless `should_cache` is false.
    pub fn matcher(&self, source: &RuleSource, should_cache: bool) -> Result<Arc<CompiledMatcher>> {
        let key = MatcherKey::new(self.base_dir(source), Arc::clone(&source.rules));

        if should_cache {
            if let Some(matcher) = self.matchers.get(&key) {
                return Ok(matcher);
            }
        }

        let matcher = Arc::new(CompiledMatcher::compile(key.base_dir(), key.rules())?);
        log::trace!(
            "compiled {} rules for {}",
            matcher.num_rules(),
            key.base_dir().display()
        );
        self.matchers.insert(key, Arc::clone(&matcher));
        Ok(matcher)
    }

    fn base_dir(&self, source: &RuleSource) -> PathBuf {
        match &source.base_dir {
            Some(base_dir) => path::absolutize(&self.cwd, base_dir),
            None => self.cwd.clone(),
        }
    }
}
