use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::filesystem::FileReader;
use crate::matcher::CompiledMatcher;
use crate::path::{absolutize, relative_to, to_slash};
use crate::{Context, FileRef, IgnoreQuery, Result};

/// A compiled rule source bound to the directory its rules are relative to.
#[derive(Debug, Clone)]
pub struct SourceFilter {
    root: PathBuf,
    matcher: Arc<CompiledMatcher>,
}

impl SourceFilter {
    pub fn new<P: Into<PathBuf>>(root: P, matcher: Arc<CompiledMatcher>) -> Self {
        Self {
            root: root.into(),
            matcher,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `path` must be absolute. Paths outside the root are matched with their
    /// leading `..` segments.
    pub fn is_ignored(&self, path: &Path) -> bool {
        let Some(relative) = relative_to(path, &self.root) else {
            log::debug!(
                "{} has no path relative to {}",
                path.display(),
                self.root.display()
            );
            return false;
        };
        self.matcher.matches(&to_slash(&relative))
    }
}

/// Ignore test built once for an [`IgnoreQuery`] and reusable for any number
/// of files.
#[derive(Debug, Clone)]
pub struct IgnorePredicate {
    cwd: PathBuf,
    filters: Vec<SourceFilter>,
}

impl IgnorePredicate {
    pub fn filters(&self) -> &[SourceFilter] {
        &self.filters
    }

    pub fn is_ignored(&self, file: &FileRef) -> Result<bool> {
        let path = absolutize(&self.cwd, &file.to_path()?);
        Ok(self.is_ignored_path(&path))
    }

    pub fn is_ignored_path(&self, path: &Path) -> bool {
        let path = absolutize(&self.cwd, path);
        self.filters.iter().any(|filter| filter.is_ignored(&path))
    }
}

impl<F: FileReader> Context<F> {
    pub async fn create_is_ignored(&self, query: &IgnoreQuery) -> Result<IgnorePredicate> {
        let sources = self
            .resolve_rule_sources(
                &query.ignore_path,
                &query.ignore_patterns,
                query.with_node_modules,
            )
            .await?;

        let mut filters = Vec::with_capacity(sources.len());
        for source in &sources {
            filters.push(SourceFilter::new(
                self.base_dir(source),
                self.matcher(source, true)?,
            ));
        }

        Ok(IgnorePredicate {
            cwd: self.cwd().to_path_buf(),
            filters,
        })
    }

    pub async fn is_ignored(&self, file: &FileRef, query: &IgnoreQuery) -> Result<bool> {
        let path = self.resolve_file(file)?;
        let predicate = self.create_is_ignored(query).await?;
        Ok(predicate.is_ignored_path(&path))
    }
}
