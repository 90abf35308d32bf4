use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures_util::future::join_all;

use crate::filesystem::FileReader;
use crate::{Context, Error, FileRef, Result};

/// Rule text appended unless files inside dependency directories are
/// explicitly requested.
pub const DEFAULT_EXCLUSION: &str = "node_modules";

/// One origin of exclusion rules.
///
/// Rules are evaluated relative to `base_dir`, or to the context's working
/// directory when it is `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleSource {
    pub base_dir: Option<PathBuf>,
    pub rules: Arc<str>,
}

impl RuleSource {
    pub fn new<S: Into<Arc<str>>>(rules: S) -> Self {
        RuleSource {
            base_dir: None,
            rules: rules.into(),
        }
    }

    pub fn with_base_dir<P: Into<PathBuf>, S: Into<Arc<str>>>(base_dir: P, rules: S) -> Self {
        RuleSource {
            base_dir: Some(base_dir.into()),
            rules: rules.into(),
        }
    }
}

/// Everything that decides whether a file is ignored, apart from the file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IgnoreQuery {
    /// Rule files, always merged. Empty entries are skipped.
    pub ignore_path: Vec<FileRef>,

    /// Explicit patterns, evaluated relative to the working directory.
    pub ignore_patterns: Vec<String>,

    pub with_node_modules: bool,
}

impl IgnoreQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ignore_path<I, T>(mut self, files: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<FileRef>,
    {
        self.ignore_path.extend(files.into_iter().map(Into::into));
        self
    }

    pub fn ignore_patterns<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignore_patterns
            .extend(patterns.into_iter().map(Into::into));
        self
    }

    pub fn with_node_modules(mut self, with_node_modules: bool) -> Self {
        self.with_node_modules = with_node_modules;
        self
    }
}

impl<F: FileReader> Context<F> {
    /// Rule sources in evaluation order: explicit patterns, one source per
    /// rule file in the given order, then the default exclusion.
    pub async fn resolve_rule_sources(
        &self,
        ignore_path: &[FileRef],
        ignore_patterns: &[String],
        with_node_modules: bool,
    ) -> Result<Vec<RuleSource>> {
        let mut sources = Vec::with_capacity(ignore_path.len() + 2);

        // an empty matcher never matches, so this is emitted unconditionally
        sources.push(RuleSource::new(ignore_patterns.join("\n")));

        let rule_files = ignore_path
            .iter()
            .filter(|file| !file.is_empty())
            .map(|file| async move {
                let path = self.resolve_file(file)?;
                let base_dir = path.parent().map_or_else(|| path.clone(), Path::to_path_buf);
                let rules = self.load_ignore_patterns(Some(file), true).await?;
                Ok::<_, Error>(RuleSource::with_base_dir(base_dir, rules))
            });
        for source in join_all(rule_files).await {
            sources.push(source?);
        }

        if !with_node_modules {
            sources.push(RuleSource::new(DEFAULT_EXCLUSION));
        }

        Ok(sources)
    }
}
