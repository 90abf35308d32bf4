use std::path::Path;

use ignore::gitignore::{Gitignore, GitignoreBuilder};

/// Gitignore-style rule set compiled from the text of one rule source.
#[derive(Debug, Clone)]
pub struct CompiledMatcher {
    ignore: Gitignore,
}

impl CompiledMatcher {
    pub fn compile<P: AsRef<Path>>(base_dir: P, rules: &str) -> Result<Self, ignore::Error> {
        let mut builder = GitignoreBuilder::new(base_dir);
        for line in rules.lines() {
            builder.add_line(None, line)?;
        }
        Ok(Self {
            ignore: builder.build()?,
        })
    }

    /// Tests a `/`-separated path relative to the rule source's base
    /// directory. A path is also matched when one of its parent directories
    /// is.
    pub fn matches(&self, relative_path: &str) -> bool {
        self.ignore
            .matched_path_or_any_parents(relative_path, false)
            .is_ignore()
    }

    pub fn num_rules(&self) -> usize {
        self.ignore.len()
    }
}
