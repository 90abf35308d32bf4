use std::collections::HashMap;
use std::future::Future;
use std::path::Path;

use crate::filesystem::FileReader;
use crate::{Context, Error, FileRef, IgnoreQuery, Result};

/// Settings that apply to a file, as found by a [`ConfigResolver`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedConfig {
    pub ignore_patterns: Option<Vec<String>>,
    pub parser: Option<String>,
}

/// Looks up the configuration that applies to a file.
///
/// Errors are reported to the caller of [`Context::get_file_info`] as
/// [`Error::Config`] without further wrapping.
pub trait ConfigResolver: Send + Sync {
    fn resolve(
        &self,
        file: &Path,
    ) -> impl Future<Output = anyhow::Result<Option<ResolvedConfig>>> + Send;
}

/// Resolver for callers without configuration files.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoConfig;

impl ConfigResolver for NoConfig {
    fn resolve(
        &self,
        _file: &Path,
    ) -> impl Future<Output = anyhow::Result<Option<ResolvedConfig>>> + Send {
        async { Ok(None) }
    }
}

/// Resolver returning the same configuration for every file.
#[derive(Debug, Clone, Default)]
pub struct StaticConfig {
    config: ResolvedConfig,
}

impl StaticConfig {
    pub fn new(config: ResolvedConfig) -> Self {
        Self { config }
    }
}

impl ConfigResolver for StaticConfig {
    fn resolve(
        &self,
        _file: &Path,
    ) -> impl Future<Output = anyhow::Result<Option<ResolvedConfig>>> + Send {
        let config = self.config.clone();
        async move { Ok(Some(config)) }
    }
}

pub trait InferParser: Send + Sync {
    fn infer(&self, options: &FileInfoOptions, physical_file: &Path) -> Option<String>;
}

const DEFAULT_EXTENSIONS: &[(&str, &str)] = &[
    ("js", "babel"),
    ("cjs", "babel"),
    ("mjs", "babel"),
    ("jsx", "babel"),
    ("ts", "typescript"),
    ("cts", "typescript"),
    ("mts", "typescript"),
    ("tsx", "typescript"),
    ("json", "json"),
    ("css", "css"),
    ("scss", "scss"),
    ("less", "less"),
    ("md", "markdown"),
    ("markdown", "markdown"),
    ("yaml", "yaml"),
    ("yml", "yaml"),
    ("html", "html"),
    ("htm", "html"),
    ("vue", "vue"),
    ("graphql", "graphql"),
    ("gql", "graphql"),
];

const DEFAULT_FILE_NAMES: &[(&str, &str)] = &[
    ("package.json", "json-stringify"),
    ("package-lock.json", "json-stringify"),
    (".fmtrc", "json"),
];

/// Parser lookup by exact file name, then by extension.
///
/// `FileInfoOptions::parser_overrides` takes precedence over both tables.
#[derive(Debug, Clone)]
pub struct ExtensionTable {
    file_names: HashMap<String, String>,
    extensions: HashMap<String, String>,
}

impl ExtensionTable {
    pub fn empty() -> Self {
        Self {
            file_names: HashMap::new(),
            extensions: HashMap::new(),
        }
    }

    pub fn with_extension<S: Into<String>, T: Into<String>>(mut self, extension: S, parser: T) -> Self {
        self.extensions.insert(extension.into(), parser.into());
        self
    }

    pub fn with_file_name<S: Into<String>, T: Into<String>>(mut self, file_name: S, parser: T) -> Self {
        self.file_names.insert(file_name.into(), parser.into());
        self
    }
}

impl Default for ExtensionTable {
    fn default() -> Self {
        let table = DEFAULT_EXTENSIONS
            .iter()
            .fold(Self::empty(), |table, (extension, parser)| {
                table.with_extension(*extension, *parser)
            });
        DEFAULT_FILE_NAMES
            .iter()
            .fold(table, |table, (file_name, parser)| {
                table.with_file_name(*file_name, *parser)
            })
    }
}

impl InferParser for ExtensionTable {
    fn infer(&self, options: &FileInfoOptions, physical_file: &Path) -> Option<String> {
        let file_name = physical_file.file_name()?.to_str()?;
        let extension = physical_file.extension().and_then(|ext| ext.to_str());

        if let Some(parser) = extension.and_then(|ext| options.parser_overrides.get(ext)) {
            return Some(parser.clone());
        }
        if let Some(parser) = self.file_names.get(file_name) {
            return Some(parser.clone());
        }
        extension
            .and_then(|ext| self.extensions.get(ext))
            .cloned()
    }
}

/// Options of a single [`Context::get_file_info`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInfoOptions {
    /// Rule files. A single file is stored as a one-element list.
    pub ignore_path: Vec<FileRef>,

    /// Explicit patterns. When non-empty, configured patterns are not used.
    pub ignore_patterns: Vec<String>,

    pub with_node_modules: bool,

    /// Consult the [`ConfigResolver`]. Defaults to true.
    pub resolve_config: bool,

    /// Extension to parser mappings checked before the inference table.
    pub parser_overrides: HashMap<String, String>,
}

impl Default for FileInfoOptions {
    fn default() -> Self {
        Self {
            ignore_path: Vec::new(),
            ignore_patterns: Vec::new(),
            with_node_modules: false,
            resolve_config: true,
            parser_overrides: HashMap::new(),
        }
    }
}

impl From<FileRef> for FileInfoOptions {
    fn from(ignore_file: FileRef) -> Self {
        Self::default().ignore_file(ignore_file)
    }
}

impl FileInfoOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ignore_file<T: Into<FileRef>>(mut self, file: T) -> Self {
        self.ignore_path.push(file.into());
        self
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

    pub fn resolve_config(mut self, resolve_config: bool) -> Self {
        self.resolve_config = resolve_config;
        self
    }

    pub fn parser_override<S: Into<String>, T: Into<String>>(mut self, extension: S, parser: T) -> Self {
        self.parser_overrides.insert(extension.into(), parser.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInfo {
    pub ignored: bool,
    pub inferred_parser: Option<String>,
}

/// Explicit patterns win outright; configured patterns are only used when
/// there are no explicit ones. The two are never combined.
pub fn merge_ignore_patterns(explicit: &[String], config: Option<&ResolvedConfig>) -> Vec<String> {
    if !explicit.is_empty() {
        return explicit.to_vec();
    }
    config
        .and_then(|config| config.ignore_patterns.clone())
        .unwrap_or_default()
}

impl<F: FileReader> Context<F> {
    /// Whether `file` is ignored and, when it is not, the parser to process
    /// it with.
    pub async fn get_file_info<C, I>(
        &self,
        file: &FileRef,
        options: &FileInfoOptions,
        resolver: &C,
        inference: &I,
    ) -> Result<FileInfo>
    where
        C: ConfigResolver,
        I: InferParser,
    {
        let path = self.resolve_file(file)?;

        // resolved lazily and at most once
        let mut config: Option<Option<ResolvedConfig>> = None;

        let ignore_patterns = if options.ignore_patterns.is_empty() && options.resolve_config {
            let resolved = resolver.resolve(&path).await.map_err(Error::Config)?;
            let patterns = merge_ignore_patterns(&options.ignore_patterns, resolved.as_ref());
            config = Some(resolved);
            patterns
        } else {
            options.ignore_patterns.clone()
        };

        let query = IgnoreQuery {
            ignore_path: options.ignore_path.clone(),
            ignore_patterns,
            with_node_modules: options.with_node_modules,
        };
        let ignored = self.create_is_ignored(&query).await?.is_ignored_path(&path);
        if ignored {
            log::debug!("{} is ignored", path.display());
            return Ok(FileInfo {
                ignored,
                inferred_parser: None,
            });
        }

        let configured_parser = if options.resolve_config {
            let resolved = match config {
                Some(resolved) => resolved,
                None => resolver.resolve(&path).await.map_err(Error::Config)?,
            };
            resolved.and_then(|config| config.parser)
        } else {
            None
        };

        Ok(FileInfo {
            ignored,
            inferred_parser: configured_parser.or_else(|| inference.infer(options, &path)),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::future::Future;
    use std::path::Path;
    use std::sync::Arc;

    use super::*;

    struct FailingConfig;

    impl ConfigResolver for FailingConfig {
        fn resolve(
            &self,
            _file: &Path,
        ) -> impl Future<Output = anyhow::Result<Option<ResolvedConfig>>> + Send {
            async { Err(anyhow::anyhow!("broken config")) }
        }
    }

    fn config_with_patterns(patterns: &[&str]) -> StaticConfig {
        StaticConfig::new(ResolvedConfig {
            ignore_patterns: Some(patterns.iter().map(|p| p.to_string()).collect()),
            parser: None,
        })
    }

    #[test]
    fn test_merge_ignore_patterns() {
        let config = ResolvedConfig {
            ignore_patterns: Some(vec!["*.cfg.js".to_string()]),
            parser: None,
        };
        let explicit = vec!["*.cli.js".to_string()];

        assert_eq!(
            merge_ignore_patterns(&explicit, Some(&config)),
            vec!["*.cli.js".to_string()]
        );
        assert_eq!(
            merge_ignore_patterns(&[], Some(&config)),
            vec!["*.cfg.js".to_string()]
        );
        assert_eq!(merge_ignore_patterns(&[], None), Vec::<String>::new());
        assert_eq!(
            merge_ignore_patterns(&[], Some(&ResolvedConfig::default())),
            Vec::<String>::new()
        );
    }

    #[test]
    fn test_extension_table() {
        let table = ExtensionTable::default();
        let options = FileInfoOptions::new();

        assert_eq!(table.infer(&options, Path::new("a.js")).as_deref(), Some("babel"));
        assert_eq!(table.infer(&options, Path::new("src/b.tsx")).as_deref(), Some("typescript"));
        assert_eq!(
            table.infer(&options, Path::new("pkg/package.json")).as_deref(),
            Some("json-stringify")
        );
        assert_eq!(table.infer(&options, Path::new("c.json")).as_deref(), Some("json"));
        assert_eq!(table.infer(&options, Path::new("Makefile")), None);
        assert_eq!(table.infer(&options, Path::new("d.unknown")), None);

        let options = FileInfoOptions::new().parser_override("js", "flow");
        assert_eq!(table.infer(&options, Path::new("a.js")).as_deref(), Some("flow"));

        let table = ExtensionTable::empty().with_extension("svelte", "svelte");
        assert_eq!(
            table.infer(&FileInfoOptions::new(), Path::new("App.svelte")).as_deref(),
            Some("svelte")
        );
        assert_eq!(table.infer(&FileInfoOptions::new(), Path::new("a.js")), None);
    }

    #[test]
    fn test_single_ignore_file() {
        let options = FileInfoOptions::from(FileRef::from(".fmtignore"));
        assert_eq!(options.ignore_path, vec![FileRef::from(".fmtignore")]);
        assert!(options.resolve_config);
        assert!(!options.with_node_modules);
    }

    #[tokio::test]
    async fn test_explicit_patterns_override_config() {
        let tmp = tempfile::tempdir().unwrap();
        let ctx = Context::with_cwd(tmp.path());
        let config = config_with_patterns(&["*.cfg.js"]);
        let table = ExtensionTable::default();

        let options = FileInfoOptions::new().ignore_patterns(["*.cli.js"]);
        let info = ctx
            .get_file_info(&FileRef::from("x.cfg.js"), &options, &config, &table)
            .await
            .unwrap();
        assert_eq!(
            info,
            FileInfo {
                ignored: false,
                inferred_parser: Some("babel".to_string()),
            }
        );
        let info = ctx
            .get_file_info(&FileRef::from("x.cli.js"), &options, &config, &table)
            .await
            .unwrap();
        assert!(info.ignored);

        // without explicit patterns the configured ones apply
        let options = FileInfoOptions::new();
        let info = ctx
            .get_file_info(&FileRef::from("x.cfg.js"), &options, &config, &table)
            .await
            .unwrap();
        assert!(info.ignored);
        let info = ctx
            .get_file_info(&FileRef::from("x.cli.js"), &options, &config, &table)
            .await
            .unwrap();
        assert!(!info.ignored);

        // nor when configuration is disabled
        let options = FileInfoOptions::new().resolve_config(false);
        let info = ctx
            .get_file_info(&FileRef::from("x.cfg.js"), &options, &config, &table)
            .await
            .unwrap();
        assert!(!info.ignored);
    }

    #[tokio::test]
    async fn test_rule_files_merge_with_config_patterns() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join(".gitignore"), "a.js\n").unwrap();
        fs::write(tmp.path().join(".fmtignore"), "b.js\n").unwrap();

        let ctx = Context::with_cwd(tmp.path());
        let config = config_with_patterns(&["cfg.ignored.js"]);
        let table = ExtensionTable::default();

        struct TestCase {
            name: &'static str,
            options: FileInfoOptions,
            ignored: &'static [&'static str],
            kept: &'static [&'static str],
        }
        let table_cases = [
            TestCase {
                name: "config",
                options: FileInfoOptions::new().ignore_path([".gitignore", ".fmtignore"]),
                ignored: &["a.js", "b.js", "cfg.ignored.js"],
                kept: &["cli.ignored.js", "c.js"],
            },
            TestCase {
                name: "cli",
                options: FileInfoOptions::new()
                    .ignore_path([".gitignore", ".fmtignore"])
                    .ignore_patterns(["cli.ignored.js"]),
                ignored: &["a.js", "b.js", "cli.ignored.js"],
                kept: &["cfg.ignored.js", "c.js"],
            },
            TestCase {
                name: "ignore path",
                options: FileInfoOptions::new().ignore_file(".gitignore"),
                ignored: &["a.js", "cfg.ignored.js"],
                kept: &["b.js", "cli.ignored.js"],
            },
            TestCase {
                name: "ignore path and cli",
                options: FileInfoOptions::new()
                    .ignore_file(".gitignore")
                    .ignore_patterns(["cli.ignored.js"]),
                ignored: &["a.js", "cli.ignored.js"],
                kept: &["b.js", "cfg.ignored.js"],
            },
        ];
        for test in table_cases.iter() {
            for (files, expected) in [(test.ignored, true), (test.kept, false)] {
                for file in files {
                    let info = ctx
                        .get_file_info(&FileRef::from(*file), &test.options, &config, &table)
                        .await
                        .unwrap();
                    assert_eq!(info.ignored, expected, "test case: {} file: {}", test.name, file);
                }
            }
        }
    }

    #[tokio::test]
    async fn test_parser_resolution() {
        let tmp = tempfile::tempdir().unwrap();
        let ctx = Context::with_cwd(tmp.path());
        let table = ExtensionTable::default();
        let config = StaticConfig::new(ResolvedConfig {
            ignore_patterns: None,
            parser: Some("flow".to_string()),
        });
        let file = FileRef::from("src/a.js");

        let info = ctx
            .get_file_info(&file, &FileInfoOptions::new(), &config, &table)
            .await
            .unwrap();
        assert_eq!(info.inferred_parser.as_deref(), Some("flow"));

        let options = FileInfoOptions::new().resolve_config(false);
        let info = ctx.get_file_info(&file, &options, &config, &table).await.unwrap();
        assert_eq!(info.inferred_parser.as_deref(), Some("babel"));

        let info = ctx
            .get_file_info(&FileRef::from("README"), &FileInfoOptions::new(), &NoConfig, &table)
            .await
            .unwrap();
        assert_eq!(info, FileInfo { ignored: false, inferred_parser: None });

        let info = ctx
            .get_file_info(
                &FileRef::from("node_modules/pkg/index.js"),
                &FileInfoOptions::new(),
                &config,
                &table,
            )
            .await
            .unwrap();
        assert_eq!(info, FileInfo { ignored: true, inferred_parser: None });
    }

    #[tokio::test]
    async fn test_config_errors() {
        let tmp = tempfile::tempdir().unwrap();
        let ctx = Context::with_cwd(tmp.path());
        let table = ExtensionTable::default();
        let file = FileRef::from("a.js");

        let err = ctx
            .get_file_info(&file, &FileInfoOptions::new(), &FailingConfig, &table)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert_eq!(err.to_string(), "broken config");

        let options = FileInfoOptions::new().resolve_config(false);
        let info = ctx.get_file_info(&file, &options, &FailingConfig, &table).await.unwrap();
        assert_eq!(info.inferred_parser.as_deref(), Some("babel"));

        // an ignored file never needs its parser, so configuration is not read
        let options = FileInfoOptions::new().ignore_patterns(["a.js"]);
        let info = ctx.get_file_info(&file, &options, &FailingConfig, &table).await.unwrap();
        assert!(info.ignored);
    }

    #[tokio::test]
    async fn test_invalid_argument() {
        let tmp = tempfile::tempdir().unwrap();
        let ctx = Context::with_cwd(tmp.path());
        let url = url::Url::parse("https://example.com/a.js").unwrap();

        let err = ctx
            .get_file_info(
                &FileRef::from(url),
                &FileInfoOptions::new(),
                &FailingConfig,
                &ExtensionTable::default(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_queries() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join(".gitignore"), "*.log\ndist/\n").unwrap();

        let ctx = Arc::new(Context::with_cwd(tmp.path()));
        let options = Arc::new(FileInfoOptions::new().ignore_file(".gitignore"));

        let files = ["a.js", "b.log", "dist/c.js", "d.css", "node_modules/e.js"];
        let handles = (0..8)
            .flat_map(|_| files.iter())
            .map(|file| {
                let ctx = Arc::clone(&ctx);
                let options = Arc::clone(&options);
                let file = FileRef::from(*file);
                tokio::spawn(async move {
                    ctx.get_file_info(&file, &options, &NoConfig, &ExtensionTable::default())
                        .await
                        .map(|info| info.ignored)
                })
            })
            .collect::<Vec<_>>();

        let mut results = Vec::new();
        for handle in handles {
            results.push(handle.await.unwrap().unwrap());
        }
        for chunk in results.chunks(files.len()) {
            assert_eq!(chunk, [false, true, true, false, true]);
        }
        assert_eq!(ctx.load_cache().len(), 1);
    }
}
