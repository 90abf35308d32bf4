use std::sync::Arc;

use clap::Args;

use crate::{Context, ExtensionTable, FileInfo, FileInfoOptions, FileRef, NoConfig};

/// Rule files read when no `--ignore-path` is given.
pub const DEFAULT_IGNORE_FILES: [&str; 2] = [".gitignore", ".fmtignore"];

#[derive(Args, Debug, Clone)]
pub struct IgnoreArgs {
    /// Pattern of files to ignore. Replaces patterns from configuration
    #[clap(long = "ignore-pattern", value_name = "pattern")]
    ignore_patterns: Vec<String>,

    /// File with patterns of files to ignore, relative to its own directory
    #[clap(long = "ignore-path", value_name = "path", default_values = DEFAULT_IGNORE_FILES)]
    ignore_paths: Vec<FileRef>,

    /// Process files in node_modules directories
    #[clap(long)]
    with_node_modules: bool,
}

impl IgnoreArgs {
    pub fn options(&self) -> FileInfoOptions {
        FileInfoOptions::new()
            .ignore_path(self.ignore_paths.iter().cloned())
            .ignore_patterns(self.ignore_patterns.iter().cloned())
            .with_node_modules(self.with_node_modules)
    }
}

fn runtime() -> anyhow::Result<tokio::runtime::Runtime> {
    Ok(tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?)
}

#[derive(Args, Debug)]
pub struct CheckCommand {
    /// Files to check
    #[clap(value_name = "file", required = true)]
    files: Vec<FileRef>,

    /// Print ignored files instead of the files that would be processed
    #[clap(long)]
    ignored: bool,

    #[command(flatten)]
    ignore: IgnoreArgs,
}

impl CheckCommand {
    pub fn run(&self, ctx: Context) -> anyhow::Result<()> {
        runtime()?.block_on(self.run_async(Arc::new(ctx)))
    }

    pub async fn run_async(&self, ctx: Arc<Context>) -> anyhow::Result<()> {
        let options = Arc::new(self.ignore.options());

        let handles = self
            .files
            .iter()
            .cloned()
            .map(|file| {
                let ctx = Arc::clone(&ctx);
                let options = Arc::clone(&options);
                tokio::spawn(async move {
                    let info = ctx
                        .get_file_info(&file, &options, &NoConfig, &ExtensionTable::default())
                        .await;
                    (file, info)
                })
            })
            .collect::<Vec<_>>();

        for handle in handles {
            let (file, info) = handle.await?;
            if info?.ignored == self.ignored {
                println!("{}", file);
            }
        }
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct InfoCommand {
    /// File to describe
    #[clap(value_name = "file")]
    file: FileRef,

    #[command(flatten)]
    ignore: IgnoreArgs,
}

impl InfoCommand {
    pub fn run(&self, ctx: Context) -> anyhow::Result<()> {
        runtime()?.block_on(async {
            let info = ctx
                .get_file_info(
                    &self.file,
                    &self.ignore.options(),
                    &NoConfig,
                    &ExtensionTable::default(),
                )
                .await?;
            println!("{}", format_file_info(&info));
            Ok::<_, anyhow::Error>(())
        })
    }
}

fn format_file_info(info: &FileInfo) -> String {
    let parser = match &info.inferred_parser {
        Some(parser) => format!("\"{}\"", parser),
        None => "null".to_string(),
    };
    format!(
        "{{ \"ignored\": {}, \"inferredParser\": {} }}",
        info.ignored, parser
    )
}
