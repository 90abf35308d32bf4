use std::future::Future;
use std::path::Path;

/// Source of rule-file contents.
///
/// A missing or unreadable file is `None`; readers never fail.
pub trait FileReader: Send + Sync {
    fn read(&self, path: &Path) -> impl Future<Output = Option<String>> + Send;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FsReader;

impl FileReader for FsReader {
    fn read(&self, path: &Path) -> impl Future<Output = Option<String>> + Send {
        let path = path.to_path_buf();
        async move {
            match tokio::fs::read_to_string(&path).await {
                Ok(contents) => Some(contents),
                Err(e) => {
                    log::debug!("no rules read from {}: {}", path.display(), e);
                    None
                }
            }
        }
    }
}
