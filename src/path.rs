use std::fmt;
use std::path::{Component, Path, PathBuf};
use std::str::FromStr;

use url::Url;

use crate::Error;

/// A file named either by a filesystem path or by a `file:` URL.
///
/// An empty path stands for "no file" wherever a list of rule files is
/// accepted.
#[derive(Debug, PartialEq, Eq, Clone, std::hash::Hash)]
pub enum FileRef {
    Path(PathBuf),
    Url(Url),
}

impl FileRef {
    pub fn is_empty(&self) -> bool {
        matches!(self, FileRef::Path(path) if path.as_os_str().is_empty())
    }

    pub fn is_url(&self) -> bool {
        matches!(self, FileRef::Url(_))
    }

    /// Converts to a filesystem path with `/` as the only separator.
    pub fn to_path(&self) -> Result<PathBuf, Error> {
        match self {
            FileRef::Path(path) => Ok(normalize_separators(path)),
            FileRef::Url(url) if url.scheme() == "file" => url
                .to_file_path()
                .map_err(|_| Error::InvalidArgument(url.to_string())),
            FileRef::Url(url) => Err(Error::InvalidArgument(url.to_string())),
        }
    }
}

impl From<PathBuf> for FileRef {
    fn from(path: PathBuf) -> Self {
        FileRef::Path(path)
    }
}

impl From<&Path> for FileRef {
    fn from(path: &Path) -> Self {
        FileRef::Path(path.to_path_buf())
    }
}

impl From<&str> for FileRef {
    fn from(path: &str) -> Self {
        FileRef::Path(PathBuf::from(path))
    }
}

impl From<String> for FileRef {
    fn from(path: String) -> Self {
        FileRef::Path(PathBuf::from(path))
    }
}

impl From<Url> for FileRef {
    fn from(url: Url) -> Self {
        FileRef::Url(url)
    }
}

impl FromStr for FileRef {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.starts_with("file:") {
            let url = Url::parse(s).map_err(|_| Error::InvalidArgument(s.to_string()))?;
            return Ok(FileRef::Url(url));
        }
        Ok(FileRef::from(s))
    }
}

impl fmt::Display for FileRef {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        match self {
            FileRef::Path(path) => write!(f, "{}", path.display()),
            FileRef::Url(url) => write!(f, "{}", url),
        }
    }
}

// Backslashes are treated as separators on every platform so that the same
// logical path always produces the same decision.
fn normalize_separators(path: &Path) -> PathBuf {
    match path.to_str() {
        Some(s) if s.contains('\\') => PathBuf::from(s.replace('\\', "/")),
        _ => path.to_path_buf(),
    }
}

/// Resolves `path` against `cwd` and removes `.` and `..` segments lexically.
pub fn absolutize(cwd: &Path, path: &Path) -> PathBuf {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    };

    let mut normalized = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            component => normalized.push(component.as_os_str()),
        }
    }
    normalized
}

/// Path of `path` relative to `base`. Both must be absolute and normalized.
///
/// Walks up with `..` segments when `path` is outside `base`. Returns `None`
/// when the two do not share a root (e.g. different drives). Drive and UNC
/// prefixes compare case-insensitively.
pub fn relative_to(path: &Path, base: &Path) -> Option<PathBuf> {
    let mut path_components = path.components().peekable();
    let mut base_components = base.components().peekable();

    let same_root = match (path_components.peek(), base_components.peek()) {
        (Some(Component::Prefix(a)), Some(Component::Prefix(b))) => {
            a.as_os_str().eq_ignore_ascii_case(b.as_os_str())
        }
        (a, b) => a == b,
    };
    if !same_root {
        return None;
    }
    if let Some(Component::Prefix(_)) = path_components.peek() {
        path_components.next();
        base_components.next();
    }

    while let (Some(a), Some(b)) = (path_components.peek(), base_components.peek()) {
        if a != b {
            break;
        }
        path_components.next();
        base_components.next();
    }

    let mut relative = PathBuf::new();
    for _ in base_components {
        relative.push("..");
    }
    for component in path_components {
        relative.push(component.as_os_str());
    }
    Some(relative)
}

#[cfg(windows)]
pub fn to_slash(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

#[cfg(not(windows))]
pub fn to_slash(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
