#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("expect `file` to be a path or file URL, got \"{0}\"")]
    InvalidArgument(String),

    #[error(transparent)]
    Config(anyhow::Error),

    #[error(transparent)]
    Matcher(#[from] ignore::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
