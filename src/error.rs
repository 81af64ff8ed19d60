use std::path::PathBuf;
use thiserror::Error;

pub type Result<T, E = FlatcatError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum FlatcatError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Could not read directory {path}: {source}")]
    ReadDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to write output: {0}")]
    Write(#[source] std::io::Error),
    #[error("Folder '{0}' is not a valid directory.")]
    NotADirectory(PathBuf),
    #[error("Path {0} is not inside the traversal root")]
    InvalidPath(PathBuf),
    #[error("Invalid glob pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        source: globset::Error,
    },
    #[error("Gitignore error: {0}")]
    Ignore(#[from] ignore::Error),
    #[error("Invalid configuration in {path}: {message}")]
    Config { path: PathBuf, message: String },
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl FlatcatError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        FlatcatError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn read_dir(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        FlatcatError::ReadDir {
            path: path.into(),
            source,
        }
    }

    /// Whether this error concerns a whole directory rather than one file.
    pub fn is_directory_error(&self) -> bool {
        matches!(self, FlatcatError::ReadDir { .. })
    }
}
