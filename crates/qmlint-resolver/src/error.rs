use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Failures at the I/O boundary of module loading. The resolver turns these
/// into diagnostics; they never abort an analysis.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("QML types file cannot be a directory: {}", .0.display())]
    TypesFileIsDirectory(PathBuf),

    #[error("QML types file does not exist: {}", .0.display())]
    TypesFileMissing(PathBuf),

    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse {path}: {message}")]
    Parse { path: String, message: String },
}
