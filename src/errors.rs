use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PackError {
    #[error("Failed to resolve root path {path}: {source}")]
    RootResolution {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to walk {path}: {source}")]
    Traversal {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write output {path}: {source}")]
    OutputWriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write to stdout: {0}")]
    StdoutWriteError(#[source] std::io::Error),

    #[error("Clipboard initialization failed: {0}")]
    ClipboardInitError(String),

    #[error("Clipboard write failed: {0}")]
    ClipboardWriteError(String),

    #[error("Tokenizer Error: {0}")]
    TokenizerError(String),
}
