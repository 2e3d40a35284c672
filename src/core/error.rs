use rusqlite;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LimpetError {
    /// Precondition failure: the operation was issued on a disconnected
    /// store. Never touches the engine; recoverable by opening a new Store.
    #[error("store is not connected")]
    NotConnected,
    #[error("failed to open store at {}: {}", .path.display(), .source)]
    Open {
        path: PathBuf,
        source: rusqlite::Error,
    },
    #[error("failed to close store: {0}")]
    Close(rusqlite::Error),
    #[error("SQLite error: {0}")]
    RusqliteError(#[from] rusqlite::Error),
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),
    #[error("Path error: {0}")]
    PathError(String),
}
