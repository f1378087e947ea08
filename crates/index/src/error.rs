use thiserror::Error;

pub type Result<T> = std::result::Result<T, IndexError>;

#[derive(Error, Debug)]
pub enum IndexError {
    #[error("index access error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// The index was written by a different format version. The user
    /// must delete it; nothing else is safe.
    #[error("wrong index format version (found {found}, need {need}), delete it to continue")]
    VersionMismatch { found: i64, need: i64 },
}
