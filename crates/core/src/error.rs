use thiserror::Error;

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, ParseError>;

/// Errors that can abort the analysis of one file
#[derive(Error, Debug)]
pub enum ParseError {
    /// The decoder rejected the input bytes
    #[error("bad encoding: {0}")]
    BadEncoding(String),

    /// A NUL byte survived decoding
    #[error("corrupt input: embedded NUL at byte offset {0}")]
    CorruptInput(usize),

    /// Nesting exceeded the parser stack bound
    #[error("nesting too deep on line {0}")]
    TooDeep(u32),

    /// IO error while reading the source
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ParseError {
    pub fn bad_encoding(msg: impl Into<String>) -> Self {
        Self::BadEncoding(msg.into())
    }
}
