use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("index not found at {0}")]
    IndexNotFound(String),

    #[error("index already exists at {0}")]
    IndexAlreadyExists(String),

    #[error("invalid document: {0}")]
    InvalidDocument(String),

    #[error("malformed query: {0}")]
    MalformedQuery(String),

    #[error("engine failure: {0}")]
    Engine(String),
}

impl Error {
    /// Engine faults (I/O, writer lock contention) may clear on retry.
    /// Everything else is a permanent contract violation.
    pub fn is_transient(&self) -> bool {
        matches!(self, Error::Engine(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
