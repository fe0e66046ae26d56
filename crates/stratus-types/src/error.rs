use thiserror::Error;

pub type Result<T> = std::result::Result<T, StratusError>;

#[derive(Debug, Error)]
pub enum StratusError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("unsupported backend: '{0}'")]
    UnsupportedBackend(String),

    #[error("remote storage error: {0}")]
    Remote(String),

    #[error("no inventory mirror found at '{0}'")]
    MirrorNotFound(String),

    #[error("invalid format: {0}")]
    InvalidFormat(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("decryption failed: wrong password or corrupted data")]
    DecryptionFailed,

    #[error("key derivation error: {0}")]
    KeyDerivation(String),

    #[error("archive error: {0}")]
    Archive(String),

    #[error("{0}")]
    Other(String),
}
