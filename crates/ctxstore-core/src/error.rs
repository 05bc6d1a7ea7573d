use thiserror::Error;

#[derive(Debug, Error)]
pub enum CtxError {
    #[error("not initialized: run 'ctxstore init'")]
    NotInitialized,

    #[error("journal corrupt at line {line}: {reason}")]
    JournalCorruption { line: usize, reason: String },

    #[error("invalid field path '{0}': expected dot-separated segments of [A-Za-z0-9_-]")]
    InvalidFieldPath(String),

    #[error("unknown root '{root}' in field path '{field}': expected one of {known}")]
    UnknownRoot {
        root: String,
        field: String,
        known: &'static str,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, CtxError>;
