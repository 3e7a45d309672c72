use thiserror::Error;

use crate::cipher::CipherError;

#[derive(Debug, Error)]
pub enum SqlMiddlewareDbError {
    #[cfg(feature = "sqlite")]
    #[error(transparent)]
    SqliteError(#[from] rusqlite::Error),

    /// The underlying client rejected the (rewritten) statement text.
    #[error("Preparation error: {0}")]
    PreparationError(#[source] Box<SqlMiddlewareDbError>),

    /// The underlying client failed to execute the statement.
    #[error("SQL execution error: {0}")]
    ExecutionError(#[source] Box<SqlMiddlewareDbError>),

    #[error("Fetch error: {0}")]
    FetchError(String),

    #[error("Encryption error on `{column}`: {source}")]
    EncryptionError {
        column: String,
        #[source]
        source: CipherError,
    },

    #[error("Decryption error on `{column}`: {source}")]
    DecryptionError {
        column: String,
        #[source]
        source: CipherError,
    },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Parameter conversion error: {0}")]
    ParameterError(String),

    #[error("Other database error: {0}")]
    Other(String),
}

impl SqlMiddlewareDbError {
    /// Wrap an underlying client failure raised while preparing a statement.
    #[must_use]
    pub fn preparation(err: SqlMiddlewareDbError) -> Self {
        SqlMiddlewareDbError::PreparationError(Box::new(err))
    }

    /// Wrap an underlying client failure raised while executing a statement.
    #[must_use]
    pub fn execution(err: SqlMiddlewareDbError) -> Self {
        SqlMiddlewareDbError::ExecutionError(Box::new(err))
    }

    /// The underlying client error, if this one wraps it.
    #[must_use]
    pub fn client_error(&self) -> Option<&SqlMiddlewareDbError> {
        match self {
            SqlMiddlewareDbError::PreparationError(inner)
            | SqlMiddlewareDbError::ExecutionError(inner) => Some(inner),
            _ => None,
        }
    }
}
