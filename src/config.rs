use std::fmt;
use std::sync::Arc;

use crate::cipher::Cipher;
use crate::types::FetchMode;

#[cfg(feature = "sqlite")]
use crate::connection::Connection;
#[cfg(feature = "sqlite")]
use crate::error::SqlMiddlewareDbError;
#[cfg(feature = "sqlite")]
use crate::sqlite::SqliteClient;

/// Options for opening a [`Connection`](crate::connection::Connection).
#[derive(Clone)]
pub struct ConnectionOptions {
    pub db_path: String,
    pub default_fetch_mode: FetchMode,
    pub cipher: Option<Arc<dyn Cipher>>,
}

impl fmt::Debug for ConnectionOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionOptions")
            .field("db_path", &self.db_path)
            .field("default_fetch_mode", &self.default_fetch_mode)
            .field("has_cipher", &self.cipher.is_some())
            .finish()
    }
}

impl ConnectionOptions {
    #[must_use]
    pub fn new(db_path: impl Into<String>) -> Self {
        Self {
            db_path: db_path.into(),
            default_fetch_mode: FetchMode::default(),
            cipher: None,
        }
    }

    #[must_use]
    pub fn builder(db_path: impl Into<String>) -> ConnectionOptionsBuilder {
        ConnectionOptionsBuilder::new(db_path)
    }

    #[must_use]
    pub fn with_fetch_mode(mut self, mode: FetchMode) -> Self {
        self.default_fetch_mode = mode;
        self
    }

    #[must_use]
    pub fn with_cipher(mut self, cipher: Arc<dyn Cipher>) -> Self {
        self.cipher = Some(cipher);
        self
    }
}

/// Fluent builder for connection options.
#[derive(Debug, Clone)]
pub struct ConnectionOptionsBuilder {
    opts: ConnectionOptions,
}

impl ConnectionOptionsBuilder {
    #[must_use]
    pub fn new(db_path: impl Into<String>) -> Self {
        Self {
            opts: ConnectionOptions::new(db_path),
        }
    }

    #[must_use]
    pub fn fetch_mode(mut self, mode: FetchMode) -> Self {
        self.opts.default_fetch_mode = mode;
        self
    }

    #[must_use]
    pub fn cipher(mut self, cipher: Arc<dyn Cipher>) -> Self {
        self.opts.cipher = Some(cipher);
        self
    }

    #[must_use]
    pub fn finish(self) -> ConnectionOptions {
        self.opts
    }

    /// Open a `SQLite` connection with these options.
    ///
    /// # Errors
    ///
    /// Returns `SqlMiddlewareDbError` if the database cannot be opened.
    #[cfg(feature = "sqlite")]
    pub fn open(self) -> Result<Connection<SqliteClient>, SqlMiddlewareDbError> {
        Connection::open(self.finish())
    }
}

#[cfg(feature = "sqlite")]
impl Connection<SqliteClient> {
    #[must_use]
    pub fn sqlite_builder(db_path: impl Into<String>) -> ConnectionOptionsBuilder {
        ConnectionOptionsBuilder::new(db_path)
    }

    /// Open a `SQLite` database and wrap it with the configured cipher and fetch mode.
    ///
    /// # Errors
    /// Returns `SqlMiddlewareDbError::SqliteError` if the database cannot be opened.
    pub fn open(opts: ConnectionOptions) -> Result<Self, SqlMiddlewareDbError> {
        let client = SqliteClient::open(&opts.db_path)?;
        tracing::debug!(db_path = %opts.db_path, cipher = opts.cipher.is_some(), "opened sqlite connection");
        let mut conn = Connection::new(client).with_fetch_mode(opts.default_fetch_mode);
        conn.set_cipher(opts.cipher);
        Ok(conn)
    }
}
