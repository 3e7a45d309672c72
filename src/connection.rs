use std::fmt;
use std::sync::Arc;

use crate::cipher::Cipher;
use crate::client::StatementClient;
use crate::error::SqlMiddlewareDbError;
use crate::statement::PreparedStatement;
use crate::types::FetchMode;

/// An underlying client plus the cipher and fetch mode shared by its statements.
///
/// ```rust
/// # #[cfg(feature = "sqlite")]
/// # fn demo() -> Result<(), sql_cipher_middleware::SqlMiddlewareDbError> {
/// use sql_cipher_middleware::prelude::*;
///
/// let conn = Connection::sqlite_builder(":memory:").open()?;
/// conn.client().execute_batch("CREATE TABLE t (a INTEGER, b INTEGER)")?;
/// let mut stmt = conn.prepare("SELECT * FROM t WHERE a = :x OR b = :x")?;
/// assert_eq!(stmt.sql(), "SELECT * FROM t WHERE a = :x_0 OR b = :x_1");
/// stmt.execute(ParameterSet::from_iter([("x", RowValues::Int(5))]))?;
/// # Ok(())
/// # }
/// ```
pub struct Connection<C: StatementClient> {
    client: C,
    cipher: Option<Arc<dyn Cipher>>,
    default_fetch_mode: FetchMode,
}

impl<C: StatementClient + fmt::Debug> fmt::Debug for Connection<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("client", &self.client)
            .field("has_cipher", &self.cipher.is_some())
            .field("default_fetch_mode", &self.default_fetch_mode)
            .finish()
    }
}

impl<C: StatementClient> Connection<C> {
    #[must_use]
    pub fn new(client: C) -> Self {
        Self {
            client,
            cipher: None,
            default_fetch_mode: FetchMode::default(),
        }
    }

    #[must_use]
    pub fn with_cipher(mut self, cipher: Arc<dyn Cipher>) -> Self {
        self.cipher = Some(cipher);
        self
    }

    #[must_use]
    pub fn with_fetch_mode(mut self, mode: FetchMode) -> Self {
        self.default_fetch_mode = mode;
        self
    }

    /// Replace the default cipher. Already-prepared statements keep theirs.
    pub fn set_cipher(&mut self, cipher: Option<Arc<dyn Cipher>>) {
        self.cipher = cipher;
    }

    #[must_use]
    pub fn cipher(&self) -> Option<&Arc<dyn Cipher>> {
        self.cipher.as_ref()
    }

    #[must_use]
    pub fn default_fetch_mode(&self) -> FetchMode {
        self.default_fetch_mode
    }

    #[must_use]
    pub fn client(&self) -> &C {
        &self.client
    }

    /// Prepare `sql`, rewriting repeated placeholders. The statement starts with this
    /// connection's cipher and fetch mode.
    ///
    /// # Errors
    /// Returns [`SqlMiddlewareDbError::PreparationError`] if the client rejects the statement.
    pub fn prepare(&self, sql: &str) -> Result<PreparedStatement<'_, C>, SqlMiddlewareDbError> {
        PreparedStatement::prepare(
            &self.client,
            sql,
            self.cipher.clone(),
            self.default_fetch_mode,
        )
    }
}
