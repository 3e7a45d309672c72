use std::fmt;
use std::sync::Arc;

use crate::cipher::Cipher;
use crate::cipher_pass::{decrypt_row, decrypt_row_set, encrypt_params};
use crate::client::StatementClient;
use crate::error::SqlMiddlewareDbError;
use crate::placeholders::{ExpansionTable, expand_params, rewrite, scan};
use crate::results::{FetchedRow, FetchedRowSet, FromRow, shape_row, shape_rows};
use crate::types::{FetchMode, ParameterSet};

/// Lifecycle of a [`PreparedStatement`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementState {
    Prepared,
    Executed,
    Fetching,
    Closed,
}

/// A statement prepared through the middleware.
///
/// Holds the rewritten SQL, the expansion table for repeated placeholders, the encrypted
/// column set, and the cipher, and wraps the underlying client's statement handle.
/// Parameters are bound by original placeholder name; values for encrypted columns are
/// encrypted on execute and decrypted on fetch.
pub struct PreparedStatement<'c, C: StatementClient> {
    client: &'c C,
    handle: C::Handle,
    sql: String,
    expansions: ExpansionTable,
    encrypted_columns: Vec<String>,
    cipher: Option<Arc<dyn Cipher>>,
    fetch_mode: FetchMode,
    state: StatementState,
}

impl<C: StatementClient> fmt::Debug for PreparedStatement<'_, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PreparedStatement")
            .field("sql", &self.sql)
            .field("expansions", &self.expansions)
            .field("encrypted_columns", &self.encrypted_columns)
            .field("has_cipher", &self.cipher.is_some())
            .field("fetch_mode", &self.fetch_mode)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl<'c, C: StatementClient> PreparedStatement<'c, C> {
    /// Rewrite repeated placeholders in `sql` and prepare the result on `client`.
    ///
    /// # Errors
    /// Returns [`SqlMiddlewareDbError::PreparationError`] wrapping the client's error if it
    /// rejects the rewritten text.
    pub fn prepare(
        client: &'c C,
        sql: &str,
        cipher: Option<Arc<dyn Cipher>>,
        fetch_mode: FetchMode,
    ) -> Result<Self, SqlMiddlewareDbError> {
        let found = scan(sql);
        let rewritten = rewrite(sql, &found);
        tracing::debug!(
            placeholders = found.occurrences.len(),
            rewritten = rewritten.replacements.len(),
            "preparing statement"
        );

        let handle = client
            .prepare(&rewritten.sql)
            .map_err(SqlMiddlewareDbError::preparation)?;

        Ok(Self {
            client,
            handle,
            sql: rewritten.sql.into_owned(),
            expansions: rewritten.expansions,
            encrypted_columns: Vec::new(),
            cipher,
            fetch_mode,
            state: StatementState::Prepared,
        })
    }

    /// Set the columns encrypted on execute and decrypted on fetch, optionally replacing
    /// the cipher inherited from the connection. Repeated column names are listed once.
    pub fn configure_encryption<I, S>(
        &mut self,
        columns: I,
        cipher: Option<Arc<dyn Cipher>>,
    ) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if cipher.is_some() {
            self.cipher = cipher;
        }
        self.encrypted_columns.clear();
        for column in columns {
            let column = column.into();
            if !self.encrypted_columns.contains(&column) {
                self.encrypted_columns.push(column);
            }
        }
        self
    }

    /// Replace (or clear) the statement's cipher.
    pub fn set_cipher(&mut self, cipher: Option<Arc<dyn Cipher>>) -> &mut Self {
        self.cipher = cipher;
        self
    }

    /// Fetch mode used by [`fetch_next`](Self::fetch_next) and
    /// [`fetch_all_default`](Self::fetch_all_default).
    pub fn set_fetch_mode(&mut self, mode: FetchMode) -> &mut Self {
        self.fetch_mode = mode;
        self
    }

    /// Expand repeated placeholders, encrypt configured columns, and execute.
    ///
    /// `params` is keyed by original placeholder names, bare or `:`-prefixed. A value bound
    /// under a generated name (e.g. `x_1`) overrides the broadcast for that one site.
    ///
    /// # Errors
    /// Returns [`SqlMiddlewareDbError::EncryptionError`] or
    /// [`SqlMiddlewareDbError::ParameterError`] from the cipher pass, and
    /// [`SqlMiddlewareDbError::ExecutionError`] wrapping any client failure.
    pub fn execute(&mut self, params: ParameterSet) -> Result<bool, SqlMiddlewareDbError> {
        if self.state == StatementState::Closed {
            return Err(SqlMiddlewareDbError::execution(SqlMiddlewareDbError::Other(
                "statement is closed".to_string(),
            )));
        }

        let mut params = expand_params(params, &self.expansions);
        let encrypted = encrypt_params(
            &mut params,
            &self.encrypted_columns,
            &self.expansions,
            self.cipher.as_deref(),
        )?;
        tracing::debug!(params = params.len(), encrypted, "executing statement");

        let ok = self
            .client
            .execute(&mut self.handle, &params)
            .map_err(SqlMiddlewareDbError::execution)?;
        self.state = StatementState::Executed;
        Ok(ok)
    }

    /// Next row, shaped per `mode`, with the configured columns decrypted.
    /// `None` once the results are exhausted.
    ///
    /// # Errors
    /// Returns [`SqlMiddlewareDbError::FetchError`] before execute or after close, the
    /// client's error if the row cannot be read, and decryption errors from the cipher pass.
    pub fn fetch(&mut self, mode: FetchMode) -> Result<Option<FetchedRow>, SqlMiddlewareDbError> {
        self.fetch_inner(None, mode)
    }

    /// Like [`fetch`](Self::fetch), decrypting `columns` instead of the configured set.
    ///
    /// # Errors
    /// See [`fetch`](Self::fetch).
    pub fn fetch_with(
        &mut self,
        columns: &[String],
        mode: FetchMode,
    ) -> Result<Option<FetchedRow>, SqlMiddlewareDbError> {
        self.fetch_inner(Some(columns), mode)
    }

    /// [`fetch`](Self::fetch) using the statement's default mode.
    ///
    /// # Errors
    /// See [`fetch`](Self::fetch).
    pub fn fetch_next(&mut self) -> Result<Option<FetchedRow>, SqlMiddlewareDbError> {
        self.fetch_inner(None, self.fetch_mode)
    }

    /// Next row materialized as `T` after decryption. `None` once exhausted.
    ///
    /// # Errors
    /// See [`fetch`](Self::fetch); also any error from `T::from_row`.
    pub fn fetch_object<T: FromRow>(&mut self) -> Result<Option<T>, SqlMiddlewareDbError> {
        self.fetch_object_inner(None)
    }

    /// Like [`fetch_object`](Self::fetch_object), decrypting `columns` instead.
    ///
    /// # Errors
    /// See [`fetch_object`](Self::fetch_object).
    pub fn fetch_object_with<T: FromRow>(
        &mut self,
        columns: &[String],
    ) -> Result<Option<T>, SqlMiddlewareDbError> {
        self.fetch_object_inner(Some(columns))
    }

    /// All remaining rows, shaped and grouped per `mode`, with the configured columns decrypted.
    ///
    /// # Errors
    /// See [`fetch`](Self::fetch).
    pub fn fetch_all(&mut self, mode: FetchMode) -> Result<FetchedRowSet, SqlMiddlewareDbError> {
        self.fetch_all_inner(None, mode)
    }

    /// Like [`fetch_all`](Self::fetch_all), decrypting `columns` instead.
    ///
    /// # Errors
    /// See [`fetch`](Self::fetch).
    pub fn fetch_all_with(
        &mut self,
        columns: &[String],
        mode: FetchMode,
    ) -> Result<FetchedRowSet, SqlMiddlewareDbError> {
        self.fetch_all_inner(Some(columns), mode)
    }

    /// [`fetch_all`](Self::fetch_all) using the statement's default mode.
    ///
    /// # Errors
    /// See [`fetch`](Self::fetch).
    pub fn fetch_all_default(&mut self) -> Result<FetchedRowSet, SqlMiddlewareDbError> {
        self.fetch_all_inner(None, self.fetch_mode)
    }

    /// All remaining rows materialized as `T` after decryption.
    ///
    /// # Errors
    /// See [`fetch_object`](Self::fetch_object).
    pub fn fetch_all_objects<T: FromRow>(&mut self) -> Result<Vec<T>, SqlMiddlewareDbError> {
        self.check_fetchable()?;
        let result_set = self.client.fetch_all(&mut self.handle)?;
        self.state = StatementState::Fetching;

        let mut out = Vec::with_capacity(result_set.results.len());
        for mut row in result_set.results {
            decrypt_row(&mut row, &self.encrypted_columns, self.cipher.as_deref())?;
            out.push(T::from_row(&row)?);
        }
        Ok(out)
    }

    /// Close the statement. Later execute and fetch calls fail.
    pub fn close(&mut self) {
        self.state = StatementState::Closed;
    }

    /// The SQL handed to the client, after placeholder rewriting.
    #[must_use]
    pub fn sql(&self) -> &str {
        &self.sql
    }

    #[must_use]
    pub fn expansion_table(&self) -> &ExpansionTable {
        &self.expansions
    }

    #[must_use]
    pub fn encrypted_columns(&self) -> &[String] {
        &self.encrypted_columns
    }

    #[must_use]
    pub fn state(&self) -> StatementState {
        self.state
    }

    #[must_use]
    pub fn default_fetch_mode(&self) -> FetchMode {
        self.fetch_mode
    }

    /// Rows returned or changed by the last execute, as reported by the client.
    #[must_use]
    pub fn rows_affected(&self) -> usize {
        self.client.rows_affected(&self.handle)
    }

    /// The client's handle for this statement.
    #[must_use]
    pub fn handle(&self) -> &C::Handle {
        &self.handle
    }

    fn check_fetchable(&self) -> Result<(), SqlMiddlewareDbError> {
        match self.state {
            StatementState::Executed | StatementState::Fetching => Ok(()),
            StatementState::Prepared => Err(SqlMiddlewareDbError::FetchError(
                "statement has not been executed".to_string(),
            )),
            StatementState::Closed => Err(SqlMiddlewareDbError::FetchError(
                "statement is closed".to_string(),
            )),
        }
    }

    fn fetch_inner(
        &mut self,
        columns: Option<&[String]>,
        mode: FetchMode,
    ) -> Result<Option<FetchedRow>, SqlMiddlewareDbError> {
        self.check_fetchable()?;
        let row = self.client.fetch(&mut self.handle)?;
        self.state = StatementState::Fetching;

        let Some(row) = row else {
            return Ok(None);
        };
        let mut row = shape_row(row, mode.shape);
        let columns = columns.unwrap_or(self.encrypted_columns.as_slice());
        decrypt_row(&mut row, columns, self.cipher.as_deref())?;
        Ok(Some(row))
    }

    fn fetch_object_inner<T: FromRow>(
        &mut self,
        columns: Option<&[String]>,
    ) -> Result<Option<T>, SqlMiddlewareDbError> {
        self.check_fetchable()?;
        let row = self.client.fetch(&mut self.handle)?;
        self.state = StatementState::Fetching;

        let Some(mut row) = row else {
            return Ok(None);
        };
        let columns = columns.unwrap_or(self.encrypted_columns.as_slice());
        decrypt_row(&mut row, columns, self.cipher.as_deref())?;
        T::from_row(&row).map(Some)
    }

    fn fetch_all_inner(
        &mut self,
        columns: Option<&[String]>,
        mode: FetchMode,
    ) -> Result<FetchedRowSet, SqlMiddlewareDbError> {
        self.check_fetchable()?;
        let result_set = self.client.fetch_all(&mut self.handle)?;
        self.state = StatementState::Fetching;

        let mut rows = shape_rows(result_set, mode);
        let columns = columns.unwrap_or(self.encrypted_columns.as_slice());
        decrypt_row_set(&mut rows, columns, self.cipher.as_deref())?;
        Ok(rows)
    }
}
