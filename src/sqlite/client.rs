use std::collections::VecDeque;
use std::path::Path;
use std::sync::Arc;

use rusqlite::Connection;

use super::params::Params;
use super::query::build_result_set;
use crate::client::StatementClient;
use crate::error::SqlMiddlewareDbError;
use crate::results::{CustomDbRow, ResultSet};
use crate::types::ParameterSet;

/// `SQLite` statement client over a single rusqlite connection.
///
/// Statements are compiled once at prepare time and kept in rusqlite's statement cache;
/// each execution buffers its rows on the handle for later fetches.
#[derive(Debug)]
pub struct SqliteClient {
    conn: Connection,
}

/// Per-statement state: the statement text and the rows of its last execution.
#[derive(Debug, Clone)]
pub struct SqliteStatementHandle {
    sql: Arc<String>,
    columns: Option<Arc<Vec<String>>>,
    pending: VecDeque<CustomDbRow>,
    rows_affected: usize,
}

impl SqliteStatementHandle {
    /// The SQL text the handle was prepared with.
    #[must_use]
    pub fn sql(&self) -> &str {
        self.sql.as_str()
    }
}

impl SqliteClient {
    /// Open (or create) a database file. `":memory:"` opens a private in-memory database.
    ///
    /// # Errors
    /// Returns `SqlMiddlewareDbError::SqliteError` if the database cannot be opened.
    pub fn open(db_path: impl AsRef<Path>) -> Result<Self, SqlMiddlewareDbError> {
        Ok(Self::from_connection(Connection::open(db_path)?))
    }

    #[must_use]
    pub fn from_connection(conn: Connection) -> Self {
        Self { conn }
    }

    /// The wrapped rusqlite connection.
    #[must_use]
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Run one or more statements without parameters or results.
    ///
    /// # Errors
    /// Returns `SqlMiddlewareDbError::SqliteError` if any statement fails.
    pub fn execute_batch(&self, sql: &str) -> Result<(), SqlMiddlewareDbError> {
        self.conn.execute_batch(sql)?;
        Ok(())
    }
}

impl StatementClient for SqliteClient {
    type Handle = SqliteStatementHandle;

    fn prepare(&self, sql: &str) -> Result<Self::Handle, SqlMiddlewareDbError> {
        // warm the cache so executions don't re-prepare.
        let _ = self.conn.prepare_cached(sql)?;
        Ok(SqliteStatementHandle {
            sql: Arc::new(sql.to_owned()),
            columns: None,
            pending: VecDeque::new(),
            rows_affected: 0,
        })
    }

    fn execute(
        &self,
        handle: &mut Self::Handle,
        params: &ParameterSet,
    ) -> Result<bool, SqlMiddlewareDbError> {
        let converted = Params::convert(params)?;
        let mut stmt = self.conn.prepare_cached(handle.sql.as_str())?;

        handle.pending.clear();
        if stmt.column_count() == 0 {
            handle.columns = None;
            handle.rows_affected = stmt.execute(converted.as_named().as_slice())?;
        } else {
            let result_set = build_result_set(&mut stmt, &converted)?;
            handle.columns = result_set.get_column_names().cloned();
            handle.rows_affected = result_set.rows_affected;
            handle.pending = result_set.results.into();
        }
        Ok(true)
    }

    fn fetch(&self, handle: &mut Self::Handle) -> Result<Option<CustomDbRow>, SqlMiddlewareDbError> {
        Ok(handle.pending.pop_front())
    }

    fn fetch_all(&self, handle: &mut Self::Handle) -> Result<ResultSet, SqlMiddlewareDbError> {
        let mut result_set = ResultSet::with_capacity(handle.pending.len());
        if let Some(columns) = &handle.columns {
            result_set.set_column_names(Arc::clone(columns));
        }
        for row in handle.pending.drain(..) {
            result_set.add_row(row);
        }
        Ok(result_set)
    }

    fn rows_affected(&self, handle: &Self::Handle) -> usize {
        handle.rows_affected
    }
}
