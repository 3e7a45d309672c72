//! The database client seam the middleware wraps.

use crate::error::SqlMiddlewareDbError;
use crate::results::{CustomDbRow, ResultSet};
use crate::types::ParameterSet;

/// Statement-level operations of an underlying database client.
///
/// Implementations accept bind keys in both bare (`id`) and sigil-prefixed (`:id`) form.
/// Errors are returned as the client raised them; the middleware does not reinterpret them.
pub trait StatementClient {
    /// Client-side state for one prepared statement.
    type Handle;

    /// Prepare `sql` for execution.
    ///
    /// # Errors
    /// Returns the client's error if it rejects the statement text.
    fn prepare(&self, sql: &str) -> Result<Self::Handle, SqlMiddlewareDbError>;

    /// Execute with named parameters, making any result rows available to `fetch`.
    ///
    /// # Errors
    /// Returns the client's error for parameter mismatches, constraint violations, or
    /// connectivity loss.
    fn execute(
        &self,
        handle: &mut Self::Handle,
        params: &ParameterSet,
    ) -> Result<bool, SqlMiddlewareDbError>;

    /// Next row of the last execution, or `None` when exhausted.
    ///
    /// # Errors
    /// Returns the client's error if the row cannot be read.
    fn fetch(&self, handle: &mut Self::Handle) -> Result<Option<CustomDbRow>, SqlMiddlewareDbError>;

    /// All remaining rows of the last execution.
    ///
    /// # Errors
    /// Returns the client's error if the rows cannot be read.
    fn fetch_all(&self, handle: &mut Self::Handle) -> Result<ResultSet, SqlMiddlewareDbError>;

    /// Rows returned or changed by the last execution.
    fn rows_affected(&self, handle: &Self::Handle) -> usize;
}
