//! Convenient imports for common functionality.

pub use crate::cipher::{AesGcmCipher, Cipher, CipherError};
pub use crate::client::StatementClient;
pub use crate::config::{ConnectionOptions, ConnectionOptionsBuilder};
pub use crate::connection::Connection;
pub use crate::error::SqlMiddlewareDbError;
pub use crate::results::{
    CustomDbRow, FetchedRow, FetchedRowSet, FromRow, ObjectRow, ResultSet, RowGroup,
};
pub use crate::statement::{PreparedStatement, StatementState};
pub use crate::types::{FetchMode, ParameterSet, RowShape, RowValues};

#[cfg(feature = "sqlite")]
pub use crate::sqlite::SqliteClient;
