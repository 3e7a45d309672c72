//! Prepared-statement middleware for SQL clients.
//!
//! A repeated named placeholder (`:x` used twice) is rewritten into unique names so one
//! bound value reaches every site, and a configured set of columns is encrypted when
//! parameters are bound and decrypted when rows are fetched.

pub mod cipher;
pub mod cipher_pass;
pub mod client;
pub mod config;
pub mod connection;
pub mod error;
pub mod helpers;
pub mod placeholders;
pub mod prelude;
pub mod results;
pub mod statement;
pub mod types;

#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use cipher::{AesGcmCipher, Cipher, CipherError};
pub use client::StatementClient;
pub use config::{ConnectionOptions, ConnectionOptionsBuilder};
pub use connection::Connection;
pub use error::SqlMiddlewareDbError;
pub use results::{CustomDbRow, FetchedRow, FetchedRowSet, FromRow, ObjectRow, ResultSet, RowGroup};
pub use statement::{PreparedStatement, StatementState};
pub use types::{FetchMode, ParameterSet, RowShape, RowValues};

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteClient;
