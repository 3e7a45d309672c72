//! rusqlite-backed [`StatementClient`](crate::client::StatementClient).

mod client;
pub mod params;
pub mod query;

pub use client::{SqliteClient, SqliteStatementHandle};
pub use params::Params;
pub use query::build_result_set;
