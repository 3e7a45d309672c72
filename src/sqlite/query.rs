use std::sync::Arc;

use rusqlite::Statement;
use rusqlite::types::ValueRef;

use super::params::Params;
use crate::error::SqlMiddlewareDbError;
use crate::results::ResultSet;
use crate::types::RowValues;

/// Read column `idx` of a `SQLite` row as a `RowValues`.
///
/// Text that is not valid UTF-8 is kept as a blob so the cipher pass can report it.
///
/// # Errors
///
/// Returns `SqlMiddlewareDbError` if the column cannot be read.
pub fn extract_value(row: &rusqlite::Row, idx: usize) -> Result<RowValues, SqlMiddlewareDbError> {
    Ok(match row.get_ref(idx)? {
        ValueRef::Null => RowValues::Null,
        ValueRef::Integer(i) => RowValues::Int(i),
        ValueRef::Real(f) => RowValues::Float(f),
        ValueRef::Text(bytes) => match std::str::from_utf8(bytes) {
            Ok(text) => RowValues::Text(text.to_owned()),
            Err(_) => RowValues::Blob(bytes.to_vec()),
        },
        ValueRef::Blob(bytes) => RowValues::Blob(bytes.to_vec()),
    })
}

/// Run a row-returning statement with named parameters and buffer every row.
///
/// # Errors
/// Returns `SqlMiddlewareDbError` if binding, stepping, or reading a value fails.
pub fn build_result_set(
    stmt: &mut Statement<'_>,
    params: &Params,
) -> Result<ResultSet, SqlMiddlewareDbError> {
    let column_names: Arc<Vec<String>> = Arc::new(
        stmt.column_names()
            .into_iter()
            .map(str::to_owned)
            .collect(),
    );
    let width = column_names.len();

    let mut result_set = ResultSet::default();
    result_set.set_column_names(column_names);

    let named = params.as_named();
    let mut rows = stmt.query(named.as_slice())?;
    while let Some(row) = rows.next()? {
        let values = (0..width)
            .map(|idx| extract_value(row, idx))
            .collect::<Result<Vec<_>, _>>()?;
        result_set.add_row_values(values);
    }

    Ok(result_set)
}
