use std::collections::HashSet;

use rusqlite::ToSql;
use rusqlite::types::Value;

use crate::error::SqlMiddlewareDbError;
use crate::types::{NAMED_SIGIL, ParameterSet, RowValues, named_key};

/// Convert a single `RowValues` to a rusqlite `Value`.
#[must_use]
pub fn row_value_to_sqlite_value(value: &RowValues) -> Value {
    match value {
        RowValues::Int(i) => Value::Integer(*i),
        RowValues::Float(f) => Value::Real(*f),
        RowValues::Text(s) => Value::Text(s.clone()),
        RowValues::Bool(b) => Value::Integer(i64::from(*b)),
        RowValues::Timestamp(dt) => Value::Text(dt.format("%F %T%.f").to_string()),
        RowValues::Null => Value::Null,
        RowValues::JSON(jval) => Value::Text(jval.to_string()),
        RowValues::Blob(bytes) => Value::Blob(bytes.clone()),
    }
}

/// Named `SQLite` parameters, keyed in `:name` form.
pub struct Params(pub Vec<(String, Value)>);

impl Params {
    /// Convert a parameter set, normalizing every key to its sigil-prefixed form.
    ///
    /// # Errors
    ///
    /// Returns `SqlMiddlewareDbError::ParameterError` if one name is bound under both key forms.
    pub fn convert(params: &ParameterSet) -> Result<Self, SqlMiddlewareDbError> {
        let mut seen = HashSet::with_capacity(params.len());
        let mut values = Vec::with_capacity(params.len());
        for (key, value) in params.iter() {
            let key = if key.starts_with(NAMED_SIGIL) {
                key.to_string()
            } else {
                named_key(key)
            };
            if !seen.insert(key.clone()) {
                return Err(SqlMiddlewareDbError::ParameterError(format!(
                    "`{key}` is bound both with and without the `{NAMED_SIGIL}` prefix"
                )));
            }
            values.push((key, row_value_to_sqlite_value(value)));
        }
        Ok(Params(values))
    }

    /// Borrowed `(name, value)` pairs suitable for rusqlite named binding.
    #[must_use]
    pub fn as_named(&self) -> Vec<(&str, &dyn ToSql)> {
        self.0
            .iter()
            .map(|(k, v)| (k.as_str(), v as &dyn ToSql))
            .collect()
    }
}
