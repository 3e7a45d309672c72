use crate::types::{NAMED_SIGIL, ParameterSet, named_key};

use super::ExpansionTable;

/// Fan each value bound under an original placeholder name out to the generated names
/// that replaced it.
///
/// A value the caller already bound under a generated name is kept. Original names that
/// were rewritten are removed in both key forms, since they no longer appear in the
/// statement text. Originals with no bound value are skipped.
///
/// ```rust
/// use sql_cipher_middleware::placeholders::{expand_params, rewrite, scan};
/// use sql_cipher_middleware::{ParameterSet, RowValues};
///
/// let sql = "SELECT * FROM t WHERE a = :x OR b = :x";
/// let table = rewrite(sql, &scan(sql)).expansions;
/// let params = expand_params(ParameterSet::from_iter([("x", RowValues::Int(5))]), &table);
/// assert_eq!(params.get("x_0"), Some(&RowValues::Int(5)));
/// assert_eq!(params.get("x_1"), Some(&RowValues::Int(5)));
/// assert!(!params.contains_named("x"));
/// ```
#[must_use]
pub fn expand_params(mut params: ParameterSet, table: &ExpansionTable) -> ParameterSet {
    if table.is_empty() {
        return params;
    }

    for (base, generated) in table.iter() {
        let Some((key, value)) = params.get_named(base) else {
            continue;
        };
        let sigil = key.starts_with(NAMED_SIGIL);
        let value = value.clone();

        for name in generated {
            if params.contains_named(name) {
                continue;
            }
            let key = if sigil {
                named_key(name)
            } else {
                name.clone()
            };
            params.insert(key, value.clone());
        }
        params.remove_named(base);
    }

    params
}
