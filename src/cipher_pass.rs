//! Bind-time encryption and fetch-time decryption of configured columns.
//!
//! Blank values (NULL, empty text, empty blob) and absent columns are passed through
//! without invoking the cipher.

use std::collections::HashSet;

use crate::cipher::{Cipher, CipherError};
use crate::error::SqlMiddlewareDbError;
use crate::placeholders::ExpansionTable;
use crate::results::{CustomDbRow, FetchedRow, FetchedRowSet, ObjectRow};
use crate::types::{ParameterSet, RowValues, named_key};

/// Encrypt the bound values of every configured column, including the generated names
/// a repeated column placeholder was rewritten into. Keys are checked in both forms.
///
/// Without a cipher this is a no-op. Returns the number of values encrypted.
///
/// # Errors
/// Returns [`SqlMiddlewareDbError::ParameterError`] for a binary value that is not UTF-8 and
/// [`SqlMiddlewareDbError::EncryptionError`] when the cipher fails.
pub fn encrypt_params(
    params: &mut ParameterSet,
    columns: &[String],
    expansions: &ExpansionTable,
    cipher: Option<&dyn Cipher>,
) -> Result<usize, SqlMiddlewareDbError> {
    let Some(cipher) = cipher else {
        return Ok(0);
    };

    let mut encrypted = 0;
    // A key reachable from two configured columns is still encrypted once.
    let mut visited = HashSet::new();
    for column in columns {
        let targets = std::iter::once(column).chain(expansions.generated(column));
        for target in targets {
            for key in [target.clone(), named_key(target)] {
                if !visited.insert(key.clone()) {
                    continue;
                }
                let Some(value) = params.get_mut(&key) else {
                    continue;
                };
                if value.is_blank() {
                    continue;
                }
                let plaintext = value.to_text().ok_or_else(|| {
                    SqlMiddlewareDbError::ParameterError(format!(
                        "value bound to `{key}` is binary and cannot be encrypted"
                    ))
                })?;
                let ciphertext = cipher.encrypt(&plaintext).map_err(|source| {
                    SqlMiddlewareDbError::EncryptionError {
                        column: column.clone(),
                        source,
                    }
                })?;
                *value = RowValues::Text(ciphertext);
                encrypted += 1;
            }
        }
    }
    Ok(encrypted)
}

/// Rows whose values can be looked up by column name for in-place decryption.
pub trait ColumnsMut {
    fn column_mut(&mut self, column: &str) -> Option<&mut RowValues>;
}

impl ColumnsMut for CustomDbRow {
    fn column_mut(&mut self, column: &str) -> Option<&mut RowValues> {
        self.get_mut(column)
    }
}

impl ColumnsMut for ObjectRow {
    fn column_mut(&mut self, column: &str) -> Option<&mut RowValues> {
        self.get_mut(column)
    }
}

impl ColumnsMut for FetchedRow {
    fn column_mut(&mut self, column: &str) -> Option<&mut RowValues> {
        match self {
            FetchedRow::Assoc(row) => row.column_mut(column),
            FetchedRow::Object(row) => row.column_mut(column),
        }
    }
}

/// Decrypt the configured columns of one row in place.
///
/// # Errors
/// Returns [`SqlMiddlewareDbError::ConfigError`] when a column holds data to decrypt but no
/// cipher is configured, and [`SqlMiddlewareDbError::DecryptionError`] when the value is not
/// text or the cipher rejects it.
pub fn decrypt_row<R: ColumnsMut + ?Sized>(
    row: &mut R,
    columns: &[String],
    cipher: Option<&dyn Cipher>,
) -> Result<(), SqlMiddlewareDbError> {
    for column in columns {
        if let Some(value) = row.column_mut(column) {
            decrypt_value(value, column, cipher)?;
        }
    }
    Ok(())
}

/// Decrypt the configured columns of every row, descending into groups for grouped sets.
///
/// # Errors
/// See [`decrypt_row`].
pub fn decrypt_row_set(
    rows: &mut FetchedRowSet,
    columns: &[String],
    cipher: Option<&dyn Cipher>,
) -> Result<(), SqlMiddlewareDbError> {
    for row in rows.rows_mut() {
        decrypt_row(row, columns, cipher)?;
    }
    Ok(())
}

fn decrypt_value(
    value: &mut RowValues,
    column: &str,
    cipher: Option<&dyn Cipher>,
) -> Result<(), SqlMiddlewareDbError> {
    if value.is_blank() {
        return Ok(());
    }
    let Some(cipher) = cipher else {
        return Err(SqlMiddlewareDbError::ConfigError(format!(
            "column `{column}` holds encrypted data but no cipher is configured"
        )));
    };

    let ciphertext = match value {
        RowValues::Text(text) => text.as_str(),
        RowValues::Blob(bytes) => std::str::from_utf8(bytes).map_err(|e| {
            SqlMiddlewareDbError::DecryptionError {
                column: column.to_string(),
                source: CipherError::MalformedCiphertext(format!("binary value is not UTF-8: {e}")),
            }
        })?,
        other => {
            return Err(SqlMiddlewareDbError::DecryptionError {
                column: column.to_string(),
                source: CipherError::MalformedCiphertext(format!(
                    "expected text ciphertext, found {other:?}"
                )),
            });
        }
    };

    let plaintext =
        cipher
            .decrypt(ciphertext)
            .map_err(|source| SqlMiddlewareDbError::DecryptionError {
                column: column.to_string(),
                source,
            })?;
    tracing::trace!(column, "decrypted column");
    *value = RowValues::Text(trim_padding(&plaintext).to_string());
    Ok(())
}

fn trim_padding(plaintext: &str) -> &str {
    plaintext.trim_end_matches(|c: char| c.is_whitespace() || c == '\0')
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::helpers::create_test_row;
    use crate::placeholders::{rewrite, scan};
    use crate::results::RowGroup;

    /// Reverses text and wraps it in brackets; counts calls.
    #[derive(Default)]
    struct MirrorCipher {
        calls: AtomicUsize,
    }

    impl Cipher for MirrorCipher {
        fn encrypt(&self, plaintext: &str) -> Result<String, CipherError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(format!("[{}]", plaintext.chars().rev().collect::<String>()))
        }

        fn decrypt(&self, ciphertext: &str) -> Result<String, CipherError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let inner = ciphertext
                .strip_prefix('[')
                .and_then(|s| s.strip_suffix(']'))
                .ok_or_else(|| CipherError::MalformedCiphertext(ciphertext.to_string()))?;
            Ok(format!("{}  \0", inner.chars().rev().collect::<String>()))
        }
    }

    fn cols(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn encrypts_both_key_forms_and_skips_blanks() {
        let cipher = MirrorCipher::default();
        let mut params = ParameterSet::from_iter([
            ("ssn", RowValues::Text("123".into())),
            (":card", RowValues::Int(42)),
            ("note", RowValues::Text(String::new())),
            ("other", RowValues::Text("plain".into())),
        ]);
        let n = encrypt_params(
            &mut params,
            &cols(&["ssn", "card", "note", "missing"]),
            &ExpansionTable::default(),
            Some(&cipher),
        )
        .unwrap();
        assert_eq!(n, 2);
        assert_eq!(params.get("ssn"), Some(&RowValues::Text("[321]".into())));
        assert_eq!(params.get(":card"), Some(&RowValues::Text("[24]".into())));
        assert_eq!(params.get("note"), Some(&RowValues::Text(String::new())));
        assert_eq!(params.get("other"), Some(&RowValues::Text("plain".into())));
        assert_eq!(cipher.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn encrypts_generated_names_of_repeated_column() {
        let sql = "SELECT * FROM p WHERE ssn = :ssn OR alt = :ssn";
        let table = rewrite(sql, &scan(sql)).expansions;
        let mut params = crate::placeholders::expand_params(
            ParameterSet::from_iter([("ssn", RowValues::Text("123-45-6789".into()))]),
            &table,
        );
        let cipher = MirrorCipher::default();
        encrypt_params(&mut params, &cols(&["ssn"]), &table, Some(&cipher)).unwrap();
        assert_eq!(params.len(), 2);
        for key in ["ssn_0", "ssn_1"] {
            let Some(RowValues::Text(ct)) = params.get(key) else {
                panic!("missing {key}");
            };
            assert_eq!(trim_padding(&cipher.decrypt(ct).unwrap()), "123-45-6789");
        }
    }

    #[test]
    fn overlapping_columns_encrypt_each_value_once() {
        let sql = "UPDATE p SET ssn = :ssn WHERE ssn = :ssn";
        let table = rewrite(sql, &scan(sql)).expansions;
        let mut params = crate::placeholders::expand_params(
            ParameterSet::from_iter([("ssn", RowValues::Text("123".into()))]),
            &table,
        );
        let cipher = MirrorCipher::default();
        let n = encrypt_params(
            &mut params,
            &cols(&["ssn", "ssn", "ssn_1"]),
            &table,
            Some(&cipher),
        )
        .unwrap();
        assert_eq!(n, 2);
        assert_eq!(params.get("ssn_0"), Some(&RowValues::Text("[321]".into())));
        assert_eq!(params.get("ssn_1"), Some(&RowValues::Text("[321]".into())));
    }

    #[test]
    fn encryption_without_cipher_is_noop() {
        let mut params = ParameterSet::from_iter([("ssn", RowValues::Text("1".into()))]);
        let before = params.clone();
        let n = encrypt_params(&mut params, &cols(&["ssn"]), &ExpansionTable::default(), None)
            .unwrap();
        assert_eq!(n, 0);
        assert_eq!(params, before);
    }

    #[test]
    fn binary_non_utf8_is_rejected() {
        let mut params = ParameterSet::from_iter([("b", RowValues::Blob(vec![0xff, 0xfe]))]);
        let err = encrypt_params(
            &mut params,
            &cols(&["b"]),
            &ExpansionTable::default(),
            Some(&MirrorCipher::default()),
        )
        .unwrap_err();
        assert!(matches!(err, SqlMiddlewareDbError::ParameterError(_)));
    }

    #[test]
    fn decrypts_and_trims_assoc_and_object_rows() {
        let cipher = MirrorCipher::default();
        let row = create_test_row(
            cols(&["id", "ssn", "card", "memo"]),
            vec![
                RowValues::Int(1),
                RowValues::Text("[cba]".into()),
                RowValues::Null,
                RowValues::Text(String::new()),
            ],
        );
        let mut assoc = FetchedRow::Assoc(row.clone());
        decrypt_row(&mut assoc, &cols(&["ssn", "card", "memo", "absent"]), Some(&cipher)).unwrap();
        assert_eq!(assoc.get("ssn"), Some(&RowValues::Text("abc".into())));
        assert_eq!(assoc.get("card"), Some(&RowValues::Null));
        assert_eq!(assoc.get("memo"), Some(&RowValues::Text(String::new())));

        let mut object = FetchedRow::Object(ObjectRow::from(row));
        decrypt_row(&mut object, &cols(&["ssn"]), Some(&cipher)).unwrap();
        assert_eq!(object.get("ssn"), Some(&RowValues::Text("abc".into())));
        assert_eq!(cipher.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn decrypts_every_row_of_every_group() {
        let cipher = MirrorCipher::default();
        let row = |v: &str| {
            FetchedRow::Object(ObjectRow::from(create_test_row(
                cols(&["ssn"]),
                vec![RowValues::Text(v.into())],
            )))
        };
        let mut set = FetchedRowSet::Grouped(vec![
            RowGroup {
                key: RowValues::Int(1),
                rows: vec![row("[a]"), row("[b]")],
            },
            RowGroup {
                key: RowValues::Int(2),
                rows: vec![row("[c]")],
            },
        ]);
        decrypt_row_set(&mut set, &cols(&["ssn"]), Some(&cipher)).unwrap();
        let values: Vec<_> = set.rows().map(|r| r.get("ssn").cloned()).collect();
        assert_eq!(
            values,
            vec![
                Some(RowValues::Text("a".into())),
                Some(RowValues::Text("b".into())),
                Some(RowValues::Text("c".into())),
            ]
        );
    }

    #[test]
    fn decrypt_needs_cipher_only_for_real_data() {
        let mut blank = create_test_row(cols(&["ssn"]), vec![RowValues::Null]);
        decrypt_row(&mut blank, &cols(&["ssn", "absent"]), None).unwrap();

        let mut filled = create_test_row(cols(&["ssn"]), vec![RowValues::Text("[x]".into())]);
        let err = decrypt_row(&mut filled, &cols(&["ssn"]), None).unwrap_err();
        assert!(matches!(err, SqlMiddlewareDbError::ConfigError(_)));
    }

    #[test]
    fn cipher_failures_propagate() {
        let cipher = MirrorCipher::default();
        let mut row = create_test_row(cols(&["ssn"]), vec![RowValues::Text("garbage".into())]);
        let err = decrypt_row(&mut row, &cols(&["ssn"]), Some(&cipher)).unwrap_err();
        assert!(matches!(
            err,
            SqlMiddlewareDbError::DecryptionError { ref column, .. } if column == "ssn"
        ));
        assert_eq!(row.get("ssn"), Some(&RowValues::Text("garbage".into())));

        let mut number = create_test_row(cols(&["ssn"]), vec![RowValues::Int(5)]);
        assert!(decrypt_row(&mut number, &cols(&["ssn"]), Some(&cipher)).is_err());
    }
}
