//! Helper utilities for testing and development.

use std::sync::Arc;

use crate::results::CustomDbRow;
use crate::types::RowValues;

/// Build a `CustomDbRow` from column names and values.
#[must_use]
pub fn create_test_row(column_names: Vec<String>, values: Vec<RowValues>) -> CustomDbRow {
    CustomDbRow::new(Arc::new(column_names), values)
}
