use std::collections::HashMap;
use std::sync::Arc;

use super::result_set::ResultSet;
use super::row::CustomDbRow;
use crate::error::SqlMiddlewareDbError;
use crate::types::{FetchMode, RowShape, RowValues};

/// A row exposed as named fields, like an object's members.
///
/// A later column with the same name as an earlier one replaces it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectRow {
    fields: Vec<(String, RowValues)>,
}

impl ObjectRow {
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&RowValues> {
        self.fields
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, value)| value)
    }

    pub fn get_mut(&mut self, field: &str) -> Option<&mut RowValues> {
        self.fields
            .iter_mut()
            .find(|(name, _)| name == field)
            .map(|(_, value)| value)
    }

    /// Set a field, adding it when absent.
    pub fn set(&mut self, field: impl Into<String>, value: RowValues) {
        let field = field.into();
        match self.get_mut(&field) {
            Some(slot) => *slot = value,
            None => self.fields.push((field, value)),
        }
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &RowValues)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }
}

impl From<CustomDbRow> for ObjectRow {
    fn from(row: CustomDbRow) -> Self {
        let mut object = ObjectRow {
            fields: Vec::with_capacity(row.rows.len()),
        };
        for (name, value) in row.column_names.iter().zip(row.rows) {
            object.set(name.clone(), value);
        }
        object
    }
}

/// One fetched row, associative or object-shaped.
#[derive(Debug, Clone)]
pub enum FetchedRow {
    Assoc(CustomDbRow),
    Object(ObjectRow),
}

impl FetchedRow {
    /// Value of a column or field by name.
    #[must_use]
    pub fn get(&self, column: &str) -> Option<&RowValues> {
        match self {
            FetchedRow::Assoc(row) => row.get(column),
            FetchedRow::Object(row) => row.get(column),
        }
    }

    pub fn get_mut(&mut self, column: &str) -> Option<&mut RowValues> {
        match self {
            FetchedRow::Assoc(row) => row.get_mut(column),
            FetchedRow::Object(row) => row.get_mut(column),
        }
    }

    #[must_use]
    pub fn as_assoc(&self) -> Option<&CustomDbRow> {
        if let FetchedRow::Assoc(row) = self {
            Some(row)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_object(&self) -> Option<&ObjectRow> {
        if let FetchedRow::Object(row) = self {
            Some(row)
        } else {
            None
        }
    }
}

/// Rows sharing one value of the grouping column.
#[derive(Debug, Clone)]
pub struct RowGroup {
    pub key: RowValues,
    pub rows: Vec<FetchedRow>,
}

/// All rows of one fetch, flat or grouped by the first column.
#[derive(Debug, Clone)]
pub enum FetchedRowSet {
    Rows(Vec<FetchedRow>),
    Grouped(Vec<RowGroup>),
}

impl FetchedRowSet {
    /// Every row, across groups when grouped.
    pub fn rows(&self) -> Box<dyn Iterator<Item = &FetchedRow> + '_> {
        match self {
            FetchedRowSet::Rows(rows) => Box::new(rows.iter()),
            FetchedRowSet::Grouped(groups) => Box::new(groups.iter().flat_map(|g| g.rows.iter())),
        }
    }

    pub(crate) fn rows_mut(&mut self) -> Box<dyn Iterator<Item = &mut FetchedRow> + '_> {
        match self {
            FetchedRowSet::Rows(rows) => Box::new(rows.iter_mut()),
            FetchedRowSet::Grouped(groups) => {
                Box::new(groups.iter_mut().flat_map(|g| g.rows.iter_mut()))
            }
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows().count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows().next().is_none()
    }
}

/// Materialize a typed value from a fetched row.
pub trait FromRow: Sized {
    /// # Errors
    /// Returns `SqlMiddlewareDbError` if a required column is missing or has the wrong type.
    fn from_row(row: &CustomDbRow) -> Result<Self, SqlMiddlewareDbError>;
}

pub(crate) fn shape_row(row: CustomDbRow, shape: RowShape) -> FetchedRow {
    match shape {
        RowShape::Assoc => FetchedRow::Assoc(row),
        RowShape::Object => FetchedRow::Object(ObjectRow::from(row)),
    }
}

/// Identity of a group. Scalars compare by their text form, so `1` and `"1"` share a
/// group; bytes that are not UTF-8 and NULL each stay distinct.
#[derive(Debug, PartialEq, Eq, Hash)]
enum GroupKey {
    Null,
    Text(String),
    Bytes(Vec<u8>),
}

impl From<&RowValues> for GroupKey {
    fn from(value: &RowValues) -> Self {
        match value {
            RowValues::Null => GroupKey::Null,
            RowValues::Blob(bytes) => match std::str::from_utf8(bytes) {
                Ok(text) => GroupKey::Text(text.to_owned()),
                Err(_) => GroupKey::Bytes(bytes.clone()),
            },
            other => other.to_text().map_or(GroupKey::Null, GroupKey::Text),
        }
    }
}

pub(crate) fn shape_rows(result_set: ResultSet, mode: FetchMode) -> FetchedRowSet {
    if !mode.grouped {
        return FetchedRowSet::Rows(
            result_set
                .results
                .into_iter()
                .map(|row| shape_row(row, mode.shape))
                .collect(),
        );
    }

    let Some(column_names) = result_set.get_column_names() else {
        return FetchedRowSet::Grouped(Vec::new());
    };
    // The grouping column is lifted out; nested rows keep the rest.
    let nested_names = Arc::new(column_names.iter().skip(1).cloned().collect::<Vec<_>>());

    let mut groups: Vec<RowGroup> = Vec::new();
    let mut index: HashMap<GroupKey, usize> = HashMap::new();
    for row in result_set.results {
        let mut values = row.rows.into_iter();
        let key = values.next().unwrap_or(RowValues::Null);
        let nested = CustomDbRow::new(Arc::clone(&nested_names), values.collect());
        let slot = *index
            .entry(GroupKey::from(&key))
            .or_insert_with(|| {
                groups.push(RowGroup {
                    key: key.clone(),
                    rows: Vec::new(),
                });
                groups.len() - 1
            });
        groups[slot].rows.push(shape_row(nested, mode.shape));
    }

    FetchedRowSet::Grouped(groups)
}
