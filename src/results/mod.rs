mod fetched;
mod result_set;
mod row;

pub use fetched::{FetchedRow, FetchedRowSet, FromRow, ObjectRow, RowGroup};
pub use result_set::ResultSet;
pub use row::CustomDbRow;

pub(crate) use fetched::{shape_row, shape_rows};
