use std::future::Future;
use std::pin::Pin;

use thiserror::Error;

/// Errors surfaced by row cursors and detail sources.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CursorError {
    #[error("column '{name}' does not exist in this row shape")]
    ColumnNotFound { name: String },
    #[error("no current row; advance the cursor first")]
    NoCurrentRow,
    #[error("cell {ordinal} could not be read as text: {message}")]
    CellDecode { ordinal: usize, message: String },
    #[error("row stream failed: {message}")]
    Stream { message: String },
    #[error("'{name}' is not a valid procedure identifier")]
    InvalidProcedure { name: String },
}

/// Single-pass, forward-only view over a tabular result.
///
/// Column metadata (`shape_id`, `column_count`, `column_name`, `ordinal_of`)
/// is valid from construction. Cell accessors refer to the current row, which
/// only exists after a successful [`advance`](RowCursor::advance). Rows
/// already consumed cannot be revisited.
pub trait RowCursor: Send {
    /// Stable identifier for the column layout this cursor produces. Cursors
    /// with equal shape ids must expose identical column layouts.
    fn shape_id(&self) -> &str;

    fn column_count(&self) -> usize;

    /// Name of the column at `ordinal`, or `None` when out of range.
    fn column_name(&self, ordinal: usize) -> Option<&str>;

    /// Provider-native name-to-ordinal lookup, case-insensitive.
    ///
    /// # Errors
    ///
    /// Returns [`CursorError::ColumnNotFound`] when no column carries `name`.
    fn ordinal_of(&self, name: &str) -> Result<usize, CursorError>;

    /// Move to the next row. Returns `false` once the source is exhausted.
    ///
    /// # Errors
    ///
    /// Returns [`CursorError::Stream`] when the underlying source fails
    /// mid-traversal; the cursor is unusable afterwards.
    fn advance<'a>(
        &'a mut self,
    ) -> Pin<Box<dyn Future<Output = Result<bool, CursorError>> + Send + 'a>>;

    /// Whether the cell at `ordinal` in the current row is null.
    ///
    /// Also `true` when there is no current row or `ordinal` is out of range,
    /// so callers can treat every unreadable cell as absent.
    fn is_null(&self, ordinal: usize) -> bool;

    /// Read the cell at `ordinal` as text. `Ok(None)` for null cells.
    ///
    /// # Errors
    ///
    /// Returns [`CursorError::NoCurrentRow`] before the first advance and
    /// [`CursorError::CellDecode`] when the cell cannot be represented as
    /// text.
    fn text(&self, ordinal: usize) -> Result<Option<String>, CursorError>;
}

/// Asynchronous source of exposure detail rows.
///
/// One `fetch` yields one exclusively-owned cursor; implementations must be
/// safe to call repeatedly and concurrently.
pub trait DetailSource: Send + Sync {
    /// Execute the detail query for `index_symbol` and return its row cursor.
    ///
    /// # Errors
    ///
    /// Returns [`CursorError::Stream`] when the query cannot be started or
    /// the first row cannot be read.
    fn fetch<'a>(
        &'a self,
        index_symbol: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Box<dyn RowCursor>, CursorError>> + Send + 'a>>;
}
