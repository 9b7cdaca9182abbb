//! Deterministic in-memory cursors for offline use and tests.

use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;

use crate::cursor::{CursorError, DetailSource, RowCursor};

/// In-memory row cursor over owned cells.
///
/// Rows may carry fewer cells than the shape has columns; missing cells read
/// as null.
#[derive(Debug, Clone)]
pub struct MemoryCursor {
    shape_id: String,
    columns: Vec<String>,
    rows: VecDeque<Vec<Option<String>>>,
    current: Option<Vec<Option<String>>>,
}

impl MemoryCursor {
    pub fn new<I, S>(shape_id: impl Into<String>, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            shape_id: shape_id.into(),
            columns: columns.into_iter().map(Into::into).collect(),
            rows: VecDeque::new(),
            current: None,
        }
    }

    pub fn with_row<I, S>(mut self, cells: I) -> Self
    where
        I: IntoIterator<Item = Option<S>>,
        S: Into<String>,
    {
        self.rows
            .push_back(cells.into_iter().map(|cell| cell.map(Into::into)).collect());
        self
    }
}

impl RowCursor for MemoryCursor {
    fn shape_id(&self) -> &str {
        &self.shape_id
    }

    fn column_count(&self) -> usize {
        self.columns.len()
    }

    fn column_name(&self, ordinal: usize) -> Option<&str> {
        self.columns.get(ordinal).map(String::as_str)
    }

    fn ordinal_of(&self, name: &str) -> Result<usize, CursorError> {
        self.columns
            .iter()
            .position(|column| column.eq_ignore_ascii_case(name))
            .ok_or_else(|| CursorError::ColumnNotFound {
                name: name.to_string(),
            })
    }

    fn advance<'a>(
        &'a mut self,
    ) -> Pin<Box<dyn Future<Output = Result<bool, CursorError>> + Send + 'a>> {
        Box::pin(async move {
            self.current = self.rows.pop_front();
            Ok(self.current.is_some())
        })
    }

    fn is_null(&self, ordinal: usize) -> bool {
        self.current
            .as_ref()
            .map_or(true, |row| row.get(ordinal).map_or(true, Option::is_none))
    }

    fn text(&self, ordinal: usize) -> Result<Option<String>, CursorError> {
        let Some(row) = self.current.as_ref() else {
            return Err(CursorError::NoCurrentRow);
        };
        Ok(row.get(ordinal).and_then(|cell| cell.clone()))
    }
}

/// Detail source replaying a fixed row set, for offline runs and tests.
///
/// Every fetch yields a fresh single-pass cursor over the same rows; the
/// requested symbol is ignored.
#[derive(Debug, Clone)]
pub struct StaticDetailSource {
    shape_id: String,
    columns: Vec<String>,
    rows: Vec<Vec<Option<String>>>,
}

impl StaticDetailSource {
    pub fn new<I, S>(shape_id: impl Into<String>, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            shape_id: shape_id.into(),
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    pub fn with_row<I, S>(mut self, cells: I) -> Self
    where
        I: IntoIterator<Item = Option<S>>,
        S: Into<String>,
    {
        self.rows
            .push(cells.into_iter().map(|cell| cell.map(Into::into)).collect());
        self
    }

    fn cursor(&self) -> MemoryCursor {
        let mut cursor = MemoryCursor::new(self.shape_id.clone(), self.columns.clone());
        for row in &self.rows {
            cursor = cursor.with_row(row.clone());
        }
        cursor
    }
}

impl DetailSource for StaticDetailSource {
    fn fetch<'a>(
        &'a self,
        index_symbol: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Box<dyn RowCursor>, CursorError>> + Send + 'a>> {
        let _ = index_symbol;
        let cursor = self.cursor();
        Box::pin(async move { Ok(Box::new(cursor) as Box<dyn RowCursor>) })
    }
}
