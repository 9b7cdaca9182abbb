//! PostgreSQL detail source backed by a set-returning procedure.
//!
//! Uses dynamic queries (`sqlx::query`) instead of compile-time checked
//! macros so the crate compiles without a `DATABASE_URL`.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use futures_util::StreamExt;
use sqlx::postgres::PgRow;
use sqlx::{Column, PgPool, Row, ValueRef};
use tokio::sync::mpsc;
use tracing::debug;

use crate::cursor::{CursorError, DetailSource, RowCursor};

const ROW_CHANNEL_CAPACITY: usize = 16;

/// Detail source that executes `SELECT * FROM <procedure>($1)` with the
/// index symbol bound.
///
/// Rows are streamed through a bounded channel from a background task, so
/// the cursor pulls them one at a time without materializing the result set.
#[derive(Debug, Clone)]
pub struct PgProcSource {
    pool: Arc<PgPool>,
    procedure: String,
    statement: String,
}

impl PgProcSource {
    /// Create a source for the given set-returning procedure.
    ///
    /// The procedure name is interpolated into the statement text, so it must
    /// be a plain identifier, optionally schema-qualified.
    ///
    /// # Errors
    ///
    /// Returns [`CursorError::InvalidProcedure`] when the name is not a valid
    /// identifier.
    pub fn new(pool: Arc<PgPool>, procedure: impl Into<String>) -> Result<Self, CursorError> {
        let procedure = procedure.into();
        if !valid_procedure_name(&procedure) {
            return Err(CursorError::InvalidProcedure { name: procedure });
        }
        let statement = format!("SELECT * FROM {procedure}($1)");
        Ok(Self {
            pool,
            procedure,
            statement,
        })
    }

    pub fn procedure(&self) -> &str {
        &self.procedure
    }
}

impl DetailSource for PgProcSource {
    fn fetch<'a>(
        &'a self,
        index_symbol: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Box<dyn RowCursor>, CursorError>> + Send + 'a>> {
        Box::pin(async move {
            let (sender, mut receiver) = mpsc::channel(ROW_CHANNEL_CAPACITY);
            let pool = self.pool.clone();
            let statement = self.statement.clone();
            let symbol = index_symbol.to_string();

            tokio::spawn(async move {
                let mut rows = sqlx::query(&statement).bind(symbol).fetch(pool.as_ref());
                while let Some(outcome) = rows.next().await {
                    let terminal = outcome.is_err();
                    if sender.send(outcome).await.is_err() {
                        debug!("row receiver dropped; stopping the feed");
                        return;
                    }
                    if terminal {
                        return;
                    }
                }
            });

            // Pull the first row eagerly so column metadata is available from
            // construction and acquisition failures surface here, where the
            // caller can still classify them.
            let mut columns = Vec::new();
            let mut pending = None;
            let mut finished = false;
            match receiver.recv().await {
                Some(Ok(row)) => {
                    columns = row
                        .columns()
                        .iter()
                        .map(|column| column.name().to_string())
                        .collect();
                    pending = Some(row);
                }
                Some(Err(error)) => {
                    return Err(CursorError::Stream {
                        message: error.to_string(),
                    });
                }
                None => finished = true,
            }

            Ok(Box::new(PgProcCursor {
                procedure: self.procedure.clone(),
                columns,
                receiver,
                pending,
                current: None,
                finished,
            }) as Box<dyn RowCursor>)
        })
    }
}

/// Single-pass cursor over the procedure's result rows.
pub struct PgProcCursor {
    procedure: String,
    columns: Vec<String>,
    receiver: mpsc::Receiver<Result<PgRow, sqlx::Error>>,
    pending: Option<PgRow>,
    current: Option<PgRow>,
    finished: bool,
}

impl RowCursor for PgProcCursor {
    fn shape_id(&self) -> &str {
        &self.procedure
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
            if let Some(row) = self.pending.take() {
                self.current = Some(row);
                return Ok(true);
            }
            if self.finished {
                self.current = None;
                return Ok(false);
            }
            match self.receiver.recv().await {
                Some(Ok(row)) => {
                    self.current = Some(row);
                    Ok(true)
                }
                Some(Err(error)) => {
                    self.finished = true;
                    self.current = None;
                    Err(CursorError::Stream {
                        message: error.to_string(),
                    })
                }
                None => {
                    self.finished = true;
                    self.current = None;
                    Ok(false)
                }
            }
        })
    }

    fn is_null(&self, ordinal: usize) -> bool {
        let Some(row) = self.current.as_ref() else {
            return true;
        };
        row.try_get_raw(ordinal)
            .map_or(true, |value| value.is_null())
    }

    fn text(&self, ordinal: usize) -> Result<Option<String>, CursorError> {
        let Some(row) = self.current.as_ref() else {
            return Err(CursorError::NoCurrentRow);
        };
        row.try_get::<Option<String>, _>(ordinal)
            .map_err(|error| CursorError::CellDecode {
                ordinal,
                message: error.to_string(),
            })
    }
}

fn valid_procedure_name(name: &str) -> bool {
    if name.split('.').count() > 2 {
        return false;
    }
    name.split('.').all(valid_identifier)
}

fn valid_identifier(segment: &str) -> bool {
    let mut chars = segment.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {}
        _ => return false,
    }
    chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '_')
}
