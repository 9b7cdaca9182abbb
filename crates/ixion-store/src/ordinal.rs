//! Cached column-name-to-ordinal resolution.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use tokio::sync::RwLock;

use crate::cursor::{CursorError, RowCursor};

/// Shapes narrower than this resolve by scanning column names directly; a
/// scan is cheaper than the provider's lookup machinery for small layouts.
pub const LINEAR_SCAN_MAX_COLUMNS: usize = 20;

/// Process-shareable cache of column ordinals keyed by row shape and
/// lowercased column name.
///
/// Entries are computed on first resolution and never invalidated; absent
/// columns are cached as `None` so repeated misses stay O(1). Unbounded
/// growth is acceptable because shape cardinality is small and fixed per
/// deployment.
#[derive(Debug, Default)]
pub struct OrdinalCache {
    entries: RwLock<HashMap<(String, String), Option<usize>>>,
}

impl OrdinalCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cache shared by every client in the process.
    pub fn shared() -> Arc<OrdinalCache> {
        static SHARED: OnceLock<Arc<OrdinalCache>> = OnceLock::new();
        SHARED.get_or_init(|| Arc::new(OrdinalCache::new())).clone()
    }

    /// Resolve `name` to an ordinal for the cursor's shape, or `None` when
    /// the column is absent.
    ///
    /// The answer is stable: every call after the first for the same
    /// (shape, name) pair returns the cached value. Concurrent first
    /// resolutions of the same key are harmless; both compute the same
    /// answer.
    pub async fn resolve(&self, cursor: &dyn RowCursor, name: &str) -> Option<usize> {
        let key = (cursor.shape_id().to_string(), name.to_ascii_lowercase());
        if let Some(cached) = self.entries.read().await.get(&key) {
            return *cached;
        }

        match lookup(cursor, name) {
            Ok(resolved) => {
                self.entries.write().await.insert(key, resolved);
                resolved
            }
            // Shape metadata was unavailable; leave the key uncached so a
            // later resolution can still succeed.
            Err(_) => None,
        }
    }

    /// Number of resolved (shape, name) pairs.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}

fn lookup(cursor: &dyn RowCursor, name: &str) -> Result<Option<usize>, CursorError> {
    if cursor.column_count() < LINEAR_SCAN_MAX_COLUMNS {
        Ok((0..cursor.column_count()).find(|&ordinal| {
            cursor
                .column_name(ordinal)
                .is_some_and(|candidate| candidate.eq_ignore_ascii_case(name))
        }))
    } else {
        match cursor.ordinal_of(name) {
            Ok(ordinal) => Ok(Some(ordinal)),
            Err(CursorError::ColumnNotFound { .. }) => Ok(None),
            Err(other) => Err(other),
        }
    }
}
