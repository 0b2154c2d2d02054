// ── Shared override-table snapshot store ──
//
// Readers load the current snapshot wait-free; the refresh task replaces
// it wholesale. A query therefore observes either a fully-old or a
// fully-new table, never a partial one, and never blocks on a refresh.

use std::sync::Arc;

use arc_swap::ArcSwap;
use chrono::{DateTime, Utc};
use tokio::sync::watch;

use crate::table::OverrideTable;

/// Handle to the active override-table snapshot.
///
/// Cheaply cloneable; all clones share the same snapshot slot.
#[derive(Clone)]
pub struct OverrideStore {
    inner: Arc<StoreInner>,
}

struct StoreInner {
    table: ArcSwap<OverrideTable>,
    last_refresh: watch::Sender<Option<DateTime<Utc>>>,
}

impl OverrideStore {
    /// Create a store holding an empty table; queries miss until the
    /// first successful refresh publishes real data.
    pub fn new() -> Self {
        let (last_refresh, _) = watch::channel(None);
        Self {
            inner: Arc::new(StoreInner {
                table: ArcSwap::from_pointee(OverrideTable::default()),
                last_refresh,
            }),
        }
    }

    /// The current snapshot. Callers hold the returned `Arc` for the
    /// duration of one query; a concurrent publish does not affect it.
    pub fn load(&self) -> Arc<OverrideTable> {
        self.inner.table.load_full()
    }

    /// Atomically replace the active snapshot and stamp the refresh time.
    pub fn publish(&self, table: OverrideTable) {
        self.inner.table.store(Arc::new(table));
        let _ = self.inner.last_refresh.send(Some(Utc::now()));
    }

    /// When the last successful refresh happened, if ever.
    pub fn last_refresh(&self) -> Option<DateTime<Utc>> {
        *self.inner.last_refresh.borrow()
    }

    /// How long ago the last successful refresh was, or `None` if data
    /// has never been published.
    pub fn data_age(&self) -> Option<chrono::Duration> {
        self.last_refresh().map(|t| Utc::now() - t)
    }
}

impl Default for OverrideStore {
    fn default() -> Self {
        Self::new()
    }
}
