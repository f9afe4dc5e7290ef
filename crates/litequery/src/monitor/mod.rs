//! Query hooks for SQL execution.
//!
//! Every statement prepared through a [`Database`](crate::Database) is announced
//! to the registered [`QueryHook`]s before it runs, and again once it reaches a
//! terminal state (exhausted or failed). This module provides:
//! - the hook trait and its context/result types
//! - [`StatsHook`] for counters and timings
//! - [`CompositeHook`] to fan out to several hooks
//! - [`TracingSqlHook`] (crate feature `tracing`) for structured SQL logs
//!
//! # Example
//!
//! ```rust
//! use litequery::{Database, monitor::StatsHook};
//! use std::sync::Arc;
//!
//! # fn main() -> litequery::SqlResult<()> {
//! let stats = Arc::new(StatsHook::new());
//! let db = Database::open_in_memory()?.with_hook(stats.clone());
//! db.execute("CREATE TABLE t (id INTEGER PRIMARY KEY)")?;
//! assert_eq!(stats.stats().total_queries, 1);
//! # Ok(())
//! # }
//! ```

mod monitors;
mod types;

#[cfg(feature = "tracing")]
mod tracing_hook;

pub use monitors::{CompositeHook, QueryStats, StatsHook};
pub use types::{HookAction, QueryContext, QueryHook, QueryResult, QueryType};
pub(crate) use types::ABORTED_PREFIX;

#[cfg(feature = "tracing")]
pub use tracing_hook::TracingSqlHook;

pub(crate) fn truncate_sql_bytes(sql: &str, max_bytes: usize) -> &str {
    if sql.len() <= max_bytes {
        return sql;
    }
    let mut end = max_bytes;
    while end > 0 && !sql.is_char_boundary(end) {
        end -= 1;
    }
    &sql[..end]
}
