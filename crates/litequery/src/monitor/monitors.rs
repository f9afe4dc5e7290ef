use super::types::{ABORTED_PREFIX, HookAction, QueryContext, QueryHook, QueryResult, QueryType};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// A hook that tracks statement statistics.
#[derive(Debug, Default)]
pub struct StatsHook {
    total_queries: AtomicU64,
    failed_queries: AtomicU64,
    aborted_queries: AtomicU64,
    total_duration_nanos: AtomicU64,
    select_count: AtomicU64,
    insert_count: AtomicU64,
    update_count: AtomicU64,
    delete_count: AtomicU64,
    rows_returned: AtomicU64,
    rows_affected: AtomicU64,
    max_duration_nanos: AtomicU64,
    slowest_query: Mutex<Option<String>>,
}

/// Collected statement statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryStats {
    /// Total number of statements that reached a terminal state.
    pub total_queries: u64,
    /// Number of statements that failed.
    pub failed_queries: u64,
    /// Number of failed statements that a hook refused to run.
    pub aborted_queries: u64,
    /// Total execution time.
    pub total_duration: Duration,
    /// Number of SELECT statements.
    pub select_count: u64,
    /// Number of INSERT statements.
    pub insert_count: u64,
    /// Number of UPDATE statements.
    pub update_count: u64,
    /// Number of DELETE statements.
    pub delete_count: u64,
    /// Rows produced by queries.
    pub rows_returned: u64,
    /// Rows changed by mutations.
    pub rows_affected: u64,
    /// Slowest statement duration.
    pub max_duration: Duration,
    /// Slowest statement SQL.
    pub slowest_query: Option<String>,
}

impl StatsHook {
    /// Create a new stats hook.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a snapshot of current statistics.
    pub fn stats(&self) -> QueryStats {
        QueryStats {
            total_queries: self.total_queries.load(Ordering::Relaxed),
            failed_queries: self.failed_queries.load(Ordering::Relaxed),
            aborted_queries: self.aborted_queries.load(Ordering::Relaxed),
            total_duration: Duration::from_nanos(self.total_duration_nanos.load(Ordering::Relaxed)),
            select_count: self.select_count.load(Ordering::Relaxed),
            insert_count: self.insert_count.load(Ordering::Relaxed),
            update_count: self.update_count.load(Ordering::Relaxed),
            delete_count: self.delete_count.load(Ordering::Relaxed),
            rows_returned: self.rows_returned.load(Ordering::Relaxed),
            rows_affected: self.rows_affected.load(Ordering::Relaxed),
            max_duration: Duration::from_nanos(self.max_duration_nanos.load(Ordering::Relaxed)),
            slowest_query: self
                .slowest_query
                .lock()
                .map(|slowest| slowest.clone())
                .unwrap_or_default(),
        }
    }

    /// Reset all statistics.
    pub fn reset(&self) {
        for counter in [
            &self.total_queries,
            &self.failed_queries,
            &self.aborted_queries,
            &self.total_duration_nanos,
            &self.select_count,
            &self.insert_count,
            &self.update_count,
            &self.delete_count,
            &self.rows_returned,
            &self.rows_affected,
            &self.max_duration_nanos,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
        if let Ok(mut slowest) = self.slowest_query.lock() {
            *slowest = None;
        }
    }
}

impl QueryHook for StatsHook {
    fn after_query(&self, ctx: &QueryContext, duration: Duration, result: &QueryResult) {
        self.total_queries.fetch_add(1, Ordering::Relaxed);

        let nanos = u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX);
        self.total_duration_nanos.fetch_add(nanos, Ordering::Relaxed);

        match ctx.query_type {
            QueryType::Select => self.select_count.fetch_add(1, Ordering::Relaxed),
            QueryType::Insert => self.insert_count.fetch_add(1, Ordering::Relaxed),
            QueryType::Update => self.update_count.fetch_add(1, Ordering::Relaxed),
            QueryType::Delete => self.delete_count.fetch_add(1, Ordering::Relaxed),
            QueryType::Other => 0,
        };

        match result {
            QueryResult::Rows(n) => {
                self.rows_returned.fetch_add(*n as u64, Ordering::Relaxed);
            }
            QueryResult::Affected(n) => {
                self.rows_affected.fetch_add(*n, Ordering::Relaxed);
            }
            QueryResult::Error(msg) => {
                self.failed_queries.fetch_add(1, Ordering::Relaxed);
                if msg.starts_with(ABORTED_PREFIX) {
                    self.aborted_queries.fetch_add(1, Ordering::Relaxed);
                }
            }
        }

        let previous_max = self.max_duration_nanos.fetch_max(nanos, Ordering::Relaxed);
        if nanos > previous_max {
            if let Ok(mut slowest) = self.slowest_query.lock() {
                *slowest = Some(ctx.sql.clone());
            }
        }
    }
}

/// Runs several hooks in registration order.
///
/// `before_query` stops at the first hook that aborts.
#[derive(Clone, Default)]
pub struct CompositeHook {
    hooks: Vec<Arc<dyn QueryHook>>,
}

impl CompositeHook {
    /// Create an empty composite.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a hook.
    pub fn add(mut self, hook: impl QueryHook + 'static) -> Self {
        self.hooks.push(Arc::new(hook));
        self
    }

    /// Add a shared hook.
    pub fn add_arc(mut self, hook: Arc<dyn QueryHook>) -> Self {
        self.hooks.push(hook);
        self
    }

    /// Number of registered hooks.
    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    /// Whether no hooks are registered.
    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }
}

impl std::fmt::Debug for CompositeHook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompositeHook")
            .field("hooks", &self.hooks.len())
            .finish()
    }
}

impl QueryHook for CompositeHook {
    fn before_query(&self, ctx: &QueryContext) -> HookAction {
        for hook in &self.hooks {
            if let action @ HookAction::Abort(_) = hook.before_query(ctx) {
                return action;
            }
        }
        HookAction::Continue
    }

    fn after_query(&self, ctx: &QueryContext, duration: Duration, result: &QueryResult) {
        for hook in &self.hooks {
            hook.after_query(ctx, duration, result);
        }
    }
}
