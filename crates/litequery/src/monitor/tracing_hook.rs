use super::truncate_sql_bytes;
use super::types::{HookAction, QueryContext, QueryHook, QueryResult};
use std::time::Duration;
use tracing::Level;

/// A `tracing`-based hook that emits the SQL handed to SQLite and, once the
/// statement finishes, its outcome.
///
/// Events use target `litequery.sql`. Failures are always emitted at `WARN`.
///
/// Enable via the crate feature: `litequery = { features = ["tracing"] }`.
#[derive(Debug, Clone)]
pub struct TracingSqlHook {
    /// Tracing event level to emit at.
    pub level: Level,
    /// Truncate long SQL strings (in bytes). `None` means no truncation.
    pub max_sql_length: Option<usize>,
}

impl Default for TracingSqlHook {
    fn default() -> Self {
        Self {
            level: Level::DEBUG,
            max_sql_length: Some(200),
        }
    }
}

/// Dispatch a tracing event at a runtime-determined level.
macro_rules! emit_at_level {
    ($level:expr, $($field:tt)*) => {
        match $level {
            Level::ERROR => tracing::error!($($field)*),
            Level::WARN  => tracing::warn!($($field)*),
            Level::INFO  => tracing::info!($($field)*),
            Level::DEBUG => tracing::debug!($($field)*),
            Level::TRACE => tracing::trace!($($field)*),
        }
    };
}

impl TracingSqlHook {
    /// Create a new hook with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the tracing event level.
    pub fn level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Set maximum SQL length to display.
    pub fn max_sql_length(mut self, len: usize) -> Self {
        self.max_sql_length = Some(len);
        self
    }

    /// Disable SQL truncation.
    pub fn no_truncate(mut self) -> Self {
        self.max_sql_length = None;
        self
    }

    fn truncate_sql(&self, sql: &str) -> String {
        match self.max_sql_length {
            Some(max) if sql.len() > max => format!("{}...", truncate_sql_bytes(sql, max)),
            _ => sql.to_string(),
        }
    }
}

impl QueryHook for TracingSqlHook {
    fn before_query(&self, ctx: &QueryContext) -> HookAction {
        let sql = self.truncate_sql(&ctx.sql);
        emit_at_level!(
            self.level,
            target: "litequery.sql",
            query_type = ?ctx.query_type,
            param_count = ctx.param_count,
            sql = %sql,
            "prepare"
        );
        HookAction::Continue
    }

    fn after_query(&self, ctx: &QueryContext, duration: Duration, result: &QueryResult) {
        let sql = self.truncate_sql(&ctx.sql);
        if let QueryResult::Error(error) = result {
            tracing::warn!(
                target: "litequery.sql",
                query_type = ?ctx.query_type,
                ?duration,
                error = %error,
                sql = %sql,
                "statement failed"
            );
            return;
        }
        emit_at_level!(
            self.level,
            target: "litequery.sql",
            query_type = ?ctx.query_type,
            ?duration,
            result = %result,
            sql = %sql,
            "finished"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncates_long_sql() {
        let hook = TracingSqlHook::new().max_sql_length(6);
        assert_eq!(hook.truncate_sql("SELECT * FROM t"), "SELECT...");
        assert_eq!(hook.no_truncate().truncate_sql("SELECT * FROM t"), "SELECT * FROM t");
    }

    #[test]
    fn never_aborts() {
        let hook = TracingSqlHook::new().level(Level::TRACE);
        let ctx = QueryContext::new("DELETE FROM t", 0);
        assert_eq!(hook.before_query(&ctx), HookAction::Continue);
        hook.after_query(&ctx, Duration::ZERO, &QueryResult::Affected(2));
    }
}
