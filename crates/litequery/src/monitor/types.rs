use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// The type of SQL operation being performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryType {
    /// SELECT query
    Select,
    /// INSERT statement
    Insert,
    /// UPDATE statement
    Update,
    /// DELETE statement
    Delete,
    /// Other SQL (e.g., DDL, PRAGMA)
    Other,
}

impl QueryType {
    /// Detect query type from the leading keyword of a SQL string.
    pub fn from_sql(sql: &str) -> Self {
        let keyword = sql
            .trim_start()
            .split(|c: char| !c.is_ascii_alphabetic())
            .next()
            .unwrap_or("");

        if keyword.eq_ignore_ascii_case("SELECT") {
            QueryType::Select
        } else if keyword.eq_ignore_ascii_case("INSERT") || keyword.eq_ignore_ascii_case("REPLACE")
        {
            QueryType::Insert
        } else if keyword.eq_ignore_ascii_case("UPDATE") {
            QueryType::Update
        } else if keyword.eq_ignore_ascii_case("DELETE") {
            QueryType::Delete
        } else {
            QueryType::Other
        }
    }
}

/// Context information about the statement being executed.
#[derive(Debug, Clone)]
pub struct QueryContext {
    /// The SQL text handed to SQLite.
    pub sql: String,
    /// Number of bound parameters.
    pub param_count: usize,
    /// Detected query type.
    pub query_type: QueryType,
}

impl QueryContext {
    /// Create a new query context.
    pub fn new(sql: &str, param_count: usize) -> Self {
        Self {
            sql: sql.to_string(),
            param_count,
            query_type: QueryType::from_sql(sql),
        }
    }
}

/// Prefix of the error message recorded when a hook aborts a statement.
pub(crate) const ABORTED_PREFIX: &str = "aborted by hook: ";

/// Maximum length for error messages in `QueryResult::Error`.
const MAX_ERROR_LEN: usize = 512;

/// Outcome of a statement for monitoring purposes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryResult {
    /// Statement produced rows.
    Rows(usize),
    /// Statement changed rows (for mutations).
    Affected(u64),
    /// Statement failed with an error (truncated to 512 bytes).
    Error(String),
}

impl QueryResult {
    /// Create an error result, truncating the message to avoid monitoring data explosion.
    pub fn error(msg: String) -> Self {
        if msg.len() > MAX_ERROR_LEN {
            let truncated = super::truncate_sql_bytes(&msg, MAX_ERROR_LEN);
            Self::Error(format!("{truncated}..."))
        } else {
            Self::Error(msg)
        }
    }

    /// Error result for a statement a hook refused to run.
    pub fn aborted(reason: &str) -> Self {
        Self::error(format!("{ABORTED_PREFIX}{reason}"))
    }

    /// Whether the statement failed.
    pub fn is_error(&self) -> bool {
        matches!(self, QueryResult::Error(_))
    }
}

impl fmt::Display for QueryResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryResult::Rows(n) => write!(f, "{n} rows"),
            QueryResult::Affected(n) => write!(f, "{n} affected"),
            QueryResult::Error(e) => write!(f, "error: {e}"),
        }
    }
}

/// Action to take after a hook inspects a statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HookAction {
    /// Run the statement.
    Continue,
    /// Do not run the statement; it is marked as failed with this reason.
    Abort(String),
}

/// Trait for hooking into the statement lifecycle.
///
/// Hooks run synchronously on the calling thread.
pub trait QueryHook: Send + Sync {
    /// Called before a statement is prepared.
    ///
    /// Return `HookAction::Abort` to keep it from running.
    fn before_query(&self, ctx: &QueryContext) -> HookAction {
        let _ = ctx;
        HookAction::Continue
    }

    /// Called once per statement: when it is exhausted, when it fails, or
    /// when it is dropped before finishing (including never stepped), in
    /// which case the rows read so far are reported. Aborted statements are
    /// reported here too, with [`QueryResult::aborted`].
    fn after_query(&self, _ctx: &QueryContext, _duration: Duration, _result: &QueryResult) {}
}

impl<H: QueryHook + ?Sized> QueryHook for Arc<H> {
    fn before_query(&self, ctx: &QueryContext) -> HookAction {
        (**self).before_query(ctx)
    }

    fn after_query(&self, ctx: &QueryContext, duration: Duration, result: &QueryResult) {
        (**self).after_query(ctx, duration, result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_query_type() {
        assert_eq!(QueryType::from_sql("SELECT * FROM t"), QueryType::Select);
        assert_eq!(QueryType::from_sql("  insert INTO t (a) VALUES (?)"), QueryType::Insert);
        assert_eq!(QueryType::from_sql("UPDATE t SET a = ?"), QueryType::Update);
        assert_eq!(QueryType::from_sql("DELETE FROM t"), QueryType::Delete);
        assert_eq!(QueryType::from_sql("CREATE TABLE t (a)"), QueryType::Other);
        assert_eq!(QueryType::from_sql(""), QueryType::Other);
    }

    #[test]
    fn error_result_is_truncated() {
        let long = "x".repeat(MAX_ERROR_LEN + 10);
        let QueryResult::Error(msg) = QueryResult::error(long) else {
            panic!("expected error result");
        };
        assert_eq!(msg.len(), MAX_ERROR_LEN + 3);
        assert!(msg.ends_with("..."));
    }
}
