use crate::config::DatabaseConfig;
use crate::error::{SqlError, SqlResult};
use crate::monitor::{ABORTED_PREFIX, CompositeHook, HookAction, QueryContext, QueryHook, QueryResult};
use crate::query::Query;
use crate::statement::Statement;
use crate::value::Value;
use rusqlite::Connection;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// A SQLite connection plus the hooks that observe its statements.
///
/// Queries are plain data and take the database explicitly when they run:
///
/// ```
/// use litequery::{Database, Expression};
///
/// # fn main() -> litequery::SqlResult<()> {
/// let db = Database::open_in_memory()?;
/// db.execute("CREATE TABLE users (id INTEGER PRIMARY KEY, email TEXT NOT NULL)")?;
///
/// let users = db.table("users");
/// let email = Expression::<String>::new("email");
/// let id = users.insert(&db, &[email.set("alice@example.com")]);
/// assert_eq!(id, Some(1));
/// assert_eq!(users.count(&db), Some(1));
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Database {
    conn: Connection,
    config: DatabaseConfig,
    hooks: CompositeHook,
}

impl Database {
    /// Open (creating if missing) the database file at `path` with default
    /// configuration.
    pub fn open(path: impl AsRef<Path>) -> SqlResult<Self> {
        Self::open_with_config(path, DatabaseConfig::default())
    }

    /// Open a private in-memory database.
    pub fn open_in_memory() -> SqlResult<Self> {
        Self::open_in_memory_with_config(DatabaseConfig::default())
    }

    pub fn open_with_config(path: impl AsRef<Path>, config: DatabaseConfig) -> SqlResult<Self> {
        config.validate()?;
        let conn = Connection::open_with_flags(path.as_ref(), config.open_flags())?;
        Self::from_connection(conn, config)
    }

    pub fn open_in_memory_with_config(config: DatabaseConfig) -> SqlResult<Self> {
        config.validate()?;
        let conn = Connection::open_in_memory_with_flags(config.open_flags())?;
        Self::from_connection(conn, config)
    }

    fn from_connection(conn: Connection, config: DatabaseConfig) -> SqlResult<Self> {
        if let Some(timeout) = config.busy_timeout {
            conn.busy_timeout(timeout)?;
        }
        conn.pragma_update(None, "foreign_keys", config.foreign_keys)?;
        if let Some(mode) = config.journal_mode {
            let _: String = conn.query_row(&format!("PRAGMA journal_mode = {}", mode.as_str()), [], |row| {
                row.get(0)
            })?;
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(
            target: "litequery",
            read_only = config.read_only,
            foreign_keys = config.foreign_keys,
            "opened database"
        );

        Ok(Self {
            conn,
            config,
            hooks: CompositeHook::new(),
        })
    }

    /// Register a hook that observes every statement run through this
    /// database.
    pub fn with_hook(mut self, hook: impl QueryHook + 'static) -> Self {
        self.hooks = self.hooks.add(hook);
        self
    }

    pub fn with_hook_arc(mut self, hook: Arc<dyn QueryHook>) -> Self {
        self.hooks = self.hooks.add_arc(hook);
        self
    }

    pub fn config(&self) -> &DatabaseConfig {
        &self.config
    }

    /// A query over every row of `name`.
    pub fn table(&self, name: &str) -> Query {
        Query::new(name)
    }

    /// Run one or more `;`-separated statements without bindings. Meant for
    /// schema bootstrap and other one-off SQL.
    pub fn execute(&self, sql: &str) -> SqlResult<()> {
        let context = QueryContext::new(sql, 0);
        if let HookAction::Abort(reason) = self.hooks.before_query(&context) {
            self.hooks
                .after_query(&context, Duration::ZERO, &QueryResult::aborted(&reason));
            return Err(SqlError::Other(format!("{ABORTED_PREFIX}{reason}")));
        }

        let started = Instant::now();
        let outcome = self.conn.execute_batch(sql);
        let result = match &outcome {
            Ok(()) => QueryResult::Affected(self.changes()),
            Err(err) => QueryResult::error(err.to_string()),
        };
        self.hooks.after_query(&context, started.elapsed(), &result);
        outcome.map_err(SqlError::from)
    }

    /// Prepare raw SQL with `bindings` for its `?` placeholders.
    ///
    /// Failures are recorded on the returned statement.
    pub fn prepare(&self, sql: impl Into<String>, bindings: Vec<Value>) -> Statement<'_> {
        Statement::new(self, sql.into(), bindings)
    }

    /// Run `f` inside a transaction: committed if `f` returns `Ok`, rolled
    /// back otherwise.
    pub fn transaction<R>(&self, f: impl FnOnce(&Database) -> SqlResult<R>) -> SqlResult<R> {
        let tx = self.conn.unchecked_transaction()?;
        match f(self) {
            Ok(value) => {
                tx.commit()?;
                Ok(value)
            }
            Err(err) => {
                if let Err(_rollback_err) = tx.rollback() {
                    #[cfg(feature = "tracing")]
                    tracing::warn!(target: "litequery", error = %_rollback_err, "rollback failed");
                }
                Err(err)
            }
        }
    }

    /// Row id of the most recent successful INSERT on this connection.
    pub fn last_insert_rowid(&self) -> i64 {
        self.conn.last_insert_rowid()
    }

    /// Rows changed by the most recent INSERT, UPDATE or DELETE.
    pub fn changes(&self) -> u64 {
        self.conn.changes()
    }

    pub(crate) fn connection(&self) -> &Connection {
        &self.conn
    }

    pub(crate) fn hooks(&self) -> &CompositeHook {
        &self.hooks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::JournalMode;
    use crate::monitor::StatsHook;

    struct ReadOnlyGuard;

    impl QueryHook for ReadOnlyGuard {
        fn before_query(&self, ctx: &QueryContext) -> HookAction {
            if ctx.sql.trim_start().to_ascii_uppercase().starts_with("DROP") {
                HookAction::Abort("DROP is not allowed".to_string())
            } else {
                HookAction::Continue
            }
        }
    }

    #[test]
    fn foreign_keys_follow_config() {
        let db = Database::open_in_memory().unwrap();
        let on: i64 = db
            .connection()
            .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
            .unwrap();
        assert_eq!(on, 1);

        let db = Database::open_in_memory_with_config(DatabaseConfig::new().foreign_keys(false)).unwrap();
        let off: i64 = db
            .connection()
            .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
            .unwrap();
        assert_eq!(off, 0);
    }

    #[test]
    fn invalid_config_is_rejected_before_opening() {
        let config = DatabaseConfig::new().read_only().journal_mode(JournalMode::Wal);
        let err = Database::open_in_memory_with_config(config).unwrap_err();
        assert!(matches!(err, SqlError::Config(_)));
    }

    #[test]
    fn execute_reports_errors() {
        let db = Database::open_in_memory().unwrap();
        let err = db.execute("CREATE TABLE").unwrap_err();
        assert!(matches!(err, SqlError::Sqlite(_)));
    }

    #[test]
    fn hooks_can_abort_execute() {
        let stats = Arc::new(StatsHook::new());
        let db = Database::open_in_memory()
            .unwrap()
            .with_hook(ReadOnlyGuard)
            .with_hook_arc(stats.clone());
        db.execute("CREATE TABLE t (id INTEGER PRIMARY KEY)").unwrap();

        let err = db.execute("DROP TABLE t").unwrap_err();
        assert!(err.to_string().contains("DROP is not allowed"));
        let snapshot = stats.stats();
        assert_eq!(snapshot.total_queries, 2);
        assert_eq!(snapshot.aborted_queries, 1);

        // The table survived.
        let mut stmt = db.prepare("SELECT count(*) FROM t", Vec::new());
        assert_eq!(stmt.scalar(), Some(Value::Integer(0)));
    }

    #[test]
    fn transaction_commits_or_rolls_back() {
        let db = Database::open_in_memory().unwrap();
        db.execute("CREATE TABLE t (id INTEGER PRIMARY KEY)").unwrap();

        db.transaction(|db| db.execute("INSERT INTO t (id) VALUES (1)")).unwrap();
        let failed: SqlResult<()> = db.transaction(|db| {
            db.execute("INSERT INTO t (id) VALUES (2)")?;
            Err(SqlError::Other("give up".to_string()))
        });
        assert!(failed.is_err());

        let mut stmt = db.prepare("SELECT count(*) FROM t", Vec::new());
        assert_eq!(stmt.scalar(), Some(Value::Integer(1)));
    }
}
