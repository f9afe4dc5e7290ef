//! Prepared statements and the row cursor built on them.
//!
//! A [`Statement`] records failure as state instead of returning it: preparing,
//! binding and stepping errors all move it to [`StepState::Failed`], after
//! which it produces no more rows. Callers ask [`Statement::failed`] /
//! [`Statement::error`] to tell an exhausted statement from a broken one.

use crate::database::Database;
use crate::error::SqlError;
use crate::monitor::{HookAction, QueryContext, QueryHook, QueryResult};
use crate::monitor::ABORTED_PREFIX;
use crate::row::Values;
use crate::value::Value;
use std::fmt;
use std::iter::FusedIterator;
use std::time::Instant;

/// Where a statement is in its run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepState {
    /// Prepared and bound, not yet stepped.
    Unstarted,
    /// Positioned on a row.
    Row,
    /// Ran to completion.
    Done,
    /// Could not be prepared, bound or stepped.
    Failed,
}

/// A prepared, bound SQLite statement and its cursor state.
pub struct Statement<'db> {
    db: &'db Database,
    sql: String,
    inner: Option<rusqlite::Statement<'db>>,
    columns: Vec<String>,
    state: StepState,
    row: Vec<Option<Value>>,
    error: Option<SqlError>,
    changes: u64,
    last_insert_rowid: Option<i64>,
    rows_seen: usize,
    context: QueryContext,
    started: Instant,
    reported: bool,
}

impl<'db> Statement<'db> {
    pub(crate) fn new(db: &'db Database, sql: String, bindings: Vec<Value>) -> Self {
        let context = QueryContext::new(&sql, bindings.len());
        let mut statement = Self {
            db,
            sql,
            inner: None,
            columns: Vec::new(),
            state: StepState::Unstarted,
            row: Vec::new(),
            error: None,
            changes: 0,
            last_insert_rowid: None,
            rows_seen: 0,
            context,
            started: Instant::now(),
            reported: false,
        };

        if let HookAction::Abort(reason) = db.hooks().before_query(&statement.context) {
            statement.fail(SqlError::Other(format!("{ABORTED_PREFIX}{reason}")));
            return statement;
        }

        match prepare_and_bind(db.connection(), &statement.sql, &bindings) {
            Ok(inner) => {
                statement.columns = inner.column_names().into_iter().map(str::to_string).collect();
                statement.inner = Some(inner);
            }
            Err(err) => statement.fail(err.into()),
        }
        statement
    }

    /// Advance one row. Returns `true` if a row is now available.
    ///
    /// Once the statement is done or failed this keeps returning `false`
    /// without touching the engine.
    pub fn step(&mut self) -> bool {
        if matches!(self.state, StepState::Done | StepState::Failed) {
            return false;
        }
        let column_count = self.columns.len();
        let Some(inner) = self.inner.as_mut() else {
            return false;
        };

        match step_raw(inner, column_count) {
            Ok(Some(row)) => {
                self.row = row;
                self.rows_seen += 1;
                self.state = StepState::Row;
                true
            }
            Ok(None) => {
                self.finish();
                false
            }
            Err(err) => {
                self.fail(err.into());
                false
            }
        }
    }

    /// Advance one row and return it as a column-name map.
    pub fn next_row(&mut self) -> Option<Values> {
        if self.step() { self.values() } else { None }
    }

    /// Step until the statement is done or fails.
    pub fn run(&mut self) -> &mut Self {
        while self.step() {}
        self
    }

    /// First column of the first row. Steps the statement if it has not
    /// produced a row yet.
    pub fn scalar(&mut self) -> Option<Value> {
        if self.state == StepState::Unstarted {
            self.step();
        }
        match self.state {
            StepState::Row => self.row.first().cloned().flatten(),
            _ => None,
        }
    }

    /// The current row as a column-name map.
    pub fn values(&self) -> Option<Values> {
        if self.state != StepState::Row {
            return None;
        }
        Some(
            self.columns
                .iter()
                .cloned()
                .zip(self.row.iter().cloned())
                .collect(),
        )
    }

    /// The current row, positionally. Empty unless positioned on a row.
    pub fn row(&self) -> &[Option<Value>] {
        &self.row
    }

    /// Result column names.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn state(&self) -> StepState {
        self.state
    }

    pub fn failed(&self) -> bool {
        self.state == StepState::Failed
    }

    pub fn error(&self) -> Option<&SqlError> {
        self.error.as_ref()
    }

    /// Rows changed by this statement. Zero until a mutating statement is
    /// done.
    pub fn changes(&self) -> u64 {
        self.changes
    }

    /// Row id assigned by the engine, once a mutating statement is done.
    pub fn last_insert_rowid(&self) -> Option<i64> {
        self.last_insert_rowid
    }

    fn finish(&mut self) {
        self.state = StepState::Done;
        self.row.clear();
        let mutating = self.inner.as_ref().is_some_and(|inner| !inner.readonly());
        let result = if mutating {
            self.changes = self.db.changes();
            self.last_insert_rowid = Some(self.db.last_insert_rowid());
            QueryResult::Affected(self.changes)
        } else {
            QueryResult::Rows(self.rows_seen)
        };
        self.report(result);
    }

    fn fail(&mut self, error: SqlError) {
        #[cfg(feature = "tracing")]
        tracing::warn!(target: "litequery", sql = %self.sql, error = %error, "statement failed");
        self.state = StepState::Failed;
        self.row.clear();
        let result = QueryResult::error(error.to_string());
        self.error = Some(error);
        self.report(result);
    }

    fn report(&mut self, result: QueryResult) {
        if self.reported {
            return;
        }
        self.reported = true;
        self.db
            .hooks()
            .after_query(&self.context, self.started.elapsed(), &result);
    }
}

fn prepare_and_bind<'db>(
    conn: &'db rusqlite::Connection,
    sql: &str,
    bindings: &[Value],
) -> rusqlite::Result<rusqlite::Statement<'db>> {
    let mut stmt = conn.prepare(sql)?;
    let expected = stmt.parameter_count();
    if expected != bindings.len() {
        return Err(rusqlite::Error::InvalidParameterCount(bindings.len(), expected));
    }
    for (i, value) in bindings.iter().enumerate() {
        stmt.raw_bind_parameter(i + 1, value)?;
    }
    Ok(stmt)
}

/// Step `stmt` once and read the row it lands on.
///
/// `rusqlite` only steps through a [`rusqlite::Rows`], and dropping a `Rows`
/// resets its statement back to the first row. The `Rows` made here is
/// therefore forgotten instead of dropped, so the engine-side cursor stays
/// where the step left it. This is sound because a `Rows` owns nothing: it
/// holds a borrow of `stmt` and, after `next`, a borrow-only `Row`. The
/// statement is still reset or finalized through its other paths:
/// `Rows::next` resets it itself on `SQLITE_DONE` and on errors, and dropping
/// the `rusqlite::Statement` finalizes it.
fn step_raw(stmt: &mut rusqlite::Statement<'_>, column_count: usize) -> rusqlite::Result<Option<Vec<Option<Value>>>> {
    let mut rows = stmt.raw_query();
    let outcome = match rows.next() {
        Ok(Some(row)) => (0..column_count)
            .map(|i| row.get_ref(i).map(Value::from_value_ref))
            .collect::<rusqlite::Result<Vec<_>>>()
            .map(Some),
        Ok(None) => Ok(None),
        Err(err) => Err(err),
    };
    std::mem::forget(rows);
    outcome
}

impl Drop for Statement<'_> {
    fn drop(&mut self) {
        // Abandoned statements, stepped or not, still count as finished.
        if matches!(self.state, StepState::Unstarted | StepState::Row) {
            self.report(QueryResult::Rows(self.rows_seen));
        }
    }
}

impl fmt::Debug for Statement<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Statement")
            .field("sql", &self.sql)
            .field("state", &self.state)
            .field("columns", &self.columns)
            .field("error", &self.error)
            .finish()
    }
}

impl<'db> IntoIterator for Statement<'db> {
    type Item = Values;
    type IntoIter = Cursor<'db>;

    fn into_iter(self) -> Cursor<'db> {
        Cursor::new(self)
    }
}

/// Lazy, single-pass iterator over the rows of a [`Statement`].
///
/// The underlying SQLite statement is finalized when the cursor is dropped,
/// exhausted or not.
#[derive(Debug)]
pub struct Cursor<'db> {
    statement: Statement<'db>,
}

impl<'db> Cursor<'db> {
    pub fn new(statement: Statement<'db>) -> Self {
        Self { statement }
    }

    /// The statement being iterated, e.g. to check [`Statement::failed`]
    /// after the cursor stops.
    pub fn statement(&self) -> &Statement<'db> {
        &self.statement
    }

    pub fn into_statement(self) -> Statement<'db> {
        self.statement
    }
}

impl Iterator for Cursor<'_> {
    type Item = Values;

    fn next(&mut self) -> Option<Values> {
        self.statement.next_row()
    }
}

impl FusedIterator for Cursor<'_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitor::{QueryStats, StatsHook};
    use crate::row::ValuesExt;
    use std::sync::Arc;

    fn db() -> Database {
        let db = Database::open_in_memory().unwrap();
        db.execute(
            "CREATE TABLE t (id INTEGER PRIMARY KEY, name TEXT NOT NULL UNIQUE);
             INSERT INTO t (name) VALUES ('a'), ('b'), ('c');",
        )
        .unwrap();
        db
    }

    #[test]
    fn steps_through_rows_then_done() {
        let db = db();
        let mut stmt = db.prepare("SELECT id, name FROM t ORDER BY id", Vec::new());
        assert_eq!(stmt.state(), StepState::Unstarted);
        assert_eq!(stmt.columns(), &["id".to_string(), "name".to_string()]);

        assert!(stmt.step());
        assert_eq!(stmt.row(), &[Some(Value::Integer(1)), Some(Value::Text("a".into()))]);
        assert!(stmt.step());
        assert!(stmt.step());
        assert!(!stmt.step());
        assert_eq!(stmt.state(), StepState::Done);
        assert!(!stmt.failed());
        // Does not restart after completion.
        assert!(!stmt.step());
        assert!(stmt.values().is_none());
    }

    #[test]
    fn binds_values_in_order() {
        let db = db();
        let mut stmt = db.prepare(
            "SELECT name FROM t WHERE id > ? AND name != ?",
            vec![Value::Integer(1), Value::Text("b".into())],
        );
        let row = stmt.next_row().unwrap();
        assert_eq!(row.value("name"), Some(&Value::Text("c".into())));
        assert!(stmt.next_row().is_none());
    }

    #[test]
    fn prepare_error_is_recorded() {
        let db = db();
        let mut stmt = db.prepare("SELECT nope FROM missing", Vec::new());
        assert!(stmt.failed());
        assert!(stmt.error().is_some());
        assert!(!stmt.step());
        assert_eq!(stmt.scalar(), None);
    }

    #[test]
    fn parameter_count_mismatch_fails() {
        let db = db();
        let stmt = db.prepare("SELECT * FROM t WHERE id = ?", Vec::new());
        assert!(stmt.failed());
        assert!(matches!(
            stmt.error(),
            Some(SqlError::Sqlite(rusqlite::Error::InvalidParameterCount(0, 1)))
        ));
    }

    #[test]
    fn run_records_changes_and_rowid() {
        let db = db();
        let mut stmt = db.prepare("INSERT INTO t (name) VALUES (?)", vec![Value::Text("d".into())]);
        assert_eq!(stmt.run().state(), StepState::Done);
        assert_eq!(stmt.changes(), 1);
        assert_eq!(stmt.last_insert_rowid(), Some(4));

        let mut dup = db.prepare("INSERT INTO t (name) VALUES (?)", vec![Value::Text("d".into())]);
        assert!(dup.run().failed());
        assert!(matches!(dup.error(), Some(err) if err.is_constraint_violation()));
        assert_eq!(dup.changes(), 0);
        assert_eq!(dup.last_insert_rowid(), None);
    }

    #[test]
    fn scalar_reads_first_column() {
        let db = db();
        let mut stmt = db.prepare("SELECT count(*), 'x' FROM t", Vec::new());
        assert_eq!(stmt.scalar(), Some(Value::Integer(3)));
        assert_eq!(stmt.scalar(), Some(Value::Integer(3)));
    }

    #[test]
    fn cursor_is_single_pass() {
        let db = db();
        let mut cursor = db.prepare("SELECT name FROM t ORDER BY id", Vec::new()).into_iter();
        let names: Vec<String> = cursor
            .by_ref()
            .filter_map(|row| row.value("name").map(ToString::to_string))
            .collect();
        assert_eq!(names, ["a", "b", "c"]);
        assert!(cursor.next().is_none());
        assert_eq!(cursor.statement().state(), StepState::Done);
    }

    #[test]
    fn hooks_hear_each_statement_once() {
        let stats = Arc::new(StatsHook::new());
        let db = db().with_hook(stats.clone());
        stats.reset();

        {
            let mut cursor = db.prepare("SELECT * FROM t", Vec::new()).into_iter();
            cursor.next();
            // dropped mid-iteration
        }
        db.prepare("UPDATE t SET name = name || '!'", Vec::new()).run();
        db.prepare("SELECT * FROM missing", Vec::new()).run();

        let snapshot = stats.stats();
        assert_eq!(
            snapshot,
            QueryStats {
                total_duration: snapshot.total_duration,
                max_duration: snapshot.max_duration,
                slowest_query: snapshot.slowest_query.clone(),
                total_queries: 3,
                failed_queries: 1,
                select_count: 2,
                update_count: 1,
                rows_returned: 1,
                rows_affected: 3,
                ..QueryStats::default()
            }
        );
    }

    #[test]
    fn unstepped_statement_is_reported_on_drop() {
        let stats = Arc::new(StatsHook::new());
        let db = db().with_hook(stats.clone());
        stats.reset();

        drop(db.prepare("SELECT * FROM t", Vec::new()));
        let stmt = db.prepare("SELECT name FROM t", Vec::new());
        assert_eq!(stats.stats().total_queries, 1);
        drop(stmt);

        let snapshot = stats.stats();
        assert_eq!(snapshot.total_queries, 2);
        assert_eq!(snapshot.select_count, 2);
        assert_eq!(snapshot.rows_returned, 0);
        assert_eq!(snapshot.failed_queries, 0);
    }

    #[test]
    fn long_cursors_keep_their_position_when_interleaved() {
        let db = Database::open_in_memory().unwrap();
        db.execute(
            "CREATE TABLE n (i INTEGER PRIMARY KEY);
             WITH RECURSIVE c(x) AS (SELECT 1 UNION ALL SELECT x + 1 FROM c WHERE x < 500)
             INSERT INTO n (i) SELECT x FROM c;",
        )
        .unwrap();

        let mut up = db.prepare("SELECT i FROM n ORDER BY i", Vec::new());
        let mut down = db.prepare("SELECT i FROM n ORDER BY i DESC", Vec::new());
        let mut seen = Vec::new();
        while up.step() {
            assert!(down.step());
            seen.push((up.row()[0].clone(), down.row()[0].clone()));
        }
        assert!(!down.step());
        assert_eq!(up.state(), StepState::Done);
        assert_eq!(down.state(), StepState::Done);

        assert_eq!(seen.len(), 500);
        for (k, (a, b)) in seen.into_iter().enumerate() {
            let k = k as i64;
            assert_eq!(a, Some(Value::Integer(k + 1)));
            assert_eq!(b, Some(Value::Integer(500 - k)));
        }
    }
}
