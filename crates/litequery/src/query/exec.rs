//! Running queries against a [`Database`].
//!
//! Engine failures never surface as `Err` here. Mutations report them through
//! their return value (`None` / `0`) and the statement's
//! [`failed`](Statement::failed) flag. Reads produce no rows, and aggregates
//! return `None`, which an empty table never does for `count` or `total`.

use super::{Limit, Query};
use crate::database::Database;
use crate::expr::{Expression, Setter, func};
use crate::row::Values;
use crate::statement::{Cursor, Statement};
use crate::value::{Datatype, Number};

fn prepare_expression<'db>(db: &'db Database, expression: Expression<()>) -> Statement<'db> {
    let (sql, bindings) = expression.into_parts();
    db.prepare(sql, bindings)
}

impl Query {
    /// Prepare this query's SELECT without stepping it.
    pub fn prepare<'db>(&self, db: &'db Database) -> Statement<'db> {
        prepare_expression(db, self.compile_select())
    }

    /// Lazily iterate the rows of this query.
    pub fn iter<'db>(&self, db: &'db Database) -> Cursor<'db> {
        self.prepare(db).into_iter()
    }

    /// The first row, or `None` if there are none.
    ///
    /// Runs with `LIMIT 1`, keeping any offset already set.
    pub fn first(&self, db: &Database) -> Option<Values> {
        let mut query = self.clone();
        query.limit = Some(Limit {
            count: 1,
            offset: self.limit.and_then(|limit| limit.offset),
        });
        query.iter(db).next()
    }

    pub fn is_empty(&self, db: &Database) -> bool {
        self.first(db).is_none()
    }

    /// Run an INSERT of `values` and return the statement.
    pub fn insert_statement<'db>(&self, db: &'db Database, values: &[Setter]) -> Statement<'db> {
        let mut statement = prepare_expression(db, self.compile_insert(values));
        statement.run();
        statement
    }

    /// Insert a row and return its row id, or `None` if the insert failed.
    pub fn insert(&self, db: &Database, values: &[Setter]) -> Option<i64> {
        self.insert_with_statement(db, values).0
    }

    pub fn insert_with_statement<'db>(&self, db: &'db Database, values: &[Setter]) -> (Option<i64>, Statement<'db>) {
        let statement = self.insert_statement(db, values);
        let id = if statement.failed() {
            None
        } else {
            statement.last_insert_rowid()
        };
        (id, statement)
    }

    /// Run an UPDATE of every filtered row and return the statement.
    pub fn update_statement<'db>(&self, db: &'db Database, values: &[Setter]) -> Statement<'db> {
        let mut statement = prepare_expression(db, self.compile_update(values));
        statement.run();
        statement
    }

    /// Update every filtered row; returns the number changed, 0 on failure.
    pub fn update(&self, db: &Database, values: &[Setter]) -> u64 {
        self.update_with_statement(db, values).0
    }

    pub fn update_with_statement<'db>(&self, db: &'db Database, values: &[Setter]) -> (u64, Statement<'db>) {
        let statement = self.update_statement(db, values);
        (changes_of(&statement), statement)
    }

    /// Run a DELETE of every filtered row and return the statement.
    pub fn delete_statement<'db>(&self, db: &'db Database) -> Statement<'db> {
        let mut statement = prepare_expression(db, self.compile_delete());
        statement.run();
        statement
    }

    /// Delete every filtered row; returns the number removed, 0 on failure.
    pub fn delete(&self, db: &Database) -> u64 {
        self.delete_with_statement(db).0
    }

    pub fn delete_with_statement<'db>(&self, db: &'db Database) -> (u64, Statement<'db>) {
        let statement = self.delete_statement(db);
        (changes_of(&statement), statement)
    }

    /// `count(*)` over the filtered rows. `Some(0)` over no rows, `None` if
    /// the query failed.
    pub fn count(&self, db: &Database) -> Option<i64> {
        self.calculate(db, func::count_star())
    }

    /// Number of non-NULL values of `column`, `None` if the query failed.
    pub fn count_column<T>(&self, db: &Database, column: &Expression<T>) -> Option<i64> {
        self.calculate(db, func::count(column))
    }

    pub fn max<T: Datatype>(&self, db: &Database, column: &Expression<T>) -> Option<T> {
        self.calculate(db, func::max(column))
    }

    pub fn min<T: Datatype>(&self, db: &Database, column: &Expression<T>) -> Option<T> {
        self.calculate(db, func::min(column))
    }

    /// Mean of `column`, `None` over no rows.
    pub fn average<T: Number>(&self, db: &Database, column: &Expression<T>) -> Option<f64> {
        self.calculate(db, func::avg(column))
    }

    /// Sum of `column`, `None` over no rows.
    pub fn sum<T: Number>(&self, db: &Database, column: &Expression<T>) -> Option<T> {
        self.calculate(db, func::sum(column))
    }

    /// Sum of `column` as a float. `Some(0.0)` over no rows, `None` if the
    /// query failed.
    pub fn total<T: Number>(&self, db: &Database, column: &Expression<T>) -> Option<f64> {
        self.calculate(db, func::total(column))
    }

    /// Select just `expression` and read it back from the first row.
    ///
    /// `None` when the query fails, produces no row, or the value does not
    /// decode as `T`.
    pub fn calculate<T: Datatype>(&self, db: &Database, expression: Expression<T>) -> Option<T> {
        let mut statement = self.select(&[&expression]).prepare(db);
        statement.scalar().and_then(|value| T::from_value(&value))
    }
}

fn changes_of(statement: &Statement<'_>) -> u64 {
    if statement.failed() { 0 } else { statement.changes() }
}
