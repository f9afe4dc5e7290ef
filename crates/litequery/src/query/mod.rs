//! Immutable, chainable queries over a single table.
//!
//! Every builder method borrows the query and returns a modified copy, so a
//! base query can be shared and refined freely:
//!
//! ```
//! use litequery::{Database, Expression};
//!
//! # fn main() -> litequery::SqlResult<()> {
//! let db = Database::open_in_memory()?;
//! let users = db.table("users");
//! let age = Expression::<i64>::new("age");
//! let name = Expression::<String>::new("name");
//!
//! let adults = users.filter(age.gte(18));
//! let page = adults.order(&[&name.asc()]).limit_offset(10, 20);
//!
//! assert_eq!(users.to_sql().sql(), "SELECT * FROM users");
//! assert_eq!(
//!     page.to_sql().sql(),
//!     "SELECT * FROM users WHERE (age >= ?) ORDER BY name ASC LIMIT 10 OFFSET 20"
//! );
//! # Ok(())
//! # }
//! ```
//!
//! Nothing touches the database until an execution method (`iter`, `first`,
//! `insert`, `count`, ...) is called with a [`Database`](crate::Database).

mod compile;
mod exec;

use crate::expr::{Expressible, Expression, IntoExpression, join};
use std::fmt;

/// Kind of JOIN between two tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinType {
    Cross,
    Inner,
    LeftOuter,
}

impl JoinType {
    pub fn as_sql(self) -> &'static str {
        match self {
            JoinType::Cross => "CROSS",
            JoinType::Inner => "INNER",
            JoinType::LeftOuter => "LEFT OUTER",
        }
    }
}

impl fmt::Display for JoinType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Limit {
    count: i64,
    offset: Option<i64>,
}

/// A SELECT/INSERT/UPDATE/DELETE over one table, described as data.
#[derive(Debug, Clone)]
pub struct Query {
    table_name: String,
    columns: Vec<Expression<()>>,
    joins: Vec<Expression<()>>,
    filter: Option<Expression<bool>>,
    group: Option<Expression<()>>,
    order: Vec<Expression<()>>,
    limit: Option<Limit>,
}

impl Query {
    /// A query over every row and column of `table_name`.
    pub fn new(table_name: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            columns: Vec::new(),
            joins: Vec::new(),
            filter: None,
            group: None,
            order: Vec::new(),
            limit: None,
        }
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    /// The accumulated WHERE predicate, if any.
    pub fn predicate(&self) -> Option<&Expression<bool>> {
        self.filter.as_ref()
    }

    /// Select these result columns instead of the current ones.
    pub fn select(&self, columns: &[&dyn Expressible]) -> Query {
        let mut query = self.clone();
        query.columns = columns.iter().map(|column| column.expression()).collect();
        query
    }

    /// Select `*`.
    pub fn select_star(&self) -> Query {
        let mut query = self.clone();
        query.columns.clear();
        query
    }

    /// `INNER JOIN table ON on`.
    pub fn join(&self, table: &Query, on: impl IntoExpression<bool>) -> Query {
        self.join_with(JoinType::Inner, table, on)
    }

    /// Join `table`. Its own filter, if any, is ANDed into the ON condition.
    pub fn join_with(&self, kind: JoinType, table: &Query, on: impl IntoExpression<bool>) -> Query {
        let on = match &table.filter {
            Some(filter) => on.into_expression().and(filter),
            None => on.into_expression(),
        };
        let clause = join(
            " ",
            [
                Expression::<()>::new(format!("{kind} JOIN {} ON", table.table_name)),
                on.cast(),
            ],
        );
        let mut query = self.clone();
        query.joins.push(clause);
        query
    }

    /// Narrow the rows. Repeated filters are ANDed together.
    pub fn filter(&self, predicate: impl IntoExpression<bool>) -> Query {
        let predicate = predicate.into_expression();
        let mut query = self.clone();
        query.filter = Some(match &self.filter {
            Some(existing) => existing.and(predicate),
            None => predicate,
        });
        query
    }

    /// `GROUP BY by`, replacing any previous grouping.
    pub fn group(&self, by: &[&dyn Expressible]) -> Query {
        let mut query = self.clone();
        query.group = Some(join(" ", [Expression::new("GROUP BY"), join(", ", by)]));
        query
    }

    /// `GROUP BY by HAVING having`, replacing any previous grouping.
    pub fn group_having(&self, by: &[&dyn Expressible], having: impl IntoExpression<bool>) -> Query {
        let mut query = self.clone();
        query.group = Some(join(
            " ",
            [
                Expression::new("GROUP BY"),
                join(", ", by),
                Expression::new("HAVING"),
                having.into_expression().cast(),
            ],
        ));
        query
    }

    /// `ORDER BY by`, replacing any previous ordering.
    pub fn order(&self, by: &[&dyn Expressible]) -> Query {
        let mut query = self.clone();
        query.order = by.iter().map(|term| term.expression()).collect();
        query
    }

    /// `LIMIT count`, or no limit for `None`. Clears any offset.
    pub fn limit(&self, count: impl Into<Option<i64>>) -> Query {
        let mut query = self.clone();
        query.limit = count.into().map(|count| Limit { count, offset: None });
        query
    }

    /// `LIMIT count OFFSET offset`.
    pub fn limit_offset(&self, count: i64, offset: i64) -> Query {
        let mut query = self.clone();
        query.limit = Some(Limit {
            count,
            offset: Some(offset),
        });
        query
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_sql().sql())
    }
}
