//! # litequery
//!
//! A typed, immutable query builder and statement compiler for SQLite.
//!
//! ## Features
//!
//! - **Typed expressions**: `Expression<T>` carries SQL text, its bound values and
//!   the Rust type it evaluates to
//! - **Immutable queries**: every builder call returns a new `Query`; bases can be
//!   shared and refined without surprises
//! - **Aligned bindings**: placeholders and bound values always line up, however
//!   fragments are combined
//! - **Failure as data**: engine errors land on the `Statement`, and mutations
//!   return `None` / `0` instead of panicking or erroring
//! - **Query monitoring**: hooks observe every statement (stats, `tracing` logs)
//!
//! ## Example
//!
//! ```
//! use litequery::{Database, Expression, ValuesExt};
//!
//! # fn main() -> litequery::SqlResult<()> {
//! let db = Database::open_in_memory()?;
//! db.execute(
//!     "CREATE TABLE items (id INTEGER PRIMARY KEY, name TEXT NOT NULL, qty INTEGER NOT NULL)",
//! )?;
//!
//! let items = db.table("items");
//! let id = Expression::<i64>::new("id");
//! let name = Expression::<String>::new("name");
//! let qty = Expression::<i64>::new("qty");
//!
//! items.insert(&db, &[name.set("milk"), qty.set(2)]);
//! items.insert(&db, &[name.set("eggs"), qty.set(12)]);
//!
//! // UPDATE items SET qty = (qty + ?) WHERE (name = ?)
//! assert_eq!(items.filter(name.eq("milk")).update(&db, &[qty.set(&qty + 1)]), 1);
//!
//! let plenty = items.filter(qty.gte(3)).order(&[&id.asc()]);
//! let names: Vec<String> = plenty.iter(&db).filter_map(|row| row.column(&name)).collect();
//! assert_eq!(names, ["milk", "eggs"]);
//! assert_eq!(items.sum(&db, &qty), Some(15));
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod database;
pub mod error;
pub mod expr;
pub mod monitor;
pub mod query;
pub mod row;
pub mod statement;
pub mod value;

pub use config::{DatabaseConfig, JournalMode};
pub use database::Database;
pub use error::{SqlError, SqlResult};
pub use expr::{Expressible, Expression, IntoExpression, Setter, func, join};
pub use monitor::{
    CompositeHook, HookAction, QueryContext, QueryHook, QueryResult, QueryStats, QueryType, StatsHook,
};
pub use query::{JoinType, Query};
pub use row::{Values, ValuesExt};
pub use statement::{Cursor, Statement, StepState};
pub use value::{Datatype, Number, Value};

#[cfg(feature = "tracing")]
pub use monitor::TracingSqlHook;
