//! Row mapping types and typed accessors

use crate::error::{SqlError, SqlResult};
use crate::expr::Expression;
use crate::value::{Datatype, Value};
use std::collections::HashMap;

/// A single result row, keyed by result column name.
///
/// `None` is a NULL cell. When two result columns share a name (e.g. `id` from
/// both sides of a join) the later column wins.
pub type Values = HashMap<String, Option<Value>>;

/// Typed access to a [`Values`] row through column expressions.
pub trait ValuesExt {
    /// Typed value of `column`, or `None` if the column is missing, NULL, or
    /// stored with a different type.
    fn column<T: Datatype>(&self, column: &Expression<T>) -> Option<T>;

    /// Like [`ValuesExt::column`] but distinguishes a missing column or type
    /// mismatch (error) from NULL (`Ok(None)`).
    fn try_column<T: Datatype>(&self, column: &Expression<T>) -> SqlResult<Option<T>>;

    /// Raw cell by result column name.
    fn value(&self, name: &str) -> Option<&Value>;

    /// Render the row as a JSON object.
    fn to_json(&self) -> serde_json::Value;
}

impl ValuesExt for Values {
    fn column<T: Datatype>(&self, column: &Expression<T>) -> Option<T> {
        self.try_column(column).ok().flatten()
    }

    fn try_column<T: Datatype>(&self, column: &Expression<T>) -> SqlResult<Option<T>> {
        let name = result_column_name(column.sql());
        let cell = HashMap::get(self, column.sql())
            .or_else(|| HashMap::get(self, name))
            .ok_or_else(|| SqlError::decode(name, "no such column in row"))?;
        match cell {
            None => Ok(None),
            Some(value) => T::from_value(value).map(Some).ok_or_else(|| {
                SqlError::decode(
                    name,
                    format!("expected {}, got {}", T::DECLARED_TYPE, value.type_name()),
                )
            }),
        }
    }

    fn value(&self, name: &str) -> Option<&Value> {
        HashMap::get(self, name).and_then(Option::as_ref)
    }

    fn to_json(&self) -> serde_json::Value {
        let object = self
            .iter()
            .map(|(name, cell)| {
                let value = match cell {
                    Some(value) => serde_json::to_value(value).unwrap_or(serde_json::Value::Null),
                    None => serde_json::Value::Null,
                };
                (name.clone(), value)
            })
            .collect();
        serde_json::Value::Object(object)
    }
}

/// Name SQLite gives a result column selected as `sql`: the last segment of
/// a qualified name, without identifier quotes.
fn result_column_name(sql: &str) -> &str {
    let last = sql.rsplit('.').next().unwrap_or(sql);
    last.trim_matches(|c| c == '"' || c == '`' || c == '[' || c == ']')
}
