//! Bindable values and the Rust types that map onto them.
//!
//! SQLite stores every cell as one of four storage classes (or NULL). [`Value`]
//! mirrors those classes; NULL is expressed as `Option<Value>::None` wherever a
//! value may be absent. [`Datatype`] connects Rust scalars to storage classes so
//! expressions can be typed (`Expression<i64>`, `Expression<String>`, ...).

use chrono::NaiveDateTime;
use rusqlite::types::{ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A non-null SQLite value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl Value {
    /// Convert a borrowed engine value into an owned one. NULL maps to `None`.
    pub fn from_value_ref(value: ValueRef<'_>) -> Option<Self> {
        match value {
            ValueRef::Null => None,
            ValueRef::Integer(i) => Some(Value::Integer(i)),
            ValueRef::Real(f) => Some(Value::Real(f)),
            ValueRef::Text(t) => Some(Value::Text(String::from_utf8_lossy(t).into_owned())),
            ValueRef::Blob(b) => Some(Value::Blob(b.to_vec())),
        }
    }

    /// Storage class name as SQLite reports it from `typeof()`.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Integer(_) => "integer",
            Value::Real(_) => "real",
            Value::Text(_) => "text",
            Value::Blob(_) => "blob",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(i) => write!(f, "{i}"),
            Value::Real(r) => write!(f, "{r}"),
            Value::Text(t) => f.write_str(t),
            Value::Blob(b) => write!(f, "x'{}'", b.iter().map(|b| format!("{b:02x}")).collect::<String>()),
        }
    }
}

impl ToSql for Value {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::Borrowed(match self {
            Value::Integer(i) => ValueRef::Integer(*i),
            Value::Real(f) => ValueRef::Real(*f),
            Value::Text(t) => ValueRef::Text(t.as_bytes()),
            Value::Blob(b) => ValueRef::Blob(b),
        }))
    }
}

/// A Rust type that can be bound as a parameter and decoded from a column.
pub trait Datatype: Sized {
    /// Declared SQLite column type for this Rust type.
    const DECLARED_TYPE: &'static str;

    /// Convert into a bindable value.
    fn into_value(self) -> Value;

    /// Decode from a stored value. Returns `None` when the storage class does
    /// not fit.
    fn from_value(value: &Value) -> Option<Self>;
}

/// Numeric datatypes usable in arithmetic and `sum`/`avg`/`total`.
pub trait Number: Datatype {}

impl Datatype for i64 {
    const DECLARED_TYPE: &'static str = "INTEGER";

    fn into_value(self) -> Value {
        Value::Integer(self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }
}

impl Number for i64 {}

impl Datatype for f64 {
    const DECLARED_TYPE: &'static str = "REAL";

    fn into_value(self) -> Value {
        Value::Real(self)
    }

    // Integer-valued REAL results come back as integers (e.g. `sum` over integers).
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Real(f) => Some(*f),
            Value::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }
}

impl Number for f64 {}

impl Datatype for String {
    const DECLARED_TYPE: &'static str = "TEXT";

    fn into_value(self) -> Value {
        Value::Text(self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Text(t) => Some(t.clone()),
            _ => None,
        }
    }
}

impl Datatype for bool {
    const DECLARED_TYPE: &'static str = "INTEGER";

    fn into_value(self) -> Value {
        Value::Integer(i64::from(self))
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Integer(i) => Some(*i != 0),
            _ => None,
        }
    }
}

impl Datatype for Vec<u8> {
    const DECLARED_TYPE: &'static str = "BLOB";

    fn into_value(self) -> Value {
        Value::Blob(self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Blob(b) => Some(b.clone()),
            _ => None,
        }
    }
}

/// Timestamp format used for `NaiveDateTime` columns; matches SQLite's
/// `datetime()` output so comparisons against `CURRENT_TIMESTAMP` sort correctly.
pub(crate) const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

impl Datatype for NaiveDateTime {
    const DECLARED_TYPE: &'static str = "TEXT";

    fn into_value(self) -> Value {
        Value::Text(self.format(DATETIME_FORMAT).to_string())
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Text(t) => NaiveDateTime::parse_from_str(t, DATETIME_FORMAT).ok(),
            _ => None,
        }
    }
}
