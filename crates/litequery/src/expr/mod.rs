//! Typed SQL expressions.
//!
//! An [`Expression<T>`] is a fragment of SQL text together with the values
//! bound to its `?` placeholders, in placeholder order. The type parameter
//! records what the fragment evaluates to: a [`Datatype`](crate::Datatype)
//! for scalars, `bool` for predicates, or `()` for untyped fragments such as
//! `*`, ordering terms and clause bodies.
//!
//! Every combinator concatenates its operands' bindings in the same
//! left-to-right order as their SQL text, so the placeholder count of a
//! composed expression always equals its binding count.
//!
//! ```
//! use litequery::Expression;
//!
//! let age = Expression::<i64>::new("age");
//! let name = Expression::<String>::new("name");
//!
//! let adult_alice = age.gte(18) & name.eq("alice");
//! assert_eq!(adult_alice.sql(), "((age >= ?) AND (name = ?))");
//! assert_eq!(adult_alice.bindings().len(), 2);
//! ```

pub mod func;
mod ops;

pub use ops::Setter;

use crate::value::{Datatype, Value};
use chrono::NaiveDateTime;
use std::fmt;
use std::marker::PhantomData;

/// A SQL fragment plus its ordered bindings, typed by what it evaluates to.
pub struct Expression<T> {
    sql: String,
    bindings: Vec<Value>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Expression<T> {
    /// Literal SQL text with no bindings: a column name, `*`, a keyword.
    ///
    /// The text must not contain `?` placeholders; use
    /// [`Expression::with_bindings`] for parameterized text.
    pub fn new(sql: impl Into<String>) -> Self {
        Self::with_bindings(sql, Vec::new())
    }

    /// Parameterized SQL text. `bindings` fill the `?` placeholders of `sql`
    /// left to right.
    pub fn with_bindings(sql: impl Into<String>, bindings: Vec<Value>) -> Self {
        let sql = sql.into();
        debug_assert_eq!(
            count_placeholders(&sql),
            bindings.len(),
            "placeholder/binding mismatch in `{sql}`"
        );
        Self {
            sql,
            bindings,
            _marker: PhantomData,
        }
    }

    /// The SQL text.
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// The bound values, in placeholder order.
    pub fn bindings(&self) -> &[Value] {
        &self.bindings
    }

    pub fn into_parts(self) -> (String, Vec<Value>) {
        (self.sql, self.bindings)
    }

    /// Reinterpret the result type. The SQL text and bindings are unchanged.
    pub fn cast<U>(self) -> Expression<U> {
        Expression {
            sql: self.sql,
            bindings: self.bindings,
            _marker: PhantomData,
        }
    }

    // Built from already-consistent parts; skips the placeholder scan.
    pub(crate) fn from_parts(sql: String, bindings: Vec<Value>) -> Self {
        Self {
            sql,
            bindings,
            _marker: PhantomData,
        }
    }
}

impl<T> Clone for Expression<T> {
    fn clone(&self) -> Self {
        Self::from_parts(self.sql.clone(), self.bindings.clone())
    }
}

impl<T> fmt::Debug for Expression<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Expression")
            .field("sql", &self.sql)
            .field("bindings", &self.bindings)
            .finish()
    }
}

impl<T> fmt::Display for Expression<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sql)
    }
}

/// Anything that can be rendered as an untyped SQL fragment.
///
/// Lets heterogeneous columns travel together, e.g. `&[&dyn Expressible]`.
pub trait Expressible {
    fn expression(&self) -> Expression<()>;
}

impl<T> Expressible for Expression<T> {
    fn expression(&self) -> Expression<()> {
        self.clone().cast()
    }
}

impl<E: Expressible + ?Sized> Expressible for &E {
    fn expression(&self) -> Expression<()> {
        (**self).expression()
    }
}

/// Concatenate fragments with `separator` between them, keeping their
/// bindings in order.
pub fn join<E: Expressible>(separator: &str, fragments: impl IntoIterator<Item = E>) -> Expression<()> {
    let mut sql = String::new();
    let mut bindings = Vec::new();
    for (i, fragment) in fragments.into_iter().enumerate() {
        if i > 0 {
            sql.push_str(separator);
        }
        let (fragment_sql, fragment_bindings) = fragment.expression().into_parts();
        sql.push_str(&fragment_sql);
        bindings.extend(fragment_bindings);
    }
    Expression::from_parts(sql, bindings)
}

/// Conversion into an `Expression<T>`.
///
/// Expressions convert to themselves. Plain values become a single `?`
/// placeholder bound to the value; `None` becomes a literal `NULL`, which
/// [`Expression::eq`] and [`Expression::ne`] turn into `IS NULL` / `IS NOT NULL`.
pub trait IntoExpression<T> {
    fn into_expression(self) -> Expression<T>;
}

impl<T> IntoExpression<T> for Expression<T> {
    fn into_expression(self) -> Expression<T> {
        self
    }
}

impl<T> IntoExpression<T> for &Expression<T> {
    fn into_expression(self) -> Expression<T> {
        self.clone()
    }
}

impl<T, V: IntoExpression<T>> IntoExpression<T> for Option<V> {
    fn into_expression(self) -> Expression<T> {
        match self {
            Some(value) => value.into_expression(),
            None => Expression::new("NULL"),
        }
    }
}

fn bound<T>(value: Value) -> Expression<T> {
    Expression::from_parts("?".to_string(), vec![value])
}

macro_rules! impl_into_expression {
    ($target:ty => $($source:ty),+ $(,)?) => {
        $(
            impl IntoExpression<$target> for $source {
                fn into_expression(self) -> Expression<$target> {
                    bound(<$target as Datatype>::into_value(self.into()))
                }
            }
        )+
    };
}

impl_into_expression!(i64 => i64, i32, u32);
impl_into_expression!(f64 => f64, f32);
impl_into_expression!(String => String, &str, &String);
impl_into_expression!(bool => bool);
impl_into_expression!(Vec<u8> => Vec<u8>, &[u8]);
impl_into_expression!(NaiveDateTime => NaiveDateTime);

/// Number of `?` placeholders in `sql`, ignoring quoted literals and
/// identifiers.
pub(crate) fn count_placeholders(sql: &str) -> usize {
    let mut count = 0;
    let mut quote: Option<char> = None;
    for c in sql.chars() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None => match c {
                '\'' | '"' | '`' => quote = Some(c),
                '?' => count += 1,
                _ => {}
            },
        }
    }
    count
}

#[cfg(test)]
mod tests;
