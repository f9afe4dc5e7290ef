//! Core and aggregate SQL functions.
//!
//! Each function wraps its argument as `name(arg)` and carries the
//! argument's bindings through unchanged.

use super::{Expression, IntoExpression, join};
use crate::value::{Datatype, Number};

fn call<T, U>(name: &str, arg: &Expression<T>) -> Expression<U> {
    let (sql, bindings) = arg.clone().into_parts();
    Expression::from_parts(format!("{name}({sql})"), bindings)
}

/// `count(x)`: number of non-NULL values.
pub fn count<T>(x: &Expression<T>) -> Expression<i64> {
    call("count", x)
}

/// `count(DISTINCT x)`
pub fn count_distinct<T>(x: &Expression<T>) -> Expression<i64> {
    let (sql, bindings) = x.clone().into_parts();
    Expression::from_parts(format!("count(DISTINCT {sql})"), bindings)
}

/// `count(*)`
pub fn count_star() -> Expression<i64> {
    Expression::new("count(*)")
}

pub fn min<T: Datatype>(x: &Expression<T>) -> Expression<T> {
    call("min", x)
}

pub fn max<T: Datatype>(x: &Expression<T>) -> Expression<T> {
    call("max", x)
}

/// `avg(x)`, always a REAL.
pub fn avg<T: Number>(x: &Expression<T>) -> Expression<f64> {
    call("avg", x)
}

/// `sum(x)`: NULL over an empty set.
pub fn sum<T: Number>(x: &Expression<T>) -> Expression<T> {
    call("sum", x)
}

/// `total(x)`: like `sum` but 0.0 over an empty set.
pub fn total<T: Number>(x: &Expression<T>) -> Expression<f64> {
    call("total", x)
}

pub fn abs<T: Number>(x: &Expression<T>) -> Expression<T> {
    call("abs", x)
}

pub fn length(x: &Expression<String>) -> Expression<i64> {
    call("length", x)
}

pub fn lower(x: &Expression<String>) -> Expression<String> {
    call("lower", x)
}

pub fn upper(x: &Expression<String>) -> Expression<String> {
    call("upper", x)
}

pub fn trim(x: &Expression<String>) -> Expression<String> {
    call("trim", x)
}

/// `ifnull(x, fallback)`
pub fn ifnull<T>(x: &Expression<T>, fallback: impl IntoExpression<T>) -> Expression<T> {
    let args = [x.clone(), fallback.into_expression()];
    call("ifnull", &join(", ", &args))
}

/// `coalesce(a, b, ...)`
pub fn coalesce<T>(args: &[Expression<T>]) -> Expression<T> {
    call("coalesce", &join(", ", args))
}
