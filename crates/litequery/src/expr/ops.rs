//! Operators over expressions.
//!
//! Binary operators always parenthesize their output so that nesting never
//! depends on SQL precedence rules.

use super::{Expressible, Expression, IntoExpression, join};
use crate::value::Number;
use std::ops::{Add, BitAnd, BitOr, Div, Mul, Neg, Not, Rem, Sub};

fn infix<L, R, U>(lhs: &Expression<L>, op: &str, rhs: Expression<R>) -> Expression<U> {
    let (lhs_sql, mut bindings) = lhs.clone().into_parts();
    let (rhs_sql, rhs_bindings) = rhs.into_parts();
    bindings.extend(rhs_bindings);
    Expression::from_parts(format!("({lhs_sql} {op} {rhs_sql})"), bindings)
}

// `= NULL` is never true in SQL; equality against NULL needs `IS`.
fn is_bare_null<T>(expression: &Expression<T>) -> bool {
    expression.bindings().is_empty() && expression.sql().eq_ignore_ascii_case("NULL")
}

fn postfix<T, U>(operand: &Expression<T>, suffix: &str) -> Expression<U> {
    let (sql, bindings) = operand.clone().into_parts();
    Expression::from_parts(format!("({sql} {suffix})"), bindings)
}

impl<T> Expression<T> {
    /// `(self = rhs)`, or `(self IS NULL)` when `rhs` is `None`.
    pub fn eq(&self, rhs: impl IntoExpression<T>) -> Expression<bool> {
        let rhs = rhs.into_expression();
        if is_bare_null(&rhs) {
            return self.is_null();
        }
        infix(self, "=", rhs)
    }

    /// `(self != rhs)`, or `(self IS NOT NULL)` when `rhs` is `None`.
    pub fn ne(&self, rhs: impl IntoExpression<T>) -> Expression<bool> {
        let rhs = rhs.into_expression();
        if is_bare_null(&rhs) {
            return self.is_not_null();
        }
        infix(self, "!=", rhs)
    }

    /// `(self > rhs)`
    pub fn gt(&self, rhs: impl IntoExpression<T>) -> Expression<bool> {
        infix(self, ">", rhs.into_expression())
    }

    /// `(self >= rhs)`
    pub fn gte(&self, rhs: impl IntoExpression<T>) -> Expression<bool> {
        infix(self, ">=", rhs.into_expression())
    }

    /// `(self < rhs)`
    pub fn lt(&self, rhs: impl IntoExpression<T>) -> Expression<bool> {
        infix(self, "<", rhs.into_expression())
    }

    /// `(self <= rhs)`
    pub fn lte(&self, rhs: impl IntoExpression<T>) -> Expression<bool> {
        infix(self, "<=", rhs.into_expression())
    }

    /// `(self BETWEEN low AND high)`
    pub fn between(&self, low: impl IntoExpression<T>, high: impl IntoExpression<T>) -> Expression<bool> {
        let (sql, mut bindings) = self.clone().into_parts();
        let (low_sql, low_bindings) = low.into_expression().into_parts();
        let (high_sql, high_bindings) = high.into_expression().into_parts();
        bindings.extend(low_bindings);
        bindings.extend(high_bindings);
        Expression::from_parts(format!("({sql} BETWEEN {low_sql} AND {high_sql})"), bindings)
    }

    /// `(self IN (?, ?, ...))`. An empty list is never satisfied and renders
    /// as `0`.
    pub fn in_list<V: IntoExpression<T>>(&self, values: impl IntoIterator<Item = V>) -> Expression<bool> {
        let values: Vec<Expression<T>> = values.into_iter().map(IntoExpression::into_expression).collect();
        if values.is_empty() {
            return Expression::new("0");
        }
        let list = join(", ", &values);
        let (sql, mut bindings) = self.clone().into_parts();
        let (list_sql, list_bindings) = list.into_parts();
        bindings.extend(list_bindings);
        Expression::from_parts(format!("({sql} IN ({list_sql}))"), bindings)
    }

    /// `(self IS NULL)`
    pub fn is_null(&self) -> Expression<bool> {
        postfix(self, "IS NULL")
    }

    /// `(self IS NOT NULL)`
    pub fn is_not_null(&self) -> Expression<bool> {
        postfix(self, "IS NOT NULL")
    }

    /// Ascending ordering term.
    pub fn asc(&self) -> Expression<()> {
        let (sql, bindings) = self.clone().into_parts();
        Expression::from_parts(format!("{sql} ASC"), bindings)
    }

    /// Descending ordering term.
    pub fn desc(&self) -> Expression<()> {
        let (sql, bindings) = self.clone().into_parts();
        Expression::from_parts(format!("{sql} DESC"), bindings)
    }

    /// Assignment of `value` to this column, for INSERT and UPDATE.
    pub fn set(&self, value: impl IntoExpression<T>) -> Setter {
        Setter {
            column: self.expression(),
            value: value.into_expression().cast(),
        }
    }
}

impl Expression<String> {
    /// `(self LIKE pattern)`
    pub fn like(&self, pattern: impl IntoExpression<String>) -> Expression<bool> {
        infix(self, "LIKE", pattern.into_expression())
    }

    /// `(self GLOB pattern)`
    pub fn glob(&self, pattern: impl IntoExpression<String>) -> Expression<bool> {
        infix(self, "GLOB", pattern.into_expression())
    }

    /// `(self || rhs)`
    pub fn concat(&self, rhs: impl IntoExpression<String>) -> Expression<String> {
        infix(self, "||", rhs.into_expression())
    }
}

impl Expression<bool> {
    /// `(self AND rhs)`
    pub fn and(&self, rhs: impl IntoExpression<bool>) -> Expression<bool> {
        infix(self, "AND", rhs.into_expression())
    }

    /// `(self OR rhs)`
    pub fn or(&self, rhs: impl IntoExpression<bool>) -> Expression<bool> {
        infix(self, "OR", rhs.into_expression())
    }
}

/// One `column = value` pair of an INSERT or UPDATE.
#[derive(Debug, Clone)]
pub struct Setter {
    column: Expression<()>,
    value: Expression<()>,
}

impl Setter {
    pub fn column(&self) -> &Expression<()> {
        &self.column
    }

    pub fn value(&self) -> &Expression<()> {
        &self.value
    }
}

macro_rules! impl_binary_op {
    ($trait:ident, $method:ident, $op:literal, $bound:path) => {
        impl<T: $bound, R: IntoExpression<T>> $trait<R> for Expression<T> {
            type Output = Expression<T>;

            fn $method(self, rhs: R) -> Expression<T> {
                infix(&self, $op, rhs.into_expression())
            }
        }

        impl<T: $bound, R: IntoExpression<T>> $trait<R> for &Expression<T> {
            type Output = Expression<T>;

            fn $method(self, rhs: R) -> Expression<T> {
                infix(self, $op, rhs.into_expression())
            }
        }
    };
}

impl_binary_op!(Add, add, "+", Number);
impl_binary_op!(Sub, sub, "-", Number);
impl_binary_op!(Mul, mul, "*", Number);
impl_binary_op!(Div, div, "/", Number);
impl_binary_op!(Rem, rem, "%", Number);

impl<R: IntoExpression<bool>> BitAnd<R> for Expression<bool> {
    type Output = Expression<bool>;

    fn bitand(self, rhs: R) -> Expression<bool> {
        self.and(rhs)
    }
}

impl<R: IntoExpression<bool>> BitAnd<R> for &Expression<bool> {
    type Output = Expression<bool>;

    fn bitand(self, rhs: R) -> Expression<bool> {
        self.and(rhs)
    }
}

impl<R: IntoExpression<bool>> BitOr<R> for Expression<bool> {
    type Output = Expression<bool>;

    fn bitor(self, rhs: R) -> Expression<bool> {
        self.or(rhs)
    }
}

impl<R: IntoExpression<bool>> BitOr<R> for &Expression<bool> {
    type Output = Expression<bool>;

    fn bitor(self, rhs: R) -> Expression<bool> {
        self.or(rhs)
    }
}

fn negate(operand: &Expression<bool>) -> Expression<bool> {
    let (sql, bindings) = operand.clone().into_parts();
    Expression::from_parts(format!("(NOT {sql})"), bindings)
}

impl Not for Expression<bool> {
    type Output = Expression<bool>;

    fn not(self) -> Expression<bool> {
        negate(&self)
    }
}

impl Not for &Expression<bool> {
    type Output = Expression<bool>;

    fn not(self) -> Expression<bool> {
        negate(self)
    }
}

impl<T: Number> Neg for Expression<T> {
    type Output = Expression<T>;

    fn neg(self) -> Expression<T> {
        let (sql, bindings) = self.into_parts();
        Expression::from_parts(format!("(-{sql})"), bindings)
    }
}

impl<T: Number> Neg for &Expression<T> {
    type Output = Expression<T>;

    fn neg(self) -> Expression<T> {
        -self.clone()
    }
}
