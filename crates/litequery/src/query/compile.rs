use super::{Limit, Query};
use crate::expr::{Expression, Setter, join};

impl Query {
    /// `SELECT <columns> FROM <table> [joins] [WHERE] [GROUP BY/HAVING]
    /// [ORDER BY] [LIMIT [OFFSET]]`. Absent clauses are left out.
    pub fn compile_select(&self) -> Expression<()> {
        let mut clauses = vec![Expression::new("SELECT")];
        if self.columns.is_empty() {
            clauses.push(Expression::new("*"));
        } else {
            clauses.push(join(", ", &self.columns));
        }
        clauses.push(self.from_clause());
        clauses.extend(self.joins.iter().cloned());
        clauses.extend(self.where_clause());
        clauses.extend(self.group.iter().cloned());
        if !self.order.is_empty() {
            clauses.push(join(" ", [Expression::new("ORDER BY"), join(", ", &self.order)]));
        }
        clauses.extend(self.limit.map(limit_clause));
        join(" ", clauses)
    }

    /// `INSERT INTO <table> (<columns>) VALUES (<values>)`, in setter order.
    ///
    /// The query's filter, joins and other clauses do not apply to an INSERT
    /// and are left out. With no setters the row gets all default values.
    pub fn compile_insert(&self, values: &[Setter]) -> Expression<()> {
        if values.is_empty() {
            return Expression::new(format!("INSERT INTO {} DEFAULT VALUES", self.table_name));
        }
        let columns = join(", ", values.iter().map(Setter::column));
        let bound = join(", ", values.iter().map(Setter::value));
        join(
            "",
            [
                Expression::new(format!("INSERT INTO {} (", self.table_name)),
                columns,
                Expression::new(") VALUES ("),
                bound,
                Expression::new(")"),
            ],
        )
    }

    /// `UPDATE <table> SET <column = value, ...> [WHERE]`.
    pub fn compile_update(&self, values: &[Setter]) -> Expression<()> {
        let assignments = join(
            ", ",
            values
                .iter()
                .map(|setter| join(" = ", [setter.column(), setter.value()])),
        );
        let mut clauses = vec![
            Expression::new(format!("UPDATE {} SET", self.table_name)),
            assignments,
        ];
        clauses.extend(self.where_clause());
        join(" ", clauses)
    }

    /// `DELETE FROM <table> [WHERE]`.
    pub fn compile_delete(&self) -> Expression<()> {
        let mut clauses = vec![Expression::new("DELETE"), self.from_clause()];
        clauses.extend(self.where_clause());
        join(" ", clauses)
    }

    /// The SELECT this query runs when iterated.
    pub fn to_sql(&self) -> Expression<()> {
        self.compile_select()
    }

    fn from_clause(&self) -> Expression<()> {
        Expression::new(format!("FROM {}", self.table_name))
    }

    fn where_clause(&self) -> Option<Expression<()>> {
        self.filter
            .as_ref()
            .map(|filter| join(" ", [Expression::<()>::new("WHERE"), filter.clone().cast()]))
    }
}

fn limit_clause(limit: Limit) -> Expression<()> {
    match limit.offset {
        Some(offset) => Expression::new(format!("LIMIT {} OFFSET {offset}", limit.count)),
        None => Expression::new(format!("LIMIT {}", limit.count)),
    }
}
