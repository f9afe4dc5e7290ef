use super::*;
use crate::expr::func;

fn int(name: &str) -> Expression<i64> {
    Expression::new(name)
}

fn text(name: &str) -> Expression<String> {
    Expression::new(name)
}

fn assert_aligned<T>(expr: &Expression<T>) {
    assert_eq!(
        count_placeholders(expr.sql()),
        expr.bindings().len(),
        "misaligned: {}",
        expr.sql()
    );
}

#[test]
fn literals_have_no_bindings() {
    let star = Expression::<()>::new("*");
    assert_eq!(star.sql(), "*");
    assert!(star.bindings().is_empty());
}

#[test]
fn values_bind_placeholders() {
    let expr = int("id").eq(3);
    assert_eq!(expr.sql(), "(id = ?)");
    assert_eq!(expr.bindings(), &[Value::Integer(3)]);

    let expr = text("name").ne("x");
    assert_eq!(expr.sql(), "(name != ?)");
    assert_eq!(expr.bindings(), &[Value::Text("x".into())]);
}

#[test]
fn expressions_splice_in_with_bindings() {
    let a = int("a");
    let b = int("b");
    let expr = a.lt(&b + 5);
    assert_eq!(expr.sql(), "(a < (b + ?))");
    assert_eq!(expr.bindings(), &[Value::Integer(5)]);
}

#[test]
fn comparing_with_none_uses_is_null() {
    let expr = int("a").eq(None::<i64>);
    assert_eq!(expr.sql(), "(a IS NULL)");
    assert!(expr.bindings().is_empty());
    assert_eq!(int("a").ne(None::<i64>).sql(), "(a IS NOT NULL)");

    let expr = int("a").eq(Some(1));
    assert_eq!(expr.sql(), "(a = ?)");
    assert_eq!(expr.bindings(), &[Value::Integer(1)]);
    // Only a bare NULL is rewritten.
    assert_eq!(int("a").eq(&int("b")).sql(), "(a = b)");
    assert_eq!(int("a").gt(None::<i64>).sql(), "(a > NULL)");
}

#[test]
fn boolean_combinators_parenthesize() {
    let a = int("a");
    let b = int("b");
    let c = int("c");

    let expr = a.eq(1) & (b.eq(2) | c.eq(3));
    assert_eq!(expr.sql(), "((a = ?) AND ((b = ?) OR (c = ?)))");
    assert_eq!(
        expr.bindings(),
        &[Value::Integer(1), Value::Integer(2), Value::Integer(3)]
    );

    let expr = !a.gt(0);
    assert_eq!(expr.sql(), "(NOT (a > ?))");

    let expr = a.eq(1).and(true);
    assert_eq!(expr.sql(), "((a = ?) AND ?)");
    assert_eq!(expr.bindings(), &[Value::Integer(1), Value::Integer(1)]);
}

#[test]
fn binding_order_follows_text_order() {
    let a = int("a");
    let name = text("name");
    let expr = name.like("%x%").or(a.between(1, 9)) & a.in_list([4, 5]);
    assert_eq!(
        expr.sql(),
        "(((name LIKE ?) OR (a BETWEEN ? AND ?)) AND (a IN (?, ?)))"
    );
    assert_eq!(
        expr.bindings(),
        &[
            Value::Text("%x%".into()),
            Value::Integer(1),
            Value::Integer(9),
            Value::Integer(4),
            Value::Integer(5),
        ]
    );
    assert_aligned(&expr);
}

#[test]
fn empty_in_list_is_false() {
    let expr = int("a").in_list(Vec::<i64>::new());
    assert_eq!(expr.sql(), "0");
    assert!(expr.bindings().is_empty());
}

#[test]
fn null_checks_and_ordering() {
    let note = text("note");
    assert_eq!(note.is_null().sql(), "(note IS NULL)");
    assert_eq!(note.is_not_null().sql(), "(note IS NOT NULL)");
    assert_eq!(note.asc().sql(), "note ASC");
    assert_eq!(note.desc().sql(), "note DESC");
}

#[test]
fn arithmetic() {
    let price = Expression::<f64>::new("price");
    let qty = int("qty");
    assert_eq!((&price * 1.5).sql(), "(price * ?)");
    assert_eq!((-&qty).sql(), "(-qty)");
    assert_eq!((&qty % 2 - 1).sql(), "((qty % ?) - ?)");
    assert_aligned(&(&qty / &qty + 1));
}

#[test]
fn string_concat() {
    let first = text("first");
    let expr = first.concat(" ").concat(text("last"));
    assert_eq!(expr.sql(), "((first || ?) || last)");
    assert_eq!(expr.bindings(), &[Value::Text(" ".into())]);
}

#[test]
fn functions_wrap_argument() {
    let id = int("id");
    assert_eq!(func::count(&id).sql(), "count(id)");
    assert_eq!(func::count_distinct(&id).sql(), "count(DISTINCT id)");
    assert_eq!(func::count_star().sql(), "count(*)");
    assert_eq!(func::max(&id).sql(), "max(id)");
    assert_eq!(func::avg(&id).sql(), "avg(id)");
    assert_eq!(func::total(&id).sql(), "total(id)");

    let wrapped = func::sum(&(&id + 1));
    assert_eq!(wrapped.sql(), "sum((id + ?))");
    assert_eq!(wrapped.bindings(), &[Value::Integer(1)]);

    let name = text("name");
    assert_eq!(func::upper(&func::trim(&name)).sql(), "upper(trim(name))");
    let fallback = func::ifnull(&name, "none");
    assert_eq!(fallback.sql(), "ifnull(name, ?)");
    assert_aligned(&fallback);
    let first = func::coalesce(&[text("a"), text("b"), text("c")]);
    assert_eq!(first.sql(), "coalesce(a, b, c)");
}

#[test]
fn join_concatenates_fragments_and_bindings() {
    let a = int("a");
    let name = text("name");
    let parts: [&dyn Expressible; 3] = [&a.eq(1), &Expression::<()>::new("*"), &name.eq("z")];
    let joined = join(", ", parts);
    assert_eq!(joined.sql(), "(a = ?), *, (name = ?)");
    assert_eq!(
        joined.bindings(),
        &[Value::Integer(1), Value::Text("z".into())]
    );

    let empty = join(", ", Vec::<Expression<()>>::new());
    assert_eq!(empty.sql(), "");
}

#[test]
fn setters_keep_column_and_value() {
    let name = text("name");
    let setter = name.set("groceries");
    assert_eq!(setter.column().sql(), "name");
    assert_eq!(setter.value().sql(), "?");
    assert_eq!(setter.value().bindings(), &[Value::Text("groceries".into())]);
}

#[test]
fn placeholder_count_skips_quoted_text() {
    assert_eq!(count_placeholders("a = ? AND b = '?' AND \"c?\" = ?"), 2);
    assert_eq!(count_placeholders("SELECT 1"), 0);
}

#[test]
fn cast_keeps_sql_and_bindings() {
    let predicate = int("a").eq(2);
    let untyped: Expression<()> = predicate.clone().cast();
    assert_eq!(untyped.sql(), predicate.sql());
    assert_eq!(untyped.bindings(), predicate.bindings());
    assert_eq!(predicate.to_string(), "(a = ?)");
}
