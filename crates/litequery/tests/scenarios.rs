use litequery::{Database, Expression, Query, ValuesExt};

fn letters() -> (Database, Query) {
    let db = Database::open_in_memory().unwrap();
    db.execute(
        "CREATE TABLE letters (id INTEGER PRIMARY KEY, letter TEXT NOT NULL);
         INSERT INTO letters (id, letter) VALUES (1, 'a'), (2, 'b'), (3, 'c');",
    )
    .unwrap();
    let letters = db.table("letters");
    (db, letters)
}

fn id() -> Expression<i64> {
    Expression::new("id")
}

fn letter() -> Expression<String> {
    Expression::new("letter")
}

#[test]
fn aggregates_over_three_rows() {
    let (db, letters) = letters();
    assert_eq!(letters.count(&db), Some(3));
    assert_eq!(letters.max(&db, &id()), Some(3));
    assert_eq!(letters.min(&db, &id()), Some(1));
    assert_eq!(letters.sum(&db, &id()), Some(6));
    assert_eq!(letters.average(&db, &id()), Some(2.0));
    assert_eq!(letters.total(&db, &id()), Some(6.0));
    assert_eq!(letters.max(&db, &letter()).as_deref(), Some("c"));
    assert_eq!(letters.count_column(&db, &letter()), Some(3));
}

#[test]
fn aggregates_respect_filter() {
    let (db, letters) = letters();
    let tail = letters.filter(id().gt(1));
    assert_eq!(tail.count(&db), Some(2));
    assert_eq!(tail.sum(&db, &id()), Some(5));
    assert_eq!(tail.average(&db, &id()), Some(2.5));
}

#[test]
fn aggregates_over_no_rows() {
    let (db, letters) = letters();
    let none = letters.filter(id().gt(100));
    assert_eq!(none.count(&db), Some(0));
    assert_eq!(none.max(&db, &id()), None);
    assert_eq!(none.sum(&db, &id()), None);
    assert_eq!(none.average(&db, &id()), None);
    assert_eq!(none.total(&db, &id()), Some(0.0));
}

#[test]
fn aggregates_on_a_missing_table_have_no_value() {
    let (db, _) = letters();
    let missing = db.table("no_such_table");
    assert_eq!(missing.count(&db), None);
    assert_eq!(missing.count_column(&db, &letter()), None);
    assert_eq!(missing.total(&db, &id()), None);
    assert_eq!(missing.sum(&db, &id()), None);

    let failed = missing.select(&[&litequery::func::count_star()]).prepare(&db);
    assert!(failed.failed());
}

#[test]
fn deleting_one_row_keeps_the_others_in_order() {
    let (db, letters) = letters();
    assert_eq!(letters.filter(id().eq(2)).delete(&db), 1);
    assert_eq!(letters.count(&db), Some(2));

    let remaining: Vec<(i64, String)> = letters
        .order(&[&id().asc()])
        .iter(&db)
        .map(|row| (row.column(&id()).unwrap(), row.column(&letter()).unwrap()))
        .collect();
    assert_eq!(remaining, [(1, "a".to_string()), (3, "c".to_string())]);
}

#[test]
fn first_matches_head_of_iteration() {
    let (db, letters) = letters();
    let ordered = letters.order(&[&letter().desc()]);

    let head = ordered.iter(&db).next();
    assert_eq!(ordered.limit(1).first(&db), head);
    assert_eq!(ordered.first(&db), head);
    assert_eq!(head.and_then(|row| row.column(&letter())).as_deref(), Some("c"));

    let empty = letters.filter(letter().eq("z"));
    assert_eq!(empty.first(&db), None);
    assert!(empty.is_empty(&db));
    assert!(!letters.is_empty(&db));
}

#[test]
fn first_keeps_an_existing_offset() {
    let (db, letters) = letters();
    let second = letters.order(&[&id().asc()]).limit_offset(5, 1).first(&db);
    assert_eq!(second.and_then(|row| row.column(&id())), Some(2));
}

#[test]
fn chained_filters_select_the_same_rows_as_a_conjunction() {
    let (db, letters) = letters();
    let p1 = id().gte(2);
    let p2 = letter().ne("c");

    let chained: Vec<_> = letters.filter(p1.clone()).filter(p2.clone()).iter(&db).collect();
    let combined: Vec<_> = letters.filter(p1 & p2).iter(&db).collect();
    assert_eq!(chained, combined);
    assert_eq!(chained.len(), 1);
}

#[test]
fn cursor_is_lazy_and_single_pass() {
    let (db, letters) = letters();
    let mut cursor = letters.order(&[&id().asc()]).iter(&db);
    let first = cursor.next().and_then(|row| row.column(&id()));
    assert_eq!(first, Some(1));
    assert_eq!(cursor.count(), 2);

    // Each iteration runs a fresh statement.
    assert_eq!(letters.iter(&db).count(), 3);
}

#[test]
fn select_limits_result_columns() {
    let (db, letters) = letters();
    let row = letters.select(&[&letter()]).filter(id().eq(1)).first(&db).unwrap();
    assert_eq!(row.len(), 1);
    assert_eq!(row.column(&letter()).as_deref(), Some("a"));
    assert_eq!(row.column(&id()), None);
}
