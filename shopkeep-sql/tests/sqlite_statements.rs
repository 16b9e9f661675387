//! Execute generated statements against a real SQLite database.
//!
//! Builders are only useful if SQLite accepts what they render, including
//! quoted reserved words like `order` and bound LIMIT/OFFSET.

use rusqlite::types::Value as SqlValue;
use rusqlite::{Connection, params_from_iter};
use shopkeep_sql::{
    Aggregate, AggregateFunc, Delete, Exists, Insert, Operator, QueryResult, Record, Select,
    SortDir, Sqlite, Update, Value,
};

fn bind(params: &[Value]) -> Vec<SqlValue> {
    params
        .iter()
        .map(|v| match v {
            Value::Null | Value::Array(_) => SqlValue::Null,
            Value::Bool(b) => SqlValue::Integer(i64::from(*b)),
            Value::Int(i) => SqlValue::Integer(*i),
            Value::Float(f) => SqlValue::Real(*f),
            Value::String(s) => SqlValue::Text(s.clone()),
        })
        .collect()
}

fn setup() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        r#"
        CREATE TABLE categories (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            parent_id INTEGER,
            "order" INTEGER NOT NULL DEFAULT 0,
            visibility INTEGER NOT NULL DEFAULT 1
        );
        INSERT INTO categories (name, parent_id, "order") VALUES
            ('Books', NULL, 2),
            ('Games', NULL, 1),
            ('Novels', 1, 1),
            ('Comics', 1, 2);
        "#,
    )
    .unwrap();
    conn
}

fn execute(conn: &Connection, query: &QueryResult) -> usize {
    conn.execute(&query.sql, params_from_iter(bind(&query.params)))
        .unwrap()
}

fn names(conn: &Connection, query: &QueryResult) -> Vec<String> {
    let mut stmt = conn.prepare(&query.sql).unwrap();
    stmt.query_map(params_from_iter(bind(&query.params)), |row| {
        row.get::<_, String>("name")
    })
    .unwrap()
    .collect::<Result<_, _>>()
    .unwrap()
}

fn scalar(conn: &Connection, query: &QueryResult) -> i64 {
    conn.query_row(&query.sql, params_from_iter(bind(&query.params)), |row| {
        row.get("result")
    })
    .unwrap()
}

#[test]
fn select_orders_by_reserved_word() {
    let conn = setup();
    let query = Select::table("categories")
        .columns(&["name", "order"])
        .filter("parent_id", Operator::Eq, Value::Null)
        .order_by("order", SortDir::Asc)
        .build(&Sqlite)
        .unwrap();

    assert_eq!(names(&conn, &query), vec!["Games", "Books"]);
}

#[test]
fn select_pages_with_bound_limit_and_offset() {
    let conn = setup();
    let first = Select::table("categories")
        .order_by("id", SortDir::Asc)
        .limit(2)
        .build(&Sqlite)
        .unwrap();
    let second = Select::table("categories")
        .order_by("id", SortDir::Asc)
        .limit(2)
        .offset(2)
        .build(&Sqlite)
        .unwrap();

    assert_eq!(names(&conn, &first), vec!["Books", "Games"]);
    assert_eq!(names(&conn, &second), vec!["Novels", "Comics"]);
}

#[test]
fn select_in_list() {
    let conn = setup();
    let query = Select::table("categories")
        .filter("id", Operator::In, vec![2i64, 4])
        .order_by("id", SortDir::Desc)
        .build(&Sqlite)
        .unwrap();

    assert_eq!(names(&conn, &query), vec!["Comics", "Games"]);
}

#[test]
fn aggregates_return_result_column() {
    let conn = setup();

    let count = Aggregate::count("categories")
        .filter_eq("parent_id", 1i64)
        .build(&Sqlite)
        .unwrap();
    assert_eq!(scalar(&conn, &count), 2);

    let max = Aggregate::new("categories", AggregateFunc::Max, "order")
        .build(&Sqlite)
        .unwrap();
    assert_eq!(scalar(&conn, &max), 2);

    let sum = Aggregate::new("categories", AggregateFunc::Sum, "order")
        .filter("name", Operator::Like, "%s")
        .build(&Sqlite)
        .unwrap();
    // Books (2) + Games (1) + Novels (1) + Comics (2)
    assert_eq!(scalar(&conn, &sum), 6);
}

#[test]
fn insert_update_delete_round_trip() {
    let conn = setup();

    let insert = Insert::table("categories")
        .record(
            Record::new()
                .with("id", 0i64)
                .with("name", "Toys")
                .with("parent_id", Value::Null)
                .with("order", 5i64),
        )
        .exclude(&["id"])
        .build(&Sqlite)
        .unwrap();
    assert_eq!(execute(&conn, &insert), 1);
    let id = conn.last_insert_rowid();
    assert_eq!(id, 5);

    let update = Update::table("categories")
        .record(Record::new().with("id", id).with("name", "Board games"))
        .by_id("id", id)
        .build(&Sqlite)
        .unwrap();
    assert_eq!(execute(&conn, &update), 1);

    let hide = Update::status("categories", "id", id, "visibility", 0i64)
        .build(&Sqlite)
        .unwrap();
    assert_eq!(execute(&conn, &hide), 1);

    let reread = Select::by_id("categories", "id", id).build(&Sqlite).unwrap();
    assert_eq!(names(&conn, &reread), vec!["Board games"]);

    let exists = Exists::new("categories", "id", id).build(&Sqlite).unwrap();
    let found: Option<i64> = conn
        .query_row(&exists.sql, params_from_iter(bind(&exists.params)), |row| {
            row.get(0)
        })
        .ok();
    assert_eq!(found, Some(1));

    let delete = Delete::by_id("categories", "id", id).build(&Sqlite).unwrap();
    assert_eq!(execute(&conn, &delete), 1);
    assert_eq!(execute(&conn, &delete), 0);
}

#[test]
fn hostile_values_are_stored_verbatim() {
    let conn = setup();
    let hostile = "x'); DROP TABLE categories; --";

    let insert = Insert::table("categories")
        .record(Record::new().with("name", hostile))
        .build(&Sqlite)
        .unwrap();
    execute(&conn, &insert);

    let query = Select::table("categories")
        .filter_eq("name", hostile)
        .build(&Sqlite)
        .unwrap();
    assert_eq!(names(&conn, &query), vec![hostile.to_string()]);
}
