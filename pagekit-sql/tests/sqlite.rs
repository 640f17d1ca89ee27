//! Runs rendered statements against an in-memory SQLite database.

use pagekit::listing::{POST_SEARCH_FIELDS, POST_TAGS, post_order};
use pagekit::sanitize::{SearchPolicy, sanitize_search_term};
use pagekit::{Composer, CursorPlan, OffsetPlan, PageLimits, Predicate, QueryDescriptor, Value};
use pagekit_sql::{Postgres, Relation, SqlQuery, Sqlite, TableSpec, render_count, render_select};
use rusqlite::types::Value as SqlValue;
use rusqlite::{Connection, params, params_from_iter};
use serde_json::{Map, Value as Json, json};

fn posts_table() -> TableSpec {
    TableSpec::new("posts", "id").relation(Relation::new("tags", "post_tags", "postId"))
}

/// Twelve posts. Pairs share a `createdAt` minute, so the `id` tie-breaker
/// decides their order; newest first is simply descending id.
fn setup() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        r#"
        CREATE TABLE "posts" (
            "id" INTEGER PRIMARY KEY,
            "createdAt" TEXT NOT NULL,
            "title" TEXT NOT NULL,
            "content" TEXT NOT NULL
        );
        CREATE TABLE "post_tags" ("postId" INTEGER NOT NULL, "tagId" INTEGER NOT NULL);
        "#,
    )
    .unwrap();

    for id in 1..=12i64 {
        let content = match id % 3 {
            0 => "50% off",
            1 => "500 items",
            _ => "plain",
        };
        conn.execute(
            r#"INSERT INTO "posts" VALUES (?1, ?2, ?3, ?4)"#,
            params![id, format!("2024-03-01T10:{:02}:00Z", id / 2), format!("Post {id}"), content],
        )
        .unwrap();
        conn.execute(r#"INSERT INTO "post_tags" VALUES (?1, ?2)"#, params![id, id % 4])
            .unwrap();
    }
    conn
}

fn to_sql(value: &Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Bool(b) => SqlValue::Integer(i64::from(*b)),
        Value::Int(i) => SqlValue::Integer(*i),
        Value::Float(f) => SqlValue::Real(*f),
        Value::String(s) => SqlValue::Text(s.clone()),
        Value::Array(_) => panic!("SQLite binds expanded IN lists, not arrays"),
    }
}

fn fetch(conn: &Connection, query: &SqlQuery) -> Vec<Json> {
    let mut stmt = conn.prepare(&query.sql).unwrap();
    let names: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
    let rows = stmt
        .query_map(params_from_iter(query.params.iter().map(to_sql)), |row| {
            let mut object = Map::new();
            for (i, name) in names.iter().enumerate() {
                let value = match row.get::<_, SqlValue>(i)? {
                    SqlValue::Integer(n) => json!(n),
                    SqlValue::Real(f) => json!(f),
                    SqlValue::Text(s) => json!(s),
                    SqlValue::Null | SqlValue::Blob(_) => Json::Null,
                };
                object.insert(name.clone(), value);
            }
            Ok(Json::Object(object))
        })
        .unwrap();
    rows.collect::<Result<_, _>>().unwrap()
}

fn count(conn: &Connection, query: &SqlQuery) -> u64 {
    let n: i64 = conn
        .query_row(
            &query.sql,
            params_from_iter(query.params.iter().map(to_sql)),
            |row| row.get(0),
        )
        .unwrap();
    u64::try_from(n).unwrap()
}

fn ids(rows: &[Json]) -> Vec<i64> {
    rows.iter().map(|r| r["id"].as_i64().unwrap()).collect()
}

#[test]
fn cursor_pages_cover_every_row_once() {
    let conn = setup();
    let table = posts_table();
    let mut cursor: Option<String> = None;
    let mut seen = Vec::new();
    let mut pages = 0;

    loop {
        let plan = CursorPlan::new(post_order(), &PageLimits::FEED, Some(5), cursor.as_deref()).unwrap();
        let sql = render_select(Sqlite, &table, &plan.query(Predicate::All)).unwrap();
        let (rows, envelope) = plan.finish(fetch(&conn, &sql)).unwrap();
        seen.extend(ids(&rows));
        pages += 1;
        if !envelope.has_more {
            assert_eq!(envelope.next_cursor, None);
            break;
        }
        cursor = envelope.next_cursor.map(|t| t.to_string());
    }

    assert_eq!(pages, 3);
    assert_eq!(seen, (1..=12).rev().collect::<Vec<_>>());
}

#[test]
fn cursor_survives_deleted_boundary_row() {
    let conn = setup();
    let table = posts_table();

    let first = CursorPlan::new(post_order(), &PageLimits::FEED, Some(5), None).unwrap();
    let sql = render_select(Sqlite, &table, &first.query(Predicate::All)).unwrap();
    let (rows, envelope) = first.finish(fetch(&conn, &sql)).unwrap();
    assert_eq!(ids(&rows), vec![12, 11, 10, 9, 8]);

    conn.execute(r#"DELETE FROM "posts" WHERE "id" = 8"#, []).unwrap();

    let token = envelope.next_cursor.unwrap().to_string();
    let next = CursorPlan::new(post_order(), &PageLimits::FEED, Some(5), Some(&token)).unwrap();
    let sql = render_select(Sqlite, &table, &next.query(Predicate::All)).unwrap();
    let (rows, envelope) = next.finish(fetch(&conn, &sql)).unwrap();
    assert_eq!(ids(&rows), vec![7, 6, 5, 4, 3]);
    assert!(envelope.has_more);
}

#[test]
fn search_matches_wildcards_literally() {
    let conn = setup();
    let term = sanitize_search_term(Some(&json!("50%")), SearchPolicy::Optional, 200)
        .unwrap()
        .unwrap();
    let predicate = Composer::new().text(Some(&term), POST_SEARCH_FIELDS).build();

    let sql = render_count(Sqlite, &posts_table(), &predicate).unwrap();
    assert_eq!(count(&conn, &sql), 4);
}

#[test]
fn search_is_case_insensitive() {
    let conn = setup();
    let term = sanitize_search_term(Some(&json!("POST 1")), SearchPolicy::Optional, 200)
        .unwrap()
        .unwrap();
    let predicate = Composer::new().text(Some(&term), POST_SEARCH_FIELDS).build();

    let plan = CursorPlan::new(post_order(), &PageLimits::FEED, Some(10), None).unwrap();
    let sql = render_select(Sqlite, &posts_table(), &plan.query(predicate)).unwrap();
    let (rows, _) = plan.finish(fetch(&conn, &sql)).unwrap();
    assert_eq!(ids(&rows), vec![12, 11, 10, 1]);
}

#[test]
fn tags_and_search_combine() {
    let conn = setup();
    let term = sanitize_search_term(Some(&json!("50%")), SearchPolicy::Optional, 200)
        .unwrap()
        .unwrap();
    let predicate = Composer::new()
        .text(Some(&term), POST_SEARCH_FIELDS)
        .tags(&[3], POST_TAGS)
        .build();

    let plan = CursorPlan::new(post_order(), &PageLimits::FEED, Some(10), None).unwrap();
    let sql = render_select(Sqlite, &posts_table(), &plan.query(predicate)).unwrap();
    let (rows, envelope) = plan.finish(fetch(&conn, &sql)).unwrap();
    assert_eq!(ids(&rows), vec![3]);
    assert!(!envelope.has_more);
}

#[test]
fn tag_membership_matches_any_id() {
    let conn = setup();
    let predicate = Composer::new().tags(&[1, 2], POST_TAGS).build();

    let sql = render_count(Sqlite, &posts_table(), &predicate).unwrap();
    insta::assert_snapshot!(sql.sql, @r#"SELECT COUNT(*) FROM "posts" WHERE EXISTS (SELECT 1 FROM "post_tags" WHERE "post_tags"."postId" = "posts"."id" AND "post_tags"."tagId" IN (?1, ?2))"#);
    assert_eq!(count(&conn, &sql), 6);
}

#[test]
fn offset_page_with_total() {
    let conn = setup();
    let table = posts_table();
    let plan = OffsetPlan::new(post_order(), &PageLimits::ADMIN, Some(5), Some(2)).unwrap();

    let rows = fetch(&conn, &render_select(Sqlite, &table, &plan.query(Predicate::All)).unwrap());
    let total = count(&conn, &render_count(Sqlite, &table, &Predicate::All).unwrap());
    let (rows, envelope) = plan.finish(rows, total);

    assert_eq!(ids(&rows), vec![7, 6, 5, 4, 3]);
    assert_eq!(envelope.total, 12);
    assert_eq!(envelope.total_pages, 3);
    assert!(envelope.has_next);
    assert!(envelope.has_previous);
}

#[test]
fn offset_past_the_end_is_empty() {
    let conn = setup();
    let table = posts_table();
    let plan = OffsetPlan::new(post_order(), &PageLimits::ADMIN, Some(5), Some(9)).unwrap();

    let rows = fetch(&conn, &render_select(Sqlite, &table, &plan.query(Predicate::All)).unwrap());
    let (rows, envelope) = plan.finish(rows, 12);
    assert!(rows.is_empty());
    assert!(!envelope.has_next);
}

#[test]
fn match_all_branch_drops_sibling_params() {
    let conn = setup();
    let predicate = Predicate::And(vec![
        Predicate::Or(vec![Predicate::eq("title", "Post 3"), Predicate::All]),
        Predicate::Or(vec![Predicate::eq("content", "plain"), Predicate::And(Vec::new())]),
        Predicate::eq("id", 5i64),
    ]);

    let sql = render_count(Sqlite, &posts_table(), &predicate).unwrap();
    assert_eq!(sql.sql, r#"SELECT COUNT(*) FROM "posts" WHERE "id" = ?1"#);
    assert_eq!(sql.params, vec![Value::Int(5)]);
    assert_eq!(count(&conn, &sql), 1);

    let query = QueryDescriptor {
        predicate,
        order_by: post_order(),
        take: 10,
        skip: 0,
        seek: None,
    };
    let rows = fetch(&conn, &render_select(Sqlite, &posts_table(), &query).unwrap());
    assert_eq!(ids(&rows), vec![5]);
}

#[test]
fn dialects_are_plain_values() {
    let predicate = Predicate::eq("id", 1i64);
    let pg = render_count(Postgres, &posts_table(), &predicate).unwrap();
    let lite = render_count(Sqlite, &posts_table(), &predicate).unwrap();
    assert_eq!(pg.sql, r#"SELECT COUNT(*) FROM "posts" WHERE "id" = $1"#);
    assert_eq!(lite.sql, r#"SELECT COUNT(*) FROM "posts" WHERE "id" = ?1"#);
}
