//! Benchmarks for SQL rendering.
//!
//! Run with: cargo bench -p pagekit-sql

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use pagekit::listing::post_order;
use pagekit::{CursorPosition, Predicate, QueryDescriptor, Seek, Value};
use pagekit_sql::{Postgres, Relation, Sqlite, TableSpec, is_valid_identifier, render_count, render_select};

fn posts() -> TableSpec {
    TableSpec::new("posts", "id").relation(Relation::new("tags", "post_tags", "postId"))
}

fn search_predicate() -> Predicate {
    Predicate::And(vec![
        Predicate::Or(vec![
            Predicate::contains("title", "rust"),
            Predicate::contains("content", "rust"),
        ]),
        Predicate::membership("tags", "tagId", vec![1, 2, 3, 4, 5]),
    ])
}

fn bench_identifiers(c: &mut Criterion) {
    let mut group = c.benchmark_group("identifier");
    for (name, ident) in [("short", "id"), ("camel", "createdAt"), ("invalid", "id\"; DROP TABLE posts--")] {
        group.bench_with_input(BenchmarkId::new("validate", name), ident, |b, s| {
            b.iter(|| is_valid_identifier(black_box(s)));
        });
    }
    group.finish();
}

fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("render");
    let table = posts();

    let first_page = QueryDescriptor {
        predicate: search_predicate(),
        order_by: post_order(),
        take: 11,
        skip: 0,
        seek: None,
    };
    let next_page = QueryDescriptor {
        seek: Some(Seek {
            position: CursorPosition::new(vec![
                ("createdAt".to_string(), Value::from("2024-03-01T10:15:00Z")),
                ("id".to_string(), Value::Int(9_812_334)),
            ]),
            skip: 1,
        }),
        ..first_page.clone()
    };

    group.bench_function("select_postgres", |b| {
        b.iter(|| render_select(Postgres, &table, black_box(&first_page)));
    });
    group.bench_function("select_sqlite_seek", |b| {
        b.iter(|| render_select(Sqlite, &table, black_box(&next_page)));
    });
    group.bench_function("count_sqlite", |b| {
        b.iter(|| render_count(Sqlite, &table, black_box(&first_page.predicate)));
    });

    group.finish();
}

criterion_group!(benches, bench_identifiers, bench_render);
criterion_main!(benches);
