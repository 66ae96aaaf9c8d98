use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::collections::HashSet;
use storefront_client::models::book::Book;
use storefront_client::models::page::CachedViewState;
use storefront_client::models::query::{Query, SortOrder, YearRange};
use storefront_client::models::responses::{SearchDoc, SearchResponse};
use storefront_client::services::catalog::search_params;
use storefront_client::services::coordinator::{SessionSnapshot, ViewPhase};
use storefront_client::views::grid::page_view;

fn sample_docs(count: usize) -> Vec<SearchDoc> {
    (0..count)
        .map(|i| SearchDoc {
            key: format!("/works/OL{}W", i),
            title: Some(format!("Test Book {}", i)),
            author_name: Some(vec![format!("Test Author {}", i % 50)]),
            cover_i: Some(1_000_000 + i as i64),
            first_publish_year: Some(1800 + (i % 200) as i32),
            ratings_average: Some(3.5 + (i % 3) as f64 * 0.5),
            ratings_count: Some(i as u64),
            ..SearchDoc::default()
        })
        .collect()
}

fn sample_books(count: usize) -> Vec<Book> {
    sample_docs(count)
        .into_iter()
        .map(|doc| Book::from_doc(doc, "https://covers.openlibrary.org"))
        .collect()
}

fn benchmark_search_params(c: &mut Criterion) {
    let mut filtered = Query::search("history");
    filtered.filters.genre = Some("science".to_string());
    filtered.filters.year = Some(YearRange { start: 1990, end: Some(2000) });
    filtered.filters.sort = SortOrder::Rating;
    let queries = [Query::popular(), Query::search("pride and prejudice"), filtered];

    c.bench_function("search_params", |b| {
        b.iter(|| {
            for query in &queries {
                black_box(search_params(black_box(query), black_box(3)));
            }
        })
    });
}

fn benchmark_parse_search_response(c: &mut Criterion) {
    let docs: Vec<serde_json::Value> = (0..20)
        .map(|i| {
            serde_json::json!({
                "key": format!("/works/OL{}W", i),
                "title": format!("Test Book {}", i),
                "author_name": ["Jane Austen"],
                "cover_i": 8_000_000 + i,
                "first_publish_year": 1813,
                "subject": ["Fiction", "Romance", "England"]
            })
        })
        .collect();
    let body = serde_json::json!({ "numFound": 5000, "docs": docs }).to_string();

    c.bench_function("parse_search_page", |b| {
        b.iter(|| {
            let response: SearchResponse = serde_json::from_str(black_box(&body)).unwrap();
            let books: Vec<Book> = response
                .docs
                .unwrap_or_default()
                .into_iter()
                .map(|doc| Book::from_doc(doc, "https://covers.openlibrary.org"))
                .collect();
            black_box(books)
        })
    });
}

fn benchmark_page_state_serialization(c: &mut Criterion) {
    let state = CachedViewState {
        query: Query::search("sea stories"),
        books: sample_books(100),
        total: 4321,
        page: 5,
        has_more: true,
    };
    let encoded = serde_json::to_string(&state).unwrap();

    c.bench_function("page_state_encode", |b| {
        b.iter(|| black_box(serde_json::to_string(black_box(&state)).unwrap()))
    });

    c.bench_function("page_state_decode", |b| {
        b.iter(|| {
            black_box(serde_json::from_str::<CachedViewState>(black_box(&encoded)).unwrap())
        })
    });
}

fn benchmark_page_view(c: &mut Criterion) {
    let books = sample_books(100);
    let wishlisted: HashSet<String> = books.iter().step_by(7).map(|b| b.key.clone()).collect();
    let snapshot = SessionSnapshot {
        query: Query::search("sea stories"),
        books,
        total: 4321,
        page: 5,
        has_more: true,
        phase: ViewPhase::Displayed,
        failed: false,
    };

    c.bench_function("page_view_100_books", |b| {
        b.iter(|| black_box(page_view(black_box(&snapshot), black_box(&wishlisted))))
    });
}

criterion_group!(
    benches,
    benchmark_search_params,
    benchmark_parse_search_response,
    benchmark_page_state_serialization,
    benchmark_page_view
);
criterion_main!(benches);
