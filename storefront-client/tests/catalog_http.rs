use axum::extract::{Query as QueryParams, State};
use axum::http::{StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use storefront_client::models::query::{Query, SortOrder};
use storefront_client::services::catalog::{CatalogError, CatalogSource, OpenLibraryCatalog};
use storefront_client::services::details::load_book_details;
use storefront_client::utils::cancel::CancelToken;

#[derive(Clone, Default)]
struct Recorded {
    searches: Arc<Mutex<Vec<HashMap<String, String>>>>,
    ratings_lookups: Arc<Mutex<Vec<String>>>,
}

fn search_docs(count: usize) -> Value {
    let docs: Vec<Value> = (0..count)
        .map(|i| {
            json!({
                "key": format!("/works/OL{}W", i),
                "title": format!("Book {}", i),
                "author_name": ["Ann Author", "Bo Writer"],
                "cover_i": 1000 + i,
                "first_publish_year": 1990,
                "ratings_average": 3.0,
                "ratings_count": 2
            })
        })
        .collect();
    json!({ "numFound": 345, "docs": docs })
}

async fn open_library(
    State(recorded): State<Recorded>,
    QueryParams(params): QueryParams<HashMap<String, String>>,
    uri: Uri,
) -> Response {
    let path = uri.path().to_string();

    if path == "/search.json" {
        let q = params.get("q").cloned().unwrap_or_default();
        recorded.searches.lock().unwrap().push(params);
        return match q.as_str() {
            "empty" => Json(json!({ "numFound": 0 })).into_response(),
            "broken" => "not json".into_response(),
            "down" => StatusCode::SERVICE_UNAVAILABLE.into_response(),
            "slow" => {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Json(search_docs(1)).into_response()
            }
            "no-author" => Json(json!({ "docs": [{ "key": "/works/OL77W" }] })).into_response(),
            _ => Json(search_docs(12)).into_response(),
        };
    }

    if let Some(work) = path.strip_suffix("/ratings.json") {
        recorded.ratings_lookups.lock().unwrap().push(work.to_string());
        return Json(json!({ "summary": { "average": 4.5, "count": 10 } })).into_response();
    }

    match path.as_str() {
        "/works/OL1W.json" => Json(json!({
            "title": "Dune",
            "description": { "type": "/type/text", "value": "  Desert planet.  " },
            "covers": [123],
            "authors": [{ "author": { "key": "/authors/OL9A" } }],
            "first_publish_date": "1965",
            "subjects": ["Science fiction"]
        }))
        .into_response(),
        "/works/OL1W/editions.json" => Json(json!({
            "entries": [{
                "languages": [{ "key": "/languages/eng" }],
                "number_of_pages": 320,
                "publish_date": "June 1965"
            }]
        }))
        .into_response(),
        "/authors/OL9A.json" => Json(json!({ "name": "Frank Herbert" })).into_response(),
        "/works/OL2W.json" => Json(json!({
            "title": "Orphan",
            "description": "Plain text.",
            "authors": [{ "author": { "key": "/authors/OL404A" } }]
        }))
        .into_response(),
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn spawn_open_library() -> (String, Recorded) {
    let recorded = Recorded::default();
    let app = Router::new()
        .fallback(open_library)
        .with_state(recorded.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}", addr), recorded)
}

fn catalog(base: &str) -> OpenLibraryCatalog {
    OpenLibraryCatalog::new(reqwest::Client::new(), base, "https://covers.test")
}

#[tokio::test]
async fn search_sends_paging_and_sort_parameters() {
    let (base, recorded) = spawn_open_library().await;
    let mut query = Query::search("dune");
    query.filters.sort = SortOrder::Rating;

    catalog(&base)
        .search(&query, 2, &CancelToken::new())
        .await
        .unwrap();

    let searches = recorded.searches.lock().unwrap();
    let params = &searches[0];
    assert_eq!(params["q"], "dune");
    assert_eq!(params["limit"], "20");
    assert_eq!(params["offset"], "20");
    assert_eq!(params["sort"], "rating desc");
}

#[tokio::test]
async fn popular_search_uses_fiction_and_page_length_as_total() {
    let (base, recorded) = spawn_open_library().await;

    let page = catalog(&base)
        .search(&Query::popular(), 1, &CancelToken::new())
        .await
        .unwrap();

    assert_eq!(recorded.searches.lock().unwrap()[0]["q"], "fiction");
    assert!(!recorded.searches.lock().unwrap()[0].contains_key("sort"));
    assert_eq!(page.total, 12);
}

#[tokio::test]
async fn results_are_formatted_and_head_is_rated() {
    let (base, recorded) = spawn_open_library().await;

    let page = catalog(&base)
        .search(&Query::search("dune"), 1, &CancelToken::new())
        .await
        .unwrap();

    assert_eq!(page.total, 345);
    assert_eq!(page.books.len(), 12);

    let first = &page.books[0];
    assert_eq!(first.key, "/works/OL0W");
    assert_eq!(first.author, "Ann Author, Bo Writer");
    assert_eq!(
        first.cover_url.as_deref(),
        Some("https://covers.test/b/id/1000-M.jpg")
    );
    assert_eq!(first.published_year, Some(1990));

    assert_eq!(recorded.ratings_lookups.lock().unwrap().len(), 10);
    assert!(page.books[..10]
        .iter()
        .all(|b| b.rating.map(|r| r.average) == Some(4.5)));
    assert!(page.books[10..]
        .iter()
        .all(|b| b.rating.map(|r| r.average) == Some(3.0)));
}

#[tokio::test]
async fn missing_fields_fall_back_to_placeholders() {
    let (base, _) = spawn_open_library().await;

    let page = catalog(&base)
        .search(&Query::search("no-author"), 1, &CancelToken::new())
        .await
        .unwrap();

    let book = &page.books[0];
    assert_eq!(book.title, "Unknown Title");
    assert_eq!(book.author, "Unknown Author");
    assert!(book.cover_url.is_none());
    assert_eq!(page.total, 0);
}

#[tokio::test]
async fn missing_docs_is_an_empty_page() {
    let (base, _) = spawn_open_library().await;

    let page = catalog(&base)
        .search(&Query::search("empty"), 1, &CancelToken::new())
        .await
        .unwrap();

    assert!(page.books.is_empty());
    assert_eq!(page.total, 0);
}

#[tokio::test]
async fn malformed_and_failed_responses_are_errors() {
    let (base, _) = spawn_open_library().await;
    let catalog = catalog(&base);

    assert!(matches!(
        catalog
            .search(&Query::search("broken"), 1, &CancelToken::new())
            .await,
        Err(CatalogError::Parse(_))
    ));
    assert!(matches!(
        catalog
            .search(&Query::search("down"), 1, &CancelToken::new())
            .await,
        Err(CatalogError::Status(status)) if status.as_u16() == 503
    ));
}

#[tokio::test]
async fn cancelling_aborts_the_request() {
    let (base, _) = spawn_open_library().await;
    let token = CancelToken::new();

    let canceller = {
        let token = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            token.cancel();
        })
    };

    let result = tokio::time::timeout(
        Duration::from_secs(2),
        catalog(&base).search(&Query::search("slow"), 1, &token),
    )
    .await
    .expect("cancelled search should return promptly");

    canceller.await.unwrap();
    assert!(matches!(result, Err(CatalogError::Cancelled)));
}

#[tokio::test]
async fn book_details_combine_all_sources() {
    let (base, _) = spawn_open_library().await;

    let details = load_book_details(&catalog(&base), "OL1W", &CancelToken::new())
        .await
        .unwrap();

    assert_eq!(details.key, "/works/OL1W");
    assert_eq!(details.title, "Dune");
    assert_eq!(details.author, "Frank Herbert");
    assert_eq!(
        details.cover_url.as_deref(),
        Some("https://covers.test/b/id/123-L.jpg")
    );
    assert_eq!(details.language.as_deref(), Some("English"));
    assert_eq!(details.pages.as_deref(), Some("320"));
    assert_eq!(details.release_date, "June 1965");
    assert_eq!(details.description.as_deref(), Some("Desert planet."));
    assert_eq!(details.rating.map(|r| r.count), Some(10));
    assert_eq!(details.genres, vec!["Science fiction".to_string()]);
}

#[tokio::test]
async fn book_details_survive_missing_secondary_records() {
    let (base, _) = spawn_open_library().await;

    let details = load_book_details(&catalog(&base), "/works/OL2W", &CancelToken::new())
        .await
        .unwrap();

    assert_eq!(details.title, "Orphan");
    assert_eq!(details.author, "Unknown Author");
    assert_eq!(details.description.as_deref(), Some("Plain text."));
    assert!(details.language.is_none());
    assert_eq!(details.release_date, "Unknown");
}

#[tokio::test]
async fn unknown_work_is_an_error() {
    let (base, _) = spawn_open_library().await;

    let result = load_book_details(&catalog(&base), "OL404W", &CancelToken::new()).await;
    assert!(matches!(
        result,
        Err(CatalogError::Status(status)) if status.as_u16() == 404
    ));
}
