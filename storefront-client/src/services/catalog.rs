use crate::models::book::{Book, Rating};
use crate::models::page::ResultPage;
use crate::models::query::Query;
use crate::models::responses::{RatingsResponse, SearchResponse};
use crate::utils::cancel::CancelToken;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, info};

pub const PAGE_SIZE: usize = 20;

/// Only the head of each page gets a dedicated ratings lookup.
pub const RATINGS_LOOKUP_LIMIT: usize = 10;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Catalog responded with status {0}")]
    Status(StatusCode),
    #[error("Malformed catalog response: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Request cancelled")]
    Cancelled,
}

impl CatalogError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, CatalogError::Cancelled)
    }
}

#[async_trait]
pub trait CatalogSource {
    async fn search(
        &self,
        query: &Query,
        page: u32,
        cancel: &CancelToken,
    ) -> Result<ResultPage, CatalogError>;
}

pub fn search_params(query: &Query, page: u32) -> Vec<(&'static str, String)> {
    let page = page.max(1);
    let mut params = vec![
        ("q", query.search_text()),
        ("limit", PAGE_SIZE.to_string()),
        ("offset", ((page as usize - 1) * PAGE_SIZE).to_string()),
    ];

    if !query.is_popular() {
        if let Some(sort) = query.filters.sort.as_param() {
            params.push(("sort", sort.to_string()));
        }
    }

    params
}

pub struct OpenLibraryCatalog {
    client: Client,
    base_url: String,
    covers_url: String,
}

impl OpenLibraryCatalog {
    pub fn new(client: Client, base_url: &str, covers_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            covers_url: covers_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn covers_url(&self) -> &str {
        &self.covers_url
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
        cancel: &CancelToken,
    ) -> Result<T, CatalogError> {
        let url = format!("{}{}", self.base_url, path);

        let fetch = async {
            let response = self.client.get(&url).query(params).send().await?;
            if !response.status().is_success() {
                return Err(CatalogError::Status(response.status()));
            }
            let body = response.text().await?;
            Ok(serde_json::from_str(&body)?)
        };

        cancel.guard(fetch).await.unwrap_or(Err(CatalogError::Cancelled))
    }

    pub async fn fetch_rating(
        &self,
        key: &str,
        cancel: &CancelToken,
    ) -> Result<Option<Rating>, CatalogError> {
        let response: RatingsResponse = self
            .get_json(&format!("{}/ratings.json", key), &[], cancel)
            .await?;

        Ok(response.summary.and_then(|summary| {
            summary.average.map(|average| Rating {
                average,
                count: summary.count.unwrap_or(0),
            })
        }))
    }

    async fn enrich_ratings(
        &self,
        books: &mut [Book],
        cancel: &CancelToken,
    ) -> Result<(), CatalogError> {
        for book in books.iter_mut().take(RATINGS_LOOKUP_LIMIT) {
            match self.fetch_rating(&book.key, cancel).await {
                Ok(Some(rating)) => book.rating = Some(rating),
                Ok(None) => {}
                Err(CatalogError::Cancelled) => return Err(CatalogError::Cancelled),
                Err(e) => debug!("Could not fetch ratings for {}: {}", book.key, e),
            }
        }
        Ok(())
    }
}

#[async_trait]
impl CatalogSource for OpenLibraryCatalog {
    async fn search(
        &self,
        query: &Query,
        page: u32,
        cancel: &CancelToken,
    ) -> Result<ResultPage, CatalogError> {
        let params = search_params(query, page);
        info!("Catalog search: {:?}", params);

        let response: SearchResponse = self.get_json("/search.json", &params, cancel).await?;

        let Some(docs) = response.docs else {
            return Ok(ResultPage {
                query: query.clone(),
                page,
                books: Vec::new(),
                total: 0,
            });
        };

        let mut books: Vec<Book> = docs
            .into_iter()
            .map(|doc| Book::from_doc(doc, &self.covers_url))
            .collect();

        self.enrich_ratings(&mut books, cancel).await?;

        let total = if query.is_popular() {
            books.len() as u64
        } else {
            response.num_found
        };

        Ok(ResultPage {
            query: query.clone(),
            page,
            books,
            total,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::query::{SortOrder, YearRange};

    fn param<'a>(params: &'a [(&'static str, String)], name: &str) -> Option<&'a str> {
        params
            .iter()
            .find(|(k, _)| *k == name)
            .map(|(_, v)| v.as_str())
    }

    #[test]
    fn first_page_params() {
        let params = search_params(&Query::search("dune"), 1);
        assert_eq!(param(&params, "q"), Some("dune"));
        assert_eq!(param(&params, "limit"), Some("20"));
        assert_eq!(param(&params, "offset"), Some("0"));
        assert_eq!(param(&params, "sort"), None);
    }

    #[test]
    fn later_pages_offset_by_page_size() {
        let params = search_params(&Query::search("dune"), 3);
        assert_eq!(param(&params, "offset"), Some("40"));
    }

    #[test]
    fn page_zero_is_treated_as_first() {
        let params = search_params(&Query::search("dune"), 0);
        assert_eq!(param(&params, "offset"), Some("0"));
    }

    #[test]
    fn sort_and_filters_are_encoded() {
        let mut query = Query::search("history");
        query.filters.sort = SortOrder::RatingAsc;
        query.filters.year = Some(YearRange { start: 2001, end: None });

        let params = search_params(&query, 1);
        assert_eq!(param(&params, "q"), Some("history first_publish_year:2001"));
        assert_eq!(param(&params, "sort"), Some("rating asc"));
    }

    #[test]
    fn popular_query_sends_no_sort() {
        let mut query = Query::popular();
        query.filters.sort = SortOrder::Title;

        let params = search_params(&query, 1);
        assert_eq!(param(&params, "q"), Some("fiction"));
        assert_eq!(param(&params, "sort"), None);
    }

    #[test]
    fn cancellation_is_distinguishable() {
        assert!(CatalogError::Cancelled.is_cancelled());
        assert!(!CatalogError::Status(StatusCode::BAD_GATEWAY).is_cancelled());
    }
}
