use crate::models::book::Book;
use crate::models::query::Filters;
use crate::services::coordinator::{SessionSnapshot, ViewPhase};
use crate::views::stars::RatingView;
use serde::Serialize;
use std::collections::HashSet;

pub const EMPTY_MESSAGE: &str = "No books found. Try a different search term.";
pub const ERROR_MESSAGE: &str =
    "Unable to load books. Please check your internet connection and try again.";
pub const POPULAR_TITLE: &str = "Popular Books";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Cover {
    Image(String),
    /// No cover on file; draw a generated one from title and author.
    Placeholder { title: String, author: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookCard {
    pub key: String,
    pub title: String,
    pub author: String,
    pub cover: Cover,
    pub release_year: Option<i32>,
    pub rating: Option<RatingView>,
    pub condition: &'static str,
    pub condition_class: String,
    pub price: String,
    pub wishlisted: bool,
    pub details_href: String,
}

impl BookCard {
    pub fn new(book: &Book, wishlisted: bool) -> Self {
        let cover = match book.cover_url {
            Some(ref url) => Cover::Image(url.clone()),
            None => Cover::Placeholder {
                title: book.title.clone(),
                author: book.author.clone(),
            },
        };

        Self {
            key: book.key.clone(),
            title: book.title.clone(),
            author: book.author.clone(),
            cover,
            release_year: book.published_year,
            rating: RatingView::from_rating(book.rating.as_ref()),
            condition: book.listing.condition.label(),
            condition_class: book.listing.condition.badge_class(),
            price: book.listing.price_label(),
            wishlisted,
            details_href: format!("/bd?id={}", book.key),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum GridView {
    Loading,
    Empty(&'static str),
    Error(&'static str),
    Books(Vec<BookCard>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageView {
    pub title: String,
    pub search_input: Option<String>,
    pub filters: Filters,
    pub sort_label: &'static str,
    pub grid: GridView,
    pub has_more: bool,
}

/// Filter-style terms (one word, no quotes) get the short title.
pub fn section_title(term: Option<&str>, total: u64) -> String {
    match term {
        None => POPULAR_TITLE.to_string(),
        Some(term) if !term.contains('"') && !term.contains(' ') => {
            format!("{} ({} books)", term, total)
        }
        Some(term) => format!("Search Results for \"{}\" ({} books found)", term, total),
    }
}

pub fn page_view(snapshot: &SessionSnapshot, wishlisted: &HashSet<String>) -> PageView {
    let grid = match snapshot.phase {
        ViewPhase::Loading => GridView::Loading,
        ViewPhase::Empty if snapshot.failed => GridView::Error(ERROR_MESSAGE),
        ViewPhase::Empty => GridView::Empty(EMPTY_MESSAGE),
        ViewPhase::Displayed if snapshot.books.is_empty() => GridView::Empty(EMPTY_MESSAGE),
        ViewPhase::Displayed => GridView::Books(
            snapshot
                .books
                .iter()
                .map(|book| BookCard::new(book, wishlisted.contains(&book.key)))
                .collect(),
        ),
    };

    PageView {
        title: section_title(snapshot.query.term.as_deref(), snapshot.total),
        search_input: snapshot.query.term.clone(),
        filters: snapshot.query.filters.clone(),
        sort_label: snapshot.query.filters.sort.label(),
        grid,
        has_more: snapshot.has_more,
    }
}
