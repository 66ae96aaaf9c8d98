use crate::models::book::Book;
use crate::models::query::Query;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq)]
pub struct ResultPage {
    pub query: Query,
    pub page: u32,
    pub books: Vec<Book>,
    pub total: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedViewState {
    pub query: Query,
    pub books: Vec<Book>,
    pub total: u64,
    pub page: u32,
    pub has_more: bool,
}
