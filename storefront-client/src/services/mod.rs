pub mod auth;
pub mod catalog;
pub mod coordinator;
pub mod details;
pub mod page_cache;
pub mod wishlist;
