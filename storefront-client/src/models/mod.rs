pub mod account;
pub mod book;
pub mod details;
pub mod page;
pub mod query;
pub mod responses;
pub mod storage;
pub mod wishlist;
