pub mod config;
pub mod models;
pub mod services;
pub mod storefront;
pub mod utils;
pub mod views;

pub use config::StorefrontConfig;
pub use storefront::{Storefront, StorefrontError};
