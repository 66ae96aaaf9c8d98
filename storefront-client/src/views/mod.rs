pub mod grid;
pub mod stars;
