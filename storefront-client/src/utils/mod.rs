pub mod cancel;
pub mod security;
