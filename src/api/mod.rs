pub mod health;
pub mod metrics;
pub mod pages;
mod routes;

pub use routes::{api_routes, page_routes};
