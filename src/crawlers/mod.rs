pub mod crawler;
pub mod plain;
pub mod scan;
pub mod web;

pub use crawler::{FetchStrategy, PageFetcher};
pub use plain::PlainFetcher;
pub use web::RenderFetcher;
