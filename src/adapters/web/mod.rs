//! Evidence fetchers.

pub mod html;
pub mod http_fetcher;
pub mod static_fetcher;

pub use http_fetcher::HttpEvidenceFetcher;
pub use static_fetcher::StaticEvidenceFetcher;
