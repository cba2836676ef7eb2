//! URL preview core: classification, outbound fetch, and HTML metadata extraction.

pub mod classify;
pub mod extractor;
pub mod fetcher;
pub mod guard;

pub use classify::file_name_from_url;
pub use extractor::extract;
pub use fetcher::{fetch_preview, FetchError, FetchedPage, HttpFetcher, PageFetcher};
