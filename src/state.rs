use std::sync::Arc;

use crate::preview::PageFetcher;

/// Shared application state passed to all handlers.
/// Holds nothing mutable: every preview request is independent.
#[derive(Clone)]
pub struct AppState {
    pub fetcher: Arc<dyn PageFetcher>,
    pub block_private_addresses: bool,
}
