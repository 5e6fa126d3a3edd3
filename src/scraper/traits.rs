use crate::model::FetchError;

/// Source of raw page bytes for a post URL.
#[async_trait::async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch_page(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}
