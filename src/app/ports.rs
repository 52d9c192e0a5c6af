use async_trait::async_trait;

/// Page retrieval boundary.
///
/// Implementations apply their own politeness delay and timeout, and report any
/// network or HTTP failure as `None` rather than an error. Callers never retry.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Option<String>;
}
