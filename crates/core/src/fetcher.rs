//! The seam between chart logic and the HTTP layer.

use crate::abort::AbortHandle;
use crate::ChartResult;
use async_trait::async_trait;
use serde_json::Value;

/// Response to a write. Any HTTP status is a response; only transport failures are errors.
#[derive(Clone, Debug, PartialEq)]
pub struct SaveResponse {
    pub status: u16,
    pub body: Value,
}

/// Outbound requests against the server, by path relative to the server root.
#[async_trait]
pub trait ChartFetcher: Send + Sync {
    /// Issue a GET and decode the JSON body.
    ///
    /// Non-success statuses are returned as [`crate::ChartError::Http`].
    async fn get(&self, path: &str) -> ChartResult<Value>;

    /// Issue a POST with a JSON body, abandoning it if `abort` fires first.
    async fn post(&self, path: &str, body: &Value, abort: &AbortHandle)
        -> ChartResult<SaveResponse>;
}

#[async_trait]
impl<T> ChartFetcher for std::sync::Arc<T>
where
    T: ChartFetcher + ?Sized,
{
    async fn get(&self, path: &str) -> ChartResult<Value> {
        (**self).get(path).await
    }

    async fn post(
        &self,
        path: &str,
        body: &Value,
        abort: &AbortHandle,
    ) -> ChartResult<SaveResponse> {
        (**self).post(path, body, abort).await
    }
}
