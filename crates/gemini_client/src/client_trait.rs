use std::pin::Pin;

use async_trait::async_trait;
use futures_util::Stream;

use crate::api::models::{Content, GenerateContentRequest};
use crate::error::Result;

/// Incremental response text, one item per streamed chunk.
pub type TextChunkStream = Pin<Box<dyn Stream<Item = Result<String>> + Send>>;

#[async_trait]
pub trait GenerativeClient: Send + Sync {
    /// Count tokens for the given content, using the same shape the
    /// generation call accepts.
    async fn count_tokens(&self, contents: &[Content]) -> Result<u32>;

    /// Open a streaming generation request. Chunks arrive in order; the
    /// stream terminates normally at end of response.
    async fn stream_generate(&self, request: GenerateContentRequest) -> Result<TextChunkStream>;
}
