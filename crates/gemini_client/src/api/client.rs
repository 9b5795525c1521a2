//! GeminiClient - reqwest-backed implementation of [`GenerativeClient`].

use async_trait::async_trait;
use eventsource_stream::Eventsource;
use futures_util::StreamExt;
use log::{debug, warn};
use reqwest::Client;

use crate::api::models::{
    Content, CountTokensRequest, CountTokensResponse, GenerateContentRequest,
    GenerateContentResponse,
};
use crate::client_trait::{GenerativeClient, TextChunkStream};
use crate::config::GeminiConfig;
use crate::error::{GeminiError, Result};

const API_KEY_HEADER: &str = "x-goog-api-key";

#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: Client,
    config: GeminiConfig,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Self {
        Self {
            http: Client::new(),
            config,
        }
    }

    fn endpoint(&self, operation: &str) -> String {
        format!(
            "{}/models/{}:{}",
            self.config.api_base, self.config.model, operation
        )
    }

    /// Surface non-2xx responses as typed API errors with the body text.
    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response.text().await.unwrap_or_default();
        warn!("Gemini API returned {status}: {message}");
        Err(GeminiError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl GenerativeClient for GeminiClient {
    async fn count_tokens(&self, contents: &[Content]) -> Result<u32> {
        let request = CountTokensRequest {
            contents: contents.to_vec(),
        };
        let response = self
            .http
            .post(self.endpoint("countTokens"))
            .header(API_KEY_HEADER, &self.config.api_key)
            .json(&request)
            .send()
            .await?;
        let response = Self::check_status(response).await?;
        let counted: CountTokensResponse = response.json().await?;
        debug!("countTokens -> {}", counted.total_tokens);
        Ok(counted.total_tokens)
    }

    async fn stream_generate(&self, request: GenerateContentRequest) -> Result<TextChunkStream> {
        let response = self
            .http
            .post(self.endpoint("streamGenerateContent"))
            .query(&[("alt", "sse")])
            .header(API_KEY_HEADER, &self.config.api_key)
            .json(&request)
            .send()
            .await?;
        let response = Self::check_status(response).await?;

        let stream = response.bytes_stream().eventsource().map(|event| {
            match event {
                Ok(event) => serde_json::from_str::<GenerateContentResponse>(&event.data)
                    .map(|chunk| chunk.text())
                    .map_err(GeminiError::from),
                Err(err) => Err(GeminiError::Stream(err.to_string())),
            }
        });

        Ok(Box::pin(stream))
    }
}
