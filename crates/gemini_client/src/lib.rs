//! gemini_client - Streaming Gemini API client
//!
//! A thin typed client over the Gemini REST surface: SSE-streamed
//! `generateContent` plus the `countTokens` sidecar call. The
//! [`GenerativeClient`] trait is the seam the chat orchestrator consumes;
//! [`GeminiClient`] is the reqwest-backed implementation.

pub mod api;
pub mod client_trait;
pub mod config;
pub mod error;

pub use api::client::GeminiClient;
pub use api::models::{
    Blob, Candidate, Content, CountTokensRequest, CountTokensResponse, GenerateContentRequest,
    GenerateContentResponse, Part, ROLE_MODEL, ROLE_USER,
};
pub use client_trait::{GenerativeClient, TextChunkStream};
pub use config::GeminiConfig;
pub use error::{GeminiError, Result};
