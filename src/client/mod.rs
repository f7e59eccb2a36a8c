pub mod http;
pub mod payload;

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::types::{Food, HistoryEntry, OptimizeOutcome, OptimizeRequest};

/// What the user sees for any transport-level failure.
pub const BACKEND_UNREACHABLE: &str = "Error connecting to backend.";

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("cannot reach backend at {url}: {source}")]
    Unreachable { url: String, source: reqwest::Error },
    #[error("request to {url} timed out after {after:?}")]
    Timeout { url: String, after: Duration },
    #[error("{method} {url} returned {status}: {preview}")]
    Status {
        method: &'static str,
        url: String,
        status: u16,
        preview: String,
    },
    #[error("unexpected payload from {url}: {message}")]
    Decode { url: String, message: String },
    #[error("invalid backend url: {0}")]
    InvalidUrl(String),
    #[error("failed to build HTTP client: {0}")]
    Setup(String),
}

impl ClientError {
    pub fn user_message(&self) -> &'static str {
        BACKEND_UNREACHABLE
    }
}

#[async_trait]
pub trait OptimizerApi: Send + Sync {
    async fn submit_optimization(
        &self,
        request: &OptimizeRequest,
    ) -> Result<OptimizeOutcome, ClientError>;
    async fn list_foods(&self) -> Result<Vec<Food>, ClientError>;
    async fn create_food(&self, food: &Food) -> Result<(), ClientError>;
    async fn delete_food(&self, name: &str) -> Result<(), ClientError>;
    async fn list_history(&self) -> Result<Vec<HistoryEntry>, ClientError>;
}
