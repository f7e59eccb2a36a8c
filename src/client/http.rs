use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Url};
use serde_json::Value;
use tracing::{debug, info};

use crate::client::payload::{parse_foods, parse_history, parse_outcome};
use crate::client::{ClientError, OptimizerApi};
use crate::config::BackendConfig;
use crate::types::{Food, HistoryEntry, OptimizeOutcome, OptimizeRequest};

const USER_AGENT: &str = concat!("diet-dashboard/", env!("CARGO_PKG_VERSION"));
const ERROR_PREVIEW_CHARS: usize = 180;

#[derive(Debug, Clone)]
pub struct HttpOptimizerClient {
    client: Client,
    base: Url,
    timeout: Duration,
}

impl HttpOptimizerClient {
    pub fn new(backend: &BackendConfig) -> Result<Self, ClientError> {
        let base = Url::parse(backend.url.trim())
            .map_err(|e| ClientError::InvalidUrl(format!("{}: {e}", backend.url)))?;
        if base.cannot_be_a_base() || !matches!(base.scheme(), "http" | "https") {
            return Err(ClientError::InvalidUrl(backend.url.clone()));
        }
        let timeout = backend.request_timeout();
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .connect_timeout(backend.connect_timeout())
            .build()
            .map_err(|e| ClientError::Setup(e.to_string()))?;
        Ok(Self {
            client,
            base,
            timeout,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        // `new` rejects cannot-be-a-base URLs, so this always succeeds.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn execute(
        &self,
        method: &'static str,
        url: &Url,
        request: RequestBuilder,
    ) -> Result<String, ClientError> {
        debug!("{method} {url}");
        let response = request
            .send()
            .await
            .map_err(|err| self.transport_error(url, err))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| self.transport_error(url, err))?;
        if !status.is_success() {
            return Err(ClientError::Status {
                method,
                url: url.to_string(),
                status: status.as_u16(),
                preview: body.chars().take(ERROR_PREVIEW_CHARS).collect(),
            });
        }
        Ok(body)
    }

    async fn fetch_json(&self, url: &Url) -> Result<Value, ClientError> {
        let body = self
            .execute("GET", url, self.client.get(url.clone()))
            .await?;
        decode_json(url, &body)
    }

    fn transport_error(&self, url: &Url, err: reqwest::Error) -> ClientError {
        if err.is_timeout() {
            ClientError::Timeout {
                url: url.to_string(),
                after: self.timeout,
            }
        } else {
            ClientError::Unreachable {
                url: url.to_string(),
                source: err,
            }
        }
    }
}

#[async_trait]
impl OptimizerApi for HttpOptimizerClient {
    async fn submit_optimization(
        &self,
        request: &OptimizeRequest,
    ) -> Result<OptimizeOutcome, ClientError> {
        let url = self.endpoint(&["optimize"]);
        info!(
            technique = request.technique.as_slug(),
            budget = request.budget,
            "submitting optimization"
        );
        let body = self
            .execute("POST", &url, self.client.post(url.clone()).json(request))
            .await?;
        let value = decode_json(&url, &body)?;
        parse_outcome(&value, request.technique).ok_or_else(|| ClientError::Decode {
            url: url.to_string(),
            message: format!(
                "expected ga and csp results for technique {}",
                request.technique.as_slug()
            ),
        })
    }

    async fn list_foods(&self) -> Result<Vec<Food>, ClientError> {
        let url = self.endpoint(&["foods"]);
        let value = self.fetch_json(&url).await?;
        parse_foods(&value).ok_or_else(|| ClientError::Decode {
            url: url.to_string(),
            message: "expected a list of foods".to_string(),
        })
    }

    async fn create_food(&self, food: &Food) -> Result<(), ClientError> {
        let url = self.endpoint(&["foods"]);
        info!(food = food.name.as_str(), "adding food");
        self.execute("POST", &url, self.client.post(url.clone()).json(food))
            .await?;
        Ok(())
    }

    async fn delete_food(&self, name: &str) -> Result<(), ClientError> {
        let url = self.endpoint(&["foods", name]);
        info!(food = name, "deleting food");
        self.execute("DELETE", &url, self.client.delete(url.clone()))
            .await?;
        Ok(())
    }

    async fn list_history(&self) -> Result<Vec<HistoryEntry>, ClientError> {
        let url = self.endpoint(&["results"]);
        let value = self.fetch_json(&url).await?;
        let entries = parse_history(&value).ok_or_else(|| ClientError::Decode {
            url: url.to_string(),
            message: "expected a list of results".to_string(),
        })?;
        debug!("loaded {} history entries", entries.len());
        Ok(entries)
    }
}

fn decode_json(url: &Url, body: &str) -> Result<Value, ClientError> {
    serde_json::from_str(body).map_err(|e| ClientError::Decode {
        url: url.to_string(),
        message: e.to_string(),
    })
}
