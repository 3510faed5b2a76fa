//! HTTP implementation of [`ExecutionClient`] over reqwest.

use async_trait::async_trait;
use chaosdeck_types::{
    ActionRequest, ActionResponse, ConfigResponse, FuncTestRequest, TestExecutionResponse,
    TestcasesResponse,
};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::{ClientError, ExecutionClient, Result};

/// Error body of a failed `/api/action` call.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    detail: Option<String>,
}

#[derive(Clone)]
pub struct HttpClient {
    base_url: String,
    http: reqwest::Client,
}

impl HttpClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self.http.get(self.url(path)).send().await?;
        let status = response.status();
        if !status.is_success() {
            tracing::warn!(path, status = status.as_u16(), "GET failed");
            return Err(ClientError::Status(status.as_u16()));
        }
        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl ExecutionClient for HttpClient {
    async fn health(&self) -> Result<()> {
        let response = self.http.get(self.url("/api/health")).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Status(status.as_u16()));
        }
        Ok(())
    }

    async fn fetch_config(&self) -> Result<ConfigResponse> {
        self.get_json("/api/config").await
    }

    async fn fetch_testcases(&self) -> Result<TestcasesResponse> {
        self.get_json("/api/testcases").await
    }

    async fn dispatch(&self, request: &ActionRequest) -> Result<ActionResponse> {
        tracing::debug!(action = %request.action, "dispatching action");
        let response = self
            .http
            .post(self.url("/api/action"))
            .json(request)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            // The service reports dispatch problems as {"detail": ...}; fall
            // back to the bare status when the body carries nothing usable.
            let body = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<ErrorBody>(&body)
                .ok()
                .and_then(|b| b.detail);
            tracing::warn!(action = %request.action, status = status.as_u16(), "dispatch failed");
            return Err(match detail {
                Some(detail) if !detail.is_empty() => ClientError::Service(detail),
                _ => ClientError::Status(status.as_u16()),
            });
        }
        Ok(response.json::<ActionResponse>().await?)
    }

    async fn run_functest(&self, request: &FuncTestRequest) -> Result<TestExecutionResponse> {
        tracing::debug!(key = %request.key, "running functional test");
        let response = self
            .http
            .post(self.url("/api/functest"))
            .json(request)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            // Functest failures come back as raw error text.
            let text = response.text().await.unwrap_or_default();
            return Err(if text.is_empty() {
                ClientError::Status(status.as_u16())
            } else {
                ClientError::Service(format!("HTTP {}: {}", status.as_u16(), text))
            });
        }
        Ok(response.json::<TestExecutionResponse>().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_is_normalized() {
        let client = HttpClient::new("http://127.0.0.1:8000/");
        assert_eq!(client.url("/api/health"), "http://127.0.0.1:8000/api/health");
    }

    #[test]
    fn error_body_detail_is_optional() {
        let body: ErrorBody = serde_json::from_str(r#"{"detail":"unknown action"}"#).unwrap();
        assert_eq!(body.detail.as_deref(), Some("unknown action"));
        let empty: ErrorBody = serde_json::from_str("{}").unwrap();
        assert!(empty.detail.is_none());
    }
}
