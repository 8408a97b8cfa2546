pub mod types;

pub use types::{
    AnalysisResult, AnalyzeRequest, EditRequest, ErrorResult, HealthStatus, OperationKind,
    OperationResult, PreviewResult, Service, SuccessResult,
};

use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, instrument, warn};

use crate::config::BackendConfig;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Request to the editor backend failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Editor backend returned a non-JSON response (HTTP {status})")]
    NotJson { status: u16 },

    #[error("Unexpected response shape from the editor backend: {0}")]
    Decode(#[from] serde_json::Error),
}

/// The editor backend as seen by the console.
///
/// Implementations must be Send + Sync so probes and operations can run
/// concurrently on the same backend.
#[async_trait]
pub trait EditBackend: Send + Sync {
    /// Ask the backend whether it can reach `service`.
    async fn probe(&self, service: Service) -> Result<bool, ApiError>;

    /// Run one edit operation and decode its result.
    async fn submit(
        &self,
        kind: OperationKind,
        request: &EditRequest,
    ) -> Result<OperationResult, ApiError>;

    /// Summarize a repository: languages, important files, layout.
    async fn analyze(&self, request: &AnalyzeRequest) -> Result<OperationResult, ApiError>;

    async fn health(&self) -> Result<HealthStatus, ApiError>;
}

/// JSON-over-HTTP client for the editor backend.
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(config: &BackendConfig) -> Result<Self, ApiError> {
        let mut builder = reqwest::Client::builder().user_agent("edit-console");
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        Ok(Self {
            client: builder.build()?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn post<T: serde::Serialize + Sync>(
        &self,
        kind: OperationKind,
        body: &T,
    ) -> Result<OperationResult, ApiError> {
        let response = self
            .client
            .post(self.url(kind.endpoint()))
            .json(body)
            .send()
            .await?;

        let body = Self::read_json(response).await?;
        OperationResult::from_response(kind, body)
    }

    /// Read a response body as JSON whatever its status code; the backend's
    /// error handlers answer 4xx/5xx with structured bodies.
    async fn read_json(response: reqwest::Response) -> Result<Value, ApiError> {
        let status = response.status().as_u16();
        let text = response.text().await?;
        debug!(status, body_bytes = text.len(), "received backend response");

        serde_json::from_str(&text).map_err(|_| {
            warn!(status, "backend response is not JSON");
            ApiError::NotJson { status }
        })
    }
}

#[async_trait]
impl EditBackend for HttpBackend {
    #[instrument(skip(self), fields(endpoint = service.probe_endpoint()))]
    async fn probe(&self, service: Service) -> Result<bool, ApiError> {
        let response = self.client.get(self.url(service.probe_endpoint())).send().await?;
        let body = Self::read_json(response).await?;
        let probe: types::ProbeResponse = serde_json::from_value(body)?;

        if !probe.success {
            let reason = probe.error.or(probe.message).unwrap_or_default();
            debug!(%service, %reason, "probe reported service unavailable");
        }
        Ok(probe.success)
    }

    #[instrument(skip(self, request), fields(endpoint = kind.endpoint(), repo_url = %request.repo_url))]
    async fn submit(
        &self,
        kind: OperationKind,
        request: &EditRequest,
    ) -> Result<OperationResult, ApiError> {
        debug!(create_pr = request.create_pr, branch = ?request.branch_name, "posting edit request");
        self.post(kind, request).await
    }

    #[instrument(skip(self, request), fields(repo_url = %request.repo_url))]
    async fn analyze(&self, request: &AnalyzeRequest) -> Result<OperationResult, ApiError> {
        self.post(OperationKind::Analyze, request).await
    }

    #[instrument(skip(self))]
    async fn health(&self) -> Result<HealthStatus, ApiError> {
        let response = self
            .client
            .get(self.url("/api/health"))
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json::<HealthStatus>().await?)
    }
}
