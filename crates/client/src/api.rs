//! Network seam between the controller and the dashboard service.

use crate::config::ClientConfig;
use api_shared::dto::{
    DashboardRes, ErrorRes, HealthRes, InsightReq, InsightRes, SummaryReq, SummaryRes,
};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    #[error("invalid API base URL: {0}")]
    InvalidBaseUrl(String),
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(String),
    #[error("request failed: {0}")]
    Transport(String),
    #[error(
        "server returned {status}{}",
        .message.as_deref().map(|m| format!(": {m}")).unwrap_or_default()
    )]
    Server { status: u16, message: Option<String> },
    #[error("failed to decode response: {0}")]
    Decode(String),
}

/// The three dashboard endpoints.
#[async_trait::async_trait]
pub trait DashboardApi: Send + Sync {
    /// `GET /dashboard`
    async fn dashboard(&self) -> Result<DashboardRes, ApiError>;

    /// `POST /insight`
    async fn insight(&self, req: &InsightReq) -> Result<InsightRes, ApiError>;

    /// `POST /summary`
    ///
    /// Any 2xx counts as success. The body is returned when it parses as a `SummaryRes`.
    async fn save_summary(&self, req: &SummaryReq) -> Result<Option<SummaryRes>, ApiError>;
}

/// reqwest implementation of [`DashboardApi`].
#[derive(Clone, Debug)]
pub struct HttpDashboardApi {
    config: ClientConfig,
    client: reqwest::Client,
}

impl HttpDashboardApi {
    /// # Errors
    /// Returns `ApiError::ClientBuild` if the HTTP client cannot be constructed.
    pub fn new(config: ClientConfig) -> Result<Self, ApiError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| ApiError::ClientBuild(e.to_string()))?;

        Ok(Self { config, client })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// `GET /health`
    pub async fn health(&self) -> Result<HealthRes, ApiError> {
        let response = self
            .client
            .get(self.config.endpoint("/health"))
            .send()
            .await
            .map_err(transport)?;
        let text = checked_body(response).await?;
        serde_json::from_str(&text).map_err(|e| ApiError::Decode(e.to_string()))
    }
}

fn transport(e: reqwest::Error) -> ApiError {
    ApiError::Transport(e.to_string())
}

/// Reads the body of a response, turning non-2xx statuses into `ApiError::Server`.
///
/// The server's `message` field is used when the error body is JSON and carries one.
async fn checked_body(response: reqwest::Response) -> Result<String, ApiError> {
    let status = response.status();
    let text = response.text().await.map_err(transport)?;
    if status.is_success() {
        return Ok(text);
    }

    let message = serde_json::from_str::<ErrorRes>(&text)
        .ok()
        .and_then(|body| body.display_message().map(str::to_string));
    tracing::debug!("server returned {}: {}", status, text);

    Err(ApiError::Server {
        status: status.as_u16(),
        message,
    })
}

#[async_trait::async_trait]
impl DashboardApi for HttpDashboardApi {
    async fn dashboard(&self) -> Result<DashboardRes, ApiError> {
        let response = self
            .client
            .get(self.config.endpoint("/dashboard"))
            .send()
            .await
            .map_err(transport)?;
        let text = checked_body(response).await?;
        serde_json::from_str(&text).map_err(|e| ApiError::Decode(e.to_string()))
    }

    async fn insight(&self, req: &InsightReq) -> Result<InsightRes, ApiError> {
        let response = self
            .client
            .post(self.config.endpoint("/insight"))
            .json(req)
            .send()
            .await
            .map_err(transport)?;
        let text = checked_body(response).await?;
        serde_json::from_str(&text).map_err(|e| ApiError::Decode(e.to_string()))
    }

    async fn save_summary(&self, req: &SummaryReq) -> Result<Option<SummaryRes>, ApiError> {
        let response = self
            .client
            .post(self.config.endpoint("/summary"))
            .json(req)
            .send()
            .await
            .map_err(transport)?;
        let text = checked_body(response).await?;
        Ok(serde_json::from_str(&text).ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_error_display_includes_message_when_present() {
        let with = ApiError::Server {
            status: 409,
            message: Some("Patient locked".into()),
        };
        let without = ApiError::Server {
            status: 500,
            message: None,
        };

        assert_eq!(with.to_string(), "server returned 409: Patient locked");
        assert_eq!(without.to_string(), "server returned 500");
    }
}
