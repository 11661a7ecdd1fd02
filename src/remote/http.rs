use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, error};

use super::{ApiError, ApiRequest, ApiResponse, HostelBackend};
use crate::error::AppError;

pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>) -> Result<Self, AppError> {
        let client = Client::builder()
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build http client: {}", e)))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl HostelBackend for HttpBackend {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        let url = format!("{}{}", self.base_url, request.path);

        let mut builder = self
            .client
            .request(request.method.clone(), &url)
            .header("Content-Type", "application/json");
        if let Some(token) = &request.token {
            builder = builder.header("Authorization", format!("Bearer {}", token));
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| {
            error!("network error for {} {}: {}", request.method, url, e);
            ApiError::Network(e.to_string())
        })?;

        let status = response.status().as_u16();
        let body_text = response.text().await.unwrap_or_default();
        debug!("{} {} -> {}", request.method, request.path, status);

        let body = if body_text.trim().is_empty() {
            None
        } else {
            serde_json::from_str(&body_text).ok()
        };

        Ok(ApiResponse::new(status, body))
    }
}
