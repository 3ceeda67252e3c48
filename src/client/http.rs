//! Dashboard REST API Client
//!
//! HTTP client for communicating with the Home Dashboard REST API.

use super::{ApiError, ApiResult, HomeApi};
use crate::models::{
    Appliance, BulkDeleteRequest, DashboardSnapshot, Deleted, IntervalUpdate, NewAppliance,
    NewReading, Task, TaskCompletion, TemperatureReading,
};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Dashboard REST API client
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    config: ClientConfig,
}

/// Configuration for the API client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL for the API (e.g., "http://127.0.0.1:8000")
    pub base_url: String,
    /// Request timeout; `None` keeps the transport default
    pub request_timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            request_timeout: None,
        }
    }
}

impl ApiClient {
    /// Create a new client with the given configuration
    pub fn new(config: ClientConfig) -> ApiResult<Self> {
        let base_url = config.base_url.trim_end_matches('/').to_string();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ApiError::InvalidBaseUrl(config.base_url));
        }

        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        Ok(Self {
            client,
            config: ClientConfig { base_url, ..config },
        })
    }

    /// Create a client for `base_url` with default settings
    pub fn with_base_url(base_url: impl Into<String>) -> ApiResult<Self> {
        Self::new(ClientConfig {
            base_url: base_url.into(),
            ..ClientConfig::default()
        })
    }

    /// Get the current configuration
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Normalized base URL without trailing slash
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url, path)
    }

    /// Send a request and decode its JSON body, failing on any non-2xx status
    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> ApiResult<T> {
        let response = request.send().await?;
        let status = response.status();

        if status.is_success() {
            Ok(response.json().await?)
        } else {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), "API request failed: {}", body);
            Err(ApiError::Status {
                status: status.as_u16(),
                body,
            })
        }
    }
}

#[async_trait]
impl HomeApi for ApiClient {
    async fn dashboard(&self) -> ApiResult<DashboardSnapshot> {
        tracing::debug!("GET /api/dashboard");
        self.send_json(self.client.get(self.url("/api/dashboard")))
            .await
    }

    async fn list_appliances(&self) -> ApiResult<Vec<Appliance>> {
        tracing::debug!("GET /api/appliances/");
        self.send_json(self.client.get(self.url("/api/appliances/")))
            .await
    }

    async fn create_appliance(&self, name: &str, interval_days: Option<u32>) -> ApiResult<Appliance> {
        tracing::debug!(appliance = name, ?interval_days, "POST /api/appliances/");
        let body = NewAppliance {
            name: name.to_string(),
            cleaning_interval_days: interval_days,
        };
        self.send_json(self.client.post(self.url("/api/appliances/")).json(&body))
            .await
    }

    async fn update_interval(&self, appliance_id: i64, interval_days: Option<u32>) -> ApiResult<Appliance> {
        tracing::debug!(appliance_id, ?interval_days, "PATCH interval");
        let body = IntervalUpdate {
            cleaning_interval_days: interval_days,
        };
        let url = self.url(&format!("/api/appliances/{}/interval", appliance_id));
        self.send_json(self.client.patch(url).json(&body)).await
    }

    async fn bulk_delete(&self, ids: &[i64]) -> ApiResult<u64> {
        tracing::debug!(count = ids.len(), "POST /api/appliances/bulk-delete");
        let body = BulkDeleteRequest { ids: ids.to_vec() };
        let result: Deleted = self
            .send_json(
                self.client
                    .post(self.url("/api/appliances/bulk-delete"))
                    .json(&body),
            )
            .await?;
        Ok(result.deleted)
    }

    async fn list_tasks(&self, appliance_id: i64) -> ApiResult<Vec<Task>> {
        tracing::debug!(appliance_id, "GET tasks");
        let url = self.url(&format!("/api/appliances/{}/tasks", appliance_id));
        self.send_json(self.client.get(url)).await
    }

    async fn complete_task(&self, task_id: i64) -> ApiResult<Task> {
        tracing::debug!(task_id, "PATCH /api/tasks");
        let url = self.url(&format!("/api/tasks/{}", task_id));
        self.send_json(self.client.patch(url).json(&TaskCompletion { completed: true }))
            .await
    }

    async fn add_temperature(&self, value_c: f64, room: &str) -> ApiResult<TemperatureReading> {
        tracing::debug!(value_c, room, "POST /api/temperature/");
        let body = NewReading {
            value_c,
            room: room.to_string(),
        };
        self.send_json(self.client.post(self.url("/api/temperature/")).json(&body))
            .await
    }

    async fn clear_temperatures(&self, room: Option<&str>) -> ApiResult<u64> {
        tracing::debug!(?room, "DELETE /api/temperature/");
        let mut url = self.url("/api/temperature/");
        if let Some(room) = room.filter(|r| !r.is_empty()) {
            url.push_str(&format!("?room={}", urlencoding::encode(room)));
        }
        let result: Deleted = self.send_json(self.client.delete(url)).await?;
        Ok(result.deleted)
    }
}
