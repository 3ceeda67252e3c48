//! Dashboard API Client
//!
//! Typed access to the Home Dashboard REST API.
//!
//! ## Architecture
//!
//! - **HomeApi**: the async seam controllers and the refresh loop depend on
//! - **ApiClient**: the `reqwest` implementation, one request per call
//! - **ApiError**: the single failure type surfaced to users

mod error;
mod http;

pub use error::{ApiError, ApiResult};
pub use http::{ApiClient, ClientConfig};

use crate::models::{Appliance, DashboardSnapshot, Task, TemperatureReading};
use async_trait::async_trait;

/// Backend operations consumed by the dashboard
///
/// Each method maps to exactly one HTTP request.
#[async_trait]
pub trait HomeApi: Send + Sync {
    /// `GET /api/dashboard`
    async fn dashboard(&self) -> ApiResult<DashboardSnapshot>;

    /// `GET /api/appliances/`
    async fn list_appliances(&self) -> ApiResult<Vec<Appliance>>;

    /// `POST /api/appliances/`
    async fn create_appliance(&self, name: &str, interval_days: Option<u32>) -> ApiResult<Appliance>;

    /// `PATCH /api/appliances/{id}/interval`; `None` unschedules
    async fn update_interval(&self, appliance_id: i64, interval_days: Option<u32>) -> ApiResult<Appliance>;

    /// `POST /api/appliances/bulk-delete`, returns the number deleted
    async fn bulk_delete(&self, ids: &[i64]) -> ApiResult<u64>;

    /// `GET /api/appliances/{id}/tasks`
    async fn list_tasks(&self, appliance_id: i64) -> ApiResult<Vec<Task>>;

    /// `PATCH /api/tasks/{id}` with `completed = true`
    async fn complete_task(&self, task_id: i64) -> ApiResult<Task>;

    /// `POST /api/temperature/`
    async fn add_temperature(&self, value_c: f64, room: &str) -> ApiResult<TemperatureReading>;

    /// `DELETE /api/temperature/`, optionally limited to one room
    async fn clear_temperatures(&self, room: Option<&str>) -> ApiResult<u64>;
}
