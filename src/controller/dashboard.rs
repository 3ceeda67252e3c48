//! Dashboard Controller
//!
//! Loads the dashboard snapshot and handles the dashboard's mutations:
//! recording and clearing temperature readings, completing due tasks.

use super::record;
use crate::client::{ApiResult, HomeApi};
use crate::models::{Task, TemperatureReading};
use crate::state::{Resource, ViewStore};
use crate::view::{DashboardView, PlotArea};
use std::sync::Arc;

/// Room used when a reading is submitted without one
pub const DEFAULT_ROOM: &str = "default";

/// Drives the dashboard screen
pub struct DashboardController {
    api: Arc<dyn HomeApi>,
    store: Arc<ViewStore>,
    area: PlotArea,
}

impl DashboardController {
    pub fn new(api: Arc<dyn HomeApi>, store: Arc<ViewStore>) -> Self {
        Self {
            api,
            store,
            area: PlotArea::default(),
        }
    }

    /// Use a custom plot area for chart geometry
    pub fn with_plot_area(mut self, area: PlotArea) -> Self {
        self.area = area;
        self
    }

    pub fn store(&self) -> &Arc<ViewStore> {
        &self.store
    }

    pub fn plot_area(&self) -> PlotArea {
        self.area
    }

    /// Fetch the snapshot and replace the cached one.
    ///
    /// Failures land in the error banner; a successful reload leaves the
    /// banner alone since it is not a user action.
    pub async fn load(&self) -> ApiResult<()> {
        // The ticket is taken before the request goes out
        let fetch = self.store.begin_fetch(Resource::Dashboard).await;

        let result = self.api.dashboard().await;

        fetch
            .finish(|s, ticket| match result {
                Ok(snapshot) => {
                    s.apply_dashboard(ticket, snapshot);
                    Ok(())
                }
                Err(e) => {
                    tracing::warn!("Dashboard load failed: {}", e);
                    s.set_error(e.to_string());
                    Err(e)
                }
            })
            .await
    }

    /// Record a reading, then reload.
    ///
    /// Non-finite values are ignored without a request. A blank room is
    /// stored as [`DEFAULT_ROOM`].
    pub async fn add_reading(&self, value_c: f64, room: &str) -> ApiResult<Option<TemperatureReading>> {
        if !value_c.is_finite() {
            tracing::debug!("Ignoring non-finite temperature {}", value_c);
            return Ok(None);
        }

        let room = match room.trim() {
            "" => DEFAULT_ROOM,
            trimmed => trimmed,
        };

        let reading = record(
            &self.store,
            "Add temperature",
            self.api.add_temperature(value_c, room).await,
        )
        .await?;
        tracing::info!(room, value_c, "Temperature recorded");

        self.load().await?;
        Ok(Some(reading))
    }

    /// Clear readings for one room, or all rooms when `room` is `None` or
    /// empty. Any other room, whitespace included, is sent as given.
    pub async fn clear_readings(&self, room: Option<&str>) -> ApiResult<u64> {
        let room = room.filter(|r| !r.is_empty());

        let deleted = record(
            &self.store,
            "Clear temperatures",
            self.api.clear_temperatures(room).await,
        )
        .await?;
        tracing::info!(?room, deleted, "Temperature readings cleared");

        self.load().await?;
        Ok(deleted)
    }

    /// Mark a due task complete, then reload
    pub async fn complete_task(&self, task_id: i64) -> ApiResult<Task> {
        let task = record(
            &self.store,
            "Complete task",
            self.api.complete_task(task_id).await,
        )
        .await?;
        tracing::info!(task_id, "Task completed");

        self.load().await?;
        Ok(task)
    }

    pub async fn dismiss_error(&self) {
        self.store.update(|s| s.clear_error()).await;
    }

    /// Derived view of the cached snapshot, `None` before the first load
    pub async fn view(&self) -> Option<DashboardView> {
        self.store
            .read()
            .await
            .dashboard
            .as_ref()
            .map(|snapshot| DashboardView::from_snapshot(snapshot, self.area))
    }
}
