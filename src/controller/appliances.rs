//! Appliances Controller
//!
//! Appliance list management: creation, schedule changes, multi-select
//! bulk deletion, and per-appliance task lists loaded on demand.

use super::record;
use crate::client::{ApiResult, HomeApi};
use crate::models::{Appliance, Task};
use crate::state::{Resource, ViewStore};
use crate::view::{appliance_cards, toggled_interval, ApplianceCard, DEFAULT_INTERVAL_DAYS};
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Drives the appliance screen
pub struct AppliancesController {
    api: Arc<dyn HomeApi>,
    store: Arc<ViewStore>,
    default_interval_days: u32,
}

impl AppliancesController {
    pub fn new(api: Arc<dyn HomeApi>, store: Arc<ViewStore>) -> Self {
        Self {
            api,
            store,
            default_interval_days: DEFAULT_INTERVAL_DAYS,
        }
    }

    /// Interval the schedule toggle applies to unscheduled appliances
    pub fn with_default_interval(mut self, days: u32) -> Self {
        self.default_interval_days = days.max(1);
        self
    }

    pub fn store(&self) -> &Arc<ViewStore> {
        &self.store
    }

    /// Fetch the appliance list and replace the cached one
    pub async fn refresh(&self) -> ApiResult<()> {
        let fetch = self.store.begin_fetch(Resource::Appliances).await;

        let result = self.api.list_appliances().await;

        fetch
            .finish(|s, ticket| match result {
                Ok(appliances) => {
                    s.apply_appliances(ticket, appliances);
                    Ok(())
                }
                Err(e) => {
                    tracing::warn!("Appliance refresh failed: {}", e);
                    s.set_error(e.to_string());
                    Err(e)
                }
            })
            .await
    }

    /// Create an appliance, then refresh the list.
    ///
    /// The name is trimmed and blank names are ignored without a request.
    /// An interval of zero days means unscheduled.
    pub async fn create(&self, name: &str, interval_days: Option<u32>) -> ApiResult<Option<Appliance>> {
        let name = name.trim();
        if name.is_empty() {
            return Ok(None);
        }
        let interval_days = interval_days.filter(|days| *days > 0);

        let appliance = record(
            &self.store,
            "Create appliance",
            self.api.create_appliance(name, interval_days).await,
        )
        .await?;
        tracing::info!(id = appliance.id, appliance = name, "Appliance created");

        self.refresh().await?;
        Ok(Some(appliance))
    }

    /// Flip an appliance in or out of the bulk-delete selection.
    ///
    /// Returns whether it is selected afterwards.
    pub async fn toggle_selected(&self, appliance_id: i64) -> bool {
        self.store.update(|s| s.selection.toggle(appliance_id)).await
    }

    /// Add an appliance to the bulk-delete selection without toggling
    pub async fn select(&self, appliance_id: i64) {
        self.store.update(|s| s.selection.insert(appliance_id)).await;
    }

    /// Delete every selected appliance, then clear the selection and
    /// refresh. An empty selection sends nothing.
    pub async fn bulk_delete_selected(&self) -> ApiResult<u64> {
        let ids = self.store.read().await.selection.ids();
        if ids.is_empty() {
            return Ok(0);
        }

        let deleted = record(&self.store, "Bulk delete", self.api.bulk_delete(&ids).await).await?;
        tracing::info!(requested = ids.len(), deleted, "Appliances deleted");

        self.store.update(|s| s.selection.clear()).await;
        self.refresh().await?;
        Ok(deleted)
    }

    /// Two-state schedule toggle: unschedule a scheduled appliance, or give
    /// an unscheduled one the default interval.
    ///
    /// Returns `None` when the appliance is not in the cached list.
    pub async fn toggle_interval(&self, appliance_id: i64) -> ApiResult<Option<Appliance>> {
        let current = self
            .store
            .read()
            .await
            .appliances
            .iter()
            .find(|a| a.id == appliance_id)
            .map(|a| a.cleaning_interval_days);

        match current {
            Some(current) => {
                let next = toggled_interval(current, self.default_interval_days);
                self.set_interval(appliance_id, next).await.map(Some)
            }
            None => Ok(None),
        }
    }

    /// Set or clear an appliance's interval, then refresh the list and, if
    /// loaded, its task list.
    pub async fn set_interval(&self, appliance_id: i64, interval_days: Option<u32>) -> ApiResult<Appliance> {
        let interval_days = interval_days.filter(|days| *days > 0);

        let appliance = record(
            &self.store,
            "Update interval",
            self.api.update_interval(appliance_id, interval_days).await,
        )
        .await?;
        tracing::info!(appliance_id, ?interval_days, "Cleaning interval updated");

        self.refresh().await?;
        if self.store.read().await.tasks.is_loaded(appliance_id) {
            self.load_tasks(appliance_id).await?;
        }
        Ok(appliance)
    }

    /// Fetch one appliance's tasks into the task cache
    pub async fn load_tasks(&self, appliance_id: i64) -> ApiResult<()> {
        let ticket = self
            .store
            .update(|s| s.issue(Resource::Tasks(appliance_id)))
            .await;

        let tasks = record(
            &self.store,
            "Load tasks",
            self.api.list_tasks(appliance_id).await,
        )
        .await?;

        self.store
            .update(|s| s.apply_tasks(ticket, tasks))
            .await;
        Ok(())
    }

    /// Complete a task, then reload its appliance's task list
    pub async fn complete_task(&self, task: &Task) -> ApiResult<Task> {
        let done = record(
            &self.store,
            "Complete task",
            self.api.complete_task(task.id).await,
        )
        .await?;
        tracing::info!(task_id = task.id, "Task completed");

        self.load_tasks(task.appliance_id).await?;
        Ok(done)
    }

    /// Overdue status as of `now`; false until the tasks are loaded
    pub async fn is_overdue(&self, appliance_id: i64, now: DateTime<Utc>) -> bool {
        self.store.read().await.tasks.is_overdue(appliance_id, now)
    }

    /// Derived cards for the whole grid as of `now`
    pub async fn cards(&self, now: DateTime<Utc>) -> Vec<ApplianceCard> {
        let state = self.store.read().await;
        appliance_cards(
            &state.appliances,
            &state.selection,
            &state.tasks,
            self.default_interval_days,
            now,
        )
    }

    pub async fn dismiss_error(&self) {
        self.store.update(|s| s.clear_error()).await;
    }
}
